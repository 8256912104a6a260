//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//! 各ハンドラはサブモジュールに配置し、ここで re-export する。

pub mod health;
pub mod home;
pub mod todo;

pub use health::{ReadinessState, health_check, readiness_check};
pub use home::{HomeState, PageRenderer, home};
pub use todo::{TodoState, create_todo, delete_todo, list_todos, update_todo};
