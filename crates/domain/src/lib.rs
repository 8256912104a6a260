//! # Todo ドメイン層
//!
//! Todo アイテムのドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **エンティティ**: 一意の識別子を持つ [`todo::Todo`]
//! - **値オブジェクト**: [`todo::TodoId`]（ストレージ側の識別子）、
//!   [`todo::TodoTitle`]（空でないタイトル）
//! - **ドメインエラー**: バリデーション違反を表現する [`DomainError`]
//!
//! ## 依存関係の方向
//!
//! ```text
//! todo-service → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（DynamoDB 等）に一切依存しない。
//!
//! ## 使用例
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use todo_domain::todo::{Todo, TodoId, TodoTitle};
//!
//! let todo = Todo::new(TodoId::new(), TodoTitle::new("buy milk")?, chrono::Utc::now());
//! assert!(!todo.completed());
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod error;
pub mod todo;

pub use error::DomainError;
