//! # Todo インフラ層
//!
//! DynamoDB との接続・通信を担当するインフラストラクチャ層。
//!
//! ## 依存関係
//!
//! ```text
//! todo-service → infra → domain
//! ```
//!
//! ドメイン層はインフラ層に依存しない。
//!
//! ## モジュール構成
//!
//! - [`dynamodb`] - クライアント生成とテーブル自動作成
//! - [`error`] - インフラ層エラー定義
//! - [`repository`] - リポジトリトレイトと DynamoDB 実装
//! - `mock` - インメモリのモックリポジトリ（`test-utils` feature）

pub mod dynamodb;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod repository;

pub use error::{InfraError, InfraErrorKind};
