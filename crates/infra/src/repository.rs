//! # リポジトリ実装
//!
//! Todo コレクションの永続化を担当するリポジトリトレイトとその実装。
//! ハンドラはトレイト経由でアクセスするため、テストではモックに差し替えられる。

pub mod todo_repository;

pub use todo_repository::{DynamoDbTodoRepository, TodoRepository};
