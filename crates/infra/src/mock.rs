//! # テスト用モックリポジトリ
//!
//! ハンドラテストで使用するインメモリモックリポジトリ。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! todo-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use todo_domain::todo::{Todo, TodoId, TodoUpdate};

use crate::{error::InfraError, repository::TodoRepository};

// ===== MockTodoRepository =====

/// 挿入順を保持するインメモリの Todo リポジトリ
///
/// [`failing`](MockTodoRepository::failing) で生成すると、全操作がストレージエラーを返す。
#[derive(Clone, Default)]
pub struct MockTodoRepository {
    todos:   Arc<Mutex<Vec<Todo>>>,
    failure: Option<String>,
}

impl MockTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 全操作が `message` を持つ DynamoDB エラーで失敗するリポジトリ
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            todos:   Arc::default(),
            failure: Some(message.into()),
        }
    }

    pub fn add_todo(&self, todo: Todo) {
        self.todos.lock().unwrap().push(todo);
    }

    /// 現在保持している Todo のスナップショット
    pub fn todos(&self) -> Vec<Todo> {
        self.todos.lock().unwrap().clone()
    }

    fn check_failure(&self) -> Result<(), InfraError> {
        match &self.failure {
            Some(message) => Err(InfraError::dynamo_db(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TodoRepository for MockTodoRepository {
    async fn find_all(&self) -> Result<Vec<Todo>, InfraError> {
        self.check_failure()?;
        Ok(self.todos())
    }

    async fn insert(&self, todo: &Todo) -> Result<(), InfraError> {
        self.check_failure()?;
        self.todos.lock().unwrap().push(todo.clone());
        Ok(())
    }

    async fn update(&self, id: &TodoId, update: &TodoUpdate) -> Result<u64, InfraError> {
        self.check_failure()?;
        let mut todos = self.todos.lock().unwrap();
        let Some(todo) = todos.iter_mut().find(|t| t.id() == id) else {
            return Ok(0);
        };
        if !update.modifies(todo) {
            return Ok(0);
        }
        *todo = todo.apply(update);
        Ok(1)
    }

    async fn delete(&self, id: &TodoId) -> Result<u64, InfraError> {
        self.check_failure()?;
        let mut todos = self.todos.lock().unwrap();
        let before = todos.len();
        todos.retain(|t| t.id() != id);
        Ok((before - todos.len()) as u64)
    }
}
