//! # TodoRepository
//!
//! Todo コレクションの永続化を担当するリポジトリ。
//!
//! ## アイテム形式
//!
//! | 属性         | 型     | 内容                          |
//! |--------------|--------|-------------------------------|
//! | `id`         | S (PK) | UUID v7 の文字列表現          |
//! | `title`      | S      | タイトル                      |
//! | `completed`  | BOOL   | 完了フラグ                    |
//! | `created_at` | S      | 作成日時（RFC 3339）          |

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::{
    Client,
    operation::update_item::UpdateItemError,
    types::{AttributeValue, ReturnValue},
};
use chrono::{DateTime, Utc};
use todo_domain::todo::{Todo, TodoId, TodoTitle, TodoUpdate};

use crate::{InfraError, dynamodb::sdk_error};

/// Todo リポジトリトレイト
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// 全 Todo を取得する
    ///
    /// 1 件でも変換できないアイテムがあればエラーを返す。
    async fn find_all(&self) -> Result<Vec<Todo>, InfraError>;

    /// Todo を新規作成する
    async fn insert(&self, todo: &Todo) -> Result<(), InfraError>;

    /// `title` と `completed` を置き換える
    ///
    /// 戻り値は実際に変更されたアイテム数（0 または 1）。
    /// 該当 ID が存在しない場合や、値が変わらない場合は 0 を返す。
    async fn update(&self, id: &TodoId, update: &TodoUpdate) -> Result<u64, InfraError>;

    /// Todo を削除する
    ///
    /// 戻り値は削除されたアイテム数（0 または 1）。
    async fn delete(&self, id: &TodoId) -> Result<u64, InfraError>;
}

/// DynamoDB 実装の TodoRepository
pub struct DynamoDbTodoRepository {
    client:     Client,
    table_name: String,
}

impl DynamoDbTodoRepository {
    pub fn new(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }
}

#[async_trait]
impl TodoRepository for DynamoDbTodoRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_all(&self) -> Result<Vec<Todo>, InfraError> {
        let mut todos = Vec::new();
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;

        // Scan は 1MB 単位で打ち切られるため LastEvaluatedKey がなくなるまで続ける
        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| sdk_error(format_args!("Todo の取得に失敗"), &e))?;

            for item in output.items() {
                todos.push(convert_item_to_todo(item)?);
            }

            match output.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        tracing::debug!(count = todos.len(), "Todo を取得しました");

        Ok(todos)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %todo.id()))]
    async fn insert(&self, todo: &Todo) -> Result<(), InfraError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(convert_todo_to_item(todo)))
            .condition_expression("attribute_not_exists(id)")
            .send()
            .await
            .map_err(|e| sdk_error(format_args!("Todo の作成に失敗"), &e))?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn update(&self, id: &TodoId, update: &TodoUpdate) -> Result<u64, InfraError> {
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(id.to_string()))
            .update_expression("SET #title = :title, #completed = :completed")
            // 存在しない ID で新しいアイテムが作られないようにする
            .condition_expression("attribute_exists(id)")
            .expression_attribute_names("#title", "title")
            .expression_attribute_names("#completed", "completed")
            .expression_attribute_values(
                ":title",
                AttributeValue::S(update.title().as_str().to_string()),
            )
            .expression_attribute_values(":completed", AttributeValue::Bool(update.completed()))
            .return_values(ReturnValue::AllOld)
            .send()
            .await;

        // 書き込みは完了しているので、ここから先で失敗させない
        match result {
            Ok(output) => Ok(modified_count(output.attributes(), update)),
            Err(err) if is_missing_item(err.as_service_error()) => {
                tracing::debug!("更新対象の Todo が存在しません");
                Ok(0)
            }
            Err(err) => Err(sdk_error(format_args!("Todo の更新に失敗"), &err)),
        }
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn delete(&self, id: &TodoId) -> Result<u64, InfraError> {
        let output = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(id.to_string()))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(|e| sdk_error(format_args!("Todo の削除に失敗"), &e))?;

        let deleted = output.attributes().is_some_and(|item| !item.is_empty());
        Ok(u64::from(deleted))
    }
}

/// 更新前のアイテム（ALL_OLD）と更新内容から変更件数を求める
///
/// 比較するのは `title` と `completed` だけ。属性が欠けていたり型が違ったり
/// しても、書き込みで値が揃ったので変更ありとみなす。
fn modified_count(old: Option<&HashMap<String, AttributeValue>>, update: &TodoUpdate) -> u64 {
    let Some(old) = old else {
        // 条件式で存在は確認済み
        return 1;
    };
    let same_title = old
        .get("title")
        .and_then(|v| v.as_s().ok())
        .is_some_and(|title| title == update.title().as_str());
    let same_completed = old
        .get("completed")
        .and_then(|v| v.as_bool().ok())
        .is_some_and(|completed| *completed == update.completed());

    u64::from(!(same_title && same_completed))
}

/// `attribute_exists(id)` の条件に引っかかった（= 対象が存在しない）か
fn is_missing_item(err: Option<&UpdateItemError>) -> bool {
    err.is_some_and(UpdateItemError::is_conditional_check_failed_exception)
}

/// Todo を DynamoDB アイテムに変換する
fn convert_todo_to_item(todo: &Todo) -> HashMap<String, AttributeValue> {
    HashMap::from([
        ("id".to_string(), AttributeValue::S(todo.id().to_string())),
        (
            "title".to_string(),
            AttributeValue::S(todo.title().as_str().to_string()),
        ),
        (
            "completed".to_string(),
            AttributeValue::Bool(todo.completed()),
        ),
        (
            "created_at".to_string(),
            AttributeValue::S(todo.created_at().to_rfc3339()),
        ),
    ])
}

/// DynamoDB アイテムを Todo に変換する
fn convert_item_to_todo(item: &HashMap<String, AttributeValue>) -> Result<Todo, InfraError> {
    let id = TodoId::parse_str(&get_s(item, "id")?)
        .map_err(|e| InfraError::invalid_item(e.to_string()))?;
    let title =
        TodoTitle::new(get_s(item, "title")?).map_err(|e| InfraError::invalid_item(e.to_string()))?;
    let completed = get_bool(item, "completed")?;
    let created_at = DateTime::parse_from_rfc3339(&get_s(item, "created_at")?)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| InfraError::invalid_item(format!("created_at のパースに失敗: {e}")))?;

    Ok(Todo::from_db(id, title, completed, created_at))
}

/// DynamoDB アイテムから文字列属性を取得する
fn get_s(item: &HashMap<String, AttributeValue>, key: &str) -> Result<String, InfraError> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .ok_or_else(|| InfraError::invalid_item(format!("属性 '{key}' が見つかりません")))
}

/// DynamoDB アイテムから真偽値属性を取得する
fn get_bool(item: &HashMap<String, AttributeValue>, key: &str) -> Result<bool, InfraError> {
    item.get(key)
        .and_then(|v| v.as_bool().ok())
        .copied()
        .ok_or_else(|| InfraError::invalid_item(format!("真偽値属性 '{key}' が見つかりません")))
}
