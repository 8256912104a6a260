//! # Todo ハンドラ
//!
//! Todo コレクションの CRUD API を提供する。
//!
//! ## エンドポイント
//!
//! - `GET /todo/` - 全件取得
//! - `POST /todo/` - 作成
//! - `PUT /todo/{id}` - タイトルと完了フラグの更新
//! - `DELETE /todo/{id}` - 削除
//!
//! ストレージ上の [`Todo`] とワイヤ上の [`TodoDto`] は別の型で、
//! 変換はこのモジュールでのみ行う。

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use todo_domain::{
    clock::Clock,
    todo::{Todo, TodoId, TodoTitle, TodoUpdate},
};
use todo_infra::repository::TodoRepository;
use todo_shared::ApiResponse;

use crate::error::TodoApiError;

/// Todo API の共有状態
pub struct TodoState {
    pub repository: Arc<dyn TodoRepository>,
    pub clock:      Arc<dyn Clock>,
}

// --- リクエスト/レスポンス型 ---

/// Todo のワイヤ表現
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoDto {
    pub id:         String,
    pub title:      String,
    pub completed:  bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Todo> for TodoDto {
    fn from(todo: &Todo) -> Self {
        Self {
            id:         todo.id().to_string(),
            title:      todo.title().as_str().to_string(),
            completed:  todo.completed(),
            created_at: todo.created_at(),
        }
    }
}

/// Todo 作成リクエスト
#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub title: String,
}

/// Todo 作成レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTodoResponse {
    pub message: String,
    #[serde(rename = "ID")]
    pub id:      String,
}

/// Todo 更新リクエスト
#[derive(Debug, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub title:     String,
    #[serde(default)]
    pub completed: bool,
}

/// 削除結果
///
/// 既存クライアントとの互換のため、フィールド名は `DeletedCount` で出力する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResult {
    #[serde(rename = "DeletedCount")]
    pub deleted_count: u64,
}

/// パスの ID をパースする
fn parse_id(raw: &str) -> Result<TodoId, TodoApiError> {
    TodoId::parse_str(raw).map_err(TodoApiError::InvalidId)
}

/// ボディを JSON としてデコードする
///
/// `Content-Type` は見ない。ボディが JSON として読めるかだけで判定する。
fn decode<T: DeserializeOwned>(body: &Bytes) -> Result<T, TodoApiError> {
    serde_json::from_slice(body).map_err(|e| TodoApiError::Decode(e.to_string()))
}

// --- ハンドラ ---

/// GET /todo/
///
/// 全 Todo を取得する。順序はストレージの返す順序のまま。
#[tracing::instrument(skip_all)]
pub async fn list_todos(
    State(state): State<Arc<TodoState>>,
) -> Result<impl IntoResponse, TodoApiError> {
    let todos = state
        .repository
        .find_all()
        .await
        .map_err(TodoApiError::List)?;

    let items: Vec<TodoDto> = todos.iter().map(TodoDto::from).collect();

    let response = ApiResponse::new("All todos retrieved", items);
    Ok((StatusCode::OK, Json(response)))
}

/// POST /todo/
///
/// 新しい ID を採番し、未完了の Todo を作成する。
#[tracing::instrument(skip_all)]
pub async fn create_todo(
    State(state): State<Arc<TodoState>>,
    body: Bytes,
) -> Result<impl IntoResponse, TodoApiError> {
    let req: CreateTodoRequest = decode(&body)?;
    let title = TodoTitle::new(req.title).map_err(TodoApiError::MissingTitle)?;

    let todo = Todo::new(TodoId::new(), title, state.clock.now());
    state
        .repository
        .insert(&todo)
        .await
        .map_err(TodoApiError::Insert)?;

    tracing::info!(id = %todo.id(), "Todo を作成しました");

    let response = CreateTodoResponse {
        message: "Todo created successfully".to_string(),
        id:      todo.id().to_string(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// PUT /todo/{id}
///
/// `title` と `completed` を置き換える。`data` は変更された件数。
/// 該当する Todo がなくてもエラーにはせず 0 を返す。
#[tracing::instrument(skip_all, fields(id = %raw_id))]
pub async fn update_todo(
    State(state): State<Arc<TodoState>>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, TodoApiError> {
    let id = parse_id(&raw_id)?;
    let req: UpdateTodoRequest = decode(&body)?;
    let title = TodoTitle::new(req.title).map_err(TodoApiError::EmptyTitle)?;

    let modified = state
        .repository
        .update(&id, &TodoUpdate::new(title, req.completed))
        .await
        .map_err(TodoApiError::Update)?;

    tracing::info!(modified, "Todo を更新しました");

    let response = ApiResponse::new("Todo updated successfully", modified);
    Ok((StatusCode::OK, Json(response)))
}

/// DELETE /todo/{id}
///
/// 該当する Todo がなくてもエラーにはせず `DeletedCount: 0` を返す。
#[tracing::instrument(skip_all, fields(id = %raw_id))]
pub async fn delete_todo(
    State(state): State<Arc<TodoState>>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, TodoApiError> {
    let id = parse_id(&raw_id)?;

    let deleted_count = state
        .repository
        .delete(&id)
        .await
        .map_err(TodoApiError::Delete)?;

    tracing::info!(deleted_count, "Todo を削除しました");

    let response = ApiResponse::new("item deleted successfully", DeleteResult { deleted_count });
    Ok((StatusCode::OK, Json(response)))
}
