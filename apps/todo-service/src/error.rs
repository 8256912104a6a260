//! # Todo Service エラー定義
//!
//! ハンドラで発生するエラーと、HTTP レスポンスへの変換を定義する。
//! レスポンスボディは全て [`ErrorResponse`] エンベロープ `{ message, error? }`。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use todo_domain::DomainError;
use todo_infra::InfraError;
use todo_shared::ErrorResponse;

/// Todo API で発生するエラー
#[derive(Debug, Error)]
pub enum TodoApiError {
    /// リクエストボディを JSON としてデコードできない
    #[error("could not decode data: {0}")]
    Decode(String),

    /// 作成時のタイトルが空
    #[error("please add a title: {0}")]
    MissingTitle(#[source] DomainError),

    /// 更新時のタイトルが空
    #[error("title cannot be empty: {0}")]
    EmptyTitle(#[source] DomainError),

    /// パスの ID が TodoId として解釈できない
    #[error("the id is invalid: {0}")]
    InvalidId(#[source] DomainError),

    #[error("Could not fetch the todo collection: {0}")]
    List(#[source] InfraError),

    #[error("Failed to insert data into db: {0}")]
    Insert(#[source] InfraError),

    #[error("Failed to update data in the db: {0}")]
    Update(#[source] InfraError),

    #[error("an error occurred while deleting todo item: {0}")]
    Delete(#[source] InfraError),
}

impl TodoApiError {
    /// HTTP ステータスコード
    ///
    /// 一覧取得の失敗はクライアントエラー（400）として返す。
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Decode(_)
            | Self::MissingTitle(_)
            | Self::EmptyTitle(_)
            | Self::InvalidId(_)
            | Self::List(_) => StatusCode::BAD_REQUEST,
            Self::Insert(_) | Self::Update(_) | Self::Delete(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// レスポンスの `message`
    pub fn message(&self) -> &'static str {
        match self {
            Self::Decode(_) => "could not decode data",
            Self::MissingTitle(_) => "please add a title",
            Self::EmptyTitle(_) => "title cannot be empty",
            Self::InvalidId(_) => "the id is invalid",
            Self::List(_) => "Could not fetch the todo collection",
            Self::Insert(_) => "Failed to insert data into db",
            Self::Update(_) => "Failed to update data in the db",
            Self::Delete(_) => "an error occurred while deleting todo item",
        }
    }

    /// レスポンスの `error`（原因エラーの文字列）
    fn detail(&self) -> String {
        match self {
            Self::Decode(reason) => reason.clone(),
            Self::MissingTitle(e) | Self::EmptyTitle(e) | Self::InvalidId(e) => e.to_string(),
            Self::List(e) | Self::Insert(e) | Self::Update(e) | Self::Delete(e) => e.to_string(),
        }
    }
}

impl IntoResponse for TodoApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            Self::List(e) | Self::Insert(e) | Self::Update(e) | Self::Delete(e) => {
                tracing::error!(
                    error.message = %e,
                    error.span_trace = %e.span_trace(),
                    "{}",
                    self.message()
                );
            }
            _ => {
                tracing::warn!(error.message = %self.detail(), "{}", self.message());
            }
        }

        let body = ErrorResponse::new(self.message()).with_error(self.detail());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use todo_domain::todo::{TodoId, TodoTitle};

    use super::*;

    async fn render(err: TodoApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn domain_error() -> DomainError {
        TodoTitle::new("").unwrap_err()
    }

    #[rstest]
    #[case::decode(TodoApiError::Decode("EOF".to_string()), StatusCode::BAD_REQUEST)]
    #[case::missing_title(TodoApiError::MissingTitle(domain_error()), StatusCode::BAD_REQUEST)]
    #[case::empty_title(TodoApiError::EmptyTitle(domain_error()), StatusCode::BAD_REQUEST)]
    #[case::invalid_id(
        TodoApiError::InvalidId(TodoId::parse_str("x").unwrap_err()),
        StatusCode::BAD_REQUEST
    )]
    #[case::list(TodoApiError::List(InfraError::dynamo_db("x")), StatusCode::BAD_REQUEST)]
    #[case::insert(
        TodoApiError::Insert(InfraError::dynamo_db("x")),
        StatusCode::INTERNAL_SERVER_ERROR
    )]
    #[case::update(
        TodoApiError::Update(InfraError::dynamo_db("x")),
        StatusCode::INTERNAL_SERVER_ERROR
    )]
    #[case::delete(
        TodoApiError::Delete(InfraError::dynamo_db("x")),
        StatusCode::INTERNAL_SERVER_ERROR
    )]
    fn test_エラー種別ごとのステータスコード(
        #[case] err: TodoApiError,
        #[case] expected: StatusCode,
    ) {
        assert_eq!(err.status(), expected);
    }

    #[tokio::test]
    async fn test_ストレージエラーはmessageとerrorを持つ() {
        let (status, body) =
            render(TodoApiError::Insert(InfraError::dynamo_db("timeout"))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            serde_json::json!({
                "message": "Failed to insert data into db",
                "error": "DynamoDB エラー: timeout",
            })
        );
    }

    #[tokio::test]
    async fn test_デコードエラーは原因の文字列を含む() {
        let (status, body) = render(TodoApiError::Decode("EOF while parsing".to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "could not decode data");
        assert_eq!(body["error"], "EOF while parsing");
    }
}
