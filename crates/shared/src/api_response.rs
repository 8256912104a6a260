//! # API レスポンスエンベロープ
//!
//! 成功レスポンスの統一形式 `{ "message": ..., "data": T }` を提供する。

use serde::{Deserialize, Serialize};

/// 成功レスポンスの統一型
///
/// `message` は人間向けの説明、`data` はエンドポイント固有のペイロード。
/// サーバー側は Serialize、テストやクライアントは Deserialize で使用する。
///
/// ## 使用例
///
/// ```
/// use todo_shared::ApiResponse;
///
/// let response = ApiResponse::new("All todos retrieved", vec![1, 2, 3]);
/// assert_eq!(response.message, "All todos retrieved");
/// assert_eq!(response.data.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data:    T,
}

impl<T> ApiResponse<T> {
    /// 新しい `ApiResponse` を作成する
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}
