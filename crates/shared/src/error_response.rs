//! # エラーレスポンスエンベロープ
//!
//! 全エンドポイントで共通のエラーレスポンス `{ "message": ..., "error": ... }` を提供する。
//!
//! ## 設計
//!
//! - `ErrorResponse` は純粋なデータ構造（`Serialize` / `Deserialize` のみ）
//! - HTTP ステータスはボディに含めず、レスポンスのステータスコードで表す
//! - `error` には原因となったエラーの文字列を入れる。原因がない場合は省略する

use serde::{Deserialize, Serialize};

/// エラーレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error:   Option<String>,
}

impl ErrorResponse {
    /// メッセージのみのエラーレスポンス
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error:   None,
        }
    }

    /// 原因エラーの文字列を付与する
    pub fn with_error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }
}
