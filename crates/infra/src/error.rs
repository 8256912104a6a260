//! # インフラ層エラー定義
//!
//! DynamoDB との通信や、保存済みアイテムの変換で発生するエラーを表現する。
//!
//! [`InfraError`] は種別（[`InfraErrorKind`]）と生成時点の [`SpanTrace`] の組。
//! `InfraErrorKind` からの変換で必ず `SpanTrace` が捕捉される。

use std::fmt;

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層で発生するエラー
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// DynamoDB への要求が失敗した（SDK エラーは原因の連鎖ごと文字列化する）
    #[error("DynamoDB エラー: {0}")]
    DynamoDb(String),

    /// 保存済みアイテムが Todo として解釈できない
    ///
    /// 必須属性の欠落や型の不一致など。
    #[error("不正なアイテム: {0}")]
    InvalidItem(String),
}

impl InfraError {
    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    /// エラー生成時点の呼び出し経路
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    pub fn dynamo_db(msg: impl Into<String>) -> Self {
        InfraErrorKind::DynamoDb(msg.into()).into()
    }

    pub fn invalid_item(msg: impl Into<String>) -> Self {
        InfraErrorKind::InvalidItem(msg.into()).into()
    }
}

/// 現在のスパンを捕捉してラップする
impl From<InfraErrorKind> for InfraError {
    fn from(kind: InfraErrorKind) -> Self {
        Self {
            kind,
            span_trace: SpanTrace::capture(),
        }
    }
}

impl fmt::Debug for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfraError")
            .field("kind", &self.kind)
            .field("span_trace", &self.span_trace)
            .finish()
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.kind)
    }
}
