//! # Observability 基盤
//!
//! トレーシングの初期化、HTTP リクエストスパンの生成、リクエスト ID の
//! 採番を提供する。
//!
//! ## 環境変数
//!
//! | 変数 | 既定値 | 内容 |
//! |------|--------|------|
//! | `LOG_FORMAT` | `pretty` | `json` / `pretty` |
//! | `RUST_LOG` | [`TracingConfig::default_directives`] | `EnvFilter` のディレクティブ |

use std::str::FromStr;

use thiserror::Error;

/// リクエスト ID ヘッダー名
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 1 イベント 1 行の JSON（本番環境向け）
    Json,
    /// 人間向けの複数行表示（開発環境向け）
    #[default]
    Pretty,
}

/// `LOG_FORMAT` に解釈できない値が指定された
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("LOG_FORMAT の値が不正です: {0:?}（json または pretty）")]
pub struct UnknownLogFormat(pub String);

impl FromStr for LogFormat {
    type Err = UnknownLogFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            _ => Err(UnknownLogFormat(s.to_string())),
        }
    }
}

impl LogFormat {
    /// 環境変数 `LOG_FORMAT` から読み取る
    ///
    /// 不正な値は警告を出して [`Pretty`](LogFormat::Pretty) に倒す。
    /// サブスクライバ登録前なので警告は stderr に直接書く。
    pub fn from_env() -> Self {
        let Ok(raw) = std::env::var("LOG_FORMAT") else {
            return Self::default();
        };
        raw.parse().unwrap_or_else(|e: UnknownLogFormat| {
            eprintln!("WARNING: {e}");
            Self::default()
        })
    }
}

/// トレーシング初期化設定
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// サービス名（`app` スパンの `service` フィールド）
    pub service_name:       String,
    pub log_format:         LogFormat,
    /// `RUST_LOG` 未設定時に使うフィルタ
    pub default_directives: String,
}

impl TracingConfig {
    /// サービス名から既定のフィルタ（`info` + 自クレートは `debug`）を組み立てる
    pub fn new(service_name: impl Into<String>, log_format: LogFormat) -> Self {
        let service_name = service_name.into();
        let default_directives = format!("info,{}=debug", service_name.replace('-', "_"));
        Self {
            service_name,
            log_format,
            default_directives,
        }
    }

    pub fn from_env(service_name: impl Into<String>) -> Self {
        Self::new(service_name, LogFormat::from_env())
    }
}

/// グローバルサブスクライバを登録する
///
/// `ErrorLayer` を含めるため、`InfraError` が生成時点の `SpanTrace` を持てる。
#[cfg(feature = "observability")]
pub fn init_tracing(config: &TracingConfig) {
    use tracing_subscriber::{EnvFilter, Layer as _, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_directives));

    let fmt_layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().pretty().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(tracing_error::ErrorLayer::default())
        .init();
}

/// `TraceLayer::make_span_with` 用のリクエストスパン
///
/// `SetRequestIdLayer` より内側で呼ばれるため、ヘッダーには採番済みの
/// `x-request-id` が入っている。
#[cfg(feature = "observability")]
pub fn make_request_span<B>(request: &http::Request<B>) -> tracing::Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}

/// UUID v7 のリクエスト ID を採番する
///
/// クライアントが `x-request-id` を送ってきた場合は `SetRequestIdLayer` が
/// その値を優先するため、ここは呼ばれない。
#[cfg(feature = "observability")]
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV7;

#[cfg(feature = "observability")]
impl tower_http::request_id::MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(
        &mut self,
        _request: &http::Request<B>,
    ) -> Option<tower_http::request_id::RequestId> {
        let id = uuid::Uuid::now_v7().hyphenated().to_string();
        http::HeaderValue::from_str(&id)
            .ok()
            .map(tower_http::request_id::RequestId::new)
    }
}
