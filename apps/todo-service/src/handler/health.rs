//! # ヘルスチェックハンドラ
//!
//! - `/health` — Liveness Check（常に `"healthy"` を返す）
//! - `/health/ready` — Readiness Check（Todo テーブルへの到達性を確認）

use std::{collections::HashMap, sync::Arc, time::Duration};

use aws_sdk_dynamodb::Client;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use todo_infra::dynamodb;
use todo_shared::{CheckStatus, HealthResponse, ReadinessResponse, ReadinessStatus};

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Liveness Check エンドポイント
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy(env!("CARGO_PKG_VERSION")))
}

/// Readiness Check 用の State
pub struct ReadinessState {
    pub dynamodb_client: Client,
    pub table_name:      String,
}

/// Readiness Check エンドポイント
///
/// 全チェック OK → 200、1 つでも失敗 → 503。
#[tracing::instrument(skip_all)]
pub async fn readiness_check(State(state): State<Arc<ReadinessState>>) -> impl IntoResponse {
    let dynamodb_status = check_dynamodb(&state.dynamodb_client, &state.table_name).await;

    let checks = HashMap::from([("dynamodb".to_string(), dynamodb_status)]);
    let response = ReadinessResponse::from_checks(checks);
    let http_status = match response.status {
        ReadinessStatus::Ready => StatusCode::OK,
        ReadinessStatus::NotReady => StatusCode::SERVICE_UNAVAILABLE,
    };

    (http_status, Json(response))
}

/// Todo テーブルを DescribeTable で確認する（タイムアウト: 5 秒）
async fn check_dynamodb(client: &Client, table_name: &str) -> CheckStatus {
    match tokio::time::timeout(CHECK_TIMEOUT, dynamodb::check_table(client, table_name)).await {
        Ok(Ok(())) => CheckStatus::Ok,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "readiness check: dynamodb describe_table failed");
            CheckStatus::Error
        }
        Err(_) => {
            tracing::warn!("readiness check: dynamodb check timed out");
            CheckStatus::Error
        }
    }
}
