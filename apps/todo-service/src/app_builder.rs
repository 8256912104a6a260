//! # アプリケーション構築
//!
//! State を受け取り、ルーターとミドルウェアを組み立てる。
//! `main.rs` はインフラ初期化とサーバー起動に集中する。

use std::{path::Path, sync::Arc};

use axum::{
    Router,
    http::StatusCode,
    routing::{get, put},
};
use todo_shared::observability::{MakeRequestUuidV7, make_request_span};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    config::REQUEST_TIMEOUT,
    handler::{
        HomeState,
        ReadinessState,
        TodoState,
        create_todo,
        delete_todo,
        health_check,
        home,
        list_todos,
        readiness_check,
        update_todo,
    },
};

/// ルーターを構築する
///
/// | Method | Path | Handler |
/// |--------|------|---------|
/// | GET | `/` | [`home`] |
/// | GET | `/static/*` | `ServeDir` |
/// | GET / POST | `/todo/` | [`list_todos`] / [`create_todo`] |
/// | PUT / DELETE | `/todo/{id}` | [`update_todo`] / [`delete_todo`] |
/// | GET | `/health` | [`health_check`] |
/// | GET | `/health/ready` | [`readiness_check`] |
pub fn build_app(
    todo_state: Arc<TodoState>,
    readiness_state: Arc<ReadinessState>,
    home_state: Arc<HomeState>,
    static_dir: &Path,
) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(
            Router::new()
                .route("/health/ready", get(readiness_check))
                .with_state(readiness_state),
        )
        .merge(Router::new().route("/", get(home)).with_state(home_state))
        .merge(
            Router::new()
                .route("/todo/", get(list_todos).post(create_todo))
                .route("/todo/{id}", put(update_todo).delete(delete_todo))
                .with_state(todo_state),
        )
        .nest_service("/static", ServeDir::new(static_dir))
        // レイヤー順序: 下に書いたものが外側
        // 1. SetRequestIdLayer（最外）: UUID v7 を生成（またはクライアント提供値を使用）
        // 2. TraceLayer: request_id を含むスパンで全ログを囲む
        // 3. PropagateRequestIdLayer: レスポンスヘッダーに X-Request-Id をコピー
        // 4. TimeoutLayer: 1 リクエストの処理時間を制限する
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}
