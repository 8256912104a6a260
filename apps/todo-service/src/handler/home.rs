//! # ランディングページ
//!
//! `GET /` で Todo アプリの HTML を返す。業務ロジックは持たず、
//! ブラウザ側のスクリプトが `/todo/` API を呼び出す。
//!
//! テンプレートは `include_str!` でバイナリに埋め込む。

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tera::{Context, Tera};
use todo_shared::ErrorResponse;

const INDEX_TEMPLATE: &str = "index.html";

/// ページレンダラー
pub struct PageRenderer {
    engine: Tera,
}

impl PageRenderer {
    /// 埋め込みテンプレートを登録したレンダラーを作成する
    pub fn new() -> Result<Self, tera::Error> {
        let mut engine = Tera::default();
        engine.add_raw_template(INDEX_TEMPLATE, include_str!("../../templates/index.html"))?;
        Ok(Self { engine })
    }

    /// ランディングページを描画する
    pub fn render_index(&self) -> Result<String, tera::Error> {
        let mut context = Context::new();
        context.insert("version", env!("CARGO_PKG_VERSION"));
        context.insert("api_base", "/todo/");
        self.engine.render(INDEX_TEMPLATE, &context)
    }
}

/// ランディングページ用の State
pub struct HomeState {
    pub renderer: PageRenderer,
}

/// GET /
#[tracing::instrument(skip_all)]
pub async fn home(State(state): State<Arc<HomeState>>) -> Response {
    match state.renderer.render_index() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "ランディングページの描画に失敗しました");
            let body = ErrorResponse::new("could not render page").with_error(e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}
