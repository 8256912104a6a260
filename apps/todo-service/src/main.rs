//! # Todo Service サーバー
//!
//! Todo の CRUD API とランディングページを提供する HTTP サーバー。
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `TODO_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `TODO_PORT` | No | ポート番号（デフォルト: `9000`） |
//! | `DYNAMODB_ENDPOINT` | No | DynamoDB エンドポイント（デフォルト: `http://localhost:18000`） |
//! | `TODO_TABLE_NAME` | No | テーブル名（デフォルト: `todo`） |
//! | `STATIC_DIR` | No | `/static` に公開するディレクトリ（デフォルト: `./static`） |
//! | `LOG_FORMAT` | No | `json` / `pretty`（デフォルト: `pretty`） |
//!
//! ## 起動方法
//!
//! ```bash
//! docker run -p 18000:8000 amazon/dynamodb-local -jar DynamoDBLocal.jar -sharedDb -inMemory
//! cargo run -p todo-service
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use todo_domain::clock::SystemClock;
use todo_infra::{dynamodb, repository::DynamoDbTodoRepository};
use todo_service::{
    app_builder::build_app,
    config::{CONNECT_TIMEOUT, SHUTDOWN_TIMEOUT, TodoConfig},
    handler::{HomeState, PageRenderer, ReadinessState, TodoState},
    server::{self, ShutdownOutcome},
};
use todo_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

/// Todo Service サーバーのエントリーポイント
///
/// 以下の順序で初期化を行う:
///
/// 1. 環境変数の読み込み（.env ファイル）
/// 2. トレーシングの初期化
/// 3. アプリケーション設定の読み込み
/// 4. DynamoDB クライアントの作成とテーブルの準備
/// 5. ルーターの構築
/// 6. HTTP サーバーの起動とシャットダウン待ち
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    let tracing_config = TracingConfig::from_env("todo-service");
    init_tracing(&tracing_config);
    let _tracing_guard =
        tracing::info_span!("app", service = %tracing_config.service_name).entered();

    let config = TodoConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        "Todo Service サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    let dynamodb_client = dynamodb::create_client(&config.dynamodb_endpoint).await;
    tokio::time::timeout(
        CONNECT_TIMEOUT,
        dynamodb::ensure_todo_table(&dynamodb_client, &config.table_name),
    )
    .await
    .context("DynamoDB への接続がタイムアウトしました")?
    .context("DynamoDB テーブルのセットアップに失敗しました")?;
    tracing::info!(table = %config.table_name, "DynamoDB に接続しました");

    let todo_state = Arc::new(TodoState {
        repository: Arc::new(DynamoDbTodoRepository::new(
            dynamodb_client.clone(),
            config.table_name.clone(),
        )),
        clock:      Arc::new(SystemClock),
    });
    let readiness_state = Arc::new(ReadinessState {
        dynamodb_client: dynamodb_client.clone(),
        table_name:      config.table_name.clone(),
    });
    let home_state = Arc::new(HomeState {
        renderer: PageRenderer::new().context("テンプレートの読み込みに失敗しました")?,
    });

    let app = build_app(todo_state, readiness_state, home_state, &config.static_dir);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("不正なバインドアドレスです: {}:{}", config.host, config.port))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("{addr} へのバインドに失敗しました"))?;
    tracing::info!("Todo Service サーバーが起動しました: {}", addr);

    let shutdown = async {
        let signal = server::shutdown_signal().await;
        tracing::info!(signal, "終了シグナルを受信しました");
    };

    let outcome = server::serve(listener, app, shutdown, SHUTDOWN_TIMEOUT).await?;

    // ルーターが保持していたクライアントはサーバータスクと共に破棄済み
    drop(dynamodb_client);
    tracing::info!("DynamoDB クライアントを閉じました");

    match outcome {
        ShutdownOutcome::Drained => {
            tracing::info!("サーバーを正常に停止しました");
            Ok(())
        }
        ShutdownOutcome::TimedOut => {
            anyhow::bail!(
                "{} 秒以内に処理中のリクエストが完了しませんでした",
                SHUTDOWN_TIMEOUT.as_secs()
            )
        }
    }
}
