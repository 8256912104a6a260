//! # サーバーライフサイクル
//!
//! ```text
//! serving ──(シグナル受信)──▶ draining ──(完了 or 期限切れ)──▶ closed
//! ```
//!
//! draining では新規接続の受け付けを止め、処理中のリクエストの完了を
//! `drain_timeout` まで待つ。期限を過ぎたらサーバータスクを中断する。

use std::{future::Future, time::Duration};

use axum::Router;
use thiserror::Error;
use tokio::{net::TcpListener, sync::oneshot, task::JoinError};

/// シャットダウンの結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// 処理中のリクエストが全て完了した
    Drained,
    /// 期限内に完了せず、サーバータスクを中断した
    TimedOut,
}

/// サーバー実行中のエラー
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("HTTP サーバーが異常終了しました: {0}")]
    Serve(#[from] std::io::Error),

    #[error("HTTP サーバータスクが失敗しました: {0}")]
    Task(#[from] JoinError),
}

/// `shutdown` が完了するまでリクエストを処理し、その後ドレインする
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: impl Future<Output = ()> + Send,
    drain_timeout: Duration,
) -> Result<ShutdownOutcome, ServerError> {
    let (drain_tx, drain_rx) = oneshot::channel::<()>();

    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                // 送信側が drop された場合もドレインに入る
                let _ = drain_rx.await;
            })
            .await
    });

    tokio::select! {
        result = &mut server => {
            // シグナルを待たずに停止した
            result??;
            return Ok(ShutdownOutcome::Drained);
        }
        () = shutdown => {}
    }

    tracing::info!(
        drain_timeout_secs = drain_timeout.as_secs(),
        "処理中のリクエストの完了を待ちます"
    );
    let _ = drain_tx.send(());

    match tokio::time::timeout(drain_timeout, &mut server).await {
        Ok(result) => {
            result??;
            Ok(ShutdownOutcome::Drained)
        }
        Err(_) => {
            server.abort();
            Ok(ShutdownOutcome::TimedOut)
        }
    }
}

/// 終了シグナル（SIGINT / SIGTERM / SIGHUP / SIGQUIT）を待つ
///
/// 受信したシグナル名を返す。
pub async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(e) => {
                tracing::error!(error = %e, "SIGINT ハンドラの登録に失敗しました");
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let other = async {
        use tokio::signal::unix::{SignalKind, signal};

        let (Ok(mut terminate), Ok(mut hangup), Ok(mut quit)) = (
            signal(SignalKind::terminate()),
            signal(SignalKind::hangup()),
            signal(SignalKind::quit()),
        ) else {
            tracing::error!("シグナルハンドラの登録に失敗しました");
            return std::future::pending().await;
        };

        tokio::select! {
            _ = terminate.recv() => "SIGTERM",
            _ = hangup.recv() => "SIGHUP",
            _ = quit.recv() => "SIGQUIT",
        }
    };

    #[cfg(not(unix))]
    let other = std::future::pending::<&'static str>();

    tokio::select! {
        name = ctrl_c => name,
        name = other => name,
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::routing::get;
    use pretty_assertions::assert_eq;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpStream,
    };

    use super::*;

    /// HTTP/1.1 で GET を送り、レスポンス全体を文字列で返す
    async fn http_get(addr: SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_serveはシグナル後にドレインして終了する() {
        // Given
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route("/ping", get(|| async { "pong" }));
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(serve(
            listener,
            app,
            async move {
                let _ = shutdown_rx.await;
            },
            Duration::from_secs(5),
        ));

        // When
        let response = http_get(addr, "/ping").await;
        shutdown_tx.send(()).unwrap();
        let outcome = server.await.unwrap().unwrap();

        // Then
        assert!(response.starts_with("HTTP/1.1 200"), "{response}");
        assert!(response.ends_with("pong"), "{response}");
        assert_eq!(outcome, ShutdownOutcome::Drained);
    }

    #[tokio::test]
    async fn test_serveは処理中のリクエストが期限内に終わらなければtimed_outを返す() {
        // Given: ハンドラに入ったことを通知し、そのまま長時間待つルート
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (entered_tx, mut entered_rx) = tokio::sync::mpsc::channel::<()>(1);
        let app = Router::new().route(
            "/slow",
            get(move || {
                let entered_tx = entered_tx.clone();
                async move {
                    let _ = entered_tx.send(()).await;
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    "done"
                }
            }),
        );
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(serve(
            listener,
            app,
            async move {
                let _ = shutdown_rx.await;
            },
            Duration::from_millis(100),
        ));

        // When
        let _client = tokio::spawn(async move { http_get(addr, "/slow").await });
        entered_rx.recv().await.unwrap();
        shutdown_tx.send(()).unwrap();
        let outcome = server.await.unwrap().unwrap();

        // Then
        assert_eq!(outcome, ShutdownOutcome::TimedOut);
    }
}
