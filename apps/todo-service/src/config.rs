//! # Todo Service 設定
//!
//! 環境変数から Todo Service サーバーの設定を読み込む。
//! 全項目にデフォルト値があり、未設定でもローカル開発環境で起動できる。

use std::{env, num::ParseIntError, path::PathBuf, time::Duration};

use thiserror::Error;

/// DynamoDB への接続確認とテーブル準備の制限時間
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// 1 リクエストあたりの処理時間の上限
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
/// シャットダウン時に処理中リクエストの完了を待つ上限
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// 設定読み込みエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TODO_PORT は有効なポート番号である必要があります: {value:?}")]
    InvalidPort {
        value:  String,
        #[source]
        source: ParseIntError,
    },

    #[error("{name} が空です")]
    Empty { name: &'static str },
}

/// Todo Service サーバーの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoConfig {
    /// バインドアドレス
    pub host: String,
    /// ポート番号
    pub port: u16,
    /// DynamoDB エンドポイント
    pub dynamodb_endpoint: String,
    /// Todo を保存するテーブル名
    pub table_name: String,
    /// `/static` にマウントするディレクトリ
    pub static_dir: PathBuf,
}

impl TodoConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// テストではプロセスの環境変数を書き換えずに値を差し込む。
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let or_default = |name: &str, default: &str| {
            lookup(name).unwrap_or_else(|| default.to_string())
        };

        let port_value = or_default("TODO_PORT", "9000");
        let port = port_value
            .trim()
            .parse()
            .map_err(|source| ConfigError::InvalidPort {
                value: port_value,
                source,
            })?;

        let table_name = or_default("TODO_TABLE_NAME", "todo");
        if table_name.trim().is_empty() {
            return Err(ConfigError::Empty {
                name: "TODO_TABLE_NAME",
            });
        }

        Ok(Self {
            host: or_default("TODO_HOST", "0.0.0.0"),
            port,
            dynamodb_endpoint: or_default("DYNAMODB_ENDPOINT", "http://localhost:18000"),
            table_name,
            static_dir: PathBuf::from(or_default("STATIC_DIR", "./static")),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<TodoConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        TodoConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_未設定ならデフォルト値を使う() {
        let config = load(&[]).unwrap();

        assert_eq!(
            config,
            TodoConfig {
                host: "0.0.0.0".to_string(),
                port: 9000,
                dynamodb_endpoint: "http://localhost:18000".to_string(),
                table_name: "todo".to_string(),
                static_dir: PathBuf::from("./static"),
            }
        );
    }

    #[test]
    fn test_環境変数の値で上書きされる() {
        let config = load(&[
            ("TODO_HOST", "127.0.0.1"),
            ("TODO_PORT", "8080"),
            ("DYNAMODB_ENDPOINT", "http://dynamodb:8000"),
            ("TODO_TABLE_NAME", "todos_dev"),
            ("STATIC_DIR", "/srv/static"),
        ])
        .unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.dynamodb_endpoint, "http://dynamodb:8000");
        assert_eq!(config.table_name, "todos_dev");
        assert_eq!(config.static_dir, PathBuf::from("/srv/static"));
    }

    #[test]
    fn test_数値でないポートはエラーになる() {
        let err = load(&[("TODO_PORT", "abc")]).unwrap_err();

        assert!(matches!(err, ConfigError::InvalidPort { ref value, .. } if value == "abc"));
    }

    #[test]
    fn test_範囲外のポートはエラーになる() {
        let err = load(&[("TODO_PORT", "70000")]).unwrap_err();

        assert!(matches!(err, ConfigError::InvalidPort { .. }));
    }

    #[test]
    fn test_空のテーブル名はエラーになる() {
        let err = load(&[("TODO_TABLE_NAME", "  ")]).unwrap_err();

        assert!(matches!(err, ConfigError::Empty { name: "TODO_TABLE_NAME" }));
    }
}
