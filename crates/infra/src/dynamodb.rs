//! # DynamoDB 接続管理
//!
//! Todo を保存するドキュメントストアとして DynamoDB を使用する。
//!
//! - **ローカル開発**: DynamoDB Local を使用（`-sharedDb -inMemory`）
//! - **テーブル自動作成**: 起動時にテーブルが存在しなければ作成（冪等）
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use todo_infra::dynamodb;
//!
//! async fn setup() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = dynamodb::create_client("http://localhost:18000").await;
//!     dynamodb::ensure_todo_table(&client, "todo").await?;
//!     Ok(())
//! }
//! ```

use std::fmt;

use aws_sdk_dynamodb::{
    Client,
    error::{DisplayErrorContext, ProvideErrorMetadata},
    types::{AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType},
};

use crate::InfraError;

/// ローカル実行時のリージョン（DynamoDB Local は値を検証しない）
const LOCAL_REGION: &str = "ap-northeast-1";

/// 指定エンドポイント向けの DynamoDB クライアントを作成する
///
/// 認証情報は固定のダミー値。接続は最初のリクエスト時に確立される。
pub async fn create_client(endpoint: &str) -> Client {
    let credentials =
        aws_sdk_dynamodb::config::Credentials::new("local", "local", None, None, "todo-service");
    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .endpoint_url(endpoint)
        .region(aws_config::Region::new(LOCAL_REGION))
        .credentials_provider(credentials)
        .load()
        .await;

    Client::new(&sdk_config)
}

/// Todo テーブルを用意する（冪等）
///
/// キースキーマは `id`（S, HASH）のみ。他の属性はスキーマレスで保存する。
/// 複数プロセスが同時に作成しても `ResourceInUseException` は成功扱い。
pub async fn ensure_todo_table(client: &Client, table_name: &str) -> Result<(), InfraError> {
    if table_exists(client, table_name).await? {
        tracing::debug!(table = table_name, "テーブルは既に存在します");
        return Ok(());
    }

    tracing::info!(table = table_name, "テーブルを作成します");
    match create_todo_table(client, table_name).await {
        Ok(()) => {
            tracing::info!(table = table_name, "テーブルを作成しました");
            Ok(())
        }
        Err(err) if err.code() == Some("ResourceInUseException") => {
            tracing::debug!(table = table_name, "テーブルは他のプロセスが作成済みです");
            Ok(())
        }
        Err(err) => Err(sdk_error(format_args!("テーブル '{table_name}' の作成に失敗"), &err)),
    }
}

/// テーブルに到達できるか確認する（Readiness Check 用）
pub async fn check_table(client: &Client, table_name: &str) -> Result<(), InfraError> {
    client
        .describe_table()
        .table_name(table_name)
        .send()
        .await
        .map(|_| ())
        .map_err(|e| sdk_error(format_args!("テーブル '{table_name}' の確認に失敗"), &e))
}

async fn table_exists(client: &Client, table_name: &str) -> Result<bool, InfraError> {
    match client.describe_table().table_name(table_name).send().await {
        Ok(_) => Ok(true),
        Err(err) if err.code() == Some("ResourceNotFoundException") => Ok(false),
        Err(err) => Err(sdk_error(format_args!("テーブル '{table_name}' の確認に失敗"), &err)),
    }
}

async fn create_todo_table(
    client: &Client,
    table_name: &str,
) -> Result<(), aws_sdk_dynamodb::Error> {
    let key = KeySchemaElement::builder()
        .attribute_name("id")
        .key_type(KeyType::Hash)
        .build()?;
    let attribute = AttributeDefinition::builder()
        .attribute_name("id")
        .attribute_type(ScalarAttributeType::S)
        .build()?;

    client
        .create_table()
        .table_name(table_name)
        .key_schema(key)
        .attribute_definitions(attribute)
        .billing_mode(BillingMode::PayPerRequest)
        .send()
        .await?;

    Ok(())
}

/// SDK エラーを原因の連鎖ごと文字列化して `InfraError` にする
pub(crate) fn sdk_error<E>(context: fmt::Arguments<'_>, err: &E) -> InfraError
where
    E: std::error::Error,
{
    InfraError::dynamo_db(format!("{context}: {}", DisplayErrorContext(err)))
}
