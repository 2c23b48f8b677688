//! # SES クライアント
//!
//! AWS SES v2 クライアントの生成を行う。
//!
//! 認証情報は SDK 標準のプロバイダチェーン（環境変数、`AWS_SHARED_CREDENTIALS_FILE`、
//! IAM ロール）から解決する。`profile` を指定した場合はそのプロファイルを使用する。

use aws_sdk_sesv2::Client;

/// SES v2 クライアントを作成する
///
/// # 引数
///
/// - `region`: SES のリージョン（例: `ap-northeast-1`）
/// - `profile`: 認証情報ファイルのプロファイル名（`None` でデフォルト）
pub async fn create_client(region: &str, profile: Option<&str>) -> Client {
    let mut config_builder = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(region.to_string()));

    if let Some(profile) = profile {
        config_builder = config_builder.profile_name(profile);
    }

    let config = config_builder.load().await;
    Client::new(&config)
}
