//! # Notification Service 設定
//!
//! 環境変数から起動時に一度だけ読み込み、以降は読み取り専用で共有する。

use std::{env, time::Duration};

use notifaction_domain::{ConfigurationError, MailProvider};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 9080;
const DEFAULT_IDENTITY_TIMEOUT_SECS: u64 = 5;
const DEFAULT_SES_REGION: &str = "ap-northeast-1";
const DEFAULT_SEND_DELAY_MICROS: u64 = 200;

/// Notification Service の設定
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// バインドアドレス
    pub host:             String,
    /// ポート番号
    pub port:             u16,
    /// Identity サービスの接続設定
    pub identity:         IdentityConfig,
    /// メール送信の設定
    pub mail:             MailConfig,
    /// テンプレートデータに転送するリクエストヘッダー名
    pub header_to_data:   Vec<String>,
    /// 送信間隔（2 通目以降の送信前に待機する）
    pub send_delay:       Duration,
    /// テスト用エコーエンドポイントを公開するか
    pub api_test_enabled: bool,
}

/// Identity サービスの接続設定
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// ベース URL
    pub url:     String,
    /// 1 リクエストあたりのタイムアウト
    pub timeout: Duration,
}

/// メール送信の設定
///
/// `from_address` と `smtp_url` の欠落は起動時には拒否せず、送信時の設定エラーとして扱う。
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub provider:     MailProvider,
    pub ses_region:   String,
    pub aws_profile:  Option<String>,
    pub from_address: Option<String>,
    pub smtp_url:     Option<String>,
}

impl AppConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意の取得関数から設定を読み込む
    ///
    /// 空文字列は未設定として扱う。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigurationError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let identity_url = get("IDENTITY_URL").ok_or(ConfigurationError::Missing("IDENTITY_URL"))?;
        let provider = match get("MAIL_PROVIDER") {
            Some(tag) => MailProvider::parse(tag.trim())?,
            None => MailProvider::default(),
        };

        Ok(Self {
            host:             get("NOTIFICATION_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port:             parse_or("NOTIFICATION_PORT", get("NOTIFICATION_PORT"), DEFAULT_PORT)?,
            identity:         IdentityConfig {
                url:     identity_url,
                timeout: Duration::from_secs(parse_or(
                    "IDENTITY_TIMEOUT_SECS",
                    get("IDENTITY_TIMEOUT_SECS"),
                    DEFAULT_IDENTITY_TIMEOUT_SECS,
                )?),
            },
            mail:             MailConfig {
                provider,
                ses_region: get("AWS_SES_REGION").unwrap_or_else(|| DEFAULT_SES_REGION.to_string()),
                aws_profile: get("AWS_PROFILE"),
                from_address: get("AWS_SES_FROM"),
                smtp_url: get("SMTP_URL"),
            },
            header_to_data:   get("NOTIFICATION_HEADER_TO_DATA")
                .map(|raw| parse_header_list(&raw))
                .unwrap_or_default(),
            send_delay:       Duration::from_micros(parse_or(
                "NOTIFICATION_SEND_DELAY_MICROS",
                get("NOTIFICATION_SEND_DELAY_MICROS"),
                DEFAULT_SEND_DELAY_MICROS,
            )?),
            api_test_enabled: parse_or("API_TEST_ENABLED", get("API_TEST_ENABLED"), false)?,
        })
    }
}

/// カンマ区切りのヘッダー名を分割する（前後の空白と空要素は除く）
fn parse_header_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_or<T>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigurationError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigurationError::Invalid {
                key,
                reason: format!("{raw:?}: {e}"),
            }),
        None => Ok(default),
    }
}
