//! # メールプロバイダ
//!
//! 送信に使うプロバイダを閉じた列挙型で表す。
//! 未知のタグは構築時に [`ConfigurationError`] として拒否する。

use std::str::FromStr;

use strum::{Display, EnumString, IntoStaticStr};
use thiserror::Error;

/// 設定エラー
///
/// オペレータの設定ミスを表す。リクエスト単位では 500 として報告する。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// 未知のプロバイダタグ
    #[error("invalid mail provider: {0}")]
    UnknownProvider(String),

    /// 必須設定が未設定
    #[error("{0} is not configured")]
    Missing(&'static str),

    /// 設定値が不正
    #[error("invalid {key}: {reason}")]
    Invalid {
        key:    &'static str,
        reason: String,
    },
}

/// メールプロバイダ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum MailProvider {
    /// AWS SES v2 API
    #[default]
    Aws,
    /// SMTP サーバー（テンプレートは SES のテンプレートストアを参照する）
    Smtp,
}

impl MailProvider {
    /// タグからプロバイダを決定する
    pub fn parse(tag: &str) -> Result<Self, ConfigurationError> {
        Self::from_str(tag).map_err(|_| ConfigurationError::UnknownProvider(tag.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("aws", MailProvider::Aws)]
    #[case("smtp", MailProvider::Smtp)]
    fn test_既知のタグをパースする(#[case] tag: &str, #[case] expected: MailProvider) {
        assert_eq!(MailProvider::parse(tag), Ok(expected));
    }

    #[rstest]
    #[case("sendgrid")]
    #[case("")]
    #[case("AWS")]
    fn test_未知のタグはconfiguration_errorになる(#[case] tag: &str) {
        assert_eq!(
            MailProvider::parse(tag),
            Err(ConfigurationError::UnknownProvider(tag.to_string()))
        );
    }

    #[test]
    fn test_displayは小文字のタグを返す() {
        assert_eq!(MailProvider::Smtp.to_string(), "smtp");
    }
}
