//! # 送信者ファクトリ
//!
//! 設定されたプロバイダに応じて [`NotificationSender`] を生成する。
//!
//! ## 設計方針
//!
//! - **閉じた選択肢**: プロバイダは [`MailProvider`] の列挙値のみ。未知のタグは設定読み込み時に拒否済み
//! - **起動時に 1 度だけ構築**: 送信者（SMTP のトランスポートを含む）は構築時に生成し、リクエスト間で共有する
//! - **リクエスト単位の報告**: 送信元アドレスや SMTP URL の不備は起動を止めず、リクエストごとの [`ConfigurationError`] になる

use std::sync::Arc;

use notifaction_domain::{ConfigurationError, MailProvider};

use crate::{
    notification::{NotificationSender, SesNotificationSender, SmtpNotificationSender, SmtpSettings},
    template_store::TemplateStore,
};

/// 送信者ファクトリトレイト
pub trait SenderFactory: Send + Sync {
    /// 設定されたプロバイダの送信者を返す
    fn create_sender(&self) -> Result<Arc<dyn NotificationSender>, ConfigurationError>;
}

/// プロバイダ設定に基づく送信者ファクトリ
///
/// 構築時の結果（送信者または設定エラー）を保持し、呼び出しごとに複製して返す。
pub struct MailSenderFactory {
    sender: Result<Arc<dyn NotificationSender>, ConfigurationError>,
}

impl MailSenderFactory {
    /// 新しいファクトリを作成する
    ///
    /// # 引数
    ///
    /// - `provider`: 使用するプロバイダ
    /// - `ses_client`: SES 送信に使うクライアント
    /// - `templates`: 送信時に参照するテンプレートストア
    /// - `from_address`: 送信元アドレス（未設定なら送信時に設定エラー）
    /// - `smtp_url`: SMTP の接続 URL（`provider` が SMTP のときに必須）
    pub fn new(
        provider: MailProvider,
        ses_client: aws_sdk_sesv2::Client,
        templates: Arc<dyn TemplateStore>,
        from_address: Option<String>,
        smtp_url: Option<String>,
    ) -> Self {
        let sender = build_sender(provider, ses_client, templates, from_address, smtp_url);
        if let Err(e) = &sender {
            tracing::warn!(error = %e, %provider, "送信者を構築できません。送信リクエストは失敗します");
        }
        Self { sender }
    }
}

fn build_sender(
    provider: MailProvider,
    ses_client: aws_sdk_sesv2::Client,
    templates: Arc<dyn TemplateStore>,
    from_address: Option<String>,
    smtp_url: Option<String>,
) -> Result<Arc<dyn NotificationSender>, ConfigurationError> {
    let from_address = from_address
        .filter(|from| !from.is_empty())
        .ok_or(ConfigurationError::Missing("AWS_SES_FROM"))?;

    match provider {
        MailProvider::Aws => Ok(Arc::new(SesNotificationSender::new(
            ses_client,
            templates,
            from_address,
        ))),
        MailProvider::Smtp => {
            let url = smtp_url
                .as_deref()
                .ok_or(ConfigurationError::Missing("SMTP_URL"))?;
            let settings = SmtpSettings::parse(url)?;
            Ok(Arc::new(SmtpNotificationSender::new(
                &settings,
                templates,
                from_address,
            )))
        }
    }
}

impl SenderFactory for MailSenderFactory {
    fn create_sender(&self) -> Result<Arc<dyn NotificationSender>, ConfigurationError> {
        self.sender.clone()
    }
}
