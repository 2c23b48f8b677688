//! SES 通知送信実装
//!
//! AWS SES v2 のテンプレート送信 API を使用する。
//! テンプレートデータには通知データを JSON でそのまま渡す。

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_sesv2::{
    Client,
    error::DisplayErrorContext,
    types::{Destination, EmailContent, Template},
};
use notifaction_domain::{Notification, NotificationError};

use super::NotificationSender;
use crate::template_store::TemplateStore;

/// SES 通知送信
pub struct SesNotificationSender {
    client:       Client,
    templates:    Arc<dyn TemplateStore>,
    from_address: String,
}

impl SesNotificationSender {
    /// 新しい SES 送信インスタンスを作成
    ///
    /// # 引数
    ///
    /// - `client`: AWS SES v2 クライアント
    /// - `templates`: テンプレートの存在確認に使うストア
    /// - `from_address`: 送信元メールアドレス（SES で検証済みであること）
    pub fn new(client: Client, templates: Arc<dyn TemplateStore>, from_address: String) -> Self {
        Self {
            client,
            templates,
            from_address,
        }
    }
}

#[async_trait]
impl NotificationSender for SesNotificationSender {
    async fn send(&self, notification: &Notification<'_>) -> Result<String, NotificationError> {
        if notification.send_to.is_empty() {
            return Err(NotificationError::NoRecipients);
        }

        let template_name = notification.template_name();
        let exists = self
            .templates
            .exists(&template_name)
            .await
            .map_err(|e| NotificationError::TemplateStore(e.to_string()))?;
        if !exists {
            return Err(NotificationError::TemplateNotFound(template_name));
        }

        let template_data = serde_json::to_string(notification.data)
            .map_err(|e| NotificationError::SendFailed(format!("invalid template data: {e}")))?;

        let destination = Destination::builder()
            .set_to_addresses(Some(
                notification
                    .recipient_emails()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            ))
            .build();

        let content = EmailContent::builder()
            .template(
                Template::builder()
                    .template_name(&template_name)
                    .template_data(template_data)
                    .build(),
            )
            .build();

        let output = self
            .client
            .send_email()
            .from_email_address(&self.from_address)
            .destination(destination)
            .content(content)
            .send()
            .await
            .map_err(|e| NotificationError::SendFailed(DisplayErrorContext(e).to_string()))?;

        output
            .message_id()
            .map(str::to_string)
            .ok_or_else(|| NotificationError::SendFailed("message id is empty".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use notifaction_domain::{Info, NotificationData, TemplateContent};
    use pretty_assertions::assert_eq;
    use wiremock::{
        Mock,
        MockServer,
        ResponseTemplate,
        matchers::{body_partial_json, method, path},
    };

    use super::*;
    use crate::mock::MockTemplateStore;

    const SEND_EMAIL_PATH: &str = "/v2/email/outbound-emails";

    /// モックサーバーに向けた SES クライアント
    fn client_for(server: &MockServer) -> Client {
        let config = aws_sdk_sesv2::Config::builder()
            .behavior_version(aws_sdk_sesv2::config::BehaviorVersion::latest())
            .region(aws_sdk_sesv2::config::Region::new("ap-northeast-1"))
            .endpoint_url(server.uri())
            .credentials_provider(aws_sdk_sesv2::config::Credentials::new(
                "test", "test", None, None, "test",
            ))
            .build();
        Client::from_conf(config)
    }

    /// `welcome_en` が登録済みのテンプレートストア
    fn templates_with_welcome() -> MockTemplateStore {
        let templates = MockTemplateStore::new();
        templates.insert(
            "welcome_en",
            TemplateContent {
                subject: "Welcome {{TO}}".to_string(),
                html:    String::new(),
                text:    "Hi {{TO}}".to_string(),
            },
        );
        templates
    }

    /// ネットワークに出ない構成の SES クライアント
    fn offline_client() -> Client {
        let config = aws_sdk_sesv2::Config::builder()
            .behavior_version(aws_sdk_sesv2::config::BehaviorVersion::latest())
            .region(aws_sdk_sesv2::config::Region::new("ap-northeast-1"))
            .build();
        Client::from_conf(config)
    }

    fn info(name: &str) -> Info {
        Info {
            sub:    name.to_lowercase(),
            name:   name.to_string(),
            email:  format!("{}@example.com", name.to_lowercase()),
            enable: true,
        }
    }

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SesNotificationSender>();
    }

    #[tokio::test]
    async fn テンプレートが存在しない場合はtemplate_not_foundを返す() {
        let templates = MockTemplateStore::new();
        let sender = SesNotificationSender::new(
            offline_client(),
            Arc::new(templates.clone()),
            "noreply@example.com".to_string(),
        );
        let from = info("Alice");
        let to = info("Bob");
        let data = NotificationData::new();
        let notification = Notification {
            event:   "welcome",
            lang:    "en",
            from:    &from,
            send_to: vec![&to],
            data:    &data,
        };

        let result = sender.send(&notification).await;

        assert!(matches!(
            result,
            Err(NotificationError::TemplateNotFound(name)) if name == "welcome_en"
        ));
        assert_eq!(templates.exists_calls(), vec!["welcome_en".to_string()]);
    }

    #[tokio::test]
    async fn test_テンプレート送信に成功するとmessage_idを返す() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SEND_EMAIL_PATH))
            .and(body_partial_json(serde_json::json!({
                "FromEmailAddress": "noreply@example.com",
                "Destination": { "ToAddresses": ["bob@example.com"] },
                "Content": { "Template": { "TemplateName": "welcome_en" } },
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "MessageId": "0100-abc" })),
            )
            .expect(1)
            .mount(&server)
            .await;
        let sender = SesNotificationSender::new(
            client_for(&server),
            Arc::new(templates_with_welcome()),
            "noreply@example.com".to_string(),
        );
        let from = info("Alice");
        let to = info("Bob");
        let data = NotificationData::from([
            ("FROM".to_string(), "Alice".to_string()),
            ("TO".to_string(), "Bob".to_string()),
        ]);
        let notification = Notification {
            event:   "welcome",
            lang:    "en",
            from:    &from,
            send_to: vec![&to],
            data:    &data,
        };

        let message_id = sender.send(&notification).await.unwrap();

        assert_eq!(message_id, "0100-abc");
    }

    #[tokio::test]
    async fn test_message_idが空の応答はsend_failedになる() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SEND_EMAIL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;
        let sender = SesNotificationSender::new(
            client_for(&server),
            Arc::new(templates_with_welcome()),
            "noreply@example.com".to_string(),
        );
        let from = info("Alice");
        let to = info("Bob");
        let data = NotificationData::new();
        let notification = Notification {
            event:   "welcome",
            lang:    "en",
            from:    &from,
            send_to: vec![&to],
            data:    &data,
        };

        let result = sender.send(&notification).await;

        assert!(matches!(
            result,
            Err(NotificationError::SendFailed(message)) if message == "message id is empty"
        ));
    }

    #[tokio::test]
    async fn test_プロバイダが拒否した場合はsend_failedになる() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SEND_EMAIL_PATH))
            .respond_with(
                ResponseTemplate::new(400)
                    .insert_header("x-amzn-ErrorType", "MessageRejected")
                    .set_body_json(serde_json::json!({ "message": "Email address is not verified" })),
            )
            .mount(&server)
            .await;
        let sender = SesNotificationSender::new(
            client_for(&server),
            Arc::new(templates_with_welcome()),
            "noreply@example.com".to_string(),
        );
        let from = info("Alice");
        let to = info("Bob");
        let data = NotificationData::new();
        let notification = Notification {
            event:   "welcome",
            lang:    "en",
            from:    &from,
            send_to: vec![&to],
            data:    &data,
        };

        let result = sender.send(&notification).await;

        assert!(matches!(result, Err(NotificationError::SendFailed(_))));
    }

    #[tokio::test]
    async fn 受信者がいない場合はno_recipientsを返す() {
        let sender = SesNotificationSender::new(
            offline_client(),
            Arc::new(MockTemplateStore::new()),
            "noreply@example.com".to_string(),
        );
        let from = info("Alice");
        let data = NotificationData::new();
        let notification = Notification {
            event:   "welcome",
            lang:    "en",
            from:    &from,
            send_to: vec![],
            data:    &data,
        };

        let result = sender.send(&notification).await;

        assert!(matches!(result, Err(NotificationError::NoRecipients)));
    }
}
