//! # 通知ディスパッチ
//!
//! 1 件の通知作成リクエストを、受信者ごとのメール送信にファンアウトする。
//!
//! ## 処理の流れ
//!
//! 1. リクエストを検証する（外部呼び出しの前）
//! 2. 送信者ファクトリから Sender を取得する
//! 3. 送信者と受信者を 1 回のバッチで解決し、受信者を言語別に分類する
//! 4. `FROM` と転送ヘッダーをデータに差し込む
//! 5. 言語の発見順、受信者の入力順に 1 通ずつ送信する（2 通目以降は固定間隔で待機）
//! 6. 失敗件数から結果を集約する
//!
//! ## 設計方針
//!
//! - **逐次送信**: 1 リクエスト内の送信は並列化しない
//! - **部分失敗は結果**: 受信者単位の失敗は残りの送信を止めない
//! - **再試行しない**: 各受信者への送信は 1 回だけ試みる

use std::{sync::Arc, time::Duration};

use notifaction_domain::{
    ClassificationLang,
    CreateNotificationRequest,
    Notification,
    NotificationData,
    notification::{FROM_KEY, TO_KEY},
};
use notifaction_infra::{IdentityResolver, NotificationSender, ResolutionError, SenderFactory};
use notifaction_shared::{event_log::event, log_business_event};
use serde::Serialize;

use crate::error::NotificationServiceError;

/// 送信に成功した受信者
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveredNotification {
    pub email:      String,
    pub message_id: String,
    pub lang:       String,
    /// 送信者の表示名
    pub from:       String,
    pub event:      String,
}

/// 送信に失敗した受信者
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedNotification {
    pub error: String,
    pub email: String,
}

/// ディスパッチの集約結果
///
/// 全件失敗は [`NotificationServiceError::AllFailed`] として返すため、ここには含まれない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// 失敗なし
    Delivered(Vec<DeliveredNotification>),
    /// 一部の受信者への送信に失敗
    Partial {
        delivered: Vec<DeliveredNotification>,
        failed:    Vec<FailedNotification>,
    },
}

/// 通知ディスパッチユースケース
pub struct DispatchUseCaseImpl {
    identity:   Arc<dyn IdentityResolver>,
    senders:    Arc<dyn SenderFactory>,
    send_delay: Duration,
}

impl DispatchUseCaseImpl {
    /// # 引数
    ///
    /// - `identity`: 送信者・受信者の解決に使うリゾルバ
    /// - `senders`: リクエストごとに Sender を生成するファクトリ
    /// - `send_delay`: 2 通目以降の送信前に待機する時間
    pub fn new(
        identity: Arc<dyn IdentityResolver>,
        senders: Arc<dyn SenderFactory>,
        send_delay: Duration,
    ) -> Self {
        Self {
            identity,
            senders,
            send_delay,
        }
    }

    /// 通知を受信者ごとに送信し、結果を集約する
    ///
    /// # 引数
    ///
    /// - `request`: 通知作成リクエスト
    /// - `forwarded`: テンプレートデータに追加する転送ヘッダーの値
    #[tracing::instrument(skip_all, fields(event = %request.event, recipients = request.to.len()))]
    pub async fn dispatch(
        &self,
        request: CreateNotificationRequest,
        forwarded: NotificationData,
    ) -> Result<DispatchOutcome, NotificationServiceError> {
        request.validate()?;
        let sender = self.senders.create_sender()?;

        let classification = self
            .identity
            .sub_to_info(&request.from, &request.to)
            .await?
            .ok_or_else(|| ResolutionError::SenderNotFound(request.from.clone()))?;

        let mut data = request.data.unwrap_or_default();
        data.insert(FROM_KEY.to_string(), classification.from().name.clone());
        data.extend(forwarded);

        let (delivered, failed) = self
            .send_all(sender.as_ref(), &request.event, &classification, data)
            .await;

        aggregate(delivered, failed, request.to.len())
    }

    /// 言語グループ順・受信者順に 1 通ずつ送信する
    async fn send_all(
        &self,
        sender: &dyn NotificationSender,
        event: &str,
        classification: &ClassificationLang,
        mut data: NotificationData,
    ) -> (Vec<DeliveredNotification>, Vec<FailedNotification>) {
        let from = classification.from();
        let mut delivered = Vec::new();
        let mut failed = Vec::new();
        let mut attempts = 0usize;

        for (lang, recipients) in classification.groups() {
            for recipient in recipients {
                if attempts > 0 && !self.send_delay.is_zero() {
                    tokio::time::sleep(self.send_delay).await;
                }
                attempts += 1;

                data.insert(TO_KEY.to_string(), recipient.name.clone());
                let notification = Notification {
                    event,
                    lang,
                    from,
                    send_to: vec![recipient],
                    data: &data,
                };

                match sender.send(&notification).await {
                    Ok(message_id) => {
                        log_business_event!(
                            event.category = event::category::NOTIFICATION,
                            event.action = event::action::NOTIFICATION_SENT,
                            event.result = event::result::SUCCESS,
                            notification.event = event,
                            notification.lang = lang,
                            notification.recipient = %recipient.email,
                            notification.message_id = %message_id,
                            "通知メール送信成功"
                        );
                        delivered.push(DeliveredNotification {
                            email: recipient.email.clone(),
                            message_id,
                            lang: lang.to_string(),
                            from: from.name.clone(),
                            event: event.to_string(),
                        });
                    }
                    Err(e) => {
                        log_business_event!(
                            event.category = event::category::NOTIFICATION,
                            event.action = event::action::NOTIFICATION_FAILED,
                            event.result = event::result::FAILURE,
                            notification.event = event,
                            notification.lang = lang,
                            notification.recipient = %recipient.email,
                            error = %e,
                            "通知メール送信失敗"
                        );
                        failed.push(FailedNotification {
                            error: e.to_string(),
                            email: recipient.email.clone(),
                        });
                    }
                }
            }
        }

        (delivered, failed)
    }
}

/// 失敗件数から結果を決める
///
/// 失敗件数がリクエストの受信者数と等しい場合は全件失敗とし、最初のエラーを返す。
fn aggregate(
    delivered: Vec<DeliveredNotification>,
    failed: Vec<FailedNotification>,
    requested: usize,
) -> Result<DispatchOutcome, NotificationServiceError> {
    if failed.is_empty() {
        return Ok(DispatchOutcome::Delivered(delivered));
    }
    if failed.len() == requested {
        let first = failed.into_iter().next().map(|f| f.error).unwrap_or_default();
        return Err(NotificationServiceError::AllFailed(first));
    }
    Ok(DispatchOutcome::Partial { delivered, failed })
}

#[cfg(test)]
mod tests {
    use notifaction_domain::{ConfigurationError, ResolvedIdentity, ValidationError};
    use notifaction_infra::mock::{MockIdentityResolver, MockNotificationSender, MockSenderFactory};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tokio_test::{assert_err, assert_ok};

    use super::*;

    fn identity(sub: &str, name: &str, lang: &str) -> ResolvedIdentity {
        ResolvedIdentity::new(sub, name, format!("{sub}@example.com"), "active", lang)
    }

    /// u0=Alice(en), u1=Bob(en), u2=Carla(fr)
    fn resolver() -> MockIdentityResolver {
        MockIdentityResolver::new(vec![
            identity("u0", "Alice", "en"),
            identity("u1", "Bob", "en"),
            identity("u2", "Carla", "fr"),
        ])
    }

    struct Fixture {
        identity: MockIdentityResolver,
        sender:   MockNotificationSender,
        factory:  MockSenderFactory,
        sut:      DispatchUseCaseImpl,
    }

    fn fixture(identity: MockIdentityResolver) -> Fixture {
        let sender = MockNotificationSender::new();
        let factory = MockSenderFactory::new(sender.clone());
        let sut = DispatchUseCaseImpl::new(
            Arc::new(identity.clone()),
            Arc::new(factory.clone()),
            Duration::ZERO,
        );
        Fixture {
            identity,
            sender,
            factory,
            sut,
        }
    }

    fn request(to: &[&str]) -> CreateNotificationRequest {
        CreateNotificationRequest {
            to:    to.iter().map(|s| s.to_string()).collect(),
            from:  "u0".to_string(),
            event: "welcome".to_string(),
            data:  Some(NotificationData::from([(
                "url".to_string(),
                "https://example.com".to_string(),
            )])),
        }
    }

    #[tokio::test]
    async fn test_言語の発見順に送信しfromとtoを差し込む() {
        let f = fixture(resolver());

        let outcome = f
            .sut
            .dispatch(request(&["u2", "u1"]), NotificationData::new())
            .await
            .unwrap();

        let sent = f.sender.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].template_name, "welcome_en");
        assert_eq!(sent[0].send_to[0].name, "Bob");
        assert_eq!(sent[0].data["FROM"], "Alice");
        assert_eq!(sent[0].data["TO"], "Bob");
        assert_eq!(sent[1].template_name, "welcome_fr");
        assert_eq!(sent[1].data["TO"], "Carla");
        assert_eq!(sent[1].data["url"], "https://example.com");

        let DispatchOutcome::Delivered(delivered) = outcome else {
            panic!("Delivered を期待した");
        };
        assert_eq!(
            delivered[0],
            DeliveredNotification {
                email:      "u1@example.com".to_string(),
                message_id: "msg-1".to_string(),
                lang:       "en".to_string(),
                from:       "Alice".to_string(),
                event:      "welcome".to_string(),
            }
        );
        assert_eq!(delivered[1].email, "u2@example.com");
    }

    #[tokio::test]
    async fn test_転送ヘッダーがデータに含まれる() {
        let f = fixture(resolver());
        let forwarded = NotificationData::from([
            ("X-Tenant".to_string(), "acme".to_string()),
            ("X-Trace".to_string(), "missing header: X-Trace".to_string()),
        ]);

        assert_ok!(f.sut.dispatch(request(&["u1"]), forwarded).await);

        let sent = f.sender.sent();
        assert_eq!(sent[0].data["X-Tenant"], "acme");
        assert_eq!(sent[0].data["X-Trace"], "missing header: X-Trace");
    }

    #[rstest]
    #[case::to(CreateNotificationRequest { to: vec![], ..request(&["u1"]) }, ValidationError::EmptyTo)]
    #[case::from(CreateNotificationRequest { from: String::new(), ..request(&["u1"]) }, ValidationError::EmptyFrom)]
    #[case::event(CreateNotificationRequest { event: String::new(), ..request(&["u1"]) }, ValidationError::EmptyEvent)]
    #[case::data(CreateNotificationRequest { data: None, ..request(&["u1"]) }, ValidationError::MissingData)]
    #[tokio::test]
    async fn test_検証エラーでは外部呼び出しを行わない(
        #[case] req: CreateNotificationRequest,
        #[case] expected: ValidationError,
    ) {
        let f = fixture(resolver());

        let err = f.sut.dispatch(req, NotificationData::new()).await.unwrap_err();

        assert!(matches!(err, NotificationServiceError::Validation(e) if e == expected));
        assert!(f.identity.calls().is_empty());
        assert!(f.sender.sent().is_empty());
    }

    #[tokio::test]
    async fn test_設定エラーでは識別情報を解決しない() {
        let f = fixture(resolver());
        f.factory.fail_with(ConfigurationError::Missing("AWS_SES_FROM"));

        let err = f
            .sut
            .dispatch(request(&["u1"]), NotificationData::new())
            .await
            .unwrap_err();

        assert!(matches!(err, NotificationServiceError::Configuration(_)));
        assert!(f.identity.calls().is_empty());
    }

    #[tokio::test]
    async fn test_送信者が見つからない場合は送信しない() {
        let f = fixture(MockIdentityResolver::new(vec![identity("u1", "Bob", "en")]));

        let err = f
            .sut
            .dispatch(request(&["u1"]), NotificationData::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            NotificationServiceError::Resolution(ResolutionError::SenderNotFound(_))
        ));
        assert!(f.sender.sent().is_empty());
    }

    #[tokio::test]
    async fn test_バッチ取得の失敗は解決エラーになる() {
        let f = fixture(resolver());
        f.identity.fail_fetch("connection refused");

        let result = f.sut.dispatch(request(&["u1"]), NotificationData::new()).await;

        assert!(matches!(
            assert_err!(result),
            NotificationServiceError::Resolution(ResolutionError::Fetch(_))
        ));
    }

    #[tokio::test]
    async fn test_一部失敗はpartialで失敗した受信者のメールを返す() {
        let f = fixture(resolver());
        f.sender.fail_for("u2@example.com");

        let outcome = f
            .sut
            .dispatch(request(&["u1", "u2"]), NotificationData::new())
            .await
            .unwrap();

        let DispatchOutcome::Partial { delivered, failed } = outcome else {
            panic!("Partial を期待した");
        };
        assert_eq!(delivered.len(), 1);
        assert_eq!(
            failed,
            vec![FailedNotification {
                error: "failed to send email: rejected: u2@example.com".to_string(),
                email: "u2@example.com".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_全件失敗は最初のエラーを返す() {
        let f = fixture(resolver());
        f.sender.fail_all("throttled");

        let err = f
            .sut
            .dispatch(request(&["u1", "u2"]), NotificationData::new())
            .await
            .unwrap_err();

        assert!(
            matches!(&err, NotificationServiceError::AllFailed(msg) if msg == "failed to send email: throttled")
        );
        assert_eq!(f.sender.sent().len(), 2, "失敗しても残りの送信は続く");
    }

    #[tokio::test]
    async fn test_応答にない受信者は送信対象から外れる() {
        let f = fixture(resolver());

        let outcome = f
            .sut
            .dispatch(request(&["u1", "ghost"]), NotificationData::new())
            .await
            .unwrap();

        assert_eq!(f.sender.sent().len(), 1);
        assert!(matches!(outcome, DispatchOutcome::Delivered(d) if d.len() == 1));
    }

    #[tokio::test]
    async fn test_見つからない受信者がいると全送信失敗でもpartialになる() {
        let f = fixture(resolver());
        f.sender.fail_all("throttled");

        let outcome = f
            .sut
            .dispatch(request(&["u1", "ghost"]), NotificationData::new())
            .await
            .unwrap();

        assert!(matches!(outcome, DispatchOutcome::Partial { failed, .. } if failed.len() == 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_2通目以降の送信前に待機する() {
        let sender = MockNotificationSender::new();
        let sut = DispatchUseCaseImpl::new(
            Arc::new(resolver()),
            Arc::new(MockSenderFactory::new(sender.clone())),
            Duration::from_millis(10),
        );
        let start = tokio::time::Instant::now();

        assert_ok!(sut.dispatch(request(&["u1", "u2"]), NotificationData::new()).await);

        assert_eq!(sender.sent().len(), 2);
        assert_eq!(start.elapsed(), Duration::from_millis(10));
    }

    #[test]
    fn test_aggregate_失敗なしはdelivered() {
        assert_eq!(
            aggregate(vec![], vec![], 0).unwrap(),
            DispatchOutcome::Delivered(vec![])
        );
    }
}
