//! # テスト用モック
//!
//! ユースケース・ハンドラのテストで使用するインメモリモック。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! notifaction-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::{
    collections::{BTreeMap, HashSet},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use notifaction_domain::{
    ClassificationLang,
    ConfigurationError,
    Info,
    Notification,
    NotificationData,
    NotificationError,
    ResolvedIdentity,
    TemplateContent,
    TemplatePage,
    TemplateStoreError,
    template::TemplateSummary,
};

use crate::{
    error::InfraError,
    identity::{IdentityResolver, ResolutionError},
    notification::NotificationSender,
    sender_factory::SenderFactory,
    template_store::TemplateStore,
};

// ===== MockIdentityResolver =====

/// `sub_to_info` の呼び出し記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubToInfoCall {
    pub from: String,
    pub to:   Vec<String>,
}

#[derive(Clone)]
pub struct MockIdentityResolver {
    identities:  Arc<Mutex<Vec<ResolvedIdentity>>>,
    fetch_error: Arc<Mutex<Option<String>>>,
    ready:       Arc<Mutex<Result<bool, String>>>,
    calls:       Arc<Mutex<Vec<SubToInfoCall>>>,
    probes:      Arc<Mutex<usize>>,
}

impl Default for MockIdentityResolver {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl MockIdentityResolver {
    /// 指定したレコードを返すリゾルバを作成する（レコードの順序が応答順になる）
    pub fn new(identities: Vec<ResolvedIdentity>) -> Self {
        Self {
            identities:  Arc::new(Mutex::new(identities)),
            fetch_error: Arc::new(Mutex::new(None)),
            ready:       Arc::new(Mutex::new(Ok(true))),
            calls:       Arc::new(Mutex::new(Vec::new())),
            probes:      Arc::new(Mutex::new(0)),
        }
    }

    /// バッチ取得を失敗させる
    pub fn fail_fetch(&self, message: impl Into<String>) {
        *self.fetch_error.lock().unwrap() = Some(message.into());
    }

    /// readiness probe の結果を設定する
    pub fn set_ready(&self, ready: Result<bool, String>) {
        *self.ready.lock().unwrap() = ready;
    }

    pub fn calls(&self) -> Vec<SubToInfoCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn ready_probes(&self) -> usize {
        *self.probes.lock().unwrap()
    }
}

#[async_trait]
impl IdentityResolver for MockIdentityResolver {
    async fn sub_to_info(
        &self,
        from: &str,
        to: &[String],
    ) -> Result<Option<ClassificationLang>, ResolutionError> {
        if to.is_empty() {
            return Ok(None);
        }
        self.calls.lock().unwrap().push(SubToInfoCall {
            from: from.to_string(),
            to:   to.to_vec(),
        });
        if let Some(message) = self.fetch_error.lock().unwrap().clone() {
            return Err(ResolutionError::Fetch(InfraError::unexpected(message)));
        }
        let identities = self.identities.lock().unwrap().clone();
        ClassificationLang::classify(from, to, identities)
            .map(Some)
            .ok_or_else(|| ResolutionError::SenderNotFound(from.to_string()))
    }

    async fn is_ready(&self) -> Result<bool, InfraError> {
        *self.probes.lock().unwrap() += 1;
        self.ready
            .lock()
            .unwrap()
            .clone()
            .map_err(InfraError::unexpected)
    }
}

// ===== MockNotificationSender =====

/// 送信された通知の記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub template_name: String,
    pub from:          Info,
    pub send_to:       Vec<Info>,
    pub data:          NotificationData,
}

#[derive(Clone, Default)]
pub struct MockNotificationSender {
    sent:           Arc<Mutex<Vec<SentNotification>>>,
    failing_emails: Arc<Mutex<HashSet<String>>>,
    fail_all:       Arc<Mutex<Option<String>>>,
}

impl MockNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定アドレス宛の送信を失敗させる
    pub fn fail_for(&self, email: impl Into<String>) {
        self.failing_emails.lock().unwrap().insert(email.into());
    }

    /// すべての送信を失敗させる
    pub fn fail_all(&self, message: impl Into<String>) {
        *self.fail_all.lock().unwrap() = Some(message.into());
    }

    /// 送信を試みた通知（失敗分を含む）
    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send(&self, notification: &Notification<'_>) -> Result<String, NotificationError> {
        let attempt = {
            let mut sent = self.sent.lock().unwrap();
            sent.push(SentNotification {
                template_name: notification.template_name(),
                from:          notification.from.clone(),
                send_to:       notification.send_to.iter().map(|i| (*i).clone()).collect(),
                data:          notification.data.clone(),
            });
            sent.len()
        };

        if let Some(message) = self.fail_all.lock().unwrap().clone() {
            return Err(NotificationError::SendFailed(message));
        }
        let failing = self.failing_emails.lock().unwrap();
        if let Some(email) = notification
            .recipient_emails()
            .into_iter()
            .find(|email| failing.contains(*email))
        {
            return Err(NotificationError::SendFailed(format!("rejected: {email}")));
        }

        Ok(format!("msg-{attempt}"))
    }
}

// ===== MockTemplateStore =====

#[derive(Clone, Default)]
pub struct MockTemplateStore {
    templates:    Arc<Mutex<BTreeMap<String, TemplateContent>>>,
    exists_calls: Arc<Mutex<Vec<String>>>,
    list_error:   Arc<Mutex<Option<String>>>,
}

impl MockTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, name: impl Into<String>, content: TemplateContent) {
        self.templates.lock().unwrap().insert(name.into(), content);
    }

    pub fn get(&self, name: &str) -> Option<TemplateContent> {
        self.templates.lock().unwrap().get(name).cloned()
    }

    /// `exists` に渡されたテンプレート名
    pub fn exists_calls(&self) -> Vec<String> {
        self.exists_calls.lock().unwrap().clone()
    }

    /// `list` を失敗させる（`None` で解除）
    pub fn set_list_error(&self, message: Option<String>) {
        *self.list_error.lock().unwrap() = message;
    }
}

#[async_trait]
impl TemplateStore for MockTemplateStore {
    async fn exists(&self, name: &str) -> Result<bool, TemplateStoreError> {
        self.exists_calls.lock().unwrap().push(name.to_string());
        Ok(self.templates.lock().unwrap().contains_key(name))
    }

    async fn detail(&self, name: &str) -> Result<TemplateContent, TemplateStoreError> {
        self.get(name)
            .ok_or_else(|| TemplateStoreError::NotFound(name.to_string()))
    }

    async fn create(&self, name: &str, content: &TemplateContent) -> Result<(), TemplateStoreError> {
        let mut templates = self.templates.lock().unwrap();
        if templates.contains_key(name) {
            return Err(TemplateStoreError::Provider(format!(
                "template already exists: {name}"
            )));
        }
        templates.insert(name.to_string(), content.clone());
        Ok(())
    }

    async fn update(&self, name: &str, content: &TemplateContent) -> Result<(), TemplateStoreError> {
        let mut templates = self.templates.lock().unwrap();
        let Some(existing) = templates.get_mut(name) else {
            return Err(TemplateStoreError::NotFound(name.to_string()));
        };
        *existing = content.clone();
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), TemplateStoreError> {
        self.templates
            .lock()
            .unwrap()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| TemplateStoreError::NotFound(name.to_string()))
    }

    async fn list(&self, _next_token: Option<&str>) -> Result<TemplatePage, TemplateStoreError> {
        if let Some(message) = self.list_error.lock().unwrap().clone() {
            return Err(TemplateStoreError::Provider(message));
        }
        let templates = self
            .templates
            .lock()
            .unwrap()
            .keys()
            .map(|name| TemplateSummary {
                name:       name.clone(),
                created_at: None,
            })
            .collect();
        Ok(TemplatePage {
            next_token: None,
            templates,
        })
    }
}

// ===== MockSenderFactory =====

#[derive(Clone)]
pub struct MockSenderFactory {
    sender: MockNotificationSender,
    error:  Arc<Mutex<Option<ConfigurationError>>>,
}

impl MockSenderFactory {
    pub fn new(sender: MockNotificationSender) -> Self {
        Self {
            sender,
            error: Arc::new(Mutex::new(None)),
        }
    }

    /// 送信者の生成を設定エラーで失敗させる
    pub fn fail_with(&self, error: ConfigurationError) {
        *self.error.lock().unwrap() = Some(error);
    }
}

impl SenderFactory for MockSenderFactory {
    fn create_sender(&self) -> Result<Arc<dyn NotificationSender>, ConfigurationError> {
        if let Some(error) = self.error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(Arc::new(self.sender.clone()))
    }
}
