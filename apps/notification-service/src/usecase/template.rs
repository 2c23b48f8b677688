//! テンプレート管理ユースケース

use std::sync::Arc;

use notifaction_domain::{ApplyOutcome, TemplateContent, TemplateInput, TemplatePage};
use notifaction_infra::TemplateStore;
use notifaction_shared::{event_log::event, log_business_event};
use serde::Serialize;

use crate::error::NotificationServiceError;

/// テンプレート適用の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedTemplate {
    pub name:      String,
    pub operation: ApplyOutcome,
}

/// テンプレート管理ユースケース
pub struct TemplateUseCaseImpl {
    templates: Arc<dyn TemplateStore>,
}

impl TemplateUseCaseImpl {
    pub fn new(templates: Arc<dyn TemplateStore>) -> Self {
        Self { templates }
    }

    /// テンプレートを登録する
    ///
    /// 1. 入力を検証
    /// 2. `event_lang` が存在すれば更新、なければ作成
    pub async fn apply(&self, input: TemplateInput) -> Result<AppliedTemplate, NotificationServiceError> {
        input.validate()?;

        let name = input.name();
        let content = input.content();
        let operation = if self.templates.exists(&name).await? {
            self.templates.update(&name, &content).await?;
            ApplyOutcome::Updated
        } else {
            self.templates.create(&name, &content).await?;
            ApplyOutcome::Created
        };

        let action = match operation {
            ApplyOutcome::Created => event::action::TEMPLATE_CREATED,
            ApplyOutcome::Updated => event::action::TEMPLATE_UPDATED,
        };
        log_business_event!(
            event.category = event::category::TEMPLATE,
            event.action = action,
            event.result = event::result::SUCCESS,
            template.name = %name,
            "テンプレートを適用しました"
        );

        Ok(AppliedTemplate { name, operation })
    }

    /// テンプレートを一覧する
    pub async fn list(&self, next_token: Option<&str>) -> Result<TemplatePage, NotificationServiceError> {
        Ok(self.templates.list(next_token).await?)
    }

    /// テンプレートの本体を取得する
    pub async fn detail(&self, name: &str) -> Result<TemplateContent, NotificationServiceError> {
        Ok(self.templates.detail(name).await?)
    }

    /// テンプレートを削除する
    ///
    /// 存在しない場合は削除を試みずに [`NotificationServiceError::TemplateNotFound`] を返す。
    pub async fn delete(&self, name: &str) -> Result<(), NotificationServiceError> {
        if !self.templates.exists(name).await? {
            return Err(NotificationServiceError::TemplateNotFound(name.to_string()));
        }
        self.templates.delete(name).await?;

        log_business_event!(
            event.category = event::category::TEMPLATE,
            event.action = event::action::TEMPLATE_DELETED,
            event.result = event::result::SUCCESS,
            template.name = %name,
            "テンプレートを削除しました"
        );
        Ok(())
    }
}
