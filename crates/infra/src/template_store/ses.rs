//! SES テンプレートストア実装
//!
//! SES v2 の EmailTemplate API を使用する。

use async_trait::async_trait;
use aws_sdk_sesv2::{
    Client,
    error::{DisplayErrorContext, SdkError},
    operation::get_email_template::GetEmailTemplateError,
    primitives::DateTime as SesDateTime,
    types::EmailTemplateContent,
};
use chrono::{DateTime, Utc};
use notifaction_domain::{
    TemplateContent,
    TemplatePage,
    TemplateStoreError,
    template::TemplateSummary,
};

use super::{LIST_PAGE_SIZE, TemplateStore};

/// SES テンプレートストア
#[derive(Clone)]
pub struct SesTemplateStore {
    client: Client,
}

impl SesTemplateStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn is_not_found<R>(err: &SdkError<GetEmailTemplateError, R>) -> bool {
    err.as_service_error()
        .is_some_and(GetEmailTemplateError::is_not_found_exception)
}

fn provider_error(operation: &str, err: impl std::error::Error) -> TemplateStoreError {
    TemplateStoreError::Provider(format!("{operation}: {}", DisplayErrorContext(err)))
}

/// 空文字列は未設定として扱う
fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn to_sdk_content(content: &TemplateContent) -> EmailTemplateContent {
    EmailTemplateContent::builder()
        .subject(&content.subject)
        .set_html(non_empty(&content.html))
        .set_text(non_empty(&content.text))
        .build()
}

fn from_sdk_content(content: Option<&EmailTemplateContent>) -> TemplateContent {
    let field = |f: fn(&EmailTemplateContent) -> Option<&str>| {
        content.and_then(f).unwrap_or_default().to_string()
    };
    TemplateContent {
        subject: field(EmailTemplateContent::subject),
        html:    field(EmailTemplateContent::html),
        text:    field(EmailTemplateContent::text),
    }
}

fn to_utc(timestamp: &SesDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp.secs(), timestamp.subsec_nanos())
}

#[async_trait]
impl TemplateStore for SesTemplateStore {
    async fn exists(&self, name: &str) -> Result<bool, TemplateStoreError> {
        match self
            .client
            .get_email_template()
            .template_name(name)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) if is_not_found(&err) => Ok(false),
            Err(err) => Err(provider_error("GetEmailTemplate", err)),
        }
    }

    async fn detail(&self, name: &str) -> Result<TemplateContent, TemplateStoreError> {
        let output = match self
            .client
            .get_email_template()
            .template_name(name)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) if is_not_found(&err) => {
                return Err(TemplateStoreError::NotFound(name.to_string()));
            }
            Err(err) => return Err(provider_error("GetEmailTemplate", err)),
        };

        Ok(from_sdk_content(output.template_content()))
    }

    async fn create(&self, name: &str, content: &TemplateContent) -> Result<(), TemplateStoreError> {
        self.client
            .create_email_template()
            .template_name(name)
            .template_content(to_sdk_content(content))
            .send()
            .await
            .map_err(|e| provider_error("CreateEmailTemplate", e))?;
        Ok(())
    }

    async fn update(&self, name: &str, content: &TemplateContent) -> Result<(), TemplateStoreError> {
        self.client
            .update_email_template()
            .template_name(name)
            .template_content(to_sdk_content(content))
            .send()
            .await
            .map_err(|e| provider_error("UpdateEmailTemplate", e))?;
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), TemplateStoreError> {
        self.client
            .delete_email_template()
            .template_name(name)
            .send()
            .await
            .map_err(|e| provider_error("DeleteEmailTemplate", e))?;
        Ok(())
    }

    async fn list(&self, next_token: Option<&str>) -> Result<TemplatePage, TemplateStoreError> {
        let output = self
            .client
            .list_email_templates()
            .page_size(LIST_PAGE_SIZE)
            .set_next_token(next_token.map(str::to_string))
            .send()
            .await
            .map_err(|e| provider_error("ListEmailTemplates", e))?;

        let templates = output
            .templates_metadata()
            .iter()
            .map(|metadata| TemplateSummary {
                name:       metadata.template_name().unwrap_or_default().to_string(),
                created_at: metadata.created_timestamp().and_then(to_utc),
            })
            .collect();

        Ok(TemplatePage {
            next_token: output.next_token().map(str::to_string),
            templates,
        })
    }
}
