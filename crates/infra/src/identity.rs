//! # Identity サービスクライアント
//!
//! 送信者・受信者のサブジェクト ID から表示名・メールアドレス・言語を解決する。
//!
//! ## 設計方針
//!
//! - **1 回のバッチ取得**: 受信者 ID に送信者 ID を加えた集合を 1 回の GET で取得する
//! - **trait による抽象化**: [`IdentityResolver`] をユースケースに注入し、テストではモックに差し替える
//! - **分類はドメイン層**: 取得したレコードの言語別分類は [`ClassificationLang::classify`] に委ねる
//!
//! ## エンドポイント
//!
//! - `GET {base}/admin/identities?ids=<id>&ids=<id>&page_size=100`
//! - `GET {base}/admin/health/ready`

use std::time::Duration;

use async_trait::async_trait;
use notifaction_domain::{ClassificationLang, ResolvedIdentity};
use serde::Deserialize;
use thiserror::Error;

use crate::error::InfraError;

const IDENTITIES_PATH: &str = "/admin/identities";
const HEALTH_PATH: &str = "/admin/health/ready";
const PAGE_SIZE: &str = "100";

/// 識別情報の解決エラー
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// バッチ取得に失敗（通信・ステータス・デコード）
    #[error("failed to fetch data: {0}")]
    Fetch(#[from] InfraError),

    /// 送信者が応答に含まれない
    #[error("from not found: {0}")]
    SenderNotFound(String),
}

/// 識別情報リゾルバ
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// 送信者と受信者を解決し、受信者を言語別に分類する
    ///
    /// `to` が空の場合は外部呼び出しを行わず `Ok(None)` を返す。
    async fn sub_to_info(
        &self,
        from: &str,
        to: &[String],
    ) -> Result<Option<ClassificationLang>, ResolutionError>;

    /// Identity サービスが利用可能か確認する
    ///
    /// 200 のときだけ `true` を返す。
    async fn is_ready(&self) -> Result<bool, InfraError>;
}

/// Identity サービスのレコード
#[derive(Debug, Deserialize)]
struct IdentityRecord {
    id:     String,
    #[serde(default)]
    state:  String,
    #[serde(default)]
    traits: IdentityTraits,
}

#[derive(Debug, Default, Deserialize)]
struct IdentityTraits {
    #[serde(default)]
    name:     String,
    #[serde(default)]
    email:    String,
    #[serde(default)]
    language: String,
}

impl From<IdentityRecord> for ResolvedIdentity {
    fn from(record: IdentityRecord) -> Self {
        ResolvedIdentity::new(
            record.id,
            record.traits.name,
            record.traits.email,
            &record.state,
            record.traits.language,
        )
    }
}

/// HTTP 経由の Identity リゾルバ
#[derive(Clone)]
pub struct HttpIdentityResolver {
    identities_url: String,
    health_url:     String,
    client:         reqwest::Client,
}

impl HttpIdentityResolver {
    /// 新しいリゾルバを作成する
    ///
    /// # 引数
    ///
    /// - `base_url`: Identity サービスのベース URL（例: `http://kratos-admin:4434`）
    /// - `timeout`: 1 リクエストあたりのタイムアウト
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, InfraError> {
        let base_url = base_url.trim_end_matches('/');
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            identities_url: format!("{base_url}{IDENTITIES_PATH}"),
            health_url: format!("{base_url}{HEALTH_PATH}"),
            client,
        })
    }

    #[tracing::instrument(skip_all, fields(ids = ids.len()))]
    async fn fetch_identities(&self, ids: &[&str]) -> Result<Vec<IdentityRecord>, InfraError> {
        let mut query: Vec<(&str, &str)> = ids.iter().map(|id| ("ids", *id)).collect();
        query.push(("page_size", PAGE_SIZE));

        let response = self
            .client
            .get(&self.identities_url)
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InfraError::unexpected_status(status.as_u16(), body));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl IdentityResolver for HttpIdentityResolver {
    async fn sub_to_info(
        &self,
        from: &str,
        to: &[String],
    ) -> Result<Option<ClassificationLang>, ResolutionError> {
        if to.is_empty() {
            return Ok(None);
        }

        let mut ids: Vec<&str> = to.iter().map(String::as_str).collect();
        ids.push(from);

        let records = self.fetch_identities(&ids).await?;
        tracing::debug!(requested = ids.len(), found = records.len(), "識別情報を取得しました");

        ClassificationLang::classify(from, to, records.into_iter().map(ResolvedIdentity::from))
            .map(Some)
            .ok_or_else(|| ResolutionError::SenderNotFound(from.to_string()))
    }

    async fn is_ready(&self) -> Result<bool, InfraError> {
        let response = self.client.get(&self.health_url).send().await?;
        Ok(response.status() == reqwest::StatusCode::OK)
    }
}
