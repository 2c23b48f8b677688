//! # テンプレートストア
//!
//! プロバイダが保持するメールテンプレートの CRUD・存在確認・詳細取得を抽象化する。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `TemplateStore` trait でプロバイダ API を隠蔽する
//! - **SES 実装のみ**: SMTP プロバイダも SES のテンプレートストアを参照する
//! - **ステートレス**: 実装はリクエスト間で安全に共有できる（`Arc<dyn TemplateStore>`）

mod ses;

use async_trait::async_trait;
use notifaction_domain::{TemplateContent, TemplatePage, TemplateStoreError};
pub use ses::SesTemplateStore;

/// 一覧取得の 1 ページあたりの件数
pub const LIST_PAGE_SIZE: i32 = 100;

/// テンプレートストアトレイト
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// テンプレートが存在するか確認する
    async fn exists(&self, name: &str) -> Result<bool, TemplateStoreError>;

    /// テンプレートの本体を取得する
    ///
    /// 存在しない場合は [`TemplateStoreError::NotFound`] を返す。
    async fn detail(&self, name: &str) -> Result<TemplateContent, TemplateStoreError>;

    /// テンプレートを新規作成する
    async fn create(&self, name: &str, content: &TemplateContent) -> Result<(), TemplateStoreError>;

    /// 既存のテンプレートを更新する
    async fn update(&self, name: &str, content: &TemplateContent) -> Result<(), TemplateStoreError>;

    /// テンプレートを削除する
    async fn delete(&self, name: &str) -> Result<(), TemplateStoreError>;

    /// テンプレートを一覧する
    ///
    /// # 引数
    ///
    /// - `next_token`: 前ページの応答に含まれていたトークン。先頭ページは `None`
    async fn list(&self, next_token: Option<&str>) -> Result<TemplatePage, TemplateStoreError>;
}
