//! # テスト用モック実装
//!
//! ユースケーステストで使用するインメモリモックリポジトリとモックトランスポート。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! recut-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use recut_domain::{
   damage_request::{DamageRequest, DamageRequestId, RequestStatus},
   notification::{EmailContent, EmailRecipients, NotificationError, NotificationSettings},
};

use crate::{
   error::InfraError,
   notification::{HostedApiSender, NotificationTransport},
   repository::{DamageRequestRepository, NotificationSettingsRepository},
};

// ===== MockDamageRequestRepository =====

/// インメモリのリカット依頼リポジトリ
///
/// `set_fail_writes(true)` で書き込み操作を失敗させ、
/// 永続化エラーがユースケースから呼び出し元へ伝播することを検証できる。
#[derive(Clone, Default)]
pub struct MockDamageRequestRepository {
   requests:    Arc<Mutex<Vec<DamageRequest>>>,
   fail_writes: Arc<Mutex<bool>>,
}

impl MockDamageRequestRepository {
   pub fn new() -> Self {
      Self::default()
   }

   /// 保存されている依頼のスナップショットを取得する
   pub fn requests(&self) -> Vec<DamageRequest> {
      self.requests.lock().unwrap().clone()
   }

   /// 依頼を直接投入する（テストの前提データ用）
   pub fn add_request(&self, request: DamageRequest) {
      self.requests.lock().unwrap().push(request);
   }

   /// 書き込み操作を失敗させるかを設定する
   pub fn set_fail_writes(&self, fail: bool) {
      *self.fail_writes.lock().unwrap() = fail;
   }

   fn check_writes(&self) -> Result<(), InfraError> {
      if *self.fail_writes.lock().unwrap() {
         return Err(InfraError::unexpected("モックによる書き込み失敗"));
      }
      Ok(())
   }
}

#[async_trait]
impl DamageRequestRepository for MockDamageRequestRepository {
   async fn insert(&self, request: &DamageRequest) -> Result<(), InfraError> {
      self.check_writes()?;
      self.requests.lock().unwrap().push(request.clone());
      Ok(())
   }

   async fn find_by_id(&self, id: &DamageRequestId) -> Result<Option<DamageRequest>, InfraError> {
      Ok(self
         .requests
         .lock()
         .unwrap()
         .iter()
         .find(|r| r.id() == id)
         .cloned())
   }

   async fn find_all(&self) -> Result<Vec<DamageRequest>, InfraError> {
      let mut requests = self.requests.lock().unwrap().clone();
      // 本実装と同じく新しい順
      requests.sort_by(|a, b| b.submitted_at().cmp(&a.submitted_at()));
      Ok(requests)
   }

   async fn update_status(
      &self,
      id: &DamageRequestId,
      status: RequestStatus,
      updated_at: DateTime<Utc>,
   ) -> Result<(), InfraError> {
      self.check_writes()?;
      let mut requests = self.requests.lock().unwrap();
      if let Some(pos) = requests.iter().position(|r| r.id() == id) {
         let updated = requests[pos].clone().with_status(status, updated_at);
         requests[pos] = updated;
      }
      // 該当行がない場合も成功（本実装の UPDATE と同じ）
      Ok(())
   }

   async fn delete(&self, id: &DamageRequestId) -> Result<(), InfraError> {
      self.check_writes()?;
      self.requests.lock().unwrap().retain(|r| r.id() != id);
      Ok(())
   }
}

// ===== MockNotificationSettingsRepository =====

/// インメモリの通知設定リポジトリ
#[derive(Clone, Default)]
pub struct MockNotificationSettingsRepository {
   settings: Arc<Mutex<Option<NotificationSettings>>>,
}

impl MockNotificationSettingsRepository {
   pub fn new() -> Self {
      Self::default()
   }

   /// 設定を投入する
   pub fn set_settings(&self, settings: NotificationSettings) {
      *self.settings.lock().unwrap() = Some(settings);
   }
}

#[async_trait]
impl NotificationSettingsRepository for MockNotificationSettingsRepository {
   async fn find(&self) -> Result<Option<NotificationSettings>, InfraError> {
      Ok(self.settings.lock().unwrap().clone())
   }

   async fn save(&self, settings: &NotificationSettings) -> Result<(), InfraError> {
      *self.settings.lock().unwrap() = Some(settings.clone());
      Ok(())
   }
}

// ===== MockNotificationTransport =====

/// 送信されたメールを記録するモックトランスポート
///
/// `set_fail(true)` で送信を失敗させ、ディスパッチャが失敗を
/// 握りつぶすことを検証できる。
#[derive(Clone, Default)]
pub struct MockNotificationTransport {
   sent: Arc<Mutex<Vec<(EmailRecipients, EmailContent)>>>,
   fail: Arc<Mutex<bool>>,
}

impl MockNotificationTransport {
   pub fn new() -> Self {
      Self::default()
   }

   /// 送信されたメールのスナップショットを取得する
   pub fn sent_emails(&self) -> Vec<(EmailRecipients, EmailContent)> {
      self.sent.lock().unwrap().clone()
   }

   /// 送信を失敗させるかを設定する
   pub fn set_fail(&self, fail: bool) {
      *self.fail.lock().unwrap() = fail;
   }
}

#[async_trait]
impl NotificationTransport for MockNotificationTransport {
   async fn send(
      &self,
      recipients: &EmailRecipients,
      content: &EmailContent,
   ) -> Result<(), NotificationError> {
      self.send_returning_id(recipients, content).await?;
      Ok(())
   }
}

#[async_trait]
impl HostedApiSender for MockNotificationTransport {
   async fn send_returning_id(
      &self,
      recipients: &EmailRecipients,
      content: &EmailContent,
   ) -> Result<String, NotificationError> {
      if *self.fail.lock().unwrap() {
         return Err(NotificationError::SendFailed(
            "モックによる送信失敗".to_string(),
         ));
      }
      self
         .sent
         .lock()
         .unwrap()
         .push((recipients.clone(), content.clone()));
      Ok("mock-message-id".to_string())
   }
}
