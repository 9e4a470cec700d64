//! # リカット依頼ユースケース
//!
//! リカット依頼の作成・取得・ステータス更新・削除に関する
//! ビジネスロジックを実装する。
//!
//! 書き込み操作はデータストアへの反映を先に行い、成功した場合のみ
//! 通知ディスパッチャを fire-and-forget で起動する。操作の結果は
//! データストアの成否だけで決まる。

use std::sync::Arc;

use chrono::Utc;
use recut_domain::{
   damage_request::{
      DamageRequest,
      DamageRequestId,
      NewDamageRequest,
      PanelInfo,
      RequestStatus,
   },
   notification::NotificationKind,
};
use recut_infra::repository::DamageRequestRepository;
use recut_shared::{event_log::event, log_business_event};

use crate::{error::ServiceError, usecase::NotificationDispatcher};

/// リカット依頼作成入力
#[derive(Debug, Clone)]
pub struct CreateDamageRequestInput {
   /// 機体名
   pub glider_name:  String,
   /// 受注番号
   pub order_number: String,
   /// リカットの理由
   pub reason:       String,
   /// 依頼者名（未入力の場合は空文字列）
   pub requested_by: String,
   /// 対象パネル
   pub panels:       Vec<PanelInfo>,
   /// 補足メモ
   pub notes:        Option<String>,
   /// 初期ステータス（未指定の場合は `Pending`）
   pub status:       Option<RequestStatus>,
}

/// リカット依頼ユースケース実装
pub struct DamageRequestUseCaseImpl<R> {
   repo:       R,
   dispatcher: Arc<NotificationDispatcher>,
}

impl<R> DamageRequestUseCaseImpl<R>
where
   R: DamageRequestRepository,
{
   /// 新しいリカット依頼ユースケースを作成
   pub fn new(repo: R, dispatcher: Arc<NotificationDispatcher>) -> Self {
      Self { repo, dispatcher }
   }

   /// リカット依頼を作成する
   ///
   /// ## 処理フロー
   ///
   /// 1. 入力検証（機体名・受注番号・理由）
   /// 2. 依頼を組み立てて保存（ステータス未指定なら Pending）
   /// 3. 新規依頼通知を fire-and-forget で送信
   ///
   /// ## エラー
   ///
   /// - 入力検証に失敗した場合
   /// - データベースエラー
   pub async fn create_damage_request(
      &self,
      input: CreateDamageRequestInput,
   ) -> Result<DamageRequest, ServiceError> {
      // 1. 入力検証
      let new_request = NewDamageRequest {
         id: DamageRequestId::new(),
         glider_name: input.glider_name,
         order_number: input.order_number,
         reason: input.reason,
         requested_by: input.requested_by,
         panels: input.panels,
         notes: input.notes,
         status: input.status,
         now: Utc::now(),
      };
      new_request
         .validate()
         .map_err(|e| ServiceError::BadRequest(e.to_string()))?;

      // 2. 依頼を保存
      let request = DamageRequest::new(new_request);
      self.repo.insert(&request).await?;

      log_business_event!(
         event.category = event::category::DAMAGE_REQUEST,
         event.action = event::action::REQUEST_CREATED,
         event.entity_type = event::entity_type::DAMAGE_REQUEST,
         event.entity_id = %request.id(),
         event.result = event::result::SUCCESS,
         "リカット依頼を作成"
      );

      // 3. 新規依頼通知（結果は操作に影響しない）
      Arc::clone(&self.dispatcher).dispatch(request.clone(), NotificationKind::NewRequest);

      Ok(request)
   }

   /// リカット依頼のステータスを更新する
   ///
   /// ## 処理フロー
   ///
   /// 1. ステータスと更新日時を保存（該当行がなくても成功）
   /// 2. 更新後の依頼を読み直し、存在すればステータス更新通知を送信
   ///
   /// 同じステータスでの再実行も成功する（冪等）。通知用の再取得に
   /// 失敗しても、更新そのものは成功として返す。
   pub async fn update_damage_request_status(
      &self,
      id: DamageRequestId,
      status: RequestStatus,
   ) -> Result<(), ServiceError> {
      // 1. ステータスを更新
      self.repo.update_status(&id, status, Utc::now()).await?;

      log_business_event!(
         event.category = event::category::DAMAGE_REQUEST,
         event.action = event::action::REQUEST_STATUS_UPDATED,
         event.entity_type = event::entity_type::DAMAGE_REQUEST,
         event.entity_id = %id,
         event.result = event::result::SUCCESS,
         request.status = %status,
         "リカット依頼のステータスを更新"
      );

      // 2. 更新後の内容で通知（再取得の失敗は更新結果に影響しない）
      match self.repo.find_by_id(&id).await {
         Ok(Some(request)) => {
            Arc::clone(&self.dispatcher).dispatch(request, NotificationKind::StatusUpdate);
         }
         Ok(None) => {}
         Err(e) => {
            tracing::error!(error = %e, "通知用の依頼再取得に失敗");
         }
      }

      Ok(())
   }

   /// リカット依頼を削除する
   ///
   /// 削除に通知は伴わない。
   pub async fn delete_damage_request(&self, id: DamageRequestId) -> Result<(), ServiceError> {
      self.repo.delete(&id).await?;

      log_business_event!(
         event.category = event::category::DAMAGE_REQUEST,
         event.action = event::action::REQUEST_DELETED,
         event.entity_type = event::entity_type::DAMAGE_REQUEST,
         event.entity_id = %id,
         event.result = event::result::SUCCESS,
         "リカット依頼を削除"
      );

      Ok(())
   }

   /// ID でリカット依頼を取得する
   pub async fn get_damage_request(
      &self,
      id: DamageRequestId,
   ) -> Result<Option<DamageRequest>, ServiceError> {
      Ok(self.repo.find_by_id(&id).await?)
   }

   /// リカット依頼の一覧を取得する（新しい順）
   pub async fn list_damage_requests(&self) -> Result<Vec<DamageRequest>, ServiceError> {
      Ok(self.repo.find_all().await?)
   }
}
