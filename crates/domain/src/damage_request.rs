//! # リカット依頼
//!
//! 破損したパネルの再製作（リカット）依頼を管理する。
//!
//! ## 概念モデル
//!
//! - **DamageRequest**: 受注番号・機体名に紐づくリカット依頼の集約ルート
//! - **PanelInfo**: 依頼に含まれる個々のパネル（素材・面・数量）
//! - **RequestStatus**: 依頼の進捗ステータス
//!
//! ## 設計方針
//!
//! - **ステータス遷移は無制約**: どのステータスからどのステータスへも遷移できる。
//!   現場の運用でステータスを自由に付け替えるため、ステートマシンによる
//!   ガードは設けない。
//! - **パネルは依頼に所有される**: PanelInfo は単独で永続化されず、
//!   親の DamageRequest と共に JSONB として保存・復元される。
//!
//! ## 使用例
//!
//! ```rust
//! use recut_domain::damage_request::{
//!     DamageRequest, DamageRequestId, NewDamageRequest, RequestStatus,
//! };
//!
//! let request = DamageRequest::new(NewDamageRequest {
//!     id: DamageRequestId::new(),
//!     glider_name: "Falcon".to_string(),
//!     order_number: "ORD-42".to_string(),
//!     reason: "tear".to_string(),
//!     requested_by: String::new(),
//!     panels: vec![],
//!     notes: None,
//!     status: None,
//!     now: chrono::Utc::now(),
//! });
//! assert_eq!(request.status(), RequestStatus::Pending);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::DomainError;

define_uuid_id! {
    /// リカット依頼 ID
    ///
    /// damage_requests テーブルの主キー。UUID v7 を使用。
    pub struct DamageRequestId;
}

/// リカット依頼ステータス
///
/// 文字列表現は UI・データベースの両方で `"Pending"` / `"In Progress"` /
/// `"Done"` を使用する（スペース入りの表示名がそのまま保存される）。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr, strum::Display,
)]
#[strum(serialize_all = "title_case")]
pub enum RequestStatus {
    /// 受付済み（初期ステータス）
    Pending,
    /// 作業中
    #[serde(rename = "In Progress")]
    InProgress,
    /// 完了
    Done,
}

impl std::str::FromStr for RequestStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "In Progress" => Ok(Self::InProgress),
            "Done" => Ok(Self::Done),
            _ => Err(DomainError::Validation(format!(
                "不正な依頼ステータス: {}",
                s
            ))),
        }
    }
}

/// パネル情報
///
/// リカット対象となる個々のパネル。親の依頼に所有される値オブジェクトで、
/// JSON では UI の命名規約（camelCase）でシリアライズされる。
///
/// `panel_type` は UI 側の分類名がそのまま入り、冗長な `"General "`
/// プレフィックスを含むことがある（除去はレンダリング時のみ）。
/// `quantity` と `side` は検証せず、入力された値をそのまま保持する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelInfo {
    /// パネル番号（例: "3B"）
    pub panel_number: String,
    /// パネル分類（例: "General Top Surface"。未指定の場合は空文字列）
    #[serde(default)]
    pub panel_type:   String,
    /// 素材（例: "Dacron"）
    pub material:     String,
    /// 面（例: "Left" / "Right"）
    pub side:         String,
    /// 数量
    pub quantity:     u32,
}

/// リカット依頼エンティティ
///
/// 受注に対するパネル再製作の依頼。作成後はステータス更新のみで変更され、
/// 削除されると復元されない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageRequest {
    id: DamageRequestId,
    glider_name: String,
    order_number: String,
    reason: String,
    requested_by: String,
    panels: Vec<PanelInfo>,
    status: RequestStatus,
    submitted_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    notes: Option<String>,
}

/// リカット依頼の新規作成パラメータ
pub struct NewDamageRequest {
    pub id: DamageRequestId,
    pub glider_name: String,
    pub order_number: String,
    pub reason: String,
    /// 依頼者名（未入力の場合は空文字列）
    pub requested_by: String,
    pub panels: Vec<PanelInfo>,
    pub notes: Option<String>,
    /// 未指定の場合は `Pending`
    pub status: Option<RequestStatus>,
    pub now: DateTime<Utc>,
}

/// リカット依頼の DB 復元パラメータ
///
/// damage_requests テーブルのフラット構造を表現する。
pub struct DamageRequestRecord {
    pub id: DamageRequestId,
    pub glider_name: String,
    pub order_number: String,
    pub reason: String,
    pub requested_by: String,
    pub panels: Vec<PanelInfo>,
    pub status: RequestStatus,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl NewDamageRequest {
    /// 作成入力を検証する
    ///
    /// 機体名・受注番号・理由の 3 項目のみ必須とする。
    /// パネルの数量・面は検証しない（入力値をそのまま受け入れる）。
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.glider_name.trim().is_empty() {
            return Err(DomainError::Validation("機体名は必須です".to_string()));
        }
        if self.order_number.trim().is_empty() {
            return Err(DomainError::Validation("受注番号は必須です".to_string()));
        }
        if self.reason.trim().is_empty() {
            return Err(DomainError::Validation("理由は必須です".to_string()));
        }
        Ok(())
    }
}

impl DamageRequest {
    /// 新しいリカット依頼を作成する
    ///
    /// ステータス未指定の場合は `Pending`、提出日時・更新日時は `now` になる。
    pub fn new(params: NewDamageRequest) -> Self {
        Self {
            id: params.id,
            glider_name: params.glider_name,
            order_number: params.order_number,
            reason: params.reason,
            requested_by: params.requested_by,
            panels: params.panels,
            status: params.status.unwrap_or(RequestStatus::Pending),
            submitted_at: params.now,
            updated_at: params.now,
            notes: params.notes,
        }
    }

    /// 既存のデータから復元する
    pub fn from_record(record: DamageRequestRecord) -> Self {
        Self {
            id: record.id,
            glider_name: record.glider_name,
            order_number: record.order_number,
            reason: record.reason,
            requested_by: record.requested_by,
            panels: record.panels,
            status: record.status,
            submitted_at: record.submitted_at,
            updated_at: record.updated_at,
            notes: record.notes,
        }
    }

    /// ステータスを変更した新しいインスタンスを返す
    ///
    /// 遷移元・遷移先の組み合わせに制約はない。
    pub fn with_status(self, status: RequestStatus, now: DateTime<Utc>) -> Self {
        Self {
            status,
            updated_at: now,
            ..self
        }
    }

    pub fn id(&self) -> &DamageRequestId {
        &self.id
    }

    pub fn glider_name(&self) -> &str {
        &self.glider_name
    }

    pub fn order_number(&self) -> &str {
        &self.order_number
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// 依頼者名（未入力の場合は空文字列）
    pub fn requested_by(&self) -> &str {
        &self.requested_by
    }

    pub fn panels(&self) -> &[PanelInfo] {
        &self.panels
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}
