//! # Recut Service サーバー
//!
//! パネルリカット依頼の管理とメール通知を担当するサービス。
//!
//! ## 役割
//!
//! - **リカット依頼 CRUD**: PostgreSQL への依頼の保存・取得・更新・削除
//! - **メール通知**: 依頼の作成・ステータス更新時に、設定されたプロバイダー
//!   （ホスト API / Gmail リレー / Outlook リレー）経由で関係者へ通知
//! - **ホスト API 互換エンドポイント**: `/api/send-email`（CORS 対応）
//!
//! 通知は fire-and-forget で送信され、失敗しても依頼操作は成功のまま。
//! Gmail / Outlook の SMTP 認証は `http://localhost:3001` のローカルリレー
//! （別プロセス）が担う。
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `RECUT_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `RECUT_PORT` | **Yes** | ポート番号 |
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `EMAIL_PROVIDER` | No | `hosted_api`（デフォルト） / `gmail` / `outlook` |
//! | `RESEND_API_KEY` | No | ホスト API の API キー |
//! | `NOTIFICATION_FROM_ADDRESS` | No | 送信元メールアドレス |
//! | `COMPANY_NAME` | No | 送信元の表示名（デフォルト: `Aqua Dynamics`） |
//! | `RELAY_BASE_URL` | No | ローカルリレーのベース URL |
//! | `GMAIL_USER` / `GMAIL_APP_PASSWORD` | No | Gmail の資格情報 |
//! | `OUTLOOK_USER` / `OUTLOOK_APP_PASSWORD` | No | Outlook の資格情報 |
//!
//! ## 起動方法
//!
//! ```bash
//! RECUT_PORT=3000 DATABASE_URL=postgres://... cargo run -p recut-service
//! ```

use std::{net::SocketAddr, sync::Arc};

use recut_infra::{
   db,
   notification::{HostedApiSender, HostedApiTransport},
   repository::{PostgresDamageRequestRepository, PostgresNotificationSettingsRepository},
};
use recut_service::{
   app_builder::build_app,
   config::ServiceConfig,
   handler::{DamageRequestState, SendEmailState},
   usecase::{
      DamageRequestUseCaseImpl,
      NotificationDispatcher,
      ProviderTransports,
      TemplateRenderer,
   },
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Recut Service サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
   // .env ファイルを読み込む（存在する場合）
   dotenvy::dotenv().ok();

   // トレーシング初期化
   tracing_subscriber::registry()
      .with(
         tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "info,recut_service=debug".into()),
      )
      .with(tracing_subscriber::fmt::layer())
      .init();

   // 設定読み込み
   let config = ServiceConfig::from_env().expect("設定の読み込みに失敗しました");

   tracing::info!(
      "Recut Service サーバーを起動します: {}:{}",
      config.host,
      config.port
   );

   // データベース接続プールを作成
   let pool = db::create_pool(&config.database_url)
      .await
      .expect("データベース接続に失敗しました");
   tracing::info!("データベースに接続しました");

   // マイグレーションを適用
   db::run_migrations(&pool)
      .await
      .expect("マイグレーションの適用に失敗しました");

   // 通知まわりの依存コンポーネント
   let renderer = TemplateRenderer::new(config.notification.company_name.clone())
      .expect("通知テンプレートの初期化に失敗しました");
   let settings_repo = PostgresNotificationSettingsRepository::new(pool.clone());
   let transports = ProviderTransports::from_config(&config.notification);
   let dispatcher = Arc::new(NotificationDispatcher::new(
      Arc::new(settings_repo),
      renderer,
      config.notification.provider,
      transports,
   ));

   // リカット依頼の依存コンポーネント
   let repo = PostgresDamageRequestRepository::new(pool.clone());
   let usecase = DamageRequestUseCaseImpl::new(repo, dispatcher);
   let damage_request_state = Arc::new(DamageRequestState { usecase });

   // ホスト API 互換エンドポイントの依存コンポーネント
   // （エンドポイントは常にホスト API 経由で送信する）
   let endpoint_renderer = TemplateRenderer::new(config.notification.company_name.clone())
      .expect("通知テンプレートの初期化に失敗しました");
   let mailer: Option<Arc<dyn HostedApiSender>> =
      config.notification.resend_api_key.as_ref().map(|api_key| {
         Arc::new(HostedApiTransport::new(
            &config.notification.resend_api_base,
            api_key.clone(),
            config.notification.from_address.clone(),
            config.notification.company_name.clone(),
         )) as Arc<dyn HostedApiSender>
      });
   let send_email_state = Arc::new(SendEmailState {
      renderer: endpoint_renderer,
      mailer,
   });

   // ルーター構築
   let app = build_app(damage_request_state, send_email_state);

   // サーバー起動
   let addr: SocketAddr = format!("{}:{}", config.host, config.port)
      .parse()
      .expect("アドレスのパースに失敗しました");

   let listener = TcpListener::bind(addr).await?;
   tracing::info!("Recut Service サーバーが起動しました: {}", addr);

   axum::serve(listener, app).await?;

   Ok(())
}
