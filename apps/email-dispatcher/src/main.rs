//! # Email Dispatcher サーバー
//!
//! 映画チケット販売システムのメール通知を送信する内部サービス。
//!
//! ## 役割
//!
//! キュー（SNS）から届いた通知リクエストのバッチを受け取り、
//! 予約確認・返金確認・パスワード再設定の HTML メールを生成して送信する。
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────┐     ┌──────────────┐
//! │  SNS / Queue │────→│ Email Dispatcher │────→│  SES / SMTP  │
//! └──────────────┘     └──────────────────┘     └──────────────┘
//!                               │
//!                               ↓
//!                      ┌──────────────────┐
//!                      │    CloudWatch    │
//!                      └──────────────────┘
//! ```
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `DISPATCHER_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `DISPATCHER_PORT` | No | ポート番号（デフォルト: `3003`） |
//! | `ENVIRONMENT` | No | メトリクスの環境ディメンション（デフォルト: `dev`） |
//! | `FROM_EMAIL` | No | 送信元アドレス（デフォルト: `noreply@movieticket.com`） |
//! | `MAIL_BACKEND` | No | `ses` / `smtp` / `noop`（デフォルト: `noop`） |
//! | `SMTP_HOST` / `SMTP_PORT` | No | SMTP 接続先（デフォルト: `localhost:1025`） |
//! | `METRICS_BACKEND` | No | `cloudwatch` / `prometheus` / `noop`（デフォルト: `noop`） |
//! | `METRICS_NAMESPACE` | No | CloudWatch 名前空間（デフォルト: `EmailService`） |
//! | `METRICS_PORT` | No | Prometheus の公開ポート（デフォルト: `9464`） |
//! | `AWS_REGION` | No | AWS リージョン |
//! | `LOG_FORMAT` | No | `json` / `pretty`（デフォルト: `pretty`） |
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（Mailpit）
//! MAIL_BACKEND=smtp cargo run -p cinemail-email-dispatcher
//!
//! # 本番環境
//! MAIL_BACKEND=ses METRICS_BACKEND=cloudwatch ENVIRONMENT=prod \
//!   cargo run -p cinemail-email-dispatcher --release
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use cinemail_email_dispatcher::{
    config::{DispatcherConfig, MailBackend, MetricsConfig},
    router,
    usecase::{DispatchSettings, EmailDispatcher, TemplateRenderer},
};
use cinemail_infra::{
    MailSender,
    MetricsSink,
    aws,
    mail::{NoopMailSender, SesMailSender, SmtpMailSender},
    metrics_sink::{CloudWatchMetricsSink, NoopMetricsSink, RecorderMetricsSink},
};
use cinemail_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

/// Email Dispatcher サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    // トレーシング初期化
    let tracing_config = TracingConfig::from_env("email-dispatcher");
    init_tracing(&tracing_config);
    let _tracing_guard = tracing::info_span!("app", service = "email-dispatcher").entered();

    // 設定読み込み
    let config = DispatcherConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        "Email Dispatcher サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    // AWS SDK 設定は SES / CloudWatch のどちらかを使う場合のみ読み込む
    let needs_aws = config.mail.backend == MailBackend::Ses
        || matches!(config.metrics, MetricsConfig::CloudWatch { .. });
    let sdk_config = if needs_aws {
        Some(aws::load_sdk_config(config.aws_region.clone()).await)
    } else {
        None
    };

    // メール送信
    let sender: Arc<dyn MailSender> = match (&config.mail.backend, &sdk_config) {
        (MailBackend::Ses, Some(sdk_config)) => Arc::new(SesMailSender::new(
            aws::ses_client(sdk_config),
            config.mail.from_address.clone(),
        )),
        (MailBackend::Smtp { host, port }, _) => Arc::new(SmtpMailSender::new(
            host,
            *port,
            config.mail.from_address.clone(),
        )),
        _ => Arc::new(NoopMailSender),
    };
    tracing::info!(backend = ?config.mail.backend, "メール送信バックエンドを初期化しました");

    // メトリクス送信
    let metrics: Arc<dyn MetricsSink> = match (&config.metrics, &sdk_config) {
        (MetricsConfig::CloudWatch { namespace }, Some(sdk_config)) => Arc::new(
            CloudWatchMetricsSink::new(aws::cloudwatch_client(sdk_config), namespace.clone()),
        ),
        (MetricsConfig::Prometheus { port }, _) => Arc::new(
            RecorderMetricsSink::with_prometheus_exporter(SocketAddr::new(
                config.host.parse().context("アドレスのパースに失敗しました")?,
                *port,
            ))
            .context("メトリクスエクスポータの起動に失敗しました")?,
        ),
        _ => Arc::new(NoopMetricsSink),
    };
    tracing::info!(backend = ?config.metrics, "メトリクス送信バックエンドを初期化しました");

    let template_renderer =
        TemplateRenderer::new().context("テンプレートの初期化に失敗しました")?;
    let dispatcher = EmailDispatcher::new(
        sender,
        metrics,
        template_renderer,
        DispatchSettings {
            environment: config.environment.clone(),
        },
    );

    // ルーター構築
    let app = router(dispatcher);

    // サーバー起動
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("アドレスのパースに失敗しました")?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Email Dispatcher サーバーが起動しました: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
