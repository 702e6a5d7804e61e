//! # Cinemail インフラ層
//!
//! 外部サービスとの通信を担当するインフラストラクチャ層。
//!
//! ## 設計方針
//!
//! ディスパッチャが依存する外部サービスを trait で抽象化し、具体的な実装を提供する。
//! ディスパッチャは起動時に実装を 1 つずつ選んで注入するため、テストではモックに差し替えられる。
//!
//! ## 責務
//!
//! - **メール送信**: [`mail::MailSender`]（SES / SMTP / Noop）
//! - **メトリクス送信**: [`metrics_sink::MetricsSink`]（CloudWatch / metrics レコーダー / Noop）
//! - **AWS 設定**: [`aws`] で SDK 共通設定を読み込む
//!
//! ## 依存関係
//!
//! ```text
//! email-dispatcher → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`aws`] - AWS SDK 設定の読み込み
//! - [`mail`] - メール送信
//! - [`metrics_sink`] - メトリクス送信
//! - `mock` - テスト用モック（`test-utils` feature）

pub mod aws;
pub mod mail;
pub mod metrics_sink;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use mail::MailSender;
pub use metrics_sink::{CountMetric, MetricName, MetricsSink};
