//! # メール送信
//!
//! HTML メールの送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `MailSender` trait でメール送信を抽象化
//! - **3 つの実装**: SES（本番用）、SMTP（Mailpit 開発用）、Noop（ログのみ）
//! - **環境変数切替**: `MAIL_BACKEND` でランタイム選択
//! - **文字コード固定**: 件名・本文とも UTF-8

mod noop;
mod ses;
mod smtp;

use async_trait::async_trait;
use cinemail_domain::notification::{EmailMessage, MessageId, NotificationError};
pub use noop::NoopMailSender;
pub use ses::SesMailSender;
pub use smtp::SmtpMailSender;

/// 件名・本文の文字コード
pub const CHARSET: &str = "UTF-8";

/// メール送信トレイト
///
/// 送信元アドレスは実装側が保持する。
/// 送信に成功した場合はプロバイダが払い出したメッセージ ID を返す。
#[async_trait]
pub trait MailSender: Send + Sync {
    /// メールを送信する
    async fn send_email(&self, email: &EmailMessage) -> Result<MessageId, NotificationError>;
}
