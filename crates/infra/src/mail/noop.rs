//! Noop メール送信実装
//!
//! メールを実際に送信せず、ログ出力のみ行う。
//! ローカル実行や送信無効化時に使用する。

use async_trait::async_trait;
use cinemail_domain::notification::{EmailMessage, MessageId, NotificationError};
use uuid::Uuid;

use super::MailSender;

/// Noop メール送信（ログ出力のみ）
#[derive(Debug, Clone)]
pub struct NoopMailSender;

#[async_trait]
impl MailSender for NoopMailSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<MessageId, NotificationError> {
        let message_id = MessageId::new(format!("noop-{}", Uuid::now_v7()));

        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            html_bytes = email.html_body.len(),
            message_id = %message_id,
            "Noop: メール送信をスキップ"
        );

        Ok(message_id)
    }
}
