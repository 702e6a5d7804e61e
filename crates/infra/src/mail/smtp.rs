//! SMTP メール送信実装
//!
//! lettre の `AsyncSmtpTransport` を使用してメールを送信する。
//! 開発環境では Mailpit（ローカル SMTP サーバー）に接続する。

use async_trait::async_trait;
use cinemail_domain::notification::{EmailMessage, MessageId, NotificationError};
use lettre::{
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    message::{Mailbox, Message, header::ContentType},
};
use uuid::Uuid;

use super::MailSender;

/// SMTP メール送信
///
/// `lettre::AsyncSmtpTransport<Tokio1Executor>` をラップする。
pub struct SmtpMailSender {
    transport:    AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailSender {
    /// 新しい SMTP 送信インスタンスを作成
    ///
    /// # 引数
    ///
    /// - `host`: SMTP サーバーのホスト名（例: "localhost"）
    /// - `port`: SMTP サーバーのポート番号（例: 1025 for Mailpit）
    /// - `from_address`: 送信元メールアドレス
    pub fn new(host: &str, port: u16, from_address: String) -> Self {
        // builder_dangerous: TLS なしで接続（Mailpit 等のローカル SMTP 向け）
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(port)
            .build();

        Self {
            transport,
            from_address,
        }
    }

    /// 送信メッセージを構築する
    ///
    /// `Message-ID` はここで払い出し、送信成功時の ID として返す。
    fn build_message(&self, email: &EmailMessage) -> Result<(Message, MessageId), NotificationError> {
        let from: Mailbox = self
            .from_address
            .parse()
            .map_err(|e| NotificationError::SendFailed(format!("送信元アドレス不正: {e}")))?;
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| NotificationError::SendFailed(format!("宛先アドレス不正: {e}")))?;

        let message_id = format!("<{}@{}>", Uuid::now_v7(), from.email.domain());

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(&email.subject)
            .message_id(Some(message_id.clone()))
            .header(ContentType::TEXT_HTML)
            .body(email.html_body.clone())
            .map_err(|e| NotificationError::SendFailed(format!("メッセージ構築失敗: {e}")))?;

        Ok((message, MessageId::new(message_id)))
    }
}

#[async_trait]
impl MailSender for SmtpMailSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<MessageId, NotificationError> {
        let (message, message_id) = self.build_message(email)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotificationError::SendFailed(format!("SMTP 送信失敗: {e}")))?;

        Ok(message_id)
    }
}
