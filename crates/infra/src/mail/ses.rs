//! SES メール送信実装
//!
//! AWS SES v2 API を使用してメールを送信する。
//! 本番環境で使用する。

use async_trait::async_trait;
use aws_sdk_sesv2::{
    Client,
    error::DisplayErrorContext,
    types::{Body, Content, Destination, EmailContent, Message},
};
use cinemail_domain::notification::{EmailMessage, MessageId, NotificationError};

use super::{CHARSET, MailSender};

/// SES メール送信
///
/// `aws_sdk_sesv2::Client` をラップする。
pub struct SesMailSender {
    client:       Client,
    from_address: String,
}

impl SesMailSender {
    /// 新しい SES 送信インスタンスを作成
    ///
    /// # 引数
    ///
    /// - `client`: AWS SES v2 クライアント
    /// - `from_address`: 送信元メールアドレス（SES で検証済みであること）
    pub fn new(client: Client, from_address: String) -> Self {
        Self {
            client,
            from_address,
        }
    }
}

/// UTF-8 の Content を構築する
fn utf8_content(data: &str, part: &str) -> Result<Content, NotificationError> {
    Content::builder()
        .data(data)
        .charset(CHARSET)
        .build()
        .map_err(|e| NotificationError::SendFailed(format!("{part}構築失敗: {e}")))
}

#[async_trait]
impl MailSender for SesMailSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<MessageId, NotificationError> {
        let destination = Destination::builder().to_addresses(&email.to).build();

        let content = EmailContent::builder()
            .simple(
                Message::builder()
                    .subject(utf8_content(&email.subject, "件名")?)
                    .body(
                        Body::builder()
                            .html(utf8_content(&email.html_body, "HTML 本文")?)
                            .build(),
                    )
                    .build(),
            )
            .build();

        let output = self
            .client
            .send_email()
            .from_email_address(&self.from_address)
            .destination(destination)
            .content(content)
            .send()
            .await
            .map_err(|e| {
                NotificationError::SendFailed(format!("SES 送信失敗: {}", DisplayErrorContext(&e)))
            })?;

        let message_id = output.message_id().ok_or_else(|| {
            NotificationError::SendFailed("SES が MessageId を返しませんでした".to_string())
        })?;

        tracing::info!(
            to = %email.to,
            message_id,
            "SES: メールを送信しました"
        );

        Ok(MessageId::new(message_id))
    }
}
