//! # メールディスパッチャ
//!
//! 解析 → 検証 → HTML 生成 → メール送信 → メトリクス送信を 1 件ずつ行う。
//!
//! ## 設計方針
//!
//! - **1 件ごとの隔離**: どのステップの失敗もその 1 件のエラー結果に閉じ込め、
//!   残りのレコードの処理を続ける
//! - **入力順の保持**: 結果は入力と同じ順序で、入力 1 件につき必ず 1 件
//! - **逐次処理**: レコードは並列化せず順に `.await` する
//! - **再送なし**: 送信失敗はそのままエラー結果にする
//! - **メトリクスはベストエフォート**: 送信失敗は warn ログのみ
//! - **依存性注入**: `MailSender` と `MetricsSink` は trait で抽象化

use std::sync::Arc;

use chrono::Utc;
use cinemail_domain::notification::{
    EmailMessage,
    EmailRequestMessage,
    EmailType,
    MessageId,
    NotificationError,
    NotificationRequest,
    NotificationResult,
};
use cinemail_infra::{
    CountMetric,
    MailSender,
    MetricName,
    MetricsSink,
    metrics_sink::UNKNOWN_EMAIL_TYPE,
};
use cinemail_shared::{
    event_log::{error, event},
    log_business_event,
};

use super::{BatchEvent, BatchResponse, TemplateRenderer};

/// ディスパッチ設定
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// デプロイ環境（メトリクスの `Environment` ディメンション）
    pub environment: String,
}

/// メールディスパッチャ
pub struct EmailDispatcher {
    sender:            Arc<dyn MailSender>,
    metrics:           Arc<dyn MetricsSink>,
    template_renderer: TemplateRenderer,
    settings:          DispatchSettings,
}

impl EmailDispatcher {
    pub fn new(
        sender: Arc<dyn MailSender>,
        metrics: Arc<dyn MetricsSink>,
        template_renderer: TemplateRenderer,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            sender,
            metrics,
            template_renderer,
            settings,
        }
    }

    /// バッチ内のすべてのレコードを処理する
    ///
    /// 個々のレコードが失敗してもエラーを返さず、結果に記録する。
    pub async fn dispatch(&self, batch: BatchEvent) -> BatchResponse {
        log_business_event!(
            event.category = event::category::NOTIFICATION,
            event.action = event::action::BATCH_RECEIVED,
            event.entity_type = event::entity_type::EMAIL,
            event.result = event::result::SUCCESS,
            batch.record_count = batch.len(),
            "通知バッチを受信"
        );

        let mut results = Vec::with_capacity(batch.len());
        for record in &batch.records {
            results.push(self.process(record.message()).await);
        }

        BatchResponse::completed(results, Utc::now())
    }

    /// 1 件のメッセージを処理する
    async fn process(&self, message: &str) -> NotificationResult {
        let raw = match EmailRequestMessage::parse(message) {
            Ok(raw) => raw,
            Err(e) => return self.fail(None, None, e).await,
        };

        // 検証に失敗しても結果に残せるよう先に取り出しておく
        let recipient = raw.recipient().map(str::to_string);
        let raw_email_type = raw.email_type();

        let request = match raw.into_request() {
            Ok(request) => request,
            Err(e) => return self.fail(recipient, raw_email_type, e).await,
        };

        let NotificationRequest {
            email_type,
            to_email,
            subject,
            template_data,
            html_content,
        } = request;
        let to = to_email.into_string();

        let html_body = match html_content {
            Some(html) => Ok(html),
            None => self.template_renderer.render(&template_data, &email_type),
        };
        let html_body = match html_body {
            Ok(html_body) => html_body,
            Err(e) => return self.fail(Some(to), Some(email_type), e).await,
        };

        let email = EmailMessage {
            to,
            subject,
            html_body,
        };

        match self.sender.send_email(&email).await {
            Ok(message_id) => self.succeed(email.to, email_type, message_id).await,
            Err(e) => self.fail(Some(email.to), Some(email_type), e).await,
        }
    }

    async fn succeed(
        &self,
        to: String,
        email_type: EmailType,
        message_id: MessageId,
    ) -> NotificationResult {
        log_business_event!(
            event.category = event::category::NOTIFICATION,
            event.action = event::action::NOTIFICATION_SENT,
            event.entity_type = event::entity_type::EMAIL,
            event.entity_id = %message_id,
            event.result = event::result::SUCCESS,
            notification.email_type = %email_type,
            notification.recipient = %to,
            "通知メール送信成功"
        );
        self.emit_count(MetricName::EmailSent, Some(&email_type)).await;

        NotificationResult::Success {
            to,
            email_type,
            message_id,
        }
    }

    async fn fail(
        &self,
        to: Option<String>,
        email_type: Option<EmailType>,
        e: NotificationError,
    ) -> NotificationResult {
        let (category, kind) = error_context(&e);
        log_business_event!(
            event.category = event::category::NOTIFICATION,
            event.action = event::action::NOTIFICATION_FAILED,
            event.entity_type = event::entity_type::EMAIL,
            event.result = event::result::FAILURE,
            notification.email_type = email_type.as_ref().map_or(UNKNOWN_EMAIL_TYPE, EmailType::as_str),
            notification.recipient = to.as_deref().unwrap_or(""),
            error.category = category,
            error.kind = kind,
            error = %e,
            "通知メール処理失敗"
        );
        self.emit_count(MetricName::EmailError, email_type.as_ref()).await;

        NotificationResult::Error {
            to,
            email_type,
            error: e.to_string(),
        }
    }

    /// カウンタを送信する（失敗は warn ログのみ）
    async fn emit_count(&self, name: MetricName, email_type: Option<&EmailType>) {
        let metric = CountMetric::one(name, &self.settings.environment, email_type);

        if let Err(e) = self.metrics.emit_count(&metric).await {
            tracing::warn!(
                error.category = error::category::EXTERNAL_SERVICE,
                error.kind = error::kind::METRICS,
                metric = metric.name.as_str(),
                error = %e,
                "メトリクス送信に失敗（処理は継続）"
            );
        }
    }
}

/// エラーをログ用のカテゴリと種別に分類する
fn error_context(e: &NotificationError) -> (&'static str, &'static str) {
    match e {
        NotificationError::InvalidRequest(_) | NotificationError::MalformedMessage(_) => {
            (error::category::INPUT, error::kind::VALIDATION)
        }
        NotificationError::TemplateFailed(_) => (error::category::INTERNAL, error::kind::TEMPLATE),
        NotificationError::SendFailed(_) => {
            (error::category::EXTERNAL_SERVICE, error::kind::MAIL_DELIVERY)
        }
        NotificationError::MetricsFailed(_) => {
            (error::category::EXTERNAL_SERVICE, error::kind::METRICS)
        }
    }
}

#[cfg(test)]
mod tests {
    use cinemail_infra::mock::{MockMailSender, MockMetricsSink};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    use super::*;

    struct Fixture {
        dispatcher: EmailDispatcher,
        sender:     MockMailSender,
        metrics:    MockMetricsSink,
    }

    fn fixture() -> Fixture {
        let sender = MockMailSender::new();
        let metrics = MockMetricsSink::new();
        let dispatcher = EmailDispatcher::new(
            Arc::new(sender.clone()),
            Arc::new(metrics.clone()),
            TemplateRenderer::new().unwrap(),
            DispatchSettings {
                environment: "test".to_string(),
            },
        );
        Fixture {
            dispatcher,
            sender,
            metrics,
        }
    }

    fn password_reset(to: &str) -> String {
        json!({
            "emailType": "PASSWORD_RESET",
            "toEmail": to,
            "subject": "Mã xác nhận đặt lại mật khẩu",
            "templateData": { "fullName": "Lê Minh", "resetCode": "482913" },
        })
        .to_string()
    }

    #[tokio::test]
    async fn 正常なリクエストを送信し成功結果を返す() {
        let f = fixture();

        let response = f
            .dispatcher
            .dispatch(BatchEvent::from_messages([password_reset("a@b.com")]))
            .await;

        assert_eq!(response.status_code, 200);
        assert_eq!(response.body.processed_count, 1);
        assert_eq!(
            response.body.results,
            vec![NotificationResult::Success {
                to:         "a@b.com".to_string(),
                email_type: EmailType::PasswordReset,
                message_id: MessageId::new("mock-message-1"),
            }]
        );

        let sent = f.sender.sent_emails();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Mã xác nhận đặt lại mật khẩu");
        assert!(sent[0].html_body.contains("482913"));
    }

    #[tokio::test]
    async fn html_contentはレンダリングせずそのまま送信する() {
        let f = fixture();
        let message = json!({
            "emailType": "BOOKING_CONFIRMATION",
            "toEmail": "a@b.com",
            "subject": "S",
            "templateData": { "movieTitle": "Mai" },
            "htmlContent": "<p>X</p>",
        })
        .to_string();

        let response = f
            .dispatcher
            .dispatch(BatchEvent::from_messages([message]))
            .await;

        assert!(response.body.results[0].is_success());
        assert_eq!(f.sender.sent_emails()[0].html_body, "<p>X</p>");
    }

    fn booking_with_qr(qr_code_url: Value) -> String {
        json!({
            "emailType": "BOOKING_CONFIRMATION",
            "toEmail": "a@b.com",
            "subject": "S",
            "templateData": {
                "customerName": "An",
                "totalAmount": 150000,
                "qrCodeUrl": qr_code_url,
            },
        })
        .to_string()
    }

    #[tokio::test]
    async fn qrコードurlがnullの予約確認はプレースホルダを表示する() {
        let f = fixture();

        f.dispatcher
            .dispatch(BatchEvent::from_messages([booking_with_qr(Value::Null)]))
            .await;

        let html = &f.sender.sent_emails()[0].html_body;
        assert!(html.contains("<strong>An</strong>"));
        assert!(html.contains("150.000 ₫"));
        assert!(html.contains("QR Code sẽ được tạo sau khi thanh toán"));
        assert!(!html.contains("<img"));
    }

    #[tokio::test]
    async fn qrコードurlがあれば画像として埋め込む() {
        let f = fixture();

        f.dispatcher
            .dispatch(BatchEvent::from_messages([booking_with_qr(json!(
                "https://x/y.png"
            ))]))
            .await;

        let html = &f.sender.sent_emails()[0].html_body;
        assert!(html.contains(r#"<img src="https://x/y.png""#));
        assert!(!html.contains("QR Code sẽ được tạo sau khi thanh toán"));
    }

    #[tokio::test]
    async fn qrコードurlは受け取った文字列のまま埋め込む() {
        let f = fixture();
        let urls = [
            "https://Q2K-Bucket.s3.amazonaws.com/qr/BK1.png",
            "https://cdn.example.com",
        ];

        f.dispatcher
            .dispatch(BatchEvent::from_messages(
                urls.map(|url| booking_with_qr(json!(url))),
            ))
            .await;

        let sent = f.sender.sent_emails();
        assert_eq!(sent.len(), 2);
        for (email, url) in sent.iter().zip(urls) {
            assert!(email.html_body.contains(&format!(r#"<img src="{url}""#)));
        }
    }

    #[tokio::test]
    async fn 表示専用の座席数が数値でなくても送信する() {
        let f = fixture();
        let message = json!({
            "emailType": "BOOKING_CONFIRMATION",
            "toEmail": "a@b.com",
            "subject": "S",
            "templateData": { "totalSeats": "A1, A2" },
        })
        .to_string();

        let response = f
            .dispatcher
            .dispatch(BatchEvent::from_messages([message]))
            .await;

        assert!(matches!(
            &response.body.results[0],
            NotificationResult::Success { .. }
        ));
        assert!(f.sender.sent_emails()[0].html_body.contains("A1, A2 vé"));
    }

    #[tokio::test]
    async fn 必須フィールドの欠落は送信せずエラー結果になる() {
        let f = fixture();
        let message = json!({ "subject": "S" }).to_string();

        let response = f
            .dispatcher
            .dispatch(BatchEvent::from_messages([message]))
            .await;

        let NotificationResult::Error {
            to,
            email_type,
            error,
        } = &response.body.results[0]
        else {
            panic!("エラー結果になること");
        };
        assert!(to.is_none());
        assert!(email_type.is_none());
        assert!(error.contains("toEmail"));
        assert!(error.contains("emailType"));
        assert!(f.sender.sent_emails().is_empty());
    }

    #[tokio::test]
    async fn 不正な1件があっても全件の結果が入力順に返る() {
        let f = fixture();

        let response = f
            .dispatcher
            .dispatch(BatchEvent::from_messages([
                password_reset("first@b.com"),
                "not json".to_string(),
                password_reset("third@b.com"),
            ]))
            .await;

        let results = &response.body.results;
        assert_eq!(results.len(), 3);
        assert_eq!(response.body.processed_count, 3);
        assert!(matches!(
            &results[0],
            NotificationResult::Success { to, .. } if to == "first@b.com"
        ));
        assert!(matches!(
            &results[1],
            NotificationResult::Error { to: None, email_type: None, .. }
        ));
        assert!(matches!(
            &results[2],
            NotificationResult::Success { to, .. } if to == "third@b.com"
        ));
    }

    #[tokio::test]
    async fn 送信失敗はその1件だけエラーになる() {
        let f = fixture();
        f.sender.fail_for("bounce@b.com");

        let response = f
            .dispatcher
            .dispatch(BatchEvent::from_messages([
                password_reset("bounce@b.com"),
                password_reset("ok@b.com"),
            ]))
            .await;

        let results = &response.body.results;
        assert!(matches!(
            &results[0],
            NotificationResult::Error {
                to: Some(to),
                email_type: Some(EmailType::PasswordReset),
                error,
            } if to == "bounce@b.com" && error.contains("メール送信に失敗")
        ));
        assert!(results[1].is_success());
        assert_eq!(f.sender.sent_emails().len(), 1);
    }

    #[tokio::test]
    async fn 未知の種別はフォールバックhtmlで送信する() {
        let f = fixture();
        let message = json!({
            "emailType": "WELCOME",
            "toEmail": "a@b.com",
            "subject": "S",
        })
        .to_string();

        let response = f
            .dispatcher
            .dispatch(BatchEvent::from_messages([message]))
            .await;

        assert!(matches!(
            &response.body.results[0],
            NotificationResult::Success { email_type: EmailType::Unknown(kind), .. } if kind == "WELCOME"
        ));
        assert_eq!(
            f.sender.sent_emails()[0].html_body,
            "<html><body><p>Email content for: WELCOME</p></body></html>"
        );
    }

    #[tokio::test]
    async fn 空のバッチは空の結果を返す() {
        let f = fixture();

        let response = f.dispatcher.dispatch(BatchEvent::default()).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(response.body.message, "Email processing completed");
        assert!(response.body.results.is_empty());
        assert_eq!(response.body.processed_count, 0);
        assert!(f.metrics.emitted().is_empty());
    }

    #[tokio::test]
    async fn 成功と失敗でカウンタを1件ずつ送信する() {
        let f = fixture();

        f.dispatcher
            .dispatch(BatchEvent::from_messages([
                password_reset("a@b.com"),
                "not json".to_string(),
            ]))
            .await;

        let emitted = f.metrics.emitted();
        assert_eq!(
            emitted,
            vec![
                CountMetric {
                    name:        MetricName::EmailSent,
                    value:       1.0,
                    environment: "test".to_string(),
                    email_type:  "PASSWORD_RESET".to_string(),
                },
                CountMetric {
                    name:        MetricName::EmailError,
                    value:       1.0,
                    environment: "test".to_string(),
                    email_type:  UNKNOWN_EMAIL_TYPE.to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn メトリクス送信の失敗は結果に影響しない() {
        let f = fixture();
        f.metrics.set_failing(true);

        let response = f
            .dispatcher
            .dispatch(BatchEvent::from_messages([password_reset("a@b.com")]))
            .await;

        assert!(response.body.results[0].is_success());
        assert_eq!(f.metrics.emitted().len(), 1);
    }

    #[tokio::test]
    async fn ペイロードの型が不正ならエラー結果になる() {
        let f = fixture();
        let message = json!({
            "emailType": "REFUND_CONFIRMATION",
            "toEmail": "a@b.com",
            "subject": "S",
            "templateData": { "refundAmount": "một trăm" },
        })
        .to_string();

        let response = f
            .dispatcher
            .dispatch(BatchEvent::from_messages([message]))
            .await;

        assert!(matches!(
            &response.body.results[0],
            NotificationResult::Error {
                email_type: Some(EmailType::RefundConfirmation),
                ..
            }
        ));
        assert!(f.sender.sent_emails().is_empty());
    }

    #[test]
    fn エラーはカテゴリと種別に分類される() {
        assert_eq!(
            error_context(&NotificationError::InvalidRequest(String::new())),
            ("input", "validation")
        );
        assert_eq!(
            error_context(&NotificationError::SendFailed(String::new())),
            ("external_service", "mail_delivery")
        );
        assert_eq!(
            error_context(&NotificationError::TemplateFailed(String::new())),
            ("internal", "template")
        );
    }
}
