//! # 通知リクエスト
//!
//! キューから届いたメッセージ文字列を解析し、検証済みのリクエストに変換する。
//!
//! ```text
//! Message(JSON 文字列) ─parse─→ EmailRequestMessage ─into_request─→ NotificationRequest
//!                        失敗: MalformedMessage      失敗: InvalidRequest / MalformedMessage
//! ```

use serde::Deserialize;
use serde_json::Value;

use super::{EmailType, NotificationError, TemplateData};
use crate::value_objects::Email;

/// 未検証の通知リクエスト
///
/// キュー上の JSON をそのまま受ける。すべてのフィールドが任意。
///
/// ```json
/// {
///   "emailType": "BOOKING_CONFIRMATION",
///   "toEmail": "a@b.com",
///   "subject": "...",
///   "templateData": { ... },
///   "htmlContent": "<html>...</html>"
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRequestMessage {
    pub email_type:    Option<String>,
    pub to_email:      Option<String>,
    pub subject:       Option<String>,
    #[serde(default)]
    pub template_data: Value,
    pub html_content:  Option<String>,
}

/// 検証済みの通知リクエスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub email_type:    EmailType,
    pub to_email:      Email,
    pub subject:       String,
    pub template_data: TemplateData,
    /// 事前にレンダリング済みの HTML（指定時はテンプレートを使わない）
    pub html_content:  Option<String>,
}

impl EmailRequestMessage {
    /// メッセージ文字列を解析する
    ///
    /// # エラー
    ///
    /// JSON として解釈できない場合は `NotificationError::MalformedMessage` を返す。
    pub fn parse(message: &str) -> Result<Self, NotificationError> {
        serde_json::from_str(message).map_err(|e| NotificationError::MalformedMessage(e.to_string()))
    }

    /// 通知種別（未指定・空文字の場合は `None`）
    pub fn email_type(&self) -> Option<EmailType> {
        present(self.email_type.as_deref()).map(EmailType::parse)
    }

    /// 宛先（未指定・空文字の場合は `None`）
    pub fn recipient(&self) -> Option<&str> {
        present(self.to_email.as_deref())
    }

    /// 必須フィールドを検証し、ペイロードを解決する
    ///
    /// # エラー
    ///
    /// - `toEmail` / `subject` / `emailType` のいずれかが欠けている:
    ///   欠けているフィールドをすべて列挙した `InvalidRequest`
    /// - 宛先の形式が不正: `InvalidRequest`
    /// - `templateData` を解釈できない: `MalformedMessage`
    pub fn into_request(self) -> Result<NotificationRequest, NotificationError> {
        let missing: Vec<&str> = [
            ("toEmail", self.recipient().is_none()),
            ("subject", present(self.subject.as_deref()).is_none()),
            ("emailType", self.email_type().is_none()),
        ]
        .into_iter()
        .filter_map(|(field, is_missing)| is_missing.then_some(field))
        .collect();
        if !missing.is_empty() {
            return Err(missing_fields(&missing));
        }

        let (Some(email_type), Some(to_email), Some(subject)) =
            (self.email_type(), self.to_email, self.subject)
        else {
            return Err(missing_fields(&missing));
        };

        let to_email =
            Email::new(to_email).map_err(|e| NotificationError::InvalidRequest(e.to_string()))?;
        let template_data = TemplateData::resolve(&email_type, self.template_data)?;

        Ok(NotificationRequest {
            email_type,
            to_email,
            subject,
            template_data,
            html_content: self.html_content.filter(|html| !html.is_empty()),
        })
    }
}

fn missing_fields(fields: &[&str]) -> NotificationError {
    NotificationError::InvalidRequest(format!(
        "必須フィールドがありません: {}",
        fields.join(", ")
    ))
}

/// 空白のみの文字列は未指定とみなす
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::notification::DEFAULT_SALUTATION;

    #[test]
    fn 完全なメッセージを検証済みリクエストに変換できる() {
        let message = EmailRequestMessage::parse(
            r#"{
                "emailType": "PASSWORD_RESET",
                "toEmail": "a@b.com",
                "subject": "Mã xác nhận",
                "templateData": { "fullName": "An", "resetCode": "123456" }
            }"#,
        )
        .unwrap();

        let request = message.into_request().unwrap();

        assert_eq!(request.email_type, EmailType::PasswordReset);
        assert_eq!(request.to_email.as_str(), "a@b.com");
        assert_eq!(request.subject, "Mã xác nhận");
        assert!(request.html_content.is_none());
        assert!(matches!(
            request.template_data,
            TemplateData::PasswordReset(ref data) if data.reset_code == "123456"
        ));
    }

    #[test]
    fn jsonでないメッセージはmalformed_messageになる() {
        let result = EmailRequestMessage::parse("not json");

        assert!(matches!(
            result,
            Err(NotificationError::MalformedMessage(_))
        ));
    }

    #[test]
    fn 欠けている必須フィールドをすべて列挙する() {
        let message = EmailRequestMessage::parse(r#"{"subject": "S"}"#).unwrap();

        let error = message.into_request().unwrap_err();

        assert_eq!(
            error,
            NotificationError::InvalidRequest(
                "必須フィールドがありません: toEmail, emailType".to_string()
            )
        );
    }

    #[test]
    fn 空白のみの必須フィールドは欠落扱いになる() {
        let message = EmailRequestMessage::parse(
            r#"{"emailType": "PASSWORD_RESET", "toEmail": "a@b.com", "subject": "  "}"#,
        )
        .unwrap();

        let error = message.into_request().unwrap_err();

        assert_eq!(
            error,
            NotificationError::InvalidRequest("必須フィールドがありません: subject".to_string())
        );
    }

    #[test]
    fn 宛先の形式が不正ならinvalid_requestになる() {
        let message = EmailRequestMessage::parse(
            r#"{"emailType": "PASSWORD_RESET", "toEmail": "not-an-address", "subject": "S"}"#,
        )
        .unwrap();

        assert!(matches!(
            message.into_request(),
            Err(NotificationError::InvalidRequest(_))
        ));
    }

    #[test]
    fn html_contentが指定されていれば保持される() {
        let message = EmailRequestMessage::parse(
            r#"{"emailType": "X", "toEmail": "a@b.com", "subject": "S", "htmlContent": "<p>hi</p>"}"#,
        )
        .unwrap();

        let request = message.into_request().unwrap();

        assert_eq!(request.html_content.as_deref(), Some("<p>hi</p>"));
        assert_eq!(request.template_data, TemplateData::Unknown);
    }

    #[test]
    fn 空のhtml_contentは未指定扱いになる() {
        let message = EmailRequestMessage::parse(
            r#"{"emailType": "REFUND_CONFIRMATION", "toEmail": "a@b.com", "subject": "S", "htmlContent": ""}"#,
        )
        .unwrap();

        let request = message.into_request().unwrap();

        assert!(request.html_content.is_none());
        assert!(matches!(
            request.template_data,
            TemplateData::RefundConfirmation(ref data) if data.customer_name == DEFAULT_SALUTATION
        ));
    }

    #[test]
    fn 検証失敗前でも宛先と種別を参照できる() {
        let message =
            EmailRequestMessage::parse(r#"{"emailType": "WELCOME", "toEmail": "a@b.com"}"#)
                .unwrap();

        assert_eq!(message.recipient(), Some("a@b.com"));
        assert_eq!(
            message.email_type(),
            Some(EmailType::Unknown("WELCOME".to_string()))
        );
    }
}
