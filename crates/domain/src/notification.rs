//! # 通知
//!
//! メール通知に関するドメインモデルを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`EmailType`] | 通知種別 | 予約確認、返金確認、パスワード再設定、その他 |
//! | [`EmailRequestMessage`] | 通知リクエスト（未検証） | キューから届いた JSON そのまま |
//! | [`NotificationRequest`] | 通知リクエスト（検証済み） | 必須項目の検証とペイロード解決が済んだもの |
//! | [`TemplateData`] | ペイロード | 通知種別ごとのテンプレート差し込みデータ |
//! | [`NotificationResult`] | 処理結果 | バッチ内の 1 件ごとの成功 / 失敗 |
//!
//! ## 設計方針
//!
//! - **パース時に解決**: ペイロードのデフォルト値はパース時に確定させ、
//!   レンダリング側では欠損を意識しない
//! - **1 件ごとの隔離**: すべての失敗は [`NotificationError`] として 1 件の結果に閉じ込める
//! - **送信とテンプレートの分離**: HTML 生成は dispatcher 側の TemplateRenderer が担う

mod request;
mod template_data;

use derive_more::Display;
use serde::Serialize;
use thiserror::Error;

pub use request::{EmailRequestMessage, NotificationRequest};
pub use template_data::{
    BookingConfirmationData,
    DEFAULT_SALUTATION,
    PasswordResetData,
    RefundConfirmationData,
    TemplateData,
};

/// 通知処理エラー
///
/// バッチ内の 1 件の処理で発生しうるエラーの分類。
/// いずれもバッチ全体を中断させず、その 1 件の [`NotificationResult::Error`] になる。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotificationError {
    /// 必須フィールドの欠落や宛先の形式不正
    #[error("リクエストが不正です: {0}")]
    InvalidRequest(String),

    /// メッセージが JSON として解釈できない、またはペイロードの型が不正
    #[error("メッセージを解析できません: {0}")]
    MalformedMessage(String),

    /// テンプレートレンダリングに失敗
    #[error("テンプレートレンダリングに失敗: {0}")]
    TemplateFailed(String),

    /// メール送信に失敗
    #[error("メール送信に失敗: {0}")]
    SendFailed(String),

    /// メトリクス送信に失敗（呼び出し側で握りつぶす）
    #[error("メトリクス送信に失敗: {0}")]
    MetricsFailed(String),
}

/// 通知種別
///
/// キュー上では `BOOKING_CONFIRMATION` のような SCREAMING_SNAKE_CASE 文字列で届く。
/// 未知の文字列は [`Unknown`](EmailType::Unknown) としてそのまま保持する。
#[derive(Debug, Clone, PartialEq, Eq, Hash, strum::EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EmailType {
    /// 予約確認（電子チケット）
    BookingConfirmation,
    /// 返金確認
    RefundConfirmation,
    /// パスワード再設定コード
    PasswordReset,
    /// 未知の種別
    #[strum(default)]
    Unknown(String),
}

impl EmailType {
    /// 文字列から通知種別を判定する（失敗しない）
    pub fn parse(value: &str) -> Self {
        value
            .parse()
            .unwrap_or_else(|_| Self::Unknown(value.to_string()))
    }

    /// キュー上の表現を返す
    pub fn as_str(&self) -> &str {
        match self {
            Self::BookingConfirmation => "BOOKING_CONFIRMATION",
            Self::RefundConfirmation => "REFUND_CONFIRMATION",
            Self::PasswordReset => "PASSWORD_RESET",
            Self::Unknown(value) => value,
        }
    }

    /// テンプレートを持つ種別かどうか
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl std::fmt::Display for EmailType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EmailType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// メールメッセージ
///
/// HTML 確定後の送信単位。MailSender に渡される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// 送信先メールアドレス
    pub to:        String,
    /// 件名
    pub subject:   String,
    /// HTML 本文
    pub html_body: String,
}

/// 送信プロバイダが払い出したメッセージ ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(transparent)]
#[display("{_0}")]
pub struct MessageId(String);

impl MessageId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// バッチ内 1 件の処理結果
///
/// `status` タグ付きでシリアライズされる:
///
/// ```json
/// {"status":"success","to":"a@b.com","emailType":"PASSWORD_RESET","messageId":"..."}
/// {"status":"error","to":"a@b.com","emailType":"PASSWORD_RESET","error":"..."}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum NotificationResult {
    /// 送信成功
    Success {
        to:         String,
        email_type: EmailType,
        message_id: MessageId,
    },
    /// 失敗（解析・検証・レンダリング・送信のいずれか）
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        to:         Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        email_type: Option<EmailType>,
        error:      String,
    },
}

impl NotificationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// 通知種別を返す（判定できなかった場合は `None`）
    pub fn email_type(&self) -> Option<&EmailType> {
        match self {
            Self::Success { email_type, .. } => Some(email_type),
            Self::Error { email_type, .. } => email_type.as_ref(),
        }
    }
}
