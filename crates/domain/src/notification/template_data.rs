//! # テンプレートデータ
//!
//! 通知種別ごとのペイロードを型付きで表現する。
//!
//! キュー上の `templateData` はすべてのフィールドが任意で、型も上流の実装に
//! 左右される（数値が文字列で届く等）。ここでパース時に一度だけ欠損・型揺れを
//! 吸収し、デフォルト値を確定させる。
//!
//! | フィールド | 欠損時 |
//! |-----------|--------|
//! | 宛名（`customerName` / `fullName`） | [`DEFAULT_SALUTATION`] |
//! | 文字列フィールド | 空文字列 |
//! | 金額 | 0 |
//! | `totalSeats` | `"0"`（表示専用のため受け取った値をそのまま使う） |
//! | `qrCodeUrl` | `None`（テンプレート側でプレースホルダを表示） |

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::{EmailType, NotificationError};
use crate::value_objects::Amount;

/// 宛名が欠損しているときの呼びかけ
pub const DEFAULT_SALUTATION: &str = "Quý khách";

/// 通知種別ごとに解決済みのペイロード
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateData {
    BookingConfirmation(BookingConfirmationData),
    RefundConfirmation(RefundConfirmationData),
    PasswordReset(PasswordResetData),
    /// 未知の種別（ペイロードは参照しない）
    Unknown,
}

impl TemplateData {
    /// 通知種別に応じて `templateData` を型付きペイロードに解決する
    ///
    /// `null` は空オブジェクトとして扱う。未知の種別ではペイロードの中身を見ない。
    ///
    /// # エラー
    ///
    /// オブジェクト以外が渡された場合や、フィールドの型が解釈できない場合は
    /// `NotificationError::MalformedMessage` を返す。
    pub fn resolve(email_type: &EmailType, data: Value) -> Result<Self, NotificationError> {
        if !email_type.is_known() {
            return Ok(Self::Unknown);
        }

        let data = match data {
            Value::Null => Value::Object(serde_json::Map::new()),
            Value::Object(_) => data,
            _ => {
                return Err(NotificationError::MalformedMessage(
                    "templateData はオブジェクトである必要があります".to_string(),
                ));
            }
        };

        let resolved = match email_type {
            EmailType::BookingConfirmation => {
                serde_json::from_value(data).map(Self::BookingConfirmation)
            }
            EmailType::RefundConfirmation => {
                serde_json::from_value(data).map(Self::RefundConfirmation)
            }
            EmailType::PasswordReset => serde_json::from_value(data).map(Self::PasswordReset),
            EmailType::Unknown(_) => return Ok(Self::Unknown),
        };

        resolved.map_err(|e| NotificationError::MalformedMessage(format!("templateData: {e}")))
    }
}

// =========================================================================
// 予約確認
// =========================================================================

/// 予約確認メールのペイロード
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawBookingConfirmationData")]
pub struct BookingConfirmationData {
    pub customer_name: String,
    pub movie_title:   String,
    pub cinema_name:   String,
    pub hall_name:     String,
    pub show_date:     String,
    pub start_time:    String,
    /// 座席数（表示専用）
    pub total_seats:   String,
    pub total_amount:  Amount,
    pub booking_code:  String,
    /// QR コード画像の URL（http / https のみ、受け取った文字列のまま）
    pub qr_code_url:   Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawBookingConfirmationData {
    customer_name: Option<Text>,
    movie_title:   Option<Text>,
    cinema_name:   Option<Text>,
    hall_name:     Option<Text>,
    show_date:     Option<Text>,
    start_time:    Option<Text>,
    total_seats:   Option<Value>,
    total_amount:  Option<Amount>,
    booking_code:  Option<Text>,
    qr_code_url:   Option<Text>,
}

impl From<RawBookingConfirmationData> for BookingConfirmationData {
    fn from(raw: RawBookingConfirmationData) -> Self {
        Self {
            customer_name: salutation(raw.customer_name),
            movie_title:   text(raw.movie_title),
            cinema_name:   text(raw.cinema_name),
            hall_name:     text(raw.hall_name),
            show_date:     text(raw.show_date),
            start_time:    text(raw.start_time),
            total_seats:   seat_count(raw.total_seats),
            total_amount:  raw.total_amount.unwrap_or_default(),
            booking_code:  text(raw.booking_code),
            qr_code_url:   image_url(raw.qr_code_url),
        }
    }
}

// =========================================================================
// 返金確認
// =========================================================================

/// 返金確認メールのペイロード
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawRefundConfirmationData")]
pub struct RefundConfirmationData {
    pub customer_name: String,
    pub booking_code:  String,
    pub refund_amount: Amount,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawRefundConfirmationData {
    customer_name: Option<Text>,
    booking_code:  Option<Text>,
    refund_amount: Option<Amount>,
}

impl From<RawRefundConfirmationData> for RefundConfirmationData {
    fn from(raw: RawRefundConfirmationData) -> Self {
        Self {
            customer_name: salutation(raw.customer_name),
            booking_code:  text(raw.booking_code),
            refund_amount: raw.refund_amount.unwrap_or_default(),
        }
    }
}

// =========================================================================
// パスワード再設定
// =========================================================================

/// パスワード再設定メールのペイロード
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawPasswordResetData")]
pub struct PasswordResetData {
    pub full_name:  String,
    pub reset_code: String,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawPasswordResetData {
    full_name:  Option<Text>,
    reset_code: Option<Text>,
}

impl From<RawPasswordResetData> for PasswordResetData {
    fn from(raw: RawPasswordResetData) -> Self {
        Self {
            full_name:  salutation(raw.full_name),
            reset_code: text(raw.reset_code),
        }
    }
}

// =========================================================================
// フィールド単位の解決
// =========================================================================

/// 文字列フィールド（数値・真偽値は文字列化して受け付ける）
struct Text(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawText {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl<'de> Deserialize<'de> for Text {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = match RawText::deserialize(deserializer)? {
            RawText::Text(value) => value,
            RawText::Integer(value) => value.to_string(),
            RawText::Float(value) => value.to_string(),
            RawText::Bool(value) => value.to_string(),
        };
        Ok(Self(value))
    }
}

fn text(value: Option<Text>) -> String {
    value.map(|t| t.0).unwrap_or_default()
}

/// 宛名は空白のみの場合も欠損とみなす
fn salutation(value: Option<Text>) -> String {
    value
        .map(|t| t.0)
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SALUTATION.to_string())
}

/// 座席数は表示するだけなので、文字列・数値はそのまま、それ以外は 0 とする
fn seat_count(value: Option<Value>) -> String {
    match value {
        Some(Value::String(seats)) => seats,
        Some(Value::Number(seats)) => seats.to_string(),
        _ => "0".to_string(),
    }
}

/// 画像として埋め込める絶対 URL だけを採用する
///
/// 判定にのみ `Url` を使い、正規化はせず受け取った文字列（前後の空白は除く）を返す。
/// 属性値を閉じられる文字を含むものは採用しない。
fn image_url(value: Option<Text>) -> Option<String> {
    let raw = value?.0;
    let raw = raw.trim();
    if raw.is_empty() || raw.contains(['"', '<', '>']) {
        return None;
    }

    Url::parse(raw)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .map(|_| raw.to_string())
}
