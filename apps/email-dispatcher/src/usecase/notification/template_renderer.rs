//! # テンプレートレンダラー
//!
//! tera テンプレートエンジンで通知メールの HTML を生成する。
//!
//! ## 設計方針
//!
//! - **`include_str!` によるコンパイル時埋め込み**: テンプレートはバイナリに埋め込まれる
//! - **自動エスケープ**: `.html` テンプレートに差し込む値は tera が HTML エスケープする
//! - **種別ごとのコンテキスト**: 型付きペイロードから 1 種別 1 関数でコンテキストを組み立てる
//! - **未知の種別**: tera を通さず最小限のフォールバック HTML を返す
//!
//! | 種別 | テンプレート | 金額表記 |
//! |------|-------------|---------|
//! | 予約確認 | `booking_confirmation.html` | `1.234.567 ₫` |
//! | 返金確認 | `refund_confirmation.html` | `1.234.567 VNĐ` |
//! | パスワード再設定 | `password_reset.html` | - |

use cinemail_domain::notification::{
    BookingConfirmationData,
    EmailType,
    NotificationError,
    PasswordResetData,
    RefundConfirmationData,
    TemplateData,
};
use tera::{Context, Tera};

const BOOKING_CONFIRMATION: &str = "booking_confirmation.html";
const REFUND_CONFIRMATION: &str = "refund_confirmation.html";
const PASSWORD_RESET: &str = "password_reset.html";

/// テンプレートレンダラー
///
/// tera テンプレートエンジンをラップし、`TemplateData` から HTML 本文を生成する。
/// I/O を持たず、同じ入力には同じ出力を返す。
pub struct TemplateRenderer {
    engine: Tera,
}

impl TemplateRenderer {
    /// 新しいレンダラーインスタンスを作成
    ///
    /// `include_str!` で埋め込んだテンプレートを tera に登録する。
    pub fn new() -> Result<Self, NotificationError> {
        let mut engine = Tera::default();

        engine
            .add_raw_templates(vec![
                (
                    BOOKING_CONFIRMATION,
                    include_str!("../../../templates/notifications/booking_confirmation.html"),
                ),
                (
                    REFUND_CONFIRMATION,
                    include_str!("../../../templates/notifications/refund_confirmation.html"),
                ),
                (
                    PASSWORD_RESET,
                    include_str!("../../../templates/notifications/password_reset.html"),
                ),
            ])
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        Ok(Self { engine })
    }

    /// ペイロードから HTML 本文を生成する
    ///
    /// ペイロードの種別でテンプレートを選ぶ。`Unknown` の場合は
    /// `email_type` の文字列を含むフォールバック HTML を返す。
    pub fn render(
        &self,
        data: &TemplateData,
        email_type: &EmailType,
    ) -> Result<String, NotificationError> {
        let (template_name, context) = match data {
            TemplateData::BookingConfirmation(booking) => {
                (BOOKING_CONFIRMATION, booking_context(booking))
            }
            TemplateData::RefundConfirmation(refund) => {
                (REFUND_CONFIRMATION, refund_context(refund))
            }
            TemplateData::PasswordReset(reset) => (PASSWORD_RESET, password_reset_context(reset)),
            TemplateData::Unknown => return Ok(fallback_html(email_type)),
        };

        self.engine
            .render(template_name, &context)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))
    }
}

fn booking_context(data: &BookingConfirmationData) -> Context {
    let mut context = Context::new();
    context.insert("customer_name", &data.customer_name);
    context.insert("movie_title", &data.movie_title);
    context.insert("cinema_name", &data.cinema_name);
    context.insert("hall_name", &data.hall_name);
    context.insert("show_date", &data.show_date);
    context.insert("start_time", &data.start_time);
    context.insert("total_seats", &data.total_seats);
    context.insert("total_amount", &data.total_amount.format_grouped());
    context.insert("booking_code", &data.booking_code);
    // パース時に http / https の絶対 URL であり引用符・山括弧を含まないことを検証済み
    context.insert("qr_code_url", &data.qr_code_url);
    context
}

fn refund_context(data: &RefundConfirmationData) -> Context {
    let mut context = Context::new();
    context.insert("customer_name", &data.customer_name);
    context.insert("booking_code", &data.booking_code);
    context.insert("refund_amount", &data.refund_amount.format_grouped());
    context
}

fn password_reset_context(data: &PasswordResetData) -> Context {
    let mut context = Context::new();
    context.insert("full_name", &data.full_name);
    context.insert("reset_code", &data.reset_code);
    context
}

/// 未知の種別向けの最小 HTML
fn fallback_html(email_type: &EmailType) -> String {
    format!(
        "<html><body><p>Email content for: {}</p></body></html>",
        tera::escape_html(email_type.as_str())
    )
}
