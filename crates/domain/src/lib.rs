//! # Cinemail ドメイン層
//!
//! メール通知ディスパッチャのドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **型付きペイロード**: 通知種別ごとのテンプレートデータはパース時に一度だけ解決し、
//!   欠損フィールドのデフォルト値もその時点で確定させる
//! - **値オブジェクト**: 宛先アドレスや金額はラップ型で表現し、生成時に検証する
//! - **I/O なし**: このクレートは外部サービスに一切依存しない
//!
//! ## 依存関係の方向
//!
//! ```text
//! email-dispatcher → infra → domain
//!         ↘                    ↑
//!           shared      (依存しない)
//! ```
//!
//! ## モジュール構成
//!
//! - [`error`] - ドメイン層エラー
//! - [`notification`] - 通知リクエスト・テンプレートデータ・処理結果
//! - [`value_objects`] - 宛先メールアドレス、金額
//!
//! ## 使用例
//!
//! ```rust
//! use cinemail_domain::notification::{EmailRequestMessage, EmailType};
//!
//! let message = EmailRequestMessage::parse(
//!     r#"{"emailType":"PASSWORD_RESET","toEmail":"a@b.com","subject":"S"}"#,
//! )
//! .unwrap();
//! let request = message.into_request().unwrap();
//! assert_eq!(request.email_type, EmailType::PasswordReset);
//! ```

pub mod error;
pub mod notification;
pub mod value_objects;

pub use error::DomainError;
