//! # ドメイン層エラー定義
//!
//! 値オブジェクトの生成時に検出されるルール違反を表現する。
//!
//! 通知処理全体のエラー分類は [`NotificationError`](crate::notification::NotificationError)
//! が担い、このエラーはその内側で発生する個々の検証失敗に使う。
//!
//! ## 使用例
//!
//! ```rust
//! use cinemail_domain::DomainError;
//!
//! fn validate_code(code: &str) -> Result<(), DomainError> {
//!     if code.is_empty() {
//!         return Err(DomainError::Validation("コードは必須です".to_string()));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 入力値がルールに違反している場合に使用する。
    ///
    /// # 例
    ///
    /// - 宛先メールアドレスの形式不正
    /// - 金額が数値として解釈できない
    #[error("バリデーションエラー: {0}")]
    Validation(String),
}
