//! # 共通値オブジェクト
//!
//! 通知リクエストで共有される値オブジェクトを定義する。
//!
//! ## 設計方針
//!
//! - **Newtype パターン**: プリミティブ型をラップし、型安全性を確保
//! - **バリデーション**: 生成時に検証し、不正な値の存在を型レベルで排除
//! - **寛容なデシリアライズ**: 上流システムが数値を文字列や小数で送ってくるため、
//!   金額は整数・小数・数値文字列のいずれも受け付ける
//!
//! ## 含まれる型
//!
//! | 型 | ラップ対象 | 用途 |
//! |---|-----------|------|
//! | [`Email`] | `String` | 宛先メールアドレス |
//! | [`Amount`] | `i64` | 金額（VND、整数） |

use serde::{Deserialize, Deserializer, Serialize};

use crate::DomainError;

// =========================================================================
// Email（宛先メールアドレス）
// =========================================================================

/// メールアドレス（値オブジェクト）
///
/// 生成時にバリデーションを実行し、不正な宛先に対して送信を試みることを防ぐ。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// メールアドレスを作成する
    ///
    /// # バリデーション
    ///
    /// - 空文字列（空白のみを含む）ではない
    /// - `local@domain` の形式で、local / domain がともに空でない
    /// - 最大 255 文字
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_string();

        if value.is_empty() {
            return Err(DomainError::Validation(
                "メールアドレスは必須です".to_string(),
            ));
        }

        let Some((local, domain)) = value.split_once('@') else {
            return Err(DomainError::Validation(format!(
                "メールアドレスの形式が不正です: {value}"
            )));
        };

        if local.is_empty() || domain.is_empty() {
            return Err(DomainError::Validation(format!(
                "メールアドレスの形式が不正です: {value}"
            )));
        }

        if value.chars().count() > 255 {
            return Err(DomainError::Validation(
                "メールアドレスは255文字以内である必要があります".to_string(),
            ));
        }

        Ok(Self(value))
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 所有権を持つ文字列に変換する
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =========================================================================
// Amount（金額）
// =========================================================================

/// 桁区切り文字（ベトナムの慣習に合わせてドット）
pub const THOUSANDS_SEPARATOR: char = '.';

/// 金額（値オブジェクト）
///
/// VND の整数金額を表す。小数で渡された場合は四捨五入して整数にする。
///
/// # 使用例
///
/// ```rust
/// use cinemail_domain::value_objects::Amount;
///
/// assert_eq!(Amount::new(1_234_567).format_grouped(), "1.234.567");
/// assert_eq!(Amount::from_f64(150_000.4).unwrap().as_i64(), 150_000);
/// assert_eq!(Amount::parse("2500").unwrap().format_grouped(), "2.500");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    /// 整数から金額を作成する
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// 小数から金額を作成する（四捨五入）
    ///
    /// # エラー
    ///
    /// NaN / 無限大、または i64 の範囲外の場合は `DomainError::Validation` を返す。
    pub fn from_f64(value: f64) -> Result<Self, DomainError> {
        if !value.is_finite() {
            return Err(DomainError::Validation(format!(
                "金額が有限の数値ではありません: {value}"
            )));
        }

        let rounded = value.round();
        if rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
            return Err(DomainError::Validation(format!(
                "金額が範囲外です: {value}"
            )));
        }

        Ok(Self(rounded as i64))
    }

    /// 文字列から金額をパースする
    ///
    /// 前後の空白は無視する。整数として解釈できなければ小数として解釈する。
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let trimmed = value.trim();

        if let Ok(integer) = trimmed.parse::<i64>() {
            return Ok(Self(integer));
        }

        match trimmed.parse::<f64>() {
            Ok(float) => Self::from_f64(float),
            Err(_) => Err(DomainError::Validation(format!(
                "金額を数値として解釈できません: {value:?}"
            ))),
        }
    }

    /// 内部の i64 値を取得する
    pub fn as_i64(&self) -> i64 {
        self.0
    }

    /// 3 桁ごとに区切った文字列を返す
    ///
    /// `1234567` → `1.234.567`、`0` → `0`、`-1500` → `-1.500`
    pub fn format_grouped(&self) -> String {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

        if self.0 < 0 {
            grouped.push('-');
        }

        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(THOUSANDS_SEPARATOR);
            }
            grouped.push(ch);
        }

        grouped
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format_grouped())
    }
}

/// JSON 上の金額表現
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let amount = match RawAmount::deserialize(deserializer)? {
            RawAmount::Integer(value) => Ok(Self(value)),
            RawAmount::Float(value) => Self::from_f64(value),
            RawAmount::Text(value) => Self::parse(&value),
        };
        amount.map_err(serde::de::Error::custom)
    }
}
