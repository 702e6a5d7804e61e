//! # バッチの入出力形式
//!
//! 入力は SNS 通知イベントの形をとる:
//!
//! ```json
//! { "Records": [ { "Sns": { "Message": "{\"emailType\": ...}" } } ] }
//! ```
//!
//! 出力は 1 件ごとの処理結果を入力順に並べたエンベロープ:
//!
//! ```json
//! {
//!   "statusCode": 200,
//!   "body": {
//!     "message": "Email processing completed",
//!     "results": [ ... ],
//!     "processedCount": 1,
//!     "timestamp": "2025-03-01T12:00:00Z"
//!   }
//! }
//! ```

use chrono::{DateTime, Utc};
use cinemail_domain::notification::NotificationResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 完了メッセージ
pub const COMPLETED_MESSAGE: &str = "Email processing completed";

/// メッセージ本文が取り出せないレコードの代替値（検証で失敗させる）
const EMPTY_MESSAGE: &str = "{}";

/// 通知リクエストのバッチ
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchEvent {
    pub records: Vec<EventRecord>,
}

/// バッチ内の 1 レコード
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "Sns", default)]
    sns: Option<SnsEnvelope>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
struct SnsEnvelope {
    #[serde(rename = "Message", default)]
    message: Option<String>,
}

impl BatchEvent {
    /// リクエストボディからバッチを組み立てる
    ///
    /// JSON でない、または `Records` 配列を持たないボディは空のバッチとして扱う。
    /// 形の崩れたレコードは空メッセージのレコードになる（バッチ全体は失敗させない）。
    pub fn from_slice(body: &[u8]) -> Self {
        let Ok(Value::Object(mut event)) = serde_json::from_slice::<Value>(body) else {
            return Self::default();
        };
        let Some(Value::Array(records)) = event.remove("Records") else {
            return Self::default();
        };

        Self {
            records: records
                .into_iter()
                .map(|record| serde_json::from_value(record).unwrap_or_default())
                .collect(),
        }
    }

    /// メッセージ文字列の列からバッチを組み立てる
    pub fn from_messages<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            records: messages.into_iter().map(EventRecord::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl EventRecord {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            sns: Some(SnsEnvelope {
                message: Some(message.into()),
            }),
        }
    }

    /// 埋め込まれたメッセージ文字列（なければ `{}`）
    pub fn message(&self) -> &str {
        self.sns
            .as_ref()
            .and_then(|sns| sns.message.as_deref())
            .unwrap_or(EMPTY_MESSAGE)
    }
}

/// バッチ処理のレスポンス
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub status_code: u16,
    pub body:        BatchResponseBody,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponseBody {
    pub message:         String,
    pub results:         Vec<NotificationResult>,
    pub processed_count: usize,
    pub timestamp:       DateTime<Utc>,
}

impl BatchResponse {
    /// 処理結果からレスポンスを組み立てる
    pub fn completed(results: Vec<NotificationResult>, timestamp: DateTime<Utc>) -> Self {
        Self {
            status_code: 200,
            body:        BatchResponseBody {
                message: COMPLETED_MESSAGE.to_string(),
                processed_count: results.len(),
                results,
                timestamp,
            },
        }
    }
}
