//! # メトリクス送信
//!
//! 送信結果のカウンタを外部のメトリクス基盤に送る。
//!
//! ## 設計方針
//!
//! - **ベストエフォート**: 送信失敗はエラーとして返すが、呼び出し側はログに残して握りつぶす
//! - **3 つの実装**: CloudWatch（本番用）、`metrics` レコーダー（Prometheus エクスポータで公開）、Noop
//! - **環境変数切替**: `METRICS_BACKEND` でランタイム選択
//!
//! ## ディメンション
//!
//! | 名前 | 値 |
//! |------|----|
//! | `Environment` | デプロイ環境（`dev` / `prod` 等） |
//! | `EmailType` | 通知種別（判定できない場合は `unknown`） |

mod cloudwatch;
mod noop;
mod recorder;

use async_trait::async_trait;
use cinemail_domain::notification::{EmailType, NotificationError};
pub use cloudwatch::CloudWatchMetricsSink;
pub use noop::NoopMetricsSink;
pub use recorder::RecorderMetricsSink;

/// 通知種別が判定できなかったときのディメンション値
pub const UNKNOWN_EMAIL_TYPE: &str = "unknown";

/// カウンタ名
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::IntoStaticStr, strum::Display)]
pub enum MetricName {
    /// 送信成功
    EmailSent,
    /// 失敗（解析・検証・送信）
    EmailError,
}

impl MetricName {
    /// CloudWatch 上のメトリクス名
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// `metrics` レコーダー上のカウンタキー
    pub fn counter_key(&self) -> &'static str {
        match self {
            Self::EmailSent => "email_service_email_sent_total",
            Self::EmailError => "email_service_email_error_total",
        }
    }
}

/// カウンタメトリクス 1 件
#[derive(Debug, Clone, PartialEq)]
pub struct CountMetric {
    pub name:        MetricName,
    pub value:       f64,
    pub environment: String,
    pub email_type:  String,
}

impl CountMetric {
    /// 値 1 のカウンタを作成する
    pub fn one(name: MetricName, environment: &str, email_type: Option<&EmailType>) -> Self {
        Self {
            name,
            value: 1.0,
            environment: environment.to_string(),
            email_type: email_type
                .map_or(UNKNOWN_EMAIL_TYPE, EmailType::as_str)
                .to_string(),
        }
    }
}

/// メトリクス送信トレイト
#[async_trait]
pub trait MetricsSink: Send + Sync {
    /// カウンタを送信する
    async fn emit_count(&self, metric: &CountMetric) -> Result<(), NotificationError>;
}
