//! CloudWatch メトリクス送信実装
//!
//! `PutMetricData` でカスタムメトリクスを送信する。

use std::time::SystemTime;

use async_trait::async_trait;
use aws_sdk_cloudwatch::{
    Client,
    error::DisplayErrorContext,
    primitives::DateTime,
    types::{Dimension, MetricDatum, StandardUnit},
};
use cinemail_domain::notification::NotificationError;

use super::{CountMetric, MetricsSink};

/// 既定の名前空間
pub const DEFAULT_NAMESPACE: &str = "EmailService";

/// CloudWatch メトリクス送信
pub struct CloudWatchMetricsSink {
    client:    Client,
    namespace: String,
}

impl CloudWatchMetricsSink {
    pub fn new(client: Client, namespace: String) -> Self {
        Self { client, namespace }
    }
}

fn dimension(name: &str, value: &str) -> Dimension {
    Dimension::builder().name(name).value(value).build()
}

/// CloudWatch に送る 1 データポイントを構築する
fn metric_datum(metric: &CountMetric) -> MetricDatum {
    MetricDatum::builder()
        .metric_name(metric.name.as_str())
        .dimensions(dimension("Environment", &metric.environment))
        .dimensions(dimension("EmailType", &metric.email_type))
        .value(metric.value)
        .unit(StandardUnit::Count)
        .timestamp(DateTime::from(SystemTime::now()))
        .build()
}

#[async_trait]
impl MetricsSink for CloudWatchMetricsSink {
    async fn emit_count(&self, metric: &CountMetric) -> Result<(), NotificationError> {
        self.client
            .put_metric_data()
            .namespace(&self.namespace)
            .metric_data(metric_datum(metric))
            .send()
            .await
            .map_err(|e| {
                NotificationError::MetricsFailed(format!(
                    "CloudWatch 送信失敗: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(())
    }
}
