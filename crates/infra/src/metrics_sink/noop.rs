//! Noop メトリクス送信実装

use async_trait::async_trait;
use cinemail_domain::notification::NotificationError;

use super::{CountMetric, MetricsSink};

/// Noop メトリクス送信（debug ログのみ）
#[derive(Debug, Clone)]
pub struct NoopMetricsSink;

#[async_trait]
impl MetricsSink for NoopMetricsSink {
    async fn emit_count(&self, metric: &CountMetric) -> Result<(), NotificationError> {
        tracing::debug!(
            metric = metric.name.as_str(),
            environment = %metric.environment,
            email_type = %metric.email_type,
            "Noop: メトリクス送信をスキップ"
        );
        Ok(())
    }
}
