//! `metrics` ファサード経由のメトリクス送信実装
//!
//! プロセスにインストールされたレコーダーにカウンタを記録する。
//! 本番では [`RecorderMetricsSink::with_prometheus_exporter`] で Prometheus
//! エクスポータをインストールしてから使う。

use std::net::SocketAddr;

use async_trait::async_trait;
use cinemail_domain::notification::NotificationError;
use metrics::{Unit, counter, describe_counter};
use metrics_exporter_prometheus::PrometheusBuilder;

use super::{CountMetric, MetricName, MetricsSink};

/// `metrics` レコーダーへのメトリクス送信
#[derive(Debug, Clone, Default)]
pub struct RecorderMetricsSink;

impl RecorderMetricsSink {
    pub fn new() -> Self {
        Self
    }

    /// Prometheus エクスポータをグローバルレコーダーとしてインストールする
    ///
    /// `addr` で `/metrics` を公開する。tokio ランタイム内で呼ぶこと。
    pub fn with_prometheus_exporter(addr: SocketAddr) -> Result<Self, NotificationError> {
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .map_err(|e| {
                NotificationError::MetricsFailed(format!("Prometheus エクスポータ起動失敗: {e}"))
            })?;

        describe_metrics();
        Ok(Self)
    }

    /// カウンタを記録する
    pub fn record(&self, metric: &CountMetric) {
        counter!(
            metric.name.counter_key(),
            "environment" => metric.environment.clone(),
            "email_type" => metric.email_type.clone()
        )
        .increment(metric.value as u64);
    }
}

/// インストール済みのレコーダーにカウンタの説明を登録する
fn describe_metrics() {
    describe_counter!(
        MetricName::EmailSent.counter_key(),
        Unit::Count,
        "Total number of emails accepted by the mail provider."
    );
    describe_counter!(
        MetricName::EmailError.counter_key(),
        Unit::Count,
        "Total number of notification requests that failed."
    );
}

#[async_trait]
impl MetricsSink for RecorderMetricsSink {
    async fn emit_count(&self, metric: &CountMetric) -> Result<(), NotificationError> {
        self.record(metric);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use metrics_util::{
        MetricKind,
        debugging::{DebugValue, DebuggingRecorder},
    };

    use super::*;

    #[test]
    fn recordがラベル付きカウンタを加算する() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        let sink = RecorderMetricsSink::new();
        let metric = CountMetric {
            name:        MetricName::EmailSent,
            value:       1.0,
            environment: "dev".to_string(),
            email_type:  "PASSWORD_RESET".to_string(),
        };

        metrics::with_local_recorder(&recorder, || {
            sink.record(&metric);
            sink.record(&metric);
        });

        let snapshot = snapshotter.snapshot().into_vec();
        let counter = snapshot
            .iter()
            .find(|(key, _, _, _)| {
                key.kind() == MetricKind::Counter
                    && key.key().name() == "email_service_email_sent_total"
            })
            .expect("カウンタが記録されていること");

        assert_eq!(counter.3, DebugValue::Counter(2));
        let labels: Vec<(&str, &str)> = counter
            .0
            .key()
            .labels()
            .map(|label| (label.key(), label.value()))
            .collect();
        assert!(labels.contains(&("environment", "dev")));
        assert!(labels.contains(&("email_type", "PASSWORD_RESET")));
    }

    #[test]
    fn カウンタの説明と単位が登録される() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        metrics::with_local_recorder(&recorder, || {
            describe_metrics();
            RecorderMetricsSink::new().record(&CountMetric {
                name:        MetricName::EmailError,
                value:       1.0,
                environment: "dev".to_string(),
                email_type:  "unknown".to_string(),
            });
        });

        let snapshot = snapshotter.snapshot().into_vec();
        let (_, unit, description, value) = snapshot
            .iter()
            .find(|(key, _, _, _)| key.key().name() == "email_service_email_error_total")
            .expect("カウンタが記録されていること");

        assert_eq!(unit, &Some(Unit::Count));
        assert_eq!(
            description.as_ref().map(|d| d.to_string()),
            Some("Total number of notification requests that failed.".to_string())
        );
        assert_eq!(value, &DebugValue::Counter(1));
    }
}
