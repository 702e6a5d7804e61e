//! # テスト用モック
//!
//! ユースケーステストで使用するインメモリモック。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! cinemail-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cinemail_domain::notification::{EmailMessage, MessageId, NotificationError};

use crate::{
    mail::MailSender,
    metrics_sink::{CountMetric, MetricsSink},
};

// ===== MockMailSender =====

/// 送信内容を記録するモック
///
/// 既定では常に成功し、`mock-message-{連番}` を返す。
/// [`fail_for`](Self::fail_for) で指定した宛先への送信だけを失敗させられる。
#[derive(Clone, Default)]
pub struct MockMailSender {
    sent_emails:       Arc<Mutex<Vec<EmailMessage>>>,
    failing_addresses: Arc<Mutex<Vec<String>>>,
}

impl MockMailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定した宛先への送信を失敗させる
    pub fn fail_for(&self, address: &str) {
        self.failing_addresses
            .lock()
            .unwrap()
            .push(address.to_string());
    }

    /// 送信に成功したメールの一覧
    pub fn sent_emails(&self) -> Vec<EmailMessage> {
        self.sent_emails.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailSender for MockMailSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<MessageId, NotificationError> {
        if self
            .failing_addresses
            .lock()
            .unwrap()
            .iter()
            .any(|address| address == &email.to)
        {
            return Err(NotificationError::SendFailed(format!(
                "mock: {} への送信を拒否",
                email.to
            )));
        }

        let mut sent = self.sent_emails.lock().unwrap();
        sent.push(email.clone());
        Ok(MessageId::new(format!("mock-message-{}", sent.len())))
    }
}

// ===== MockMetricsSink =====

/// 送信されたメトリクスを記録するモック
#[derive(Clone, Default)]
pub struct MockMetricsSink {
    emitted: Arc<Mutex<Vec<CountMetric>>>,
    failing: Arc<Mutex<bool>>,
}

impl MockMetricsSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以降の送信をすべて失敗させる（記録は行う）
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    /// 送信されたメトリクスの一覧
    pub fn emitted(&self) -> Vec<CountMetric> {
        self.emitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetricsSink for MockMetricsSink {
    async fn emit_count(&self, metric: &CountMetric) -> Result<(), NotificationError> {
        self.emitted.lock().unwrap().push(metric.clone());

        if *self.failing.lock().unwrap() {
            return Err(NotificationError::MetricsFailed(
                "mock: メトリクス送信失敗".to_string(),
            ));
        }
        Ok(())
    }
}
