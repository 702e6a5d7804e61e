//! # Email Dispatcher 設定
//!
//! 環境変数から Email Dispatcher の設定を読み込む。
//!
//! すべての変数にデフォルト値があり、未設定でもローカル開発用の構成
//! （Noop 送信・Noop メトリクス）で起動できる。

use std::env;

use thiserror::Error;

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// ポート番号として解釈できない
    #[error("{name} は有効なポート番号である必要があります: {value:?}")]
    InvalidPort { name: &'static str, value: String },

    /// 未知のバックエンド名
    #[error("{name} に未知の値が指定されました: {value:?}（{expected} のいずれか）")]
    UnknownBackend {
        name:     &'static str,
        value:    String,
        expected: &'static str,
    },
}

/// Email Dispatcher の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// バインドアドレス
    pub host:        String,
    /// ポート番号
    pub port:        u16,
    /// デプロイ環境（メトリクスの `Environment` ディメンション）
    pub environment: String,
    /// AWS リージョン（未設定の場合は SDK のプロバイダチェーンに任せる）
    pub aws_region:  Option<String>,
    /// メール送信設定
    pub mail:        MailConfig,
    /// メトリクス送信設定
    pub metrics:     MetricsConfig,
}

/// メール送信の設定
///
/// `MAIL_BACKEND` 環境変数で送信バックエンドを切り替える:
/// - `ses`: Amazon SES v2 経由で送信（本番）
/// - `smtp`: Mailpit（開発）/ SMTP サーバー経由で送信
/// - `noop`: 送信しない（ログ出力のみ）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailConfig {
    pub backend:      MailBackend,
    /// 送信元メールアドレス
    pub from_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailBackend {
    Ses,
    Smtp { host: String, port: u16 },
    Noop,
}

/// メトリクス送信の設定
///
/// `METRICS_BACKEND` 環境変数で送信先を切り替える:
/// - `cloudwatch`: CloudWatch `PutMetricData`
/// - `prometheus`: Prometheus エクスポータ（`METRICS_PORT` で `/metrics` を公開）
/// - `noop`: 送信しない
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricsConfig {
    CloudWatch { namespace: String },
    Prometheus { port: u16 },
    Noop,
}

impl DispatcherConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// 空文字列は未設定として扱う。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(Self {
            host:        var("DISPATCHER_HOST", "0.0.0.0"),
            port:        parse_port("DISPATCHER_PORT", &var("DISPATCHER_PORT", "3003"))?,
            environment: var("ENVIRONMENT", "dev"),
            aws_region:  lookup("AWS_REGION").filter(|value| !value.trim().is_empty()),
            mail:        MailConfig {
                backend:      match var("MAIL_BACKEND", "noop").as_str() {
                    "ses" => MailBackend::Ses,
                    "smtp" => MailBackend::Smtp {
                        host: var("SMTP_HOST", "localhost"),
                        port: parse_port("SMTP_PORT", &var("SMTP_PORT", "1025"))?,
                    },
                    "noop" => MailBackend::Noop,
                    other => {
                        return Err(ConfigError::UnknownBackend {
                            name:     "MAIL_BACKEND",
                            value:    other.to_string(),
                            expected: "ses / smtp / noop",
                        });
                    }
                },
                from_address: var("FROM_EMAIL", "noreply@movieticket.com"),
            },
            metrics:     match var("METRICS_BACKEND", "noop").as_str() {
                "cloudwatch" => MetricsConfig::CloudWatch {
                    namespace: var("METRICS_NAMESPACE", "EmailService"),
                },
                "prometheus" => MetricsConfig::Prometheus {
                    port: parse_port("METRICS_PORT", &var("METRICS_PORT", "9464"))?,
                },
                "noop" => MetricsConfig::Noop,
                other => {
                    return Err(ConfigError::UnknownBackend {
                        name:     "METRICS_BACKEND",
                        value:    other.to_string(),
                        expected: "cloudwatch / prometheus / noop",
                    });
                }
            },
        })
    }
}

fn parse_port(name: &'static str, value: &str) -> Result<u16, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidPort {
        name,
        value: value.to_string(),
    })
}
