//! # Observability 基盤
//!
//! `LOG_FORMAT` で JSON / Pretty を切り替えてトレーシングを初期化する。

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 本番（CloudWatch Logs で構造化検索する）
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    /// `LOG_FORMAT` の値を解釈する（未設定・不正値は Pretty）
    ///
    /// subscriber 初期化前に呼ばれるため、不正値の警告は stderr に出す。
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            None => Self::default(),
            Some("json") => Self::Json,
            Some("pretty") => Self::Pretty,
            Some(other) => {
                eprintln!("WARNING: unknown LOG_FORMAT={other:?}, falling back to pretty");
                Self::Pretty
            }
        }
    }
}

/// トレーシング初期化設定
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub service_name: String,
    pub log_format:   LogFormat,
}

impl TracingConfig {
    pub fn from_env(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            log_format:   LogFormat::parse(std::env::var("LOG_FORMAT").ok().as_deref()),
        }
    }
}

/// トレーシングを初期化する
///
/// `RUST_LOG` 未設定時のフィルタは `info,cinemail=debug`。
/// JSON ではイベントのフィールドをトップレベルに展開し、現在の span
/// （`service` を含む）を併記する。
#[cfg(feature = "observability")]
pub fn init_tracing(config: &TracingConfig) {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::{EnvFilter, Layer as _, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,cinemail=debug"));

    let fmt_layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .init();

    tracing::debug!(
        service = %config.service_name,
        log_format = ?config.log_format,
        "トレーシングを初期化しました"
    );
}
