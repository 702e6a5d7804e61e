//! # ユースケース層
//!
//! Email Dispatcher のビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: メール送信・メトリクス送信を `Arc<dyn Trait>` で外部から注入
//! - **薄いハンドラ**: ハンドラは薄く保ち、ロジックはユースケースに集約
//!
//! ## モジュール構成
//!
//! - `notification`: 通知バッチの処理

pub mod notification;

pub use notification::{
    BatchEvent,
    BatchResponse,
    DispatchSettings,
    EmailDispatcher,
    TemplateRenderer,
};
