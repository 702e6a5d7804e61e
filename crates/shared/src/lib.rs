//! # Cinemail 共有ユーティリティ
//!
//! ディスパッチャとインフラ層で共通に使うユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - トレーシング初期化は `observability` feature の背後に置き、
//!   ライブラリクレートが subscriber に依存しないようにする

pub mod event_log;
pub mod health;
pub mod observability;

pub use health::HealthResponse;
