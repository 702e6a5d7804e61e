//! # 通知ユースケース
//!
//! キューから届いた通知リクエストのバッチを HTML メールとして送信する。
//!
//! ## モジュール構成
//!
//! - [`batch`] - バッチの入出力形式
//! - [`template_renderer`] - tera テンプレートエンジンによる HTML 生成
//! - [`dispatcher`] - 解析 + レンダリング + 送信 + メトリクスの統合

pub mod batch;
pub mod dispatcher;
pub mod template_renderer;

pub use batch::{BatchEvent, BatchResponse, BatchResponseBody, EventRecord};
pub use dispatcher::{DispatchSettings, EmailDispatcher};
pub use template_renderer::TemplateRenderer;
