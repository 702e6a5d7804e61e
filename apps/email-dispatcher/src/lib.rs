//! # Email Dispatcher ライブラリ
//!
//! 通知バッチの処理とハンドラを公開する。
//! 統合テスト用にルーターの組み立てを提供する。

pub mod config;
pub mod handler;
pub mod usecase;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use handler::{EventsState, health_check, receive_events};
use tower_http::trace::TraceLayer;
use usecase::EmailDispatcher;

/// ルーターを構築する
pub fn router(dispatcher: EmailDispatcher) -> Router {
    let events_state = Arc::new(EventsState { dispatcher });

    Router::new()
        .route("/health", get(health_check))
        .route("/events", post(receive_events))
        .with_state(events_state)
        .layer(TraceLayer::new_for_http())
}
