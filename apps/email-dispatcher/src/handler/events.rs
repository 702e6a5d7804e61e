//! # イベント受信ハンドラ
//!
//! キューからの通知バッチを受け取り、ディスパッチャに渡す。
//!
//! ## エンドポイント
//!
//! ```text
//! POST /events
//! ```
//!
//! ボディが JSON として壊れていても 400 にはせず、空のバッチとして処理する。
//! 1 件ごとの成否はレスポンスの `results` に入り、HTTP ステータスは常に 200。

use std::sync::Arc;

use axum::{Json, body::Bytes, extract::State};

use crate::usecase::{BatchEvent, BatchResponse, EmailDispatcher};

/// イベント受信ハンドラの State
pub struct EventsState {
    pub dispatcher: EmailDispatcher,
}

/// 通知バッチを処理する
pub async fn receive_events(
    State(state): State<Arc<EventsState>>,
    body: Bytes,
) -> Json<BatchResponse> {
    let batch = BatchEvent::from_slice(&body);
    Json(state.dispatcher.dispatch(batch).await)
}
