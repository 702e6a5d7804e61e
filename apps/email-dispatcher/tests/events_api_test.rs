//! `/events` と `/health` の統合テスト
//!
//! モックの送信・メトリクスを注入したルーターに `oneshot` でリクエストを送る。

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use cinemail_email_dispatcher::{
    router,
    usecase::{DispatchSettings, EmailDispatcher, TemplateRenderer},
};
use cinemail_infra::mock::{MockMailSender, MockMetricsSink};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app(sender: &MockMailSender) -> Router {
    let dispatcher = EmailDispatcher::new(
        Arc::new(sender.clone()),
        Arc::new(MockMetricsSink::new()),
        TemplateRenderer::new().unwrap(),
        DispatchSettings {
            environment: "test".to_string(),
        },
    );
    router(dispatcher)
}

fn sns_event(messages: &[Value]) -> String {
    let records: Vec<Value> = messages
        .iter()
        .map(|message| json!({ "Sns": { "Message": message.to_string() } }))
        .collect();
    json!({ "Records": records }).to_string()
}

async fn post_events(app: Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/events")
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn 予約確認をレンダリングして送信する() {
    let sender = MockMailSender::new();
    let body = sns_event(&[json!({
        "emailType": "BOOKING_CONFIRMATION",
        "toEmail": "an@example.vn",
        "subject": "Xác nhận đặt vé BK7Q2X",
        "templateData": {
            "customerName": "Nguyễn Văn An",
            "movieTitle": "Lật Mặt 7",
            "totalSeats": 2,
            "totalAmount": 1234567,
            "bookingCode": "BK7Q2X",
            "qrCodeUrl": "https://cdn.q2k.click/qr/BK7Q2X.png",
        },
    })]);

    let (status, json) = post_events(app(&sender), body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["statusCode"], 200);
    assert_eq!(json["body"]["processedCount"], 1);
    assert_eq!(
        json["body"]["results"],
        json!([{
            "status": "success",
            "to": "an@example.vn",
            "emailType": "BOOKING_CONFIRMATION",
            "messageId": "mock-message-1",
        }])
    );

    let sent = sender.sent_emails();
    assert_eq!(sent[0].subject, "Xác nhận đặt vé BK7Q2X");
    assert!(sent[0].html_body.contains("1.234.567 ₫"));
    assert!(sent[0].html_body.contains("Nguyễn Văn An"));
    assert!(
        sent[0]
            .html_body
            .contains(r#"src="https://cdn.q2k.click/qr/BK7Q2X.png""#)
    );
}

#[tokio::test]
async fn 不正なレコードを含むバッチでも全件の結果を返す() {
    let sender = MockMailSender::new();
    let body = sns_event(&[
        json!({ "emailType": "PASSWORD_RESET", "toEmail": "a@b.com", "subject": "S" }),
        json!({ "emailType": "PASSWORD_RESET", "subject": "S" }),
        json!({ "emailType": "REFUND_CONFIRMATION", "toEmail": "c@d.com", "subject": "S" }),
    ]);

    let (status, json) = post_events(app(&sender), body).await;

    assert_eq!(status, StatusCode::OK);
    let results = json["body"]["results"].as_array().unwrap();
    let statuses: Vec<&str> = results
        .iter()
        .map(|r| r["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, vec!["success", "error", "success"]);
    assert_eq!(results[1]["emailType"], "PASSWORD_RESET");
    assert!(
        results[1]["error"]
            .as_str()
            .unwrap()
            .contains("toEmail")
    );
    assert_eq!(json["body"]["processedCount"], 3);
    assert_eq!(sender.sent_emails().len(), 2);
}

#[tokio::test]
async fn jsonでないボディは空のバッチとして200を返す() {
    let sender = MockMailSender::new();

    let (status, json) = post_events(app(&sender), "not json").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["body"]["message"], "Email processing completed");
    assert_eq!(json["body"]["results"], json!([]));
    assert_eq!(json["body"]["processedCount"], 0);
    assert!(json["body"]["timestamp"].is_string());
    assert!(sender.sent_emails().is_empty());
}

#[tokio::test]
async fn healthはhealthyを返す() {
    let response = app(&MockMailSender::new())
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}
