//! Chat and dashboard client behavior against a stub backend.

use axum::extract::{Multipart, Query};
use axum::routing::{get, post};
use axum::{Json, Router};
use bankline::audio::AudioPayload;
use bankline::chat::{ChatClient, SessionContext};
use bankline::config::BackendConfig;
use bankline::dashboard::{DashboardClient, InsightPriority, SpendingTrend};
use bankline::BanklineError;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tokio::net::TcpListener;

/// Serve `app` on an ephemeral port and return its `/api` base URL.
async fn spawn_backend(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api", addr)
}

fn config_for(base_url: String) -> BackendConfig {
    BackendConfig {
        base_url,
        chat_timeout_secs: 5,
        voice_timeout_secs: 5,
    }
}

async fn chat_handler(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({
        "message": format!("Echo: {}", body["message"].as_str().unwrap_or("")),
        "intent": "account_balance",
        "confidence": 0.92,
        "timestamp": "2025-03-14T09:26:53",
        "suggestions": ["View transactions", "Transfer money"],
        "requiresAction": false
    }))
}

async fn voice_handler(mut multipart: Multipart) -> Json<Value> {
    let mut audio_len = 0;
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() == Some("audio") {
            audio_len = field.text().await.unwrap().len();
        }
    }
    Json(json!({
        "message": format!("Received {} bytes of audio", audio_len),
        "intent": "voice_query",
        "confidence": 0.8,
        "suggestions": []
    }))
}

async fn intents_handler() -> Json<Value> {
    Json(json!([
        { "name": "account_balance", "confidence": 1.0 },
        { "name": "transaction_history", "confidence": 1.0 }
    ]))
}

async fn knowledge_handler(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let query = params.get("query").cloned().unwrap_or_default();
    Json(json!([{
        "id": "kb-1",
        "title": format!("About {}", query),
        "content": "Standard overdraft fees are £5 per day.",
        "category": "fees",
        "relevanceScore": 0.9
    }]))
}

#[tokio::test]
async fn send_message_round_trips_the_reply() {
    let app = Router::new().route("/api/chatbot/chat", post(chat_handler));
    let base_url = spawn_backend(app).await;

    let client = ChatClient::new(&config_for(base_url)).unwrap();
    let session = SessionContext::new("demo_user");

    let reply = client
        .send_message("Check my account balance", &session)
        .await
        .unwrap();

    assert_eq!(reply.message, "Echo: Check my account balance");
    assert_eq!(reply.intent.as_deref(), Some("account_balance"));
    assert_eq!(reply.confidence, Some(0.92));
    assert_eq!(reply.suggestions.len(), 2);
}

#[tokio::test]
async fn unreachable_backend_maps_to_network_error() {
    // Grab a free port, then drop the listener so nothing answers
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ChatClient::new(&config_for(format!("http://{}/api", addr))).unwrap();
    let session = SessionContext::new("demo_user");

    let outcome = client.send_message("hello", &session).await;
    assert!(matches!(outcome, Err(BanklineError::Network(_))));
}

#[tokio::test]
async fn slow_backend_maps_to_timeout_error() {
    async fn slow_handler(Json(_body): Json<Value>) -> Json<Value> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Json(json!({ "message": "too late" }))
    }

    let app = Router::new().route("/api/chatbot/chat", post(slow_handler));
    let base_url = spawn_backend(app).await;

    let config = BackendConfig {
        base_url,
        chat_timeout_secs: 1,
        voice_timeout_secs: 1,
    };
    let client = ChatClient::new(&config).unwrap();
    let session = SessionContext::new("demo_user");

    let outcome = client.send_message("hello", &session).await;
    assert!(matches!(outcome, Err(BanklineError::Timeout(1))));
}

#[tokio::test]
async fn backend_error_status_maps_to_network_error() {
    async fn failing_handler(Json(_body): Json<Value>) -> (axum::http::StatusCode, String) {
        (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            "boom".to_string(),
        )
    }

    let app = Router::new().route("/api/chatbot/chat", post(failing_handler));
    let base_url = spawn_backend(app).await;

    let client = ChatClient::new(&config_for(base_url)).unwrap();
    let session = SessionContext::new("demo_user");

    let outcome = client.send_message("hello", &session).await;
    assert!(matches!(outcome, Err(BanklineError::Network(_))));
}

#[tokio::test]
async fn send_voice_uploads_the_clip_as_multipart() {
    let app = Router::new().route("/api/chatbot/voice", post(voice_handler));
    let base_url = spawn_backend(app).await;

    let client = ChatClient::new(&config_for(base_url)).unwrap();
    let session = SessionContext::new("demo_user");

    let payload = AudioPayload {
        data: vec![7u8; 640],
        sample_rate: 16000,
        channels: 1,
    };

    let reply = client.send_voice(&payload, &session).await.unwrap();
    // 640 bytes of base64 encode to 856 characters
    assert_eq!(reply.message, "Received 856 bytes of audio");
}

#[tokio::test]
async fn supported_intents_and_knowledge_base_decode() {
    let app = Router::new()
        .route("/api/chatbot/intents", get(intents_handler))
        .route("/api/chatbot/knowledge-base", get(knowledge_handler));
    let base_url = spawn_backend(app).await;

    let client = ChatClient::new(&config_for(base_url)).unwrap();

    let intents = client.supported_intents().await.unwrap();
    assert_eq!(intents.len(), 2);
    assert_eq!(intents[0].name, "account_balance");

    let articles = client.search_knowledge_base("overdraft fees").await.unwrap();
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].title, "About overdraft fees");
    assert_eq!(articles[0].relevance_score, Some(0.9));
}

#[tokio::test]
async fn dashboard_snapshot_fetches_all_three_reads() {
    async fn insights() -> Json<Value> {
        Json(json!([{
            "category": "spending",
            "insight": "Dining spend rose 23% this month.",
            "recommendation": "Consider a dining budget.",
            "impact": 195.5,
            "priority": "high"
        }]))
    }
    async fn spending() -> Json<Value> {
        Json(json!([{
            "category": "dining",
            "amount": 850.5,
            "percentage": 25.3,
            "trend": "increasing",
            "comparison": "above_average"
        }]))
    }
    async fn notifications() -> Json<Value> {
        Json(json!({
            "notifications": [{
                "id": "n-1",
                "title": "Large transaction",
                "message": "A £500 payment left your account.",
                "type": "alert",
                "read": false
            }],
            "count": 1
        }))
    }

    let app = Router::new()
        .route("/api/advanced/financial-insights", get(insights))
        .route("/api/advanced/spending-patterns", get(spending))
        .route("/api/advanced/notifications/unread", get(notifications));
    let base_url = spawn_backend(app).await;

    let client = DashboardClient::new(&config_for(base_url)).unwrap();
    let snapshot = client.snapshot().await.unwrap();

    assert_eq!(snapshot.insights.len(), 1);
    assert_eq!(snapshot.insights[0].priority, InsightPriority::High);
    assert_eq!(snapshot.spending[0].trend, SpendingTrend::Increasing);
    assert_eq!(snapshot.notifications.count, 1);
    assert!(!snapshot.notifications.notifications[0].read);
}
