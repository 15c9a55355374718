use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use ranksim::{
    ActionWeights, Gateway, GatewayConfig, HttpGateway, Item, ItemId, PageId, PageWeights,
    SimulationConfig, SimulationEngine, UserId,
};

/// Item id the stub service refuses.
const REFUSED_ITEM_ID: u64 = 13;

#[derive(Clone, Default)]
struct Received {
    items: Arc<Mutex<Vec<Value>>>,
    vote_events: Arc<Mutex<Vec<Value>>>,
}

async fn post_item(State(r): State<Received>, Json(body): Json<Value>) -> (StatusCode, String) {
    if body["item_id"] == json!(REFUSED_ITEM_ID) {
        return (StatusCode::UNPROCESSABLE_ENTITY, "duplicate item".to_string());
    }
    r.items.lock().unwrap().push(body);
    (StatusCode::OK, String::new())
}

async fn post_vote_event(State(r): State<Received>, Json(body): Json<Value>) -> StatusCode {
    r.vote_events.lock().unwrap().push(body);
    StatusCode::OK
}

async fn hacker_news() -> Json<Value> {
    Json(json!([
        {"item_id": 3, "rank": 1, "page": "HackerNews", "score": 4.5},
        {"item_id": 1, "rank": 2, "page": "HackerNews", "score": 2.0},
        {"item_id": 2, "rank": 3, "page": "HackerNews", "score": 0.5},
    ]))
}

async fn newest_broken() -> Json<Value> {
    Json(json!({"error": "rankings not computed"}))
}

async fn quality_news_down() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

async fn spawn_stub() -> (String, Received) {
    let received = Received::default();
    let app = Router::new()
        .route("/", get(|| async { "ok" }))
        .route("/items", post(post_item))
        .route("/vote_events", post(post_vote_event))
        .route("/rankings/hn", get(hacker_news))
        .route("/rankings/newest", get(newest_broken))
        .route("/rankings/qn", get(quality_news_down))
        .with_state(received.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), received)
}

fn gateway(base_url: &str) -> HttpGateway {
    HttpGateway::new(&GatewayConfig {
        base_url: base_url.to_string(),
        request_timeout_ms: 2_000,
    })
    .unwrap()
}

#[tokio::test]
async fn item_is_posted_as_snake_case_json() {
    let (base_url, received) = spawn_stub().await;
    let gw = gateway(&base_url);

    let item = Item::new(ItemId::new(1), UserId::from_pool(7));
    gw.post_item(&item).await.unwrap();

    let items = received.items.lock().unwrap().clone();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["item_id"], json!(1));
    assert_eq!(items[0]["author_id"], json!("user_7"));
    assert!(items[0]["created_at"].is_i64());
    assert!(items[0].get("parent_id").is_none());
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let (base_url, received) = spawn_stub().await;
    let gw = gateway(&base_url);

    let item = Item::new(ItemId::new(REFUSED_ITEM_ID), UserId::from_pool(1));
    let err = gw.post_item(&item).await.unwrap_err();
    assert!(err.is_status());
    assert!(err.to_string().contains("422"));
    assert!(received.items.lock().unwrap().is_empty());

    let err = gw.get_ranking(PageId::QualityNews).await.unwrap_err();
    assert!(err.is_status());
}

#[tokio::test]
async fn ranking_is_parsed_in_service_order() {
    let (base_url, _) = spawn_stub().await;
    let ranking = gateway(&base_url).get_ranking(PageId::HackerNews).await.unwrap();

    let ids: Vec<u64> = ranking.iter().map(|s| s.item_id.get()).collect();
    assert_eq!(ids, vec![3, 1, 2]);
    assert!(ranking.iter().all(|s| s.page == PageId::HackerNews));
}

#[tokio::test]
async fn non_sequence_ranking_is_malformed() {
    let (base_url, _) = spawn_stub().await;
    let err = gateway(&base_url).get_ranking(PageId::Newest).await.unwrap_err();
    assert!(err.is_malformed());
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let gw = gateway("http://127.0.0.1:9");
    let err = gw.get_ranking(PageId::HackerNews).await.unwrap_err();
    assert!(!err.is_status());
    assert!(!err.is_malformed());

    let err = gw
        .wait_until_ready(Duration::from_millis(200), Duration::from_millis(50))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not reachable"));
}

#[tokio::test]
async fn wait_until_ready_returns_once_service_answers() {
    let (base_url, _) = spawn_stub().await;
    gateway(&base_url)
        .wait_until_ready(Duration::from_secs(2), Duration::from_millis(50))
        .await
        .unwrap();
}

#[tokio::test]
async fn engine_drives_stub_service() {
    let (base_url, received) = spawn_stub().await;
    let config = SimulationConfig {
        seed_items: 3,
        steady_iterations: 6,
        warmup_ms: 0,
        step_delay_ms: 0,
        user_pool_size: 4,
        action_weights: ActionWeights {
            post_item: 0.0,
            post_vote_event: 1.0,
        },
        page_weights: PageWeights {
            newest: 0.0,
            hacker_news: 1.0,
            quality_news: 0.0,
        },
        rng_seed: Some(21),
    };
    let mut engine = SimulationEngine::new(config, gateway(&base_url)).unwrap();
    let report = engine.run().await.unwrap();

    assert_eq!(report.items_submitted, 3);
    assert_eq!(report.votes_submitted, 6);

    let votes = received.vote_events.lock().unwrap().clone();
    assert_eq!(votes.len(), 6);
    for (n, vote) in (1u64..).zip(&votes) {
        assert_eq!(vote["vote_event_id"], json!(n));
        assert_eq!(vote["vote"], json!(1));
        assert_eq!(vote["page"], json!("HackerNews"));
        let rank = vote["rank"].as_u64().unwrap();
        let expected_item = [3, 1, 2][usize::try_from(rank).unwrap() - 1];
        assert_eq!(vote["item_id"], json!(expected_item));
        assert!(vote["user_id"].as_str().unwrap().starts_with("user_"));
        assert!(vote["created_at"].is_i64());
    }
}
