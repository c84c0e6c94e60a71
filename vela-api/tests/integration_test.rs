use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, NaiveDate, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use vela_api::{app, AppState};
use vela_core::memory::{
    InMemoryAudits, InMemoryListingPrices, InMemoryMarketFactors, InMemoryOccupancy,
    InMemoryPricingRules, InMemoryRoomTypes, InMemoryRuns, InMemorySeasonality,
};
use vela_core::models::RoomType;
use vela_revenue::{CalendarService, EngineStores, PricingRunOrchestrator};

struct TestApp {
    app: Router,
    room_types: Arc<InMemoryRoomTypes>,
    occupancy: Arc<InMemoryOccupancy>,
}

fn test_app() -> TestApp {
    let room_types = Arc::new(InMemoryRoomTypes::default());
    let rules = Arc::new(InMemoryPricingRules::default());
    let seasonality = Arc::new(InMemorySeasonality::default());
    let market_factors = Arc::new(InMemoryMarketFactors::default());
    let occupancy = Arc::new(InMemoryOccupancy::default());
    let listing_prices = Arc::new(InMemoryListingPrices::default());
    let audits = Arc::new(InMemoryAudits::default());
    let runs = Arc::new(InMemoryRuns::default());

    let stores = EngineStores {
        room_types: room_types.clone(),
        rules,
        seasonality,
        market_factors,
        occupancy: occupancy.clone(),
        listing_prices: listing_prices.clone(),
        audits: audits.clone(),
        runs: runs.clone(),
    };

    let state = AppState {
        orchestrator: PricingRunOrchestrator::new(stores),
        calendar: CalendarService::new(listing_prices, audits),
        runs,
    };

    TestApp {
        app: app(state),
        room_types,
        occupancy,
    }
}

fn seed_room_type(fixture: &TestApp) -> Uuid {
    let id = Uuid::new_v4();
    fixture.room_types.insert(RoomType {
        id,
        name: "Garden Suite".to_string(),
        location_id: None,
        base_price: Some(10000.0),
        min_price: Some(8000.0),
        max_price: Some(15000.0),
        is_active: true,
    });
    id
}

fn future_date(days: i64) -> NaiveDate {
    Utc::now().date_naive() + Duration::days(days)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn json_request(method: &str, uri: String, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: String) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let fixture = test_app();
    let (status, body) = send(&fixture.app, get_request("/health".to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_run_pricing_then_read_calendar_and_breakdown() {
    let fixture = test_app();
    let room_type_id = seed_room_type(&fixture);
    let from = future_date(10);
    let to = future_date(11);
    fixture.occupancy.insert(room_type_id, from, 50.0);
    fixture.occupancy.insert(room_type_id, to, 60.0);

    let (status, body) = send(
        &fixture.app,
        json_request(
            "POST",
            format!("/v1/room-types/{room_type_id}/pricing-runs"),
            json!({ "from": from, "to": to }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["priced"], 2);

    let (status, body) = send(
        &fixture.app,
        get_request(format!(
            "/v1/room-types/{room_type_id}/calendar?from={from}&to={to}"
        )),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let days = body.as_array().unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["price"], 10000.0);
    assert_eq!(days[0]["has_override"], false);

    let (status, body) = send(
        &fixture.app,
        get_request(format!(
            "/v1/room-types/{room_type_id}/calendar/{from}/breakdown"
        )),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["breakdown"]["base_price"], 10000.0);
    assert_eq!(body["breakdown"]["final_price"], 10000.0);

    let (status, body) = send(
        &fixture.app,
        get_request(format!("/v1/room-types/{room_type_id}/pricing-runs")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_override_wins_display_and_survives_a_run() {
    let fixture = test_app();
    let room_type_id = seed_room_type(&fixture);
    let stay = future_date(5);
    fixture.occupancy.insert(room_type_id, stay, 50.0);

    let (status, body) = send(
        &fixture.app,
        json_request(
            "PUT",
            format!("/v1/room-types/{room_type_id}/calendar/{stay}/override"),
            json!({ "price": 22000.0, "locked": true }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["override_price"], 22000.0);
    assert_eq!(body["locked"], true);

    let (status, _) = send(
        &fixture.app,
        json_request(
            "POST",
            format!("/v1/room-types/{room_type_id}/pricing-runs"),
            json!({ "from": stay, "to": stay }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &fixture.app,
        get_request(format!(
            "/v1/room-types/{room_type_id}/calendar?from={stay}&to={stay}"
        )),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let days = body.as_array().unwrap();
    // The override still wins the display even though the engine
    // recomputed the suggestion underneath it
    assert_eq!(days[0]["price"], 22000.0);
    assert_eq!(days[0]["has_override"], true);
    assert_eq!(days[0]["locked"], true);
}

#[tokio::test]
async fn test_unknown_room_type_is_not_found() {
    let fixture = test_app();
    let (status, body) = send(
        &fixture.app,
        json_request(
            "POST",
            format!("/v1/room-types/{}/pricing-runs", Uuid::new_v4()),
            json!({ "from": future_date(1), "to": future_date(2) }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("Room type not found"));
}

#[tokio::test]
async fn test_inverted_range_is_rejected() {
    let fixture = test_app();
    let room_type_id = seed_room_type(&fixture);

    let (status, _) = send(
        &fixture.app,
        json_request(
            "POST",
            format!("/v1/room-types/{room_type_id}/pricing-runs"),
            json!({ "from": future_date(5), "to": future_date(1) }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_breakdown_without_data_is_not_found() {
    let fixture = test_app();
    let room_type_id = seed_room_type(&fixture);

    let (status, body) = send(
        &fixture.app,
        get_request(format!(
            "/v1/room-types/{room_type_id}/calendar/{}/breakdown",
            future_date(3)
        )),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("No pricing data"));
}

#[tokio::test]
async fn test_misconfigured_room_type_is_a_validation_error() {
    let fixture = test_app();
    let id = Uuid::new_v4();
    fixture.room_types.insert(RoomType {
        id,
        name: "Unpriced Loft".to_string(),
        location_id: None,
        base_price: Some(10000.0),
        min_price: None,
        max_price: Some(15000.0),
        is_active: true,
    });

    let (status, body) = send(
        &fixture.app,
        json_request(
            "POST",
            format!("/v1/room-types/{id}/pricing-runs"),
            json!({ "from": future_date(1), "to": future_date(2) }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("Unpriced Loft"));
    assert!(message.contains("min_price"));
}
