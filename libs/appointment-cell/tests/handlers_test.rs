use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::router::appointment_routes;
use shared_config::AppConfig;

const DOCTOR: &str = "Meera Nair";

fn test_app(server: &MockServer) -> Router {
    let config = AppConfig {
        portal_api_url: server.uri(),
        portal_api_key: "test-api-key".to_string(),
        doctor_display_name: DOCTOR.to_string(),
    };
    appointment_routes(Arc::new(config))
}

fn raw_record(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "patient_name": "Asha K Rao",
        "phone": "0851234567",
        "email": "asha@example.com",
        "date": "2025-01-08",
        "time": "09:30",
        "reason": "Chest pain follow-up",
        "specialty": "Cardiology",
        "consultation_type": "In-person",
        "doctor_name": DOCTOR,
        "status": status,
        "reschedule_count": 0
    })
}

fn authed(request: axum::http::request::Builder) -> axum::http::request::Builder {
    request.header("Authorization", "Bearer test-token")
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

async fn refresh(app: &Router) {
    let response = app
        .clone()
        .oneshot(
            authed(Request::builder().method("POST").uri("/refresh"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn accept_flow_confirms_and_reports_promoted_patient() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([raw_record(101, "Pending")])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/notifications"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{ "id": "p1" }])))
        .mount(&server)
        .await;

    let app = test_app(&server);
    refresh(&app).await;

    let response = app
        .clone()
        .oneshot(
            authed(Request::builder().method("GET").uri("/?tab=pending"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listing = body_json(response).await;
    assert_eq!(listing["total"], 1);
    assert_eq!(listing["appointments"][0]["id"], 101);

    let response = app
        .clone()
        .oneshot(
            authed(Request::builder().method("POST").uri("/101/accept"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let accepted = body_json(response).await;
    assert_eq!(accepted["appointment"]["status"], "Confirmed");

    let response = app
        .clone()
        .oneshot(
            authed(Request::builder().method("GET").uri("/?tab=confirmed"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let listing = body_json(response).await;
    assert_eq!(listing["total"], 1);

    let response = app
        .clone()
        .oneshot(
            authed(Request::builder().method("GET").uri("/promoted"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let promoted = body_json(response).await;
    assert_eq!(promoted["patient_ids"], json!(["p1"]));
}

#[tokio::test]
async fn requests_without_a_bearer_token_are_refused() {
    let server = MockServer::start().await;
    let app = test_app(&server);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/refresh")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn refresh_maps_gateway_failure_to_bad_gateway() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let app = test_app(&server);
    let response = app
        .oneshot(
            authed(Request::builder().method("POST").uri("/refresh"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn reschedule_without_a_slot_is_a_bad_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([raw_record(101, "Confirmed")])),
        )
        .mount(&server)
        .await;

    let app = test_app(&server);
    refresh(&app).await;

    let response = app
        .clone()
        .oneshot(
            authed(Request::builder().method("PATCH").uri("/101/reschedule"))
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({ "date": "", "time": "10:00" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_a_pending_appointment_is_a_conflict() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([raw_record(101, "Pending")])))
        .mount(&server)
        .await;

    let app = test_app(&server);
    refresh(&app).await;

    let response = app
        .clone()
        .oneshot(
            authed(Request::builder().method("DELETE").uri("/101"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn unknown_appointments_are_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let app = test_app(&server);
    refresh(&app).await;

    let response = app
        .clone()
        .oneshot(
            authed(Request::builder().method("POST").uri("/999/accept"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
