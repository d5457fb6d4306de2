use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use notification_cell::models::{BookingNotification, NotificationError};
use notification_cell::services::NotificationService;
use shared_config::AppConfig;
use shared_database::portal::PortalClient;

fn service_for(server: &MockServer) -> NotificationService {
    let config = AppConfig {
        portal_api_url: server.uri(),
        portal_api_key: "test-api-key".to_string(),
        doctor_display_name: "Meera Nair".to_string(),
    };
    NotificationService::new(Arc::new(PortalClient::new(&config)))
}

#[tokio::test]
async fn booking_update_carries_the_full_payload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/notifications"))
        .and(header("apikey", "test-api-key"))
        .and(header("Authorization", "Bearer token"))
        .and(body_partial_json(json!({
            "recipient_name": "Asha Rao",
            "recipient_phone": "0851234567",
            "message": "Your appointment has been confirmed.",
            "show_pay_button": true,
            "doctor_name": "Meera Nair"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let notification = BookingNotification::new(
        "Asha Rao",
        "0851234567",
        "Meera Nair",
        "Your appointment has been confirmed.",
        true,
    );

    service_for(&server)
        .send_booking_update(&notification, "token")
        .await
        .expect("delivery should succeed");
}

#[tokio::test]
async fn delivery_failures_are_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/notifications"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let notification =
        BookingNotification::new("Asha Rao", "0851234567", "Meera Nair", "hello", false);

    let err = service_for(&server)
        .send_booking_update(&notification, "token")
        .await
        .unwrap_err();

    assert!(matches!(err, NotificationError::DeliveryFailed(_)));
}
