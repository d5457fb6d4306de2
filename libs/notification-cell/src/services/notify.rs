use std::sync::Arc;

use reqwest::Method;
use serde_json::json;
use tracing::debug;

use shared_database::portal::PortalClient;

use crate::models::{BookingNotification, NotificationError};

/// Client for the portal's notification gateway. Delivery is best effort:
/// callers log failures and carry on, so nothing here participates in the
/// appointment consistency boundary.
pub struct NotificationService {
    portal: Arc<PortalClient>,
}

impl NotificationService {
    pub fn new(portal: Arc<PortalClient>) -> Self {
        Self { portal }
    }

    pub async fn send_booking_update(
        &self,
        notification: &BookingNotification,
        auth_token: &str,
    ) -> Result<(), NotificationError> {
        debug!(
            "Sending booking update to {} ({})",
            notification.recipient_name, notification.recipient_phone
        );

        let body = json!({
            "recipient_name": notification.recipient_name,
            "recipient_phone": notification.recipient_phone,
            "message": notification.message,
            "show_pay_button": notification.show_pay_button,
            "doctor_name": notification.doctor_name,
            "created_at": notification.created_at.to_rfc3339(),
        });

        self.portal
            .dispatch(
                Method::POST,
                "/rest/v1/notifications",
                Some(auth_token),
                Some(body),
            )
            .await
            .map_err(|e| NotificationError::DeliveryFailed(e.to_string()))?;

        Ok(())
    }
}
