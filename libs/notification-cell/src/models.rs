use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Booking-update message sent to a patient. `show_pay_button` tells the
/// recipient's client whether to render the consultation-payment affordance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingNotification {
    pub recipient_name: String,
    pub recipient_phone: String,
    pub message: String,
    pub show_pay_button: bool,
    pub doctor_name: String,
    pub created_at: DateTime<Utc>,
}

impl BookingNotification {
    pub fn new(
        recipient_name: impl Into<String>,
        recipient_phone: impl Into<String>,
        doctor_name: impl Into<String>,
        message: impl Into<String>,
        show_pay_button: bool,
    ) -> Self {
        Self {
            recipient_name: recipient_name.into(),
            recipient_phone: recipient_phone.into(),
            message: message.into(),
            show_pay_button,
            doctor_name: doctor_name.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum NotificationError {
    #[error("Notification delivery failed: {0}")]
    DeliveryFailed(String),
}
