use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};

use shared_database::portal::PortalClient;

use crate::models::{PatientIntake, PromotionError};

/// Submits confirmed-appointment intakes to the portal's patient module and
/// remembers which patients were created during this session so the UI can
/// highlight them.
pub struct PatientPromotionService {
    portal: Arc<PortalClient>,
    recently_promoted: Vec<String>,
}

impl PatientPromotionService {
    pub fn new(portal: Arc<PortalClient>) -> Self {
        Self {
            portal,
            recently_promoted: Vec::new(),
        }
    }

    /// Create the patient record and return its generated identifier. A
    /// response without an identifier counts as a failure even when the
    /// HTTP call itself succeeded.
    pub async fn promote(
        &mut self,
        intake: &PatientIntake,
        auth_token: &str,
    ) -> Result<String, PromotionError> {
        debug!(
            "Promoting {} {} to active patient",
            intake.first_name, intake.last_name
        );

        let patient_data = json!({
            "first_name": intake.first_name,
            "middle_name": intake.middle_name,
            "last_name": intake.last_name,
            "email": intake.email,
            "phone_number": intake.phone_number,
            "doctor_name": intake.doctor_name,
            "appointment_date": intake.appointment_date,
            "appointment_time": intake.appointment_time,
            "patient_type": intake.patient_type,
            "is_visible": intake.is_visible,
            "consultation_started": intake.consultation_started,
            "consultation_completed": intake.consultation_completed,
            "prescription": intake.prescription,
            "advice": intake.advice,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339(),
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .portal
            .request_with_headers(
                Method::POST,
                "/rest/v1/patients",
                Some(auth_token),
                Some(patient_data),
                Some(headers),
            )
            .await
            .map_err(|e| PromotionError::CreateFailed(e.to_string()))?;

        let patient_id = result
            .first()
            .and_then(|row| row.get("id"))
            .and_then(identifier_as_string)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                warn!("Patient create response carried no identifier");
                PromotionError::MissingIdentifier
            })?;

        self.record_promoted(&patient_id);

        debug!("Patient record created with ID: {}", patient_id);
        Ok(patient_id)
    }

    /// Identifiers of patients promoted during this session, in first-seen
    /// order, without duplicates.
    pub fn recently_promoted(&self) -> &[String] {
        &self.recently_promoted
    }

    fn record_promoted(&mut self, patient_id: &str) {
        if !self.recently_promoted.iter().any(|id| id == patient_id) {
            self.recently_promoted.push(patient_id.to_string());
        }
    }
}

fn identifier_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
