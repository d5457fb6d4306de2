// libs/appointment-cell/src/services/lifecycle.rs
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use reqwest::Method;
use tracing::{debug, info, warn};

use notification_cell::models::BookingNotification;
use notification_cell::services::NotificationService;
use patient_cell::models::PatientIntake;
use patient_cell::services::PatientPromotionService;
use shared_config::AppConfig;
use shared_database::portal::PortalClient;

use crate::models::{
    Appointment, AppointmentError, AppointmentPatch, AppointmentStatus, RawAppointmentRecord,
    RescheduleAppointmentRequest, RescheduleOutcome, TransitionStep,
};
use crate::services::reschedule;
use crate::store::AppointmentStore;

/// Reason recorded when the operator rejects without giving one.
pub const DEFAULT_REJECT_REASON: &str = "No reason given";

/// Validates and applies the appointment status transitions for one doctor
/// session. Every transition follows the same discipline: snapshot the
/// record, apply the optimistic patch to the store, then issue the remote
/// write. If the remote write fails - or, on the accept path, the patient
/// promotion that follows it - the snapshot is restored. Notifications are
/// best effort and never roll anything back.
pub struct AppointmentLifecycleService {
    portal: Arc<PortalClient>,
    notifications: NotificationService,
    promotion: PatientPromotionService,
}

impl AppointmentLifecycleService {
    pub fn new(config: &AppConfig) -> Self {
        let portal = Arc::new(PortalClient::new(config));
        let notifications = NotificationService::new(Arc::clone(&portal));
        let promotion = PatientPromotionService::new(Arc::clone(&portal));

        Self {
            portal,
            notifications,
            promotion,
        }
    }

    /// Fetch the tenant's appointment records and load the session doctor's
    /// share into the store. On fetch failure the store's previous snapshot
    /// stays in place.
    pub async fn refresh(
        &self,
        store: &mut AppointmentStore,
        auth_token: &str,
    ) -> Result<usize, AppointmentError> {
        debug!("Refreshing appointments for {}", store.doctor_name());

        let records: Vec<RawAppointmentRecord> = self
            .portal
            .request(
                Method::GET,
                "/rest/v1/appointments?select=*",
                Some(auth_token),
                None,
            )
            .await
            .map_err(|e| AppointmentError::FetchFailed(e.to_string()))?;

        Ok(store.load(records))
    }

    /// Accept a pending appointment: confirm it, notify the patient with the
    /// payment affordance enabled, then promote the booking into an active
    /// patient record. A failed promotion rolls the appointment back even
    /// though the remote status write may already be durable; the operator
    /// retries from there.
    pub async fn accept(
        &mut self,
        store: &mut AppointmentStore,
        id: i64,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let snapshot = store.snapshot(id).ok_or(AppointmentError::NotFound)?;
        guard_status(&snapshot.status, AppointmentStatus::Pending)?;

        let patch = AppointmentPatch {
            status: Some(AppointmentStatus::Confirmed),
            confirmed_at: Some(Utc::now()),
            ..Default::default()
        };
        let updated = store
            .apply_optimistic(id, &patch)
            .ok_or(AppointmentError::NotFound)?;

        if let Err(e) = self.replace_appointment(&updated, auth_token).await {
            warn!("Status write failed for appointment {}, rolling back: {}", id, e);
            store.restore(snapshot);
            return Err(AppointmentError::RemoteStepFailed {
                step: TransitionStep::StatusWrite,
                message: e.to_string(),
            });
        }

        self.notify(&updated, confirmation_message(&updated), true, auth_token)
            .await;

        let intake = PatientIntake::from_booking(
            &updated.patient_name,
            &updated.email,
            &updated.phone,
            store.doctor_name(),
            &updated.date,
            &updated.time,
        );
        match self.promotion.promote(&intake, auth_token).await {
            Ok(patient_id) => {
                info!(
                    "Appointment {} confirmed, patient {} created",
                    id, patient_id
                );
                Ok(updated)
            }
            Err(e) => {
                warn!(
                    "Patient promotion failed for appointment {}, rolling back: {}",
                    id, e
                );
                store.restore(snapshot);
                Err(AppointmentError::RemoteStepFailed {
                    step: TransitionStep::PatientCreate,
                    message: e.to_string(),
                })
            }
        }
    }

    /// Reject a pending appointment, recording the operator's reason or the
    /// default when none is given.
    pub async fn reject(
        &self,
        store: &mut AppointmentStore,
        id: i64,
        reason: Option<String>,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let snapshot = store.snapshot(id).ok_or(AppointmentError::NotFound)?;
        guard_status(&snapshot.status, AppointmentStatus::Pending)?;

        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_REJECT_REASON.to_string());

        let patch = AppointmentPatch {
            status: Some(AppointmentStatus::Rejected),
            reject_reason: Some(reason.clone()),
            ..Default::default()
        };
        let updated = store
            .apply_optimistic(id, &patch)
            .ok_or(AppointmentError::NotFound)?;

        if let Err(e) = self.replace_appointment(&updated, auth_token).await {
            warn!("Status write failed for appointment {}, rolling back: {}", id, e);
            store.restore(snapshot);
            return Err(AppointmentError::RemoteStepFailed {
                step: TransitionStep::StatusWrite,
                message: e.to_string(),
            });
        }

        self.notify(&updated, rejection_message(&updated, &reason), false, auth_token)
            .await;

        info!("Appointment {} rejected: {}", id, reason);
        Ok(updated)
    }

    /// Reschedule a confirmed appointment to a new slot. The first two
    /// reschedules go through and bump the count; the attempt after that is
    /// converted into an automatic rejection with the slot left untouched.
    pub async fn reschedule(
        &self,
        store: &mut AppointmentStore,
        id: i64,
        request: RescheduleAppointmentRequest,
        auth_token: &str,
    ) -> Result<RescheduleOutcome, AppointmentError> {
        if request.date.trim().is_empty() || request.time.trim().is_empty() {
            return Err(AppointmentError::ValidationError(
                "Both a new date and a new time are required".to_string(),
            ));
        }

        let snapshot = store.snapshot(id).ok_or(AppointmentError::NotFound)?;
        guard_status(&snapshot.status, AppointmentStatus::Confirmed)?;

        let decision = reschedule::decide(snapshot.reschedule_count);
        let patch = if decision.auto_cancel {
            AppointmentPatch {
                status: Some(AppointmentStatus::Rejected),
                reject_reason: Some(reschedule::AUTO_CANCEL_REASON.to_string()),
                ..Default::default()
            }
        } else {
            AppointmentPatch {
                date: Some(request.date.trim().to_string()),
                time: Some(request.time.trim().to_string()),
                reschedule_count: Some(snapshot.reschedule_count + 1),
                ..Default::default()
            }
        };

        let updated = store
            .apply_optimistic(id, &patch)
            .ok_or(AppointmentError::NotFound)?;

        if let Err(e) = self.replace_appointment(&updated, auth_token).await {
            warn!("Status write failed for appointment {}, rolling back: {}", id, e);
            store.restore(snapshot);
            return Err(AppointmentError::RemoteStepFailed {
                step: TransitionStep::StatusWrite,
                message: e.to_string(),
            });
        }

        if decision.auto_cancel {
            self.notify(&updated, auto_cancel_message(&updated), false, auth_token)
                .await;
            info!(
                "Appointment {} auto-cancelled after {} reschedules",
                id, snapshot.reschedule_count
            );
            Ok(RescheduleOutcome::AutoCancelled(updated))
        } else {
            self.notify(&updated, reschedule_message(&updated), false, auth_token)
                .await;
            info!(
                "Appointment {} rescheduled to {} {}",
                id, updated.date, updated.time
            );
            Ok(RescheduleOutcome::Rescheduled(updated))
        }
    }

    /// Remove a rejected appointment from the working set. Local only: the
    /// remote record is left in place for the audit trail.
    pub fn delete(
        &self,
        store: &mut AppointmentStore,
        id: i64,
    ) -> Result<Appointment, AppointmentError> {
        let current = store.get(id).ok_or(AppointmentError::NotFound)?;
        guard_status(&current.status, AppointmentStatus::Rejected)?;

        let removed = store.remove(id).ok_or(AppointmentError::NotFound)?;
        info!("Appointment {} removed from the working set", id);
        Ok(removed)
    }

    /// Identifiers of patients promoted during this session.
    pub fn recently_promoted(&self) -> &[String] {
        self.promotion.recently_promoted()
    }

    /// Replace-by-id write of the full appointment record.
    async fn replace_appointment(&self, appointment: &Appointment, auth_token: &str) -> Result<()> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment.id);
        let body = serde_json::to_value(appointment)?;

        self.portal
            .dispatch(Method::PATCH, &path, Some(auth_token), Some(body))
            .await
    }

    async fn notify(
        &self,
        appointment: &Appointment,
        message: String,
        show_pay_button: bool,
        auth_token: &str,
    ) {
        let notification = BookingNotification::new(
            appointment.patient_name.clone(),
            appointment.phone.clone(),
            appointment.doctor_name.clone(),
            message,
            show_pay_button,
        );

        if let Err(e) = self
            .notifications
            .send_booking_update(&notification, auth_token)
            .await
        {
            warn!(
                "Notification for appointment {} not delivered: {}",
                appointment.id, e
            );
        }
    }
}

fn guard_status(
    current: &AppointmentStatus,
    required: AppointmentStatus,
) -> Result<(), AppointmentError> {
    if *current == required {
        Ok(())
    } else {
        Err(AppointmentError::InvalidStatusTransition(current.clone()))
    }
}

fn confirmation_message(appointment: &Appointment) -> String {
    format!(
        "Your appointment with Dr. {} on {} at {} has been confirmed. Please complete the consultation payment to secure your slot.",
        appointment.doctor_name, appointment.date, appointment.time
    )
}

fn rejection_message(appointment: &Appointment, reason: &str) -> String {
    format!(
        "Your appointment request with Dr. {} on {} at {} has been declined. Reason: {}",
        appointment.doctor_name, appointment.date, appointment.time, reason
    )
}

fn reschedule_message(appointment: &Appointment) -> String {
    format!(
        "Your appointment with Dr. {} has been moved to {} at {}.",
        appointment.doctor_name, appointment.date, appointment.time
    )
}

fn auto_cancel_message(appointment: &Appointment) -> String {
    format!(
        "Your appointment with Dr. {} on {} at {} has been cancelled after repeated rescheduling. Please book a new appointment.",
        appointment.doctor_name, appointment.date, appointment.time
    )
}
