// libs/appointment-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

/// An appointment request on the doctor's outpatient dashboard. Owned by the
/// session's `AppointmentStore` while loaded; backed by a remote record of
/// the same id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub patient_name: String,
    pub phone: String,
    pub email: String,
    pub date: String,
    pub time: String,
    pub reason: String,
    pub specialty: String,
    pub consultation_type: String,
    pub doctor_name: String,
    pub status: AppointmentStatus,
    pub reject_reason: Option<String>,
    pub reschedule_count: u32,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl Appointment {
    /// Normalise a raw wire record into the working-set shape. Legacy
    /// "Upcoming", empty and unrecognised statuses all become `Pending`;
    /// the normalisation is one-way and never written back.
    pub fn from_raw(raw: RawAppointmentRecord) -> Self {
        Self {
            id: raw.id,
            patient_name: raw.patient_name,
            phone: raw.phone,
            email: raw.email,
            date: raw.date,
            time: raw.time,
            reason: raw.reason,
            specialty: raw.specialty,
            consultation_type: raw.consultation_type,
            doctor_name: raw.doctor_name,
            status: AppointmentStatus::normalize(raw.status.as_deref()),
            reject_reason: raw.reject_reason,
            reschedule_count: raw.reschedule_count.unwrap_or(0),
            confirmed_at: raw.confirmed_at,
        }
    }

    /// Merge an optimistic patch. Pure merge; validation belongs to the
    /// transition engine.
    pub fn merge(&mut self, patch: &AppointmentPatch) {
        if let Some(status) = &patch.status {
            self.status = status.clone();
        }
        if let Some(date) = &patch.date {
            self.date = date.clone();
        }
        if let Some(time) = &patch.time {
            self.time = time.clone();
        }
        if let Some(reject_reason) = &patch.reject_reason {
            self.reject_reason = Some(reject_reason.clone());
        }
        if let Some(reschedule_count) = patch.reschedule_count {
            self.reschedule_count = reschedule_count;
        }
        if let Some(confirmed_at) = patch.confirmed_at {
            self.confirmed_at = Some(confirmed_at);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Rejected,
}

impl AppointmentStatus {
    pub fn normalize(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("confirmed") => AppointmentStatus::Confirmed,
            Some(s) if s.eq_ignore_ascii_case("rejected") => AppointmentStatus::Rejected,
            _ => AppointmentStatus::Pending,
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Appointment record as fetched from the persistence gateway. Status and
/// counters are loose on the wire; `Appointment::from_raw` tightens them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAppointmentRecord {
    pub id: i64,
    pub patient_name: String,
    pub phone: String,
    pub email: String,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub consultation_type: String,
    pub doctor_name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub reject_reason: Option<String>,
    #[serde(default)]
    pub reschedule_count: Option<u32>,
    #[serde(default)]
    pub confirmed_at: Option<DateTime<Utc>>,
}

/// Field-by-field merge patch applied by the store's optimistic update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentPatch {
    pub status: Option<AppointmentStatus>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub reject_reason: Option<String>,
    pub reschedule_count: Option<u32>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

// ==============================================================================
// DASHBOARD TABS AND PAGINATION
// ==============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTab {
    #[default]
    Pending,
    Confirmed,
    Rejected,
}

impl StatusTab {
    /// Tab membership is computed on the normalised status, so the pending
    /// tab also covers records that arrived as legacy "Upcoming".
    pub fn matches(&self, status: &AppointmentStatus) -> bool {
        match self {
            StatusTab::Pending => *status == AppointmentStatus::Pending,
            StatusTab::Confirmed => *status == AppointmentStatus::Confirmed,
            StatusTab::Rejected => *status == AppointmentStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentPage {
    pub appointments: Vec<Appointment>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectAppointmentRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub date: String,
    pub time: String,
}

/// What a reschedule request turned into: a new slot, or an automatic
/// cancellation once the reschedule allowance is used up.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "appointment", rename_all = "snake_case")]
pub enum RescheduleOutcome {
    Rescheduled(Appointment),
    AutoCancelled(Appointment),
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

/// Remote step of a transition, used to tag which part of the chain failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionStep {
    StatusWrite,
    PatientCreate,
}

impl fmt::Display for TransitionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionStep::StatusWrite => write!(f, "status write"),
            TransitionStep::PatientCreate => write!(f, "patient create"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Appointment cannot be modified in current status: {0}")]
    InvalidStatusTransition(AppointmentStatus),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Failed to load appointments: {0}")]
    FetchFailed(String),

    #[error("Remote {step} failed: {message}")]
    RemoteStepFailed {
        step: TransitionStep,
        message: String,
    },
}
