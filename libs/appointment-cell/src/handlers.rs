// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{
    AppointmentError, RejectAppointmentRequest, RescheduleAppointmentRequest, RescheduleOutcome,
    StatusTab,
};
use crate::services::AppointmentLifecycleService;
use crate::store::AppointmentStore;

// ==============================================================================
// SESSION STATE
// ==============================================================================

/// One doctor's dashboard session: the working set plus the transition
/// engine. The store is built once and handed to the engine on every call;
/// the surrounding lock serialises transitions, so at most one is in flight
/// at a time.
pub struct DoctorSession {
    pub store: AppointmentStore,
    pub lifecycle: AppointmentLifecycleService,
}

impl DoctorSession {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: AppointmentStore::new(config.doctor_display_name.clone()),
            lifecycle: AppointmentLifecycleService::new(config),
        }
    }
}

#[derive(Clone)]
pub struct DashboardState {
    pub config: Arc<AppConfig>,
    pub session: Arc<Mutex<DoctorSession>>,
}

impl DashboardState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        let session = Arc::new(Mutex::new(DoctorSession::new(&config)));
        Self { config, session }
    }
}

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct ListQueryParams {
    pub tab: Option<StatusTab>,
    pub page: Option<usize>,
}

// ==============================================================================
// HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn refresh_appointments(
    State(state): State<DashboardState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let mut session = state.session.lock().await;
    let DoctorSession { store, lifecycle } = &mut *session;

    let loaded = lifecycle
        .refresh(store, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "loaded": loaded
    })))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<DashboardState>,
    TypedHeader(_auth): TypedHeader<Authorization<Bearer>>,
    Query(params): Query<ListQueryParams>,
) -> Result<Json<Value>, AppError> {
    let session = state.session.lock().await;

    let page = session
        .store
        .page(params.tab.unwrap_or_default(), params.page.unwrap_or(1));

    Ok(Json(json!(page)))
}

#[axum::debug_handler]
pub async fn accept_appointment(
    State(state): State<DashboardState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let mut session = state.session.lock().await;
    let DoctorSession { store, lifecycle } = &mut *session;

    let appointment = lifecycle
        .accept(store, appointment_id, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn reject_appointment(
    State(state): State<DashboardState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(appointment_id): Path<i64>,
    Json(request): Json<RejectAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let mut session = state.session.lock().await;
    let DoctorSession { store, lifecycle } = &mut *session;

    let appointment = lifecycle
        .reject(store, appointment_id, request.reason, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<DashboardState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(appointment_id): Path<i64>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let mut session = state.session.lock().await;
    let DoctorSession { store, lifecycle } = &mut *session;

    let outcome = lifecycle
        .reschedule(store, appointment_id, request, auth.token())
        .await
        .map_err(map_appointment_error)?;

    let response = match &outcome {
        RescheduleOutcome::Rescheduled(appointment) => json!({
            "success": true,
            "outcome": "rescheduled",
            "appointment": appointment
        }),
        RescheduleOutcome::AutoCancelled(appointment) => json!({
            "success": true,
            "outcome": "auto_cancelled",
            "appointment": appointment
        }),
    };

    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<DashboardState>,
    TypedHeader(_auth): TypedHeader<Authorization<Bearer>>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let mut session = state.session.lock().await;
    let DoctorSession { store, lifecycle } = &mut *session;

    let removed = lifecycle
        .delete(store, appointment_id)
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "removed": removed.id
    })))
}

#[axum::debug_handler]
pub async fn recently_promoted(
    State(state): State<DashboardState>,
    TypedHeader(_auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let session = state.session.lock().await;

    Ok(Json(json!({
        "patient_ids": session.lifecycle.recently_promoted()
    })))
}

fn map_appointment_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        AppointmentError::InvalidStatusTransition(status) => AppError::Conflict(format!(
            "Appointment cannot be modified in current status: {}",
            status
        )),
        AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
        AppointmentError::FetchFailed(msg) => AppError::ExternalService(msg),
        AppointmentError::RemoteStepFailed { step, message } => {
            AppError::ExternalService(format!("Remote {} failed: {}", step, message))
        }
    }
}
