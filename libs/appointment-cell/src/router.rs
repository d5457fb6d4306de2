// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers::{self, DashboardState};

pub fn appointment_routes(config: Arc<AppConfig>) -> Router {
    let state = DashboardState::new(config);

    Router::new()
        .route("/refresh", post(handlers::refresh_appointments))
        .route("/", get(handlers::list_appointments))
        .route("/promoted", get(handlers::recently_promoted))
        .route("/{appointment_id}/accept", post(handlers::accept_appointment))
        .route("/{appointment_id}/reject", post(handlers::reject_appointment))
        .route(
            "/{appointment_id}/reschedule",
            patch(handlers::reschedule_appointment),
        )
        .route("/{appointment_id}", delete(handlers::delete_appointment))
        .with_state(state)
}
