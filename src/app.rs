use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

/// Phone cameras produce photos well over axum's 2 MB default.
const UPLOAD_LIMIT: usize = 25 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/customers", get(handlers::list_customers).post(handlers::create_customer))
        .route("/customers/new", get(handlers::new_customer))
        .route("/customers/:id", post(handlers::update_customer))
        .route("/customers/:id/edit", get(handlers::edit_customer))
        .route("/customers/:id/delete", post(handlers::delete_customer))
        .route("/vehicles", get(handlers::list_vehicles).post(handlers::create_vehicle))
        .route("/vehicles/new", get(handlers::new_vehicle))
        .route("/vehicles/:id", post(handlers::update_vehicle))
        .route("/vehicles/:id/edit", get(handlers::edit_vehicle))
        .route("/vehicles/:id/delete", post(handlers::delete_vehicle))
        .route("/services", get(handlers::list_services).post(handlers::create_service))
        .route("/services/new", get(handlers::new_service))
        .route("/services/:id", post(handlers::update_service))
        .route("/services/:id/edit", get(handlers::edit_service))
        .route("/services/:id/delete", post(handlers::delete_service))
        .route("/sessions", get(handlers::list_sessions).post(handlers::create_session))
        .route("/sessions/:id", get(handlers::show_session))
        .route("/sessions/:id/photos", post(handlers::upload_photo))
        .route("/sessions/:id/close", post(handlers::close_session))
        .route("/sessions/:id/report", get(handlers::session_report_page))
        .route("/api/sessions/:id/report", get(handlers::session_report_json))
        .route("/api/sessions/:id/progress", get(handlers::session_progress_json))
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT))
        .with_state(state)
}
