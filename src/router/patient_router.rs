use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::app::app::AppState;
use crate::handler::patient_handler::{
    add_patient_form_handler,
    add_patient_handler,
    add_update_form_handler,
    add_update_handler,
    dashboard_handler,
    delete_patient_confirm_handler,
    delete_patient_handler,
    delete_update_handler,
    edit_patient_form_handler,
    edit_patient_handler,
    patient_detail_handler,
};
use crate::middlewares::session_middleware::doctor_auth;

/// Every route here requires a doctor session
pub fn patient_router(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;

    Router::new()
        .route("/dashboard/", get(dashboard_handler))
        .route("/patient/add/", get(add_patient_form_handler).post(add_patient_handler))
        .route("/patient/{id}/", get(patient_detail_handler))
        .route("/patient/{id}/update/", get(add_update_form_handler).post(add_update_handler))
        .route("/patient/{id}/edit/", get(edit_patient_form_handler).post(edit_patient_handler))
        .route("/patient/{id}/delete/", get(delete_patient_confirm_handler).post(delete_patient_handler))
        .route("/update/{id}/delete/", post(delete_update_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), doctor_auth))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
