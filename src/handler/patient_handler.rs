use axum::{
    extract::{Extension, Form, Multipart, Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::app::app::AppState;
use crate::dto::form_schema::FormSchema;
use crate::dto::patient_dto::{PatientForm, UpdateForm};
use crate::middlewares::session_middleware::DoctorContext;
use crate::util::error::HandlerError;
use crate::util::flash::FlashRedirect;

/// Ids that do not parse are as unknown as ids owned by someone else.
fn parse_id(raw: &str) -> Result<Uuid, HandlerError> {
    Uuid::parse_str(raw).map_err(|_| HandlerError::not_found())
}

fn patient_location(id: Uuid) -> String {
    format!("/patient/{}/", id)
}

pub async fn dashboard_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<DoctorContext>,
) -> Result<impl IntoResponse, HandlerError> {
    let view = state.patient_service.dashboard(&ctx.doctor).await?;
    Ok(Json(view))
}

pub async fn add_patient_form_handler(Extension(ctx): Extension<DoctorContext>) -> impl IntoResponse {
    Json(json!({
        "doctor": ctx.doctor,
        "form": FormSchema::patient("/patient/add/", None),
    }))
}

pub async fn add_patient_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<DoctorContext>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let form = PatientForm::from_multipart(multipart).await?;
    let patient = state.patient_service.create_patient(&ctx.doctor, form).await?;
    Ok(FlashRedirect::success(patient_location(patient.id), "Patient added successfully!"))
}

pub async fn patient_detail_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<DoctorContext>,
    Path(patient_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let patient_id = parse_id(&patient_id)?;
    let view = state.patient_service.patient_detail(&ctx.doctor, patient_id).await?;
    Ok(Json(view))
}

pub async fn add_update_form_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<DoctorContext>,
    Path(patient_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let patient_id = parse_id(&patient_id)?;
    let patient = state.patient_service.get_patient(&ctx.doctor, patient_id).await?;
    Ok(Json(json!({
        "doctor": ctx.doctor,
        "form": FormSchema::update(format!("{}update/", patient_location(patient_id))),
        "patient": patient,
    })))
}

pub async fn add_update_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<DoctorContext>,
    Path(patient_id): Path<String>,
    Form(form): Form<UpdateForm>,
) -> Result<impl IntoResponse, HandlerError> {
    let patient_id = parse_id(&patient_id)?;
    let update = state.patient_service.add_update(&ctx.doctor, patient_id, form).await?;
    Ok(FlashRedirect::success(patient_location(update.patient_id), "Patient update added successfully!"))
}

pub async fn edit_patient_form_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<DoctorContext>,
    Path(patient_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let patient_id = parse_id(&patient_id)?;
    let patient = state.patient_service.get_patient(&ctx.doctor, patient_id).await?;
    let form = FormSchema::patient(format!("{}edit/", patient_location(patient_id)), Some(&patient.patient));
    Ok(Json(json!({
        "doctor": ctx.doctor,
        "form": form,
        "patient": patient,
    })))
}

pub async fn edit_patient_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<DoctorContext>,
    Path(patient_id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let patient_id = parse_id(&patient_id)?;
    let form = PatientForm::from_multipart(multipart).await?;
    let patient = state.patient_service.edit_patient(&ctx.doctor, patient_id, form).await?;
    Ok(FlashRedirect::success(patient_location(patient.id), "Patient updated successfully!"))
}

pub async fn delete_patient_confirm_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<DoctorContext>,
    Path(patient_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let patient_id = parse_id(&patient_id)?;
    let patient = state.patient_service.get_patient(&ctx.doctor, patient_id).await?;
    Ok(Json(json!({ "doctor": ctx.doctor, "patient": patient })))
}

pub async fn delete_patient_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<DoctorContext>,
    Path(patient_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let patient_id = parse_id(&patient_id)?;
    state.patient_service.delete_patient(&ctx.doctor, patient_id).await?;
    Ok(FlashRedirect::success("/dashboard/", "Patient deleted successfully!"))
}

pub async fn delete_update_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<DoctorContext>,
    Path(update_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let update_id = parse_id(&update_id)?;
    let patient_id = state.patient_service.delete_update(&ctx.doctor, update_id).await?;
    Ok(FlashRedirect::success(patient_location(patient_id), "Update deleted successfully!"))
}
