use axum::{
    extract::{Form, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info};

use crate::app::app::AppState;
use crate::dto::auth_dto::{LoginForm, SignupForm};
use crate::dto::form_schema::FormSchema;
use crate::middlewares::session_middleware::{is_authenticated, request_token};
use crate::util::cookie::{clear_session_cookie, session_cookie};
use crate::util::error::HandlerError;
use crate::util::flash::FlashRedirect;

const DASHBOARD: &str = "/dashboard/";
const LOGIN: &str = "/login/";

pub async fn home_handler(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if is_authenticated(&state, &headers).await {
        FlashRedirect::to(DASHBOARD)
    } else {
        FlashRedirect::to(LOGIN)
    }
}

pub async fn signup_form_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if is_authenticated(&state, &headers).await {
        return FlashRedirect::to(DASHBOARD).into_response();
    }
    Json(FormSchema::signup()).into_response()
}

pub async fn signup_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<SignupForm>,
) -> Result<Response, HandlerError> {
    if is_authenticated(&state, &headers).await {
        return Ok(FlashRedirect::to(DASHBOARD).into_response());
    }
    let registration = state.auth_service.signup(form).await?;
    info!(doctor_id = %registration.doctor.id, "Signup completed");

    let cookie = session_cookie(
        &registration.session.token,
        state.jwt_utils.jwt_config.session_expiration_secs(),
        state.config.secure_cookies,
    );
    Ok(FlashRedirect::success(DASHBOARD, "Registration successful! Welcome to Doctor Feedback.")
        .with_cookie(cookie)
        .into_response())
}

pub async fn login_form_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if is_authenticated(&state, &headers).await {
        return FlashRedirect::to(DASHBOARD).into_response();
    }
    Json(FormSchema::login()).into_response()
}

pub async fn login_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Response, HandlerError> {
    if is_authenticated(&state, &headers).await {
        return Ok(FlashRedirect::to(DASHBOARD).into_response());
    }
    let session = state.auth_service.login(form).await?;

    let cookie = session_cookie(
        &session.token,
        state.jwt_utils.jwt_config.session_expiration_secs(),
        state.config.secure_cookies,
    );
    Ok(FlashRedirect::success(DASHBOARD, format!("Welcome back, {}!", session.claims.username))
        .with_cookie(cookie)
        .into_response())
}

/// Always ends the browser session, even when revoking the token fails.
pub async fn logout_handler(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let token = request_token(&headers, state.jwt_utils.as_ref());
    if let Err(e) = state.auth_service.logout(token.as_deref()).await {
        error!("Failed to revoke session on logout: {}", e);
    }
    FlashRedirect::info(LOGIN, "You have been logged out successfully.")
        .with_cookie(clear_session_cookie(state.config.secure_cookies))
}
