use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::app::app::AppState;
use crate::model::doctor::Doctor;
use crate::util::cookie::{clear_session_cookie, read_cookie, SESSION_COOKIE};
use crate::util::error::{HandlerError, ServiceError, MISSING_PROFILE_MESSAGE};
use crate::util::flash::FlashRedirect;
use crate::util::jwt::JwtTokenUtils;

/// The authenticated doctor, inserted into request extensions by [`doctor_auth`].
#[derive(Debug, Clone)]
pub struct DoctorContext {
    pub doctor: Doctor,
}

/// Session token from `Authorization: Bearer` or, failing that, the session cookie.
pub fn request_token(headers: &HeaderMap, jwt_utils: &impl JwtTokenUtils) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| jwt_utils.extract_token_from_header(v).ok())
        .or_else(|| read_cookie(headers, SESSION_COOKIE))
}

/// Whether the request carries a valid, unrevoked session
pub async fn is_authenticated(state: &AppState, headers: &HeaderMap) -> bool {
    match request_token(headers, state.jwt_utils.as_ref()) {
        Some(token) => state.auth_service.authenticate(&token).await.is_ok(),
        None => false,
    }
}

pub async fn doctor_auth(State(state): State<AppState>, mut req: Request<Body>, next: Next) -> Response {
    let Some(token) = request_token(req.headers(), state.jwt_utils.as_ref()) else {
        debug!("Request without session token");
        return HandlerError::unauthorized("Authentication required").into_response();
    };

    let claims = match state.auth_service.authenticate(&token).await {
        Ok(claims) => claims,
        Err(e) => return HandlerError::from(e).into_response(),
    };

    let doctor = match state.auth_service.resolve_doctor(&claims).await {
        Ok(doctor) => doctor,
        // End the session too, or the login page would bounce straight back
        Err(ServiceError::MissingProfile) => {
            return FlashRedirect::error("/login/", MISSING_PROFILE_MESSAGE)
                .with_cookie(clear_session_cookie(state.config.secure_cookies))
                .into_response();
        }
        Err(e) => return HandlerError::from(e).into_response(),
    };

    req.extensions_mut().insert(DoctorContext { doctor });
    next.run(req).await
}
