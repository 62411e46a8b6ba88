use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Error,
}

/// `303 See Other` carrying a one-shot user message in its JSON body.
#[derive(Debug, Serialize)]
pub struct FlashRedirect {
    pub level: FlashLevel,
    pub message: String,
    pub location: String,
    #[serde(skip)]
    set_cookie: Option<String>,
}

impl FlashRedirect {
    pub fn new(level: FlashLevel, location: impl Into<String>, message: impl Into<String>) -> Self {
        FlashRedirect { level, message: message.into(), location: location.into(), set_cookie: None }
    }

    pub fn success(location: impl Into<String>, message: impl Into<String>) -> Self {
        FlashRedirect::new(FlashLevel::Success, location, message)
    }

    pub fn info(location: impl Into<String>, message: impl Into<String>) -> Self {
        FlashRedirect::new(FlashLevel::Info, location, message)
    }

    pub fn error(location: impl Into<String>, message: impl Into<String>) -> Self {
        FlashRedirect::new(FlashLevel::Error, location, message)
    }

    /// Plain redirect with an empty message
    pub fn to(location: impl Into<String>) -> Self {
        FlashRedirect::new(FlashLevel::Info, location, String::new())
    }

    pub fn with_cookie(mut self, cookie: String) -> Self {
        self.set_cookie = Some(cookie);
        self
    }
}

impl IntoResponse for FlashRedirect {
    fn into_response(self) -> Response {
        let location = match HeaderValue::from_str(&self.location) {
            Ok(value) => value,
            Err(e) => {
                error!("Invalid redirect location '{}': {}", self.location, e);
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };
        let cookie = match self.set_cookie.as_deref().map(HeaderValue::from_str).transpose() {
            Ok(value) => value,
            Err(e) => {
                error!("Invalid Set-Cookie value: {}", e);
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

        let mut response = (StatusCode::SEE_OTHER, Json(&self)).into_response();
        response.headers_mut().insert(header::LOCATION, location);
        if let Some(cookie) = cookie {
            response.headers_mut().append(header::SET_COOKIE, cookie);
        }
        response
    }
}
