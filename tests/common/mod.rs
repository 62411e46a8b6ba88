#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use doctor_feedback_backend::app::app::{build_router, AppState};
use doctor_feedback_backend::config::JwtConfig;
use doctor_feedback_backend::repository::memory_repo::MemoryStore;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt; // for .oneshot()

pub const PASSWORD: &str = "Stethoscope-42!";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub media_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let media_dir = TempDir::new().expect("temp media dir");
        let store = Arc::new(MemoryStore::new());
        let state = AppState::in_memory(store.clone(), JwtConfig::default(), media_dir.path());
        let router = build_router(state.clone());
        TestApp { router, state, store, media_dir }
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.expect("request failed")
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        self.send(with_session(Request::builder().method("GET").uri(uri), token).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_form(&self, uri: &str, fields: &[(&str, &str)], token: Option<&str>) -> Response<Body> {
        let body = serde_urlencoded::to_string(fields).unwrap();
        let req = with_session(Request::builder().method("POST").uri(uri), token)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(req).await
    }

    pub async fn post_multipart(&self, uri: &str, body: MultipartBody, token: Option<&str>) -> Response<Body> {
        let req = with_session(Request::builder().method("POST").uri(uri), token)
            .header(header::CONTENT_TYPE, body.content_type())
            .body(Body::from(body.finish()))
            .unwrap();
        self.send(req).await
    }

    /// Registers a doctor and returns the session token from the cookie
    pub async fn signup(&self, username: &str, mobile_number: &str) -> String {
        let resp = self.post_form("/signup/", &signup_fields(username, mobile_number), None).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "signup for {} failed", username);
        session_token(&resp).expect("signup sets a session cookie")
    }

    /// Creates a patient through the form and returns its id
    pub async fn add_patient(&self, token: &str, product_name: &str) -> String {
        let resp = self.post_multipart("/patient/add/", patient_body(product_name), Some(token)).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        let location = location(&resp);
        location
            .trim_start_matches("/patient/")
            .trim_end_matches('/')
            .to_string()
    }
}

fn with_session(builder: axum::http::request::Builder, token: Option<&str>) -> axum::http::request::Builder {
    match token {
        Some(token) => builder.header(header::COOKIE, format!("session={}", token)),
        None => builder,
    }
}

pub fn signup_fields<'a>(username: &'a str, mobile_number: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("username", username),
        ("password1", PASSWORD),
        ("password2", PASSWORD),
        ("full_name", "Amina Benali"),
        ("mobile_number", mobile_number),
        ("email_address", ""),
        ("specialty", "Dermatology"),
        ("years_of_practice", "12"),
        ("hospital_name", "CHU Mustapha"),
        ("city_location", "Algiers"),
    ]
}

pub fn patient_body(product_name: &str) -> MultipartBody {
    MultipartBody::new()
        .text("product_name", product_name)
        .text("disease_name", "Psoriasis")
        .text("conditions_treated", "plaques, itching")
        .text("biochemistry_data", "CRP 4 mg/L")
        .text("medical_investigation", "Skin biopsy")
        .text("improvements_observed", "Reduced redness after two weeks")
}

/// Session token from a `Set-Cookie: session=...` header, `None` when cleared
pub fn session_token(resp: &Response<Body>) -> Option<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.strip_prefix("session="))
        .map(|v| v.split(';').next().unwrap_or_default().to_string())
        .find(|v| !v.is_empty())
}

pub fn set_cookie(resp: &Response<Body>) -> Option<String> {
    resp.headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string())
}

pub fn location(resp: &Response<Body>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .expect("redirect has a location")
        .to_str()
        .unwrap()
        .to_string()
}

pub async fn json_body(resp: Response<Body>) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("JSON response body")
}

/// Hand-built `multipart/form-data` request body
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        MultipartBody { boundary: "----doctorfeedbackboundary".to_string(), body: Vec::new() }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, file_name, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        self.body
    }
}
