use axum::{routing::get, Router};

use crate::app::app::AppState;
use crate::handler::auth_handler::{
    home_handler,
    login_form_handler,
    login_handler,
    logout_handler,
    signup_form_handler,
    signup_handler,
};

pub fn auth_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/signup/", get(signup_form_handler).post(signup_handler))
        .route("/login/", get(login_form_handler).post(login_handler))
        .route("/logout/", get(logout_handler).post(logout_handler))
        .with_state(state)
}
