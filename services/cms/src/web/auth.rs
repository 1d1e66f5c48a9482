//! services/cms/src/web/auth.rs
//!
//! Sign-in and sign-out endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    Form,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::web::pages::{self, redirect_home};
use crate::web::session::Session;
use crate::web::state::AppState;

pub const INVALID_CREDENTIALS: &str = "Invalid Credentials! Try again!";

#[derive(Deserialize)]
pub struct SignInForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// GET /users/signin - The sign-in form.
pub async fn sign_in_form(session: Session) -> Response {
    pages::sign_in(StatusCode::OK, session, "")
}

/// POST /users/signin - Check the submitted credentials.
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    mut session: Session,
    Form(form): Form<SignInForm>,
) -> Result<Response, ApiError> {
    if state
        .credentials
        .verify(&form.username, &form.password)
        .await?
    {
        info!("User {} signed in", form.username);
        session.sign_in(&form.username);
        Ok(redirect_home(session))
    } else {
        warn!("Failed sign-in attempt for {:?}", form.username);
        session.flash_error(INVALID_CREDENTIALS);
        Ok(pages::sign_in(
            StatusCode::UNPROCESSABLE_ENTITY,
            session,
            &form.username,
        ))
    }
}

/// GET /{user}/signout - End the session's sign-in. The path segment is not used.
pub async fn sign_out(Path(_user): Path<String>, mut session: Session) -> Response {
    if let Some(user) = session.username() {
        info!("User {} signed out", user);
    }
    session.sign_out();
    redirect_home(session)
}
