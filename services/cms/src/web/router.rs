//! services/cms/src/web/router.rs
//!
//! Maps HTTP verbs and paths onto the document and auth handlers.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::web::state::AppState;
use crate::web::{auth, documents};

/// Builds the full application router.
///
/// Static paths (`/create`, `/new/`, `/users/signin`) take priority over the
/// `{name}` captures, so documents cannot shadow them.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(documents::index))
        .route("/new/", get(documents::new_form))
        .route("/create", post(documents::create))
        .route(
            "/users/signin",
            get(auth::sign_in_form).post(auth::sign_in),
        )
        .route("/{name}", get(documents::show).post(documents::update))
        .route("/{name}/edit", get(documents::edit_form))
        .route("/{name}/delete", post(documents::delete))
        .route("/{name}/signout", get(auth::sign_out))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
