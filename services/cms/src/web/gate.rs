//! services/cms/src/web/gate.rs
//!
//! The sign-in check in front of every document mutation.

use axum::response::Response;
use tracing::warn;

use crate::web::pages::redirect_home;
use crate::web::session::Session;

pub const SIGN_IN_REQUIRED: &str = "You must be signed in to do that.";

/// Lets an authenticated session through. Otherwise flashes an error and
/// returns the redirect to `/` that the handler must send instead.
pub fn require_authenticated(mut session: Session) -> Result<Session, Response> {
    if session.is_authenticated() {
        Ok(session)
    } else {
        warn!("Rejected unauthenticated request");
        session.flash_error(SIGN_IN_REQUIRED);
        Err(redirect_home(session))
    }
}
