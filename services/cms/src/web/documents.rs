//! services/cms/src/web/documents.rs
//!
//! Handlers for listing, viewing, creating, editing and deleting documents.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use cms_core::domain::DocumentKind;
use cms_core::ports::PortError;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::render::render;
use crate::web::gate::require_authenticated;
use crate::web::pages::{self, redirect_home};
use crate::web::session::Session;
use crate::web::state::AppState;

//=========================================================================================
// Form Payloads
//=========================================================================================

#[derive(Deserialize)]
pub struct CreateForm {
    #[serde(default)]
    pub docu_name: String,
}

#[derive(Deserialize)]
pub struct UpdateForm {
    #[serde(default)]
    pub new_content: String,
}

/// Flashes "<name> does not exist." and sends the client home.
fn missing(mut session: Session, name: &str) -> Response {
    session.flash_error(PortError::NotFound(name.to_string()).to_string());
    redirect_home(session)
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET / - List every document.
pub async fn index(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, ApiError> {
    let files = state.documents.list().await?;
    Ok(pages::index(session, &files))
}

/// GET /{name} - Show a document: markdown as an HTML page, text as-is.
pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    session: Session,
) -> Result<Response, ApiError> {
    let content = match state.documents.read(&name).await {
        Ok(content) => content,
        Err(PortError::NotFound(_)) => return Ok(missing(session, &name)),
        Err(e) => return Err(e.into()),
    };

    let rendered = render(&name, &content)
        .map_err(|e| ApiError::Internal(format!("cannot display {}: {}", name, e)))?;

    Ok(match rendered.kind {
        DocumentKind::Markdown => pages::document(session, &name, &rendered.body),
        DocumentKind::PlainText => {
            (session, [(header::CONTENT_TYPE, "text/plain")], rendered.body).into_response()
        }
    })
}

/// GET /new/ - The create-document form.
pub async fn new_form(session: Session) -> Result<Response, ApiError> {
    let session = match require_authenticated(session) {
        Ok(session) => session,
        Err(redirect) => return Ok(redirect),
    };
    Ok(pages::new_document(StatusCode::OK, session, ""))
}

/// POST /create - Create an empty document named by `docu_name`.
pub async fn create(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<CreateForm>,
) -> Result<Response, ApiError> {
    let mut session = match require_authenticated(session) {
        Ok(session) => session,
        Err(redirect) => return Ok(redirect),
    };
    let name = form.docu_name.trim();

    let created = match state.documents.validate(name).await {
        Ok(doc) => state.documents.create(doc.as_str(), "").await,
        Err(e) => Err(e),
    };

    match created {
        Ok(()) => {
            info!("Created document {}", name);
            session.flash_success(format!("{} was created.", name));
            Ok(redirect_home(session))
        }
        Err(e @ (PortError::InvalidName(_) | PortError::AlreadyExists(_))) => {
            warn!("Rejected document name {:?}: {}", name, e);
            session.flash_error(e.to_string());
            Ok(pages::new_document(
                StatusCode::UNPROCESSABLE_ENTITY,
                session,
                name,
            ))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /{name}/edit - The edit form, pre-filled with the current content.
///
/// A missing document is reported before the sign-in check.
pub async fn edit_form(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    session: Session,
) -> Result<Response, ApiError> {
    let content = match state.documents.read(&name).await {
        Ok(content) => content,
        Err(PortError::NotFound(_)) => return Ok(missing(session, &name)),
        Err(e) => return Err(e.into()),
    };
    let session = match require_authenticated(session) {
        Ok(session) => session,
        Err(redirect) => return Ok(redirect),
    };
    Ok(pages::edit_document(session, &name, &content))
}

/// POST /{name} - Replace a document's content.
///
/// The document is written whether or not it existed before.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    session: Session,
    Form(form): Form<UpdateForm>,
) -> Result<Response, ApiError> {
    let mut session = match require_authenticated(session) {
        Ok(session) => session,
        Err(redirect) => return Ok(redirect),
    };

    match state.documents.write(&name, &form.new_content).await {
        Ok(()) => {}
        Err(PortError::NotFound(_)) => return Ok(missing(session, &name)),
        Err(e) => return Err(e.into()),
    }

    info!("Updated document {}", name);
    session.flash_success(format!("The file {} has been updated.", name));
    Ok(redirect_home(session))
}

/// POST /{name}/delete - Remove a document.
///
/// A missing document is reported before the sign-in check.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    session: Session,
) -> Result<Response, ApiError> {
    if !state.documents.exists(&name).await? {
        return Ok(missing(session, &name));
    }
    let mut session = match require_authenticated(session) {
        Ok(session) => session,
        Err(redirect) => return Ok(redirect),
    };

    match state.documents.delete(&name).await {
        Ok(()) => {
            info!("Deleted document {}", name);
            session.flash_success(format!("{} has been deleted.", name));
            Ok(redirect_home(session))
        }
        Err(PortError::NotFound(_)) => Ok(missing(session, &name)),
        Err(e) => Err(e.into()),
    }
}
