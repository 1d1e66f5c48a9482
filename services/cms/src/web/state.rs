//! services/cms/src/web/state.rs
//!
//! Defines the application state shared by every request handler.

use std::sync::Arc;

use axum::extract::FromRef;
use cms_core::ports::{CredentialStore, DocumentStore};
use tracing::{info, warn};

use crate::adapters::{FsDocumentStore, YamlCredentialStore};
use crate::config::Config;
use crate::error::ApiError;
use crate::web::session::SessionKey;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub documents: Arc<dyn DocumentStore>,
    pub credentials: Arc<dyn CredentialStore>,
    pub session_key: SessionKey,
}

impl AppState {
    /// Opens the document directory, loads the users file and prepares the
    /// cookie signing key described by `config`.
    pub async fn from_config(config: Config) -> Result<Self, ApiError> {
        info!("Opening document store at {}", config.data_dir.display());
        let documents = FsDocumentStore::open(&config.data_dir).await?;
        let credentials = YamlCredentialStore::load(&config.users_file).await?;

        let session_key = match &config.session_secret {
            Some(secret) => SessionKey::new(secret.as_bytes())?,
            None => {
                warn!("SESSION_SECRET is not set; sessions will not survive a restart");
                SessionKey::generate()?
            }
        };

        Ok(Self {
            documents: Arc::new(documents),
            credentials: Arc::new(credentials),
            session_key,
        })
    }
}

impl FromRef<Arc<AppState>> for SessionKey {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.session_key.clone()
    }
}
