//! services/cms/src/adapters/credentials.rs
//!
//! Implements the `CredentialStore` port over a static YAML file that maps
//! usernames to argon2 password hashes:
//!
//! ```yaml
//! admin: $argon2id$v=19$m=19456,t=2,p=1$...
//! ```
//!
//! The file is provisioned out-of-band and read once at startup.

use std::collections::HashMap;
use std::path::Path;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use cms_core::ports::{CredentialStore, PortError, PortResult};
use rand_core::OsRng;
use tracing::{info, warn};

/// Username to password-hash lookup loaded from YAML.
#[derive(Clone, Debug, Default)]
pub struct YamlCredentialStore {
    users: HashMap<String, String>,
}

impl YamlCredentialStore {
    /// Reads and parses the users file.
    pub async fn load(path: &Path) -> PortResult<Self> {
        let source = tokio::fs::read_to_string(path).await?;
        let store = Self::from_yaml(&source)?;
        info!(
            "Loaded {} credential(s) from {}",
            store.users.len(),
            path.display()
        );
        Ok(store)
    }

    /// Parses a YAML mapping of `username: hash`. An empty document has no users.
    pub fn from_yaml(source: &str) -> PortResult<Self> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        let users: HashMap<String, String> = yaml_serde::from_str(source)
            .map_err(|e| PortError::Unexpected(format!("invalid users file: {}", e)))?;
        Ok(Self { users })
    }
}

#[async_trait]
impl CredentialStore for YamlCredentialStore {
    async fn verify(&self, username: &str, password: &str) -> PortResult<bool> {
        let Some(stored) = self.users.get(username).cloned() else {
            return Ok(false);
        };
        let username = username.to_string();
        let password = password.to_string();

        // Hash verification is deliberately slow; keep it off the async workers.
        tokio::task::spawn_blocking(move || {
            let parsed = match PasswordHash::new(&stored) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("Stored hash for '{}' is unreadable: {}", username, e);
                    return false;
                }
            };
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .await
        .map_err(|e| PortError::Unexpected(format!("password check failed: {}", e)))
    }
}

/// Hashes a password into the PHC string format stored in the users file.
pub fn hash_password(password: &str) -> PortResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PortError::Unexpected(format!("failed to hash password: {}", e)))
}
