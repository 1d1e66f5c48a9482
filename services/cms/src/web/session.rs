//! services/cms/src/web/session.rs
//!
//! Per-client session state carried in a signed cookie.
//!
//! A [`Session`] is extracted from the request at the start of a handler and
//! handed back as part of the response, which re-signs it into `Set-Cookie`.
//! Nothing about a session is kept on the server.

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderValue},
    response::{IntoResponseParts, ResponseParts},
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;

use crate::error::ApiError;

/// Name of the cookie holding the session.
pub const COOKIE_NAME: &str = "cms_session";

type HmacSha256 = Hmac<Sha256>;

//=========================================================================================
// Signing Key
//=========================================================================================

/// HMAC-SHA256 key used to sign and check session cookies.
#[derive(Clone)]
pub struct SessionKey {
    mac: Arc<HmacSha256>,
}

impl SessionKey {
    pub fn new(secret: &[u8]) -> Result<Self, ApiError> {
        let mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| ApiError::Internal(format!("invalid session secret: {}", e)))?;
        Ok(Self { mac: Arc::new(mac) })
    }

    /// A random key; sessions signed with it do not survive a restart.
    pub fn generate() -> Result<Self, ApiError> {
        let mut secret = [0u8; 64];
        OsRng.fill_bytes(&mut secret);
        Self::new(&secret)
    }

    fn signature(&self, payload: &str) -> HmacSha256 {
        let mut mac = (*self.mac).clone();
        mac.update(payload.as_bytes());
        mac
    }

    /// Serializes and signs session data as `<payload>.<signature>`.
    pub fn encode(&self, data: &SessionData) -> String {
        let json = serde_json::to_vec(data).unwrap_or_default();
        let payload = URL_SAFE_NO_PAD.encode(json);
        let tag = self.signature(&payload).finalize().into_bytes();
        format!("{}.{}", payload, URL_SAFE_NO_PAD.encode(tag))
    }

    /// Checks the signature and deserializes; `None` for anything tampered or malformed.
    pub fn decode(&self, value: &str) -> Option<SessionData> {
        let (payload, tag) = value.split_once('.')?;
        let tag = URL_SAFE_NO_PAD.decode(tag).ok()?;
        self.signature(payload).verify_slice(&tag).ok()?;
        let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
        serde_json::from_slice(&json).ok()
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionKey(..)")
    }
}

//=========================================================================================
// Session
//=========================================================================================

/// What the cookie actually stores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flash_success: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flash_error: Option<String>,
}

/// The session for the current request.
#[derive(Debug)]
pub struct Session {
    data: SessionData,
    key: SessionKey,
}

impl Session {
    pub fn new(data: SessionData, key: SessionKey) -> Self {
        Self { data, key }
    }

    pub fn username(&self) -> Option<&str> {
        self.data.username.as_deref().filter(|name| !name.is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.username().is_some()
    }

    pub fn sign_in(&mut self, username: &str) {
        self.data.username = Some(username.to_string());
        self.flash_success(format!("Welcome, {}!", username));
    }

    pub fn sign_out(&mut self) {
        self.data.username = None;
        self.flash_success("You've been signed out.");
    }

    pub fn flash_success(&mut self, message: impl Into<String>) {
        self.data.flash_success = Some(message.into());
    }

    pub fn flash_error(&mut self, message: impl Into<String>) {
        self.data.flash_error = Some(message.into());
    }

    /// Returns the pending success message and clears it.
    pub fn take_flash_success(&mut self) -> Option<String> {
        self.data.flash_success.take()
    }

    /// Returns the pending error message and clears it.
    pub fn take_flash_error(&mut self) -> Option<String> {
        self.data.flash_error.take()
    }
}

/// Finds our cookie among all `Cookie` headers of a request.
fn cookie_value(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|c| c.trim().strip_prefix(COOKIE_NAME)?.strip_prefix('='))
}

impl<S> FromRequestParts<S> for Session
where
    SessionKey: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let key = SessionKey::from_ref(state);
        let data = match cookie_value(parts) {
            Some(value) => key.decode(value).unwrap_or_else(|| {
                debug!("Discarding session cookie with a bad signature");
                SessionData::default()
            }),
            None => SessionData::default(),
        };
        Ok(Self { data, key })
    }
}

impl IntoResponseParts for Session {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        let cookie = format!(
            "{}={}; HttpOnly; SameSite=Lax; Path=/",
            COOKIE_NAME,
            self.key.encode(&self.data)
        );
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            res.headers_mut().append(header::SET_COOKIE, value);
        }
        Ok(res)
    }
}
