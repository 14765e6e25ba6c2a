//! Validate-then-refresh OAuth credentials for a Twitch chat bot.

mod provider;
mod store;

pub use provider::RefreshingAuthProvider;
pub use store::{AuthStore, FilesystemAuthStore};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};

/// Whatever the session engine needs to log in: a login name and a currently-valid access token.
///
/// Implemented by [`RefreshingAuthProvider`] for the production path, and by
/// [`StaticLoginCredentials`] for tests and anonymous (read-only) connections.
#[async_trait]
pub trait LoginCredentials: Debug + Send + Sync + 'static {
    type Error: Send + Sync + Debug + Display;

    async fn get_credentials(&self) -> Result<(String, String), Self::Error>;
}

#[async_trait]
impl<S: AuthStore> LoginCredentials for RefreshingAuthProvider<S> {
    type Error = crate::error::AuthError;

    async fn get_credentials(&self) -> Result<(String, String), Self::Error> {
        self.login_and_access_token().await
    }
}

/// A fixed login/token pair, never refreshed. Twitch's anonymous justinfan login does not require
/// a real token.
#[derive(Debug, Clone)]
pub struct StaticLoginCredentials {
    pub login: String,
    pub token: Option<String>,
}

impl StaticLoginCredentials {
    pub fn new(login: impl Into<String>, token: Option<String>) -> StaticLoginCredentials {
        StaticLoginCredentials {
            login: login.into(),
            token,
        }
    }

    pub fn anonymous() -> StaticLoginCredentials {
        StaticLoginCredentials::new("justinfan12345", None)
    }
}

#[async_trait]
impl LoginCredentials for StaticLoginCredentials {
    type Error = std::convert::Infallible;

    async fn get_credentials(&self) -> Result<(String, String), std::convert::Infallible> {
        Ok((self.login.clone(), self.token.clone().unwrap_or_default()))
    }
}

/// The persisted credential bundle for one bot user.
///
/// Field names are `camelCase` to match what the filesystem reference store writes to disk; the
/// remote OAuth endpoints instead use `snake_case`, which [`ValidateResponse`] and
/// [`RefreshResponse`] model separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRecord {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "clientId")]
    pub client_id: String,
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
    #[serde(rename = "expiresIn")]
    pub expires_in: i64,
    pub login: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    pub scope: Vec<String>,
    #[serde(rename = "tokenType")]
    pub token_type: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Body of a successful `GET https://id.twitch.tv/oauth2/validate` response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ValidateResponse {
    pub client_id: String,
    pub login: String,
    pub user_id: String,
    pub expires_in: i64,
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// Body of a successful `POST https://id.twitch.tv/oauth2/token` refresh response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub scope: Vec<String>,
    pub token_type: String,
}

/// The `message` field Twitch includes on error responses from the identity endpoints.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RemoteErrorBody {
    #[serde(default)]
    pub message: String,
}
