use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::AuthError;

use super::{AuthRecord, AuthStore, RefreshResponse, RemoteErrorBody, ValidateResponse};

const VALIDATE_URL: &str = "https://id.twitch.tv/oauth2/validate";
const TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";
const USER_AGENT: &str = "TwitchBot v1.0";

/// Keeps an [`AuthRecord`] valid: validates the stored access token against Twitch on every call
/// and, only if that validation fails, performs a refresh-token grant before trying again.
///
/// There is no proactive refresh based on `expires_in` -- validation is the sole gate, matching
/// the reference implementation this is grounded on.
#[derive(Debug)]
pub struct RefreshingAuthProvider<S: AuthStore> {
    store: S,
    user_id: String,
    http: Client,
    validate_url: String,
    token_url: String,
}

impl<S: AuthStore> RefreshingAuthProvider<S> {
    /// `http_timeout` is normally [`SessionConfig::http_timeout`](crate::config::SessionConfig::http_timeout).
    pub fn new(
        store: S,
        user_id: impl Into<String>,
        http_timeout: Duration,
    ) -> Result<RefreshingAuthProvider<S>, AuthError> {
        let user_id = user_id.into();
        if user_id.is_empty() {
            return Err(AuthError::BlankUserId);
        }

        let http = Client::builder()
            .timeout(http_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(RefreshingAuthProvider {
            store,
            user_id,
            http,
            validate_url: VALIDATE_URL.to_owned(),
            token_url: TOKEN_URL.to_owned(),
        })
    }

    /// Override the identity-service endpoints. Only used by tests so a mock HTTP server can
    /// stand in for `id.twitch.tv`.
    #[cfg(test)]
    pub(crate) fn with_endpoints(
        store: S,
        user_id: impl Into<String>,
        validate_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Result<RefreshingAuthProvider<S>, AuthError> {
        let mut provider = RefreshingAuthProvider::new(store, user_id, Duration::from_secs(10))?;
        provider.validate_url = validate_url.into();
        provider.token_url = token_url.into();
        Ok(provider)
    }

    /// Return a currently-valid access token, refreshing first if necessary.
    pub async fn access_token(&self) -> Result<String, AuthError> {
        let record = self.get_valid_record().await?;
        Ok(record.access_token)
    }

    /// Return `(login, access_token)` for a currently-valid credential.
    pub async fn login_and_access_token(&self) -> Result<(String, String), AuthError> {
        let record = self.get_valid_record().await?;
        Ok((record.login, record.access_token))
    }

    async fn get_valid_record(&self) -> Result<AuthRecord, AuthError> {
        let record = self
            .store
            .get(&self.user_id)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;

        if record.access_token.is_empty() {
            return Err(AuthError::BlankAccessToken);
        }

        if let Ok(validated) = self.validate(&record.access_token).await {
            debug!(user_id = %self.user_id, "access token still valid");
            let _ = validated;
            return Ok(record);
        }

        debug!(user_id = %self.user_id, "access token invalid, refreshing");
        let refreshed = self.refresh(&record).await?;
        self.store
            .update(&refreshed)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        Ok(refreshed)
    }

    async fn validate(&self, access_token: &str) -> Result<ValidateResponse, AuthError> {
        let response = self
            .http
            .get(self.validate_url.as_str())
            .header("Authorization", format!("Bearer {access_token}"))
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            let body = response.json::<RemoteErrorBody>().await.unwrap_or(RemoteErrorBody {
                message: "token validation failed".to_owned(),
            });
            warn!(message = %body.message, "twitch rejected token validation");
            return Err(AuthError::RemoteRejected(body.message));
        }

        Ok(response.json().await?)
    }

    async fn refresh(&self, record: &AuthRecord) -> Result<AuthRecord, AuthError> {
        if record.client_id.is_empty() {
            return Err(AuthError::BlankClientId);
        }
        if record.client_secret.is_empty() {
            return Err(AuthError::BlankClientSecret);
        }
        if record.refresh_token.is_empty() {
            return Err(AuthError::BlankRefreshToken);
        }

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", record.refresh_token.as_str()),
            ("client_id", record.client_id.as_str()),
            ("client_secret", record.client_secret.as_str()),
        ];

        let response = self
            .http
            .post(self.token_url.as_str())
            .form(&params)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            let body = response.json::<RemoteErrorBody>().await.unwrap_or(RemoteErrorBody {
                message: "token refresh failed".to_owned(),
            });
            warn!(message = %body.message, "twitch rejected token refresh");
            return Err(AuthError::RemoteRejected(body.message));
        }

        let refreshed: RefreshResponse = response.json().await?;
        let validated = self.validate(&refreshed.access_token).await?;

        Ok(AuthRecord {
            access_token: refreshed.access_token,
            client_id: validated.client_id,
            client_secret: record.client_secret.clone(),
            expires_in: refreshed.expires_in,
            login: validated.login,
            refresh_token: refreshed.refresh_token,
            scope: refreshed.scope,
            token_type: refreshed.token_type,
            user_id: validated.user_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::FilesystemAuthStore;

    fn sample_record() -> AuthRecord {
        AuthRecord {
            access_token: "stale-token".to_owned(),
            client_id: "client-id".to_owned(),
            client_secret: "client-secret".to_owned(),
            expires_in: 1,
            login: "ynotnauk".to_owned(),
            refresh_token: "refresh-token".to_owned(),
            scope: vec!["chat:read".to_owned()],
            token_type: "bearer".to_owned(),
            user_id: "42".to_owned(),
        }
    }

    #[tokio::test]
    async fn refreshes_when_validation_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemAuthStore::new(dir.path()).unwrap();
        let record = sample_record();
        store.update(&record).await.unwrap();

        let mut server = mockito::Server::new_async().await;

        let invalid_then_valid = server
            .mock("GET", "/validate")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"invalid access token"}"#)
            .expect(1)
            .create_async()
            .await;

        let refresh_mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"access_token":"fresh-token","refresh_token":"fresh-refresh","expires_in":14400,"scope":["chat:read"],"token_type":"bearer"}"#,
            )
            .create_async()
            .await;

        let second_validate = server
            .mock("GET", "/validate")
            .match_header("authorization", "Bearer fresh-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"client_id":"client-id","login":"bot","user_id":"42","expires_in":14400,"scopes":["chat:read"]}"#,
            )
            .create_async()
            .await;

        let validate_url = format!("{}/validate", server.url());
        let token_url = format!("{}/token", server.url());
        let provider =
            RefreshingAuthProvider::with_endpoints(store.clone(), "42", validate_url, token_url)
                .unwrap();

        let (login, token) = provider.login_and_access_token().await.unwrap();

        assert_eq!(login, "bot");
        assert_eq!(token, "fresh-token");

        let persisted = store.get("42").await.unwrap();
        assert_eq!(persisted.client_secret, "client-secret");
        assert_eq!(persisted.refresh_token, "fresh-refresh");

        invalid_then_valid.assert_async().await;
        refresh_mock.assert_async().await;
        second_validate.assert_async().await;
    }

    #[tokio::test]
    async fn no_refresh_when_token_still_valid() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemAuthStore::new(dir.path()).unwrap();
        store.update(&sample_record()).await.unwrap();

        let mut server = mockito::Server::new_async().await;
        let validate_mock = server
            .mock("GET", "/validate")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"client_id":"client-id","login":"ynotnauk","user_id":"42","expires_in":3600,"scopes":["chat:read"]}"#,
            )
            .create_async()
            .await;

        let validate_url = format!("{}/validate", server.url());
        let provider = RefreshingAuthProvider::with_endpoints(
            store.clone(),
            "42",
            validate_url,
            format!("{}/token", server.url()),
        )
        .unwrap();

        let token = provider.access_token().await.unwrap();
        assert_eq!(token, "stale-token");
        validate_mock.assert_async().await;
    }
}
