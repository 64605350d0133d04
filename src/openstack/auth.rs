//! Keystone v3 password authentication.
//!
//! A successful handshake yields a [`Session`]: the subject token plus the
//! service catalog used to locate the compute endpoint.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::catalog::CatalogEntry;
use super::error::OpenStackBackendError;
use crate::config::Credentials;

const SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";

/// Options for the Keystone password handshake.
#[derive(Clone, Eq, PartialEq)]
pub struct AuthOptions {
    /// Keystone identity endpoint as configured.
    pub identity_endpoint: String,
    /// User name.
    pub username: String,
    /// Password.
    pub password: String,
    /// Domain the user belongs to.
    pub domain_name: String,
    /// Project the token is scoped to.
    pub project_id: String,
    /// Re-authenticate transparently when a token expires mid-run.
    pub allow_reauth: bool,
}

impl std::fmt::Debug for AuthOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthOptions")
            .field("identity_endpoint", &self.identity_endpoint)
            .field("username", &self.username)
            .field("domain_name", &self.domain_name)
            .field("project_id", &self.project_id)
            .field("allow_reauth", &self.allow_reauth)
            .finish_non_exhaustive()
    }
}

impl AuthOptions {
    /// Builds handshake options from validated credentials.
    ///
    /// Listing a large project can outlive a token, so reauthentication is
    /// always enabled.
    #[must_use]
    pub fn from_credentials(credentials: &Credentials) -> Self {
        Self {
            identity_endpoint: credentials.auth_url.clone(),
            username: credentials.username.clone(),
            password: credentials.password.clone(),
            domain_name: credentials.domain_name.clone(),
            project_id: credentials.project_id.clone(),
            allow_reauth: true,
        }
    }

    /// Returns the token issuing URL, adding the `v3` path segment when the
    /// configured endpoint carries no version.
    #[must_use]
    pub fn tokens_url(&self) -> String {
        let base = self.identity_endpoint.trim_end_matches('/');
        if base.ends_with("/v3") {
            format!("{base}/auth/tokens")
        } else {
            format!("{base}/v3/auth/tokens")
        }
    }

    fn request_body(&self) -> serde_json::Value {
        json!({
            "auth": {
                "identity": {
                    "methods": ["password"],
                    "password": {
                        "user": {
                            "name": self.username,
                            "domain": { "name": self.domain_name },
                            "password": self.password,
                        }
                    }
                },
                "scope": {
                    "project": { "id": self.project_id }
                }
            }
        })
    }
}

/// Authenticated session handle.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Session {
    token: String,
    expires_at: Option<String>,
    catalog: Vec<CatalogEntry>,
}

impl Session {
    /// Token sent as `X-Auth-Token` on API calls.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Expiry timestamp reported by Keystone, if any.
    #[must_use]
    pub fn expires_at(&self) -> Option<&str> {
        self.expires_at.as_deref()
    }

    pub(crate) fn catalog(&self) -> &[CatalogEntry] {
        &self.catalog
    }
}

#[derive(Debug, Deserialize)]
struct TokenEnvelope {
    token: Option<TokenBody>,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    expires_at: Option<String>,
    #[serde(default)]
    catalog: Vec<CatalogEntry>,
}

/// Builds a session from the handshake response parts.
///
/// A response that carries no token header, or no token body, is treated as
/// an empty auth result even though Keystone reported success.
pub(crate) fn session_from_response(
    token_header: Option<&str>,
    body: &str,
) -> Result<Session, OpenStackBackendError> {
    let token = token_header
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(OpenStackBackendError::EmptyAuthResult)?;
    let envelope: TokenEnvelope =
        serde_json::from_str(body).map_err(|err| OpenStackBackendError::Decode {
            context: String::from("token response"),
            message: err.to_string(),
        })?;
    let token_body = envelope
        .token
        .ok_or(OpenStackBackendError::EmptyAuthResult)?;

    Ok(Session {
        token: token.to_owned(),
        expires_at: token_body.expires_at,
        catalog: token_body.catalog,
    })
}

/// Performs the password handshake.
///
/// # Errors
///
/// Returns [`OpenStackBackendError::Transport`] when Keystone is unreachable,
/// [`OpenStackBackendError::Authentication`] when it rejects the request, and
/// [`OpenStackBackendError::EmptyAuthResult`] when it yields no token.
pub async fn authenticate(
    client: &Client,
    options: &AuthOptions,
) -> Result<Session, OpenStackBackendError> {
    let response = client
        .post(options.tokens_url())
        .json(&options.request_body())
        .send()
        .await?;

    let status = response.status();
    let token_header = response
        .headers()
        .get(SUBJECT_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let body = response.text().await?;

    if !status.is_success() {
        return Err(OpenStackBackendError::Authentication {
            status: status.as_u16(),
            message: body,
        });
    }

    let session = session_from_response(token_header.as_deref(), &body)?;
    info!(
        user = %options.username,
        project_id = %options.project_id,
        expires_at = session.expires_at().unwrap_or("unknown"),
        "authenticated with Keystone"
    );
    Ok(session)
}
