//! OAuth client for the external workspace API.
//!
//! Covers the connect flow only: building the authorize redirect and
//! exchanging the callback code for an access token. No content calls are
//! made during a sync — the sync lifecycle is simulated.

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::Config;

/// Scopes requested when initiating the connect flow.
const OAUTH_SCOPES: [&str; 4] = [
    "user:read",
    "content:read",
    "content:write",
    "workspace:read",
];

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error(
        "workspace OAuth is not configured; set WORKSPACE_CLIENT_ID and WORKSPACE_CLIENT_SECRET"
    )]
    NotConfigured,
    #[error("token exchange request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("token exchange rejected: {0}")]
    Exchange(String),
    #[error("invalid authorize URL: {0}")]
    BadAuthorizeUrl(#[from] url::ParseError),
}

/// Token grant returned by the authorization-code exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub workspace_id: Option<String>,
    pub bot_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExchangeErrorBody {
    error: Option<String>,
}

pub struct WorkspaceClient {
    http: reqwest::Client,
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: String,
    authorize_url: String,
    token_url: String,
}

impl WorkspaceClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            authorize_url: config.authorize_url.clone(),
            token_url: config.token_url.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }

    /// URL the browser is sent to when the user connects their workspace.
    pub fn authorize_redirect_url(&self) -> Result<String, WorkspaceError> {
        let client_id = self
            .client_id
            .as_deref()
            .ok_or(WorkspaceError::NotConfigured)?;

        let mut url = Url::parse(&self.authorize_url)?;
        url.query_pairs_mut()
            .append_pair("client_id", client_id)
            .append_pair("response_type", "code")
            .append_pair("owner", "user")
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("scope", &OAUTH_SCOPES.join(" "));
        Ok(url.into())
    }

    /// Exchange an authorization code for an access token, authenticating
    /// with HTTP basic client credentials.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenGrant, WorkspaceError> {
        let (Some(client_id), Some(client_secret)) =
            (self.client_id.as_deref(), self.client_secret.as_deref())
        else {
            return Err(WorkspaceError::NotConfigured);
        };

        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(client_id, Some(client_secret))
            .json(&serde_json::json!({
                "grant_type": "authorization_code",
                "code": code,
                "redirect_uri": self.redirect_uri,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let detail = response
                .json::<ExchangeErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| "Failed to exchange code for token".to_string());
            return Err(WorkspaceError::Exchange(detail));
        }

        Ok(response.json::<TokenGrant>().await?)
    }
}
