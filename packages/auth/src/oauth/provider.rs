// ABOUTME: Slack OAuth application configuration
// ABOUTME: Loads client credentials from the environment and builds the consent URL

use emojipost_config::{constants, env};
use url::Url;

use crate::error::{AuthError, AuthResult};

/// Slack Web API method for both token grants
pub const TOKEN_METHOD: &str = "oauth.v2.access";
pub const REVOKE_METHOD: &str = "auth.revoke";
pub const PROFILE_METHOD: &str = "users.profile.get";

/// Slack OAuth application configuration
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub api_base_url: String,
    pub authorize_url: String,
    pub user_scopes: Vec<String>,
}

impl ProviderConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            api_base_url: constants::DEFAULT_SLACK_API_BASE_URL.to_string(),
            authorize_url: constants::DEFAULT_SLACK_AUTHORIZE_URL.to_string(),
            user_scopes: split_scopes(constants::DEFAULT_SLACK_USER_SCOPES),
        }
    }

    /// Load configuration from environment variables
    ///
    /// Client id, secret, and redirect URI are required.
    pub fn from_env() -> AuthResult<Self> {
        let client_id =
            env::require_env(constants::SLACK_CLIENT_ID).map_err(AuthError::Configuration)?;
        let client_secret =
            env::require_env(constants::SLACK_CLIENT_SECRET).map_err(AuthError::Configuration)?;
        let redirect_uri =
            env::require_env(constants::SLACK_REDIRECT_URI).map_err(AuthError::Configuration)?;

        Ok(Self {
            api_base_url: env::env_or(
                constants::SLACK_API_BASE_URL,
                constants::DEFAULT_SLACK_API_BASE_URL,
            ),
            authorize_url: env::env_or(
                constants::SLACK_AUTHORIZE_URL,
                constants::DEFAULT_SLACK_AUTHORIZE_URL,
            ),
            user_scopes: split_scopes(&env::env_or(
                constants::SLACK_USER_SCOPES,
                constants::DEFAULT_SLACK_USER_SCOPES,
            )),
            ..Self::new(client_id, client_secret, redirect_uri)
        })
    }

    /// Point API calls at a different base URL (tests, proxies)
    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into();
        self
    }

    /// Full URL of a Web API method
    pub fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.api_base_url.trim_end_matches('/'), method)
    }

    /// Consent page URL requesting user-token scopes only
    pub fn authorize_url(&self) -> AuthResult<Url> {
        let mut url = Url::parse(&self.authorize_url)
            .map_err(|e| AuthError::Configuration(format!("Invalid authorize URL: {}", e)))?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("scope", "")
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("user_scope", &self.user_scopes.join(","));

        Ok(url)
    }
}

fn split_scopes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
