// ABOUTME: Slack Web API client for token grants, revocation, and profile lookup
// ABOUTME: One POST per call with no retries; failures are classified per operation

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::{
    error::{AuthError, AuthResult, Operation},
    oauth::{
        provider::{ProviderConfig, PROFILE_METHOD, REVOKE_METHOD, TOKEN_METHOD},
        types::{
            GrantType, IssuedCredentials, ProfileResponse, ProviderAck, TokenResponse,
            UserProfile,
        },
    },
};

/// Token endpoint port used by the session controller
#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    /// Exchange an authorization code or refresh token for credentials
    async fn exchange(&self, grant_type: GrantType, value: &str)
        -> AuthResult<IssuedCredentials>;

    /// Revoke an access token
    async fn revoke(&self, access_token: &str) -> AuthResult<()>;
}

/// Profile endpoint port used by the session controller
#[async_trait]
pub trait ProfileEndpoint: Send + Sync {
    async fn fetch_profile(&self, access_token: &str) -> AuthResult<UserProfile>;
}

/// reqwest-backed Slack client
#[derive(Clone)]
pub struct SlackClient {
    config: ProviderConfig,
    client: Client,
}

impl SlackClient {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    async fn post_form<T>(
        &self,
        operation: Operation,
        method: &str,
        form: &[(&str, &str)],
    ) -> AuthResult<T>
    where
        T: DeserializeOwned,
    {
        let url = self.config.method_url(method);
        debug!("POST {} ({})", url, operation);

        let response = self
            .client
            .post(&url)
            .form(form)
            .send()
            .await
            .map_err(|e| {
                error!("{} request failed: {}", operation, e);
                AuthError::transport(operation, e)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            // Don't leak the response body - only log status
            error!("{} failed with status {}", operation, status);
            return Err(AuthError::transport(
                operation,
                format!("unexpected HTTP status {}", status),
            ));
        }

        response.json::<T>().await.map_err(|e| {
            error!("Failed to parse {} response: {}", method, e);
            AuthError::transport(operation, format!("invalid response body: {}", e))
        })
    }
}

#[async_trait]
impl TokenEndpoint for SlackClient {
    async fn exchange(
        &self,
        grant_type: GrantType,
        value: &str,
    ) -> AuthResult<IssuedCredentials> {
        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("grant_type", grant_type.as_str()),
            (grant_type.value_field(), value),
        ];

        let response: TokenResponse = self
            .post_form(grant_type.operation(), TOKEN_METHOD, &form)
            .await?;

        response.into_credentials(grant_type).inspect_err(|e| {
            error!("{}", e);
        })
    }

    async fn revoke(&self, access_token: &str) -> AuthResult<()> {
        let ack: ProviderAck = self
            .post_form(Operation::Revoke, REVOKE_METHOD, &[("token", access_token)])
            .await?;

        ack.into_result(Operation::Revoke)
    }
}

#[async_trait]
impl ProfileEndpoint for SlackClient {
    async fn fetch_profile(&self, access_token: &str) -> AuthResult<UserProfile> {
        let response: ProfileResponse = self
            .post_form(
                Operation::ProfileFetch,
                PROFILE_METHOD,
                &[("token", access_token)],
            )
            .await?;

        response.into_profile()
    }
}
