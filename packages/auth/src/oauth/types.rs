// ABOUTME: Core type definitions for the Slack OAuth session
// ABOUTME: Includes the persisted token record, grants, and provider response shapes

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult, Operation};

/// Persisted Slack credential.
///
/// Either empty (logged out) or fully populated (logged in). Partially
/// populated records can still be read back from storage and are treated as
/// not authenticated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl TokenRecord {
    /// Build a logged-in record from freshly issued credentials
    pub fn from_credentials(credentials: IssuedCredentials, now: i64) -> Self {
        Self {
            access_token: Some(credentials.access_token),
            refresh_token: Some(credentials.refresh_token),
            expires_at: Some(now.saturating_add(credentials.expires_in)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.expires_at.is_none()
    }

    /// All three fields present
    pub fn is_complete(&self) -> bool {
        self.access_token.is_some() && self.refresh_token.is_some() && self.expires_at.is_some()
    }

    /// Expired when `expires_at < now`; a missing expiry counts as expired
    pub fn is_expired(&self, now: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at < now,
            None => true,
        }
    }
}

/// OAuth grant type sent to the token endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantType {
    AuthorizationCode,
    RefreshToken,
}

impl GrantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::RefreshToken => "refresh_token",
        }
    }

    /// Form field carrying the grant value
    pub fn value_field(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "code",
            Self::RefreshToken => "refresh_token",
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Self::AuthorizationCode => Operation::CodeExchange,
            Self::RefreshToken => Operation::Refresh,
        }
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One-time authorization code received on the consent redirect
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuthorizationGrant(String);

impl AuthorizationGrant {
    /// Returns `None` for blank codes
    pub fn new(code: impl Into<String>) -> Option<Self> {
        let code = code.into();
        if code.trim().is_empty() {
            None
        } else {
            Some(Self(code))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validated credentials from a successful token exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCredentials {
    pub access_token: String,
    pub refresh_token: String,
    /// Seconds
    pub expires_in: i64,
}

/// Credential fields as they appear in a token response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialFields {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}

impl CredentialFields {
    fn into_credentials(self, operation: Operation) -> AuthResult<IssuedCredentials> {
        let missing = |field| AuthError::MalformedResponse { operation, field };

        let access_token = self
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| missing("access_token"))?;
        let refresh_token = self
            .refresh_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| missing("refresh_token"))?;
        let expires_in = self
            .expires_in
            .filter(|secs| *secs > 0)
            .ok_or_else(|| missing("expires_in"))?;

        Ok(IssuedCredentials {
            access_token,
            refresh_token,
            expires_in,
        })
    }
}

/// Response from `oauth.v2.access`.
///
/// The authorization-code grant nests user credentials under `authed_user`;
/// the refresh grant returns them at the top level.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub ok: bool,
    pub error: Option<String>,
    #[serde(flatten)]
    pub credentials: CredentialFields,
    pub authed_user: Option<CredentialFields>,
}

impl TokenResponse {
    /// Validate the response for the grant that produced it
    pub fn into_credentials(self, grant_type: GrantType) -> AuthResult<IssuedCredentials> {
        let operation = grant_type.operation();

        if !self.ok {
            return Err(AuthError::ProviderRejected {
                operation,
                code: self.error.unwrap_or_else(|| "unknown_error".to_string()),
            });
        }

        let fields = match grant_type {
            GrantType::AuthorizationCode => self.authed_user.ok_or(AuthError::MalformedResponse {
                operation,
                field: "authed_user",
            })?,
            GrantType::RefreshToken => self.credentials,
        };

        fields.into_credentials(operation)
    }
}

/// Bare `{ok, error}` acknowledgement, as returned by `auth.revoke`
#[derive(Debug, Deserialize)]
pub struct ProviderAck {
    pub ok: bool,
    pub error: Option<String>,
}

impl ProviderAck {
    pub fn into_result(self, operation: Operation) -> AuthResult<()> {
        if self.ok {
            Ok(())
        } else {
            Err(AuthError::ProviderRejected {
                operation,
                code: self.error.unwrap_or_else(|| "unknown_error".to_string()),
            })
        }
    }
}

/// Authenticated user's profile, as rendered by the app
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub real_name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub image_72: Option<String>,
    #[serde(default)]
    pub status_text: Option<String>,
    #[serde(default)]
    pub status_emoji: Option<String>,
}

impl UserProfile {
    /// Display name, falling back to the real name
    pub fn name(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.real_name.as_deref())
    }
}

/// Response from `users.profile.get`
#[derive(Debug, Deserialize)]
pub struct ProfileResponse {
    pub ok: bool,
    pub error: Option<String>,
    pub profile: Option<UserProfile>,
}

impl ProfileResponse {
    pub fn into_profile(self) -> AuthResult<UserProfile> {
        let operation = Operation::ProfileFetch;
        if !self.ok {
            return Err(AuthError::ProviderRejected {
                operation,
                code: self.error.unwrap_or_else(|| "unknown_error".to_string()),
            });
        }
        self.profile.ok_or(AuthError::MalformedResponse {
            operation,
            field: "profile",
        })
    }
}
