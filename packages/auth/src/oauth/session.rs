// ABOUTME: Session lifecycle controller for the Slack user token
// ABOUTME: Decides code exchange, refresh, reuse, or failure on each activation and owns the token record

use std::{collections::HashSet, fmt};

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::{
    error::{AuthError, AuthResult},
    oauth::{
        client::{ProfileEndpoint, TokenEndpoint},
        storage::{KeyValueStore, TokenStorage},
        types::{AuthorizationGrant, GrantType, TokenRecord, UserProfile},
    },
};

/// Lifecycle state of the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Before the first activation decision
    Idle,
    ExchangingCode,
    RefreshingToken,
    NoOpValid,
    LoggedOut,
    /// Credential confirmed usable
    Ready,
    /// Terminal until `logout` or `clear`
    Failed(String),
}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            Self::Idle | Self::ExchangingCode | Self::RefreshingToken | Self::NoOpValid
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::ExchangingCode => write!(f, "exchanging code"),
            Self::RefreshingToken => write!(f, "refreshing token"),
            Self::NoOpValid => write!(f, "token valid"),
            Self::LoggedOut => write!(f, "logged out"),
            Self::Ready => write!(f, "ready"),
            Self::Failed(message) => write!(f, "failed: {}", message),
        }
    }
}

/// Instruction for the host, executed after a command returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEffect {
    /// Drop the authorization code from the host's location
    StripGrant,
    /// Re-render from a clean slate
    Reload,
}

/// Inputs of one activation
#[derive(Debug, Clone, Default)]
pub struct ActivationContext {
    grant: Option<AuthorizationGrant>,
}

impl ActivationContext {
    /// Activation without an authorization code
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_code(code: impl Into<String>) -> Self {
        Self {
            grant: AuthorizationGrant::new(code),
        }
    }

    /// Read the `code` query parameter of a redirect URL
    pub fn from_redirect_url(url: &str) -> AuthResult<Self> {
        let url = Url::parse(url)
            .map_err(|e| AuthError::Configuration(format!("Invalid redirect URL: {}", e)))?;

        let grant = url
            .query_pairs()
            .find(|(key, _)| key == "code")
            .and_then(|(_, value)| AuthorizationGrant::new(value.into_owned()));

        Ok(Self { grant })
    }

    pub fn grant(&self) -> Option<&AuthorizationGrant> {
        self.grant.as_ref()
    }
}

/// Outcome of the activation decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationPlan {
    ExchangeCode(AuthorizationGrant),
    Refresh(String),
    UseStored,
    LoggedOut,
}

/// Controller tuning
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Refresh this many seconds before `expires_at`
    pub refresh_leeway_secs: i64,
}

/// Pure activation decision.
///
/// A grant always wins. Without one, the stored record decides: no refresh
/// token means logged out, an expired (or access-token-less) record needs a
/// refresh, anything else is used as-is.
pub fn plan(
    record: &TokenRecord,
    grant: Option<&AuthorizationGrant>,
    now: i64,
    config: &SessionConfig,
) -> ActivationPlan {
    if let Some(grant) = grant {
        return ActivationPlan::ExchangeCode(grant.clone());
    }

    let Some(refresh_token) = record.refresh_token.as_ref() else {
        return ActivationPlan::LoggedOut;
    };

    let deadline = now.saturating_add(config.refresh_leeway_secs);
    if record.access_token.is_none() || record.is_expired(deadline) {
        ActivationPlan::Refresh(refresh_token.clone())
    } else {
        ActivationPlan::UseStored
    }
}

/// Read-only snapshot for consumers
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub state: SessionState,
    pub is_loading: bool,
    pub error_message: Option<String>,
    pub token: TokenRecord,
    pub profile: Option<UserProfile>,
}

impl SessionView {
    /// Access token usable for API calls; `None` unless the session is ready
    pub fn access_token(&self) -> Option<&str> {
        if self.state == SessionState::Ready && self.token.is_complete() {
            self.token.access_token.as_deref()
        } else {
            None
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }
}

/// Session lifecycle controller.
///
/// Sole writer of the token record. Every command takes `&mut self`, so
/// credential-mutating operations never overlap.
pub struct SessionController<S, T, P> {
    storage: TokenStorage<S>,
    tokens: T,
    profiles: P,
    config: SessionConfig,
    state: SessionState,
    record: TokenRecord,
    profile: Option<UserProfile>,
    profile_token: Option<String>,
    error_message: Option<String>,
    attempted_grants: HashSet<AuthorizationGrant>,
    view_tx: watch::Sender<SessionView>,
}

impl<S, T, P> SessionController<S, T, P>
where
    S: KeyValueStore,
    T: TokenEndpoint,
    P: ProfileEndpoint,
{
    pub fn new(store: S, tokens: T, profiles: P) -> Self {
        Self::with_config(store, tokens, profiles, SessionConfig::default())
    }

    pub fn with_config(store: S, tokens: T, profiles: P, config: SessionConfig) -> Self {
        let initial = SessionView {
            state: SessionState::Idle,
            is_loading: true,
            error_message: None,
            token: TokenRecord::default(),
            profile: None,
        };
        let (view_tx, _) = watch::channel(initial);

        Self {
            storage: TokenStorage::new(store),
            tokens,
            profiles,
            config,
            state: SessionState::Idle,
            record: TokenRecord::default(),
            profile: None,
            profile_token: None,
            error_message: None,
            attempted_grants: HashSet::new(),
            view_tx,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            state: self.state.clone(),
            is_loading: self.state.is_loading(),
            error_message: self.error_message.clone(),
            token: self.record.clone(),
            profile: self.profile.clone(),
        }
    }

    /// Watch every view change, including in-flight states
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view_tx.subscribe()
    }

    /// Run one activation.
    ///
    /// Failures land in [`SessionState::Failed`] rather than being returned.
    /// A grant is exchanged at most once per controller, whatever the outcome.
    pub async fn activate(&mut self, context: &ActivationContext, now: i64) -> Vec<SessionEffect> {
        let mut effects = Vec::new();

        if let SessionState::Failed(message) = &self.state {
            debug!("Session failed ({}), skipping activation", message);
            return effects;
        }

        match self.storage.load().await {
            Ok(record) => self.record = record,
            Err(e) => {
                self.fail(e);
                return effects;
            }
        }

        let grant = context
            .grant()
            .filter(|grant| !self.attempted_grants.contains(*grant));
        if context.grant().is_some() && grant.is_none() {
            debug!("Authorization code already used, ignoring it");
        }

        match plan(&self.record, grant, now, &self.config) {
            ActivationPlan::ExchangeCode(grant) => {
                self.attempted_grants.insert(grant.clone());
                self.set_state(SessionState::ExchangingCode);
                if let Err(e) = self.exchange(GrantType::AuthorizationCode, grant.as_str(), now).await {
                    self.fail(e);
                    return effects;
                }
                effects.push(SessionEffect::StripGrant);
            }
            ActivationPlan::Refresh(refresh_token) => {
                debug!(
                    "Stored token expired at {:?} (now {}), refreshing",
                    self.record.expires_at, now
                );
                self.set_state(SessionState::RefreshingToken);
                if let Err(e) = self.exchange(GrantType::RefreshToken, &refresh_token, now).await {
                    self.fail(e);
                    return effects;
                }
            }
            ActivationPlan::UseStored => {
                debug!("Stored token still valid");
                self.set_state(SessionState::NoOpValid);
            }
            ActivationPlan::LoggedOut => {
                debug!("No stored credentials");
                self.set_state(SessionState::LoggedOut);
                return effects;
            }
        }

        self.set_state(SessionState::Ready);
        self.load_profile().await;
        effects
    }

    /// [`activate`](Self::activate) at the current wall-clock time
    pub async fn activate_now(&mut self, context: &ActivationContext) -> Vec<SessionEffect> {
        self.activate(context, Utc::now().timestamp()).await
    }

    /// Revoke the token with the provider, then forget it locally.
    ///
    /// If the provider call fails the local record is kept and the error is
    /// both surfaced in the view and returned.
    pub async fn logout(&mut self) -> AuthResult<Vec<SessionEffect>> {
        self.record = match self.storage.load().await {
            Ok(record) => record,
            Err(e) => {
                error!("Logout failed, could not read stored credentials: {}", e);
                self.error_message = Some(e.to_string());
                self.publish();
                return Err(e);
            }
        };

        let Some(access_token) = self.record.access_token.clone() else {
            return self.clear().await;
        };

        info!("Revoking Slack user token");
        if let Err(e) = self.tokens.revoke(&access_token).await {
            error!("Logout failed, keeping local credentials: {}", e);
            self.error_message = Some(e.to_string());
            self.publish();
            return Err(e);
        }

        info!("✅ Slack user token revoked");
        self.clear().await
    }

    /// Erase the local record without contacting the provider
    pub async fn clear(&mut self) -> AuthResult<Vec<SessionEffect>> {
        self.storage.clear().await?;

        self.record = TokenRecord::default();
        self.profile = None;
        self.profile_token = None;
        self.error_message = None;
        self.set_state(SessionState::LoggedOut);

        info!("Cleared stored Slack credentials");
        Ok(vec![SessionEffect::Reload])
    }

    async fn exchange(&mut self, grant_type: GrantType, value: &str, now: i64) -> AuthResult<()> {
        info!("Requesting Slack user token ({})", grant_type);

        let credentials = self.tokens.exchange(grant_type, value).await?;
        let record = TokenRecord::from_credentials(credentials, now);
        self.storage.save(&record).await?;
        self.record = record;

        info!(
            "✅ Stored Slack user token, expires at {:?}",
            self.record.expires_at
        );
        Ok(())
    }

    async fn load_profile(&mut self) {
        let Some(access_token) = self.record.access_token.clone() else {
            return;
        };

        if self.profile.is_some() && self.profile_token.as_deref() == Some(access_token.as_str()) {
            return;
        }

        match self.profiles.fetch_profile(&access_token).await {
            Ok(profile) => {
                self.profile = Some(profile);
                self.profile_token = Some(access_token);
                self.error_message = None;
            }
            Err(e) => {
                // Profile failures never touch the credential
                warn!("Failed to fetch Slack profile: {}", e);
                self.profile = None;
                self.profile_token = None;
                self.error_message = Some(e.to_string());
            }
        }
        self.publish();
    }

    fn fail(&mut self, err: AuthError) {
        error!("Session failed: {}", err);
        let message = err.to_string();
        self.error_message = Some(message.clone());
        self.set_state(SessionState::Failed(message));
    }

    fn set_state(&mut self, state: SessionState) {
        debug!("Session state: {} -> {}", self.state, state);
        self.state = state;
        self.publish();
    }

    fn publish(&self) {
        self.view_tx.send_replace(self.view());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn record(expires_at: Option<i64>) -> TokenRecord {
        TokenRecord {
            access_token: Some("a".to_string()),
            refresh_token: Some("r".to_string()),
            expires_at,
        }
    }

    fn grant(code: &str) -> AuthorizationGrant {
        AuthorizationGrant::new(code).unwrap()
    }

    #[test]
    fn test_plan_grant_wins_over_stored_record() {
        let config = SessionConfig::default();
        assert_eq!(
            plan(&record(Some(NOW + 60)), Some(&grant("c")), NOW, &config),
            ActivationPlan::ExchangeCode(grant("c"))
        );
    }

    #[test]
    fn test_plan_empty_record_is_logged_out() {
        let config = SessionConfig::default();
        assert_eq!(
            plan(&TokenRecord::default(), None, NOW, &config),
            ActivationPlan::LoggedOut
        );
    }

    #[test]
    fn test_plan_access_token_without_refresh_token_is_logged_out() {
        let partial = TokenRecord {
            access_token: Some("a".to_string()),
            refresh_token: None,
            expires_at: Some(NOW + 60),
        };
        assert_eq!(
            plan(&partial, None, NOW, &SessionConfig::default()),
            ActivationPlan::LoggedOut
        );
    }

    #[test]
    fn test_plan_refreshes_expired_or_missing_expiry() {
        let config = SessionConfig::default();
        assert_eq!(
            plan(&record(Some(NOW - 1)), None, NOW, &config),
            ActivationPlan::Refresh("r".to_string())
        );
        assert_eq!(
            plan(&record(None), None, NOW, &config),
            ActivationPlan::Refresh("r".to_string())
        );
    }

    #[test]
    fn test_plan_refreshes_when_access_token_missing() {
        let partial = TokenRecord {
            access_token: None,
            ..record(Some(NOW + 60))
        };
        assert_eq!(
            plan(&partial, None, NOW, &SessionConfig::default()),
            ActivationPlan::Refresh("r".to_string())
        );
    }

    #[test]
    fn test_plan_uses_stored_token_at_expiry_boundary() {
        let config = SessionConfig::default();
        assert_eq!(
            plan(&record(Some(NOW)), None, NOW, &config),
            ActivationPlan::UseStored
        );
    }

    #[test]
    fn test_plan_leeway_triggers_early_refresh() {
        let config = SessionConfig {
            refresh_leeway_secs: 300,
        };
        assert_eq!(
            plan(&record(Some(NOW + 120)), None, NOW, &config),
            ActivationPlan::Refresh("r".to_string())
        );
        assert_eq!(
            plan(&record(Some(NOW + 600)), None, NOW, &config),
            ActivationPlan::UseStored
        );
    }

    #[test]
    fn test_plan_huge_leeway_refreshes_instead_of_overflowing() {
        let config = SessionConfig {
            refresh_leeway_secs: i64::MAX,
        };
        assert_eq!(
            plan(&record(Some(NOW + 600)), None, NOW, &config),
            ActivationPlan::Refresh("r".to_string())
        );
    }

    #[test]
    fn test_activation_context_from_redirect_url() {
        let context =
            ActivationContext::from_redirect_url("https://emojipost.example/?code=abc.123&state=")
                .unwrap();
        assert_eq!(context.grant(), Some(&grant("abc.123")));

        let context = ActivationContext::from_redirect_url("https://emojipost.example/?code=")
            .unwrap();
        assert!(context.grant().is_none());

        assert!(ActivationContext::from_redirect_url("not a url").is_err());
    }

    #[test]
    fn test_view_hides_token_unless_ready() {
        let mut view = SessionView {
            state: SessionState::Failed("boom".to_string()),
            is_loading: false,
            error_message: Some("boom".to_string()),
            token: record(Some(NOW)),
            profile: None,
        };
        assert_eq!(view.access_token(), None);

        view.state = SessionState::Ready;
        assert_eq!(view.access_token(), Some("a"));

        view.token.expires_at = None;
        assert_eq!(view.access_token(), None);
    }

    #[test]
    fn test_loading_states() {
        assert!(SessionState::Idle.is_loading());
        assert!(SessionState::RefreshingToken.is_loading());
        assert!(!SessionState::Ready.is_loading());
        assert!(!SessionState::LoggedOut.is_loading());
        assert!(!SessionState::Failed("x".to_string()).is_loading());
    }
}
