// ABOUTME: OAuth module for the Slack user-token session
// ABOUTME: Includes token types, provider config, HTTP client, storage, and the lifecycle controller

pub mod client;
pub mod provider;
pub mod session;
pub mod storage;
pub mod types;

pub use client::{ProfileEndpoint, SlackClient, TokenEndpoint};
pub use provider::ProviderConfig;
pub use session::{
    plan, ActivationContext, ActivationPlan, SessionConfig, SessionController, SessionEffect,
    SessionState, SessionView,
};
pub use storage::{FileStore, KeyValueStore, MemoryStore, TokenStorage, TOKEN_RECORD_KEY};
pub use types::{
    AuthorizationGrant, GrantType, IssuedCredentials, TokenRecord, TokenResponse, UserProfile,
};
