// ABOUTME: Emojipost authentication library managing the Slack OAuth session
// ABOUTME: Exchanges, refreshes, persists, and revokes the user token without a backend

pub mod error;
pub mod oauth;

// Re-export main types
pub use error::{AuthError, AuthResult, Operation};
pub use oauth::{
    ActivationContext, FileStore, KeyValueStore, MemoryStore, ProfileEndpoint, ProviderConfig,
    SessionConfig, SessionController, SessionEffect, SessionState, SessionView, SlackClient,
    TokenEndpoint, TokenRecord, TokenStorage, UserProfile,
};
