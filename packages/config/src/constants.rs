// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used across Emojipost

// Slack OAuth application
pub const SLACK_CLIENT_ID: &str = "SLACK_CLIENT_ID";
pub const SLACK_CLIENT_SECRET: &str = "SLACK_CLIENT_SECRET";
pub const SLACK_REDIRECT_URI: &str = "SLACK_REDIRECT_URI";
pub const SLACK_USER_SCOPES: &str = "SLACK_USER_SCOPES";

// Slack endpoints
pub const SLACK_API_BASE_URL: &str = "SLACK_API_BASE_URL";
pub const SLACK_AUTHORIZE_URL: &str = "SLACK_AUTHORIZE_URL";

// Session storage
pub const EMOJIPOST_STORE_DIR: &str = "EMOJIPOST_STORE_DIR";
pub const EMOJIPOST_REFRESH_LEEWAY_SECS: &str = "EMOJIPOST_REFRESH_LEEWAY_SECS";

// Defaults
pub const DEFAULT_SLACK_API_BASE_URL: &str = "https://slack.com/api";
pub const DEFAULT_SLACK_AUTHORIZE_URL: &str = "https://slack.com/oauth/v2/authorize";
pub const DEFAULT_SLACK_USER_SCOPES: &str =
    "channels:history,channels:read,users.profile:read,users.profile:write,chat:write";
pub const DEFAULT_STORE_DIR_NAME: &str = ".emojipost";

// System Environment Variables
pub const RUST_LOG: &str = "RUST_LOG";
