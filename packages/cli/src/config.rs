// ABOUTME: Host configuration for the emojipost binary
// ABOUTME: Resolves the token store directory and refresh leeway from the environment

use std::path::PathBuf;

use emojipost_auth::{FileStore, TokenStorage};
use emojipost_config::{constants, env};
use thiserror::Error;

/// Largest accepted refresh leeway (one day)
pub const MAX_REFRESH_LEEWAY_SECS: i64 = 86_400;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Refresh leeway must not be negative: {0}")]
    NegativeLeeway(i64),
    #[error("Refresh leeway must be at most {max} seconds: {0}", max = MAX_REFRESH_LEEWAY_SECS)]
    LeewayTooLarge(i64),
    #[error("Could not determine home directory")]
    NoHomeDir,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub store_dir: PathBuf,
    pub refresh_leeway_secs: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let store_dir = match env::require_env(constants::EMOJIPOST_STORE_DIR) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => FileStore::default_location()
                .map_err(|_| ConfigError::NoHomeDir)?
                .dir()
                .to_path_buf(),
        };

        let refresh_leeway_secs =
            env::parse_env_or(constants::EMOJIPOST_REFRESH_LEEWAY_SECS, 0i64);
        if refresh_leeway_secs < 0 {
            return Err(ConfigError::NegativeLeeway(refresh_leeway_secs));
        }
        if refresh_leeway_secs > MAX_REFRESH_LEEWAY_SECS {
            return Err(ConfigError::LeewayTooLarge(refresh_leeway_secs));
        }

        Ok(Config {
            store_dir,
            refresh_leeway_secs,
        })
    }

    /// Direct access to the stored record, for commands that never talk to Slack
    pub fn token_storage(&self) -> TokenStorage<FileStore> {
        TokenStorage::new(FileStore::new(self.store_dir.clone()))
    }

    /// Command-line override of the store directory
    pub fn with_store_dir(mut self, store_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = store_dir {
            self.store_dir = dir;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emojipost_auth::TokenRecord;
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use std::env as std_env;
    use tempfile::TempDir;

    fn reset_env() {
        std_env::remove_var(constants::EMOJIPOST_STORE_DIR);
        std_env::remove_var(constants::EMOJIPOST_REFRESH_LEEWAY_SECS);
    }

    #[test]
    #[serial]
    fn test_store_dir_from_env() {
        reset_env();
        std_env::set_var(constants::EMOJIPOST_STORE_DIR, "/tmp/emojipost-test");

        let config = Config::from_env().unwrap();
        assert_eq!(config.store_dir, PathBuf::from("/tmp/emojipost-test"));
        assert_eq!(config.refresh_leeway_secs, 0);
        reset_env();
    }

    #[test]
    #[serial]
    fn test_default_store_dir_is_under_home() {
        reset_env();
        if let Some(home) = dirs::home_dir() {
            let config = Config::from_env().unwrap();
            assert_eq!(config.store_dir, home.join(".emojipost"));
        }
    }

    #[test]
    #[serial]
    fn test_unparsable_leeway_falls_back_to_zero() {
        reset_env();
        std_env::set_var(constants::EMOJIPOST_STORE_DIR, "/tmp/emojipost-test");
        std_env::set_var(constants::EMOJIPOST_REFRESH_LEEWAY_SECS, "soon");

        assert_eq!(Config::from_env().unwrap().refresh_leeway_secs, 0);
        reset_env();
    }

    #[test]
    #[serial]
    fn test_out_of_range_leeway_is_rejected() {
        reset_env();
        std_env::set_var(constants::EMOJIPOST_STORE_DIR, "/tmp/emojipost-test");

        std_env::set_var(constants::EMOJIPOST_REFRESH_LEEWAY_SECS, "-5");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::NegativeLeeway(-5))
        ));

        std_env::set_var(
            constants::EMOJIPOST_REFRESH_LEEWAY_SECS,
            i64::MAX.to_string(),
        );
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::LeewayTooLarge(i64::MAX))
        ));

        std_env::set_var(constants::EMOJIPOST_REFRESH_LEEWAY_SECS, "86400");
        assert_eq!(Config::from_env().unwrap().refresh_leeway_secs, 86_400);
        reset_env();
    }

    #[tokio::test]
    #[serial]
    async fn test_token_storage_clears_without_slack_settings() {
        reset_env();
        for key in [
            constants::SLACK_CLIENT_ID,
            constants::SLACK_CLIENT_SECRET,
            constants::SLACK_REDIRECT_URI,
        ] {
            std_env::remove_var(key);
        }
        let dir = TempDir::new().unwrap();
        std_env::set_var(constants::EMOJIPOST_STORE_DIR, dir.path());
        let config = Config::from_env().unwrap();

        let storage = config.token_storage();
        storage
            .save(&TokenRecord {
                access_token: Some("a".to_string()),
                refresh_token: Some("r".to_string()),
                expires_at: Some(1_700_000_000),
            })
            .await
            .unwrap();

        config.token_storage().clear().await.unwrap();
        assert!(storage.load().await.unwrap().is_empty());
        reset_env();
    }

    #[test]
    #[serial]
    fn test_store_dir_override() {
        reset_env();
        std_env::set_var(constants::EMOJIPOST_STORE_DIR, "/tmp/emojipost-test");
        std_env::set_var(constants::EMOJIPOST_REFRESH_LEEWAY_SECS, "120");

        let config = Config::from_env()
            .unwrap()
            .with_store_dir(Some(PathBuf::from("/tmp/other")));
        assert_eq!(config.store_dir, PathBuf::from("/tmp/other"));
        assert_eq!(config.refresh_leeway_secs, 120);
        reset_env();
    }
}
