// ABOUTME: CLI commands driving the Slack session lifecycle
// ABOUTME: Consent URL, activation with an authorization code, status, logout, and clear

use chrono::{DateTime, Utc};
use clap::Subcommand;
use colored::*;
use emojipost_auth::oauth::session::ActivationContext;
use emojipost_auth::{
    AuthError, FileStore, ProviderConfig, SessionConfig, SessionController, SessionEffect,
    SessionState, SessionView, SlackClient,
};
use emojipost_cli::config::Config;

type CliSession = SessionController<FileStore, SlackClient, SlackClient>;

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Print the Slack consent URL
    LoginUrl {
        /// Open the URL in the default browser
        #[arg(long)]
        open: bool,
    },

    /// Run one activation, exchanging an authorization code if given
    Activate {
        /// Authorization code from the consent redirect
        #[arg(long, conflicts_with = "redirect_url")]
        code: Option<String>,

        /// Full redirect URL; its `code` parameter is used
        #[arg(long)]
        redirect_url: Option<String>,
    },

    /// Show the current session, refreshing the token if it expired
    Status,

    /// Revoke the token with Slack and forget it
    Logout,

    /// Forget the stored token without contacting Slack
    Clear,
}

impl AuthCommands {
    pub async fn execute(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            AuthCommands::LoginUrl { open } => login_url_command(*open),
            AuthCommands::Activate { code, redirect_url } => {
                let context = match (code, redirect_url) {
                    (Some(code), _) => ActivationContext::with_code(code.as_str()),
                    (None, Some(url)) => ActivationContext::from_redirect_url(url)?,
                    (None, None) => ActivationContext::none(),
                };
                activate_command(config, &context).await
            }
            AuthCommands::Status => activate_command(config, &ActivationContext::none()).await,
            AuthCommands::Logout => logout_command(config).await,
            AuthCommands::Clear => clear_command(config).await,
        }
    }
}

fn build_session(config: &Config) -> Result<CliSession, AuthError> {
    let client = SlackClient::new(ProviderConfig::from_env()?);
    let session_config = SessionConfig {
        refresh_leeway_secs: config.refresh_leeway_secs,
    };

    Ok(SessionController::with_config(
        FileStore::new(config.store_dir.clone()),
        client.clone(),
        client,
        session_config,
    ))
}

fn login_url_command(open: bool) -> Result<(), Box<dyn std::error::Error>> {
    let url = ProviderConfig::from_env()?.authorize_url()?;

    println!("{}", "🔑 Sign in with Slack".bold().cyan());
    println!();
    println!("  {}", url.as_str().underline());
    println!();

    if open {
        if let Err(e) = open::that(url.as_str()) {
            eprintln!(
                "{} Failed to open browser: {}. Please visit the URL manually.",
                "⚠".yellow().bold(),
                e
            );
        }
    }

    println!(
        "After approving, run {}",
        "emojipost auth activate --redirect-url '<url>'".yellow()
    );
    Ok(())
}

async fn activate_command(
    config: &Config,
    context: &ActivationContext,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = build_session(config)?;

    let effects = session.activate_now(context).await;
    apply_effects(&effects);

    let view = session.view();
    render_view(&view);

    if let SessionState::Failed(message) = &view.state {
        return Err(message.clone().into());
    }
    Ok(())
}

async fn logout_command(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = build_session(config)?;

    println!("{}", "🔓 Logging out from Slack...".bold().cyan());

    match session.logout().await {
        Ok(effects) => {
            apply_effects(&effects);
            println!("{} Successfully logged out", "✓".green().bold());
            Ok(())
        }
        Err(e) => {
            eprintln!(
                "{} Logout failed, local credentials kept: {}",
                "✗".red().bold(),
                e
            );
            eprintln!(
                "Use {} to discard them anyway",
                "emojipost auth clear".yellow()
            );
            Err(e.into())
        }
    }
}

/// Clearing is local only, so it works without Slack app credentials
async fn clear_command(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    config.token_storage().clear().await?;
    println!("{} Stored Slack credentials removed", "✓".green().bold());
    Ok(())
}

fn apply_effects(effects: &[SessionEffect]) {
    for effect in effects {
        match effect {
            SessionEffect::StripGrant => {
                println!(
                    "{} Authorization code consumed; it cannot be used again",
                    "ℹ".cyan()
                );
            }
            SessionEffect::Reload => {
                println!("{} Session reset", "ℹ".cyan());
            }
        }
    }
}

fn render_view(view: &SessionView) {
    println!("{}", "🔐 Slack Session".bold().cyan());
    println!();

    let status_icon = if view.is_authenticated() {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {}", status_icon, view.state.to_string().bold());

    if let Some(profile) = &view.profile {
        if let Some(name) = profile.name() {
            println!("        User: {}", name.cyan());
        }
        if let Some(email) = &profile.email {
            println!("        Email: {}", email.cyan());
        }
    }

    if let Some(expires_at) = view.token.expires_at {
        let expires = format_timestamp(expires_at);
        if expires_at < Utc::now().timestamp() {
            println!("        Expires: {} {}", expires.red(), "(expired)".red());
        } else {
            println!("        Expires: {}", expires.green());
        }
    }

    if let Some(message) = &view.error_message {
        println!("        Error: {}", message.red());
    }

    if matches!(view.state, SessionState::LoggedOut) {
        println!();
        println!("Use {} to sign in", "emojipost auth login-url".yellow());
    }
}

fn format_timestamp(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}
