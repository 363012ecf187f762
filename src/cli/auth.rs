use crate::config::Config;
use crate::error::Result;
use crate::sheets::{Credential, InstalledFlowCredential, clear_google_tokens};
use clap::Subcommand;
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum AuthProvider {
    /// Sign in to Google with the installed-application OAuth flow
    Google,
}

impl AuthProvider {
    pub async fn execute(&self, reset: bool) -> Result<()> {
        match self {
            AuthProvider::Google => authenticate_google(reset).await,
        }
    }
}

async fn authenticate_google(reset: bool) -> Result<()> {
    if reset {
        clear_google_tokens()?;
    }

    let config = Config::load()?;
    let credential = InstalledFlowCredential::new(&config.google).await?;

    info!(
        account = credential.account_identifier(),
        "Google authentication verified"
    );

    Ok(())
}
