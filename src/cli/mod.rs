mod append;
mod auth;
mod create;
mod read;
mod show;
mod update;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::SpreadsheetId;
use crate::sheets::{Credential, InstalledFlowCredential, SheetsClient, StaticCredential};
use crate::usecase::{UseCaseError, UseCaseHandle, UseCaseState};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{debug, warn};

pub use append::AppendArgs;
pub use auth::AuthProvider;
pub use create::CreateArgs;
pub use read::ReadArgs;
pub use show::ShowResource;
pub use update::UpdateArgs;

#[derive(Parser, Debug)]
#[command(name = "sheets-append")]
#[command(about = "Create, append to, and update Google Sheets spreadsheets", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Use this OAuth access token instead of the interactive sign-in flow
    #[arg(long, global = true)]
    pub access_token: Option<String>,

    /// Account identifier reported with the access token
    #[arg(long, global = true)]
    pub account: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Create(args) => args.execute(&self.connect().await?).await,
            Commands::Append(args) => args.execute(&self.connect().await?).await,
            Commands::Update(args) => args.execute(&self.connect().await?).await,
            Commands::Read(args) => args.execute(&self.connect().await?).await,
            Commands::Auth { provider, reset } => provider.execute(*reset).await,
            Commands::Show { resource } => resource.execute().await,
        }
    }

    /// Resolve a credential and build the Sheets client
    async fn connect(&self) -> Result<Session> {
        let (config, credential) = match &self.access_token {
            Some(token) => {
                let config = Config::load_or_default()?;
                let account = self
                    .account
                    .clone()
                    .unwrap_or_else(|| config.google.account_identifier());
                let credential: Arc<dyn Credential> =
                    Arc::new(StaticCredential::new(account, token));
                (config, credential)
            }
            None => {
                let config = Config::load()?;
                let credential: Arc<dyn Credential> =
                    Arc::new(InstalledFlowCredential::new(&config.google).await?);
                (config, credential)
            }
        };

        let client = SheetsClient::new(&config.sheets, credential)?;
        debug!(account = client.account_identifier(), "Connected to Google Sheets");

        Ok(Session {
            config,
            client: Arc::new(client),
        })
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new spreadsheet
    Create(CreateArgs),
    /// Append rows after the last populated row of a sheet
    Append(AppendArgs),
    /// Write rows to one or more ranges in a single request
    Update(UpdateArgs),
    /// Print a range as CSV
    Read(ReadArgs),
    Auth {
        #[command(subcommand)]
        provider: AuthProvider,
        /// Discard cached tokens and sign in again
        #[arg(long, global = true)]
        reset: bool,
    },
    Show {
        #[command(subcommand)]
        resource: ShowResource,
    },
}

pub struct Session {
    config: Config,
    client: Arc<SheetsClient>,
}

impl Session {
    /// The spreadsheet from the command line, falling back to config
    fn spreadsheet_id(&self, arg: Option<&str>) -> Result<SpreadsheetId> {
        arg.map(str::to_string)
            .or_else(|| self.config.sheets.spreadsheet_id.clone())
            .map(SpreadsheetId::new)
            .ok_or_else(|| {
                AppError::Config(
                    "No spreadsheet given: pass --spreadsheet-id or set sheets.spreadsheet_id"
                        .to_string(),
                )
            })
    }
}

/// Wait for a use case, cancelling it on Ctrl-C
async fn run_until_interrupted<T>(handle: UseCaseHandle<T>) -> Result<T> {
    let use_case = handle.use_case();
    let mut state = handle.subscribe();

    tokio::select! {
        _ = state.wait_for(UseCaseState::is_terminal) => {}
        Ok(()) = tokio::signal::ctrl_c() => {
            warn!(use_case, "Interrupted, cancelling");
            handle.cancel();
        }
    }

    debug!(use_case, state = ?handle.state(), "Waiting for use case result");
    handle.join().await.map_err(into_app_error)
}

fn into_app_error(err: UseCaseError) -> AppError {
    if err.is_auth_failure() {
        warn!(
            use_case = err.use_case(),
            "Google rejected the credential, sign in again with `sheets-append auth google --reset`"
        );
    }

    match err {
        UseCaseError::Cancelled { .. } => AppError::Cancelled,
        err => AppError::Other(err.into()),
    }
}
