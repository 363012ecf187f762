use crate::config::{Config, GoogleConfig};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use google_sheets4::api::Scope;
use hyper_util::client::legacy::connect::HttpConnector;
use std::fs;
use std::path::PathBuf;
use tracing::debug;
use tracing::instrument;
use yup_oauth2::{
    ApplicationSecret, InstalledFlowAuthenticator, InstalledFlowReturnMethod,
    authenticator::Authenticator, hyper_rustls::HttpsConnector,
};

// Read and write access to all of the user's spreadsheets
pub(crate) const AUTH_SCOPE: Scope = Scope::Spreadsheet;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_CERT_URL: &str = "https://www.googleapis.com/oauth2/v1/certs";
const GOOGLE_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

type AuthType = Authenticator<HttpsConnector<HttpConnector>>;

/// Proof of a signed-in account that can authorize Sheets API calls.
///
/// Implementations own the token lifecycle. Callers ask for a token before
/// every request and never hold on to it.
#[async_trait]
pub trait Credential: Send + Sync {
    fn account_identifier(&self) -> &str;

    async fn bearer_token(&self) -> Result<String>;
}

/// A bearer token obtained elsewhere.
#[derive(Clone)]
pub struct StaticCredential {
    account: String,
    token: String,
}

impl StaticCredential {
    pub fn new(account: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for StaticCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredential")
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Credential for StaticCredential {
    fn account_identifier(&self) -> &str {
        &self.account
    }

    async fn bearer_token(&self) -> Result<String> {
        if self.token.is_empty() {
            return Err(AppError::Auth(format!(
                "No access token for account '{}'",
                self.account
            )));
        }
        Ok(self.token.clone())
    }
}

/// Tokens from the installed-application OAuth flow, cached and refreshed by yup-oauth2.
pub struct InstalledFlowCredential {
    account: String,
    auth: AuthType,
}

impl InstalledFlowCredential {
    /// Create the authenticator and verify it by fetching a token
    #[instrument(name = "Authenticating to Google", skip_all)]
    pub async fn new(config: &GoogleConfig) -> Result<Self> {
        let auth =
            from_installed_flow(config.client_id.clone(), config.client_secret.clone()).await?;

        // Trigger authentication by requesting a token
        let credential = Self {
            account: config.account_identifier(),
            auth,
        };
        credential.bearer_token().await?;
        debug!(account = %credential.account, "Google credential ready");

        Ok(credential)
    }
}

#[async_trait]
impl Credential for InstalledFlowCredential {
    fn account_identifier(&self) -> &str {
        &self.account
    }

    async fn bearer_token(&self) -> Result<String> {
        let token = self
            .auth
            .token(&[AUTH_SCOPE])
            .await
            .map_err(|e| AppError::Auth(format!("Failed to get token: {}", e)))?;

        token
            .token()
            .map(str::to_string)
            .ok_or_else(|| AppError::Auth("Token response had no access token".to_string()))
    }
}

async fn from_installed_flow(client_id: String, client_secret: String) -> Result<AuthType> {
    // Build the OAuth application secret from config values
    let secret = ApplicationSecret {
        client_id,
        client_secret,
        auth_uri: GOOGLE_AUTH_URL.to_string(),
        token_uri: GOOGLE_TOKEN_URL.to_string(),
        auth_provider_x509_cert_url: Some(GOOGLE_CERT_URL.to_string()),
        redirect_uris: vec![GOOGLE_REDIRECT_URI.to_string()],
        project_id: None,
        client_email: None,
        client_x509_cert_url: None,
    };

    let token_cache_path = token_cache_path()?;

    if let Some(parent) = token_cache_path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::Auth(format!("Failed to create token cache directory: {}", e))
        })?;
    }

    // User copies the authorization code from the browser
    let auth = InstalledFlowAuthenticator::builder(secret, InstalledFlowReturnMethod::Interactive)
        .persist_tokens_to_disk(token_cache_path)
        .build()
        .await
        .map_err(|e| AppError::Auth(format!("Failed to build authenticator: {}", e)))?;

    Ok(auth)
}

/// Clear cached Google tokens by deleting the token cache file
#[instrument(name = "Clearing auth tokens for Google", skip_all)]
pub fn clear_tokens() -> Result<()> {
    let token_path = token_cache_path()?;

    if !token_path.exists() {
        debug!("No Google tokens to clear");
        return Ok(());
    }

    fs::remove_file(&token_path)
        .map_err(|e| AppError::Auth(format!("Failed to delete tokens file: {}", e)))?;
    debug!("Cleared Google cached tokens");

    Ok(())
}

pub fn token_cache_path() -> Result<PathBuf> {
    Config::cache_file("google_tokens.json")
}
