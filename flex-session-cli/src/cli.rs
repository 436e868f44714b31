//! Command-line arguments and their resolution against the config file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use flex_session::{GatewayConfig, MerchantCredentials, RunEnvironment, SessionRequestConfig};

/// Creates a Flex microform session and prints the session token.
#[derive(Parser)]
#[command(name = "flex-session", version)]
#[command(about = "Creates a Flex microform session and prints the session token")]
pub struct Args {
    /// TOML file with `[http]` settings and session defaults.
    #[arg(long, short = 'c', env = "FLEX_SESSION_CONFIG")]
    pub config: Option<PathBuf>,

    /// Origin of the page that embeds the card fields.
    #[arg(long, env = "TARGET_ORIGIN")]
    pub target_origin: Option<String>,

    /// Gateway host, or the `test` / `production` preset.
    #[arg(long, env = "RUN_ENVIRONMENT")]
    pub run_environment: Option<String>,

    /// Merchant identifier.
    #[arg(long, env = "MERCHANT_ID")]
    pub merchant_id: String,

    /// Shared secret key identifier.
    #[arg(long, env = "MERCHANT_KEY_ID")]
    pub merchant_key_id: String,

    /// Base64 shared secret.
    #[arg(long, env = "MERCHANT_SECRET_KEY", hide_env_values = true)]
    pub merchant_secret_key: String,

    /// Request timeout in seconds (1-300).
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Send the request to this origin instead of the run environment.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Also print the session token's unverified claims.
    #[arg(long)]
    pub decode: bool,
}

/// Everything needed for one session request.
#[derive(Debug)]
pub struct Resolved {
    /// Transport and routing settings.
    pub gateway: GatewayConfig,
    /// Validated session parameters.
    pub session: SessionRequestConfig,
    /// Merchant credentials.
    pub credentials: MerchantCredentials,
}

impl Args {
    /// Merges arguments over the config file and validates the result.
    ///
    /// Arguments (and their environment variables) take precedence over file values.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded, a required value is missing, or a
    /// value is invalid.
    pub fn resolve(self) -> Result<Resolved> {
        let mut gateway = match &self.config {
            Some(path) => GatewayConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => GatewayConfig::default(),
        };

        if let Some(timeout) = self.timeout {
            gateway.http.timeout_secs = timeout;
        }
        if self.base_url.is_some() {
            gateway.base_url = self.base_url;
        }
        gateway.validate().context("invalid gateway settings")?;

        let target_origin = self
            .target_origin
            .or_else(|| gateway.target_origin.clone())
            .context("target origin is required (--target-origin or TARGET_ORIGIN)")?;
        let run_environment = self
            .run_environment
            .map(RunEnvironment::from)
            .or_else(|| gateway.run_environment.clone())
            .context("run environment is required (--run-environment or RUN_ENVIRONMENT)")?;

        let session = SessionRequestConfig::new(target_origin, run_environment);
        session.validate().context("invalid session parameters")?;

        let credentials = MerchantCredentials::new(
            self.merchant_id,
            self.merchant_key_id,
            self.merchant_secret_key,
        );

        Ok(Resolved { gateway, session, credentials })
    }
}
