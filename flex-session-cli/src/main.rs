//! `flex-session` - creates a Flex microform session from the command line.
//!
//! Reads merchant credentials and session parameters from flags, environment variables
//! (`TARGET_ORIGIN`, `RUN_ENVIRONMENT`, `MERCHANT_ID`, `MERCHANT_KEY_ID`,
//! `MERCHANT_SECRET_KEY`) or a TOML file, sends one signed request and prints the session
//! token on stdout. Logs go to stderr.
//!
//! ```bash
//! MERCHANT_SECRET_KEY=... flex-session --target-origin https://shop.example.com \
//!     --run-environment test --merchant-id m1 --merchant-key-id key-1 --decode
//! ```

#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest and tracing-subscriber"
)]

mod cli;
mod observability;

use anyhow::{Context, Result};
use clap::Parser;
use flex_session::SessionRequester;
use tracing::info;

use crate::{
    cli::Args,
    observability::{LogFormat, init_observability},
};

#[tokio::main]
async fn main() -> Result<()> {
    init_observability(LogFormat::from_env());

    let args = Args::parse();
    let decode = args.decode;
    let resolved = args.resolve()?;

    info!(
        run_environment = %resolved.session.run_environment,
        target_origin = %resolved.session.target_origin,
        merchant_id = resolved.credentials.merchant_id(),
        "requesting session"
    );

    let requester =
        SessionRequester::with_config(&resolved.gateway).context("building HTTP client")?;
    let token = requester
        .request_session(&resolved.credentials, &resolved.session)
        .await
        .context("session request failed")?;

    println!("{token}");

    if decode {
        let claims = token.decode_unverified_claims().context("decoding session token")?;
        println!("{}", serde_json::to_string_pretty(&claims)?);
    }

    Ok(())
}
