//! Offline signature generation example.
//!
//! Builds the exact headers a session request would carry, without sending anything.
//! Useful for comparing against another implementation or a gateway support ticket.
//!
//! # Running this example
//!
//! ```bash
//! export MERCHANT_ID=merchant-1
//! export MERCHANT_KEY_ID=key-1
//! export MERCHANT_SECRET_KEY=$(openssl rand -base64 32)
//! export TARGET_ORIGIN=https://shop.example.com
//! export RUN_ENVIRONMENT=test
//! cargo run --example signature_generation
//! ```

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::uninlined_format_args,
    reason = "examples are allowed to use println and simple formatting"
)]

use chrono::Utc;
use flex_session::{
    SessionRequestConfig, SessionRequester,
    config::credentials_from_env,
    signing::{ReceivedRequest, SignatureVerifier},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Flex Session: Signature Generation Example\n");

    println!("1. Loading credentials and session parameters from environment...");
    let credentials = credentials_from_env()?;
    let config = SessionRequestConfig::from_env()?;
    println!("   merchant: {}", credentials.merchant_id());
    println!("   gateway:  {}", config.run_environment);
    println!("   origin:   {}\n", config.target_origin);

    println!("2. Preparing the signed request...");
    let requester = SessionRequester::new()?;
    let prepared = requester.prepare(&credentials, &config, Utc::now())?;

    println!("   POST {}", prepared.url);
    for (name, value) in &prepared.headers {
        println!("   {name}: {value}");
    }
    println!("\n   {}\n", prepared.body);

    println!("3. Verifying the signature locally...");
    let signature = prepared.signed.signature.to_string();
    let received = ReceivedRequest {
        host: &prepared.signed.host,
        date: &prepared.signed.date,
        resource_path: prepared.url.path(),
        digest: &prepared.signed.digest,
        merchant_id: &prepared.signed.merchant_id,
        signature: &signature,
        body: prepared.body.as_bytes(),
    };
    SignatureVerifier::new().verify(&received, &credentials)?;
    println!("   signature verified");

    Ok(())
}
