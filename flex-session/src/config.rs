//! Session request configuration.
//!
//! Values come from three places, in increasing precedence: a TOML file
//! ([`GatewayConfig`]), environment variables, and explicit arguments. The core request path
//! never validates configuration on its own; callers that load configuration call
//! [`SessionRequestConfig::validate`] (the loaders here already do).
//!
//! # Examples
//!
//! ```
//! use flex_session::config::{RunEnvironment, SessionRequestConfig};
//!
//! let config = SessionRequestConfig::new("https://shop.example.com", RunEnvironment::Test);
//! assert_eq!(config.run_environment, "apitest.cybersource.com");
//! assert!(config.validate().is_ok());
//! ```

use std::{fmt, path::Path};

use serde::Deserialize;
use url::Url;

use crate::{
    error::{Result, SessionError},
    signing::MerchantCredentials,
    transport::HttpConfig,
};

/// Origin that hosts the card-entry page.
pub const ENV_TARGET_ORIGIN: &str = "TARGET_ORIGIN";
/// Gateway hostname.
pub const ENV_RUN_ENVIRONMENT: &str = "RUN_ENVIRONMENT";
/// Merchant identifier.
pub const ENV_MERCHANT_ID: &str = "MERCHANT_ID";
/// Shared secret key identifier.
pub const ENV_MERCHANT_KEY_ID: &str = "MERCHANT_KEY_ID";
/// Base64 shared secret.
pub const ENV_MERCHANT_SECRET_KEY: &str = "MERCHANT_SECRET_KEY";

/// Hostname of the gateway test environment.
pub const TEST_HOST: &str = "apitest.cybersource.com";
/// Hostname of the gateway production environment.
pub const PRODUCTION_HOST: &str = "api.cybersource.com";

/// Gateway environment a session is created in.
///
/// Deserializes from `"test"`, `"production"` or any other hostname.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum RunEnvironment {
    /// `apitest.cybersource.com`.
    Test,
    /// `api.cybersource.com`.
    Production,
    /// Any other gateway host.
    Custom(String),
}

impl RunEnvironment {
    /// Hostname used both as the request host and the signed `host` header.
    #[must_use]
    pub fn host(&self) -> &str {
        match self {
            Self::Test => TEST_HOST,
            Self::Production => PRODUCTION_HOST,
            Self::Custom(host) => host,
        }
    }
}

impl From<String> for RunEnvironment {
    fn from(value: String) -> Self {
        match value.trim() {
            "test" | TEST_HOST => Self::Test,
            "production" | PRODUCTION_HOST => Self::Production,
            other => Self::Custom(other.to_owned()),
        }
    }
}

impl From<&str> for RunEnvironment {
    fn from(value: &str) -> Self {
        Self::from(value.to_owned())
    }
}

impl From<RunEnvironment> for String {
    fn from(env: RunEnvironment) -> Self {
        match env {
            RunEnvironment::Custom(host) => host,
            preset => preset.host().to_owned(),
        }
    }
}

impl fmt::Display for RunEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.host())
    }
}

/// Per-call session parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRequestConfig {
    /// Origin of the page that will embed the card fields, e.g. `https://shop.example.com`.
    pub target_origin: String,
    /// Gateway hostname without scheme, e.g. `apitest.cybersource.com`.
    pub run_environment: String,
}

impl SessionRequestConfig {
    /// Creates a configuration. Nothing is validated here.
    #[must_use]
    pub fn new(target_origin: impl Into<String>, run_environment: impl Into<String>) -> Self {
        Self { target_origin: target_origin.into(), run_environment: run_environment.into() }
    }

    /// Checks that the values can form a valid session request.
    ///
    /// - `run_environment` must be a bare hostname (optionally with port), no scheme or path
    /// - `target_origin` must be a bare `http` or `https` origin, no path or trailing slash
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidConfig`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        validate_host(&self.run_environment)?;
        validate_origin(&self.target_origin)
    }

    /// Loads and validates the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidConfig`] if a variable is missing or invalid.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads and validates the configuration through `lookup`.
    ///
    /// `RUN_ENVIRONMENT` accepts the `test` and `production` presets as well as hostnames.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidConfig`] if a variable is missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let target_origin = required(&lookup, ENV_TARGET_ORIGIN)?;
        let run_environment = RunEnvironment::from(required(&lookup, ENV_RUN_ENVIRONMENT)?);
        let config = Self::new(target_origin, run_environment);
        config.validate()?;
        Ok(config)
    }
}

/// Loads merchant credentials from process environment variables.
///
/// # Errors
///
/// Returns [`SessionError::InvalidConfig`] if a variable is missing or blank.
pub fn credentials_from_env() -> Result<MerchantCredentials> {
    credentials_from_lookup(|name| std::env::var(name).ok())
}

/// Loads merchant credentials through `lookup`.
///
/// The secret is not decoded here; a malformed secret surfaces as
/// [`SessionError::InvalidKeyEncoding`] when the request is signed.
///
/// # Errors
///
/// Returns [`SessionError::InvalidConfig`] if a variable is missing or blank.
pub fn credentials_from_lookup<F>(lookup: F) -> Result<MerchantCredentials>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(MerchantCredentials::new(
        required(&lookup, ENV_MERCHANT_ID)?,
        required(&lookup, ENV_MERCHANT_KEY_ID)?,
        required(&lookup, ENV_MERCHANT_SECRET_KEY)?,
    ))
}

fn required<F>(lookup: &F, name: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(SessionError::InvalidConfig(format!("environment variable {name} is not set"))),
    }
}

fn validate_host(host: &str) -> Result<()> {
    if host.is_empty() {
        return Err(SessionError::InvalidConfig("run environment host is empty".to_owned()));
    }
    if host.contains("://") || host.contains(['/', '?', '#']) || host.contains(char::is_whitespace)
    {
        return Err(SessionError::InvalidConfig(format!(
            "run environment must be a bare hostname, got: {host}"
        )));
    }

    let url = Url::parse(&format!("https://{host}")).map_err(|e| {
        SessionError::InvalidConfig(format!("invalid run environment host '{host}': {e}"))
    })?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(SessionError::InvalidConfig(format!("invalid run environment host '{host}'")));
    }
    Ok(())
}

fn validate_origin(origin: &str) -> Result<()> {
    let url = Url::parse(origin).map_err(|e| {
        SessionError::InvalidConfig(format!("invalid target origin '{origin}': {e}"))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(SessionError::InvalidConfig(format!(
            "target origin must use http or https, got: {}",
            url.scheme()
        )));
    }
    if url.origin().ascii_serialization() != origin {
        return Err(SessionError::InvalidConfig(format!(
            "target origin must be a bare origin such as https://shop.example.com, got: {origin}"
        )));
    }
    Ok(())
}

/// Gateway configuration file.
///
/// # Examples
///
/// ```
/// use flex_session::config::{GatewayConfig, RunEnvironment};
///
/// let config = GatewayConfig::from_toml(
///     r#"
///     target_origin = "https://shop.example.com"
///     run_environment = "production"
///
///     [http]
///     timeout_secs = 20
///     "#,
/// )
/// .unwrap();
///
/// assert_eq!(config.run_environment, Some(RunEnvironment::Production));
/// assert_eq!(config.http.timeout_secs, 20);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Default target origin.
    #[serde(default)]
    pub target_origin: Option<String>,

    /// Default gateway environment.
    #[serde(default)]
    pub run_environment: Option<RunEnvironment>,

    /// Override for the origin requests are sent to, e.g. a local proxy.
    ///
    /// The signed `host` header still names the run environment.
    #[serde(default)]
    pub base_url: Option<String>,

    /// HTTP transport settings.
    #[serde(default)]
    pub http: HttpConfig,
}

impl GatewayConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidConfig`] if the document does not parse or fails
    /// validation.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| SessionError::InvalidConfig(format!("invalid config file: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidConfig`] if the file cannot be read, parsed or
    /// validated.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SessionError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Validates the transport settings, the base URL and any present session defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidConfig`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        self.http.validate()?;

        if let Some(base_url) = &self.base_url {
            parse_base_url(base_url)?;
        }
        if let Some(env) = &self.run_environment {
            validate_host(env.host())?;
        }
        if let Some(origin) = &self.target_origin {
            validate_origin(origin)?;
        }
        Ok(())
    }
}

/// Parses a gateway base URL override.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url> {
    let url = Url::parse(base_url).map_err(|e| {
        SessionError::InvalidConfig(format!("invalid base_url '{base_url}': {e}"))
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(SessionError::InvalidConfig(format!(
            "base_url must be an absolute http(s) URL, got: {base_url}"
        )));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_run_environment_presets() {
        assert_eq!(RunEnvironment::Test.host(), "apitest.cybersource.com");
        assert_eq!(RunEnvironment::Production.host(), "api.cybersource.com");
        assert_eq!(RunEnvironment::from("test"), RunEnvironment::Test);
        assert_eq!(RunEnvironment::from("api.cybersource.com"), RunEnvironment::Production);
        assert_eq!(
            RunEnvironment::from("gateway.internal:8443"),
            RunEnvironment::Custom("gateway.internal:8443".to_owned())
        );
        assert_eq!(String::from(RunEnvironment::Test), "apitest.cybersource.com");
        assert_eq!(RunEnvironment::Production.to_string(), "api.cybersource.com");
    }

    #[test]
    fn test_validate_accepts_typical_values() {
        let config = SessionRequestConfig::new("https://shop.example.com", RunEnvironment::Test);
        assert!(config.validate().is_ok());

        let local = SessionRequestConfig::new("http://localhost:3000", "gateway.local:8443");
        assert!(local.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_host() {
        for host in ["", "https://apitest.cybersource.com", "apitest.cybersource.com/x", "a b"] {
            let config = SessionRequestConfig::new("https://shop.example.com", host);
            assert!(
                matches!(config.validate(), Err(SessionError::InvalidConfig(_))),
                "host {host:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_rejects_bad_origin() {
        for origin in [
            "shop.example.com",
            "ftp://shop.example.com",
            "https://shop.example.com/",
            "https://shop.example.com/checkout",
            "",
        ] {
            let config = SessionRequestConfig::new(origin, RunEnvironment::Test);
            assert!(
                matches!(config.validate(), Err(SessionError::InvalidConfig(_))),
                "origin {origin:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_from_lookup() {
        let lookup = lookup_from(&[
            ("TARGET_ORIGIN", "https://shop.example.com"),
            ("RUN_ENVIRONMENT", "test"),
        ]);
        let config = SessionRequestConfig::from_lookup(lookup).unwrap();
        assert_eq!(config.target_origin, "https://shop.example.com");
        assert_eq!(config.run_environment, "apitest.cybersource.com");
    }

    #[test]
    fn test_from_lookup_missing_variable() {
        let lookup = lookup_from(&[("TARGET_ORIGIN", "https://shop.example.com")]);
        let err = SessionRequestConfig::from_lookup(lookup).unwrap_err();
        assert!(err.to_string().contains("RUN_ENVIRONMENT"));
    }

    #[test]
    fn test_from_lookup_blank_variable_is_missing() {
        let lookup = lookup_from(&[("TARGET_ORIGIN", "  "), ("RUN_ENVIRONMENT", "test")]);
        let err = SessionRequestConfig::from_lookup(lookup).unwrap_err();
        assert!(err.to_string().contains("TARGET_ORIGIN"));
    }

    #[test]
    fn test_credentials_from_lookup() {
        let lookup = lookup_from(&[
            ("MERCHANT_ID", "m1"),
            ("MERCHANT_KEY_ID", "key-1"),
            ("MERCHANT_SECRET_KEY", "dGVzdC1rZXk="),
        ]);
        let credentials = credentials_from_lookup(lookup).unwrap();
        assert_eq!(credentials.merchant_id(), "m1");
        assert_eq!(credentials.merchant_key_id(), "key-1");
        assert_eq!(credentials.decode_secret().unwrap().as_slice(), b"test-key");
    }

    #[test]
    fn test_credentials_from_lookup_missing_secret() {
        let lookup = lookup_from(&[("MERCHANT_ID", "m1"), ("MERCHANT_KEY_ID", "key-1")]);
        let err = credentials_from_lookup(lookup).unwrap_err();
        assert!(matches!(err, SessionError::InvalidConfig(_)));
        assert!(err.to_string().contains("MERCHANT_SECRET_KEY"));
    }

    #[test]
    fn test_gateway_config_from_toml() {
        let config = GatewayConfig::from_toml(
            r#"
            target_origin = "https://shop.example.com"
            run_environment = "gateway.internal"
            base_url = "http://127.0.0.1:8080"

            [http]
            timeout_secs = 5
            http_version = "http1"
            "#,
        )
        .unwrap();

        assert_eq!(config.target_origin.as_deref(), Some("https://shop.example.com"));
        assert_eq!(
            config.run_environment,
            Some(RunEnvironment::Custom("gateway.internal".to_owned()))
        );
        assert_eq!(config.base_url.as_deref(), Some("http://127.0.0.1:8080"));
        assert_eq!(config.http.timeout_secs, 5);
    }

    #[test]
    fn test_gateway_config_empty_is_default() {
        let config = GatewayConfig::from_toml("").unwrap();
        assert_eq!(config, GatewayConfig::default());
    }

    #[test]
    fn test_gateway_config_rejects_invalid_values() {
        assert!(GatewayConfig::from_toml("base_url = \"not a url\"").is_err());
        assert!(GatewayConfig::from_toml("target_origin = \"https://a.example/path\"").is_err());
        assert!(GatewayConfig::from_toml("[http]\ntimeout_secs = 0").is_err());
        assert!(GatewayConfig::from_toml("unknown = 1").is_err());
    }

    #[test]
    fn test_gateway_config_from_missing_file() {
        let err = GatewayConfig::from_file("/nonexistent/flex-session.toml").unwrap_err();
        assert!(matches!(err, SessionError::InvalidConfig(_)));
    }

    #[test]
    fn test_parse_base_url() {
        assert!(parse_base_url("http://127.0.0.1:9000").is_ok());
        assert!(parse_base_url("https://proxy.example.com/gateway/").is_ok());
        assert!(parse_base_url("mailto:ops@example.com").is_err());
        assert!(parse_base_url("/relative").is_err());
    }
}
