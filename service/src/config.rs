use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::str::FromStr;

/// Default route the Stripe webhook endpoint is mounted on.
pub const DEFAULT_WEBHOOK_PATH: &str = "/webhooks/stripe";

/// Matches the default tolerance of the Stripe SDKs.
pub const DEFAULT_TOLERANCE_SECS: u64 = 300;

/// Upper bound on a buffered webhook body.
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

fn parse_route_path(path: &str) -> Result<String, String> {
    if path.starts_with('/') {
        Ok(path.to_string())
    } else {
        Err(format!("route path must start with '/': {path}"))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// The Stripe endpoint signing secret (whsec_...) used to authenticate webhook deliveries.
    /// When unset every webhook request is answered with 500 rather than accepted unverified.
    #[arg(long, env, hide_env_values = true)]
    stripe_webhook_signing_secret: Option<String>,

    /// Maximum allowed age, in seconds, between the signature timestamp and now.
    #[arg(long, env, default_value_t = DEFAULT_TOLERANCE_SECS)]
    pub stripe_webhook_tolerance_secs: u64,

    /// Accept signatures regardless of their timestamp. Only for replaying captured test fixtures.
    #[arg(long, env)]
    pub stripe_webhook_ignore_tolerance: bool,

    /// Largest webhook body, in bytes, that will be buffered for verification.
    #[arg(long, env, default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub webhook_max_body_bytes: usize,

    /// Route path the Stripe webhook endpoint is served on.
    #[arg(long, env, default_value = DEFAULT_WEBHOOK_PATH, value_parser = parse_route_path)]
    webhook_path: String,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn set_stripe_webhook_signing_secret(mut self, secret: String) -> Self {
        self.stripe_webhook_signing_secret = Some(secret);
        self
    }

    /// Returns the configured signing secret, if any. An empty value counts as unset.
    pub fn stripe_webhook_signing_secret(&self) -> Option<&str> {
        self.stripe_webhook_signing_secret
            .as_deref()
            .filter(|secret| !secret.is_empty())
    }

    pub fn webhook_path(&self) -> &str {
        &self.webhook_path
    }

    /// Address string suitable for `TcpListener::bind`.
    pub fn listen_address(&self) -> String {
        format!(
            "{}:{}",
            self.interface.as_deref().unwrap_or("127.0.0.1"),
            self.port
        )
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env() == RustEnv::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["stripe_webhook_gate"];
        argv.extend_from_slice(args);
        Config::parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]);
        assert_eq!(config.stripe_webhook_tolerance_secs, DEFAULT_TOLERANCE_SECS);
        assert!(!config.stripe_webhook_ignore_tolerance);
        assert_eq!(config.webhook_max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert_eq!(config.webhook_path(), DEFAULT_WEBHOOK_PATH);
        assert_eq!(config.listen_address(), "127.0.0.1:4000");
        assert_eq!(config.log_level_filter, LevelFilter::Info);
    }

    #[test]
    fn test_signing_secret_from_flag() {
        let config = parse(&["--stripe-webhook-signing-secret", "whsec_test"]);
        assert_eq!(config.stripe_webhook_signing_secret(), Some("whsec_test"));
    }

    #[test]
    fn test_empty_signing_secret_counts_as_unset() {
        let config = parse(&[]).set_stripe_webhook_signing_secret(String::new());
        assert_eq!(config.stripe_webhook_signing_secret(), None);
    }

    #[test]
    fn test_tolerance_flags() {
        let config = parse(&[
            "--stripe-webhook-tolerance-secs",
            "30",
            "--stripe-webhook-ignore-tolerance",
        ]);
        assert_eq!(config.stripe_webhook_tolerance_secs, 30);
        assert!(config.stripe_webhook_ignore_tolerance);
    }

    #[test]
    fn test_webhook_path_must_be_absolute() {
        let result = Config::try_parse_from(["stripe_webhook_gate", "--webhook-path", "hooks"]);
        assert!(result.is_err());

        let config = parse(&["--webhook-path", "/hooks/stripe"]);
        assert_eq!(config.webhook_path(), "/hooks/stripe");
    }

    #[test]
    fn test_runtime_env_parsing() {
        assert_eq!("PRODUCTION".parse::<RustEnv>(), Ok(RustEnv::Production));
        assert_eq!("staging".parse::<RustEnv>(), Ok(RustEnv::Staging));
        assert_eq!("qa".parse::<RustEnv>(), Err(RustEnvParseError));
        assert!(parse(&["--runtime-env", "production"]).is_production());
    }
}
