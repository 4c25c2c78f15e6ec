use std::fmt;
use std::num::ParseIntError;
use std::time::Duration;

use clap::Parser;
use lettre::address::{Address, AddressError};

/// Variables that must be present (and non-empty) before anything touches the network.
pub const REQUIRED_VARS: [&str; 4] = ["WORKDAY_URL", "TO_EMAIL", "FROM_EMAIL", "GMAIL_APP_PASSWORD"];

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 465;

/// Raw view of the environment. Everything stays an optional string here so
/// that every missing value can be reported at once, and so that an empty
/// override falls back to its default instead of failing to parse.
#[derive(Parser)]
pub struct EnvConfig {

    #[arg(
        long,
        env = "WORKDAY_URL",
        help = "URL to health-check"
    )]
    pub workday_url: Option<String>,

    #[arg(
        long,
        env = "TO_EMAIL",
        help = "Address that receives the alert"
    )]
    pub to_email: Option<String>,

    #[arg(
        long,
        env = "FROM_EMAIL",
        help = "Address the alert is sent from, also the SMTP login"
    )]
    pub from_email: Option<String>,

    #[arg(
        long,
        env = "GMAIL_APP_PASSWORD",
        hide_env_values = true,
        help = "App password for the sender account"
    )]
    pub gmail_app_password: Option<String>,

    #[arg(
        long,
        env = "WORKDAY_TIMEOUT_SECS",
        help = "Seconds to wait for the health-check response [default: 10]"
    )]
    pub timeout_secs: Option<String>,

    #[arg(
        long,
        env = "SMTP_HOST",
        help = "Mail relay, reached over implicit TLS [default: smtp.gmail.com]"
    )]
    pub smtp_host: Option<String>,

    #[arg(
        long,
        env = "SMTP_PORT",
        help = "Mail relay port [default: 465]"
    )]
    pub smtp_port: Option<String>,
}

impl EnvConfig {
    /// Reads the process environment. The command line is ignored on purpose:
    /// only the binary name is handed to clap.
    pub fn from_process_env() -> Result<Self, ConfigError> {
        Self::try_parse_from([env!("CARGO_PKG_NAME")])
            .map_err(|e| ConfigError::Env(e.kind()))
    }
}

/// Validated settings for one run. Built once at startup and never mutated.
#[derive(Clone)]
pub struct Config {
    pub workday_url: String,
    pub to_email: Address,
    pub from_email: Address,
    pub app_password: String,
    pub timeout: Duration,
    pub smtp_host: String,
    pub smtp_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        EnvConfig::from_process_env()?.try_into()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("workday_url", &self.workday_url)
            .field("to_email", &self.to_email)
            .field("from_email", &self.from_email)
            .field("app_password", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .finish()
    }
}

impl TryFrom<EnvConfig> for Config {
    type Error = ConfigError;

    fn try_from(raw: EnvConfig) -> Result<Self, Self::Error> {
        let values = [
            present(raw.workday_url),
            present(raw.to_email),
            present(raw.from_email),
            present(raw.gmail_app_password),
        ];

        let (workday_url, to_email, from_email, app_password) = match values {
            [Some(url), Some(to), Some(from), Some(password)] => (url, to, from, password),
            values => return Err(ConfigError::Missing(missing_names(&values))),
        };

        let timeout_secs = match present(raw.timeout_secs) {
            Some(v) => parse_number("WORKDAY_TIMEOUT_SECS", &v)?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        let smtp_port = match present(raw.smtp_port) {
            Some(v) => parse_number("SMTP_PORT", &v)?,
            None => DEFAULT_SMTP_PORT,
        };

        Ok(Config {
            workday_url,
            to_email: parse_address("TO_EMAIL", &to_email)?,
            from_email: parse_address("FROM_EMAIL", &from_email)?,
            app_password,
            timeout: Duration::from_secs(timeout_secs),
            smtp_host: present(raw.smtp_host).unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            smtp_port,
        })
    }
}

fn missing_names(values: &[Option<String>; 4]) -> Vec<&'static str> {
    REQUIRED_VARS
        .iter()
        .zip(values)
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| *name)
        .collect()
}

// Unset, empty and whitespace-only values all count as missing. Anything else
// is kept exactly as given.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_address(var: &'static str, value: &str) -> Result<Address, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|source| ConfigError::InvalidAddress { var, source })
}

fn parse_number<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr<Err = ParseIntError>,
{
    value
        .trim()
        .parse()
        .map_err(|source| ConfigError::InvalidNumber { var, source })
}

/// Configuration errors never include the offending value, only the variable name.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("{var} is not a valid email address: {source}")]
    InvalidAddress {
        var: &'static str,
        source: AddressError,
    },

    #[error("{var} is not a valid number: {source}")]
    InvalidNumber {
        var: &'static str,
        source: ParseIntError,
    },

    #[error("could not read configuration from the environment ({})", .0.as_str().unwrap_or("unreadable value"))]
    Env(clap::error::ErrorKind),
}
