//! One-shot liveness probe for a Workday tenant.
//!
//! A run reads its [`Config`] from the environment, issues a single GET and, if
//! the answer is missing or outside [`ACCEPTED_STATUSES`], hands one alert to a
//! [`Notifier`]. Nothing is retried and nothing is remembered between runs.

pub mod alert;
pub mod check;
pub mod env;

pub use alert::{alert, AlertMessage, Notifier, NotifyError, SmtpNotifier, ALERT_SUBJECT};
pub use check::{build_client, check, CheckResult, Verdict, ACCEPTED_STATUSES};
pub use env::{Config, ConfigError, EnvConfig};

/// What a single run ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Target answered with an accepted status, nobody was mailed.
    Up(u16),
    /// An alert carrying this detail was delivered.
    Alerted(String),
}

/// Performs one check and, when needed, one alert.
///
/// Only a failed alert delivery is returned as an error; bad statuses and
/// transport failures are turned into the alert itself.
pub async fn run<N: Notifier + ?Sized>(
    config: &Config,
    client: &reqwest::Client,
    notifier: &N,
) -> Result<RunOutcome, NotifyError> {
    log::info!("Checking Workday URL: {}", config.workday_url);

    let result = check(client, &config.workday_url).await;
    match result.verdict() {
        Verdict::Up(code) => {
            log::info!("Workday is UP (valid response {}). No alert sent.", code);
            Ok(RunOutcome::Up(code))
        }
        Verdict::AlertWorthy(detail) => {
            if let CheckResult::Status(_) = result {
                log::warn!("Workday returned unusual status. Sending alert.");
            }
            alert(notifier, &detail).await?;
            Ok(RunOutcome::Alerted(detail))
        }
    }
}
