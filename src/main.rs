use anyhow::{Context, Result};
use workday_watch::{build_client, run, Config, RunOutcome, SmtpNotifier};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Missing or invalid configuration. {}", e);
            return Err(e.into());
        }
    };

    let client = build_client(config.timeout).context("Could not build HTTP client")?;
    let notifier = SmtpNotifier::new(&config).context("Could not set up SMTP transport")?;

    match run(&config, &client, &notifier).await.context("Alert delivery failed")? {
        RunOutcome::Up(_) => {}
        RunOutcome::Alerted(_) => log::info!("Alert email sent to {}", config.to_email),
    }

    Ok(())
}
