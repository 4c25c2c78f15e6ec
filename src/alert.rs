use async_trait::async_trait;
use lettre::address::Address;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::env::Config;

pub const ALERT_SUBJECT: &str = "ALERT: Workday Down";

/// A plain-text alert, built only once a check came back alert-worthy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub subject: String,
    pub body: String,
}

impl AlertMessage {
    /// Fixed subject, fixed preamble, then the failure detail.
    pub fn for_failure(detail: &str) -> Self {
        AlertMessage {
            subject: ALERT_SUBJECT.to_string(),
            body: format!("⚠️ Workday might be DOWN.\n\nDetails:\n{}", detail),
        }
    }
}

/// Anything that can deliver a single alert.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Sends exactly one email over `notifier`.
pub async fn alert<N: Notifier + ?Sized>(notifier: &N, detail: &str) -> Result<(), NotifyError> {
    log::warn!("Sending alert email: {}", detail);
    let message = AlertMessage::for_failure(detail);
    notifier.notify(&message.subject, &message.body).await
}

/// Delivers alerts through an authenticated SMTP session over implicit TLS.
/// A fresh connection is opened for each send and closed afterwards.
pub struct SmtpNotifier {
    from: Address,
    to: Address,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpNotifier {
    pub fn new(config: &Config) -> Result<Self, NotifyError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.from_email.to_string(),
                config.app_password.clone(),
            ))
            .build();

        Ok(SmtpNotifier {
            from: config.from_email.clone(),
            to: config.to_email.clone(),
            transport,
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let message = build_message(&self.from, &self.to, subject, body)?;
        let response = self.transport.send(message).await?;
        log::debug!("SMTP relay answered {}", response.code());
        Ok(())
    }
}

pub(crate) fn build_message(
    from: &Address,
    to: &Address,
    subject: &str,
    body: &str,
) -> Result<Message, NotifyError> {
    let message = Message::builder()
        .from(Mailbox::new(None, from.clone()))
        .to(Mailbox::new(None, to.clone()))
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())?;
    Ok(message)
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("could not build alert email: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Notifier for Recorder {
        async fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push((subject.to_string(), body.to_string()));
            Ok(())
        }
    }

    fn address(raw: &str) -> Address {
        raw.parse().unwrap()
    }

    #[test]
    fn test_alert_message_layout() {
        let message = AlertMessage::for_failure("HTTP Status Code: 503");
        assert_eq!(message.subject, "ALERT: Workday Down");
        assert_eq!(
            message.body,
            "⚠️ Workday might be DOWN.\n\nDetails:\nHTTP Status Code: 503"
        );
    }

    #[tokio::test]
    async fn test_alert_sends_once() {
        let recorder = Recorder::default();
        alert(&recorder, "connection refused").await.unwrap();

        let sent = recorder.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, ALERT_SUBJECT);
        assert!(sent[0].1.ends_with("Details:\nconnection refused"));
    }

    #[test]
    fn test_email_has_single_recipient() {
        let message = build_message(
            &address("watcher@example.com"),
            &address("oncall@example.com"),
            ALERT_SUBJECT,
            "⚠️ Workday might be DOWN.",
        )
        .unwrap();

        let envelope = message.envelope();
        assert_eq!(envelope.to(), &[address("oncall@example.com")]);
        assert_eq!(envelope.from(), Some(&address("watcher@example.com")));

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: ALERT: Workday Down"));
        assert!(raw.contains("Content-Type: text/plain; charset=utf-8"));
    }
}
