use crate::config::EmailConfig;
use crate::error::Result;
use crate::notify::confirm::Confirm;
use crate::notify::mailer::{Mailer, OutgoingReport};
use crate::steps::StepLogger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Sending is switched off, the report was only printed.
    Disabled,
    /// The user answered no at the prompt.
    Declined,
    Sent,
}

/// Prints the report and, when enabled, mails it.
pub struct Notifier<M> {
    mailer: M,
    settings: EmailConfig,
}

impl<M: Mailer> Notifier<M> {
    pub fn new(mailer: M, settings: EmailConfig) -> Self {
        Self { mailer, settings }
    }

    pub async fn deliver(
        &self,
        body: &str,
        log: &StepLogger,
        confirm: &mut dyn Confirm,
    ) -> Result<DeliveryOutcome> {
        if !self.settings.send {
            log.step("Email notification is disabled");
            log.dump(body);
            return Ok(DeliveryOutcome::Disabled);
        }

        log.step("Dumping email body");
        log.dump(body);

        if self.settings.ask_before_send {
            log.step("Ask before send email enabled");
            if !confirm.confirm("Send email")? {
                tracing::info!("Email not sent, declined at prompt");
                return Ok(DeliveryOutcome::Declined);
            }
        }

        log.step(&format!(
            "Sending email\n\tTo: {}\tSubject: {}",
            self.settings.to, self.settings.subject
        ));
        let report = OutgoingReport {
            from: self.settings.from.clone(),
            to: self.settings.to.clone(),
            subject: self.settings.subject.clone(),
            body: body.to_string(),
        };
        self.mailer.send(&report).await?;
        log.substep("Email sent");

        Ok(DeliveryOutcome::Sent)
    }

    #[cfg(test)]
    fn mailer(&self) -> &M {
        &self.mailer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::notify::confirm::LineConfirm;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingReport>>,
        fail: bool,
    }

    impl RecordingMailer {
        fn sent(&self) -> Vec<OutgoingReport> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, report: &OutgoingReport) -> Result<()> {
            if self.fail {
                return Err(Error::DeliveryFailed("connection refused".to_string()));
            }
            self.sent.lock().unwrap().push(report.clone());
            Ok(())
        }
    }

    /// Fails the test if the prompt is reached.
    struct NoPrompt;

    impl Confirm for NoPrompt {
        fn confirm(&mut self, _question: &str) -> Result<bool> {
            panic!("prompt should not be shown");
        }
    }

    fn settings(send: bool, ask_before_send: bool) -> EmailConfig {
        EmailConfig {
            from: "tracker@example.com".to_string(),
            to: "team@example.com".to_string(),
            server: "localhost".to_string(),
            subject: "Week 12".to_string(),
            send,
            ask_before_send,
        }
    }

    #[tokio::test]
    async fn test_disabled_prints_and_never_mails() {
        let notifier = Notifier::new(RecordingMailer::default(), settings(false, true));
        let log = StepLogger::buffered();

        let outcome = notifier.deliver("report body", &log, &mut NoPrompt).await.unwrap();

        assert_eq!(outcome, DeliveryOutcome::Disabled);
        assert!(notifier.mailer().sent().is_empty());
        let lines = log.lines();
        assert_eq!(lines[0], "1  - Email notification is disabled");
        assert!(lines.contains(&"report body".to_string()));
    }

    #[tokio::test]
    async fn test_declined_prompt_prints_but_does_not_send() {
        let notifier = Notifier::new(RecordingMailer::default(), settings(true, true));
        let log = StepLogger::buffered();
        let mut out = Vec::new();
        let mut confirm = LineConfirm::new("n\n".as_bytes(), &mut out);

        let outcome = notifier.deliver("report body", &log, &mut confirm).await.unwrap();

        assert_eq!(outcome, DeliveryOutcome::Declined);
        assert!(notifier.mailer().sent().is_empty());
        assert!(log.lines().contains(&"report body".to_string()));
        assert!(log.lines().contains(&"2  - Ask before send email enabled".to_string()));
    }

    #[tokio::test]
    async fn test_confirmed_prompt_sends() {
        let notifier = Notifier::new(RecordingMailer::default(), settings(true, true));
        let log = StepLogger::buffered();
        let mut out = Vec::new();
        let mut confirm = LineConfirm::new("yes\n".as_bytes(), &mut out);

        let outcome = notifier.deliver("report body", &log, &mut confirm).await.unwrap();

        assert_eq!(outcome, DeliveryOutcome::Sent);
        let sent = notifier.mailer().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Week 12");
        assert_eq!(sent[0].body, "report body");
        assert_eq!(log.lines().last().unwrap(), "     * Email sent");
    }

    #[tokio::test]
    async fn test_sends_without_prompt_when_not_asking() {
        let notifier = Notifier::new(RecordingMailer::default(), settings(true, false));
        let log = StepLogger::buffered();

        let outcome = notifier.deliver("body", &log, &mut NoPrompt).await.unwrap();

        assert_eq!(outcome, DeliveryOutcome::Sent);
        assert_eq!(notifier.mailer().sent().len(), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let mailer = RecordingMailer {
            fail: true,
            ..Default::default()
        };
        let notifier = Notifier::new(mailer, settings(true, false));
        let log = StepLogger::buffered();

        let result = notifier.deliver("body", &log, &mut NoPrompt).await;
        assert!(matches!(result, Err(Error::DeliveryFailed(_))));
        assert!(!log.lines().contains(&"     * Email sent".to_string()));
    }
}
