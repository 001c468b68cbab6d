use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::error::{Error, Result};

const DEFAULT_SMTP_PORT: u16 = 25;

/// A rendered report ready to be mailed.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingReport {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, report: &OutgoingReport) -> Result<()>;
}

/// Plain SMTP relay, no TLS and no authentication.
pub struct SmtpMailer {
    host: String,
    port: u16,
}

impl SmtpMailer {
    /// Accepts `host` or `host:port`.
    pub fn new(server: &str) -> Result<Self> {
        let (host, port) = split_server(server)?;
        Ok(Self { host, port })
    }

    #[cfg(test)]
    fn host(&self) -> &str {
        &self.host
    }

    #[cfg(test)]
    fn port(&self) -> u16 {
        self.port
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, report: &OutgoingReport) -> Result<()> {
        let message = build_message(report)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(self.host.as_str())
            .port(self.port)
            .build();

        tracing::debug!("Relaying report through {}:{}", self.host, self.port);
        transport
            .send(message)
            .await
            .map_err(|e| Error::DeliveryFailed(e.to_string()))?;
        Ok(())
    }
}

pub fn build_message(report: &OutgoingReport) -> Result<Message> {
    let from: Mailbox = report
        .from
        .trim()
        .parse()
        .map_err(|e| Error::DeliveryFailed(format!("invalid from address '{}': {}", report.from, e)))?;

    let mut builder = Message::builder()
        .from(from)
        .subject(report.subject.as_str())
        .header(ContentType::TEXT_PLAIN);

    for addr in report.to.split(',').map(str::trim).filter(|a| !a.is_empty()) {
        let to: Mailbox = addr
            .parse()
            .map_err(|e| Error::DeliveryFailed(format!("invalid to address '{}': {}", addr, e)))?;
        builder = builder.to(to);
    }

    builder
        .body(report.body.clone())
        .map_err(|e| Error::DeliveryFailed(e.to_string()))
}

fn split_server(server: &str) -> Result<(String, u16)> {
    let server = server.trim();
    match server.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() => {
            let port = port
                .parse()
                .map_err(|_| Error::invalid(format!("[email] server has an invalid port: '{}'", server)))?;
            Ok((host.to_string(), port))
        }
        _ if server.is_empty() => Err(Error::invalid("[email] server is empty")),
        _ => Ok((server.to_string(), DEFAULT_SMTP_PORT)),
    }
}
