pub mod confirm;
pub mod mailer;
pub mod notifier;

pub use confirm::{Confirm, LineConfirm};
pub use mailer::{Mailer, OutgoingReport, SmtpMailer};
pub use notifier::{DeliveryOutcome, Notifier};
