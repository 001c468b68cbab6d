pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod report;
pub mod steps;
pub mod trello;

pub use config::{Config, WeekContext};
pub use error::{Error, Result, Stage};
pub use notify::{DeliveryOutcome, LineConfirm, Notifier, SmtpMailer};
pub use report::{ReportPipeline, ReportRenderer};
pub use steps::StepLogger;
pub use trello::{BoardApi, TrelloClient};
