use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Pipeline stage a remote request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lists,
    Cards,
    Checklists,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Lists => write!(f, "lists"),
            Stage::Cards => write!(f, "cards"),
            Stage::Checklists => write!(f, "checklists"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration file not found (looked in: {})", display_paths(.candidates))]
    ConfigurationNotFound { candidates: Vec<PathBuf> },

    #[error("Invalid configuration: {0}")]
    ConfigurationInvalid(String),

    #[error("Error retrieving {stage} for {context}: {reason}")]
    UpstreamRequestFailed {
        stage: Stage,
        context: String,
        reason: String,
    },

    #[error("Unable to identify list: {name}")]
    ListNotFound { name: String },

    #[error("Email delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Trello API error: {0}")]
    TrelloApi(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wraps a client failure with the stage and entity it happened for.
    pub fn upstream(stage: Stage, context: impl Into<String>, source: Error) -> Self {
        Error::UpstreamRequestFailed {
            stage,
            context: context.into(),
            reason: source.to_string(),
        }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Error::ConfigurationInvalid(msg.into())
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
