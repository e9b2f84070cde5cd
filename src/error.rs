use thiserror::Error;

use crate::locale::Locale;

pub type Result<T, E = RuntimeError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("No project loaded")]
    NotLoaded,
    #[error("Locale {0} is not supported by the project")]
    UnsupportedLocale(Locale),
    #[error("Unknown locale {0}")]
    UnknownLocale(Locale),
    #[error("No active run")]
    NoActiveRun,
    #[error("Switch {0} cannot be chosen at the current step")]
    InvalidSwitch(usize),
    #[error("Asset {0} not found")]
    AssetNotFound(String),
    #[error("Failed to parse script {name}:\n{message}")]
    ParseError { name: String, message: String },
    #[error("Invalid script {name}: {message}")]
    InvalidScript { name: String, message: String },
    #[error("Record does not match the loaded script for locale {0}")]
    StaleRecord(Locale),
    #[error("Command {0} not found")]
    UnknownCommand(String),
    #[error("Wrong argument(s) provided to {command}: {message}")]
    InvalidArguments { command: String, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RuntimeError {
    pub(crate) fn invalid_script(name: &str, message: impl Into<String>) -> Self {
        RuntimeError::InvalidScript {
            name: name.to_string(),
            message: message.into(),
        }
    }
}
