use std::fmt::{self, Debug, Display};
use std::io;

/// Provides `SeirvError` and maps other errors to
/// convert to a `SeirvError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum SeirvError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    CSVError(csv::Error),
    /// A parameter was out of range or otherwise unusable. Raised at
    /// construction time, never while stepping.
    InvalidConfiguration(String),
    /// The compartment counts no longer add up to the population size.
    DegenerateState(String),
    ReportError(String),
    SeirvError(String),
}

impl From<io::Error> for SeirvError {
    fn from(error: io::Error) -> Self {
        SeirvError::IoError(error)
    }
}

impl From<serde_json::Error> for SeirvError {
    fn from(error: serde_json::Error) -> Self {
        SeirvError::JsonError(error)
    }
}

impl From<csv::Error> for SeirvError {
    fn from(error: csv::Error) -> Self {
        SeirvError::CSVError(error)
    }
}

impl From<String> for SeirvError {
    fn from(error: String) -> Self {
        SeirvError::SeirvError(error)
    }
}

impl From<&str> for SeirvError {
    fn from(error: &str) -> Self {
        SeirvError::SeirvError(error.to_string())
    }
}

impl std::error::Error for SeirvError {}

impl Display for SeirvError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SeirvError::InvalidConfiguration(message) => {
                write!(f, "Invalid configuration: {message}")
            }
            SeirvError::DegenerateState(message) => write!(f, "Degenerate state: {message}"),
            SeirvError::ReportError(message) => write!(f, "Report error: {message}"),
            _ => write!(f, "Error: {self:?}"),
        }
    }
}
