//! The module contains the errors a gateway can report.
//!
//! Gateways only carry a human-readable message: holders surface it verbatim
//! in the UI state and never inspect it.
//!
//! - [`Transport`] the store could not be reached or answered with an error.
//! - [`NotFound`] an update targeted a document that does not exist.
//! - [`MissingId`] an update was attempted on a record without identifier.
//! - [`Interrupted`] the write task stopped before producing an outcome.
//!
//!  [`Transport`]: GatewayError::Transport
//!  [`NotFound`]: GatewayError::NotFound
//!  [`MissingId`]: GatewayError::MissingId
//!  [`Interrupted`]: GatewayError::Interrupted
use thiserror::Error;

/// Gateway errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("{0}")]
    Transport(String),
    #[error("\"{0}\" document not found!")]
    NotFound(String),
    #[error("document has no identifier")]
    MissingId,
    #[error("{0}")]
    Interrupted(String),
}

impl GatewayError {
    /// Message shown to the user.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<String> for GatewayError {
    fn from(message: String) -> Self {
        Self::Transport(message)
    }
}
