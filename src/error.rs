//! Error types for the invoicing driver.

use crate::driver::Stage;
use thiserror::Error;

/// Errors that can occur while driving the portal.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// A user-supplied argument was rejected before any browser interaction.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration could not be loaded or was incomplete.
    #[error("configuration error: {0}")]
    Config(String),

    /// Chrome could not be launched.
    #[error("failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Login elements were missing or the login navigation did not settle.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// A navigation did not settle, or an expected control was missing mid-flow.
    #[error("navigation failed at stage {stage}: {reason}")]
    Navigation { stage: Stage, reason: String },

    /// A selector returned nothing on the settled page.
    #[error("element '{selector}' not found at stage {stage}: {reason}")]
    ElementNotFound {
        stage: Stage,
        selector: String,
        reason: String,
    },

    /// Tab listing, switching or closing failed.
    #[error("tab operation failed: {0}")]
    TabOperationFailed(String),
}

pub type Result<T> = std::result::Result<T, InvoiceError>;
