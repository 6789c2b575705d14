//! # Error Types
//!
//! This module defines error types used throughout the signet library.
//! Field-level validation problems live in [`crate::form::FieldError`] and
//! travel inside an [`crate::form::ErrorMap`]; `Invalid` carries that map when
//! a whole-form operation (render, export) is refused.

use thiserror::Error;

use crate::export::ExportError;
use crate::form::ErrorMap;

/// Main error type for signet operations
#[derive(Debug, Error)]
pub enum SignetError {
    /// Input document could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// The form has field errors
    #[error("Form has errors: {0}")]
    Invalid(ErrorMap),

    /// Export sink failure
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Image download or decode error
    #[error("Image error: {0}")]
    Image(String),

    /// Server-level errors (bind, serve)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Logging or configuration setup error
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
