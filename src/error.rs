//! Top-level error type for the boilerpl8 command.
//!
//! Each stage of the pipeline reports its own error enum; this module folds
//! them into [`Boilerpl8Error`] so the binary can print one message and exit
//! with status 1.

use crate::archive::ExtractionError;
use crate::config::ConfigError;
use crate::option::{OptionDefinitionError, OptionError};
use crate::resolver::ResolveError;
use thiserror::Error;

/// Errors that abort a boilerpl8 run.
#[derive(Debug, Error)]
pub enum Boilerpl8Error {
    /// No source reference was given on the command line.
    #[error("{program}: argument required.")]
    MissingReference {
        /// Program name as shown in messages.
        program: String,
    },

    /// The command-line options could not be parsed.
    #[error(transparent)]
    Option(#[from] OptionError),

    /// The option table itself is malformed.
    #[error(transparent)]
    OptionDefinition(#[from] OptionDefinitionError),

    /// The source reference could not be resolved or fetched.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The fetched archive could not be extracted.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The configuration file is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`Boilerpl8Error`].
pub type Result<T> = std::result::Result<T, Boilerpl8Error>;
