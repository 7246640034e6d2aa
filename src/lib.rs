//! boilerpl8 library.
//!
//! Fetches project boilerplate from a GitHub release or a local archive,
//! unpacks it into a single normalized directory, and runs the template's
//! initializer script when it ships one. The `boilerpl8` binary is a thin
//! wrapper over [`cli::run`]; the stages can also be driven directly, which is
//! how the tests exercise them.
//!
//! # Modules
//!
//! - [`archive`] - Archive extraction and layout normalization
//! - [`cli`] - Command-line parsing and help output
//! - [`config`] - User configuration file and environment overrides
//! - [`error`] - Crate-level error type
//! - [`fetch`] - HTTP transport for release listings and downloads
//! - [`initializer`] - Initializer script discovery and execution
//! - [`option`] - Declarative short/long option parser
//! - [`output`] - Progress output helpers
//! - [`pipeline`] - Resolve, fetch, extract and initialize orchestration
//! - [`reference`] - Source reference parsing
//! - [`resolver`] - Schema-dispatched reference resolvers

pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod initializer;
pub mod option;
pub mod output;
pub mod pipeline;
pub mod reference;
pub mod resolver;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
