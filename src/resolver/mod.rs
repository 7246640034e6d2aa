//! Schema-dispatched resolution of boilerplate references.
//!
//! A reference such as `github:alice/tmpl` or `file:./tmpl.zip` is routed by
//! its schema prefix to a [`ReferenceResolver`], which turns it into a
//! [`ResolvedArtifact`] and later fetches that artifact to a local path.
//!
//! # Sub-modules
//!
//! - [`file`] - Local archive passthrough.
//! - [`repository`] - GitHub release lookup and download.

pub mod file;
pub mod repository;

use crate::config::Settings;
use crate::fetch::{DownloadError, UreqClient};
use crate::option::ParsedOptions;
use crate::reference::{ResolvedArtifact, schema_of};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;
use std::io::Write;

pub use file::FileReferenceResolver;
pub use repository::RepositoryReferenceResolver;

/// Option key that suppresses the repository name suffix.
pub const WITHOUT_SUFFIX: &str = "B";

/// Errors raised while resolving or fetching a reference.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The reference has no schema prefix, or no resolver handles it.
    #[error("{reference}: unknown schema (expected 'github:' or 'file:').")]
    UnknownSchema {
        /// The reference as given.
        reference: String,
    },

    /// The text after the schema prefix is malformed.
    #[error("{reference}: unexpected format.")]
    InvalidReferenceFormat {
        /// The reference as given.
        reference: String,
    },

    /// The release listing could not be fetched or decoded.
    #[error("{repo}: repository not found (api: GET {endpoint}) (hint: {hint})")]
    RepositoryNotFound {
        /// Repository name as given by the user.
        repo: String,
        /// The endpoint that was queried.
        endpoint: String,
        /// Suggestion on toggling the `-B` option.
        hint: &'static str,
    },

    /// The newest release offers neither an asset nor a source zip.
    #[error("can't find zip file under github.com/{owner}/{repo}/releases")]
    NoDownloadableAsset {
        /// Repository owner.
        owner: String,
        /// Repository name as queried.
        repo: String,
    },

    /// Downloading the resolved artifact failed.
    #[error(transparent)]
    Download(#[from] DownloadError),
}

/// Maps one reference syntax to a fetchable artifact.
pub trait ReferenceResolver {
    /// The schema prefix handled by this resolver, colon included.
    fn schema(&self) -> &'static str;

    /// Resolves `reference` to a concrete location and file name.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when the reference is malformed or cannot be
    /// resolved.
    fn resolve(
        &self,
        reference: &str,
        options: &ParsedOptions,
    ) -> Result<ResolvedArtifact, ResolveError>;

    /// Makes the artifact available locally and returns its path.
    ///
    /// Remote artifacts are written to `workdir` under their suggested file
    /// name; progress is reported on `out`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Download`] when the transfer fails.
    fn fetch(
        &self,
        artifact: &ResolvedArtifact,
        workdir: &Utf8Path,
        out: &mut dyn Write,
    ) -> Result<Utf8PathBuf, ResolveError>;
}

/// Read-only map from schema prefix to resolver, populated at start-up.
#[derive(Default)]
pub struct ResolverRegistry {
    resolvers: HashMap<&'static str, Box<dyn ReferenceResolver>>,
}

impl ResolverRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the file and GitHub resolvers wired to real HTTP.
    #[must_use]
    pub fn standard(settings: &Settings) -> Self {
        let client = UreqClient::new(settings.http_timeout());
        Self::new()
            .with(Box::new(FileReferenceResolver))
            .with(Box::new(RepositoryReferenceResolver::new(
                Box::new(client),
                settings,
            )))
    }

    /// Adds a resolver, replacing any previous one for the same schema.
    #[must_use]
    pub fn with(mut self, resolver: Box<dyn ReferenceResolver>) -> Self {
        self.resolvers.insert(resolver.schema(), resolver);
        self
    }

    /// Registered schema prefixes, sorted.
    #[must_use]
    pub fn schemas(&self) -> Vec<&'static str> {
        let mut schemas: Vec<_> = self.resolvers.keys().copied().collect();
        schemas.sort_unstable();
        schemas
    }

    /// Finds the resolver for the schema prefix of `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UnknownSchema`] when the reference has no
    /// schema prefix or the prefix is not registered.
    pub fn resolver_for(&self, reference: &str) -> Result<&dyn ReferenceResolver, ResolveError> {
        let resolver = schema_of(reference)
            .and_then(|schema| self.resolvers.get(schema))
            .ok_or_else(|| ResolveError::UnknownSchema {
                reference: reference.to_owned(),
            })?;
        log::debug!("dispatching {reference} to {} resolver", resolver.schema());
        Ok(resolver.as_ref())
    }
}

impl std::fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverRegistry")
            .field("schemas", &self.schemas())
            .finish()
    }
}
