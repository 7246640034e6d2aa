//! Resolver for archives already on the local filesystem.

use super::{ReferenceResolver, ResolveError};
use crate::option::ParsedOptions;
use crate::reference::{FILE_SCHEMA, ResolvedArtifact, SourceReference, last_component};
use camino::{Utf8Path, Utf8PathBuf};
use std::io::Write;

/// Handles `file:<path>` references; the path is used verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileReferenceResolver;

impl ReferenceResolver for FileReferenceResolver {
    fn schema(&self) -> &'static str {
        FILE_SCHEMA
    }

    fn resolve(
        &self,
        reference: &str,
        _options: &ParsedOptions,
    ) -> Result<ResolvedArtifact, ResolveError> {
        match SourceReference::parse(reference)? {
            SourceReference::File { path } => Ok(ResolvedArtifact {
                suggested_filename: last_component(&path).to_owned(),
                location: path,
            }),
            SourceReference::Repository { .. } => Err(ResolveError::InvalidReferenceFormat {
                reference: reference.to_owned(),
            }),
        }
    }

    fn fetch(
        &self,
        artifact: &ResolvedArtifact,
        _workdir: &Utf8Path,
        _out: &mut dyn Write,
    ) -> Result<Utf8PathBuf, ResolveError> {
        Ok(Utf8PathBuf::from(&artifact.location))
    }
}
