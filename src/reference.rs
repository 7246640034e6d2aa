//! Source references and the artifacts they resolve to.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::resolver::ResolveError;

static SCHEMA_PREFIX: LazyLock<Regex> = LazyLock::new(|| literal_pattern(r"^(\w+:)"));
static REPOSITORY: LazyLock<Regex> =
    LazyLock::new(|| literal_pattern(r"^github:([^/]+)/([^/]+)$"));

#[expect(
    clippy::expect_used,
    reason = "patterns are string literals exercised by the unit tests"
)]
fn literal_pattern(pattern: &str) -> Regex {
    Regex::new(pattern).expect("reference pattern must compile")
}

/// Schema prefix for local archive references.
pub const FILE_SCHEMA: &str = "file:";

/// Schema prefix for GitHub release references.
pub const GITHUB_SCHEMA: &str = "github:";

/// Returns the leading `word:` schema of a reference, colon included.
///
/// # Examples
///
/// ```
/// use boilerpl8::reference::schema_of;
///
/// assert_eq!(schema_of("github:alice/tmpl"), Some("github:"));
/// assert_eq!(schema_of("./tmpl.zip"), None);
/// ```
#[must_use]
pub fn schema_of(reference: &str) -> Option<&str> {
    SCHEMA_PREFIX
        .captures(reference)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// A parsed boilerplate source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceReference {
    /// An archive already on the local filesystem.
    File {
        /// Path exactly as written after the schema.
        path: String,
    },
    /// The latest release of a GitHub repository.
    Repository {
        /// Repository owner.
        owner: String,
        /// Repository name as written, before any suffix is applied.
        name: String,
    },
}

impl SourceReference {
    /// Parses a schema-prefixed reference string.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UnknownSchema`] when the prefix is missing or
    /// unknown, and [`ResolveError::InvalidReferenceFormat`] when the text
    /// after a known prefix is malformed.
    pub fn parse(reference: &str) -> Result<Self, ResolveError> {
        match schema_of(reference) {
            Some(FILE_SCHEMA) => {
                let path = reference.strip_prefix(FILE_SCHEMA).unwrap_or_default();
                if path.is_empty() {
                    return Err(invalid_format(reference));
                }
                Ok(Self::File {
                    path: path.to_owned(),
                })
            }
            Some(GITHUB_SCHEMA) => {
                let caps = REPOSITORY
                    .captures(reference)
                    .ok_or_else(|| invalid_format(reference))?;
                let part = |index: usize| caps.get(index).map_or("", |m| m.as_str()).to_owned();
                Ok(Self::Repository {
                    owner: part(1),
                    name: part(2),
                })
            }
            _ => Err(ResolveError::UnknownSchema {
                reference: reference.to_owned(),
            }),
        }
    }
}

fn invalid_format(reference: &str) -> ResolveError {
    ResolveError::InvalidReferenceFormat {
        reference: reference.to_owned(),
    }
}

/// A concrete location to fetch and the file name to store it under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    /// URL or filesystem path.
    pub location: String,
    /// File name the archive is saved as; its suffix selects the extractor.
    pub suggested_filename: String,
}

impl fmt::Display for ResolvedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.location, self.suggested_filename)
    }
}

/// Returns the last `/`-separated component of a URL or path.
///
/// Trailing separators are ignored, so `a/b/` yields `b`.
#[must_use]
pub fn last_component(location: &str) -> &str {
    location
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(location)
}
