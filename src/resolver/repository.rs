//! Resolver for the newest release of a GitHub repository.
//!
//! Boilerplate repositories conventionally carry a `-boilerpl8` suffix so that
//! one upstream project can host template variants per ecosystem
//! (`hello-python-boilerpl8`, `hello-ruby-boilerpl8`). The suffix is appended
//! unless the `-B` option is given.

use super::{ReferenceResolver, ResolveError, WITHOUT_SUFFIX};
use crate::config::Settings;
use crate::fetch::HttpClient;
use crate::option::ParsedOptions;
use crate::output::{write_line, write_partial};
use crate::reference::{GITHUB_SCHEMA, ResolvedArtifact, SourceReference, last_component};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::io::Write;

const HINT_WITH_FLAG: &str = "confirm repository name, or try without '-B' option.";
const HINT_WITHOUT_FLAG: &str = "confirm repository name, or maybe you missed '-B' option.";

/// One entry of the releases listing.
#[derive(Debug, Clone, Default, Deserialize)]
struct Release {
    #[serde(default)]
    assets: Vec<Asset>,
    #[serde(default)]
    zipball_url: Option<String>,
    #[serde(default)]
    tag_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Asset {
    #[serde(default)]
    browser_download_url: Option<String>,
}

/// Handles `github:<owner>/<repo>` references.
pub struct RepositoryReferenceResolver {
    client: Box<dyn HttpClient>,
    api_base_url: String,
    suffix: String,
}

impl RepositoryReferenceResolver {
    /// Creates a resolver querying the API configured in `settings`.
    #[must_use]
    pub fn new(client: Box<dyn HttpClient>, settings: &Settings) -> Self {
        Self {
            client,
            api_base_url: settings.api_base_url.trim_end_matches('/').to_owned(),
            suffix: settings.repository_suffix.clone(),
        }
    }

    /// The releases endpoint for `owner/repo`, with the suffix applied
    /// unless `without_suffix` is set.
    #[must_use]
    pub fn releases_endpoint(&self, owner: &str, repo: &str, without_suffix: bool) -> String {
        let suffix = if without_suffix { "" } else { &self.suffix };
        format!("{}/repos/{owner}/{repo}{suffix}/releases", self.api_base_url)
    }

    fn list_releases(
        &self,
        repo: &str,
        endpoint: &str,
        without_suffix: bool,
    ) -> Result<Vec<Release>, ResolveError> {
        let not_found = || ResolveError::RepositoryNotFound {
            repo: repo.to_owned(),
            endpoint: endpoint.to_owned(),
            hint: if without_suffix {
                HINT_WITH_FLAG
            } else {
                HINT_WITHOUT_FLAG
            },
        };
        let body = self.client.get_text(endpoint).map_err(|e| {
            log::debug!("release listing failed: {e}");
            not_found()
        })?;
        serde_json::from_str(&body).map_err(|e| {
            log::debug!("release listing is not valid JSON: {e}");
            not_found()
        })
    }
}

impl std::fmt::Debug for RepositoryReferenceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryReferenceResolver")
            .field("api_base_url", &self.api_base_url)
            .field("suffix", &self.suffix)
            .finish_non_exhaustive()
    }
}

impl ReferenceResolver for RepositoryReferenceResolver {
    fn schema(&self) -> &'static str {
        GITHUB_SCHEMA
    }

    fn resolve(
        &self,
        reference: &str,
        options: &ParsedOptions,
    ) -> Result<ResolvedArtifact, ResolveError> {
        let SourceReference::Repository { owner, name } = SourceReference::parse(reference)?
        else {
            return Err(ResolveError::InvalidReferenceFormat {
                reference: reference.to_owned(),
            });
        };

        let without_suffix = options.is_set(WITHOUT_SUFFIX);
        let endpoint = self.releases_endpoint(&owner, &name, without_suffix);
        log::info!("querying releases at {endpoint}");
        let releases = self.list_releases(&name, &endpoint, without_suffix)?;
        select_artifact(&releases, &owner, &name)
    }

    fn fetch(
        &self,
        artifact: &ResolvedArtifact,
        workdir: &Utf8Path,
        out: &mut dyn Write,
    ) -> Result<Utf8PathBuf, ResolveError> {
        let dest = workdir.join(&artifact.suggested_filename);
        write_partial(out, format_args!("Download from {} ...", artifact.location));
        self.client
            .download_to_file(&artifact.location, dest.as_std_path())?;
        write_line(out, " done.");
        Ok(dest)
    }
}

/// Picks the artifact of the newest release: its first asset when present,
/// otherwise the auto-generated source zip.
fn select_artifact(
    releases: &[Release],
    owner: &str,
    repo: &str,
) -> Result<ResolvedArtifact, ResolveError> {
    let no_asset = || ResolveError::NoDownloadableAsset {
        owner: owner.to_owned(),
        repo: repo.to_owned(),
    };
    let latest = releases.first().ok_or_else(no_asset)?;

    let artifact = if let Some(asset) = latest.assets.first() {
        asset
            .browser_download_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .map(|url| ResolvedArtifact {
                location: url.to_owned(),
                suggested_filename: last_component(url).to_owned(),
            })
    } else {
        latest
            .zipball_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .map(|url| ResolvedArtifact {
                location: url.to_owned(),
                suggested_filename: format!(
                    "{repo}_{}.zip",
                    latest.tag_name.replace(['/', '\\'], "-")
                ),
            })
    };
    artifact.ok_or_else(no_asset)
}

#[cfg(test)]
#[path = "repository_tests.rs"]
mod tests;
