//! Fetch pipeline orchestration.
//!
//! A fetch runs four stages in sequence, each completing before the next
//! starts: resolve the reference, fetch the artifact, normalize the archive
//! into a directory, then run its initializer script. The first failing stage
//! aborts the run; whatever it already changed on disk stays as it is.

use crate::archive::{ArchiveNormalizer, NormalizedDirectory};
use crate::cli::FetchRequest;
use crate::config::Settings;
use crate::error::Result;
use crate::initializer::{InitializerDispatcher, InitializerScript, SystemScriptExecutor};
use crate::resolver::ResolverRegistry;
use camino::Utf8PathBuf;
use std::io::Write;

/// Summary of a completed fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    /// The directory the boilerplate was extracted into.
    pub directory: NormalizedDirectory,
    /// The initializer script that was run, if any.
    pub initializer: Option<&'static InitializerScript>,
}

/// The configured stages of a fetch.
#[derive(Debug)]
pub struct Pipeline {
    registry: ResolverRegistry,
    normalizer: ArchiveNormalizer,
    dispatcher: InitializerDispatcher,
}

impl Pipeline {
    /// Assembles a pipeline from its stages.
    #[must_use]
    pub fn new(
        registry: ResolverRegistry,
        normalizer: ArchiveNormalizer,
        dispatcher: InitializerDispatcher,
    ) -> Self {
        Self {
            registry,
            normalizer,
            dispatcher,
        }
    }

    /// Builds the production pipeline working in `workdir`.
    #[must_use]
    pub fn standard(settings: &Settings, workdir: Utf8PathBuf) -> Self {
        Self::new(
            ResolverRegistry::standard(settings),
            ArchiveNormalizer::new(workdir),
            InitializerDispatcher::new(Box::new(SystemScriptExecutor::new(
                settings.initializer_timeout(),
            ))),
        )
    }

    /// Runs resolve, fetch, extract and initialize for `request`.
    ///
    /// # Errors
    ///
    /// Returns the error of the first stage that fails. Initializer script
    /// failures are logged rather than returned.
    pub fn run(&self, request: &FetchRequest, out: &mut dyn Write) -> Result<PipelineOutcome> {
        let resolver = self.registry.resolver_for(&request.reference)?;
        let artifact = resolver.resolve(&request.reference, &request.options)?;
        log::info!("resolved {} to {artifact}", request.reference);

        let archive = resolver.fetch(&artifact, self.normalizer.workdir(), out)?;
        let directory = self
            .normalizer
            .extract(&archive, request.target_dir.as_deref(), out)?;
        let initializer = self.dispatcher.dispatch(&directory, out)?;

        Ok(PipelineOutcome {
            directory,
            initializer,
        })
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
