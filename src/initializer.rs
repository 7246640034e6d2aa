//! Post-extraction initializer scripts.
//!
//! A boilerplate may ship one `__init.*` script that finishes the setup (for
//! example renaming a package after the target directory). The dispatcher
//! runs the first script it finds, in table order, from inside the extracted
//! directory. A missing script is not an error, and neither is a script that
//! fails: the files are already in place, so failures are only logged.

use crate::archive::NormalizedDirectory;
use crate::output::echo_command;
use camino::Utf8Path;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use wait_timeout::ChildExt;

/// A script file name paired with the interpreter that runs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitializerScript {
    /// File name looked up in the extracted directory.
    pub file_name: &'static str,
    /// Program invoked with the file name as its only argument.
    pub interpreter: &'static str,
}

/// Recognised initializer scripts in priority order.
pub const INITIALIZER_SCRIPTS: [InitializerScript; 8] = [
    InitializerScript {
        file_name: "__init.rb",
        interpreter: "ruby",
    },
    InitializerScript {
        file_name: "__init.py",
        interpreter: "python",
    },
    InitializerScript {
        file_name: "__init.js",
        interpreter: "node",
    },
    InitializerScript {
        file_name: "__init.pl",
        interpreter: "perl",
    },
    InitializerScript {
        file_name: "__init.php",
        interpreter: "php",
    },
    InitializerScript {
        file_name: "__init.lua",
        interpreter: "lua",
    },
    InitializerScript {
        file_name: "__init.exs",
        interpreter: "elixir",
    },
    InitializerScript {
        file_name: "__init.sh",
        interpreter: "bash",
    },
];

/// Returns the highest-priority initializer script present in `dir`.
#[must_use]
pub fn find_script(dir: &Path) -> Option<&'static InitializerScript> {
    INITIALIZER_SCRIPTS
        .iter()
        .find(|script| dir.join(script.file_name).is_file())
}

/// How an initializer process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptOutcome {
    /// Exited with status zero.
    Succeeded,
    /// Exited unsuccessfully; the code is absent when killed by a signal.
    Failed(Option<i32>),
    /// Killed after exceeding the configured timeout.
    TimedOut,
}

/// Abstraction for running an initializer script.
#[cfg_attr(test, mockall::automock)]
pub trait ScriptExecutor {
    /// Runs `interpreter script` in the current working directory.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the interpreter cannot be spawned or waited
    /// on.
    fn run(&self, interpreter: &str, script: &str) -> io::Result<ScriptOutcome>;
}

/// Runs scripts as child processes sharing this process's stdio.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemScriptExecutor {
    timeout: Option<Duration>,
}

impl SystemScriptExecutor {
    /// Creates an executor that kills scripts running longer than `timeout`.
    #[must_use]
    pub const fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl ScriptExecutor for SystemScriptExecutor {
    fn run(&self, interpreter: &str, script: &str) -> io::Result<ScriptOutcome> {
        let mut child = Command::new(interpreter).arg(script).spawn()?;

        let status = match self.timeout {
            None => child.wait()?,
            Some(limit) => match child.wait_timeout(limit)? {
                Some(status) => status,
                None => {
                    if let Err(e) = child.kill() {
                        log::debug!("failed to kill {interpreter}: {e}");
                    }
                    child.wait()?;
                    return Ok(ScriptOutcome::TimedOut);
                }
            },
        };

        if status.success() {
            Ok(ScriptOutcome::Succeeded)
        } else {
            Ok(ScriptOutcome::Failed(status.code()))
        }
    }
}

/// Switches the process working directory and restores it when dropped.
#[derive(Debug)]
pub struct WorkingDirGuard {
    original: PathBuf,
}

impl WorkingDirGuard {
    /// Changes into `dir`, remembering the current directory.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the current directory cannot be read or
    /// `dir` cannot be entered.
    pub fn enter(dir: &Utf8Path) -> io::Result<Self> {
        let original = std::env::current_dir()?;
        std::env::set_current_dir(dir)?;
        Ok(Self { original })
    }

    /// The directory restored on drop.
    #[must_use]
    pub fn original(&self) -> &Path {
        &self.original
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        if let Err(e) = std::env::set_current_dir(&self.original) {
            log::warn!(
                "failed to restore working directory {}: {e}",
                self.original.display()
            );
        }
    }
}

/// Finds and runs the initializer script of an extracted boilerplate.
pub struct InitializerDispatcher {
    executor: Box<dyn ScriptExecutor>,
}

impl InitializerDispatcher {
    /// Creates a dispatcher running scripts through `executor`.
    #[must_use]
    pub fn new(executor: Box<dyn ScriptExecutor>) -> Self {
        Self { executor }
    }

    /// Runs the first initializer script found in `dir`, from inside `dir`.
    ///
    /// Returns the script that was run, or `None` when the directory has
    /// none. The working directory is restored before returning, whether or
    /// not the script succeeded.
    ///
    /// # Errors
    ///
    /// Returns an I/O error only when the directory cannot be entered.
    pub fn dispatch(
        &self,
        dir: &NormalizedDirectory,
        out: &mut dyn Write,
    ) -> io::Result<Option<&'static InitializerScript>> {
        echo_command(out, format_args!("cd {}", dir.name));
        let guard = WorkingDirGuard::enter(&dir.path)?;

        let found = find_script(Path::new("."));
        if let Some(script) = found {
            echo_command(out, format_args!("{} {}", script.interpreter, script.file_name));
            report_outcome(script, &self.executor.run(script.interpreter, script.file_name));
        } else {
            log::debug!("no initializer script in {}", dir.path);
        }

        echo_command(out, "cd -");
        drop(guard);
        Ok(found)
    }
}

fn report_outcome(script: &InitializerScript, outcome: &io::Result<ScriptOutcome>) {
    match outcome {
        Ok(ScriptOutcome::Succeeded) => log::info!("{} completed", script.file_name),
        Ok(ScriptOutcome::Failed(Some(code))) => {
            log::warn!("{} exited with status {code}", script.file_name);
        }
        Ok(ScriptOutcome::Failed(None)) => {
            log::warn!("{} was terminated by a signal", script.file_name);
        }
        Ok(ScriptOutcome::TimedOut) => {
            log::warn!("{} timed out and was killed", script.file_name);
        }
        Err(e) => log::warn!("could not run {}: {e}", script.interpreter),
    }
}

impl std::fmt::Debug for InitializerDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializerDispatcher").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "initializer_tests.rs"]
mod tests;
