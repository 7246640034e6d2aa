//! boilerpl8 CLI entrypoint.
//!
//! Progress lines and help output go to stdout; a failure is reported as a
//! single line on stderr with exit status 1. Diagnostics are logged through
//! `env_logger`, quiet by default and enabled with `RUST_LOG`.

use boilerpl8::cli;
use boilerpl8::config::Settings;
use boilerpl8::error::{Boilerpl8Error, Result};
use boilerpl8::pipeline::Pipeline;
use camino::Utf8PathBuf;
use std::io::Write;
use std::path::Path;

const DEFAULT_PROGRAM: &str = "boilerpl8";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut argv = std::env::args();
    let program = program_name(argv.next().as_deref());
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let run_result = run(&program, argv.collect(), &mut stdout);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(program: &str, args: Vec<String>, stdout: &mut dyn Write) -> Result<()> {
    let settings = Settings::load()?;
    let workdir = current_workdir()?;
    let pipeline = Pipeline::standard(&settings, workdir);
    cli::run(program, args, &pipeline, stdout)
}

/// Returns the file name of `argv0`, falling back to the package name.
fn program_name(argv0: Option<&str>) -> String {
    argv0
        .and_then(|arg| Path::new(arg).file_name())
        .and_then(|name| name.to_str())
        .unwrap_or(DEFAULT_PROGRAM)
        .to_owned()
}

fn current_workdir() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir()?;
    Utf8PathBuf::try_from(cwd).map_err(|e| Boilerpl8Error::Io(e.into_io_error()))
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}

fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort reporting; ignore write failures.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn exit_code_for_run_result_returns_zero_on_success() {
        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Ok(()), &mut stderr);
        assert_eq!(exit_code, 0);
        assert!(stderr.is_empty());
    }

    #[test]
    fn exit_code_for_run_result_prints_error_and_returns_one() {
        let err = Boilerpl8Error::MissingReference {
            program: "boilerpl8".to_owned(),
        };

        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Err(err), &mut stderr);
        assert_eq!(exit_code, 1);

        let stderr_text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert_eq!(stderr_text, "boilerpl8: argument required.\n");
    }

    #[rstest]
    #[case::absolute(Some("/usr/local/bin/boilerpl8"), "boilerpl8")]
    #[case::renamed(Some("./bp8"), "bp8")]
    #[case::missing(None, "boilerpl8")]
    #[case::empty(Some(""), "boilerpl8")]
    fn program_name_uses_basename(#[case] argv0: Option<&str>, #[case] expected: &str) {
        assert_eq!(program_name(argv0), expected);
    }
}
