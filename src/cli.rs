//! Command-line interface for boilerpl8.
//!
//! The command takes a source reference and an optional target directory:
//!
//! ```text
//! boilerpl8 [options] github:<USER>/<REPO> [<DIR>]
//! boilerpl8 [options] file:<PATH> [<DIR>]
//! ```
//!
//! Options are parsed with [`OptionParser`] so that short flags cluster
//! (`-hv`) and parsing stops at the first positional argument.

use crate::error::{Boilerpl8Error, Result};
use crate::option::{OptionParser, ParsedOptions};
use crate::output::write_line;
use crate::pipeline::Pipeline;
use std::io::Write;

/// Option table of the command.
pub const COMMAND_OPTIONS: [&str; 3] = [
    "-h, --help       :  help",
    "-v, --version    :  version",
    "-B               :  not append '-boilerpl8' to github repo name",
];

/// Version string printed by `--version`.
pub const RELEASE: &str = env!("CARGO_PKG_VERSION");

/// A fully parsed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the help message.
    Help,
    /// Print the version.
    Version,
    /// Fetch and unpack a boilerplate.
    Fetch(FetchRequest),
}

/// Arguments of a fetch invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Raw source reference such as `github:kwatch/hello-python`.
    pub reference: String,
    /// Directory name to extract into; derived from the archive when absent.
    pub target_dir: Option<String>,
    /// Parsed command options, consulted by resolvers.
    pub options: ParsedOptions,
}

/// Parses the command line, excluding the program name.
///
/// Help takes precedence over version, and both over positional arguments.
///
/// # Errors
///
/// Returns [`Boilerpl8Error::Option`] for malformed options and
/// [`Boilerpl8Error::MissingReference`] when no reference is given.
///
/// # Examples
///
/// ```
/// use boilerpl8::cli::{Command, parse_command};
///
/// let command = parse_command("boilerpl8", vec!["-hv".to_owned()])?;
/// assert_eq!(command, Command::Help);
/// # Ok::<(), boilerpl8::error::Boilerpl8Error>(())
/// ```
pub fn parse_command(program: &str, mut args: Vec<String>) -> Result<Command> {
    let parser = OptionParser::new(&COMMAND_OPTIONS)?;
    let options = parser.parse(&mut args)?;

    if options.is_set("help") {
        return Ok(Command::Help);
    }
    if options.is_set("version") {
        return Ok(Command::Version);
    }

    let mut positional = args.into_iter();
    let reference = positional
        .next()
        .ok_or_else(|| Boilerpl8Error::MissingReference {
            program: program.to_owned(),
        })?;
    let target_dir = positional.next();
    for ignored in positional {
        log::debug!("ignoring extra argument {ignored}");
    }

    Ok(Command::Fetch(FetchRequest {
        reference,
        target_dir,
        options,
    }))
}

/// Renders the help message for `program`.
///
/// # Errors
///
/// Returns [`Boilerpl8Error::OptionDefinition`] when the option table is
/// malformed.
pub fn help_message(program: &str) -> Result<String> {
    let parser = OptionParser::new(&COMMAND_OPTIONS)?;
    Ok(format!(
        "\
{program} -- download boilerplate files

Usage:
  {program} [options] github:<USER>/<REPO> <DIR>
  {program} [options] file:<PATH> <DIR>

Options:
{options}
Examples:

  ## download boilerplate files from github
  $ {program} github:kwatch/hello-python mypkg1           # for python
  $ {program} github:kwatch/hello-ruby mygem1             # for ruby
  $ {program} github:kwatch/keight-python myapp1          # for keight.py

  ## '-B' option doesn't append '-boilerpl8' to github repo name
  $ {program} -B github:h5bp/html5-boilerplate website1   # for html5

  ## expand boilerplate files
  $ {program} file:./keight-python.tar.gz myapp1
",
        options = parser.help_lines(),
    ))
}

/// Runs one invocation, writing help, version and progress output to `out`.
///
/// # Errors
///
/// Returns the first error raised by option parsing or any pipeline stage.
pub fn run(program: &str, args: Vec<String>, pipeline: &Pipeline, out: &mut dyn Write) -> Result<()> {
    match parse_command(program, args)? {
        Command::Help => {
            write_line(out, help_message(program)?.trim_end());
        }
        Command::Version => write_line(out, RELEASE),
        Command::Fetch(request) => {
            pipeline.run(&request, out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
