//! Progress and message output helpers.
//!
//! Every step that touches the filesystem is echoed as a shell-like line
//! (`$ rm -rf tmpl`) so the user can see, and if needed replay, what was done.

use std::fmt::Display;
use std::io::Write;

/// Writes `message` followed by a newline, ignoring write failures.
pub fn write_line(out: &mut dyn Write, message: impl Display) {
    if writeln!(out, "{message}").is_err() {
        // Best-effort progress output; a closed pipe must not abort the run.
    }
}

/// Writes `message` without a newline and flushes, so a later
/// [`write_line`] completes the same line.
pub fn write_partial(out: &mut dyn Write, message: impl Display) {
    if write!(out, "{message}").and_then(|()| out.flush()).is_err() {
        // Best-effort, as in `write_line`.
    }
}

/// Echoes a shell-equivalent command line for a filesystem step.
pub fn echo_command(out: &mut dyn Write, command: impl Display) {
    write_line(out, format_args!("$ {command}"));
}
