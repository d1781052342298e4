//! CLI entrypoint for the OWL client.
//!
//! The binary delegates to [`owl_cli::run`], which parses the arguments,
//! sends one request to the daemon and prints its reply.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    owl_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
