//! Command line client for the OWL daemon.
//!
//! The runtime parses the arguments, turns each word into a JSON value, sends
//! one request and prints the reply. It is exercised both from the binary
//! entrypoint and from tests where the IO streams are substituted.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use owl_config::Endpoint;
use serde_json::Value;

mod arguments;
mod cli;
mod client;
mod errors;

pub use client::OwlClient;
pub use errors::ClientError;

use arguments::{describe_status, parse_keywords, parse_value};
use cli::Cli;
use errors::AppError;

/// Runs the client with the given arguments and output streams.
pub fn run<I, T, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
    E: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => return report_usage(error, stdout, stderr),
    };
    match execute(&cli, stdout, stderr) {
        Ok(code) => code,
        Err(error) => {
            let _ = writeln!(stderr, "owl: {error}");
            ExitCode::FAILURE
        }
    }
}

fn report_usage<W: Write, E: Write>(error: clap::Error, stdout: &mut W, stderr: &mut E) -> ExitCode {
    let informational = matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion);
    let rendered = AppError::CliUsage(error).to_string();
    if informational {
        let _ = write!(stdout, "{rendered}");
        ExitCode::SUCCESS
    } else {
        let _ = write!(stderr, "{rendered}");
        ExitCode::from(2)
    }
}

fn execute<W: Write, E: Write>(cli: &Cli, stdout: &mut W, stderr: &mut E) -> Result<ExitCode, AppError> {
    let client = OwlClient::new(Endpoint::new(cli.host.clone(), cli.port));

    if cli.check {
        let alive = client.is_alive();
        let state = if alive { "is alive" } else { "is not responding" };
        writeln!(stdout, "owld at {} {state}", client.endpoint()).map_err(AppError::WriteOutput)?;
        return Ok(if alive { ExitCode::SUCCESS } else { ExitCode::FAILURE });
    }

    let Some(method) = cli.method.as_deref() else {
        return Ok(ExitCode::FAILURE);
    };
    let args: Vec<Value> = cli.arguments.iter().map(|word| parse_value(word)).collect();
    let kwargs = parse_keywords(&cli.keywords)?;

    if cli.verbose {
        let line = OwlClient::encode_request(method, &args, &kwargs);
        writeln!(stderr, "Connecting to {}", client.endpoint()).map_err(AppError::WriteOutput)?;
        writeln!(stderr, "Sending {}", String::from_utf8_lossy(&line).trim_end())
            .map_err(AppError::WriteOutput)?;
    }

    let reply = client.call(method, &args, &kwargs)?;
    let rendered = serde_json::to_string_pretty(&reply).map_err(AppError::RenderReply)?;
    writeln!(stdout, "{rendered}").map_err(AppError::WriteOutput)?;

    if method.starts_with("jobs_")
        && let Some(explanation) = reply.as_i64().and_then(describe_status)
    {
        writeln!(stderr, "owl: {explanation}").map_err(AppError::WriteOutput)?;
    }
    Ok(if is_refusal(&reply) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Whether the daemon answered with a warning or a handler error.
fn is_refusal(reply: &Value) -> bool {
    match reply {
        Value::String(text) => text.starts_with("Warning: "),
        Value::Object(map) => map.contains_key("error"),
        _ => false,
    }
}
