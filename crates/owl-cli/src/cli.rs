//! CLI argument definitions for the `owl` client.

use clap::Parser;
use owl_config::DEFAULT_PORT;

/// Sends one request to a running OWL daemon and prints the reply.
#[derive(Parser, Debug)]
#[command(name = "owl", disable_help_subcommand = true, allow_negative_numbers = true)]
pub(crate) struct Cli {
    /// Daemon host name or IP address.
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub(crate) host: String,
    /// Daemon TCP port.
    #[arg(short = 'P', long, default_value_t = DEFAULT_PORT)]
    pub(crate) port: u16,
    /// Prints the connection and the request on stderr.
    #[arg(short = 'v', long)]
    pub(crate) verbose: bool,
    /// Reports whether the daemon answers and exits.
    #[arg(long, conflicts_with = "method")]
    pub(crate) check: bool,
    /// Keyword argument passed as `NAME=VALUE`; may be repeated.
    #[arg(long = "kw", value_name = "NAME=VALUE")]
    pub(crate) keywords: Vec<String>,
    /// The daemon method to call (for example `jobs_get_list`).
    #[arg(value_name = "METHOD", required_unless_present = "check")]
    pub(crate) method: Option<String>,
    /// Positional arguments passed to the method.
    #[arg(value_name = "ARG", num_args = 0..)]
    pub(crate) arguments: Vec<String>,
}
