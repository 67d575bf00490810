//! CLI argument parsing for shellvars.
//!
//! Uses clap derive macros for declarative argument definitions; the actual
//! work happens in `main`.

use clap::Parser;
use std::path::PathBuf;

/// Source a shell script and print the variables it set.
///
/// The script runs inside its own interpreter; its variable state is
/// captured afterwards, so assignments, exports, and sourced files all
/// count. The script's exit status is reported as data, never as this
/// command's exit status.
#[derive(Parser, Debug)]
#[command(name = "shellvars")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Script to source.
    pub script: PathBuf,

    /// Arguments passed to the script (after `--`).
    #[arg(last = true)]
    pub args: Vec<String>,

    /// Interpreter command line, e.g. "bash" or "/bin/zsh -f".
    ///
    /// Defaults to the script's shebang line, then "sh".
    #[arg(short, long)]
    pub shell: Option<String>,

    /// Print only this variable; repeatable. Default is everything observed.
    #[arg(short = 'v', long = "var", value_name = "NAME")]
    pub variables: Vec<String>,

    /// Skip shell-local variables; report only the process environment.
    #[arg(long)]
    pub ignore_locals: bool,

    /// YAML dialect profile for a shell the builtin registry does not know.
    #[arg(long, value_name = "FILE")]
    pub dialect_config: Option<PathBuf>,

    /// Kill the interpreter after this many seconds.
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Redirect the script's own stdout to this file.
    #[arg(long, value_name = "FILE")]
    pub redirect_stdout: Option<PathBuf>,

    /// Emit a JSON object with the variables and the script's exit code.
    #[arg(long)]
    pub json: bool,

    /// Print the script's exit code on the last output line.
    #[arg(long, conflicts_with = "json")]
    pub print_exit_code: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
