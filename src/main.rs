//! Entry point for the `shellvars` CLI: parse arguments, run the sourcing
//! pipeline, print the mapping, and map errors to exit codes.

mod cli;

use cli::Cli;
use shellvars::{ShellConfig, SourceRequest, exit_codes};
use std::process::ExitCode;
use std::time::Duration;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse_args();
    match run(cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn run(cli: Cli) -> shellvars::Result<()> {
    let mut request = SourceRequest::new(&cli.script)
        .args(cli.args)
        .ignore_locals(cli.ignore_locals);
    if let Some(shell) = cli.shell {
        request = request.shell(shell);
    }
    if !cli.variables.is_empty() {
        request = request.variables(cli.variables);
    }
    if let Some(path) = cli.dialect_config {
        request = request.shell_config(ShellConfig::load(path)?);
    }
    if let Some(seconds) = cli.timeout {
        request = request.timeout(Duration::from_secs(seconds));
    }
    if let Some(path) = cli.redirect_stdout {
        request = request.redirect_stdout_to(path);
    }

    let outcome = request.run()?;

    if cli.json {
        let envelope = serde_json::json!({
            "variables": outcome.variables,
            "exit_code": outcome.exit_code,
        });
        println!("{:#}", envelope);
    } else {
        for (name, value) in &outcome.variables {
            println!("{}={}", name, value);
        }
        if cli.print_exit_code {
            println!("{}", outcome.exit_code);
        }
    }
    Ok(())
}
