use std::ffi::OsString;
use std::io::{Read, Write};
use std::process::ExitCode;

use anyhow::Context as _;
use clap::error::ErrorKind;
use clap::{CommandFactory, FromArgMatches, Parser};

use crate::dispatch::{Command, Dispatcher, ExitStatus, write_error};
use crate::error::PluginError;
use crate::keys::{Environment, ProcessEnvironment};
use crate::logging;
use crate::metadata::PluginMetadata;

#[derive(Debug, Parser)]
struct Cli {
    /// Plugin command to run; its request is read from stdin.
    #[arg(value_enum)]
    command: Command,
}

/// Entry point shared by the plugin binaries.
pub fn run(metadata: PluginMetadata) -> ExitCode {
    logging::init();

    let result = run_with(
        metadata,
        std::env::args_os(),
        std::io::stdin().lock(),
        &ProcessEnvironment,
        std::io::stdout().lock(),
        std::io::stderr().lock(),
    );
    match result {
        Ok(status) => status.into(),
        // Nothing reached the host; the streams themselves are broken.
        Err(error) => {
            tracing::error!("{error:#}");
            ExitStatus::Failure.into()
        }
    }
}

/// Parses `args` and runs the selected command against the given streams.
///
/// `--help` and `--version` print to `stdout` and succeed. Any other argument
/// error is reported to `stderr` as a generic error document.
pub fn run_with<I, T>(
    metadata: PluginMetadata,
    args: I,
    input: impl Read,
    env: &dyn Environment,
    mut stdout: impl Write,
    mut stderr: impl Write,
) -> anyhow::Result<ExitStatus>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = Cli::command()
        .name(metadata.name)
        .version(metadata.version)
        .about(metadata.description)
        .try_get_matches_from(args);

    let cli = match matches.and_then(|matches| Cli::from_arg_matches(&matches)) {
        Ok(cli) => cli,
        Err(error) if matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            write!(stdout, "{}", error.render()).context("failed to write help")?;
            return Ok(ExitStatus::Success);
        }
        Err(error) => {
            let usage = PluginError::Usage(usage_message(&error));
            write_error(&mut stderr, usage.into()).context("failed to write error")?;
            return Ok(ExitStatus::Failure);
        }
    };

    Dispatcher::new(metadata)
        .run(cli.command, input, env, stdout, stderr)
        .context("failed to write response")
}

// First line of clap's rendering, without its `error: ` prefix.
fn usage_message(error: &clap::Error) -> String {
    let rendered = error.render().to_string();
    let line = rendered.lines().next().unwrap_or_default();
    line.strip_prefix("error: ").unwrap_or(line).to_string()
}
