use std::io::{Read, Write};

use clap::ValueEnum;
use rand_core::OsRng;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info_span};

use crate::commands;
use crate::error::{PluginError, RequestError};
use crate::keys::Environment;
use crate::metadata::PluginMetadata;

/// Commands the host may invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Command {
    GetMetadata,
    DescribeKey,
    GenerateSignature,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::GetMetadata => "get-metadata",
            Command::DescribeKey => "describe-key",
            Command::GenerateSignature => "generate-signature",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
}

impl ExitStatus {
    pub fn code(&self) -> u8 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Failure => 1,
        }
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        std::process::ExitCode::from(status.code())
    }
}

/// Routes a command to its handler and frames the result for the host.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher {
    metadata: PluginMetadata,
}

impl Dispatcher {
    pub fn new(metadata: PluginMetadata) -> Self {
        Self { metadata }
    }

    /// Runs `command` against the JSON in `input` and returns the encoded,
    /// newline-terminated response.
    ///
    /// `input` is not read for `get-metadata`.
    pub fn execute(
        &self,
        command: Command,
        input: impl Read,
        env: &dyn Environment,
    ) -> Result<Vec<u8>, PluginError> {
        match command {
            Command::GetMetadata => encode(&commands::get_metadata(&self.metadata)),
            Command::DescribeKey => encode(&commands::describe_key(decode(input)?)?),
            Command::GenerateSignature => {
                let request = decode(input)?;
                encode(&commands::generate_signature(request, env, &mut OsRng)?)
            }
        }
    }

    /// Executes `command` and writes the response to `stdout`, or the error
    /// document to `stderr`.
    ///
    /// Only a failure to write either stream is returned as `Err`.
    pub fn run(
        &self,
        command: Command,
        input: impl Read,
        env: &dyn Environment,
        mut stdout: impl Write,
        mut stderr: impl Write,
    ) -> std::io::Result<ExitStatus> {
        let span = info_span!("command", plugin = self.metadata.name, command = command.as_str());
        let _enter = span.enter();

        match self.execute(command, input, env) {
            Ok(response) => {
                stdout.write_all(&response)?;
                stdout.flush()?;
                Ok(ExitStatus::Success)
            }
            Err(error) => {
                debug!(error = %error, code = ?error.code(), "command failed");
                write_error(&mut stderr, error.into())?;
                Ok(ExitStatus::Failure)
            }
        }
    }
}

/// Writes `error` as a single JSON line.
pub fn write_error(mut out: impl Write, error: RequestError) -> std::io::Result<()> {
    let mut document = serde_json::to_vec(&error)?;
    document.push(b'\n');
    out.write_all(&document)?;
    out.flush()
}

fn decode<T: DeserializeOwned>(input: impl Read) -> Result<T, PluginError> {
    serde_json::from_reader(input).map_err(PluginError::Decode)
}

fn encode<T: Serialize>(response: &T) -> Result<Vec<u8>, PluginError> {
    let mut document = serde_json::to_vec(response).map_err(PluginError::Encode)?;
    document.push(b'\n');
    Ok(document)
}
