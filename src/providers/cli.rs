//! Vendor CLI command execution.
//!
//! Every provider call goes through a [`CommandRunner`]. [`ShellRunner`] spawns
//! the `aws`, `az` or `gcloud` tool; tests swap in a scripted runner.

use crate::error::{classify_failure, ProvisionError, Result};
use colored::Colorize;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::process::Command;
use std::sync::OnceLock;

/// Largest stdout accepted from a single command.
const MAX_OUTPUT_BYTES: usize = 5_000_000;

/// Regex for splitting command strings while preserving quoted substrings.
static COMMAND_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_command_regex() -> &'static Regex {
    COMMAND_REGEX.get_or_init(|| {
        Regex::new(r#"'([^']*)'\s*|\"([^\"]*)\"\s*|([^'\s]*)\s*"#).expect("Invalid Regex")
    })
}

/// Something that can execute a provider command line and return its stdout.
pub trait CommandRunner {
    fn run(&self, cmd: &str) -> Result<String>;
}

/// Runs commands as child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, cmd: &str) -> Result<String> {
        run(cmd)
    }
}

/// Run a command line and return its stdout.
///
/// The string is split on spaces with quoted substrings kept together. A
/// non-zero exit is mapped onto [`ProvisionError`] from the captured stderr.
pub fn run(cmd: &str) -> Result<String> {
    log::debug!("run({cmd})", cmd = cmd.on_blue());

    let cmds: Vec<&str> = split_and_strip(cmd);
    log::trace!("split cmds={:?}", cmds);
    let (program, args) = cmds
        .split_first()
        .ok_or_else(|| ProvisionError::Config("Empty command".to_string()))?;

    let output = Command::new(program).args(args).output().map_err(|e| {
        log::error!("Command execution failed: {}", e);
        ProvisionError::Transient(format!("Failed to execute {program}: {e}"))
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::trace!(
            "code={code:?}, status={status}\n┎######\nstderr=\n{stderr}\n┖######",
            code = output.status.code(),
            status = output.status,
            stderr = stderr.red()
        );
        log::warn!(
            "{failed} to run {cmd}",
            failed = "failed".on_red(),
            cmd = cmd.on_blue()
        );
        return Err(classify_failure(&stderr));
    }

    log::debug!("Success output.stdout.len(): {}", output.stdout.len());
    if output.stdout.len() > MAX_OUTPUT_BYTES {
        return Err(ProvisionError::Transient(format!(
            "Response too large: {} bytes for command: {:?}",
            output.stdout.len(),
            cmds
        )));
    }

    String::from_utf8(output.stdout)
        .map_err(|e| ProvisionError::Transient(format!("Invalid UTF-8 from {program}: {e}")))
}

/// Parse JSON output, reporting the path of the first field that failed.
pub fn parse_json<T: DeserializeOwned>(output: &str, what: &str) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_str(output);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        log::error!("OUTPUT START:\n\n{}\n\nOUTPUT END\n", output);
        ProvisionError::Json(format!("{what}: path={} error={}", e.path(), e))
    })
}

/// Wrap a value in single quotes so it survives [`split_and_strip`] as one argument.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', ""))
}

/// Split a command string on spaces, preserving quoted substrings.
fn split_and_strip(input: &str) -> Vec<&str> {
    get_command_regex()
        .find_iter(input)
        .map(|m| m.as_str().trim().trim_matches('\'').trim_matches('"'))
        .collect()
}
