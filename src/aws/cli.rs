//! AWS CLI command execution.
//!
//! Provides [`AwsCommand`] to build an `aws` invocation argument by argument
//! and [`run`] to execute it and collect stdout.

use colored::Colorize;
use std::error::Error;
use std::process::Command;

/// Refuse to buffer more than this much stdout from one command.
const MAX_OUTPUT_BYTES: usize = 16 * 1024 * 1024;

/// An `aws` command line. Arguments are passed to the process unsplit, so
/// values never need shell quoting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsCommand {
    args: Vec<String>,
}

impl AwsCommand {
    /// Start an `aws <service> <operation>` command.
    pub fn new(service: &str, operation: &str) -> Self {
        AwsCommand {
            args: vec![service.to_string(), operation.to_string()],
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// `--flag value`
    pub fn opt(self, flag: &str, value: impl Into<String>) -> Self {
        self.arg(format!("--{flag}")).arg(value)
    }

    /// `--flag value` when `value` is set.
    pub fn opt_some(self, flag: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.opt(flag, value),
            None => self,
        }
    }

    /// `--flag Cidr=a Cidr=b ...`, or nothing when `cidrs` is empty.
    pub fn cidr_entries(self, flag: &str, cidrs: &[String]) -> Self {
        if cidrs.is_empty() {
            return self;
        }
        cidrs
            .iter()
            .fold(self.arg(format!("--{flag}")), |cmd, cidr| {
                cmd.arg(format!("Cidr={cidr}"))
            })
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl std::fmt::Display for AwsCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "aws")?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Run an `aws` command and return its stdout.
///
/// # Returns
/// * `Ok(String)` - stdout on a zero exit status
/// * `Err` - if the process cannot start, exits non-zero, or prints too much
pub fn run(cmd: &AwsCommand) -> Result<String, Box<dyn Error>> {
    log::debug!("run({cmd})", cmd = cmd.to_string().on_blue());

    let output = Command::new("aws").args(cmd.args()).output().map_err(|e| {
        log::error!("Command execution failed: {}", e);
        format!("Failed to execute aws cli: {}", e)
    })?;

    if output.status.success() {
        log::debug!("Success output.stdout.len(): {}", output.stdout.len());
        if output.stdout.len() > MAX_OUTPUT_BYTES {
            return Err(format!(
                "Response too large: {} bytes for command: {cmd}",
                output.stdout.len()
            )
            .into());
        }
    } else {
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
            cmd = cmd.to_string().on_blue()
        );
        return Err(stderr.trim().to_string().into());
    }

    let stdout = String::from_utf8(output.stdout).map_err(|e| format!("Invalid UTF-8: {}", e))?;
    Ok(stdout)
}
