//! External command execution.
//!
//! Commands are run directly rather than through a shell, with stdio
//! inherited so the cluster CLI's own output reaches the terminal untouched.

use std::{
	ffi::OsString,
	fmt,
	process::{Command, ExitStatus},
};

use tracing::{info, instrument};

use crate::error::DeployError;

/// A program together with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
	pub program: OsString,
	pub args: Vec<OsString>,
}

impl ExternalCommand {
	pub fn new(program: impl Into<OsString>) -> Self {
		Self {
			program: program.into(),
			args: Vec::new(),
		}
	}

	pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
		self.args.push(arg.into());
		self
	}

	/// `kubectl apply -f <manifest>`
	pub fn apply(kubectl: impl Into<OsString>, manifest: impl Into<OsString>) -> Self {
		Self::new(kubectl).arg("apply").arg("-f").arg(manifest)
	}

	/// `kubectl get pods -n <namespace>`
	pub fn get_pods(kubectl: impl Into<OsString>, namespace: &str) -> Self {
		Self::new(kubectl)
			.arg("get")
			.arg("pods")
			.arg("-n")
			.arg(namespace)
	}
}

impl fmt::Display for ExternalCommand {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.program.to_string_lossy())?;
		for arg in &self.args {
			write!(f, " {}", arg.to_string_lossy())?;
		}
		Ok(())
	}
}

/// How a finished command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
	Success,
	Failed(i32),
}

impl CommandStatus {
	pub fn from_exit_status(status: ExitStatus) -> Self {
		if status.success() {
			return CommandStatus::Success;
		}
		match status.code() {
			Some(code) => CommandStatus::Failed(code),
			None => CommandStatus::Failed(signal_exit_code(status)),
		}
	}
}

/// Shell convention for a child terminated by a signal.
#[cfg(unix)]
fn signal_exit_code(status: ExitStatus) -> i32 {
	use std::os::unix::process::ExitStatusExt;

	status.signal().map_or(1, |signal| 128 + signal)
}

#[cfg(not(unix))]
fn signal_exit_code(_status: ExitStatus) -> i32 {
	1
}

/// Runs external commands to completion.
pub trait CommandRunner {
	/// Run `command`, blocking until it exits.
	///
	/// An `Err` means the command could not be started at all.
	fn run(&mut self, command: &ExternalCommand) -> Result<CommandStatus, DeployError>;
}

/// Spawns real processes.
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
	#[instrument(skip_all, fields(command = %command))]
	fn run(&mut self, command: &ExternalCommand) -> Result<CommandStatus, DeployError> {
		info!("running command");
		let status = Command::new(&command.program)
			.args(&command.args)
			.status()
			.map_err(|source| DeployError::Spawn {
				command: command.to_string(),
				source,
			})?;
		Ok(CommandStatus::from_exit_status(status))
	}
}
