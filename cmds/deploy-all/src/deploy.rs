//! Deployment run: apply namespaces, apply apps, report pods.
//!
//! Every external command runs to completion before the next one starts. The
//! first failure ends the run; nothing already applied is rolled back.

use std::{io::Write, path::Path};

use tracing::{debug, info, instrument};

use crate::{
	config::DeployConfig,
	error::DeployError,
	manifest::collect_manifests,
	output::Console,
	runner::{CommandRunner, CommandStatus, ExternalCommand},
};

/// What a successful run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployReport {
	/// Manifests applied, in order.
	pub applied: Vec<String>,
	/// Namespaces whose pods were listed, in order.
	pub queried: Vec<String>,
}

pub struct Deployer<'a, R, W> {
	config: &'a DeployConfig,
	runner: R,
	console: Console<W>,
	report: DeployReport,
}

impl<'a, R: CommandRunner, W: Write> Deployer<'a, R, W> {
	pub fn new(config: &'a DeployConfig, runner: R, console: Console<W>) -> Self {
		Self {
			config,
			runner,
			console,
			report: DeployReport::default(),
		}
	}

	/// Apply everything, then list pods.
	pub fn run(mut self) -> Result<DeployReport, DeployError> {
		self.apply_all()?;
		self.report_pods()?;
		Ok(self.report)
	}

	/// Apply the namespaces directory, then the apps directory.
	pub fn apply_all(&mut self) -> Result<(), DeployError> {
		let config = self.config;

		self.console.phase("Applying namespaces...")?;
		self.apply_manifests(&config.namespaces_path())?;

		self.console.phase("Applying apps...")?;
		self.apply_manifests(&config.apps_path())?;

		self.console.phase("All manifests applied!")?;
		Ok(())
	}

	/// Apply each manifest of `dir` in discovery order.
	#[instrument(skip_all, fields(dir = %dir.display()))]
	pub fn apply_manifests(&mut self, dir: &Path) -> Result<(), DeployError> {
		let config = self.config;
		for manifest in collect_manifests(dir)? {
			let command = ExternalCommand::apply(&config.kubectl, &manifest);
			self.execute(&command)?;
			self.report.applied.push(manifest.display().to_string());
		}
		Ok(())
	}

	/// List pods of every configured namespace.
	pub fn report_pods(&mut self) -> Result<(), DeployError> {
		let config = self.config;
		for namespace in &config.status_namespaces {
			self.console.namespace(namespace)?;
			let command = ExternalCommand::get_pods(&config.kubectl, namespace);
			self.execute(&command)?;
			self.report.queried.push(namespace.clone());
		}
		Ok(())
	}

	pub fn report(&self) -> &DeployReport {
		&self.report
	}

	pub fn into_console(self) -> Console<W> {
		self.console
	}

	/// Echo, run, and turn a non-zero exit into an error.
	fn execute(&mut self, command: &ExternalCommand) -> Result<(), DeployError> {
		self.console.command(command)?;
		let status = match self.runner.run(command) {
			Ok(status) => status,
			Err(e) => {
				info!(command = %command, error = %e, "command could not be started");
				self.notify_failure(command);
				return Err(e);
			}
		};
		if let CommandStatus::Failed(code) = status {
			info!(command = %command, code, "command failed");
			self.notify_failure(command);
			return Err(DeployError::CommandFailed {
				command: command.to_string(),
				code,
			});
		}
		Ok(())
	}

	/// The command's own error decides the exit code, so a console that can no
	/// longer be written to must not replace it.
	fn notify_failure(&mut self, command: &ExternalCommand) {
		if let Err(e) = self.console.failure(command) {
			debug!(error = %e, "failure notice could not be written");
		}
	}
}
