use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::Parser;
use deploy_all::{
	config::{ConfigFile, DeployConfig},
	deploy::Deployer,
	output::{ColorMode, Console},
	runner::ProcessRunner,
	telemetry,
};
use tracing::{debug, Level};

#[derive(Parser)]
#[command(name = "deploy-all")]
#[command(about = "Apply namespace and app manifests, then show pod status", long_about = None)]
#[command(version = env!("DEPLOY_ALL_VERSION"))]
struct Cli {
	/// Directory containing the manifest directories
	#[arg(long, default_value = ".")]
	root: PathBuf,

	/// Config file to use instead of searching for .deploy-config.yaml
	#[arg(long)]
	config: Option<PathBuf>,

	/// Cluster CLI program used for apply and status queries
	#[arg(long)]
	kubectl: Option<String>,

	/// Controls color in console output
	#[arg(long, default_value_t = ColorMode::Auto, value_enum)]
	color: ColorMode,

	/// Log level (possible values: error, warn, info, debug, trace)
	#[arg(long)]
	log_level: Option<Level>,
}

impl Cli {
	/// Defaults, then the config file, then flags.
	fn resolve_config(&self) -> Result<DeployConfig> {
		let mut config = DeployConfig::new(&self.root);

		let file = match &self.config {
			Some(path) => Some(ConfigFile::load_from_file(path)?),
			None => ConfigFile::load_from_directory(&self.root)
				.with_context(|| format!("loading config for {}", self.root.display()))?,
		};
		if let Some(file) = file {
			config.merge_from(file);
		}

		if let Some(kubectl) = &self.kubectl {
			config.kubectl.clone_from(kubectl);
		}
		Ok(config)
	}
}

fn main() -> Result<ExitCode> {
	let cli = Cli::parse();
	telemetry::init(cli.log_level);

	let config = cli.resolve_config()?;
	debug!(?config, "resolved configuration");

	let console = Console::new(std::io::stdout(), cli.color.apply());
	match Deployer::new(&config, ProcessRunner, console).run() {
		Ok(report) => {
			debug!(
				applied = report.applied.len(),
				queried = report.queried.len(),
				"deployment finished"
			);
			Ok(ExitCode::SUCCESS)
		}
		// The console already printed the failed command, mirror its exit code
		Err(e) if e.is_reported() => std::process::exit(e.exit_code()),
		Err(e) => Err(e.into()),
	}
}

#[cfg(test)]
mod tests {
	use std::fs;

	use clap::CommandFactory;
	use tempfile::TempDir;

	use super::*;

	#[test]
	fn test_cli_definition() {
		Cli::command().debug_assert();
	}

	#[test]
	fn test_no_arguments_uses_defaults() {
		let cli = Cli::try_parse_from(["deploy-all"]).unwrap();
		assert_eq!(cli.root, PathBuf::from("."));
		assert_eq!(cli.color, ColorMode::Auto);
		assert!(cli.log_level.is_none());
	}

	#[test]
	fn test_flags_override_config_file() {
		let temp = TempDir::new().unwrap();
		let config_path = temp.path().join("deploy.yaml");
		fs::write(&config_path, "kubectl: from-file\nappsDir: workloads\n").unwrap();

		let cli = Cli::try_parse_from([
			"deploy-all",
			"--root",
			temp.path().to_str().unwrap(),
			"--config",
			config_path.to_str().unwrap(),
			"--kubectl",
			"from-flag",
			"--log-level",
			"debug",
		])
		.unwrap();
		let config = cli.resolve_config().unwrap();

		assert_eq!(cli.log_level, Some(Level::DEBUG));
		assert_eq!(config.kubectl, "from-flag");
		assert_eq!(config.apps_path(), temp.path().join("workloads"));
	}

	#[test]
	fn test_config_file_is_discovered_from_root() {
		let temp = TempDir::new().unwrap();
		fs::write(
			temp.path().join(deploy_all::config::CONFIG_FILE_NAME),
			"statusNamespaces: [default]",
		)
		.unwrap();

		let cli = Cli::try_parse_from(["deploy-all", "--root", temp.path().to_str().unwrap()])
			.unwrap();
		let config = cli.resolve_config().unwrap();

		assert_eq!(config.status_namespaces, vec!["default"]);
		assert_eq!(config.kubectl, "kubectl");
	}

	#[test]
	fn test_missing_explicit_config_is_an_error() {
		let temp = TempDir::new().unwrap();
		let missing = temp.path().join("nope.yaml");
		let cli = Cli::try_parse_from(["deploy-all", "--config", missing.to_str().unwrap()])
			.unwrap();

		assert!(cli.resolve_config().is_err());
	}
}
