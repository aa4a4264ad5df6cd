//! Configuration for deploy-all
//!
//! Without any configuration the tool applies `namespaces/` then `apps/` under
//! the root directory and lists pods in a fixed set of namespaces. A
//! `.deploy-config.yaml` file, searched from the root directory upward, can
//! override these defaults. Command line flags override the file.

use std::{
	fs,
	path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

/// The name of the config file deploy-all looks for
pub const CONFIG_FILE_NAME: &str = ".deploy-config.yaml";

/// Namespaces whose pods are listed after a successful apply, in query order.
pub const DEFAULT_STATUS_NAMESPACES: &[&str] = &["monitoring", "spam2000", "argocd"];

pub const DEFAULT_NAMESPACES_DIR: &str = "namespaces";
pub const DEFAULT_APPS_DIR: &str = "apps";
pub const DEFAULT_KUBECTL: &str = "kubectl";

/// Contents of `.deploy-config.yaml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigFile {
	/// Directory with namespace manifests, relative to the root
	#[serde(default)]
	pub namespaces_dir: Option<PathBuf>,

	/// Directory with application manifests, relative to the root
	#[serde(default)]
	pub apps_dir: Option<PathBuf>,

	/// Namespaces to list pods for
	#[serde(default)]
	pub status_namespaces: Option<Vec<String>>,

	/// Cluster CLI program
	#[serde(default)]
	pub kubectl: Option<String>,
}

impl ConfigFile {
	/// Load config from a specific file path
	pub fn load_from_file(path: &Path) -> Result<Self> {
		let content = fs::read_to_string(path)
			.with_context(|| format!("failed to read config file: {}", path.display()))?;
		// An empty file means "no overrides"
		if content.trim().is_empty() {
			return Ok(Self::default());
		}
		let config: ConfigFile = serde_yaml_with_quirks::from_str(&content)
			.with_context(|| format!("failed to parse config file: {}", path.display()))?;
		Ok(config)
	}

	/// Load config by searching from the given directory upward
	pub fn load_from_directory(start_dir: &Path) -> Result<Option<Self>> {
		find_config_file(start_dir)
			.map(|path| Self::load_from_file(&path))
			.transpose()
	}
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployConfig {
	pub root: PathBuf,
	pub namespaces_dir: PathBuf,
	pub apps_dir: PathBuf,
	pub status_namespaces: Vec<String>,
	pub kubectl: String,
}

impl DeployConfig {
	/// Built-in defaults rooted at `root`.
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self {
			root: root.into(),
			namespaces_dir: PathBuf::from(DEFAULT_NAMESPACES_DIR),
			apps_dir: PathBuf::from(DEFAULT_APPS_DIR),
			status_namespaces: DEFAULT_STATUS_NAMESPACES
				.iter()
				.map(|ns| ns.to_string())
				.collect(),
			kubectl: DEFAULT_KUBECTL.to_string(),
		}
	}

	/// Overlay the values the file sets.
	pub fn merge_from(&mut self, file: ConfigFile) {
		if let Some(dir) = file.namespaces_dir {
			self.namespaces_dir = dir;
		}
		if let Some(dir) = file.apps_dir {
			self.apps_dir = dir;
		}
		if let Some(namespaces) = file.status_namespaces {
			self.status_namespaces = namespaces;
		}
		if let Some(kubectl) = file.kubectl {
			self.kubectl = kubectl;
		}
	}

	/// Directory holding namespace manifests.
	pub fn namespaces_path(&self) -> PathBuf {
		self.root.join(&self.namespaces_dir)
	}

	/// Directory holding application manifests.
	pub fn apps_path(&self) -> PathBuf {
		self.root.join(&self.apps_dir)
	}
}

/// Search for a config file starting from `start_dir` and walking up to the filesystem root
pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
	let start = start_dir
		.canonicalize()
		.unwrap_or_else(|_| start_dir.to_path_buf());

	start
		.ancestors()
		.map(|dir| dir.join(CONFIG_FILE_NAME))
		.find(|path| path.is_file())
}
