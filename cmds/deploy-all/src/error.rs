//! Errors raised while deploying manifests.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Exit code a shell reports when the program does not exist.
pub const EXIT_NOT_FOUND: i32 = 127;

/// Exit code a shell reports when the program exists but cannot be executed.
pub const EXIT_NOT_EXECUTABLE: i32 = 126;

/// Errors that abort a deployment run.
#[derive(Debug, Error)]
pub enum DeployError {
	#[error("command failed with exit code {code}: {command}")]
	CommandFailed { command: String, code: i32 },

	#[error("spawning {command}")]
	Spawn {
		command: String,
		#[source]
		source: io::Error,
	},

	#[error("reading manifest directory {}", dir.display())]
	ReadDir {
		dir: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error("writing console output")]
	Output(#[from] io::Error),
}

impl DeployError {
	/// Process exit code this error should terminate with.
	///
	/// A failed external command is mirrored exactly. A program that could not
	/// be started maps to the codes a shell would have returned for it.
	pub fn exit_code(&self) -> i32 {
		match self {
			DeployError::CommandFailed { code, .. } => *code,
			DeployError::Spawn { source, .. } if source.kind() == io::ErrorKind::NotFound => {
				EXIT_NOT_FOUND
			}
			DeployError::Spawn { .. } => EXIT_NOT_EXECUTABLE,
			DeployError::ReadDir { .. } | DeployError::Output(_) => 1,
		}
	}

	/// Whether the console already told the user about this failure.
	pub fn is_reported(&self) -> bool {
		matches!(
			self,
			DeployError::CommandFailed { .. } | DeployError::Spawn { .. }
		)
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	fn spawn_error(kind: io::ErrorKind) -> DeployError {
		DeployError::Spawn {
			command: "kubectl get pods -n argocd".to_string(),
			source: io::Error::new(kind, "spawn"),
		}
	}

	#[rstest]
	#[case::mirrors_failure(DeployError::CommandFailed { command: "kubectl apply -f a.yml".into(), code: 42 }, 42)]
	#[case::not_found(spawn_error(io::ErrorKind::NotFound), 127)]
	#[case::permission_denied(spawn_error(io::ErrorKind::PermissionDenied), 126)]
	#[case::read_dir(DeployError::ReadDir { dir: "apps".into(), source: io::Error::other("boom") }, 1)]
	fn test_exit_code(#[case] error: DeployError, #[case] expected: i32) {
		assert_eq!(error.exit_code(), expected);
	}

	#[test]
	fn test_only_command_errors_are_reported_on_console() {
		assert!(spawn_error(io::ErrorKind::NotFound).is_reported());
		assert!(!DeployError::Output(io::Error::other("closed")).is_reported());
	}
}
