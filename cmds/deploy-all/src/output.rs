//! Console output for a deployment run.

use std::{
	fmt,
	io::{IsTerminal, Write},
};

use clap::ValueEnum;
use colored::Colorize;

use crate::runner::ExternalCommand;

/// When to color console output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorMode {
	/// Color when stdout is a terminal and `NO_COLOR` is unset.
	#[default]
	Auto,

	/// Always emit ANSI colors.
	Always,

	/// Never emit ANSI colors.
	Never,
}

impl fmt::Display for ColorMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ColorMode::Auto => write!(f, "auto"),
			ColorMode::Always => write!(f, "always"),
			ColorMode::Never => write!(f, "never"),
		}
	}
}

impl ColorMode {
	/// Decide whether to color, and align `colored`'s global switch with it.
	pub fn apply(self) -> bool {
		let enabled = match self {
			ColorMode::Always => true,
			ColorMode::Never => false,
			ColorMode::Auto => {
				std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
			}
		};
		colored::control::set_override(enabled);
		enabled
	}
}

/// Writes the human-facing progress lines of a run.
///
/// Everything is flushed eagerly: child processes share the same terminal, and
/// their output must land after the line that announced them.
pub struct Console<W> {
	writer: W,
	color: bool,
}

impl<W: Write> Console<W> {
	pub fn new(writer: W, color: bool) -> Self {
		Self { writer, color }
	}

	/// Green phase header preceded by a blank line.
	pub fn phase(&mut self, title: &str) -> std::io::Result<()> {
		let line = self.paint(title, |s| s.bold().green().to_string());
		self.line(&format!("\n{line}"))
	}

	/// Echo of a command about to run.
	pub fn command(&mut self, command: &ExternalCommand) -> std::io::Result<()> {
		let line = self.paint(&format!("$ {command}"), |s| s.bold().blue().to_string());
		self.line(&line)
	}

	/// Notice for a command that failed.
	pub fn failure(&mut self, command: &ExternalCommand) -> std::io::Result<()> {
		let line = self.paint(&format!("Command failed: {command}"), |s| {
			s.bold().red().to_string()
		});
		self.line(&line)
	}

	/// Heading above the pod listing of one namespace.
	pub fn namespace(&mut self, namespace: &str) -> std::io::Result<()> {
		self.line(&format!("\nPods in namespace {namespace}:"))
	}

	pub fn into_inner(self) -> W {
		self.writer
	}

	fn paint(&self, text: &str, style: impl FnOnce(&str) -> String) -> String {
		if self.color {
			style(text)
		} else {
			text.to_string()
		}
	}

	fn line(&mut self, line: &str) -> std::io::Result<()> {
		writeln!(self.writer, "{line}")?;
		self.writer.flush()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn plain() -> Console<Vec<u8>> {
		Console::new(Vec::new(), false)
	}

	fn text(console: Console<Vec<u8>>) -> String {
		String::from_utf8(console.into_inner()).unwrap()
	}

	#[test]
	fn test_plain_lines() {
		let mut console = plain();
		let cmd = ExternalCommand::apply("kubectl", "apps/grafana.yaml");

		console.phase("Applying apps...").unwrap();
		console.command(&cmd).unwrap();
		console.failure(&cmd).unwrap();
		console.namespace("monitoring").unwrap();

		assert_eq!(
			text(console),
			indoc::indoc! {"

				Applying apps...
				$ kubectl apply -f apps/grafana.yaml
				Command failed: kubectl apply -f apps/grafana.yaml

				Pods in namespace monitoring:
			"}
		);
	}

	#[test]
	fn test_never_has_no_escapes() {
		let mut console = plain();
		console.phase("All manifests applied!").unwrap();
		assert!(!text(console).contains('\x1b'));
	}

	#[test]
	fn test_colored_failure_is_red() {
		colored::control::set_override(true);
		let mut console = Console::new(Vec::new(), true);
		console
			.failure(&ExternalCommand::get_pods("kubectl", "argocd"))
			.unwrap();

		let out = text(console);
		// bold + red
		assert!(out.contains("\x1b[1;31m"), "{out:?}");
		assert!(out.contains("Command failed: kubectl get pods -n argocd"));
	}

	#[test]
	fn test_color_mode_display_matches_value_enum() {
		for mode in ColorMode::value_variants() {
			let parsed = ColorMode::from_str(&mode.to_string(), false).unwrap();
			assert_eq!(parsed, *mode);
		}
	}
}
