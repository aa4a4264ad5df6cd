//! Diagnostic logging setup.
//!
//! Console progress lines are written by [`crate::output`]; tracing events are
//! diagnostics and go to stderr only.

use std::io::IsTerminal;

use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Level used when neither `--log-level` nor `RUST_LOG` is given.
pub const DEFAULT_LEVEL: Level = Level::WARN;

/// Initialize tracing.
///
/// Priority for the log level:
/// 1. `log_level` argument (from the --log-level CLI flag)
/// 2. `RUST_LOG` environment variable
/// 3. [`DEFAULT_LEVEL`]
///
/// Pretty output when stderr is a terminal, JSON otherwise.
pub fn init(log_level: Option<Level>) {
	let filter_layer = match log_level {
		Some(level) => EnvFilter::new(level.as_str()),
		None => EnvFilter::builder()
			.with_default_directive(DEFAULT_LEVEL.into())
			.from_env_lossy(),
	};

	let fmt_layer = if std::io::stderr().is_terminal() {
		tracing_subscriber::fmt::layer()
			.with_writer(std::io::stderr)
			.pretty()
			.boxed()
	} else {
		tracing_subscriber::fmt::layer()
			.with_writer(std::io::stderr)
			.json()
			.boxed()
	};

	tracing_subscriber::registry()
		.with(filter_layer)
		.with(fmt_layer)
		.init();
}
