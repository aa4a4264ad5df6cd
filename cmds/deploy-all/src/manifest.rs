//! Manifest discovery.
//!
//! A manifest directory is scanned non-recursively. Files are grouped by
//! extension in [`MANIFEST_EXTENSIONS`] order, each group sorted on its own,
//! and the groups concatenated. Matching is case-sensitive, so `a.YML` is not
//! a manifest.

use std::{
	fs, io,
	path::{Path, PathBuf},
};

use tracing::{debug, trace};

use crate::error::DeployError;

/// Recognized manifest extensions, in the order their batches are applied.
pub const MANIFEST_EXTENSIONS: &[&str] = &["yml", "yaml"];

/// Collect the manifests of `dir` in apply order.
///
/// A missing directory, or a path that is not a directory, yields no
/// manifests.
pub fn collect_manifests(dir: &Path) -> Result<Vec<PathBuf>, DeployError> {
	let read_dir_error = |source| DeployError::ReadDir {
		dir: dir.to_path_buf(),
		source,
	};

	if !dir.is_dir() {
		debug!(dir = %dir.display(), "manifest directory does not exist, skipping");
		return Ok(Vec::new());
	}

	let entries = match fs::read_dir(dir) {
		Ok(entries) => entries,
		// Removed between the check and the read
		Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
		Err(e) => return Err(read_dir_error(e)),
	};

	let mut files = Vec::new();
	for entry in entries {
		let path = entry.map_err(read_dir_error)?.path();
		// Follows symlinks, so a link to a manifest still counts
		if path.is_file() {
			files.push(path);
		} else {
			trace!(path = %path.display(), "skipping non-file entry");
		}
	}

	let mut manifests = Vec::with_capacity(files.len());
	for ext in MANIFEST_EXTENSIONS {
		let mut batch: Vec<PathBuf> = files
			.iter()
			.filter(|path| has_extension(path, ext))
			.cloned()
			.collect();
		batch.sort();
		manifests.extend(batch);
	}

	debug!(dir = %dir.display(), count = manifests.len(), "collected manifests");
	Ok(manifests)
}

/// Whether the file name ends in `.{ext}`, compared byte for byte.
///
/// Works on the raw name rather than [`Path::extension`] so that a bare `.yml`
/// file matches the same way a `*.yml` glob would, and names that are not
/// valid UTF-8 are still considered.
fn has_extension(path: &Path, ext: &str) -> bool {
	let Some(name) = path.file_name() else {
		return false;
	};
	name.as_encoded_bytes()
		.strip_suffix(ext.as_bytes())
		.is_some_and(|stem| stem.ends_with(b"."))
}
