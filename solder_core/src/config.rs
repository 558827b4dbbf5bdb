use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::SolderError;
use crate::SolderResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 2] = ["solder.toml", ".solder.toml"];

/// Configuration loaded from a `solder.toml` file in the source directory.
///
/// ```toml
/// main = "init.lua"
/// output = "my-plugin.plugin"
/// info = "metadata.lua"
/// build = "ver_min"
/// ```
///
/// Every field is optional. Command line flags take precedence over config
/// values, which take precedence over the built-in defaults.
#[derive(Debug, Default, Deserialize)]
pub struct SolderConfig {
	/// Main plugin file name, relative to the source directory.
	#[serde(default)]
	pub main: Option<String>,
	/// Output artifact file name, relative to the source directory.
	#[serde(default)]
	pub output: Option<String>,
	/// Metadata file name, relative to the source directory.
	#[serde(default)]
	pub info: Option<String>,
	/// Default build token (`ver_maj`, `ver_min`, `ver_fix`, `ver_dev`)
	/// applied when no build kind is given on the command line.
	/// Unrecognized tokens fall back to `ver_dev`.
	#[serde(default)]
	pub build: Option<String>,
}

impl SolderConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> SolderResult<Option<SolderConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config: SolderConfig =
			toml::from_str(&content).map_err(|e| SolderError::ConfigParse(e.to_string()))?;

		Ok(Some(config))
	}
}
