use std::fmt::Display;
use std::ops::Range;
use std::path::Path;

use derive_more::Deref;
use derive_more::DerefMut;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::SolderError;
use crate::SolderResult;
use crate::scanner::memstr;

/// The placeholder token replaced with a freshly generated identifier.
pub const ID_PLACEHOLDER: &str = "<guid>";

/// The metadata field holding the plugin version.
pub const BUILD_VERSION_KEY: &str = "BuildVersion";

/// Versions are padded to this many components; longer versions keep their
/// extra components untouched.
pub const MINIMUM_VERSION_COMPONENTS: usize = 4;

/// Which version component a build increments.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildKind {
	/// `ver_maj`: increment the major component, zero everything after it.
	Major,
	/// `ver_min`: increment the minor component, zero fix and dev.
	Minor,
	/// `ver_fix`: increment the fix component, zero dev.
	Fix,
	/// `ver_dev`: increment the dev component only.
	#[default]
	Dev,
}

impl BuildKind {
	/// Parse a build token. Unrecognized tokens fall back to a dev build.
	pub fn from_token(token: &str) -> Self {
		match token {
			"ver_maj" => Self::Major,
			"ver_min" => Self::Minor,
			"ver_fix" => Self::Fix,
			_ => Self::Dev,
		}
	}

	/// The canonical command line token for this build kind.
	pub fn token(self) -> &'static str {
		match self {
			Self::Major => "ver_maj",
			Self::Minor => "ver_min",
			Self::Fix => "ver_fix",
			Self::Dev => "ver_dev",
		}
	}
}

/// A dotted plugin version.
///
/// Parsing is deliberately loose: components that are missing or fail to
/// parse become `0`, short versions are padded to four components, and
/// anything beyond the fourth component is carried through untouched. A
/// metadata file that says `1.2` or `1.2.3.4.5` keeps working.
#[derive(Clone, Debug, Default, Deref, DerefMut, Eq, PartialEq)]
pub struct Version(Vec<u64>);

impl Version {
	/// Parse a dotted version string.
	pub fn parse(raw: &str) -> Self {
		let mut components: Vec<u64> = raw
			.split('.')
			.map(|component| component.trim().parse().unwrap_or(0))
			.collect();

		while components.len() < MINIMUM_VERSION_COMPONENTS {
			components.push(0);
		}

		Self(components)
	}

	/// Apply a build kind increment to this version in place. Components
	/// past the dev slot are never touched.
	pub fn increment(&mut self, kind: BuildKind) {
		match kind {
			BuildKind::Major => {
				self.0[0] += 1;
				self.0[1] = 0;
				self.0[2] = 0;
				self.0[3] = 0;
			}
			BuildKind::Minor => {
				self.0[1] += 1;
				self.0[2] = 0;
				self.0[3] = 0;
			}
			BuildKind::Fix => {
				self.0[2] += 1;
				self.0[3] = 0;
			}
			BuildKind::Dev => {
				self.0[3] += 1;
			}
		}
	}
}

impl Display for Version {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let rendered = self
			.0
			.iter()
			.map(ToString::to_string)
			.collect::<Vec<_>>()
			.join(".");
		f.write_str(&rendered)
	}
}

/// Increment a dotted version string for the given build token. The token
/// is matched loosely; anything unrecognized counts as a dev build.
pub fn increment_version(raw: &str, token: &str) -> String {
	let mut version = Version::parse(raw);
	version.increment(BuildKind::from_token(token));
	version.to_string()
}

/// Old and new version strings from a metadata rewrite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionChange {
	pub old: String,
	pub new: String,
}

/// Outcome of rewriting the plugin metadata file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataUpdate {
	/// The metadata text after substitutions.
	pub text: String,
	/// The identifier generated for the `<guid>` placeholder, when one was
	/// present.
	pub generated_id: Option<String>,
	/// Old and new version strings, when a `BuildVersion` field was found.
	pub version_change: Option<VersionChange>,
	/// Whether the file was written back.
	pub persisted: bool,
}

/// Rewrite the plugin metadata file for a new build.
///
/// Replaces the first `<guid>` placeholder with a generated identifier and
/// bumps the `BuildVersion` field according to the build kind. The file is
/// written back only when something changed and `persist` is set; the final
/// text is returned either way, so dry runs can preview the substitutions.
/// A missing metadata file is an error for the caller to report; it does
/// not abort the surrounding compilation.
pub fn update_metadata(path: &Path, kind: BuildKind, persist: bool) -> SolderResult<MetadataUpdate> {
	let original = std::fs::read_to_string(path).map_err(|e| SolderError::MetadataRead {
		path: path.display().to_string(),
		reason: e.to_string(),
	})?;

	let mut text = original.clone();
	let mut generated_id = None;

	if text.contains(ID_PLACEHOLDER) {
		let id = Uuid::new_v4().to_string();
		text = text.replacen(ID_PLACEHOLDER, &id, 1);
		debug!("assigned plugin id {id}");
		generated_id = Some(id);
	}

	let version_change = match find_build_version(&text) {
		Some((range, old)) => {
			let mut version = Version::parse(&old);
			version.increment(kind);
			let new = version.to_string();
			text.replace_range(range, &new);
			debug!("bumped {BUILD_VERSION_KEY} {old} -> {new}");
			Some(VersionChange { old, new })
		}
		None => None,
	};

	let persisted = persist && text != original;
	if persisted {
		std::fs::write(path, &text)?;
	}

	Ok(MetadataUpdate {
		text,
		generated_id,
		version_change,
		persisted,
	})
}

/// Locate the first `BuildVersion = "<value>"` field, tolerating whitespace
/// around the `=`. Returns the byte range between the quotes and the value
/// text. Key occurrences that are not followed by a quoted assignment are
/// skipped.
fn find_build_version(text: &str) -> Option<(Range<usize>, String)> {
	let bytes = text.as_bytes();
	let mut search_from = 0;

	while let Some(offset) = memstr(&bytes[search_from..], BUILD_VERSION_KEY.as_bytes()) {
		let key_start = search_from + offset;
		search_from = key_start + BUILD_VERSION_KEY.len();

		let mut cursor = key_start + BUILD_VERSION_KEY.len();
		while bytes.get(cursor).is_some_and(u8::is_ascii_whitespace) {
			cursor += 1;
		}

		if bytes.get(cursor) != Some(&b'=') {
			continue;
		}
		cursor += 1;

		while bytes.get(cursor).is_some_and(u8::is_ascii_whitespace) {
			cursor += 1;
		}

		if bytes.get(cursor) != Some(&b'"') {
			continue;
		}
		let value_start = cursor + 1;

		let Some(len) = bytes[value_start..]
			.iter()
			.position(|&byte| byte == b'"' || byte == b'\n')
		else {
			continue;
		};

		if bytes[value_start + len] != b'"' {
			// Unterminated value; keep looking.
			continue;
		}

		let range = value_start..value_start + len;
		let value = text[range.clone()].to_string();
		return Some((range, value));
	}

	None
}
