use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use crate::assets::encode_asset;
use crate::scanner::DirectiveKind;
use crate::scanner::DirectiveMatch;
use crate::scanner::scan_directives;

/// Comment marker opening an expanded include.
pub const INCLUDE_BEGIN: &str = "-- BEGIN INCLUDE";
/// Comment marker closing an expanded include.
pub const INCLUDE_END: &str = "-- END INCLUDE";
/// Comment marker substituted for an include whose file does not exist.
pub const INCLUDE_NOT_FOUND: &str = "-- INCLUDE NOT FOUND:";
/// Comment marker substituted for an include that could not be read.
pub const INCLUDE_FAILED: &str = "-- INCLUDE FAILED:";
/// Comment marker substituted for an include already on the active stack.
pub const INCLUDE_CIRCULAR: &str = "-- CIRCULAR INCLUDE SKIPPED:";
/// Placeholder text inside the quoted literal substituted for a missing
/// asset.
pub const ASSET_NOT_FOUND: &str = "ASSET NOT FOUND:";
/// Placeholder text inside the quoted literal substituted for an asset that
/// could not be encoded.
pub const ASSET_FAILED: &str = "ASSET ENCODE FAILED:";

/// The kind of diagnostic produced while resolving directives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DiagnosticKind {
	/// An included file does not exist.
	IncludeNotFound { path: String },
	/// An included file is already on the active inclusion stack.
	CircularInclude { path: String },
	/// An included file exists but could not be read.
	IncludeFailed { path: String, reason: String },
	/// An encoded asset does not exist.
	AssetNotFound { path: String },
	/// An asset exists but could not be encoded.
	AssetFailed { path: String, reason: String },
	/// An asset was successfully inlined. Carried so the size shows up in
	/// build output.
	AssetEncoded { path: String, kilobytes: f64 },
}

/// Severity of a compile diagnostic.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
	Note,
	Warning,
	Error,
}

/// A diagnostic produced during directive resolution.
///
/// Every recoverable condition (a missing include, a cycle, an asset that
/// will not encode) lands here instead of aborting the compilation; the
/// directive that caused it is replaced with a marker or placeholder and
/// the surrounding pass continues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileDiagnostic {
	/// The file where the directive was found.
	pub file: PathBuf,
	/// The kind of diagnostic.
	pub kind: DiagnosticKind,
	/// 1-indexed line number of the directive.
	pub line: usize,
}

impl CompileDiagnostic {
	/// Severity of this diagnostic. Missed lookups and cycles warn; failing
	/// to read or encode an existing file is an error. A successful inline
	/// is only a note.
	pub fn severity(&self) -> Severity {
		match &self.kind {
			DiagnosticKind::IncludeNotFound { .. }
			| DiagnosticKind::CircularInclude { .. }
			| DiagnosticKind::AssetNotFound { .. } => Severity::Warning,
			DiagnosticKind::IncludeFailed { .. } | DiagnosticKind::AssetFailed { .. } => {
				Severity::Error
			}
			DiagnosticKind::AssetEncoded { .. } => Severity::Note,
		}
	}

	/// Human-readable message for this diagnostic.
	pub fn message(&self) -> String {
		match &self.kind {
			DiagnosticKind::IncludeNotFound { path } => {
				format!("included file not found: `{path}`")
			}
			DiagnosticKind::CircularInclude { path } => {
				format!("circular include skipped: `{path}`")
			}
			DiagnosticKind::IncludeFailed { path, reason } => {
				format!("failed to include `{path}`: {reason}")
			}
			DiagnosticKind::AssetNotFound { path } => {
				format!("asset not found: `{path}`")
			}
			DiagnosticKind::AssetFailed { path, reason } => {
				format!("failed to encode `{path}`: {reason}")
			}
			DiagnosticKind::AssetEncoded { path, kilobytes } => {
				format!("encoded `{path}` ({kilobytes:.2} KB)")
			}
		}
	}
}

/// Rewrites include and encode directives in plugin source text.
///
/// A resolver is scoped to one compilation: it holds the top-level source
/// root that every relative path resolves against, at every inclusion
/// depth, and accumulates diagnostics across the whole directive tree.
#[derive(Debug)]
pub struct Resolver {
	/// Directory all directive paths resolve against.
	base_path: PathBuf,
	/// Diagnostics collected across all passes.
	diagnostics: Vec<CompileDiagnostic>,
	/// Number of include directives successfully expanded.
	include_count: usize,
	/// Number of assets successfully inlined.
	asset_count: usize,
}

impl Resolver {
	pub fn new(base_path: impl Into<PathBuf>) -> Self {
		Self {
			base_path: base_path.into(),
			diagnostics: vec![],
			include_count: 0,
			asset_count: 0,
		}
	}

	/// Diagnostics collected so far, in the order they were produced.
	pub fn diagnostics(&self) -> &[CompileDiagnostic] {
		&self.diagnostics
	}

	/// Consume the resolver, yielding its diagnostics.
	pub fn into_diagnostics(self) -> Vec<CompileDiagnostic> {
		self.diagnostics
	}

	/// Number of include directives successfully expanded.
	pub fn include_count(&self) -> usize {
		self.include_count
	}

	/// Number of assets successfully inlined.
	pub fn asset_count(&self) -> usize {
		self.asset_count
	}

	/// Expand every include directive in `text`, recursively resolving
	/// nested includes and then the encode directives inside each included
	/// file.
	///
	/// `source` names the file `text` came from (for diagnostics). `visited`
	/// holds the absolute paths already on the inclusion stack; each branch
	/// extends its own copy, so a shared file can be included from sibling
	/// branches while a true cycle collapses to a single marker comment.
	pub fn resolve_includes(
		&mut self,
		text: &str,
		source: &Path,
		visited: &HashSet<PathBuf>,
	) -> String {
		self.rewrite(text, DirectiveKind::Include, |resolver, matched| {
			resolver.expand_include(matched, source, visited)
		})
	}

	/// Replace every encode directive in `text` with a quoted base64 string
	/// literal, or a quoted placeholder when the asset cannot be inlined.
	pub fn resolve_encodes(&mut self, text: &str, source: &Path) -> String {
		self.rewrite(text, DirectiveKind::Encode, |resolver, matched| {
			resolver.inline_asset(matched, source)
		})
	}

	/// Replace all directives of one kind against a single stable scan of
	/// `text`. The output is assembled by splicing replacement strings
	/// between the original byte spans, so earlier substitutions never
	/// shift the spans of later ones.
	fn rewrite(
		&mut self,
		text: &str,
		kind: DirectiveKind,
		mut replace: impl FnMut(&mut Self, &DirectiveMatch) -> String,
	) -> String {
		let matches = scan_directives(text);
		let mut output = String::with_capacity(text.len());
		let mut last_end = 0;

		for matched in &matches {
			if matched.kind != kind {
				continue;
			}

			output.push_str(&text[last_end..matched.span.start]);
			output.push_str(&replace(self, matched));
			last_end = matched.span.end;
		}

		output.push_str(&text[last_end..]);
		output
	}

	fn expand_include(
		&mut self,
		matched: &DirectiveMatch,
		source: &Path,
		visited: &HashSet<PathBuf>,
	) -> String {
		let absolute = self.resolve_path(&matched.path);

		if visited.contains(&absolute) {
			warn!(
				"circular include of `{}` from `{}`",
				matched.path,
				source.display()
			);
			self.push_diagnostic(
				source,
				matched,
				DiagnosticKind::CircularInclude {
					path: matched.path.clone(),
				},
			);
			return format!("{INCLUDE_CIRCULAR} \"{}\"", matched.path);
		}

		let content = match std::fs::read_to_string(&absolute) {
			Ok(content) => content,
			Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
				warn!(
					"include `{}` referenced from `{}` not found",
					matched.path,
					source.display()
				);
				self.push_diagnostic(
					source,
					matched,
					DiagnosticKind::IncludeNotFound {
						path: matched.path.clone(),
					},
				);
				return format!("{INCLUDE_NOT_FOUND} \"{}\"", matched.path);
			}
			Err(error) => {
				self.push_diagnostic(
					source,
					matched,
					DiagnosticKind::IncludeFailed {
						path: matched.path.clone(),
						reason: error.to_string(),
					},
				);
				return format!("{INCLUDE_FAILED} \"{}\"", matched.path);
			}
		};

		let mut branch_visited = visited.clone();
		branch_visited.insert(absolute.clone());

		let expanded = self.resolve_includes(&content, &absolute, &branch_visited);
		let expanded = self.resolve_encodes(&expanded, &absolute);

		self.include_count += 1;
		debug!("included `{}` into `{}`", matched.path, source.display());

		let newline = if expanded.ends_with('\n') { "" } else { "\n" };
		format!(
			"{INCLUDE_BEGIN} \"{path}\"\n{expanded}{newline}{INCLUDE_END} \"{path}\"",
			path = matched.path,
		)
	}

	fn inline_asset(&mut self, matched: &DirectiveMatch, source: &Path) -> String {
		let absolute = self.resolve_path(&matched.path);

		if !absolute.is_file() {
			warn!(
				"asset `{}` referenced from `{}` not found",
				matched.path,
				source.display()
			);
			self.push_diagnostic(
				source,
				matched,
				DiagnosticKind::AssetNotFound {
					path: matched.path.clone(),
				},
			);
			return format!("\"{ASSET_NOT_FOUND} {}\"", matched.path);
		}

		match encode_asset(&absolute) {
			Ok(asset) => {
				self.asset_count += 1;
				self.push_diagnostic(
					source,
					matched,
					DiagnosticKind::AssetEncoded {
						path: matched.path.clone(),
						kilobytes: asset.kilobytes(),
					},
				);
				format!("\"{}\"", asset.text)
			}
			Err(error) => {
				self.push_diagnostic(
					source,
					matched,
					DiagnosticKind::AssetFailed {
						path: matched.path.clone(),
						reason: error.to_string(),
					},
				);
				format!("\"{ASSET_FAILED} {}\"", matched.path)
			}
		}
	}

	/// Resolve a directive path against the top-level source root.
	/// Resolution is flat: nested includes do not shift the base directory.
	/// The result is canonicalized when possible so visited-set membership
	/// is stable across `./`-style spellings of the same file.
	fn resolve_path(&self, relative: &str) -> PathBuf {
		let joined = self.base_path.join(relative);
		std::fs::canonicalize(&joined).unwrap_or(joined)
	}

	fn push_diagnostic(&mut self, source: &Path, matched: &DirectiveMatch, kind: DiagnosticKind) {
		self.diagnostics.push(CompileDiagnostic {
			file: source.to_path_buf(),
			kind,
			line: matched.line,
		});
	}
}
