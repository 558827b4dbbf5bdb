use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

use crate::BuildKind;
use crate::MetadataUpdate;
use crate::Resolver;
use crate::SolderError;
use crate::SolderResult;
use crate::resolver::CompileDiagnostic;
use crate::resolver::Severity;
use crate::update_metadata;

/// Default main plugin file name.
pub const DEFAULT_MAIN_FILE: &str = "main.lua";
/// Default metadata file name.
pub const DEFAULT_INFO_FILE: &str = "info.lua";
/// Extension of the compiled artifact.
pub const PLUGIN_EXTENSION: &str = "plugin";

/// Options controlling a single plugin compilation.
#[derive(Debug, Clone)]
pub struct CompileOptions {
	/// Source directory that every directive path resolves against.
	pub root: PathBuf,
	/// Main plugin file name within `root`.
	pub main_name: String,
	/// Output artifact file name within `root`.
	pub output_name: String,
	/// Metadata file name within `root`.
	pub info_name: String,
	/// Which version component this build increments.
	pub build: BuildKind,
	/// When false, nothing touches the disk: the artifact stays in memory
	/// and the metadata file keeps its current contents.
	pub write: bool,
}

impl CompileOptions {
	/// Create options with the default file names for the given root.
	pub fn new(root: impl Into<PathBuf>) -> Self {
		let root = root.into();
		let output_name = default_output_name(&root);

		Self {
			root,
			main_name: DEFAULT_MAIN_FILE.to_string(),
			output_name,
			info_name: DEFAULT_INFO_FILE.to_string(),
			build: BuildKind::default(),
			write: true,
		}
	}
}

/// Default output file name: the root directory's base name with the
/// `.plugin` extension.
pub fn default_output_name(root: &Path) -> String {
	let stem = root
		.file_name()
		.and_then(|name| name.to_str())
		.unwrap_or("plugin");
	format!("{stem}.{PLUGIN_EXTENSION}")
}

/// Result of compiling a plugin.
#[derive(Debug, Serialize)]
pub struct CompileReport {
	/// Path of the output artifact.
	pub output_path: PathBuf,
	/// The compiled artifact text.
	pub artifact: String,
	/// Diagnostics collected while resolving directives.
	pub diagnostics: Vec<CompileDiagnostic>,
	/// Number of include directives expanded.
	pub include_count: usize,
	/// Number of assets inlined.
	pub asset_count: usize,
	/// Metadata update outcome, when the metadata file was readable.
	pub metadata: Option<MetadataUpdate>,
	/// Why the metadata update was skipped, when it failed.
	pub metadata_error: Option<String>,
	/// Whether the artifact was written to disk.
	pub written: bool,
}

impl CompileReport {
	/// Returns true when the metadata update succeeded and no
	/// error-severity diagnostics were produced.
	pub fn is_clean(&self) -> bool {
		self.metadata_error.is_none()
			&& self
				.diagnostics
				.iter()
				.all(|diagnostic| diagnostic.severity() != Severity::Error)
	}

	/// Count of diagnostics at the given severity.
	pub fn count_by_severity(&self, severity: Severity) -> usize {
		self.diagnostics
			.iter()
			.filter(|diagnostic| diagnostic.severity() == severity)
			.count()
	}
}

/// Compile a plugin: update its metadata, expand the directive tree rooted
/// at the main file, and write the artifact.
///
/// The ordering is fixed: metadata first, then includes, then a final
/// encode pass over the fully expanded text, so encode directives in the
/// main file are resolved exactly once. A missing main file is fatal; a
/// missing or unreadable metadata file is reported through the returned
/// report and compilation continues.
pub fn compile_plugin(options: &CompileOptions) -> SolderResult<CompileReport> {
	let main_path = options.root.join(&options.main_name);
	if !main_path.is_file() {
		return Err(SolderError::MainFileNotFound {
			path: main_path.display().to_string(),
		});
	}

	let info_path = options.root.join(&options.info_name);
	let (metadata, metadata_error) =
		match update_metadata(&info_path, options.build, options.write) {
			Ok(update) => (Some(update), None),
			Err(error) => (None, Some(error.to_string())),
		};

	let source = std::fs::read_to_string(&main_path)?;
	let canonical_main = std::fs::canonicalize(&main_path).unwrap_or_else(|_| main_path.clone());

	// The main file itself seeds the visited set, so a file including the
	// entry point counts as a cycle.
	let mut visited = HashSet::new();
	visited.insert(canonical_main);

	let mut resolver = Resolver::new(&options.root);
	let expanded = resolver.resolve_includes(&source, &main_path, &visited);
	let artifact = resolver.resolve_encodes(&expanded, &main_path);

	let output_path = options.root.join(&options.output_name);
	if options.write {
		std::fs::write(&output_path, &artifact)?;
	}

	let include_count = resolver.include_count();
	let asset_count = resolver.asset_count();
	debug!(
		"compiled `{}` ({include_count} include(s), {asset_count} asset(s))",
		output_path.display()
	);

	Ok(CompileReport {
		output_path,
		artifact,
		diagnostics: resolver.into_diagnostics(),
		include_count,
		asset_count,
		metadata,
		metadata_error,
		written: options.write,
	})
}
