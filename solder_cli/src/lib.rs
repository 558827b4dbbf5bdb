use std::path::PathBuf;

use clap::Parser;
use clap::ValueEnum;
use solder_core::BuildKind;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Bundle a multi-file Lua plugin into a single distributable artifact.",
	long_about = "solder bundles a multi-file Lua plugin into a single distributable artifact.\n\nInclude \
	              directives splice other plugin sources in place of the comment that names them, and \
	              encode directives inline binary assets as base64 string literals, so the shipped \
	              plugin is one self-contained file. Each build also rewrites the plugin metadata \
	              file: the dotted BuildVersion field is bumped and a `<guid>` placeholder is \
	              replaced with a generated identifier.\n\nQuick start:\n  solder              \
	              Compile the plugin in the current directory\n  solder ver_min      Compile and \
	              bump the minor version\n  solder --dry-run    Preview a build without writing \
	              files\n  solder --watch      Recompile whenever a source file changes"
)]
#[allow(clippy::struct_excessive_bools)]
pub struct SolderCli {
	/// Version component to bump, as a bare token.
	///
	/// Shorthand for `--build`: `solder ver_maj` and `solder --build ver_maj`
	/// are equivalent.
	#[arg(value_enum, value_name = "BUILD", conflicts_with = "build")]
	pub build_token: Option<BuildArg>,

	/// Version component to bump for this build.
	#[arg(long, value_enum, value_name = "BUILD")]
	pub build: Option<BuildArg>,

	/// Path to the plugin source directory.
	#[arg(long, short)]
	pub path: Option<PathBuf>,

	/// Main plugin file name within the source directory.
	#[arg(long, value_name = "NAME")]
	pub main: Option<String>,

	/// Output artifact file name within the source directory. Defaults to
	/// the directory's base name with a `.plugin` extension.
	#[arg(long, short, value_name = "NAME")]
	pub output: Option<String>,

	/// Metadata file name within the source directory.
	#[arg(long, value_name = "NAME")]
	pub info: Option<String>,

	/// Output format for the build report.
	#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
	pub format: OutputFormat,

	/// Preview the build without writing the artifact or metadata file.
	#[arg(long, default_value_t = false)]
	pub dry_run: bool,

	/// Watch the source directory and recompile on changes.
	#[arg(long, default_value_t = false)]
	pub watch: bool,

	/// Enable verbose output.
	#[arg(long, short, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, default_value_t = false)]
	pub no_color: bool,
}

impl SolderCli {
	/// The build kind given on the command line, from either the bare
	/// positional token or the `--build` flag.
	pub fn build_kind(&self) -> Option<BuildKind> {
		self.build_token.or(self.build).map(BuildKind::from)
	}
}

/// Build kinds as they are spelled on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BuildArg {
	/// Increment the major component and zero everything after it.
	#[value(name = "ver_maj", alias = "ver-maj")]
	Major,
	/// Increment the minor component; fix and dev reset to zero.
	#[value(name = "ver_min", alias = "ver-min")]
	Minor,
	/// Increment the fix component; dev resets to zero.
	#[value(name = "ver_fix", alias = "ver-fix")]
	Fix,
	/// Increment the dev counter only.
	#[value(name = "ver_dev", alias = "ver-dev")]
	Dev,
}

impl From<BuildArg> for BuildKind {
	fn from(arg: BuildArg) -> Self {
		match arg {
			BuildArg::Major => BuildKind::Major,
			BuildArg::Minor => BuildKind::Minor,
			BuildArg::Fix => BuildKind::Fix,
			BuildArg::Dev => BuildKind::Dev,
		}
	}
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption. The report includes the
	/// output path, directive counts, diagnostics, and the metadata update.
	Json,
}
