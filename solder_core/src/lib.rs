//! `solder_core` is the core library for the [solder](https://github.com/solder-lua/solder) plugin compiler. It turns a multi-file Lua plugin into a single distributable artifact by resolving comment-embedded directives: `#include` splices other source files in place (recursively, with cycle detection) and `#encode` inlines binary assets as base64 string literals. Alongside directive resolution it manages the plugin's metadata file, bumping the dotted `BuildVersion` field and stamping a generated identifier into the `<guid>` placeholder.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Plugin source directory
//!   -> Version manager (rewrites info.lua: BuildVersion bump + <guid> substitution)
//!   -> Directive scanner (tokenizes `--[[ #include "..." ]]` / `--[[ #encode "..." ]]` comments)
//!   -> Include resolver (recursive expansion, copy-on-branch cycle detection, marker comments)
//!   -> Encode resolver (base64 asset inlining over the fully expanded text)
//!   -> Artifact writer (single .plugin output file)
//! ```
//!
//! ## Modules
//!
//! - [`assets`]: base64 encoding of plugin assets (png, jpg, jpeg, svg).
//! - [`config`]: configuration loading from `solder.toml`, overriding the default file names.
//! - [`resolver`]: recursive directive resolution with diagnostics collected as data.
//!
//! ## Key Types
//!
//! - [`CompileOptions`]: file names, build kind, and source root for one compilation.
//! - [`CompileReport`]: the compiled artifact plus diagnostics and counts.
//! - [`CompileDiagnostic`]: one recoverable condition found during resolution, with file and line.
//! - [`Resolver`]: the directive rewriting engine.
//! - [`Version`] and [`BuildKind`]: loose dotted-version handling and the increment rules.
//! - [`SolderConfig`]: configuration loaded from `solder.toml`.
//!
//! ## Failure Model
//!
//! Per-directive problems never abort a build: a missing include becomes a
//! marker comment, a missing asset becomes a quoted placeholder, and each
//! produces a [`CompileDiagnostic`] in the report. Only a missing main file
//! (or an I/O failure writing the artifact) is fatal. A missing metadata
//! file is reported through [`CompileReport::metadata_error`] and the
//! compilation carries on.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use solder_core::BuildKind;
//! use solder_core::CompileOptions;
//! use solder_core::compile_plugin;
//!
//! let mut options = CompileOptions::new(Path::new("my-plugin"));
//! options.build = BuildKind::Minor;
//!
//! let report = compile_plugin(&options).unwrap();
//! for diagnostic in &report.diagnostics {
//!     eprintln!("{}: {}", diagnostic.file.display(), diagnostic.message());
//! }
//! println!(
//!     "compiled {} ({} includes, {} assets)",
//!     report.output_path.display(),
//!     report.include_count,
//!     report.asset_count
//! );
//! ```

pub use assets::*;
pub use compile::*;
pub use config::*;
pub use error::*;
pub use resolver::*;
pub use version::*;

pub mod assets;
mod compile;
pub mod config;
mod error;
pub mod resolver;
pub(crate) mod scanner;
mod version;

#[cfg(test)]
mod __fixtures;
