use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::mpsc;
use std::time::Duration;

use clap::Parser;
use owo_colors::OwoColorize;
use solder_cli::OutputFormat;
use solder_cli::SolderCli;
use solder_core::BuildKind;
use solder_core::CompileOptions;
use solder_core::CompileReport;
use solder_core::Severity;
use solder_core::SolderConfig;
use solder_core::SolderError;
use solder_core::compile_plugin;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = SolderCli::parse();

	// Respect NO_COLOR, the --no-color flag, and non-terminal stdout.
	let use_color = !args.no_color
		&& std::env::var_os("NO_COLOR").is_none()
		&& supports_color::on(supports_color::Stream::Stdout).is_some();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = if args.watch {
		run_watch(&args)
	} else {
		run_compile(&args).map(|_| ())
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<SolderError>() {
			Ok(solder_err) => {
				let report: miette::Report = (*solder_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(1);
	}
}

/// Route diagnostics from the core library to stderr. `RUST_LOG` overrides
/// the level when set.
fn init_tracing(verbose: bool) {
	let default_filter = if verbose {
		"warn,solder_core=debug"
	} else {
		"warn"
	};
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(false)
		.without_time()
		.with_writer(std::io::stderr)
		.init();
}

fn resolve_root(args: &SolderCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Merge command line flags, `solder.toml` values, and built-in defaults
/// into compile options. Flags win over config, config wins over defaults.
fn build_options(args: &SolderCli) -> Result<CompileOptions, Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config = SolderConfig::load(&root)?.unwrap_or_default();

	let mut options = CompileOptions::new(&root);
	if let Some(main) = args.main.clone().or(config.main) {
		options.main_name = main;
	}
	if let Some(output) = args.output.clone().or(config.output) {
		options.output_name = output;
	}
	if let Some(info) = args.info.clone().or(config.info) {
		options.info_name = info;
	}
	options.build = args
		.build_kind()
		.or_else(|| config.build.as_deref().map(BuildKind::from_token))
		.unwrap_or_default();
	options.write = !args.dry_run;

	Ok(options)
}

fn run_compile(args: &SolderCli) -> Result<CompileReport, Box<dyn std::error::Error>> {
	let options = build_options(args)?;
	let report = compile_plugin(&options)?;

	match args.format {
		OutputFormat::Json => print_json_report(&report, &options.root),
		OutputFormat::Text => print_text_report(args, &report, &options.root),
	}

	Ok(report)
}

fn run_watch(args: &SolderCli) -> Result<(), Box<dyn std::error::Error>> {
	// Run the initial compilation. A missing main file is fatal even in
	// watch mode.
	run_compile(args)?;

	println!("\nWatching for file changes... (press Ctrl+C to stop)");

	let options = build_options(args)?;
	let root = options.root.clone();
	// The compiler writes the artifact and metadata file into the watched
	// tree; events for those files are dropped.
	let ignored = [options.output_name, options.info_name];
	let (tx, rx) = mpsc::channel();

	let mut watcher =
		notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
			if let Ok(event) = res {
				if matches!(
					event.kind,
					notify::EventKind::Modify(_) | notify::EventKind::Create(_)
				) && event.paths.iter().any(|path| !is_ignored(path, &ignored))
				{
					let _ = tx.send(());
				}
			}
		})?;

	use notify::Watcher;
	watcher.watch(&root, notify::RecursiveMode::Recursive)?;

	loop {
		rx.recv()?;
		// Debounce: drain additional events within 200ms.
		while rx.recv_timeout(Duration::from_millis(200)).is_ok() {}

		println!("\nFile change detected, compiling...");
		if let Err(e) = run_compile(args) {
			eprintln!("{} {e}", colored!("error:", red));
		}
	}
}

/// Whether a watch event path refers to a file the compiler itself writes.
fn is_ignored(path: &Path, ignored: &[String]) -> bool {
	path.file_name()
		.and_then(|name| name.to_str())
		.is_some_and(|name| ignored.iter().any(|skip| skip == name))
}

fn print_text_report(args: &SolderCli, report: &CompileReport, root: &Path) {
	for diagnostic in &report.diagnostics {
		let severity = diagnostic.severity();
		if severity == Severity::Note && !args.verbose {
			continue;
		}

		let label = match severity {
			Severity::Error => colored!("error:", red),
			Severity::Warning => colored!("warning:", yellow),
			Severity::Note => colored!("note:", bold),
		};
		let rel = make_relative(&diagnostic.file, root);
		eprintln!(
			"{label} [{rel}:{}] {}",
			diagnostic.line,
			diagnostic.message()
		);
	}

	// A failed metadata update is reported as an error but never stops
	// the build.
	if let Some(reason) = &report.metadata_error {
		eprintln!("{} {reason}", colored!("error:", red));
	}

	if let Some(metadata) = &report.metadata {
		if let Some(id) = &metadata.generated_id {
			println!("Assigned plugin id {id}");
		}
		if let Some(change) = &metadata.version_change {
			let line = format!(
				"{} {} -> {}",
				colored!("BuildVersion", bold),
				change.old,
				change.new
			);
			if metadata.persisted {
				println!("{line}");
			} else {
				println!("{line} (preview)");
			}
		}
	}

	let rel_output = make_relative(&report.output_path, root);
	if report.written {
		println!(
			"{} {rel_output} ({} include(s), {} asset(s))",
			colored!("Compiled", green),
			report.include_count,
			report.asset_count
		);
	} else {
		println!(
			"Dry run: would write {rel_output} ({} include(s), {} asset(s))",
			report.include_count, report.asset_count
		);
	}

	let errors = report.count_by_severity(Severity::Error);
	let warnings = report.count_by_severity(Severity::Warning);
	if errors > 0 || warnings > 0 {
		eprintln!("{errors} error(s), {warnings} warning(s)");
	}
}

fn print_json_report(report: &CompileReport, root: &Path) {
	let diagnostics: Vec<serde_json::Value> = report
		.diagnostics
		.iter()
		.map(|diagnostic| {
			let rel = make_relative(&diagnostic.file, root);
			serde_json::json!({
				"file": rel,
				"line": diagnostic.line,
				"severity": diagnostic.severity(),
				"message": diagnostic.message(),
			})
		})
		.collect();

	let metadata = report.metadata.as_ref().map(|metadata| {
		serde_json::json!({
			"generated_id": metadata.generated_id,
			"version_change": metadata.version_change,
			"persisted": metadata.persisted,
		})
	});

	let output = serde_json::json!({
		"ok": report.is_clean(),
		"output": make_relative(&report.output_path, root),
		"written": report.written,
		"include_count": report.include_count,
		"asset_count": report.asset_count,
		"diagnostics": diagnostics,
		"metadata": metadata,
		"metadata_error": report.metadata_error,
	});
	println!("{output}");
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
