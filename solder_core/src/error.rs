use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum SolderError {
	#[error(transparent)]
	#[diagnostic(code(solder::io_error))]
	Io(#[from] std::io::Error),

	#[error("main plugin file not found: `{path}`")]
	#[diagnostic(
		code(solder::main_file_not_found),
		help("pass `--main` or set `main` in solder.toml when the entry file is not named main.lua")
	)]
	MainFileNotFound { path: String },

	#[error("unsupported asset format: `{path}`")]
	#[diagnostic(
		code(solder::unsupported_asset_format),
		help("supported asset formats: png, jpg, jpeg, svg")
	)]
	UnsupportedAssetFormat { path: String },

	#[error("failed to read asset `{path}`: {reason}")]
	#[diagnostic(code(solder::asset_read))]
	AssetRead { path: String, reason: String },

	#[error("failed to read metadata file `{path}`: {reason}")]
	#[diagnostic(
		code(solder::metadata_read),
		help("pass `--info` or set `info` in solder.toml when the metadata file is not named info.lua")
	)]
	MetadataRead { path: String, reason: String },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(solder::config_parse),
		help("check that solder.toml is valid TOML; supported keys: main, output, info, build")
	)]
	ConfigParse(String),
}

pub type SolderResult<T> = Result<T, SolderError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
