use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use crate::SolderError;
use crate::SolderResult;

/// Asset file extensions eligible for base64 inlining, matched
/// case-insensitively.
pub const SUPPORTED_ASSET_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "svg"];

/// A binary asset encoded for embedding into the compiled plugin.
#[derive(Debug, Clone)]
pub struct EncodedAsset {
	/// Standard base64 of the raw file bytes, without any data-URI framing.
	pub text: String,
	/// Size of the raw file in bytes.
	pub raw_len: usize,
}

impl EncodedAsset {
	/// Raw size in kilobytes, as reported in build output.
	pub fn kilobytes(&self) -> f64 {
		self.raw_len as f64 / 1024.0
	}
}

/// Returns true when the path carries one of the supported asset extensions.
pub fn is_supported_asset(path: &Path) -> bool {
	path.extension()
		.and_then(|extension| extension.to_str())
		.map(str::to_ascii_lowercase)
		.is_some_and(|extension| SUPPORTED_ASSET_EXTENSIONS.contains(&extension.as_str()))
}

/// Read an asset file and encode its bytes as standard base64.
///
/// All supported formats are treated identically: SVG text is encoded byte
/// for byte like the raster formats, with no MIME type or data-URI wrapper.
pub fn encode_asset(path: &Path) -> SolderResult<EncodedAsset> {
	if !is_supported_asset(path) {
		return Err(SolderError::UnsupportedAssetFormat {
			path: path.display().to_string(),
		});
	}

	let bytes = std::fs::read(path).map_err(|e| SolderError::AssetRead {
		path: path.display().to_string(),
		reason: e.to_string(),
	})?;

	let asset = EncodedAsset {
		text: STANDARD.encode(&bytes),
		raw_len: bytes.len(),
	};

	debug!(
		"encoded asset `{}` ({:.2} KB)",
		path.display(),
		asset.kilobytes()
	);

	Ok(asset)
}
