use std::path::Path;

/// First sixteen bytes of a real PNG file, enough to exercise binary-safe
/// encoding without shipping a full image.
pub const PNG_BYTES: &[u8] = &[
	0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
	0x52,
];

/// Standard base64 of [`PNG_BYTES`].
pub const PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUg==";

/// Smallest well-formed SVG document, and its standard base64.
pub const SVG_BYTES: &[u8] = b"<svg/>";
pub const SVG_BASE64: &str = "PHN2Zy8+";

/// A metadata file carrying both rewrite targets: the id placeholder and a
/// quoted build version.
pub fn info_lua(version: &str) -> String {
	format!("Info = {{\n\tId = \"<guid>\",\n\tBuildVersion = \"{version}\",\n}}\n")
}

/// Write `content` under `root`, creating intermediate directories for
/// nested relative paths.
pub fn write_file(root: &Path, relative: &str, content: impl AsRef<[u8]>) {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("create_dir_all: {e}"));
	}
	std::fs::write(path, content).unwrap_or_else(|e| panic!("write: {e}"));
}
