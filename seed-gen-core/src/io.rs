use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::error::{Result, SeedError};

/// Opens a file for buffered reading and returns its size in bytes.
///
/// A missing file maps to `NotFound`, any other failure to `Io` with the path attached.
pub fn open_with_size<P: AsRef<Path>>(path: P) -> Result<(BufReader<File>, u64)> {
	let path = path.as_ref();
	let file = File::open(path).map_err(|e| SeedError::io(e, Some(path.to_path_buf())))?;
	let size = file
		.metadata()
		.map_err(|e| SeedError::io(e, Some(path.to_path_buf())))?
		.len();
	Ok((BufReader::new(file), size))
}

/// Creates (or truncates) a file for buffered writing.
pub fn create<P: AsRef<Path>>(path: P) -> Result<BufWriter<File>> {
	let path = path.as_ref();
	let file = File::create(path).map_err(|e| SeedError::io(e, Some(path.to_path_buf())))?;
	Ok(BufWriter::new(file))
}

/// Builds an output path based on an input path and a new extension.
///
/// Example:
/// `data/model.json` + `"bin"` → `data/model.bin`
pub fn build_output_path<P: AsRef<Path>>(input_path: P, output_extension: &str) -> Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path.file_stem().ok_or_else(|| {
		SeedError::InvalidArgument(format!("path has no file name: {}", input_path.display()))
	})?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}
