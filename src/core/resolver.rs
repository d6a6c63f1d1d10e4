use crate::utils::error::{ConvertError, Result};
use crate::utils::validation::has_extension;
use std::fs;
use std::path::{Path, PathBuf};

pub const INPUT_EXTENSION: &str = "jp2";

/// Expands the input argument into the list of `.jp2` files to process.
///
/// A file must carry the `.jp2` extension (any case). A directory contributes its
/// immediate `.jp2` entries, sorted by path; subdirectories are not searched.
pub fn resolve_inputs(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        if !has_extension(input, INPUT_EXTENSION) {
            return Err(ConvertError::NotJp2 {
                path: input.to_path_buf(),
            });
        }
        return Ok(vec![input.to_path_buf()]);
    }

    if input.is_dir() {
        let mut files = Vec::new();
        for entry in fs::read_dir(input)? {
            let path = entry?.path();
            if path.is_file() && has_extension(&path, INPUT_EXTENSION) {
                files.push(path);
            }
        }

        if files.is_empty() {
            return Err(ConvertError::NoInputFiles {
                dir: input.to_path_buf(),
            });
        }

        files.sort();
        tracing::debug!("Found {} .jp2 files in {}", files.len(), input.display());
        return Ok(files);
    }

    Err(ConvertError::InputNotFound {
        path: input.to_path_buf(),
    })
}
