use crate::domain::model::OutputFormat;
use crate::domain::ports::RasterBackend;
use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// `<folder>/<input stem><ext>`, where `folder` is `output_folder` or the input's own folder.
pub fn output_image_path(input: &Path, output_folder: Option<&Path>, format: OutputFormat) -> PathBuf {
    let folder = match output_folder {
        Some(folder) => folder.to_path_buf(),
        None => input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    folder.join(format!("{}{}", stem, format.extension()))
}

/// The sidecar sits next to the image: `<image path>.json`.
pub fn sidecar_path(image: &Path) -> PathBuf {
    let mut name = image.as_os_str().to_os_string();
    name.push(".json");
    PathBuf::from(name)
}

/// Driver creation options for `format`. Only JPEG takes any.
pub fn creation_options(format: OutputFormat, jpeg_quality: u8) -> Vec<(String, String)> {
    match format {
        OutputFormat::Jpg => vec![("QUALITY".to_string(), jpeg_quality.to_string())],
        OutputFormat::Png | OutputFormat::Tiff => Vec::new(),
    }
}

/// Transcodes an open dataset into `target`, creating the target folder when absent.
pub fn convert_image<B: RasterBackend>(
    backend: &B,
    source: &B::Dataset,
    target: &Path,
    format: OutputFormat,
    jpeg_quality: u8,
) -> Result<()> {
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let options = creation_options(format, jpeg_quality);
    backend.create_copy(source, format, target, &options)
}
