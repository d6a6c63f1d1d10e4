use crate::domain::model::GeoMetadata;
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::path::Path;

/// Writes `metadata` as indented JSON to `path`, replacing any existing file.
pub fn export_metadata<S: Storage>(storage: &S, metadata: &GeoMetadata, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(metadata)?;
    tracing::debug!("Writing {} bytes of metadata to {}", json.len(), path.display());
    storage.write_file(path, json.as_bytes())
}
