use crate::domain::model::{GeoMetadata, MetadataMap};
use crate::domain::ports::RasterDataset;
use crate::utils::error::Result;
use std::collections::BTreeMap;
use std::path::Path;

/// What GDAL reports for a dataset without an affine transform.
pub const DEFAULT_GEO_TRANSFORM: [f64; 6] = [0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

const DEFAULT_DOMAIN: &str = "";

/// Splits `KEY=VALUE` entries on the first `=`.
///
/// Entries without `=` or with an empty key are dropped. A repeated key keeps its last value.
pub fn parse_metadata_entries<I, S>(entries: I) -> MetadataMap
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut map = MetadataMap::new();
    for entry in entries {
        if let Some((key, value)) = entry.as_ref().split_once('=') {
            if !key.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Collects dimensions, georeferencing, metadata domains and GCPs from an open dataset.
///
/// Values are passed through as reported; nothing is reprojected or validated.
pub fn extract_metadata<D: RasterDataset>(
    dataset: &D,
    input: &Path,
    output: &Path,
) -> Result<GeoMetadata> {
    let (width, height) = dataset.raster_size();
    let band_count = dataset.band_count();

    let data_type = if band_count > 0 {
        dataset.band_type_name(1).unwrap_or_default()
    } else {
        String::new()
    };

    let geo_transform = dataset.geo_transform().unwrap_or_else(|| {
        tracing::debug!("{} has no geotransform, using default", input.display());
        DEFAULT_GEO_TRANSFORM
    });

    let metadata = dataset
        .metadata_domain(DEFAULT_DOMAIN)
        .map(parse_metadata_entries)
        .unwrap_or_default();

    let mut metadata_domains = BTreeMap::new();
    for domain in dataset.metadata_domains() {
        if domain == DEFAULT_DOMAIN {
            continue;
        }
        let entries = dataset
            .metadata_domain(&domain)
            .map(parse_metadata_entries)
            .unwrap_or_default();
        metadata_domains.insert(domain, entries);
    }

    let gcps = dataset.gcps();
    if !gcps.is_empty() {
        tracing::debug!("{} reports {} GCPs", input.display(), gcps.len());
    }

    Ok(GeoMetadata {
        input_file: std::path::absolute(input)?,
        output_file: std::path::absolute(output)?,
        width,
        height,
        band_count,
        data_type,
        geo_transform,
        projection_wkt: dataset.projection(),
        metadata,
        metadata_domains,
        gcps,
    })
}
