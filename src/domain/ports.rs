use crate::domain::model::{GroundControlPoint, OutputFormat};
use crate::utils::error::Result;
use std::path::Path;

/// Read access to one open raster dataset.
///
/// The handle is released when the value is dropped.
pub trait RasterDataset {
    /// `(width, height)` in pixels.
    fn raster_size(&self) -> (usize, usize);
    fn band_count(&self) -> usize;
    /// Data type name of the band at `index` (1-based), if the band exists.
    fn band_type_name(&self, index: usize) -> Option<String>;
    /// `None` when the dataset carries no affine transform.
    fn geo_transform(&self) -> Option<[f64; 6]>;
    fn projection(&self) -> String;
    /// Names of all metadata domains, the default domain included as `""`.
    fn metadata_domains(&self) -> Vec<String>;
    /// Raw `KEY=VALUE` entries of a domain.
    fn metadata_domain(&self, domain: &str) -> Option<Vec<String>>;
    fn gcps(&self) -> Vec<GroundControlPoint>;
}

/// The raster library: opens datasets and transcodes them.
pub trait RasterBackend {
    type Dataset: RasterDataset;

    fn open(&self, path: &Path) -> Result<Self::Dataset>;

    /// Full copy of `source` into a new file at `target`, written by `format`'s driver.
    fn create_copy(
        &self,
        source: &Self::Dataset,
        format: OutputFormat,
        target: &Path,
        options: &[(String, String)],
    ) -> Result<()>;
}

pub trait Storage {
    fn write_file(&self, path: &Path, data: &[u8]) -> Result<()>;
}

pub trait ConfigProvider {
    fn format(&self) -> OutputFormat;
    fn output_folder(&self) -> Option<&Path>;
    fn jpeg_quality(&self) -> u8;
    fn keep_going(&self) -> bool;
}
