use crate::domain::model::{GroundControlPoint, OutputFormat};
use crate::domain::ports::{RasterBackend, RasterDataset};
use crate::utils::error::{ConvertError, Result};
use gdal::raster::{GdalDataType, RasterCreationOption};
use gdal::{Dataset, DriverManager, Metadata};
use std::path::Path;
use std::sync::Once;

static REGISTER_DRIVERS: Once = Once::new();

/// GDAL-backed raster access.
///
/// Constructing the backend registers all GDAL drivers once per process; further
/// constructions are free.
#[derive(Debug, Clone, Copy)]
pub struct GdalBackend {
    _private: (),
}

impl GdalBackend {
    pub fn new() -> Self {
        REGISTER_DRIVERS.call_once(|| {
            DriverManager::register_all();
            tracing::debug!("Registered {} GDAL drivers", DriverManager::count());
        });
        Self { _private: () }
    }
}

impl Default for GdalBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Data type as GDAL's enum constant, e.g. `GDT_Byte`.
pub fn data_type_name(data_type: GdalDataType) -> String {
    format!("GDT_{}", data_type.name())
}

/// An open GDAL dataset. Dropping it closes the underlying handle.
pub struct GdalDataset {
    inner: Dataset,
}

impl RasterDataset for GdalDataset {
    fn raster_size(&self) -> (usize, usize) {
        self.inner.raster_size()
    }

    fn band_count(&self) -> usize {
        self.inner.raster_count() as usize
    }

    fn band_type_name(&self, index: usize) -> Option<String> {
        if index == 0 || index > self.band_count() {
            return None;
        }
        let band = self.inner.rasterband(index as _).ok()?;
        Some(data_type_name(band.band_type()))
    }

    fn geo_transform(&self) -> Option<[f64; 6]> {
        self.inner.geo_transform().ok()
    }

    fn projection(&self) -> String {
        self.inner.projection()
    }

    fn metadata_domains(&self) -> Vec<String> {
        self.inner.metadata_domains()
    }

    fn metadata_domain(&self, domain: &str) -> Option<Vec<String>> {
        self.inner.metadata_domain(domain)
    }

    fn gcps(&self) -> Vec<GroundControlPoint> {
        self.inner
            .gcps()
            .iter()
            .map(|gcp| GroundControlPoint {
                id: gcp.id(),
                info: gcp.info(),
                pixel: gcp.pixel(),
                line: gcp.line(),
                x: gcp.x(),
                y: gcp.y(),
                z: gcp.z(),
            })
            .collect()
    }
}

impl RasterBackend for GdalBackend {
    type Dataset = GdalDataset;

    fn open(&self, path: &Path) -> Result<GdalDataset> {
        Dataset::open(path)
            .map(|inner| GdalDataset { inner })
            .map_err(|e| ConvertError::OpenFailure {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    fn create_copy(
        &self,
        source: &GdalDataset,
        format: OutputFormat,
        target: &Path,
        options: &[(String, String)],
    ) -> Result<()> {
        let driver = DriverManager::get_driver_by_name(format.driver_name()).map_err(|_| {
            ConvertError::DriverNotFound {
                driver: format.driver_name().to_string(),
            }
        })?;

        let creation_options: Vec<RasterCreationOption> = options
            .iter()
            .map(|(key, value)| RasterCreationOption {
                key: key.as_str(),
                value: value.as_str(),
            })
            .collect();

        tracing::debug!(
            "CreateCopy with driver {} ({} creation options) -> {}",
            format.driver_name(),
            creation_options.len(),
            target.display()
        );

        // the copy is flushed and closed when the returned dataset drops
        let copy = source
            .inner
            .create_copy(&driver, target, &creation_options)
            .map_err(|e| ConvertError::ConversionFailure {
                path: target.to_path_buf(),
                reason: e.to_string(),
            })?;
        drop(copy);

        Ok(())
    }
}
