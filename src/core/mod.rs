pub mod batch;
pub mod converter;
pub mod exporter;
pub mod extractor;
pub mod resolver;

pub use crate::domain::model::{BatchSummary, ConversionRequest, GeoMetadata, OutputFormat};
pub use crate::domain::ports::{ConfigProvider, RasterBackend, RasterDataset, Storage};
pub use crate::utils::error::Result;
