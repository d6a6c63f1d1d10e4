pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::TomlConfig;

pub use adapters::{GdalBackend, LocalStorage};
pub use core::batch::BatchConverter;
pub use domain::model::{BatchSummary, ConversionRequest, GeoMetadata, GroundControlPoint, OutputFormat};
pub use utils::error::{ConvertError, Result};
