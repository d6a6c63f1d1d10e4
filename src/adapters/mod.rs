// Concrete implementations of the domain ports for external systems.

pub mod gdal_backend;
pub mod storage;

pub use gdal_backend::{GdalBackend, GdalDataset};
pub use storage::LocalStorage;
