// Core models and ports. Nothing here touches GDAL or the file system directly.

pub mod model;
pub mod ports;
