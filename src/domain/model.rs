use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::utils::error::ConvertError;

/// Target image format of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpg,
    Png,
    Tiff,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Jpg, OutputFormat::Png, OutputFormat::Tiff];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Jpg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::Tiff => "tiff",
        }
    }

    /// Extension of the converted image, including the dot. Tiff output is written as `.tif`.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpg => ".jpg",
            OutputFormat::Png => ".png",
            OutputFormat::Tiff => ".tif",
        }
    }

    /// Short name of the GDAL driver that writes this format.
    pub fn driver_name(&self) -> &'static str {
        match self {
            OutputFormat::Jpg => "JPEG",
            OutputFormat::Png => "PNG",
            OutputFormat::Tiff => "GTiff",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpg" => Ok(OutputFormat::Jpg),
            "png" => Ok(OutputFormat::Png),
            "tiff" => Ok(OutputFormat::Tiff),
            _ => Err(ConvertError::UnsupportedFormat {
                value: s.to_ascii_lowercase(),
            }),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// A fully parsed command line. Built once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub input: PathBuf,
    pub format: OutputFormat,
    pub output_folder: Option<PathBuf>,
    pub jpeg_quality: u8,
    pub keep_going: bool,
}

impl ConversionRequest {
    pub fn new(input: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            input: input.into(),
            format,
            output_folder: None,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            keep_going: false,
        }
    }

    pub fn with_output_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.output_folder = Some(folder.into());
        self
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    pub fn with_keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroundControlPoint {
    pub id: String,
    pub info: String,
    pub pixel: f64,
    pub line: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

pub type MetadataMap = BTreeMap<String, String>;

/// Geospatial description of one source raster, written as the JSON sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GeoMetadata {
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    pub width: usize,
    pub height: usize,
    pub band_count: usize,
    pub data_type: String,
    pub geo_transform: [f64; 6],
    pub projection_wkt: String,
    pub metadata: MetadataMap,
    pub metadata_domains: BTreeMap<String, MetadataMap>,
    pub gcps: Vec<GroundControlPoint>,
}

/// Paths written for one successfully converted input.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedFile {
    pub input: PathBuf,
    pub image: PathBuf,
    pub sidecar: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub converted: Vec<ConvertedFile>,
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.converted.len() + self.skipped.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.failed.is_empty()
    }

    pub fn contains_output(&self, image: &Path) -> bool {
        self.converted.iter().any(|c| c.image == image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing_is_case_insensitive() {
        assert_eq!("JPG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpg);
        assert_eq!("Png".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!("tiff".parse::<OutputFormat>().unwrap(), OutputFormat::Tiff);
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let err = "BMP".parse::<OutputFormat>().unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedFormat { ref value } if value == "bmp"));
        assert!("tif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_every_format_parses_from_its_name() {
        for format in OutputFormat::ALL {
            assert_eq!(format.as_str().parse::<OutputFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_tiff_uses_short_extension() {
        assert_eq!(OutputFormat::Tiff.extension(), ".tif");
        assert_eq!(OutputFormat::Jpg.extension(), ".jpg");
        assert_eq!(OutputFormat::Png.extension(), ".png");
    }

    #[test]
    fn test_request_defaults() {
        let request = ConversionRequest::new("ortho.jp2", OutputFormat::default());
        assert_eq!(request.format, OutputFormat::Jpg);
        assert_eq!(request.jpeg_quality, 90);
        assert!(request.output_folder.is_none());
        assert!(!request.keep_going);
    }

    #[test]
    fn test_sidecar_field_names() {
        let meta = GeoMetadata {
            input_file: PathBuf::from("/data/a.jp2"),
            output_file: PathBuf::from("/data/a.jpg"),
            width: 10,
            height: 20,
            band_count: 3,
            data_type: "GDT_Byte".to_string(),
            geo_transform: [0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            projection_wkt: String::new(),
            metadata: MetadataMap::new(),
            metadata_domains: BTreeMap::new(),
            gcps: vec![GroundControlPoint {
                id: "1".to_string(),
                info: String::new(),
                pixel: 0.5,
                line: 1.5,
                x: 100.0,
                y: 200.0,
                z: 0.0,
            }],
        };

        let value = serde_json::to_value(&meta).unwrap();
        for key in [
            "InputFile",
            "OutputFile",
            "Width",
            "Height",
            "BandCount",
            "DataType",
            "GeoTransform",
            "ProjectionWkt",
            "Metadata",
            "MetadataDomains",
            "Gcps",
        ] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(value["GeoTransform"].as_array().unwrap().len(), 6);
        assert_eq!(value["Gcps"][0]["Pixel"], 0.5);
        assert_eq!(value["Gcps"][0]["X"], 100.0);
        assert_eq!(value["Gcps"][0]["Info"], "");
    }
}
