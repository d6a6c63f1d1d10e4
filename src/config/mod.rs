#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::domain::model::{ConversionRequest, OutputFormat};
use crate::domain::ports::ConfigProvider;
use std::path::Path;

#[cfg(feature = "cli")]
pub use cli::{CliArgs, LogFormat};
pub use toml_config::TomlConfig;

impl ConfigProvider for ConversionRequest {
    fn format(&self) -> OutputFormat {
        self.format
    }

    fn output_folder(&self) -> Option<&Path> {
        self.output_folder.as_deref()
    }

    fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    fn keep_going(&self) -> bool {
        self.keep_going
    }
}
