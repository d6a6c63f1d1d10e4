use crate::domain::model::OutputFormat;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("{message}")]
    Usage { message: String },

    #[error("Input path not found: {}", .path.display())]
    InputNotFound { path: PathBuf },

    #[error("Input file is not .jp2: {}", .path.display())]
    NotJp2 { path: PathBuf },

    #[error("No .jp2 files found in folder: {}", .dir.display())]
    NoInputFiles { dir: PathBuf },

    #[error("Unsupported format: {value}")]
    UnsupportedFormat { value: String },

    #[error("GDAL could not open file: {} ({reason})", .path.display())]
    OpenFailure { path: PathBuf, reason: String },

    #[error("GDAL driver not found: {driver}")]
    DriverNotFound { driver: String },

    #[error("Failed to create output image: {} ({reason})", .path.display())]
    ConversionFailure { path: PathBuf, reason: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Usage,
    Input,
    Raster,
    Output,
    Config,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ConvertError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Usage { .. } | Self::UnsupportedFormat { .. } => ErrorCategory::Usage,
            Self::InputNotFound { .. } | Self::NotJp2 { .. } | Self::NoInputFiles { .. } => {
                ErrorCategory::Input
            }
            Self::OpenFailure { .. }
            | Self::DriverNotFound { .. }
            | Self::ConversionFailure { .. } => ErrorCategory::Raster,
            Self::Serialization(_) => ErrorCategory::Output,
            Self::ConfigValidation { .. } | Self::InvalidConfigValue { .. } => {
                ErrorCategory::Config
            }
            Self::Io(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // a file the library refuses to open is skipped, the batch goes on
            Self::OpenFailure { .. } => ErrorSeverity::Low,
            Self::ConversionFailure { .. } => ErrorSeverity::Medium,
            Self::Io(_) | Self::DriverNotFound { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// Whether the error concerns a single input file rather than the whole run.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            Self::OpenFailure { .. }
                | Self::ConversionFailure { .. }
                | Self::Serialization(_)
        )
    }

    /// Every fatal error terminates the process with status 1.
    pub fn exit_code(&self) -> u8 {
        1
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::UnsupportedFormat { value } => {
                let valid: Vec<&str> = OutputFormat::ALL.iter().map(OutputFormat::as_str).collect();
                format!("Unsupported format: {}\nValid formats: {}", value, valid.join(", "))
            }
            Self::Io(e) => format!("File system error: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Usage => "Run with --help to see the accepted arguments",
            ErrorCategory::Input => "Pass a .jp2 file or a folder that directly contains .jp2 files",
            ErrorCategory::Raster => {
                "Check that the file is a valid raster and that GDAL was built with the required drivers"
            }
            ErrorCategory::Output => "Check the output folder and the metadata reported for the file",
            ErrorCategory::Config => "Fix the offending value in the configuration file or on the command line",
            ErrorCategory::System => "Check permissions and free space for the output folder",
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
