use crate::domain::model::{OutputFormat, DEFAULT_JPEG_QUALITY};
use crate::utils::error::{ConvertError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]+)\}").expect("environment variable pattern is valid")
});

/// Defaults loaded from a TOML file. Command-line values win over these.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub output: OutputConfig,
    pub processing: ProcessingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: Option<String>,
    pub folder: Option<String>,
    pub jpeg_quality: Option<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub keep_going: bool,
    pub monitor: bool,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ConvertError::ConfigValidation {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value; unknown variables are left as written.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn format(&self) -> Result<Option<OutputFormat>> {
        self.output.format.as_deref().map(str::parse::<OutputFormat>).transpose()
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.output.jpeg_quality.unwrap_or(DEFAULT_JPEG_QUALITY)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(format) = &self.output.format {
            validation::validate_non_empty_string("output.format", format)?;
            self.format()?;
        }

        if let Some(folder) = &self.output.folder {
            validation::validate_path("output.folder", folder)?;
        }

        if let Some(quality) = self.output.jpeg_quality {
            validation::validate_range("output.jpeg_quality", quality, 1, 100)?;
        }

        Ok(())
    }
}
