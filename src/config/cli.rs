use crate::config::toml_config::TomlConfig;
use crate::domain::model::{ConversionRequest, OutputFormat, DEFAULT_JPEG_QUALITY};
use crate::utils::error::{ConvertError, Result};
use crate::utils::validation::{self, Validate};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

pub const ONLY_ONE_INPUT: &str = "Only one input path is supported.";

/// Long options taking a value. Names match in any case.
const VALUE_OPTIONS: [&str; 5] = ["--format", "--out", "--quality", "--config", "--log-format"];
const FLAG_OPTIONS: [&str; 5] = ["--keep-going", "--monitor", "--verbose", "--help", "--version"];
/// Short options are matched exactly.
const SHORT_FLAGS: [&str; 3] = ["-v", "-h", "-V"];
const SHORT_VALUE_OPTIONS: [&str; 1] = ["-c"];

/// Command-line tokens after lenient preprocessing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedArgs {
    pub tokens: Vec<String>,
    /// Unknown options and value options missing their value, dropped from `tokens`.
    pub ignored: Vec<String>,
}

/// Rewrites raw tokens (program name first) so option names match without regard to case.
///
/// Value options are joined with their value as `--name=value`, so a value starting with
/// `-` is never read as an option. Unknown `-` tokens and a trailing value option without
/// a value are dropped into `ignored`. Everything after `--` is kept as positional.
pub fn normalize_args<I, T>(args: I) -> NormalizedArgs
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    let mut normalized = NormalizedArgs::default();
    let mut tokens = args.into_iter().map(Into::into);

    if let Some(program) = tokens.next() {
        normalized.tokens.push(program);
    }

    while let Some(token) = tokens.next() {
        if token == "--" {
            normalized.tokens.push(token);
            normalized.tokens.extend(tokens.by_ref());
            break;
        }
        if !token.starts_with('-') || token == "-" {
            normalized.tokens.push(token);
            continue;
        }

        let (raw_name, inline_value) = match token.split_once('=') {
            Some((name, value)) => (name, Some(value.to_string())),
            None => (token.as_str(), None),
        };
        let name = if raw_name.starts_with("--") {
            raw_name.to_ascii_lowercase()
        } else {
            raw_name.to_string()
        };
        let name = name.as_str();

        if inline_value.is_none() && (FLAG_OPTIONS.contains(&name) || SHORT_FLAGS.contains(&name)) {
            normalized.tokens.push(name.to_string());
        } else if VALUE_OPTIONS.contains(&name) || SHORT_VALUE_OPTIONS.contains(&name) {
            match inline_value.or_else(|| tokens.next()) {
                Some(value) => normalized.tokens.push(format!("{}={}", name, value)),
                None => normalized.ignored.push(token),
            }
        } else {
            normalized.ignored.push(token);
        }
    }

    normalized
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "jp2-ortho-convert")]
#[command(version)]
#[command(about = "Convert georeferenced JPEG2000 orthophotos to JPEG/PNG/TIFF with a JSON metadata sidecar")]
pub struct CliArgs {
    /// .jp2 file or folder containing .jp2 files
    #[arg(value_name = "INPUT_PATH")]
    pub inputs: Vec<String>,

    /// Output format: jpg, png or tiff [default: jpg]
    #[arg(long, value_name = "jpg|png|tiff")]
    pub format: Option<String>,

    /// Output folder [default: same folder as each input file]
    #[arg(long, value_name = "OUTPUT_FOLDER")]
    pub out: Option<String>,

    /// JPEG quality, 1-100 [default: 90]
    #[arg(long)]
    pub quality: Option<u8>,

    /// TOML file with default settings
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<String>,

    /// Continue with the next file when a conversion fails
    #[arg(long)]
    pub keep_going: bool,

    /// Log elapsed time and memory use after each file
    #[arg(long)]
    pub monitor: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl CliArgs {
    /// Parses after [`normalize_args`]; returns the tokens that were dropped as well.
    pub fn parse_lenient<I, T>(args: I) -> std::result::Result<(Self, Vec<String>), clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let normalized = normalize_args(args);
        let parsed = Self::try_parse_from(normalized.tokens)?;
        Ok((parsed, normalized.ignored))
    }

    pub fn input_path(&self) -> Result<PathBuf> {
        match self.inputs.as_slice() {
            [] => Err(ConvertError::usage("Missing input path.")),
            [input] => Ok(PathBuf::from(input)),
            _ => Err(ConvertError::usage(ONLY_ONE_INPUT)),
        }
    }

    pub fn monitor_enabled(&self, file: Option<&TomlConfig>) -> bool {
        self.monitor || file.map(|f| f.processing.monitor).unwrap_or(false)
    }

    /// Merges command-line values over the optional config file into a request.
    pub fn to_request(&self, file: Option<&TomlConfig>) -> Result<ConversionRequest> {
        let input = self.input_path()?;

        let format = match &self.format {
            Some(value) => value.parse::<OutputFormat>()?,
            None => match file {
                Some(f) => f.format()?.unwrap_or_default(),
                None => OutputFormat::default(),
            },
        };

        let quality = self.quality.unwrap_or_else(|| {
            file.map(TomlConfig::jpeg_quality)
                .unwrap_or(DEFAULT_JPEG_QUALITY)
        });
        validation::validate_range("quality", quality, 1, 100)?;

        let keep_going = self.keep_going || file.map(|f| f.processing.keep_going).unwrap_or(false);

        let mut request = ConversionRequest::new(input, format)
            .with_jpeg_quality(quality)
            .with_keep_going(keep_going);

        let out = self
            .out
            .clone()
            .or_else(|| file.and_then(|f| f.output.folder.clone()));
        if let Some(out) = out {
            validation::validate_path("out", &out)?;
            request = request.with_output_folder(out);
        }

        Ok(request)
    }
}

impl Validate for CliArgs {
    fn validate(&self) -> Result<()> {
        self.input_path()?;
        if let Some(format) = &self.format {
            format.parse::<OutputFormat>()?;
        }
        if let Some(config) = &self.config {
            validation::validate_path("config", config)?;
        }
        Ok(())
    }
}
