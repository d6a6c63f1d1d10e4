use anyhow::Context;
use clap::error::ErrorKind;
use clap::CommandFactory;
use jp2_ortho_convert::config::{CliArgs, LogFormat, TomlConfig};
use jp2_ortho_convert::utils::{logger, validation::Validate};
use jp2_ortho_convert::{BatchConverter, BatchSummary, ConvertError, GdalBackend, LocalStorage};
use std::process::ExitCode;

fn main() -> ExitCode {
    let tokens = std::env::args_os().map(|a| a.to_string_lossy().into_owned());
    let (args, ignored) = match CliArgs::parse_lenient(tokens) {
        Ok(parsed) => parsed,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };

    match args.log_format {
        LogFormat::Text => logger::init_cli_logger(args.verbose),
        LogFormat::Json => logger::init_json_logger(args.verbose),
    }
    tracing::debug!("CLI args: {:?}", args);
    for token in &ignored {
        tracing::warn!("Ignoring unrecognized argument: {}", token);
    }

    match run(&args) {
        Ok(summary) => {
            if !summary.is_clean() {
                tracing::warn!(
                    "{} of {} file(s) were not converted",
                    summary.skipped.len() + summary.failed.len(),
                    summary.total()
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            let code = match e.downcast_ref::<ConvertError>() {
                Some(err) => {
                    tracing::error!(
                        "Run failed: {} (Category: {:?}, Severity: {:?})",
                        err,
                        err.category(),
                        err.severity()
                    );
                    eprintln!("{}", err.user_friendly_message());
                    if matches!(err, ConvertError::Usage { .. }) {
                        print_usage();
                    } else {
                        eprintln!("Hint: {}", err.recovery_suggestion());
                    }
                    err.exit_code()
                }
                None => {
                    // anything we did not classify: message plus the full cause chain
                    eprintln!("Error: {:?}", e);
                    1
                }
            };
            ExitCode::from(code)
        }
    }
}

fn run(args: &CliArgs) -> anyhow::Result<BatchSummary> {
    args.validate()?;

    let file_config = match &args.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path);
            let config = TomlConfig::from_file(path)
                .with_context(|| format!("Failed to load config file '{}'", path))?;
            config.validate()?;
            Some(config)
        }
        None => None,
    };

    let request = args.to_request(file_config.as_ref())?;
    let monitor_enabled = args.monitor_enabled(file_config.as_ref());
    if monitor_enabled {
        tracing::info!("System monitoring enabled");
    }

    let input = request.input.clone();
    let backend = GdalBackend::new();
    let converter =
        BatchConverter::new_with_monitoring(backend, LocalStorage::new(), request, monitor_enabled);

    let summary = converter.run(&input)?;
    Ok(summary)
}

fn print_usage() {
    let mut command = CliArgs::command();
    println!("{}", command.render_help());
}
