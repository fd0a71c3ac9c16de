use std::path::{Path, PathBuf};

use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use cadview_config::{AppConfig, ConfigError};
use cadview_io::IoError;

mod import;

use import::ImportError;

fn main() {
    let mut args = std::env::args().skip(1);
    let mut input: Option<PathBuf> = None;
    let mut output_override: Option<PathBuf> = None;
    let mut config_override: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--out" => {
                let Some(path) = args.next() else {
                    eprintln!("`--out` expects an output file path");
                    std::process::exit(1);
                };
                output_override = Some(PathBuf::from(path));
            }
            "--config" => {
                let Some(path) = args.next() else {
                    eprintln!("`--config` expects a config file path");
                    std::process::exit(1);
                };
                config_override = Some(PathBuf::from(path));
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other if other.starts_with('-') => {
                eprintln!("unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
            other => {
                if input.replace(PathBuf::from(other)).is_some() {
                    eprintln!("only one input drawing can be given");
                    std::process::exit(1);
                }
            }
        }
    }

    let Some(input) = input else {
        print_usage();
        std::process::exit(1);
    };

    let config = load_configuration(config_override);
    init_logging(&config);
    info!(input = %input.display(), "importing drawing");

    let outcome = match import::import_drawing(&input, &config) {
        Ok(outcome) => outcome,
        Err(ImportError::Load(IoError::UnsupportedFormat(reason))) => {
            eprintln!("Can't read this drawing: {reason}");
            std::process::exit(1);
        }
        Err(err) => {
            error!(error = %err, "import failed");
            eprintln!("Can't read this drawing file.");
            std::process::exit(1);
        }
    };

    let output = output_override.unwrap_or_else(|| default_output_path(&input, &config));
    if let Err(err) = std::fs::write(&output, outcome.svg) {
        error!(path = %output.display(), error = %err, "failed to write output");
        std::process::exit(1);
    }

    info!(
        output = %output.display(),
        entities = outcome.report.entity_count,
        emitted = outcome.report.emitted,
        "drawing rendered"
    );
    println!("rendered {} -> {}", input.display(), output.display());
}

fn default_output_path(input: &Path, config: &AppConfig) -> PathBuf {
    let file_name = input
        .file_stem()
        .map(|stem| format!("{}.svg", stem.to_string_lossy()))
        .unwrap_or_else(|| "drawing.svg".to_string());
    match &config.output.directory {
        Some(directory) => directory.join(file_name),
        None => input.with_file_name(file_name),
    }
}

fn load_configuration(override_path: Option<PathBuf>) -> AppConfig {
    match override_path {
        Some(path) => AppConfig::from_file(&path).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "failed to load the given config, using defaults");
            AppConfig::default()
        }),
        None => match AppConfig::discover() {
            Ok(cfg) => cfg,
            Err(err) => {
                match &err {
                    ConfigError::Io { path, .. } | ConfigError::Parse { path, .. } => {
                        warn!(path = %path.display(), error = %err, "failed to load default config, using built-in defaults");
                    }
                    ConfigError::Context { .. } => {
                        warn!(error = %err, "failed to load default config, using built-in defaults");
                    }
                }
                AppConfig::default()
            }
        },
    }
}

fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(config.logging.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter);
    if subscriber.try_init().is_err() {
        // already initialized, ignore
    }
}

fn print_usage() {
    println!("usage: cadview <drawing.dxf> [--out <file.svg>] [--config <path>]");
}
