//! Command-line interface for meterscan.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::config::{self, Config};
use crate::report::{self, Format};
use crate::scan::Runner;
use crate::source::DirectoryProvider;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Environment variable holding the log filter, e.g. `meterscan=debug`.
pub const LOG_ENV: &str = "METERSCAN_LOG";

/// Catalog meters and structured log events declared in source code.
///
/// Meterscan reads source files as text, finds calls made through the
/// configured meter and event receivers, and resolves their names from
/// string constants declared in the same file.
#[derive(Parser)]
#[command(name = "meterscan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan sources and write the instrumentation catalog
    Scan(ScanArgs),
    /// Write a starter configuration file
    Init(InitArgs),
}

/// Arguments for the scan command.
#[derive(Parser)]
pub struct ScanArgs {
    /// Path to scan (file or directory)
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: csv, json, or pretty
    #[arg(short, long, default_value = "csv")]
    pub format: String,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Manual value for an unresolved name, as ClassName.variable=value
    #[arg(long = "override", value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,

    /// Exit non-zero when any name stays unresolved
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "meterscan.yaml")]
    pub output: PathBuf,
}

const CONFIG_TEMPLATE: &str = include_str!("templates/meterscan.yaml");

/// Install the stderr tracing subscriber if `METERSCAN_LOG` is set.
pub fn init_logging() {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(io::stderr)
            .try_init();
    }
}

fn load_config(args: &ScanArgs) -> anyhow::Result<Option<Config>> {
    let path = match &args.config {
        Some(p) => Some(p.clone()),
        None => Config::discover("."),
    };

    let mut config = match &path {
        Some(p) => match Config::parse_file(p) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: {}", e);
                return Ok(None);
            }
        },
        None => Config::default(),
    };

    if let Err(e) = config
        .apply_override_args(&args.overrides)
        .and_then(|_| config::validate(&config))
    {
        eprintln!("Error: invalid config: {}", e);
        return Ok(None);
    }

    Ok(Some(config))
}

/// Run the scan command.
pub fn run_scan(args: &ScanArgs) -> anyhow::Result<i32> {
    let format: Format = match args.format.parse() {
        Ok(f) => f,
        Err(_) => {
            eprintln!(
                "Error: invalid format {:?}, must be 'csv', 'json', or 'pretty'",
                args.format
            );
            return Ok(EXIT_ERROR);
        }
    };

    let Some(config) = load_config(args)? else {
        return Ok(EXIT_ERROR);
    };

    if !args.path.exists() {
        eprintln!("Error: cannot access path {:?}", args.path);
        return Ok(EXIT_ERROR);
    }

    let provider = DirectoryProvider::new(&args.path)
        .extensions(&config.extensions)
        .excluded_paths(&config.excluded_paths)?;
    let catalog = Runner::new(&config).run(&provider)?;

    if catalog.files_scanned() == 0 {
        eprintln!("Warning: no files to scan");
    }

    let reporter = format.reporter();
    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            let mut out = BufWriter::new(file);
            reporter.write(&catalog, &mut out)?;
            out.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            reporter.write(&catalog, &mut out)?;
        }
    }

    for entry in catalog.unresolved() {
        warn!(file = %entry.source_file, name = %entry.name, "unresolved name");
    }
    if !reporter.includes_unresolved() || args.output.is_some() {
        report::write_unresolved(&catalog, &mut io::stderr())?;
    }

    if args.strict && catalog.has_unresolved() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
    }

    std::fs::write(&args.output, CONFIG_TEMPLATE)
        .with_context(|| format!("writing {}", args.output.display()))?;

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to match your receivers", args.output.display());
    println!("  2. Run: meterscan scan . --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_template_is_valid_config() {
        let config = Config::parse_str(CONFIG_TEMPLATE).unwrap();
        assert!(config::validate(&config).is_ok());
        assert_eq!(config.excluded_paths, vec!["**/test/**"]);
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("nested/meterscan.yaml");
        let args = InitArgs {
            output: output.clone(),
        };
        assert_eq!(run_init(&args).unwrap(), EXIT_SUCCESS);
        assert!(output.is_file());
        assert_eq!(run_init(&args).unwrap(), EXIT_ERROR);
    }

    #[test]
    fn test_scan_writes_csv_and_strict_exit() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("Svc.kt"),
            "meterRegistry.counter(a, b, \"$prefix.hits\", t)\n",
        )
        .unwrap();
        let config_path = temp.path().join("meterscan.yaml");
        std::fs::write(&config_path, "extensions: [kt]\n").unwrap();
        let output = temp.path().join("catalog.csv");

        let mut args = ScanArgs {
            path: temp.path().to_path_buf(),
            config: Some(config_path),
            format: "csv".to_string(),
            output: Some(output.clone()),
            overrides: vec![],
            strict: true,
        };
        assert_eq!(run_scan(&args).unwrap(), EXIT_FAILED);

        args.overrides = vec!["Svc.prefix=svc".to_string()];
        assert_eq!(run_scan(&args).unwrap(), EXIT_SUCCESS);
        let csv = std::fs::read_to_string(&output).unwrap();
        assert!(csv.contains("meter,svc.hits,counter,,,Svc.kt"));
    }

    #[test]
    fn test_scan_rejects_bad_format() {
        let args = ScanArgs {
            path: PathBuf::from("."),
            config: None,
            format: "xml".to_string(),
            output: None,
            overrides: vec![],
            strict: false,
        };
        assert_eq!(run_scan(&args).unwrap(), EXIT_ERROR);
    }
}
