//! apiflat CLI - Convert OpenAPI documents into URI-template keyed documents

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use apiflat_core::Config;

#[derive(Parser)]
#[command(name = "apiflat")]
#[command(about = "Convert OpenAPI documents into URI-template keyed request/response documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a source document (JSON or YAML)
    Convert {
        /// Source document
        input: PathBuf,

        /// Config file (default: .apiflat.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Single-line output, overrides `pretty` from the config
        #[arg(long)]
        compact: bool,
    },

    /// Initialize config file
    Init,

    /// Export JSON Schema for the output format
    Schema,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // --verbose wins over RUST_LOG
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(3)
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Convert {
            input,
            config,
            output,
            compact,
        } => {
            let cfg = match config {
                Some(path) => Config::load(&path)?,
                None => Config::load_default()?,
            };
            debug!(?cfg, "config loaded");

            let doc = apiflat_engine::load(&input)?;
            info!(
                input = %input.display(),
                source_version = doc.openapi.as_str(),
                paths = doc.paths.len(),
                "converting"
            );

            let target = apiflat_engine::transform(&doc, &cfg)?;
            let value = target.to_json()?;
            let rendered = if cfg.pretty && !compact {
                serde_json::to_string_pretty(&value)?
            } else {
                serde_json::to_string(&value)?
            };

            match output {
                Some(path) => write_output(&path, &rendered)?,
                None => println!("{rendered}"),
            }
            Ok(0)
        }

        Commands::Init => {
            let config_path = ".apiflat.toml";
            if Path::new(config_path).exists() {
                eprintln!("{config_path} already exists");
                return Ok(1);
            }

            std::fs::write(config_path, Config::example())?;
            println!("Created {config_path}");
            println!("\nEdit the file to configure:");
            println!("  - target_version: version marker of the output");
            println!("  - security: last | all");
            println!("  - key_collisions: warn | error");
            Ok(0)
        }

        Commands::Schema => {
            let schema = apiflat_core::target::generate_schema();
            println!("{schema}");
            Ok(0)
        }
    }
}

fn write_output(path: &Path, rendered: &str) -> Result<()> {
    std::fs::write(path, format!("{rendered}\n"))
        .with_context(|| format!("Cannot write {}", path.display()))?;
    info!(output = %path.display(), "written");
    Ok(())
}
