mod catalog;
mod info;
mod records;
mod validate;

use std::io::stderr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use designation::Catalog;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show header and summary information about target designation files.
    ///
    /// Multiple files are decoded in parallel. Output is in input order.
    Info {
        /// Input target designation files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: info::Format,

        /// Path to a station/spacecraft catalog to merge with the built-in catalog.
        #[arg(short, long, value_name = "path")]
        db: Option<PathBuf>,
    },
    /// Write the decoded header and records of a file as JSON.
    Records {
        /// Input target designation file
        input: PathBuf,

        /// Pretty print the JSON output
        #[arg(short, long, action)]
        pretty: bool,
    },
    /// Validate target designation files.
    ///
    /// Prints `ok` or the decode error as JSON for each file. Exits with a non-zero
    /// status if any file fails.
    Validate {
        /// Input target designation files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Accept files that contain no records
        #[arg(long, action)]
        allow_empty: bool,

        /// Require records to be scheduled within the header's session window
        #[arg(long, action)]
        check_session: bool,
    },
    /// List known ground stations and spacecraft.
    Catalog {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: info::Format,

        /// Path to a station/spacecraft catalog to merge with the built-in catalog.
        #[arg(short, long, value_name = "path")]
        db: Option<PathBuf>,
    },
}

fn load_catalog(db: Option<&PathBuf>) -> Result<Catalog> {
    match db {
        Some(path) => Catalog::with_file(path, true)
            .with_context(|| format!("loading catalog from {path:?}")),
        None => Ok(Catalog::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(stderr)
        .with_ansi(false)
        .without_time()
        .with_env_filter(
            EnvFilter::try_from_env("DESIGNATION_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    debug!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::Info { inputs, format, db } => {
            let catalog = load_catalog(db.as_ref())?;
            info::info(inputs, format, &catalog)
        }
        Commands::Records { input, pretty } => records::records(input, *pretty),
        Commands::Validate {
            inputs,
            allow_empty,
            check_session,
        } => {
            let options = designation::DecodeOptions::builder()
                .require_records(!allow_empty)
                .check_session_window(*check_session)
                .build();
            validate::validate(inputs, options)
        }
        Commands::Catalog { format, db } => {
            let catalog = load_catalog(db.as_ref())?;
            catalog::catalog(&catalog, format)
        }
    }
}
