// SPDX-License-Identifier: AGPL-3.0-or-later
//! cramdoc: convert worksheet content between text, flat blocks and trees

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::ExportFormat;
use config::CliConfig;
use cramdoc_core::{IdGenerator, SourceFormat, UuidIds};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cramdoc", version, about = "Worksheet content conversion")]
struct Cli {
    /// TOML file with [parse] and [render] tables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write output here instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Log conversion fallbacks to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Split linear text into flat blocks
    Tokenize { file: PathBuf },

    /// Parse linear text into a document tree
    Import { file: PathBuf },

    /// Build a document tree from flat block JSON
    Build { file: PathBuf },

    /// Flatten a document tree into flat block JSON
    Flatten {
        file: PathBuf,

        /// Emit no blocks for an empty document
        #[arg(long)]
        allow_empty: bool,
    },

    /// Re-parse formulas typed as text inside a document tree
    Normalize { file: PathBuf },

    /// Export a document tree as text
    Export {
        file: PathBuf,

        #[arg(long, value_enum, default_value = "markdown")]
        to: ExportFormat,
    },

    /// Convert between markdown, plain, legacy and tree
    Convert {
        file: PathBuf,

        /// Defaults to the format named by the file extension
        #[arg(long)]
        from: Option<SourceFormat>,

        #[arg(long)]
        to: SourceFormat,
    },

    /// Print block, formula, word and character counts
    Stats { file: PathBuf },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = CliConfig::load(cli.config.as_deref()).await?;
    let ids: Arc<dyn IdGenerator> = Arc::new(UuidIds);

    let output = match &cli.command {
        Command::Tokenize { file } => commands::tokenize_file(file, ids.as_ref()).await?,
        Command::Import { file } => commands::import_file(file, ids.as_ref(), &config.parse).await?,
        Command::Build { file } => commands::build_file(file, ids.as_ref(), &config.parse).await?,
        Command::Flatten { file, allow_empty } => {
            commands::flatten_file(file, ids.as_ref(), &config.render, *allow_empty).await?
        }
        Command::Normalize { file } => {
            commands::normalize_file(file, ids.as_ref(), &config.parse).await?
        }
        Command::Export { file, to } => commands::export_file(file, *to, &config.render).await?,
        Command::Convert { file, from, to } => {
            commands::convert_file(file, *from, *to, ids, &config.parse, &config.render).await?
        }
        Command::Stats { file } => commands::stats_file(file).await?,
    };

    commands::write_output(cli.output.as_deref(), &output).await
}
