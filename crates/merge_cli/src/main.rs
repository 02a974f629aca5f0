//! docx-merge - fill a Word template once per row of a CSV or XLSX file

mod commands;
mod recent;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::DataOptions;
use recent::{RecentKind, RecentStore};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const HOW_TO_USE: &str = "\
How to use:

  1. Prepare a Word template with placeholders like {{Name}}
  2. Prepare a CSV or XLSX file whose header row holds the placeholder names
  3. Run `docx-merge generate --template <docx> --data <file> --output <dir>`

One document is written per data row, named output_1.docx, output_2.docx, ...
Blank rows are skipped.

Tip: field names must EXACTLY match the headers (case and space sensitive).
A placeholder split across differently formatted text is not replaced;
retype it in one go if `docx-merge fields` lists it but it stays unfilled.";

#[derive(Parser)]
#[command(name = "docx-merge")]
#[command(
    author,
    version,
    about = "Generate Word documents from a template and a CSV or XLSX file",
    long_about = HOW_TO_USE
)]
struct Cli {
    /// Directory holding the recent list (default: <config dir>/docx-merge)
    #[arg(long, global = true, env = "DOCX_MERGE_STATE_DIR")]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one document per data row
    #[command(long_about = HOW_TO_USE)]
    Generate {
        /// Word template (.docx) containing {{Field}} placeholders
        #[arg(short, long)]
        template: PathBuf,

        /// Data file (.csv or .xlsx); the first row holds the field names
        #[arg(short, long)]
        data: PathBuf,

        /// Output directory, created if missing
        #[arg(short, long)]
        output: PathBuf,

        /// Worksheet name for XLSX data (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Field delimiter for CSV data
        #[arg(long, default_value = ",")]
        delimiter: char,

        /// File name prefix for generated documents
        #[arg(long, default_value = mail_merge::merge_engine::DEFAULT_PREFIX)]
        prefix: String,
    },

    /// Print the records of a data file as JSON
    Records {
        /// Data file (.csv or .xlsx)
        data: PathBuf,

        /// Show at most this many records
        #[arg(short, long)]
        limit: Option<usize>,

        /// Worksheet name for XLSX data (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Field delimiter for CSV data
        #[arg(long, default_value = ",")]
        delimiter: char,
    },

    /// List the placeholders in a template
    Fields {
        /// Word template (.docx)
        #[arg(short, long)]
        template: PathBuf,

        /// Data file to check the placeholders against
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Worksheet name for XLSX data (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Field delimiter for CSV data
        #[arg(long, default_value = ",")]
        delimiter: char,
    },

    /// Manage the quick-access list of templates, data files, and output folders
    Recent {
        #[command(subcommand)]
        action: RecentAction,
    },
}

#[derive(Subcommand)]
enum RecentAction {
    /// Show listed entries
    List {
        /// Only show one kind of entry
        kind: Option<RecentKind>,
    },

    /// Add an entry; paths already listed are ignored
    Add {
        kind: RecentKind,
        path: String,

        /// Display name (default: the file or folder name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Remove an entry by path
    Remove { kind: RecentKind, path: String },

    /// Rename an entry
    Rename {
        kind: RecentKind,
        path: String,
        name: String,
    },
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("An error occurred: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Generate {
            template,
            data,
            output,
            sheet,
            delimiter,
            prefix,
        } => commands::generate(&template, &data, &output, &DataOptions { sheet, delimiter }, &prefix),
        Commands::Records {
            data,
            limit,
            sheet,
            delimiter,
        } => commands::records(&data, limit, &DataOptions { sheet, delimiter }),
        Commands::Fields {
            template,
            data,
            sheet,
            delimiter,
        } => commands::fields(&template, data.as_deref(), &DataOptions { sheet, delimiter }),
        Commands::Recent { action } => {
            let mut store = RecentStore::new(commands::state_dir(cli.state_dir)?);
            tracing::debug!("Recent list at {}", store.path().display());
            match action {
                RecentAction::List { kind } => commands::recent_list(&mut store, kind),
                RecentAction::Add { kind, path, name } => {
                    commands::recent_add(&mut store, kind, &path, name.as_deref())
                }
                RecentAction::Remove { kind, path } => commands::recent_remove(&mut store, kind, &path),
                RecentAction::Rename { kind, path, name } => {
                    commands::recent_rename(&mut store, kind, &path, &name)
                }
            }
        }
    }
}
