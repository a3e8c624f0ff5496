mod export;
mod import;
mod update;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use droidtrans::ReadOptions;
use droidtrans_cli::validation::parse_language_code;
use tracing_subscriber::EnvFilter;

use crate::{export::run_export_command, import::run_import_command, update::run_update_command};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory containing the `values*` resource directories
    #[arg(long, global = true, default_value = ".")]
    res_dir: PathBuf,

    /// Abort when a resource file cannot be parsed instead of skipping it
    #[arg(long, global = true)]
    strict: bool,

    /// Print debug diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Export source language strings and their translations to a CSV sheet.
    #[command(visible_alias = "ee")]
    Export {
        /// Two-letter source language code
        #[arg(value_parser = parse_language_code)]
        source_language: String,
        /// Two-letter target language code
        #[arg(value_parser = parse_language_code)]
        target_language: String,
        /// Sheet to write (defaults to `<source>-to-<target>.csv`)
        output: Option<PathBuf>,
    },

    /// Import translations from a CSV sheet into the target language directory.
    #[command(visible_alias = "ei")]
    Import {
        /// Two-letter source language code
        #[arg(value_parser = parse_language_code)]
        source_language: String,
        /// Two-letter target language code
        #[arg(value_parser = parse_language_code)]
        target_language: String,
        /// Sheet edited by a translator
        input: PathBuf,
        /// Merge and report without rewriting the target directory
        #[arg(long)]
        dry_run: bool,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Update final status of translations and delete extra translations.
    #[command(visible_alias = "ut")]
    UpdateTarget {
        /// Two-letter source language code
        #[arg(value_parser = parse_language_code)]
        source_language: String,
        /// Two-letter target language code
        #[arg(value_parser = parse_language_code)]
        target_language: String,
        /// Merge and report without rewriting the target directory
        #[arg(long)]
        dry_run: bool,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    let read_options = ReadOptions::new().with_strict(args.strict);
    let result = match args.commands {
        Commands::Export {
            source_language,
            target_language,
            output,
        } => run_export_command(
            &args.res_dir,
            &source_language,
            &target_language,
            output,
            &read_options,
        ),
        Commands::Import {
            source_language,
            target_language,
            input,
            dry_run,
            json,
        } => run_import_command(
            &args.res_dir,
            &source_language,
            &target_language,
            &input,
            &read_options,
            dry_run,
            json,
        ),
        Commands::UpdateTarget {
            source_language,
            target_language,
            dry_run,
            json,
        } => run_update_command(
            &args.res_dir,
            &source_language,
            &target_language,
            &read_options,
            dry_run,
            json,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr; `RUST_LOG` applies unless `--verbose` is given.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
