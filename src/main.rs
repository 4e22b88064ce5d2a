//! src_anonymizer - Source Code Anonymization CLI
//!
//! Batch and single-file front end for the anonymization engine.

use clap::{Parser, Subcommand};
use src_anonymizer::{Anonymizer, Config, Language};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use walkdir::WalkDir;

/// Anonymize C and OCaml source code
#[derive(Parser)]
#[command(name = "src_anonymizer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,

    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep comments instead of stripping them
    #[arg(long)]
    keep_comments: bool,

    /// Skip re-indentation of the output
    #[arg(long)]
    no_reindent: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Anonymize a single source file
    File {
        /// Input file
        input: PathBuf,

        /// Output file (defaults to <stem><suffix>.<ext> next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Force the language instead of detecting it from the extension
        #[arg(short, long)]
        language: Option<String>,

        /// Write the rename map as JSON to this path
        #[arg(long)]
        map: Option<PathBuf>,
    },

    /// Anonymize every supported source file under a directory
    Dir {
        /// Input directory
        input: PathBuf,

        /// Output directory (defaults to writing next to each input file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write a rename map JSON next to each output file
        #[arg(long)]
        map: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = match cli.verbose {
        0 if cli.quiet => Level::ERROR,
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_level.to_string())),
        )
        .init();

    // Load configuration
    let mut config = if let Some(ref config_path) = cli.config {
        Config::from_file(config_path)?
    } else {
        Config::default()
    };

    // Override with CLI options
    if cli.keep_comments {
        config.output.strip_comments = false;
        config.output.strip_blank_lines = false;
    }
    if cli.no_reindent {
        config.output.reindent = false;
    }

    let suffix = config.output.suffix.clone();
    let anonymizer = Anonymizer::new(config);

    match cli.command {
        Commands::File {
            input,
            output,
            language,
            map,
        } => {
            let result = match language {
                Some(ref name) => {
                    let language = Language::from_name(name).ok_or_else(|| {
                        anyhow::anyhow!("unsupported language: {}", name)
                    })?;
                    let source = std::fs::read_to_string(&input)?;
                    anonymizer.anonymize(&source, language)?
                }
                None => anonymizer.anonymize_file(&input)?,
            };

            for warning in &result.warnings {
                warn!("{}: {}", input.display(), warning);
            }

            let output = output.unwrap_or_else(|| derive_output_path(&input, &suffix));
            std::fs::write(&output, &result.code)?;
            info!(
                "wrote {} ({} identifiers renamed)",
                output.display(),
                result.stats.identifiers_renamed
            );

            if let Some(map_path) = map {
                std::fs::write(&map_path, serde_json::to_string_pretty(&result.table)?)?;
                info!("wrote rename map to {}", map_path.display());
            }
        }

        Commands::Dir { input, output, map } => {
            let failures = anonymize_dir(&anonymizer, &input, output.as_deref(), map, &suffix)?;
            if failures > 0 {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Anonymize every supported file under `input`. Returns the number of
/// files that failed; one file's failure never aborts the batch.
fn anonymize_dir(
    anonymizer: &Anonymizer,
    input: &Path,
    output_dir: Option<&Path>,
    write_maps: bool,
    suffix: &str,
) -> anyhow::Result<usize> {
    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir)?;
    }

    let mut processed = 0usize;
    let mut failures = 0usize;

    for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !entry.file_type().is_file() || !is_supported(path) {
            continue;
        }

        match anonymizer.anonymize_file(path) {
            Ok(result) => {
                for warning in &result.warnings {
                    warn!("{}: {}", path.display(), warning);
                }

                let out_path = match output_dir {
                    Some(dir) => dir.join(derive_output_name(path, suffix)),
                    None => derive_output_path(path, suffix),
                };
                if let Err(e) = std::fs::write(&out_path, &result.code) {
                    error!("could not write {}: {}", out_path.display(), e);
                    failures += 1;
                    continue;
                }

                if write_maps {
                    let map_path = out_path.with_extension("map.json");
                    match serde_json::to_string_pretty(&result.table) {
                        Ok(json) => {
                            if let Err(e) = std::fs::write(&map_path, json) {
                                warn!(
                                    "could not write rename map {}: {}",
                                    map_path.display(),
                                    e
                                );
                            }
                        }
                        Err(e) => warn!("could not serialize rename map: {}", e),
                    }
                }

                processed += 1;
            }
            Err(e) => {
                error!("failed to anonymize {}: {}", path.display(), e);
                failures += 1;
            }
        }
    }

    info!("{} files anonymized, {} failures", processed, failures);
    Ok(failures)
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(Language::from_extension)
        .is_some()
}

/// `dir/name.c` -> `dir/name<suffix>.c`
fn derive_output_path(input: &Path, suffix: &str) -> PathBuf {
    input.with_file_name(derive_output_name(input, suffix))
}

fn derive_output_name(input: &Path, suffix: &str) -> String {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    match input.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext),
        None => format!("{}{}", stem, suffix),
    }
}
