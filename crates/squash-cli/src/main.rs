//! squash command-line interface
//!
//! Runs one compression pass over a directory of build output: every file is
//! loaded as an asset, derived assets are written next to their originals and
//! deleted originals are removed from disk.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use squash_cache::{CacheConfig, CacheStore, FileCacheStore, MemoryCacheStore};
use squash_config::{ConfigLoader, DeleteSetting, RuleSetting, Settings};
use squash_engine::CompressionPlugin;
use squash_types::AssetStore;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod assets;
mod display;
mod json_output;

use display::{create_spinner, display_error, display_outcomes, display_stats, display_success};
use json_output::{PassResultJson, RunMetadata};

#[derive(Parser)]
#[command(name = "squash")]
#[command(about = "Precompress build assets next to their originals")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress the assets of a build directory
    Compress {
        /// Build output directory
        directory: PathBuf,

        /// Well-known algorithm name (gzip, deflate, deflateRaw, brotliCompress, zstdCompress)
        #[arg(short, long)]
        algorithm: Option<String>,

        /// Filename template for derived assets, e.g. "[path][base].br"
        #[arg(short, long)]
        filename: Option<String>,

        /// Minimum asset size in bytes
        #[arg(short, long)]
        threshold: Option<usize>,

        /// Maximum acceptable compressed/original ratio
        #[arg(long)]
        min_ratio: Option<f64>,

        /// Only compress names matching this regex (repeatable)
        #[arg(long)]
        test: Vec<String>,

        /// Only compress names matching this regex (repeatable)
        #[arg(long)]
        include: Vec<String>,

        /// Never compress names matching this regex (repeatable)
        #[arg(long)]
        exclude: Vec<String>,

        /// Delete originals that were compressed
        #[arg(long)]
        delete_original: bool,

        /// Delete originals but keep their source maps
        #[arg(long, conflicts_with = "delete_original")]
        keep_source_map: bool,

        /// Persist compressed results in this cache file
        #[arg(long)]
        cache: Option<PathBuf>,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,

        /// Run the pass without touching the directory
        #[arg(long)]
        dry_run: bool,
    },

    /// Show or generate configuration
    Config {
        /// Show the defaults instead of the effective configuration
        #[arg(long)]
        default: bool,

        /// Output format (yaml, toml, json)
        #[arg(long)]
        format: Option<String>,

        /// Write to this file instead of printing
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Overrides from the `compress` flags
struct Overrides {
    algorithm: Option<String>,
    filename: Option<String>,
    threshold: Option<usize>,
    min_ratio: Option<f64>,
    test: Vec<String>,
    include: Vec<String>,
    exclude: Vec<String>,
    delete_original: bool,
    keep_source_map: bool,
}

impl Overrides {
    fn apply(self, settings: &mut Settings) {
        if let Some(algorithm) = self.algorithm {
            settings.algorithm = algorithm;
        }
        if self.filename.is_some() {
            settings.filename = self.filename;
        }
        if let Some(threshold) = self.threshold {
            settings.threshold = threshold;
        }
        if let Some(min_ratio) = self.min_ratio {
            settings.min_ratio = min_ratio;
        }
        let regexes = |patterns: Vec<String>| {
            patterns
                .into_iter()
                .map(|regex| RuleSetting::Regex { regex })
                .collect::<Vec<_>>()
        };
        settings.test.extend(regexes(self.test));
        settings.include.extend(regexes(self.include));
        settings.exclude.extend(regexes(self.exclude));
        if self.keep_source_map {
            settings.delete_original_assets =
                DeleteSetting::Mode(DeleteSetting::KEEP_SOURCE_MAP.to_string());
        } else if self.delete_original {
            settings.delete_original_assets = DeleteSetting::Flag(true);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.debug, cli.quiet, cli.verbose, cli.json_logs)?;

    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Compress {
            directory,
            algorithm,
            filename,
            threshold,
            min_ratio,
            test,
            include,
            exclude,
            delete_original,
            keep_source_map,
            cache,
            json,
            dry_run,
        } => {
            let mut settings = settings;
            Overrides {
                algorithm,
                filename,
                threshold,
                min_ratio,
                test,
                include,
                exclude,
                delete_original,
                keep_source_map,
            }
            .apply(&mut settings);

            handle_compress(
                &directory,
                settings,
                cache.as_deref(),
                json,
                dry_run,
                cli.quiet,
            )
            .await
        }
        Commands::Config {
            default,
            format,
            output,
        } => handle_config(settings, default, format.as_deref(), output.as_deref()),
    }
}

fn init_logging(debug: bool, quiet: bool, verbose: bool, json: bool) -> Result<()> {
    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else if quiet {
        "error"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let settings = match path {
        Some(path) => ConfigLoader::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ConfigLoader::load_default().context("Failed to load configuration")?,
    };
    debug!("Loaded settings: {:?}", settings);
    Ok(settings)
}

async fn handle_compress(
    directory: &Path,
    settings: Settings,
    cache_path: Option<&Path>,
    json: bool,
    dry_run: bool,
    quiet: bool,
) -> Result<()> {
    if !directory.is_dir() {
        bail!("{} is not a directory", directory.display());
    }

    let plugin = CompressionPlugin::from_settings(settings)?;
    let store = assets::load_directory(
        directory,
        &plugin.options().filename,
        plugin.relation_name(),
    )
    .await?;
    let before: BTreeSet<String> = store.list().into_iter().collect();
    info!("Loaded {} assets from {}", before.len(), directory.display());

    let file_cache = match cache_path {
        Some(path) => Some(Arc::new(FileCacheStore::open(CacheConfig::at(path)).await?)),
        None => None,
    };
    let cache: Arc<dyn CacheStore> = match &file_cache {
        Some(file_cache) => Arc::clone(file_cache) as Arc<dyn CacheStore>,
        None => Arc::new(MemoryCacheStore::new()),
    };

    let spinner = (!json && !quiet).then(|| create_spinner("Compressing assets..."));
    let report = plugin.run(&store, cache).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let (written, removed) = if dry_run {
        (0, 0)
    } else {
        if let Some(file_cache) = &file_cache {
            file_cache.save().await?;
        }
        assets::write_back(directory, &before, &store, &report).await?
    };

    if json {
        let output = PassResultJson::new(
            RunMetadata {
                version: env!("CARGO_PKG_VERSION").to_string(),
                directory: directory.display().to_string(),
                algorithm: plugin.options().algorithm.identity(),
                relation: plugin.relation_name().to_string(),
                dry_run,
            },
            &report,
            written,
            removed,
        );
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !quiet {
        display_outcomes(&report, &store);
        display_stats(&report.stats);
        if dry_run {
            println!("{}", style("Dry run: no files were changed").yellow());
        } else {
            display_success(&format!(
                "{} files written, {} files removed",
                written, removed
            ));
        }
    }

    if report.has_errors() {
        if !json {
            display_error(&format!("{} assets failed", report.errors.len()));
        }
        bail!("Compression pass finished with errors");
    }
    Ok(())
}

fn handle_config(
    settings: Settings,
    default: bool,
    format: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    let settings = if default { Settings::default() } else { settings };

    match output {
        Some(path) => {
            ConfigLoader::save_to_file(&settings, path)?;
            display_success(&format!("Configuration written to {}", path.display()));
        }
        None => print!("{}", ConfigLoader::render(&settings, format)?),
    }
    Ok(())
}
