//! Terminal output for the squash CLI

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use squash_engine::{AssetOutcome, CompressedFlag, MemoryAssetStore, PassReport};
use squash_types::{AssetStore, PassStats};
use std::time::Duration;

/// Spinner shown while a pass runs
pub fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}")
    {
        spinner.set_style(spinner_style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Print one line per eligible asset, then the failures
pub fn display_outcomes(report: &PassReport, store: &MemoryAssetStore) {
    for (name, outcome) in &report.outcomes {
        match outcome {
            AssetOutcome::Emitted {
                filename,
                original_size,
                compressed_size,
                ..
            } => {
                let flag = store
                    .get(filename)
                    .map(|asset| CompressedFlag::new(&asset.info).to_string())
                    .unwrap_or_default();
                println!(
                    "  {} {} {} {} ({} -> {})",
                    style("✓").green(),
                    name,
                    style("→").dim(),
                    style(filename).cyan(),
                    format_bytes(*original_size as u64),
                    format_bytes(*compressed_size as u64)
                );
                if !flag.is_empty() {
                    println!("      {}", flag);
                }
            }
            AssetOutcome::Failed => {}
            other => println!(
                "  {} {} {}",
                style("·").dim(),
                name,
                style(format!("({})", other.label())).dim()
            ),
        }
    }

    for error in &report.errors {
        display_error(&error.to_string());
    }
}

/// Print the aggregated statistics
pub fn display_stats(stats: &PassStats) {
    println!();
    println!("{}", style("Compression Statistics:").bold().underlined());
    println!("  Assets matched: {}", style(stats.assets_matched).cyan());
    println!("  Assets emitted: {}", style(stats.assets_emitted).green());
    println!("  Assets rejected: {}", style(stats.assets_rejected).yellow());
    println!("  Assets skipped: {}", style(stats.assets_skipped).yellow());
    println!(
        "  Errors: {}",
        if stats.assets_failed > 0 {
            style(stats.assets_failed).red()
        } else {
            style(stats.assets_failed).green()
        }
    );
    println!(
        "  Compressions: {} ({} cache hits)",
        style(stats.compressions).cyan(),
        style(stats.cache_hits).cyan()
    );
    println!(
        "  Bytes: {} -> {} ({:.1}%)",
        style(format_bytes(stats.bytes_in)).green(),
        style(format_bytes(stats.bytes_out)).green(),
        stats.compression_ratio() * 100.0
    );
    println!(
        "  Duration: {}",
        style(format_duration(stats.duration)).blue()
    );
}

/// Format bytes in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

/// Format duration in human-readable format
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{:.2}s", duration.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

/// Display an error message
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), style(message).red());
}

/// Display a success message
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}
