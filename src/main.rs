//! sizewise - Find out where your disk space goes.
//!
//! Usage:
//!   sizewise scan [PATH] [-d DEPTH]      Scan and show the largest entries
//!   sizewise estimate [PATH]             Quick sampled size of a directory
//!   sizewise export [PATH] [-o FILE]     Export scan to JSON
//!   sizewise --help                      Show help

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use sizewise_core::{DirEntry, ScanConfig, ScanError, format_size, percent_of};
use sizewise_scan::{ScanOutcome, ScanReport, ScanSession};

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];
const SPINNER_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(
    name = "sizewise",
    version,
    about = "A concurrent disk usage analyzer",
    long_about = "sizewise measures directory trees in parallel and shows where your disk \
                  space goes, largest entries first."
)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Worker threads (0 = 3 per CPU, at most 24)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a directory and show the largest entries
    Scan {
        /// Path to scan ("*" scans the filesystem root)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Levels to display
        #[arg(short, long, default_value = "2", value_parser = clap::value_parser!(u8).range(1..=5))]
        depth: u8,

        /// Number of top entries to show per directory
        #[arg(short = 'n', long, default_value = "10")]
        top: usize,
    },

    /// Estimate a directory's size by sampling its entries
    Estimate {
        /// Directory to estimate
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Entries to sample
        #[arg(short, long, default_value = "20")]
        samples: usize,
    },

    /// Export scan results to JSON
    Export {
        /// Path to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = ScanConfig::builder()
        .threads(cli.threads)
        .build()
        .map_err(ScanError::from)?;
    let session = Arc::new(ScanSession::new(config).context("Failed to start scanner")?);
    debug!(threads = session.config().pool_threads(), "scanner ready");

    match cli.command {
        Command::Scan { path, depth, top } => run_scan(&session, &path, depth.into(), top),
        Command::Estimate { path, samples } => run_estimate(&session, &path, samples),
        Command::Export { path, output } => run_export(&session, &path, output),
    }
}

fn setup_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("sizewise=debug,sizewise_scan=debug,warn")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Map the command-line shorthand `*` to the filesystem root.
fn resolve_path(path: &Path) -> PathBuf {
    if path.as_os_str() == "*" {
        PathBuf::from(std::path::MAIN_SEPARATOR_STR)
    } else {
        path.to_path_buf()
    }
}

/// Run a scan and display the tree.
fn run_scan(session: &Arc<ScanSession>, path: &Path, depth: usize, top_n: usize) -> Result<()> {
    let path = resolve_path(path);

    eprintln!("Scanning {} (depth {})...", path.display(), depth);

    let report = scan_with_spinner(session, &path, depth)?;
    let root = &report.root;

    // Print summary
    println!();
    println!("{}", "─".repeat(60));
    println!(" {} - {}", root.path.display(), format_size(root.size));
    println!(
        " {} files, {} directories",
        root.file_count(),
        root.dir_count()
    );
    println!(
        " Scanned in {:.2}s{}",
        report.duration.as_secs_f64(),
        if report.from_cache { " (cached)" } else { "" }
    );
    println!("{}", "─".repeat(60));
    println!();

    // Print tree
    print_node(root, 0, depth, top_n, root.size);

    if report.skipped > 0 {
        println!();
        println!(
            " Skipped due to errors/permissions: {} ({:.2}%)",
            format_size(report.skipped),
            report.skipped_percent()
        );
    }

    Ok(())
}

/// Print a sampled size estimate.
fn run_estimate(session: &ScanSession, path: &Path, samples: usize) -> Result<()> {
    let path = resolve_path(path);
    let estimate = session
        .estimate(&path, samples)
        .context("Error estimating directory size")?;

    println!("{}  ~{}", path.display(), format_size(estimate));
    Ok(())
}

/// Export scan results to JSON.
fn run_export(session: &Arc<ScanSession>, path: &Path, output: Option<PathBuf>) -> Result<()> {
    let path = resolve_path(path);

    eprintln!("Scanning {}...", path.display());

    let report = scan_with_spinner(session, &path, 0)?;
    let json = serde_json::to_string_pretty(report.root.as_ref())?;

    match output {
        Some(output_path) => {
            std::fs::write(&output_path, json)
                .with_context(|| format!("Failed to write {}", output_path.display()))?;
            eprintln!("Exported to {}", output_path.display());
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}

/// Run a background scan, animating a spinner with the processed byte count on stderr.
fn scan_with_spinner(session: &Arc<ScanSession>, path: &Path, depth: usize) -> Result<ScanReport> {
    let mut handle = session
        .spawn(path, depth)
        .context("Failed to start scan")?;

    let mut frames = SPINNER.iter().cycle();
    let outcome = loop {
        if let Some(outcome) = handle.wait_timeout(SPINNER_INTERVAL) {
            break outcome;
        }
        let progress = handle.progress();
        eprint!(
            "\r{} Scanning... {} ({:.1}s)   ",
            frames.next().unwrap_or(&'|'),
            format_size(progress.bytes_processed),
            progress.elapsed.as_secs_f64()
        );
    };
    // Clear spinner line
    eprint!("\r{}\r", " ".repeat(60));

    match outcome.context("Error scanning directory")? {
        ScanOutcome::Complete(report) => Ok(report),
        ScanOutcome::Cancelled => Err(eyre!("Scan cancelled")),
    }
}

/// Print a node and its children.
fn print_node(node: &DirEntry, depth: usize, max_depth: usize, top_n: usize, root_size: u64) {
    let indent = "  ".repeat(depth);
    let ratio = percent_of(node.size, root_size);

    let bar = make_bar(ratio / 100.0, 10);

    let name = if depth == 0 {
        node.path.display().to_string()
    } else {
        node.name.to_string()
    };

    let dir_marker = if node.is_dir { "/" } else { "" };

    println!(
        "{}{}{:<40} {:>10} {:>5.1}% {}",
        indent,
        if node.is_dir { "▼ " } else { "  " },
        truncate(&format!("{}{}", name, dir_marker), 40),
        format_size(node.size),
        ratio,
        bar
    );

    if node.is_dir && depth < max_depth {
        let children_to_show = node.children.iter().take(top_n);
        let remaining = node.children.len().saturating_sub(top_n);

        for child in children_to_show {
            print_node(child, depth + 1, max_depth, top_n, root_size);
        }

        if remaining > 0 {
            let indent = "  ".repeat(depth + 1);
            println!("{}  ... and {} more", indent, remaining);
        }
    }
}

/// Create a simple ASCII bar.
fn make_bar(ratio: f64, width: usize) -> String {
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// Truncate a string to at most `max_len` characters.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 1).collect();
        format!("{}…", kept)
    }
}
