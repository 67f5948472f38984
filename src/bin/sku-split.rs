//! CLI binary for sku-split.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `SplitConfig` and prints results.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use sku_split::manifest::ManifestSplit;
use sku_split::{
    pair_manifests, process_path, split_with_manifest, BatchSummary, NoopObserver, OverlapPolicy,
    PdfiumBackend, ShipmentManifest, SplitConfig, StatusObserver, VerificationStatus,
    WriteFailurePolicy,
};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI status observer using indicatif ──────────────────────────────────────

/// Terminal observer: a spinner at the bottom of the terminal with every
/// status line printed above it.
struct SpinnerObserver {
    bar: ProgressBar,
}

impl SpinnerObserver {
    fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Splitting");
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl StatusObserver for SpinnerObserver {
    fn report(&self, message: &str) {
        let line = if message.starts_with("Error") {
            format!("  {} {}", red("✗"), red(message))
        } else if message.starts_with("Warn") || message.contains("FAILED") {
            format!("  {} {}", cyan("⚠"), message)
        } else if message.starts_with("Creating:") || message.starts_with("Creating PDF") {
            format!("  {} {}", green("✓"), message)
        } else if message.starts_with("Processing") || message.starts_with("---") {
            format!("{} {}", cyan("◆"), bold(message))
        } else {
            format!("  {}", dim(message))
        };
        self.bar.println(line);
        self.bar.set_message(message.to_string());
    }
}

/// Plain observer for `--no-progress`: one stderr line per status message.
fn print_status(message: &str) {
    eprintln!("{message}");
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Split one label PDF (output goes beside it)
  sku-split scan package-FBA15XYZ.pdf

  # Split every PDF in a folder into ./out
  sku-split scan labels/ --output-dir out

  # Add a quantity token for another label language
  sku-split scan labels/ --quantity-token Anzahl

  # Treat overlap and verification mismatches as failures
  sku-split scan labels/ --reject-overlap --strict-verification

  # Split using the shipment's CSV manifest instead of page text
  sku-split manifest FBA15XYZ.csv package-FBA15XYZ.pdf

  # Pair every CSV in a folder with its PDF by shipment id
  sku-split manifest-dir shipments/

  # Machine-readable summary
  sku-split scan labels/ --json > summary.json

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  RUST_LOG                Override log filtering (e.g. sku_split=debug)
  SKU_SPLIT_*             Every flag reads its SKU_SPLIT_<FLAG> variable
"#;

/// Split shipping-label PDFs into one PDF per SKU.
#[derive(Parser, Debug)]
#[command(
    name = "sku-split",
    version,
    about = "Split shipping-label PDFs into one PDF per SKU",
    long_about = "Split multi-page shipping-label PDFs into one PDF per SKU. The SKU is read \
from each page's text layer below the single-SKU header line, or taken from the shipment's \
CSV manifest.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Output a JSON summary instead of text.
    #[arg(long, global = true, env = "SKU_SPLIT_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, global = true, env = "SKU_SPLIT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "SKU_SPLIT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "SKU_SPLIT_QUIET")]
    quiet: bool,

    /// Path to libpdfium (file, or directory holding it).
    #[arg(long, global = true, env = "SKU_SPLIT_PDFIUM_LIB")]
    pdfium_lib: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split by the SKU printed on each page.
    Scan(ScanArgs),

    /// Split one PDF using its CSV shipment manifest.
    Manifest {
        /// CSV manifest of the shipment.
        csv: PathBuf,
        /// Label PDF of the same shipment.
        pdf: PathBuf,
        /// Output directory (default: shipment_<id> beside the PDF).
        #[arg(long, env = "SKU_SPLIT_OUTPUT_DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Pair every CSV in a folder with its PDF and split each pair.
    ManifestDir {
        /// Folder holding CSV manifests and label PDFs.
        dir: PathBuf,
    },
}

#[derive(Args, Debug)]
struct ScanArgs {
    /// A label PDF, or a folder of them.
    input: PathBuf,

    /// Parent directory for per-document output directories.
    #[arg(short, long, env = "SKU_SPLIT_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Header marker (repeatable); replaces the defaults when given.
    #[arg(long = "header-marker", env = "SKU_SPLIT_HEADER_MARKERS", value_delimiter = ',')]
    header_markers: Vec<String>,

    /// Quantity token (repeatable); replaces the defaults when given.
    #[arg(long = "quantity-token", env = "SKU_SPLIT_QUANTITY_TOKENS", value_delimiter = ',')]
    quantity_tokens: Vec<String>,

    /// Mark a document failed when any SKU file cannot be written.
    #[arg(long, env = "SKU_SPLIT_HARD_WRITE_FAILURES")]
    hard_write_failures: bool,

    /// Fail a document whose interleaved ranges share pages.
    #[arg(long, env = "SKU_SPLIT_REJECT_OVERLAP")]
    reject_overlap: bool,

    /// Fail a document whose Standard-mode verification does not match.
    #[arg(long, env = "SKU_SPLIT_STRICT_VERIFICATION")]
    strict_verification: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let global = &cli.global;

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner carries the user-facing feedback; library logs drop to
    // error level while it is active.
    let show_progress = !global.quiet && !global.no_progress && !global.json;
    let filter = if global.verbose {
        "debug"
    } else if global.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let spinner = show_progress.then(SpinnerObserver::new);
    let observer: &dyn StatusObserver = match spinner {
        Some(ref s) => s,
        None if !global.quiet && !global.json => &print_status,
        None => &NoopObserver,
    };

    let start = Instant::now();
    let outcome = match &cli.command {
        Command::Scan(args) => run_scan(args, global, observer),
        Command::Manifest {
            csv,
            pdf,
            output_dir,
        } => run_manifest(csv, pdf, output_dir.as_deref(), global, observer),
        Command::ManifestDir { dir } => run_manifest_dir(dir, global, observer),
    };
    if let Some(ref s) = spinner {
        s.finish();
    }

    let failed = outcome?;
    if !global.quiet && !global.json {
        eprintln!("{}", dim(&format!("Done in {}ms", start.elapsed().as_millis())));
    }
    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

/// Map `scan` args to `SplitConfig`.
fn build_config(args: &ScanArgs, global: &GlobalArgs) -> Result<SplitConfig> {
    let mut builder = SplitConfig::builder()
        .strict_verification(args.strict_verification)
        .write_failure_policy(if args.hard_write_failures {
            WriteFailurePolicy::Hard
        } else {
            WriteFailurePolicy::Soft
        })
        .overlap_policy(if args.reject_overlap {
            OverlapPolicy::Reject
        } else {
            OverlapPolicy::Allow
        });

    if !args.header_markers.is_empty() {
        builder = builder.header_markers(args.header_markers.iter().cloned());
    }
    if !args.quantity_tokens.is_empty() {
        builder = builder.quantity_tokens(args.quantity_tokens.iter().cloned());
    }
    if let Some(ref dir) = args.output_dir {
        builder = builder.output_root(dir);
    }
    if let Some(ref lib) = global.pdfium_lib {
        builder = builder.pdfium_library(lib);
    }

    builder.build().context("Invalid configuration")
}

fn bind_backend(global: &GlobalArgs) -> Result<PdfiumBackend> {
    PdfiumBackend::bind(global.pdfium_lib.as_deref()).context("Failed to load the PDF engine")
}

/// Returns true when any document failed.
fn run_scan(args: &ScanArgs, global: &GlobalArgs, observer: &dyn StatusObserver) -> Result<bool> {
    let config = build_config(args, global)?;
    let backend = bind_backend(global)?;
    let summary = process_path(&args.input, &backend, &config, observer)
        .with_context(|| format!("Cannot process {}", args.input.display()))?;

    if global.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    } else if !global.quiet {
        print_summary(&summary);
    }
    Ok(summary.failed > 0)
}

fn print_summary(summary: &BatchSummary) {
    for doc in &summary.documents {
        let name = doc.source.display().to_string();
        if !doc.success {
            eprintln!(
                "{} {}  {}",
                red("✘"),
                bold(&name),
                red(doc.error.as_deref().unwrap_or("failed"))
            );
            continue;
        }
        let mismatch = doc
            .verification
            .as_ref()
            .is_some_and(|v| v.status == VerificationStatus::Mismatch);
        eprintln!(
            "{} {}  {} mode  {} SKUs  {}/{} pages",
            if mismatch || doc.failed_files().next().is_some() {
                cyan("⚠")
            } else {
                green("✔")
            },
            bold(&name),
            doc.mode,
            doc.sku_count,
            doc.pages_written,
            doc.total_pages,
        );
    }
    eprintln!(
        "{} succeeded  /  {} failed  /  {} files  /  {} pages split",
        green(&summary.succeeded.to_string()),
        if summary.failed > 0 {
            red(&summary.failed.to_string())
        } else {
            summary.failed.to_string()
        },
        summary.total_files,
        summary.total_pages_split,
    );
}

fn split_pair(
    csv: &Path,
    pdf: &Path,
    output_dir: Option<&Path>,
    backend: &PdfiumBackend,
    observer: &dyn StatusObserver,
) -> Result<ManifestSplit> {
    let manifest = ShipmentManifest::from_path(csv)
        .with_context(|| format!("Cannot read manifest {}", csv.display()))?;
    observer.report(&format!(
        "Shipment {}: {} SKU group(s), {} box(es)",
        manifest.shipment_id,
        manifest.groups.len(),
        manifest.total_boxes()
    ));
    split_with_manifest(pdf, &manifest, backend, output_dir, observer)
        .with_context(|| format!("Failed to split {} with {}", pdf.display(), csv.display()))
}

fn run_manifest(
    csv: &Path,
    pdf: &Path,
    output_dir: Option<&Path>,
    global: &GlobalArgs,
    observer: &dyn StatusObserver,
) -> Result<bool> {
    let backend = bind_backend(global)?;
    let split = split_pair(csv, pdf, output_dir, &backend, observer)?;
    if global.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&split).context("Failed to serialise result")?
        );
    } else if !global.quiet {
        eprintln!(
            "{} {} files  {} pages  →  {}",
            green("✔"),
            split.files.len(),
            split.pages_written,
            bold(&split.output_dir.display().to_string())
        );
    }
    Ok(false)
}

fn run_manifest_dir(dir: &Path, global: &GlobalArgs, observer: &dyn StatusObserver) -> Result<bool> {
    let backend = bind_backend(global)?;
    let found = pair_manifests(dir).with_context(|| format!("Cannot list {}", dir.display()))?;
    for csv in &found.unmatched {
        observer.report(&format!(
            "Warn: no matching PDF for {}, skipping",
            csv.display()
        ));
    }

    let mut splits = Vec::new();
    let mut failed = 0;
    for (csv, pdf) in &found.pairs {
        observer.report(&format!("Processing shipment: {}", csv.display()));
        match split_pair(csv, pdf, None, &backend, observer) {
            Ok(split) => splits.push(split),
            Err(e) => {
                failed += 1;
                let msg = format!("{e:#}");
                observer.report(&format!("Error: {msg}"));
                if global.quiet {
                    eprintln!("{}", red(&msg));
                }
            }
        }
    }

    if global.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&splits).context("Failed to serialise results")?
        );
    } else if !global.quiet {
        eprintln!(
            "{} succeeded  /  {} failed  /  {} skipped",
            green(&splits.len().to_string()),
            if failed > 0 {
                red(&failed.to_string())
            } else {
                failed.to_string()
            },
            found.unmatched.len()
        );
    }
    Ok(failed > 0)
}
