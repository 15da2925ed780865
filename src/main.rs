use clap::{Parser, Subcommand};
use squishpic::config::{self, CompressorConfig};
use squishpic::dedup::Compressor;
use squishpic::imaging::{CustomSettings, QualityTier, RustBackend, supported_input_extensions};
use squishpic::job::Pipeline;
use squishpic::output::{self, RunSummary};
use squishpic::request::CompressionRequest;
use squishpic::source::{FileSource, SourceId};
use squishpic::store::DirectoryStore;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "squishpic")]
#[command(about = "Shrink photos by resizing and re-encoding them as JPEG")]
#[command(long_about = "\
Shrink photos by resizing and re-encoding them as JPEG

Quality tiers bound the longer edge relative to the original and pick the
JPEG quality:

  low     quality 60, longer edge at most 40% of the original
  medium  quality 70, longer edge at most 50% of the original (default)
  high    quality 80, longer edge at most 75% of the original

Custom settings (--width, --height, --quality together) replace the tier
entirely; the image is scaled to exactly that size.

EXIF orientation is applied, so portrait shots stay upright. Results go to
<output>/<collection>/ and existing files are never overwritten.

Run 'squishpic gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct CompressArgs {
    /// Image files, file:// URIs, or directories to search for images
    #[arg(required = true)]
    sources: Vec<String>,

    /// Quality tier (overrides the config default)
    #[arg(long, value_enum)]
    tier: Option<QualityTier>,

    /// Exact output width in pixels
    #[arg(long, requires_all = ["height", "quality"])]
    width: Option<u32>,

    /// Exact output height in pixels
    #[arg(long, requires_all = ["width", "quality"])]
    height: Option<u32>,

    /// JPEG quality 0-100
    #[arg(long, requires_all = ["width", "height"])]
    quality: Option<u32>,

    /// Output name without extension (default: IMG-<timestamp>.jpg)
    #[arg(long)]
    name: Option<String>,

    /// Deduplication key (default: the source identifier)
    #[arg(long)]
    key: Option<String>,

    /// Content store root (overrides output.directory)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print one JSON object per result instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Compress images into the content store
    Compress(CompressArgs),
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Compress(args) => {
            let config = config::load_or_default(cli.config.as_deref())?;
            compress(&config, args)?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn compress(config: &CompressorConfig, args: CompressArgs) -> Result<(), Box<dyn std::error::Error>> {
    let custom = match (args.width, args.height, args.quality) {
        (Some(w), Some(h), Some(q)) => Some(CustomSettings::new(w, h, q)?),
        _ => None,
    };
    let tier = args.tier.unwrap_or(config.compression.tier);
    let root = args
        .output
        .clone()
        .unwrap_or_else(|| config.output.directory.clone());

    let mut requests = Vec::new();
    for source in expand_sources(&args.sources) {
        let mut request = CompressionRequest::new(source)?.with_tier(tier);
        if let Some(custom) = custom {
            request = request.with_custom(custom);
        }
        if let Some(name) = &args.name {
            request = request.with_name(name.clone())?;
        }
        if let Some(key) = &args.key {
            request = request.with_dedup_key(key.clone());
        }
        requests.push(request);
    }

    let pipeline = Pipeline::new(
        RustBackend::new(),
        FileSource::new(),
        DirectoryStore::new(root),
        config.output.collection.clone(),
    );
    let (tx, rx) = std::sync::mpsc::channel();
    let compressor = Compressor::new(
        pipeline,
        config::effective_workers(&config.processing),
        tx,
    )?;

    let mut summary = RunSummary {
        submitted: requests.len(),
        ..RunSummary::default()
    };
    let mut admitted = 0;
    for request in &requests {
        if compressor.submit(request) {
            admitted += 1;
        } else {
            summary.duplicates += 1;
        }
    }

    for index in 1..=admitted {
        let Ok(report) = rx.recv() else { break };
        summary.record(&report.outcome);
        if args.json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            output::print_report(index, &report);
        }
    }
    if !args.json {
        output::print_summary(&summary);
    }

    if summary.failed > 0 {
        return Err(format!("{} of {} images failed", summary.failed, summary.submitted).into());
    }
    Ok(())
}

/// Expand directories into the supported images below them; everything else
/// is passed through as a source identifier.
fn expand_sources(raw: &[String]) -> Vec<SourceId> {
    let mut sources = Vec::new();
    for entry in raw {
        let path = Path::new(entry);
        if !path.is_dir() {
            sources.push(SourceId::new(entry.clone()));
            continue;
        }
        let mut found: Vec<PathBuf> = WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && is_supported_image(e.path()))
            .map(|e| e.into_path())
            .collect();
        found.sort();
        sources.extend(found.iter().map(|p| SourceId::from(p.as_path())));
    }
    sources
}

fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}
