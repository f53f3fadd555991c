//! LakeSeg CLI - Unsupervised lake segmentation for landscape photographs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use image::imageops::FilterType;
use image::{GrayImage, RgbImage};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use lakeseg_algorithms::descriptor::describe_image;
use lakeseg_algorithms::pipeline::{LakeSegmenter, SegmentationParams};
use lakeseg_algorithms::texture::GlcmParams;
use lakeseg_core::{Mask, PixelGrid};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "lakeseg")]
#[command(author, version, about = "Unsupervised lake segmentation", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Segment the lake in a photograph and write the masks as PNG
    Segment {
        /// Input image (PNG or JPEG)
        input: PathBuf,
        /// Directory for the output masks
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
        /// JSON parameter file; missing fields keep their defaults
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Number of clusters
        #[arg(short)]
        k: Option<usize>,
        /// Random seed for centroid initialization
        #[arg(long)]
        seed: Option<u64>,
        /// Number of k-means restarts
        #[arg(long)]
        restarts: Option<usize>,
        /// Maximum Lloyd iterations per restart
        #[arg(long)]
        max_iterations: Option<usize>,
    },
    /// Print the HSV + GLCM descriptor of an image
    Describe {
        /// Input image (PNG or JPEG)
        input: PathBuf,
        /// Resize to N×N before describing (0 keeps the decoded size)
        #[arg(long, default_value = "256")]
        resize: u32,
    },
    /// Print the default segmentation parameters as JSON
    Params,
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install log subscriber")
}

fn spinner(msg: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .context("Invalid spinner template")?,
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(pb)
}

fn read_image(path: &Path, resize: Option<u32>) -> Result<PixelGrid> {
    let pb = spinner("Reading image...")?;
    let mut img = image::open(path)
        .with_context(|| format!("Failed to read image {}", path.display()))?
        .to_rgb8();
    if let Some(size) = resize.filter(|&s| s > 0) {
        img = image::imageops::resize(&img, size, size, FilterType::Triangle);
    }
    pb.finish_and_clear();

    let (width, height) = img.dimensions();
    info!("Input: {} x {}", width, height);
    PixelGrid::from_rgb8(height as usize, width as usize, img.as_raw())
        .context("Failed to convert image to pixel grid")
}

fn read_params(path: Option<&Path>) -> Result<SegmentationParams> {
    let Some(path) = path else {
        return Ok(SegmentationParams::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config {}", path.display()))
}

fn write_mask(mask: &Mask, path: &Path) -> Result<()> {
    let (rows, cols) = mask.shape();
    let img = GrayImage::from_raw(cols as u32, rows as u32, mask.to_bytes())
        .context("Mask buffer does not match its shape")?;
    img.save(path)
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn write_rgb(grid: &PixelGrid, path: &Path) -> Result<()> {
    let (rows, cols) = grid.shape();
    let img = RgbImage::from_raw(cols as u32, rows as u32, grid.to_rgb8())
        .context("Image buffer does not match its shape")?;
    img.save(path)
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        // ── Segment ──────────────────────────────────────────────────
        Commands::Segment {
            input,
            output_dir,
            config,
            k,
            seed,
            restarts,
            max_iterations,
        } => {
            let mut params = read_params(config.as_deref())?;
            if let Some(k) = k {
                params.clustering.k = k;
            }
            if let Some(seed) = seed {
                params.clustering.seed = seed;
            }
            if let Some(restarts) = restarts {
                params.clustering.restarts = restarts;
            }
            if let Some(max_iterations) = max_iterations {
                params.clustering.max_iterations = max_iterations;
            }
            debug!(?params, "segmentation parameters");

            let grid = read_image(&input, None)?;

            let start = Instant::now();
            let pb = spinner("Segmenting...")?;
            let result = LakeSegmenter::new(params)
                .segment(&grid)
                .with_context(|| format!("Failed to segment {}", input.display()))?;
            pb.finish_and_clear();
            let elapsed = start.elapsed();

            std::fs::create_dir_all(&output_dir).with_context(|| {
                format!("Failed to create output directory {}", output_dir.display())
            })?;

            let pb = spinner("Writing masks...")?;
            let outputs = [
                ("candidate_mask.png", &result.candidate),
                ("vegetation_mask.png", &result.vegetation),
                ("cleaned_mask.png", &result.vegetation_cleaned),
                ("lake_mask.png", result.mask()),
            ];
            for (name, mask) in outputs {
                write_mask(mask, &output_dir.join(name))?;
            }
            let composite = result
                .composite(&grid)
                .context("Failed to build segmented image")?;
            let composite_path = output_dir.join("lake_segmented.png");
            write_rgb(&composite, &composite_path)?;
            pb.finish_and_clear();

            println!("Selected cluster: {}", result.selection.cluster);
            println!("Score: {:.4}", result.selection.score);
            println!("Lake coverage: {:.2}%", 100.0 * result.mask().coverage());
            done("Lake mask", &output_dir.join("lake_mask.png"), elapsed);
        }

        // ── Describe ─────────────────────────────────────────────────
        Commands::Describe { input, resize } => {
            let grid = read_image(&input, Some(resize))?;

            let start = Instant::now();
            let descriptor = describe_image(&grid, GlcmParams::default())
                .with_context(|| format!("Failed to describe {}", input.display()))?;
            let elapsed = start.elapsed();

            println!("File: {}", input.display());
            for (label, value) in descriptor.labeled() {
                println!("  {:<14} {:.6}", label, value);
            }
            println!("  Processing time: {:.2?}", elapsed);
        }

        // ── Params ───────────────────────────────────────────────────
        Commands::Params => {
            let json = serde_json::to_string_pretty(&SegmentationParams::default())
                .context("Failed to serialize parameters")?;
            println!("{}", json);
        }
    }

    Ok(())
}
