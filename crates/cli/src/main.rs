//! AgroRisk CLI - spectral indices and crop risk analysis for multispectral TIFFs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use agrorisk_algorithms::imagery::{savi, BandMapping, IndexSummary, SaviParams, SpectralIndex};
use agrorisk_algorithms::risk::{
    analyze, analyze_with_indices, AnalysisParams, AnalysisReport, AnnotatorParams,
    MinimumDistanceClassifier, RiskCatalog, RiskMapperParams,
};
use agrorisk_colormap::{auto_params, health_map, raster_to_rgb, risk_map_to_rgb, ColorScheme};
use agrorisk_core::io::{read_cube, write_raster, write_rgb};
use agrorisk_core::{Raster, RasterElement, SpectralCube};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "agrorisk")]
#[command(author, version, about = "Spectral indices and crop risk analysis", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Band positions shared by the commands that compute indices
#[derive(clap::Args, Clone, Copy)]
struct BandArgs {
    /// Red band index (0-based)
    #[arg(long, default_value = "2")]
    red: usize,
    /// Near-infrared band index
    #[arg(long, default_value = "3")]
    nir: usize,
    /// Red-edge band index
    #[arg(long, default_value = "3")]
    red_edge: usize,
    /// Short-wave infrared band index
    #[arg(long, default_value = "5")]
    swir: usize,
}

impl From<BandArgs> for BandMapping {
    fn from(b: BandArgs) -> Self {
        BandMapping {
            red: b.red,
            nir: b.nir,
            red_edge: b.red_edge,
            swir: b.swir,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show dimensions and per-band statistics of a multispectral TIFF
    Info {
        /// Input raster file
        input: PathBuf,
    },
    /// Compute spectral indices and the NDVI health map
    Indices {
        /// Input multispectral TIFF (bands interleaved per pixel)
        input: PathBuf,
        /// Output directory for <index>.tif and health_map.tif
        output_dir: PathBuf,
        #[command(flatten)]
        bands: BandArgs,
        /// Indices to compute: ndvi, ndre, msi, savi (default: all)
        #[arg(short, long = "index", value_delimiter = ',')]
        indices: Vec<String>,
        /// SAVI soil brightness factor L
        #[arg(short, long, default_value = "0.5")]
        l_factor: f32,
        /// Also write a color preview <index>_rgb.tif per index
        #[arg(long)]
        preview: bool,
    },
    /// Map crop risk with a minimum distance classifier and report alerts
    Analyze {
        /// Input multispectral TIFF
        input: PathBuf,
        /// Class signatures (JSON)
        #[arg(short, long)]
        signatures: PathBuf,
        /// Risk catalog (JSON); the built-in catalog is used if omitted
        #[arg(short, long)]
        catalog: Option<PathBuf>,
        /// Report output file; printed to stdout if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Directory for risk_map.tif, confidence_map.tif and risk_rgb.tif
        #[arg(long)]
        maps_dir: Option<PathBuf>,
        /// Largest patch edge in pixels
        #[arg(short, long, default_value = "32")]
        patch_size: usize,
        /// Minimum region area as a fraction of the raster
        #[arg(long, default_value = "0.01")]
        min_area: f64,
        /// Summarize all spectral indices in the report
        #[arg(long)]
        with_indices: bool,
        #[command(flatten)]
        bands: BandArgs,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_input(path: &Path) -> Result<SpectralCube> {
    let pb = spinner("Reading raster...");
    let cube = read_cube(path).with_context(|| format!("Failed to read {}", path.display()))?;
    pb.finish_and_clear();
    let (rows, cols, bands) = cube.shape();
    info!("Input: {} x {} with {} bands", cols, rows, bands);
    Ok(cube)
}

fn write_map<T: RasterElement>(raster: &Raster<T>, path: &Path) -> Result<()> {
    let pb = spinner("Writing output...");
    write_raster(raster, path).with_context(|| format!("Failed to write {}", path.display()))?;
    pb.finish_and_clear();
    Ok(())
}

fn write_image(image: &ndarray::Array3<u8>, path: &Path) -> Result<()> {
    let pb = spinner("Writing output...");
    write_rgb(image, path).with_context(|| format!("Failed to write {}", path.display()))?;
    pb.finish_and_clear();
    Ok(())
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

fn parse_indices(names: &[String]) -> Result<Vec<SpectralIndex>> {
    if names.is_empty() {
        return Ok(SpectralIndex::ALL.to_vec());
    }
    names
        .iter()
        .map(|n| {
            SpectralIndex::from_name(n).ok_or_else(|| {
                anyhow::anyhow!("Unknown index: {}. Use ndvi, ndre, msi or savi.", n)
            })
        })
        .collect()
}

fn print_summary(index: SpectralIndex, summary: &IndexSummary) {
    println!(
        "  {:<5} min {:>8.4}  max {:>8.4}  mean {:>8.4}",
        index.name().to_uppercase(),
        summary.min,
        summary.max,
        summary.mean
    );
}

fn index_scheme(index: SpectralIndex) -> ColorScheme {
    match index {
        SpectralIndex::Msi => ColorScheme::BlueWhiteRed,
        _ => ColorScheme::Ndvi,
    }
}

fn load_catalog(path: Option<&Path>) -> Result<RiskCatalog> {
    match path {
        Some(p) => {
            let json = std::fs::read_to_string(p)
                .with_context(|| format!("Failed to read catalog {}", p.display()))?;
            RiskCatalog::from_json(&json).context("Invalid risk catalog")
        }
        None => Ok(RiskCatalog::default()),
    }
}

fn load_classifier(path: &Path, catalog: &RiskCatalog) -> Result<MinimumDistanceClassifier> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read signatures {}", path.display()))?;
    let classifier = MinimumDistanceClassifier::from_json(&json).context("Invalid signatures")?;

    let sig_names: Vec<&str> = classifier.signatures().iter().map(|s| s.name.as_str()).collect();
    let class_names: Vec<&str> = catalog.classes.iter().map(|c| c.name.as_str()).collect();
    if sig_names != class_names {
        anyhow::bail!(
            "Signature classes {:?} do not match catalog classes {:?}",
            sig_names,
            class_names
        );
    }
    Ok(classifier)
}

fn write_report(report: &AnalysisReport, output: Option<&Path>) -> Result<()> {
    let json = report.to_json_pretty().context("Failed to serialize report")?;
    match output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", json),
    }
    Ok(())
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        // ── Info ─────────────────────────────────────────────────────
        Commands::Info { input } => {
            let cube = read_input(&input)?;
            let (rows, cols, bands) = cube.shape();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} pixels)", cols, rows, cube.pixel_count());
            println!("Bands: {}", bands);
            println!("\nBand statistics:");
            for b in 0..bands {
                let band = Raster::from_array(cube.band(b)?.to_owned());
                let stats = band.statistics();
                println!(
                    "  Band {}: min {:.4}  max {:.4}  mean {:.4}  valid {}",
                    b,
                    stats.min.unwrap_or(f32::NAN),
                    stats.max.unwrap_or(f32::NAN),
                    stats.mean.unwrap_or(f64::NAN),
                    stats.valid_count
                );
            }
        }

        // ── Indices ──────────────────────────────────────────────────
        Commands::Indices {
            input,
            output_dir,
            bands,
            indices,
            l_factor,
            preview,
        } => {
            let indices = parse_indices(&indices)?;
            let bands = BandMapping::from(bands);
            let cube = read_input(&input)?;
            std::fs::create_dir_all(&output_dir)
                .with_context(|| format!("Failed to create {}", output_dir.display()))?;

            let start = Instant::now();
            let mut ndvi_map = None;
            println!("Index summaries:");
            for index in indices {
                let result = match index {
                    SpectralIndex::Savi => savi(&cube, bands.red, bands.nir, SaviParams { l_factor }),
                    other => other.compute(&cube, &bands),
                };
                // One failing index does not stop the others
                let raster = match result {
                    Ok(r) => r,
                    Err(e) => {
                        warn!("Skipping {}: {}", index.name().to_uppercase(), e);
                        continue;
                    }
                };

                print_summary(index, &IndexSummary::of(&raster));
                write_map(&raster, &output_dir.join(format!("{}.tif", index.name())))?;
                if preview {
                    let image = raster_to_rgb(&raster, &auto_params(&raster, index_scheme(index)));
                    write_image(&image, &output_dir.join(format!("{}_rgb.tif", index.name())))?;
                }
                if index == SpectralIndex::Ndvi {
                    ndvi_map = Some(raster);
                }
            }

            match ndvi_map {
                Some(ndvi) => {
                    let path = output_dir.join("health_map.tif");
                    write_image(&health_map(&ndvi), &path)?;
                    done("Health map", &path, start.elapsed());
                }
                None => println!("Processing time: {:.2?}", start.elapsed()),
            }
        }

        // ── Analyze ──────────────────────────────────────────────────
        Commands::Analyze {
            input,
            signatures,
            catalog,
            output,
            maps_dir,
            patch_size,
            min_area,
            with_indices,
            bands,
        } => {
            let catalog = load_catalog(catalog.as_deref())?;
            let classifier = load_classifier(&signatures, &catalog)?;
            let cube = read_input(&input)?;
            let params = AnalysisParams {
                mapper: RiskMapperParams {
                    max_patch_size: patch_size,
                },
                annotator: AnnotatorParams {
                    min_area_fraction: min_area,
                },
            };
            params.annotator.validate().context("Invalid --min-area")?;

            let start = Instant::now();
            let pb = spinner("Analyzing risk...");
            let report = if with_indices {
                let (report, _) = analyze_with_indices(
                    &cube,
                    &classifier,
                    &catalog,
                    &params,
                    &BandMapping::from(bands),
                    SpectralIndex::ALL,
                )
                .context("Risk analysis failed")?;
                report
            } else {
                analyze(&cube, &classifier, &catalog, &params).context("Risk analysis failed")?
            };
            pb.finish_and_clear();
            let elapsed = start.elapsed();

            if let Some(dir) = maps_dir {
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
                write_map(&report.risk_map, &dir.join("risk_map.tif"))?;
                write_map(&report.confidence_map, &dir.join("confidence_map.tif"))?;
                write_image(&risk_map_to_rgb(&report.risk_map), &dir.join("risk_rgb.tif"))?;
            }

            write_report(&report, output.as_deref())?;
            info!(
                "Overall: {} ({:.1}%), {} alert(s)",
                report.overall_prediction,
                report.overall_confidence * 100.0,
                report.alerts.len()
            );
            if let Some(path) = output {
                done("Report", &path, elapsed);
            }
        }
    }

    Ok(())
}
