use std::path::{Path, PathBuf};

use bodyseg::{io, ExtractionConfig, SegmentationResult, Segmenter, Strategy, ThresholdMethod};
use clap::{Args, Parser, Subcommand, ValueEnum};
use flexi_logger::Logger;

#[derive(Parser)]
#[command(name = "bodyseg", about = "Silhouette contour extraction and body-part segmentation")]
struct Cli {
    /// Log level filter (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Trace a silhouette image and segment its outline
    Extract {
        /// Input image path (PNG, JPEG, BMP)
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Fixed brightness threshold (0-255) for opaque images
        #[arg(long, default_value = "127", conflicts_with = "otsu")]
        threshold: u8,

        /// Use Otsu's method instead of a fixed threshold
        #[arg(long)]
        otsu: bool,

        /// Alpha values above this count as foreground
        #[arg(long, default_value = "1")]
        alpha_threshold: u8,

        /// Invert the mask before tracing
        #[arg(long)]
        invert: bool,

        /// Simplification tolerance as a fraction of the perimeter (0 = off)
        #[arg(long, default_value = "0.0005")]
        epsilon: f64,

        #[command(flatten)]
        strategy: StrategyArgs,
    },

    /// Segment an existing contour file
    Split {
        /// Contour JSON (array of [x, y])
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        strategy: StrategyArgs,
    },

    /// Report the x/y extremes of a contour file
    Bounds {
        /// Contour JSON (array of [x, y])
        #[arg(short, long)]
        input: PathBuf,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Segment many contour files in parallel
    Batch {
        /// Contour JSON files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Write `<stem>_body_parts.json` for each success into this directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        strategy: StrategyArgs,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyKind {
    /// Fractions of the point count
    Proportional,
    /// Fixed index table for the reference contour
    Table,
}

#[derive(Args)]
struct StrategyArgs {
    /// Segmentation strategy
    #[arg(long, value_enum, default_value = "proportional")]
    strategy: StrategyKind,

    /// Points shared at each seam (proportional strategy)
    #[arg(long, default_value = "2")]
    overlap: usize,

    /// Custom index table JSON (table strategy)
    #[arg(long)]
    table: Option<PathBuf>,
}

impl StrategyArgs {
    fn to_strategy(&self) -> Result<Strategy, Box<dyn std::error::Error>> {
        Ok(match self.strategy {
            StrategyKind::Proportional => {
                if let Some(path) = &self.table {
                    return Err(format!(
                        "--table {} needs --strategy table",
                        path.display()
                    )
                    .into());
                }
                Strategy::Proportional {
                    overlap: self.overlap,
                }
            }
            StrategyKind::Table => Strategy::IndexTable(match &self.table {
                Some(path) => Some(io::load_table(path)?),
                None => None,
            }),
        })
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let _logger = Logger::try_with_str(&cli.log_level)?.log_to_stderr().start()?;

    match cli.command {
        Command::Extract {
            input,
            output,
            threshold,
            otsu,
            alpha_threshold,
            invert,
            epsilon,
            strategy,
        } => {
            let config = ExtractionConfig {
                threshold: if otsu {
                    ThresholdMethod::Otsu
                } else {
                    ThresholdMethod::Fixed(threshold)
                },
                alpha_threshold,
                invert,
                epsilon_fraction: epsilon,
                ..ExtractionConfig::default()
            };
            let strategy = strategy.to_strategy()?;

            eprintln!();
            eprintln!("  bodyseg \u{00b7} {}", input.display());
            eprintln!();

            let silhouette = bodyseg::segment_image(&input, &config, &strategy)?;
            let stem = file_stem(&input);
            let contour_path = output.join(format!("{}_contour.json", stem));
            io::save_contour(&contour_path, &silhouette.contour)?;
            eprintln!("  Contour     {} points", silhouette.contour.len());
            print_regions(&silhouette.segments);

            let parts_path = output.join(format!("{}_body_parts.json", stem));
            io::save_segments(&parts_path, &silhouette.segments)?;

            eprintln!();
            eprintln!("  \u{2713} {}", contour_path.display());
            eprintln!("  \u{2713} {}", parts_path.display());
        }

        Command::Split {
            input,
            output,
            strategy,
        } => {
            let segmenter = strategy.to_strategy()?.build()?;
            let contour = io::load_contour(&input)?;
            eprintln!("  Loaded      {} points from {}", contour.len(), input.display());

            let segments = segmenter.segment(&contour)?;
            print_regions(&segments);

            let stem = file_stem(&input);
            let parts_path = output.join(format!("{}_body_parts.json", stem));
            io::save_segments(&parts_path, &segments)?;
            let written = io::save_regions(&output.join(&stem), &segments)?;
            eprintln!("  \u{2713} {}", parts_path.display());
            eprintln!(
                "  \u{2713} {} region files in {}",
                written.len(),
                output.join(&stem).display()
            );
        }

        Command::Bounds { input, output } => {
            let contour = io::load_contour(&input)?;
            let extremes = contour
                .extremes()
                .ok_or_else(|| format!("{}: contour is empty", input.display()))?;
            match output {
                Some(path) => {
                    io::save_extremes(&path, &extremes)?;
                    eprintln!("  \u{2713} {}", path.display());
                }
                None => println!("{}", serde_json::to_string_pretty(&extremes)?),
            }
        }

        Command::Batch {
            files,
            output,
            strategy,
        } => {
            let segmenter = strategy.to_strategy()?.build()?;
            let report = bodyseg::batch::segment_files(&files, segmenter.as_ref());

            for (path, segments) in report.succeeded() {
                eprintln!("  ok          {} ({} regions)", path.display(), segments.len());
            }
            for (path, err) in report.failed() {
                eprintln!("  FAILED      {}: {}", path.display(), err);
            }

            let write_failures = match &output {
                Some(dir) => bodyseg::batch::save_results(&report, dir),
                None => Vec::new(),
            };
            for (path, err) in &write_failures {
                eprintln!("  FAILED      {}: {}", path.display(), err);
            }

            let failures = report.failure_count();
            if failures > 0 || !write_failures.is_empty() {
                return Err(format!(
                    "{} of {} files failed, {} result files not written",
                    failures,
                    files.len(),
                    write_failures.len()
                )
                .into());
            }
        }
    }

    Ok(())
}

fn print_regions(segments: &SegmentationResult) {
    for region in segments {
        eprintln!("  {:<12}{} points", region.part.as_str(), region.points.len());
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "contour".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy_of(args: &[&str]) -> Result<Strategy, Box<dyn std::error::Error>> {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Split { strategy, .. } => strategy.to_strategy(),
            _ => panic!("expected split"),
        }
    }

    #[test]
    fn table_with_proportional_strategy_is_rejected() {
        let err = strategy_of(&[
            "bodyseg", "split", "-i", "c.json", "-o", "out", "--table", "t.json",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("--strategy table"));
    }

    #[test]
    fn strategy_flags_map_to_strategies() {
        let proportional = strategy_of(&["bodyseg", "split", "-i", "c.json", "-o", "out"]).unwrap();
        assert_eq!(proportional, Strategy::Proportional { overlap: 2 });

        let table = strategy_of(&[
            "bodyseg", "split", "-i", "c.json", "-o", "out", "--strategy", "table",
        ])
        .unwrap();
        assert_eq!(table, Strategy::IndexTable(None));
    }
}
