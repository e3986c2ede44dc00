//! uvf-export - VTK/VTP/STL to UVF converter
//!
//! Converts geometry files into UVF output directories
//! (manifest.json + .bin buffers)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use uvf_export::config::JobFile;
use uvf_export::inspect::{self, ManifestSummary};
use uvf_export::{ConversionJob, ConversionMode, ConversionReport, Converter, ReadOptions};

#[derive(Parser)]
#[command(name = "uvf-export")]
#[command(about = "VTK/VTP/STL to UVF converter")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate a file without writing output
    Parse {
        /// Input .vtk/.vtp/.stl file
        input: PathBuf,

        /// Keep every STL facet corner as its own vertex
        #[arg(long)]
        no_dedup: bool,
    },

    /// Convert a file or directory to UVF
    Convert {
        /// Input file, or directory for batch mode
        input: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// basic, structured, directory or auto
        #[arg(short, long, default_value = "auto")]
        mode: String,

        /// Replace a previous conversion in the output directory
        #[arg(short, long)]
        force: bool,

        /// Keep every STL facet corner as its own vertex
        #[arg(long)]
        no_dedup: bool,
    },

    /// Count .vtk/.vtp files in a directory
    Count {
        /// Directory to scan
        dir: PathBuf,
    },

    /// Run every job in a TOML job file
    Build {
        /// Path to the job file
        #[arg(default_value = "uvf-jobs.toml")]
        jobs: PathBuf,
    },

    /// Summarize a written manifest
    Inspect {
        /// manifest.json or an output directory
        path: PathBuf,

        /// Print the node hierarchy
        #[arg(short, long)]
        tree: bool,
    },
}

fn print_report(report: &ConversionReport) {
    let stats = &report.stats;
    tracing::info!(
        "{}: {} points, {} triangles, {} files, {} groups",
        stats.operation,
        stats.points,
        stats.triangles,
        stats.files,
        stats.groups
    );
    for failure in &report.failures {
        tracing::warn!("  failed: {}", failure);
    }
}

fn finish(report: &ConversionReport) -> Result<()> {
    print_report(report);
    if report.success {
        Ok(())
    } else {
        anyhow::bail!("{}", report.error)
    }
}

fn build(jobs_path: &Path) -> Result<()> {
    let file = JobFile::load(jobs_path)?;
    let base = jobs_path.parent().unwrap_or_else(|| Path::new("."));
    let jobs = file.jobs(base)?;
    if jobs.is_empty() {
        tracing::warn!("No jobs in {:?}", jobs_path);
        return Ok(());
    }

    let mut converter = Converter::new();
    let mut failed = 0;
    for job in &jobs {
        tracing::info!("[{}] {:?} -> {:?}", job.mode, job.input, job.output);
        let report = converter.run(job);
        print_report(&report);
        if !report.success {
            tracing::error!("{}", report.error);
            failed += 1;
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} jobs failed", failed, jobs.len());
    }
    tracing::info!("All {} jobs complete!", jobs.len());
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { input, no_dedup } => {
            let read = ReadOptions {
                dedup_vertices: !no_dedup,
            };
            let mut converter = Converter::new();
            finish(&converter.parse_with(&input, read))?;
        }

        Commands::Convert {
            input,
            output,
            mode,
            force,
            no_dedup,
        } => {
            let mode = ConversionMode::resolve(&mode, &input)?;
            tracing::info!("Converting {:?} -> {:?} ({})", input, output, mode);
            let job = ConversionJob::new(input, output, mode)
                .with_force(force)
                .with_dedup(!no_dedup);
            let mut converter = Converter::new();
            finish(&converter.run(&job))?;
            tracing::info!("Done!");
        }

        Commands::Count { dir } => {
            let count = uvf_export::count_matching_files(&dir)?;
            println!("{count}");
        }

        Commands::Build { jobs } => build(&jobs)?,

        Commands::Inspect { path, tree } => {
            let nodes = inspect::load_manifest(&path)
                .with_context(|| format!("Failed to load manifest from {:?}", path))?;
            let summary = ManifestSummary::from_nodes(&nodes);
            println!(
                "{} nodes: {} GeometryGroup, {} SolidGeometry, {} Face",
                summary.nodes, summary.geometry_groups, summary.solid_geometries, summary.faces
            );
            println!(
                "{} triangles, {} vertices",
                summary.triangles, summary.vertices
            );
            for (solid, fields) in &summary.fields {
                println!("  {solid}: {}", fields.join(", "));
            }
            for file in &summary.buffer_files {
                println!("  buffer {file}");
            }
            if tree {
                print!("{}", inspect::render_tree(&nodes));
            }
            let dangling = inspect::dangling_references(&nodes);
            for (from, to) in &dangling {
                tracing::warn!("{} references missing node {}", from, to);
            }
            if !dangling.is_empty() {
                anyhow::bail!("{} dangling references", dangling.len());
            }
        }
    }

    Ok(())
}
