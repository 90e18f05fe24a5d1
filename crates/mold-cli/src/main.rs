//! MoldForge command-line tool.
//!
//! Reads a solid part from an STL file and writes the two halves of a
//! casting mold next to it:
//!
//! ```text
//! moldforge part.stl --wall-thickness 8 --key-count 4
//! ```
//!
//! produces `part_top.stl` and `part_bottom.stl`. Both halves are
//! fully computed before either file is created, so a failure never
//! leaves a lone half on disk.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use mold_pipeline::{generate_mold, MoldParams};
use mold_types::MeshTopology;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Generate a two-part casting mold from an STL part.
#[derive(Parser)]
#[command(name = "moldforge")]
#[command(version)]
struct Cli {
    /// The part to mold, as an STL file.
    #[arg(name = "INPUT")]
    input: PathBuf,

    /// Mold wall thickness around the part, mm.
    #[arg(long, default_value_t = 10.0)]
    wall_thickness: f64,

    /// Number of alignment keys (0 disables keys).
    #[arg(long, default_value_t = 4)]
    key_count: usize,

    /// Key base radius, mm. Defaults to a fifth of the wall thickness.
    #[arg(long)]
    key_radius: Option<f64>,

    /// Pour spout radius, mm. Defaults to a third of the wall thickness.
    #[arg(long)]
    spout_radius: Option<f64>,

    /// Directory for the output files. Defaults to the input's directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Write ASCII STL instead of binary.
    #[arg(long)]
    ascii: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let Some(stem) = cli.input.file_stem() else {
        bail!("input path has no file name: {}", cli.input.display());
    };
    let out_dir = match &cli.output_dir {
        Some(dir) => dir.clone(),
        None => cli.input.parent().map_or_else(PathBuf::new, PathBuf::from),
    };

    let mesh = mold_io::load_stl(&cli.input)
        .with_context(|| format!("loading {}", cli.input.display()))?;
    info!(
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "part loaded"
    );

    let mut params = MoldParams::default()
        .with_wall_thickness(cli.wall_thickness)
        .with_key_count(cli.key_count);
    if let Some(r) = cli.key_radius {
        params = params.with_key_radius(r);
    }
    if let Some(r) = cli.spout_radius {
        params = params.with_spout_radius(r);
    }

    let halves = generate_mold(&mesh, &params).context("generating mold")?;

    let mut stem = stem.to_os_string();
    stem.push("_");
    let mut top_name = stem.clone();
    top_name.push("top.stl");
    let mut bottom_name = stem;
    bottom_name.push("bottom.stl");

    let top_path = out_dir.join(top_name);
    let bottom_path = out_dir.join(bottom_name);

    mold_io::save_stl(&halves.top, &top_path, !cli.ascii)
        .with_context(|| format!("writing {}", top_path.display()))?;
    mold_io::save_stl(&halves.bottom, &bottom_path, !cli.ascii)
        .with_context(|| format!("writing {}", bottom_path.display()))?;

    info!(
        top = %top_path.display(),
        bottom = %bottom_path.display(),
        "mold written"
    );
    Ok(())
}
