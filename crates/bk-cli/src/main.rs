//! brickkit command line entry point

use std::path::PathBuf;

use anyhow::{Context, Result};
use bk_cad::{BoundingBox, default_kernel};
use bk_core::{
    BottomVariant, BrickConfig, BrickType, DerivedDimensions, ExportOptions, FeatureCount,
    ParameterSchema, StudVariant, assemble, derive_dimensions, export_stl,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

/// Parametric interlocking brick generator
#[derive(Parser)]
#[command(name = "brickkit")]
#[command(about = "Parametric interlocking brick generator", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a piece and print a JSON report
    Build {
        #[command(flatten)]
        source: Source,

        /// Also write the piece as binary STL (needs a tessellating kernel)
        #[arg(long)]
        stl: Option<PathBuf>,
    },

    /// Print derived dimensions without building geometry
    Dimensions {
        #[command(flatten)]
        source: Source,
    },

    /// Print the parameter schema as JSON
    Schema,

    /// Write a config file with default values
    Init {
        #[arg(name = "PATH")]
        path: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Brick,
    Tile,
    Baseplate,
}

impl From<Kind> for BrickType {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Brick => BrickType::Brick,
            Kind::Tile => BrickType::Tile,
            Kind::Baseplate => BrickType::Baseplate,
        }
    }
}

/// Where the parameters come from; flags override the config file
#[derive(Args, Default)]
struct Source {
    /// RON config file
    #[arg(long, short)]
    config: Option<PathBuf>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    length: Option<u32>,

    /// Height in block units: 1/3, 1/2 or a whole number
    #[arg(long, value_parser = parse_height)]
    height: Option<f64>,

    #[arg(long, value_enum)]
    kind: Option<Kind>,

    #[arg(long)]
    hollow_studs: bool,

    /// Closed bottom (no cavity)
    #[arg(long)]
    closed: bool,

    /// Technic holes through one-wide pieces
    #[arg(long)]
    horizontal_holes: bool,

    #[arg(long)]
    axle_holes: bool,

    #[arg(long)]
    reinforce: bool,

    #[arg(long)]
    no_splines: bool,

    #[arg(long)]
    no_posts: bool,
}

impl Source {
    fn resolve(&self) -> Result<BrickConfig> {
        let mut config = match &self.config {
            Some(path) => BrickConfig::load(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => BrickConfig::default(),
        };

        let p = &mut config.parameters;
        if let Some(width) = self.width {
            p.width = width;
        }
        if let Some(length) = self.length {
            p.length = length;
        }
        if let Some(height) = self.height {
            p.height = height;
        }
        if let Some(kind) = self.kind {
            p.brick_type = kind.into();
        }
        if self.hollow_studs {
            p.stud_variant = StudVariant::Hollow;
        }
        if self.closed {
            p.bottom_variant = BottomVariant::Closed;
        }
        p.horizontal_holes |= self.horizontal_holes;
        p.vertical_axle_holes |= self.axle_holes;
        p.use_reinforcement |= self.reinforce;
        p.include_splines &= !self.no_splines;
        p.with_posts &= !self.no_posts;

        Ok(config)
    }
}

/// Accepts "1/3" style fractions as well as plain numbers
fn parse_height(text: &str) -> Result<f64, String> {
    let value = match text.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().map_err(|e| format!("{e}"))?;
            let den: f64 = den.trim().parse().map_err(|e| format!("{e}"))?;
            num / den
        }
        None => text.trim().parse().map_err(|e| format!("{e}"))?,
    };
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("height must be positive, got {text}"))
    }
}

#[derive(Serialize)]
struct Report<'a> {
    kernel: &'a str,
    dimensions: &'a DerivedDimensions,
    features: &'a [FeatureCount],
    bounds: Option<BoundingBox>,
    stl_triangles: Option<usize>,
}

fn build(source: &Source, stl: Option<PathBuf>) -> Result<()> {
    let config = source.resolve()?;
    let kernel = default_kernel();
    tracing::info!(kernel = kernel.name(), "building brick");

    let brick = assemble(kernel.as_ref(), &config.parameters, &config.constants)?;
    let bounds = kernel.bounding_box(&brick.solid).ok();

    let stl_triangles = match stl {
        Some(output_path) => {
            let options = ExportOptions {
                output_path,
                ..config.export.clone()
            };
            let count = export_stl(kernel.as_ref(), &brick.solid, &options)
                .with_context(|| format!("failed to export {}", options.output_path.display()))?;
            Some(count)
        }
        None => None,
    };

    let report = Report {
        kernel: kernel.name(),
        dimensions: &brick.dimensions,
        features: &brick.features,
        bounds,
        stl_triangles,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    kernel.release(brick.solid);
    Ok(())
}

fn main() -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bk_core=info,bk_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Build { source, stl } => build(&source, stl),
        Commands::Dimensions { source } => {
            let config = source.resolve()?;
            let dims = derive_dimensions(&config.parameters, &config.constants)?;
            println!("{}", serde_json::to_string_pretty(&dims)?);
            Ok(())
        }
        Commands::Schema => {
            println!("{}", ParameterSchema::standard().to_json()?);
            Ok(())
        }
        Commands::Init { path } => {
            BrickConfig::default()
                .save(&path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "config written");
            Ok(())
        }
    }
}
