//! Parametric Interlocking Brick Geometry
//!
//! This crate provides:
//! - Brick parameters, constants and their schema
//! - Dimension derivation (pure, no geometry)
//! - Independent feature builders (shell, studs, splines, posts, pins,
//!   reinforcement, Technic holes, axle cutouts)
//! - The two-phase assembly pipeline producing one solid
//! - Grid positioning helpers, RON config files and STL export

pub mod assembly;
pub mod config;
pub mod constants;
pub mod dimensions;
pub mod error;
pub mod export;
pub mod features;
pub mod params;
pub mod positioning;
pub mod schema;

// Re-exports for convenience
pub use assembly::{
    AssemblyPlan, BrickBuild, FeatureCount, assemble, build_brick, plan_brick, plan_with,
};
pub use config::{BrickConfig, ConfigError};
pub use constants::BrickConstants;
pub use dimensions::{DerivedDimensions, GridLayout, derive_dimensions, feature_span};
pub use error::{BrickError, BrickResult};
pub use export::{ExportError, ExportOptions, export_stl};
pub use features::{FeatureDescriptor, FeatureRole, FeatureSet, STANDARD_FEATURES};
pub use params::{BottomVariant, BrickParameters, BrickType, StudVariant};
pub use positioning::{place, stack, uncenter};
pub use schema::{ParameterSchema, ParameterSpec};
