//! Geometry Kernel Abstraction
//!
//! This crate provides:
//! - The `CadKernel` trait every geometry backend implements
//! - Profiles, sketch planes, axes and bounding boxes shared by the backends
//! - A CSG-tree kernel with exact point queries (default)
//! - A Truck B-Rep kernel with tessellation (`truck` feature)

pub mod kernel;

// Re-exports for convenience
pub use kernel::{
    Axis3D, BooleanType, BoundingBox, CadError, CadKernel, CadResult, CsgKernel, NullKernel,
    SketchPlane, Solid, TessellatedMesh, Wire2D, default_kernel,
};

#[cfg(feature = "truck")]
pub use kernel::TruckKernel;
