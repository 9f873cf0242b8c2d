//! Grid-to-world helpers for composing several pieces
//!
//! Horizontal offsets are in grid units, vertical offsets in block heights.

use bk_cad::{CadKernel, Solid};
use glam::DVec3;

use crate::assembly::union_tree;
use crate::constants::BrickConstants;
use crate::dimensions::DerivedDimensions;
use crate::error::{BrickError, BrickResult};

/// World offset of a grid position
pub fn grid_offset(units: DVec3, constants: &BrickConstants) -> DVec3 {
    DVec3::new(
        units.x * constants.grid_spacing,
        units.y * constants.grid_spacing,
        units.z * constants.block_height,
    )
}

/// Move a solid to a grid position
pub fn place(
    kernel: &dyn CadKernel,
    solid: Solid,
    units: DVec3,
    constants: &BrickConstants,
) -> BrickResult<Solid> {
    kernel
        .moved(solid, grid_offset(units, constants))
        .map_err(|e| BrickError::kernel("place", e))
}

/// Union already placed solids, then move the group to a grid position
pub fn stack(
    kernel: &dyn CadKernel,
    solids: Vec<Solid>,
    units: DVec3,
    constants: &BrickConstants,
) -> BrickResult<Solid> {
    let group = union_tree(kernel, solids)?;
    place(kernel, group, units, constants)
}

/// Undo the pipeline's centering.
///
/// Afterwards the piece occupies its grid cells starting at the origin, with
/// the play gap on every side.
pub fn uncenter(
    kernel: &dyn CadKernel,
    solid: Solid,
    dims: &DerivedDimensions,
    constants: &BrickConstants,
) -> BrickResult<Solid> {
    let cells = DVec3::new(
        f64::from(dims.normalized_length),
        f64::from(dims.normalized_width),
        0.0,
    );
    kernel
        .moved(solid, grid_offset(cells, constants) / 2.0)
        .map_err(|e| BrickError::kernel("uncenter", e))
}
