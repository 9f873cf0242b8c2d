//! Hollow columns at interior grid intersections

use bk_cad::Wire2D;
use glam::DVec3;

use super::{BuildContext, FeatureRole, FeatureSet};
use crate::constants::{BrickConstants, CUT_MARGIN};
use crate::dimensions::DerivedDimensions;
use crate::error::BrickResult;
use crate::params::BrickParameters;

pub const NAME: &str = "posts";

pub fn enabled(params: &BrickParameters, dims: &DerivedDimensions) -> bool {
    dims.is_open() && params.with_posts && dims.has_interior_grid()
}

/// Length of the cross slot: from below the bottom face to one grid unit
/// above the top face
pub fn axle_slot_height(dims: &DerivedDimensions, constants: &BrickConstants) -> f64 {
    CUT_MARGIN + dims.overall_height + constants.grid_spacing
}

/// Annular posts reaching into the roof; with vertical axle holes the bore is
/// a cross instead.
pub fn build(ctx: &BuildContext<'_>) -> BrickResult<Option<FeatureSet>> {
    let dims = ctx.dims;
    let c = ctx.constants;
    let top = ctx.interior_top();

    ctx.collect(NAME, FeatureRole::Additive, dims.posts.positions(), |p| {
        let post = ctx.column(NAME, p.extend(0.0), c.post_diameter, top, DVec3::Z)?;
        let bore = if ctx.params.vertical_axle_holes {
            ctx.prism(
                NAME,
                &Wire2D::cross(p, c.axle_spline_width, c.axle_diameter),
                -CUT_MARGIN,
                axle_slot_height(dims, c),
            )
        } else {
            ctx.column(
                NAME,
                p.extend(-CUT_MARGIN),
                c.post_inner_diameter(),
                top + 2.0 * CUT_MARGIN,
                DVec3::Z,
            )
        };
        ctx.cut(NAME, post, bore)
    })
}
