//! Vertical axle cutouts through the roof

use bk_cad::Wire2D;

use super::{BuildContext, FeatureRole, FeatureSet};
use crate::constants::CUT_MARGIN;
use crate::dimensions::DerivedDimensions;
use crate::error::BrickResult;
use crate::params::BrickParameters;

pub const NAME: &str = "axle_cutouts";

pub fn enabled(params: &BrickParameters, dims: &DerivedDimensions) -> bool {
    params.vertical_axle_holes && dims.is_open() && !dims.axle_holes.is_empty()
}

pub fn build(ctx: &BuildContext<'_>) -> BrickResult<Option<FeatureSet>> {
    let dims = ctx.dims;
    let c = ctx.constants;
    ctx.collect(NAME, FeatureRole::Subtractive, dims.axle_holes.positions(), |p| {
        ctx.prism(
            NAME,
            &Wire2D::cross(p, c.axle_spline_width, c.axle_diameter),
            -CUT_MARGIN,
            dims.overall_height + 2.0 * CUT_MARGIN,
        )
    })
}
