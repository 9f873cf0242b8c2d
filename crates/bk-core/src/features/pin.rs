//! Pins under one-wide pieces

use glam::DVec3;

use super::{BuildContext, FeatureRole, FeatureSet};
use crate::dimensions::DerivedDimensions;
use crate::error::BrickResult;
use crate::params::BrickParameters;

pub const NAME: &str = "pins";

pub fn enabled(_params: &BrickParameters, dims: &DerivedDimensions) -> bool {
    dims.is_open() && !dims.pins.is_empty()
}

/// Solid pins standing on the bottom plane and rooted in the roof
pub fn build(ctx: &BuildContext<'_>) -> BrickResult<Option<FeatureSet>> {
    let top = ctx.interior_top();
    ctx.collect(NAME, FeatureRole::Additive, ctx.dims.pins.positions(), |p| {
        ctx.column(NAME, p.extend(0.0), ctx.constants.pin_diameter, top, DVec3::Z)
    })
}
