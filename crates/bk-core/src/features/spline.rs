//! Ridges on the inner wall faces that grip the studs of the piece below

use glam::DVec3;

use super::{BuildContext, FeatureRole, FeatureSet};
use crate::constants::JOIN_OVERLAP;
use crate::dimensions::DerivedDimensions;
use crate::error::BrickResult;
use crate::params::BrickParameters;

pub const NAME: &str = "splines";

pub fn enabled(params: &BrickParameters, dims: &DerivedDimensions) -> bool {
    dims.is_open() && params.include_splines
}

pub fn build(ctx: &BuildContext<'_>) -> BrickResult<Option<FeatureSet>> {
    let dims = ctx.dims;
    let c = ctx.constants;
    let half = c.spline_thickness / 2.0;
    let reach = c.spline_length;
    let near = c.wall_thickness;
    let far_x = dims.overall_length - c.wall_thickness;
    let far_y = dims.overall_width - c.wall_thickness;
    // ridges stop short of the bottom face so they never share it with a wall
    let bottom = JOIN_OVERLAP;
    let top = ctx.interior_top();

    let positions = dims.studs.positions();
    let columns = positions.iter().take(dims.studs.columns as usize).map(|p| p.x);
    let rows = positions
        .iter()
        .step_by(dims.studs.columns.max(1) as usize)
        .map(|p| p.y);

    // (min, max) of every ridge; each straddles its wall face
    let mut ridges = Vec::new();
    for x in columns {
        for wall in [near, far_y] {
            ridges.push((
                DVec3::new(x - half, wall - reach, bottom),
                DVec3::new(x + half, wall + reach, top),
            ));
        }
    }
    for y in rows {
        for wall in [near, far_x] {
            ridges.push((
                DVec3::new(wall - reach, y - half, bottom),
                DVec3::new(wall + reach, y + half, top),
            ));
        }
    }

    ctx.collect(NAME, FeatureRole::Additive, ridges, |(min, max)| {
        ctx.block(NAME, min, max)
    })
}
