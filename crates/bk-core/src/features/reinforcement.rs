//! Cross bracing around the posts

use bk_cad::Wire2D;
use glam::DVec3;

use super::{BuildContext, FeatureRole, FeatureSet, post};
use crate::constants::{CUT_MARGIN, JOIN_OVERLAP};
use crate::dimensions::DerivedDimensions;
use crate::error::BrickResult;
use crate::params::{BrickParameters, BrickType};

pub const NAME: &str = "reinforcement";

pub fn enabled(params: &BrickParameters, dims: &DerivedDimensions) -> bool {
    params.use_reinforcement && dims.brick_type != BrickType::Tile && post::enabled(params, dims)
}

/// A cross of bars one grid unit long centered on each post.
///
/// Neighbouring braces stop `JOIN_OVERLAP` apart and the post cutout leaves
/// `JOIN_OVERLAP` of the post wall inside the brace, so no two parts meet on a
/// shared face.
pub fn build(ctx: &BuildContext<'_>) -> BrickResult<Option<FeatureSet>> {
    let dims = ctx.dims;
    let c = ctx.constants;
    let bottom = JOIN_OVERLAP;
    let top = ctx.interior_top() - JOIN_OVERLAP / 2.0;

    ctx.collect(NAME, FeatureRole::Additive, dims.posts.positions(), |p| {
        let brace = ctx.prism(
            NAME,
            &Wire2D::cross(p, c.reinforcing_width, c.grid_spacing - JOIN_OVERLAP),
            bottom,
            top - bottom,
        )?;
        ctx.cut(
            NAME,
            brace,
            ctx.column(
                NAME,
                p.extend(-CUT_MARGIN),
                c.post_diameter - 2.0 * JOIN_OVERLAP,
                dims.overall_height + 2.0 * CUT_MARGIN,
                DVec3::Z,
            ),
        )
    })
}
