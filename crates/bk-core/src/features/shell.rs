//! Outer body

use glam::DVec3;

use super::{BuildContext, FeatureRole, FeatureSet};
use crate::constants::CUT_MARGIN;
use crate::dimensions::DerivedDimensions;
use crate::error::BrickResult;
use crate::params::BrickParameters;

pub const NAME: &str = "shell";

pub fn enabled(_params: &BrickParameters, _dims: &DerivedDimensions) -> bool {
    true
}

/// Outer box; an open bottom is hollowed to `wall_thickness` on the sides and
/// `roof_thickness` on top.
pub fn build(ctx: &BuildContext<'_>) -> BrickResult<Option<FeatureSet>> {
    let dims = ctx.dims;
    let c = ctx.constants;
    let outer = ctx.block(
        NAME,
        DVec3::ZERO,
        DVec3::new(dims.overall_length, dims.overall_width, dims.overall_height),
    )?;

    if !dims.is_open() {
        return Ok(Some(FeatureSet::single(NAME, outer, FeatureRole::Additive)));
    }

    let wall = c.wall_thickness;
    let cavity_max = DVec3::new(
        dims.overall_length - wall,
        dims.overall_width - wall,
        dims.overall_height - c.roof_thickness,
    );
    let cavity_min = DVec3::new(wall, wall, -CUT_MARGIN);
    if !cavity_max.cmpgt(DVec3::new(wall, wall, 0.0)).all() {
        tracing::warn!(
            length = dims.overall_length,
            width = dims.overall_width,
            height = dims.overall_height,
            "shell too small to hollow, using a solid body"
        );
        return Ok(Some(FeatureSet::single(NAME, outer, FeatureRole::Additive)));
    }

    let body = ctx.cut(NAME, outer, ctx.block(NAME, cavity_min, cavity_max))?;
    Ok(Some(FeatureSet::single(NAME, body, FeatureRole::Additive)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::BrickConstants;
    use crate::features::test_support::Bench;
    use crate::params::BottomVariant;

    #[test]
    fn test_open_shell_is_hollow() {
        let bench = Bench::new(BrickParameters::new(2, 2, 1.0));
        let set = build(&bench.ctx()).unwrap().unwrap();
        assert_eq!(set.len(), 1);
        // wall, roof and cavity
        assert!(bench.inside(&set, DVec3::new(0.5, 7.9, 4.0)));
        assert!(bench.inside(&set, DVec3::new(7.9, 7.9, 9.0)));
        assert!(!bench.inside(&set, DVec3::new(7.9, 7.9, 4.0)));
    }

    #[test]
    fn test_closed_shell_is_solid() {
        let bench =
            Bench::new(BrickParameters::new(2, 2, 1.0).with_bottom(BottomVariant::Closed));
        let set = build(&bench.ctx()).unwrap().unwrap();
        assert!(bench.inside(&set, DVec3::new(7.9, 7.9, 4.0)));
    }

    #[test]
    fn test_thick_walls_fall_back_to_solid() {
        let mut bench = Bench::new(BrickParameters::new(1, 1, 1.0));
        bench.constants = BrickConstants {
            wall_thickness: 3.95,
            ..Default::default()
        };
        let set = build(&bench.ctx()).unwrap().unwrap();
        assert!(bench.inside(&set, DVec3::new(3.9, 3.9, 2.0)));
        assert_eq!(bench.kernel.live_solids(), 1);
    }
}
