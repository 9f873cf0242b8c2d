//! Horizontal Technic holes through one-wide pieces
//!
//! Split into two builders: the collars are merged with the body before any
//! hole is cut, so a hole never leaves a collar wall behind in the cavity.

use glam::DVec3;

use super::{BuildContext, FeatureRole, FeatureSet};
use crate::constants::{CUT_MARGIN, JOIN_OVERLAP};
use crate::dimensions::DerivedDimensions;
use crate::error::BrickResult;
use crate::params::BrickParameters;

pub const SUPPORT_NAME: &str = "technic_support";
pub const HOLE_NAME: &str = "technic_holes";

pub fn enabled(params: &BrickParameters, dims: &DerivedDimensions) -> bool {
    params.horizontal_holes && !dims.technic_holes.is_empty()
}

/// Solid collars around each hole axis, bridging the cavity between the two
/// long walls and reaching `JOIN_OVERLAP` into each
pub fn build_support(ctx: &BuildContext<'_>) -> BrickResult<Option<FeatureSet>> {
    let dims = ctx.dims;
    let c = ctx.constants;
    let diameter = c.hole_collar_diameter();
    let start = c.wall_thickness - JOIN_OVERLAP;
    let length = dims.overall_width - 2.0 * start;
    ctx.collect(
        SUPPORT_NAME,
        FeatureRole::Additive,
        dims.technic_holes.positions(),
        |axis| {
            ctx.column(
                SUPPORT_NAME,
                DVec3::new(axis.x, start, axis.y),
                diameter,
                length,
                DVec3::Y,
            )
        },
    )
}

/// Through-holes with a counterbore on both faces, one tool per hole
pub fn build_holes(ctx: &BuildContext<'_>) -> BrickResult<Option<FeatureSet>> {
    let dims = ctx.dims;
    let c = ctx.constants;
    let bevel_length = c.horizontal_hole_bevel_depth + CUT_MARGIN;

    ctx.collect(
        HOLE_NAME,
        FeatureRole::Subtractive,
        dims.technic_holes.positions(),
        |axis| {
            let at = |y: f64| DVec3::new(axis.x, y, axis.y);
            let bore = ctx.column(
                HOLE_NAME,
                at(-CUT_MARGIN),
                c.horizontal_hole_diameter,
                dims.overall_width + 2.0 * CUT_MARGIN,
                DVec3::Y,
            )?;
            let bore = ctx.fuse(
                HOLE_NAME,
                bore,
                ctx.column(
                    HOLE_NAME,
                    at(-CUT_MARGIN),
                    c.horizontal_hole_bevel_diameter,
                    bevel_length,
                    DVec3::Y,
                ),
            )?;
            ctx.fuse(
                HOLE_NAME,
                bore,
                ctx.column(
                    HOLE_NAME,
                    at(dims.overall_width - c.horizontal_hole_bevel_depth),
                    c.horizontal_hole_bevel_diameter,
                    bevel_length,
                    DVec3::Y,
                ),
            )
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::test_support::Bench;

    fn technic(length: u32, height: f64) -> Bench {
        Bench::new(BrickParameters::new(1, length, height).with_horizontal_holes(true))
    }

    #[test]
    fn test_one_collar_and_hole_between_studs() {
        let bench = technic(4, 1.0);
        let support = build_support(&bench.ctx()).unwrap().unwrap();
        let holes = build_holes(&bench.ctx()).unwrap().unwrap();
        assert_eq!(support.len(), 3);
        assert_eq!(holes.count(FeatureRole::Subtractive), 3);

        assert!(bench.inside(&support, DVec3::new(7.9, 3.9, 5.8 + 3.0)));
        assert!(bench.inside(&holes, DVec3::new(15.9, 3.9, 5.8)));
        assert!(!bench.inside(&holes, DVec3::new(15.9, 3.9, 5.8 + 2.8)));
    }

    #[test]
    fn test_bevels_on_both_faces() {
        let bench = technic(2, 1.0);
        let holes = build_holes(&bench.ctx()).unwrap().unwrap();
        assert!(bench.inside(&holes, DVec3::new(7.9 + 2.8, 0.3, 5.8)));
        assert!(bench.inside(&holes, DVec3::new(7.9 + 2.8, 7.5, 5.8)));
        assert!(!bench.inside(&holes, DVec3::new(7.9 + 2.8, 1.2, 5.8)));
        assert_eq!(bench.kernel.live_solids(), 1);
    }

    #[test]
    fn test_stacked_rows() {
        let bench = technic(3, 2.0);
        let holes = build_holes(&bench.ctx()).unwrap().unwrap();
        let support = build_support(&bench.ctx()).unwrap().unwrap();
        assert_eq!(holes.len(), 4);

        // second row sits one block height above the first
        let upper = 5.8 + 9.6;
        assert!(bench.inside(&holes, DVec3::new(15.9, 3.9, upper)));
        assert!(bench.inside(&holes, DVec3::new(15.9, 3.9, upper + 2.0)));
        assert!(!bench.inside(&holes, DVec3::new(15.9, 3.9, upper - 3.0)));
        assert!(bench.inside(&support, DVec3::new(15.9, 3.9, upper - 3.0)));
        assert!(!bench.inside(&support, DVec3::new(15.9, 3.9, 11.0)));
    }

    #[test]
    fn test_collars_sink_into_the_walls() {
        let bench = technic(2, 1.0);
        let support = build_support(&bench.ctx()).unwrap().unwrap();
        let at = |y: f64| bench.inside(&support, DVec3::new(7.9, y, 5.8 + 3.0));
        assert!(at(1.45 - JOIN_OVERLAP / 2.0));
        assert!(!at(1.45 - JOIN_OVERLAP * 1.5));
        assert!(at(7.8 - 1.45 + JOIN_OVERLAP / 2.0));
        assert!(!at(7.8 - 1.45 + JOIN_OVERLAP * 1.5));
    }

    #[test]
    fn test_applicability() {
        assert!(!enabled(&technic(1, 1.0).params, &technic(1, 1.0).dims));
        assert!(!enabled(&technic(4, 0.5).params, &technic(4, 0.5).dims));
        let wide = Bench::new(BrickParameters::new(2, 4, 1.0).with_horizontal_holes(true));
        assert!(!enabled(&wide.params, &wide.dims));
        let off = Bench::new(BrickParameters::new(1, 4, 1.0));
        assert!(!enabled(&off.params, &off.dims));
    }
}
