//! Studs on the top face

use bk_cad::{Axis3D, SketchPlane, Solid, Wire2D};
use glam::{DVec2, DVec3};

use super::{BuildContext, FeatureRole, FeatureSet};
use crate::constants::{CUT_MARGIN, JOIN_OVERLAP};
use crate::dimensions::DerivedDimensions;
use crate::error::{BrickError, BrickResult};
use crate::params::{BrickParameters, BrickType, StudVariant};

pub const NAME: &str = "studs";

pub fn enabled(_params: &BrickParameters, dims: &DerivedDimensions) -> bool {
    dims.brick_type != BrickType::Tile
}

/// Radius of the rounded rim for a stud of `stud_radius`.
///
/// Always strictly below half the stud radius; never negative.
pub fn fillet_radius(roundness: f64, stud_radius: f64, epsilon: f64) -> f64 {
    let limit = stud_radius / 2.0 - epsilon;
    (roundness * stud_radius / 2.0).min(limit).max(0.0)
}

/// One stud per grid cell, rooted `JOIN_OVERLAP` deep in the roof
pub fn build(ctx: &BuildContext<'_>) -> BrickResult<Option<FeatureSet>> {
    let dims = ctx.dims;
    let radius = dims.stud_radius();
    let requested = ctx.params.stud_top_roundness * radius / 2.0;
    let fillet = fillet_radius(
        ctx.params.stud_top_roundness,
        radius,
        ctx.constants.fillet_epsilon,
    );
    if fillet < requested {
        tracing::warn!(requested, fillet, "stud fillet clamped");
    }

    ctx.collect(NAME, FeatureRole::Additive, dims.studs.positions(), |p| {
        let stud = if fillet > 0.0 {
            rounded_stud(ctx, p, fillet)?
        } else {
            ctx.column(
                NAME,
                p.extend(dims.overall_height - JOIN_OVERLAP),
                dims.stud_diameter,
                ctx.constants.stud_height + JOIN_OVERLAP,
                DVec3::Z,
            )?
        };

        match ctx.params.stud_variant {
            StudVariant::Solid => Ok(stud),
            StudVariant::Hollow => {
                let inner = ctx.constants.hollow_stud_inner_diameter * ctx.params.stud_rescale;
                // the floor of the core sits inside the roof, off its top face
                let floor = dims.overall_height - JOIN_OVERLAP / 2.0;
                ctx.cut(
                    NAME,
                    stud,
                    ctx.column(
                        NAME,
                        p.extend(floor),
                        inner,
                        ctx.constants.stud_height + JOIN_OVERLAP + CUT_MARGIN,
                        DVec3::Z,
                    ),
                )
            }
        }
    })
}

/// Shortened cylinder, a narrower cap and a torus rolling around the rim
fn rounded_stud(ctx: &BuildContext<'_>, p: DVec2, fillet: f64) -> BrickResult<Solid> {
    let dims = ctx.dims;
    let radius = dims.stud_radius();
    let top = dims.overall_height + ctx.constants.stud_height;
    let rim_height = top - fillet;

    let foot_height = dims.overall_height - JOIN_OVERLAP;
    let body = ctx.column(
        NAME,
        p.extend(foot_height),
        dims.stud_diameter,
        rim_height - foot_height,
        DVec3::Z,
    )?;
    let body = ctx.fuse(
        NAME,
        body,
        ctx.column(
            NAME,
            p.extend(rim_height),
            2.0 * (radius - fillet),
            fillet,
            DVec3::Z,
        ),
    )?;

    let foot = p.extend(0.0);
    let torus = ctx
        .kernel
        .revolve(
            &Wire2D::circle(
                DVec2::new(radius - fillet, rim_height),
                fillet,
                ctx.segments(),
            ),
            &SketchPlane::new(foot, DVec3::X, DVec3::Z),
            &Axis3D::new(foot, DVec3::Z),
            std::f64::consts::TAU,
        )
        .map_err(|e| BrickError::kernel(NAME, e));
    ctx.fuse(NAME, body, torus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::test_support::Bench;
    use approx::assert_relative_eq;

    const TOP: f64 = 9.6 + 1.8;

    #[test]
    fn test_one_stud_per_cell() {
        let bench = Bench::new(BrickParameters::new(2, 4, 1.0));
        let set = build(&bench.ctx()).unwrap().unwrap();
        assert_eq!(set.len(), 8);
        assert!(bench.inside(&set, DVec3::new(3.9, 3.9, 10.0)));
        assert!(bench.inside(&set, DVec3::new(27.9, 11.9, 10.0)));
        assert!(!bench.inside(&set, DVec3::new(7.9, 7.9, 10.0)));
    }

    #[test]
    fn test_studs_are_rooted_in_the_roof() {
        for roundness in [0.0, 1.0] {
            let bench =
                Bench::new(BrickParameters::new(1, 1, 1.0).with_stud_top_roundness(roundness));
            let set = build(&bench.ctx()).unwrap().unwrap();
            assert!(bench.inside(&set, DVec3::new(3.9, 3.9, 9.6 - JOIN_OVERLAP / 2.0)));
            assert!(!bench.inside(&set, DVec3::new(3.9, 3.9, 9.6 - JOIN_OVERLAP * 1.5)));
        }
    }

    #[test]
    fn test_tiles_have_no_studs() {
        let bench = Bench::new(BrickParameters::new(1, 4, 1.0).with_type(BrickType::Tile));
        assert!(!enabled(&bench.params, &bench.dims));
    }

    #[test]
    fn test_hollow_stud() {
        let bench = Bench::new(BrickParameters::new(1, 1, 1.0).with_studs(StudVariant::Hollow));
        let set = build(&bench.ctx()).unwrap().unwrap();
        assert!(!bench.inside(&set, DVec3::new(3.9, 3.9, 10.5)));
        assert!(bench.inside(&set, DVec3::new(3.9 + 2.0, 3.9, 10.5)));
    }

    #[test]
    fn test_rounded_stud_trims_the_rim() {
        let flat = Bench::new(BrickParameters::new(1, 1, 1.0));
        let round = Bench::new(BrickParameters::new(1, 1, 1.0).with_stud_top_roundness(1.0));
        let rim = DVec3::new(3.9 + 2.425 - 0.05, 3.9, TOP - 0.05);
        let crown = DVec3::new(3.9, 3.9, TOP - 0.01);

        let flat_set = build(&flat.ctx()).unwrap().unwrap();
        let round_set = build(&round.ctx()).unwrap().unwrap();
        assert!(flat.inside(&flat_set, rim));
        assert!(!round.inside(&round_set, rim));
        assert!(round.inside(&round_set, crown));
        assert_eq!(round.kernel.live_solids(), 1);
    }

    #[test]
    fn test_fillet_radius_is_clamped() {
        let radius = 2.425;
        assert_eq!(fillet_radius(0.0, radius, 0.01), 0.0);
        assert_relative_eq!(fillet_radius(0.5, radius, 0.01), radius / 4.0);
        let full = fillet_radius(1.0, radius, 0.01);
        assert!(full < radius / 2.0);
        assert_relative_eq!(full, radius / 2.0 - 0.01);
        assert_eq!(fillet_radius(1.0, 0.01, 0.01), 0.0);
    }
}
