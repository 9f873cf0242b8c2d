//! End-to-end builds checked through the CSG kernel.
//!
//! Final solids are centered: a piece of `L x W` studs spans
//! `[-L*4 + 0.1, L*4 - 0.1]` along X and the bottom face sits at `z = 0`.

use approx::assert_relative_eq;
use bk_cad::{CadError, CadKernel, CsgKernel, NullKernel, Solid};
use bk_core::{
    BottomVariant, BrickBuild, BrickConstants, BrickError, BrickParameters, BrickType,
    StudVariant, assemble, build_brick,
};
use glam::DVec3;

fn build(kernel: &CsgKernel, params: BrickParameters) -> BrickBuild {
    assemble(kernel, &params, &BrickConstants::default()).unwrap()
}

fn parts(build: &BrickBuild, name: &str) -> usize {
    build
        .features
        .iter()
        .filter(|f| f.name == name)
        .map(|f| f.parts)
        .sum()
}

fn inside(kernel: &CsgKernel, solid: &Solid, x: f64, y: f64, z: f64) -> bool {
    kernel.contains_point(solid, DVec3::new(x, y, z)).unwrap()
}

#[test]
fn scenario_a_standard_two_by_four() {
    let kernel = CsgKernel::new();
    let brick = build(&kernel, BrickParameters::new(2, 4, 1.0));
    let dims = &brick.dimensions;

    assert_relative_eq!(dims.overall_length, 31.8);
    assert_relative_eq!(dims.overall_width, 15.8);
    assert_relative_eq!(dims.overall_height, 9.6);
    assert_eq!(parts(&brick, "studs"), 8);
    assert_eq!(parts(&brick, "posts"), 3);
    assert_eq!(parts(&brick, "pins"), 0);

    let solid = &brick.solid;
    for x in [-12.0, -4.0, 4.0, 12.0] {
        for y in [-4.0, 4.0] {
            assert!(inside(&kernel, solid, x, y, 10.5), "stud at ({x}, {y})");
        }
    }
    for x in [-8.0, 0.0, 8.0] {
        assert!(inside(&kernel, solid, x + 2.9, 0.0, 4.0), "post wall at {x}");
        assert!(!inside(&kernel, solid, x, 0.0, 4.0), "post bore at {x}");
    }
    // cavity, wall, roof
    assert!(!inside(&kernel, solid, -4.0, 0.0, 4.0));
    assert!(inside(&kernel, solid, -15.5, 0.0, 4.0));
    assert!(inside(&kernel, solid, -4.0, 0.0, 9.3));

    let bounds = kernel.bounding_box(solid).unwrap();
    assert_relative_eq!(bounds.min.x, -15.9, epsilon = 1e-9);
    assert_relative_eq!(bounds.max.y, 7.9, epsilon = 1e-9);
    assert_relative_eq!(bounds.max.z, 9.6 + 1.8, epsilon = 1e-9);
}

#[test]
fn scenario_b_plate() {
    let kernel = CsgKernel::new();
    let brick = build(&kernel, BrickParameters::new(2, 4, 1.0 / 3.0));
    let dims = &brick.dimensions;

    assert_relative_eq!(dims.overall_height, 3.2, epsilon = 1e-12);
    assert_relative_eq!(dims.overall_length, 31.8);
    assert_relative_eq!(dims.overall_width, 15.8);
    assert!(inside(&kernel, &brick.solid, -12.0, -4.0, 4.5));
    assert!(!inside(&kernel, &brick.solid, -12.0, -4.0, 5.5));
}

#[test]
fn scenario_c_one_by_four_tile() {
    let kernel = CsgKernel::new();
    let brick = build(
        &kernel,
        BrickParameters::new(1, 4, 1.0).with_type(BrickType::Tile),
    );

    assert_relative_eq!(brick.dimensions.overall_height, 9.6);
    assert_eq!(parts(&brick, "studs"), 0);
    assert_eq!(parts(&brick, "pins"), 3);

    let solid = &brick.solid;
    for x in [-12.0, -4.0, 4.0, 12.0] {
        assert!(!inside(&kernel, solid, x, 0.0, 10.0), "stud at {x}");
    }
    for x in [-8.0, 0.0, 8.0] {
        assert!(inside(&kernel, solid, x, 0.0, 4.0), "pin at {x}");
    }
    assert_relative_eq!(kernel.bounding_box(solid).unwrap().max.z, 9.6);
}

#[test]
fn scenario_d_closed_bottom_ignores_interior_toggles() {
    let kernel = CsgKernel::new();
    let params = BrickParameters::new(2, 2, 1.0)
        .with_bottom(BottomVariant::Closed)
        .with_splines(true)
        .with_posts(true)
        .with_reinforcement(true)
        .with_vertical_axle_holes(true);
    let brick = build(&kernel, params);

    for name in ["splines", "posts", "pins", "reinforcement", "axle_cutouts"] {
        assert_eq!(parts(&brick, name), 0, "{name}");
    }
    assert_eq!(parts(&brick, "shell"), 1);
    assert_eq!(parts(&brick, "studs"), 4);

    for x in [-6.0, -2.0, 0.0, 2.0, 6.0] {
        for y in [-6.0, 0.0, 6.0] {
            assert!(inside(&kernel, &brick.solid, x, y, 0.5), "solid at ({x}, {y})");
        }
    }
}

#[test]
fn technic_brick_has_beveled_through_holes() {
    let kernel = CsgKernel::new();
    let brick = build(
        &kernel,
        BrickParameters::new(1, 4, 1.0).with_horizontal_holes(true),
    );
    assert_eq!(parts(&brick, "technic_support"), 3);
    assert_eq!(parts(&brick, "technic_holes"), 3);

    let solid = &brick.solid;
    for x in [-8.0, 0.0, 8.0] {
        // clear through the full width, collar and pin included
        for y in [-3.85, -2.0, 0.0, 2.0, 3.85] {
            assert!(!inside(&kernel, solid, x, y, 5.8), "hole at ({x}, {y})");
        }
        assert!(inside(&kernel, solid, x + 3.0, 0.0, 5.8), "collar at {x}");
        assert!(!inside(&kernel, solid, x + 2.8, -3.8, 5.8), "bevel at {x}");
    }
}

#[test]
fn stacked_technic_rows_follow_block_height() {
    let kernel = CsgKernel::new();
    let brick = build(
        &kernel,
        BrickParameters::new(1, 4, 2.0).with_horizontal_holes(true),
    );
    assert_eq!(parts(&brick, "technic_holes"), 6);

    let solid = &brick.solid;
    let upper = 5.8 + 9.6;
    for x in [-8.0, 0.0, 8.0] {
        assert!(!inside(&kernel, solid, x, 0.0, upper + 2.3), "upper hole at {x}");
        assert!(inside(&kernel, solid, x + 2.0, 0.0, upper - 2.6), "upper collar at {x}");
        assert!(!inside(&kernel, solid, x + 2.0, 0.0, 11.0), "cavity below collar at {x}");
    }
}

#[test]
fn vertical_axle_holes_cut_roof_and_posts() {
    let kernel = CsgKernel::new();
    let brick = build(
        &kernel,
        BrickParameters::new(2, 2, 1.0).with_vertical_axle_holes(true),
    );
    assert_eq!(parts(&brick, "axle_cutouts"), 1);

    let solid = &brick.solid;
    assert!(!inside(&kernel, solid, 0.0, 0.0, 9.3));
    assert!(!inside(&kernel, solid, 2.0, 0.0, 9.3));
    assert!(inside(&kernel, solid, 2.0, 2.0, 9.3));
    assert!(inside(&kernel, solid, 2.0, 2.0, 4.0));
}

#[test]
fn reinforced_brick_braces_each_post() {
    let kernel = CsgKernel::new();
    let brick = build(
        &kernel,
        BrickParameters::new(2, 3, 1.0).with_reinforcement(true),
    );
    assert_eq!(parts(&brick, "reinforcement"), 2);
    // posts at x = -4 and 4
    assert!(inside(&kernel, &brick.solid, -4.0 + 3.6, 0.0, 4.0));
    assert!(!inside(&kernel, &brick.solid, -4.0 + 3.6, 1.0, 4.0));
}

#[test]
fn baseplate_is_a_thin_closed_slab_with_studs() {
    let kernel = CsgKernel::new();
    let brick = build(
        &kernel,
        BrickParameters::new(4, 4, 3.0)
            .with_type(BrickType::Baseplate)
            .with_horizontal_holes(true),
    );
    assert_relative_eq!(brick.dimensions.overall_height, 3.2, epsilon = 1e-12);
    assert_eq!(parts(&brick, "studs"), 16);
    assert_eq!(parts(&brick, "posts"), 0);
    assert_eq!(parts(&brick, "technic_holes"), 0);
    assert!(inside(&kernel, &brick.solid, 0.0, 0.0, 0.5));
}

#[test]
fn extreme_stud_rescale_and_roundness_build() {
    for rescale in [0.9, 1.1] {
        for roundness in [0.0, 1.0] {
            for variant in [StudVariant::Solid, StudVariant::Hollow] {
                let kernel = CsgKernel::new();
                let params = BrickParameters::new(1, 2, 1.0)
                    .with_stud_rescale(rescale)
                    .with_stud_top_roundness(roundness)
                    .with_studs(variant);
                let brick = build(&kernel, params);
                let radius = 4.85 * rescale / 2.0;
                // the outer stud wall is always present just above the shell
                assert!(inside(&kernel, &brick.solid, -4.0 + radius - 0.05, 0.0, 9.7));
                assert_eq!(kernel.live_solids(), 1);
            }
        }
    }
}

#[test]
fn build_leaves_exactly_one_solid() {
    let kernel = CsgKernel::new();
    let params = BrickParameters::new(2, 6, 2.0)
        .with_reinforcement(true)
        .with_vertical_axle_holes(true)
        .with_studs(StudVariant::Hollow)
        .with_stud_top_roundness(0.5);
    let solid = build_brick(&kernel, &params, &BrickConstants::default()).unwrap();
    assert_eq!(kernel.live_solids(), 1);
    kernel.release(solid);
    assert_eq!(kernel.live_solids(), 0);
}

#[test]
fn identical_parameters_give_identical_geometry() {
    let kernel = CsgKernel::new();
    let params = BrickParameters::new(3, 2, 1.0).with_reinforcement(true);
    let first = build(&kernel, params.clone());
    let second = build(&kernel, params);

    assert_eq!(first.dimensions, second.dimensions);
    assert_eq!(first.features, second.features);
    assert_eq!(
        kernel.bounding_box(&first.solid).unwrap(),
        kernel.bounding_box(&second.solid).unwrap()
    );
    for i in 0..200 {
        let t = f64::from(i);
        let p = DVec3::new((t * 0.37).sin() * 12.0, (t * 0.71).cos() * 8.0, (t * 0.13) % 12.0);
        assert_eq!(
            kernel.contains_point(&first.solid, p).unwrap(),
            kernel.contains_point(&second.solid, p).unwrap()
        );
    }
}

#[test]
fn invalid_parameters_build_nothing() {
    let kernel = CsgKernel::new();
    let err = build_brick(
        &kernel,
        &BrickParameters::new(2, 4, 0.75),
        &BrickConstants::default(),
    )
    .unwrap_err();
    assert!(matches!(err, BrickError::InvalidParameter { parameter: "height", .. }));
    assert_eq!(kernel.live_solids(), 0);
}

#[test]
fn degenerate_feature_aborts_without_leaks() {
    let kernel = CsgKernel::new();
    let constants = BrickConstants {
        post_wall_thickness: 3.25,
        ..Default::default()
    };
    let err = build_brick(&kernel, &BrickParameters::new(2, 2, 1.0), &constants).unwrap_err();
    assert!(matches!(err, BrickError::DegenerateGeometry { feature: "posts", .. }));
    assert_eq!(kernel.live_solids(), 0);
}

#[test]
fn kernel_failures_name_the_feature() {
    let err = build_brick(
        &NullKernel,
        &BrickParameters::default(),
        &BrickConstants::default(),
    )
    .unwrap_err();
    match err {
        BrickError::KernelFailure { feature, source } => {
            assert_eq!(feature, "shell");
            assert!(matches!(source, CadError::KernelNotAvailable(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
}
