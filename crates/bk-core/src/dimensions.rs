//! Dimension calculator
//!
//! Pure functions mapping [`BrickParameters`] to millimeter extents and the
//! grid layouts every feature builder places its parts on. Everything a
//! builder needs is computed here once.
//!
//! Coordinates are in the brick's local frame before centering: the footprint
//! spans `[0, overall_length] x [0, overall_width]` and the bottom face sits
//! at `z = 0`. Length runs along X.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::constants::{BrickConstants, MIN_HEIGHT_RATIO};
use crate::error::{BrickError, BrickResult};
use crate::params::{BottomVariant, BrickParameters, BrickType};

/// Total extent of `count` equally spaced round features of diameter
/// `diameter` at center spacing `spacing`.
///
/// Returns 0 when `count` is 0.
pub fn feature_span(count: u32, diameter: f64, spacing: f64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    diameter + f64::from(count - 1) * (spacing - diameter)
}

/// Extent of the features that sit between `units` grid cells.
///
/// There are `units - 1` such features, so a single cell yields 0.
pub fn interior_span(units: u32, diameter: f64, spacing: f64) -> f64 {
    feature_span(units.saturating_sub(1), diameter, spacing)
}

/// A rectangular pattern of feature centers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    /// Center of the first feature
    pub origin: DVec2,
    /// Center-to-center distance along each axis
    pub pitch: DVec2,
    /// Features along the first axis
    pub columns: u32,
    /// Features along the second axis
    pub rows: u32,
    /// Extent of the pattern along each axis (see [`feature_span`])
    pub span: DVec2,
}

impl GridLayout {
    fn empty(spacing: f64) -> Self {
        Self {
            origin: DVec2::ZERO,
            pitch: DVec2::splat(spacing),
            columns: 0,
            rows: 0,
            span: DVec2::ZERO,
        }
    }

    pub fn count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Feature centers, row by row
    pub fn positions(&self) -> Vec<DVec2> {
        (0..self.rows)
            .flat_map(|row| {
                (0..self.columns).map(move |column| {
                    self.origin + DVec2::new(f64::from(column), f64::from(row)) * self.pitch
                })
            })
            .collect()
    }
}

/// Computed, immutable dimensions of one piece
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedDimensions {
    /// Studs along Y (never larger than `normalized_length`)
    pub normalized_width: u32,
    /// Studs along X
    pub normalized_length: u32,
    pub real_height_ratio: f64,
    pub overall_length: f64,
    pub overall_width: f64,
    pub overall_height: f64,
    /// Type after baseplate rules are applied
    pub brick_type: BrickType,
    /// Bottom after baseplate rules are applied
    pub bottom: BottomVariant,
    pub stud_diameter: f64,
    /// One stud per grid cell
    pub studs: GridLayout,
    /// Interior grid intersections
    pub posts: GridLayout,
    /// Centerline positions between studs of a one-wide piece
    pub pins: GridLayout,
    /// Interior grid intersections, sized for the axle cross
    pub axle_holes: GridLayout,
    /// Horizontal hole axes; the second coordinate is the height of the axis
    pub technic_holes: GridLayout,
}

impl DerivedDimensions {
    /// Whether the piece has at least one interior grid intersection
    pub fn has_interior_grid(&self) -> bool {
        self.normalized_width > 1 && self.normalized_length > 1
    }

    pub fn is_open(&self) -> bool {
        self.bottom == BottomVariant::Open
    }

    pub fn stud_radius(&self) -> f64 {
        self.stud_diameter / 2.0
    }
}

/// Derive every dimension of a piece.
///
/// Fails only for malformed input: a zero width or length, a non-positive
/// height, or fewer than 3 tessellation segments.
pub fn derive_dimensions(
    params: &BrickParameters,
    constants: &BrickConstants,
) -> BrickResult<DerivedDimensions> {
    if params.width == 0 {
        return Err(BrickError::invalid("width", "must be positive"));
    }
    if params.length == 0 {
        return Err(BrickError::invalid("length", "must be positive"));
    }
    if !(params.height.is_finite() && params.height > 0.0) {
        return Err(BrickError::invalid(
            "height",
            format!("must be positive, got {}", params.height),
        ));
    }
    if params.tessellation_segments < 3 {
        return Err(BrickError::invalid(
            "tessellation_segments",
            format!("must be at least 3, got {}", params.tessellation_segments),
        ));
    }

    let width = params.width.min(params.length);
    let length = params.width.max(params.length);

    let (real_height_ratio, bottom) = match params.brick_type {
        BrickType::Baseplate => (MIN_HEIGHT_RATIO, BottomVariant::Closed),
        _ => (params.height.max(MIN_HEIGHT_RATIO), params.bottom_variant),
    };

    let spacing = constants.grid_spacing;
    let play = constants.play;
    let overall_length = f64::from(length) * spacing - 2.0 * play;
    let overall_width = f64::from(width) * spacing - 2.0 * play;
    let overall_height = real_height_ratio * constants.block_height;

    let stud_diameter = constants.stud_diameter * params.stud_rescale;
    let first_cell = spacing / 2.0 - play;
    let first_corner = spacing - play;

    let studs = GridLayout {
        origin: DVec2::splat(first_cell),
        pitch: DVec2::splat(spacing),
        columns: length,
        rows: width,
        span: DVec2::new(
            feature_span(length, stud_diameter, spacing),
            feature_span(width, stud_diameter, spacing),
        ),
    };

    let intersections = |diameter: f64| {
        if width > 1 && length > 1 {
            GridLayout {
                origin: DVec2::splat(first_corner),
                pitch: DVec2::splat(spacing),
                columns: length - 1,
                rows: width - 1,
                span: DVec2::new(
                    interior_span(length, diameter, spacing),
                    interior_span(width, diameter, spacing),
                ),
            }
        } else {
            GridLayout::empty(spacing)
        }
    };
    let posts = intersections(constants.post_diameter);
    let axle_holes = intersections(constants.axle_diameter);

    let one_wide = width == 1 && length > 1;
    let pins = if one_wide {
        GridLayout {
            origin: DVec2::new(first_corner, overall_width / 2.0),
            pitch: DVec2::splat(spacing),
            columns: length - 1,
            rows: 1,
            span: DVec2::new(
                interior_span(length, constants.pin_diameter, spacing),
                constants.pin_diameter,
            ),
        }
    } else {
        GridLayout::empty(spacing)
    };

    let hole_rows = real_height_ratio.floor() as u32;
    let technic_holes = if one_wide && hole_rows >= 1 {
        GridLayout {
            origin: DVec2::new(first_corner, constants.horizontal_hole_z_offset),
            pitch: DVec2::new(spacing, constants.block_height),
            columns: length - 1,
            rows: hole_rows,
            span: DVec2::new(
                interior_span(length, constants.horizontal_hole_diameter, spacing),
                feature_span(
                    hole_rows,
                    constants.horizontal_hole_diameter,
                    constants.block_height,
                ),
            ),
        }
    } else {
        GridLayout::empty(spacing)
    };

    Ok(DerivedDimensions {
        normalized_width: width,
        normalized_length: length,
        real_height_ratio,
        overall_length,
        overall_width,
        overall_height,
        brick_type: params.brick_type,
        bottom,
        stud_diameter,
        studs,
        posts,
        pins,
        axle_holes,
        technic_holes,
    })
}
