//! Brick parameters

use serde::{Deserialize, Serialize};

use crate::constants::MIN_HEIGHT_RATIO;
use crate::error::{BrickError, BrickResult};

/// Largest supported width or length in studs
pub const MAX_STUDS: u32 = 32;

/// Supported stud rescale range
pub const STUD_RESCALE_RANGE: (f64, f64) = (0.9, 1.1);

/// Fractional heights allowed below one full block
pub const FRACTIONAL_HEIGHTS: [f64; 2] = [MIN_HEIGHT_RATIO, 0.5];

const HEIGHT_TOLERANCE: f64 = 1e-9;

/// Kind of piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BrickType {
    #[default]
    Brick,
    /// Smooth top, no studs
    Tile,
    /// Thin closed slab with studs
    Baseplate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StudVariant {
    #[default]
    Solid,
    Hollow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BottomVariant {
    #[default]
    Open,
    Closed,
}

/// Input record for one piece.
///
/// `width` and `length` are unordered; dimension derivation swaps them so the
/// reported length is never the smaller one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrickParameters {
    /// Studs along one side
    pub width: u32,
    /// Studs along the other side
    pub length: u32,
    /// Height in block units: 1/3, 1/2 or a positive integer
    pub height: f64,
    pub brick_type: BrickType,
    pub stud_variant: StudVariant,
    pub bottom_variant: BottomVariant,
    pub horizontal_holes: bool,
    pub vertical_axle_holes: bool,
    pub include_splines: bool,
    pub with_posts: bool,
    pub use_reinforcement: bool,
    /// Scale factor applied to stud diameters
    pub stud_rescale: f64,
    /// 0 = flat top, 1 = fully rounded rim
    pub stud_top_roundness: f64,
    /// Facet count for round features
    pub tessellation_segments: u32,
}

impl Default for BrickParameters {
    fn default() -> Self {
        Self {
            width: 2,
            length: 4,
            height: 1.0,
            brick_type: BrickType::Brick,
            stud_variant: StudVariant::Solid,
            bottom_variant: BottomVariant::Open,
            horizontal_holes: false,
            vertical_axle_holes: false,
            include_splines: true,
            with_posts: true,
            use_reinforcement: false,
            stud_rescale: 1.0,
            stud_top_roundness: 0.0,
            tessellation_segments: 32,
        }
    }
}

impl BrickParameters {
    /// Standard brick with the given footprint and height
    pub fn new(width: u32, length: u32, height: f64) -> Self {
        Self {
            width,
            length,
            height,
            ..Default::default()
        }
    }

    pub fn with_type(mut self, brick_type: BrickType) -> Self {
        self.brick_type = brick_type;
        self
    }

    pub fn with_studs(mut self, variant: StudVariant) -> Self {
        self.stud_variant = variant;
        self
    }

    pub fn with_bottom(mut self, variant: BottomVariant) -> Self {
        self.bottom_variant = variant;
        self
    }

    pub fn with_horizontal_holes(mut self, enabled: bool) -> Self {
        self.horizontal_holes = enabled;
        self
    }

    pub fn with_vertical_axle_holes(mut self, enabled: bool) -> Self {
        self.vertical_axle_holes = enabled;
        self
    }

    pub fn with_splines(mut self, enabled: bool) -> Self {
        self.include_splines = enabled;
        self
    }

    pub fn with_posts(mut self, enabled: bool) -> Self {
        self.with_posts = enabled;
        self
    }

    pub fn with_reinforcement(mut self, enabled: bool) -> Self {
        self.use_reinforcement = enabled;
        self
    }

    pub fn with_stud_rescale(mut self, rescale: f64) -> Self {
        self.stud_rescale = rescale;
        self
    }

    pub fn with_stud_top_roundness(mut self, roundness: f64) -> Self {
        self.stud_top_roundness = roundness;
        self
    }

    pub fn with_segments(mut self, segments: u32) -> Self {
        self.tessellation_segments = segments;
        self
    }

    /// Whether `height` is one of the grid-quantized values
    pub fn is_quantized_height(height: f64) -> bool {
        if !height.is_finite() || height <= 0.0 {
            return false;
        }
        FRACTIONAL_HEIGHTS
            .iter()
            .any(|h| (height - h).abs() < HEIGHT_TOLERANCE)
            || (height >= 1.0 && (height - height.round()).abs() < HEIGHT_TOLERANCE)
    }

    /// Check every field against its documented bounds
    pub fn validate(&self) -> BrickResult<()> {
        for (name, value) in [("width", self.width), ("length", self.length)] {
            if !(1..=MAX_STUDS).contains(&value) {
                return Err(BrickError::invalid(
                    name,
                    format!("must be between 1 and {MAX_STUDS} studs, got {value}"),
                ));
            }
        }
        if !Self::is_quantized_height(self.height) {
            return Err(BrickError::invalid(
                "height",
                format!("must be 1/3, 1/2 or a positive integer, got {}", self.height),
            ));
        }
        let (low, high) = STUD_RESCALE_RANGE;
        if !(low..=high).contains(&self.stud_rescale) {
            return Err(BrickError::invalid(
                "stud_rescale",
                format!("must be between {low} and {high}, got {}", self.stud_rescale),
            ));
        }
        if !(0.0..=1.0).contains(&self.stud_top_roundness) {
            return Err(BrickError::invalid(
                "stud_top_roundness",
                format!("must be between 0 and 1, got {}", self.stud_top_roundness),
            ));
        }
        if self.tessellation_segments < 3 {
            return Err(BrickError::invalid(
                "tessellation_segments",
                format!("must be at least 3, got {}", self.tessellation_segments),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid_two_by_four() {
        let params = BrickParameters::default();
        assert_eq!((params.width, params.length), (2, 4));
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_height_quantization() {
        assert!(BrickParameters::is_quantized_height(1.0 / 3.0));
        assert!(BrickParameters::is_quantized_height(0.5));
        assert!(BrickParameters::is_quantized_height(3.0));
        assert!(!BrickParameters::is_quantized_height(0.25));
        assert!(!BrickParameters::is_quantized_height(1.5));
        assert!(!BrickParameters::is_quantized_height(0.0));
        assert!(!BrickParameters::is_quantized_height(f64::NAN));
    }

    #[test]
    fn test_validate_names_offending_field() {
        let cases = [
            (BrickParameters::new(0, 4, 1.0), "width"),
            (BrickParameters::new(2, 33, 1.0), "length"),
            (BrickParameters::new(2, 4, 0.7), "height"),
            (BrickParameters::default().with_stud_rescale(1.2), "stud_rescale"),
            (
                BrickParameters::default().with_stud_top_roundness(-0.1),
                "stud_top_roundness",
            ),
            (BrickParameters::default().with_segments(2), "tessellation_segments"),
        ];
        for (params, field) in cases {
            let err = params.validate().unwrap_err();
            assert_eq!(err.subject(), field);
        }
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let params: BrickParameters = ron::from_str("(width: 1, length: 6, brick_type: Tile)").unwrap();
        assert_eq!(params.width, 1);
        assert_eq!(params.length, 6);
        assert_eq!(params.brick_type, BrickType::Tile);
        assert!(params.include_splines);
        assert_eq!(params.tessellation_segments, 32);
    }
}
