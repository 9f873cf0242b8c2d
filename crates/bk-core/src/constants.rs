//! Millimeter constants of the connector grid

use serde::{Deserialize, Serialize};

use crate::error::{BrickError, BrickResult};

/// Smallest supported height ratio (a plate)
pub const MIN_HEIGHT_RATIO: f64 = 1.0 / 3.0;

/// Overshoot applied to cutting tools so they leave no skin on coplanar faces
pub const CUT_MARGIN: f64 = 1.0;

/// Depth an additive part reaches into the body it attaches to.
///
/// Parts never meet the body only along a shared face.
pub const JOIN_OVERLAP: f64 = 0.2;

/// Read-only dimension table injected into every builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrickConstants {
    /// Center-to-center distance between adjacent studs
    pub grid_spacing: f64,
    pub stud_diameter: f64,
    pub hollow_stud_inner_diameter: f64,
    pub stud_height: f64,
    /// Height of a full-height brick (ratio 1)
    pub block_height: f64,
    pub wall_thickness: f64,
    pub roof_thickness: f64,
    /// Gap removed from each outer face so neighbors do not bind
    pub play: f64,
    pub post_diameter: f64,
    pub post_wall_thickness: f64,
    pub pin_diameter: f64,
    pub reinforcing_width: f64,
    /// How far a spline ridge protrudes from the wall
    pub spline_length: f64,
    pub spline_thickness: f64,
    /// Arm width of the cross-shaped axle profile
    pub axle_spline_width: f64,
    /// Tip-to-tip span of the cross-shaped axle profile
    pub axle_diameter: f64,
    pub horizontal_hole_diameter: f64,
    /// Height of the first horizontal hole axis above the bottom face
    pub horizontal_hole_z_offset: f64,
    pub horizontal_hole_bevel_diameter: f64,
    pub horizontal_hole_bevel_depth: f64,
    pub horizontal_hole_wall_thickness: f64,
    /// Keeps the stud fillet strictly below half the stud radius
    pub fillet_epsilon: f64,
}

impl Default for BrickConstants {
    fn default() -> Self {
        Self {
            grid_spacing: 8.0,
            stud_diameter: 4.85,
            hollow_stud_inner_diameter: 3.1,
            stud_height: 1.8,
            block_height: 9.6,
            wall_thickness: 1.45,
            roof_thickness: 1.0,
            play: 0.1,
            post_diameter: 6.5,
            post_wall_thickness: 0.85,
            pin_diameter: 3.0,
            reinforcing_width: 0.7,
            spline_length: 0.25,
            spline_thickness: 0.7,
            axle_spline_width: 2.0,
            axle_diameter: 5.0,
            horizontal_hole_diameter: 4.8,
            horizontal_hole_z_offset: 5.8,
            horizontal_hole_bevel_diameter: 6.2,
            horizontal_hole_bevel_depth: 0.9,
            horizontal_hole_wall_thickness: 1.0,
            fillet_epsilon: 0.01,
        }
    }
}

impl BrickConstants {
    fn entries(&self) -> [(&'static str, f64); 22] {
        [
            ("grid_spacing", self.grid_spacing),
            ("stud_diameter", self.stud_diameter),
            ("hollow_stud_inner_diameter", self.hollow_stud_inner_diameter),
            ("stud_height", self.stud_height),
            ("block_height", self.block_height),
            ("wall_thickness", self.wall_thickness),
            ("roof_thickness", self.roof_thickness),
            ("play", self.play),
            ("post_diameter", self.post_diameter),
            ("post_wall_thickness", self.post_wall_thickness),
            ("pin_diameter", self.pin_diameter),
            ("reinforcing_width", self.reinforcing_width),
            ("spline_length", self.spline_length),
            ("spline_thickness", self.spline_thickness),
            ("axle_spline_width", self.axle_spline_width),
            ("axle_diameter", self.axle_diameter),
            ("horizontal_hole_diameter", self.horizontal_hole_diameter),
            ("horizontal_hole_z_offset", self.horizontal_hole_z_offset),
            (
                "horizontal_hole_bevel_diameter",
                self.horizontal_hole_bevel_diameter,
            ),
            ("horizontal_hole_bevel_depth", self.horizontal_hole_bevel_depth),
            (
                "horizontal_hole_wall_thickness",
                self.horizontal_hole_wall_thickness,
            ),
            ("fillet_epsilon", self.fillet_epsilon),
        ]
    }

    /// Reject non-positive or non-finite entries and a play that eats a whole
    /// grid unit
    pub fn validate(&self) -> BrickResult<()> {
        for (name, value) in self.entries() {
            if !(value.is_finite() && value > 0.0) {
                return Err(BrickError::invalid(
                    name,
                    format!("must be a positive length, got {value}"),
                ));
            }
        }
        if 2.0 * self.play >= self.grid_spacing {
            return Err(BrickError::invalid(
                "play",
                "twice the play must be smaller than the grid spacing",
            ));
        }
        Ok(())
    }

    /// Inner diameter of a hollow post
    pub fn post_inner_diameter(&self) -> f64 {
        self.post_diameter - 2.0 * self.post_wall_thickness
    }

    /// Outer diameter of the collar around a horizontal hole
    pub fn hole_collar_diameter(&self) -> f64 {
        self.horizontal_hole_diameter + 2.0 * self.horizontal_hole_wall_thickness
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_are_valid() {
        let constants = BrickConstants::default();
        assert!(constants.validate().is_ok());
        assert_relative_eq!(constants.post_inner_diameter(), 4.8);
        assert_relative_eq!(constants.hole_collar_diameter(), 6.8);
    }

    #[test]
    fn test_rejects_non_positive_entry() {
        let constants = BrickConstants {
            wall_thickness: 0.0,
            ..Default::default()
        };
        let err = constants.validate().unwrap_err();
        assert_eq!(err.subject(), "wall_thickness");
    }

    #[test]
    fn test_rejects_excessive_play() {
        let constants = BrickConstants {
            play: 4.0,
            ..Default::default()
        };
        assert!(constants.validate().is_err());
    }
}
