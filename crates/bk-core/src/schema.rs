//! Parameter schema for UI and tooling collaborators

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::constants::MIN_HEIGHT_RATIO;
use crate::params::{BrickParameters, MAX_STUDS, STUD_RESCALE_RANGE};

/// Value domain of one parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParameterKind {
    Integer { min: u32, max: Option<u32> },
    Ratio { min: f64, max: f64 },
    /// Listed fractions, or any positive integer
    Height { allowed_fractions: Vec<f64> },
    Choice { options: Vec<String> },
    Toggle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Field name in [`BrickParameters`]
    pub name: String,
    pub label: String,
    pub kind: ParameterKind,
    pub default: Value,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    pub parameters: Vec<ParameterSpec>,
}

fn spec(name: &str, label: &str, kind: ParameterKind, default: Value, description: &str) -> ParameterSpec {
    ParameterSpec {
        name: name.to_owned(),
        label: label.to_owned(),
        kind,
        default,
        description: description.to_owned(),
    }
}

fn choice(options: &[&str]) -> ParameterKind {
    ParameterKind::Choice {
        options: options.iter().map(|o| (*o).to_owned()).collect(),
    }
}

impl ParameterSchema {
    /// One entry per [`BrickParameters`] field, in declaration order
    pub fn standard() -> Self {
        let d = BrickParameters::default();
        let studs = ParameterKind::Integer {
            min: 1,
            max: Some(MAX_STUDS),
        };
        let parameters = vec![
            spec("width", "Width", studs.clone(), json!(d.width), "Studs along one side"),
            spec("length", "Length", studs, json!(d.length), "Studs along the other side"),
            spec(
                "height",
                "Height",
                ParameterKind::Height {
                    allowed_fractions: vec![MIN_HEIGHT_RATIO, 0.5],
                },
                json!(d.height),
                "Height in block units: 1/3 (plate), 1/2 or a whole number",
            ),
            spec(
                "brick_type",
                "Type",
                choice(&["Brick", "Tile", "Baseplate"]),
                json!(d.brick_type),
                "Tiles have no studs; baseplates are thin closed slabs",
            ),
            spec(
                "stud_variant",
                "Studs",
                choice(&["Solid", "Hollow"]),
                json!(d.stud_variant),
                "Hollow studs have a bore through the top",
            ),
            spec(
                "bottom_variant",
                "Bottom",
                choice(&["Open", "Closed"]),
                json!(d.bottom_variant),
                "Closed bottoms have no cavity or interior supports",
            ),
            spec(
                "horizontal_holes",
                "Horizontal holes",
                ParameterKind::Toggle,
                json!(d.horizontal_holes),
                "Technic holes through one-wide pieces of full height",
            ),
            spec(
                "vertical_axle_holes",
                "Vertical axle holes",
                ParameterKind::Toggle,
                json!(d.vertical_axle_holes),
                "Cross-shaped axle holes at interior grid intersections",
            ),
            spec(
                "include_splines",
                "Splines",
                ParameterKind::Toggle,
                json!(d.include_splines),
                "Gripping ridges on the inner walls",
            ),
            spec(
                "with_posts",
                "Posts",
                ParameterKind::Toggle,
                json!(d.with_posts),
                "Hollow columns under the interior grid intersections",
            ),
            spec(
                "use_reinforcement",
                "Reinforcement",
                ParameterKind::Toggle,
                json!(d.use_reinforcement),
                "Cross bracing around each post",
            ),
            spec(
                "stud_rescale",
                "Stud rescale",
                ParameterKind::Ratio {
                    min: STUD_RESCALE_RANGE.0,
                    max: STUD_RESCALE_RANGE.1,
                },
                json!(d.stud_rescale),
                "Scale applied to stud diameters to tune the clutch fit",
            ),
            spec(
                "stud_top_roundness",
                "Stud top roundness",
                ParameterKind::Ratio { min: 0.0, max: 1.0 },
                json!(d.stud_top_roundness),
                "0 for a flat top, 1 for a fully rounded rim",
            ),
            spec(
                "tessellation_segments",
                "Segments",
                ParameterKind::Integer { min: 3, max: None },
                json!(d.tessellation_segments),
                "Facets used for round features",
            ),
        ];
        Self { parameters }
    }

    pub fn get(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
