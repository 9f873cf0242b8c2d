//! Feature builders
//!
//! Each builder turns derived dimensions into a [`FeatureSet`], or nothing
//! when the feature does not apply. Builders never depend on each other; the
//! assembly pipeline decides which ones run through the descriptor table in
//! [`STANDARD_FEATURES`].

pub mod axle;
pub mod pin;
pub mod post;
pub mod reinforcement;
pub mod shell;
pub mod spline;
pub mod stud;
pub mod technic;

use std::fmt;

use bk_cad::{CadKernel, SketchPlane, Solid, Wire2D};
use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::constants::{BrickConstants, JOIN_OVERLAP};
use crate::dimensions::DerivedDimensions;
use crate::error::{BrickError, BrickResult};
use crate::params::BrickParameters;

/// How a part takes part in the final boolean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureRole {
    /// Unioned into the body
    Additive,
    /// Cut from the body after every additive part is merged
    Subtractive,
}

/// Named list of solids produced by one builder
#[derive(Debug)]
pub struct FeatureSet {
    pub name: &'static str,
    pub parts: Vec<(Solid, FeatureRole)>,
}

impl FeatureSet {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            parts: Vec::new(),
        }
    }

    /// A set holding a single part
    pub fn single(name: &'static str, solid: Solid, role: FeatureRole) -> Self {
        Self {
            name,
            parts: vec![(solid, role)],
        }
    }

    pub fn push(&mut self, solid: Solid, role: FeatureRole) {
        self.parts.push((solid, role));
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Number of parts with the given role
    pub fn count(&self, role: FeatureRole) -> usize {
        self.parts.iter().filter(|(_, r)| *r == role).count()
    }

    /// Hand every part back to the kernel without using it
    pub fn release(self, kernel: &dyn CadKernel) {
        for (solid, _) in self.parts {
            kernel.release(solid);
        }
    }
}

/// Everything a builder reads
#[derive(Clone, Copy)]
pub struct BuildContext<'a> {
    pub kernel: &'a dyn CadKernel,
    pub params: &'a BrickParameters,
    pub dims: &'a DerivedDimensions,
    pub constants: &'a BrickConstants,
}

impl<'a> BuildContext<'a> {
    pub fn new(
        kernel: &'a dyn CadKernel,
        params: &'a BrickParameters,
        dims: &'a DerivedDimensions,
        constants: &'a BrickConstants,
    ) -> Self {
        Self {
            kernel,
            params,
            dims,
            constants,
        }
    }

    pub fn segments(&self) -> u32 {
        self.params.tessellation_segments
    }

    /// Top of parts standing in the cavity: `JOIN_OVERLAP` into the roof
    pub fn interior_top(&self) -> f64 {
        self.dims.overall_height - self.constants.roof_thickness + JOIN_OVERLAP
    }

    /// Axis-aligned box between two corners
    pub fn block(&self, feature: &'static str, min: DVec3, max: DVec3) -> BrickResult<Solid> {
        let size = max - min;
        if !size.cmpgt(DVec3::ZERO).all() {
            return Err(BrickError::degenerate(
                feature,
                format!("box extent {size} is not positive"),
            ));
        }
        self.kernel
            .create_box((min + max) * 0.5, size)
            .map_err(|e| BrickError::kernel(feature, e))
    }

    /// Cylinder starting at `base` and running `height` along `axis`
    pub fn column(
        &self,
        feature: &'static str,
        base: DVec3,
        diameter: f64,
        height: f64,
        axis: DVec3,
    ) -> BrickResult<Solid> {
        if !(diameter > 0.0 && height > 0.0) {
            return Err(BrickError::degenerate(
                feature,
                format!("cylinder diameter {diameter} and height {height} must be positive"),
            ));
        }
        self.kernel
            .create_cylinder(
                base + axis * (height / 2.0),
                diameter / 2.0,
                height,
                axis,
                self.segments(),
            )
            .map_err(|e| BrickError::kernel(feature, e))
    }

    /// Vertical prism of `profile` from `z` up by `height`
    pub fn prism(
        &self,
        feature: &'static str,
        profile: &Wire2D,
        z: f64,
        height: f64,
    ) -> BrickResult<Solid> {
        if height <= 0.0 {
            return Err(BrickError::degenerate(
                feature,
                format!("prism height {height} is not positive"),
            ));
        }
        self.kernel
            .extrude(profile, &SketchPlane::xy(z), height)
            .map_err(|e| BrickError::kernel(feature, e))
    }

    /// Subtract a freshly built tool, releasing the target if the tool failed
    pub fn cut(
        &self,
        feature: &'static str,
        target: Solid,
        tool: BrickResult<Solid>,
    ) -> BrickResult<Solid> {
        match tool {
            Ok(tool) => self
                .kernel
                .cut(target, tool)
                .map_err(|e| BrickError::kernel(feature, e)),
            Err(err) => {
                self.kernel.release(target);
                Err(err)
            }
        }
    }

    /// Union with a freshly built part, releasing `base` if the part failed
    pub fn fuse(
        &self,
        feature: &'static str,
        base: Solid,
        part: BrickResult<Solid>,
    ) -> BrickResult<Solid> {
        match part {
            Ok(part) => self
                .kernel
                .fuse(base, part)
                .map_err(|e| BrickError::kernel(feature, e)),
            Err(err) => {
                self.kernel.release(base);
                Err(err)
            }
        }
    }

    /// Build one part per item; `None` when there are no items.
    ///
    /// Parts built before a failure are released.
    pub fn collect<T>(
        &self,
        feature: &'static str,
        role: FeatureRole,
        items: impl IntoIterator<Item = T>,
        mut build: impl FnMut(T) -> BrickResult<Solid>,
    ) -> BrickResult<Option<FeatureSet>> {
        let mut set = FeatureSet::new(feature);
        for item in items {
            match build(item) {
                Ok(solid) => set.push(solid, role),
                Err(err) => {
                    set.release(self.kernel);
                    return Err(err);
                }
            }
        }
        Ok((!set.is_empty()).then_some(set))
    }
}

/// Decides whether a builder runs for a piece
pub type EnabledFn = fn(&BrickParameters, &DerivedDimensions) -> bool;

/// Builds a feature; `Ok(None)` means not applicable
pub type BuildFn = fn(&BuildContext<'_>) -> BrickResult<Option<FeatureSet>>;

/// Declarative entry of the feature table
#[derive(Clone, Copy)]
pub struct FeatureDescriptor {
    pub name: &'static str,
    pub role: FeatureRole,
    pub enabled: EnabledFn,
    pub build: BuildFn,
}

impl FeatureDescriptor {
    pub fn is_enabled(&self, params: &BrickParameters, dims: &DerivedDimensions) -> bool {
        (self.enabled)(params, dims)
    }
}

impl fmt::Debug for FeatureDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureDescriptor")
            .field("name", &self.name)
            .field("role", &self.role)
            .finish()
    }
}

/// Every feature in pipeline order.
///
/// Additive entries are unioned in this order; subtractive entries are cut in
/// this order.
pub const STANDARD_FEATURES: [FeatureDescriptor; 9] = [
    FeatureDescriptor {
        name: shell::NAME,
        role: FeatureRole::Additive,
        enabled: shell::enabled,
        build: shell::build,
    },
    FeatureDescriptor {
        name: stud::NAME,
        role: FeatureRole::Additive,
        enabled: stud::enabled,
        build: stud::build,
    },
    FeatureDescriptor {
        name: spline::NAME,
        role: FeatureRole::Additive,
        enabled: spline::enabled,
        build: spline::build,
    },
    FeatureDescriptor {
        name: post::NAME,
        role: FeatureRole::Additive,
        enabled: post::enabled,
        build: post::build,
    },
    FeatureDescriptor {
        name: pin::NAME,
        role: FeatureRole::Additive,
        enabled: pin::enabled,
        build: pin::build,
    },
    FeatureDescriptor {
        name: reinforcement::NAME,
        role: FeatureRole::Additive,
        enabled: reinforcement::enabled,
        build: reinforcement::build,
    },
    FeatureDescriptor {
        name: technic::SUPPORT_NAME,
        role: FeatureRole::Additive,
        enabled: technic::enabled,
        build: technic::build_support,
    },
    FeatureDescriptor {
        name: technic::HOLE_NAME,
        role: FeatureRole::Subtractive,
        enabled: technic::enabled,
        build: technic::build_holes,
    },
    FeatureDescriptor {
        name: axle::NAME,
        role: FeatureRole::Subtractive,
        enabled: axle::enabled,
        build: axle::build,
    },
];
