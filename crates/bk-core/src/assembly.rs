//! Assembly pipeline
//!
//! Runs every enabled feature builder, then reduces the results in two
//! phases: all additive parts are unioned, then the subtractive parts are cut
//! from that body in plan order. The result is centered on the origin.

use bk_cad::{CadKernel, CadResult, Solid};
use glam::DVec3;
use rayon::prelude::*;
use serde::Serialize;

use crate::constants::BrickConstants;
use crate::dimensions::{DerivedDimensions, derive_dimensions};
use crate::error::{BrickError, BrickResult};
use crate::features::{
    BuildContext, FeatureDescriptor, FeatureRole, FeatureSet, STANDARD_FEATURES,
};
use crate::params::BrickParameters;

/// Feature name used for failures of the additive union
pub const UNION_STAGE: &str = "additive_union";

/// Feature name used for failures of the final centering move
pub const CENTERING_STAGE: &str = "centering";

/// Number of parts one feature contributed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureCount {
    pub name: &'static str,
    pub role: FeatureRole,
    pub parts: usize,
}

/// Built feature sets split into the two reduction phases
#[derive(Debug, Default)]
pub struct AssemblyPlan {
    /// Unioned first, in order
    pub additive: Vec<FeatureSet>,
    /// Cut from the union afterwards, in order
    pub subtractive: Vec<FeatureSet>,
}

impl AssemblyPlan {
    pub fn push(&mut self, role: FeatureRole, set: FeatureSet) {
        debug_assert!(set.parts.iter().all(|(_, r)| *r == role));
        match role {
            FeatureRole::Additive => self.additive.push(set),
            FeatureRole::Subtractive => self.subtractive.push(set),
        }
    }

    /// Parts per feature, additive features first
    pub fn feature_counts(&self) -> Vec<FeatureCount> {
        self.additive
            .iter()
            .map(|set| (set, FeatureRole::Additive))
            .chain(self.subtractive.iter().map(|set| (set, FeatureRole::Subtractive)))
            .map(|(set, role)| FeatureCount {
                name: set.name,
                role,
                parts: set.len(),
            })
            .collect()
    }

    /// Parts of the named feature, 0 when it is not in the plan
    pub fn parts_of(&self, name: &str) -> usize {
        self.additive
            .iter()
            .chain(&self.subtractive)
            .filter(|set| set.name == name)
            .map(FeatureSet::len)
            .sum()
    }

    pub fn release(self, kernel: &dyn CadKernel) {
        for set in self.additive.into_iter().chain(self.subtractive) {
            set.release(kernel);
        }
    }

    /// Reduce the plan to one solid centered on the horizontal origin
    pub fn compose(self, kernel: &dyn CadKernel, dims: &DerivedDimensions) -> BrickResult<Solid> {
        let additive: Vec<Solid> = self
            .additive
            .into_iter()
            .flat_map(|set| set.parts.into_iter().map(|(solid, _)| solid))
            .collect();
        let cuts: Vec<(&'static str, Solid)> = self
            .subtractive
            .into_iter()
            .flat_map(|set| {
                let name = set.name;
                set.parts.into_iter().map(move |(solid, _)| (name, solid))
            })
            .collect();

        let body = match union_tree(kernel, additive) {
            Ok(body) => body,
            Err(err) => {
                for (_, tool) in cuts {
                    kernel.release(tool);
                }
                return Err(err);
            }
        };
        let body = subtract_in_order(kernel, body, cuts)?;

        kernel
            .moved(
                body,
                DVec3::new(-dims.overall_length / 2.0, -dims.overall_width / 2.0, 0.0),
            )
            .map_err(|e| BrickError::kernel(CENTERING_STAGE, e))
    }
}

/// Union all solids with a balanced pairwise reduction tree.
///
/// Each level fuses disjoint pairs in parallel; an odd solid passes through.
pub(crate) fn union_tree(kernel: &dyn CadKernel, mut solids: Vec<Solid>) -> BrickResult<Solid> {
    let mut depth = 0_usize;
    while solids.len() > 1 {
        let mut pairs = Vec::with_capacity(solids.len().div_ceil(2));
        let mut remaining = solids.into_iter();
        while let Some(a) = remaining.next() {
            pairs.push((a, remaining.next()));
        }

        let results: Vec<CadResult<Solid>> = pairs
            .into_par_iter()
            .map(|(a, b)| match b {
                Some(b) => {
                    tracing::trace!(depth, "union pair");
                    kernel.fuse(a, b)
                }
                None => Ok(a),
            })
            .collect();

        solids = Vec::with_capacity(results.len());
        let mut failure = None;
        for result in results {
            match result {
                Ok(solid) => solids.push(solid),
                Err(err) => {
                    failure.get_or_insert(err);
                }
            }
        }
        if let Some(err) = failure {
            for solid in solids {
                kernel.release(solid);
            }
            return Err(BrickError::kernel(UNION_STAGE, err));
        }
        depth += 1;
    }

    solids
        .pop()
        .ok_or_else(|| BrickError::degenerate(UNION_STAGE, "no additive geometry"))
}

/// `((body - a) - b) - ...`; cut order matters so this stays sequential
fn subtract_in_order(
    kernel: &dyn CadKernel,
    mut body: Solid,
    cuts: Vec<(&'static str, Solid)>,
) -> BrickResult<Solid> {
    let mut cuts = cuts.into_iter();
    while let Some((feature, tool)) = cuts.next() {
        tracing::trace!(feature, "subtract");
        body = match kernel.cut(body, tool) {
            Ok(body) => body,
            Err(err) => {
                for (_, tool) in cuts {
                    kernel.release(tool);
                }
                return Err(BrickError::kernel(feature, err));
            }
        };
    }
    Ok(body)
}

/// Run the enabled builders of `descriptors` in parallel.
///
/// Sets land in the plan in descriptor order regardless of which builder
/// finishes first. If any builder fails, everything built so far is released
/// and the first failure in descriptor order is returned.
pub fn plan_with(
    kernel: &dyn CadKernel,
    params: &BrickParameters,
    dims: &DerivedDimensions,
    constants: &BrickConstants,
    descriptors: &[FeatureDescriptor],
) -> BrickResult<AssemblyPlan> {
    let ctx = BuildContext::new(kernel, params, dims, constants);
    let enabled: Vec<&FeatureDescriptor> = descriptors
        .iter()
        .filter(|d| d.is_enabled(params, dims))
        .collect();

    let results: Vec<BrickResult<Option<FeatureSet>>> =
        enabled.par_iter().map(|d| (d.build)(&ctx)).collect();

    let mut plan = AssemblyPlan::default();
    let mut failure = None;
    for (descriptor, result) in enabled.iter().zip(results) {
        match result {
            Ok(Some(set)) => {
                tracing::debug!(feature = set.name, parts = set.len(), "feature built");
                plan.push(descriptor.role, set);
            }
            Ok(None) => tracing::debug!(feature = descriptor.name, "feature not applicable"),
            Err(err) => {
                failure.get_or_insert(err);
            }
        }
    }

    match failure {
        Some(err) => {
            plan.release(kernel);
            Err(err)
        }
        None => Ok(plan),
    }
}

/// Run the standard feature table
pub fn plan_brick(
    kernel: &dyn CadKernel,
    params: &BrickParameters,
    dims: &DerivedDimensions,
    constants: &BrickConstants,
) -> BrickResult<AssemblyPlan> {
    plan_with(kernel, params, dims, constants, &STANDARD_FEATURES)
}

/// A finished piece with the numbers that describe it
#[derive(Debug)]
pub struct BrickBuild {
    pub solid: Solid,
    pub dimensions: DerivedDimensions,
    pub features: Vec<FeatureCount>,
}

/// Validate, plan and compose one piece
pub fn assemble(
    kernel: &dyn CadKernel,
    params: &BrickParameters,
    constants: &BrickConstants,
) -> BrickResult<BrickBuild> {
    params.validate()?;
    constants.validate()?;
    let dims = derive_dimensions(params, constants)?;

    let span = tracing::info_span!(
        "build_brick",
        width = dims.normalized_width,
        length = dims.normalized_length,
        height = dims.real_height_ratio,
        kernel = kernel.name(),
    );
    let _guard = span.enter();

    let plan = plan_brick(kernel, params, &dims, constants)?;
    let features = plan.feature_counts();
    let solid = plan.compose(kernel, &dims)?;

    tracing::info!(
        length_mm = dims.overall_length,
        width_mm = dims.overall_width,
        height_mm = dims.overall_height,
        features = features.len(),
        "brick built"
    );

    Ok(BrickBuild {
        solid,
        dimensions: dims,
        features,
    })
}

/// Build one piece and return only its solid
pub fn build_brick(
    kernel: &dyn CadKernel,
    params: &BrickParameters,
    constants: &BrickConstants,
) -> BrickResult<Solid> {
    assemble(kernel, params, constants).map(|build| build.solid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{BuildFn, EnabledFn};
    use bk_cad::CsgKernel;

    fn always(_: &BrickParameters, _: &DerivedDimensions) -> bool {
        true
    }

    fn cube(ctx: &BuildContext<'_>) -> BrickResult<Option<FeatureSet>> {
        let solid = ctx.block("cube", DVec3::ZERO, DVec3::splat(4.0))?;
        Ok(Some(FeatureSet::single("cube", solid, FeatureRole::Additive)))
    }

    fn slab(ctx: &BuildContext<'_>) -> BrickResult<Option<FeatureSet>> {
        let solid = ctx.block("slab", DVec3::new(0.0, 0.0, 1.0), DVec3::new(4.0, 4.0, 2.0))?;
        Ok(Some(FeatureSet::single("slab", solid, FeatureRole::Subtractive)))
    }

    fn nothing(_: &BuildContext<'_>) -> BrickResult<Option<FeatureSet>> {
        Ok(None)
    }

    fn broken(_: &BuildContext<'_>) -> BrickResult<Option<FeatureSet>> {
        Err(BrickError::degenerate("broken", "always fails"))
    }

    fn descriptor(name: &'static str, role: FeatureRole, build: BuildFn) -> FeatureDescriptor {
        let enabled: EnabledFn = always;
        FeatureDescriptor {
            name,
            role,
            enabled,
            build,
        }
    }

    fn setup() -> (CsgKernel, BrickParameters, DerivedDimensions, BrickConstants) {
        let params = BrickParameters::new(1, 1, 1.0);
        let constants = BrickConstants::default();
        let dims = derive_dimensions(&params, &constants).unwrap();
        (CsgKernel::new(), params, dims, constants)
    }

    #[test]
    fn test_union_tree_handles_odd_counts() {
        let kernel = CsgKernel::new();
        let solids: Vec<Solid> = (0..5)
            .map(|i| {
                kernel
                    .create_box(DVec3::new(f64::from(i) * 2.0, 0.0, 0.0), DVec3::ONE)
                    .unwrap()
            })
            .collect();
        let body = union_tree(&kernel, solids).unwrap();
        for i in 0..5 {
            let p = DVec3::new(f64::from(i) * 2.0, 0.0, 0.0);
            assert!(kernel.contains_point(&body, p).unwrap());
        }
        assert!(!kernel.contains_point(&body, DVec3::new(1.0, 0.0, 0.0)).unwrap());
        assert_eq!(kernel.live_solids(), 1);
    }

    #[test]
    fn test_skipped_builders_are_not_errors() {
        let (kernel, params, dims, constants) = setup();
        let table = [
            descriptor("cube", FeatureRole::Additive, cube),
            descriptor("nothing", FeatureRole::Additive, nothing),
        ];
        let plan = plan_with(&kernel, &params, &dims, &constants, &table).unwrap();
        assert_eq!(plan.parts_of("cube"), 1);
        assert_eq!(plan.parts_of("nothing"), 0);
        assert_eq!(plan.feature_counts().len(), 1);
    }

    #[test]
    fn test_failure_releases_everything() {
        let (kernel, params, dims, constants) = setup();
        let table = [
            descriptor("cube", FeatureRole::Additive, cube),
            descriptor("broken", FeatureRole::Additive, broken),
            descriptor("slab", FeatureRole::Subtractive, slab),
        ];
        let err = plan_with(&kernel, &params, &dims, &constants, &table).unwrap_err();
        assert_eq!(err.subject(), "broken");
        assert_eq!(kernel.live_solids(), 0);
    }

    #[test]
    fn test_compose_cuts_after_union_and_centers() {
        let (kernel, params, dims, constants) = setup();
        let table = [
            descriptor("slab", FeatureRole::Subtractive, slab),
            descriptor("cube", FeatureRole::Additive, cube),
        ];
        let plan = plan_with(&kernel, &params, &dims, &constants, &table).unwrap();
        let body = plan.compose(&kernel, &dims).unwrap();

        let shift = DVec3::new(-dims.overall_length / 2.0, -dims.overall_width / 2.0, 0.0);
        let solid_at = |p: DVec3| kernel.contains_point(&body, p + shift).unwrap();
        assert!(solid_at(DVec3::new(2.0, 2.0, 0.5)));
        assert!(!solid_at(DVec3::new(2.0, 2.0, 1.5)));
        assert!(solid_at(DVec3::new(2.0, 2.0, 3.0)));
        assert_eq!(kernel.live_solids(), 1);
    }

    #[test]
    fn test_empty_plan_is_degenerate() {
        let (kernel, _, dims, _) = setup();
        let err = AssemblyPlan::default().compose(&kernel, &dims).unwrap_err();
        assert!(matches!(err, BrickError::DegenerateGeometry { .. }));
    }
}
