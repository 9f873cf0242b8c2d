//! Constructive Solid Geometry Kernel Backend
//!
//! Keeps every solid as an immutable tree of primitives and boolean nodes.
//! Booleans are exact and cannot fail on valid handles. Point membership and
//! bounds are evaluated directly against the tree, which makes this backend a
//! fast, deterministic reference for geometry queries.
//!
//! Note: boundary meshes are never evaluated, so tessellation is not supported.
//! Use the Truck backend (`truck` feature) to export meshes.

use std::collections::HashMap;
use std::sync::Arc;

use glam::{DAffine3, DVec2, DVec3};
use parking_lot::Mutex;
use uuid::Uuid;

use super::{
    Axis3D, BooleanType, BoundingBox, CadError, CadKernel, CadResult, Solid, SketchPlane,
    TessellatedMesh, Wire2D,
};

/// Tolerance for plane/axis alignment checks
const ALIGNMENT_TOLERANCE: f64 = 1e-9;

/// A node of the solid tree
#[derive(Debug)]
enum Node {
    Block {
        bounds: BoundingBox,
    },
    Cylinder {
        base: DVec3,
        axis: DVec3,
        height: f64,
        radius: f64,
    },
    Prism {
        plane: SketchPlane,
        polygon: Vec<DVec2>,
        depth: f64,
    },
    /// Full revolution; `section` holds (position along axis, distance from axis)
    Revolution {
        origin: DVec3,
        axis: DVec3,
        section: Vec<DVec2>,
    },
    Boolean {
        op: BooleanType,
        a: Arc<Node>,
        b: Arc<Node>,
    },
    Transformed {
        node: Arc<Node>,
        forward: DAffine3,
        inverse: DAffine3,
    },
}

impl Node {
    fn contains(&self, p: DVec3) -> bool {
        match self {
            Node::Block { bounds } => bounds.contains(p),
            Node::Cylinder {
                base,
                axis,
                height,
                radius,
            } => {
                let d = p - *base;
                let t = d.dot(*axis);
                (0.0..=*height).contains(&t) && (d - *axis * t).length() <= *radius
            }
            Node::Prism {
                plane,
                polygon,
                depth,
            } => {
                let (local, w) = plane.to_local(p);
                (0.0..=*depth).contains(&w) && polygon_contains(polygon, local)
            }
            Node::Revolution {
                origin,
                axis,
                section,
            } => {
                let d = p - *origin;
                let t = d.dot(*axis);
                let rho = (d - *axis * t).length();
                polygon_contains(section, DVec2::new(t, rho))
            }
            Node::Boolean { op, a, b } => match op {
                BooleanType::Union => a.contains(p) || b.contains(p),
                BooleanType::Subtract => a.contains(p) && !b.contains(p),
                BooleanType::Intersect => a.contains(p) && b.contains(p),
            },
            Node::Transformed { node, inverse, .. } => {
                node.contains(inverse.transform_point3(p))
            }
        }
    }

    /// Conservative bounds; `None` when the solid is provably empty
    fn bounds(&self) -> Option<BoundingBox> {
        match self {
            Node::Block { bounds } => Some(*bounds),
            Node::Cylinder {
                base,
                axis,
                height,
                radius,
            } => {
                let top = *base + *axis * *height;
                let reach = disc_reach(*axis, *radius);
                Some(BoundingBox::new(
                    base.min(top) - reach,
                    base.max(top) + reach,
                ))
            }
            Node::Prism {
                plane,
                polygon,
                depth,
            } => {
                let lift = plane.normal() * *depth;
                BoundingBox::from_points(polygon.iter().flat_map(|&p| {
                    let bottom = plane.to_world(p);
                    [bottom, bottom + lift]
                }))
            }
            Node::Revolution {
                origin,
                axis,
                section,
            } => section
                .iter()
                .map(|s| {
                    let center = *origin + *axis * s.x;
                    let reach = disc_reach(*axis, s.y);
                    BoundingBox::new(center - reach, center + reach)
                })
                .reduce(|acc, b| acc.union(&b)),
            Node::Boolean { op, a, b } => match op {
                BooleanType::Union => match (a.bounds(), b.bounds()) {
                    (Some(x), Some(y)) => Some(x.union(&y)),
                    (x, y) => x.or(y),
                },
                BooleanType::Subtract => a.bounds(),
                BooleanType::Intersect => a.bounds()?.intersection(&b.bounds()?),
            },
            Node::Transformed { node, forward, .. } => {
                let inner = node.bounds()?;
                BoundingBox::from_points(
                    inner
                        .corners()
                        .into_iter()
                        .map(|c| forward.transform_point3(c)),
                )
            }
        }
    }
}

/// Half-extent per world axis of a disc with the given normal and radius
fn disc_reach(normal: DVec3, radius: f64) -> DVec3 {
    let n2 = normal * normal;
    DVec3::new(
        (1.0 - n2.x).max(0.0).sqrt(),
        (1.0 - n2.y).max(0.0).sqrt(),
        (1.0 - n2.z).max(0.0).sqrt(),
    ) * radius
}

/// Even-odd point in polygon test; points on an edge count as inside
fn polygon_contains(polygon: &[DVec2], p: DVec2) -> bool {
    let Some(&last) = polygon.last() else {
        return false;
    };
    let mut inside = false;
    let mut b = last;
    for &a in polygon {
        let edge = b - a;
        let to_p = p - a;
        if edge.perp_dot(to_p).abs() <= ALIGNMENT_TOLERANCE * edge.length().max(1.0)
            && (0.0..=edge.length_squared()).contains(&edge.dot(to_p))
        {
            return true;
        }
        if (a.y > p.y) != (b.y > p.y) {
            let x = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x {
                inside = !inside;
            }
        }
        b = a;
    }
    inside
}

fn require_positive(name: &str, value: f64) -> CadResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CadError::InvalidDimension(format!(
            "{name} must be positive, got {value}"
        )))
    }
}

/// CSG-tree kernel
pub struct CsgKernel {
    /// Storage for solid trees (keyed by UUID)
    solids: Mutex<HashMap<Uuid, Arc<Node>>>,
}

impl CsgKernel {
    /// Create a new CSG kernel
    pub fn new() -> Self {
        Self {
            solids: Mutex::new(HashMap::new()),
        }
    }

    /// Number of solids currently held by the kernel
    pub fn live_solids(&self) -> usize {
        self.solids.lock().len()
    }

    fn store(&self, node: Node) -> Solid {
        let id = Uuid::new_v4();
        self.solids.lock().insert(id, Arc::new(node));
        Solid::new(id)
    }

    fn node(&self, solid: &Solid) -> CadResult<Arc<Node>> {
        self.solids
            .lock()
            .get(&solid.id())
            .cloned()
            .ok_or(CadError::SolidNotFound(solid.id()))
    }

    fn transformed(&self, solid: &Solid, forward: DAffine3) -> CadResult<Solid> {
        let node = self.node(solid)?;
        Ok(self.store(Node::Transformed {
            node,
            forward,
            inverse: forward.inverse(),
        }))
    }
}

impl Default for CsgKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl CadKernel for CsgKernel {
    fn name(&self) -> &str {
        "csg"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn extrude(&self, profile: &Wire2D, plane: &SketchPlane, distance: f64) -> CadResult<Solid> {
        if !profile.is_valid_profile() {
            return Err(CadError::InvalidProfile(
                "Profile must be closed with at least 3 points".into(),
            ));
        }
        require_positive("extrusion distance", distance)?;

        Ok(self.store(Node::Prism {
            plane: *plane,
            polygon: profile.points.clone(),
            depth: distance,
        }))
    }

    fn revolve(
        &self,
        profile: &Wire2D,
        plane: &SketchPlane,
        axis: &Axis3D,
        angle: f64,
    ) -> CadResult<Solid> {
        if !profile.is_valid_profile() {
            return Err(CadError::InvalidProfile(
                "Profile must be closed with at least 3 points".into(),
            ));
        }
        if angle < std::f64::consts::TAU - ALIGNMENT_TOLERANCE {
            return Err(CadError::OperationFailed(
                "Partial revolutions are not supported by the CSG kernel".into(),
            ));
        }

        let normal = plane.normal();
        let (_, axis_offset) = plane.to_local(axis.origin);
        if axis.direction.dot(normal).abs() > ALIGNMENT_TOLERANCE
            || axis_offset.abs() > ALIGNMENT_TOLERANCE
        {
            return Err(CadError::InvalidProfile(
                "Revolve axis must lie in the profile plane".into(),
            ));
        }

        // In-plane direction pointing away from the axis
        let outward = normal.cross(axis.direction);
        let mut side = 0.0_f64;
        let mut section = Vec::with_capacity(profile.points.len());
        for &point in &profile.points {
            let d = plane.to_world(point) - axis.origin;
            let t = d.dot(axis.direction);
            let s = d.dot(outward);
            if s * side < 0.0 {
                return Err(CadError::InvalidProfile(
                    "Profile crosses the revolve axis".into(),
                ));
            }
            if s != 0.0 {
                side = s;
            }
            section.push(DVec2::new(t, s.abs()));
        }

        Ok(self.store(Node::Revolution {
            origin: axis.origin,
            axis: axis.direction,
            section,
        }))
    }

    fn boolean(&self, a: &Solid, b: &Solid, op: BooleanType) -> CadResult<Solid> {
        let (a, b) = match (self.node(a), self.node(b)) {
            (Ok(a), Ok(b)) => (a, b),
            (Err(e), _) | (_, Err(e)) => {
                return Err(CadError::BooleanFailed(e.to_string()));
            }
        };
        tracing::trace!(?op, "csg boolean");
        Ok(self.store(Node::Boolean { op, a, b }))
    }

    fn translate(&self, solid: &Solid, offset: DVec3) -> CadResult<Solid> {
        self.transformed(solid, DAffine3::from_translation(offset))
    }

    fn rotate(&self, solid: &Solid, axis: &Axis3D, angle: f64) -> CadResult<Solid> {
        let forward = DAffine3::from_translation(axis.origin)
            * DAffine3::from_axis_angle(axis.direction, angle)
            * DAffine3::from_translation(-axis.origin);
        self.transformed(solid, forward)
    }

    fn tessellate(&self, solid: &Solid, _tolerance: f64) -> CadResult<TessellatedMesh> {
        self.node(solid)?;
        Err(CadError::TessellationFailed(
            "The CSG kernel does not evaluate boundary meshes. \
             Enable the truck backend for mesh export."
                .into(),
        ))
    }

    fn create_box(&self, center: DVec3, size: DVec3) -> CadResult<Solid> {
        require_positive("box width", size.x)?;
        require_positive("box depth", size.y)?;
        require_positive("box height", size.z)?;

        let half = size * 0.5;
        Ok(self.store(Node::Block {
            bounds: BoundingBox::new(center - half, center + half),
        }))
    }

    fn create_cylinder(
        &self,
        center: DVec3,
        radius: f64,
        height: f64,
        axis: DVec3,
        segments: u32,
    ) -> CadResult<Solid> {
        require_positive("cylinder radius", radius)?;
        require_positive("cylinder height", height)?;
        if segments < 3 {
            return Err(CadError::InvalidDimension(format!(
                "cylinder needs at least 3 segments, got {segments}"
            )));
        }
        let axis = axis.try_normalize().ok_or_else(|| {
            CadError::InvalidDimension("cylinder axis has zero length".into())
        })?;

        Ok(self.store(Node::Cylinder {
            base: center - axis * (height / 2.0),
            axis,
            height,
            radius,
        }))
    }

    fn bounding_box(&self, solid: &Solid) -> CadResult<BoundingBox> {
        self.node(solid)?
            .bounds()
            .ok_or_else(|| CadError::OperationFailed("Solid is empty".into()))
    }

    fn contains_point(&self, solid: &Solid, point: DVec3) -> CadResult<bool> {
        Ok(self.node(solid)?.contains(point))
    }

    fn release(&self, solid: Solid) {
        self.solids.lock().remove(&solid.id());
    }
}
