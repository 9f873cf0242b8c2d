//! CAD Kernel trait definitions
//!
//! These traits define the interface that all geometry kernels must implement.
//! Solids are opaque handles; the geometry behind them lives in the kernel that
//! created them.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum corner
    pub min: DVec3,
    /// Maximum corner
    pub max: DVec3,
}

impl BoundingBox {
    /// Create a bounding box from two corners (in any order)
    pub fn new(a: DVec3, b: DVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Smallest box enclosing all points, `None` for an empty iterator
    pub fn from_points(points: impl IntoIterator<Item = DVec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::new(first, first), |bounds, p| Self {
            min: bounds.min.min(p),
            max: bounds.max.max(p),
        }))
    }

    /// Extent along each axis
    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    /// Center point
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Smallest box enclosing both boxes
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Overlap of both boxes, `None` when they are disjoint
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        min.cmple(max).all().then_some(Self { min, max })
    }

    /// Whether the point lies inside or on the box
    pub fn contains(&self, point: DVec3) -> bool {
        self.min.cmple(point).all() && point.cmple(self.max).all()
    }

    /// The eight corners of the box
    pub fn corners(&self) -> [DVec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            DVec3::new(a.x, a.y, a.z),
            DVec3::new(b.x, a.y, a.z),
            DVec3::new(b.x, b.y, a.z),
            DVec3::new(a.x, b.y, a.z),
            DVec3::new(a.x, a.y, b.z),
            DVec3::new(b.x, a.y, b.z),
            DVec3::new(b.x, b.y, b.z),
            DVec3::new(a.x, b.y, b.z),
        ]
    }
}

/// Error type for CAD kernel operations
#[derive(Debug, Clone, Error)]
pub enum CadError {
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    #[error("Boolean operation failed: {0}")]
    BooleanFailed(String),

    #[error("Solid not found: {0}")]
    SolidNotFound(Uuid),

    #[error("Tessellation failed: {0}")]
    TessellationFailed(String),

    #[error("Kernel not available: {0}")]
    KernelNotAvailable(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Result type for CAD operations
pub type CadResult<T> = Result<T, CadError>;

/// A tessellated mesh output from the CAD kernel
#[derive(Debug, Clone, Default)]
pub struct TessellatedMesh {
    /// Vertex positions (3 floats per vertex)
    pub vertices: Vec<[f32; 3]>,
    /// Vertex normals (3 floats per vertex)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (3 indices per triangle)
    pub indices: Vec<u32>,
}

impl TessellatedMesh {
    /// Create an empty tessellated mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Get the number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// A 2D wire (closed loop of edges) used as an extrusion or revolve profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wire2D {
    /// Points defining the wire (in order)
    pub points: Vec<DVec2>,
    /// Whether the wire is closed
    pub closed: bool,
}

impl Wire2D {
    /// Create a new wire from points
    pub fn new(points: Vec<DVec2>, closed: bool) -> Self {
        Self { points, closed }
    }

    /// Create a rectangle wire
    pub fn rectangle(center: DVec2, width: f64, height: f64) -> Self {
        let hw = width / 2.0;
        let hh = height / 2.0;
        Self::new(
            vec![
                center + DVec2::new(-hw, -hh),
                center + DVec2::new(hw, -hh),
                center + DVec2::new(hw, hh),
                center + DVec2::new(-hw, hh),
            ],
            true,
        )
    }

    /// Create a circle wire (approximated with segments)
    pub fn circle(center: DVec2, radius: f64, segments: u32) -> Self {
        let points: Vec<DVec2> = (0..segments)
            .map(|i| {
                let angle = (f64::from(i) / f64::from(segments)) * std::f64::consts::TAU;
                center + DVec2::new(angle.cos() * radius, angle.sin() * radius)
            })
            .collect();
        Self::new(points, true)
    }

    /// Create a plus-shaped wire: two bars of `arm_width` crossing at
    /// `center`, each `span` long
    pub fn cross(center: DVec2, arm_width: f64, span: f64) -> Self {
        let w = arm_width / 2.0;
        let s = span / 2.0;
        let corners = [
            (w, -s),
            (w, -w),
            (s, -w),
            (s, w),
            (w, w),
            (w, s),
            (-w, s),
            (-w, w),
            (-s, w),
            (-s, -w),
            (-w, -w),
            (-w, -s),
        ];
        Self::new(
            corners
                .iter()
                .map(|&(x, y)| center + DVec2::new(x, y))
                .collect(),
            true,
        )
    }

    /// Closed wires with at least three points can bound a face
    pub fn is_valid_profile(&self) -> bool {
        self.closed && self.points.len() >= 3
    }
}

/// A 2D drawing plane embedded in 3D space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SketchPlane {
    /// Plane origin in world coordinates
    pub origin: DVec3,
    /// Direction of the local X axis (unit length)
    pub x_axis: DVec3,
    /// Direction of the local Y axis (unit length, perpendicular to X)
    pub y_axis: DVec3,
}

impl SketchPlane {
    /// Create a plane from an origin and two in-plane directions.
    ///
    /// The Y direction is re-orthogonalized against X.
    pub fn new(origin: DVec3, x_axis: DVec3, y_axis: DVec3) -> Self {
        let x_axis = x_axis.normalize();
        let y_axis = (y_axis - x_axis * y_axis.dot(x_axis)).normalize();
        Self {
            origin,
            x_axis,
            y_axis,
        }
    }

    /// Horizontal plane at height `z`, normal pointing up
    pub fn xy(z: f64) -> Self {
        Self::new(DVec3::new(0.0, 0.0, z), DVec3::X, DVec3::Y)
    }

    /// Vertical plane through the origin holding the X and Z axes
    pub fn xz() -> Self {
        Self::new(DVec3::ZERO, DVec3::X, DVec3::Z)
    }

    /// Plane normal (X cross Y)
    pub fn normal(&self) -> DVec3 {
        self.x_axis.cross(self.y_axis)
    }

    /// Map a point in plane coordinates to world coordinates
    pub fn to_world(&self, point: DVec2) -> DVec3 {
        self.origin + self.x_axis * point.x + self.y_axis * point.y
    }

    /// Map a world point to (in-plane coordinates, height above the plane)
    pub fn to_local(&self, point: DVec3) -> (DVec2, f64) {
        let d = point - self.origin;
        (
            DVec2::new(d.dot(self.x_axis), d.dot(self.y_axis)),
            d.dot(self.normal()),
        )
    }
}

/// A 3D solid body.
///
/// This is a handle: the kernel that created it owns the geometry. Handles are
/// deliberately not `Clone`; operations that combine solids take them by value
/// so an intermediate result can only be used once.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Solid {
    id: Uuid,
}

impl Solid {
    /// Create a new solid handle with the given ID
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }

    /// Identifier of the geometry inside the owning kernel
    pub fn id(&self) -> Uuid {
        self.id
    }
}

/// Axis definition for revolve and rotate operations
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Axis3D {
    /// Origin point of the axis
    pub origin: DVec3,
    /// Direction of the axis (normalized)
    pub direction: DVec3,
}

impl Axis3D {
    /// Create an axis from origin and direction
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// X axis at origin
    pub fn x() -> Self {
        Self::new(DVec3::ZERO, DVec3::X)
    }

    /// Y axis at origin
    pub fn y() -> Self {
        Self::new(DVec3::ZERO, DVec3::Y)
    }

    /// Z axis at origin
    pub fn z() -> Self {
        Self::new(DVec3::ZERO, DVec3::Z)
    }
}

/// Boolean operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BooleanType {
    /// Union (add)
    Union,
    /// Subtraction (cut)
    Subtract,
    /// Intersection (common)
    Intersect,
}

/// The main CAD kernel trait
///
/// Implementations of this trait provide the actual geometry operations
/// using different backends (CSG tree, Truck, ...).
pub trait CadKernel: Send + Sync {
    /// Get the name of this kernel
    fn name(&self) -> &str;

    /// Check if the kernel is available
    fn is_available(&self) -> bool;

    /// Extrude a closed 2D profile along the plane normal
    ///
    /// # Arguments
    /// * `profile` - The 2D wire profile to extrude
    /// * `plane` - The plane the profile is drawn in
    /// * `distance` - The extrusion distance along the plane normal
    fn extrude(&self, profile: &Wire2D, plane: &SketchPlane, distance: f64) -> CadResult<Solid>;

    /// Revolve a closed 2D profile around an axis lying in its plane
    ///
    /// # Arguments
    /// * `profile` - The 2D wire profile to revolve
    /// * `plane` - The plane the profile is drawn in
    /// * `axis` - The rotation axis
    /// * `angle` - The rotation angle in radians
    fn revolve(
        &self,
        profile: &Wire2D,
        plane: &SketchPlane,
        axis: &Axis3D,
        angle: f64,
    ) -> CadResult<Solid>;

    /// Perform a boolean operation on two solids
    ///
    /// # Arguments
    /// * `a` - The first solid
    /// * `b` - The second solid
    /// * `op` - The boolean operation type
    fn boolean(&self, a: &Solid, b: &Solid, op: BooleanType) -> CadResult<Solid>;

    /// Translated copy of a solid
    fn translate(&self, solid: &Solid, offset: DVec3) -> CadResult<Solid>;

    /// Rotated copy of a solid
    fn rotate(&self, solid: &Solid, axis: &Axis3D, angle: f64) -> CadResult<Solid>;

    /// Tessellate a solid into triangles
    ///
    /// # Arguments
    /// * `solid` - The solid to tessellate
    /// * `tolerance` - The tessellation tolerance (lower = more triangles)
    fn tessellate(&self, solid: &Solid, tolerance: f64) -> CadResult<TessellatedMesh>;

    /// Create a box primitive
    fn create_box(&self, center: DVec3, size: DVec3) -> CadResult<Solid>;

    /// Create a cylinder primitive centered on `center` along `axis`
    ///
    /// `segments` is the facet count used when the backend approximates the
    /// round surface.
    fn create_cylinder(
        &self,
        center: DVec3,
        radius: f64,
        height: f64,
        axis: DVec3,
        segments: u32,
    ) -> CadResult<Solid>;

    // ========== Query Methods ==========

    /// Axis-aligned bounds of a solid
    fn bounding_box(&self, solid: &Solid) -> CadResult<BoundingBox>;

    /// Point membership classification (boundary points count as inside)
    fn contains_point(&self, solid: &Solid, point: DVec3) -> CadResult<bool>;

    /// Drop the kernel's storage for a solid that is no longer needed
    fn release(&self, solid: Solid);

    // ========== Consuming Helpers ==========

    /// Union two solids, consuming both handles
    fn fuse(&self, a: Solid, b: Solid) -> CadResult<Solid> {
        let result = self.boolean(&a, &b, BooleanType::Union);
        self.release(a);
        self.release(b);
        result
    }

    /// Subtract `tool` from `target`, consuming both handles
    fn cut(&self, target: Solid, tool: Solid) -> CadResult<Solid> {
        let result = self.boolean(&target, &tool, BooleanType::Subtract);
        self.release(target);
        self.release(tool);
        result
    }

    /// Move a solid, consuming the original handle
    fn moved(&self, solid: Solid, offset: DVec3) -> CadResult<Solid> {
        let result = self.translate(&solid, offset);
        self.release(solid);
        result
    }

    /// Rotate a solid, consuming the original handle
    fn turned(&self, solid: Solid, axis: &Axis3D, angle: f64) -> CadResult<Solid> {
        let result = self.rotate(&solid, axis, angle);
        self.release(solid);
        result
    }
}

/// A null kernel that always returns errors (used when no kernel is available)
#[derive(Debug, Default)]
pub struct NullKernel;

impl NullKernel {
    fn unavailable<T>() -> CadResult<T> {
        Err(CadError::KernelNotAvailable(
            "No CAD kernel available".into(),
        ))
    }
}

impl CadKernel for NullKernel {
    fn name(&self) -> &str {
        "null"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn extrude(&self, _profile: &Wire2D, _plane: &SketchPlane, _distance: f64) -> CadResult<Solid> {
        Self::unavailable()
    }

    fn revolve(
        &self,
        _profile: &Wire2D,
        _plane: &SketchPlane,
        _axis: &Axis3D,
        _angle: f64,
    ) -> CadResult<Solid> {
        Self::unavailable()
    }

    fn boolean(&self, _a: &Solid, _b: &Solid, _op: BooleanType) -> CadResult<Solid> {
        Self::unavailable()
    }

    fn translate(&self, _solid: &Solid, _offset: DVec3) -> CadResult<Solid> {
        Self::unavailable()
    }

    fn rotate(&self, _solid: &Solid, _axis: &Axis3D, _angle: f64) -> CadResult<Solid> {
        Self::unavailable()
    }

    fn tessellate(&self, _solid: &Solid, _tolerance: f64) -> CadResult<TessellatedMesh> {
        Self::unavailable()
    }

    fn create_box(&self, _center: DVec3, _size: DVec3) -> CadResult<Solid> {
        Self::unavailable()
    }

    fn create_cylinder(
        &self,
        _center: DVec3,
        _radius: f64,
        _height: f64,
        _axis: DVec3,
        _segments: u32,
    ) -> CadResult<Solid> {
        Self::unavailable()
    }

    fn bounding_box(&self, _solid: &Solid) -> CadResult<BoundingBox> {
        Self::unavailable()
    }

    fn contains_point(&self, _solid: &Solid, _point: DVec3) -> CadResult<bool> {
        Self::unavailable()
    }

    fn release(&self, _solid: Solid) {}
}

/// Get the default CAD kernel based on available features
pub fn default_kernel() -> Box<dyn CadKernel> {
    #[cfg(feature = "truck")]
    {
        Box::new(super::TruckKernel::new())
    }

    #[cfg(not(feature = "truck"))]
    {
        Box::new(super::CsgKernel::new())
    }
}
