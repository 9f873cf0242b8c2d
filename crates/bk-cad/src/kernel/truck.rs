//! Truck CAD Kernel Backend
//!
//! Pure Rust B-Rep kernel using the Truck library.
//!
//! Note: point classification is not available in this backend. Booleans go
//! through truck-shapeops and can fail on tangent or coincident faces.

use std::collections::HashMap;

use glam::DVec3;
use parking_lot::Mutex;
use uuid::Uuid;

use truck_meshalgo::prelude::*;
use truck_modeling::{Point3, Rad, Solid as TruckSolid, Vector3, Vertex, Wire, builder};

use super::{
    Axis3D, BooleanType, BoundingBox, CadError, CadKernel, CadResult, Solid, SketchPlane,
    TessellatedMesh, Wire2D,
};

/// Tolerance handed to truck-shapeops
const BOOLEAN_TOLERANCE: f64 = 0.05;

/// Tessellation tolerance used for bounding box queries
const BOUNDS_TOLERANCE: f64 = 0.1;

fn point(v: DVec3) -> Point3 {
    Point3::new(v.x, v.y, v.z)
}

fn vector(v: DVec3) -> Vector3 {
    Vector3::new(v.x, v.y, v.z)
}

/// Truck-based CAD kernel
pub struct TruckKernel {
    /// Storage for solid data (keyed by UUID)
    solids: Mutex<HashMap<Uuid, TruckSolid>>,
}

impl TruckKernel {
    /// Create a new Truck kernel
    pub fn new() -> Self {
        Self {
            solids: Mutex::new(HashMap::new()),
        }
    }

    /// Store a solid and return a Solid reference
    fn store_solid(&self, solid: TruckSolid) -> Solid {
        let id = Uuid::new_v4();
        self.solids.lock().insert(id, solid);
        Solid::new(id)
    }

    /// Get a copy of a stored solid
    fn get_solid(&self, solid: &Solid) -> CadResult<TruckSolid> {
        self.solids
            .lock()
            .get(&solid.id())
            .cloned()
            .ok_or(CadError::SolidNotFound(solid.id()))
    }

    /// Create a closed wire from a 2D profile placed on a sketch plane
    fn create_wire(&self, profile: &Wire2D, plane: &SketchPlane) -> Wire {
        let vertices: Vec<Vertex> = profile
            .points
            .iter()
            .map(|p| builder::vertex(point(plane.to_world(*p))))
            .collect();

        let n = vertices.len();
        let edges: Vec<_> = (0..n)
            .map(|i| builder::line(&vertices[i], &vertices[(i + 1) % n]))
            .collect();

        edges.into()
    }

    fn planar_face(&self, profile: &Wire2D, plane: &SketchPlane) -> CadResult<truck_modeling::Face> {
        if !profile.is_valid_profile() {
            return Err(CadError::InvalidProfile(
                "Profile must be closed with at least 3 points".into(),
            ));
        }
        let wire = self.create_wire(profile, plane);
        builder::try_attach_plane(&[wire])
            .map_err(|e| CadError::OperationFailed(format!("Failed to create face: {:?}", e)))
    }
}

impl Default for TruckKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl CadKernel for TruckKernel {
    fn name(&self) -> &str {
        "truck"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn extrude(&self, profile: &Wire2D, plane: &SketchPlane, distance: f64) -> CadResult<Solid> {
        if !(distance.is_finite() && distance > 0.0) {
            return Err(CadError::InvalidDimension(format!(
                "extrusion distance must be positive, got {distance}"
            )));
        }
        let face = self.planar_face(profile, plane)?;
        let solid = builder::tsweep(&face, vector(plane.normal() * distance));
        Ok(self.store_solid(solid))
    }

    fn revolve(
        &self,
        profile: &Wire2D,
        plane: &SketchPlane,
        axis: &Axis3D,
        angle: f64,
    ) -> CadResult<Solid> {
        let face = self.planar_face(profile, plane)?;
        let solid = builder::rsweep(&face, point(axis.origin), vector(axis.direction), Rad(angle));
        Ok(self.store_solid(solid))
    }

    fn boolean(&self, a: &Solid, b: &Solid, op: BooleanType) -> CadResult<Solid> {
        let a = self.get_solid(a)?;
        let mut b = self.get_solid(b)?;

        let result = match op {
            BooleanType::Union => truck_shapeops::or(&a, &b, BOOLEAN_TOLERANCE),
            BooleanType::Intersect => truck_shapeops::and(&a, &b, BOOLEAN_TOLERANCE),
            BooleanType::Subtract => {
                b.not();
                truck_shapeops::and(&a, &b, BOOLEAN_TOLERANCE)
            }
        };

        result
            .map(|solid| self.store_solid(solid))
            .ok_or_else(|| CadError::BooleanFailed(format!("truck-shapeops could not {op:?}")))
    }

    fn translate(&self, solid: &Solid, offset: DVec3) -> CadResult<Solid> {
        let solid = self.get_solid(solid)?;
        Ok(self.store_solid(builder::translated(&solid, vector(offset))))
    }

    fn rotate(&self, solid: &Solid, axis: &Axis3D, angle: f64) -> CadResult<Solid> {
        let solid = self.get_solid(solid)?;
        Ok(self.store_solid(builder::rotated(
            &solid,
            point(axis.origin),
            vector(axis.direction),
            Rad(angle),
        )))
    }

    fn tessellate(&self, solid: &Solid, tolerance: f64) -> CadResult<TessellatedMesh> {
        let solid = self.get_solid(solid)?;
        let polygon = solid.triangulation(tolerance).to_polygon();

        let positions = polygon.positions();
        let normals = polygon.normals();
        let mut mesh = TessellatedMesh::new();
        for triangle in polygon.faces().triangle_iter() {
            for corner in triangle {
                let p = positions[corner.pos];
                let n = corner
                    .nor
                    .map(|i| normals[i])
                    .unwrap_or(Vector3::new(0.0, 0.0, 0.0));
                mesh.indices.push(mesh.vertices.len() as u32);
                mesh.vertices.push([p.x as f32, p.y as f32, p.z as f32]);
                mesh.normals.push([n.x as f32, n.y as f32, n.z as f32]);
            }
        }

        if mesh.is_empty() {
            return Err(CadError::TessellationFailed(
                "Triangulation produced no faces".into(),
            ));
        }
        Ok(mesh)
    }

    fn create_box(&self, center: DVec3, size: DVec3) -> CadResult<Solid> {
        if !size.cmpgt(DVec3::ZERO).all() {
            return Err(CadError::InvalidDimension(format!(
                "box size must be positive, got {size}"
            )));
        }
        let min = center - size * 0.5;

        let vertex = builder::vertex(point(min));
        let edge = builder::tsweep(&vertex, Vector3::new(size.x, 0.0, 0.0));
        let face = builder::tsweep(&edge, Vector3::new(0.0, size.y, 0.0));
        let solid = builder::tsweep(&face, Vector3::new(0.0, 0.0, size.z));

        Ok(self.store_solid(solid))
    }

    fn create_cylinder(
        &self,
        center: DVec3,
        radius: f64,
        height: f64,
        axis: DVec3,
        _segments: u32,
    ) -> CadResult<Solid> {
        if !(radius > 0.0 && height > 0.0) {
            return Err(CadError::InvalidDimension(format!(
                "cylinder radius and height must be positive, got {radius} and {height}"
            )));
        }
        let axis = axis.try_normalize().ok_or_else(|| {
            CadError::InvalidDimension("cylinder axis has zero length".into())
        })?;
        let base = center - axis * (height / 2.0);

        // Exact circle: sweep a rim vertex around the axis
        let rim = builder::vertex(point(base + axis.any_orthonormal_vector() * radius));
        let circle = builder::rsweep(&rim, point(base), vector(axis), Rad(std::f64::consts::TAU));
        let disk = builder::try_attach_plane(&[circle])
            .map_err(|e| CadError::OperationFailed(format!("Failed to create face: {:?}", e)))?;
        let solid = builder::tsweep(&disk, vector(axis * height));

        Ok(self.store_solid(solid))
    }

    fn bounding_box(&self, solid: &Solid) -> CadResult<BoundingBox> {
        let mesh = self.tessellate(solid, BOUNDS_TOLERANCE)?;
        BoundingBox::from_points(
            mesh.vertices
                .iter()
                .map(|v| DVec3::new(f64::from(v[0]), f64::from(v[1]), f64::from(v[2]))),
        )
        .ok_or_else(|| CadError::OperationFailed("Solid is empty".into()))
    }

    fn contains_point(&self, _solid: &Solid, _point: DVec3) -> CadResult<bool> {
        Err(CadError::OperationFailed(
            "Point classification is not supported in Truck kernel. Use the CSG kernel.".into(),
        ))
    }

    fn release(&self, solid: Solid) {
        self.solids.lock().remove(&solid.id());
    }
}
