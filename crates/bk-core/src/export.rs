//! STL export of a finished piece

use std::io::Write;
use std::path::PathBuf;

use bk_cad::{CadError, CadKernel, Solid, TessellatedMesh};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where and how finely to export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Output STL file
    pub output_path: PathBuf,
    /// Tessellation tolerance in millimeters (lower = more triangles)
    pub tolerance: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("brick.stl"),
            tolerance: 0.05,
        }
    }
}

/// Export-related errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Kernel error: {0}")]
    Kernel(#[from] CadError),
    #[error("Tessellation produced no triangles")]
    EmptyMesh,
    #[error("IO error: {0}")]
    Io(String),
    #[error("STL write failed: {0}")]
    Write(String),
}

/// Flat-shaded STL triangles; normals come from the winding order
pub fn mesh_to_triangles(mesh: &TessellatedMesh) -> Vec<stl_io::Triangle> {
    mesh.indices
        .chunks_exact(3)
        .map(|tri| {
            let [v0, v1, v2] = [0, 1, 2].map(|k| mesh.vertices[tri[k] as usize]);
            let normal = (Vec3::from(v1) - Vec3::from(v0))
                .cross(Vec3::from(v2) - Vec3::from(v0))
                .try_normalize()
                .unwrap_or(Vec3::Z);
            stl_io::Triangle {
                normal: stl_io::Normal::new(normal.to_array()),
                vertices: [
                    stl_io::Vertex::new(v0),
                    stl_io::Vertex::new(v1),
                    stl_io::Vertex::new(v2),
                ],
            }
        })
        .collect()
}

/// Write a mesh as binary STL
pub fn write_stl<W: Write>(mesh: &TessellatedMesh, writer: &mut W) -> Result<usize, ExportError> {
    let triangles = mesh_to_triangles(mesh);
    if triangles.is_empty() {
        return Err(ExportError::EmptyMesh);
    }
    stl_io::write_stl(writer, triangles.iter()).map_err(|e| ExportError::Write(e.to_string()))?;
    Ok(triangles.len())
}

/// Tessellate a solid and write it to `options.output_path`.
///
/// Returns the number of triangles written.
pub fn export_stl(
    kernel: &dyn CadKernel,
    solid: &Solid,
    options: &ExportOptions,
) -> Result<usize, ExportError> {
    let mesh = kernel.tessellate(solid, options.tolerance)?;
    let mut file =
        std::fs::File::create(&options.output_path).map_err(|e| ExportError::Io(e.to_string()))?;
    let count = write_stl(&mesh, &mut file)?;
    tracing::info!(
        path = %options.output_path.display(),
        triangles = count,
        "STL written"
    );
    Ok(count)
}
