//! Geometric models used to keep the remeshed surface on the initial one
use crate::{mesh::HalfEdgeMesh, Error, Result, Vert3d};
use log::debug;
use nalgebra::Point3;
use parry3d_f64::{query::PointQuery, shape::TriMesh};

/// Representation of the surface onto which the smoothed vertices are
/// projected
pub trait Geometry {
    /// Project a vertex onto the geometry, and return the distance between the
    /// vertex and its projection
    fn project(&self, pt: &mut Vert3d) -> f64;

    /// Compute the max projection distance over the mesh vertices, without
    /// moving them
    fn max_distance(&self, mesh: &HalfEdgeMesh) -> f64 {
        let mut d_max = 0.0;
        for (i, mut pt) in mesh.verts().enumerate() {
            if !mesh.vert_is_deleted(i) {
                d_max = f64::max(d_max, self.project(&mut pt));
            }
        }
        d_max
    }
}

/// No geometric model: projection is disabled
pub struct NoGeometry();

impl Geometry for NoGeometry {
    fn project(&self, _pt: &mut Vert3d) -> f64 {
        0.0
    }
}

/// Piecewise linear geometry: vertices are projected onto the closest point of
/// a frozen copy of a triangulated surface
pub struct MeshedGeometry {
    surf: TriMesh,
}

impl MeshedGeometry {
    /// Capture the current triangles of `mesh` as the reference surface. Later
    /// modifications of `mesh` do not affect the projection.
    pub fn new(mesh: &HalfEdgeMesh) -> Result<Self> {
        debug!(
            "Capture the reference surface: {} vertices / {} faces",
            mesh.n_live_verts(),
            mesh.n_live_faces()
        );
        let verts = mesh.verts().map(Point3::from).collect::<Vec<_>>();
        let tris = mesh
            .triangles()
            .map(|t| t.map(|v| v as u32))
            .collect::<Vec<_>>();
        let surf = TriMesh::new(verts, tris)
            .map_err(|e| Error::from(&format!("cannot build the reference surface: {e:?}")))?;
        Ok(Self { surf })
    }
}

impl Geometry for MeshedGeometry {
    fn project(&self, pt: &mut Vert3d) -> f64 {
        let proj = self.surf.project_local_point(&Point3::from(*pt), false);
        let dist = (proj.point.coords - *pt).norm();
        *pt = proj.point.coords;
        dist
    }
}
