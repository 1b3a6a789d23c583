use super::Remesher;
use crate::{
    geometry::Geometry,
    remesher::stats::{SmoothStats, StepStats},
    Vert3d,
};
use log::debug;
use rustc_hash::FxHashSet;

#[derive(Clone, Debug, Default)]
pub struct SmoothParams {
    /// Do not move the vertices of the input mesh
    pub lock_explicit: bool,
}

impl<G: Geometry> Remesher<'_, G> {
    /// New vertex positions after one tangential smoothing step.
    ///
    /// Each movable vertex is relocated to the projection of the mean position
    /// of its neighbors onto its tangent plane:
    /// ```math
    /// \tilde v_i = q_i + n_i n_i^T (v_i - q_i)
    /// ```
    /// where `q_i` is the mean of the neighbor positions and `n_i` the vertex
    /// normal. All the positions are computed from the current mesh, which is
    /// not modified.
    #[must_use]
    pub fn vertex_relocation(&self, params: &SmoothParams) -> Vec<Vert3d> {
        let mut res = self.mesh.verts().collect::<Vec<_>>();
        let mut visited = FxHashSet::default();
        for h in 0..self.mesh.n_half_edges() {
            if self.mesh.half_edge_is_deleted(h) {
                continue;
            }
            let v = self.mesh.start_vert(h);
            if !visited.insert(v) {
                continue;
            }
            if params.lock_explicit && v < self.mesh.n_explicit_verts() {
                continue;
            }
            let n = self.mesh.vert_normal(h);
            let q = self.mesh.mean_ring_position(h);
            res[v] = q + n * (res[v] - q).dot(&n);
        }
        res
    }

    /// Apply one tangential smoothing step and project the moved vertices
    /// back onto the geometry. Locked vertices are neither moved nor
    /// projected, so their coordinates stay exactly equal to the input ones.
    pub fn smooth_vertices(&mut self, params: &SmoothParams) -> usize {
        debug!("Smooth the vertices");
        let new_verts = self.vertex_relocation(params);
        let mut n_moved = 0;
        for (v, mut pt) in new_verts.into_iter().enumerate() {
            if self.mesh.vert_is_deleted(v)
                || (params.lock_explicit && v < self.mesh.n_explicit_verts())
            {
                continue;
            }
            self.geom.project(&mut pt);
            self.mesh.set_vert(v, pt);
            n_moved += 1;
        }

        debug!("{n_moved} vertices moved");
        self.stats
            .push(StepStats::Smooth(SmoothStats::new(n_moved, self.mesh)));
        n_moved
    }
}

#[cfg(test)]
mod tests {
    use super::SmoothParams;
    use crate::{
        assert_delta,
        geometry::{MeshedGeometry, NoGeometry},
        mesh::test_meshes::{icosphere, strip},
        remesher::Remesher,
        Result, Vert3d,
    };

    #[test]
    fn test_relocation_is_tangential() -> Result<()> {
        let mut mesh = icosphere(1);
        let before = mesh.verts().collect::<Vec<_>>();
        let geom = NoGeometry();
        let remesher = Remesher::new(&mut mesh, &geom);
        let new_verts = remesher.vertex_relocation(&SmoothParams::default());
        drop(remesher);

        // the mesh itself is left unchanged
        assert_eq!(mesh.verts().collect::<Vec<_>>(), before);
        for h in 0..mesh.n_half_edges() {
            let v = mesh.start_vert(h);
            let n = mesh.vert_normal(h);
            // the displacement is orthogonal to the vertex normal
            assert_delta!((new_verts[v] - before[v]).dot(&n), 0.0, 1e-12);
        }
        Ok(())
    }

    #[test]
    fn test_relocation_locked() -> Result<()> {
        let mut mesh = strip(3);
        // split the first bottom edge so that one movable vertex exists
        let m = mesh.split(0)?;
        let before = mesh.verts().collect::<Vec<_>>();
        let geom = NoGeometry();
        let remesher = Remesher::new(&mut mesh, &geom);
        let params = SmoothParams {
            lock_explicit: true,
        };
        let new_verts = remesher.vertex_relocation(&params);
        drop(remesher);

        for (v, &pt) in before.iter().enumerate() {
            if v == m {
                // the midpoint moves to the mean of its 3 neighbors, which is
                // already in its tangent plane
                let q = (mesh.vert(0) + mesh.vert(1) + mesh.vert(5)) / 3.0;
                assert_delta!((new_verts[v] - q).norm(), 0.0, 1e-12);
            } else {
                assert_eq!(new_verts[v], pt);
            }
        }
        Ok(())
    }

    #[test]
    fn test_smooth_projects_on_geometry() -> Result<()> {
        let mut mesh = icosphere(1);
        let geom = MeshedGeometry::new(&mesh)?;
        let mut remesher = Remesher::new(&mut mesh, &geom);
        let n = remesher.smooth_vertices(&SmoothParams::default());
        drop(remesher);

        assert_eq!(n, 42);
        mesh.check()?;
        for (v, pt) in mesh.verts().enumerate() {
            if !mesh.vert_is_deleted(v) {
                // on the polyhedral surface, between its inradius and the unit
                // sphere
                assert!(pt.norm() < 1.0 + 1e-9);
                assert!(pt.norm() > 0.9);
            }
        }
        Ok(())
    }

    #[test]
    fn test_smooth_center_of_symmetric_ring() -> Result<()> {
        // the apex of a symmetric fan moves onto its axis
        let mut mesh = crate::mesh::test_meshes::cone_fan(0.5);
        let h = (0..mesh.n_half_edges())
            .find(|&h| mesh.start_vert(h) == 6)
            .unwrap();
        mesh.set_vert(6, Vert3d::new(0.1, 0.2, 0.5));
        let normal = mesh.vert_normal(h);
        let geom = NoGeometry();
        let remesher = Remesher::new(&mut mesh, &geom);
        let new_verts = remesher.vertex_relocation(&SmoothParams::default());
        drop(remesher);

        // the mean ring position is the origin, so the new position is the
        // projection of the apex displacement onto the normal
        let expected = normal * mesh.vert(6).dot(&normal);
        assert_delta!((new_verts[6] - expected).norm(), 0.0, 1e-12);
        Ok(())
    }
}
