use super::Remesher;
use crate::{
    geometry::Geometry,
    mesh::NO_TWIN,
    remesher::{
        sequential::has_foldover,
        stats::{CollapseStats, StepStats},
    },
    Result,
};
use log::{debug, trace};
use rustc_hash::FxHashSet;

#[derive(Clone, Debug)]
pub struct CollapseParams {
    /// Length below which collapse is applied
    pub l: f64,
    /// The collapse is skipped if it would create an edge longer than `max_l`
    pub max_l: f64,
    /// Never remove the vertices of the input mesh
    pub lock_explicit: bool,
    /// Revert the collapses that rotate a face normal by more than this angle
    /// (in degrees, 0 to disable the check)
    pub max_angle: f64,
}

impl Default for CollapseParams {
    fn default() -> Self {
        Self {
            l: 0.8,
            max_l: 4.0 / 3.0,
            lock_explicit: false,
            max_angle: 0.0,
        }
    }
}

impl<G: Geometry> Remesher<'_, G> {
    /// Collapse the interior edges shorter than `params.l` onto their start
    /// vertex. A collapse is skipped if
    /// - it would remove a locked or a boundary vertex
    /// - it would create an edge longer than `params.max_l`
    /// - the link condition does not hold (the collapse would pinch the
    ///   surface)
    ///
    /// and reverted if it rotates the normal of one of the surrounding faces
    /// by more than `params.max_angle` degrees.
    pub fn collapse_short_edges(&mut self, params: &CollapseParams) -> Result<usize> {
        debug!("Collapse the edges shorter than {:.2e}", params.l);
        let n_half_edges = self.mesh.n_half_edges();
        let mut visited = FxHashSet::default();
        let (mut n_collapses, mut n_reverted) = (0, 0);
        for h in 0..n_half_edges {
            if self.mesh.half_edge_is_deleted(h) {
                continue;
            }
            let t = self.mesh.twin(h);
            if t == NO_TWIN {
                continue;
            }
            // both half-edges of an edge map to the same key
            if !visited.insert((h.min(t), h.max(t))) {
                continue;
            }
            if params.lock_explicit && self.mesh.end_vert(h) < self.mesh.n_explicit_verts() {
                continue;
            }
            // removing a boundary vertex would reshape the boundary
            if self.mesh.vert_is_on_boundary(t) {
                continue;
            }
            if self.mesh.edge_length(h) >= params.l {
                continue;
            }
            if !self.collapse_keeps_short_edges(h, params.max_l) {
                trace!("Do not collapse half-edge {h}: edge longer than {:.2e}", params.max_l);
                continue;
            }
            if !self.collapse_keeps_manifold(h) {
                trace!("Do not collapse half-edge {h}: link condition violated");
                continue;
            }
            let normals_pre = if params.max_angle > 0.0 {
                self.mesh
                    .collapse_ring(h)
                    .iter()
                    .map(|&r| self.mesh.tri_normal(r))
                    .collect::<Vec<_>>()
            } else {
                Vec::new()
            };
            trace!("Collapse half-edge {h}");
            let op = self.mesh.collapse(h)?;
            if params.max_angle > 0.0 {
                let normals_pos = op.ring().iter().map(|&r| self.mesh.tri_normal(r));
                if has_foldover(&normals_pre, normals_pos, params.max_angle) {
                    trace!("Revert the collapse of half-edge {h}: foldover");
                    self.mesh.revert_collapse(op);
                    n_reverted += 1;
                    continue;
                }
            }
            n_collapses += 1;
        }

        debug!("{n_collapses} edges collapsed, {n_reverted} collapses reverted");
        self.stats.push(StepStats::Collapse(CollapseStats::new(
            n_collapses,
            n_reverted,
            self.mesh,
        )));
        Ok(n_collapses)
    }

    // All the neighbors of the removed vertex must stay within `max_l` of the
    // kept vertex
    fn collapse_keeps_short_edges(&self, h: usize, max_l: f64) -> bool {
        let v0 = self.mesh.vert(self.mesh.start_vert(h));
        self.mesh
            .vertex_ring(self.mesh.twin(h))
            .iter()
            .all(|&v| (self.mesh.vert(v) - v0).norm() <= max_l)
    }

    // Link condition: the vertex rings of the two edge ends must intersect
    // exactly at the two opposite vertices
    fn collapse_keeps_manifold(&self, h: usize) -> bool {
        let ring0 = self
            .mesh
            .vertex_ring(h)
            .into_iter()
            .collect::<FxHashSet<_>>();
        self.mesh
            .vertex_ring(self.mesh.twin(h))
            .iter()
            .filter(|v| ring0.contains(v))
            .count()
            == 2
    }
}
