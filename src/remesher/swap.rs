use super::Remesher;
use crate::{
    geometry::Geometry,
    mesh::NO_TWIN,
    remesher::{
        sequential::has_foldover,
        stats::{StepStats, SwapStats},
    },
    Result, Vert3d,
};
use log::{debug, trace};
use rustc_hash::FxHashSet;

#[derive(Clone, Debug)]
pub struct SwapParams {
    /// Revert the flips that rotate a face normal by more than this angle
    /// (in degrees, 0 to disable the check)
    pub max_angle: f64,
    /// Revert the flips that degrade the compactness of the faces around the
    /// edge
    pub avoid_slivers: bool,
}

impl Default for SwapParams {
    fn default() -> Self {
        Self {
            max_angle: 0.0,
            avoid_slivers: false,
        }
    }
}

fn are_collinear(a: &Vert3d, b: &Vert3d, c: &Vert3d) -> bool {
    let u = b - a;
    let v = c - a;
    u.cross(&v).norm() < 1e-10 * u.norm() * v.norm()
}

impl<G: Geometry> Remesher<'_, G> {
    /// Flip the interior edges for which the flip brings the valences of the 4
    /// surrounding vertices closer to 6. A flip is kept only if it strictly
    /// decreases the valence deviation, and (with `params.avoid_slivers`) if
    /// it does not degrade the compactness of the surrounding faces.
    pub fn equalize_valences(&mut self, params: &SwapParams) -> Result<usize> {
        debug!("Equalize the vertex valences with edge flips");
        let n_half_edges = self.mesh.n_half_edges();
        let mut visited = FxHashSet::default();
        let (mut n_flips, mut n_reverted) = (0, 0);
        for h in 0..n_half_edges {
            if self.mesh.half_edge_is_deleted(h) {
                continue;
            }
            let t = self.mesh.twin(h);
            if t == NO_TWIN {
                continue;
            }
            if !visited.insert((h.min(t), h.max(t))) {
                continue;
            }
            // flipping an edge with a valence 3 end would leave an
            // over-connected pair of faces
            if self.mesh.valence(h) == 3 || self.mesh.valence(t) == 3 {
                continue;
            }
            if self.flip_creates_duplicate_edge(h) {
                trace!("Do not flip half-edge {h}: the opposite vertices are already connected");
                continue;
            }
            if self.flip_creates_collinear_face(h) {
                trace!("Do not flip half-edge {h}: degenerate face");
                continue;
            }
            let normals_pre = if params.max_angle > 0.0 {
                vec![self.mesh.tri_normal(h), self.mesh.tri_normal(t)]
            } else {
                Vec::new()
            };
            let compactness_pre = if params.avoid_slivers {
                self.compactness_deviation(h)
            } else {
                0.0
            };
            let valence_pre = self.valence_deviation(h);

            let op = self.mesh.flip(h)?;
            if params.max_angle > 0.0 {
                let normals_pos = [h, t].into_iter().map(|e| self.mesh.tri_normal(e));
                if has_foldover(&normals_pre, normals_pos, params.max_angle) {
                    trace!("Revert the flip of half-edge {h}: foldover");
                    self.mesh.revert_flip(op);
                    n_reverted += 1;
                    continue;
                }
            }
            if self.valence_deviation(h) >= valence_pre {
                trace!("Revert the flip of half-edge {h}: valences not improved");
                self.mesh.revert_flip(op);
                n_reverted += 1;
                continue;
            }
            if params.avoid_slivers && self.compactness_deviation(h) > compactness_pre {
                trace!("Revert the flip of half-edge {h}: compactness degraded");
                self.mesh.revert_flip(op);
                n_reverted += 1;
                continue;
            }
            n_flips += 1;
        }

        debug!("{n_flips} edges flipped, {n_reverted} flips reverted");
        self.stats
            .push(StepStats::Swap(SwapStats::new(n_flips, n_reverted, self.mesh)));
        Ok(n_flips)
    }

    // The new diagonal must not be an existing edge
    fn flip_creates_duplicate_edge(&self, h: usize) -> bool {
        let [_, h2, _, h5] = self.mesh.adjacent_half_edges(h);
        let v3 = self.mesh.start_vert(h5);
        self.mesh.vertex_ring(h2).contains(&v3)
    }

    // The flip replaces the diagonal of the diamond around `h` by the other
    // one: reject it when one of the two new faces would be degenerate
    fn flip_creates_collinear_face(&self, h: usize) -> bool {
        let [_, h2, _, h5] = self.mesh.adjacent_half_edges(h);
        let v0 = self.mesh.vert(self.mesh.end_vert(h2));
        let v1 = self.mesh.vert(self.mesh.end_vert(h5));
        let v2 = self.mesh.vert(self.mesh.start_vert(h2));
        let v3 = self.mesh.vert(self.mesh.start_vert(h5));
        are_collinear(&v3, &v1, &v2) || are_collinear(&v0, &v3, &v2)
    }

    // Sum of |valence - 6| over the 4 vertices of the diamond around `h`
    pub(super) fn valence_deviation(&self, h: usize) -> usize {
        self.mesh
            .adjacent_half_edges(h)
            .iter()
            .map(|&e| self.mesh.valence(e).abs_diff(6))
            .sum()
    }

    // Compactness defect of the faces around the 4 vertices of the diamond
    fn compactness_deviation(&self, h: usize) -> f64 {
        self.mesh
            .adjacent_half_edges(h)
            .iter()
            .map(|&e| 1.0 - self.mesh.mean_compactness(e))
            .sum()
    }
}
