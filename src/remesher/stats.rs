//! Statistics recorded after each remeshing step
use crate::mesh::HalfEdgeMesh;
use serde::Serialize;
use std::fmt;

/// Minimum / maximum / mean of a sequence of values
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Stats {
    pub mini: f64,
    pub maxi: f64,
    pub mean: f64,
}

impl Stats {
    pub fn new<I: Iterator<Item = f64>>(values: I) -> Self {
        let mut mini = f64::INFINITY;
        let mut maxi = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut count = 0_usize;
        for v in values {
            mini = mini.min(v);
            maxi = maxi.max(v);
            sum += v;
            count += 1;
        }
        if count == 0 {
            Self {
                mini: 0.0,
                maxi: 0.0,
                mean: 0.0,
            }
        } else {
            Self {
                mini,
                maxi,
                mean: sum / count as f64,
            }
        }
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "min = {:.2e}, max = {:.2e}, mean = {:.2e}",
            self.mini, self.maxi, self.mean
        )
    }
}

/// Mesh statistics
#[derive(Clone, Debug, Serialize)]
pub struct RemesherStats {
    n_verts: usize,
    n_faces: usize,
    n_edges: usize,
    lengths: Stats,
    compactness: Stats,
}

impl RemesherStats {
    #[must_use]
    pub fn new(mesh: &HalfEdgeMesh) -> Self {
        Self {
            n_verts: mesh.n_live_verts(),
            n_faces: mesh.n_live_faces(),
            n_edges: mesh.lengths_iter().count(),
            lengths: Stats::new(mesh.lengths_iter()),
            compactness: Stats::new(
                (0..mesh.n_half_edges())
                    .step_by(3)
                    .filter(|&h| !mesh.half_edge_is_deleted(h))
                    .map(|h| mesh.compactness(h)),
            ),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct InitStats {
    mesh_stats: RemesherStats,
}

impl InitStats {
    #[must_use]
    pub fn new(mesh: &HalfEdgeMesh) -> Self {
        Self {
            mesh_stats: RemesherStats::new(mesh),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SplitStats {
    n_splits: usize,
    mesh_stats: RemesherStats,
}

impl SplitStats {
    #[must_use]
    pub fn new(n_splits: usize, mesh: &HalfEdgeMesh) -> Self {
        Self {
            n_splits,
            mesh_stats: RemesherStats::new(mesh),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct CollapseStats {
    n_collapses: usize,
    n_reverted: usize,
    mesh_stats: RemesherStats,
}

impl CollapseStats {
    #[must_use]
    pub fn new(n_collapses: usize, n_reverted: usize, mesh: &HalfEdgeMesh) -> Self {
        Self {
            n_collapses,
            n_reverted,
            mesh_stats: RemesherStats::new(mesh),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SwapStats {
    n_flips: usize,
    n_reverted: usize,
    mesh_stats: RemesherStats,
}

impl SwapStats {
    #[must_use]
    pub fn new(n_flips: usize, n_reverted: usize, mesh: &HalfEdgeMesh) -> Self {
        Self {
            n_flips,
            n_reverted,
            mesh_stats: RemesherStats::new(mesh),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SmoothStats {
    n_moved: usize,
    mesh_stats: RemesherStats,
}

impl SmoothStats {
    #[must_use]
    pub fn new(n_moved: usize, mesh: &HalfEdgeMesh) -> Self {
        Self {
            n_moved,
            mesh_stats: RemesherStats::new(mesh),
        }
    }
}

/// Statistics for the different remeshing steps
#[derive(Clone, Debug, Serialize)]
pub enum StepStats {
    Init(InitStats),
    Split(SplitStats),
    Collapse(CollapseStats),
    Swap(SwapStats),
    Smooth(SmoothStats),
}

#[cfg(test)]
mod tests {
    use super::{RemesherStats, Stats};
    use crate::{assert_delta, mesh::test_meshes::icosahedron};

    #[test]
    fn test_stats() {
        let s = Stats::new([1.0, 2.0, 3.0].into_iter());
        assert_delta!(s.mini, 1.0, 1e-12);
        assert_delta!(s.maxi, 3.0, 1e-12);
        assert_delta!(s.mean, 2.0, 1e-12);

        let s = Stats::new(std::iter::empty());
        assert_delta!(s.mini, 0.0, 1e-12);
        assert_delta!(s.maxi, 0.0, 1e-12);
        assert_delta!(s.mean, 0.0, 1e-12);
    }

    #[test]
    fn test_mesh_stats() {
        let mesh = icosahedron();
        let s = RemesherStats::new(&mesh);
        assert_eq!(s.n_verts, 12);
        assert_eq!(s.n_faces, 20);
        assert_eq!(s.n_edges, 30);
        // all the faces are equilateral
        assert_delta!(s.compactness.mini, 1.0, 1e-12);
        assert_delta!(s.compactness.maxi, 1.0, 1e-12);
        assert_delta!(s.lengths.mini, s.lengths.maxi, 1e-12);
    }
}
