use super::collapse::CollapseParams;
use super::smooth::SmoothParams;
use super::split::SplitParams;
use super::stats::{InitStats, StepStats};
use super::swap::SwapParams;
use crate::{geometry::Geometry, mesh::HalfEdgeMesh, Result, Vert3d};
use log::debug;
use std::fs::File;

// Compare the face normals before and after an operation, pairwise
pub(super) fn has_foldover<I: Iterator<Item = Vert3d>>(
    normals_pre: &[Vert3d],
    normals_pos: I,
    max_angle: f64,
) -> bool {
    normals_pre.iter().zip(normals_pos).any(|(n0, n1)| {
        let cos_a = n0.dot(&n1).clamp(-1.0, 1.0);
        f64::acos(cos_a).to_degrees() > max_angle
    })
}

/// Remesher parameters
#[derive(Clone, Debug)]
pub struct RemesherParams {
    /// Target edge length
    pub l: f64,
    /// Number of split / collapse / flip / smooth iterations
    pub n_iter: u32,
    /// Lock the vertices of the input mesh: they are neither moved nor deleted
    pub lock_explicit: bool,
    /// Revert the collapses and flips that rotate a face normal by more than
    /// this angle (in degrees, 0 to disable the check)
    pub max_angle: f64,
    /// Revert the flips that degrade the compactness of the faces around the
    /// edge
    pub avoid_slivers: bool,
    /// Check the mesh consistency after each step
    pub debug: bool,
}

impl Default for RemesherParams {
    fn default() -> Self {
        Self {
            l: 1.0,
            n_iter: 20,
            lock_explicit: false,
            max_angle: 0.0,
            avoid_slivers: false,
            debug: false,
        }
    }
}

/// Isotropic remesher for triangulated surfaces.
///
/// Every iteration splits the edges longer than `4/3 l`, collapses the edges
/// shorter than `4/5 l`, flips edges to bring the vertex valences closer to 6,
/// and applies one tangential smoothing step followed by a projection onto the
/// geometry. The geometry is typically a [`crate::geometry::MeshedGeometry`]
/// built from the mesh before it is remeshed.
pub struct Remesher<'a, G: Geometry> {
    pub(super) mesh: &'a mut HalfEdgeMesh,
    pub(super) geom: &'a G,
    /// Statistics
    pub(super) stats: Vec<StepStats>,
}

impl<'a, G: Geometry> Remesher<'a, G> {
    pub fn new(mesh: &'a mut HalfEdgeMesh, geom: &'a G) -> Self {
        debug!(
            "Initialize the remesher: {} vertices / {} faces",
            mesh.n_live_verts(),
            mesh.n_live_faces()
        );
        let stats = vec![StepStats::Init(InitStats::new(mesh))];
        Self { mesh, geom, stats }
    }

    /// Perform `params.n_iter` remeshing iterations
    pub fn remesh(&mut self, params: &RemesherParams) -> Result<()> {
        let l_low = 0.8 * params.l;
        let l_high = 4.0 / 3.0 * params.l;
        debug!(
            "Remesh with target edge length {:.2e}: bracket the lengths in [{l_low:.2e}, {l_high:.2e}]",
            params.l
        );
        let split_params = SplitParams { l: l_high };
        let collapse_params = CollapseParams {
            l: l_low,
            max_l: l_high,
            lock_explicit: params.lock_explicit,
            max_angle: params.max_angle,
        };
        let swap_params = SwapParams {
            max_angle: params.max_angle,
            avoid_slivers: params.avoid_slivers,
        };
        let smooth_params = SmoothParams {
            lock_explicit: params.lock_explicit,
        };

        for iter in 0..params.n_iter {
            debug!("Iteration {} / {}", iter + 1, params.n_iter);
            self.split_long_edges(&split_params)?;
            if params.debug {
                self.check()?;
            }
            self.collapse_short_edges(&collapse_params)?;
            if params.debug {
                self.check()?;
            }
            self.equalize_valences(&swap_params)?;
            if params.debug {
                self.check()?;
            }
            self.smooth_vertices(&smooth_params);
            if params.debug {
                self.check()?;
            }
        }
        Ok(())
    }

    /// Check the consistency of the mesh
    pub fn check(&self) -> Result<()> {
        self.mesh.check()
    }

    /// Statistics recorded after each step
    #[must_use]
    pub fn stats(&self) -> &[StepStats] {
        &self.stats
    }

    /// Statistics in json format
    pub fn stats_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.stats).map_err(Into::into)
    }

    /// Save the statistics to a json file
    pub fn save_stats(&self, fname: &str) -> Result<()> {
        let file = File::create(fname)?;
        serde_json::to_writer_pretty(file, &self.stats)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Remesher, RemesherParams};
    use crate::{
        geometry::MeshedGeometry,
        mesh::{test_meshes::icosphere, test_meshes::strip, NO_TWIN},
        remesher::stats::Stats,
        Result,
    };

    fn init_log() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_remesh_coarsen_sphere() -> Result<()> {
        init_log();
        let mut mesh = icosphere(2);
        let l0 = Stats::new(mesh.lengths_iter()).mean;
        let geom = MeshedGeometry::new(&mesh)?;
        let mut remesher = Remesher::new(&mut mesh, &geom);
        let params = RemesherParams {
            l: 1.5 * l0,
            n_iter: 5,
            debug: true,
            ..RemesherParams::default()
        };
        remesher.remesh(&params)?;
        drop(remesher);

        mesh.check()?;
        let l_mean = Stats::new(mesh.lengths_iter()).mean;
        assert!(l_mean > 0.8 * params.l, "mean length {l_mean}");
        assert!(l_mean < 4.0 / 3.0 * params.l, "mean length {l_mean}");
        // the surface stays closed and close to the unit sphere
        for h in 0..mesh.n_half_edges() {
            if !mesh.half_edge_is_deleted(h) {
                assert_ne!(mesh.twin(h), NO_TWIN);
            }
        }
        for (i, pt) in mesh.verts().enumerate() {
            if !mesh.vert_is_deleted(i) {
                assert!(pt.norm() > 0.9 && pt.norm() < 1.0 + 1e-9);
            }
        }
        Ok(())
    }

    #[test]
    fn test_remesh_refine_sphere() -> Result<()> {
        init_log();
        let mut mesh = icosphere(1);
        let n_verts = mesh.n_live_verts();
        let l0 = Stats::new(mesh.lengths_iter()).mean;
        let geom = MeshedGeometry::new(&mesh)?;
        let mut remesher = Remesher::new(&mut mesh, &geom);
        let params = RemesherParams {
            l: 0.5 * l0,
            n_iter: 5,
            debug: true,
            ..RemesherParams::default()
        };
        remesher.remesh(&params)?;
        drop(remesher);

        mesh.check()?;
        assert!(mesh.n_live_verts() > n_verts);
        let l_mean = Stats::new(mesh.lengths_iter()).mean;
        assert!(l_mean > 0.8 * params.l, "mean length {l_mean}");
        assert!(l_mean < 4.0 / 3.0 * params.l, "mean length {l_mean}");
        Ok(())
    }

    #[test]
    fn test_remesh_locked_verts() -> Result<()> {
        init_log();
        let mut mesh = strip(6);
        let n_explicit = mesh.n_explicit_verts();
        let before = mesh.verts().collect::<Vec<_>>();
        let geom = MeshedGeometry::new(&mesh)?;
        let mut remesher = Remesher::new(&mut mesh, &geom);
        let params = RemesherParams {
            l: 0.6,
            n_iter: 3,
            lock_explicit: true,
            debug: true,
            ..RemesherParams::default()
        };
        remesher.remesh(&params)?;
        drop(remesher);

        mesh.check()?;
        // the input vertices are still there, at exactly their original position
        for (i, &pt) in before.iter().enumerate().take(n_explicit) {
            assert!(!mesh.vert_is_deleted(i));
            assert_eq!(mesh.vert(i), pt);
        }
        for (i, pt) in mesh.verts().enumerate() {
            if !mesh.vert_is_deleted(i) {
                assert!(pt.z.abs() < 1e-12);
            }
        }
        Ok(())
    }

    #[test]
    fn test_stats() -> Result<()> {
        init_log();
        let mut mesh = icosphere(1);
        let geom = MeshedGeometry::new(&mesh)?;
        let mut remesher = Remesher::new(&mut mesh, &geom);
        let params = RemesherParams {
            l: 0.5,
            n_iter: 2,
            ..RemesherParams::default()
        };
        remesher.remesh(&params)?;

        // 1 init record + 4 records per iteration
        assert_eq!(remesher.stats().len(), 9);
        let json = remesher.stats_json()?;
        let parsed: serde_json::Value = serde_json::from_str(&json)?;
        assert_eq!(parsed.as_array().map(Vec::len), Some(9));

        let dir = tempfile::TempDir::new()?;
        let fname = dir.path().join("stats.json");
        remesher.save_stats(fname.to_str().ok_or("invalid file name")?)?;
        assert!(fname.exists());
        Ok(())
    }
}
