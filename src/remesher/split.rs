use super::Remesher;
use crate::{
    geometry::Geometry,
    remesher::stats::{SplitStats, StepStats},
    Result,
};
use log::{debug, trace};

#[derive(Clone, Debug)]
pub struct SplitParams {
    /// Length above which split is applied
    pub l: f64,
}

impl Default for SplitParams {
    fn default() -> Self {
        Self { l: 4.0 / 3.0 }
    }
}

impl<G: Geometry> Remesher<'_, G> {
    /// Split the edges longer than `params.l` at their midpoint. The edges
    /// created during the pass are not considered for splitting before the
    /// next iteration.
    pub fn split_long_edges(&mut self, params: &SplitParams) -> Result<usize> {
        debug!("Split the edges longer than {:.2e}", params.l);
        let n_half_edges = self.mesh.n_half_edges();
        let mut n_splits = 0;
        for h in 0..n_half_edges {
            if self.mesh.half_edge_is_deleted(h) {
                continue;
            }
            if self.mesh.edge_length(h) > params.l {
                trace!("Split half-edge {h}");
                self.mesh.split(h)?;
                n_splits += 1;
            }
        }

        debug!("{n_splits} edges split");
        self.stats
            .push(StepStats::Split(SplitStats::new(n_splits, self.mesh)));
        Ok(n_splits)
    }
}
