//! Isotropic remeshing
mod collapse;
mod sequential;
mod smooth;
mod split;
mod stats;
mod swap;

pub use collapse::CollapseParams;
pub use sequential::{Remesher, RemesherParams};
pub use smooth::SmoothParams;
pub use split::SplitParams;
pub use stats::{
    CollapseStats, InitStats, RemesherStats, SmoothStats, SplitStats, Stats, StepStats, SwapStats,
};
pub use swap::SwapParams;
