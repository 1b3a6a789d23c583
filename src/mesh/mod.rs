//! Triangulated surface meshes
mod half_edge;
pub mod test_meshes;

pub use half_edge::{CollapseOp, FlipOp, HalfEdgeMesh, NO_TWIN};
