//! Isotropic remeshing of triangulated surfaces
//!
//! The remeshing loop iterates four local operations until the edge lengths are
//! close to a prescribed target `l`:
//!  - split of the edges longer than `4/3 * l`
//!  - collapse of the edges shorter than `4/5 * l`
//!  - edge flips to bring the vertex valences closer to 6
//!  - tangential smoothing of the vertices, followed by a projection back onto
//!    the initial surface
//!
//! The mesh is stored as a half-edge data structure ([`mesh::HalfEdgeMesh`])
//! with stable element ids: deleted vertices and half-edges are tombstoned,
//! and their ids are never reused.
use core::fmt;
use nalgebra::SVector;

pub mod geometry;
pub mod mesh;
pub mod remesher;

/// Result
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Error
#[derive(Debug)]
pub struct Error(String);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Create an error from a message
    #[must_use]
    pub fn from(msg: &str) -> Box<Self> {
        Box::new(Self(msg.into()))
    }
}

/// Vertex in 3 dimensions
pub type Vert3d = SVector<f64, 3>;

#[macro_export]
macro_rules! assert_delta {
    ($x:expr, $y:expr, $d:expr) => {
        let x = $x;
        let y = $y;
        let d = $d;
        assert!(
            f64::abs(x - y) < d,
            "{} = {x} != {} = {y} ({d})",
            stringify!($x),
            stringify!($y)
        );
    };
}
