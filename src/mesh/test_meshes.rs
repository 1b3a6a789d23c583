//! Simple meshes for tests
use crate::{mesh::HalfEdgeMesh, Vert3d};
use rustc_hash::FxHashMap;

fn icosahedron_verts_and_tris() -> (Vec<Vert3d>, Vec<[usize; 3]>) {
    let t = 0.5 * (1.0 + f64::sqrt(5.0));
    let verts = vec![
        Vert3d::new(-1.0, t, 0.0),
        Vert3d::new(1.0, t, 0.0),
        Vert3d::new(-1.0, -t, 0.0),
        Vert3d::new(1.0, -t, 0.0),
        Vert3d::new(0.0, -1.0, t),
        Vert3d::new(0.0, 1.0, t),
        Vert3d::new(0.0, -1.0, -t),
        Vert3d::new(0.0, 1.0, -t),
        Vert3d::new(t, 0.0, -1.0),
        Vert3d::new(t, 0.0, 1.0),
        Vert3d::new(-t, 0.0, -1.0),
        Vert3d::new(-t, 0.0, 1.0),
    ]
    .into_iter()
    .map(|v| v.normalize())
    .collect();
    let tris = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];
    (verts, tris)
}

/// Unit icosahedron (12 vertices, 20 faces)
#[must_use]
pub fn icosahedron() -> HalfEdgeMesh {
    let (verts, tris) = icosahedron_verts_and_tris();
    HalfEdgeMesh::new(verts, tris).unwrap()
}

fn midpoint(
    verts: &mut Vec<Vert3d>,
    cache: &mut FxHashMap<(usize, usize), usize>,
    i0: usize,
    i1: usize,
) -> usize {
    let key = (i0.min(i1), i0.max(i1));
    *cache.entry(key).or_insert_with(|| {
        let m = (0.5 * (verts[i0] + verts[i1])).normalize();
        verts.push(m);
        verts.len() - 1
    })
}

/// Sphere obtained by subdividing the icosahedron `n` times and projecting the
/// new vertices onto the unit sphere
#[must_use]
pub fn icosphere(n: u32) -> HalfEdgeMesh {
    let (mut verts, mut tris) = icosahedron_verts_and_tris();
    for _ in 0..n {
        let mut cache = FxHashMap::default();
        let mut new_tris = Vec::with_capacity(4 * tris.len());
        for [i0, i1, i2] in tris {
            let m01 = midpoint(&mut verts, &mut cache, i0, i1);
            let m12 = midpoint(&mut verts, &mut cache, i1, i2);
            let m20 = midpoint(&mut verts, &mut cache, i2, i0);
            new_tris.push([i0, m01, m20]);
            new_tris.push([i1, m12, m01]);
            new_tris.push([i2, m20, m12]);
            new_tris.push([m01, m12, m20]);
        }
        tris = new_tris;
    }
    HalfEdgeMesh::new(verts, tris).unwrap()
}

/// Planar strip of `n` unit squares, each cut in 2 triangles. Vertices `0..=n`
/// are on the bottom side, `n + 1 ..= 2 n + 1` on the top side.
#[must_use]
pub fn strip(n: usize) -> HalfEdgeMesh {
    let mut verts = Vec::with_capacity(2 * (n + 1));
    for j in 0..2 {
        for i in 0..=n {
            verts.push(Vert3d::new(i as f64, j as f64, 0.0));
        }
    }
    let mut tris = Vec::with_capacity(2 * n);
    for i in 0..n {
        let (b0, b1) = (i, i + 1);
        let (t0, t1) = (n + 1 + i, n + 2 + i);
        tris.push([b0, b1, t1]);
        tris.push([b0, t1, t0]);
    }
    HalfEdgeMesh::new(verts, tris).unwrap()
}

/// Triangular bipyramid: equator vertices 0, 1 and 2 on the unit circle,
/// apexes 3 and 4 at `(0, 0, +/- height)`. Every pair of equator vertices is
/// connected, so no equator edge can be collapsed without pinching the
/// surface.
#[must_use]
pub fn triangle_bipyramid(height: f64) -> HalfEdgeMesh {
    let mut verts = (0..3)
        .map(|i| {
            let a = f64::to_radians(120.0 * i as f64);
            Vert3d::new(f64::cos(a), f64::sin(a), 0.0)
        })
        .collect::<Vec<_>>();
    verts.push(Vert3d::new(0.0, 0.0, height));
    verts.push(Vert3d::new(0.0, 0.0, -height));
    let tris = vec![
        [0, 1, 3],
        [1, 2, 3],
        [2, 0, 3],
        [1, 0, 4],
        [2, 1, 4],
        [0, 2, 4],
    ];
    HalfEdgeMesh::new(verts, tris).unwrap()
}

/// Hexagonal fan around an apex at `(0, 0, height)`: the 6 ring vertices get
/// ids `0..6` and the apex is vertex 6. In every face the apex is at the last
/// slot, so half-edge 1 goes from ring vertex 1 to the apex.
#[must_use]
pub fn cone_fan(height: f64) -> HalfEdgeMesh {
    let mut verts = (0..6)
        .map(|i| {
            let a = f64::to_radians(60.0 * i as f64);
            Vert3d::new(f64::cos(a), f64::sin(a), 0.0)
        })
        .collect::<Vec<_>>();
    verts.push(Vert3d::new(0.0, 0.0, height));
    let tris = (0..6).map(|i| [i, (i + 1) % 6, 6]).collect();
    HalfEdgeMesh::new(verts, tris).unwrap()
}
