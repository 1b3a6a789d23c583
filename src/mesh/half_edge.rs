use crate::{Error, Result, Vert3d};
use rustc_hash::{FxHashMap, FxHashSet};

/// Twin of a boundary half-edge
pub const NO_TWIN: usize = usize::MAX;

/// Triangulated surface stored as a half-edge data structure.
///
/// The connectivity is implicit: half-edge `h` belongs to face `h / 3`, goes
/// from the vertex at slot `h % 3` to the vertex at slot `(h + 1) % 3`, and its
/// successor and predecessor in the face are obtained by rotating the slot.
/// Only the twin half-edges are stored explicitly, with `NO_TWIN` for the
/// boundary.
///
/// Ids are stable: local operations (split, collapse, flip) never move or
/// renumber the surviving entities. Deleted half-edges and vertices are
/// recorded in tombstone sets and their ids are never reused, so that ids
/// handed out to a caller stay valid for the lifetime of the mesh.
pub struct HalfEdgeMesh {
    verts: Vec<Vert3d>,
    tris: Vec<[usize; 3]>,
    twin: Vec<usize>,
    n_explicit_verts: usize,
    unreferenced_half_edges: FxHashSet<usize>,
    unreferenced_verts: FxHashSet<usize>,
}

/// Undo information for an edge collapse
pub struct CollapseOp {
    half_edges: [usize; 6],
    removed_vert: usize,
    ring: Vec<usize>,
    twin_log: Vec<(usize, usize)>,
}

impl CollapseOp {
    /// Half-edges going out of the removed vertex, excluding the two deleted
    /// faces. After the collapse they go out of the kept vertex, one per face
    /// whose geometry was modified.
    #[must_use]
    pub fn ring(&self) -> &[usize] {
        &self.ring
    }
}

/// Undo information for an edge flip
pub struct FlipOp {
    tri_log: [(usize, [usize; 3]); 2],
    twin_log: Vec<(usize, usize)>,
}

impl HalfEdgeMesh {
    /// Create a mesh from vertices and triangles. The triangles must be
    /// consistently oriented and form a manifold surface, possibly with a
    /// boundary.
    pub fn new(verts: Vec<Vert3d>, tris: Vec<[usize; 3]>) -> Result<Self> {
        let n_verts = verts.len();
        let mut edges = FxHashMap::default();
        edges.reserve(3 * tris.len());
        for (t, tri) in tris.iter().enumerate() {
            for k in 0..3 {
                let (v0, v1) = (tri[k], tri[(k + 1) % 3]);
                if v0 >= n_verts || v1 >= n_verts {
                    return Err(Error::from(&format!("invalid vertex id in face {t}")));
                }
                if v0 == v1 {
                    return Err(Error::from(&format!("degenerate face {t}")));
                }
                if edges.insert((v0, v1), 3 * t + k).is_some() {
                    return Err(Error::from(&format!(
                        "duplicated half-edge {v0} -> {v1}: the surface is not an oriented manifold"
                    )));
                }
            }
        }

        let twin = (0..3 * tris.len())
            .map(|h| {
                let tri = &tris[h / 3];
                let (v0, v1) = (tri[h % 3], tri[(h + 1) % 3]);
                edges.get(&(v1, v0)).copied().unwrap_or(NO_TWIN)
            })
            .collect();

        Ok(Self {
            n_explicit_verts: verts.len(),
            verts,
            tris,
            twin,
            unreferenced_half_edges: FxHashSet::default(),
            unreferenced_verts: FxHashSet::default(),
        })
    }

    /// Face containing half-edge `h`
    #[must_use]
    pub const fn face(h: usize) -> usize {
        h / 3
    }

    /// Next half-edge in the same face
    #[must_use]
    pub const fn next(h: usize) -> usize {
        3 * (h / 3) + (h + 1) % 3
    }

    /// Previous half-edge in the same face
    #[must_use]
    pub const fn prev(h: usize) -> usize {
        3 * (h / 3) + (h + 2) % 3
    }

    /// Number of vertex ids, including the deleted ones
    #[must_use]
    pub fn n_verts(&self) -> usize {
        self.verts.len()
    }

    /// Number of half-edge ids, including the deleted ones
    #[must_use]
    pub fn n_half_edges(&self) -> usize {
        self.twin.len()
    }

    /// Number of vertices actually present in the mesh
    #[must_use]
    pub fn n_live_verts(&self) -> usize {
        self.verts.len() - self.unreferenced_verts.len()
    }

    /// Number of faces actually present in the mesh
    #[must_use]
    pub fn n_live_faces(&self) -> usize {
        self.tris.len() - self.unreferenced_half_edges.len() / 3
    }

    /// Number of vertices the mesh was created with. Vertex ids below this
    /// threshold belong to the input and can be locked by the remesher.
    #[must_use]
    pub fn n_explicit_verts(&self) -> usize {
        self.n_explicit_verts
    }

    #[must_use]
    pub fn vert(&self, i: usize) -> Vert3d {
        self.verts[i]
    }

    pub fn set_vert(&mut self, i: usize, pt: Vert3d) {
        self.verts[i] = pt;
    }

    /// Iterator over all the vertex coordinates, indexed by vertex id
    pub fn verts(&self) -> impl ExactSizeIterator<Item = Vert3d> + '_ {
        self.verts.iter().copied()
    }

    /// Iterator over the triangles present in the mesh
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.tris
            .iter()
            .enumerate()
            .filter(|(t, _)| !self.unreferenced_half_edges.contains(&(3 * t)))
            .map(|(_, tri)| *tri)
    }

    #[must_use]
    pub fn half_edge_is_deleted(&self, h: usize) -> bool {
        self.unreferenced_half_edges.contains(&h)
    }

    #[must_use]
    pub fn vert_is_deleted(&self, i: usize) -> bool {
        self.unreferenced_verts.contains(&i)
    }

    /// First vertex of half-edge `h`
    #[must_use]
    pub fn start_vert(&self, h: usize) -> usize {
        self.tris[h / 3][h % 3]
    }

    /// Second vertex of half-edge `h`
    #[must_use]
    pub fn end_vert(&self, h: usize) -> usize {
        self.tris[h / 3][(h + 1) % 3]
    }

    /// Twin of half-edge `h`, or `NO_TWIN` on the boundary
    #[must_use]
    pub fn twin(&self, h: usize) -> usize {
        self.twin[h]
    }

    #[must_use]
    pub fn edge_length(&self, h: usize) -> f64 {
        (self.verts[self.end_vert(h)] - self.verts[self.start_vert(h)]).norm()
    }

    /// Iterator over the edge lengths, each edge counted once
    pub fn lengths_iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.twin.len())
            .filter(move |&h| {
                !self.half_edge_is_deleted(h) && {
                    let t = self.twin[h];
                    t == NO_TWIN || h < t
                }
            })
            .map(|h| self.edge_length(h))
    }

    /// Unit normal of the face containing half-edge `h`
    #[must_use]
    pub fn tri_normal(&self, h: usize) -> Vert3d {
        let [a, b, c] = self.tris[h / 3].map(|v| self.verts[v]);
        (b - a).cross(&(c - a)).normalize()
    }

    /// Compactness of the face containing half-edge `h`: `4 sqrt(3) A / sum(l_i^2)`,
    /// equal to 1 for an equilateral triangle and to 0 for a degenerate one
    #[must_use]
    pub fn compactness(&self, h: usize) -> f64 {
        let [a, b, c] = self.tris[h / 3].map(|v| self.verts[v]);
        let area = 0.5 * (b - a).cross(&(c - a)).norm();
        let p = (b - a).norm_squared() + (c - b).norm_squared() + (a - c).norm_squared();
        4.0 * f64::sqrt(3.0) * area / p
    }

    // Walk around the start vertex of `h`, against the face orientation, until
    // either the walk closes or a boundary is reached. Returns the outgoing
    // half-edges (one per face around the vertex) and a boundary flag.
    fn star(&self, h: usize) -> (Vec<usize>, bool) {
        debug_assert!(!self.half_edge_is_deleted(h));
        let mut first = h;
        let mut boundary = false;
        loop {
            let t = self.twin[first];
            if t == NO_TWIN {
                boundary = true;
                break;
            }
            let nxt = Self::next(t);
            if nxt == h {
                break;
            }
            first = nxt;
        }

        let mut res = vec![first];
        let mut cur = first;
        loop {
            let t = self.twin[Self::prev(cur)];
            if t == NO_TWIN || t == first {
                break;
            }
            res.push(t);
            cur = t;
        }
        (res, boundary)
    }

    /// Half-edges going out of the start vertex of `h`, one per face around the
    /// vertex
    #[must_use]
    pub fn ring_half_edges(&self, h: usize) -> Vec<usize> {
        self.star(h).0
    }

    /// Vertices connected to the start vertex of `h` by an edge
    #[must_use]
    pub fn vertex_ring(&self, h: usize) -> Vec<usize> {
        let (star, boundary) = self.star(h);
        let mut res = star.iter().map(|&e| self.end_vert(e)).collect::<Vec<_>>();
        if boundary {
            let last = star[star.len() - 1];
            res.push(self.start_vert(Self::prev(last)));
        }
        res
    }

    /// Whether the start vertex of `h` lies on the boundary
    #[must_use]
    pub fn vert_is_on_boundary(&self, h: usize) -> bool {
        self.star(h).1
    }

    /// Valence (number of neighbors) of the start vertex of `h`
    #[must_use]
    pub fn valence(&self, h: usize) -> usize {
        let (star, boundary) = self.star(h);
        star.len() + usize::from(boundary)
    }

    /// Unit normal at the start vertex of `h`, as the normalized mean of the
    /// adjacent face normals
    #[must_use]
    pub fn vert_normal(&self, h: usize) -> Vert3d {
        let (star, _) = self.star(h);
        let mut res = Vert3d::zeros();
        for &e in &star {
            res += self.tri_normal(e);
        }
        res.normalize()
    }

    /// Mean position of the vertices connected to the start vertex of `h`
    #[must_use]
    pub fn mean_ring_position(&self, h: usize) -> Vert3d {
        let ring = self.vertex_ring(h);
        let mut res = Vert3d::zeros();
        for &v in &ring {
            res += self.verts[v];
        }
        res / ring.len() as f64
    }

    /// Mean compactness of the faces around the start vertex of `h`
    #[must_use]
    pub fn mean_compactness(&self, h: usize) -> f64 {
        let (star, _) = self.star(h);
        let mut res = 0.0;
        for &e in &star {
            res += self.compactness(e);
        }
        res / star.len() as f64
    }

    /// Faces whose geometry changes when `h0` is collapsed: the half-edges
    /// going out of its end vertex, excluding the two faces adjacent to `h0`
    #[must_use]
    pub fn collapse_ring(&self, h0: usize) -> Vec<usize> {
        let h3 = self.twin[h0];
        debug_assert_ne!(h3, NO_TWIN);
        let (t0, t1) = (Self::face(h0), Self::face(h3));
        self.ring_half_edges(h3)
            .into_iter()
            .filter(|&r| Self::face(r) != t0 && Self::face(r) != t1)
            .collect()
    }

    /// The 4 half-edges whose start vertices are the corners of the diamond
    /// around interior edge `h`: its end vertex, the two opposite vertices and
    /// its start vertex
    #[must_use]
    pub fn adjacent_half_edges(&self, h: usize) -> [usize; 4] {
        let t = self.twin[h];
        debug_assert_ne!(t, NO_TWIN);
        [Self::next(h), Self::prev(h), Self::next(t), Self::prev(t)]
    }

    fn push_face(&mut self, tri: [usize; 3]) -> usize {
        self.tris.push(tri);
        self.twin.extend([NO_TWIN; 3]);
        3 * (self.tris.len() - 1)
    }

    fn link(&mut self, h: usize, t: usize) {
        self.twin[h] = t;
        if t != NO_TWIN {
            self.twin[t] = h;
        }
    }

    fn delete_face(&mut self, t: usize) {
        for h in 3 * t..3 * t + 3 {
            self.unreferenced_half_edges.insert(h);
        }
    }

    /// Split edge `h0` at its midpoint: the 1 or 2 adjacent faces are deleted
    /// and replaced by 2 or 4 new ones. Returns the id of the new vertex.
    pub fn split(&mut self, h0: usize) -> Result<usize> {
        if self.half_edge_is_deleted(h0) {
            return Err(Error::from(&format!("half-edge {h0} is deleted")));
        }
        let h3 = self.twin[h0];
        let (h1, h2) = (Self::next(h0), Self::prev(h0));
        let (v0, v1) = (self.start_vert(h0), self.end_vert(h0));
        let v2 = self.start_vert(h2);
        let (th1, th2) = (self.twin[h1], self.twin[h2]);

        let m = self.verts.len();
        self.verts.push(0.5 * (self.verts[v0] + self.verts[v1]));

        self.delete_face(Self::face(h0));
        let a = self.push_face([v0, m, v2]);
        let b = self.push_face([m, v1, v2]);
        self.link(a + 1, b + 2);
        self.link(a + 2, th2);
        self.link(b + 1, th1);

        if h3 != NO_TWIN {
            let (h4, h5) = (Self::next(h3), Self::prev(h3));
            let v3 = self.start_vert(h5);
            let (th4, th5) = (self.twin[h4], self.twin[h5]);
            self.delete_face(Self::face(h3));
            let c = self.push_face([v1, m, v3]);
            let d = self.push_face([m, v0, v3]);
            self.link(a, d);
            self.link(b, c);
            self.link(c + 1, d + 2);
            self.link(c + 2, th5);
            self.link(d + 1, th4);
        }
        Ok(m)
    }

    /// Collapse interior edge `h0` onto its start vertex: the end vertex and
    /// the 2 adjacent faces are deleted, and the other faces around the end
    /// vertex are reconnected to the start vertex.
    ///
    /// The caller is responsible for checking that the collapse keeps the
    /// surface manifold (see the link condition in the remesher). The returned
    /// [`CollapseOp`] can be passed to [`Self::revert_collapse`] to restore the
    /// mesh exactly.
    pub fn collapse(&mut self, h0: usize) -> Result<CollapseOp> {
        if self.half_edge_is_deleted(h0) {
            return Err(Error::from(&format!("half-edge {h0} is deleted")));
        }
        let h3 = self.twin[h0];
        if h3 == NO_TWIN {
            return Err(Error::from(&format!(
                "cannot collapse boundary half-edge {h0}"
            )));
        }
        let (h1, h2) = (Self::next(h0), Self::prev(h0));
        let (h4, h5) = (Self::next(h3), Self::prev(h3));
        let (t0, t1) = (Self::face(h0), Self::face(h3));
        let (v0, v1) = (self.start_vert(h0), self.end_vert(h0));

        let ring = self.collapse_ring(h0);
        for &r in &ring {
            debug_assert_eq!(self.start_vert(r), v1);
            self.tris[Self::face(r)][r % 3] = v0;
        }

        let (th1, th2) = (self.twin[h1], self.twin[h2]);
        let (th4, th5) = (self.twin[h4], self.twin[h5]);
        let mut twin_log = Vec::with_capacity(4);
        for (h, t) in [(th1, th2), (th2, th1), (th4, th5), (th5, th4)] {
            if h != NO_TWIN {
                twin_log.push((h, self.twin[h]));
                self.twin[h] = t;
            }
        }

        self.delete_face(t0);
        self.delete_face(t1);
        self.unreferenced_verts.insert(v1);

        Ok(CollapseOp {
            half_edges: [h0, h1, h2, h3, h4, h5],
            removed_vert: v1,
            ring,
            twin_log,
        })
    }

    /// Undo a collapse, restoring the mesh exactly as it was
    pub fn revert_collapse(&mut self, op: CollapseOp) {
        for &(h, t) in op.twin_log.iter().rev() {
            self.twin[h] = t;
        }
        for &r in &op.ring {
            self.tris[Self::face(r)][r % 3] = op.removed_vert;
        }
        for h in op.half_edges {
            self.unreferenced_half_edges.remove(&h);
        }
        self.unreferenced_verts.remove(&op.removed_vert);
    }

    /// Flip interior edge `h0`: the diagonal of the surrounding diamond is
    /// replaced by the other diagonal, in place (no id is created or deleted).
    ///
    /// The caller is responsible for checking that the opposite vertices are
    /// not already connected. The returned [`FlipOp`] can be passed to
    /// [`Self::revert_flip`] to restore the mesh exactly.
    pub fn flip(&mut self, h0: usize) -> Result<FlipOp> {
        if self.half_edge_is_deleted(h0) {
            return Err(Error::from(&format!("half-edge {h0} is deleted")));
        }
        let h3 = self.twin[h0];
        if h3 == NO_TWIN {
            return Err(Error::from(&format!("cannot flip boundary half-edge {h0}")));
        }
        let (h1, h2) = (Self::next(h0), Self::prev(h0));
        let (h4, h5) = (Self::next(h3), Self::prev(h3));
        let (t0, t1) = (Self::face(h0), Self::face(h3));
        let (v0, v1) = (self.start_vert(h0), self.end_vert(h0));
        let (v2, v3) = (self.start_vert(h2), self.start_vert(h5));
        let (th1, th2) = (self.twin[h1], self.twin[h2]);
        let (th4, th5) = (self.twin[h4], self.twin[h5]);

        let tri_log = [(t0, self.tris[t0]), (t1, self.tris[t1])];
        self.tris[t0][h0 % 3] = v3;
        self.tris[t0][h1 % 3] = v2;
        self.tris[t0][h2 % 3] = v0;
        self.tris[t1][h3 % 3] = v2;
        self.tris[t1][h4 % 3] = v3;
        self.tris[t1][h5 % 3] = v1;

        let mut twin_log = Vec::with_capacity(8);
        for (h, t) in [(h1, th2), (h2, th4), (h4, th5), (h5, th1)] {
            twin_log.push((h, self.twin[h]));
            self.twin[h] = t;
            if t != NO_TWIN {
                twin_log.push((t, self.twin[t]));
                self.twin[t] = h;
            }
        }
        Ok(FlipOp { tri_log, twin_log })
    }

    /// Undo a flip, restoring the mesh exactly as it was
    pub fn revert_flip(&mut self, op: FlipOp) {
        for &(h, t) in op.twin_log.iter().rev() {
            self.twin[h] = t;
        }
        for (t, tri) in op.tri_log {
            self.tris[t] = tri;
        }
    }

    /// Check the consistency of the data structure
    pub fn check(&self) -> Result<()> {
        let mut edges = FxHashMap::default();
        for h in 0..self.twin.len() {
            if self.half_edge_is_deleted(h) {
                continue;
            }
            let (v0, v1) = (self.start_vert(h), self.end_vert(h));
            if v0 >= self.verts.len() || v1 >= self.verts.len() {
                return Err(Error::from(&format!("invalid vertex id in half-edge {h}")));
            }
            if self.vert_is_deleted(v0) || self.vert_is_deleted(v1) {
                return Err(Error::from(&format!(
                    "half-edge {h} references a deleted vertex"
                )));
            }
            if let Some(other) = edges.insert((v0, v1), h) {
                return Err(Error::from(&format!(
                    "duplicated half-edge {v0} -> {v1} ({other} and {h})"
                )));
            }
            let t = self.twin[h];
            if t != NO_TWIN {
                if self.half_edge_is_deleted(t) {
                    return Err(Error::from(&format!(
                        "half-edge {h} has a deleted twin {t}"
                    )));
                }
                if self.twin[t] != h {
                    return Err(Error::from(&format!(
                        "inconsistent twins: {h} -> {t} -> {}",
                        self.twin[t]
                    )));
                }
                if self.start_vert(t) != v1 || self.end_vert(t) != v0 {
                    return Err(Error::from(&format!(
                        "twin of half-edge {h} is not the opposite edge"
                    )));
                }
            }
        }
        for t in 0..self.tris.len() {
            let n_deleted = (3 * t..3 * t + 3)
                .filter(|h| self.half_edge_is_deleted(*h))
                .count();
            if n_deleted != 0 && n_deleted != 3 {
                return Err(Error::from(&format!("face {t} is partially deleted")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        assert_delta,
        mesh::{
            test_meshes::{cone_fan, icosahedron, strip},
            HalfEdgeMesh, NO_TWIN,
        },
        Result, Vert3d,
    };
    use rustc_hash::FxHashSet;

    fn snapshot(mesh: &HalfEdgeMesh) -> (Vec<[usize; 3]>, Vec<usize>, usize, usize) {
        (
            mesh.tris.clone(),
            mesh.twin.clone(),
            mesh.unreferenced_half_edges.len(),
            mesh.unreferenced_verts.len(),
        )
    }

    #[test]
    fn test_icosahedron() -> Result<()> {
        let mesh = icosahedron();
        mesh.check()?;
        assert_eq!(mesh.n_live_verts(), 12);
        assert_eq!(mesh.n_live_faces(), 20);
        assert_eq!(mesh.lengths_iter().count(), 30);
        for h in 0..mesh.n_half_edges() {
            assert_ne!(mesh.twin(h), NO_TWIN);
            assert_eq!(mesh.valence(h), 5);
            assert_eq!(mesh.vertex_ring(h).len(), 5);
        }
        let l = mesh.edge_length(0);
        for length in mesh.lengths_iter() {
            assert_delta!(length, l, 1e-12);
        }
        Ok(())
    }

    #[test]
    fn test_strip_boundary() -> Result<()> {
        let mesh = strip(3);
        mesh.check()?;
        assert_eq!(mesh.n_live_verts(), 8);
        assert_eq!(mesh.n_live_faces(), 6);
        // V - E + F = 1 for a disk
        assert_eq!(mesh.lengths_iter().count(), 13);

        // the first corner has 3 neighbors, 2 of them through boundary edges
        let h = (0..mesh.n_half_edges())
            .find(|&h| mesh.start_vert(h) == 0)
            .unwrap();
        assert_eq!(mesh.valence(h), 3);
        let ring = mesh.vertex_ring(h).into_iter().collect::<FxHashSet<_>>();
        assert_eq!(ring, [1, 4, 5].into_iter().collect());
        Ok(())
    }

    #[test]
    fn test_split() -> Result<()> {
        let mut mesh = icosahedron();
        let mid = 0.5 * (mesh.vert(mesh.start_vert(0)) + mesh.vert(mesh.end_vert(0)));
        let m = mesh.split(0)?;
        mesh.check()?;
        assert_eq!(m, 12);
        assert_eq!(mesh.n_live_verts(), 13);
        assert_eq!(mesh.n_live_faces(), 22);
        assert_eq!(mesh.lengths_iter().count(), 33);
        assert_delta!((mesh.vert(m) - mid).norm(), 0.0, 1e-12);
        assert_eq!(mesh.valence((0..mesh.n_half_edges()).find(|&h| !mesh.half_edge_is_deleted(h) && mesh.start_vert(h) == m).unwrap()), 4);
        Ok(())
    }

    #[test]
    fn test_split_boundary() -> Result<()> {
        let mut mesh = strip(3);
        let h = (0..mesh.n_half_edges())
            .find(|&h| mesh.twin(h) == NO_TWIN)
            .unwrap();
        mesh.split(h)?;
        mesh.check()?;
        assert_eq!(mesh.n_live_verts(), 9);
        assert_eq!(mesh.n_live_faces(), 7);
        Ok(())
    }

    #[test]
    fn test_collapse() -> Result<()> {
        let mut mesh = icosahedron();
        let v1 = mesh.end_vert(0);
        let op = mesh.collapse(0)?;
        mesh.check()?;
        assert_eq!(mesh.n_live_verts(), 11);
        assert_eq!(mesh.n_live_faces(), 18);
        assert!(mesh.vert_is_deleted(v1));
        assert_eq!(op.ring().len(), 3);
        for &r in op.ring() {
            assert_eq!(mesh.start_vert(r), mesh.start_vert(0));
        }
        Ok(())
    }

    #[test]
    fn test_collapse_revert() -> Result<()> {
        let mut mesh = icosahedron();
        let before = snapshot(&mesh);
        let op = mesh.collapse(7)?;
        mesh.revert_collapse(op);
        mesh.check()?;
        assert_eq!(snapshot(&mesh), before);
        Ok(())
    }

    #[test]
    fn test_flip_revert() -> Result<()> {
        let mut mesh = icosahedron();
        let before = snapshot(&mesh);
        let op = mesh.flip(0)?;
        mesh.check()?;
        assert_eq!(mesh.n_live_verts(), 12);
        assert_eq!(mesh.n_live_faces(), 20);
        mesh.revert_flip(op);
        mesh.check()?;
        assert_eq!(snapshot(&mesh), before);
        Ok(())
    }

    #[test]
    fn test_flip_valences() -> Result<()> {
        let mut mesh = icosahedron();
        let h3 = mesh.twin(0);
        let [h1, h2, h4, h5] = mesh.adjacent_half_edges(0);
        let verts = [h1, h2, h4, h5].map(|h| mesh.start_vert(h));
        mesh.flip(0)?;
        // the ends of the old edge lose a neighbor, the opposite vertices gain one
        for (h, v) in [(h1, verts[0]), (h2, verts[1]), (h4, verts[2]), (h5, verts[3])] {
            let e = (0..mesh.n_half_edges())
                .find(|&e| !mesh.half_edge_is_deleted(e) && mesh.start_vert(e) == v)
                .unwrap();
            let expected = if h == h1 || h == h4 { 4 } else { 6 };
            assert_eq!(mesh.valence(e), expected);
        }
        Ok(())
    }

    #[test]
    fn test_cone_collapse_ring() -> Result<()> {
        let mut mesh = cone_fan(0.5);
        mesh.check()?;
        // half-edge 1 goes from the first ring vertex to the apex
        assert_eq!(mesh.end_vert(1), 6);
        let op = mesh.collapse(1)?;
        mesh.check()?;
        assert_eq!(op.ring().len(), 4);
        assert_eq!(mesh.n_live_faces(), 4);
        let normal = Vert3d::new(0.0, 0.0, 1.0);
        for &r in op.ring() {
            assert_delta!(mesh.tri_normal(r).dot(&normal), 1.0, 1e-12);
        }
        Ok(())
    }
}
