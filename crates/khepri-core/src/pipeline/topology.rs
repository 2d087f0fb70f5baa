//! Primitive topologies: how a vertex stream groups into primitives.

/// Primitive types accepted by the draw entry points.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Primitive {
    /// One point per vertex.
    Points,
    /// Independent pairs `(0-1, 2-3, …)`; an odd trailing vertex is dropped.
    Lines,
    /// Connected `(0-1, 1-2, …)`.
    LineStrip,
    /// Like [`Primitive::LineStrip`] plus a closing segment back to the
    /// first vertex.
    LineLoop,
    /// Independent triples `(0-1-2, 3-4-5, …)`; trailing extras are dropped.
    Triangles,
    /// Sliding window `(0-1-2, 1-2-3, …)` with alternating winding fixup.
    TriangleStrip,
    /// `(0-1-2, 0-2-3, …)` around vertex 0.
    TriangleFan,
}

impl Primitive {
    #[inline]
    pub(crate) fn is_triangle(self) -> bool {
        matches!(
            self,
            Primitive::Triangles | Primitive::TriangleStrip | Primitive::TriangleFan
        )
    }

    #[inline]
    pub(crate) fn is_line(self) -> bool {
        matches!(
            self,
            Primitive::Lines | Primitive::LineStrip | Primitive::LineLoop
        )
    }

    #[inline]
    pub(crate) fn is_point(self) -> bool {
        matches!(self, Primitive::Points)
    }
}

/// Number of triangles `vertex_count` stream entries produce.
pub(crate) fn triangle_count(vertex_count: usize, prim: Primitive) -> usize {
    match prim {
        Primitive::Triangles => vertex_count / 3,
        Primitive::TriangleStrip | Primitive::TriangleFan => vertex_count.saturating_sub(2),
        _ => unreachable!("not a triangle primitive: {prim:?}"),
    }
}

/// Stream indices of triangle `k` (0-based, counting skipped/culled ones).
pub(crate) fn triangle_indices(base: usize, k: usize, prim: Primitive) -> [usize; 3] {
    match prim {
        Primitive::Triangles => [base + k * 3, base + k * 3 + 1, base + k * 3 + 2],
        Primitive::TriangleStrip => {
            // Odd triangles swap their first two vertices to keep the
            // winding consistent across the strip.
            if k % 2 == 1 {
                [base + k + 1, base + k, base + k + 2]
            } else {
                [base + k, base + k + 1, base + k + 2]
            }
        }
        Primitive::TriangleFan => [base, base + k + 1, base + k + 2],
        _ => unreachable!("not a triangle primitive: {prim:?}"),
    }
}

/// Number of lines `vertex_count` stream entries produce.
pub(crate) fn line_count(vertex_count: usize, prim: Primitive) -> usize {
    match prim {
        Primitive::Lines => vertex_count / 2,
        Primitive::LineStrip => vertex_count.saturating_sub(1),
        Primitive::LineLoop => {
            if vertex_count > 1 {
                vertex_count
            } else {
                0
            }
        }
        _ => unreachable!("not a line primitive: {prim:?}"),
    }
}

/// Stream indices of line `k`.
pub(crate) fn line_indices(
    base: usize,
    k: usize,
    prim: Primitive,
    vertex_count: usize,
) -> [usize; 2] {
    match prim {
        Primitive::Lines => [base + k * 2, base + k * 2 + 1],
        Primitive::LineStrip => [base + k, base + k + 1],
        Primitive::LineLoop => [base + k, base + (k + 1) % vertex_count],
        _ => unreachable!("not a line primitive: {prim:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_counts_by_topology() {
        assert_eq!(triangle_count(9, Primitive::Triangles), 3);
        assert_eq!(triangle_count(8, Primitive::Triangles), 2);
        assert_eq!(triangle_count(5, Primitive::TriangleStrip), 3);
        assert_eq!(triangle_count(5, Primitive::TriangleFan), 3);
        assert_eq!(triangle_count(2, Primitive::TriangleStrip), 0);
        assert_eq!(triangle_count(0, Primitive::TriangleFan), 0);
    }

    #[test]
    fn strip_alternates_winding() {
        assert_eq!(triangle_indices(0, 0, Primitive::TriangleStrip), [0, 1, 2]);
        assert_eq!(triangle_indices(0, 1, Primitive::TriangleStrip), [2, 1, 3]);
        assert_eq!(triangle_indices(0, 2, Primitive::TriangleStrip), [2, 3, 4]);
        assert_eq!(triangle_indices(5, 1, Primitive::TriangleStrip), [7, 6, 8]);
    }

    #[test]
    fn fan_pivots_on_the_base_vertex() {
        assert_eq!(triangle_indices(3, 0, Primitive::TriangleFan), [3, 4, 5]);
        assert_eq!(triangle_indices(3, 2, Primitive::TriangleFan), [3, 6, 7]);
    }

    #[test]
    fn line_counts_by_topology() {
        assert_eq!(line_count(7, Primitive::Lines), 3);
        assert_eq!(line_count(4, Primitive::LineStrip), 3);
        assert_eq!(line_count(4, Primitive::LineLoop), 4);
        assert_eq!(line_count(1, Primitive::LineLoop), 0);
        assert_eq!(line_count(1, Primitive::LineStrip), 0);
    }

    #[test]
    fn loop_closes_back_to_the_base() {
        assert_eq!(line_indices(2, 3, Primitive::LineLoop, 4), [5, 2]);
        assert_eq!(line_indices(2, 1, Primitive::LineLoop, 4), [3, 4]);
    }
}
