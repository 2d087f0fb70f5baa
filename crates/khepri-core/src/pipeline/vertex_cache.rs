//! Vertex shading and the post-transform cache.
//!
//! Within one draw call, each distinct vertex id runs the vertex shader at
//! most once. The cache is a dense array indexed by `vertex_id - base`: it
//! wastes slots for sparse index sets but keeps fetches O(1) with no hashing.

use khepri_math::Vec4;

use crate::buffer::{IndexBuffer, VertexBuffer};
use crate::memory::Arena;
use crate::shader::{ShaderProgram, VsIn, VsOut};

/// One vertex after the vertex shader ran: a clip-space position and a shared
/// view of its varying row. Positions are rewritten to NDC when a rasterizer
/// applies the perspective divide.
#[derive(Copy, Clone)]
pub(crate) struct ShadedVertex<'a> {
    pub position: Vec4,
    pub varyings: &'a [f64],
}

impl<'a> ShadedVertex<'a> {
    pub const EMPTY: ShadedVertex<'static> = ShadedVertex {
        position: Vec4::ZERO,
        varyings: &[],
    };
}

/// Replaces a clip-space position with its NDC equivalent and returns
/// `1 / w_clip` for later perspective-correct interpolation.
#[inline]
pub(crate) fn perspective_divide(position: &mut Vec4) -> f64 {
    let inv_w = 1.0 / position.w;
    position.x *= inv_w;
    position.y *= inv_w;
    position.z *= inv_w;
    position.w = 1.0;
    inv_w
}

/// The `[min, max]` vertex-id range a draw range touches. With an index
/// buffer this scans the stream once; without one the range is the stream
/// itself.
pub(crate) fn stream_range(
    ib: Option<&IndexBuffer>,
    start_index: usize,
    count: usize,
) -> (u64, u64) {
    match ib {
        Some(ib) => {
            let mut min = u64::MAX;
            let mut max = 0;
            for i in 0..count {
                let vi = ib.index(start_index + i);
                min = min.min(vi);
                max = max.max(vi);
            }
            (min, max)
        }
        None => (start_index as u64, (start_index + count - 1) as u64),
    }
}

pub(crate) struct VertexCache<'a, 'p, U> {
    base: u64,
    entries: &'a mut [Option<ShadedVertex<'a>>],
    arena: &'a Arena,
    vb: &'p VertexBuffer,
    program: &'p ShaderProgram<'p, U>,
}

impl<'a, 'p, U> VertexCache<'a, 'p, U> {
    /// Sizes the cache for every vertex id in the draw range.
    pub fn for_draw(
        arena: &'a Arena,
        ib: Option<&IndexBuffer>,
        vb: &'p VertexBuffer,
        program: &'p ShaderProgram<'p, U>,
        start_index: usize,
        count: usize,
    ) -> Self {
        let (min, max) = stream_range(ib, start_index, count);
        let size = (max - min + 1) as usize;
        VertexCache {
            base: min,
            entries: arena.alloc_slice(size, None),
            arena,
            vb,
            program,
        }
    }

    /// The shaded vertex for `vertex_id`, invoking the vertex shader on the
    /// first request only.
    pub fn fetch(&mut self, vertex_id: u64) -> ShadedVertex<'a> {
        let slot = (vertex_id - self.base) as usize;
        if let Some(vertex) = self.entries[slot] {
            return vertex;
        }

        let varyings = self.arena.alloc_slice(self.program.varying_len(), 0.0);
        let mut out = VsOut {
            position: Vec4::ZERO,
            varyings,
        };
        (self.program.vertex)(
            VsIn {
                uniform: self.program.uniform,
                vertex: self.vb.vertex(vertex_id),
                vertex_id,
            },
            &mut out,
        );

        let VsOut { position, varyings } = out;
        let vertex = ShadedVertex {
            position,
            varyings: &*varyings,
        };
        self.entries[slot] = Some(vertex);
        vertex
    }
}
