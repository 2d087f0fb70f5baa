//! Draw dispatch: validate the draw range, classify the primitive, run the
//! matching assembly → rasterize pipeline.

use crate::buffer::{IndexBuffer, VertexBuffer};
use crate::context::{CullFace, RasterState};
use crate::framebuffer::Framebuffer;
use crate::memory::Arena;
use crate::message::{MessageSeverity, MessageSink, MessageType};
use crate::pipeline::vertex_cache::stream_range;
use crate::pipeline::{assembly, topology::Primitive};
use crate::raster;
use crate::shader::ShaderProgram;

#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_buffer<U>(
    arena: &Arena,
    messages: &mut MessageSink,
    state: RasterState,
    ib: Option<&IndexBuffer>,
    vb: &VertexBuffer,
    fb: &mut Framebuffer,
    program: &ShaderProgram<'_, U>,
    primitive: Primitive,
    start_index: usize,
    count: usize,
) {
    if count == 0 {
        return;
    }

    let stream_len = ib.map_or(vb.vertex_count(), IndexBuffer::len);
    let end_index = start_index + count - 1;
    if end_index >= stream_len {
        let buffer = if ib.is_some() { "index" } else { "vertex" };
        messages.emit(
            MessageType::Error,
            MessageSeverity::High,
            "draw_buffer",
            &format!(
                "attempt to read the {buffer} buffer out of bounds \
                 at indices {start_index}-{end_index} (len: {stream_len})"
            ),
        );
        return;
    }

    // With an index buffer the stream range is in bounds, but the indices it
    // holds may still point past the vertex buffer.
    if ib.is_some() {
        let (_, max_vertex) = stream_range(ib, start_index, count);
        if max_vertex >= vb.vertex_count() as u64 {
            messages.emit(
                MessageType::Error,
                MessageSeverity::High,
                "draw_buffer",
                &format!(
                    "index buffer refers to vertex {max_vertex}, but the vertex \
                     buffer holds {} vertices",
                    vb.vertex_count()
                ),
            );
            return;
        }
    }

    if primitive.is_triangle() {
        // Culling everything: nothing can come out, skip the whole pipeline.
        if state.cull_face == CullFace::FrontAndBack {
            return;
        }
        let triangles = assembly::assemble_triangles(
            arena, messages, state, ib, vb, fb, program, primitive, start_index, count,
        );
        let interpolated = arena.alloc_slice(program.varying_len(), 0.0);
        for tri in triangles.iter_mut() {
            raster::triangle::rasterize(tri, fb, program, state, interpolated);
        }
    } else if primitive.is_line() {
        let lines = assembly::assemble_lines(
            arena, messages, ib, vb, fb, program, primitive, start_index, count,
        );
        let interpolated = arena.alloc_slice(program.varying_len(), 0.0);
        for line in lines.iter() {
            raster::line::rasterize(line, fb, program, state, interpolated);
        }
    } else {
        debug_assert!(primitive.is_point());
        let points = assembly::assemble_points(arena, state, ib, vb, program, start_index, count);
        for point in points.iter() {
            raster::point::rasterize(point, fb, program, state);
        }
    }
}
