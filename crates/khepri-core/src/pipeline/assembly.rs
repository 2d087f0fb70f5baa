//! Primitive assembly: resolve topology, shade vertices through the cache,
//! clip, and set primitives up for their rasterizer.
//!
//! Every assembled primitive lives in the draw arena and carries a stable
//! id counting survivors (of clipping and culling) in emission order.

use khepri_math::Vec3;

use crate::buffer::{IndexBuffer, VertexBuffer};
use crate::context::RasterState;
use crate::framebuffer::Framebuffer;
use crate::memory::Arena;
use crate::message::{MessageSeverity, MessageSink, MessageType};
use crate::pipeline::clipping::{
    clip_line, clip_triangle, inside_view_volume, MAX_CLIPPED_TRIANGLES,
};
use crate::pipeline::topology::{self, Primitive};
use crate::pipeline::vertex_cache::{perspective_divide, ShadedVertex, VertexCache};
use crate::raster::line::Line;
use crate::raster::point::Point;
use crate::raster::triangle::{self, Triangle};
use crate::shader::ShaderProgram;

/// Vertex id for a stream position: through the index buffer when present,
/// the position itself otherwise.
#[inline]
fn resolve(ib: Option<&IndexBuffer>, stream_index: usize) -> u64 {
    match ib {
        Some(ib) => ib.index(stream_index),
        None => stream_index as u64,
    }
}

/// Non-fatal heads-up when the vertex count does not divide evenly into the
/// requested primitive; the extras are silently dropped by the topology
/// tables.
fn warn_on_excess_vertices(messages: &mut MessageSink, prim: Primitive, count: usize) {
    match prim {
        Primitive::Lines if count % 2 != 0 => messages.emit(
            MessageType::Warning,
            MessageSeverity::Low,
            "assemble_lines",
            "odd vertex count when drawing lines; the last vertex is ignored",
        ),
        Primitive::Triangles if count % 3 != 0 => messages.emit(
            MessageType::Warning,
            MessageSeverity::Low,
            "assemble_triangles",
            &format!(
                "vertex count not divisible by 3 when drawing triangles; \
                 the last {} vertex/vertices are ignored",
                count % 3
            ),
        ),
        _ => {}
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn assemble_triangles<'a, U>(
    arena: &'a Arena,
    messages: &mut MessageSink,
    state: RasterState,
    ib: Option<&IndexBuffer>,
    vb: &VertexBuffer,
    fb: &Framebuffer,
    program: &ShaderProgram<'_, U>,
    prim: Primitive,
    start_index: usize,
    count: usize,
) -> &'a mut [Triangle<'a>] {
    warn_on_excess_vertices(messages, prim, count);
    let raw_count = topology::triangle_count(count, prim);
    if raw_count == 0 {
        return Default::default();
    }

    let mut cache = VertexCache::for_draw(arena, ib, vb, program, start_index, count);
    let triangles = arena.alloc_slice(raw_count * MAX_CLIPPED_TRIANGLES, Triangle::EMPTY);
    let mut clipped = [[ShadedVertex::EMPTY; 3]; MAX_CLIPPED_TRIANGLES];
    let mut emitted = 0;

    for k in 0..raw_count {
        let stream = topology::triangle_indices(start_index, k, prim);
        let vertices = stream.map(|s| cache.fetch(resolve(ib, s)));

        let n = clip_triangle(arena, program.varyings, vertices, &mut clipped);
        for &v in &clipped[..n] {
            let mut tri = Triangle::from_vertices(v);
            if triangle::setup(&mut tri, fb, state) {
                tri.id = emitted as u64;
                triangles[emitted] = tri;
                emitted += 1;
            }
        }
    }

    triangles.split_at_mut(emitted).0
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn assemble_lines<'a, U>(
    arena: &'a Arena,
    messages: &mut MessageSink,
    ib: Option<&IndexBuffer>,
    vb: &VertexBuffer,
    fb: &Framebuffer,
    program: &ShaderProgram<'_, U>,
    prim: Primitive,
    start_index: usize,
    count: usize,
) -> &'a mut [Line<'a>] {
    warn_on_excess_vertices(messages, prim, count);
    let raw_count = topology::line_count(count, prim);
    if raw_count == 0 {
        return Default::default();
    }

    let mut cache = VertexCache::for_draw(arena, ib, vb, program, start_index, count);
    let lines = arena.alloc_slice(raw_count, Line::EMPTY);
    let mut emitted = 0;

    for k in 0..raw_count {
        let stream = topology::line_indices(start_index, k, prim, count);
        let vertices = stream.map(|s| cache.fetch(resolve(ib, s)));

        let Some(v) = clip_line(arena, program.varyings, vertices) else {
            continue;
        };

        let mut line = Line {
            v,
            inv_w: [0.0; 2],
            ss: [Vec3::ZERO; 2],
            id: emitted as u64,
        };
        for i in 0..2 {
            line.inv_w[i] = perspective_divide(&mut line.v[i].position);
            line.ss[i] = fb.ndc_to_screen(line.v[i].position.xyz());
        }
        lines[emitted] = line;
        emitted += 1;
    }

    lines.split_at_mut(emitted).0
}

pub(crate) fn assemble_points<'a, U>(
    arena: &'a Arena,
    state: RasterState,
    ib: Option<&IndexBuffer>,
    vb: &VertexBuffer,
    program: &ShaderProgram<'_, U>,
    start_index: usize,
    count: usize,
) -> &'a mut [Point<'a>] {
    if state.point_size <= 0.0 {
        return Default::default();
    }

    let mut cache = VertexCache::for_draw(arena, ib, vb, program, start_index, count);
    let points = arena.alloc_slice(count, Point::EMPTY);
    let mut emitted = 0;

    for k in 0..count {
        let mut v = cache.fetch(resolve(ib, start_index + k));

        // Points are not clipped as primitives; one outside the view volume
        // is dropped whole (its divide would be meaningless for w <= 0).
        if !inside_view_volume(v.position) {
            continue;
        }

        let clip_w = v.position.w;
        perspective_divide(&mut v.position);
        points[emitted] = Point {
            v,
            clip_w,
            id: emitted as u64,
        };
        emitted += 1;
    }

    points.split_at_mut(emitted).0
}
