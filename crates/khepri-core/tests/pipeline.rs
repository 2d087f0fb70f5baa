//! End-to-end draws through the public API, checking the framebuffer.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use khepri_core::{
    Context, CullFace, Framebuffer, FrontFace, FsIn, FsOut, IndexBuffer, Interpolation, Message,
    MessageSeverity, MessageType, Primitive, ShaderProgram, VaryingInfo, VertexBuffer, VsIn, VsOut,
};
use khepri_math::Vec4;

const RED: u32 = 0xFF00_00FF;
const BLUE: u32 = 0x0000_FFFF;

/// Draws `vertices` (NDC positions, w = 1) as triangles in one flat color.
fn draw_solid(
    ctx: &mut Context,
    fb: &mut Framebuffer,
    vertices: &[[f64; 3]],
    color: [f64; 4],
) {
    let vb = VertexBuffer::from_slice(vertices);
    let vertex = |input: VsIn<'_, ()>, out: &mut VsOut<'_>| {
        let p: &[f64] = bytemuck::cast_slice(input.vertex);
        out.position = Vec4::new(p[0], p[1], p[2], 1.0);
    };
    let fragment = move |_input: FsIn<'_, ()>, out: &mut FsOut| {
        out.color = color;
    };
    let program = ShaderProgram {
        uniform: &(),
        vertex: &vertex,
        varyings: &[],
        fragment: &fragment,
    };
    ctx.draw_vertex_buffer(&vb, fb, &program, Primitive::Triangles, 0, vertices.len());
}

fn pixels_with_color(fb: &Framebuffer, color: u32) -> HashSet<(usize, usize)> {
    let mut set = HashSet::new();
    for y in 0..fb.height() {
        for x in 0..fb.width() {
            if fb.color_at(x, y) == color {
                set.insert((x, y));
            }
        }
    }
    set
}

// ── triangles ─────────────────────────────────────────────────────────────

#[test]
fn single_triangle_covers_the_expected_pixels() {
    let mut ctx = Context::new();
    let mut fb = Framebuffer::new(4, 4);

    draw_solid(
        &mut ctx,
        &mut fb,
        &[[-1.0, -1.0, 0.0], [1.0, -1.0, 0.0], [0.0, 1.0, 0.0]],
        [1.0, 0.0, 0.0, 1.0],
    );

    // Apex maps to screen (1.5, 0), base spans the bottom row's edge at
    // y = 3; only centers inside the triangle are covered.
    let expected: HashSet<(usize, usize)> =
        [(1, 0), (1, 1), (0, 2), (1, 2), (2, 2)].into_iter().collect();
    assert_eq!(pixels_with_color(&fb, RED), expected);
    assert_eq!(fb.color_at(0, 0), 0);
    assert_eq!(fb.color_at(3, 3), 0);

    // Covered pixels carry the triangle's depth; the rest keep the clear
    // value.
    assert_eq!(fb.depth_at(1, 1), 0.0);
    assert_eq!(fb.depth_at(0, 0), -1.0);
}

fn full_screen_quad(z: f64) -> [[f64; 3]; 6] {
    [
        [-1.0, -1.0, z],
        [1.0, -1.0, z],
        [1.0, 1.0, z],
        [-1.0, -1.0, z],
        [1.0, 1.0, z],
        [-1.0, 1.0, z],
    ]
}

#[test]
fn depth_test_keeps_the_nearest_surface() {
    let mut ctx = Context::new();
    let mut fb = Framebuffer::new(4, 4);

    draw_solid(&mut ctx, &mut fb, &full_screen_quad(-0.5), [1.0, 0.0, 0.0, 1.0]);
    draw_solid(&mut ctx, &mut fb, &full_screen_quad(0.5), [0.0, 0.0, 1.0, 1.0]);

    // The viewport maps NDC onto pixel-center coordinates [0, size-1], so a
    // full-screen quad covers every pixel whose center is inside that range.
    for y in 0..3 {
        for x in 0..3 {
            assert_eq!(fb.color_at(x, y), BLUE, "pixel ({x}, {y})");
            assert_eq!(fb.depth_at(x, y), 0.5);
        }
    }

    // Drawing something farther afterwards changes nothing: strictly
    // greater depth wins, ties and lesser values lose.
    draw_solid(&mut ctx, &mut fb, &full_screen_quad(-0.5), [1.0, 0.0, 0.0, 1.0]);
    draw_solid(&mut ctx, &mut fb, &full_screen_quad(0.5), [1.0, 0.0, 0.0, 1.0]);
    assert_eq!(fb.color_at(1, 1), BLUE);
}

#[test]
fn clockwise_triangle_is_culled_when_back_faces_are() {
    let mut ctx = Context::new();
    ctx.set_cull_face(CullFace::Back);
    ctx.set_front_face(FrontFace::Ccw);
    let mut fb = Framebuffer::new(4, 4);

    let cw = [[-1.0, -1.0, 0.0], [0.0, 1.0, 0.0], [1.0, -1.0, 0.0]];
    draw_solid(&mut ctx, &mut fb, &cw, [1.0, 0.0, 0.0, 1.0]);
    assert!(fb.color().iter().all(|&c| c == 0), "framebuffer untouched");
    assert!(fb.depth().iter().all(|&d| d == -1.0));

    // Flipping the front-face convention makes the same winding front-facing.
    ctx.set_front_face(FrontFace::Cw);
    draw_solid(&mut ctx, &mut fb, &cw, [1.0, 0.0, 0.0, 1.0]);
    assert!(!pixels_with_color(&fb, RED).is_empty());
}

#[test]
fn cull_front_and_back_draws_nothing() {
    let mut ctx = Context::new();
    ctx.set_cull_face(CullFace::FrontAndBack);
    let mut fb = Framebuffer::new(4, 4);
    draw_solid(&mut ctx, &mut fb, &full_screen_quad(0.0), [1.0, 0.0, 0.0, 1.0]);
    assert!(fb.color().iter().all(|&c| c == 0));
}

#[test]
fn shared_edge_pixels_are_drawn_exactly_once() {
    // A quad split along its diagonal; the fill rule must hand every pixel
    // on the shared edge to exactly one of the two triangles.
    let hits: Rc<RefCell<HashMap<(u64, u64), usize>>> = Rc::default();

    let mut ctx = Context::new();
    let mut fb = Framebuffer::new(4, 4);
    let vb = VertexBuffer::from_slice(&full_screen_quad(0.0));

    let vertex = |input: VsIn<'_, ()>, out: &mut VsOut<'_>| {
        let p: &[f64] = bytemuck::cast_slice(input.vertex);
        out.position = Vec4::new(p[0], p[1], p[2], 1.0);
    };
    let shader_hits = Rc::clone(&hits);
    let fragment = move |input: FsIn<'_, ()>, out: &mut FsOut| {
        let key = (input.frag_coord.x as u64, input.frag_coord.y as u64);
        *shader_hits.borrow_mut().entry(key).or_insert(0) += 1;
        out.color = [1.0; 4];
    };
    let program = ShaderProgram {
        uniform: &(),
        vertex: &vertex,
        varyings: &[],
        fragment: &fragment,
    };
    ctx.draw_vertex_buffer(&vb, &mut fb, &program, Primitive::Triangles, 0, 6);

    let hits = hits.borrow();
    assert_eq!(hits.len(), 9, "3x3 covered block");
    assert!(
        hits.values().all(|&n| n == 1),
        "no pixel shaded twice: {hits:?}"
    );
}

#[test]
fn triangle_strip_keeps_winding_consistent() {
    // Strip order zig-zags, so odd triangles come out clockwise unless the
    // assembler swaps their first two vertices. With back-face culling on,
    // a broken swap would leave half the quad undrawn.
    let mut ctx = Context::new();
    ctx.set_cull_face(CullFace::Back);
    ctx.set_front_face(FrontFace::Ccw);
    let mut fb = Framebuffer::new(4, 4);

    let strip = [
        [-1.0, -1.0, 0.0],
        [1.0, -1.0, 0.0],
        [-1.0, 1.0, 0.0],
        [1.0, 1.0, 0.0],
    ];
    let vb = VertexBuffer::from_slice(&strip);
    let vertex = |input: VsIn<'_, ()>, out: &mut VsOut<'_>| {
        let p: &[f64] = bytemuck::cast_slice(input.vertex);
        out.position = Vec4::new(p[0], p[1], p[2], 1.0);
    };
    let fragment = |_input: FsIn<'_, ()>, out: &mut FsOut| {
        out.color = [1.0, 0.0, 0.0, 1.0];
    };
    let program = ShaderProgram {
        uniform: &(),
        vertex: &vertex,
        varyings: &[],
        fragment: &fragment,
    };
    ctx.draw_vertex_buffer(&vb, &mut fb, &program, Primitive::TriangleStrip, 0, 4);

    for y in 0..3 {
        for x in 0..3 {
            assert_eq!(fb.color_at(x, y), RED, "pixel ({x}, {y})");
        }
    }
}

#[test]
fn triangle_fan_covers_the_quad() {
    let mut ctx = Context::new();
    ctx.set_cull_face(CullFace::Back);
    let mut fb = Framebuffer::new(4, 4);

    let vb = VertexBuffer::from_slice(&[
        [-1.0f64, -1.0, 0.0],
        [1.0, -1.0, 0.0],
        [1.0, 1.0, 0.0],
        [-1.0, 1.0, 0.0],
    ]);
    let vertex = |input: VsIn<'_, ()>, out: &mut VsOut<'_>| {
        let p: &[f64] = bytemuck::cast_slice(input.vertex);
        out.position = Vec4::new(p[0], p[1], p[2], 1.0);
    };
    let fragment = |_input: FsIn<'_, ()>, out: &mut FsOut| {
        out.color = [1.0, 0.0, 0.0, 1.0];
    };
    let program = ShaderProgram {
        uniform: &(),
        vertex: &vertex,
        varyings: &[],
        fragment: &fragment,
    };
    ctx.draw_vertex_buffer(&vb, &mut fb, &program, Primitive::TriangleFan, 0, 4);

    for y in 0..3 {
        for x in 0..3 {
            assert_eq!(fb.color_at(x, y), RED, "pixel ({x}, {y})");
        }
    }
}

// ── perspective-correct interpolation ─────────────────────────────────────

/// Full-screen quad whose left edge sits at clip w = 1 and right edge at
/// w = 3, with a single varying equal to the vertex's w. Returns what the
/// fragment shader saw at each pixel.
fn draw_depth_varying_quad(ctx: &mut Context, fb: &mut Framebuffer) -> HashMap<(u64, u64), f64> {
    // Vertex layout: ndc x, ndc y, w.
    let quad: [[f64; 3]; 6] = [
        [-1.0, -1.0, 1.0],
        [1.0, -1.0, 3.0],
        [1.0, 1.0, 3.0],
        [-1.0, -1.0, 1.0],
        [1.0, 1.0, 3.0],
        [-1.0, 1.0, 1.0],
    ];
    let vb = VertexBuffer::from_slice(&quad);

    let vertex = |input: VsIn<'_, ()>, out: &mut VsOut<'_>| {
        let p: &[f64] = bytemuck::cast_slice(input.vertex);
        let w = p[2];
        out.position = Vec4::new(p[0] * w, p[1] * w, 0.0, w);
        out.varyings[0] = w;
    };

    let seen: Rc<RefCell<HashMap<(u64, u64), f64>>> = Rc::default();
    let shader_seen = Rc::clone(&seen);
    let fragment = move |input: FsIn<'_, ()>, out: &mut FsOut| {
        let key = (input.frag_coord.x as u64, input.frag_coord.y as u64);
        shader_seen.borrow_mut().insert(key, input.interpolated[0]);
        out.color = [1.0; 4];
    };

    let program = ShaderProgram {
        uniform: &(),
        vertex: &vertex,
        varyings: &[VaryingInfo::f64s(1)],
        fragment: &fragment,
    };
    ctx.draw_vertex_buffer(&vb, fb, &program, Primitive::Triangles, 0, 6);

    let result = seen.borrow().clone();
    result
}

#[test]
fn perspective_interpolation_blends_harmonically() {
    let mut ctx = Context::new();
    let mut fb = Framebuffer::new(4, 4);

    // Pixel column 1's center sits at the exact screen midpoint between the
    // w=1 and w=3 edges. Perspective-correct interpolation of an attribute
    // equal to w must give the harmonic mean 2·w₀·w₁/(w₀+w₁) = 1.5 there.
    let seen = draw_depth_varying_quad(&mut ctx, &mut fb);
    assert!((seen[&(1, 2)] - 1.5).abs() < 1e-9, "got {}", seen[&(1, 2)]);

    // Affine interpolation gives the screen-linear average instead.
    ctx.set_interpolation(Interpolation::Affine);
    fb.clear();
    let seen = draw_depth_varying_quad(&mut ctx, &mut fb);
    assert!((seen[&(1, 2)] - 2.0).abs() < 1e-9, "got {}", seen[&(1, 2)]);
}

// ── lines ─────────────────────────────────────────────────────────────────

#[test]
fn line_loop_closes_and_traces_the_border() {
    let mut ctx = Context::new();
    let mut fb = Framebuffer::new(5, 5);
    let vb = VertexBuffer::from_slice(&[
        [-1.0f64, -1.0, 0.0],
        [1.0, -1.0, 0.0],
        [1.0, 1.0, 0.0],
        [-1.0, 1.0, 0.0],
    ]);

    let ids: Rc<RefCell<HashSet<u64>>> = Rc::default();
    let vertex = |input: VsIn<'_, ()>, out: &mut VsOut<'_>| {
        let p: &[f64] = bytemuck::cast_slice(input.vertex);
        out.position = Vec4::new(p[0], p[1], p[2], 1.0);
    };
    let shader_ids = Rc::clone(&ids);
    let fragment = move |input: FsIn<'_, ()>, out: &mut FsOut| {
        assert!(input.front_facing, "lines are always front-facing");
        shader_ids.borrow_mut().insert(input.primitive_id);
        out.color = [1.0, 0.0, 0.0, 1.0];
    };
    let program = ShaderProgram {
        uniform: &(),
        vertex: &vertex,
        varyings: &[],
        fragment: &fragment,
    };

    // Winding conventions apply to triangles only; lines ignore them.
    ctx.set_front_face(FrontFace::Cw);
    ctx.set_cull_face(CullFace::Back);
    ctx.draw_vertex_buffer(&vb, &mut fb, &program, Primitive::LineLoop, 0, 4);

    // Four segments, the last returning to vertex 0.
    assert_eq!(*ids.borrow(), (0..4).collect::<HashSet<u64>>());

    // The loop traces the framebuffer border and leaves the interior alone.
    for y in 0..5 {
        for x in 0..5 {
            let on_border = x == 0 || x == 4 || y == 0 || y == 4;
            let drawn = fb.color_at(x, y) == RED;
            assert_eq!(drawn, on_border, "pixel ({x}, {y})");
        }
    }
}

#[test]
fn line_interpolation_is_perspective_correct_at_the_midpoint() {
    // A horizontal line from w = 1 to w = 3 with a varying equal to w.
    // Screen x = 4 (of 0..=8) is the exact midpoint: t = 1/2.
    let mut ctx = Context::new();
    let mut fb = Framebuffer::new(9, 9);
    let vb = VertexBuffer::from_slice(&[[-1.0f64, 1.0], [1.0, 3.0]]);

    let seen: Rc<RefCell<HashMap<u64, f64>>> = Rc::default();
    let vertex = |input: VsIn<'_, ()>, out: &mut VsOut<'_>| {
        let p: &[f64] = bytemuck::cast_slice(input.vertex);
        let w = p[1];
        out.position = Vec4::new(p[0] * w, 0.0, 0.0, w);
        out.varyings[0] = w;
    };
    let shader_seen = Rc::clone(&seen);
    let fragment = move |input: FsIn<'_, ()>, out: &mut FsOut| {
        shader_seen
            .borrow_mut()
            .insert(input.frag_coord.x as u64, input.interpolated[0]);
        out.color = [1.0; 4];
    };
    let program = ShaderProgram {
        uniform: &(),
        vertex: &vertex,
        varyings: &[VaryingInfo::f64s(1)],
        fragment: &fragment,
    };

    ctx.draw_vertex_buffer(&vb, &mut fb, &program, Primitive::Lines, 0, 2);
    assert!((seen.borrow()[&4] - 1.5).abs() < 1e-9);

    ctx.set_interpolation(Interpolation::Affine);
    seen.borrow_mut().clear();
    fb.clear();
    ctx.draw_vertex_buffer(&vb, &mut fb, &program, Primitive::Lines, 0, 2);
    assert!((seen.borrow()[&4] - 2.0).abs() < 1e-9);
}

#[test]
fn odd_vertex_count_for_lines_warns_and_drops_the_extra() {
    let messages: Rc<RefCell<Vec<(MessageType, MessageSeverity, String)>>> = Rc::default();

    let mut ctx = Context::new();
    let sink = Rc::clone(&messages);
    ctx.set_message_callback(Some(Box::new(move |m: &Message<'_>| {
        sink.borrow_mut().push((m.ty, m.severity, m.text.to_owned()));
    })));

    let mut fb = Framebuffer::new(4, 4);
    let vb = VertexBuffer::from_slice(&[
        [-1.0f64, -1.0, 0.0],
        [1.0, -1.0, 0.0],
        [1.0, 1.0, 0.0],
    ]);
    let vertex = |input: VsIn<'_, ()>, out: &mut VsOut<'_>| {
        let p: &[f64] = bytemuck::cast_slice(input.vertex);
        out.position = Vec4::new(p[0], p[1], p[2], 1.0);
    };
    let fragment = |_input: FsIn<'_, ()>, out: &mut FsOut| {
        out.color = [1.0; 4];
    };
    let program = ShaderProgram {
        uniform: &(),
        vertex: &vertex,
        varyings: &[],
        fragment: &fragment,
    };
    ctx.draw_vertex_buffer(&vb, &mut fb, &program, Primitive::Lines, 0, 3);

    let messages = messages.borrow();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, MessageType::Warning);
    assert_eq!(messages[0].1, MessageSeverity::Low);
}

// ── points ────────────────────────────────────────────────────────────────

#[test]
fn point_covers_a_square_and_passes_varyings_through() {
    let mut ctx = Context::new();
    ctx.set_point_size(3.0);
    let mut fb = Framebuffer::new(5, 5);
    let vb = VertexBuffer::from_slice(&[[0.0f64, 0.0, 0.0]]);

    let vertex = |input: VsIn<'_, ()>, out: &mut VsOut<'_>| {
        let p: &[f64] = bytemuck::cast_slice(input.vertex);
        out.position = Vec4::new(p[0], p[1], p[2], 1.0);
        out.varyings[0] = 7.0;
    };
    let fragment = |input: FsIn<'_, ()>, out: &mut FsOut| {
        // Point varyings come straight from the vertex shader.
        assert_eq!(input.interpolated[0], 7.0);
        out.color = [1.0, 0.0, 0.0, 1.0];
    };
    let program = ShaderProgram {
        uniform: &(),
        vertex: &vertex,
        varyings: &[VaryingInfo::f64s(1)],
        fragment: &fragment,
    };
    ctx.draw_vertex_buffer(&vb, &mut fb, &program, Primitive::Points, 0, 1);

    // Screen center (2, 2), size-3 square [0.5, 3.5): pixel centers 0.5,
    // 1.5, 2.5 fall inside on each axis.
    let expected: HashSet<(usize, usize)> = (0..3)
        .flat_map(|y| (0..3).map(move |x| (x, y)))
        .collect();
    assert_eq!(pixels_with_color(&fb, RED), expected);
}

#[test]
fn points_outside_the_view_volume_are_dropped() {
    let mut ctx = Context::new();
    ctx.set_point_size(4.0);
    let mut fb = Framebuffer::new(5, 5);
    let vb = VertexBuffer::from_slice(&[[2.5f64, 0.0, 0.0], [0.0, 0.0, 0.0]]);

    let vertex = |input: VsIn<'_, ()>, out: &mut VsOut<'_>| {
        let p: &[f64] = bytemuck::cast_slice(input.vertex);
        out.position = Vec4::new(p[0], p[1], p[2], 1.0);
    };
    let fragment = |input: FsIn<'_, ()>, out: &mut FsOut| {
        // Only the in-volume point survives, and its id counts survivors.
        assert_eq!(input.primitive_id, 0);
        out.color = [1.0, 0.0, 0.0, 1.0];
    };
    let program = ShaderProgram {
        uniform: &(),
        vertex: &vertex,
        varyings: &[],
        fragment: &fragment,
    };
    ctx.draw_vertex_buffer(&vb, &mut fb, &program, Primitive::Points, 0, 2);

    assert!(!pixels_with_color(&fb, RED).is_empty());
}

#[test]
fn zero_point_size_draws_nothing() {
    let mut ctx = Context::new();
    ctx.set_point_size(0.0);
    let mut fb = Framebuffer::new(5, 5);
    let vb = VertexBuffer::from_slice(&[[0.0f64, 0.0, 0.0]]);

    let vertex = |input: VsIn<'_, ()>, out: &mut VsOut<'_>| {
        let p: &[f64] = bytemuck::cast_slice(input.vertex);
        out.position = Vec4::new(p[0], p[1], p[2], 1.0);
    };
    let fragment = |_input: FsIn<'_, ()>, out: &mut FsOut| {
        out.color = [1.0; 4];
    };
    let program = ShaderProgram {
        uniform: &(),
        vertex: &vertex,
        varyings: &[],
        fragment: &fragment,
    };
    ctx.draw_vertex_buffer(&vb, &mut fb, &program, Primitive::Points, 0, 1);
    assert!(fb.color().iter().all(|&c| c == 0));
}

// ── draw validation ───────────────────────────────────────────────────────

#[test]
fn out_of_range_draw_reports_and_leaves_the_target_alone() {
    let messages: Rc<RefCell<Vec<(MessageType, MessageSeverity)>>> = Rc::default();

    let mut ctx = Context::new();
    let sink = Rc::clone(&messages);
    ctx.set_message_callback(Some(Box::new(move |m: &Message<'_>| {
        sink.borrow_mut().push((m.ty, m.severity));
    })));

    let mut fb = Framebuffer::new(4, 4);
    let vb = VertexBuffer::from_slice(&[
        [-1.0f64, -1.0, 0.0],
        [1.0, -1.0, 0.0],
        [0.0, 1.0, 0.0],
    ]);
    let vertex = |input: VsIn<'_, ()>, out: &mut VsOut<'_>| {
        let p: &[f64] = bytemuck::cast_slice(input.vertex);
        out.position = Vec4::new(p[0], p[1], p[2], 1.0);
    };
    let fragment = |_input: FsIn<'_, ()>, out: &mut FsOut| {
        out.color = [1.0; 4];
    };
    let program = ShaderProgram {
        uniform: &(),
        vertex: &vertex,
        varyings: &[],
        fragment: &fragment,
    };

    ctx.draw_vertex_buffer(&vb, &mut fb, &program, Primitive::Triangles, 1, 3);
    assert_eq!(
        *messages.borrow(),
        vec![(MessageType::Error, MessageSeverity::High)]
    );
    assert!(fb.color().iter().all(|&c| c == 0));

    // Index entries pointing past the vertex buffer are caught too.
    let ib = IndexBuffer::from_slice(&[0u8, 1, 9]);
    ctx.draw_index_buffer(&ib, &vb, &mut fb, &program, Primitive::Triangles, 0, 3);
    assert_eq!(messages.borrow().len(), 2);
    assert!(fb.color().iter().all(|&c| c == 0));

    // A zero count is an uneventful no-op.
    ctx.draw_vertex_buffer(&vb, &mut fb, &program, Primitive::Triangles, 0, 0);
    assert_eq!(messages.borrow().len(), 2);
}

// ── clipping end to end ───────────────────────────────────────────────────

#[test]
fn triangle_overhanging_the_volume_still_rasterizes_its_visible_part() {
    let mut ctx = Context::new();
    let mut fb = Framebuffer::new(4, 4);

    // Extends far past the right and top planes; the visible part covers the
    // upper-right NDC quadrant, which must rasterize without any stray
    // writes (the debug bounds asserts in draw_pixel would trip otherwise).
    draw_solid(
        &mut ctx,
        &mut fb,
        &[[0.0, 0.0, 0.0], [3.0, 0.0, 0.0], [0.0, 3.0, 0.0]],
        [1.0, 0.0, 0.0, 1.0],
    );

    let drawn = pixels_with_color(&fb, RED);
    assert!(!drawn.is_empty());
    // NDC x >= 0 maps to screen x >= 1.5, y <= 1.5: the upper-right block.
    assert!(drawn.iter().all(|&(x, y)| x >= 2 && y <= 1), "{drawn:?}");
}
