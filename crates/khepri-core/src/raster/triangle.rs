//! Triangle setup and scanline rasterization.
//!
//! Setup runs after clipping: perspective divide, winding/cull resolution,
//! viewport mapping, then barycentric initialization at the first pixel
//! center of the bounding box. Traversal is incremental: two adds per
//! pixel per coordinate, no per-pixel edge equations.

use khepri_math::{Vec2, Vec3, Vec4};

use crate::context::{CullFace, FrontFace, Interpolation, RasterState};
use crate::framebuffer::Framebuffer;
use crate::pipeline::interpolation::{interpolate_position, interpolate_varyings};
use crate::pipeline::roughly_zero;
use crate::pipeline::vertex_cache::{perspective_divide, ShadedVertex};
use crate::raster::fragment::emit_fragment;
use crate::shader::{FsIn, ShaderProgram};

/// A triangle between clipping and rasterization. Vertices hold clip-space
/// positions until [`setup`] rewrites them to NDC.
#[derive(Copy, Clone)]
pub(crate) struct Triangle<'a> {
    pub v: [ShadedVertex<'a>; 3],
    pub inv_w: [f64; 3],
    /// Screen-space positions (pixel units, z carried through).
    pub ss: [Vec3; 3],
    /// `ss[(i+1) % 3] - ss[i]`, CCW once setup is done.
    pub edge: [Vec3; 3],
    /// Whether `edge[i]` is a flat-top or left edge (fill-rule tie-break).
    pub edge_tl: [bool; 3],
    /// Pixel-space bounding box, `min` floored, `max` ceiled, clamped to the
    /// framebuffer.
    pub min_bp: Vec2,
    pub max_bp: Vec2,
    /// Barycentric coordinates at the current pixel center, their row-start
    /// values, and their per-pixel steps.
    pub lambda: [f64; 3],
    pub lambda_row: [f64; 3],
    pub dldx: [f64; 3],
    pub dldy: [f64; 3],
    pub front_facing: bool,
    pub id: u64,
}

impl<'a> Triangle<'a> {
    pub const EMPTY: Triangle<'static> = Triangle {
        v: [ShadedVertex::EMPTY; 3],
        inv_w: [0.0; 3],
        ss: [Vec3::ZERO; 3],
        edge: [Vec3::ZERO; 3],
        edge_tl: [false; 3],
        min_bp: Vec2::ZERO,
        max_bp: Vec2::ZERO,
        lambda: [0.0; 3],
        lambda_row: [0.0; 3],
        dldx: [0.0; 3],
        dldy: [0.0; 3],
        front_facing: false,
        id: 0,
    };

    pub fn from_vertices(v: [ShadedVertex<'a>; 3]) -> Triangle<'a> {
        let mut tri: Triangle<'a> = Triangle::EMPTY;
        tri.v = v;
        tri
    }
}

/// Signed area of the parallelogram spanned by `a` and `b`, in the xy plane.
#[inline]
fn signed_area(a: Vec3, b: Vec3) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Prepares a clipped triangle for traversal: divide, cull, viewport-map,
/// bounding box, barycentric increments. Returns `false` when the triangle
/// produces no fragments (culled or degenerate).
pub(crate) fn setup(tri: &mut Triangle<'_>, fb: &Framebuffer, state: RasterState) -> bool {
    for i in 0..3 {
        tri.inv_w[i] = perspective_divide(&mut tri.v[i].position);
    }

    if resolve_facing_and_cull(tri, state) {
        return false;
    }

    for i in 0..3 {
        tri.ss[i] = fb.ndc_to_screen(tri.v[i].position.xyz());
    }
    for i in 0..3 {
        tri.edge[i] = tri.ss[(i + 1) % 3] - tri.ss[i];
    }

    // Degenerate in screen space: no pixel can be covered.
    let area_x2 = signed_area(tri.edge[0], tri.edge[2]).abs();
    if roughly_zero(area_x2) {
        return false;
    }

    let min_x = tri.ss[0].x.min(tri.ss[1].x).min(tri.ss[2].x).floor();
    let min_y = tri.ss[0].y.min(tri.ss[1].y).min(tri.ss[2].y).floor();
    let max_x = tri.ss[0].x.max(tri.ss[1].x).max(tri.ss[2].x).ceil();
    let max_y = tri.ss[0].y.max(tri.ss[1].y).max(tri.ss[2].y).ceil();
    tri.min_bp = Vec2::new(min_x.max(0.0), min_y.max(0.0));
    tri.max_bp = Vec2::new(
        max_x.min(fb.width() as f64),
        max_y.min(fb.height() as f64),
    );

    init_barycentrics(
        tri,
        area_x2,
        Vec2::new(tri.min_bp.x + 0.5, tri.min_bp.y + 0.5),
    );

    for i in 0..3 {
        tri.lambda_row[i] = tri.lambda[i];
        tri.edge_tl[i] = is_edge_flat_top_or_left(tri.edge[i]);
    }

    true
}

/// Decides front-facing from the NDC winding and the context's front-face
/// convention, and applies the cull policy. Rewinds CW triangles to CCW so
/// everything downstream can assume counter-clockwise order. Returns `true`
/// when the triangle is culled.
fn resolve_facing_and_cull(tri: &mut Triangle<'_>, state: RasterState) -> bool {
    let ndc = tri.v.map(|v| v.position.xyz());
    let area = signed_area(ndc[1] - ndc[0], ndc[2] - ndc[0]);
    let ccw = area > 0.0;

    // Normally short-circuited by the dispatcher.
    if state.cull_face == CullFace::FrontAndBack {
        return true;
    }

    let front_facing = (area > 0.0 && state.front_face == FrontFace::Ccw)
        || (area < 0.0 && state.front_face == FrontFace::Cw);
    let cull = (front_facing && state.cull_face == CullFace::Front)
        || (!front_facing && state.cull_face == CullFace::Back);
    if cull {
        return true;
    }

    tri.front_facing = front_facing;
    if !ccw {
        tri.v.swap(1, 2);
        tri.inv_w.swap(1, 2);
    }
    false
}

fn init_barycentrics(tri: &mut Triangle<'_>, area_x2: f64, point: Vec2) {
    let ap = Vec3::new(point.x - tri.ss[0].x, point.y - tri.ss[0].y, 0.0);
    let bp = Vec3::new(point.x - tri.ss[1].x, point.y - tri.ss[1].y, 0.0);
    let cp = Vec3::new(point.x - tri.ss[2].x, point.y - tri.ss[2].y, 0.0);

    // λᵢ is proportional to the area of the sub-triangle opposite vertex i;
    // each vanishes along the edge that does not touch its vertex.
    tri.lambda[0] = signed_area(bp, tri.edge[1]) / area_x2;
    tri.lambda[1] = signed_area(cp, tri.edge[2]) / area_x2;
    tri.lambda[2] = signed_area(ap, tri.edge[0]) / area_x2;

    tri.dldx[0] = tri.edge[1].y / area_x2;
    tri.dldx[1] = tri.edge[2].y / area_x2;
    tri.dldx[2] = tri.edge[0].y / area_x2;

    tri.dldy[0] = -tri.edge[1].x / area_x2;
    tri.dldy[1] = -tri.edge[2].x / area_x2;
    tri.dldy[2] = -tri.edge[0].x / area_x2;
}

/// Top-left classification, assuming CCW vertex order (+y down in screen
/// space): flat-top edges run in +x, left edges run in -y.
#[inline]
fn is_edge_flat_top_or_left(edge: Vec3) -> bool {
    (edge.x > 0.0 && roughly_zero(edge.y)) || edge.y < 0.0
}

/// Walks the bounding box in scanline order and emits a fragment for every
/// covered pixel center. `interpolated` is the per-draw varying scratch row.
pub(crate) fn rasterize<U>(
    tri: &mut Triangle<'_>,
    fb: &mut Framebuffer,
    program: &ShaderProgram<'_, U>,
    state: RasterState,
    interpolated: &mut [f64],
) {
    let perspective = state.interpolation == Interpolation::Perspective;
    let (x0, x1) = (tri.min_bp.x as i64, tri.max_bp.x as i64);
    let (y0, y1) = (tri.min_bp.y as i64, tri.max_bp.y as i64);

    for y in y0..y1 {
        for x in x0..x1 {
            // Fill-rule tie-break: a pixel center exactly on an edge belongs
            // to this triangle only if that edge is flat-top or left.
            let on_untied_edge = (0..3).any(|i| roughly_zero(tri.lambda[i]) && !tri.edge_tl[i]);

            if !on_untied_edge && tri.lambda.iter().all(|&l| l >= 0.0) {
                let position =
                    interpolate_position(&tri.v, &tri.lambda, &tri.inv_w, perspective);
                interpolate_varyings(
                    &tri.v,
                    &tri.lambda,
                    &tri.inv_w,
                    position.w,
                    perspective,
                    program.varyings,
                    interpolated,
                );

                let fs_in = FsIn {
                    uniform: program.uniform,
                    interpolated,
                    frag_coord: Vec4::new(
                        x as f64 + 0.5,
                        y as f64 + 0.5,
                        position.z,
                        position.w,
                    ),
                    front_facing: tri.front_facing,
                    primitive_id: tri.id,
                };
                emit_fragment(fb, program, x as usize, y as usize, fs_in);
            }

            for i in 0..3 {
                tri.lambda[i] += tri.dldx[i];
            }
        }
        for i in 0..3 {
            tri.lambda_row[i] += tri.dldy[i];
            tri.lambda[i] = tri.lambda_row[i];
        }
    }
}
