//! Clipping against the canonical view volume, in homogeneous clip space
//! (before the perspective divide, where the volume is `|x|,|y|,|z| <= w`).
//!
//! Triangles go through Sutherland–Hodgman against the six planes and are
//! fan-triangulated; lines go through Liang–Barsky. Both interpolate
//! varyings with the same affine weights as positions, allocating fresh
//! varying rows from the draw arena so the clip output owns its data
//! independently of the vertex cache.

use khepri_math::Vec4;

use crate::memory::Arena;
use crate::pipeline::interpolation::interpolate_varyings;
use crate::pipeline::vertex_cache::ShadedVertex;
use crate::pipeline::EPSILON;
use crate::shader::VaryingInfo;

/// Upper bound on polygon vertices while clipping one triangle. Each of the
/// six planes can add at most one vertex to the polygon (worst case 9);
/// sized generously.
pub(crate) const MAX_CLIP_VERTICES: usize = 16;

/// Most triangles one clipped triangle can fan out into.
pub(crate) const MAX_CLIPPED_TRIANGLES: usize = MAX_CLIP_VERTICES - 2;

#[derive(Debug, Copy, Clone)]
enum ClipPlane {
    Left,
    Right,
    Bottom,
    Top,
    Near,
    Far,
}

const CLIP_PLANES: [ClipPlane; 6] = [
    ClipPlane::Left,
    ClipPlane::Right,
    ClipPlane::Bottom,
    ClipPlane::Top,
    ClipPlane::Near,
    ClipPlane::Far,
];

/// Signed distance to a plane's half-space; positive is inside.
#[inline]
fn distance(p: Vec4, plane: ClipPlane) -> f64 {
    match plane {
        ClipPlane::Left => p.x + p.w,
        ClipPlane::Right => p.w - p.x,
        ClipPlane::Bottom => p.y + p.w,
        ClipPlane::Top => p.w - p.y,
        ClipPlane::Near => p.z + p.w,
        ClipPlane::Far => p.w - p.z,
    }
}

/// Whether a clip-space position lies inside the whole view volume.
#[inline]
pub(crate) fn inside_view_volume(p: Vec4) -> bool {
    CLIP_PLANES.iter().all(|&plane| distance(p, plane) >= 0.0)
}

fn deep_copy<'a>(arena: &'a Arena, v: ShadedVertex<'_>) -> ShadedVertex<'a> {
    let varyings = arena.alloc_slice(v.varyings.len(), 0.0);
    varyings.copy_from_slice(v.varyings);
    ShadedVertex {
        position: v.position,
        varyings,
    }
}

/// The vertex at parameter `t` along the edge `a → b`, varyings included.
fn interpolate_vertex<'a>(
    arena: &'a Arena,
    infos: &[VaryingInfo],
    a: ShadedVertex<'_>,
    b: ShadedVertex<'_>,
    t: f64,
) -> ShadedVertex<'a> {
    let position = a.position * (1.0 - t) + b.position * t;
    let varyings = arena.alloc_slice(a.varyings.len(), 0.0);
    interpolate_varyings(
        &[a, b],
        &[1.0 - t, t],
        &[1.0, 1.0],
        1.0,
        false, // clip space: always affine
        infos,
        varyings,
    );
    ShadedVertex { position, varyings }
}

/// Clips a triangle against all six planes and fan-triangulates the
/// resulting polygon into `out`. Returns the number of triangles written;
/// 0 means fully clipped.
///
/// The output vertices' varyings are owned by the arena, never by the
/// vertex cache, so later stages may treat them as this primitive's own.
pub(crate) fn clip_triangle<'a>(
    arena: &'a Arena,
    infos: &[VaryingInfo],
    vertices: [ShadedVertex<'a>; 3],
    out: &mut [[ShadedVertex<'a>; 3]; MAX_CLIPPED_TRIANGLES],
) -> usize {
    let mut poly = [ShadedVertex::EMPTY; MAX_CLIP_VERTICES];
    let mut scratch = [ShadedVertex::EMPTY; MAX_CLIP_VERTICES];
    let mut len = 3;
    for (slot, v) in poly.iter_mut().zip(vertices) {
        *slot = deep_copy(arena, v);
    }

    for plane in CLIP_PLANES {
        len = clip_against_plane(arena, infos, &poly[..len], plane, &mut scratch);
        if len == 0 {
            return 0;
        }
        poly[..len].copy_from_slice(&scratch[..len]);
    }

    // A sliver grazing the volume can come out with fewer than 3 vertices;
    // nothing to triangulate then.
    if len < 3 {
        return 0;
    }
    for i in 1..len - 1 {
        out[i - 1] = [poly[0], poly[i], poly[i + 1]];
    }
    len - 2
}

fn clip_against_plane<'a>(
    arena: &'a Arena,
    infos: &[VaryingInfo],
    poly: &[ShadedVertex<'a>],
    plane: ClipPlane,
    out: &mut [ShadedVertex<'a>; MAX_CLIP_VERTICES],
) -> usize {
    let mut out_len = 0;
    let mut push = |v: ShadedVertex<'a>, out: &mut [ShadedVertex<'a>; MAX_CLIP_VERTICES]| {
        debug_assert!(out_len < MAX_CLIP_VERTICES);
        out[out_len] = v;
        out_len += 1;
    };

    for i in 0..poly.len() {
        let current = poly[i];
        let next = poly[(i + 1) % poly.len()];
        let da = distance(current.position, plane);
        let db = distance(next.position, plane);
        let current_in = da > 0.0;
        let next_in = db > 0.0;

        if current_in != next_in && (da - db).abs() > EPSILON {
            let t = da / (da - db);
            push(interpolate_vertex(arena, infos, current, next, t), out);
        }
        if next_in {
            push(deep_copy(arena, next), out);
        }
    }

    out_len
}

/// Clips a line with Liang–Barsky. Returns the clipped endpoints, or `None`
/// when the segment misses the view volume entirely.
pub(crate) fn clip_line<'a>(
    arena: &'a Arena,
    infos: &[VaryingInfo],
    vertices: [ShadedVertex<'a>; 2],
) -> Option<[ShadedVertex<'a>; 2]> {
    let [a, b] = vertices;
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;

    for plane in CLIP_PLANES {
        let da = distance(a.position, plane);
        let db = distance(b.position, plane);
        if da < 0.0 && db < 0.0 {
            return None;
        }
        if (da < 0.0) != (db < 0.0) && (da - db).abs() > EPSILON {
            let t = da / (da - db);
            if da < 0.0 {
                t0 = t0.max(t); // entering
            } else {
                t1 = t1.min(t); // exiting
            }
        }
        if t0 > t1 {
            return None;
        }
    }

    let mut clipped = [a, b];
    if t0 > 0.0 {
        clipped[0] = interpolate_vertex(arena, infos, a, b, t0);
    }
    if t1 < 1.0 {
        clipped[1] = interpolate_vertex(arena, infos, a, b, t1);
    }
    Some(clipped)
}
