//! Point rasterization: square coverage around the mapped vertex.

use khepri_math::Vec4;

use crate::context::RasterState;
use crate::framebuffer::Framebuffer;
use crate::pipeline::vertex_cache::ShadedVertex;
use crate::raster::fragment::emit_fragment;
use crate::shader::{FsIn, ShaderProgram};

/// A point after the perspective divide. `clip_w` is the pre-divide w,
/// surfaced to the fragment shader as `frag_coord.w`.
#[derive(Copy, Clone)]
pub(crate) struct Point<'a> {
    pub v: ShadedVertex<'a>,
    pub clip_w: f64,
    pub id: u64,
}

impl Point<'_> {
    pub const EMPTY: Point<'static> = Point {
        v: ShadedVertex::EMPTY,
        clip_w: 1.0,
        id: 0,
    };
}

/// Emits a fragment for every pixel center inside the `point_size` square
/// centered on the vertex's screen position. Varyings pass straight through
/// from the vertex shader, no interpolation.
pub(crate) fn rasterize<U>(
    point: &Point<'_>,
    fb: &mut Framebuffer,
    program: &ShaderProgram<'_, U>,
    state: RasterState,
) {
    let ss = fb.ndc_to_screen(point.v.position.xyz());
    let half = state.point_size * 0.5;

    let min = (ss.x - half, ss.y - half);
    let max = (ss.x + half, ss.y + half);

    // Integer pixel bounds, clipped to the framebuffer.
    let min_x = (min.0.floor() as i64).max(0);
    let min_y = (min.1.floor() as i64).max(0);
    let max_x = (max.0.floor() as i64).min(fb.width() as i64 - 1);
    let max_y = (max.1.floor() as i64).min(fb.height() as i64 - 1);

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let cx = x as f64 + 0.5;
            let cy = y as f64 + 0.5;

            // Half-open square: a center exactly on the max edge is out.
            if cx < min.0 || cx >= max.0 || cy < min.1 || cy >= max.1 {
                continue;
            }

            let fs_in = FsIn {
                uniform: program.uniform,
                interpolated: point.v.varyings,
                frag_coord: Vec4::new(cx, cy, point.v.position.z, point.clip_w),
                front_facing: true,
                primitive_id: point.id,
            };
            emit_fragment(fb, program, x as usize, y as usize, fs_in);
        }
    }
}
