//! Line rasterization: a DDA walk over the screen-space segment.

use khepri_math::{Vec3, Vec4};

use crate::context::{Interpolation, RasterState};
use crate::framebuffer::Framebuffer;
use crate::pipeline::interpolation::{interpolate_position, interpolate_varyings};
use crate::pipeline::vertex_cache::ShadedVertex;
use crate::raster::fragment::emit_fragment;
use crate::shader::{FsIn, ShaderProgram};

/// A line after clipping, perspective divide and viewport mapping.
#[derive(Copy, Clone)]
pub(crate) struct Line<'a> {
    pub v: [ShadedVertex<'a>; 2],
    pub inv_w: [f64; 2],
    pub ss: [Vec3; 2],
    pub id: u64,
}

impl Line<'_> {
    pub const EMPTY: Line<'static> = Line {
        v: [ShadedVertex::EMPTY; 2],
        inv_w: [0.0; 2],
        ss: [Vec3::ZERO; 2],
        id: 0,
    };
}

/// Steps from endpoint 0 to endpoint 1 one pixel per step along the major
/// axis, interpolating position and varyings at each step.
pub(crate) fn rasterize<U>(
    line: &Line<'_>,
    fb: &mut Framebuffer,
    program: &ShaderProgram<'_, U>,
    state: RasterState,
    interpolated: &mut [f64],
) {
    let perspective = state.interpolation == Interpolation::Perspective;

    let dx = line.ss[1].x - line.ss[0].x;
    let dy = line.ss[1].y - line.ss[0].y;
    let steps = (dx.abs().max(dy.abs()).ceil() as i64).max(1);

    let x_inc = dx / steps as f64;
    let y_inc = dy / steps as f64;
    let t_inc = 1.0 / steps as f64;

    let mut x = line.ss[0].x;
    let mut y = line.ss[0].y;
    let mut t = 0.0;

    for _ in 0..=steps {
        let px = x.round() as i64;
        let py = y.round() as i64;

        // Clipping keeps endpoints in view; rounding can still graze the
        // boundary row/column.
        if px >= 0 && (px as usize) < fb.width() && py >= 0 && (py as usize) < fb.height() {
            let weights = [1.0 - t, t];
            let position = interpolate_position(&line.v, &weights, &line.inv_w, perspective);
            interpolate_varyings(
                &line.v,
                &weights,
                &line.inv_w,
                position.w,
                perspective,
                program.varyings,
                interpolated,
            );

            let fs_in = FsIn {
                uniform: program.uniform,
                interpolated,
                frag_coord: Vec4::new(
                    px as f64 + 0.5,
                    py as f64 + 0.5,
                    position.z,
                    position.w,
                ),
                front_facing: true,
                primitive_id: line.id,
            };
            emit_fragment(fb, program, px as usize, py as usize, fs_in);
        }

        x += x_inc;
        y += y_inc;
        t += t_inc;
    }
}
