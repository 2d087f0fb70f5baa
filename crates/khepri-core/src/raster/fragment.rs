//! The last stage: run the fragment shader, depth-test, write the pixel.

use crate::color::Color;
use crate::framebuffer::Framebuffer;
use crate::shader::{FsIn, FsOut, ShaderProgram};

/// Runs the fragment shader for one fragment and writes the pixel if it
/// survives the depth test. `(x, y)` must be inside the framebuffer.
pub(crate) fn emit_fragment<U>(
    fb: &mut Framebuffer,
    program: &ShaderProgram<'_, U>,
    x: usize,
    y: usize,
    fs_in: FsIn<'_, U>,
) {
    let mut out = FsOut {
        color: [0.0; 4],
        frag_depth: f64::NAN,
    };
    (program.fragment)(fs_in, &mut out);

    // NaN means the shader did not override the depth.
    let depth = if out.frag_depth.is_nan() {
        fs_in.frag_coord.z
    } else {
        out.frag_depth
    };

    if fb.depth_test(x, y, depth) {
        fb.draw_pixel(x, y, depth, Color::from_unit(out.color).to_u32());
    }
}
