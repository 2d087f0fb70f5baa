//! Shader program surface: user closures plus the varying layout they share.
//!
//! Shaders are opaque callbacks. The vertex shader reads its vertex's raw
//! bytes (interpret them however you like, `bytemuck` being the usual tool)
//! and writes a clip-space position plus a row of `f64` varyings; the
//! fragment shader reads the interpolated varyings and writes a color. The
//! uniform is an arbitrary user type threaded through both, unchanged.

use khepri_math::Vec4;

/// Element kind of one varying. Only `f64` exists today; the enum keeps the
/// wire format open for extension.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum VaryingKind {
    F64,
}

/// Layout of one vertex-shader output variable: `count` elements of `kind`,
/// packed in declaration order into a single contiguous row.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VaryingInfo {
    pub count: usize,
    pub kind: VaryingKind,
}

impl VaryingInfo {
    pub const fn f64s(count: usize) -> VaryingInfo {
        VaryingInfo {
            count,
            kind: VaryingKind::F64,
        }
    }
}

/// Total `f64` words one vertex's varyings occupy.
pub(crate) fn varying_len(infos: &[VaryingInfo]) -> usize {
    infos.iter().map(|info| info.count).sum()
}

/// Vertex shader input.
pub struct VsIn<'a, U> {
    pub uniform: &'a U,
    /// This vertex's bytes in the vertex buffer (`stride` bytes long).
    pub vertex: &'a [u8],
    pub vertex_id: u64,
}

impl<U> Clone for VsIn<'_, U> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<U> Copy for VsIn<'_, U> {}

/// Vertex shader output: a clip-space position and this vertex's varying row
/// (laid out per [`ShaderProgram::varyings`], zeroed on entry).
pub struct VsOut<'a> {
    pub position: Vec4,
    pub varyings: &'a mut [f64],
}

/// Fragment shader input.
pub struct FsIn<'a, U> {
    pub uniform: &'a U,
    /// Varyings interpolated at this fragment, same layout as the vertex
    /// shader wrote.
    pub interpolated: &'a [f64],
    /// Window-space coordinates: pixel-center x and y, interpolated depth,
    /// and the perspective-interpolated clip w (1 in affine mode).
    pub frag_coord: Vec4,
    pub front_facing: bool,
    pub primitive_id: u64,
}

impl<U> Clone for FsIn<'_, U> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<U> Copy for FsIn<'_, U> {}

/// Fragment shader output.
pub struct FsOut {
    /// RGBA channels in `[0, 1]`; out-of-range values are clamped on write.
    pub color: [f64; 4],
    /// Overrides the fragment's depth when set. Defaults to NaN, which means
    /// "use `frag_coord.z`".
    pub frag_depth: f64,
}

/// Shaders, their varying layout, and the uniform they share. Not a compiled
/// program in any sense; the name keeps the GL analogy.
///
/// The program only borrows its parts, so construction is free and the same
/// closures can be reused across programs.
pub struct ShaderProgram<'p, U> {
    pub uniform: &'p U,
    pub vertex: &'p dyn Fn(VsIn<'_, U>, &mut VsOut<'_>),
    /// Layout of the vertex shader's output variables.
    pub varyings: &'p [VaryingInfo],
    pub fragment: &'p dyn Fn(FsIn<'_, U>, &mut FsOut),
}

impl<U> ShaderProgram<'_, U> {
    #[inline]
    pub(crate) fn varying_len(&self) -> usize {
        varying_len(self.varyings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varying_len_sums_declared_counts() {
        let infos = [VaryingInfo::f64s(2), VaryingInfo::f64s(3), VaryingInfo::f64s(1)];
        assert_eq!(varying_len(&infos), 6);
        assert_eq!(varying_len(&[]), 0);
    }
}
