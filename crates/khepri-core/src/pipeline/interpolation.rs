//! Attribute interpolation shared by the clipper and the rasterizers.
//!
//! With barycentric (or segment) weights `λᵢ` and per-vertex `1/wᵢ`, an
//! affinely interpolated attribute is `Σ aᵢ·λᵢ`. That ignores the
//! perspective divide, so e.g. textures swim on receding surfaces; the
//! perspective-correct value is `w·Σ aᵢ·(1/wᵢ)·λᵢ` where
//! `w = 1 / Σ (1/wᵢ)·λᵢ`: attributes are interpolated as `a/w` and
//! un-divided at the end.
//!
//! Reference: Low, "Perspective-Correct Interpolation" (tech report).

use khepri_math::Vec4;

use crate::pipeline::vertex_cache::ShadedVertex;
use crate::shader::{VaryingInfo, VaryingKind};

/// Interpolates the fragment position. `x`, `y` and `z` are linear in screen
/// space, so they use the plain weighted sum either way; `w` carries the
/// perspective-interpolated clip w (1 in affine mode).
pub(crate) fn interpolate_position(
    vertices: &[ShadedVertex<'_>],
    weights: &[f64],
    inv_w: &[f64],
    perspective: bool,
) -> Vec4 {
    let mut position = Vec4::ZERO;
    for (v, &weight) in vertices.iter().zip(weights) {
        position = position + v.position * weight;
    }

    position.w = if perspective {
        let inv: f64 = inv_w
            .iter()
            .zip(weights)
            .map(|(&iw, &weight)| iw * weight)
            .sum();
        1.0 / inv
    } else {
        1.0
    };
    position
}

/// Interpolates every declared varying into `out` (same layout the vertex
/// shader wrote). `w_interp` is the perspective-interpolated w for this
/// fragment; unused in affine mode.
pub(crate) fn interpolate_varyings(
    vertices: &[ShadedVertex<'_>],
    weights: &[f64],
    inv_w: &[f64],
    w_interp: f64,
    perspective: bool,
    infos: &[VaryingInfo],
    out: &mut [f64],
) {
    let mut offset = 0;
    for info in infos {
        match info.kind {
            VaryingKind::F64 => {
                for elem in offset..offset + info.count {
                    let mut sum = 0.0;
                    if perspective {
                        for ((v, &weight), &iw) in vertices.iter().zip(weights).zip(inv_w) {
                            sum += v.varyings[elem] * iw * weight;
                        }
                        sum *= w_interp;
                    } else {
                        for (v, &weight) in vertices.iter().zip(weights) {
                            sum += v.varyings[elem] * weight;
                        }
                    }
                    out[elem] = sum;
                }
            }
        }
        offset += info.count;
    }
}
