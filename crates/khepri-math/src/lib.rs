//! Value-type math for the khepri software renderer.
//!
//! Plain `f64` vectors and a row-major 4×4 matrix with the usual constructors
//! and operators. Everything is `Copy`; nothing allocates.

mod mat4;
mod vec2;
mod vec3;
mod vec4;

pub use mat4::Mat4;
pub use vec2::Vec2;
pub use vec3::Vec3;
pub use vec4::Vec4;
