//! khepri-core: a CPU-only, programmable software rendering pipeline.
//!
//! The pipeline transforms user-supplied vertex streams into pixels in a
//! color + depth [`Framebuffer`] through a fixed sequence of stages: vertex
//! shading (with a post-transform cache), primitive assembly by topology,
//! homogeneous-space clipping, perspective divide and viewport mapping,
//! back-face culling, rasterization with perspective-correct attribute
//! interpolation, and per-fragment shading with a depth test.
//!
//! All per-draw scratch memory comes from an arena owned by the [`Context`]
//! and is released in one reset at the end of each draw call. The whole
//! pipeline is single-threaded by design.

pub mod buffer;
pub mod color;
pub mod context;
pub mod framebuffer;
pub mod logging;
pub mod message;
pub mod shader;
pub mod texture;

mod memory;
mod pipeline;
mod raster;

pub use buffer::{IndexBuffer, VertexBuffer};
pub use color::Color;
pub use context::{Context, CullFace, FrontFace, Interpolation};
pub use framebuffer::Framebuffer;
pub use message::{Message, MessageSeverity, MessageType};
pub use pipeline::Primitive;
pub use shader::{FsIn, FsOut, ShaderProgram, VaryingInfo, VaryingKind, VsIn, VsOut};
pub use texture::{FilterMode, Texture, TextureError, WrapMode};
