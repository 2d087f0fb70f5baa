//! The pipeline context: rasterizer state, diagnostics, scratch memory, and
//! the draw entry points.

use crate::buffer::{IndexBuffer, VertexBuffer};
use crate::framebuffer::Framebuffer;
use crate::memory::Arena;
use crate::message::{Message, MessageSink};
use crate::pipeline::{self, Primitive};
use crate::shader::ShaderProgram;

/// How varyings are interpolated across a primitive.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Interpolation {
    /// Perspective-correct (weights divided by clip w). The default.
    Perspective,
    /// Plain barycentric/linear weights in screen space.
    Affine,
}

/// Which winding order counts as front-facing.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrontFace {
    Ccw,
    Cw,
}

/// Which triangle faces are discarded before rasterization.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CullFace {
    None,
    Front,
    Back,
    FrontAndBack,
}

/// Snapshot of the rasterizer state taken at the start of a draw call.
#[derive(Debug, Copy, Clone)]
pub(crate) struct RasterState {
    pub interpolation: Interpolation,
    pub front_face: FrontFace,
    pub cull_face: CullFace,
    pub point_size: f64,
}

/// Owns everything a draw call needs besides its buffers: rasterizer state,
/// the message callback, and the per-draw arena.
///
/// A flat record with plain accessors; there is no bind/unbind protocol.
/// Draw calls borrow the context mutably, so concurrent draws on one context
/// are ruled out at compile time.
pub struct Context {
    interpolation: Interpolation,
    front_face: FrontFace,
    cull_face: CullFace,
    point_size: f64,
    messages: MessageSink,
    arena: Arena,
}

impl Default for Context {
    fn default() -> Self {
        Context {
            interpolation: Interpolation::Perspective,
            front_face: FrontFace::Ccw,
            cull_face: CullFace::None,
            point_size: 1.0,
            messages: MessageSink::default(),
            arena: Arena::new(),
        }
    }
}

impl Context {
    pub fn new() -> Context {
        Context::default()
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn set_interpolation(&mut self, mode: Interpolation) {
        self.interpolation = mode;
    }

    pub fn front_face(&self) -> FrontFace {
        self.front_face
    }

    pub fn set_front_face(&mut self, front_face: FrontFace) {
        self.front_face = front_face;
    }

    pub fn cull_face(&self) -> CullFace {
        self.cull_face
    }

    pub fn set_cull_face(&mut self, cull_face: CullFace) {
        self.cull_face = cull_face;
    }

    pub fn point_size(&self) -> f64 {
        self.point_size
    }

    /// Side length, in pixels, of the square a point primitive covers.
    pub fn set_point_size(&mut self, point_size: f64) {
        self.point_size = point_size;
    }

    /// Installs (or clears) the diagnostic callback. Without one, messages
    /// are routed to the `log` facade.
    pub fn set_message_callback(&mut self, callback: Option<Box<dyn FnMut(&Message<'_>)>>) {
        self.messages.set_callback(callback);
    }

    /// Draws `count` vertices starting at `start_index`, reading the stream
    /// directly from the vertex buffer.
    pub fn draw_vertex_buffer<U>(
        &mut self,
        vb: &VertexBuffer,
        fb: &mut Framebuffer,
        program: &ShaderProgram<'_, U>,
        primitive: Primitive,
        start_index: usize,
        count: usize,
    ) {
        self.draw(None, vb, fb, program, primitive, start_index, count);
    }

    /// Draws `count` stream entries starting at `start_index`, resolving
    /// vertex ids through the index buffer.
    pub fn draw_index_buffer<U>(
        &mut self,
        ib: &IndexBuffer,
        vb: &VertexBuffer,
        fb: &mut Framebuffer,
        program: &ShaderProgram<'_, U>,
        primitive: Primitive,
        start_index: usize,
        count: usize,
    ) {
        self.draw(Some(ib), vb, fb, program, primitive, start_index, count);
    }

    #[allow(clippy::too_many_arguments)]
    fn draw<U>(
        &mut self,
        ib: Option<&IndexBuffer>,
        vb: &VertexBuffer,
        fb: &mut Framebuffer,
        program: &ShaderProgram<'_, U>,
        primitive: Primitive,
        start_index: usize,
        count: usize,
    ) {
        let state = RasterState {
            interpolation: self.interpolation,
            front_face: self.front_face,
            cull_face: self.cull_face,
            point_size: self.point_size,
        };

        {
            let Context {
                ref arena,
                ref mut messages,
                ..
            } = *self;
            pipeline::draw::draw_buffer(
                arena,
                messages,
                state,
                ib,
                vb,
                fb,
                program,
                primitive,
                start_index,
                count,
            );
        }

        // Everything the pipeline allocated dies here; the next draw starts
        // from a clean first page.
        self.arena.reset();
    }
}
