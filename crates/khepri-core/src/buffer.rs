//! Vertex and index buffers.
//!
//! A [`VertexBuffer`] is an opaque byte blob plus a stride: the pipeline
//! never interprets vertex contents, the user's vertex shader does (typically
//! by viewing its slice through `bytemuck`). An [`IndexBuffer`] stores
//! unsigned indices of one of four element widths; reads are widened to
//! `u64`.

use bytemuck::Pod;

/// Opaque-typed vertex storage, analogous to a GL vertex buffer object.
///
/// The blob is kept 8-byte aligned so that a vertex shader whose stride is a
/// multiple of 8 can view its slice through `bytemuck::cast_slice` without an
/// alignment failure.
#[derive(Debug, Default, Clone)]
pub struct VertexBuffer {
    words: Vec<u64>,
    len: usize,
    stride: usize,
}

impl VertexBuffer {
    pub fn new() -> VertexBuffer {
        VertexBuffer::default()
    }

    /// Builds a buffer from a slice of plain-old-data vertices; the stride is
    /// the element size.
    pub fn from_slice<T: Pod>(vertices: &[T]) -> VertexBuffer {
        let mut vb = VertexBuffer::new();
        vb.copy_data(size_of::<T>(), bytemuck::cast_slice(vertices));
        vb
    }

    /// Replaces the buffer contents, reusing the existing allocation when it
    /// is large enough. `data.len()` should be a multiple of
    /// `bytes_per_vertex`; a trailing partial vertex is dropped.
    pub fn copy_data(&mut self, bytes_per_vertex: usize, data: &[u8]) {
        assert!(bytes_per_vertex > 0, "vertex stride must be non-zero");
        if data.len() % bytes_per_vertex != 0 {
            log::warn!(
                target: "khepri",
                "vertex data length {} is not a multiple of the stride {}; \
                 the trailing bytes are ignored",
                data.len(),
                bytes_per_vertex
            );
        }
        self.words.clear();
        self.words.resize(data.len().div_ceil(8), 0);
        bytemuck::cast_slice_mut(&mut self.words)[..data.len()].copy_from_slice(data);
        self.len = data.len();
        self.stride = bytes_per_vertex;
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        if self.stride == 0 {
            0
        } else {
            self.len / self.stride
        }
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    fn bytes(&self) -> &[u8] {
        &bytemuck::cast_slice(&self.words)[..self.len]
    }

    /// The raw bytes of one vertex.
    #[inline]
    pub(crate) fn vertex(&self, index: u64) -> &[u8] {
        let at = index as usize * self.stride;
        &self.bytes()[at..at + self.stride]
    }
}

/// An index element type accepted by [`IndexBuffer::copy_data`].
///
/// Sealed: exactly `u8`, `u16`, `u32` and `u64` are supported.
pub trait IndexElement: Pod + sealed::Sealed {
    #[doc(hidden)]
    fn widen(self) -> u64;
    #[doc(hidden)]
    fn store(data: &[Self]) -> IndexData;
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
    impl Sealed for u64 {}
}

macro_rules! impl_index_element {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(impl IndexElement for $ty {
            fn widen(self) -> u64 {
                self as u64
            }
            fn store(data: &[Self]) -> IndexData {
                IndexData::$variant(data.to_vec())
            }
        })+
    };
}

impl_index_element!(u8 => U8, u16 => U16, u32 => U32, u64 => U64);

/// Tagged index storage; one variant per supported element width.
#[derive(Debug, Clone)]
pub enum IndexData {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
}

/// Element-typed index storage, analogous to a GL element buffer object.
#[derive(Debug, Clone)]
pub struct IndexBuffer {
    data: IndexData,
}

impl Default for IndexBuffer {
    fn default() -> Self {
        IndexBuffer {
            data: IndexData::U8(Vec::new()),
        }
    }
}

impl IndexBuffer {
    pub fn new() -> IndexBuffer {
        IndexBuffer::default()
    }

    pub fn from_slice<I: IndexElement>(indices: &[I]) -> IndexBuffer {
        let mut ib = IndexBuffer::new();
        ib.copy_data(indices);
        ib
    }

    /// Replaces the buffer contents with indices of element type `I`.
    pub fn copy_data<I: IndexElement>(&mut self, indices: &[I]) {
        self.data = I::store(indices);
    }

    #[inline]
    pub fn len(&self) -> usize {
        match &self.data {
            IndexData::U8(v) => v.len(),
            IndexData::U16(v) => v.len(),
            IndexData::U32(v) => v.len(),
            IndexData::U64(v) => v.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The index stored at `at`, widened to `u64`.
    #[inline]
    pub fn index(&self, at: usize) -> u64 {
        match &self.data {
            IndexData::U8(v) => v[at].widen(),
            IndexData::U16(v) => v[at].widen(),
            IndexData::U32(v) => v[at].widen(),
            IndexData::U64(v) => v[at].widen(),
        }
    }
}
