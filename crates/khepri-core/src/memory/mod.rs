//! Per-draw scratch memory.

mod arena;

pub(crate) use arena::Arena;
