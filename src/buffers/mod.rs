//! Vertex storage and GPU buffer bookkeeping.
//!
//! - `vertex`: the interleaved record every generator writes
//! - `allocator`: buffer creation seam (wgpu device or host memory)
//! - `arena`: reusable scratch storage generators append to
//! - `table`: ordered registry of flushed arena batches
//! - `mesh`: private per-shape vertex/index buffers
//! - `draw`: topology selection and planned draw calls

pub mod allocator;
pub mod arena;
pub mod draw;
pub mod error;
pub mod mesh;
pub mod table;
pub mod vertex;

pub use allocator::{BufferAllocator, BufferUsage, GpuBuffer, HostAllocator, HostBuffer};
pub use arena::{ArenaState, VertexArena, VertexWriter};
pub use draw::{DrawCommand, Topology};
pub use error::BufferError;
pub use mesh::{GpuMesh, MeshData, MeshPart, Primitive};
pub use table::{GpuArrayEntry, GpuBufferTable};
pub use vertex::{STRIDE, STRIDE_BYTES, Vertex, VertexRecord};
