//! solid-ngin
//!
//! Headless renderer for procedurally generated solids. Generators stream
//! interleaved vertices into a reusable arena that is flushed into GPU
//! buffers, or build their own private vertex/index buffers. A scene draws
//! everything once per frame with per-vertex or per-pixel diffuse lighting,
//! optionally as wireframe.
//!
//! High-level modules
//! - `buffers`: vertex record, arena, buffer table, private meshes
//! - `context`: headless wgpu device and the arena/table owner
//! - `geometry`: the procedural generators and the OBJ parser
//! - `camera`: view/projection and touch-driven transforms
//! - `input`: lock-free hand-off of toggles and gestures from a UI thread
//! - `pipelines`: the two shading programs in every topology
//! - `render`: render composition and pass recording
//! - `resources`: mesh file loading
//! - `scene`: scene contents and the per-frame renderer
//! - `headless`: offscreen run loop and pixel readback
//!

pub mod buffers;
pub mod camera;
pub mod context;
pub mod geometry;
pub mod headless;
pub mod input;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;

// Re-exports commonly used types for convenience in downstream code.
pub use buffers::{BufferError, VertexRecord};
pub use context::{GpuContext, RenderContext};
pub use input::{RenderMode, SceneHandle};
pub use scene::{SceneConfig, SceneRenderer};
