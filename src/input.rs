//! Lock-free hand-off between a UI thread and the render thread.
//!
//! Gesture deltas accumulate in atomics and are drained once per frame.
//! Toggles are plain flags, the arena instance count a plain counter.
//! Everything uses relaxed ordering: the render
//! thread may see an update one frame late, which is fine for interactive
//! input. Mesh loads go through a channel and run on the render thread at
//! the start of the next frame.

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU32, Ordering},
    mpsc,
};

use crate::pipelines::Shading;

/// Which private meshes a frame draws. Arena batches are always drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    All,
    /// Skips meshes drawn straight from their vertex buffer.
    #[default]
    IndexedOnly,
}

/// Upper bound on arena copies per frame, nine layers of nine.
pub const MAX_INSTANCES: u32 = 81;
/// Copies per layer. The instance count steps by a whole layer once it
/// reaches this.
pub const LAYER_SIZE: u32 = 9;

fn more_instances(count: u32) -> u32 {
    let step = if count >= LAYER_SIZE { LAYER_SIZE } else { 1 };
    (count + step).min(MAX_INSTANCES)
}

fn fewer_instances(count: u32) -> u32 {
    match count {
        0 | 1 => 1,
        n if n > LAYER_SIZE => n - LAYER_SIZE,
        n => n - 1,
    }
}

/// `f32` stored as its bit pattern.
#[derive(Debug, Default)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn add(&self, delta: f32) {
        let _ = self
            .0
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
                Some((f32::from_bits(bits) + delta).to_bits())
            });
    }

    pub fn take(&self) -> f32 {
        f32::from_bits(self.0.swap(0.0f32.to_bits(), Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneCommand {
    /// Replace the displayed OBJ mesh with `<name>.obj` / `<name>.mtl`.
    LoadMesh(String),
}

/// Deltas gathered since the previous frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    pub rotate: (f32, f32),
    pub pan: (f32, f32),
    pub pinch: f32,
}

#[derive(Debug)]
struct InputState {
    rotate_x: AtomicF32,
    rotate_y: AtomicF32,
    pan_x: AtomicF32,
    pan_y: AtomicF32,
    pinch: AtomicF32,
    wireframe: AtomicBool,
    per_pixel: AtomicBool,
    indexed_only: AtomicBool,
    instances: AtomicU32,
}

impl InputState {
    fn new(wireframe: bool, shading: Shading, mode: RenderMode) -> Self {
        Self {
            rotate_x: AtomicF32::default(),
            rotate_y: AtomicF32::default(),
            pan_x: AtomicF32::default(),
            pan_y: AtomicF32::default(),
            pinch: AtomicF32::default(),
            wireframe: AtomicBool::new(wireframe),
            per_pixel: AtomicBool::new(shading == Shading::PerPixel),
            indexed_only: AtomicBool::new(mode == RenderMode::IndexedOnly),
            instances: AtomicU32::new(1),
        }
    }

    fn step_instances(&self, step: fn(u32) -> u32) -> u32 {
        let previous = self
            .instances
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| Some(step(n)))
            .unwrap_or_else(|n| n);
        step(previous)
    }

    fn wireframe(&self) -> bool {
        self.wireframe.load(Ordering::Relaxed)
    }

    fn shading(&self) -> Shading {
        if self.per_pixel.load(Ordering::Relaxed) {
            Shading::PerPixel
        } else {
            Shading::PerVertex
        }
    }

    fn render_mode(&self) -> RenderMode {
        if self.indexed_only.load(Ordering::Relaxed) {
            RenderMode::IndexedOnly
        } else {
            RenderMode::All
        }
    }

    fn take_frame(&self) -> FrameInput {
        FrameInput {
            rotate: (self.rotate_x.take(), self.rotate_y.take()),
            pan: (self.pan_x.take(), self.pan_y.take()),
            pinch: self.pinch.take(),
        }
    }
}

/// Cloneable, `Send` handle a UI layer uses to drive a scene.
#[derive(Debug, Clone)]
pub struct SceneHandle {
    state: Arc<InputState>,
    commands: mpsc::Sender<SceneCommand>,
}

impl SceneHandle {
    /// A handle with the given initial toggles and the receiving end of its
    /// command queue.
    pub fn new(
        wireframe: bool,
        shading: Shading,
        mode: RenderMode,
    ) -> (Self, mpsc::Receiver<SceneCommand>) {
        let (commands, receiver) = mpsc::channel();
        let handle = Self {
            state: Arc::new(InputState::new(wireframe, shading, mode)),
            commands,
        };
        (handle, receiver)
    }

    pub fn toggle_wireframe(&self) {
        self.state.wireframe.fetch_xor(true, Ordering::Relaxed);
    }

    pub fn toggle_shader(&self) {
        self.state.per_pixel.fetch_xor(true, Ordering::Relaxed);
    }

    pub fn toggle_render_mode(&self) {
        self.state.indexed_only.fetch_xor(true, Ordering::Relaxed);
    }

    /// Adds one arena copy, or a whole layer once there are
    /// [`LAYER_SIZE`] or more. Returns the new count.
    pub fn more_instances(&self) -> u32 {
        self.state.step_instances(more_instances)
    }

    /// Removes one arena copy, or a whole layer above [`LAYER_SIZE`]. Never
    /// goes below one. Returns the new count.
    pub fn fewer_instances(&self) -> u32 {
        self.state.step_instances(fewer_instances)
    }

    /// Sets the arena copy count, clamped to `1..=MAX_INSTANCES`.
    pub fn set_instances(&self, count: u32) {
        self.state
            .instances
            .store(count.clamp(1, MAX_INSTANCES), Ordering::Relaxed);
    }

    pub fn instances(&self) -> u32 {
        self.state.instances.load(Ordering::Relaxed)
    }

    pub fn wireframe(&self) -> bool {
        self.state.wireframe()
    }

    pub fn shading(&self) -> Shading {
        self.state.shading()
    }

    pub fn render_mode(&self) -> RenderMode {
        self.state.render_mode()
    }

    /// Queues a mesh load. Returns `false` when the scene is gone.
    pub fn load_mesh(&self, name: impl Into<String>) -> bool {
        self.commands
            .send(SceneCommand::LoadMesh(name.into()))
            .is_ok()
    }

    /// Rotation in degrees: `dx` around the y axis, `dy` around the x axis.
    pub fn rotate(&self, dx: f32, dy: f32) {
        self.state.rotate_x.add(dx);
        self.state.rotate_y.add(dy);
    }

    pub fn pan(&self, dx: f32, dy: f32) {
        self.state.pan_x.add(dx);
        self.state.pan_y.add(dy);
    }

    pub fn pinch(&self, delta_spacing: f32) {
        self.state.pinch.add(delta_spacing);
    }

    /// Drains the deltas gathered since the last frame. Called by the
    /// renderer once per frame.
    pub fn take_frame(&self) -> FrameInput {
        self.state.take_frame()
    }
}
