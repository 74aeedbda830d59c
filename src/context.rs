//! Device setup and the owner of arena-backed geometry.
//!
//! [`GpuContext`] is the headless wgpu device plus an offscreen color and
//! depth target. [`RenderContext`] owns the buffer allocator, the shared
//! [`VertexArena`] and the [`GpuBufferTable`] the arena flushes into.

use crate::buffers::{
    BufferAllocator, BufferError, DrawCommand, GpuArrayEntry, GpuBufferTable, VertexArena,
    VertexWriter,
};

/// Storage handed out by [`RenderContext::reserve`]. Write the reserved
/// records starting at float offset `cursor`, then call
/// [`RenderContext::commit`].
#[derive(Debug)]
pub struct Reservation<'a> {
    pub storage: &'a mut [f32],
    pub cursor: usize,
}

/// Owns the arena and the table of flushed batches.
///
/// One per scene. Not shared between concurrent renderers.
pub struct RenderContext<A: BufferAllocator> {
    allocator: A,
    arena: VertexArena,
    table: GpuBufferTable<A::Buffer>,
}

impl<A: BufferAllocator> RenderContext<A> {
    pub fn new(allocator: A, arena_capacity: usize) -> Result<Self, BufferError> {
        Ok(Self {
            allocator,
            arena: VertexArena::with_capacity(arena_capacity)?,
            table: GpuBufferTable::new(),
        })
    }

    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    pub fn arena(&self) -> &VertexArena {
        &self.arena
    }

    pub fn table(&self) -> &GpuBufferTable<A::Buffer> {
        &self.table
    }

    /// Reallocates the arena. Pending vertices are discarded.
    pub fn allocate(&mut self, vertices: usize) -> Result<(), BufferError> {
        self.arena.allocate(vertices)
    }

    fn ensure_room(&mut self, vertices: usize) -> Result<(), BufferError> {
        if vertices > self.arena.capacity() {
            return Err(BufferError::ReservationTooLarge {
                requested: vertices,
                capacity: self.arena.capacity(),
            });
        }
        if !self.arena.has_room_for(vertices) {
            log::debug!(
                "arena full ({} pending, {} requested), flushing",
                self.arena.pending_vertices(),
                vertices
            );
            self.flush()?;
        }
        Ok(())
    }

    /// Makes room for `vertices` records.
    ///
    /// When the arena cannot take them it is flushed first and the returned
    /// cursor is 0. Callers must not hold on to float offsets across calls.
    pub fn reserve(&mut self, vertices: usize) -> Result<Reservation<'_>, BufferError> {
        self.ensure_room(vertices)?;
        let cursor = self.arena.cursor();
        Ok(Reservation {
            storage: self.arena.storage_mut(),
            cursor,
        })
    }

    /// Advances the cursor past records written through [`reserve`](Self::reserve).
    pub fn commit(&mut self, vertices: usize) -> Result<(), BufferError> {
        self.arena.advance(vertices)
    }

    /// Reserves like [`reserve`](Self::reserve) and hands out a typed writer
    /// that commits on drop.
    pub fn vertex_writer(&mut self, vertices: usize) -> Result<VertexWriter<'_>, BufferError> {
        self.ensure_room(vertices)?;
        self.arena.writer(vertices)
    }

    /// Copies the pending vertices into a new buffer and registers it.
    ///
    /// An empty arena flushes to nothing. On failure the pending vertices
    /// stay in the arena.
    pub fn flush(&mut self) -> Result<Option<&GpuArrayEntry<A::Buffer>>, BufferError> {
        if self.arena.is_empty() {
            return Ok(None);
        }
        let vertex_count = self.arena.pending_vertices() as u32;
        let label = format!("Arena Batch {}", self.table.len());
        let buffer = self.allocator.create_buffer(
            &label,
            bytemuck::cast_slice(self.arena.pending()),
            crate::buffers::BufferUsage::Vertex,
        )?;
        log::debug!("flushed {vertex_count} vertices into '{label}'");
        self.arena.reset();
        Ok(Some(self.table.push(buffer, vertex_count)))
    }

    pub fn draw_commands(
        &self,
        wireframe: bool,
    ) -> Result<Vec<DrawCommand<'_, A::Buffer>>, BufferError> {
        self.table.draw_commands(wireframe)
    }

    /// Releases every flushed buffer and empties the table. Pending arena
    /// contents are dropped as well.
    pub fn teardown(&mut self) -> usize {
        let released = self.table.release_all(&self.allocator);
        self.table.clear();
        self.arena.reset();
        log::info!("released {released} arena buffers");
        released
    }
}

/// Headless device with an offscreen color and depth target.
#[derive(Debug)]
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub color: wgpu::Texture,
    pub color_view: wgpu::TextureView,
    pub depth_view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl GpuContext {
    pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub async fn new(width: u32, height: u32) -> anyhow::Result<Self> {
        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..wgpu::InstanceDescriptor::new_without_display_handle()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("device and queue on {:?}", adapter.get_info().name);
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("solid-ngin device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
                ..Default::default()
            })
            .await?;

        let (color, color_view) = Self::create_target(
            &device,
            width,
            height,
            Self::COLOR_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            "color_target",
        );
        let (_, depth_view) = Self::create_target(
            &device,
            width,
            height,
            Self::DEPTH_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
            "depth_target",
        );

        Ok(Self {
            device,
            queue,
            color,
            color_view,
            depth_view,
            width: width.max(1),
            height: height.max(1),
        })
    }

    fn create_target(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
        label: &str,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    /// Arena-backed geometry owner sharing this device.
    pub fn render_context(
        &self,
        arena_capacity: usize,
    ) -> Result<RenderContext<wgpu::Device>, BufferError> {
        RenderContext::new(self.device.clone(), arena_capacity)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}
