use super::{
    allocator::{BufferAllocator, GpuBuffer},
    draw::{DrawCommand, Topology},
    error::BufferError,
    vertex::STRIDE_BYTES,
};

/// A flushed arena batch living in its own GPU buffer.
#[derive(Debug)]
pub struct GpuArrayEntry<B> {
    buffer: B,
    vertex_count: u32,
    allocated: bool,
}

impl<B: GpuBuffer> GpuArrayEntry<B> {
    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn is_allocated(&self) -> bool {
        self.allocated
    }

    fn check_handle(&self) -> Result<(), BufferError> {
        let needed = (self.vertex_count as u64).saturating_mul(STRIDE_BYTES as u64);
        if self.buffer.size() < needed {
            return Err(BufferError::InvalidHandle {
                size: self.buffer.size(),
                vertex_count: self.vertex_count,
            });
        }
        Ok(())
    }
}

/// Ordered registry of flushed batches. Insertion order is draw order.
///
/// Entries are only ever appended; they leave the table all at once on
/// [`release_all`](Self::release_all) followed by [`clear`](Self::clear).
#[derive(Debug)]
pub struct GpuBufferTable<B> {
    entries: Vec<GpuArrayEntry<B>>,
}

impl<B> Default for GpuBufferTable<B> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<B: GpuBuffer> GpuBufferTable<B> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, buffer: B, vertex_count: u32) -> &GpuArrayEntry<B> {
        let index = self.entries.len();
        self.entries.push(GpuArrayEntry {
            buffer,
            vertex_count,
            allocated: true,
        });
        &self.entries[index]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GpuArrayEntry<B>> {
        self.entries.iter()
    }

    pub fn get(&self, index: usize) -> Option<&GpuArrayEntry<B>> {
        self.entries.get(index)
    }

    /// Vertices across all allocated entries.
    pub fn total_vertices(&self) -> u64 {
        self.entries
            .iter()
            .filter(|e| e.allocated)
            .map(|e| e.vertex_count as u64)
            .sum()
    }

    /// One non-indexed draw per allocated entry, in insertion order.
    ///
    /// A buffer too small for its recorded vertex count means an entry was
    /// built wrong and aborts the whole plan.
    pub fn draw_commands(&self, wireframe: bool) -> Result<Vec<DrawCommand<'_, B>>, BufferError> {
        let mut commands = Vec::with_capacity(self.entries.len());
        for entry in self.entries.iter().filter(|e| e.allocated) {
            entry.check_handle()?;
            commands.push(DrawCommand {
                vertex_buffer: &entry.buffer,
                index_buffer: None,
                topology: Topology::TriangleList.wireframe(wireframe),
                range: 0..entry.vertex_count,
            });
        }
        Ok(commands)
    }

    /// Destroys every buffer and marks its entry unallocated. Returns the
    /// number of buffers freed.
    pub fn release_all<A>(&mut self, allocator: &A) -> usize
    where
        A: BufferAllocator<Buffer = B>,
    {
        let mut released = 0;
        for entry in self.entries.iter_mut().filter(|e| e.allocated) {
            allocator.destroy_buffer(&entry.buffer);
            entry.allocated = false;
            released += 1;
        }
        released
    }

    /// Drops every entry. Call after [`release_all`](Self::release_all).
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
