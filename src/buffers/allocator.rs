//! Buffer creation seam.
//!
//! [`BufferAllocator`] is implemented by [`wgpu::Device`] for real rendering
//! and by [`HostAllocator`] which keeps buffers in host memory. The arena,
//! the buffer table and meshes are generic over it so the bookkeeping can be
//! exercised without a GPU.

use std::cell::Cell;

use wgpu::util::DeviceExt;

use super::{error::BufferError, vertex::VertexRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    Vertex,
    Index,
}

/// A buffer handle owned by a table entry or a mesh.
pub trait GpuBuffer {
    /// Size in bytes.
    fn size(&self) -> u64;
}

pub trait BufferAllocator {
    type Buffer: GpuBuffer;

    /// Creates a buffer initialised with `contents`.
    fn create_buffer(
        &self,
        label: &str,
        contents: &[u8],
        usage: BufferUsage,
    ) -> Result<Self::Buffer, BufferError>;

    /// Frees the memory behind `buffer`. Dropping the handle afterwards is
    /// still required.
    fn destroy_buffer(&self, buffer: &Self::Buffer);
}

impl GpuBuffer for wgpu::Buffer {
    fn size(&self) -> u64 {
        wgpu::Buffer::size(self)
    }
}

impl BufferAllocator for wgpu::Device {
    type Buffer = wgpu::Buffer;

    fn create_buffer(
        &self,
        label: &str,
        contents: &[u8],
        usage: BufferUsage,
    ) -> Result<wgpu::Buffer, BufferError> {
        let max = self.limits().max_buffer_size;
        if contents.len() as u64 > max {
            return Err(BufferError::CreationFailed {
                label: label.to_string(),
                reason: format!("{} bytes exceeds device limit of {max}", contents.len()),
            });
        }
        let usage = match usage {
            BufferUsage::Vertex => wgpu::BufferUsages::VERTEX,
            BufferUsage::Index => wgpu::BufferUsages::INDEX,
        };
        Ok(self.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage,
        }))
    }

    fn destroy_buffer(&self, buffer: &wgpu::Buffer) {
        buffer.destroy();
    }
}

/// Host-memory buffer produced by [`HostAllocator`].
#[derive(Debug, Clone)]
pub struct HostBuffer {
    pub label: String,
    pub usage: BufferUsage,
    data: Vec<u8>,
}

impl HostBuffer {
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Reinterprets a vertex buffer's contents as records.
    pub fn vertices(&self) -> Vec<VertexRecord> {
        bytemuck::pod_collect_to_vec(&self.data)
    }

    pub fn indices(&self) -> Vec<u32> {
        bytemuck::pod_collect_to_vec(&self.data)
    }
}

impl GpuBuffer for HostBuffer {
    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Allocator that keeps every buffer on the host.
///
/// Useful for tooling that only needs the generated geometry, and for
/// exercising failure paths: `failing_after(n)` lets the first `n` creations
/// succeed and rejects the rest.
#[derive(Debug, Default)]
pub struct HostAllocator {
    fail_after: Option<usize>,
    created: Cell<usize>,
    destroyed: Cell<usize>,
}

impl HostAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_after(successes: usize) -> Self {
        Self {
            fail_after: Some(successes),
            ..Self::default()
        }
    }

    pub fn created(&self) -> usize {
        self.created.get()
    }

    pub fn destroyed(&self) -> usize {
        self.destroyed.get()
    }
}

impl BufferAllocator for HostAllocator {
    type Buffer = HostBuffer;

    fn create_buffer(
        &self,
        label: &str,
        contents: &[u8],
        usage: BufferUsage,
    ) -> Result<HostBuffer, BufferError> {
        if self.fail_after.is_some_and(|limit| self.created.get() >= limit) {
            return Err(BufferError::CreationFailed {
                label: label.to_string(),
                reason: "host allocator exhausted".to_string(),
            });
        }
        self.created.set(self.created.get() + 1);
        Ok(HostBuffer {
            label: label.to_string(),
            usage,
            data: contents.to_vec(),
        })
    }

    fn destroy_buffer(&self, _buffer: &HostBuffer) {
        self.destroyed.set(self.destroyed.get() + 1);
    }
}
