use std::mem;

/// Floats per interleaved vertex: position (3), normal (3), color (4).
pub const STRIDE: usize = 10;
/// Bytes per interleaved vertex.
pub const STRIDE_BYTES: usize = STRIDE * mem::size_of::<f32>();

pub const POSITION_OFFSET: usize = 0;
pub const NORMAL_OFFSET: usize = 3 * mem::size_of::<f32>();
pub const COLOR_OFFSET: usize = 6 * mem::size_of::<f32>();

/// Anything that can describe itself as a vertex buffer layout.
pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

/// The only on-GPU vertex format in the crate.
///
/// Every generator writes this record, either as a struct into a mesh or as
/// ten consecutive floats into the arena.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VertexRecord {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

impl VertexRecord {
    pub fn new(position: [f32; 3], normal: [f32; 3], color: [f32; 4]) -> Self {
        Self {
            position,
            normal,
            color,
        }
    }

    /// Copies the record into the first `STRIDE` floats of `out`.
    pub fn write_to(&self, out: &mut [f32]) {
        out[..STRIDE].copy_from_slice(bytemuck::cast_slice(std::slice::from_ref(self)));
    }

    /// Reads a record back from `STRIDE` floats.
    pub fn read_from(floats: &[f32]) -> Self {
        let mut record = Self::default();
        bytemuck::cast_slice_mut::<VertexRecord, f32>(std::slice::from_mut(&mut record))
            .copy_from_slice(&floats[..STRIDE]);
        record
    }
}

impl Vertex for VertexRecord {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: STRIDE_BYTES as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: POSITION_OFFSET as wgpu::BufferAddress,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: NORMAL_OFFSET as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: COLOR_OFFSET as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}
