use std::mem;

use cgmath::Matrix4;

/// Per-draw uniform shared by both shading programs.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    pub mvp: [[f32; 4]; 4],
    pub mv: [[f32; 4]; 4],
    /// Light position in eye space, `w` is ignored.
    pub light_pos: [f32; 4],
}

impl TransformUniform {
    pub fn new(mvp: Matrix4<f32>, mv: Matrix4<f32>, light: [f32; 3]) -> Self {
        Self {
            mvp: mvp.into(),
            mv: mv.into(),
            light_pos: [light[0], light[1], light[2], 1.0],
        }
    }
}

/// A uniform buffer holding one [`TransformUniform`] per placed shape,
/// addressed with a dynamic offset.
#[derive(Debug)]
pub struct TransformSlots {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
    stride: u64,
    capacity: u32,
}

impl TransformSlots {
    pub fn new(device: &wgpu::Device, capacity: u32) -> Self {
        let size = mem::size_of::<TransformUniform>() as u64;
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = size.div_ceil(alignment) * alignment;

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Transform Buffer"),
            size: stride * capacity.max(1) as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(size),
                },
                count: None,
            }],
            label: Some("transform_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(size),
                }),
            }],
            label: Some("transform_bind_group"),
        });

        Self {
            buffer,
            bind_group,
            bind_group_layout,
            stride,
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn offset(&self, slot: u32) -> u32 {
        (slot as u64 * self.stride) as u32
    }

    pub fn write(&self, queue: &wgpu::Queue, slot: u32, uniform: &TransformUniform) {
        if slot >= self.capacity {
            log::error!("transform slot {slot} out of {} ignored", self.capacity);
            return;
        }
        queue.write_buffer(&self.buffer, self.offset(slot) as u64, bytemuck::bytes_of(uniform));
    }
}
