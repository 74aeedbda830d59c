//! Render pipelines for the two shading programs.
//!
//! Every program is built once per [`Topology`](crate::buffers::Topology) so
//! a draw only has to pick the pipeline matching its primitive and the
//! wireframe flag.

pub mod basic;
pub mod transform;

use crate::buffers::Topology;

pub use transform::{TransformSlots, TransformUniform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shading {
    /// Diffuse lighting evaluated in the vertex shader.
    #[default]
    PerVertex,
    /// Diffuse lighting evaluated per fragment.
    PerPixel,
}

impl Shading {
    pub fn toggled(self) -> Self {
        match self {
            Shading::PerVertex => Shading::PerPixel,
            Shading::PerPixel => Shading::PerVertex,
        }
    }

    pub(crate) fn shader(self) -> wgpu::ShaderModuleDescriptor<'static> {
        match self {
            Shading::PerVertex => wgpu::ShaderModuleDescriptor {
                label: Some("Per-Vertex Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("per_vertex.wgsl").into()),
            },
            Shading::PerPixel => wgpu::ShaderModuleDescriptor {
                label: Some("Per-Pixel Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("per_pixel.wgsl").into()),
            },
        }
    }
}

pub struct ScenePipelines {
    per_vertex: [wgpu::RenderPipeline; 4],
    per_pixel: [wgpu::RenderPipeline; 4],
}

impl ScenePipelines {
    pub fn new(
        device: &wgpu::Device,
        transform_layout: &wgpu::BindGroupLayout,
        color_format: wgpu::TextureFormat,
        depth_format: Option<wgpu::TextureFormat>,
    ) -> Self {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[Some(transform_layout)],
            immediate_size: 0,
        });
        Self {
            per_vertex: basic::mk_shaded_pipelines(
                device,
                &layout,
                color_format,
                depth_format,
                Shading::PerVertex,
            ),
            per_pixel: basic::mk_shaded_pipelines(
                device,
                &layout,
                color_format,
                depth_format,
                Shading::PerPixel,
            ),
        }
    }

    pub fn get(&self, shading: Shading, topology: Topology) -> &wgpu::RenderPipeline {
        match shading {
            Shading::PerVertex => &self.per_vertex[topology.index()],
            Shading::PerPixel => &self.per_pixel[topology.index()],
        }
    }
}
