//! Render composition.
//!
//! A frame is described as a [`Render`] tree. Leaves carry planned draw
//! commands for one placed shape. The tree is flattened, filtered by the
//! current [`RenderMode`] and recorded into a single render pass.

use wgpu::RenderPass;

use crate::{
    buffers::DrawCommand,
    input::RenderMode,
    pipelines::{ScenePipelines, Shading, TransformSlots},
};

/// Draw commands for one shape and the transform slot they use.
pub struct Placed<'a, B = wgpu::Buffer> {
    pub slot: u32,
    pub commands: Vec<DrawCommand<'a, B>>,
}

impl<B> Placed<'_, B> {
    /// Every command reads an index buffer.
    pub fn is_indexed(&self) -> bool {
        self.commands.iter().all(|c| c.is_indexed())
    }
}

pub enum Render<'a, B = wgpu::Buffer> {
    None,
    /// One copy of the batches flushed from the shared vertex arena.
    Arena(Placed<'a, B>),
    /// A shape's private buffers.
    Mesh(Placed<'a, B>),
    Composed(Vec<Render<'a, B>>),
}

impl<'a, B> Render<'a, B> {
    /// Leaves that `mode` allows, in tree order. Arena copies are never
    /// filtered; [`RenderMode::IndexedOnly`] drops meshes without an index
    /// buffer.
    pub fn flatten(self, mode: RenderMode, out: &mut Vec<Placed<'a, B>>) {
        match self {
            Render::Arena(placed) => out.push(placed),
            Render::Mesh(placed) if mode == RenderMode::IndexedOnly && !placed.is_indexed() => (),
            Render::Mesh(placed) => out.push(placed),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.flatten(mode, out)),
            Render::None => (),
        }
    }
}

impl Render<'_> {
    /// Records every allowed draw into `render_pass`. Returns the number of
    /// draw calls issued.
    pub fn record(
        self,
        render_pass: &mut RenderPass<'_>,
        pipelines: &ScenePipelines,
        transforms: &TransformSlots,
        shading: Shading,
        mode: RenderMode,
    ) -> usize {
        let mut placed = Vec::new();
        self.flatten(mode, &mut placed);

        let mut draws = 0;
        for Placed { slot, commands } in placed {
            render_pass.set_bind_group(0, &transforms.bind_group, &[transforms.offset(slot)]);
            for command in commands.into_iter().filter(|c| !c.is_empty()) {
                render_pass.set_pipeline(pipelines.get(shading, command.topology));
                render_pass.set_vertex_buffer(0, command.vertex_buffer.slice(..));
                match command.index_buffer {
                    Some(index_buffer) => {
                        render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                        render_pass.draw_indexed(command.range, 0, 0..1);
                    }
                    None => render_pass.draw(command.range, 0..1),
                }
                draws += 1;
            }
        }
        draws
    }
}
