use std::ops::Range;

/// Primitive topology of a draw. Every shape draws with one of four
/// pipelines, picked from its natural primitive and the wireframe flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    TriangleList,
    TriangleStrip,
    LineList,
    LineStrip,
}

impl Topology {
    pub const ALL: [Topology; 4] = [
        Topology::TriangleList,
        Topology::TriangleStrip,
        Topology::LineList,
        Topology::LineStrip,
    ];

    /// Lists draw as line lists and strips as line strips in wireframe mode.
    pub fn wireframe(self, wireframe: bool) -> Self {
        match (self, wireframe) {
            (Topology::TriangleList, true) => Topology::LineList,
            (Topology::TriangleStrip, true) => Topology::LineStrip,
            (topology, _) => topology,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_strip(self) -> bool {
        matches!(self, Topology::TriangleStrip | Topology::LineStrip)
    }
}

impl From<Topology> for wgpu::PrimitiveTopology {
    fn from(topology: Topology) -> Self {
        match topology {
            Topology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
            Topology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
            Topology::LineList => wgpu::PrimitiveTopology::LineList,
            Topology::LineStrip => wgpu::PrimitiveTopology::LineStrip,
        }
    }
}

/// One planned draw call. `range` addresses indices when `index_buffer` is
/// set and vertices otherwise.
#[derive(Debug)]
pub struct DrawCommand<'a, B> {
    pub vertex_buffer: &'a B,
    pub index_buffer: Option<&'a B>,
    pub topology: Topology,
    pub range: Range<u32>,
}

impl<B> DrawCommand<'_, B> {
    pub fn is_indexed(&self) -> bool {
        self.index_buffer.is_some()
    }

    pub fn len(&self) -> u32 {
        self.range.end - self.range.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
