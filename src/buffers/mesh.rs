//! Private per-shape buffers.
//!
//! Shapes whose vertex count is known up front build a [`MeshData`] on the
//! host and upload it once into a [`GpuMesh`]. The mesh owns its vertex and
//! index buffers until [`GpuMesh::release`] is called.

use super::{
    allocator::{BufferAllocator, BufferUsage},
    draw::{DrawCommand, Topology},
    error::BufferError,
    vertex::VertexRecord,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Triangles,
    TriangleStrip,
    /// Stored as triangle-list indices; the tag records where they came from.
    TriangleFan,
}

impl Primitive {
    pub fn topology(self) -> Topology {
        match self {
            Primitive::Triangles | Primitive::TriangleFan => Topology::TriangleList,
            Primitive::TriangleStrip => Topology::TriangleStrip,
        }
    }
}

/// A contiguous run of indices (or vertices, for non-indexed meshes) drawn
/// with one primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshPart {
    pub primitive: Primitive,
    pub first: u32,
    pub count: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<VertexRecord>,
    pub indices: Option<Vec<u32>>,
    pub parts: Vec<MeshPart>,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    /// A non-indexed mesh drawn as one part.
    pub fn from_vertices(vertices: Vec<VertexRecord>, primitive: Primitive) -> Self {
        let count = vertices.len() as u32;
        Self {
            vertices,
            indices: None,
            parts: vec![MeshPart {
                primitive,
                first: 0,
                count,
            }],
        }
    }

    /// Appends vertices and returns the index of the first one.
    pub fn push_vertices(&mut self, vertices: impl IntoIterator<Item = VertexRecord>) -> u32 {
        let base = self.vertices.len() as u32;
        self.vertices.extend(vertices);
        base
    }

    pub fn push_triangles(&mut self, indices: &[u32]) {
        self.push_part(Primitive::Triangles, indices.iter().copied());
    }

    pub fn push_strip(&mut self, indices: &[u32]) {
        self.push_part(Primitive::TriangleStrip, indices.iter().copied());
    }

    /// `fan[0]` is the hub, the rest is the rim in winding order.
    pub fn push_fan(&mut self, fan: &[u32]) {
        let Some((&hub, rim)) = fan.split_first() else {
            return;
        };
        let triangles = rim.windows(2).flat_map(|edge| [hub, edge[0], edge[1]]);
        self.push_part(Primitive::TriangleFan, triangles);
    }

    fn push_part(&mut self, primitive: Primitive, indices: impl Iterator<Item = u32>) {
        let buffer = self.indices.get_or_insert_with(Vec::new);
        let first = buffer.len() as u32;
        buffer.extend(indices);
        let count = buffer.len() as u32 - first;
        if count > 0 {
            self.parts.push(MeshPart {
                primitive,
                first,
                count,
            });
        }
    }

    pub fn index_count(&self) -> usize {
        self.indices.as_ref().map_or(0, Vec::len)
    }

    /// The same parts with every index resolved into its own vertex, for
    /// drawing without an index buffer. Out-of-range indices are dropped.
    pub fn unindexed(&self) -> MeshData {
        let Some(indices) = &self.indices else {
            return self.clone();
        };
        let mut data = MeshData::new();
        for part in &self.parts {
            let range = part.first as usize..(part.first + part.count) as usize;
            let first = data.vertices.len() as u32;
            data.vertices.extend(
                indices
                    .get(range)
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|&i| self.vertices.get(i as usize).copied()),
            );
            data.parts.push(MeshPart {
                primitive: part.primitive,
                first,
                count: data.vertices.len() as u32 - first,
            });
        }
        data
    }
}

/// Vertex buffer, optional index buffer and the parts to draw from them.
#[derive(Debug)]
pub struct GpuMesh<B> {
    pub label: String,
    vertex_buffer: Option<B>,
    index_buffer: Option<B>,
    vertex_count: u32,
    index_count: u32,
    parts: Vec<MeshPart>,
}

impl<B> GpuMesh<B> {
    pub fn upload<A>(allocator: &A, label: &str, data: &MeshData) -> Result<Self, BufferError>
    where
        A: BufferAllocator<Buffer = B>,
    {
        if data.vertices.is_empty() {
            log::warn!("mesh '{label}' has no vertices, nothing to upload");
            return Ok(Self::empty(label));
        }
        let vertex_buffer = allocator.create_buffer(
            &format!("{label} Vertex Buffer"),
            bytemuck::cast_slice(&data.vertices),
            BufferUsage::Vertex,
        )?;
        let index_buffer = match &data.indices {
            Some(indices) if !indices.is_empty() => Some(allocator.create_buffer(
                &format!("{label} Index Buffer"),
                bytemuck::cast_slice(indices),
                BufferUsage::Index,
            )?),
            _ => None,
        };
        Ok(Self {
            label: label.to_string(),
            vertex_buffer: Some(vertex_buffer),
            index_buffer,
            vertex_count: data.vertices.len() as u32,
            index_count: data.index_count() as u32,
            parts: data.parts.clone(),
        })
    }

    fn empty(label: &str) -> Self {
        Self {
            label: label.to_string(),
            vertex_buffer: None,
            index_buffer: None,
            vertex_count: 0,
            index_count: 0,
            parts: Vec::new(),
        }
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn parts(&self) -> &[MeshPart] {
        &self.parts
    }

    pub fn vertex_buffer(&self) -> Option<&B> {
        self.vertex_buffer.as_ref()
    }

    pub fn index_buffer(&self) -> Option<&B> {
        self.index_buffer.as_ref()
    }

    pub fn is_released(&self) -> bool {
        self.vertex_buffer.is_none()
    }

    /// Frees both buffers. Safe to call twice.
    pub fn release<A>(&mut self, allocator: &A)
    where
        A: BufferAllocator<Buffer = B>,
    {
        if let Some(buffer) = self.vertex_buffer.take() {
            allocator.destroy_buffer(&buffer);
        }
        if let Some(buffer) = self.index_buffer.take() {
            allocator.destroy_buffer(&buffer);
        }
    }

    /// One draw per part. A released mesh plans nothing.
    pub fn draw_commands(&self, wireframe: bool) -> Vec<DrawCommand<'_, B>> {
        let Some(vertex_buffer) = self.vertex_buffer.as_ref() else {
            return Vec::new();
        };
        self.parts
            .iter()
            .map(|part| DrawCommand {
                vertex_buffer,
                index_buffer: self.index_buffer.as_ref(),
                topology: part.primitive.topology().wireframe(wireframe),
                range: part.first..part.first + part.count,
            })
            .collect()
    }
}
