use super::Color;
use crate::buffers::{MeshData, VertexRecord};

/// Marker separating strips in a restart-style index list.
pub const RESTART: i32 = -1;

/// Indexed triangle-strip mesh built from separate position and normal
/// arrays and a strip index list that uses [`RESTART`] markers.
///
/// The markers are replaced by degenerate stitching so the whole list draws
/// as a single strip without primitive restart.
#[derive(Debug, Clone, PartialEq)]
pub struct StripMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub strip: Vec<i32>,
    pub color: Color,
}

impl StripMesh {
    /// `positions` and `normals` are flat `xyz` triples. Extra floats and
    /// positions without a normal are dropped.
    pub fn new(positions: &[f32], normals: &[f32], strip: Vec<i32>, color: Color) -> Self {
        let triples = |data: &[f32]| -> Vec<[f32; 3]> {
            data.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()
        };
        let mut positions = triples(positions);
        let normals = triples(normals);
        if positions.len() != normals.len() {
            log::warn!(
                "strip mesh has {} positions but {} normals",
                positions.len(),
                normals.len()
            );
            positions.truncate(normals.len());
        }
        Self {
            positions,
            normals,
            strip,
            color,
        }
    }

    pub fn mesh(&self) -> MeshData {
        let mut data = MeshData::new();
        let vertices = self
            .positions
            .iter()
            .zip(&self.normals)
            .map(|(&p, &n)| VertexRecord::new(p, n, self.color));
        data.push_vertices(vertices);
        let count = data.vertices.len();

        let indices: Vec<u32> = stitch_restarts(&self.strip)
            .into_iter()
            .filter(|&i| {
                let valid = (i as usize) < count;
                if !valid {
                    log::error!("strip index {i} out of range for {count} vertices");
                }
                valid
            })
            .collect();
        data.push_strip(&indices);
        data
    }
}

/// Replaces each restart marker with the index before it and the index
/// after it.
///
/// A well-formed list grows by exactly one index per marker. Back-to-back
/// markers are logged and collapse into one stitch; markers at either end
/// are dropped.
pub fn stitch_restarts(strip: &[i32]) -> Vec<u32> {
    let markers = strip.iter().filter(|&&i| i < 0).count();
    let mut out: Vec<u32> = Vec::with_capacity(strip.len() + markers);

    for (i, &index) in strip.iter().enumerate() {
        if index >= 0 {
            out.push(index as u32);
            continue;
        }
        let previous = out.last().copied();
        match (previous, strip.get(i + 1).copied()) {
            (_, Some(next)) if next < 0 => {
                log::error!("double restart marker at {i}, after index {previous:?}");
            }
            (Some(previous), Some(next)) => {
                out.push(previous);
                out.push(next as u32);
            }
            _ => log::warn!("restart marker at strip end {i} ignored"),
        }
    }
    out
}
