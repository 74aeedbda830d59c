use cgmath::{InnerSpace, Vector3};

use super::grid_strip_indices;
use crate::buffers::{MeshData, VertexRecord};

const MIN_POSITION: f32 = -5.0;
const POSITION_RANGE: f32 = 10.0;

/// Paraboloid `z = (x² + y²) / 10` sampled on a square grid over `[-5, 5]²`.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightMap {
    pub side: u32,
}

impl Default for HeightMap {
    fn default() -> Self {
        Self { side: 32 }
    }
}

impl HeightMap {
    pub fn new(side: u32) -> Self {
        Self { side }
    }

    /// Built top row first so the strip winds counter-clockwise.
    pub fn mesh(&self) -> MeshData {
        let mut data = MeshData::new();
        if self.side < 2 {
            return data;
        }
        let last = (self.side - 1) as f32;

        let vertices = (0..self.side).flat_map(|y| {
            (0..self.side).map(move |x| {
                let x_ratio = x as f32 / last;
                let y_ratio = 1.0 - y as f32 / last;
                let px = MIN_POSITION + x_ratio * POSITION_RANGE;
                let py = MIN_POSITION + y_ratio * POSITION_RANGE;

                // Slopes of the surface along x and y.
                let along_x = Vector3::new(1.0, 0.0, 2.0 * px / 10.0);
                let along_y = Vector3::new(0.0, 1.0, 2.0 * py / 10.0);
                let normal = along_x.cross(along_y).normalize();

                VertexRecord::new(
                    [px, py, (px * px + py * py) / 10.0],
                    normal.into(),
                    [x_ratio, y_ratio, 0.5, 1.0],
                )
            })
        });
        data.push_vertices(vertices);
        data.push_strip(&grid_strip_indices(self.side, self.side));
        data
    }
}
