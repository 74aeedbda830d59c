use std::f32::consts::PI;

use super::{BRIGHTNESS, CAP_BRIGHTNESS, Color};
use crate::buffers::{MeshData, VertexRecord};

/// Capped cylinder along the y axis: two cap fans and a barrel strip.
#[derive(Debug, Clone, PartialEq)]
pub struct Cylinder {
    pub slices: u32,
    pub radius: f32,
    pub length: f32,
    pub color: Color,
}

impl Cylinder {
    pub fn new(slices: u32, radius: f32, length: f32, color: Color) -> Self {
        Self {
            slices,
            radius,
            length,
            color,
        }
    }

    /// Vertices per cap fan: hub plus `slices + 1` rim points.
    pub fn fan_len(&self) -> u32 {
        self.slices + 2
    }

    /// Barrel strip over the body copy: top rim `x` paired with the bottom
    /// rim point below it at `2 * fan_len - x`.
    pub fn body_strip(&self) -> Vec<u32> {
        let fan = self.fan_len();
        (1..fan).flat_map(|x| [x, 2 * fan - x]).collect()
    }

    fn caps(&self) -> Vec<VertexRecord> {
        let half = self.length / 2.0;
        let step = 2.0 * PI / self.slices as f32;
        let up = [0.0, CAP_BRIGHTNESS, 0.0];
        let down = [0.0, -CAP_BRIGHTNESS, 0.0];
        let rim = |i: u32, y: f32, z_sign: f32| {
            let (sin, cos) = (i as f32 * step).sin_cos();
            [self.radius * cos, y, z_sign * self.radius * sin]
        };

        let mut vertices = Vec::with_capacity(2 * self.fan_len() as usize);
        vertices.push(VertexRecord::new([0.0, half, 0.0], up, self.color));
        vertices.extend((0..=self.slices).map(|i| VertexRecord::new(rim(i, half, -1.0), up, self.color)));
        vertices.push(VertexRecord::new([0.0, -half, 0.0], down, self.color));
        vertices.extend((0..=self.slices).map(|i| VertexRecord::new(rim(i, -half, 1.0), down, self.color)));
        vertices
    }

    pub fn mesh(&self) -> MeshData {
        let mut data = MeshData::new();
        if self.slices == 0 {
            return data;
        }
        let fan = self.fan_len();
        let caps = self.caps();

        // Barrel copy with radial normals in place of the cap normals.
        let body: Vec<_> = caps
            .iter()
            .map(|v| {
                let [x, _, z] = v.position;
                VertexRecord::new(v.position, [x * BRIGHTNESS, 0.0, z * BRIGHTNESS], v.color)
            })
            .collect();

        data.push_vertices(caps);
        let base = data.push_vertices(body);

        data.push_fan(&(0..fan).collect::<Vec<_>>());
        data.push_fan(&(fan..2 * fan).collect::<Vec<_>>());
        let strip: Vec<u32> = self.body_strip().into_iter().map(|i| base + i).collect();
        data.push_strip(&strip);
        data
    }
}
