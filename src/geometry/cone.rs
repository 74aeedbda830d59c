use std::f32::consts::PI;

use super::{CAP_BRIGHTNESS, Color};
use crate::buffers::{MeshData, VertexRecord};

/// Cone along the y axis with its apex at `+length / 2`.
///
/// The side fan uses `color`, the base plate fan uses `base_color`.
#[derive(Debug, Clone, PartialEq)]
pub struct Cone {
    pub slices: u32,
    pub radius: f32,
    pub length: f32,
    pub color: Color,
    pub base_color: Color,
}

impl Cone {
    pub fn new(slices: u32, radius: f32, length: f32, color: Color, base_color: Color) -> Self {
        Self {
            slices,
            radius,
            length,
            color,
            base_color,
        }
    }

    /// Vertices per fan: hub plus `slices + 2` rim points. The rim wraps one
    /// step past the seam.
    pub fn fan_len(&self) -> u32 {
        self.slices + 3
    }

    pub fn mesh(&self) -> MeshData {
        let mut data = MeshData::new();
        if self.slices == 0 {
            return data;
        }
        let half = self.length / 2.0;
        let step = 2.0 * PI / self.slices as f32;
        let angles = || (0..=self.slices + 1).map(move |i| (i as f32 * step).sin_cos());

        let side = std::iter::once(VertexRecord::new([0.0, half, 0.0], [1.0, 0.0, 0.0], self.color))
            .chain(angles().map(|(sin, cos)| {
                VertexRecord::new(
                    [self.radius * cos, -half, self.radius * sin],
                    [-cos / self.radius, 0.0, -sin / self.radius],
                    self.color,
                )
            }));
        let side_hub = data.push_vertices(side);

        let up = [0.0, CAP_BRIGHTNESS, 0.0];
        let base = std::iter::once(VertexRecord::new([0.0, -half, 0.0], up, self.base_color)).chain(
            angles().map(|(sin, cos)| {
                VertexRecord::new(
                    [self.radius * cos, -half, -self.radius * sin],
                    up,
                    self.base_color,
                )
            }),
        );
        let base_hub = data.push_vertices(base);

        let fan = self.fan_len();
        data.push_fan(&(side_hub..side_hub + fan).collect::<Vec<_>>());
        data.push_fan(&(base_hub..base_hub + fan).collect::<Vec<_>>());
        data
    }
}
