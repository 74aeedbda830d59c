use std::f32::consts::PI;

use super::{CAP_BRIGHTNESS, Color, grid_strip_indices, palette};
use crate::buffers::{MeshData, VertexRecord};

/// Latitude/longitude sphere drawn as one stitched triangle strip.
#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    pub slices: u32,
    pub radius: f32,
    pub color: Color,
}

impl Sphere {
    pub fn new(slices: u32, radius: f32, color: Color) -> Self {
        Self {
            slices,
            radius,
            color,
        }
    }

    pub fn mesh(&self) -> MeshData {
        let mut data = MeshData::new();
        if self.slices < 2 {
            return data;
        }
        let n = self.slices;
        let step = 2.0 * PI / n as f32;
        let pole = [
            palette::WHITE[0],
            palette::WHITE[1],
            palette::WHITE[2],
            self.color[3],
        ];

        let vertices = (0..=n).flat_map(|i| {
            let (lat_sin, lat_cos) = (step / 2.0 * i as f32).sin_cos();
            let color = if i == n { pole } else { self.color };
            (0..=n).map(move |j| {
                let (lon_sin, lon_cos) = (step * j as f32).sin_cos();
                let position = [
                    self.radius * lat_sin * lon_sin,
                    self.radius * lat_cos,
                    self.radius * lat_sin * lon_cos,
                ];
                let normal = position.map(|c| c / self.radius * CAP_BRIGHTNESS);
                VertexRecord::new(position, normal, color)
            })
        });
        data.push_vertices(vertices);
        data.push_strip(&grid_strip_indices(n + 1, n + 1));
        data
    }
}
