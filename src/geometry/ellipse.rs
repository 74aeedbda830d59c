use std::f32::consts::PI;

use super::{BRIGHTNESS, Color, flat_normal};
use crate::{
    buffers::{BufferAllocator, BufferError, VertexRecord},
    context::RenderContext,
};

/// Horizontal squash applied to the barrel's x axis.
pub const X_FACTOR: f32 = 2.0 / 9.0;
pub const Z_FACTOR: f32 = 1.0;

/// Open elliptic barrel around `center`, streamed into the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipseHelix {
    pub slices: usize,
    pub radius: f32,
    pub height: f32,
    pub color: Color,
    /// Offset of the barrel's centre inside the arena's model space.
    pub center: [f32; 3],
}

impl EllipseHelix {
    pub fn new(slices: usize, radius: f32, height: f32, color: Color) -> Self {
        Self {
            slices,
            radius,
            height,
            color,
            center: [0.0; 3],
        }
    }

    pub fn with_center(mut self, center: [f32; 3]) -> Self {
        self.center = center;
        self
    }

    /// Six vertices per step. The loop runs `slices + 1` steps so the seam
    /// is covered twice.
    pub fn vertex_count(&self) -> usize {
        if self.slices == 0 {
            return 0;
        }
        (self.slices + 1) * 6
    }

    fn rim(&self, angle: f32, y: f32) -> [f32; 3] {
        let (sin, cos) = angle.sin_cos();
        let [cx, cy, cz] = self.center;
        [
            cx + self.radius * cos * X_FACTOR,
            cy + y,
            cz + self.radius * -sin * Z_FACTOR,
        ]
    }

    pub fn generate<A: BufferAllocator>(
        &self,
        ctx: &mut RenderContext<A>,
    ) -> Result<usize, BufferError> {
        if self.slices == 0 {
            return Ok(0);
        }
        let step = 2.0 * PI / self.slices as f32;
        let half = self.height / 2.0;
        let mut writer = ctx.vertex_writer(self.vertex_count())?;

        for i in 0..=self.slices {
            let (a1, a2) = (i as f32 * step, (i + 1) as f32 * step);
            let (top1, bottom1) = (self.rim(a1, half), self.rim(a1, -half));
            let (top2, bottom2) = (self.rim(a2, half), self.rim(a2, -half));

            for [a, b, c] in [[top1, bottom1, bottom2], [top1, bottom2, top2]] {
                let normal = flat_normal(a, b, c, BRIGHTNESS);
                writer.push_triangle([a, b, c].map(|p| VertexRecord::new(p, normal, self.color)))?;
            }
        }

        Ok(writer.finish())
    }
}
