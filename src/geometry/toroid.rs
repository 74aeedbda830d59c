use std::f32::consts::PI;

use cgmath::{InnerSpace, Vector3};

use super::{Color, TOROID_BRIGHTNESS, flat_normal, palette};
use crate::{
    buffers::{BufferAllocator, BufferError, VertexRecord},
    context::RenderContext,
};

/// A tube of radius `tube_radius` following a helix that winds `turns`
/// times around a torus with radii `major_radius` / `minor_radius`.
#[derive(Debug, Clone, PartialEq)]
pub struct ToroidHelix {
    pub major_radius: f32,
    pub minor_radius: f32,
    pub tube_radius: f32,
    pub turns: f32,
    /// Rings along the helix, first and last coincide.
    pub rings: usize,
    /// Points around each ring, first and last coincide.
    pub ring_points: usize,
    pub color: Color,
}

impl Default for ToroidHelix {
    fn default() -> Self {
        Self {
            major_radius: 8.0,
            minor_radius: 4.0,
            tube_radius: 1.0,
            turns: 8.0,
            rings: 129,
            ring_points: 17,
            color: palette::CHIMERA,
        }
    }
}

impl ToroidHelix {
    /// Two triangles per grid cell.
    pub fn vertex_count(&self) -> usize {
        self.rings.saturating_sub(1) * self.ring_points.saturating_sub(1) * 6
    }

    /// Surface points, `rings` rows of `ring_points` each.
    pub fn points(&self) -> Vec<Vec<[f32; 3]>> {
        let phi_step = 2.0 * PI / (self.rings.max(2) - 1) as f32;
        let theta_step = 2.0 * PI / (self.ring_points.max(2) - 1) as f32;
        let (r1, r2, r3, f) = (
            self.major_radius,
            self.minor_radius,
            self.tube_radius,
            self.turns,
        );

        (0..self.rings)
            .map(|i| {
                let phi = i as f32 * phi_step;
                let (sin, cos) = phi.sin_cos();
                let (sin_f, cos_f) = (f * phi).sin_cos();

                let center = Vector3::new(r1 * sin, r1 * cos, 0.0);
                let helix = Vector3::new(
                    center.x + r2 * sin * cos_f,
                    center.y + r2 * cos * cos_f,
                    r2 * sin_f,
                );
                let tangent = Vector3::new(
                    r1 * cos + r2 * cos * cos_f - f * r2 * sin * sin_f,
                    -r1 * sin - r2 * sin * cos_f - f * r2 * cos * sin_f,
                    f * r2 * cos_f,
                )
                .normalize();
                let radial = (helix - center).normalize();
                let binormal = radial.cross(tangent);

                (0..self.ring_points)
                    .map(|j| {
                        let (sin_t, cos_t) = (j as f32 * theta_step).sin_cos();
                        (helix + (radial * cos_t + binormal * sin_t) * r3).into()
                    })
                    .collect()
            })
            .collect()
    }

    /// Streams the helix into the context's arena under a single
    /// reservation, so the whole shape lands in one batch. Returns the
    /// number of vertices written.
    pub fn generate<A: BufferAllocator>(
        &self,
        ctx: &mut RenderContext<A>,
    ) -> Result<usize, BufferError> {
        if self.rings < 2 || self.ring_points < 2 {
            return Ok(0);
        }
        let start = instant::Instant::now();
        let points = self.points();
        let mut writer = ctx.vertex_writer(self.vertex_count())?;

        for pair in points.windows(2) {
            let (ring, next) = (&pair[0], &pair[1]);
            for j in 0..self.ring_points - 1 {
                for [a, b, c] in [
                    [ring[j], next[j + 1], ring[j + 1]],
                    [ring[j], next[j], next[j + 1]],
                ] {
                    let normal = flat_normal(a, b, c, TOROID_BRIGHTNESS);
                    writer.push_triangle([a, b, c].map(|p| VertexRecord::new(p, normal, self.color)))?;
                }
            }
        }
        let written = writer.finish();

        log::info!("toroid helix: {written} vertices in {:?}", start.elapsed());
        Ok(written)
    }
}
