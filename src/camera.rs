//! Fixed look-at camera with touch-driven model rotation, pan and zoom.

use cgmath::{Deg, Matrix4, Point3, SquareMatrix, Vector3, Vector4};

use crate::pipelines::TransformUniform;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

pub const NEAR: f32 = 1.0;
pub const FAR: f32 = 10.0;
/// Smallest frustum scale pinching can reach.
pub const MIN_SCALE: f32 = 0.01;

/// Where a shape sits in the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vector3<f32>,
    pub scale: f32,
}

impl Placement {
    pub fn new(x: f32, y: f32, z: f32, scale: f32) -> Self {
        Self {
            position: Vector3::new(x, y, z),
            scale,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Half-height of the near plane.
    pub scale: f32,
    /// Light position in model space.
    pub light: Vector4<f32>,
    rotation: Matrix4<f32>,
    translation: Vector3<f32>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Point3::new(0.0, 0.0, -0.5),
            target: Point3::new(0.0, 0.0, -5.0),
            up: Vector3::unit_y(),
            scale: 0.5,
            light: Vector4::new(0.0, 0.0, -1.0, 1.0),
            rotation: Matrix4::identity(),
            translation: Vector3::new(0.0, 0.0, 0.0),
        }
    }
}

impl Camera {
    pub fn view(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye, self.target, self.up) * Matrix4::from_translation(self.translation)
    }

    pub fn projection(&self, aspect: f32) -> Matrix4<f32> {
        let (x, y) = (aspect * self.scale, self.scale);
        OPENGL_TO_WGPU_MATRIX * cgmath::frustum(-x, x, -y, y, NEAR, FAR)
    }

    pub fn rotation(&self) -> Matrix4<f32> {
        self.rotation
    }

    /// Rotates every shape by `dx` degrees around y and `dy` around x on top
    /// of the rotation accumulated so far.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        self.rotation = Matrix4::from_angle_y(Deg(dx)) * Matrix4::from_angle_x(Deg(dy)) * self.rotation;
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.translation.x += dx;
        self.translation.y += dy;
    }

    pub fn translation(&self) -> Vector3<f32> {
        self.translation
    }

    /// Applies a pinch gesture. The step shrinks as the view zooms in so
    /// the gesture feels the same at every level.
    pub fn pinch(&mut self, delta_spacing: f32) {
        let step = match self.scale {
            s if s < 0.1 => delta_spacing / 1000.0,
            s if s < 0.5 => delta_spacing / 200.0,
            s if s < 1.0 => delta_spacing / 50.0,
            s if s < 5.0 => delta_spacing / 10.0,
            // Past the far limit only zooming in is allowed.
            _ if delta_spacing > 0.0 => delta_spacing / 10.0,
            _ => 0.0,
        };
        self.scale = (self.scale - step).max(MIN_SCALE);
    }

    pub fn light_eye(&self) -> [f32; 3] {
        let light = self.view() * self.light;
        [light.x, light.y, light.z]
    }

    pub fn model(&self, placement: Placement) -> Matrix4<f32> {
        Matrix4::from_translation(placement.position)
            * Matrix4::from_scale(placement.scale)
            * self.rotation
    }

    pub fn uniform(&self, placement: Placement, aspect: f32) -> TransformUniform {
        let mv = self.view() * self.model(placement);
        TransformUniform::new(self.projection(aspect) * mv, mv, self.light_eye())
    }
}
