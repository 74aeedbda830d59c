//! Procedural solids.
//!
//! Arena generators (`toroid`, `ellipse`) stream triangles into the shared
//! [`VertexArena`](crate::buffers::VertexArena) through a
//! [`RenderContext`](crate::context::RenderContext). The others build a
//! [`MeshData`](crate::buffers::MeshData) that is uploaded into a private
//! [`GpuMesh`](crate::buffers::GpuMesh).

pub mod cone;
pub mod cylinder;
pub mod ellipse;
pub mod height_map;
pub mod obj;
pub mod sphere;
pub mod strip;
pub mod toroid;

use cgmath::{InnerSpace, Vector3};

pub use cone::Cone;
pub use cylinder::Cylinder;
pub use ellipse::EllipseHelix;
pub use height_map::HeightMap;
pub use obj::ObjMesh;
pub use sphere::Sphere;
pub use strip::StripMesh;
pub use toroid::ToroidHelix;

pub type Color = [f32; 4];

/// Normal scale for OBJ meshes, ellipse helices and cylinder barrels.
pub const BRIGHTNESS: f32 = 7.0;
/// Normal scale for the toroid helix.
pub const TOROID_BRIGHTNESS: f32 = 21.0;
/// Normal length used on caps and sphere surfaces.
pub const CAP_BRIGHTNESS: f32 = 3.0;

pub mod palette {
    use super::Color;

    pub const NICE: Color = [218.0 / 256.0, 182.0 / 256.0, 85.0 / 256.0, 1.0];
    pub const CHIMERA: Color = [229.0 / 256.0, 196.0 / 256.0, 153.0 / 256.0, 1.0];
    pub const TEAPOT_GREEN: Color = [0.0, 0.3, 0.0, 1.0];
    pub const TEAPOT_RED: Color = [0.3, 0.0, 0.0, 1.0];
    pub const GREEN: Color = [0.0, 0.4, 0.0, 1.0];
    pub const RED: Color = [0.6, 0.0, 0.0, 1.0];
    pub const WHITE: Color = [1.0, 1.0, 1.0, 1.0];
}

/// Unit normal of the triangle `p1, p2, p3`: `(p2 - p1) x (p3 - p1)`.
///
/// Zero-area triangles yield the zero vector.
pub fn triangle_normal(p1: [f32; 3], p2: [f32; 3], p3: [f32; 3]) -> [f32; 3] {
    let (p1, p2, p3) = (Vector3::from(p1), Vector3::from(p2), Vector3::from(p3));
    let n = (p2 - p1).cross(p3 - p1);
    let len = n.magnitude();
    if len <= f32::EPSILON {
        return [0.0; 3];
    }
    (n / len).into()
}

/// [`triangle_normal`] scaled by `brightness`.
pub fn flat_normal(p1: [f32; 3], p2: [f32; 3], p3: [f32; 3], brightness: f32) -> [f32; 3] {
    let n = triangle_normal(p1, p2, p3);
    [n[0] * brightness, n[1] * brightness, n[2] * brightness]
}

/// Triangle-strip indices over a row-major grid of `rows` rows and
/// `columns` columns.
///
/// Neighbouring row strips are stitched with two repeated indices, giving
/// `2 * columns * (rows - 1) + 2 * (rows - 2)` indices.
pub fn grid_strip_indices(columns: u32, rows: u32) -> Vec<u32> {
    if columns == 0 || rows < 2 {
        return Vec::new();
    }
    let strips = rows - 1;
    let mut indices = Vec::with_capacity((2 * columns * strips + 2 * (strips - 1)) as usize);
    for row in 0..strips {
        if row > 0 {
            indices.push(row * columns);
        }
        for column in 0..columns {
            indices.push(row * columns + column);
            indices.push((row + 1) * columns + column);
        }
        if row < strips - 1 {
            indices.push((row + 1) * columns + columns - 1);
        }
    }
    indices
}
