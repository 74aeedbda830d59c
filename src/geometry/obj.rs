//! Line-oriented OBJ mesh parsing.
//!
//! Only the records the renderer needs are consumed: `v`, `vn`, `vt`, `f`
//! and `usemtl`. Material colors come from the `Ka` entries of the
//! accompanying material library. Malformed numbers are logged and read as
//! zero; everything else on a bad line is still used.

use std::{collections::HashMap, io::BufRead};

use anyhow::Context;

use super::{BRIGHTNESS, Color, flat_normal};
use crate::buffers::{MeshData, VertexRecord};

/// Fan pattern that splits a quad into two triangles.
pub const QUAD_TRIANGLES: [usize; 6] = [0, 1, 2, 0, 2, 3];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl BoundingBox {
    fn at(point: [f32; 3]) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    fn extend(&mut self, point: [f32; 3]) {
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(point[axis]);
            self.max[axis] = self.max[axis].max(point[axis]);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ObjMesh {
    positions: Vec<[f32; 3]>,
    vertex_colors: Vec<Option<Color>>,
    normals: Vec<[f32; 3]>,
    tex_coords: Vec<[f32; 2]>,
    indices: Vec<i64>,
    /// One entry per element of `indices`, `None` where the corner had no
    /// normal.
    normal_indices: Vec<Option<i64>>,
    /// Same shape as `normal_indices`.
    texture_indices: Vec<Option<i64>>,
    materials: HashMap<String, [f32; 3]>,
    active_material: Option<[f32; 3]>,
    bounds: Option<BoundingBox>,
}

impl ObjMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `newmtl` / `Ka` pairs. Materials without an ambient color are
    /// skipped.
    pub fn parse_materials<R: BufRead>(&mut self, reader: &mut R) -> anyhow::Result<()> {
        let (materials, _) = tobj::load_mtl_buf(reader)?;
        for material in materials {
            match material.ambient {
                Some(ka) => {
                    self.materials.insert(material.name, ka);
                }
                None => log::debug!("material '{}' has no Ka color", material.name),
            }
        }
        Ok(())
    }

    pub fn insert_material(&mut self, name: impl Into<String>, ambient: [f32; 3]) {
        self.materials.insert(name.into(), ambient);
    }

    /// Parses OBJ records from `reader`, appending to what was parsed before.
    pub fn parse<R: BufRead>(&mut self, reader: R) -> anyhow::Result<()> {
        for (number, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("reading mesh line {}", number + 1))?;
            self.parse_line(&line, number + 1);
        }
        log::info!(
            "parsed {} vertices, {} triangles, bounds {:?}",
            self.positions.len(),
            self.indices.len() / 3,
            self.bounds
        );
        Ok(())
    }

    pub fn parse_str(&mut self, text: &str) {
        for (number, line) in text.lines().enumerate() {
            self.parse_line(line, number + 1);
        }
    }

    fn parse_line(&mut self, line: &str, number: usize) {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let point: [f32; 3] = parse_floats(&mut tokens, number);
                self.bounds = Some(match self.bounds {
                    Some(mut bounds) => {
                        bounds.extend(point);
                        bounds
                    }
                    None => BoundingBox::at(point),
                });
                self.positions.push(point);
                self.vertex_colors
                    .push(self.active_material.map(|[r, g, b]| [r, g, b, 1.0]));
            }
            Some("vn") => self.normals.push(parse_floats(&mut tokens, number)),
            Some("vt") => self.tex_coords.push(parse_floats(&mut tokens, number)),
            Some("f") => self.parse_face(tokens, number),
            Some("usemtl") => {
                let name = tokens.next().unwrap_or_default();
                match self.materials.get(name) {
                    Some(&color) => self.active_material = Some(color),
                    None => log::warn!("line {number}: unknown material '{name}'"),
                }
            }
            _ => (),
        }
    }

    fn parse_face<'a>(&mut self, tokens: impl Iterator<Item = &'a str>, number: usize) {
        let mut corners = Vec::new();
        for token in tokens {
            let mut parts = token.split('/');
            let Some(vertex) = parse_index(parts.next(), self.positions.len(), number) else {
                log::warn!("line {number}: bad face corner '{token}', face skipped");
                return;
            };
            let texture = parse_index(parts.next(), self.tex_coords.len(), number);
            let normal = parse_index(parts.next(), self.normals.len(), number);
            corners.push((vertex, texture, normal));
        }

        let order: Vec<usize> = match corners.len() {
            0..=2 => {
                log::warn!("line {number}: face with {} corners skipped", corners.len());
                return;
            }
            3 => vec![0, 1, 2],
            4 => QUAD_TRIANGLES.to_vec(),
            n => (1..n - 1).flat_map(|i| [0, i, i + 1]).collect(),
        };

        for i in order {
            let (vertex, texture, normal) = corners[i];
            self.indices.push(vertex);
            self.texture_indices.push(texture);
            self.normal_indices.push(normal);
        }
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    pub fn tex_coords(&self) -> &[[f32; 2]] {
        &self.tex_coords
    }

    /// Resolved 0-based vertex indices, three per triangle. Entries can
    /// still be invalid; [`build`](Self::build) skips those triangles.
    pub fn indices(&self) -> &[i64] {
        &self.indices
    }

    /// Normal index of each corner in [`indices`](Self::indices).
    pub fn normal_indices(&self) -> &[Option<i64>] {
        &self.normal_indices
    }

    /// Texture coordinate index of each corner in [`indices`](Self::indices).
    pub fn texture_indices(&self) -> &[Option<i64>] {
        &self.texture_indices
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        self.bounds
    }

    /// Uniform scale that brings the mesh to roughly unit size.
    pub fn auto_scale(&self) -> f32 {
        let Some(bounds) = self.bounds else {
            return 1.0;
        };
        let half_extent = bounds.max.iter().sum::<f32>() / 2.0;
        if half_extent <= f32::EPSILON {
            return 1.0;
        }
        1.0 / half_extent
    }

    fn resolve(&self, index: i64) -> Option<u32> {
        (0..self.positions.len() as i64)
            .contains(&index)
            .then_some(index as u32)
    }

    /// Interleaved vertices with flat face normals.
    ///
    /// Every triangle writes its normal to all three of its vertices, so a
    /// vertex shared between faces keeps the normal of the last one.
    pub fn build(&self, default_color: Color) -> MeshData {
        let mut vertices: Vec<VertexRecord> = self
            .positions
            .iter()
            .zip(&self.vertex_colors)
            .map(|(&p, color)| VertexRecord::new(p, [0.0; 3], color.unwrap_or(default_color)))
            .collect();

        let mut triangles = Vec::with_capacity(self.indices.len());
        for (n, triangle) in self.indices.chunks_exact(3).enumerate() {
            let resolved: Option<Vec<u32>> = triangle.iter().map(|&i| self.resolve(i)).collect();
            let Some(corners) = resolved else {
                log::error!("triangle {n} references {triangle:?}, skipped");
                continue;
            };
            let [a, b, c] = [corners[0], corners[1], corners[2]].map(|i| i as usize);
            let normal = flat_normal(
                vertices[a].position,
                vertices[b].position,
                vertices[c].position,
                BRIGHTNESS,
            );
            for i in [a, b, c] {
                vertices[i].normal = normal;
            }
            triangles.extend(corners);
        }

        let mut data = MeshData::new();
        data.push_vertices(vertices);
        data.push_triangles(&triangles);
        data
    }
}

fn parse_floats<'a, const N: usize>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line: usize,
) -> [f32; N] {
    let mut out = [0.0; N];
    for value in out.iter_mut() {
        *value = match tokens.next() {
            Some(token) => token.parse().unwrap_or_else(|_| {
                log::warn!("line {line}: malformed number '{token}', using 0");
                0.0
            }),
            None => {
                log::warn!("line {line}: missing coordinate, using 0");
                0.0
            }
        };
    }
    out
}

/// 1-based positive or count-relative negative index to 0-based. Empty
/// fields (as in `v//vn`) yield `None`.
fn parse_index(field: Option<&str>, count: usize, line: usize) -> Option<i64> {
    let field = field.filter(|f| !f.is_empty())?;
    match field.parse::<i64>() {
        Ok(index) if index < 0 => Some(index + count as i64),
        Ok(index) => Some(index - 1),
        Err(_) => {
            log::warn!("line {line}: malformed index '{field}'");
            None
        }
    }
}
