//! Loading mesh text files from the asset directory.

use std::{
    fs::File,
    io::{BufReader, Cursor},
    path::Path,
};

use anyhow::Context;

use crate::geometry::ObjMesh;

pub fn load_string(root: &Path, file_name: &str) -> anyhow::Result<String> {
    let path = root.join(file_name);
    std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))
}

pub fn open_asset(root: &Path, file_name: &str) -> anyhow::Result<BufReader<File>> {
    let path = root.join(file_name);
    let file = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
    Ok(BufReader::new(file))
}

/// Parses `<name>.mtl` (optional) and `<name>.obj` under `root`.
///
/// A missing or broken material library only costs the material colors.
/// Failing to read the mesh itself fails the whole load.
pub fn load_mesh(root: &Path, name: &str) -> anyhow::Result<ObjMesh> {
    let start = instant::Instant::now();
    let mut mesh = ObjMesh::new();

    match load_string(root, &format!("{name}.mtl")) {
        Ok(text) => {
            if let Err(e) = mesh.parse_materials(&mut BufReader::new(Cursor::new(text))) {
                log::warn!("material library for '{name}' ignored: {e}");
            }
        }
        Err(e) => log::warn!("no material library for '{name}': {e:#}"),
    }

    let reader = open_asset(root, &format!("{name}.obj"))?;
    mesh.parse(reader)
        .with_context(|| format!("parsing mesh '{name}'"))?;

    log::info!("loaded mesh '{name}' in {:?}", start.elapsed());
    Ok(mesh)
}
