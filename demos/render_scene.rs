//! Renders the default scene offscreen and writes it to a PNG.
//!
//! `cargo run --example render_scene -- out.png [mesh] [copies]`

use solid_ngin::headless::run_headless;

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let output = args.next().unwrap_or_else(|| "scene.png".to_string());
    let mesh = args.next().filter(|name| !name.is_empty());
    let instances = args.next().and_then(|n| n.parse().ok()).unwrap_or(1);

    let image = run_headless(
        |config| {
            config.asset_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/assets").into();
            config.mesh = mesh;
            config.instances = instances;
        },
        30,
        |_, handle| handle.rotate(2.0, 1.0),
    )?;
    image.save(&output)?;
    log::info!("wrote {output}");
    Ok(())
}
