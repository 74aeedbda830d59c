#![allow(dead_code)]

use std::path::PathBuf;

use solid_ngin::{
    RenderContext, VertexRecord,
    buffers::{HostAllocator, STRIDE},
};

pub(crate) const EPSILON: f32 = 1e-4;

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Arena-backed context that keeps every buffer on the host.
pub(crate) fn host_context(capacity: usize) -> RenderContext<HostAllocator> {
    init_logger();
    RenderContext::new(HostAllocator::new(), capacity).expect("non-zero capacity")
}

pub(crate) fn assets_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets")
}

/// A record whose every field encodes `i`, so reads can be traced back.
pub(crate) fn numbered_vertex(i: usize) -> VertexRecord {
    let f = i as f32;
    VertexRecord::new([f, f + 0.1, f + 0.2], [0.0, 1.0, 0.0], [f / 100.0, 0.0, 0.0, 1.0])
}

/// Writes `count` numbered records through `reserve` / `commit`.
pub(crate) fn write_raw(ctx: &mut RenderContext<HostAllocator>, count: usize) {
    let reservation = ctx.reserve(count).expect("reserve");
    let cursor = reservation.cursor;
    for i in 0..count {
        let offset = cursor + i * STRIDE;
        numbered_vertex(i).write_to(&mut reservation.storage[offset..offset + STRIDE]);
    }
    ctx.commit(count).expect("commit");
}

#[track_caller]
pub(crate) fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "expected {expected}, got {actual}"
    );
}

#[track_caller]
pub(crate) fn assert_vec_close(actual: [f32; 3], expected: [f32; 3]) {
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < EPSILON, "expected {expected:?}, got {actual:?}");
    }
}

/// Pixels that differ from `clear` by more than a rounding step.
#[cfg(feature = "integration-tests")]
pub(crate) fn drawn_pixels(image: &image::RgbaImage, clear: [u8; 4]) -> usize {
    image
        .pixels()
        .filter(|p| p.0.iter().zip(clear).any(|(&a, b)| a.abs_diff(b) > 2))
        .count()
}
