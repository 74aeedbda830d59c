//! Offscreen entry point: build a scene, draw frames, read pixels back.

use std::time::Duration;

use anyhow::anyhow;

use crate::{
    context::GpuContext,
    input::SceneHandle,
    scene::{SceneConfig, SceneRenderer},
};

/// Copies the context's color target into an image.
pub async fn capture(gpu: &GpuContext) -> anyhow::Result<image::RgbaImage> {
    let u32_size = std::mem::size_of::<u32>() as u32;
    let unpadded = u32_size * gpu.width;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let padded = unpadded.div_ceil(align) * align;

    let output_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Readback Buffer"),
        size: (padded * gpu.height) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Readback Encoder"),
        });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture: &gpu.color,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &output_buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded),
                rows_per_image: Some(gpu.height),
            },
        },
        wgpu::Extent3d {
            width: gpu.width,
            height: gpu.height,
            depth_or_array_layers: 1,
        },
    );
    gpu.queue.submit(std::iter::once(encoder.finish()));

    let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
    let buffer_slice = output_buffer.slice(..);
    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    gpu.device.poll(wgpu::PollType::Wait {
        submission_index: None,
        timeout: Some(Duration::from_secs(3)),
    })?;
    rx.receive()
        .await
        .ok_or_else(|| anyhow!("readback channel closed"))??;

    let pixels = {
        let data = buffer_slice.get_mapped_range();
        data.chunks(padded as usize)
            .flat_map(|row| &row[..unpadded as usize])
            .copied()
            .collect::<Vec<u8>>()
    };
    output_buffer.unmap();

    image::RgbaImage::from_raw(gpu.width, gpu.height, pixels)
        .ok_or_else(|| anyhow!("readback size does not match {}x{}", gpu.width, gpu.height))
}

/// Builds a scene from the default config adjusted by `configure`, lets
/// `drive` queue input before every frame, renders `frames` frames and
/// returns the last one.
pub fn run_headless(
    configure: impl FnOnce(&mut SceneConfig),
    frames: u32,
    mut drive: impl FnMut(u32, &SceneHandle),
) -> anyhow::Result<image::RgbaImage> {
    if env_logger::try_init().is_err() {
        log::debug!("logger already initialised");
    }

    let mut config = SceneConfig::default();
    configure(&mut config);

    futures::executor::block_on(async {
        let gpu = GpuContext::new(config.width, config.height).await?;
        let mut scene = SceneRenderer::new(&gpu, config)?;
        let handle = scene.handle();

        for frame in 0..frames.max(1) {
            drive(frame, &handle);
            let draws = scene.render_frame(&gpu)?;
            log::debug!("frame {frame}: {draws} draw calls");
        }

        let image = capture(&gpu).await?;
        scene.teardown();
        Ok(image)
    })
}
