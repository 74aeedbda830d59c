//! The displayed scene: which shapes exist, where they sit and how a frame
//! is drawn.

use std::{path::PathBuf, sync::mpsc};

use crate::{
    buffers::{BufferAllocator, BufferError, GpuMesh, MeshData, VertexArena},
    camera::{Camera, Placement},
    context::{GpuContext, RenderContext},
    geometry::{
        Color, Cone, Cylinder, EllipseHelix, HeightMap, ObjMesh, Sphere, StripMesh, ToroidHelix,
        palette,
    },
    input::{MAX_INSTANCES, RenderMode, SceneCommand, SceneHandle},
    pipelines::{ScenePipelines, Shading, TransformSlots},
    render::{Placed, Render},
    resources,
};

/// Transform slots reserved for private meshes, on top of one per arena copy.
pub const MAX_SHAPES: u32 = 16;
/// Name under which a loaded OBJ mesh is registered.
pub const LOADED_MESH: &str = "mesh";
/// Edge length a loaded mesh is scaled to, relative to its auto-scale.
const LOADED_MESH_SIZE: f32 = 0.25;

/// Everything that shapes a scene, adjusted through a configure closure
/// before the renderer is built.
#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub width: u32,
    pub height: u32,
    /// Arena capacity in vertices.
    pub arena_capacity: usize,
    pub clear_colour: wgpu::Color,
    /// Root that `load_mesh` names are resolved against.
    pub asset_dir: PathBuf,
    pub shading: Shading,
    pub wireframe: bool,
    pub render_mode: RenderMode,
    /// Copies of the arena batches drawn per frame at start-up.
    pub instances: u32,
    pub toroid: Option<ToroidHelix>,
    pub ellipse: Option<EllipseHelix>,
    pub cylinder: Option<Cylinder>,
    pub sphere: Option<Sphere>,
    pub cone: Option<Cone>,
    pub height_map: Option<HeightMap>,
    pub strip: Option<StripMesh>,
    /// Upload the strip without its index buffer and draw it vertex by vertex.
    pub strip_direct: bool,
    /// Mesh loaded at start-up.
    pub mesh: Option<String>,
    /// Color for mesh vertices without a material.
    pub mesh_color: Color,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            arena_capacity: VertexArena::DEFAULT_CAPACITY,
            clear_colour: wgpu::Color::BLACK,
            asset_dir: PathBuf::from("./assets"),
            shading: Shading::PerVertex,
            wireframe: false,
            render_mode: RenderMode::IndexedOnly,
            instances: 1,
            toroid: Some(ToroidHelix::default()),
            ellipse: Some(EllipseHelix::new(50, 6.0, 12.0, palette::NICE).with_center([0.0, -20.0, 0.0])),
            cylinder: Some(Cylinder::new(30, 0.25, 0.5, palette::RED)),
            sphere: Some(Sphere::new(30, 0.5, palette::GREEN)),
            cone: Some(Cone::new(50, 0.25, 0.5, palette::NICE, palette::RED)),
            height_map: Some(HeightMap::default()),
            strip: None,
            strip_direct: false,
            mesh: None,
            mesh_color: palette::TEAPOT_GREEN,
        }
    }
}

pub mod placements {
    use std::f32::consts::PI;

    use crate::{camera::Placement, input::LAYER_SIZE};

    /// Scale of every arena copy.
    pub const INSTANCE_SCALE: f32 = 0.03;
    const LAYER_X: [f32; LAYER_SIZE as usize] = [0.0, 1.0, -1.0, 0.0, 0.0, 1.0, 1.0, -1.0, -1.0];
    const LAYER_Y: [f32; LAYER_SIZE as usize] = [0.0, 0.0, 0.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0];

    /// Where `count` arena copies sit, deepest layer first.
    ///
    /// Copies fill 3x3 layers. Each layer sits one unit further back and
    /// spreads wider than the one in front of it, and its centre copy is
    /// pushed out along a spiral that turns once every seven layers.
    pub fn instances(count: u32) -> Vec<Placement> {
        let mut out = Vec::with_capacity(count as usize);
        let mut remaining = count;
        while remaining > 0 {
            let depth = ((remaining - 1) / LAYER_SIZE) as f32;
            let dispersion = depth * 0.9 + 1.0;
            let (sin, cos) = (depth / 7.0 * 2.0 * PI).sin_cos();
            let spiral = (sin * depth * 0.5, cos * depth * 0.5);

            for j in 0..remaining.min(LAYER_SIZE) as usize {
                let (dx, dy) = if j == 0 { spiral } else { (0.0, 0.0) };
                out.push(Placement::new(
                    LAYER_X[j] * dispersion + dx,
                    LAYER_Y[j] * dispersion + dy,
                    -2.5 - depth,
                    INSTANCE_SCALE,
                ));
            }
            remaining = remaining.saturating_sub(LAYER_SIZE);
        }
        out
    }

    pub fn cylinder() -> Placement {
        Placement::new(-0.75, 1.0, -2.5, 1.0)
    }
    pub fn sphere() -> Placement {
        Placement::new(0.0, 1.0, -2.5, 0.6)
    }
    pub fn strip() -> Placement {
        Placement::new(1.0, 0.75, -2.5, 3.5)
    }
    pub fn mesh() -> Placement {
        Placement::new(1.0, 0.75, -2.5, 1.0)
    }
    pub fn height_map() -> Placement {
        Placement::new(-1.0, -1.0, -2.5, 0.05)
    }
    pub fn cone() -> Placement {
        Placement::new(1.0, -1.0, -2.5, 0.9)
    }
}

/// A private mesh and where it is drawn.
#[derive(Debug)]
pub struct SceneMesh<B> {
    pub name: String,
    pub mesh: GpuMesh<B>,
    pub placement: Placement,
}

/// All buffers of a scene: the arena with its flushed batches and every
/// private mesh. Generic over the allocator so it can be built on the host.
pub struct SceneGeometry<A: BufferAllocator> {
    pub arena: RenderContext<A>,
    meshes: Vec<SceneMesh<A::Buffer>>,
}

impl<A: BufferAllocator> SceneGeometry<A> {
    pub fn build(allocator: A, config: &SceneConfig) -> Result<Self, BufferError> {
        let start = instant::Instant::now();
        let mut arena = RenderContext::new(allocator, config.arena_capacity)?;
        if let Some(toroid) = &config.toroid {
            toroid.generate(&mut arena)?;
        }
        if let Some(ellipse) = &config.ellipse {
            ellipse.generate(&mut arena)?;
        }
        arena.flush()?;

        let mut geometry = Self {
            arena,
            meshes: Vec::new(),
        };
        let strip = config.strip.as_ref().map(|strip| {
            let data = strip.mesh();
            if config.strip_direct { data.unindexed() } else { data }
        });
        let private: [(&str, Option<MeshData>, Placement); 5] = [
            ("cylinder", config.cylinder.as_ref().map(Cylinder::mesh), placements::cylinder()),
            ("sphere", config.sphere.as_ref().map(Sphere::mesh), placements::sphere()),
            ("strip", strip, placements::strip()),
            ("height_map", config.height_map.as_ref().map(HeightMap::mesh), placements::height_map()),
            ("cone", config.cone.as_ref().map(Cone::mesh), placements::cone()),
        ];
        for (name, data, placement) in private {
            if let Some(data) = data {
                geometry.insert(name, &data, placement)?;
            }
        }

        log::info!(
            "scene geometry: {} arena vertices in {} batches, {} meshes, built in {:?}",
            geometry.arena.table().total_vertices(),
            geometry.arena.table().len(),
            geometry.meshes.len(),
            start.elapsed()
        );
        Ok(geometry)
    }

    /// Uploads `data` under `name`, releasing a previous mesh of that name.
    pub fn insert(
        &mut self,
        name: &str,
        data: &MeshData,
        placement: Placement,
    ) -> Result<(), BufferError> {
        let mesh = GpuMesh::upload(self.arena.allocator(), name, data)?;
        let entry = SceneMesh {
            name: name.to_string(),
            mesh,
            placement,
        };
        match self.meshes.iter_mut().find(|m| m.name == name) {
            Some(existing) => {
                existing.mesh.release(self.arena.allocator());
                *existing = entry;
            }
            None => self.meshes.push(entry),
        }
        Ok(())
    }

    /// Replaces the loaded OBJ mesh.
    pub fn set_mesh(&mut self, mesh: &ObjMesh, default_color: Color) -> Result<(), BufferError> {
        let mut placement = placements::mesh();
        placement.scale = mesh.auto_scale() * LOADED_MESH_SIZE;
        self.insert(LOADED_MESH, &mesh.build(default_color), placement)
    }

    pub fn meshes(&self) -> &[SceneMesh<A::Buffer>] {
        &self.meshes
    }

    pub fn mesh(&self, name: &str) -> Option<&SceneMesh<A::Buffer>> {
        self.meshes.iter().find(|m| m.name == name)
    }

    /// Releases every buffer the scene owns.
    pub fn release(&mut self) {
        self.arena.teardown();
        for mesh in &mut self.meshes {
            mesh.mesh.release(self.arena.allocator());
        }
        self.meshes.clear();
    }
}

/// Renders a [`SceneGeometry`] with the shading pipelines, driven by a
/// [`SceneHandle`].
pub struct SceneRenderer {
    config: SceneConfig,
    geometry: SceneGeometry<wgpu::Device>,
    pipelines: ScenePipelines,
    transforms: TransformSlots,
    camera: Camera,
    input: SceneHandle,
    commands: mpsc::Receiver<SceneCommand>,
}

impl SceneRenderer {
    pub fn new(gpu: &GpuContext, config: SceneConfig) -> anyhow::Result<Self> {
        let mut geometry = SceneGeometry::build(gpu.device.clone(), &config)?;
        if let Some(name) = &config.mesh {
            match resources::load_mesh(&config.asset_dir, name) {
                Ok(mesh) => geometry.set_mesh(&mesh, config.mesh_color)?,
                Err(e) => log::error!("initial mesh '{name}' not loaded: {e:#}"),
            }
        }

        let transforms = TransformSlots::new(&gpu.device, MAX_INSTANCES + MAX_SHAPES);
        let pipelines = ScenePipelines::new(
            &gpu.device,
            &transforms.bind_group_layout,
            GpuContext::COLOR_FORMAT,
            Some(GpuContext::DEPTH_FORMAT),
        );
        let (input, commands) = SceneHandle::new(config.wireframe, config.shading, config.render_mode);
        input.set_instances(config.instances);

        Ok(Self {
            config,
            geometry,
            pipelines,
            transforms,
            camera: Camera::default(),
            input,
            commands,
        })
    }

    pub fn handle(&self) -> SceneHandle {
        self.input.clone()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn geometry(&self) -> &SceneGeometry<wgpu::Device> {
        &self.geometry
    }

    /// Runs queued commands. A failed load keeps the mesh shown before it.
    fn drain_commands(&mut self) -> Result<(), BufferError> {
        while let Ok(command) = self.commands.try_recv() {
            match command {
                SceneCommand::LoadMesh(name) => {
                    match resources::load_mesh(&self.config.asset_dir, &name) {
                        Ok(mesh) => self.geometry.set_mesh(&mesh, self.config.mesh_color)?,
                        Err(e) => log::error!("mesh '{name}' not loaded: {e:#}"),
                    }
                }
            }
        }
        Ok(())
    }

    /// Draws one frame into the context's color target. Returns the number
    /// of draw calls.
    pub fn render_frame(&mut self, gpu: &GpuContext) -> anyhow::Result<usize> {
        self.drain_commands()?;

        let input = self.input.take_frame();
        self.camera.rotate(input.rotate.0, input.rotate.1);
        self.camera.pan(input.pan.0, input.pan.1);
        if input.pinch != 0.0 {
            self.camera.pinch(input.pinch);
        }
        let wireframe = self.input.wireframe();
        let aspect = gpu.aspect_ratio();

        let mut renders = Vec::new();
        let mut slot = 0;
        for placement in placements::instances(self.input.instances()) {
            self.transforms
                .write(&gpu.queue, slot, &self.camera.uniform(placement, aspect));
            renders.push(Render::Arena(Placed {
                slot,
                commands: self.geometry.arena.draw_commands(wireframe)?,
            }));
            slot += 1;
        }
        for mesh in &self.geometry.meshes {
            if slot >= self.transforms.capacity() {
                log::warn!("no transform slot left for '{}'", mesh.name);
                break;
            }
            self.transforms
                .write(&gpu.queue, slot, &self.camera.uniform(mesh.placement, aspect));
            renders.push(Render::Mesh(Placed {
                slot,
                commands: mesh.mesh.draw_commands(wireframe),
            }));
            slot += 1;
        }

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });
        let draws = {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &gpu.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.config.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &gpu.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });
            Render::Composed(renders).record(
                &mut render_pass,
                &self.pipelines,
                &self.transforms,
                self.input.shading(),
                self.input.render_mode(),
            )
        };
        gpu.queue.submit(std::iter::once(encoder.finish()));
        Ok(draws)
    }

    pub fn teardown(&mut self) {
        self.geometry.release();
    }
}
