use std::{f32::consts::PI, sync::mpsc::TryRecvError, thread};

use cgmath::{Vector3, Vector4};
use solid_ngin::{
    BufferError, RenderMode, SceneConfig, SceneHandle,
    buffers::HostAllocator,
    camera::{Camera, MIN_SCALE, Placement},
    geometry::{StripMesh, palette},
    input::{AtomicF32, FrameInput, MAX_INSTANCES, SceneCommand},
    pipelines::Shading,
    render::{Placed, Render},
    resources,
    scene::{LOADED_MESH, SceneGeometry, placements},
};

mod common;
use common::test_utils::{assert_close, assert_vec_close, assets_dir, init_logger};

fn handle() -> (SceneHandle, std::sync::mpsc::Receiver<SceneCommand>) {
    SceneHandle::new(false, Shading::PerVertex, RenderMode::All)
}

#[test]
fn toggles_flip_and_flip_back() {
    let (handle, _commands) = handle();
    let ui = handle.clone();

    ui.toggle_wireframe();
    ui.toggle_shader();
    ui.toggle_render_mode();
    assert!(handle.wireframe());
    assert_eq!(handle.shading(), Shading::PerPixel);
    assert_eq!(handle.render_mode(), RenderMode::IndexedOnly);

    ui.toggle_wireframe();
    ui.toggle_shader();
    ui.toggle_render_mode();
    assert!(!handle.wireframe());
    assert_eq!(handle.shading(), Shading::PerVertex);
    assert_eq!(handle.render_mode(), RenderMode::All);
}

#[test]
fn initial_toggles_come_from_the_constructor() {
    let (handle, _commands) = SceneHandle::new(true, Shading::PerPixel, RenderMode::IndexedOnly);
    assert!(handle.wireframe());
    assert_eq!(handle.shading(), Shading::PerPixel);
    assert_eq!(handle.render_mode(), RenderMode::IndexedOnly);
    assert_eq!(Shading::PerPixel.toggled(), Shading::PerVertex);
}

#[test]
fn gesture_deltas_accumulate_across_threads_until_taken() {
    let (handle, _commands) = handle();
    let workers: Vec<_> = (0..4)
        .map(|_| {
            let ui = handle.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    ui.rotate(1.0, 2.0);
                    ui.pan(0.5, -0.5);
                    ui.pinch(1.0);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let frame = handle.take_frame();
    assert_eq!(frame.rotate, (400.0, 800.0));
    assert_eq!(frame.pan, (200.0, -200.0));
    assert_eq!(frame.pinch, 400.0);
    assert_eq!(handle.take_frame(), FrameInput::default());
}

#[test]
fn atomic_f32_take_resets_to_zero() {
    let value = AtomicF32::new(1.5);
    value.add(2.0);
    assert_eq!(value.load(), 3.5);
    assert_eq!(value.take(), 3.5);
    assert_eq!(value.load(), 0.0);
    value.store(-4.0);
    assert_eq!(value.load(), -4.0);
}

#[test]
fn mesh_loads_are_queued_in_order() {
    let (handle, commands) = handle();
    assert!(handle.load_mesh("cube"));
    assert!(handle.clone().load_mesh("teapot"));

    assert_eq!(commands.try_recv(), Ok(SceneCommand::LoadMesh("cube".into())));
    assert_eq!(commands.try_recv(), Ok(SceneCommand::LoadMesh("teapot".into())));
    assert_eq!(commands.try_recv(), Err(TryRecvError::Empty));

    drop(commands);
    assert!(!handle.load_mesh("cube"));
}

#[test]
fn pinch_steps_shrink_as_the_view_zooms_in() {
    let mut camera = Camera::default();
    assert_close(camera.scale, 0.5);

    camera.pinch(10.0);
    assert_close(camera.scale, 0.3);
    camera.pinch(10.0);
    assert_close(camera.scale, 0.25);
    camera.pinch(-100.0);
    assert_close(camera.scale, 0.75);

    camera.pinch(1000.0);
    assert_eq!(camera.scale, MIN_SCALE);
}

#[test]
fn camera_rotation_and_pan_accumulate() {
    let mut camera = Camera::default();
    camera.rotate(90.0, 0.0);
    let x = camera.rotation() * Vector4::unit_x();
    assert_vec_close([x.x, x.y, x.z], [0.0, 0.0, -1.0]);

    camera.rotate(-90.0, 0.0);
    let x = camera.rotation() * Vector4::unit_x();
    assert_vec_close([x.x, x.y, x.z], [1.0, 0.0, 0.0]);

    camera.pan(0.5, 0.25);
    camera.pan(0.5, 0.25);
    assert_eq!(camera.translation().x, 1.0);
    assert_eq!(camera.translation().y, 0.5);
    assert_eq!(camera.translation().z, 0.0);
}

#[test]
fn uniform_places_shapes_in_eye_space() {
    let camera = Camera::default();
    assert_vec_close(camera.light_eye(), [0.0, 0.0, -0.5]);

    let uniform = camera.uniform(Placement::new(0.0, 0.0, -2.5, 1.0), 4.0 / 3.0);
    let origin = uniform.mv[3];
    assert_vec_close([origin[0], origin[1], origin[2]], [0.0, 0.0, -2.0]);
    assert_eq!(uniform.light_pos[3], 1.0);
}

fn square_strip() -> StripMesh {
    let positions: [f32; 12] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0];
    let normals = [0.0f32, 0.0, 1.0].repeat(4);
    StripMesh::new(&positions, &normals, vec![0, 1, 2, 3], palette::TEAPOT_RED)
}

#[test]
fn indexed_only_mode_hides_direct_meshes_but_never_the_arena() {
    init_logger();
    let config = SceneConfig {
        strip: Some(square_strip()),
        strip_direct: true,
        ..SceneConfig::default()
    };
    let geometry = SceneGeometry::build(HostAllocator::new(), &config).unwrap();
    let strip = geometry.mesh("strip").unwrap();
    assert!(strip.mesh.index_buffer().is_none());
    assert_eq!(strip.mesh.vertex_count(), 4);

    let slots = |mode| {
        let mut renders = vec![Render::Arena(Placed {
            slot: 0,
            commands: geometry.arena.draw_commands(false).unwrap(),
        })];
        for (i, mesh) in geometry.meshes().iter().enumerate() {
            renders.push(Render::Mesh(Placed {
                slot: i as u32 + 1,
                commands: mesh.mesh.draw_commands(false),
            }));
        }
        let mut placed = Vec::new();
        Render::Composed(vec![Render::None, Render::Composed(renders)]).flatten(mode, &mut placed);
        placed.iter().map(|p| p.slot).collect::<Vec<_>>()
    };

    // cylinder, sphere, strip, height_map, cone
    assert_eq!(slots(RenderMode::All), vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(slots(RenderMode::IndexedOnly), vec![0, 1, 2, 4, 5]);
}

#[test]
fn indexed_strip_stays_visible_by_default() {
    init_logger();
    assert_eq!(SceneConfig::default().render_mode, RenderMode::IndexedOnly);
    assert_eq!(RenderMode::default(), RenderMode::IndexedOnly);

    let config = SceneConfig {
        strip: Some(square_strip()),
        ..SceneConfig::default()
    };
    let geometry = SceneGeometry::build(HostAllocator::new(), &config).unwrap();
    let strip = geometry.mesh("strip").unwrap();
    assert!(strip.mesh.index_buffer().is_some());

    let mut placed = Vec::new();
    Render::Mesh(Placed {
        slot: 0,
        commands: strip.mesh.draw_commands(false),
    })
    .flatten(RenderMode::IndexedOnly, &mut placed);
    assert_eq!(placed.len(), 1);
}

#[test]
fn instance_count_steps_by_one_then_by_layers() {
    let (handle, _commands) = handle();
    assert_eq!(handle.instances(), 1);
    assert_eq!(handle.fewer_instances(), 1);

    let up: Vec<_> = (0..10).map(|_| handle.clone().more_instances()).collect();
    assert_eq!(up, vec![2, 3, 4, 5, 6, 7, 8, 9, 18, 27]);
    let down: Vec<_> = (0..5).map(|_| handle.fewer_instances()).collect();
    assert_eq!(down, vec![18, 9, 8, 7, 6]);

    handle.set_instances(1000);
    assert_eq!(handle.instances(), MAX_INSTANCES);
    assert_eq!(handle.more_instances(), MAX_INSTANCES);
    handle.set_instances(0);
    assert_eq!(handle.instances(), 1);
}

#[test]
fn arena_copies_fill_layers_that_step_back() {
    assert!(placements::instances(0).is_empty());
    assert_eq!(
        placements::instances(1),
        vec![Placement::new(0.0, 0.0, -2.5, placements::INSTANCE_SCALE)]
    );

    let front = placements::instances(9);
    assert_eq!(front.len(), 9);
    assert!(front.iter().all(|p| p.position.z == -2.5 && p.scale == 0.03));
    assert_eq!(front[5].position, Vector3::new(1.0, 1.0, -2.5));
    assert_eq!(front[8].position, Vector3::new(-1.0, -1.0, -2.5));

    // The deeper layer comes first, spread wider and one unit further back.
    let two = placements::instances(18);
    assert_eq!(two.len(), 18);
    assert!(two[..9].iter().all(|p| p.position.z == -3.5));
    assert_eq!(&two[9..], &front[..]);
    let angle = 2.0 * PI / 7.0;
    assert_vec_close(two[0].position.into(), [angle.sin() * 0.5, angle.cos() * 0.5, -3.5]);
    assert_vec_close(two[1].position.into(), [1.9, 0.0, -3.5]);
    assert_vec_close(two[8].position.into(), [-1.9, -1.9, -3.5]);
}

#[test]
fn default_scene_builds_on_the_host() {
    init_logger();
    let geometry = SceneGeometry::build(HostAllocator::new(), &SceneConfig::default()).unwrap();

    let table = geometry.arena.table();
    assert_eq!(table.len(), 1);
    assert_eq!(table.total_vertices(), 12288 + 306);
    assert!(geometry.arena.arena().is_empty());

    let names: Vec<_> = geometry.meshes().iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["cylinder", "sphere", "height_map", "cone"]);
    assert!(geometry.mesh("strip").is_none());
    assert_eq!(geometry.arena.allocator().created(), 1 + 4 * 2);
}

#[test]
fn each_arena_shape_stays_in_one_batch() {
    init_logger();
    let config = SceneConfig {
        arena_capacity: 12_500,
        ..SceneConfig::default()
    };
    let geometry = SceneGeometry::build(HostAllocator::new(), &config).unwrap();

    let counts: Vec<_> = geometry.arena.table().iter().map(|e| e.vertex_count()).collect();
    assert_eq!(counts, vec![12288, 306]);
}

#[test]
fn arena_smaller_than_a_shape_fails_the_build() {
    init_logger();
    let config = SceneConfig {
        arena_capacity: 500,
        ..SceneConfig::default()
    };
    let err = SceneGeometry::build(HostAllocator::new(), &config).err();
    assert_eq!(
        err,
        Some(BufferError::ReservationTooLarge {
            requested: 12288,
            capacity: 500
        })
    );
}

#[test]
fn scene_without_arena_shapes_has_no_batches() {
    init_logger();
    let config = SceneConfig {
        toroid: None,
        ellipse: None,
        cone: None,
        ..SceneConfig::default()
    };
    let geometry = SceneGeometry::build(HostAllocator::new(), &config).unwrap();

    assert!(geometry.arena.table().is_empty());
    assert_eq!(geometry.meshes().len(), 3);
}

#[test]
fn loading_a_mesh_replaces_the_previous_one() {
    init_logger();
    let mut geometry = SceneGeometry::build(HostAllocator::new(), &SceneConfig::default()).unwrap();
    let cube = resources::load_mesh(&assets_dir(), "cube").unwrap();

    geometry.set_mesh(&cube, palette::TEAPOT_GREEN).unwrap();
    geometry.set_mesh(&cube, palette::TEAPOT_GREEN).unwrap();

    assert_eq!(geometry.meshes().len(), 5);
    let loaded = geometry.mesh(LOADED_MESH).unwrap();
    assert_eq!(loaded.mesh.index_count(), 36);
    assert_close(loaded.placement.scale, 2.0 / 3.0 * 0.25);
    assert_eq!(geometry.arena.allocator().destroyed(), 2);

    geometry.release();
    assert!(geometry.meshes().is_empty());
    assert!(geometry.arena.table().is_empty());
    assert_eq!(geometry.arena.allocator().destroyed(), 2 + 1 + 5 * 2);
}
