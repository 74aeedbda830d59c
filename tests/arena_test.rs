use solid_ngin::{
    BufferError, RenderContext,
    buffers::{
        ArenaState, BufferAllocator, BufferUsage, GpuBuffer, GpuBufferTable, HostAllocator,
        STRIDE, STRIDE_BYTES, Topology, VertexArena,
    },
};

mod common;
use common::test_utils::{host_context, numbered_vertex, write_raw};

#[test]
fn flush_copies_pending_vertices_into_one_entry() {
    let mut ctx = host_context(100);
    {
        let mut writer = ctx.vertex_writer(80).unwrap();
        for i in 0..80 {
            writer.push(numbered_vertex(i)).unwrap();
        }
        assert_eq!(writer.finish(), 80);
    }
    assert_eq!(ctx.arena().cursor(), 80 * STRIDE);
    assert_eq!(ctx.arena().state(), ArenaState::Writing);

    let entry = ctx.flush().unwrap().expect("non-empty arena flushes");
    assert_eq!(entry.vertex_count(), 80);
    assert!(entry.is_allocated());
    assert_eq!(entry.buffer().size(), 80 * STRIDE_BYTES as u64);
    assert_eq!(entry.buffer().label, "Arena Batch 0");
    let vertices = entry.buffer().vertices();
    assert_eq!(vertices[0], numbered_vertex(0));
    assert_eq!(vertices[79], numbered_vertex(79));

    assert_eq!(ctx.arena().cursor(), 0);
    assert_eq!(ctx.arena().capacity(), 100);
    assert_eq!(ctx.arena().state(), ArenaState::Flushed);
    assert_eq!(ctx.table().len(), 1);
}

#[test]
fn third_generator_triggers_a_single_flush_of_the_first_two() {
    let mut ctx = host_context(100);
    write_raw(&mut ctx, 40);
    write_raw(&mut ctx, 40);
    assert!(ctx.table().is_empty());
    assert_eq!(ctx.arena().cursor(), 80 * STRIDE);

    write_raw(&mut ctx, 40);
    assert_eq!(ctx.table().len(), 1);
    assert_eq!(ctx.table().get(0).unwrap().vertex_count(), 80);
    assert_eq!(ctx.arena().pending_vertices(), 40);

    ctx.flush().unwrap();
    assert_eq!(ctx.reserve(1).unwrap().cursor, 0);
}

#[test]
fn raw_reservation_writes_are_visible_after_commit() {
    let mut ctx = host_context(10);
    write_raw(&mut ctx, 4);
    assert_eq!(ctx.arena().pending_vertices(), 4);
    assert_eq!(ctx.arena().pending().len(), 4 * STRIDE);

    let entry = ctx.flush().unwrap().unwrap();
    assert_eq!(entry.buffer().vertices()[3], numbered_vertex(3));
}

#[test]
fn reserve_flushes_when_arena_is_full() {
    let mut ctx = host_context(100);
    write_raw(&mut ctx, 80);

    let reservation = ctx.reserve(30).unwrap();
    assert_eq!(reservation.cursor, 0);
    assert_eq!(reservation.storage.len(), 100 * STRIDE);

    assert_eq!(ctx.table().len(), 1);
    assert_eq!(ctx.table().get(0).unwrap().vertex_count(), 80);
    assert!(ctx.arena().is_empty());
}

#[test]
fn reserve_that_fits_keeps_the_cursor() {
    let mut ctx = host_context(100);
    write_raw(&mut ctx, 70);

    let reservation = ctx.reserve(30).unwrap();
    assert_eq!(reservation.cursor, 70 * STRIDE);
    assert!(ctx.table().is_empty());
}

#[test]
fn reservation_larger_than_capacity_is_rejected() {
    let mut ctx = host_context(10);
    write_raw(&mut ctx, 3);

    let err = ctx.vertex_writer(11).unwrap_err();
    assert_eq!(
        err,
        BufferError::ReservationTooLarge {
            requested: 11,
            capacity: 10
        }
    );
    // Nothing was flushed on the way.
    assert!(ctx.table().is_empty());
    assert_eq!(ctx.arena().pending_vertices(), 3);
}

#[test]
fn flushing_an_empty_arena_is_a_no_op() {
    let mut ctx = host_context(10);
    assert!(ctx.flush().unwrap().is_none());
    assert!(ctx.table().is_empty());
    assert_eq!(ctx.allocator().created(), 0);
    assert_eq!(ctx.arena().state(), ArenaState::Allocated);
}

#[test]
fn failed_flush_keeps_pending_vertices() {
    let mut ctx = RenderContext::new(HostAllocator::failing_after(0), 10).unwrap_or_else(|e| panic!("{e}"));
    write_raw(&mut ctx, 5);

    let err = ctx.flush().unwrap_err();
    assert!(matches!(err, BufferError::CreationFailed { ref label, .. } if label == "Arena Batch 0"));
    assert_eq!(ctx.arena().pending_vertices(), 5);
    assert_eq!(ctx.arena().state(), ArenaState::Writing);
    assert!(ctx.table().is_empty());
}

#[test]
fn zero_capacity_is_rejected() {
    let ctx = RenderContext::new(HostAllocator::new(), 0);
    assert_eq!(ctx.err(), Some(BufferError::ZeroCapacity));
}

#[test]
fn writer_refuses_to_write_past_its_reservation() {
    let mut ctx = host_context(10);
    {
        let mut writer = ctx.vertex_writer(2).unwrap();
        writer.push(numbered_vertex(0)).unwrap();
        writer.push(numbered_vertex(1)).unwrap();
        assert_eq!(writer.remaining(), 0);
        assert_eq!(
            writer.push(numbered_vertex(2)),
            Err(BufferError::WriterOverflow { reserved: 2 })
        );
    }
    assert_eq!(ctx.arena().pending_vertices(), 2);
}

#[test]
fn dropped_writer_commits_what_was_written() {
    let mut ctx = host_context(10);
    {
        let mut writer = ctx.vertex_writer(5).unwrap();
        for i in 0..3 {
            writer.push(numbered_vertex(i)).unwrap();
        }
        assert_eq!(writer.written(), 3);
    }
    assert_eq!(ctx.arena().pending_vertices(), 3);
    assert_eq!(ctx.arena().cursor() % STRIDE, 0);
}

#[test]
fn commit_past_capacity_is_an_overrun() {
    let mut ctx = host_context(10);
    assert_eq!(
        ctx.commit(11),
        Err(BufferError::CursorOverrun {
            cursor: 11 * STRIDE,
            capacity: 10 * STRIDE
        })
    );
    assert!(ctx.arena().is_empty());
}

#[test]
fn oversized_counts_return_errors_instead_of_overflowing() {
    let mut ctx = host_context(10);
    write_raw(&mut ctx, 2);

    assert_eq!(
        ctx.commit(usize::MAX / 5),
        Err(BufferError::CursorOverrun {
            cursor: usize::MAX,
            capacity: 10 * STRIDE
        })
    );
    assert_eq!(
        ctx.vertex_writer(usize::MAX).unwrap_err(),
        BufferError::ReservationTooLarge {
            requested: usize::MAX,
            capacity: 10
        }
    );
    assert!(!ctx.arena().has_room_for(usize::MAX / 5));
    assert_eq!(ctx.arena().pending_vertices(), 2);

    let mut arena = VertexArena::new();
    assert_eq!(
        arena.allocate(usize::MAX / 5),
        Err(BufferError::ReservationTooLarge {
            requested: usize::MAX / 5,
            capacity: VertexArena::MAX_CAPACITY
        })
    );
    assert_eq!(arena.state(), ArenaState::Uninitialized);
}

#[test]
fn arena_walks_through_its_states() {
    let mut arena = VertexArena::new();
    assert_eq!(arena.state(), ArenaState::Uninitialized);
    assert_eq!(arena.capacity(), 0);
    assert!(!arena.has_room_for(1));

    arena.allocate(4).unwrap();
    assert_eq!(arena.state(), ArenaState::Allocated);
    arena.advance(0).unwrap();
    assert_eq!(arena.state(), ArenaState::Allocated);

    arena.advance(4).unwrap();
    assert_eq!(arena.state(), ArenaState::Writing);
    assert!(!arena.has_room_for(1));

    arena.reset();
    assert_eq!(arena.state(), ArenaState::Flushed);
    assert_eq!(arena.capacity(), 4);
    assert!(arena.has_room_for(4));

    assert_eq!(arena.allocate(0), Err(BufferError::ZeroCapacity));
}

#[test]
fn batches_draw_in_flush_order() {
    let mut ctx = host_context(10);
    write_raw(&mut ctx, 6);
    ctx.flush().unwrap();
    write_raw(&mut ctx, 9);
    ctx.flush().unwrap();

    let commands = ctx.draw_commands(false).unwrap();
    assert_eq!(commands.len(), 2);
    assert_eq!(commands[0].range, 0..6);
    assert_eq!(commands[1].range, 0..9);
    assert!(commands.iter().all(|c| !c.is_indexed()));
    assert!(commands.iter().all(|c| c.topology == Topology::TriangleList));
    assert_eq!(commands[1].vertex_buffer.label, "Arena Batch 1");

    let wireframe = ctx.draw_commands(true).unwrap();
    assert!(wireframe.iter().all(|c| c.topology == Topology::LineList));
    assert_eq!(ctx.table().total_vertices(), 15);
}

#[test]
fn teardown_releases_every_batch() {
    let mut ctx = host_context(10);
    for n in [3, 4, 5] {
        write_raw(&mut ctx, n);
        ctx.flush().unwrap();
    }
    write_raw(&mut ctx, 2);

    assert_eq!(ctx.teardown(), 3);
    assert_eq!(ctx.allocator().destroyed(), 3);
    assert!(ctx.table().is_empty());
    assert!(ctx.arena().is_empty());
    assert_eq!(ctx.arena().capacity(), 10);
}

#[test]
fn released_entries_are_not_drawn() {
    let allocator = HostAllocator::new();
    let mut table = GpuBufferTable::new();
    for label in ["a", "b"] {
        let buffer = allocator
            .create_buffer(label, &[0u8; 3 * STRIDE_BYTES], BufferUsage::Vertex)
            .unwrap();
        table.push(buffer, 3);
    }

    assert_eq!(table.release_all(&allocator), 2);
    assert!(table.iter().all(|e| !e.is_allocated()));
    assert!(table.draw_commands(false).unwrap().is_empty());
    assert_eq!(table.total_vertices(), 0);
    // A second release finds nothing left to free.
    assert_eq!(table.release_all(&allocator), 0);
    assert_eq!(allocator.destroyed(), 2);

    table.clear();
    assert!(table.is_empty());
}

#[test]
fn undersized_buffer_is_an_invalid_handle() {
    let allocator = HostAllocator::new();
    let mut table = GpuBufferTable::new();
    let buffer = allocator
        .create_buffer("tiny", &[0u8; STRIDE_BYTES], BufferUsage::Vertex)
        .unwrap();
    table.push(buffer, 2);

    let err = table.draw_commands(false).unwrap_err();
    assert_eq!(
        err,
        BufferError::InvalidHandle {
            size: STRIDE_BYTES as u64,
            vertex_count: 2
        }
    );
}
