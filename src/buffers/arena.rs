//! Growable scratch storage that procedural generators append vertices to.
//!
//! The arena itself never talks to the GPU. Flushing (copying the pending
//! floats into a new buffer and registering it) is driven by
//! [`RenderContext`](crate::context::RenderContext), which owns both the
//! arena and the buffer table.

use super::{
    error::BufferError,
    vertex::{STRIDE, STRIDE_BYTES, VertexRecord},
};

/// Lifecycle of a [`VertexArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArenaState {
    Uninitialized,
    /// Storage exists, nothing has been written since allocation.
    Allocated,
    /// At least one vertex is pending.
    Writing,
    /// The last pending batch was handed off and the cursor is back at zero.
    Flushed,
}

#[derive(Debug)]
pub struct VertexArena {
    storage: Vec<f32>,
    cursor: usize,
    state: ArenaState,
}

impl Default for VertexArena {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexArena {
    /// Default capacity used by scenes, in vertices.
    pub const DEFAULT_CAPACITY: usize = 15_000;
    /// Largest capacity whose storage still fits in one allocation.
    pub const MAX_CAPACITY: usize = isize::MAX as usize / STRIDE_BYTES;

    pub fn new() -> Self {
        Self {
            storage: Vec::new(),
            cursor: 0,
            state: ArenaState::Uninitialized,
        }
    }

    pub fn with_capacity(vertices: usize) -> Result<Self, BufferError> {
        let mut arena = Self::new();
        arena.allocate(vertices)?;
        Ok(arena)
    }

    /// (Re)allocates storage for `vertices` records and rewinds the cursor.
    ///
    /// Pending vertices are discarded.
    pub fn allocate(&mut self, vertices: usize) -> Result<(), BufferError> {
        if vertices == 0 {
            return Err(BufferError::ZeroCapacity);
        }
        let too_large = BufferError::ReservationTooLarge {
            requested: vertices,
            capacity: Self::MAX_CAPACITY,
        };
        if vertices > Self::MAX_CAPACITY {
            return Err(too_large);
        }
        let floats = vertices * STRIDE;
        let mut storage = Vec::new();
        storage.try_reserve_exact(floats).map_err(|_| too_large)?;
        storage.resize(floats, 0.0);
        if self.cursor > 0 {
            log::warn!(
                "reallocating vertex arena discards {} pending vertices",
                self.pending_vertices()
            );
        }
        self.storage = storage;
        self.cursor = 0;
        self.state = ArenaState::Allocated;
        Ok(())
    }

    pub fn state(&self) -> ArenaState {
        self.state
    }

    /// Capacity in vertices.
    pub fn capacity(&self) -> usize {
        self.storage.len() / STRIDE
    }

    /// Write cursor as a float offset.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn pending_vertices(&self) -> usize {
        self.cursor / STRIDE
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    pub fn has_room_for(&self, vertices: usize) -> bool {
        self.cursor_after(vertices)
            .is_some_and(|cursor| cursor <= self.storage.len())
    }

    /// Float offset `vertices` records past the cursor, `None` on overflow.
    fn cursor_after(&self, vertices: usize) -> Option<usize> {
        vertices
            .checked_mul(STRIDE)
            .and_then(|floats| self.cursor.checked_add(floats))
    }

    /// Whole backing storage. Writes past the cursor become visible after
    /// [`advance`](Self::advance).
    pub fn storage_mut(&mut self) -> &mut [f32] {
        &mut self.storage
    }

    /// Floats written so far, `[0, cursor)`.
    pub fn pending(&self) -> &[f32] {
        &self.storage[..self.cursor]
    }

    /// Moves the cursor forward by `vertices` records.
    pub fn advance(&mut self, vertices: usize) -> Result<(), BufferError> {
        let cursor = self.cursor_after(vertices).unwrap_or(usize::MAX);
        if cursor > self.storage.len() {
            return Err(BufferError::CursorOverrun {
                cursor,
                capacity: self.storage.len(),
            });
        }
        self.cursor = cursor;
        if vertices > 0 {
            self.state = ArenaState::Writing;
        }
        Ok(())
    }

    /// Rewinds the cursor after the pending batch was handed off. Capacity is kept.
    pub fn reset(&mut self) {
        self.cursor = 0;
        if self.state != ArenaState::Uninitialized {
            self.state = ArenaState::Flushed;
        }
    }

    /// Typed writer over the next `vertices` slots. The caller has to make
    /// sure there is room; [`RenderContext::vertex_writer`](crate::context::RenderContext::vertex_writer)
    /// flushes first when there is not.
    pub(crate) fn writer(&mut self, vertices: usize) -> Result<VertexWriter<'_>, BufferError> {
        if !self.has_room_for(vertices) {
            return Err(BufferError::ReservationTooLarge {
                requested: vertices,
                capacity: self.capacity(),
            });
        }
        Ok(VertexWriter {
            start: self.cursor,
            arena: self,
            reserved: vertices,
            written: 0,
            committed: false,
        })
    }
}

/// Two-phase write handle: reserve `n` records, push them, commit.
///
/// Whatever was pushed is committed when the writer is finished or dropped,
/// so a generator that bails out half way still leaves the cursor on a
/// record boundary.
#[derive(Debug)]
pub struct VertexWriter<'a> {
    arena: &'a mut VertexArena,
    start: usize,
    reserved: usize,
    written: usize,
    committed: bool,
}

impl VertexWriter<'_> {
    pub fn push(&mut self, vertex: VertexRecord) -> Result<(), BufferError> {
        if self.written == self.reserved {
            return Err(BufferError::WriterOverflow {
                reserved: self.reserved,
            });
        }
        let offset = self.start + self.written * STRIDE;
        vertex.write_to(&mut self.arena.storage[offset..offset + STRIDE]);
        self.written += 1;
        Ok(())
    }

    pub fn push_triangle(&mut self, triangle: [VertexRecord; 3]) -> Result<(), BufferError> {
        triangle.into_iter().try_for_each(|v| self.push(v))
    }

    pub fn reserved(&self) -> usize {
        self.reserved
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn remaining(&self) -> usize {
        self.reserved - self.written
    }

    /// Commits the pushed records and returns how many there were.
    pub fn finish(mut self) -> usize {
        self.commit();
        self.written
    }

    fn commit(&mut self) {
        if self.committed {
            return;
        }
        self.committed = true;
        if self.written < self.reserved {
            log::debug!(
                "vertex writer committed {} of {} reserved vertices",
                self.written,
                self.reserved
            );
        }
        if let Err(e) = self.arena.advance(self.written) {
            log::error!("vertex writer commit failed: {e}");
        }
    }
}

impl Drop for VertexWriter<'_> {
    fn drop(&mut self) {
        self.commit();
    }
}
