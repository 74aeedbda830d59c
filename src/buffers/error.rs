use thiserror::Error;

/// Errors raised by the vertex arena, the buffer table and mesh uploads.
///
/// Creation failures are fatal: nothing retries them and the arena keeps its
/// pending vertices so the caller can decide what to do next.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("vertex arena capacity must be non-zero")]
    ZeroCapacity,
    #[error("reservation of {requested} vertices exceeds arena capacity of {capacity}")]
    ReservationTooLarge { requested: usize, capacity: usize },
    #[error("cursor advanced to float {cursor}, past arena capacity of {capacity} floats")]
    CursorOverrun { cursor: usize, capacity: usize },
    #[error("vertex writer reserved {reserved} vertices but a write past that was attempted")]
    WriterOverflow { reserved: usize },
    #[error("failed to create buffer '{label}': {reason}")]
    CreationFailed { label: String, reason: String },
    #[error("buffer of {size} bytes cannot hold {vertex_count} vertices")]
    InvalidHandle { size: u64, vertex_count: u32 },
}
