//! Pre-allocated point-buffer arena backing the assembler's lookahead window.
//!
//! The assembler needs one full-width point buffer per in-flight profile.
//! Rather than allocating per profile on the hot receive path, the arena
//! pre-allocates a batch of buffers and hands each out exactly once. When a
//! batch is exhausted, a whole new batch is allocated; a retired batch is
//! never resized or reused in place, so every buffer already handed to a
//! profile keeps stable, exclusively owned backing memory for as long as the
//! consumer holds it.

use tracing::{debug, info};

use super::point::Point;
use super::MAX_PROFILE_COLUMNS;

/// Arena of sentinel-filled point buffers, handed out one per profile.
pub struct ProfileArena {
    batch_size: usize,
    free: Vec<Box<[Point]>>,
    batches_allocated: u64,
    buffers_taken: u64,
}

impl ProfileArena {
    /// Create an arena and eagerly allocate its first batch.
    ///
    /// `batch_size` is the number of profile buffers allocated ahead; it
    /// bounds how many profiles can be created before the next batch
    /// allocation, not how many a consumer may retain.
    #[must_use]
    pub fn new(batch_size: usize) -> Self {
        let mut arena = Self {
            batch_size: batch_size.max(1),
            free: Vec::new(),
            batches_allocated: 0,
            buffers_taken: 0,
        };
        arena.allocate_batch();
        info!(
            batch_size = arena.batch_size,
            buffer_columns = MAX_PROFILE_COLUMNS,
            "profile arena created"
        );
        arena
    }

    /// Take the next free buffer, allocating a new batch if the current one
    /// is exhausted. The returned buffer is filled with the invalid sentinel
    /// and owned outright by the caller.
    pub fn take(&mut self) -> Box<[Point]> {
        if self.free.is_empty() {
            self.allocate_batch();
            debug!(
                batch = self.batches_allocated,
                "profile arena batch exhausted, allocated a new one"
            );
        }
        self.buffers_taken += 1;
        // allocate_batch guarantees at least one free buffer
        match self.free.pop() {
            Some(buffer) => buffer,
            None => vec![Point::INVALID; MAX_PROFILE_COLUMNS].into_boxed_slice(),
        }
    }

    fn allocate_batch(&mut self) {
        self.free.reserve(self.batch_size);
        for _ in 0..self.batch_size {
            self.free
                .push(vec![Point::INVALID; MAX_PROFILE_COLUMNS].into_boxed_slice());
        }
        self.batches_allocated += 1;
    }

    /// Number of buffers still available in the current batch.
    #[must_use]
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Number of batches allocated since creation (including the first).
    #[must_use]
    pub fn batches_allocated(&self) -> u64 {
        self.batches_allocated
    }

    /// Total buffers handed out since creation.
    #[must_use]
    pub fn buffers_taken(&self) -> u64 {
        self.buffers_taken
    }
}
