use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};

use once_cell::sync::Lazy;
use parking_lot::Mutex;

/// How many scratch buffers a pool keeps around by default
pub const DEFAULT_MAX_RETAINED: usize = 16;

static GLOBAL: Lazy<ScratchPool> = Lazy::new(ScratchPool::new);

/// A pool of position buffers that buffer-backed iterators stage their matches in, to avoid
/// growing a fresh allocation on every traversal.
///
/// Renting is scoped: [`rent`](ScratchPool::rent) hands out a [`Scratch`] guard and the buffer goes
/// back to the pool when the guard is dropped, including while unwinding from a panicking
/// predicate. The pool is `Sync`; each rental is exclusive to its guard.
#[derive(Debug)]
pub struct ScratchPool {
    buffers: Mutex<Vec<Vec<usize>>>,
    outstanding: AtomicUsize,
    max_retained: usize,
}

impl ScratchPool {
    pub fn new() -> Self {
        Self::with_max_retained(DEFAULT_MAX_RETAINED)
    }

    /// A pool that keeps at most `max_retained` idle buffers; extra returns are dropped
    pub fn with_max_retained(max_retained: usize) -> Self {
        ScratchPool {
            buffers: Mutex::new(Vec::new()),
            outstanding: AtomicUsize::new(0),
            max_retained,
        }
    }

    /// The process-wide pool used by the convenience constructors
    pub fn global() -> &'static ScratchPool {
        &GLOBAL
    }

    /// Take an empty buffer with room for at least `capacity` positions.
    pub fn rent(&self, capacity: usize) -> Scratch<'_> {
        let mut buffer = self.buffers.lock().pop().unwrap_or_default();
        if buffer.capacity() < capacity {
            debug!("scratch pool: growing buffer to {} positions", capacity);
            buffer.reserve(capacity);
        }
        self.outstanding.fetch_add(1, Ordering::AcqRel);
        trace!("scratch pool: rented buffer ({} outstanding)", self.outstanding());
        Scratch { pool: self, buffer }
    }

    /// Number of buffers currently rented out
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Number of idle buffers ready for reuse
    pub fn retained(&self) -> usize {
        self.buffers.lock().len()
    }

    fn give_back(&self, mut buffer: Vec<usize>) {
        buffer.clear();
        self.outstanding.fetch_sub(1, Ordering::AcqRel);
        let mut buffers = self.buffers.lock();
        if buffers.len() < self.max_retained {
            buffers.push(buffer);
        } else {
            debug!("scratch pool: retention limit {} reached, dropping buffer", self.max_retained);
        }
    }
}

impl Default for ScratchPool {
    fn default() -> Self {
        Self::new()
    }
}

/// A buffer rented from a [`ScratchPool`]; returned to the pool on drop.
#[derive(Debug)]
pub struct Scratch<'p> {
    pool: &'p ScratchPool,
    buffer: Vec<usize>,
}

impl<'p> Deref for Scratch<'p> {
    type Target = Vec<usize>;
    fn deref(&self) -> &Vec<usize> {
        &self.buffer
    }
}

impl<'p> DerefMut for Scratch<'p> {
    fn deref_mut(&mut self) -> &mut Vec<usize> {
        &mut self.buffer
    }
}

impl<'p> Drop for Scratch<'p> {
    fn drop(&mut self) {
        let buffer = std::mem::take(&mut self.buffer);
        self.pool.give_back(buffer);
    }
}
