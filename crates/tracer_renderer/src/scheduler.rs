//! Pixel work distribution across a fixed pool of worker threads.
//!
//! All pixel coordinates sit in one mutex-protected list. Each worker
//! claims a batch under the lock, releases it, and renders the batch
//! without touching shared state except its own framebuffer pixels.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::renderer::{ConfigError, RenderError};

/// Default number of pixels claimed per lock.
pub const DEFAULT_BATCH_SIZE: usize = 16;

/// Integer pixel coordinate, `u` from the left and `v` from the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelCoord {
    pub u: u32,
    pub v: u32,
}

impl PixelCoord {
    pub const fn new(u: u32, v: u32) -> Self {
        Self { u, v }
    }
}

/// Shared list of pixels still to be rendered.
///
/// Coordinates only ever leave the queue, each exactly once.
#[derive(Debug, Default)]
pub struct WorkQueue {
    coords: Mutex<Vec<PixelCoord>>,
}

impl WorkQueue {
    /// Queue every pixel of a `width` x `height` image.
    ///
    /// Coordinates are pushed bottom row last so that popping from the
    /// back hands out the bottom row first.
    pub fn for_image(width: u32, height: u32) -> Result<Self, RenderError> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or(RenderError::ImageTooLarge { width, height })?;

        let mut coords = Vec::new();
        coords
            .try_reserve_exact(len)
            .map_err(|source| RenderError::Allocation { pixels: len, source })?;
        for v in (0..height).rev() {
            for u in 0..width {
                coords.push(PixelCoord::new(u, v));
            }
        }

        Ok(Self::from_coords(coords))
    }

    /// Queue an explicit list of coordinates.
    ///
    /// The caller is responsible for not listing a coordinate twice.
    pub fn from_coords(coords: Vec<PixelCoord>) -> Self {
        Self {
            coords: Mutex::new(coords),
        }
    }

    /// Move up to `max` coordinates into `batch`, replacing its contents.
    ///
    /// Returns the number claimed; zero means the queue is drained.
    pub fn take_batch(&self, max: usize, batch: &mut Vec<PixelCoord>) -> usize {
        batch.clear();
        let mut coords = self.lock();
        let start = coords.len().saturating_sub(max);
        batch.extend(coords.drain(start..).rev());
        batch.len()
    }

    /// Number of coordinates not yet claimed.
    pub fn remaining(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PixelCoord>> {
        // A panicking worker cannot leave the list half-edited, so the data stays valid
        self.coords.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fixed pool of identical workers draining a [`WorkQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduler {
    threads: usize,
    batch_size: usize,
}

impl Scheduler {
    /// Create a scheduler with `threads` workers claiming `batch_size` pixels at a time.
    pub fn new(threads: usize, batch_size: usize) -> Result<Self, ConfigError> {
        if threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }
        if batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        Ok(Self { threads, batch_size })
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Run every worker until the queue is empty.
    ///
    /// Each worker builds its private state with `init(worker_index)` and
    /// calls `work` once per claimed coordinate. Returns the worker states,
    /// indexed by worker, after all workers have joined.
    pub fn run<S, I, W>(&self, queue: &WorkQueue, init: I, work: W) -> Result<Vec<S>, RenderError>
    where
        S: Send,
        I: Fn(usize) -> S + Sync,
        W: Fn(&mut S, PixelCoord) + Sync,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .thread_name(|index| format!("tracer-worker-{index}"))
            .build()?;

        let batch_size = self.batch_size;
        let states = pool.broadcast(|ctx| {
            let mut state = init(ctx.index());
            let mut batch = Vec::with_capacity(batch_size);
            let mut claimed = 0usize;

            while queue.take_batch(batch_size, &mut batch) > 0 {
                for &coord in &batch {
                    work(&mut state, coord);
                }
                claimed += batch.len();
            }

            log::debug!("worker {} finished after {} pixels", ctx.index(), claimed);
            state
        });

        Ok(states)
    }
}
