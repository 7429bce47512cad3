//! FrameScheduler - fixed-size worker pool with barrier-style phase sync.
//!
//! Every octree phase (insert, check, reset) dispatches a batch of short
//! tasks and blocks until all of them have finished before the next phase may
//! start. Skipping the barrier would race bucket reads against bucket writes.
//!
//! Built on a dedicated rayon pool: the scope exit is the barrier, and a
//! panicking task is caught inside the worker so the barrier can never wait
//! on a dead worker - the fault surfaces as [`TickError::WorkerPanic`]
//! instead.

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::error::{ConfigError, TickError};

/// Default worker count when none is configured.
pub const DEFAULT_WORKER_COUNT: usize = 8;

/// Fixed-size worker pool shared by all octree phases.
///
/// Tasks run to completion on their assigned worker; there is no cooperative
/// scheduling or async suspension. Multiple independent schedulers (and
/// therefore octrees) can coexist in one process.
pub struct FrameScheduler {
  pool: rayon::ThreadPool,
  worker_count: usize,
}

impl FrameScheduler {
  /// Create a scheduler with `worker_count` dedicated threads.
  pub fn new(worker_count: usize) -> Result<Self, ConfigError> {
    let worker_count = worker_count.max(1);
    let pool = rayon::ThreadPoolBuilder::new()
      .num_threads(worker_count)
      .thread_name(|i| format!("collision-worker-{i}"))
      .build()
      .map_err(|e| ConfigError::WorkerPool(e.to_string()))?;
    Ok(Self { pool, worker_count })
  }

  /// Number of workers in the pool.
  #[inline]
  pub fn worker_count(&self) -> usize {
    self.worker_count
  }

  /// Run one phase: dispatch `tasks`, wait for all of them (the barrier),
  /// and surface the first worker fault as an error.
  ///
  /// Task panics are caught inside the worker and reported over a channel,
  /// so every dispatched task signals completion exactly once and the
  /// calling thread never blocks indefinitely.
  pub fn run_phase<F>(&self, phase: &'static str, tasks: Vec<F>) -> Result<(), TickError>
  where
    F: FnOnce() + Send,
  {
    if tasks.is_empty() {
      return Ok(());
    }

    let (tx, rx) = crossbeam_channel::bounded::<Option<String>>(tasks.len());

    // Scope exit blocks until every spawned task has run: this is the phase
    // barrier.
    self.pool.scope(|scope| {
      for task in tasks {
        let tx = tx.clone();
        scope.spawn(move |_| {
          let outcome = catch_unwind(AssertUnwindSafe(task));
          let fault = outcome.err().map(panic_message);
          // Receiver outlives the scope; a send failure is unreachable.
          let _ = tx.send(fault);
        });
      }
    });
    drop(tx);

    for fault in rx.iter().flatten() {
      return Err(TickError::WorkerPanic {
        phase,
        message: fault,
      });
    }
    Ok(())
  }
}

impl Default for FrameScheduler {
  fn default() -> Self {
    // Pool construction only fails on OS thread exhaustion; the default
    // constructor keeps the ergonomic path panicking like Mutex::lock.
    Self::new(DEFAULT_WORKER_COUNT).unwrap()
  }
}

/// Best-effort extraction of a panic payload message.
fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
  if let Some(s) = payload.downcast_ref::<&str>() {
    (*s).to_string()
  } else if let Some(s) = payload.downcast_ref::<String>() {
    s.clone()
  } else {
    "unknown panic payload".to_string()
  }
}
