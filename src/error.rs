//! Error taxonomy for build-time configuration and per-tick failures.

use thiserror::Error;

/// Configuration errors caught at build or insert time.
///
/// These fail fast instead of letting degenerate geometry produce NaN
/// positions silently mid-simulation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
  /// Octree cell size must be positive.
  #[error("octree size must be > 0, got {size}")]
  ZeroSize {
    /// The rejected edge length.
    size: f32,
  },

  /// A tree with zero levels cannot bucket anything below the root.
  #[error("octree depth must be >= 1")]
  ZeroDepth,

  /// The fully pre-expanded arena grows as 8^depth and its node indices
  /// are `u32`; a tree deeper than the supported maximum would overflow
  /// them (and exhaust memory well before a tick could use it).
  #[error("octree depth must be <= {max}, got {depth}")]
  ExcessiveDepth {
    /// The rejected depth.
    depth: u32,
    /// The supported maximum.
    max: u32,
  },

  /// A movable body with non-positive mass would divide by zero in
  /// mass-weighted contact response.
  #[error("movable body {index} has non-positive mass {mass}")]
  NonPositiveMass {
    /// Index of the offending body in the `BodySet`.
    index: usize,
    /// The rejected mass.
    mass: f32,
  },

  /// The worker pool could not be constructed.
  #[error("failed to build worker pool: {0}")]
  WorkerPool(String),
}

/// Per-tick failures surfaced to the tick driver.
///
/// A tick is not recoverable mid-flight; the driver decides whether to retry
/// next tick or halt the simulation.
#[derive(Debug, Error)]
pub enum TickError {
  /// A worker task panicked during a phase. The phase barrier still
  /// completes (the panic is caught inside the worker), so this never
  /// manifests as a hung frame.
  #[error("worker panicked during {phase} phase: {message}")]
  WorkerPanic {
    /// Which phase faulted: "insert", "check" or "reset".
    phase: &'static str,
    /// Best-effort panic payload.
    message: String,
  },

  /// Invalid configuration detected while starting a phase.
  #[error(transparent)]
  Config(#[from] ConfigError),
}
