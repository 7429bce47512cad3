//! CollisionOctree - fixed-depth broad phase with parallel per-tick phases.
//!
//! The tree is pre-expanded once at build time and reused every tick; only
//! the per-node body buckets are volatile. Each simulation tick runs four
//! phases in a fixed order, with a worker barrier after every parallel one:
//!
//! ```text
//! ┌───────────┐     ┌───────┐     ┌────────┐     ┌──────────────────┐
//! │ Integrate ├────►│ Reset ├────►│ Insert ├────►│ CheckCollisions  │
//! └───────────┘     └───────┘     └────────┘     └──────────────────┘
//!  gravity+Euler    clear buckets  bucket bodies  detect + resolve
//!  (sequential)     (8 subtrees)   (body slices)  (8 subtrees)
//! ```
//!
//! Deviating from this order breaks the "empty buckets before insert" and
//! "complete buckets before check" invariants.
//!
//! # Module Structure
//!
//! - [`node`]: `OctreeNode` - passive cell record with locked buckets
//! - [`insert`]: slice-partitioned parallel insertion
//! - [`check`]: subtree fan-out detection plus the ancestor sweep
//! - [`resolve`]: contact response (positions/velocities mutated in place)

pub mod node;

mod check;
mod insert;
mod resolve;

pub use node::{NodeId, OctreeNode};
pub use resolve::ResponseConfig;

use glam::Vec3;
use web_time::Instant;

use crate::body::BodySet;
use crate::error::{ConfigError, TickError};
use crate::integrator::PhysicsIntegrator;
use crate::scheduler::FrameScheduler;

/// Default tree depth (levels of children below the root).
///
/// Tuning knob: deeper trees trade recursion cost for shorter bucket scans.
pub const DEFAULT_DEPTH: u32 = 7;

/// Maximum supported tree depth.
///
/// Arena indices are `u32`: a fully expanded depth-10 tree already holds
/// more than 2³² nodes, and depth 9 (~153M nodes) is far past any practical
/// memory budget anyway.
pub const MAX_DEPTH: u32 = 9;

/// Arena index of the root node.
const ROOT: NodeId = 0;

/// Fixed-depth octree that buckets bodies, detects overlaps and applies
/// contact response, parallelized over an injected [`FrameScheduler`].
///
/// Caller-owned value: build as many independent instances as needed (tests
/// build small ones). Stateless between ticks apart from the tree shape.
pub struct CollisionOctree {
  nodes: Vec<OctreeNode>,
  depth: u32,
  scheduler: FrameScheduler,
}

impl CollisionOctree {
  /// Build the full tree: every node down to `depth` levels gets its 8
  /// children pre-allocated with center/size computed. Deterministic,
  /// single-threaded, run once (or whenever the playable region resizes).
  pub fn build(
    depth: u32,
    center: Vec3,
    size: f32,
    scheduler: FrameScheduler,
  ) -> Result<Self, ConfigError> {
    if !(size > 0.0 && size.is_finite()) {
      return Err(ConfigError::ZeroSize { size });
    }
    if depth == 0 {
      return Err(ConfigError::ZeroDepth);
    }
    if depth > MAX_DEPTH {
      return Err(ConfigError::ExcessiveDepth {
        depth,
        max: MAX_DEPTH,
      });
    }

    let mut nodes = Vec::with_capacity(node_count(depth));
    nodes.push(OctreeNode::new(center, size, None));
    let mut tree = Self {
      nodes,
      depth,
      scheduler,
    };
    tree.expand(ROOT, depth);
    Ok(tree)
  }

  /// Allocate the 8 children of `node_id` and recurse `levels_left` times.
  fn expand(&mut self, node_id: NodeId, levels_left: u32) {
    if levels_left == 0 {
      return;
    }

    let (center, half, quarter) = {
      let node = &self.nodes[node_id as usize];
      (node.center, node.half, node.quarter)
    };

    let mut children = [0 as NodeId; 8];
    for octant in 0u8..8 {
      let offset = Vec3::new(
        if octant & 1 != 0 { quarter } else { -quarter },
        if octant & 2 != 0 { quarter } else { -quarter },
        if octant & 4 != 0 { quarter } else { -quarter },
      );
      let child_id = self.nodes.len() as NodeId;
      self
        .nodes
        .push(OctreeNode::new(center + offset, half, Some(node_id)));
      children[octant as usize] = child_id;
    }
    self.nodes[node_id as usize].children = Some(children);

    for child in children {
      self.expand(child, levels_left - 1);
    }
  }

  /// Tree depth in levels below the root.
  #[inline]
  pub fn depth(&self) -> u32 {
    self.depth
  }

  /// The root cell.
  #[inline]
  pub fn root(&self) -> &OctreeNode {
    self.node(ROOT)
  }

  /// Look up a node by arena index.
  #[inline]
  pub fn node(&self, id: NodeId) -> &OctreeNode {
    &self.nodes[id as usize]
  }

  /// All nodes in the arena (root first).
  #[inline]
  pub fn nodes(&self) -> &[OctreeNode] {
    &self.nodes
  }

  /// The scheduler driving the parallel phases.
  #[inline]
  pub fn scheduler(&self) -> &FrameScheduler {
    &self.scheduler
  }

  /// Clear every bucket in the tree: root sequentially, then the 8 subtrees
  /// in parallel with a barrier. Structure is kept, only contents drop.
  /// Idempotent - resetting an already-empty tree is a cheap no-op.
  pub fn reset(&self) -> Result<(), TickError> {
    #[cfg(feature = "tracing")]
    let _span = tracing::info_span!("reset").entered();

    let root = self.root();
    root.reset();

    let Some(children) = root.children else {
      return Ok(());
    };

    let tasks: Vec<_> = children
      .into_iter()
      .map(|child| move || self.reset_subtree(child))
      .collect();
    self.scheduler.run_phase("reset", tasks)
  }

  fn reset_subtree(&self, node_id: NodeId) {
    let node = self.node(node_id);
    node.reset();
    if let Some(children) = node.children {
      for child in children {
        self.reset_subtree(child);
      }
    }
  }

  /// Run one full simulation tick: integrate, reset, insert, check.
  ///
  /// Body handles in `bodies` must stay valid for the whole call; the scene
  /// must not mutate shapes or masses while the tick is in flight. On error
  /// the tick is abandoned - the caller decides whether to retry or halt.
  #[cfg_attr(
    feature = "tracing",
    tracing::instrument(skip_all, name = "octree::tick")
  )]
  pub fn tick(
    &self,
    bodies: &BodySet,
    integrator: &PhysicsIntegrator,
    dt: f32,
    response: &ResponseConfig,
  ) -> Result<(), TickError> {
    integrator.step(bodies, dt);
    self.reset()?;
    self.insert(bodies)?;
    self.check_collisions(bodies, response)
  }

  /// Same as [`tick`](Self::tick) but returns per-phase timing and the
  /// number of contacts detected.
  pub fn tick_timed(
    &self,
    bodies: &BodySet,
    integrator: &PhysicsIntegrator,
    dt: f32,
    response: &ResponseConfig,
  ) -> Result<TickStats, TickError> {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let total_start = Instant::now();

    let start = Instant::now();
    integrator.step(bodies, dt);
    let integrate_us = start.elapsed().as_micros() as u64;

    let start = Instant::now();
    self.reset()?;
    let reset_us = start.elapsed().as_micros() as u64;

    let start = Instant::now();
    self.insert(bodies)?;
    let insert_us = start.elapsed().as_micros() as u64;

    let contacts = AtomicUsize::new(0);
    let start = Instant::now();
    self.check_collisions_with(bodies, response, &|_, _| {
      contacts.fetch_add(1, Ordering::Relaxed);
    })?;
    let check_us = start.elapsed().as_micros() as u64;

    Ok(TickStats {
      body_count: bodies.len(),
      contacts: contacts.into_inner(),
      integrate_us,
      reset_us,
      insert_us,
      check_us,
      total_us: total_start.elapsed().as_micros() as u64,
    })
  }
}

/// Total node count of a fully expanded tree of the given depth.
fn node_count(depth: u32) -> usize {
  (0..=depth).map(|level| 8usize.pow(level)).sum()
}

/// Per-tick statistics from [`CollisionOctree::tick_timed`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TickStats {
  /// Bodies processed this tick.
  pub body_count: usize,
  /// Overlapping pairs detected (including response no-op pairs).
  pub contacts: usize,
  /// Integration time in microseconds.
  pub integrate_us: u64,
  /// Reset phase time in microseconds.
  pub reset_us: u64,
  /// Insert phase time in microseconds.
  pub insert_us: u64,
  /// Check phase time in microseconds.
  pub check_us: u64,
  /// Whole tick in microseconds.
  pub total_us: u64,
}
