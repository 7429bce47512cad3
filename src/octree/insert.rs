//! Insert phase: distribute the tick's bodies into the tree buckets.
//!
//! The body list is sliced into `worker_count` contiguous ranges and each
//! worker pushes its slice down the tree independently; per-node bucket
//! locks make concurrent appends to a shared cell safe. The phase barrier
//! guarantees detection never reads buckets insertion is still writing.
//!
//! Placement rule: a body descends while exactly one child cell overlaps its
//! footprint and stops at the shallowest node whose splitting planes it
//! straddles (or at a leaf). That single-placement rule is what lets the
//! check phase cover every overlapping pair exactly once via the
//! node-vs-ancestor sweep.

use glam::Vec3;
use smallvec::SmallVec;

use super::node::NodeId;
use super::{CollisionOctree, ROOT};
use crate::body::{Body, BodySet, Shape};
use crate::bounds::Aabb3;
use crate::error::{ConfigError, TickError};

impl CollisionOctree {
  /// Distribute all bodies into the tree.
  ///
  /// Fails fast on a movable body with non-positive mass (it would divide
  /// by zero in mass-weighted response) before any worker is dispatched.
  pub fn insert(&self, bodies: &BodySet) -> Result<(), TickError> {
    #[cfg(feature = "tracing")]
    let _span = tracing::info_span!("insert").entered();

    for index in 0..bodies.len() {
      let body = bodies.read(index);
      if body.movable && !(body.mass > 0.0) {
        return Err(
          ConfigError::NonPositiveMass {
            index,
            mass: body.mass,
          }
          .into(),
        );
      }
    }

    if bodies.is_empty() {
      return Ok(());
    }

    let slice_len = bodies.len().div_ceil(self.scheduler().worker_count());
    let tasks: Vec<_> = (0..bodies.len())
      .step_by(slice_len)
      .map(|start| {
        let end = (start + slice_len).min(bodies.len());
        move || {
          for index in start..end {
            let body = bodies.read(index);
            self.insert_body(index, &body);
          }
        }
      })
      .collect();

    self.scheduler().run_phase("insert", tasks)
  }

  /// Place one body, starting at the root.
  fn insert_body(&self, index: usize, body: &Body) {
    let aabb = body.aabb();
    let root = self.root();

    // A footprint the root cell cannot contain (larger than the playable
    // region, or poking out of it) cannot be meaningfully subdivided.
    if !root.contains(&aabb) {
      match body.shape {
        Shape::Sphere { .. } => root.push_sphere(index),
        Shape::Box { .. } => root.push_box(index),
      }
      return;
    }

    match body.shape {
      Shape::Sphere { radius } => self.insert_sphere(ROOT, index, body.position, radius),
      Shape::Box { .. } => self.insert_box(ROOT, index, &aabb),
    }
  }

  /// Sphere descent. Per splitting plane through `node.center`, the sphere
  /// footprint overlaps a half iff the squared distance from its center to
  /// the plane is under `radius²` (no sqrt on the hot path).
  fn insert_sphere(&self, node_id: NodeId, index: usize, center: Vec3, radius: f32) {
    let node = self.node(node_id);
    let Some(children) = node.children else {
      // Max depth reached.
      node.push_sphere(index);
      return;
    };

    let r2 = radius * radius;
    let x = axis_halves(center.x, node.center.x, r2);
    let y = axis_halves(center.y, node.center.y, r2);
    let z = axis_halves(center.z, node.center.z, r2);

    match sole_octant(x, y, z) {
      Some(octant) => self.insert_sphere(children[octant as usize], index, center, radius),
      // Straddles at least one splitting plane: no child can hold it alone,
      // so it stays at this cell. The sphere-around-the-center case (all 8
      // children overlapped) is the limiting case of this rule, which also
      // bounds recursion for large-radius bodies near a cell center.
      None => node.push_sphere(index),
    }
  }

  /// Box descent: symmetric logic with interval-overlap tests per axis. A
  /// box straddles 0, 1, 2 or 3 splitting planes, overlapping 1, 2, 4 or 8
  /// children.
  fn insert_box(&self, node_id: NodeId, index: usize, aabb: &Aabb3) {
    let node = self.node(node_id);
    let Some(children) = node.children else {
      node.push_box(index);
      return;
    };

    let x = (aabb.min.x < node.center.x, aabb.max.x > node.center.x);
    let y = (aabb.min.y < node.center.y, aabb.max.y > node.center.y);
    let z = (aabb.min.z < node.center.z, aabb.max.z > node.center.z);

    match sole_octant(x, y, z) {
      Some(octant) => self.insert_box(children[octant as usize], index, aabb),
      None => node.push_box(index),
    }
  }

  /// Debug helper: indices of every node whose buckets hold `index`.
  #[cfg(test)]
  pub(crate) fn nodes_holding(&self, index: usize) -> Vec<NodeId> {
    self
      .nodes()
      .iter()
      .enumerate()
      .filter(|(_, node)| {
        node.sphere_bodies().contains(&index) || node.box_bodies().contains(&index)
      })
      .map(|(id, _)| id as NodeId)
      .collect()
  }
}

/// Half-space overlap flags for one axis: does the footprint reach the
/// low (−) and/or high (+) side of the splitting plane at `plane`?
///
/// A footprint tangent to the plane from one side does not count as reaching
/// the other (strict comparison) - the tie-break that keeps a touching body
/// in a single child.
#[inline]
fn axis_halves(p: f32, plane: f32, r2: f32) -> (bool, bool) {
  let d = p - plane;
  let low = d <= 0.0 || d * d < r2;
  let high = d >= 0.0 || d * d < r2;
  (low, high)
}

/// Combine per-axis half flags (octant bits: 0 = +X, 1 = +Y, 2 = +Z) and
/// return the octant if exactly one child is overlapped, `None` otherwise.
#[inline]
fn sole_octant(x: (bool, bool), y: (bool, bool), z: (bool, bool)) -> Option<u8> {
  let mut hits: SmallVec<[u8; 8]> = SmallVec::new();
  for octant in 0u8..8 {
    let ox = if octant & 1 != 0 { x.1 } else { x.0 };
    let oy = if octant & 2 != 0 { y.1 } else { y.0 };
    let oz = if octant & 4 != 0 { z.1 } else { z.0 };
    if ox && oy && oz {
      hits.push(octant);
    }
  }
  match hits.as_slice() {
    [octant] => Some(*octant),
    _ => None,
  }
}

#[cfg(test)]
#[path = "insert_test.rs"]
mod insert_test;
