//! Check phase: detect overlapping pairs and apply contact response.
//!
//! The root's own bucket is processed against itself sequentially, then the
//! 8 root subtrees fan out across the workers (one full sequential subtree
//! walk each) with a barrier at the end.
//!
//! Per node, three pairwise sweeps run within the node's own buckets, then
//! repeat between the node's buckets and every strict *ancestor*'s buckets.
//! Descendants are never checked from here - each gets its own
//! `check_node` call during the same fan-out. Coverage argument: insertion
//! promotes a body to the shallowest cell whose splitting planes it
//! straddles, so two interpenetrating bodies always sit on one
//! ancestor/descendant path (or in the same cell). The upward sweep
//! therefore reaches every overlapping pair exactly once, without the
//! redundancy of sibling-vs-sibling checks.

use rand::rngs::SmallRng;

use super::node::NodeId;
use super::resolve::{self, ResponseConfig};
use super::{CollisionOctree, ROOT};
use crate::body::BodySet;
use crate::error::TickError;

impl CollisionOctree {
  /// Detect and resolve all contacts for this tick.
  pub fn check_collisions(
    &self,
    bodies: &BodySet,
    response: &ResponseConfig,
  ) -> Result<(), TickError> {
    self.check_collisions_with(bodies, response, &|_, _| {})
  }

  /// Same as [`check_collisions`](Self::check_collisions), invoking
  /// `on_contact(lower_index, higher_index)` once per detected overlapping
  /// pair - including the pairs whose response is a no-op. Used by the
  /// brute-force cross-check tests and by `tick_timed`'s contact counter.
  pub fn check_collisions_with<F>(
    &self,
    bodies: &BodySet,
    response: &ResponseConfig,
    on_contact: &F,
  ) -> Result<(), TickError>
  where
    F: Fn(usize, usize) + Sync,
  {
    #[cfg(feature = "tracing")]
    let _span = tracing::info_span!("check_collisions").entered();

    // Root bucket vs itself first; the root has no ancestors so this is the
    // complete set of root-local pairs.
    let mut root_rng = response.rng_for(0);
    self.check_node(ROOT, bodies, response, on_contact, &mut root_rng);

    let Some(children) = self.root().children else {
      return Ok(());
    };

    let tasks: Vec<_> = children
      .into_iter()
      .enumerate()
      .map(|(lane, child)| {
        let mut rng = response.rng_for(lane as u64 + 1);
        move || self.check_subtree(child, bodies, response, on_contact, &mut rng)
      })
      .collect();
    self.scheduler().run_phase("check", tasks)
  }

  /// Sequential walk of one subtree, checking every node on the way down.
  fn check_subtree<F>(
    &self,
    node_id: NodeId,
    bodies: &BodySet,
    response: &ResponseConfig,
    on_contact: &F,
    rng: &mut SmallRng,
  ) where
    F: Fn(usize, usize),
  {
    self.check_node(node_id, bodies, response, on_contact, rng);
    if let Some(children) = self.node(node_id).children {
      for child in children {
        self.check_subtree(child, bodies, response, on_contact, rng);
      }
    }
  }

  /// All pairwise sweeps for one node: within its own buckets, then its
  /// buckets against every strict ancestor's buckets.
  fn check_node<F>(
    &self,
    node_id: NodeId,
    bodies: &BodySet,
    response: &ResponseConfig,
    on_contact: &F,
    rng: &mut SmallRng,
  ) where
    F: Fn(usize, usize),
  {
    let node = self.node(node_id);
    let spheres = node.sphere_bodies();
    let boxes = node.box_bodies();
    if spheres.is_empty() && boxes.is_empty() {
      return;
    }

    // Within this node's own buckets.
    for i in 0..spheres.len() {
      for j in (i + 1)..spheres.len() {
        resolve::sphere_pair(bodies, spheres[i], spheres[j], response, on_contact, rng);
      }
    }
    for &sphere in &spheres {
      for &cuboid in &boxes {
        resolve::sphere_box(bodies, sphere, cuboid, on_contact);
      }
    }
    for i in 0..boxes.len() {
      for j in (i + 1)..boxes.len() {
        resolve::box_pair(bodies, boxes[i], boxes[j], on_contact);
      }
    }

    // Upward sweep: this node's buckets against every strict ancestor's.
    let mut ancestor = node.parent;
    while let Some(ancestor_id) = ancestor {
      let ancestor_node = self.node(ancestor_id);
      let ancestor_spheres = ancestor_node.sphere_bodies();
      let ancestor_boxes = ancestor_node.box_bodies();

      for &sphere in &spheres {
        for &other in &ancestor_spheres {
          resolve::sphere_pair(bodies, sphere, other, response, on_contact, rng);
        }
        for &cuboid in &ancestor_boxes {
          resolve::sphere_box(bodies, sphere, cuboid, on_contact);
        }
      }
      for &cuboid in &boxes {
        for &sphere in &ancestor_spheres {
          resolve::sphere_box(bodies, sphere, cuboid, on_contact);
        }
        for &other in &ancestor_boxes {
          resolve::box_pair(bodies, cuboid, other, on_contact);
        }
      }

      ancestor = ancestor_node.parent;
    }
  }
}

#[cfg(test)]
#[path = "check_test.rs"]
mod check_test;
