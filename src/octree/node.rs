//! OctreeNode - one cell of the statically pre-expanded 8-ary tree.
//!
//! A node is a passive record: bounding geometry, arena links to its parent
//! and 8 children, and two lock-guarded body buckets. All traversal logic
//! lives in [`CollisionOctree`](super::CollisionOctree); the node only
//! answers geometric queries and accepts bucket appends.

use std::sync::Mutex;

use glam::Vec3;

use crate::bounds::Aabb3;

/// Index of a node in the tree's arena.
pub type NodeId = u32;

/// One octree cell.
///
/// Children are stored as an explicit array of 8 arena indices, ordered by
/// octant bits: bit 0 = +X, bit 1 = +Y, bit 2 = +Z. The array is either
/// fully populated or absent - the tree never partially expands a node.
pub struct OctreeNode {
  /// Cell center.
  pub center: Vec3,
  /// Full edge length.
  pub size: f32,
  /// `size / 2` - distance from center to a face.
  pub half: f32,
  /// `size / 4` - offset from this center to a child center.
  pub quarter: f32,
  /// Cell bounds (= center ± half).
  pub bounds: Aabb3,
  /// Parent cell, `None` for the root.
  pub parent: Option<NodeId>,
  /// The 8 children in octant order, `None` at max depth.
  pub children: Option<[NodeId; 8]>,

  /// Sphere bodies bucketed at this cell. Appended concurrently by insert
  /// workers, hence the lock.
  sphere_bucket: Mutex<Vec<usize>>,
  /// Box bodies bucketed at this cell.
  box_bucket: Mutex<Vec<usize>>,
}

impl OctreeNode {
  /// Create a childless node.
  pub fn new(center: Vec3, size: f32, parent: Option<NodeId>) -> Self {
    let half = size * 0.5;
    Self {
      center,
      size,
      half,
      quarter: size * 0.25,
      bounds: Aabb3::from_center_half_extents(center, Vec3::splat(half)),
      parent,
      children: None,
      sphere_bucket: Mutex::new(Vec::new()),
      box_bucket: Mutex::new(Vec::new()),
    }
  }

  /// Does a sphere overlap this cell?
  #[inline]
  pub fn overlaps_sphere(&self, center: Vec3, radius: f32) -> bool {
    self.bounds.overlaps_sphere(center, radius)
  }

  /// Does a box footprint overlap this cell?
  #[inline]
  pub fn overlaps_box(&self, aabb: &Aabb3) -> bool {
    self.bounds.overlaps(aabb)
  }

  /// Is a body footprint fully inside this cell?
  #[inline]
  pub fn contains(&self, aabb: &Aabb3) -> bool {
    self.bounds.contains(aabb)
  }

  /// Lock-append a sphere body index to this cell's bucket.
  #[inline]
  pub fn push_sphere(&self, index: usize) {
    self.sphere_bucket.lock().unwrap().push(index);
  }

  /// Lock-append a box body index to this cell's bucket.
  #[inline]
  pub fn push_box(&self, index: usize) {
    self.box_bucket.lock().unwrap().push(index);
  }

  /// Snapshot the sphere bucket (brief lock, clones the index list).
  pub fn sphere_bodies(&self) -> Vec<usize> {
    self.sphere_bucket.lock().unwrap().clone()
  }

  /// Snapshot the box bucket.
  pub fn box_bodies(&self) -> Vec<usize> {
    self.box_bucket.lock().unwrap().clone()
  }

  /// True if both buckets are empty.
  pub fn is_empty(&self) -> bool {
    self.sphere_bucket.lock().unwrap().is_empty() && self.box_bucket.lock().unwrap().is_empty()
  }

  /// Clear both buckets, keeping their capacity. Children are reset
  /// independently, which is what lets the reset phase fan out per subtree.
  pub fn reset(&self) {
    self.sphere_bucket.lock().unwrap().clear();
    self.box_bucket.lock().unwrap().clear();
  }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
