//! Axis-aligned bounding box used for octree cells and box-shaped bodies.

use glam::Vec3;

/// Single-precision axis-aligned bounding box.
///
/// Doubles as the geometry of an octree cell (center ± half edge) and as the
/// world-space footprint of a box body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb3 {
  /// Minimum corner (inclusive).
  pub min: Vec3,
  /// Maximum corner (inclusive).
  pub max: Vec3,
}

impl Aabb3 {
  /// Create a new AABB from min and max corners.
  ///
  /// # Panics
  /// Debug-asserts that min <= max on all axes.
  pub fn new(min: Vec3, max: Vec3) -> Self {
    debug_assert!(
      min.x <= max.x && min.y <= max.y && min.z <= max.z,
      "AABB min must be <= max on all axes"
    );
    Self { min, max }
  }

  /// Create a new AABB from center and half-extents.
  pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
    Self {
      min: center - half_extents,
      max: center + half_extents,
    }
  }

  /// Check if this AABB overlaps with another.
  ///
  /// Two AABBs overlap if they share any interior or boundary points.
  #[inline]
  pub fn overlaps(&self, other: &Aabb3) -> bool {
    self.min.x <= other.max.x
      && self.max.x >= other.min.x
      && self.min.y <= other.max.y
      && self.max.y >= other.min.y
      && self.min.z <= other.max.z
      && self.max.z >= other.min.z
  }

  /// Check if this AABB strictly interpenetrates another.
  ///
  /// Unlike [`overlaps`](Self::overlaps), two boxes that merely share a
  /// boundary face, edge or corner do not count - the same tie-break that
  /// keeps a plane-tangent box on a single side of a splitting plane.
  #[inline]
  pub fn penetrates(&self, other: &Aabb3) -> bool {
    self.min.x < other.max.x
      && self.max.x > other.min.x
      && self.min.y < other.max.y
      && self.max.y > other.min.y
      && self.min.z < other.max.z
      && self.max.z > other.min.z
  }

  /// Check if this AABB fully contains another (boundary counts as inside).
  #[inline]
  pub fn contains(&self, other: &Aabb3) -> bool {
    self.min.x <= other.min.x
      && self.max.x >= other.max.x
      && self.min.y <= other.min.y
      && self.max.y >= other.max.y
      && self.min.z <= other.min.z
      && self.max.z >= other.max.z
  }

  /// Check if this AABB contains a point.
  #[inline]
  pub fn contains_point(&self, point: Vec3) -> bool {
    point.x >= self.min.x
      && point.x <= self.max.x
      && point.y >= self.min.y
      && point.y <= self.max.y
      && point.z >= self.min.z
      && point.z <= self.max.z
  }

  /// Closest point on or inside this AABB to `point` (per-axis clamp).
  #[inline]
  pub fn closest_point(&self, point: Vec3) -> Vec3 {
    point.clamp(self.min, self.max)
  }

  /// Squared distance from `point` to this AABB (0 if the point is inside).
  #[inline]
  pub fn distance_squared_to_point(&self, point: Vec3) -> f32 {
    (point - self.closest_point(point)).length_squared()
  }

  /// Check if a sphere overlaps this AABB.
  #[inline]
  pub fn overlaps_sphere(&self, center: Vec3, radius: f32) -> bool {
    self.distance_squared_to_point(center) <= radius * radius
  }

  /// Get the size of the AABB (max - min).
  #[inline]
  pub fn size(&self) -> Vec3 {
    self.max - self.min
  }

  /// Get the center of the AABB.
  #[inline]
  pub fn center(&self) -> Vec3 {
    (self.min + self.max) * 0.5
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_new() {
    let aabb = Aabb3::new(Vec3::new(-1.0, -2.0, -3.0), Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, -3.0));
    assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 3.0));
  }

  #[test]
  fn test_from_center_half_extents() {
    let aabb = Aabb3::from_center_half_extents(Vec3::ZERO, Vec3::splat(10.0));
    assert_eq!(aabb.min, Vec3::splat(-10.0));
    assert_eq!(aabb.max, Vec3::splat(10.0));
  }

  #[test]
  fn test_overlaps_touching() {
    // Touching at boundary should count as overlapping
    let a = Aabb3::new(Vec3::ZERO, Vec3::splat(10.0));
    let b = Aabb3::new(Vec3::splat(10.0), Vec3::splat(20.0));
    assert!(a.overlaps(&b));
    assert!(b.overlaps(&a));
  }

  #[test]
  fn test_overlaps_false() {
    let a = Aabb3::new(Vec3::ZERO, Vec3::splat(10.0));
    let b = Aabb3::new(Vec3::splat(11.0), Vec3::splat(20.0));
    assert!(!a.overlaps(&b));
    assert!(!b.overlaps(&a));
  }

  #[test]
  fn test_penetrates_is_strict() {
    let a = Aabb3::new(Vec3::ZERO, Vec3::splat(10.0));
    let touching = Aabb3::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(20.0, 10.0, 10.0));
    let penetrating = Aabb3::new(Vec3::new(9.0, 0.0, 0.0), Vec3::new(20.0, 10.0, 10.0));

    // A shared face overlaps but does not penetrate.
    assert!(a.overlaps(&touching));
    assert!(!a.penetrates(&touching));
    assert!(!touching.penetrates(&a));

    assert!(a.penetrates(&penetrating));
    assert!(penetrating.penetrates(&a));
  }

  #[test]
  fn test_contains() {
    let outer = Aabb3::new(Vec3::ZERO, Vec3::splat(10.0));
    let inner = Aabb3::new(Vec3::splat(2.0), Vec3::splat(8.0));
    let equal = outer;
    let poking = Aabb3::new(Vec3::splat(2.0), Vec3::splat(12.0));

    assert!(outer.contains(&inner));
    assert!(outer.contains(&equal));
    assert!(!outer.contains(&poking));
    assert!(!inner.contains(&outer));
  }

  #[test]
  fn test_closest_point() {
    let aabb = Aabb3::new(Vec3::ZERO, Vec3::splat(10.0));

    // Inside: unchanged
    assert_eq!(aabb.closest_point(Vec3::splat(5.0)), Vec3::splat(5.0));

    // Outside one axis
    assert_eq!(
      aabb.closest_point(Vec3::new(15.0, 5.0, 5.0)),
      Vec3::new(10.0, 5.0, 5.0)
    );

    // Outside a corner
    assert_eq!(aabb.closest_point(Vec3::splat(-3.0)), Vec3::ZERO);
  }

  #[test]
  fn test_distance_squared_to_point() {
    let aabb = Aabb3::new(Vec3::ZERO, Vec3::splat(10.0));

    assert_eq!(aabb.distance_squared_to_point(Vec3::splat(5.0)), 0.0);
    assert_eq!(
      aabb.distance_squared_to_point(Vec3::new(13.0, 5.0, 5.0)),
      9.0
    );
  }

  #[test]
  fn test_overlaps_sphere() {
    let aabb = Aabb3::new(Vec3::ZERO, Vec3::splat(10.0));

    // Sphere center outside, surface reaching in
    assert!(aabb.overlaps_sphere(Vec3::new(12.0, 5.0, 5.0), 2.5));
    // Sphere tangent to the face counts as overlapping
    assert!(aabb.overlaps_sphere(Vec3::new(12.0, 5.0, 5.0), 2.0));
    // Clearly separated
    assert!(!aabb.overlaps_sphere(Vec3::new(12.0, 5.0, 5.0), 1.0));
    // Center inside always overlaps
    assert!(aabb.overlaps_sphere(Vec3::splat(5.0), 0.1));
  }

  #[test]
  fn test_size_and_center() {
    let aabb = Aabb3::new(Vec3::new(-1.0, -2.0, -3.0), Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(aabb.size(), Vec3::new(2.0, 4.0, 6.0));
    assert_eq!(aabb.center(), Vec3::ZERO);
  }
}
