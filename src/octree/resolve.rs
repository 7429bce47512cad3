//! Contact resolution: mutate body positions/velocities in place.
//!
//! Implemented responses:
//! - sphere vs sphere: mass-weighted positional separation, plus velocity
//!   reflection when both bodies are movable.
//! - sphere vs immovable box: push-out along the Voronoi-region face normal
//!   and velocity reflection.
//!
//! Known gaps (intentional, matching the feature set this core serves):
//! box-box contacts and contacts against a *movable* box are detected and
//! reported, but produce no response.
//!
//! Magnitudes use an exact `sqrt` rather than a bit-twiddling
//! approximation; contact normals are unit-length.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::body::{BodySet, Shape};

/// Squared-length threshold under which a contact normal is degenerate.
const DEGENERATE_EPS: f32 = 1e-12;

/// Contact response tuning.
///
/// Deterministic when `jitter` is zero or a fixed `seed` is supplied (each
/// check-phase worker derives its own RNG stream from the seed).
#[derive(Clone, Copy, Debug)]
pub struct ResponseConfig {
  /// Separation scale applied on top of the penetration depth. Slightly
  /// above 1 so separated spheres do not re-penetrate next tick.
  pub over_correction: f32,

  /// Maximum per-axis random velocity perturbation added after reflection,
  /// breaking perfectly elastic loops and degenerate stacking. Zero
  /// disables the perturbation entirely.
  pub jitter: f32,

  /// Seed for the perturbation streams.
  pub seed: u64,
}

impl Default for ResponseConfig {
  fn default() -> Self {
    Self {
      over_correction: 1.01,
      jitter: 0.05,
      seed: 0,
    }
  }
}

impl ResponseConfig {
  /// Create a config with the default constants.
  pub fn new() -> Self {
    Self::default()
  }

  /// Set the over-correction factor.
  pub fn with_over_correction(mut self, factor: f32) -> Self {
    self.over_correction = factor;
    self
  }

  /// Set the jitter amplitude (zero disables it).
  pub fn with_jitter(mut self, jitter: f32) -> Self {
    self.jitter = jitter;
    self
  }

  /// Set the jitter seed.
  pub fn with_seed(mut self, seed: u64) -> Self {
    self.seed = seed;
    self
  }

  /// Derive the RNG for one check-phase lane.
  pub(crate) fn rng_for(&self, lane: u64) -> SmallRng {
    SmallRng::seed_from_u64(self.seed ^ lane.wrapping_mul(0x9E37_79B9_7F4A_7C15))
  }
}

/// Reflect `v` about unit normal `n`.
#[inline]
fn reflect(v: Vec3, n: Vec3) -> Vec3 {
  v - 2.0 * v.dot(n) * n
}

/// Bounded random perturbation, one sample per axis.
#[inline]
fn perturbation(config: &ResponseConfig, rng: &mut SmallRng) -> Vec3 {
  if config.jitter <= 0.0 {
    return Vec3::ZERO;
  }
  let j = config.jitter;
  Vec3::new(
    rng.random_range(-j..=j),
    rng.random_range(-j..=j),
    rng.random_range(-j..=j),
  )
}

/// Sphere-sphere detection and response.
///
/// Reports the contact, then separates along the contact normal with each
/// sphere taking the share of the corrected depth inversely proportional to
/// its part of the combined mass. Velocities are reflected only when both
/// bodies are movable; against an immovable anchor the movable sphere is
/// corrected in position only.
pub(crate) fn sphere_pair<F: Fn(usize, usize)>(
  bodies: &BodySet,
  a: usize,
  b: usize,
  config: &ResponseConfig,
  on_contact: &F,
  rng: &mut SmallRng,
) {
  debug_assert_ne!(a, b, "a body cannot collide with itself");
  let (first, second) = (a.min(b), a.max(b));

  // Index-ordered locking keeps two workers observing the same pair from
  // two recursion paths deadlock-free.
  let mut body_a = bodies.lock(first);
  let mut body_b = bodies.lock(second);

  let (Shape::Sphere { radius: ra }, Shape::Sphere { radius: rb }) = (body_a.shape, body_b.shape)
  else {
    return;
  };

  let delta = body_b.position - body_a.position;
  let dist2 = delta.length_squared();
  let sum_r = ra + rb;
  if dist2 >= sum_r * sum_r {
    return;
  }
  on_contact(first, second);

  if !body_a.movable && !body_b.movable {
    return;
  }

  // Coincident centers leave no separation axis; fall back to +Y instead of
  // dividing by zero.
  let dist = dist2.sqrt();
  let normal = if dist2 > DEGENERATE_EPS {
    delta / dist
  } else {
    Vec3::Y
  };
  let correction = (sum_r - dist) * config.over_correction;

  if body_a.movable && body_b.movable {
    let total_mass = body_a.mass + body_b.mass;
    let share_a = 1.0 - body_a.mass / total_mass;
    let share_b = 1.0 - body_b.mass / total_mass;

    body_a.position -= normal * (correction * share_a);
    body_b.position += normal * (correction * share_b);

    let velocity_a = reflect(body_a.velocity, normal);
    let velocity_b = reflect(body_b.velocity, normal);
    body_a.velocity = velocity_a * share_a + perturbation(config, rng);
    body_b.velocity = velocity_b * share_b + perturbation(config, rng);
  } else if body_a.movable {
    body_a.position -= normal * correction;
  } else {
    body_b.position += normal * correction;
  }
}

/// Sphere-box detection and response.
///
/// Detection is the clamp-to-box squared distance against `radius²`.
/// Response applies only to a movable sphere against an immovable box: the
/// sphere is pushed out along the outward normal of the Voronoi region its
/// center falls in (face, edge or corner - normalizing the combined axis
/// normal covers the √2 and √3 cases) and its velocity reflects about the
/// same normal. A movable box gets no response (documented gap).
pub(crate) fn sphere_box<F: Fn(usize, usize)>(
  bodies: &BodySet,
  sphere: usize,
  cuboid: usize,
  on_contact: &F,
) {
  debug_assert_ne!(sphere, cuboid, "a body cannot collide with itself");
  let (first, second) = (sphere.min(cuboid), sphere.max(cuboid));
  let mut guard_first = bodies.lock(first);
  let mut guard_second = bodies.lock(second);
  let (sphere_body, box_body) = if first == sphere {
    (&mut *guard_first, &mut *guard_second)
  } else {
    (&mut *guard_second, &mut *guard_first)
  };

  let Shape::Sphere { radius } = sphere_body.shape else {
    return;
  };
  let aabb = box_body.aabb();

  let center = sphere_body.position;
  let closest = aabb.closest_point(center);
  let delta = center - closest;
  let dist2 = delta.length_squared();
  if dist2 >= radius * radius {
    return;
  }
  on_contact(first, second);

  if !sphere_body.movable || box_body.movable {
    return;
  }

  let (normal, penetration) = if dist2 > DEGENERATE_EPS {
    // Center outside the box: the clamp delta already points along the
    // Voronoi-region normal (axis face, √2 edge or √3 corner).
    let dist = dist2.sqrt();
    (delta / dist, radius - dist)
  } else {
    // Center inside the box (or exactly on its surface): exit through the
    // nearest face.
    nearest_face_exit(center, &aabb, radius)
  };

  sphere_body.position += normal * penetration;
  sphere_body.velocity = reflect(sphere_body.velocity, normal);
}

/// Outward normal and penetration for a sphere whose center lies inside the
/// box: the face with the smallest distance to the center wins.
fn nearest_face_exit(center: Vec3, aabb: &crate::bounds::Aabb3, radius: f32) -> (Vec3, f32) {
  let faces = [
    (center.x - aabb.min.x, -Vec3::X),
    (aabb.max.x - center.x, Vec3::X),
    (center.y - aabb.min.y, -Vec3::Y),
    (aabb.max.y - center.y, Vec3::Y),
    (center.z - aabb.min.z, -Vec3::Z),
    (aabb.max.z - center.z, Vec3::Z),
  ];
  let (distance, normal) = faces
    .into_iter()
    .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap())
    .unwrap();
  (normal, radius + distance)
}

/// Box-box detection. Contact means strict interpenetration - two boxes
/// abutting face to face are not a contact, matching the sphere predicates
/// and the insertion tie-break (an abutting pair can sit in sibling
/// subtrees the tree walk never co-checks). Response is intentionally a
/// no-op: box-box contact is detected and reported but never resolved in
/// this core.
pub(crate) fn box_pair<F: Fn(usize, usize)>(bodies: &BodySet, a: usize, b: usize, on_contact: &F) {
  debug_assert_ne!(a, b, "a body cannot collide with itself");
  let (first, second) = (a.min(b), a.max(b));
  let aabb_a = bodies.read(first).aabb();
  let aabb_b = bodies.read(second).aabb();
  if aabb_a.penetrates(&aabb_b) {
    on_contact(first, second);
  }
}

#[cfg(test)]
#[path = "resolve_test.rs"]
mod resolve_test;
