//! Body - geometric and physical state for a single collidable.
//!
//! Bodies are owned by the scene; the octree only holds indices into a
//! [`BodySet`] and those indices are valid for the duration of one tick's
//! reset → insert → check cycle.

use std::sync::{Mutex, MutexGuard};

use glam::Vec3;

use crate::bounds::Aabb3;

/// Collision shape of a body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
  /// Sphere with the given radius.
  Sphere {
    /// Radius in world units.
    radius: f32,
  },
  /// Axis-aligned box with the given half-extents.
  Box {
    /// Half edge lengths per axis.
    half_extents: Vec3,
  },
}

/// A moving (or fixed) spherical or box-shaped body.
#[derive(Clone, Copy, Debug)]
pub struct Body {
  /// Collision shape.
  pub shape: Shape,

  /// World-space position (center of the shape).
  pub position: Vec3,

  /// Linear velocity in world units per second.
  pub velocity: Vec3,

  /// Mass. Must be > 0 for any movable body that can contact another
  /// movable body (contact response divides by combined mass).
  pub mass: f32,

  /// Whether contact response may change this body's position/velocity.
  pub movable: bool,

  /// Whether the integrator applies gravity to this body.
  pub uses_gravity: bool,
}

impl Body {
  /// Create a movable unit-mass sphere at `position`.
  pub fn sphere(position: Vec3, radius: f32) -> Self {
    Self {
      shape: Shape::Sphere { radius },
      position,
      velocity: Vec3::ZERO,
      mass: 1.0,
      movable: true,
      uses_gravity: true,
    }
  }

  /// Create a movable unit-mass box at `position`.
  pub fn cuboid(position: Vec3, half_extents: Vec3) -> Self {
    Self {
      shape: Shape::Box { half_extents },
      position,
      velocity: Vec3::ZERO,
      mass: 1.0,
      movable: true,
      uses_gravity: true,
    }
  }

  /// Set the initial velocity.
  pub fn with_velocity(mut self, velocity: Vec3) -> Self {
    self.velocity = velocity;
    self
  }

  /// Set the mass.
  pub fn with_mass(mut self, mass: f32) -> Self {
    self.mass = mass;
    self
  }

  /// Mark the body as immovable and gravity-exempt (static geometry).
  pub fn fixed(mut self) -> Self {
    self.movable = false;
    self.uses_gravity = false;
    self
  }

  /// Opt the body out of gravity while keeping it movable.
  pub fn without_gravity(mut self) -> Self {
    self.uses_gravity = false;
    self
  }

  /// World-space AABB of the shape at the current position.
  #[inline]
  pub fn aabb(&self) -> Aabb3 {
    match self.shape {
      Shape::Sphere { radius } => {
        Aabb3::from_center_half_extents(self.position, Vec3::splat(radius))
      }
      Shape::Box { half_extents } => Aabb3::from_center_half_extents(self.position, half_extents),
    }
  }
}

/// Per-tick body storage with one lock per body.
///
/// Two subtree workers can reach the same body through different ancestor
/// buckets, so every position/velocity mutation during contact response runs
/// under that body's own lock. The octree never owns bodies - it stores plain
/// indices into this set, valid only until the scene adds/removes entities.
#[derive(Default)]
pub struct BodySet {
  bodies: Vec<Mutex<Body>>,
}

impl BodySet {
  /// Create an empty set.
  pub fn new() -> Self {
    Self::default()
  }

  /// Create a set from existing bodies.
  pub fn from_bodies(bodies: Vec<Body>) -> Self {
    Self {
      bodies: bodies.into_iter().map(Mutex::new).collect(),
    }
  }

  /// Add a body, returning its index.
  pub fn push(&mut self, body: Body) -> usize {
    self.bodies.push(Mutex::new(body));
    self.bodies.len() - 1
  }

  /// Number of bodies.
  pub fn len(&self) -> usize {
    self.bodies.len()
  }

  /// Returns true if the set holds no bodies.
  pub fn is_empty(&self) -> bool {
    self.bodies.is_empty()
  }

  /// Lock a body for read/write access.
  ///
  /// # Panics
  /// Panics if `index` is out of bounds or the lock is poisoned.
  #[inline]
  pub fn lock(&self, index: usize) -> MutexGuard<'_, Body> {
    self.bodies[index].lock().unwrap()
  }

  /// Copy out a body's current state (brief lock).
  #[inline]
  pub fn read(&self, index: usize) -> Body {
    *self.lock(index)
  }

  /// Iterate over the per-body cells.
  pub fn iter(&self) -> impl Iterator<Item = &Mutex<Body>> {
    self.bodies.iter()
  }
}
