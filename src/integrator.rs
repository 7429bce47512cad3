//! PhysicsIntegrator - gravity plus symplectic Euler position update.
//!
//! Runs once per tick, before the octree phases. Single-threaded on purpose:
//! the O(n) pass over a demo-scale body list does not pay for fan-out.

use crate::body::BodySet;

/// Default gravitational acceleration in world units per second squared.
pub const DEFAULT_GRAVITY: f32 = 9.81;

/// Applies gravity and integrates velocity into position.
#[derive(Clone, Copy, Debug)]
pub struct PhysicsIntegrator {
  /// Downward acceleration applied to bodies with `uses_gravity`.
  pub gravity: f32,
}

impl PhysicsIntegrator {
  /// Create an integrator with the default gravity.
  pub fn new() -> Self {
    Self::default()
  }

  /// Override the gravitational acceleration.
  pub fn with_gravity(mut self, gravity: f32) -> Self {
    self.gravity = gravity;
    self
  }

  /// Advance all bodies by `dt` seconds.
  ///
  /// Gravity first decrements vertical velocity, then every movable body
  /// advances by `velocity * dt` (symplectic Euler, no sub-stepping).
  pub fn step(&self, bodies: &BodySet, dt: f32) {
    for cell in bodies.iter() {
      let mut body = cell.lock().unwrap();
      if body.uses_gravity {
        body.velocity.y -= self.gravity * dt;
      }
      if body.movable {
        let velocity = body.velocity;
        body.position += velocity * dt;
      }
    }
  }
}

impl Default for PhysicsIntegrator {
  fn default() -> Self {
    Self {
      gravity: DEFAULT_GRAVITY,
    }
  }
}

#[cfg(test)]
mod tests {
  use glam::Vec3;

  use super::*;
  use crate::body::{Body, BodySet};

  #[test]
  fn gravity_decrements_vertical_velocity_before_moving() {
    let bodies = BodySet::from_bodies(vec![Body::sphere(Vec3::ZERO, 1.0)]);
    let integrator = PhysicsIntegrator::new().with_gravity(10.0);

    integrator.step(&bodies, 0.5);

    let body = bodies.read(0);
    assert_eq!(body.velocity, Vec3::new(0.0, -5.0, 0.0));
    // Position uses the post-gravity velocity (symplectic order).
    assert_eq!(body.position, Vec3::new(0.0, -2.5, 0.0));
  }

  #[test]
  fn fixed_bodies_do_not_move() {
    let bodies = BodySet::from_bodies(vec![Body::cuboid(Vec3::ZERO, Vec3::ONE).fixed()]);

    PhysicsIntegrator::new().step(&bodies, 1.0);

    let body = bodies.read(0);
    assert_eq!(body.position, Vec3::ZERO);
    assert_eq!(body.velocity, Vec3::ZERO);
  }

  #[test]
  fn gravity_exempt_body_moves_in_a_straight_line() {
    let bodies = BodySet::from_bodies(vec![Body::sphere(Vec3::ZERO, 1.0)
      .without_gravity()
      .with_velocity(Vec3::new(2.0, 0.0, 0.0))]);

    PhysicsIntegrator::new().step(&bodies, 0.25);

    let body = bodies.read(0);
    assert_eq!(body.position, Vec3::new(0.5, 0.0, 0.0));
    assert_eq!(body.velocity, Vec3::new(2.0, 0.0, 0.0));
  }
}
