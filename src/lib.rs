//! collision_plugin - framework/engine independent octree collision core
//!
//! This crate provides the per-frame broad phase and contact response for a
//! scene of moving spheres and axis-aligned boxes: a fixed-depth octree
//! buckets bodies, detects overlaps and applies simple elastic/inelastic
//! response, parallelized across a fixed worker pool.
//!
//! The rendering pipeline, terrain generation and scene composition are
//! external collaborators: they hand over a [`BodySet`] once per tick and
//! read back the mutated positions/velocities. No contact events are
//! emitted - response is applied, not reported.
//!
//! # Example
//!
//! ```ignore
//! use collision_plugin::{
//!   Body, BodySet, CollisionOctree, FrameScheduler, PhysicsIntegrator, ResponseConfig,
//! };
//! use glam::Vec3;
//!
//! let scheduler = FrameScheduler::new(8)?;
//! let octree = CollisionOctree::build(7, Vec3::ZERO, 200.0, scheduler)?;
//! let integrator = PhysicsIntegrator::new();
//! let response = ResponseConfig::default();
//!
//! let mut bodies = BodySet::new();
//! bodies.push(Body::sphere(Vec3::new(0.0, 10.0, 0.0), 1.0));
//! bodies.push(Body::cuboid(Vec3::ZERO, Vec3::new(50.0, 1.0, 50.0)).fixed());
//!
//! // Per frame:
//! octree.tick(&bodies, &integrator, 1.0 / 60.0, &response)?;
//! ```

pub mod body;
pub mod bounds;
pub mod error;
pub mod integrator;
pub mod scheduler;

// Re-export commonly used items
pub use body::{Body, BodySet, Shape};
pub use bounds::Aabb3;
pub use error::{ConfigError, TickError};
pub use integrator::{PhysicsIntegrator, DEFAULT_GRAVITY};
pub use scheduler::{FrameScheduler, DEFAULT_WORKER_COUNT};

// Octree broad phase and contact response
pub mod octree;
pub use octree::{
  CollisionOctree, NodeId, OctreeNode, ResponseConfig, TickStats, DEFAULT_DEPTH, MAX_DEPTH,
};
