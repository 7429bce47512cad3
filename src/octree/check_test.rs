use std::collections::HashSet;
use std::sync::Mutex;

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::body::{Body, Shape};
use crate::scheduler::FrameScheduler;

fn tree(depth: u32, size: f32) -> CollisionOctree {
  CollisionOctree::build(depth, Vec3::ZERO, size, FrameScheduler::new(4).unwrap()).unwrap()
}

/// O(n²) reference detector using the same overlap predicates as the
/// resolution code: strict penetration throughout, so touching surfaces
/// never count as a contact.
fn brute_force_pairs(bodies: &BodySet) -> HashSet<(usize, usize)> {
  let mut pairs = HashSet::new();
  for i in 0..bodies.len() {
    for j in (i + 1)..bodies.len() {
      let a = bodies.read(i);
      let b = bodies.read(j);
      let overlap = match (a.shape, b.shape) {
        (Shape::Sphere { radius: ra }, Shape::Sphere { radius: rb }) => {
          let sum = ra + rb;
          a.position.distance_squared(b.position) < sum * sum
        }
        (Shape::Sphere { radius }, Shape::Box { .. }) => {
          b.aabb().distance_squared_to_point(a.position) < radius * radius
        }
        (Shape::Box { .. }, Shape::Sphere { radius }) => {
          a.aabb().distance_squared_to_point(b.position) < radius * radius
        }
        (Shape::Box { .. }, Shape::Box { .. }) => a.aabb().penetrates(&b.aabb()),
      };
      if overlap {
        pairs.insert((i, j));
      }
    }
  }
  pairs
}

fn collect_contacts(
  octree: &CollisionOctree,
  bodies: &BodySet,
  response: &ResponseConfig,
) -> Vec<(usize, usize)> {
  let contacts = Mutex::new(Vec::new());
  octree
    .check_collisions_with(bodies, response, &|a, b| {
      contacts.lock().unwrap().push((a, b));
    })
    .unwrap();
  contacts.into_inner().unwrap()
}

fn random_fixed_body(rng: &mut SmallRng, extent: f32) -> Body {
  let position = Vec3::new(
    rng.random_range(-extent..extent),
    rng.random_range(-extent..extent),
    rng.random_range(-extent..extent),
  );
  let body = if rng.random_bool(0.5) {
    Body::sphere(position, rng.random_range(0.5..6.0))
  } else {
    Body::cuboid(
      position,
      Vec3::new(
        rng.random_range(0.5..6.0),
        rng.random_range(0.5..6.0),
        rng.random_range(0.5..6.0),
      ),
    )
  };
  // Immovable: detection fires but nothing mutates, keeping the brute-force
  // reference valid for the whole sweep.
  body.fixed()
}

/// The octree walk must report exactly the brute-force pair set, each pair
/// exactly once - no missed pairs across bucket levels, no duplicates from
/// the parallel fan-out.
#[test]
fn matches_brute_force_reference() {
  let octree = tree(3, 100.0);
  let response = ResponseConfig::new().with_jitter(0.0);

  for seed in 0..5u64 {
    let mut rng = SmallRng::seed_from_u64(seed);
    let bodies =
      BodySet::from_bodies((0..150).map(|_| random_fixed_body(&mut rng, 40.0)).collect());

    octree.reset().unwrap();
    octree.insert(&bodies).unwrap();
    let contacts = collect_contacts(&octree, &bodies, &response);

    let unique: HashSet<_> = contacts.iter().copied().collect();
    assert_eq!(
      unique.len(),
      contacts.len(),
      "seed {seed}: a pair was resolved more than once"
    );
    assert_eq!(
      unique,
      brute_force_pairs(&bodies),
      "seed {seed}: detected pair set diverges from brute force"
    );
  }
}

/// A root-bucketed body (straddling a splitting plane) must still collide
/// with a body buried deep in a leaf - that is the ancestor sweep.
#[test]
fn ancestor_sweep_reaches_leaf_bodies() {
  let octree = tree(3, 100.0);
  let response = ResponseConfig::new().with_jitter(0.0);

  let bodies = BodySet::from_bodies(vec![
    // Straddles x = 0: promoted to the root bucket.
    Body::sphere(Vec3::new(0.0, 20.0, 20.0), 2.0).fixed(),
    // Tiny, lands in a max-depth leaf, overlapping the first sphere.
    Body::sphere(Vec3::new(2.0, 20.5, 20.0), 0.6).fixed(),
  ]);

  octree.insert(&bodies).unwrap();
  assert_eq!(octree.root().sphere_bodies(), vec![0]);
  assert!(octree.node(octree.nodes_holding(1)[0]).children.is_none());

  let contacts = collect_contacts(&octree, &bodies, &response);
  assert_eq!(contacts, vec![(0, 1)]);
}

/// Sphere-box cross-bucket detection: box promoted high, sphere in a leaf.
#[test]
fn sphere_box_detected_across_levels() {
  let octree = tree(3, 100.0);
  let response = ResponseConfig::new().with_jitter(0.0);

  let bodies = BodySet::from_bodies(vec![
    // Floor slab straddling the x and z splitting planes: stays at the root.
    Body::cuboid(Vec3::new(0.0, -4.0, 0.0), Vec3::new(45.0, 1.0, 45.0)).fixed(),
    // Rests on the slab top, well clear of every splitting plane: lands in
    // a max-depth leaf.
    Body::sphere(Vec3::new(20.0, -2.5, 20.0), 1.0).fixed(),
  ]);

  octree.insert(&bodies).unwrap();
  assert_eq!(octree.root().box_bodies(), vec![0]);
  assert!(octree.node(octree.nodes_holding(1)[0]).children.is_none());
  let contacts = collect_contacts(&octree, &bodies, &response);
  assert_eq!(contacts, vec![(0, 1)]);
}

/// Overlapping movable spheres get resolved (positions separated) and the
/// contact is reported exactly once.
#[test]
fn movable_pair_is_resolved_once() {
  let octree = tree(2, 100.0);
  let response = ResponseConfig::new().with_jitter(0.0);

  let bodies = BodySet::from_bodies(vec![
    Body::sphere(Vec3::new(10.2, 10.0, 10.0), 1.0).without_gravity(),
    Body::sphere(Vec3::new(11.0, 10.0, 10.0), 1.0).without_gravity(),
  ]);

  octree.insert(&bodies).unwrap();
  let contacts = collect_contacts(&octree, &bodies, &response);
  assert_eq!(contacts.len(), 1);

  let separation = bodies.read(0).position.distance(bodies.read(1).position);
  assert!(
    separation >= 2.0,
    "spheres still penetrating after resolution: {separation}"
  );
}

/// Box-box overlap is detected and reported, but the response is a no-op:
/// positions and velocities stay untouched.
#[test]
fn box_box_is_detected_but_not_resolved() {
  let octree = tree(2, 100.0);
  let response = ResponseConfig::new().with_jitter(0.0);

  let bodies = BodySet::from_bodies(vec![
    Body::cuboid(Vec3::new(10.0, 10.0, 10.0), Vec3::splat(2.0)),
    Body::cuboid(Vec3::new(12.0, 10.0, 10.0), Vec3::splat(2.0)),
  ]);

  octree.insert(&bodies).unwrap();
  let contacts = collect_contacts(&octree, &bodies, &response);
  assert_eq!(contacts, vec![(0, 1)]);

  assert_eq!(bodies.read(0).position, Vec3::new(10.0, 10.0, 10.0));
  assert_eq!(bodies.read(1).position, Vec3::new(12.0, 10.0, 10.0));
  assert_eq!(bodies.read(0).velocity, Vec3::ZERO);
}

/// Grid-aligned boxes whose faces meet exactly at a splitting plane descend
/// into sibling subtrees; they must not count as a contact - and with the
/// strict box-box predicate the brute-force reference agrees.
#[test]
fn abutting_boxes_are_not_a_contact() {
  let octree = tree(3, 100.0);
  let response = ResponseConfig::new().with_jitter(0.0);

  // Faces meet exactly at x = 0, the root splitting plane.
  let bodies = BodySet::from_bodies(vec![
    Body::cuboid(Vec3::new(-2.0, 20.0, 20.0), Vec3::splat(2.0)).fixed(),
    Body::cuboid(Vec3::new(2.0, 20.0, 20.0), Vec3::splat(2.0)).fixed(),
  ]);

  octree.insert(&bodies).unwrap();
  // The tie-break keeps each box on its own side of the plane.
  assert!(octree.root().box_bodies().is_empty());
  assert_ne!(octree.nodes_holding(0), octree.nodes_holding(1));

  let contacts = collect_contacts(&octree, &bodies, &response);
  assert!(contacts.is_empty(), "abutting faces reported as {contacts:?}");
  assert!(brute_force_pairs(&bodies).is_empty());

  // Push one box a hair across the plane: it gets promoted to the root
  // while the other stays in its leaf, and the ancestor sweep reports the
  // now-real overlap.
  let bodies = BodySet::from_bodies(vec![
    Body::cuboid(Vec3::new(-1.9, 20.0, 20.0), Vec3::splat(2.0)).fixed(),
    Body::cuboid(Vec3::new(2.0, 20.0, 20.0), Vec3::splat(2.0)).fixed(),
  ]);
  octree.reset().unwrap();
  octree.insert(&bodies).unwrap();
  let contacts = collect_contacts(&octree, &bodies, &response);
  assert_eq!(contacts, vec![(0, 1)]);
}

/// An empty tree checks cleanly.
#[test]
fn empty_tree_checks_cleanly() {
  let octree = tree(2, 100.0);
  let bodies = BodySet::new();
  octree
    .check_collisions(&bodies, &ResponseConfig::default())
    .unwrap();
}
