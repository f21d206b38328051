//! Property-based tests for the fracture invariants.
//!
//! Run with: cargo test -p voronoi-fracture -- proptest

use nalgebra::{Point3, Vector3};
use proptest::prelude::*;
use voronoi_fracture::distribution::remove_duplicates;
use voronoi_fracture::{
    ClipMethod, FractureConfig, FractureEngine, MemoryScene, Mesh, PLANE_EPSILON, Plane, VolumeShape,
};

// =============================================================================
// Strategies
// =============================================================================

/// A seed inside the 2x2x2 cube centred on the origin.
fn arb_seed() -> impl Strategy<Value = Point3<f64>> {
    prop::array::uniform3(-0.95..0.95f64).prop_map(Point3::from)
}

/// Between 2 and 7 well-separated seeds.
fn arb_seeds() -> impl Strategy<Value = Vec<Point3<f64>>> {
    prop::collection::vec(arb_seed(), 2..8)
        .prop_map(|seeds| remove_duplicates(&seeds, 0.05))
        .prop_filter("need two distinct seeds", |seeds| seeds.len() >= 2)
}

fn arb_method() -> impl Strategy<Value = ClipMethod> {
    prop_oneof![
        Just(ClipMethod::Command),
        Just(ClipMethod::Boolean(VolumeShape::Triangle)),
        Just(ClipMethod::Boolean(VolumeShape::Tetrahedron)),
    ]
}

fn arb_plane() -> impl Strategy<Value = Plane> {
    (arb_seed(), prop::array::uniform3(-1.0..1.0f64))
        .prop_filter_map("short normal", |(point, n)| {
            let n = Vector3::from(n);
            (n.norm() > 0.1).then(|| Plane::new(point, n)).flatten()
        })
}

// =============================================================================
// Property Tests: Fracture
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Fragment volumes add up to the source volume.
    #[test]
    fn proptest_fragments_partition_cube(seeds in arb_seeds(), method in arb_method()) {
        let mut scene = MemoryScene::new();
        let cube = scene.insert("cube", Mesh::cube(Point3::origin(), 2.0));
        let config = FractureConfig::default().with_clip_method(method);

        let report = FractureEngine::new(config).run(&mut scene, cube, &seeds, true).unwrap();
        let total: f64 = report
            .nodes()
            .map(|n| scene.mesh(*n).unwrap().volume())
            .sum();
        prop_assert!((total - 8.0).abs() < 1e-6, "total volume {}", total);
    }

    /// Every surviving vertex lies on its own seed's side of every bisector.
    #[test]
    fn proptest_fragments_stay_in_their_cell(seeds in arb_seeds()) {
        let mut scene = MemoryScene::new();
        let cube = scene.insert("cube", Mesh::cube(Point3::origin(), 2.0));

        let report = FractureEngine::default().run(&mut scene, cube, &seeds, true).unwrap();
        for record in &report.fragments {
            let mesh = scene.mesh(record.node).unwrap();
            for (j, other) in seeds.iter().enumerate() {
                if j == record.seed.index {
                    continue;
                }
                let plane = Plane::bisector(record.seed.position, *other).unwrap();
                for v in mesh.vertices() {
                    prop_assert!(plane.signed_distance(v) <= 1e-7);
                }
            }
        }
    }
}

// =============================================================================
// Property Tests: Clip and cap
// =============================================================================

proptest! {
    /// Clipping a cube on both sides of a plane conserves volume.
    #[test]
    fn proptest_clip_halves_sum_to_whole(plane in arb_plane()) {
        let cube = Mesh::cube(Point3::origin(), 2.0);

        let mut back = cube.clone();
        back.clip_and_cap(&plane, PLANE_EPSILON);
        let mut front = cube.clone();
        front.clip_and_cap(&plane.flipped(), PLANE_EPSILON);

        prop_assert!((back.volume() + front.volume() - 8.0).abs() < 1e-9);
        prop_assert!(back.vertices().all(|v| plane.signed_distance(v) <= PLANE_EPSILON));
    }

    /// Bisector planes are antisymmetric in their seeds.
    #[test]
    fn proptest_bisector_antisymmetric(a in arb_seed(), b in arb_seed()) {
        prop_assume!((a - b).norm() > 1e-6);
        let ab = Plane::bisector(a, b).unwrap();
        let ba = Plane::bisector(b, a).unwrap();
        prop_assert!((ab.normal() + ba.normal()).norm() < 1e-12);
        prop_assert!(ba.signed_distance(&ab.point()).abs() < 1e-12);
    }
}
