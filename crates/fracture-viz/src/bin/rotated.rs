//! A rotated slab fractured with the boolean strategy and disk seeds.

use fracture_viz::{Demo, init_logging, run};
use nalgebra::{Isometry3, Point3, Vector3};
use voronoi_fracture::fracture::SeedSource;
use voronoi_fracture::{ClipMethod, FractureConfig, FractureParams, Mesh, VolumeShape};

#[macroquad::main("Voronoi Fracture - Rotated")]
async fn main() {
    init_logging();

    let transform = Isometry3::new(Vector3::new(0.5, 0.2, -0.3), Vector3::new(0.3, 0.7, 0.2));
    let slab = Mesh::cuboid(Point3::origin(), Vector3::new(2.0, 0.25, 1.5));

    // Seeds on the slab's local XZ plane, mapped into world space
    let center = transform * Point3::origin();
    let axes = [
        transform * Vector3::x(),
        transform * Vector3::y(),
        transform * Vector3::z(),
    ];
    let demo = Demo::new("Rotated slab - boolean tetrahedron, disk seeds", slab)
        .with_transform(transform)
        .with_seed_source(SeedSource::Sphere {
            center,
            axes,
            radius: 1.8,
        })
        .with_params(FractureParams::default().with_fragment_count(20).with_disk_axis("y"))
        .with_config(
            FractureConfig::default().with_clip_method(ClipMethod::Boolean(VolumeShape::Tetrahedron)),
        )
        .with_seed(3);
    run(demo).await;
}
