//! A UV sphere broken along concentric shells with stepped seeds.

use fracture_viz::{Demo, init_logging, run};
use nalgebra::Point3;
use voronoi_fracture::fracture::SeedSource;
use voronoi_fracture::{FractureParams, Mesh};

#[macroquad::main("Voronoi Fracture - Sphere")]
async fn main() {
    init_logging();

    let params = FractureParams::default()
        .with_fragment_count(40)
        .with_steps(3)
        .with_step_noise(0.08);
    let demo = Demo::new(
        "Sphere - stepped shells",
        Mesh::uv_sphere(Point3::origin(), 1.5, 32, 16),
    )
    .with_seed_source(SeedSource::sphere(Point3::origin(), 1.4))
    .with_params(params)
    .with_seed(11);
    run(demo).await;
}
