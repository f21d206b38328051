use fracture_viz::{Demo, init_logging, run};
use nalgebra::Point3;
use voronoi_fracture::{FractureParams, Mesh};

#[macroquad::main("Voronoi Fracture")]
async fn main() {
    init_logging();

    let demo = Demo::new("Cube - bounding box seeds", Mesh::cube(Point3::origin(), 2.0))
        .with_params(FractureParams::default().with_fragment_count(16))
        .with_seed(7);
    run(demo).await;
}
