//! An L-shaped prism fractured with the boolean triangle strategy.

use fracture_viz::{Demo, init_logging, run};
use voronoi_fracture::{ClipMethod, FractureConfig, FractureParams, Mesh, VolumeShape};

#[macroquad::main("Voronoi Fracture - Concave")]
async fn main() {
    init_logging();

    let outline = [[-1.5, -1.5], [1.5, -1.5], [1.5, 0.0], [0.0, 0.0], [0.0, 1.5], [-1.5, 1.5]];
    let prism = Mesh::prism(&outline, -0.5, 0.5);

    let demo = Demo::new("L prism - boolean triangle", prism)
        .with_params(FractureParams::default().with_fragment_count(16))
        .with_config(FractureConfig::default().with_clip_method(ClipMethod::Boolean(VolumeShape::Triangle)))
        .with_seed(7);
    run(demo).await;
}
