//! The interactive viewer loop shared by all binaries.

use macroquad::prelude::*;
use nalgebra::Isometry3;
use tracing::{error, info};
use voronoi_fracture::distribution::PointDistribution;
use voronoi_fracture::fracture::{SeedSource, fracture};
use voronoi_fracture::{
    ClipMethod, FractureConfig, FractureParams, FractureReport, MemoryScene, Mesh, NodeId, VolumeShape,
};

use crate::{FragmentNavigator, FragmentView, OrbitCamera, combined_bounds, fragment_views};

/// Clip methods cycled by the `C` key.
const METHODS: [ClipMethod; 3] = [
    ClipMethod::Command,
    ClipMethod::Boolean(VolumeShape::Triangle),
    ClipMethod::Boolean(VolumeShape::Tetrahedron),
];

/// Everything needed to (re)build one fractured object.
pub struct Demo {
    pub title: String,
    pub mesh: Mesh,
    pub transform: Isometry3<f64>,
    pub seed_source: SeedSource,
    pub params: FractureParams,
    pub config: FractureConfig,
    /// Fixed seed for the first run; later runs draw from the OS.
    pub seed: Option<u64>,
}

impl Demo {
    pub fn new(title: impl Into<String>, mesh: Mesh) -> Self {
        Self {
            title: title.into(),
            mesh,
            transform: Isometry3::identity(),
            seed_source: SeedSource::BoundingBox,
            params: FractureParams::default().with_fragment_count(12),
            config: FractureConfig::default(),
            seed: None,
        }
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Isometry3<f64>) -> Self {
        self.transform = transform;
        self
    }

    #[must_use]
    pub fn with_seed_source(mut self, seed_source: SeedSource) -> Self {
        self.seed_source = seed_source;
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: FractureParams) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: FractureConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fractures a fresh copy of the source into a new scene.
    fn build(
        &self,
        distribution: &mut PointDistribution,
    ) -> (Vec<FragmentView>, Option<FractureReport<NodeId>>) {
        let mut scene = MemoryScene::new().with_epsilon(self.config.plane_epsilon);
        let source = scene.insert_with_transform("source", self.mesh.clone(), self.transform);
        match fracture(
            &mut scene,
            source,
            &self.seed_source,
            &self.params,
            &self.config,
            distribution,
        ) {
            Ok(report) => {
                info!(
                    fragments = report.fragments.len(),
                    discarded = report.discarded.len(),
                    elapsed_ms = report.elapsed.as_secs_f64() * 1000.0,
                    "Fractured {}",
                    self.title
                );
                (fragment_views(&scene, &report), Some(report))
            }
            Err(err) => {
                error!(%err, kind = ?err.kind(), "Fracture failed");
                // Show the intact source instead
                let views = FragmentView::from_node(&scene, source, "source")
                    .into_iter()
                    .collect();
                (views, None)
            }
        }
    }
}

/// Runs the viewer until the window closes.
///
/// `R` refractures with fresh random seeds; `C` cycles the clip method.
pub async fn run(mut demo: Demo) {
    let mut distribution = match demo.seed {
        Some(seed) => PointDistribution::with_seed(seed),
        None => PointDistribution::new(),
    };
    let (mut views, mut report) = demo.build(&mut distribution);

    let mut camera = combined_bounds(&views)
        .map_or_else(|| OrbitCamera::new(6.0, 0.6, 0.4), |b| OrbitCamera::framing(&b));
    let mut navigator = FragmentNavigator::new();

    loop {
        let mut rebuild = false;
        if is_key_pressed(KeyCode::R) {
            distribution = PointDistribution::new();
            rebuild = true;
        }
        if is_key_pressed(KeyCode::C) {
            let current = METHODS
                .iter()
                .position(|m| *m == demo.config.clip_method)
                .unwrap_or(0);
            demo.config.clip_method = METHODS[(current + 1) % METHODS.len()];
            rebuild = true;
        }
        if rebuild {
            (views, report) = demo.build(&mut distribution);
            navigator.clamp(views.len());
        }

        camera.update();
        navigator.update(views.len());

        clear_background(Color::from_rgba(20, 20, 30, 255));
        set_camera(&camera.to_camera3d());

        navigator.render(&views, camera.target);

        let axis = camera.distance * 0.15;
        let origin = camera.target;
        draw_line_3d(origin, origin + vec3(axis, 0.0, 0.0), RED);
        draw_line_3d(origin, origin + vec3(0.0, axis, 0.0), GREEN);
        draw_line_3d(origin, origin + vec3(0.0, 0.0, axis), BLUE);

        set_default_camera();

        draw_text(&demo.title, 10.0, 25.0, 20.0, WHITE);
        let status = match &report {
            Some(report) => format!(
                "{:?} | {} clipped, {} skipped, {} discarded | {:.1} ms",
                demo.config.clip_method,
                report.stats.clipped,
                report.stats.skipped_inside,
                report.stats.discarded,
                report.elapsed.as_secs_f64() * 1000.0
            ),
            None => format!("{:?} | fracture failed, see log", demo.config.clip_method),
        };
        draw_text(&status, 10.0, 45.0, 18.0, GRAY);

        navigator.draw_ui(&views, 70.0);

        draw_text(
            "Drag mouse to rotate, scroll to zoom | [R]efracture | [C]lip method",
            10.0,
            135.0,
            16.0,
            DARKGRAY,
        );
        draw_text(&format!("FPS: {}", get_fps()), 10.0, 155.0, 16.0, DARKGRAY);

        next_frame().await
    }
}
