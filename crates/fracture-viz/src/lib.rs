//! Shared visualization utilities for the fracture viewers.

use std::hash::{Hash, Hasher};

use macroquad::models::{Mesh as DrawMesh, Vertex, draw_mesh};
use macroquad::prelude::*;
use nalgebra::{Point3, Vector3};
use voronoi_fracture::{Aabb, FractureReport, MemoryScene, Mesh, NodeId, Polygon};

pub mod navigator;
pub mod viewer;

pub use navigator::{FragmentNavigator, Selection};
pub use viewer::{Demo, run};

/// Direction of the fixed key light used for flat shading.
const LIGHT_DIRECTION: [f64; 3] = [0.4, 0.8, 0.45];

/// Generates a deterministic base color for a fragment from its name.
///
/// Renaming survivors keeps names contiguous, so a refracture with the same
/// seed count reuses the same palette.
pub fn fragment_color(name: &str) -> Color {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    name.hash(&mut hasher);
    let hash = hasher.finish();

    let r = ((hash >> 16) & 0xFF) as u8;
    let g = ((hash >> 8) & 0xFF) as u8;
    let b = (hash & 0xFF) as u8;

    // Keep fragments away from the background color
    Color::from_rgba(r.max(60), g.max(60), b.max(60), 255)
}

/// Darkens `base` according to how far the polygon turns away from the light.
pub fn shade(base: Color, polygon: &Polygon) -> Color {
    let light = Vector3::from(LIGHT_DIRECTION).normalize();
    let lambert = polygon
        .unit_normal()
        .map_or(0.0, |n| n.dot(&light).max(0.0)) as f32;
    let intensity = 0.35 + 0.65 * lambert;
    Color::new(base.r * intensity, base.g * intensity, base.b * intensity, base.a)
}

fn to_vec3(p: &Point3<f64>) -> Vec3 {
    vec3(p.x as f32, p.y as f32, p.z as f32)
}

/// Draws a single polygon, moved by `offset`, by fan triangulation.
pub fn draw_polygon(polygon: &Polygon, color: Color, offset: Vec3) {
    let verts = polygon.vertices();
    if verts.len() < 3 {
        return;
    }

    let mesh_vertices: Vec<Vertex> = verts
        .iter()
        .map(|p| Vertex::new2(to_vec3(p) + offset, vec2(0.0, 0.0), color))
        .collect();

    let mut indices: Vec<u16> = Vec::with_capacity((verts.len() - 2) * 3);
    for i in 1..verts.len() - 1 {
        indices.push(0);
        indices.push(i as u16);
        indices.push((i + 1) as u16);
    }

    draw_mesh(&DrawMesh {
        vertices: mesh_vertices,
        indices,
        texture: None,
    });
}

/// Outlines every polygon edge, moved by `offset`.
pub fn draw_edges(mesh: &Mesh, color: Color, offset: Vec3) {
    for polygon in mesh.polygons() {
        for (a, b) in polygon.edges() {
            draw_line_3d(to_vec3(a) + offset, to_vec3(b) + offset, color);
        }
    }
}

/// A fragment ready for drawing: world-space geometry plus display data.
#[derive(Debug, Clone)]
pub struct FragmentView {
    pub name: String,
    pub mesh: Mesh,
    pub color: Color,
    pub center: Vec3,
    pub volume: f64,
}

impl FragmentView {
    /// Builds a view of one scene node, or `None` if the node is gone or empty.
    pub fn from_node(scene: &MemoryScene, node: NodeId, name: &str) -> Option<Self> {
        let mesh = scene.world_mesh(node)?;
        let bounds = mesh.bounding_box()?;
        Some(Self {
            name: name.to_owned(),
            color: fragment_color(name),
            center: to_vec3(&bounds.center()),
            volume: mesh.volume(),
            mesh,
        })
    }

    /// Draws the fragment pushed away from `origin` by `explode` times its distance.
    pub fn draw(&self, origin: Vec3, explode: f32, outline: bool) {
        let offset = (self.center - origin) * explode;
        for polygon in self.mesh.polygons() {
            draw_polygon(polygon, shade(self.color, polygon), offset);
        }
        if outline {
            draw_edges(&self.mesh, Color::from_rgba(10, 10, 15, 255), offset);
        }
    }
}

/// Collects the surviving fragments of a fracture run.
pub fn fragment_views(scene: &MemoryScene, report: &FractureReport<NodeId>) -> Vec<FragmentView> {
    report
        .fragments
        .iter()
        .filter_map(|record| FragmentView::from_node(scene, record.node, &record.name))
        .collect()
}

/// Bounds of all fragments together.
pub fn combined_bounds(views: &[FragmentView]) -> Option<Aabb> {
    Aabb::from_points(views.iter().flat_map(|view| view.mesh.vertices()))
}

/// Orbit camera centred on the fractured object.
pub struct OrbitCamera {
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub target: Vec3,
    /// Distance change per scroll step
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl OrbitCamera {
    pub fn new(distance: f32, yaw: f32, pitch: f32) -> Self {
        Self {
            distance,
            yaw,
            pitch,
            target: vec3(0.0, 0.0, 0.0),
            zoom_speed: 0.5,
            min_distance: 1.0,
            max_distance: 50.0,
        }
    }

    /// Targets the center of `bounds` from a distance that shows all of it.
    pub fn framing(bounds: &Aabb) -> Self {
        let diagonal = bounds.diagonal() as f32;
        let distance = (diagonal * 1.8).max(1.0);
        Self {
            target: to_vec3(&bounds.center()),
            zoom_speed: diagonal * 0.1,
            min_distance: diagonal * 0.25,
            max_distance: diagonal * 10.0,
            ..Self::new(distance, 0.6, 0.4)
        }
    }

    /// Updates camera state from mouse drag, scroll and arrow keys.
    pub fn update(&mut self) {
        if is_mouse_button_down(MouseButton::Left) {
            let delta = mouse_delta_position();
            self.yaw -= delta.x * 2.0;
            self.pitch -= delta.y * 2.0;
        }

        let scroll = mouse_wheel().1;
        if scroll != 0.0 {
            self.distance = (self.distance - scroll.signum() * self.zoom_speed)
                .clamp(self.min_distance, self.max_distance);
        }

        if is_key_down(KeyCode::Left) {
            self.yaw += 0.02;
        }
        if is_key_down(KeyCode::Right) {
            self.yaw -= 0.02;
        }
        if is_key_down(KeyCode::Up) {
            self.pitch += 0.02;
        }
        if is_key_down(KeyCode::Down) {
            self.pitch -= 0.02;
        }

        // Stay clear of the poles
        self.pitch = self.pitch.clamp(-1.5, 1.5);
    }

    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + vec3(x, y, z)
    }

    pub fn to_camera3d(&self) -> Camera3D {
        Camera3D {
            position: self.position(),
            up: vec3(0.0, 1.0, 0.0),
            target: self.target,
            ..Default::default()
        }
    }
}

/// Installs a `tracing` subscriber that honours `RUST_LOG`, defaulting to `info`.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A second viewer in the same process keeps the first subscriber
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
