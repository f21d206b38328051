//! Voronoi fracture of polygon meshes.
//!
//! A source mesh is copied once per seed point and each copy is clipped
//! against the bisector planes toward all other seeds, leaving the seed's
//! Voronoi cell intersected with the source solid.
//!
//! ```
//! use nalgebra::Point3;
//! use voronoi_fracture::{FractureEngine, MemoryScene, Mesh};
//!
//! let mut scene = MemoryScene::new();
//! let cube = scene.insert("cube", Mesh::cube(Point3::origin(), 2.0));
//! let seeds = [Point3::new(-0.5, 0.0, 0.0), Point3::new(0.5, 0.0, 0.0)];
//!
//! let report = FractureEngine::default().run(&mut scene, cube, &seeds, true).unwrap();
//! assert_eq!(report.fragments.len(), 2);
//! ```

mod basis;
mod clip;
mod config;
mod cuttable;
pub mod distribution;
mod error;
pub mod fracture;
mod mesh;
mod plane;
mod polygon;
pub mod scene;
mod visitor;

pub use basis::{PlaneBasis, orthogonal_unit_vector};
pub use clip::ClipSummary;
pub use config::{ClipMethod, FractureConfig, FractureParams, MIN_STEP_NOISE, NeighborOrder, VolumeShape};
pub use cuttable::{Cut, Cuttable};
pub use error::{ErrorKind, FractureError, FractureResult};
pub use fracture::{
    ClipStats, DiscardReason, DiscardedFragment, FractureEngine, FractureReport, FragmentRecord,
    SeedPoint, SeedSource,
};
pub use mesh::{Aabb, Mesh};
pub use plane::{Classification, PLANE_EPSILON, Plane, PlaneSide};
pub use polygon::{Polygon, faces_same_direction};
pub use scene::{EditCommand, MemoryScene, NodeId, Scene, SceneError, SceneResult};
pub use visitor::{
    CollectingVisitor, FnVisitor, MeshClassification, PlaneClassifier, VertexVisitor, classify_mesh,
    visit_mesh_vertices,
};
