//! Visitor pattern for vertex enumeration and mesh-versus-plane classification.
//!
//! Visitors allow the fracture engine to scan fragment vertices through the
//! scene collaborator without copying them out, and to stop the scan as soon
//! as the answer is known.

use std::ops::ControlFlow;

use nalgebra::Point3;

use crate::{Mesh, Plane};

/// Visitor for processing vertex positions during enumeration.
pub trait VertexVisitor {
    /// Called for each vertex. Returning `ControlFlow::Break` ends the enumeration.
    fn visit(&mut self, position: &Point3<f64>) -> ControlFlow<()>;
}

/// A simple visitor that collects all visited positions.
#[derive(Debug, Default)]
pub struct CollectingVisitor {
    collected: Vec<Point3<f64>>,
}

impl CollectingVisitor {
    /// Creates a new empty collecting visitor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a reference to the collected positions.
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.collected
    }
}

impl VertexVisitor for CollectingVisitor {
    fn visit(&mut self, position: &Point3<f64>) -> ControlFlow<()> {
        self.collected.push(*position);
        ControlFlow::Continue(())
    }
}

/// A visitor that calls a closure for each vertex.
pub struct FnVisitor<F>
where
    F: FnMut(&Point3<f64>) -> ControlFlow<()>,
{
    func: F,
}

impl<F> FnVisitor<F>
where
    F: FnMut(&Point3<f64>) -> ControlFlow<()>,
{
    /// Creates a new visitor from a closure.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> VertexVisitor for FnVisitor<F>
where
    F: FnMut(&Point3<f64>) -> ControlFlow<()>,
{
    fn visit(&mut self, position: &Point3<f64>) -> ControlFlow<()> {
        (self.func)(position)
    }
}

/// Where a whole mesh lies relative to a clipping plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshClassification {
    /// No vertex is on the positive side; clipping would remove nothing.
    AllInside,
    /// Every vertex is on the positive side; clipping would remove everything.
    AllOutside,
    /// Vertices on both sides; the mesh must be clipped.
    Straddles,
}

/// Visitor that classifies a vertex stream against a plane.
///
/// Distances above `epsilon` count as outside, everything else as inside.
/// The scan breaks as soon as both sides have been seen.
#[derive(Debug, Clone)]
pub struct PlaneClassifier {
    plane: Plane,
    epsilon: f64,
    seen_outside: bool,
    seen_inside: bool,
}

impl PlaneClassifier {
    pub fn new(plane: Plane, epsilon: f64) -> Self {
        Self {
            plane,
            epsilon,
            seen_outside: false,
            seen_inside: false,
        }
    }

    /// Returns the classification of everything visited so far.
    ///
    /// An empty vertex stream has nothing left on the kept side and
    /// classifies as `AllOutside`.
    pub fn classification(&self) -> MeshClassification {
        match (self.seen_outside, self.seen_inside) {
            (true, true) => MeshClassification::Straddles,
            (false, true) => MeshClassification::AllInside,
            _ => MeshClassification::AllOutside,
        }
    }
}

impl VertexVisitor for PlaneClassifier {
    fn visit(&mut self, position: &Point3<f64>) -> ControlFlow<()> {
        if self.plane.signed_distance(position) > self.epsilon {
            self.seen_outside = true;
        } else {
            self.seen_inside = true;
        }
        if self.seen_outside && self.seen_inside {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}

/// Feeds every vertex of a mesh to a visitor, stopping early on `Break`.
pub fn visit_mesh_vertices<V: VertexVisitor + ?Sized>(mesh: &Mesh, visitor: &mut V) {
    for vertex in mesh.vertices() {
        if visitor.visit(vertex).is_break() {
            return;
        }
    }
}

/// Classifies a whole mesh against a plane.
pub fn classify_mesh(mesh: &Mesh, plane: &Plane, epsilon: f64) -> MeshClassification {
    let mut classifier = PlaneClassifier::new(*plane, epsilon);
    visit_mesh_vertices(mesh, &mut classifier);
    classifier.classification()
}
