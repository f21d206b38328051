//! Planar polygon faces of a fragment mesh.

use nalgebra::{Point3, Vector3};

use crate::{Classification, Plane, PlaneSide};

/// Tolerance used by the debug-build coplanarity check.
const COPLANAR_TOLERANCE: f64 = 1e-6;

/// A planar polygon in 3D space, defined by an ordered list of vertices.
///
/// Vertices are in counter-clockwise winding order when viewed from the
/// outside of the solid (the direction the normal points). The polygon may
/// be non-convex; cap faces produced by a cut usually are for concave meshes.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point3<f64>>,
}

impl Polygon {
    /// Creates a new polygon from a list of vertices.
    ///
    /// # Panics
    /// - Panics if fewer than 3 vertices are provided.
    /// - Panics in debug builds if vertices are not coplanar.
    pub fn new(vertices: Vec<Point3<f64>>) -> Self {
        assert!(
            vertices.len() >= 3,
            "Polygon must have at least 3 vertices"
        );
        debug_assert!(
            Self::are_coplanar(&vertices),
            "Polygon vertices must be coplanar"
        );
        Self { vertices }
    }

    /// Creates a polygon, or `None` if it has fewer than 3 vertices, an area
    /// of at most `min_area`, or vertices off its own plane.
    pub fn try_new(vertices: Vec<Point3<f64>>, min_area: f64) -> Option<Self> {
        if vertices.len() < 3 || !Self::are_coplanar(&vertices) {
            return None;
        }
        let polygon = Self { vertices };
        (polygon.area() > min_area).then_some(polygon)
    }

    /// Checks if all vertices lie on the same plane.
    fn are_coplanar(vertices: &[Point3<f64>]) -> bool {
        if vertices.len() <= 3 {
            return true;
        }

        let normal = newell_normal(vertices);
        let Some(plane) = Plane::new(centroid_of(vertices), normal) else {
            // Zero area: nothing to compare against
            return true;
        };
        let scale = vertices
            .iter()
            .map(|v| v.coords.amax())
            .fold(1.0_f64, f64::max);
        vertices
            .iter()
            .all(|v| plane.signed_distance(v).abs() <= COPLANAR_TOLERANCE * scale)
    }

    /// Returns the vertices of the polygon.
    #[inline]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns true if the polygon has no vertices (always false for valid polygons).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Iterates the directed edges `(v[i], v[i + 1])`, wrapping around.
    pub fn edges(&self) -> impl Iterator<Item = (&Point3<f64>, &Point3<f64>)> {
        let n = self.vertices.len();
        (0..n).map(move |i| (&self.vertices[i], &self.vertices[(i + 1) % n]))
    }

    /// Computes the area-weighted normal (Newell's method).
    ///
    /// Its length is twice the polygon area. Unlike a cross product of the
    /// first three vertices this stays valid when those happen to be collinear.
    pub fn normal(&self) -> Vector3<f64> {
        newell_normal(&self.vertices)
    }

    /// Computes the unit normal vector of the polygon.
    ///
    /// Returns `None` if the polygon has zero area.
    pub fn unit_normal(&self) -> Option<Vector3<f64>> {
        let n = self.normal();
        let len = n.norm();
        if len > f64::EPSILON {
            Some(n / len)
        } else {
            None
        }
    }

    /// Returns the plane that this polygon lies on, or `None` for a zero-area polygon.
    pub fn plane(&self) -> Option<Plane> {
        Plane::new(self.centroid(), self.normal())
    }

    /// Computes the polygon area.
    pub fn area(&self) -> f64 {
        self.normal().norm() * 0.5
    }

    /// Computes the vertex centroid of the polygon.
    pub fn centroid(&self) -> Point3<f64> {
        centroid_of(&self.vertices)
    }

    /// Classifies this polygon relative to a plane.
    ///
    /// Returns:
    /// - `Front` if all vertices are in front of the plane
    /// - `Back` if all vertices are behind the plane
    /// - `Coplanar` if all vertices lie on the plane
    /// - `Spanning` if vertices are on both sides
    pub fn classify(&self, plane: &Plane, epsilon: f64) -> Classification {
        let mut front = 0;
        let mut back = 0;
        let mut on_plane = 0;

        for vertex in &self.vertices {
            match plane.classify_point_with_epsilon(vertex, epsilon) {
                PlaneSide::Front => front += 1,
                PlaneSide::Back => back += 1,
                PlaneSide::OnPlane => on_plane += 1,
            }
        }

        if on_plane == self.vertices.len() {
            Classification::Coplanar
        } else if back == 0 {
            Classification::Front
        } else if front == 0 {
            Classification::Back
        } else {
            Classification::Spanning
        }
    }

    /// Mutable access to vertex positions, for in-place rewrites that keep the topology.
    pub(crate) fn vertices_mut(&mut self) -> &mut [Point3<f64>] {
        &mut self.vertices
    }

    /// Signed volume contribution of this face relative to the origin.
    ///
    /// Summing over a closed, outward-wound mesh yields its enclosed volume.
    pub(crate) fn signed_volume(&self) -> f64 {
        let origin = self.vertices[0].coords;
        let mut volume = 0.0;
        for i in 1..self.vertices.len() - 1 {
            let b = self.vertices[i].coords;
            let c = self.vertices[i + 1].coords;
            volume += origin.dot(&b.cross(&c));
        }
        volume / 6.0
    }
}

/// Determines if a polygon faces the same direction as a plane.
///
/// Compares the polygon's normal to the plane's normal using the dot product.
/// Returns `true` if the normals point in roughly the same direction (dot > 0).
/// A zero-area polygon faces nowhere and returns `false`.
#[inline]
pub fn faces_same_direction(polygon: &Polygon, plane: &Plane) -> bool {
    polygon.normal().dot(&plane.normal()) > 0.0
}

fn newell_normal(vertices: &[Point3<f64>]) -> Vector3<f64> {
    let n = vertices.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let a = &vertices[i];
        let b = &vertices[(i + 1) % n];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}

fn centroid_of(vertices: &[Point3<f64>]) -> Point3<f64> {
    let sum: Vector3<f64> = vertices.iter().map(|p| p.coords).sum();
    Point3::from(sum / vertices.len() as f64)
}
