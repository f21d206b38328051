//! Polygon-soup meshes used for sources, fragments and clipping volumes.

use std::f64::consts::{PI, TAU};

use nalgebra::{Isometry3, Point3, Vector3};

use crate::Polygon;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    /// Builds the smallest box containing all points, or `None` for an empty iterator.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3<f64>>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut aabb = Self {
            min: first,
            max: first,
        };
        for p in iter {
            aabb.min = aabb.min.inf(p);
            aabb.max = aabb.max.sup(p);
        }
        Some(aabb)
    }

    /// Returns the box centre.
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Returns the length of the box diagonal.
    pub fn diagonal(&self) -> f64 {
        (self.max - self.min).norm()
    }
}

/// A mesh stored as a list of planar polygons with outward winding.
///
/// Adjacent polygons repeat their shared vertices; the mesh is closed when
/// every directed edge `(a, b)` has a matching `(b, a)` in another polygon.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    polygons: Vec<Polygon>,
}

impl Mesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mesh from polygons.
    pub fn from_polygons(polygons: Vec<Polygon>) -> Self {
        Self { polygons }
    }

    /// Creates a mesh from shared positions and faces given as index loops.
    ///
    /// Faces with fewer than 3 indices are skipped.
    ///
    /// Faces with fewer than 3 indices are skipped.
    ///
    /// # Panics
    /// Panics if a face references a position out of range.
    pub fn from_indexed(positions: &[Point3<f64>], faces: &[Vec<usize>]) -> Self {
        let polygons = faces
            .iter()
            .filter(|face| face.len() >= 3)
            .map(|face| Polygon::new(face.iter().map(|&i| positions[i]).collect()))
            .collect();
        Self { polygons }
    }

    /// Extrudes a simple polygon in the XY plane from `bottom` to `top` along Z.
    ///
    /// `outline` is wound counter-clockwise seen from +Z and may be concave.
    ///
    /// # Panics
    /// Panics if `outline` has fewer than 3 points.
    pub fn prism(outline: &[[f64; 2]], bottom: f64, top: f64) -> Self {
        let n = outline.len();
        let positions: Vec<Point3<f64>> = [bottom, top]
            .iter()
            .flat_map(|&z| outline.iter().map(move |&[x, y]| Point3::new(x, y, z)))
            .collect();

        let mut faces: Vec<Vec<usize>> = Vec::with_capacity(n + 2);
        faces.push((0..n).rev().collect());
        faces.push((n..2 * n).collect());
        for i in 0..n {
            let j = (i + 1) % n;
            faces.push(vec![i, j, j + n, i + n]);
        }
        Self::from_indexed(&positions, &faces)
    }

    /// Generates an axis-aligned box centred on `center`.
    pub fn cuboid(center: Point3<f64>, half_extents: Vector3<f64>) -> Self {
        let (hx, hy, hz) = (half_extents.x, half_extents.y, half_extents.z);

        let corners = [
            center + Vector3::new(-hx, -hy, -hz), // 0: left-bottom-back
            center + Vector3::new(hx, -hy, -hz),  // 1: right-bottom-back
            center + Vector3::new(hx, hy, -hz),   // 2: right-top-back
            center + Vector3::new(-hx, hy, -hz),  // 3: left-top-back
            center + Vector3::new(-hx, -hy, hz),  // 4: left-bottom-front
            center + Vector3::new(hx, -hy, hz),   // 5: right-bottom-front
            center + Vector3::new(hx, hy, hz),    // 6: right-top-front
            center + Vector3::new(-hx, hy, hz),   // 7: left-top-front
        ];

        // Counter-clockwise winding viewed from outside
        let faces = [
            vec![4, 5, 6, 7], // front (+Z)
            vec![1, 0, 3, 2], // back (-Z)
            vec![0, 4, 7, 3], // left (-X)
            vec![5, 1, 2, 6], // right (+X)
            vec![7, 6, 2, 3], // top (+Y)
            vec![0, 1, 5, 4], // bottom (-Y)
        ];

        Self::from_indexed(&corners, &faces)
    }

    /// Generates a cube with edge length `size`.
    pub fn cube(center: Point3<f64>, size: f64) -> Self {
        Self::cuboid(center, Vector3::repeat(size * 0.5))
    }

    /// Generates a latitude/longitude sphere with triangle caps and quad bands.
    ///
    /// `segments` is clamped to at least 3 and `rings` to at least 2.
    pub fn uv_sphere(center: Point3<f64>, radius: f64, segments: usize, rings: usize) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);

        let north = center + Vector3::z() * radius;
        let south = center - Vector3::z() * radius;
        let ring_point = |ring: usize, seg: usize| {
            let theta = PI * ring as f64 / rings as f64;
            let phi = TAU * (seg % segments) as f64 / segments as f64;
            center
                + Vector3::new(
                    theta.sin() * phi.cos(),
                    theta.sin() * phi.sin(),
                    theta.cos(),
                ) * radius
        };

        let mut polygons = Vec::with_capacity(segments * rings);
        for seg in 0..segments {
            polygons.push(Polygon::new(vec![
                north,
                ring_point(1, seg),
                ring_point(1, seg + 1),
            ]));
            for ring in 1..rings - 1 {
                polygons.push(Polygon::new(vec![
                    ring_point(ring, seg),
                    ring_point(ring + 1, seg),
                    ring_point(ring + 1, seg + 1),
                    ring_point(ring, seg + 1),
                ]));
            }
            polygons.push(Polygon::new(vec![
                ring_point(rings - 1, seg),
                south,
                ring_point(rings - 1, seg + 1),
            ]));
        }

        Self { polygons }
    }

    /// Returns the polygons of the mesh.
    #[inline]
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Consumes the mesh, returning its polygons.
    pub fn into_polygons(self) -> Vec<Polygon> {
        self.polygons
    }

    /// Returns the number of polygons.
    #[inline]
    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    /// Returns true if the mesh has no polygons.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Iterates every polygon corner. Shared vertices are visited once per polygon.
    pub fn vertices(&self) -> impl Iterator<Item = &Point3<f64>> {
        self.polygons.iter().flat_map(|p| p.vertices().iter())
    }

    /// Returns the number of polygon corners.
    pub fn corner_count(&self) -> usize {
        self.polygons.iter().map(Polygon::len).sum()
    }

    /// Returns the bounding box, or `None` for an empty mesh.
    pub fn bounding_box(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices())
    }

    /// Computes the enclosed volume of a closed, outward-wound mesh.
    pub fn volume(&self) -> f64 {
        self.polygons.iter().map(Polygon::signed_volume).sum()
    }

    /// Returns a copy of the mesh mapped through a rigid transform.
    pub fn transformed(&self, iso: &Isometry3<f64>) -> Self {
        let polygons = self
            .polygons
            .iter()
            .map(|p| Polygon::new(p.vertices().iter().map(|v| iso * v).collect()))
            .collect();
        Self { polygons }
    }

    /// Overwrites every corner position in iteration order, keeping the topology.
    ///
    /// Returns `false` without modifying anything if `positions` does not
    /// match [`Mesh::corner_count`].
    pub fn set_corner_positions(&mut self, positions: &[Point3<f64>]) -> bool {
        if positions.len() != self.corner_count() {
            return false;
        }
        let mut source = positions.iter();
        for polygon in &mut self.polygons {
            for (slot, p) in polygon.vertices_mut().iter_mut().zip(&mut source) {
                *slot = *p;
            }
        }
        true
    }

    /// Appends a polygon.
    pub fn push(&mut self, polygon: Polygon) {
        self.polygons.push(polygon);
    }

    /// Replaces all polygons.
    pub(crate) fn replace_polygons(&mut self, polygons: Vec<Polygon>) {
        self.polygons = polygons;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cube_has_six_outward_faces() {
        let cube = Mesh::cube(Point3::origin(), 2.0);
        assert_eq!(cube.polygon_count(), 6);
        assert_eq!(cube.corner_count(), 24);

        for face in cube.polygons() {
            let normal = face.unit_normal().unwrap();
            // Outward: normal points away from the centre
            assert!(normal.dot(&face.centroid().coords) > 0.0);
        }
    }

    #[test]
    fn cuboid_volume() {
        let cube = Mesh::cuboid(Point3::new(1.0, 2.0, 3.0), Vector3::new(1.0, 2.0, 0.5));
        assert_relative_eq!(cube.volume(), 2.0 * 4.0 * 1.0, epsilon = 1e-12);
    }

    #[test]
    fn bounding_box_of_cube() {
        let cube = Mesh::cube(Point3::new(1.0, 1.0, 1.0), 2.0);
        let aabb = cube.bounding_box().unwrap();
        assert_eq!(aabb.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(aabb.max, Point3::new(2.0, 2.0, 2.0));
        assert_relative_eq!(aabb.diagonal(), 12.0_f64.sqrt());
        assert_eq!(aabb.center(), Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn empty_mesh_has_no_bounds() {
        let mesh = Mesh::new();
        assert!(mesh.is_empty());
        assert!(mesh.bounding_box().is_none());
        assert_eq!(mesh.volume(), 0.0);
    }

    #[test]
    fn concave_prism_volume() {
        let l_shape = [[0.0, 0.0], [2.0, 0.0], [2.0, 1.0], [1.0, 1.0], [1.0, 2.0], [0.0, 2.0]];
        let prism = Mesh::prism(&l_shape, 0.0, 1.0);
        assert_eq!(prism.polygon_count(), 8);
        assert_relative_eq!(prism.volume(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn uv_sphere_volume_approaches_ball() {
        let sphere = Mesh::uv_sphere(Point3::origin(), 1.0, 48, 24);
        let ball = 4.0 / 3.0 * PI;
        assert!(sphere.volume() > 0.95 * ball && sphere.volume() < ball);
    }

    #[test]
    fn transform_preserves_volume() {
        let cube = Mesh::cube(Point3::origin(), 1.0);
        let iso = Isometry3::new(Vector3::new(3.0, 0.0, -1.0), Vector3::new(0.3, 0.2, 0.1));
        let moved = cube.transformed(&iso);
        assert_relative_eq!(moved.volume(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(moved.bounding_box().unwrap().center(), iso * Point3::origin(), epsilon = 1e-12);
    }

    #[test]
    fn set_corner_positions_checks_length() {
        let mut cube = Mesh::cube(Point3::origin(), 1.0);
        assert!(!cube.set_corner_positions(&[Point3::origin()]));

        let shifted: Vec<_> = cube.vertices().map(|v| v + Vector3::x()).collect();
        assert!(cube.set_corner_positions(&shifted));
        assert_relative_eq!(cube.bounding_box().unwrap().center(), Point3::new(1.0, 0.0, 0.0));
    }
}
