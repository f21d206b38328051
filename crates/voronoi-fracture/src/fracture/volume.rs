//! The reusable clipping polyhedron of the boolean strategy.

use std::f64::consts::TAU;

use nalgebra::{Isometry3, Point3};

use crate::scene::{Scene, SceneResult};
use crate::{Mesh, Plane, PlaneBasis, Polygon, VolumeShape};

/// Corner loops of each shape, indexing into [`corner_positions`].
///
/// The base triangle `0, 1, 2` is wound counter-clockwise around the plane
/// normal, so it faces the discarded side. The tetrahedron apex `3` sits
/// below the base.
const TRIANGLE_FACES: &[&[usize]] = &[&[0, 1, 2]];
const TETRAHEDRON_FACES: &[&[usize]] = &[&[0, 1, 2], &[1, 0, 3], &[2, 1, 3], &[0, 2, 3]];

fn faces(shape: VolumeShape) -> &'static [&'static [usize]] {
    match shape {
        VolumeShape::Triangle => TRIANGLE_FACES,
        VolumeShape::Tetrahedron => TETRAHEDRON_FACES,
    }
}

/// Distinct corner positions of the volume for `plane`.
///
/// The base is an equilateral triangle with circumradius `2 * half_extent`
/// centred on the plane point, so it covers a disk of radius `half_extent`.
fn corner_positions(shape: VolumeShape, plane: &Plane, half_extent: f64) -> Vec<Point3<f64>> {
    let basis = PlaneBasis::from_plane(plane);
    let circumradius = 2.0 * half_extent;
    let mut corners: Vec<Point3<f64>> = (0..3)
        .map(|k| {
            let angle = TAU / 4.0 + k as f64 * TAU / 3.0;
            basis.point_at(circumradius * angle.cos(), circumradius * angle.sin(), 0.0)
        })
        .collect();
    if shape == VolumeShape::Tetrahedron {
        corners.push(basis.point_at(0.0, 0.0, -half_extent));
    }
    corners
}

/// A clipping polyhedron living in the scene as its own node.
///
/// The node is created once per run and its vertex positions are rewritten
/// for every plane; its topology never changes.
#[derive(Debug)]
pub struct ClippingVolume<N> {
    node: N,
    shape: VolumeShape,
    half_extent: f64,
    /// Scratch buffer of per-corner positions, reused across planes.
    positions: Vec<Point3<f64>>,
}

impl<N: Copy> ClippingVolume<N> {
    /// Creates the volume node.
    ///
    /// The node gets `transform`, so planes passed to [`ClippingVolume::fit`]
    /// are in that node-local space.
    pub fn create<S>(
        scene: &mut S,
        shape: VolumeShape,
        half_extent: f64,
        transform: Isometry3<f64>,
    ) -> SceneResult<Self>
    where
        S: Scene<Node = N>,
    {
        let template = Plane::from_unit_normal(Point3::origin(), nalgebra::Vector3::z_axis());
        let corners = corner_positions(shape, &template, half_extent);
        let polygons = faces(shape)
            .iter()
            .map(|face| Polygon::new(face.iter().map(|&i| corners[i]).collect()))
            .collect();
        let mesh = Mesh::from_polygons(polygons);
        let positions = Vec::with_capacity(mesh.corner_count());
        let node = scene.create_mesh("clipping_volume", mesh, transform)?;

        Ok(Self {
            node,
            shape,
            half_extent,
            positions,
        })
    }

    /// Scene handle of the volume.
    pub fn node(&self) -> N {
        self.node
    }

    /// Moves the volume so its base lies in `plane` and it encloses the
    /// half-space behind the plane near the plane point.
    pub fn fit<S>(&mut self, scene: &mut S, plane: &Plane) -> SceneResult<()>
    where
        S: Scene<Node = N>,
    {
        let corners = corner_positions(self.shape, plane, self.half_extent);
        self.positions.clear();
        self.positions
            .extend(faces(self.shape).iter().flat_map(|face| face.iter().map(|&i| corners[i])));
        scene.set_vertex_positions(self.node, &self.positions)
    }

    /// Deletes the volume node.
    pub fn release<S>(self, scene: &mut S) -> SceneResult<()>
    where
        S: Scene<Node = N>,
    {
        scene.delete(self.node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::MemoryScene;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn tetrahedron_is_closed_and_outward() {
        let plane = Plane::new(Point3::new(1.0, 2.0, 3.0), Vector3::new(0.3, -1.0, 0.2)).unwrap();
        let corners = corner_positions(VolumeShape::Tetrahedron, &plane, 1.0);
        let mesh = Mesh::from_indexed(
            &corners,
            &TETRAHEDRON_FACES.iter().map(|f| f.to_vec()).collect::<Vec<_>>(),
        );
        assert!(mesh.volume() > 0.0);

        // The base faces along the plane normal
        let base = mesh.polygons()[0].unit_normal().unwrap();
        assert_relative_eq!(base, plane.normal(), epsilon = 1e-12);
    }

    #[test]
    fn base_covers_half_extent_disk() {
        let plane = Plane::new(Point3::origin(), Vector3::z()).unwrap();
        let corners = corner_positions(VolumeShape::Triangle, &plane, 5.0);
        // Inradius of an equilateral triangle is half its circumradius
        let tri = Polygon::new(corners);
        let inradius = 2.0 * tri.area() / (3.0 * 10.0 * 3.0_f64.sqrt());
        assert_relative_eq!(inradius, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn fit_rewrites_positions_in_place() {
        let mut scene = MemoryScene::new();
        let mut volume =
            ClippingVolume::create(&mut scene, VolumeShape::Tetrahedron, 2.0, Isometry3::identity()).unwrap();
        let before = scene.mesh(volume.node()).unwrap().polygon_count();

        let plane = Plane::new(Point3::new(0.0, 0.0, 1.0), Vector3::y()).unwrap();
        volume.fit(&mut scene, &plane).unwrap();

        let mesh = scene.mesh(volume.node()).unwrap();
        assert_eq!(mesh.polygon_count(), before);
        assert_relative_eq!(mesh.polygons()[0].unit_normal().unwrap(), Vector3::y(), epsilon = 1e-12);
        assert!(mesh.vertices().all(|v| v.y <= 1e-12));

        let node = volume.node();
        volume.release(&mut scene).unwrap();
        assert!(!scene.contains(node));
    }
}
