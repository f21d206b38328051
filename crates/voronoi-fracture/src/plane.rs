//! Plane representation and the half-space tests used by the fracture engine.

use nalgebra::{Isometry3, Point3, Unit, Vector3};

/// Default epsilon for plane classification.
/// Points within this distance of the plane are considered "on" the plane.
pub const PLANE_EPSILON: f64 = 1e-9;

/// Which side of a plane a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// Point is in front of the plane (positive side of normal, discarded by a clip)
    Front,
    /// Point is behind the plane (negative side of normal, kept by a clip)
    Back,
    /// Point lies on the plane (within epsilon tolerance)
    OnPlane,
}

/// Classification of a single polygon relative to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// All vertices are in front of the plane
    Front,
    /// All vertices are behind the plane
    Back,
    /// All vertices are on the plane (coplanar)
    Coplanar,
    /// Vertices are on both sides (spans the plane)
    Spanning,
}

/// A plane in 3D space in point-normal form.
///
/// The signed distance of `x` is `normal · (x - point)`. The positive side is
/// the "outside" that a clip removes; the non-positive side is kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    normal: Unit<Vector3<f64>>,
    point: Point3<f64>,
}

impl Plane {
    /// Creates a plane through `point` with the given normal.
    /// The normal is normalized; returns `None` if it has zero length.
    pub fn new(point: Point3<f64>, normal: Vector3<f64>) -> Option<Self> {
        let normal = Unit::try_new(normal, f64::EPSILON)?;
        Some(Self { normal, point })
    }

    /// Creates a plane from a point and an already normalized direction.
    #[inline]
    pub fn from_unit_normal(point: Point3<f64>, normal: Unit<Vector3<f64>>) -> Self {
        Self { normal, point }
    }

    /// Builds the bisector plane of two points.
    ///
    /// The normal points from `p0` toward `p1` and the plane passes through
    /// their midpoint, so `p0` is on the kept side and `p1` on the discarded
    /// side. Returns `None` when the points coincide.
    pub fn bisector(p0: Point3<f64>, p1: Point3<f64>) -> Option<Self> {
        Self::new(nalgebra::center(&p0, &p1), p1 - p0)
    }

    /// Returns the unit normal vector of the plane.
    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.normal.into_inner()
    }

    /// Returns the unit normal as a `Unit`.
    #[inline]
    pub fn unit_normal(&self) -> Unit<Vector3<f64>> {
        self.normal
    }

    /// Returns the reference point of the plane.
    #[inline]
    pub fn point(&self) -> Point3<f64> {
        self.point
    }

    /// Computes the signed distance from a point to the plane.
    /// - Positive: point is in front (outside, same side as normal)
    /// - Negative: point is behind (inside)
    /// - Zero: point is on the plane
    #[inline]
    pub fn signed_distance(&self, x: &Point3<f64>) -> f64 {
        self.normal.dot(&(x - self.point))
    }

    /// Classifies which side of the plane a point lies on, with a custom epsilon.
    pub fn classify_point_with_epsilon(&self, x: &Point3<f64>, epsilon: f64) -> PlaneSide {
        let dist = self.signed_distance(x);
        if dist > epsilon {
            PlaneSide::Front
        } else if dist < -epsilon {
            PlaneSide::Back
        } else {
            PlaneSide::OnPlane
        }
    }

    /// Returns a new plane with the normal flipped (facing the opposite direction).
    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            point: self.point,
        }
    }

    /// Maps the plane through a rigid transform.
    pub fn transformed(&self, iso: &Isometry3<f64>) -> Self {
        Self {
            normal: iso.rotation * self.normal,
            point: iso * self.point,
        }
    }

    /// Maps the plane through the inverse of a rigid transform, e.g. from
    /// world space into the local space of a node whose world transform is `iso`.
    pub fn inverse_transformed(&self, iso: &Isometry3<f64>) -> Self {
        Self {
            normal: iso.rotation.inverse() * self.normal,
            point: iso.inverse_transform_point(&self.point),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn signed_distance_sign_follows_normal() {
        let plane = Plane::new(Point3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 0.0, 2.0)).unwrap();
        assert_relative_eq!(plane.normal().norm(), 1.0);
        assert_relative_eq!(plane.signed_distance(&Point3::new(5.0, 3.0, 4.0)), 3.0);
        assert_relative_eq!(plane.signed_distance(&Point3::new(0.0, 0.0, -1.0)), -2.0);
    }

    #[test]
    fn zero_normal_is_rejected() {
        assert!(Plane::new(Point3::origin(), Vector3::zeros()).is_none());
    }

    #[test]
    fn bisector_passes_through_midpoint() {
        let p0 = Point3::new(1.0, 0.0, 0.0);
        let p1 = Point3::new(3.0, 2.0, 0.0);
        let plane = Plane::bisector(p0, p1).unwrap();

        assert_relative_eq!(plane.point(), Point3::new(2.0, 1.0, 0.0));
        assert!(plane.signed_distance(&p0) < 0.0);
        assert!(plane.signed_distance(&p1) > 0.0);
        assert_relative_eq!(plane.signed_distance(&p0), -plane.signed_distance(&p1));
    }

    #[test]
    fn bisector_is_antisymmetric() {
        let a = Point3::new(0.3, -1.2, 2.0);
        let b = Point3::new(-0.7, 0.4, 1.1);
        let ab = Plane::bisector(a, b).unwrap();
        let ba = Plane::bisector(b, a).unwrap();

        assert_relative_eq!(ab.normal(), -ba.normal(), epsilon = 1e-12);

        // Same point set at distance zero
        let on_plane = ab.point() + crate::orthogonal_unit_vector(&ab.normal()) * 3.0;
        assert!(ab.signed_distance(&on_plane).abs() < 1e-12);
        assert!(ba.signed_distance(&on_plane).abs() < 1e-12);
    }

    #[test]
    fn bisector_of_coincident_points_is_degenerate() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert!(Plane::bisector(p, p).is_none());
    }

    #[test]
    fn classify_point_with_tolerance() {
        let plane = Plane::new(Point3::origin(), Vector3::y()).unwrap();
        let side = |x, y, z| plane.classify_point_with_epsilon(&Point3::new(x, y, z), PLANE_EPSILON);
        assert_eq!(side(0.0, 1.0, 0.0), PlaneSide::Front);
        assert_eq!(side(0.0, -1.0, 0.0), PlaneSide::Back);
        assert_eq!(side(7.0, 1e-12, 0.0), PlaneSide::OnPlane);
        assert_eq!(
            plane.classify_point_with_epsilon(&Point3::new(0.0, 0.05, 0.0), 0.1),
            PlaneSide::OnPlane
        );
    }

    #[test]
    fn flipped_negates_distance() {
        let plane = Plane::new(Point3::new(1.0, 1.0, 1.0), Vector3::new(1.0, 1.0, 0.0)).unwrap();
        let x = Point3::new(3.0, -2.0, 5.0);
        assert_relative_eq!(plane.flipped().signed_distance(&x), -plane.signed_distance(&x));
    }

    #[test]
    fn inverse_transform_round_trips() {
        let iso = Isometry3::new(Vector3::new(1.0, -2.0, 3.0), Vector3::new(0.2, 0.7, -0.4));
        let world = Plane::new(Point3::new(0.5, 0.5, 0.5), Vector3::new(1.0, 2.0, -1.0)).unwrap();
        let local = world.inverse_transformed(&iso);

        let local_point = Point3::new(0.1, -3.0, 2.5);
        let world_point = iso * local_point;
        assert_relative_eq!(
            local.signed_distance(&local_point),
            world.signed_distance(&world_point),
            epsilon = 1e-12
        );

        let back = local.transformed(&iso);
        assert_relative_eq!(back.normal(), world.normal(), epsilon = 1e-12);
        assert!(back.signed_distance(&world.point()).abs() < 1e-12);
    }
}
