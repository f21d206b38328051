//! Orthonormal frames spanning a plane.

use nalgebra::{Point3, Vector3};

use crate::Plane;

/// Returns a unit vector orthogonal to `v`.
///
/// The component with the larger magnitude out of `x` and `y` is kept so the
/// result never degenerates for vectors close to a coordinate axis.
/// `v` must be non-zero.
pub fn orthogonal_unit_vector(v: &Vector3<f64>) -> Vector3<f64> {
    if v.x.abs() > v.y.abs() {
        Vector3::new(-v.z, 0.0, v.x) / (v.x * v.x + v.z * v.z).sqrt()
    } else {
        Vector3::new(0.0, v.z, -v.y) / (v.y * v.y + v.z * v.z).sqrt()
    }
}

/// A right-handed orthonormal frame `(x, y, normal)` attached to a plane.
///
/// `x × y == normal`, so a polygon walked counter-clockwise in the `(x, y)`
/// coordinates faces along the plane normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneBasis {
    pub origin: Point3<f64>,
    pub x: Vector3<f64>,
    pub y: Vector3<f64>,
    pub normal: Vector3<f64>,
}

impl PlaneBasis {
    /// Builds the frame for a plane, anchored at the plane's reference point.
    pub fn from_plane(plane: &Plane) -> Self {
        let normal = plane.normal();
        let x = orthogonal_unit_vector(&normal);
        let y = normal.cross(&x);
        Self {
            origin: plane.point(),
            x,
            y,
            normal,
        }
    }

    /// Maps in-plane coordinates `(u, v)` and a height `w` along the normal to a point.
    #[inline]
    pub fn point_at(&self, u: f64, v: f64, w: f64) -> Point3<f64> {
        self.origin + self.x * u + self.y * v + self.normal * w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn orthogonal_for_axis_vectors() {
        for v in [Vector3::x(), Vector3::y(), Vector3::z(), -Vector3::x()] {
            let o = orthogonal_unit_vector(&v);
            assert_relative_eq!(o.norm(), 1.0, epsilon = 1e-12);
            assert!(o.dot(&v).abs() < 1e-12, "{o:?} not orthogonal to {v:?}");
        }
    }

    #[test]
    fn orthogonal_for_skewed_vectors() {
        let samples = [
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(-3.0, 0.001, 2.0),
            Vector3::new(0.0, 0.0, -5.0),
            Vector3::new(1e-3, -2.0, 1e-3),
        ];
        for v in samples {
            let o = orthogonal_unit_vector(&v);
            assert_relative_eq!(o.norm(), 1.0, epsilon = 1e-12);
            assert!(o.dot(&v).abs() < 1e-9);
        }
    }

    #[test]
    fn basis_is_right_handed_and_orthonormal() {
        let plane = Plane::new(Point3::new(1.0, 2.0, 3.0), Vector3::new(0.3, -0.5, 0.8)).unwrap();
        let basis = PlaneBasis::from_plane(&plane);

        assert_relative_eq!(basis.x.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(basis.y.norm(), 1.0, epsilon = 1e-12);
        assert!(basis.x.dot(&basis.y).abs() < 1e-12);
        assert_relative_eq!(basis.x.cross(&basis.y), basis.normal, epsilon = 1e-12);

        let p = basis.point_at(2.0, -1.0, 0.0);
        assert!(plane.signed_distance(&p).abs() < 1e-12);
        assert_relative_eq!(plane.signed_distance(&basis.point_at(0.0, 0.0, -4.0)), -4.0, epsilon = 1e-12);
    }
}
