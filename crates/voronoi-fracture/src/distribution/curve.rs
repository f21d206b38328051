//! Curves that seed points can be scattered around.

use nalgebra::{Point3, Vector3};

use super::{DistributionError, DistributionResult};

/// A parametric space curve with arc-length lookup.
pub trait Curve {
    /// Total arc length.
    fn length(&self) -> f64;

    /// Returns the parameter at arc length `length`, clamped to the curve.
    fn param_at_length(&self, length: f64) -> f64;

    /// Evaluates the curve position at parameter `t`.
    fn point_at(&self, t: f64) -> Point3<f64>;

    /// Evaluates the unit tangent at parameter `t`.
    fn tangent_at(&self, t: f64) -> Vector3<f64>;
}

/// A piecewise linear curve parameterized by normalized arc length.
///
/// `t = 0` is the first vertex, `t = 1` the last one and `t = 0.5` the point
/// at half the total length.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    vertices: Vec<Point3<f64>>,
    /// Arc length at each vertex; the first entry is 0.
    cumulative: Vec<f64>,
}

impl Polyline {
    /// Creates a polyline through `vertices`.
    ///
    /// # Errors
    /// Returns [`DistributionError::DegenerateCurve`] for fewer than two
    /// vertices or a curve of zero length.
    pub fn new(vertices: Vec<Point3<f64>>) -> DistributionResult<Self> {
        if vertices.len() < 2 {
            return Err(DistributionError::DegenerateCurve {
                details: format!("{} vertices, need at least 2", vertices.len()),
            });
        }

        let mut cumulative = Vec::with_capacity(vertices.len());
        let mut total = 0.0;
        cumulative.push(total);
        for pair in vertices.windows(2) {
            total += (pair[1] - pair[0]).norm();
            cumulative.push(total);
        }

        if total <= f64::EPSILON {
            return Err(DistributionError::DegenerateCurve {
                details: "zero length".to_owned(),
            });
        }

        Ok(Self {
            vertices,
            cumulative,
        })
    }

    /// Returns the vertices.
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Finds the segment containing arc length `arc` and the local parameter in it.
    fn segment_at_arc(&self, arc: f64) -> (usize, f64) {
        let last = self.vertices.len() - 2;
        let arc = arc.clamp(0.0, self.length());

        // First vertex whose cumulative length is >= arc
        let upper = self.cumulative.partition_point(|&c| c < arc);
        let segment = upper.saturating_sub(1).min(last);

        let start = self.cumulative[segment];
        let span = self.cumulative[segment + 1] - start;
        let local = if span > 1e-12 { (arc - start) / span } else { 0.0 };
        (segment, local)
    }
}

impl Curve for Polyline {
    fn length(&self) -> f64 {
        self.cumulative[self.cumulative.len() - 1]
    }

    fn param_at_length(&self, length: f64) -> f64 {
        (length / self.length()).clamp(0.0, 1.0)
    }

    fn point_at(&self, t: f64) -> Point3<f64> {
        let (segment, local) = self.segment_at_arc(t * self.length());
        let a = self.vertices[segment];
        let b = self.vertices[segment + 1];
        a + (b - a) * local
    }

    fn tangent_at(&self, t: f64) -> Vector3<f64> {
        let (segment, _) = self.segment_at_arc(t * self.length());
        let dir = self.vertices[segment + 1] - self.vertices[segment];
        let len = dir.norm();
        if len > 1e-12 {
            return dir / len;
        }
        // Zero-length segment: fall back to the overall direction
        let overall = self.vertices[self.vertices.len() - 1] - self.vertices[0];
        overall.try_normalize(1e-12).unwrap_or_else(Vector3::x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_l_curve() -> Polyline {
        Polyline::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 3.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn length_and_arc_parameterization() {
        let curve = make_l_curve();
        assert_relative_eq!(curve.length(), 4.0);
        assert_relative_eq!(curve.param_at_length(1.0), 0.25);

        let corner = curve.point_at(curve.param_at_length(1.0));
        assert_relative_eq!(corner, Point3::new(1.0, 0.0, 0.0), epsilon = 1e-12);

        let end = curve.point_at(1.0);
        assert_relative_eq!(end, Point3::new(1.0, 3.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn tangent_follows_segments() {
        let curve = make_l_curve();
        assert_relative_eq!(curve.tangent_at(0.1), Vector3::x());
        assert_relative_eq!(curve.tangent_at(0.9), Vector3::y());
    }

    #[test]
    fn rejects_degenerate_input() {
        assert!(Polyline::new(vec![Point3::origin()]).is_err());
        assert!(Polyline::new(vec![Point3::origin(), Point3::origin()]).is_err());
    }
}
