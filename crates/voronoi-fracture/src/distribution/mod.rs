//! Seed-point samplers.
//!
//! Every sampler draws from the random engine owned by a [`PointDistribution`].
//! The engine is seeded once, so consecutive calls continue the same stream
//! instead of repeating it.
//!
//! # Frames
//!
//! Sphere and disk samplers take a centre and three axes `A[0..3]`. The axes
//! carry the radius: a unit sphere scaled by 2 along X uses `A[0] = 2·x̂`.
//!
//! # Example
//!
//! ```
//! use nalgebra::{Point3, Vector3};
//! use voronoi_fracture::distribution::{PointDistribution, remove_duplicates};
//!
//! let mut dist = PointDistribution::with_seed(7);
//! let axes = [Vector3::x(), Vector3::y(), Vector3::z()];
//! let seeds = dist.radial_quadratic(Point3::origin(), &axes, 20);
//! let seeds = remove_duplicates(&seeds, 0.01);
//! assert!(seeds.len() <= 20);
//! ```

mod curve;

pub use curve::{Curve, Polyline};

use std::f64::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

use nalgebra::{Point3, Unit, UnitQuaternion, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, NormalError};
use thiserror::Error;

use crate::orthogonal_unit_vector;

/// Errors from sampler parameters.
#[derive(Debug, Error)]
pub enum DistributionError {
    /// A stepped sampler was asked for zero bands.
    #[error("stepped sampling needs at least one step")]
    ZeroSteps,

    /// A stepped sampler was asked for fewer points than bands.
    #[error("cannot place {count} points on {steps} steps")]
    TooFewPoints {
        /// Requested point count.
        count: usize,
        /// Requested band count.
        steps: usize,
    },

    /// The noise sigma was rejected by the normal distribution.
    #[error("invalid step noise: {0}")]
    InvalidNoise(#[from] NormalError),

    /// A box with `min > max` on some axis.
    #[error("invalid box: {details}")]
    InvalidBox {
        /// Which axis is inverted.
        details: String,
    },

    /// A negative or non-finite radius.
    #[error("invalid radius {radius}")]
    InvalidRadius {
        /// The rejected radius.
        radius: f64,
    },

    /// A curve that cannot be sampled.
    #[error("degenerate curve: {details}")]
    DegenerateCurve {
        /// Description of the problem.
        details: String,
    },

    /// A disk axis name that is not `x`, `y`, `z`, `1`, `2` or `3`.
    #[error("unknown disk axis {value:?}")]
    InvalidAxis {
        /// The rejected text.
        value: String,
    },
}

/// Result type for samplers.
pub type DistributionResult<T> = Result<T, DistributionError>;

/// Axis normal to a seeding disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskAxis {
    X,
    Y,
    Z,
}

impl DiskAxis {
    /// Zero-based axis index.
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Indices of the two axes spanning the disk, `((a + 2) % 3, (a + 1) % 3)`.
    pub fn spanning_indices(self) -> (usize, usize) {
        let a = self.index();
        ((a + 2) % 3, (a + 1) % 3)
    }

    /// Parses an optional axis: empty text means "no disk".
    pub fn parse_optional(text: &str) -> DistributionResult<Option<Self>> {
        if text.trim().is_empty() {
            Ok(None)
        } else {
            text.parse().map(Some)
        }
    }
}

impl FromStr for DiskAxis {
    type Err = DistributionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" | "1" => Ok(Self::X),
            "y" | "2" => Ok(Self::Y),
            "z" | "3" => Ok(Self::Z),
            _ => Err(DistributionError::InvalidAxis { value: s.to_owned() }),
        }
    }
}

impl fmt::Display for DiskAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        };
        f.write_str(name)
    }
}

/// Band layout of [`PointDistribution::sphere_steps`] for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SphereStepLayout {
    /// Number of concentric shells.
    pub steps: usize,
    /// Longitude divisions per shell.
    pub phi_steps: usize,
    /// Latitude divisions per shell.
    pub theta_steps: usize,
}

impl SphereStepLayout {
    /// Computes the layout for `count` points over `steps` shells.
    pub fn new(steps: usize, count: usize) -> DistributionResult<Self> {
        let per_ring = points_per_ring(steps, count)?;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let phi_steps = ((2.0 * per_ring as f64).sqrt().floor() as usize).max(1);
        let theta_steps = (per_ring / phi_steps).max(1);
        Ok(Self {
            steps,
            phi_steps,
            theta_steps,
        })
    }

    /// Exact number of points the layout produces.
    pub fn point_count(&self) -> usize {
        self.steps * self.phi_steps * self.theta_steps
    }
}

fn points_per_ring(steps: usize, count: usize) -> DistributionResult<usize> {
    if steps == 0 {
        return Err(DistributionError::ZeroSteps);
    }
    if count < steps {
        return Err(DistributionError::TooFewPoints { count, steps });
    }
    Ok(count / steps)
}

/// A random engine plus the seed-point samplers that draw from it.
#[derive(Debug, Clone)]
pub struct PointDistribution {
    rng: StdRng,
}

impl Default for PointDistribution {
    fn default() -> Self {
        Self::new()
    }
}

impl PointDistribution {
    /// Creates a distribution seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Creates a distribution with a fixed seed, for reproducible results.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform points inside the box `[min, max]`; flat boxes are allowed.
    pub fn uniform_box(
        &mut self,
        min: &Point3<f64>,
        max: &Point3<f64>,
        count: usize,
    ) -> DistributionResult<Vec<Point3<f64>>> {
        for axis in 0..3 {
            if !(min[axis] <= max[axis]) {
                return Err(DistributionError::InvalidBox {
                    details: format!("axis {axis}: min {} > max {}", min[axis], max[axis]),
                });
            }
        }

        Ok((0..count)
            .map(|_| {
                Point3::new(
                    self.rng.random_range(min.x..=max.x),
                    self.rng.random_range(min.y..=max.y),
                    self.rng.random_range(min.z..=max.z),
                )
            })
            .collect())
    }

    /// Quadratic-radial points in the ellipsoid spanned by `axes`.
    ///
    /// Angles and radius are drawn uniformly, so points bunch up toward the
    /// centre and the poles.
    pub fn radial_quadratic(
        &mut self,
        center: Point3<f64>,
        axes: &[Vector3<f64>; 3],
        count: usize,
    ) -> Vec<Point3<f64>> {
        (0..count)
            .map(|_| {
                let theta = self.rng.random_range(0.0..=PI);
                let phi = self.rng.random_range(0.0..=TAU);
                let r = self.rng.random_range(0.0..=1.0);
                center + spherical(axes, theta, phi) * r
            })
            .collect()
    }

    /// Quadratic points in the disk normal to `axis`.
    pub fn disk_quadratic(
        &mut self,
        center: Point3<f64>,
        axes: &[Vector3<f64>; 3],
        axis: DiskAxis,
        count: usize,
    ) -> Vec<Point3<f64>> {
        let (a0, a1) = axis.spanning_indices();
        (0..count)
            .map(|_| {
                let phi = self.rng.random_range(0.0..=TAU);
                let r = self.rng.random_range(0.0..=1.0);
                center + (axes[a0] * phi.cos() + axes[a1] * phi.sin()) * r
            })
            .collect()
    }

    /// Points on `steps` concentric rings in the disk normal to `axis`.
    ///
    /// Ring `s` has radius `s / steps`; each ring holds `count / steps`
    /// evenly spaced points whose radius is scaled by `N(1, noise_sigma)`.
    pub fn disk_steps(
        &mut self,
        center: Point3<f64>,
        axes: &[Vector3<f64>; 3],
        axis: DiskAxis,
        steps: usize,
        noise_sigma: f64,
        count: usize,
    ) -> DistributionResult<Vec<Point3<f64>>> {
        let per_ring = points_per_ring(steps, count)?;
        let noise = Normal::new(1.0, noise_sigma)?;
        let (a0, a1) = axis.spanning_indices();

        let mut points = Vec::with_capacity(per_ring * steps);
        for s in 1..=steps {
            let r = s as f64 / steps as f64;
            for k in 0..per_ring {
                let phi = k as f64 / per_ring as f64 * TAU;
                let jitter = noise.sample(&mut self.rng);
                points.push(center + (axes[a0] * phi.cos() + axes[a1] * phi.sin()) * (r * jitter));
            }
        }
        Ok(points)
    }

    /// Points on `steps` concentric shells of the ellipsoid spanned by `axes`.
    ///
    /// The shell grid follows [`SphereStepLayout`]; the result holds exactly
    /// [`SphereStepLayout::point_count`] points.
    pub fn sphere_steps(
        &mut self,
        center: Point3<f64>,
        axes: &[Vector3<f64>; 3],
        steps: usize,
        noise_sigma: f64,
        count: usize,
    ) -> DistributionResult<Vec<Point3<f64>>> {
        let layout = SphereStepLayout::new(steps, count)?;
        let noise = Normal::new(1.0, noise_sigma)?;

        let mut points = Vec::with_capacity(layout.point_count());
        for s in 1..=steps {
            let r = s as f64 / steps as f64;
            for k in 0..layout.phi_steps {
                let phi = k as f64 / layout.phi_steps as f64 * TAU;
                for t in 0..layout.theta_steps {
                    let theta = (t as f64 + 0.5) / layout.theta_steps as f64 * PI;
                    let jitter = noise.sample(&mut self.rng);
                    points.push(center + spherical(axes, theta, phi) * (r * jitter));
                }
            }
        }
        Ok(points)
    }

    /// Points scattered in a cylindrical shell of `radius` around a curve.
    ///
    /// Arc length is drawn uniformly along the curve, then the point is
    /// pushed away from the curve in a random direction perpendicular to the
    /// tangent by a uniform distance in `[0, radius]`.
    pub fn curve<C: Curve + ?Sized>(
        &mut self,
        curve: &C,
        radius: f64,
        count: usize,
    ) -> DistributionResult<Vec<Point3<f64>>> {
        if !(radius.is_finite() && radius >= 0.0) {
            return Err(DistributionError::InvalidRadius { radius });
        }
        let length = curve.length();
        if !(length.is_finite() && length > 0.0) {
            return Err(DistributionError::DegenerateCurve {
                details: format!("length {length}"),
            });
        }

        let mut points = Vec::with_capacity(count);
        for _ in 0..count {
            let t = curve.param_at_length(self.rng.random_range(0.0..=length));
            let point = curve.point_at(t);
            let tangent = Unit::new_normalize(curve.tangent_at(t));
            let normal = orthogonal_unit_vector(&tangent);

            let angle = self.rng.random_range(0.0..=TAU);
            let direction = UnitQuaternion::from_axis_angle(&tangent, angle) * normal;
            let r = self.rng.random_range(0.0..=1.0) * radius;
            points.push(point + direction * r);
        }
        Ok(points)
    }

    /// Particle positions, copied verbatim.
    pub fn particles(&mut self, positions: &[Point3<f64>]) -> Vec<Point3<f64>> {
        positions.to_vec()
    }
}

fn spherical(axes: &[Vector3<f64>; 3], theta: f64, phi: f64) -> Vector3<f64> {
    axes[0] * (theta.sin() * phi.cos()) + axes[1] * (theta.sin() * phi.sin()) + axes[2] * theta.cos()
}

/// Greedy duplicate removal.
///
/// A point is kept only if its distance to every previously kept point
/// exceeds `tolerance`. Order of the input decides which of two close points
/// survives.
pub fn remove_duplicates(points: &[Point3<f64>], tolerance: f64) -> Vec<Point3<f64>> {
    let tolerance_sq = tolerance * tolerance;
    let mut kept: Vec<Point3<f64>> = Vec::with_capacity(points.len());
    for p in points {
        if kept.iter().all(|k| (p - k).norm_squared() > tolerance_sq) {
            kept.push(*p);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_axes() -> [Vector3<f64>; 3] {
        [Vector3::x(), Vector3::y(), Vector3::z()]
    }

    #[test]
    fn dedup_keeps_first_of_close_pair() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(0.0, 0.0, 0.005);
        let c = Point3::new(5.0, 0.0, 0.0);
        assert_eq!(remove_duplicates(&[a, b, c], 0.01), vec![a, c]);
    }

    #[test]
    fn dedup_leaves_separated_points() {
        let points: Vec<_> = (0..10).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect();
        assert_eq!(remove_duplicates(&points, 0.5), points);
        assert_eq!(remove_duplicates(&points, 1.5).len(), 5);
    }

    #[test]
    fn uniform_box_stays_inside() {
        let mut dist = PointDistribution::with_seed(1);
        let min = Point3::new(-1.0, 2.0, 0.0);
        let max = Point3::new(1.0, 3.0, 0.0);
        let points = dist.uniform_box(&min, &max, 200).unwrap();
        assert_eq!(points.len(), 200);
        assert!(points.iter().all(|p| (0..3).all(|i| p[i] >= min[i] && p[i] <= max[i])));
    }

    #[test]
    fn uniform_box_rejects_inverted_box() {
        let mut dist = PointDistribution::with_seed(1);
        let err = dist
            .uniform_box(&Point3::new(1.0, 0.0, 0.0), &Point3::origin(), 3)
            .unwrap_err();
        assert!(matches!(err, DistributionError::InvalidBox { .. }));
    }

    #[test]
    fn seeded_distributions_repeat() {
        let axes = unit_axes();
        let a = PointDistribution::with_seed(42).radial_quadratic(Point3::origin(), &axes, 10);
        let b = PointDistribution::with_seed(42).radial_quadratic(Point3::origin(), &axes, 10);
        assert_eq!(a, b);
    }

    #[test]
    fn session_engine_is_not_reseeded() {
        let mut dist = PointDistribution::with_seed(42);
        let axes = unit_axes();
        let first = dist.radial_quadratic(Point3::origin(), &axes, 5);
        let second = dist.radial_quadratic(Point3::origin(), &axes, 5);
        assert_ne!(first, second);
    }

    #[test]
    fn radial_points_inside_ellipsoid() {
        let mut dist = PointDistribution::with_seed(3);
        let axes = [Vector3::x() * 2.0, Vector3::y(), Vector3::z() * 0.5];
        let center = Point3::new(1.0, 1.0, 1.0);
        for p in dist.radial_quadratic(center, &axes, 500) {
            let d = p - center;
            let q = (d.x / 2.0).powi(2) + d.y.powi(2) + (d.z / 0.5).powi(2);
            assert!(q <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn disk_points_are_planar() {
        let mut dist = PointDistribution::with_seed(9);
        let axes = unit_axes();
        for axis in [DiskAxis::X, DiskAxis::Y, DiskAxis::Z] {
            for p in dist.disk_quadratic(Point3::origin(), &axes, axis, 100) {
                assert_eq!(p[axis.index()], 0.0);
                assert!(p.coords.norm() <= 1.0 + 1e-12);
            }
        }
    }

    #[test]
    fn disk_axis_spanning_indices() {
        assert_eq!(DiskAxis::X.spanning_indices(), (2, 1));
        assert_eq!(DiskAxis::Y.spanning_indices(), (0, 2));
        assert_eq!(DiskAxis::Z.spanning_indices(), (1, 0));
    }

    #[test]
    fn disk_axis_parsing() {
        assert_eq!(DiskAxis::parse_optional("").unwrap(), None);
        assert_eq!(DiskAxis::parse_optional("Y").unwrap(), Some(DiskAxis::Y));
        assert_eq!(DiskAxis::parse_optional("3").unwrap(), Some(DiskAxis::Z));
        assert!(DiskAxis::parse_optional("w").is_err());
        assert!(DiskAxis::parse_optional("0").is_err());
    }

    #[test]
    fn disk_steps_lie_on_rings_without_noise() {
        let mut dist = PointDistribution::with_seed(5);
        let points = dist
            .disk_steps(Point3::origin(), &unit_axes(), DiskAxis::Z, 4, 0.0, 22)
            .unwrap();
        // 22 / 4 = 5 per ring
        assert_eq!(points.len(), 20);
        for (i, p) in points.iter().enumerate() {
            let ring = i / 5 + 1;
            assert_relative_eq!(p.coords.norm(), ring as f64 / 4.0, epsilon = 1e-12);
            assert_eq!(p.z, 0.0);
        }
    }

    #[test]
    fn sphere_steps_count_and_shells() {
        let mut dist = PointDistribution::with_seed(11);
        let layout = SphereStepLayout::new(3, 100).unwrap();
        // per ring 33: phi = floor(sqrt(66)) = 8, theta = floor(33 / 8) = 4
        assert_eq!((layout.phi_steps, layout.theta_steps), (8, 4));

        let points = dist
            .sphere_steps(Point3::origin(), &unit_axes(), 3, 0.0, 100)
            .unwrap();
        assert_eq!(points.len(), layout.point_count());
        assert_eq!(points.len(), 3 * 8 * 4);

        let shells = [1.0 / 3.0, 2.0 / 3.0, 1.0];
        for p in &points {
            let r = p.coords.norm();
            assert!(shells.iter().any(|s| (r - s).abs() < 1e-12));
        }
    }

    #[test]
    fn stepped_sampling_rejects_bad_counts() {
        let mut dist = PointDistribution::with_seed(0);
        let axes = unit_axes();
        assert!(matches!(
            dist.sphere_steps(Point3::origin(), &axes, 0, 0.1, 10),
            Err(DistributionError::ZeroSteps)
        ));
        assert!(matches!(
            dist.disk_steps(Point3::origin(), &axes, DiskAxis::X, 5, 0.1, 3),
            Err(DistributionError::TooFewPoints { count: 3, steps: 5 })
        ));
        assert!(matches!(
            dist.sphere_steps(Point3::origin(), &axes, 2, -1.0, 10),
            Err(DistributionError::InvalidNoise(_))
        ));
    }

    #[test]
    fn curve_points_stay_within_radius() {
        let mut dist = PointDistribution::with_seed(21);
        let line = Polyline::new(vec![Point3::origin(), Point3::new(0.0, 0.0, 10.0)]).unwrap();
        let points = dist.curve(&line, 0.25, 300).unwrap();
        assert_eq!(points.len(), 300);
        for p in points {
            assert!(p.z >= -1e-12 && p.z <= 10.0 + 1e-12);
            assert!((p.x * p.x + p.y * p.y).sqrt() <= 0.25 + 1e-12);
        }
    }

    #[test]
    fn curve_rejects_negative_radius() {
        let mut dist = PointDistribution::with_seed(21);
        let line = Polyline::new(vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)]).unwrap();
        assert!(matches!(
            dist.curve(&line, -1.0, 3),
            Err(DistributionError::InvalidRadius { .. })
        ));
    }

    #[test]
    fn particles_pass_through() {
        let mut dist = PointDistribution::with_seed(0);
        let positions = vec![Point3::new(1.0, 2.0, 3.0), Point3::new(-1.0, 0.0, 0.5)];
        assert_eq!(dist.particles(&positions), positions);
    }
}
