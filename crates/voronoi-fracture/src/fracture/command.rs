//! The fracture command: parameters and a seed source in, fragments out.

use nalgebra::{Point3, Vector3};
use tracing::{debug, info};

use super::{FractureEngine, FractureReport};
use crate::distribution::{PointDistribution, Polyline, remove_duplicates};
use crate::scene::Scene;
use crate::{FractureConfig, FractureError, FractureParams, FractureResult};

/// Where seed points come from.
#[derive(Debug, Clone, PartialEq)]
pub enum SeedSource {
    /// Uniform points in the source mesh's world bounding box.
    BoundingBox,
    /// Points in a sphere (or a disk of it, see [`FractureParams::disk_axis`]).
    ///
    /// `axes` give the sphere's orientation and per-axis scale; `radius`
    /// multiplies all three.
    Sphere {
        center: Point3<f64>,
        axes: [Vector3<f64>; 3],
        radius: f64,
    },
    /// Points in a cylindrical shell of [`FractureParams::curve_radius`] around a curve.
    Curve(Polyline),
    /// Particle positions, used as-is.
    Particles(Vec<Point3<f64>>),
}

impl SeedSource {
    /// An axis-aligned sphere.
    pub fn sphere(center: Point3<f64>, radius: f64) -> Self {
        Self::Sphere {
            center,
            axes: [Vector3::x(), Vector3::y(), Vector3::z()],
            radius,
        }
    }
}

fn check_parameter(name: &'static str, value: f64) -> FractureResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(FractureError::InvalidParameter {
            name,
            details: format!("{value} is not a finite non-negative number"),
        })
    }
}

/// Produces the deduplicated world-space seed list for a fracture.
///
/// # Errors
/// Invalid parameters, a source mesh without geometry (bounding-box
/// seeding), or rejected sampler arguments.
pub fn generate_seeds<S: Scene>(
    scene: &S,
    source: S::Node,
    seed_source: &SeedSource,
    params: &FractureParams,
    distribution: &mut PointDistribution,
) -> FractureResult<Vec<Point3<f64>>> {
    check_parameter("min_distance", params.min_distance)?;
    let disk_axis = params
        .parsed_disk_axis()
        .map_err(|err| FractureError::InvalidParameter {
            name: "disk_axis",
            details: err.to_string(),
        })?;
    let count = params.fragment_count;

    let points = match seed_source {
        SeedSource::BoundingBox => {
            let bounds = scene
                .bounding_box(source)?
                .ok_or_else(|| FractureError::EmptySource {
                    node: format!("{source:?}"),
                })?;
            distribution.uniform_box(&bounds.min, &bounds.max, count)?
        }
        SeedSource::Sphere {
            center,
            axes,
            radius,
        } => {
            check_parameter("radius", *radius)?;
            let scaled = axes.map(|axis| axis * *radius);
            let sigma = params.noise_sigma();
            match (params.steps, disk_axis) {
                (0, None) => distribution.radial_quadratic(*center, &scaled, count),
                (0, Some(axis)) => distribution.disk_quadratic(*center, &scaled, axis, count),
                (steps, None) => distribution.sphere_steps(*center, &scaled, steps, sigma, count)?,
                (steps, Some(axis)) => {
                    distribution.disk_steps(*center, &scaled, axis, steps, sigma, count)?
                }
            }
        }
        SeedSource::Curve(curve) => {
            check_parameter("curve_radius", params.curve_radius)?;
            distribution.curve(curve, params.curve_radius, count)?
        }
        SeedSource::Particles(positions) => distribution.particles(positions),
    };

    let sampled = points.len();
    let seeds = remove_duplicates(&points, params.min_distance);
    debug!(sampled, kept = seeds.len(), "Generated seed points");
    Ok(seeds)
}

/// Generates seeds for `source` and fractures it.
///
/// # Errors
/// See [`generate_seeds`] and [`FractureEngine::run`].
pub fn fracture<S: Scene>(
    scene: &mut S,
    source: S::Node,
    seed_source: &SeedSource,
    params: &FractureParams,
    config: &FractureConfig,
    distribution: &mut PointDistribution,
) -> FractureResult<FractureReport<S::Node>> {
    let seeds = generate_seeds(scene, source, seed_source, params, distribution)?;
    info!(source = %scene.name(source)?, seeds = seeds.len(), "Fracture command");
    FractureEngine::new(config.clone()).run(scene, source, &seeds, params.delete_original)
}
