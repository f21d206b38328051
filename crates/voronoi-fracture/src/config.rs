//! Fracture parameters and engine tunables.
//!
//! [`FractureParams`] holds the user-facing command parameters;
//! [`FractureConfig`] holds the engine knobs that rarely change.
//!
//! # Example
//!
//! ```
//! use voronoi_fracture::{ClipMethod, FractureConfig, FractureParams, VolumeShape};
//!
//! let params = FractureParams::default()
//!     .with_fragment_count(12)
//!     .with_delete_original(false);
//!
//! let config = FractureConfig::default()
//!     .with_clip_method(ClipMethod::Boolean(VolumeShape::Tetrahedron))
//!     .with_min_polygons(4);
//! # assert_eq!(params.fragment_count, 12);
//! # assert_eq!(config.min_polygons, 4);
//! ```

use crate::PLANE_EPSILON;
use crate::distribution::{DiskAxis, DistributionResult};

/// Smallest Gaussian sigma used for stepped seeding.
pub const MIN_STEP_NOISE: f64 = 1e-6;

/// Shape of the polyhedron used by the boolean clip strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VolumeShape {
    /// A single oversized triangle lying in the clip plane.
    Triangle,
    /// A tetrahedron whose base lies in the clip plane and whose apex points
    /// into the kept half-space.
    #[default]
    Tetrahedron,
}

/// How a fragment is clipped against a bisector plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipMethod {
    /// Issue a cut-and-close-border edit in world space.
    #[default]
    Command,
    /// Intersect with a reusable clipping volume in the fragment's local space.
    Boolean(VolumeShape),
}

/// Order in which the other seeds are visited when clipping a fragment.
///
/// The resulting geometry does not depend on the order; nearest-first just
/// shrinks the fragment fastest, so later planes are skipped more often.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NeighborOrder {
    /// Ascending distance to the fragment's seed.
    #[default]
    NearestFirst,
    /// Descending distance to the fragment's seed.
    FarthestFirst,
    /// Seed list order.
    Unsorted,
}

/// Parameters of a fracture command.
#[derive(Debug, Clone, PartialEq)]
pub struct FractureParams {
    /// Seeds to request when the seed source needs a count.
    pub fragment_count: usize,
    /// Remove the source mesh after fracturing.
    pub delete_original: bool,
    /// Shell radius for curve seeding.
    pub curve_radius: f64,
    /// Disk axis for sphere seeding (`""`, `x|y|z` or `1|2|3`); empty means full sphere.
    pub disk_axis: String,
    /// Band count for stepped seeding; 0 selects quadratic random seeding.
    pub steps: usize,
    /// Gaussian sigma for stepped seeding.
    pub step_noise: f64,
    /// Deduplication tolerance for the final seed set.
    pub min_distance: f64,
}

impl Default for FractureParams {
    fn default() -> Self {
        Self {
            fragment_count: 5,
            delete_original: true,
            curve_radius: 0.1,
            disk_axis: String::new(),
            steps: 0,
            step_noise: 0.05,
            min_distance: 0.01,
        }
    }
}

impl FractureParams {
    #[must_use]
    pub fn with_fragment_count(mut self, count: usize) -> Self {
        self.fragment_count = count;
        self
    }

    #[must_use]
    pub fn with_delete_original(mut self, delete: bool) -> Self {
        self.delete_original = delete;
        self
    }

    #[must_use]
    pub fn with_curve_radius(mut self, radius: f64) -> Self {
        self.curve_radius = radius;
        self
    }

    #[must_use]
    pub fn with_disk_axis(mut self, axis: impl Into<String>) -> Self {
        self.disk_axis = axis.into();
        self
    }

    #[must_use]
    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    #[must_use]
    pub fn with_step_noise(mut self, sigma: f64) -> Self {
        self.step_noise = sigma;
        self
    }

    #[must_use]
    pub fn with_min_distance(mut self, distance: f64) -> Self {
        self.min_distance = distance;
        self
    }

    /// Step noise floored at [`MIN_STEP_NOISE`].
    pub fn noise_sigma(&self) -> f64 {
        self.step_noise.max(MIN_STEP_NOISE)
    }

    /// Parses [`FractureParams::disk_axis`].
    pub fn parsed_disk_axis(&self) -> DistributionResult<Option<DiskAxis>> {
        DiskAxis::parse_optional(&self.disk_axis)
    }
}

/// Tunables of the fracture engine.
#[derive(Debug, Clone, PartialEq)]
pub struct FractureConfig {
    /// Clip strategy used for every fragment of a run.
    pub clip_method: ClipMethod,
    /// Fragments left with fewer polygons than this are discarded.
    pub min_polygons: usize,
    /// Distance within which a vertex counts as lying on a plane.
    pub plane_epsilon: f64,
    /// Order of the bisector planes applied to each fragment.
    pub neighbor_order: NeighborOrder,
    /// Multiplier on the clipping volume size.
    pub volume_safety_factor: f64,
    /// Group the fragment copies are created under.
    pub group_name: String,
    /// Prefix of surviving fragment names, numbered from 0.
    pub fragment_prefix: String,
}

impl Default for FractureConfig {
    fn default() -> Self {
        Self {
            clip_method: ClipMethod::default(),
            min_polygons: 4,
            plane_epsilon: PLANE_EPSILON,
            neighbor_order: NeighborOrder::default(),
            volume_safety_factor: 10.0,
            group_name: "fragment_group".to_owned(),
            fragment_prefix: "fragment".to_owned(),
        }
    }
}

impl FractureConfig {
    #[must_use]
    pub fn with_clip_method(mut self, method: ClipMethod) -> Self {
        self.clip_method = method;
        self
    }

    #[must_use]
    pub fn with_min_polygons(mut self, min_polygons: usize) -> Self {
        self.min_polygons = min_polygons;
        self
    }

    #[must_use]
    pub fn with_plane_epsilon(mut self, epsilon: f64) -> Self {
        self.plane_epsilon = epsilon;
        self
    }

    #[must_use]
    pub fn with_neighbor_order(mut self, order: NeighborOrder) -> Self {
        self.neighbor_order = order;
        self
    }

    #[must_use]
    pub fn with_volume_safety_factor(mut self, factor: f64) -> Self {
        self.volume_safety_factor = factor;
        self
    }

    #[must_use]
    pub fn with_group_name(mut self, name: impl Into<String>) -> Self {
        self.group_name = name.into();
        self
    }

    #[must_use]
    pub fn with_fragment_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.fragment_prefix = prefix.into();
        self
    }

    /// Name of the `index`-th surviving fragment.
    pub fn fragment_name(&self, index: usize) -> String {
        format!("{}_{index}", self.fragment_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_defaults() {
        let params = FractureParams::default();
        assert_eq!(params.fragment_count, 5);
        assert!(params.delete_original);
        assert_eq!(params.curve_radius, 0.1);
        assert_eq!(params.disk_axis, "");
        assert_eq!(params.steps, 0);
        assert_eq!(params.step_noise, 0.05);
        assert_eq!(params.min_distance, 0.01);
    }

    #[test]
    fn step_noise_is_floored() {
        assert_eq!(FractureParams::default().with_step_noise(0.0).noise_sigma(), MIN_STEP_NOISE);
        assert_eq!(FractureParams::default().with_step_noise(0.2).noise_sigma(), 0.2);
    }

    #[test]
    fn disk_axis_parses_through_params() {
        let params = FractureParams::default().with_disk_axis("z");
        assert_eq!(params.parsed_disk_axis().unwrap(), Some(DiskAxis::Z));
        assert!(FractureParams::default().with_disk_axis("q").parsed_disk_axis().is_err());
    }

    #[test]
    fn config_defaults_and_names() {
        let config = FractureConfig::default();
        assert_eq!(config.clip_method, ClipMethod::Command);
        assert_eq!(config.min_polygons, 4);
        assert_eq!(config.neighbor_order, NeighborOrder::NearestFirst);
        assert_eq!(config.volume_safety_factor, 10.0);
        assert_eq!(config.fragment_name(3), "fragment_3");
        assert_eq!(
            config.with_fragment_prefix("shard").fragment_name(0),
            "shard_0"
        );
    }
}
