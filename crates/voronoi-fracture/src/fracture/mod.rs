//! The fracture engine: Voronoi cells by repeated half-space clipping.
//!
//! Each seed gets its own copy of the source mesh. That copy is clipped
//! against the bisector plane between its seed and every other seed, keeping
//! the side closer to its own seed. What survives is the Voronoi cell of the
//! seed intersected with the source solid.
//!
//! Before each clip the fragment is classified against the plane through a
//! vertex visitor. Planes that miss the fragment are skipped without an edit,
//! and a fragment entirely beyond a plane is discarded on the spot.

mod command;
mod strategy;
mod volume;

pub use command::{SeedSource, fracture, generate_seeds};
pub use strategy::ClipStrategy;
pub use volume::ClippingVolume;

use std::time::{Duration, Instant};

use nalgebra::Point3;
use tracing::{debug, info, warn};

use crate::scene::Scene;
use crate::{
    FractureConfig, FractureError, FractureResult, MeshClassification, NeighborOrder, Plane,
    PlaneClassifier,
};

/// A seed position tagged with its index in the seed list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeedPoint {
    pub index: usize,
    pub position: Point3<f64>,
}

/// A fragment that survived clipping.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentRecord<N> {
    pub node: N,
    pub seed: SeedPoint,
    /// Final name given to the node.
    pub name: String,
}

/// Why a fragment was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// The whole fragment lay beyond the bisector plane toward `neighbor`.
    OutsideCell { neighbor: usize },
    /// Clipping against `neighbor` left fewer polygons than the configured minimum.
    Degenerate { neighbor: usize, polygons: usize },
}

/// A fragment that was deleted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscardedFragment {
    pub seed: SeedPoint,
    pub reason: DiscardReason,
}

/// Counters over all planes of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClipStats {
    /// Bisector planes a fragment was classified against.
    pub planes_tested: usize,
    /// Planes skipped because the fragment lay entirely behind them.
    pub skipped_inside: usize,
    /// Planes that triggered a clip edit.
    pub clipped: usize,
    /// Fragments dropped.
    pub discarded: usize,
}

/// Outcome of a fracture run.
#[derive(Debug, Clone)]
pub struct FractureReport<N> {
    /// Survivors in seed order; names are numbered contiguously.
    pub fragments: Vec<FragmentRecord<N>>,
    pub discarded: Vec<DiscardedFragment>,
    pub stats: ClipStats,
    /// True if the source node was deleted.
    pub original_deleted: bool,
    pub elapsed: Duration,
}

impl<N> FractureReport<N> {
    /// Handles of the surviving fragments.
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.fragments.iter().map(|f| &f.node)
    }
}

/// Runs fractures against a [`Scene`] with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct FractureEngine {
    config: FractureConfig,
}

impl FractureEngine {
    pub fn new(config: FractureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FractureConfig {
        &self.config
    }

    /// Fractures `source` into one fragment per seed.
    ///
    /// `seeds` are world-space positions and must be pairwise distinct; run
    /// them through [`remove_duplicates`](crate::distribution::remove_duplicates)
    /// first. Discarded fragments are deleted, survivors renamed
    /// `<prefix>_0, <prefix>_1, ...` in seed order.
    ///
    /// # Errors
    /// Input errors ([`FractureError::NoSeeds`], [`FractureError::EmptySource`])
    /// are reported before the scene is modified. Scene failures abort the
    /// run immediately and leave already-made edits in place.
    pub fn run<S: Scene>(
        &self,
        scene: &mut S,
        source: S::Node,
        seeds: &[Point3<f64>],
        delete_original: bool,
    ) -> FractureResult<FractureReport<S::Node>> {
        let start = Instant::now();

        if seeds.is_empty() {
            return Err(FractureError::NoSeeds);
        }
        let Some(bounds) = scene.bounding_box(source)? else {
            return Err(FractureError::EmptySource {
                node: format!("{source:?}"),
            });
        };
        let source_transform = scene.world_transform(source)?;

        info!(
            source = ?source,
            seeds = seeds.len(),
            method = ?self.config.clip_method,
            "Fracturing mesh"
        );

        let fragments = scene.duplicate(source, seeds.len(), &self.config.group_name)?;
        if fragments.len() != seeds.len() {
            return Err(FractureError::DuplicateCountMismatch {
                expected: seeds.len(),
                actual: fragments.len(),
            });
        }

        let center = bounds.center();
        let farthest = seeds
            .iter()
            .map(|p| (p - center).norm())
            .fold(0.0_f64, f64::max);
        let half_extent = self.config.volume_safety_factor * (bounds.diagonal() + 2.0 * farthest);

        let mut strategy =
            ClipStrategy::new(scene, self.config.clip_method, source_transform, half_extent)?;
        let mut stats = ClipStats::default();
        let outcome = self.clip_all(scene, &mut strategy, &fragments, seeds, &mut stats);

        // The volume is released on every path; the first error wins
        let discards = match (outcome, strategy.release(scene)) {
            (Ok(discards), Ok(())) => discards,
            (Ok(_), Err(release)) => return Err(release.into()),
            (Err(err), Ok(())) => return Err(err),
            (Err(err), Err(release)) => {
                warn!(error = %release, "Failed to release clipping volume after an earlier error");
                return Err(err);
            }
        };

        let mut report = FractureReport {
            fragments: Vec::with_capacity(seeds.len()),
            discarded: Vec::new(),
            stats,
            original_deleted: false,
            elapsed: Duration::ZERO,
        };

        for (index, (&node, discard)) in fragments.iter().zip(discards).enumerate() {
            let seed = SeedPoint {
                index,
                position: seeds[index],
            };
            match discard {
                Some(reason) => {
                    scene.delete(node)?;
                    report.discarded.push(DiscardedFragment { seed, reason });
                }
                None => {
                    let name = self.config.fragment_name(report.fragments.len());
                    scene.rename(node, &name)?;
                    report.fragments.push(FragmentRecord { node, seed, name });
                }
            }
        }
        report.stats.discarded = report.discarded.len();

        if delete_original {
            scene.delete(source)?;
            report.original_deleted = true;
        }

        report.elapsed = start.elapsed();
        info!(
            fragments = report.fragments.len(),
            discarded = report.discarded.len(),
            clipped = report.stats.clipped,
            skipped = report.stats.skipped_inside,
            elapsed_secs = report.elapsed.as_secs_f64(),
            "Fracture finished"
        );
        Ok(report)
    }

    /// Clips every fragment; returns the discard decision per seed.
    fn clip_all<S: Scene>(
        &self,
        scene: &mut S,
        strategy: &mut ClipStrategy<S::Node>,
        fragments: &[S::Node],
        seeds: &[Point3<f64>],
        stats: &mut ClipStats,
    ) -> FractureResult<Vec<Option<DiscardReason>>> {
        fragments
            .iter()
            .enumerate()
            .map(|(i, &fragment)| {
                debug!(
                    fragment = i,
                    x = seeds[i].x,
                    y = seeds[i].y,
                    z = seeds[i].z,
                    "Processing fragment"
                );
                let discard = self.clip_fragment(scene, strategy, fragment, seeds, i, stats)?;
                if let Some(reason) = discard {
                    debug!(fragment = i, ?reason, "Discarding fragment");
                }
                Ok(discard)
            })
            .collect()
    }

    /// Clips one fragment against the bisectors toward all other seeds.
    fn clip_fragment<S: Scene>(
        &self,
        scene: &mut S,
        strategy: &mut ClipStrategy<S::Node>,
        fragment: S::Node,
        seeds: &[Point3<f64>],
        index: usize,
        stats: &mut ClipStats,
    ) -> FractureResult<Option<DiscardReason>> {
        let p0 = seeds[index];

        for neighbor in neighbor_order(seeds, index, self.config.neighbor_order) {
            if neighbor == index {
                continue;
            }
            let Some(plane) = Plane::bisector(p0, seeds[neighbor]) else {
                warn!(fragment = index, neighbor, "Skipping coincident seed");
                continue;
            };

            stats.planes_tested += 1;
            let mut classifier = PlaneClassifier::new(plane, self.config.plane_epsilon);
            scene.visit_world_vertices(fragment, &mut classifier)?;

            match classifier.classification() {
                MeshClassification::AllInside => stats.skipped_inside += 1,
                MeshClassification::AllOutside => {
                    return Ok(Some(DiscardReason::OutsideCell { neighbor }));
                }
                MeshClassification::Straddles => {
                    strategy.clip(scene, fragment, &plane)?;
                    stats.clipped += 1;
                    let polygons = scene.polygon_count(fragment)?;
                    if polygons < self.config.min_polygons {
                        return Ok(Some(DiscardReason::Degenerate { neighbor, polygons }));
                    }
                }
            }
        }

        Ok(None)
    }
}

/// Seed indices in the order their bisectors are applied to fragment `index`.
///
/// Includes `index` itself; callers skip it.
pub(crate) fn neighbor_order(seeds: &[Point3<f64>], index: usize, order: NeighborOrder) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..seeds.len()).collect();
    let p0 = seeds[index];
    let distance = |j: &usize| (seeds[*j] - p0).norm_squared();
    match order {
        NeighborOrder::NearestFirst => indices.sort_by(|a, b| distance(a).total_cmp(&distance(b))),
        NeighborOrder::FarthestFirst => indices.sort_by(|a, b| distance(b).total_cmp(&distance(a))),
        NeighborOrder::Unsorted => {}
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{MemoryScene, NodeId};
    use crate::{ClipMethod, Mesh, VolumeShape};
    use approx::assert_relative_eq;

    fn make_scene() -> (MemoryScene, NodeId) {
        let mut scene = MemoryScene::new();
        let cube = scene.insert("cube", Mesh::cube(Point3::origin(), 2.0));
        (scene, cube)
    }

    #[test]
    fn neighbor_order_sorts_by_distance() {
        let seeds = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        assert_eq!(neighbor_order(&seeds, 0, NeighborOrder::NearestFirst), vec![0, 2, 3, 1]);
        assert_eq!(neighbor_order(&seeds, 0, NeighborOrder::FarthestFirst), vec![1, 3, 2, 0]);
        assert_eq!(neighbor_order(&seeds, 0, NeighborOrder::Unsorted), vec![0, 1, 2, 3]);
    }

    #[test]
    fn two_seeds_split_cube() {
        let (mut scene, cube) = make_scene();
        let seeds = [Point3::new(-0.5, 0.0, 0.0), Point3::new(0.5, 0.0, 0.0)];
        let report = FractureEngine::default().run(&mut scene, cube, &seeds, true).unwrap();

        assert_eq!(report.fragments.len(), 2);
        assert!(report.discarded.is_empty());
        assert!(report.original_deleted);
        assert!(!scene.contains(cube));
        assert_eq!(report.stats.clipped, 2);

        for record in &report.fragments {
            let mesh = scene.world_mesh(record.node).unwrap();
            assert_relative_eq!(mesh.volume(), 4.0, epsilon = 1e-9);
        }
        assert_eq!(report.fragments[0].name, "fragment_0");
        assert_eq!(report.fragments[1].name, "fragment_1");
    }

    #[test]
    fn far_seed_is_discarded_and_not_numbered() {
        let (mut scene, cube) = make_scene();
        let seeds = [
            Point3::new(50.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
        ];
        let report = FractureEngine::default().run(&mut scene, cube, &seeds, false).unwrap();

        assert_eq!(report.discarded.len(), 1);
        assert_eq!(report.discarded[0].seed.index, 0);
        assert_eq!(
            report.discarded[0].reason,
            DiscardReason::OutsideCell { neighbor: 1 }
        );
        assert_eq!(report.fragments.len(), 1);
        assert_eq!(report.fragments[0].seed.index, 1);
        assert_eq!(report.fragments[0].name, "fragment_0");

        // Source kept, one fragment, no leftovers
        assert!(scene.contains(cube));
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn boolean_run_releases_volume() {
        let (mut scene, cube) = make_scene();
        let config = FractureConfig::default()
            .with_clip_method(ClipMethod::Boolean(VolumeShape::Tetrahedron));
        let seeds = [Point3::new(-0.5, 0.2, 0.0), Point3::new(0.5, -0.1, 0.3)];
        let report = FractureEngine::new(config).run(&mut scene, cube, &seeds, true).unwrap();

        assert_eq!(report.fragments.len(), 2);
        assert_eq!(scene.len(), 2);
        assert!(scene.find("clipping_volume").is_none());
        let total: f64 = report
            .nodes()
            .map(|n| scene.world_mesh(*n).unwrap().volume())
            .sum();
        assert_relative_eq!(total, 8.0, epsilon = 1e-9);
    }

    #[test]
    fn empty_seed_list_is_an_input_error() {
        let (mut scene, cube) = make_scene();
        let err = FractureEngine::default().run(&mut scene, cube, &[], true).unwrap_err();
        assert!(matches!(err, FractureError::NoSeeds));
        assert_eq!(err.kind(), crate::ErrorKind::Input);
        // Nothing was touched
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn empty_source_is_an_input_error() {
        let mut scene = MemoryScene::new();
        let empty = scene.insert("empty", Mesh::new());
        let err = FractureEngine::default()
            .run(&mut scene, empty, &[Point3::origin()], true)
            .unwrap_err();
        assert!(matches!(err, FractureError::EmptySource { .. }));
    }
}
