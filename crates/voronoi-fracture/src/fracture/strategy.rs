//! Clip strategies: how a fragment is cut back to one side of a bisector plane.

use nalgebra::Isometry3;

use super::volume::ClippingVolume;
use crate::scene::{EditCommand, Scene, SceneResult};
use crate::{ClipMethod, Plane};

/// The clip strategy of one fracture run.
#[derive(Debug)]
pub enum ClipStrategy<N> {
    /// Issue a cut-and-close-border edit with the world-space plane.
    Command,
    /// Intersect with a clipping volume placed on the local-space plane.
    Boolean {
        volume: ClippingVolume<N>,
        /// World transform of the source; fragments share it.
        source_transform: Isometry3<f64>,
    },
}

impl<N: Copy> ClipStrategy<N> {
    /// Builds the strategy for `method`, creating the clipping volume if one is needed.
    pub fn new<S>(
        scene: &mut S,
        method: ClipMethod,
        source_transform: Isometry3<f64>,
        half_extent: f64,
    ) -> SceneResult<Self>
    where
        S: Scene<Node = N>,
    {
        match method {
            ClipMethod::Command => Ok(Self::Command),
            ClipMethod::Boolean(shape) => {
                let volume = ClippingVolume::create(scene, shape, half_extent, source_transform)?;
                Ok(Self::Boolean {
                    volume,
                    source_transform,
                })
            }
        }
    }

    /// Removes everything in front of `plane` (world space) from `fragment`.
    pub fn clip<S>(&mut self, scene: &mut S, fragment: N, plane: &Plane) -> SceneResult<()>
    where
        S: Scene<Node = N>,
    {
        match self {
            Self::Command => scene.execute(&EditCommand::CutAndCloseBorder {
                node: fragment,
                plane: *plane,
            }),
            Self::Boolean {
                volume,
                source_transform,
            } => {
                let local = plane.inverse_transformed(source_transform);
                volume.fit(scene, &local)?;
                scene.boolean_intersect(fragment, volume.node())
            }
        }
    }

    /// Releases scene resources held by the strategy.
    pub fn release<S>(self, scene: &mut S) -> SceneResult<()>
    where
        S: Scene<Node = N>,
    {
        match self {
            Self::Command => Ok(()),
            Self::Boolean { volume, .. } => volume.release(scene),
        }
    }
}
