//! The scene collaborator: node storage and the mesh edits the fracture engine requests.
//!
//! The engine never touches geometry directly. It duplicates, queries, edits
//! and deletes nodes through the [`Scene`] trait, so any host that can store
//! meshes can drive a fracture. [`MemoryScene`] is the in-process host used by
//! the viewer and the tests.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;
use std::ops::ControlFlow;

use nalgebra::{Isometry3, Point3};
use thiserror::Error;
use tracing::trace;

use crate::{Aabb, Mesh, PLANE_EPSILON, Plane, VertexVisitor};

/// Errors reported by a scene.
#[derive(Debug, Error)]
pub enum SceneError {
    /// The handle does not refer to a live node.
    #[error("unknown node: {node}")]
    UnknownNode {
        /// Debug rendering of the handle.
        node: String,
    },

    /// A boolean tool had no polygons.
    #[error("boolean tool {node} is empty")]
    EmptyTool {
        /// Debug rendering of the tool handle.
        node: String,
    },

    /// A boolean tool was not a convex solid.
    #[error("boolean tool {node} is not convex")]
    NonConvexTool {
        /// Debug rendering of the tool handle.
        node: String,
    },

    /// A vertex rewrite supplied the wrong number of positions.
    #[error("node {node} has {expected} vertex positions, got {actual}")]
    VertexCountMismatch {
        /// Debug rendering of the handle.
        node: String,
        /// Corner count of the node's mesh.
        expected: usize,
        /// Number of positions supplied.
        actual: usize,
    },

    /// Any other failure inside the host.
    #[error("scene operation failed: {details}")]
    Failed {
        /// Description of the failure.
        details: String,
    },
}

impl SceneError {
    pub(crate) fn unknown<N: fmt::Debug>(node: N) -> Self {
        Self::UnknownNode {
            node: format!("{node:?}"),
        }
    }
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// A typed mesh edit request.
///
/// Renders to a single-line textual form for logging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditCommand<N> {
    /// Deletes everything on the positive side of the world-space `plane`
    /// and closes the open border left on the plane with new faces.
    CutAndCloseBorder { node: N, plane: Plane },
}

impl<N: fmt::Debug> fmt::Display for EditCommand<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CutAndCloseBorder { node, plane } => {
                let p = plane.point();
                let n = plane.normal();
                write!(
                    f,
                    "cut-and-close-border {node:?} point=({}, {}, {}) normal=({}, {}, {})",
                    p.x, p.y, p.z, n.x, n.y, n.z
                )
            }
        }
    }
}

/// Host-side operations the fracture engine relies on.
pub trait Scene {
    /// Opaque handle to a node.
    type Node: Copy + Eq + Hash + fmt::Debug;

    /// Makes `count` copies of `source` under the group `group`.
    ///
    /// Implementations must return exactly `count` handles; the engine treats
    /// any other length as a failure.
    fn duplicate(&mut self, source: Self::Node, count: usize, group: &str) -> SceneResult<Vec<Self::Node>>;

    /// Feeds the world-space position of every vertex of `node` to `visitor`,
    /// stopping early when the visitor breaks.
    fn visit_world_vertices(&self, node: Self::Node, visitor: &mut dyn VertexVisitor) -> SceneResult<()>;

    /// Returns the number of polygons of the node's mesh.
    fn polygon_count(&self, node: Self::Node) -> SceneResult<usize>;

    /// Returns the node's local-to-world transform.
    fn world_transform(&self, node: Self::Node) -> SceneResult<Isometry3<f64>>;

    /// Returns the world-space bounding box, or `None` for an empty mesh.
    fn bounding_box(&self, node: Self::Node) -> SceneResult<Option<Aabb>>;

    /// Creates a new mesh node.
    fn create_mesh(&mut self, name: &str, mesh: Mesh, transform: Isometry3<f64>) -> SceneResult<Self::Node>;

    /// Overwrites the node's local vertex positions in corner order.
    fn set_vertex_positions(&mut self, node: Self::Node, positions: &[Point3<f64>]) -> SceneResult<()>;

    /// Executes an edit command.
    fn execute(&mut self, command: &EditCommand<Self::Node>) -> SceneResult<()>;

    /// Replaces `target` with its intersection with `tool`. The tool is left untouched.
    fn boolean_intersect(&mut self, target: Self::Node, tool: Self::Node) -> SceneResult<()>;

    /// Deletes a node.
    fn delete(&mut self, node: Self::Node) -> SceneResult<()>;

    /// Renames a node.
    fn rename(&mut self, node: Self::Node, name: &str) -> SceneResult<()>;

    /// Returns the node's name.
    fn name(&self, node: Self::Node) -> SceneResult<String>;
}

/// Handle to a node of a [`MemoryScene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct SceneNode {
    name: String,
    mesh: Mesh,
    transform: Isometry3<f64>,
    group: Option<String>,
}

/// An in-memory scene of named mesh nodes with rigid world transforms.
///
/// Meshes are stored in node-local space. Nodes iterate in creation order.
#[derive(Debug, Clone)]
pub struct MemoryScene {
    nodes: BTreeMap<NodeId, SceneNode>,
    next_id: u32,
    epsilon: f64,
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
            next_id: 0,
            epsilon: PLANE_EPSILON,
        }
    }
}

impl MemoryScene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the plane tolerance used by cut and boolean edits.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Adds a mesh node with the identity transform.
    pub fn insert(&mut self, name: &str, mesh: Mesh) -> NodeId {
        self.insert_with_transform(name, mesh, Isometry3::identity())
    }

    /// Adds a mesh node with the given local-to-world transform.
    pub fn insert_with_transform(&mut self, name: &str, mesh: Mesh, transform: Isometry3<f64>) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            SceneNode {
                name: name.to_owned(),
                mesh,
                transform,
                group: None,
            },
        );
        id
    }

    /// Returns the node's mesh in local space.
    pub fn mesh(&self, node: NodeId) -> Option<&Mesh> {
        self.nodes.get(&node).map(|n| &n.mesh)
    }

    /// Returns the node's mesh mapped into world space.
    pub fn world_mesh(&self, node: NodeId) -> Option<Mesh> {
        self.nodes.get(&node).map(|n| n.mesh.transformed(&n.transform))
    }

    /// Returns true if the node exists.
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    /// Returns the number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the scene has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Finds the first node with the given name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, n)| n.name == name)
            .map(|(id, _)| *id)
    }

    /// Lists the live members of a group in creation order.
    pub fn group_members(&self, group: &str) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.group.as_deref() == Some(group))
            .map(|(id, _)| *id)
            .collect()
    }

    fn node(&self, id: NodeId) -> SceneResult<&SceneNode> {
        self.nodes.get(&id).ok_or_else(|| SceneError::unknown(id))
    }

    fn node_mut(&mut self, id: NodeId) -> SceneResult<&mut SceneNode> {
        self.nodes.get_mut(&id).ok_or_else(|| SceneError::unknown(id))
    }

    /// Face planes of a convex tool, mapped into the target's local space.
    fn tool_planes(&self, target: NodeId, tool: NodeId) -> SceneResult<Vec<Plane>> {
        let target_transform = self.node(target)?.transform;
        let tool_node = self.node(tool)?;
        if tool_node.mesh.is_empty() {
            return Err(SceneError::EmptyTool {
                node: format!("{tool:?}"),
            });
        }

        let planes: Vec<Plane> = tool_node
            .mesh
            .polygons()
            .iter()
            .filter_map(|polygon| polygon.plane())
            .collect();
        if planes.is_empty() {
            return Err(SceneError::EmptyTool {
                node: format!("{tool:?}"),
            });
        }

        // Every tool vertex must lie behind every tool face
        let scale = tool_node
            .mesh
            .bounding_box()
            .map_or(1.0, |aabb| aabb.diagonal().max(1.0));
        let tolerance = 1e-9 * scale;
        let convex = planes.iter().all(|plane| {
            tool_node
                .mesh
                .vertices()
                .all(|v| plane.signed_distance(v) <= tolerance)
        });
        if !convex {
            return Err(SceneError::NonConvexTool {
                node: format!("{tool:?}"),
            });
        }

        let tool_to_target = target_transform.inverse() * tool_node.transform;
        Ok(planes.iter().map(|p| p.transformed(&tool_to_target)).collect())
    }
}

impl Scene for MemoryScene {
    type Node = NodeId;

    fn duplicate(&mut self, source: NodeId, count: usize, group: &str) -> SceneResult<Vec<NodeId>> {
        let original = self.node(source)?.clone();
        let copies = (1..=count)
            .map(|k| {
                let id = self.insert_with_transform(
                    &format!("{}_{k}", original.name),
                    original.mesh.clone(),
                    original.transform,
                );
                if let Some(node) = self.nodes.get_mut(&id) {
                    node.group = Some(group.to_owned());
                }
                id
            })
            .collect();
        Ok(copies)
    }

    fn visit_world_vertices(&self, node: NodeId, visitor: &mut dyn VertexVisitor) -> SceneResult<()> {
        let node = self.node(node)?;
        for vertex in node.mesh.vertices() {
            if let ControlFlow::Break(()) = visitor.visit(&(node.transform * vertex)) {
                break;
            }
        }
        Ok(())
    }

    fn polygon_count(&self, node: NodeId) -> SceneResult<usize> {
        Ok(self.node(node)?.mesh.polygon_count())
    }

    fn world_transform(&self, node: NodeId) -> SceneResult<Isometry3<f64>> {
        Ok(self.node(node)?.transform)
    }

    fn bounding_box(&self, node: NodeId) -> SceneResult<Option<Aabb>> {
        let node = self.node(node)?;
        let world: Vec<Point3<f64>> = node.mesh.vertices().map(|v| node.transform * v).collect();
        Ok(Aabb::from_points(&world))
    }

    fn create_mesh(&mut self, name: &str, mesh: Mesh, transform: Isometry3<f64>) -> SceneResult<NodeId> {
        Ok(self.insert_with_transform(name, mesh, transform))
    }

    fn set_vertex_positions(&mut self, node: NodeId, positions: &[Point3<f64>]) -> SceneResult<()> {
        let scene_node = self.node_mut(node)?;
        let expected = scene_node.mesh.corner_count();
        if !scene_node.mesh.set_corner_positions(positions) {
            return Err(SceneError::VertexCountMismatch {
                node: format!("{node:?}"),
                expected,
                actual: positions.len(),
            });
        }
        Ok(())
    }

    fn execute(&mut self, command: &EditCommand<NodeId>) -> SceneResult<()> {
        trace!(%command, "Executing edit");
        let epsilon = self.epsilon;
        match *command {
            EditCommand::CutAndCloseBorder { node, plane } => {
                let scene_node = self.node_mut(node)?;
                let local = plane.inverse_transformed(&scene_node.transform);
                let summary = scene_node.mesh.clip_and_cap(&local, epsilon);
                trace!(
                    removed = summary.removed,
                    split = summary.split,
                    caps = summary.caps,
                    "Cut and closed border"
                );
            }
        }
        Ok(())
    }

    fn boolean_intersect(&mut self, target: NodeId, tool: NodeId) -> SceneResult<()> {
        let planes = self.tool_planes(target, tool)?;
        let epsilon = self.epsilon;
        let mesh = &mut self.node_mut(target)?.mesh;
        for plane in &planes {
            if mesh.is_empty() {
                break;
            }
            mesh.clip_and_cap(plane, epsilon);
        }
        trace!(%target, %tool, faces = planes.len(), "Boolean intersection");
        Ok(())
    }

    fn delete(&mut self, node: NodeId) -> SceneResult<()> {
        self.nodes
            .remove(&node)
            .map(|_| ())
            .ok_or_else(|| SceneError::unknown(node))
    }

    fn rename(&mut self, node: NodeId, name: &str) -> SceneResult<()> {
        self.node_mut(node)?.name = name.to_owned();
        Ok(())
    }

    fn name(&self, node: NodeId) -> SceneResult<String> {
        Ok(self.node(node)?.name.clone())
    }
}
