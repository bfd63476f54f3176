//! Arena-based scene graph.
//!
//! Nodes live in one flat `Vec` and refer to each other by index, so the
//! graph is a strict tree with no reference cycles and no shared ownership.

use glam::Mat4;
use smallvec::SmallVec;

use crate::error::SceneError;
use crate::geometry::TriangleMesh;

/// Traceability data carried by a node back to whatever produced it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeMetadata {
    /// Source element or asset identifier.
    pub id: Option<String>,
    /// Producer-defined kind ("wall", "floor", "object", "scan", ...).
    pub kind: Option<String>,
    /// Room the node belongs to, if any.
    pub room_id: Option<String>,
    /// Level index the node was grouped into.
    pub level: Option<u32>,
    /// Holes cut into this node's geometry.
    pub hole_ids: Vec<String>,
    /// Walls this hole node is associated with.
    pub wall_ids: Vec<String>,
    /// Index of the scene instance this node came from.
    pub instance_index: Option<usize>,
}

/// One node in the graph. `transform` is local to the parent.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub transform: Mat4,
    pub parent: Option<usize>,
    pub children: SmallVec<[usize; 4]>,
    pub mesh: Option<usize>,
    pub visible: bool,
    pub metadata: NodeMetadata,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Mat4::IDENTITY,
            parent: None,
            children: SmallVec::new(),
            mesh: None,
            visible: true,
            metadata: NodeMetadata::default(),
        }
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_mesh(mut self, mesh: usize) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn with_metadata(mut self, metadata: NodeMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Scene graph arena. Meshes are stored once and referenced by index so
/// several nodes can share geometry.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    roots: Vec<usize>,
    meshes: Vec<TriangleMesh>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn node(&self, index: usize) -> Option<&SceneNode> {
        self.nodes.get(index)
    }

    pub fn node_mut(&mut self, index: usize) -> Option<&mut SceneNode> {
        self.nodes.get_mut(index)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (usize, &SceneNode)> {
        self.nodes.iter().enumerate()
    }

    pub fn mesh(&self, index: usize) -> Option<&TriangleMesh> {
        self.meshes.get(index)
    }

    pub fn meshes(&self) -> &[TriangleMesh] {
        &self.meshes
    }

    /// Store a mesh, returning its index.
    pub fn add_mesh(&mut self, mesh: TriangleMesh) -> usize {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    /// Insert a node as a root.
    pub fn add_root(&mut self, node: SceneNode) -> usize {
        let index = self.push(node);
        self.roots.push(index);
        index
    }

    /// Insert a node as a child of `parent`.
    pub fn add_child(&mut self, parent: usize, node: SceneNode) -> Result<usize, SceneError> {
        if parent >= self.nodes.len() {
            return Err(SceneError::NodeOutOfRange { index: parent });
        }
        let index = self.push(node);
        self.nodes[index].parent = Some(parent);
        self.nodes[parent].children.push(index);
        Ok(index)
    }

    fn push(&mut self, mut node: SceneNode) -> usize {
        node.parent = None;
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// World transform of a node: the product of local transforms down from
    /// its root.
    pub fn world_transform(&self, index: usize) -> Option<Mat4> {
        let mut world = self.nodes.get(index)?.transform;
        let mut cursor = self.nodes[index].parent;
        while let Some(p) = cursor {
            world = self.nodes[p].transform * world;
            cursor = self.nodes[p].parent;
        }
        Some(world)
    }

    /// Re-parent `child` under `parent`, preserving the child's world
    /// transform by re-expressing it in the parent's frame:
    /// `child_local = parent_world⁻¹ × child_world`.
    pub fn attach(&mut self, child: usize, parent: usize) -> Result<(), SceneError> {
        if child >= self.nodes.len() {
            return Err(SceneError::NodeOutOfRange { index: child });
        }
        if parent >= self.nodes.len() {
            return Err(SceneError::NodeOutOfRange { index: parent });
        }
        // Refuse to hang a node under its own subtree.
        let mut cursor = Some(parent);
        while let Some(c) = cursor {
            if c == child {
                return Err(SceneError::Cycle { child, parent });
            }
            cursor = self.nodes[c].parent;
        }

        let child_world = self
            .world_transform(child)
            .ok_or(SceneError::NodeOutOfRange { index: child })?;
        let parent_world = self
            .world_transform(parent)
            .ok_or(SceneError::NodeOutOfRange { index: parent })?;

        match self.nodes[child].parent {
            Some(old) => self.nodes[old].children.retain(|c| *c != child),
            None => self.roots.retain(|&r| r != child),
        }
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        self.nodes[child].transform = parent_world.inverse() * child_world;
        Ok(())
    }

    /// Depth-first traversal from the roots, yielding each node index with
    /// its world transform.
    pub fn traverse(&self) -> Traversal<'_> {
        let mut stack: Vec<(usize, Mat4)> = Vec::with_capacity(self.roots.len());
        for &root in self.roots.iter().rev() {
            stack.push((root, Mat4::IDENTITY));
        }
        Traversal { graph: self, stack }
    }
}

/// Iterator state for [`SceneGraph::traverse`].
pub struct Traversal<'a> {
    graph: &'a SceneGraph,
    stack: Vec<(usize, Mat4)>,
}

impl<'a> Iterator for Traversal<'a> {
    type Item = (usize, &'a SceneNode, Mat4);

    fn next(&mut self) -> Option<Self::Item> {
        let (index, parent_world) = self.stack.pop()?;
        let node = &self.graph.nodes[index];
        let world = parent_world * node.transform;
        for &child in node.children.iter().rev() {
            self.stack.push((child, world));
        }
        Some((index, node, world))
    }
}
