use std::fmt;

use glam::Mat4;

use crate::error::SceneError;

/// Index of a node inside its [`NodeTree`] arena.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Create an id from a raw arena index (mainly for testing).
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One element of the scene hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    /// Transform relative to the parent node.
    pub transform: Mat4,
    /// Indices into the scene mesh list. The same index may appear under several nodes.
    pub meshes: Vec<usize>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Mat4::IDENTITY,
            meshes: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Set the local transform, either a matrix or a decomposed [`mosaic_core::Transform`].
    pub fn with_transform(mut self, transform: impl Into<Mat4>) -> Self {
        self.transform = transform.into();
        self
    }

    pub fn with_meshes(mut self, meshes: Vec<usize>) -> Self {
        self.meshes = meshes;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena holding the node hierarchy. The root always lives at index 0.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTree {
    pub(crate) nodes: Vec<Node>,
}

impl NodeTree {
    /// Create a tree consisting of a single root node.
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            nodes: vec![Node::new(root_name)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn root_node(&self) -> &Node {
        &self.nodes[0]
    }

    pub fn root_node_mut(&mut self) -> &mut Node {
        &mut self.nodes[0]
    }

    /// Attach `node` as the last child of `parent` and return its id.
    pub fn add_child(&mut self, parent: NodeId, mut node: Node) -> Result<NodeId, SceneError> {
        if parent.index() >= self.nodes.len() {
            return Err(SceneError::UnknownNode(parent));
        }
        let id = NodeId(self.nodes.len() as u32);
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        self.nodes[parent.index()].children.push(id);
        Ok(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always has its root, so this is never true.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (NodeId, &mut Node)> {
        self.nodes
            .iter_mut()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }

    /// Node ids in depth-first pre-order starting at the root.
    ///
    /// Children are visited in their stored order. Ids that would be visited a
    /// second time (only possible in a corrupted arena) are skipped.
    pub fn depth_first(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else { continue };
            if std::mem::replace(&mut seen[id.index()], true) {
                continue;
            }
            order.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        order
    }

    /// First node with the given name in depth-first order.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.depth_first()
            .into_iter()
            .find(|&id| self.nodes[id.index()].name == name)
    }

    /// How many nodes carry the given name.
    pub fn count_by_name(&self, name: &str) -> usize {
        self.nodes.iter().filter(|n| n.name == name).count()
    }

    /// Accumulated root-to-node transform for every node, indexed by arena index.
    pub fn world_transforms(&self) -> Vec<Mat4> {
        let mut world = vec![Mat4::IDENTITY; self.nodes.len()];
        for id in self.depth_first() {
            let node = &self.nodes[id.index()];
            world[id.index()] = match node.parent {
                Some(parent) if parent.index() < world.len() => {
                    world[parent.index()] * node.transform
                }
                _ => node.transform,
            };
        }
        world
    }

    /// Drop every node except a fresh root carrying `root_name`.
    pub fn reset(&mut self, root_name: impl Into<String>) {
        self.nodes.clear();
        self.nodes.push(Node::new(root_name));
    }
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new("Root")
    }
}
