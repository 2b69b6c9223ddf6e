//! Arena holding the top-level elements bound to edit targets.
//!
//! Every element gets a [`NodeId`] that stays valid for the lifetime of the
//! tree, even after the element has been detached from its parent. Targets,
//! changes and the pruner refer to masters through these handles, so two
//! structurally equal masters are still told apart.

use crate::element::{Element, ElementBody, ScalarValue};
use crate::schema;

/// Stable handle of an element inside an [`ElementTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug)]
enum NodeData {
    Master(Vec<NodeId>),
    Scalar(ScalarValue),
}

#[derive(Debug)]
struct Node {
    id: u32,
    data: NodeData,
    parent: Option<NodeId>,
}

/// Arena of elements. Nodes are never freed; removal only detaches.
#[derive(Debug, Default)]
pub struct ElementTree {
    nodes: Vec<Node>,
}

impl ElementTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Import an element (and its descendants) as a new root.
    pub fn insert(&mut self, element: Element) -> NodeId {
        self.insert_under(element, None)
    }

    fn insert_under(&mut self, element: Element, parent: Option<NodeId>) -> NodeId {
        let handle = NodeId(self.nodes.len());
        match element.body {
            ElementBody::Scalar(value) => {
                self.nodes.push(Node { id: element.id, data: NodeData::Scalar(value), parent });
            }
            ElementBody::Master(children) => {
                self.nodes.push(Node {
                    id: element.id,
                    data: NodeData::Master(Vec::with_capacity(children.len())),
                    parent,
                });
                for child in children {
                    let child_handle = self.insert_under(child, Some(handle));
                    if let NodeData::Master(list) = &mut self.nodes[handle.0].data {
                        list.push(child_handle);
                    }
                }
            }
        }
        handle
    }

    /// EBML ID of a node.
    pub fn element_id(&self, node: NodeId) -> u32 {
        self.nodes[node.0].id
    }

    /// The parent a node is currently attached to.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn is_master(&self, node: NodeId) -> bool {
        matches!(self.nodes[node.0].data, NodeData::Master(_))
    }

    /// Children of a master, in file order; empty for scalars.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        match &self.nodes[node.0].data {
            NodeData::Master(children) => children,
            NodeData::Scalar(_) => &[],
        }
    }

    pub fn child_count(&self, node: NodeId) -> usize {
        self.children(node).len()
    }

    /// Scalar value of a node, `None` for masters.
    pub fn value(&self, node: NodeId) -> Option<&ScalarValue> {
        match &self.nodes[node.0].data {
            NodeData::Scalar(value) => Some(value),
            NodeData::Master(_) => None,
        }
    }

    /// First direct child of `parent` with the given ID.
    pub fn find_child(&self, parent: NodeId, id: u32) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|child| self.element_id(*child) == id)
    }

    /// All direct children of `parent` with the given ID.
    pub fn children_with_id(&self, parent: NodeId, id: u32) -> Vec<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .filter(|child| self.element_id(*child) == id)
            .collect()
    }

    /// Value of the first direct child with the given ID.
    pub fn child_value(&self, parent: NodeId, id: u32) -> Option<&ScalarValue> {
        self.find_child(parent, id).and_then(|child| self.value(child))
    }

    /// Append `element` as the last child of `parent`.
    ///
    /// `parent` must be a master.
    pub fn append_child(&mut self, parent: NodeId, element: Element) -> NodeId {
        debug_assert!(self.is_master(parent), "appending to a scalar element");
        let handle = self.insert_under(element, Some(parent));
        if let NodeData::Master(children) = &mut self.nodes[parent.0].data {
            children.push(handle);
        }
        handle
    }

    /// Return the first child master with `id`, creating an empty one if
    /// there is none.
    pub fn find_or_create_master(&mut self, parent: NodeId, id: u32) -> NodeId {
        match self.find_child(parent, id) {
            Some(existing) => existing,
            None => self.append_child(parent, Element::master(id, Vec::new())),
        }
    }

    /// Overwrite the value of a scalar node. Returns `true` if the stored
    /// value changed.
    pub fn set_value(&mut self, node: NodeId, value: ScalarValue) -> bool {
        match &mut self.nodes[node.0].data {
            NodeData::Scalar(current) if *current == value => false,
            NodeData::Scalar(current) => {
                *current = value;
                true
            }
            NodeData::Master(_) => false,
        }
    }

    /// Set every direct child of `parent` with `id` to `value`, appending a
    /// new child if there is none. Returns `true` if the tree changed.
    pub fn set_child_value(&mut self, parent: NodeId, id: u32, value: ScalarValue) -> bool {
        let existing = self.children_with_id(parent, id);
        if existing.is_empty() {
            self.append_child(parent, Element::scalar(id, value));
            return true;
        }
        existing
            .into_iter()
            .fold(false, |modified, node| self.set_value(node, value.clone()) || modified)
    }

    /// Detach `child` from `parent`. Returns `false` if it was not attached there.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let removed = match &mut self.nodes[parent.0].data {
            NodeData::Master(children) => {
                let before = children.len();
                children.retain(|existing| *existing != child);
                children.len() != before
            }
            NodeData::Scalar(_) => false,
        };
        if removed {
            self.nodes[child.0].parent = None;
        }
        removed
    }

    /// Detach every direct child of `parent` with the given ID and return
    /// how many were removed.
    pub fn remove_children_with_id(&mut self, parent: NodeId, id: u32) -> usize {
        let doomed = self.children_with_id(parent, id);
        for child in &doomed {
            self.remove_child(parent, *child);
        }
        doomed.len()
    }

    /// `true` if the master has no children, or only scalar children whose
    /// values equal their schema defaults.
    pub fn is_empty_or_only_defaults(&self, node: NodeId) -> bool {
        self.children(node).iter().all(|child| {
            self.value(*child)
                .is_some_and(|value| schema::is_default_value(self.element_id(*child), value))
        })
    }

    /// Export a node and its descendants as an owned [`Element`].
    pub fn to_element(&self, node: NodeId) -> Element {
        let entry = &self.nodes[node.0];
        match &entry.data {
            NodeData::Scalar(value) => Element::scalar(entry.id, value.clone()),
            NodeData::Master(children) => Element::master(
                entry.id,
                children.iter().map(|child| self.to_element(*child)).collect(),
            ),
        }
    }
}
