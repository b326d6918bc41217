use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::VisualObject;

/// Index of a node in a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    Geometry,
    Material,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceState {
    Live,
    Released,
}

/// Bookkeeping for one GPU-side allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuResource {
    pub kind: ResourceKind,
    pub label: String,
    pub state: ResourceState,
}

/// Every GPU-side resource the scene has ever registered.
///
/// Entries are kept after release so double frees are observable.
#[derive(Debug, Clone, Default)]
pub struct ResourceTable {
    entries: BTreeMap<ResourceId, GpuResource>,
    next: u32,
}

impl ResourceTable {
    pub fn register(&mut self, kind: ResourceKind, label: impl Into<String>) -> ResourceId {
        let id = ResourceId(self.next);
        self.next += 1;
        self.entries.insert(
            id,
            GpuResource {
                kind,
                label: label.into(),
                state: ResourceState::Live,
            },
        );
        id
    }

    /// Release a live resource. Returns `false` if it was unknown or already released.
    pub fn release(&mut self, id: ResourceId) -> bool {
        match self.entries.get_mut(&id) {
            Some(resource) if resource.state == ResourceState::Live => {
                resource.state = ResourceState::Released;
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, id: ResourceId) -> Option<&GpuResource> {
        self.entries.get(&id)
    }

    pub fn live_count(&self) -> usize {
        self.entries
            .values()
            .filter(|r| r.state == ResourceState::Live)
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A visual attached to the scene, with the resources allocated for it.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub visual: VisualObject,
    pub resources: Vec<ResourceId>,
}

/// Arena of attached visuals.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: Vec<Option<SceneNode>>,
    resources: ResourceTable,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a visual, registering one geometry and one material per mesh part.
    pub fn attach(&mut self, visual: VisualObject) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let mut resources = Vec::with_capacity(visual.parts.len() * 2);
        for part in &visual.parts {
            resources.push(self.resources.register(
                ResourceKind::Geometry,
                format!("{}/{}", visual.label, part.geometry.describe()),
            ));
            resources.push(self.resources.register(
                ResourceKind::Material,
                format!("{}/#{:06x}", visual.label, part.material.color),
            ));
        }
        tracing::debug!(node = id.0, label = %visual.label, parts = visual.parts.len(), "visual attached");
        self.nodes.push(Some(SceneNode { visual, resources }));
        id
    }

    /// Detach a node and release its resources. Returns `false` if nothing was attached.
    pub fn detach(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get_mut(id.index()).and_then(Option::take) else {
            return false;
        };
        for resource in node.resources {
            if !self.resources.release(resource) {
                tracing::warn!(?resource, "resource was already released");
            }
        }
        tracing::debug!(node = id.0, label = %node.visual.label, "visual detached");
        true
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    pub fn visual(&self, id: NodeId) -> Option<&VisualObject> {
        self.node(id).map(|n| &n.visual)
    }

    pub fn visual_mut(&mut self, id: NodeId) -> Option<&mut VisualObject> {
        self.nodes
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .map(|n| &mut n.visual)
    }

    /// Attached nodes in attach order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.as_ref().map(|n| (NodeId(i as u32), n)))
    }

    /// Number of attached nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn resources(&self) -> &ResourceTable {
        &self.resources
    }
}
