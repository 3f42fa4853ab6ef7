use std::collections::HashMap;

use bevy::math::{Affine3A, Quat, Ray3d, Vec3};

use super::ray::Aabb3;
use crate::dental::classifier::{Arch, MeshCategory, classify};
use crate::engine::materials::{ToothMaterial, default_tooth_material, skull_material};

/// Handle to a node in the scene arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Handle to a material in the scene's material store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Mesh(MeshCategory),
    Group,
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    /// World transform of the asset hierarchy above a root node.
    pub parent_transform: Affine3A,
    /// Mesh bounds in the node's local space.
    pub local_bounds: Option<Aabb3>,
    pub visible: bool,
    pub interactive: bool,
    pub material: Option<MaterialId>,
    pub arch: Option<Arch>,
    pub clone_of: Option<NodeId>,
}

impl SceneNode {
    pub fn category(&self) -> Option<MeshCategory> {
        match self.kind {
            NodeKind::Mesh(category) => Some(category),
            NodeKind::Group => None,
        }
    }

    pub fn is_tooth(&self) -> bool {
        self.category() == Some(MeshCategory::Tooth)
    }

    pub fn is_skull(&self) -> bool {
        self.category() == Some(MeshCategory::Skull)
    }

    pub fn is_clone(&self) -> bool {
        self.clone_of.is_some()
    }

    fn local_transform(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Placement of a node before any view transition moved it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OriginalPlacement {
    pub translation: Vec3,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub node: NodeId,
    pub distance: f32,
}

#[derive(Debug, Default)]
struct MaterialStore {
    next: u32,
    live: HashMap<MaterialId, ToothMaterial>,
    released: Vec<MaterialId>,
}

impl MaterialStore {
    fn insert(&mut self, material: ToothMaterial) -> MaterialId {
        let id = MaterialId(self.next);
        self.next += 1;
        self.live.insert(id, material);
        id
    }

    fn release(&mut self, id: MaterialId) {
        if self.live.remove(&id).is_some() {
            self.released.push(id);
        }
    }
}

/// Arena of scene nodes plus the material store and the side tables the
/// interaction and view controllers hang off it.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    materials: MaterialStore,
    previous_material: HashMap<NodeId, MaterialId>,
    original_placement: Option<HashMap<NodeId, OriginalPlacement>>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mesh node. The category comes from the name and the node starts
    /// with its category's default material.
    pub fn add_mesh(
        &mut self,
        name: impl Into<String>,
        translation: Vec3,
        rotation: Quat,
        scale: Vec3,
        parent_transform: Affine3A,
        local_bounds: Aabb3,
    ) -> NodeId {
        let name = name.into();
        let category = classify(&name);
        let material = self.materials.insert(category_material(category));
        self.push(SceneNode {
            name,
            kind: NodeKind::Mesh(category),
            parent: None,
            translation,
            rotation,
            scale,
            parent_transform,
            local_bounds: Some(local_bounds),
            visible: true,
            interactive: category == MeshCategory::Tooth,
            material: Some(material),
            arch: None,
            clone_of: None,
        })
    }

    pub fn add_group(&mut self, name: impl Into<String>, parent: Option<NodeId>) -> NodeId {
        self.push(SceneNode {
            name: name.into(),
            kind: NodeKind::Group,
            parent,
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            parent_transform: Affine3A::IDENTITY,
            local_bounds: None,
            visible: true,
            interactive: false,
            material: None,
            arch: None,
            clone_of: None,
        })
    }

    /// Duplicate a mesh under `parent` with its own copy of the source
    /// material, forced double sided with depth write and test on.
    pub fn clone_mesh(&mut self, source: NodeId, parent: NodeId) -> Option<NodeId> {
        let original = self.node(source)?.clone();
        let material = original
            .material
            .and_then(|id| self.materials.live.get(&id).cloned())
            .or_else(|| original.category().map(category_material))
            .map(|mut material| {
                material.double_sided = true;
                material.depth_write = true;
                material.depth_test = true;
                self.materials.insert(material)
            });

        Some(self.push(SceneNode {
            parent: Some(parent),
            parent_transform: Affine3A::IDENTITY,
            material,
            clone_of: Some(source),
            ..original
        }))
    }

    fn push(&mut self, node: SceneNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0 as usize)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0 as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Mesh node ids, clones included.
    pub fn meshes(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node)| node.category().is_some())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn category(&self, id: NodeId) -> Option<MeshCategory> {
        self.node(id).and_then(SceneNode::category)
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.iter()
            .find(|(_, node)| !node.is_clone() && node.name == name)
            .map(|(id, _)| id)
    }

    pub fn world_transform(&self, id: NodeId) -> Affine3A {
        let Some(node) = self.node(id) else {
            return Affine3A::IDENTITY;
        };
        let parent = match node.parent {
            Some(parent) => self.world_transform(parent),
            None => node.parent_transform,
        };
        parent * node.local_transform()
    }

    pub fn world_bounds(&self, id: NodeId) -> Option<Aabb3> {
        let bounds = self.node(id)?.local_bounds?;
        Some(bounds.transformed(&self.world_transform(id)))
    }

    /// Visible when the node and every ancestor are visible.
    pub fn is_visible(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            match self.node(current) {
                Some(node) if node.visible => cursor = node.parent,
                _ => return false,
            }
        }
        true
    }

    pub fn material(&self, id: MaterialId) -> Option<&ToothMaterial> {
        self.materials.live.get(&id)
    }

    pub fn material_of(&self, node: NodeId) -> Option<&ToothMaterial> {
        self.node(node)?.material.and_then(|id| self.material(id))
    }

    pub fn live_materials(&self) -> impl Iterator<Item = (MaterialId, &ToothMaterial)> {
        self.materials.live.iter().map(|(id, material)| (*id, material))
    }

    /// Attach a fresh material to `node`, releasing the one it replaces
    /// unless a side table still refers to it.
    pub fn assign_material(&mut self, node: NodeId, material: ToothMaterial) -> Option<MaterialId> {
        self.node(node)?;
        let id = self.materials.insert(material);
        self.attach(node, id);
        Some(id)
    }

    fn attach(&mut self, node: NodeId, id: MaterialId) {
        let Some(slot) = self.node_mut(node) else {
            return;
        };
        let replaced = slot.material.replace(id);
        if let Some(old) = replaced.filter(|old| *old != id) {
            self.release_if_unreferenced(old);
        }
    }

    fn release_if_unreferenced(&mut self, id: MaterialId) {
        let applied = self.nodes.iter().any(|node| node.material == Some(id));
        let cached = self.previous_material.values().any(|cached| *cached == id);
        if !applied && !cached {
            self.materials.release(id);
        }
    }

    pub fn cache_previous_material(&mut self, node: NodeId) {
        if let Some(current) = self.node(node).and_then(|n| n.material) {
            self.previous_material.insert(node, current);
        }
    }

    pub fn previous_material(&self, node: NodeId) -> Option<MaterialId> {
        self.previous_material.get(&node).copied()
    }

    /// Put the cached material back on `node`. Returns false when nothing
    /// was cached.
    pub fn restore_previous_material(&mut self, node: NodeId) -> bool {
        match self.previous_material.remove(&node) {
            Some(id) if self.materials.live.contains_key(&id) => {
                self.attach(node, id);
                true
            }
            _ => false,
        }
    }

    pub fn clear_previous_materials(&mut self) {
        let cached: Vec<MaterialId> = self.previous_material.drain().map(|(_, id)| id).collect();
        for id in cached {
            self.release_if_unreferenced(id);
        }
    }

    /// Every mesh back to its category default and all caches dropped.
    pub fn reset_category_materials(&mut self) {
        self.previous_material.clear();
        for id in self.meshes() {
            if let Some(category) = self.category(id) {
                self.assign_material(id, category_material(category));
            }
        }
        self.release_orphans();
    }

    fn release_orphans(&mut self) {
        let orphans: Vec<MaterialId> = self
            .materials
            .live
            .keys()
            .copied()
            .filter(|id| {
                !self.nodes.iter().any(|node| node.material == Some(*id))
                    && !self.previous_material.values().any(|cached| cached == id)
            })
            .collect();
        for id in orphans {
            self.materials.release(id);
        }
    }

    /// Materials dropped since the last call, for the renderer to free.
    pub fn take_released_materials(&mut self) -> Vec<MaterialId> {
        std::mem::take(&mut self.materials.released)
    }

    /// Record translation and visibility of every node that exists now.
    /// Only the first call has an effect.
    pub fn capture_original_placements(&mut self) {
        if self.original_placement.is_some() {
            return;
        }
        let placements = self
            .iter()
            .filter(|(_, node)| !node.is_clone())
            .map(|(id, node)| {
                (
                    id,
                    OriginalPlacement {
                        translation: node.translation,
                        visible: node.visible,
                    },
                )
            })
            .collect();
        self.original_placement = Some(placements);
    }

    pub fn original_placement(&self, id: NodeId) -> Option<OriginalPlacement> {
        self.original_placement.as_ref()?.get(&id).copied()
    }

    #[cfg(test)]
    pub fn has_original_placements(&self) -> bool {
        self.original_placement.is_some()
    }

    /// Visible mesh nodes hit by `ray` that pass `filter`, nearest first.
    pub fn raycast(&self, ray: &Ray3d, filter: impl Fn(&SceneNode) -> bool) -> Vec<RayHit> {
        let mut hits: Vec<RayHit> = self
            .iter()
            .filter(|(id, node)| node.category().is_some() && filter(*node) && self.is_visible(*id))
            .filter_map(|(id, _)| {
                let distance = self.world_bounds(id)?.ray_hit(ray)?;
                Some(RayHit { node: id, distance })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

pub fn category_material(category: MeshCategory) -> ToothMaterial {
    match category {
        MeshCategory::Skull => skull_material(),
        MeshCategory::Tooth => default_tooth_material(),
    }
}
