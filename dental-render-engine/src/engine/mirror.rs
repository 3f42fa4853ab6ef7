use std::collections::HashMap;

use bevy::prelude::*;

use crate::engine::scene::graph::{MaterialId, NodeId, NodeKind, SceneNode};
use crate::engine::viewer_state::ViewerState;

/// One glTF primitive under a mesh node.
#[derive(Debug, Clone)]
pub struct PrimitiveBinding {
    pub entity: Entity,
    pub mesh: Handle<Mesh>,
    pub transform: Transform,
}

/// Entities backing one scene graph node.
#[derive(Debug, Clone)]
pub struct NodeBinding {
    pub transform_entity: Entity,
    pub primitives: Vec<PrimitiveBinding>,
}

/// Maps scene graph handles to the Bevy entities and assets that render them.
#[derive(Resource, Debug, Default)]
pub struct SceneBindings {
    pub nodes: HashMap<NodeId, NodeBinding>,
    pub materials: HashMap<MaterialId, Handle<StandardMaterial>>,
}

#[derive(Component)]
pub struct ClonedTooth;

#[derive(Component)]
pub struct ClonedTeethGroup;

/// Link from an entity back to its scene graph node.
#[derive(Component, Debug, Clone, Copy)]
pub struct SceneNodeLink(pub NodeId);

fn node_transform(node: &SceneNode) -> Transform {
    Transform {
        translation: node.translation,
        rotation: node.rotation,
        scale: node.scale,
    }
}

fn node_visibility(node: &SceneNode) -> Visibility {
    if node.visible {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    }
}

/// Spawn entities for nodes created after load: the clone group and the
/// cloned teeth. Primitives reuse the source node's mesh handles.
fn spawn_missing_nodes(
    commands: &mut Commands,
    viewer: &ViewerState,
    bindings: &mut SceneBindings,
) {
    for (id, node) in viewer.scene.iter() {
        if bindings.nodes.contains_key(&id) {
            continue;
        }

        match node.kind {
            NodeKind::Group => {
                let entity = commands
                    .spawn((
                        ClonedTeethGroup,
                        SceneNodeLink(id),
                        Name::new(node.name.clone()),
                        node_transform(node),
                        node_visibility(node),
                    ))
                    .id();
                bindings.nodes.insert(
                    id,
                    NodeBinding {
                        transform_entity: entity,
                        primitives: Vec::new(),
                    },
                );
            }
            NodeKind::Mesh(_) => {
                let Some(source) = node.clone_of.and_then(|src| bindings.nodes.get(&src)) else {
                    continue;
                };
                let Some(parent) = node
                    .parent
                    .and_then(|p| bindings.nodes.get(&p))
                    .map(|b| b.transform_entity)
                else {
                    continue;
                };

                let source_primitives = source.primitives.clone();
                let transform_entity = commands
                    .spawn((
                        ClonedTooth,
                        SceneNodeLink(id),
                        Name::new(format!("{}_clone", node.name)),
                        node_transform(node),
                        node_visibility(node),
                        ChildOf(parent),
                    ))
                    .id();

                let primitives = source_primitives
                    .into_iter()
                    .map(|primitive| {
                        let entity = commands
                            .spawn((
                                Mesh3d(primitive.mesh.clone()),
                                primitive.transform,
                                ChildOf(transform_entity),
                            ))
                            .id();
                        PrimitiveBinding { entity, ..primitive }
                    })
                    .collect();

                bindings.nodes.insert(
                    id,
                    NodeBinding {
                        transform_entity,
                        primitives,
                    },
                );
            }
        }
    }
}

/// Create render materials for new ids and drop released ones.
fn sync_materials(
    viewer: &mut ViewerState,
    bindings: &mut SceneBindings,
    materials: &mut Assets<StandardMaterial>,
) {
    for id in viewer.scene.take_released_materials() {
        if let Some(handle) = bindings.materials.remove(&id) {
            materials.remove(&handle);
        }
    }

    for (id, material) in viewer.scene.live_materials() {
        bindings
            .materials
            .entry(id)
            .or_insert_with(|| materials.add(StandardMaterial::from(material)));
    }
}

/// Write the scene graph onto the Bevy world: transforms, visibility and
/// material handles. Runs after every controller has had its turn.
pub fn mirror_scene(
    mut commands: Commands,
    mut viewer: ResMut<ViewerState>,
    mut bindings: ResMut<SceneBindings>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut transforms: Query<(&mut Transform, &mut Visibility), Without<Mesh3d>>,
    mut mesh_materials: Query<&mut MeshMaterial3d<StandardMaterial>>,
) {
    // Released ids are bookkeeping, not a viewer change.
    sync_materials(viewer.bypass_change_detection(), &mut bindings, &mut materials);

    if !viewer.is_changed() {
        return;
    }

    spawn_missing_nodes(&mut commands, &viewer, &mut bindings);

    for (id, node) in viewer.scene.iter() {
        let Some(binding) = bindings.nodes.get(&id) else {
            continue;
        };

        if let Ok((mut transform, mut visibility)) = transforms.get_mut(binding.transform_entity)
        {
            transform.set_if_neq(node_transform(node));
            visibility.set_if_neq(node_visibility(node));
        }

        let Some(handle) = node.material.and_then(|m| bindings.materials.get(&m)) else {
            continue;
        };
        for primitive in &binding.primitives {
            match mesh_materials.get_mut(primitive.entity) {
                Ok(mut current) => {
                    if current.0 != *handle {
                        current.0 = handle.clone();
                    }
                }
                // Freshly spawned clones get their material on insert.
                Err(_) => {
                    commands
                        .entity(primitive.entity)
                        .insert(MeshMaterial3d(handle.clone()));
                }
            }
        }
    }
}
