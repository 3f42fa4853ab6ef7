use std::collections::HashMap;

use bevy::asset::LoadState;
use bevy::gltf::{Gltf, GltfAssetLabel};
use bevy::math::Affine3A;
use bevy::render::mesh::MeshAabb;
use bevy::prelude::*;
use bevy::scene::SceneInstanceReady;

use crate::dental::classifier::{arch_of, arch_of_group};
use crate::engine::camera::orbit_camera::OrbitCamera;
use crate::engine::loading::settings::ViewerSettings;
use crate::engine::mirror::{NodeBinding, PrimitiveBinding, SceneBindings, SceneNodeLink};
use crate::engine::scene::graph::SceneGraph;
use crate::engine::scene::ray::Aabb3;
use crate::engine::viewer_state::{InteractionTuning, ViewerState};

#[derive(Resource, Default)]
pub struct ModelLoader {
    gltf: Option<Handle<Gltf>>,
    failure_reported: bool,
    registered: bool,
}

#[derive(Component)]
pub struct DentalModelRoot;

/// A glTF node carrying mesh primitives, flattened out of the spawned scene.
#[derive(Debug, Clone)]
pub struct MeshNodeInfo {
    pub entity: Entity,
    pub name: String,
    pub transform: Transform,
    /// Composed local transforms of every ancestor up to the scene root.
    pub parent_transform: Affine3A,
    /// Nearest ancestor first.
    pub ancestor_names: Vec<String>,
    pub local_bounds: Aabb3,
    pub primitives: Vec<PrimitiveBinding>,
}

pub fn model_registered(loader: Res<ModelLoader>) -> bool {
    loader.registered
}

/// Spawn the dental scene once the settings are known.
pub fn spawn_model(
    mut commands: Commands,
    settings: Option<Res<ViewerSettings>>,
    mut loader: ResMut<ModelLoader>,
    asset_server: Res<AssetServer>,
) {
    if loader.gltf.is_some() {
        return;
    }
    let Some(settings) = settings else {
        return;
    };

    info!("Loading dental model from: {}", settings.model_path);
    loader.gltf = Some(asset_server.load(settings.model_path.clone()));
    let scene = asset_server.load(GltfAssetLabel::Scene(0).from_asset(settings.model_path.clone()));

    commands
        .spawn((DentalModelRoot, Name::new("DentalModel"), SceneRoot(scene)))
        .observe(register_model);
}

/// The loading indicator stays up on failure. Logged once, no retry.
pub fn report_model_failure(mut loader: ResMut<ModelLoader>, asset_server: Res<AssetServer>) {
    if loader.failure_reported {
        return;
    }
    let Some(handle) = loader.gltf.as_ref() else {
        return;
    };
    if let Some(LoadState::Failed(err)) = asset_server.get_load_state(handle) {
        warn!("Dental model failed to load: {err}");
        loader.failure_reported = true;
    }
}

fn register_model(
    trigger: Trigger<SceneInstanceReady>,
    mut commands: Commands,
    mut loader: ResMut<ModelLoader>,
    settings: Res<ViewerSettings>,
    meshes: Res<Assets<Mesh>>,
    children: Query<&Children>,
    nodes: Query<(Option<&Name>, &Transform, Option<&ChildOf>)>,
    primitives: Query<(&Mesh3d, &Transform, &ChildOf)>,
) {
    let root = trigger.target();

    // Group primitives under the node that owns them, in scene order.
    let mut order: Vec<Entity> = Vec::new();
    let mut grouped: HashMap<Entity, Vec<PrimitiveBinding>> = HashMap::new();
    for entity in children.iter_descendants(root) {
        let Ok((mesh, transform, child_of)) = primitives.get(entity) else {
            continue;
        };
        let owner = child_of.parent();
        grouped
            .entry(owner)
            .or_insert_with(|| {
                order.push(owner);
                Vec::new()
            })
            .push(PrimitiveBinding {
                entity,
                mesh: mesh.0.clone(),
                transform: *transform,
            });
    }

    let mut infos = Vec::with_capacity(order.len());
    for owner in order {
        let Some(node_primitives) = grouped.remove(&owner) else {
            continue;
        };
        let Ok((name, transform, child_of)) = nodes.get(owner) else {
            continue;
        };
        let Some(name) = name else {
            debug!("Skipping unnamed mesh node {:?}", owner);
            continue;
        };

        // Walk up to the scene root composing transforms and collecting names.
        let mut parent_transform = Affine3A::IDENTITY;
        let mut ancestor_names = Vec::new();
        let mut cursor = child_of.map(ChildOf::parent);
        while let Some(ancestor) = cursor {
            let Ok((ancestor_name, ancestor_transform, ancestor_parent)) = nodes.get(ancestor)
            else {
                break;
            };
            parent_transform = ancestor_transform.compute_affine() * parent_transform;
            if let Some(ancestor_name) = ancestor_name {
                ancestor_names.push(ancestor_name.as_str().to_string());
            }
            cursor = if ancestor == root {
                None
            } else {
                ancestor_parent.map(ChildOf::parent)
            };
        }

        let local_bounds = node_primitives
            .iter()
            .filter_map(|primitive| {
                let aabb = meshes.get(&primitive.mesh)?.compute_aabb()?;
                let bounds =
                    Aabb3::from_center_half_extents(aabb.center.into(), aabb.half_extents.into());
                Some(bounds.transformed(&primitive.transform.compute_affine()))
            })
            .reduce(|a, b| a.union(&b))
            .unwrap_or_else(|| Aabb3::from_center_half_extents(Vec3::ZERO, Vec3::ZERO));

        infos.push(MeshNodeInfo {
            entity: owner,
            name: name.as_str().to_string(),
            transform: *transform,
            parent_transform,
            ancestor_names,
            local_bounds,
            primitives: node_primitives,
        });
    }

    let (scene, bindings) = build_scene_graph(infos);
    info!("Registered {} mesh nodes from the dental model", scene.len());

    for (id, binding) in &bindings.nodes {
        commands
            .entity(binding.transform_entity)
            .insert(SceneNodeLink(*id));
    }

    let viewer = ViewerState::new(scene, InteractionTuning::from_settings(&settings));
    commands.insert_resource(OrbitCamera::from_settings(&settings));
    commands.insert_resource(viewer);
    commands.insert_resource(bindings);
    loader.registered = true;
}

/// Register flattened mesh nodes into a fresh scene graph.
pub fn build_scene_graph(infos: Vec<MeshNodeInfo>) -> (SceneGraph, SceneBindings) {
    let mut scene = SceneGraph::new();
    let mut bindings = SceneBindings::default();

    for info in infos {
        let id = scene.add_mesh(
            info.name.clone(),
            info.transform.translation,
            info.transform.rotation,
            info.transform.scale,
            info.parent_transform,
            info.local_bounds,
        );
        if let Some(node) = scene.node_mut(id) {
            if node.is_tooth() {
                node.arch = info
                    .ancestor_names
                    .iter()
                    .find_map(|group| arch_of_group(group))
                    .or_else(|| arch_of(&info.name));
            }
        }
        bindings.nodes.insert(
            id,
            NodeBinding {
                transform_entity: info.entity,
                primitives: info.primitives,
            },
        );
    }

    (scene, bindings)
}
