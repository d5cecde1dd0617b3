//! Per-layer collider generation.

use bevy::log::{debug, warn};
use bevy::math::UVec2;
use tiledmesh_core::prelude::{Map, ObjectLayer};

use crate::config::ColliderConfig;
use crate::shapes::{ColliderError, ColliderGeometry, build_collider};

/// Collider geometry tagged with the object it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectCollider {
    pub object_id: u32,
    pub name: String,
    /// The object's `type`/`class` tag
    pub user_type: String,
    pub geometry: ColliderGeometry,
}

/// Build colliders for every object in a layer.
///
/// One entry per object, in layer order. A failing object is logged and
/// returned as an `Err` entry; the remaining objects still build.
///
/// # Arguments
///
/// * `layer` - The object layer
/// * `tile_size` - The map's tile size in pixels
/// * `config` - Collider settings, applied to every object
pub fn build_layer_colliders(
    layer: &ObjectLayer,
    tile_size: UVec2,
    config: &ColliderConfig,
) -> Vec<Result<ObjectCollider, ColliderError>> {
    let results: Vec<_> = layer
        .objects
        .iter()
        .map(|object| {
            build_collider(object, tile_size, config).map(|geometry| ObjectCollider {
                object_id: object.id,
                name: object.name.clone(),
                user_type: object.user_type.clone(),
                geometry,
            })
        })
        .collect();

    let mut failed = 0;
    for error in results.iter().filter_map(|result| result.as_ref().err()) {
        warn!("Skipping collider in layer '{}': {}", layer.name, error);
        failed += 1;
    }

    debug!(
        "Built {} colliders for layer '{}' ({} failed)",
        results.len() - failed,
        layer.name,
        failed
    );

    results
}

/// Build colliders for every object layer of a map.
///
/// Each layer's colliders are centered on that layer's `z` instead of
/// `config.depth`. Returns `(layer name, results)` pairs in layer order.
pub fn build_map_colliders<'a>(
    map: &'a Map,
    config: &ColliderConfig,
) -> Vec<(&'a str, Vec<Result<ObjectCollider, ColliderError>>)> {
    let tile_size = map.tile_size();

    map.object_layers()
        .map(|layer| {
            let config = config.at_depth(layer.z);
            (
                layer.name.as_str(),
                build_layer_colliders(layer, tile_size, &config),
            )
        })
        .collect()
}
