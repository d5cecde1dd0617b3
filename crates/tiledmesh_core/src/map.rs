//! The resolved map aggregate.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use bevy::log::{info, warn};
use bevy::math::UVec2;
use thiserror::Error;
use tiledmesh_assets::prelude::{
    FrameLayout, LayerAsset, Orientation, Properties, TiledMapAsset, TilesetAsset,
};

use crate::config::LoadConfig;
use crate::instancer::TileInstancer;
use crate::layer::{Layer, ObjectLayer, TileLayer};
use crate::tile::{FlipState, Tile};

#[derive(Debug, Error)]
pub enum MapBuildError {
    #[error("No texture size known for tileset '{tileset}' (image {image:?})")]
    MissingTextureSize { tileset: String, image: String },

    #[error("Layer '{layer}' has {found} tile ids, expected {expected}")]
    LayerSizeMismatch {
        layer: String,
        expected: usize,
        found: usize,
    },
}

/// Host-supplied texture sizes, for tilesets whose `<image>` carries no
/// `width`/`height`.
pub trait TextureSizes {
    /// Pixel size of the image at `source` (as written in the tileset).
    fn texture_size(&self, source: &str) -> Option<UVec2>;
}

impl TextureSizes for HashMap<String, UVec2> {
    fn texture_size(&self, source: &str) -> Option<UVec2> {
        self.get(source).copied()
    }
}

/// A tileset together with the texture facts the builders need.
#[derive(Debug, Clone)]
pub struct ResolvedTileset {
    pub tileset: TilesetAsset,
    /// Pixel size of the tileset texture (`UVec2::ZERO` without an image)
    pub texture_size: UVec2,
    pub layout: FrameLayout,
}

impl ResolvedTileset {
    #[inline]
    pub fn name(&self) -> &str {
        &self.tileset.name
    }

    /// Image path, used as the texture group name by the mesh builder.
    #[inline]
    pub fn texture_name(&self) -> &str {
        self.tileset.image_source()
    }

    #[inline]
    pub fn tile_size(&self) -> UVec2 {
        self.tileset.tile_size
    }
}

/// A fully resolved map.
///
/// Built once from a [`TiledMapAsset`]; immutable afterwards.
#[derive(Debug, Clone)]
pub struct Map {
    pub version: String,
    pub orientation: Orientation,

    /// Map size in tiles
    pub width: u32,
    pub height: u32,

    /// Tile size in pixels
    pub tile_width: u32,
    pub tile_height: u32,

    pub properties: Properties,

    /// Tilesets in ascending `first_gid` order; `Tile::tileset` indexes here
    pub tilesets: Vec<ResolvedTileset>,

    /// Canonical GID → tile table
    pub tiles: HashMap<u32, Arc<Tile>>,

    /// Layers in document order, names unique within the map
    pub layers: Vec<Layer>,
}

impl Map {
    /// Resolve a map using only the texture sizes recorded in the document.
    pub fn from_asset(asset: &TiledMapAsset, config: &LoadConfig) -> Result<Self, MapBuildError> {
        Self::from_asset_with_textures(asset, config, &HashMap::<String, UVec2>::new())
    }

    /// Resolve a map.
    ///
    /// 1. Lays out every tileset's frames and fills the GID → tile table
    /// 2. Resolves each tile layer's GIDs through a [`TileInstancer`]
    /// 3. Assigns depth and z, and makes layer names unique
    ///
    /// # Arguments
    /// * `asset` - The parsed document
    /// * `config` - Tile sharing and z-ordering settings
    /// * `textures` - Fallback texture sizes keyed by image source
    ///
    /// # Returns
    /// * `Err(MapBuildError::MissingTextureSize)` - A tileset image has no known size
    /// * `Err(MapBuildError::LayerSizeMismatch)` - A layer's GIDs do not cover its grid
    pub fn from_asset_with_textures(
        asset: &TiledMapAsset,
        config: &LoadConfig,
        textures: &impl TextureSizes,
    ) -> Result<Self, MapBuildError> {
        let mut tilesets = Vec::with_capacity(asset.tilesets.len());
        let mut tiles = HashMap::new();

        for (index, tileset) in asset.tilesets.iter().enumerate() {
            let resolved = resolve_tileset(tileset, textures)?;
            for frame in tileset.frames(resolved.texture_size) {
                let tile = Tile {
                    gid: frame.gid,
                    local_id: frame.local_id,
                    source: frame.rect,
                    tileset: index,
                    flip: FlipState::None,
                    properties: tileset
                        .tile_properties(frame.local_id)
                        .cloned()
                        .unwrap_or_default(),
                };
                // Later tilesets own overlapping ids
                tiles.insert(frame.gid, Arc::new(tile));
            }
            tilesets.push(resolved);
        }

        let mut layers = Vec::with_capacity(asset.layers.len());
        let mut instancer = TileInstancer::new(&tiles, config.make_unique);
        for layer in &asset.layers {
            let layer = match layer {
                LayerAsset::Tiles(tile_layer) => {
                    Layer::Tiles(TileLayer::from_asset(tile_layer, &mut instancer)?)
                }
                LayerAsset::Objects(object_layer) => {
                    Layer::Objects(ObjectLayer::from_asset(object_layer))
                }
            };
            layers.push(layer);
        }

        let mut used_names = HashSet::new();
        for (depth, layer) in layers.iter_mut().enumerate() {
            layer.set_depth(depth, config.layer_z.z_for(depth));

            let name = unique_name(layer.name(), &used_names);
            if name != layer.name() {
                warn!("Renaming duplicate layer '{}' to '{}'", layer.name(), name);
                layer.set_name(name.clone());
            }
            used_names.insert(name);
        }

        let unresolved: usize = layers
            .iter()
            .filter_map(Layer::as_tiles)
            .map(|layer| layer.unresolved)
            .sum();
        info!(
            "Resolved map: {} tiles from {} tilesets, {} layers ({} unresolved references)",
            tiles.len(),
            tilesets.len(),
            layers.len(),
            unresolved
        );

        Ok(Map {
            version: asset.version.clone(),
            orientation: asset.orientation,
            width: asset.width,
            height: asset.height,
            tile_width: asset.tile_width,
            tile_height: asset.tile_height,
            properties: asset.properties.clone(),
            tilesets,
            tiles,
            layers,
        })
    }

    /// Tile size in pixels.
    #[inline]
    pub fn tile_size(&self) -> UVec2 {
        UVec2::new(self.tile_width, self.tile_height)
    }

    /// Canonical tile for a GID (flip bits must already be stripped).
    pub fn tile(&self, gid: u32) -> Option<&Arc<Tile>> {
        self.tiles.get(&gid)
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.name() == name)
    }

    pub fn tile_layers(&self) -> impl Iterator<Item = &TileLayer> {
        self.layers.iter().filter_map(Layer::as_tiles)
    }

    pub fn object_layers(&self) -> impl Iterator<Item = &ObjectLayer> {
        self.layers.iter().filter_map(Layer::as_objects)
    }
}

fn resolve_tileset(
    tileset: &TilesetAsset,
    textures: &impl TextureSizes,
) -> Result<ResolvedTileset, MapBuildError> {
    let Some(image) = &tileset.image else {
        warn!(
            "Tileset '{}' has no spritesheet image, its tiles cannot be placed",
            tileset.name
        );
        return Ok(ResolvedTileset {
            tileset: tileset.clone(),
            texture_size: UVec2::ZERO,
            layout: FrameLayout::default(),
        });
    };

    let texture_size = image
        .size
        .or_else(|| textures.texture_size(&image.source))
        .ok_or_else(|| MapBuildError::MissingTextureSize {
            tileset: tileset.name.clone(),
            image: image.source.clone(),
        })?;

    Ok(ResolvedTileset {
        tileset: tileset.clone(),
        texture_size,
        layout: tileset.frame_layout(texture_size),
    })
}

/// `name`, or `name_1`, `name_2`, ... whichever is not taken yet.
fn unique_name(name: &str, used: &HashSet<String>) -> String {
    if !used.contains(name) {
        return name.to_string();
    }
    (1..)
        .map(|suffix| format!("{name}_{suffix}"))
        .find(|candidate| !used.contains(candidate))
        .unwrap_or_else(|| name.to_string())
}
