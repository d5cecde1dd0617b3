//! Resolved layers.
//!
//! Tile layers hold a grid of shared tile references; object layers carry
//! their objects through unchanged for the collider builder.

use std::sync::Arc;

use bevy::log::debug;
use tiledmesh_assets::prelude::{MapObject, ObjectLayerAsset, Properties, TileLayerAsset};

use crate::instancer::TileInstancer;
use crate::map::MapBuildError;
use crate::tile::Tile;

/// A tile layer with every GID resolved.
///
/// The grid is stored column-major (`index = x * height + y`), matching the
/// order the mesh builder walks it.
#[derive(Debug, Clone)]
pub struct TileLayer {
    pub id: u32,
    pub name: String,

    /// Layer width in tiles
    pub width: u32,

    /// Layer height in tiles
    pub height: u32,

    /// Position in the map's layer list
    pub depth: usize,

    /// Z value from the map's `LayerZConfig`
    pub z: f32,

    pub visible: bool,
    pub opacity: f32,
    pub properties: Properties,

    /// Non-zero GIDs that matched no tileset frame
    pub unresolved: usize,

    tiles: Vec<Option<Arc<Tile>>>,
}

impl TileLayer {
    /// Create an empty tile layer with the given dimensions.
    pub fn empty(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: 0,
            name: name.into(),
            width,
            height,
            depth: 0,
            z: 0.0,
            visible: true,
            opacity: 1.0,
            properties: Properties::default(),
            unresolved: 0,
            tiles: vec![None; width as usize * height as usize],
        }
    }

    /// Resolve a decoded layer.
    ///
    /// Raw index `i` is cell `(i % width, i / width)`. Ids missing from the
    /// tile table leave the cell empty and are counted in `unresolved`.
    ///
    /// # Arguments
    /// * `asset` - The decoded layer
    /// * `instancer` - Resolver bound to the map's tile table
    ///
    /// # Returns
    /// * `Err(MapBuildError::LayerSizeMismatch)` - If `gids` does not cover the grid
    pub fn from_asset(
        asset: &TileLayerAsset,
        instancer: &mut TileInstancer,
    ) -> Result<Self, MapBuildError> {
        let expected = asset.width as usize * asset.height as usize;
        if asset.gids.len() != expected {
            return Err(MapBuildError::LayerSizeMismatch {
                layer: asset.name.clone(),
                expected,
                found: asset.gids.len(),
            });
        }

        let mut layer = TileLayer::empty(asset.name.clone(), asset.width, asset.height);
        layer.id = asset.id;
        layer.visible = asset.visible;
        layer.opacity = asset.opacity;
        layer.properties = asset.properties.clone();

        for (index, &raw) in asset.gids.iter().enumerate() {
            let x = (index % asset.width as usize) as u32;
            let y = (index / asset.width as usize) as u32;

            let (tile, _) = instancer.instance(raw);
            if tile.is_none() && raw != 0 {
                layer.unresolved += 1;
                debug!(
                    "Layer '{}': gid {:#010x} at ({}, {}) matches no tileset frame",
                    asset.name, raw, x, y
                );
            }
            layer.set(x, y, tile);
        }

        Ok(layer)
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        x as usize * self.height as usize + y as usize
    }

    /// Get tile at position (returns None if out of bounds or empty).
    pub fn get(&self, x: u32, y: u32) -> Option<&Arc<Tile>> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.tiles.get(self.index(x, y))?.as_ref()
    }

    /// Set tile at position. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, tile: Option<Arc<Tile>>) {
        if x < self.width && y < self.height {
            let index = self.index(x, y);
            if let Some(slot) = self.tiles.get_mut(index) {
                *slot = tile;
            }
        }
    }

    /// Iterate all non-empty tiles with their positions, column by column.
    ///
    /// Returns `(x, y, tile)` tuples.
    pub fn iter_tiles(&self) -> impl Iterator<Item = (u32, u32, &Arc<Tile>)> {
        let height = self.height.max(1) as usize;
        self.tiles.iter().enumerate().filter_map(move |(index, tile)| {
            tile.as_ref().map(|tile| {
                let x = (index / height) as u32;
                let y = (index % height) as u32;
                (x, y, tile)
            })
        })
    }

    /// Number of non-empty cells.
    pub fn tile_count(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.is_some()).count()
    }
}

/// An object layer.
#[derive(Debug, Clone)]
pub struct ObjectLayer {
    pub id: u32,
    pub name: String,
    pub depth: usize,
    pub z: f32,
    pub visible: bool,
    pub opacity: f32,
    pub objects: Vec<MapObject>,
    pub properties: Properties,
}

impl ObjectLayer {
    pub fn from_asset(asset: &ObjectLayerAsset) -> Self {
        Self {
            id: asset.id,
            name: asset.name.clone(),
            depth: 0,
            z: 0.0,
            visible: asset.visible,
            opacity: asset.opacity,
            objects: asset.objects.clone(),
            properties: asset.properties.clone(),
        }
    }
}

/// Map layers, interleaved in document order.
#[derive(Debug, Clone)]
pub enum Layer {
    Tiles(TileLayer),
    Objects(ObjectLayer),
}

impl Layer {
    pub fn name(&self) -> &str {
        match self {
            Layer::Tiles(layer) => &layer.name,
            Layer::Objects(layer) => &layer.name,
        }
    }

    pub(crate) fn set_name(&mut self, name: String) {
        match self {
            Layer::Tiles(layer) => layer.name = name,
            Layer::Objects(layer) => layer.name = name,
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Layer::Tiles(layer) => layer.depth,
            Layer::Objects(layer) => layer.depth,
        }
    }

    pub(crate) fn set_depth(&mut self, depth: usize, z: f32) {
        match self {
            Layer::Tiles(layer) => {
                layer.depth = depth;
                layer.z = z;
            }
            Layer::Objects(layer) => {
                layer.depth = depth;
                layer.z = z;
            }
        }
    }

    pub fn properties(&self) -> &Properties {
        match self {
            Layer::Tiles(layer) => &layer.properties,
            Layer::Objects(layer) => &layer.properties,
        }
    }

    pub fn as_tiles(&self) -> Option<&TileLayer> {
        match self {
            Layer::Tiles(layer) => Some(layer),
            Layer::Objects(_) => None,
        }
    }

    pub fn as_objects(&self) -> Option<&ObjectLayer> {
        match self {
            Layer::Objects(layer) => Some(layer),
            Layer::Tiles(_) => None,
        }
    }
}
