use bevy::math::UVec2;

use crate::assets::{object::MapObject, tileset::TilesetAsset};
use crate::properties::Properties;

/// A parsed TMX document.
///
/// Tile layers are already decoded to raw GIDs; nothing is resolved against
/// the tilesets yet. That is Layer 2's job (`tiledmesh_core::Map`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TiledMapAsset {
    /// The `version` attribute of `<map>`.
    pub version: String,
    pub orientation: Orientation,

    /// Map size in tiles
    pub width: u32,
    pub height: u32,

    /// Default tile size in pixels
    pub tile_width: u32,
    pub tile_height: u32,

    /// Custom properties set on the map in Tiled
    pub properties: Properties,

    /// Tilesets in document order (ascending `first_gid`)
    pub tilesets: Vec<TilesetAsset>,

    /// Tile and object layers in document order
    pub layers: Vec<LayerAsset>,
}

/// Map orientation. Only the two projections Tiled calls `orthogonal` and
/// `isometric` are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Orthogonal,
    Isometric,
}

impl Orientation {
    pub fn from_attribute(value: &str) -> Option<Self> {
        match value {
            "orthogonal" => Some(Orientation::Orthogonal),
            "isometric" => Some(Orientation::Isometric),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayerAsset {
    Tiles(TileLayerAsset),
    Objects(ObjectLayerAsset),
}

impl LayerAsset {
    pub fn name(&self) -> &str {
        match self {
            LayerAsset::Tiles(layer) => &layer.name,
            LayerAsset::Objects(layer) => &layer.name,
        }
    }
}

/// A `<layer>` with its `<data>` decoded to raw GIDs (flip bits still set).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TileLayerAsset {
    pub id: u32,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub visible: bool,
    pub opacity: f32,
    /// Row-major, exactly `width * height` entries.
    pub gids: Vec<u32>,
    pub properties: Properties,
}

/// An `<objectgroup>`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectLayerAsset {
    pub id: u32,
    pub name: String,
    pub visible: bool,
    pub opacity: f32,
    pub objects: Vec<MapObject>,
    pub properties: Properties,
}

impl TiledMapAsset {
    /// Default tile size in pixels.
    #[inline]
    pub fn tile_size(&self) -> UVec2 {
        UVec2::new(self.tile_width, self.tile_height)
    }

    pub fn tile_layers(&self) -> impl Iterator<Item = &TileLayerAsset> {
        self.layers.iter().filter_map(|layer| match layer {
            LayerAsset::Tiles(tiles) => Some(tiles),
            LayerAsset::Objects(_) => None,
        })
    }

    pub fn object_layers(&self) -> impl Iterator<Item = &ObjectLayerAsset> {
        self.layers.iter().filter_map(|layer| match layer {
            LayerAsset::Objects(objects) => Some(objects),
            LayerAsset::Tiles(_) => None,
        })
    }
}
