//! # `tiledmesh_assets`
//!
//! Layer 1 of `tiledmesh`: the raw TMX document model.
//!
//! - [`loaders`]: `roxmltree`-based TMX/TSX parsing, external tileset lookup
//! - [`decode`]: tile layer `<data>` decoding (XML nodes, CSV, base64 + gzip/zlib)
//! - [`assets`]: the parsed map, tilesets, layers and objects
//! - [`properties`]: case-insensitive custom properties
//!
//! Nothing here resolves GIDs to tiles; see `tiledmesh_core`.

pub mod assets;
pub mod decode;
pub mod loaders;
pub mod properties;

/// Prelude module for convenient imports
///
/// # Example
/// ```no_run
/// use tiledmesh_assets::prelude::*;
///
/// let map = TiledMapLoader::with_reader(NoExternalResources)
///     .parse_tmx_map("<map width=\"1\" height=\"1\" tilewidth=\"8\" tileheight=\"8\"/>", None)
///     .unwrap();
/// assert!(map.layers.is_empty());
/// ```
pub mod prelude {
    pub use crate::assets::{
        map::{LayerAsset, ObjectLayerAsset, Orientation, TileLayerAsset, TiledMapAsset},
        object::{MapObject, ObjectShape},
        tileset::{Frame, FrameLayout, TilesetAsset, TilesetImage},
    };
    pub use crate::decode::{Compression, DataContent, DecodeError, Encoding, LayerData};
    pub use crate::loaders::{
        FilesystemReader, NoExternalResources, ResourceReader,
        map::{MapLoaderError, TiledMapLoader},
        tileset::parse_tsx,
    };
    pub use crate::properties::{
        FromTiledProperty, Properties, PropertyType, PropertyValue, TiledColor,
    };
}

pub use loaders::map::{MapLoaderError, TiledMapLoader};
