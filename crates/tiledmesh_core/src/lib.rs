//! # `tiledmesh_core`
//!
//! Resolved tile grids for `tiledmesh`. Converts a parsed
//! [`TiledMapAsset`](tiledmesh_assets::prelude::TiledMapAsset) into a [`Map`]:
//! tilesets laid out into frames, raw GIDs resolved to shared tiles, layers
//! ordered and uniquely named.
//!
//! **This crate does NOT produce geometry** - mesh buffers and colliders are
//! Layer 3 concerns (`tiledmesh_mesh`, `tiledmesh_collider`) that read the
//! resolved map.
//!
//! ## Architecture
//!
//! Layer 2 (this crate) sits between:
//! - **Layer 1** (`tiledmesh_assets`): TMX parsing and tile data decoding
//! - **Layer 3** (`tiledmesh_mesh`, `tiledmesh_collider`): geometry builders
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use tiledmesh_assets::prelude::*;
//! use tiledmesh_core::prelude::*;
//!
//! let asset = TiledMapLoader::new()
//!     .load_tmx_map("assets/maps/level1.tmx")
//!     .unwrap();
//! let map = Map::from_asset(&asset, &LoadConfig::default()).unwrap();
//!
//! for layer in map.tile_layers() {
//!     for (x, y, tile) in layer.iter_tiles() {
//!         let _ = (x, y, tile.gid, tile.flip);
//!     }
//! }
//! ```

pub mod config;
pub mod instancer;
pub mod layer;
pub mod map;
pub mod tile;

pub mod prelude {
    //! Common imports for `tiledmesh_core` users.

    pub use crate::config::{LayerZConfig, LoadConfig};
    pub use crate::instancer::{
        FLIPPED_HORIZONTALLY_FLAG, FLIPPED_VERTICALLY_FLAG, TileInstancer, resolve, split_gid,
    };
    pub use crate::layer::{Layer, ObjectLayer, TileLayer};
    pub use crate::map::{Map, MapBuildError, ResolvedTileset, TextureSizes};
    pub use crate::tile::{FlipState, Tile};
}

// Re-export the main types at crate root for convenience
pub use config::{LayerZConfig, LoadConfig};
pub use map::{Map, MapBuildError};
