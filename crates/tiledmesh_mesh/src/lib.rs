//! # `tiledmesh_mesh`
//!
//! Tile layer mesh buffers for `tiledmesh`.
//!
//! This crate is a Layer 3 builder that reads resolved tile layers from
//! `tiledmesh_core` and produces vertex/UV/index buffers, batched per texture
//! so a host can issue one draw call per tileset image.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tiledmesh_assets::prelude::*;
//! use tiledmesh_core::prelude::*;
//! use tiledmesh_mesh::prelude::*;
//!
//! let asset = TiledMapLoader::new().load_tmx_map("map.tmx").unwrap();
//! let map = Map::from_asset(&asset, &LoadConfig::default()).unwrap();
//!
//! for layer in map.tile_layers() {
//!     let mesh = build_layer_mesh(layer, &map.tilesets);
//!     for group in &mesh.groups {
//!         let _indices = mesh.group_indices(group);
//!         // bind `group.name` as texture, draw `_indices` over `mesh.vertices`
//!     }
//! }
//! ```

pub mod builder;
pub mod mesh;

pub use builder::{LayerMeshBuilder, build_layer_mesh};
pub use mesh::{LayerMesh, TextureGroup};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::builder::{LayerMeshBuilder, build_layer_mesh};
    pub use crate::mesh::{LayerMesh, TextureGroup};
}
