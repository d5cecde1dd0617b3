//! # tiledmesh
//!
//! TMX tile-map decoding and geometry synthesis.
//!
//! This is a unified meta-crate that combines all `tiledmesh_*` sub-crates with convenient
//! feature flags.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tiledmesh::prelude::*;
//!
//! let map = load_map("assets/level1.tmx", &LoadConfig::default())?;
//!
//! for layer in map.tile_layers() {
//!     let mesh = build_layer_mesh(layer, &map.tilesets);
//!     println!("{}: {} quads", mesh.name, mesh.quad_count());
//! }
//!
//! for (layer, colliders) in build_map_colliders(&map, &ColliderConfig::default()) {
//!     println!("{layer}: {} colliders", colliders.len());
//! }
//! # Ok::<(), LoadError>(())
//! ```
//!
//! ## Features
//!
//! - **default**: Includes `mesh` and `collider`
//! - **mesh**: Tile layer vertex/UV/index buffers grouped per texture
//! - **collider**: Collision geometry from object layers
//!
//! ## Architecture
//!
//! This crate is organized into 3 layers:
//!
//! - **Layer 1** ([`assets`]): TMX/TSX parsing and tile data decoding
//! - **Layer 2** ([`core`]): GID resolution, frame layout and layer ordering
//! - **Layer 3** (optional): Geometry builders over the resolved map
//!   - [`mesh`]: Batched quad buffers for tile layers
//!   - [`collider`]: Primitive shapes and extruded meshes for objects
//!
//! ## Using Individual Crates
//!
//! The sub-crates can be used directly for more control, for example to
//! inspect the parsed document before resolving it:
//!
//! ```rust,no_run
//! use tiledmesh_assets::prelude::*;
//! use tiledmesh_core::prelude::*;
//!
//! let asset = TiledMapLoader::new().load_tmx_map("map.tmx").unwrap();
//! for tileset in &asset.tilesets {
//!     println!("{} starts at {}", tileset.name, tileset.first_gid);
//! }
//! let map = Map::from_asset(&asset, &LoadConfig::default()).unwrap();
//! ```

mod load;

pub use load::{LoadError, load_map, load_map_from_str, load_map_with};

// Re-export sub-crates for advanced usage
pub use tiledmesh_assets as assets;
pub use tiledmesh_core as core;

#[cfg(feature = "mesh")]
pub use tiledmesh_mesh as mesh;

#[cfg(feature = "collider")]
pub use tiledmesh_collider as collider;

pub use tiledmesh_core::{LayerZConfig, LoadConfig, Map, MapBuildError};

/// Unified prelude for tiledmesh
///
/// This module re-exports the most commonly used types from all sub-crates
/// for convenient access.
pub mod prelude {
    // Core functionality (always available)
    pub use crate::assets::prelude::*;
    pub use crate::core::prelude::*;
    pub use crate::load::{LoadError, load_map, load_map_from_str, load_map_with};

    // Layer 3 builders (feature-gated)
    #[cfg(feature = "mesh")]
    pub use crate::mesh::prelude::*;

    #[cfg(feature = "collider")]
    pub use crate::collider::prelude::*;
}
