//! Collider geometry for `tiledmesh`.
//!
//! This crate turns the objects of resolved object layers into collision
//! geometry: primitive descriptors for boxes and ellipses, extruded wall
//! meshes for polygons and polylines.
//!
//! # Features
//!
//! - **Primitive Shapes**: Box and tile objects become boxes, ellipses become capsules along Z
//! - **Extruded Outlines**: Polygons (closed) and polylines (open) become two-triangle walls per segment
//! - **Facing Control**: Walls face outward by default, or inward with `inner_collision`
//! - **Per-Object Failures**: A degenerate object fails alone; the rest of the layer still builds
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tiledmesh_assets::prelude::*;
//! use tiledmesh_core::prelude::*;
//! use tiledmesh_collider::prelude::*;
//!
//! let asset = TiledMapLoader::new().load_tmx_map("map.tmx").unwrap();
//! let map = Map::from_asset(&asset, &LoadConfig::default()).unwrap();
//!
//! for (layer, colliders) in build_map_colliders(&map, &ColliderConfig::default()) {
//!     for collider in colliders.into_iter().flatten() {
//!         println!("{layer}: {} -> {:?}", collider.name, collider.geometry);
//!     }
//! }
//! ```

pub mod config;
pub mod objects;
pub mod shapes;

pub mod prelude {
    //! Common imports for `tiledmesh_collider`.

    pub use crate::config::ColliderConfig;
    pub use crate::objects::{ObjectCollider, build_layer_colliders, build_map_colliders};
    pub use crate::shapes::{ColliderError, ColliderGeometry, ColliderMesh, build_collider};
}

// Re-export at crate root for convenience
pub use config::ColliderConfig;
pub use objects::{ObjectCollider, build_layer_colliders, build_map_colliders};
pub use shapes::{ColliderError, ColliderGeometry, ColliderMesh, build_collider};
