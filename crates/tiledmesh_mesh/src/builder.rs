//! Converts a resolved `TileLayer` into batched quad buffers.

use bevy::log::{debug, warn};
use bevy::math::{UVec2, Vec3};
use tiledmesh_core::prelude::{ResolvedTileset, TileLayer};

use crate::mesh::{LayerMesh, TextureGroup};

/// Quad triangles, relative to the quad's first vertex.
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 1, 3];

/// Builds [`LayerMesh`] buffers from Layer 2's `TileLayer`.
///
/// Layout, in tile units with y pointing up (document rows go down):
///
/// ```text
/// v0 (x, -y) ------- v1 (x + sx, -y)
///  |                   |
/// v2 (x, -y - sy) -- v3 (x + sx, -y - sy)
/// ```
///
/// where `(sx, sy)` is the tile's source size over its tileset's tile size.
pub struct LayerMeshBuilder;

impl LayerMeshBuilder {
    /// Build mesh buffers for a tile layer.
    ///
    /// Cells are visited column by column (`x` outer, `y` inner). Empty cells
    /// add nothing, so an empty layer gives empty buffers and no groups.
    ///
    /// # Arguments
    ///
    /// * `layer` - The resolved tile layer
    /// * `tilesets` - The map's tilesets (`Map::tilesets`)
    pub fn build(layer: &TileLayer, tilesets: &[ResolvedTileset]) -> LayerMesh {
        let mut mesh = LayerMesh {
            name: layer.name.clone(),
            ..Default::default()
        };

        // Per-group index lists, concatenated once every quad is placed
        let mut group_indices: Vec<Vec<u32>> = Vec::new();

        for (x, y, tile) in layer.iter_tiles() {
            let Some(tileset) = tilesets.get(tile.tileset) else {
                warn!(
                    "Tile at ({}, {}) in layer '{}' references tileset index {} which doesn't exist",
                    x, y, layer.name, tile.tileset
                );
                continue;
            };

            let group =
                Self::group_for(&mut mesh.groups, &mut group_indices, tile.tileset, tileset);
            let base = mesh.vertices.len() as u32;

            let tile_size = tileset.tile_size().max(UVec2::ONE).as_vec2();
            let scale = tile.size().as_vec2() / tile_size;
            let (left, top) = (x as f32, -(y as f32));

            mesh.vertices.extend([
                Vec3::new(left, top, 0.0),
                Vec3::new(left + scale.x, top, 0.0),
                Vec3::new(left, top - scale.y, 0.0),
                Vec3::new(left + scale.x, top - scale.y, 0.0),
            ]);
            mesh.uvs.extend(tile.uv_corners(tileset.texture_size));
            group_indices[group].extend(QUAD_INDICES.iter().map(|i| base + i));
        }

        for (group, indices) in mesh.groups.iter_mut().zip(group_indices) {
            let start = mesh.indices.len();
            mesh.indices.extend(indices);
            group.index_range = start..mesh.indices.len();
        }

        debug!(
            "Built mesh for layer '{}': {} quads in {} texture groups",
            layer.name,
            mesh.quad_count(),
            mesh.groups.len()
        );

        mesh
    }

    /// Find or append the group for a tileset's texture.
    ///
    /// Tilesets sharing one image share a group.
    fn group_for(
        groups: &mut Vec<TextureGroup>,
        group_indices: &mut Vec<Vec<u32>>,
        tileset_index: usize,
        tileset: &ResolvedTileset,
    ) -> usize {
        let name = tileset.texture_name();
        if let Some(found) = groups.iter().position(|group| group.name == name) {
            return found;
        }

        groups.push(TextureGroup {
            name: name.to_string(),
            tileset: tileset_index,
            index_range: 0..0,
        });
        group_indices.push(Vec::new());
        groups.len() - 1
    }
}

/// Build mesh buffers for a tile layer. Shorthand for [`LayerMeshBuilder::build`].
pub fn build_layer_mesh(layer: &TileLayer, tilesets: &[ResolvedTileset]) -> LayerMesh {
    LayerMeshBuilder::build(layer, tilesets)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bevy::math::{URect, Vec2};
    use tiledmesh_assets::prelude::{Properties, TilesetAsset, TilesetImage};
    use tiledmesh_core::prelude::{FlipState, Tile};

    use super::*;

    fn tileset(source: &str) -> ResolvedTileset {
        let tileset = TilesetAsset {
            first_gid: 1,
            name: source.to_string(),
            tile_size: UVec2::splat(16),
            image: Some(TilesetImage {
                source: source.to_string(),
                size: Some(UVec2::new(64, 16)),
                transparent: None,
            }),
            ..Default::default()
        };
        ResolvedTileset {
            layout: tileset.frame_layout(UVec2::new(64, 16)),
            texture_size: UVec2::new(64, 16),
            tileset,
        }
    }

    fn tile(gid: u32, tileset: usize, flip: FlipState) -> Arc<Tile> {
        Arc::new(Tile {
            gid,
            local_id: gid - 1,
            source: URect::new((gid - 1) * 16, 0, gid * 16, 16),
            tileset,
            flip,
            properties: Properties::default(),
        })
    }

    #[test]
    fn test_four_tiles_in_three_by_two() {
        let mut layer = TileLayer::empty("ground", 3, 2);
        layer.set(0, 0, Some(tile(1, 0, FlipState::None)));
        layer.set(2, 0, Some(tile(2, 0, FlipState::None)));
        layer.set(1, 1, Some(tile(3, 0, FlipState::None)));
        layer.set(2, 1, Some(tile(4, 0, FlipState::None)));

        let mesh = build_layer_mesh(&layer, &[tileset("a.png")]);

        assert_eq!(mesh.vertices.len(), 16);
        assert_eq!(mesh.uvs.len(), 16);
        assert_eq!(mesh.indices.len(), 24);
        assert_eq!(mesh.quad_count(), 4);
        assert_eq!(mesh.groups.len(), 1);
        assert_eq!(mesh.groups[0].index_range, 0..24);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn test_quad_layout_and_winding() {
        let mut layer = TileLayer::empty("ground", 2, 2);
        layer.set(1, 1, Some(tile(2, 0, FlipState::None)));

        let mesh = build_layer_mesh(&layer, &[tileset("a.png")]);

        assert_eq!(
            mesh.vertices,
            vec![
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(2.0, -1.0, 0.0),
                Vec3::new(1.0, -2.0, 0.0),
                Vec3::new(2.0, -2.0, 0.0),
            ]
        );
        assert_eq!(mesh.indices, vec![0, 1, 2, 2, 1, 3]);
        assert_eq!(
            mesh.uvs,
            vec![
                Vec2::new(0.25, 1.0),
                Vec2::new(0.5, 1.0),
                Vec2::new(0.25, 0.0),
                Vec2::new(0.5, 0.0),
            ]
        );
    }

    #[test]
    fn test_flipped_tile_swaps_uvs() {
        let mut layer = TileLayer::empty("ground", 1, 1);
        layer.set(0, 0, Some(tile(1, 0, FlipState::Horizontal)));

        let mesh = build_layer_mesh(&layer, &[tileset("a.png")]);
        assert_eq!(mesh.uvs[0], Vec2::new(0.25, 1.0));
        assert_eq!(mesh.uvs[1], Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_indices_grouped_per_texture() {
        let mut layer = TileLayer::empty("mixed", 2, 2);
        // Column-major visit order: (0,0) b, (0,1) a, (1,0) b, (1,1) a
        layer.set(0, 0, Some(tile(1, 1, FlipState::None)));
        layer.set(0, 1, Some(tile(1, 0, FlipState::None)));
        layer.set(1, 0, Some(tile(2, 1, FlipState::None)));
        layer.set(1, 1, Some(tile(2, 0, FlipState::None)));

        let mesh = build_layer_mesh(&layer, &[tileset("a.png"), tileset("b.png")]);

        assert_eq!(mesh.groups.len(), 2);
        assert_eq!(mesh.groups[0].name, "b.png");
        assert_eq!(mesh.groups[0].tileset, 1);
        assert_eq!(mesh.groups[0].index_range, 0..12);
        assert_eq!(mesh.groups[1].name, "a.png");
        assert_eq!(mesh.groups[1].index_range, 12..24);

        // Quads 0 and 2 are texture b, quads 1 and 3 are texture a
        assert_eq!(
            mesh.group_indices(&mesh.groups[0]),
            &[0, 1, 2, 2, 1, 3, 8, 9, 10, 10, 9, 11]
        );
        assert_eq!(
            mesh.group_indices(&mesh.groups[1]),
            &[4, 5, 6, 6, 5, 7, 12, 13, 14, 14, 13, 15]
        );
    }

    #[test]
    fn test_empty_layer() {
        let layer = TileLayer::empty("nothing", 4, 4);
        let mesh = build_layer_mesh(&layer, &[tileset("a.png")]);
        assert!(mesh.is_empty());
        assert!(mesh.uvs.is_empty());
        assert!(mesh.indices.is_empty());
        assert!(mesh.groups.is_empty());
    }

    #[test]
    fn test_missing_tileset_is_skipped() {
        let mut layer = TileLayer::empty("ground", 2, 1);
        layer.set(0, 0, Some(tile(1, 5, FlipState::None)));
        layer.set(1, 0, Some(tile(1, 0, FlipState::None)));

        let mesh = build_layer_mesh(&layer, &[tileset("a.png")]);
        assert_eq!(mesh.quad_count(), 1);
        assert_eq!(mesh.vertices[0], Vec3::new(1.0, 0.0, 0.0));
    }
}
