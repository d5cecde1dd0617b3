//! Mesh buffer types.

use std::ops::Range;

use bevy::math::{Vec2, Vec3};

/// Draw buffers for one tile layer.
///
/// One quad (4 vertices, 6 indices) per non-empty cell. Indices are grouped
/// by texture: every [`TextureGroup`] owns a contiguous slice of `indices`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerMesh {
    /// Layer name, for labeling the output
    pub name: String,
    pub vertices: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
    /// Ordered by first appearance in the layer
    pub groups: Vec<TextureGroup>,
}

/// The indices drawn with one texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureGroup {
    /// Texture (tileset image) path
    pub name: String,
    /// Index of the tileset in `Map::tilesets`
    pub tileset: usize,
    /// Range into `LayerMesh::indices`
    pub index_range: Range<usize>,
}

impl LayerMesh {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Number of tile quads in the mesh.
    #[inline]
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// The index slice of one texture group.
    pub fn group_indices(&self, group: &TextureGroup) -> &[u32] {
        self.indices
            .get(group.index_range.clone())
            .unwrap_or_default()
    }
}
