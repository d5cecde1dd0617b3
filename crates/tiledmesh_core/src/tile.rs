//! Resolved tiles.
//!
//! A [`Tile`] is one frame of a tileset plus its flip-state. Tiles are shared
//! through `Arc<Tile>`: every cell showing the same canonical tile points at
//! the same allocation, so identity is `Arc::ptr_eq`.

use bevy::math::{URect, UVec2, Vec2};
use tiledmesh_assets::prelude::Properties;

/// Mirror state of a tile instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlipState {
    #[default]
    None,
    Horizontal,
    Vertical,
    Both,
}

impl FlipState {
    pub fn from_flags(horizontal: bool, vertical: bool) -> Self {
        match (horizontal, vertical) {
            (false, false) => FlipState::None,
            (true, false) => FlipState::Horizontal,
            (false, true) => FlipState::Vertical,
            (true, true) => FlipState::Both,
        }
    }

    #[inline]
    pub fn is_horizontal(self) -> bool {
        matches!(self, FlipState::Horizontal | FlipState::Both)
    }

    #[inline]
    pub fn is_vertical(self) -> bool {
        matches!(self, FlipState::Vertical | FlipState::Both)
    }
}

/// One frame of a tileset, as placed on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    /// Canonical global id (no flip bits)
    pub gid: u32,

    /// Local tile ID within the tileset (0-based)
    pub local_id: u32,

    /// Source rectangle in the tileset texture (pixels)
    pub source: URect,

    /// Index of the owning tileset in `Map::tilesets`
    pub tileset: usize,

    pub flip: FlipState,

    /// Per-tile custom properties (empty if none were set in Tiled)
    pub properties: Properties,
}

impl Tile {
    /// Size of the source rectangle in pixels.
    #[inline]
    pub fn size(&self) -> UVec2 {
        self.source.size()
    }

    /// A copy of this tile with a different flip-state.
    pub fn with_flip(&self, flip: FlipState) -> Tile {
        Tile {
            flip,
            ..self.clone()
        }
    }

    /// Texture coordinates of the quad corners, in quad vertex order:
    /// top-left, top-right, bottom-left, bottom-right.
    ///
    /// V is flipped (`v = 1 - y / texture_height`) so the texture's top row
    /// maps to `v = 1`. The flip-state swaps the matching corners, which
    /// mirrors the image on an unflipped quad.
    ///
    /// # Arguments
    /// * `texture_size` - Pixel size of the owning tileset's texture
    pub fn uv_corners(&self, texture_size: UVec2) -> [Vec2; 4] {
        let texture = texture_size.max(UVec2::ONE).as_vec2();
        let min = self.source.min.as_vec2() / texture;
        let max = self.source.max.as_vec2() / texture;

        let (mut left, mut right) = (min.x, max.x);
        let (mut top, mut bottom) = (1.0 - min.y, 1.0 - max.y);

        if self.flip.is_horizontal() {
            std::mem::swap(&mut left, &mut right);
        }
        if self.flip.is_vertical() {
            std::mem::swap(&mut top, &mut bottom);
        }

        [
            Vec2::new(left, top),
            Vec2::new(right, top),
            Vec2::new(left, bottom),
            Vec2::new(right, bottom),
        ]
    }
}
