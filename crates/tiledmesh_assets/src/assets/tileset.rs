use std::collections::HashMap;

use bevy::math::{URect, UVec2};

use crate::properties::{Properties, TiledColor};

/// A tileset as declared in the map (inline) or in an external `.tsx` file.
///
/// Only single-image (texture atlas) tilesets produce frames. The frame grid
/// is not stored; it is derived from the texture size on demand, see
/// [`TilesetAsset::frame_layout`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TilesetAsset {
    /// First global tile id of this tileset in the map.
    pub first_gid: u32,
    pub name: String,

    /// Tile size in pixels (width, height)
    pub tile_size: UVec2,

    /// Margin around the tileset in the atlas (pixels)
    pub margin: u32,

    /// Spacing between tiles in the atlas (pixels)
    pub spacing: u32,

    /// The spritesheet, if the tileset has one.
    pub image: Option<TilesetImage>,

    /// Path of the external `.tsx` file this tileset was read from.
    pub source: Option<String>,

    /// Custom properties set on the tileset in Tiled
    pub properties: Properties,

    /// Custom properties set on individual tiles
    /// Key: Local tile ID (0-based, NOT GID)
    pub tile_properties: HashMap<u32, Properties>,
}

/// The `<image>` element of a tileset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TilesetImage {
    /// Image path as written in the document.
    pub source: String,
    /// Pixel size, when the document records it.
    pub size: Option<UVec2>,
    /// Color key treated as transparent.
    pub transparent: Option<TiledColor>,
}

/// Frame grid of a tileset for a given texture size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameLayout {
    pub columns: u32,
    pub rows: u32,
}

impl FrameLayout {
    #[inline]
    pub fn count(&self) -> u64 {
        u64::from(self.columns) * u64::from(self.rows)
    }
}

/// One tile-sized cell of the tileset texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub gid: u32,
    /// Index within the tileset (`gid - first_gid`).
    pub local_id: u32,
    /// Source rectangle in texture pixels.
    pub rect: URect,
}

impl TilesetAsset {
    /// Texture size recorded in the document, if any.
    pub fn texture_size(&self) -> Option<UVec2> {
        self.image.as_ref().and_then(|image| image.size)
    }

    /// Image path of the spritesheet, empty when there is none.
    pub fn image_source(&self) -> &str {
        self.image
            .as_ref()
            .map(|image| image.source.as_str())
            .unwrap_or_default()
    }

    /// Number of whole frames that fit in a texture of `texture_size` pixels.
    ///
    /// Per axis: `(texture - 2 * margin + spacing) / (tile + spacing)`, in
    /// integer arithmetic. A texture smaller than its margins holds no frames.
    ///
    /// # Arguments
    /// * `texture_size` - Pixel size of the tileset image
    ///
    /// # Returns
    /// * `FrameLayout` - Frames per row (`columns`) and per column (`rows`)
    pub fn frame_layout(&self, texture_size: UVec2) -> FrameLayout {
        FrameLayout {
            columns: frames_along(texture_size.x, self.tile_size.x, self.margin, self.spacing),
            rows: frames_along(texture_size.y, self.tile_size.y, self.margin, self.spacing),
        }
    }

    /// Iterate every frame, row by row.
    ///
    /// Frame `(row, col)` gets GID `first_gid + row * columns + col`.
    /// Iteration stops early at the first frame whose GID would not fit in
    /// a `u32`.
    pub fn frames(&self, texture_size: UVec2) -> impl Iterator<Item = Frame> + '_ {
        let layout = self.frame_layout(texture_size);

        (0..layout.count()).map_while(move |index| {
            let local_id = u32::try_from(index).ok()?;
            let gid = self.first_gid.checked_add(local_id)?;
            let col = local_id % layout.columns;
            let row = local_id / layout.columns;

            let offset = |cell: u32, tile: u32| {
                let stride = u64::from(tile) + u64::from(self.spacing);
                let min = u64::from(self.margin) + u64::from(cell) * stride;
                u32::try_from(min).ok()
            };
            let min = UVec2::new(offset(col, self.tile_size.x)?, offset(row, self.tile_size.y)?);
            let max = UVec2::new(
                min.x.checked_add(self.tile_size.x)?,
                min.y.checked_add(self.tile_size.y)?,
            );

            Some(Frame {
                gid,
                local_id,
                rect: URect::from_corners(min, max),
            })
        })
    }

    /// Custom properties of a tile, by local id.
    pub fn tile_properties(&self, local_id: u32) -> Option<&Properties> {
        self.tile_properties.get(&local_id)
    }
}

fn frames_along(texture: u32, tile: u32, margin: u32, spacing: u32) -> u32 {
    let stride = u64::from(tile) + u64::from(spacing);
    if stride == 0 {
        return 0;
    }
    let usable = (u64::from(texture) + u64::from(spacing)).saturating_sub(2 * u64::from(margin));
    u32::try_from(usable / stride).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tileset(tile: u32, margin: u32, spacing: u32) -> TilesetAsset {
        TilesetAsset {
            first_gid: 1,
            name: "terrain".to_string(),
            tile_size: UVec2::splat(tile),
            margin,
            spacing,
            ..Default::default()
        }
    }

    #[test]
    fn test_plain_grid() {
        let layout = tileset(32, 0, 0).frame_layout(UVec2::new(256, 256));
        assert_eq!(layout, FrameLayout { columns: 8, rows: 8 });
        assert_eq!(layout.count(), 64);
    }

    #[test]
    fn test_margin_and_spacing() {
        let set = tileset(30, 2, 1);
        let layout = set.frame_layout(UVec2::new(256, 256));
        assert_eq!(layout.columns, 8);

        let frames: Vec<Frame> = set.frames(UVec2::new(256, 256)).collect();
        assert_eq!(frames.len(), 64);
        assert_eq!(frames[0].rect, URect::new(2, 2, 32, 32));
        assert_eq!(frames[1].rect.min, UVec2::new(33, 2));
        assert_eq!(frames[8].gid, 9);
        assert_eq!(frames[8].rect.min, UVec2::new(2, 33));
    }

    #[test]
    fn test_texture_smaller_than_margins() {
        let layout = tileset(16, 20, 0).frame_layout(UVec2::new(32, 32));
        assert_eq!(layout.count(), 0);
        assert_eq!(tileset(0, 0, 0).frame_layout(UVec2::splat(64)).count(), 0);
    }

    #[test]
    fn test_huge_geometry_does_not_overflow() {
        let layout = tileset(u32::MAX, u32::MAX, u32::MAX).frame_layout(UVec2::splat(u32::MAX));
        assert_eq!(layout.count(), 0);

        let set = tileset(1, 0, u32::MAX);
        assert_eq!(set.frame_layout(UVec2::splat(u32::MAX)).count(), 1);

        // GIDs stop at u32::MAX instead of wrapping
        let mut set = tileset(1, 0, 0);
        set.first_gid = u32::MAX - 2;
        let gids: Vec<u32> = set.frames(UVec2::new(4, 2)).map(|f| f.gid).collect();
        assert_eq!(gids, vec![u32::MAX - 2, u32::MAX - 1, u32::MAX]);
    }

    #[test]
    fn test_gids_are_contiguous() {
        let mut set = tileset(16, 0, 0);
        set.first_gid = 100;
        let gids: Vec<u32> = set.frames(UVec2::new(48, 32)).map(|f| f.gid).collect();
        assert_eq!(gids, (100..106).collect::<Vec<_>>());
    }
}
