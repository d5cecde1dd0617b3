use std::collections::HashMap;

use bevy::log::debug;
use bevy::math::UVec2;
use roxmltree::{Document, Node};

use crate::assets::tileset::{TilesetAsset, TilesetImage};
use crate::loaders::map::MapLoaderError;
use crate::loaders::{attribute, attribute_opt, attribute_or, child, children, parse_properties};
use crate::properties::TiledColor;

/// Parse an external tileset (`.tsx`) document.
///
/// The `first_gid` comes from the referencing map, never from the file.
///
/// # Arguments
/// * `text` - The TSX document
/// * `first_gid` - First GID assigned by the map's `<tileset firstgid>`
/// * `source` - The reference as written in the map, kept on the asset
///
/// # Returns
/// * `Ok(TilesetAsset)` - The parsed tileset
/// * `Err(MapLoaderError)` - Malformed XML, wrong root element or bad attributes
pub fn parse_tsx(
    text: &str,
    first_gid: u32,
    source: Option<String>,
) -> Result<TilesetAsset, MapLoaderError> {
    let document = Document::parse(text)?;
    let root = document.root_element();
    if root.tag_name().name() != "tileset" {
        return Err(MapLoaderError::UnexpectedRoot {
            expected: "tileset",
            found: root.tag_name().name().to_string(),
        });
    }

    let mut tileset = parse_tileset_element(&root, first_gid)?;
    tileset.source = source;
    Ok(tileset)
}

/// Parse the body of a `<tileset>` element (inline or TSX root).
pub(crate) fn parse_tileset_element(
    node: &Node,
    first_gid: u32,
) -> Result<TilesetAsset, MapLoaderError> {
    let name: String = attribute_or(node, "name", String::new())?;
    let tile_size = UVec2::new(
        attribute(node, "tilewidth")?,
        attribute(node, "tileheight")?,
    );

    let image = child(node, "image").map(|image| parse_image(&image)).transpose()?;

    // Per-tile properties keyed by local id
    let mut tile_properties = HashMap::new();
    for tile in children(node, "tile") {
        let local_id: u32 = attribute(&tile, "id")?;
        let properties = parse_properties(&tile);
        if !properties.is_empty() {
            tile_properties.insert(local_id, properties);
        }
    }

    debug!(
        "Parsed tileset '{}' (first gid {}, {} tiles with properties)",
        name,
        first_gid,
        tile_properties.len()
    );

    Ok(TilesetAsset {
        first_gid,
        name,
        tile_size,
        margin: attribute_or(node, "margin", 0)?,
        spacing: attribute_or(node, "spacing", 0)?,
        image,
        source: None,
        properties: parse_properties(node),
        tile_properties,
    })
}

fn parse_image(node: &Node) -> Result<TilesetImage, MapLoaderError> {
    let width: Option<u32> = attribute_opt(node, "width")?;
    let height: Option<u32> = attribute_opt(node, "height")?;
    let transparent: Option<TiledColor> = attribute_opt(node, "trans")?;

    Ok(TilesetImage {
        source: attribute(node, "source")?,
        size: width.zip(height).map(|(w, h)| UVec2::new(w, h)),
        transparent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TSX: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<tileset version="1.10" name="dungeon" tilewidth="16" tileheight="16" spacing="1" margin="2" tilecount="4" columns="2">
 <properties>
  <property name="biome" value="cave"/>
 </properties>
 <image source="../images/dungeon.png" trans="ff00ff" width="37" height="37"/>
 <tile id="3">
  <properties>
   <property name="solid" type="bool" value="true"/>
  </properties>
 </tile>
 <tile id="1"/>
</tileset>
"##;

    #[test]
    fn test_parse_tsx() {
        let tileset = parse_tsx(TSX, 17, Some("dungeon.tsx".to_string())).unwrap();

        assert_eq!(tileset.first_gid, 17);
        assert_eq!(tileset.name, "dungeon");
        assert_eq!(tileset.tile_size, UVec2::splat(16));
        assert_eq!((tileset.margin, tileset.spacing), (2, 1));
        assert_eq!(tileset.source.as_deref(), Some("dungeon.tsx"));
        assert_eq!(tileset.properties.get_string("biome"), "cave");

        let image = tileset.image.as_ref().unwrap();
        assert_eq!(image.source, "../images/dungeon.png");
        assert_eq!(image.size, Some(UVec2::new(37, 37)));
        assert_eq!(
            image.transparent,
            Some(TiledColor {
                r: 255,
                g: 0,
                b: 255,
                a: 255
            })
        );

        // Tile 1 has no properties and is not stored
        assert_eq!(tileset.tile_properties.len(), 1);
        assert!(tileset.tile_properties(3).unwrap().get_bool("solid"));
        assert_eq!(tileset.frame_layout(UVec2::new(37, 37)).count(), 4);
    }

    #[test]
    fn test_wrong_root() {
        let err = parse_tsx("<map/>", 1, None).unwrap_err();
        assert!(matches!(
            err,
            MapLoaderError::UnexpectedRoot { expected: "tileset", .. }
        ));
    }

    #[test]
    fn test_image_without_size() {
        let tileset = parse_tsx(
            r#"<tileset name="a" tilewidth="8" tileheight="8"><image source="a.png"/></tileset>"#,
            1,
            None,
        )
        .unwrap();
        assert_eq!(tileset.texture_size(), None);
        assert_eq!(tileset.image_source(), "a.png");
    }
}
