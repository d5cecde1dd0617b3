use std::path::Path;

use bevy::log::{debug, info};
use bevy::math::{Rect, Vec2};
use roxmltree::{Document, Node};
use thiserror::Error;

use crate::assets::{
    map::{LayerAsset, ObjectLayerAsset, Orientation, TileLayerAsset, TiledMapAsset},
    object::{MapObject, ObjectShape},
    tileset::TilesetAsset,
};
use crate::decode::{Compression, DataContent, DecodeError, Encoding, LayerData};
use crate::loaders::tileset::{parse_tileset_element, parse_tsx};
use crate::loaders::{
    FilesystemReader, ResourceReader, attribute, attribute_opt, attribute_or, child, children,
    flag_or, parse_properties, resolve_relative_path,
};

/// Loader for Tiled maps (.tmx files)
///
/// Parses the document, decodes every tile layer's `<data>` and pulls in
/// external tilesets through the configured [`ResourceReader`].
///
/// # Example
/// ```no_run
/// use tiledmesh_assets::prelude::*;
///
/// let loader = TiledMapLoader::new();
/// let map = loader.load_tmx_map("assets/maps/level1.tmx").unwrap();
/// println!("{} layers", map.layers.len());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TiledMapLoader<R = FilesystemReader> {
    pub reader: R,
}

#[derive(Debug, Error)]
pub enum MapLoaderError {
    #[error("Malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("<{element}> is missing required attribute '{attribute}'")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    #[error("<{element}> has invalid {attribute}={value:?}")]
    InvalidAttribute {
        element: String,
        attribute: &'static str,
        value: String,
    },

    #[error("<{parent}> is missing required <{element}>")]
    MissingElement {
        parent: String,
        element: &'static str,
    },

    #[error("Unsupported map feature: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to decode layer '{name}': {source}")]
    Layer {
        name: String,
        #[source]
        source: DecodeError,
    },

    #[error("Failed to load tileset {path}: {error}")]
    Tileset {
        path: String,
        #[source]
        error: Box<MapLoaderError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("External resources are disabled, cannot read {0}")]
    ExternalResourcesDisabled(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Expected <{expected}> root element, found <{found}>")]
    UnexpectedRoot {
        expected: &'static str,
        found: String,
    },
}

impl TiledMapLoader<FilesystemReader> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: ResourceReader> TiledMapLoader<R> {
    /// Create a loader that fetches external tilesets through `reader`.
    pub fn with_reader(reader: R) -> Self {
        Self { reader }
    }

    /// Read and parse a map file through the loader's reader.
    ///
    /// External tilesets are resolved relative to the map's directory.
    pub fn load_tmx_map(&self, path: impl AsRef<Path>) -> Result<TiledMapAsset, MapLoaderError> {
        let path = path.as_ref();
        let text = self.reader.read_text(path)?;
        self.parse_tmx_map(&text, path.parent())
    }

    /// Parse a TMX document held in memory.
    ///
    /// # Arguments
    /// * `text` - The TMX document
    /// * `base_dir` - Directory external tileset references are relative to
    ///
    /// # Returns
    /// * `Ok(TiledMapAsset)` - The parsed map with decoded tile layers
    /// * `Err(MapLoaderError)` - The first error encountered
    pub fn parse_tmx_map(
        &self,
        text: &str,
        base_dir: Option<&Path>,
    ) -> Result<TiledMapAsset, MapLoaderError> {
        let document = Document::parse(text)?;
        let root = document.root_element();
        if root.tag_name().name() != "map" {
            return Err(MapLoaderError::UnexpectedRoot {
                expected: "map",
                found: root.tag_name().name().to_string(),
            });
        }

        let orientation_attr = root.attribute("orientation").unwrap_or("orthogonal");
        let orientation = Orientation::from_attribute(orientation_attr).ok_or_else(|| {
            MapLoaderError::UnsupportedFormat(format!("orientation '{orientation_attr}'"))
        })?;

        if attribute_or(&root, "infinite", 0u8)? != 0 {
            return Err(MapLoaderError::UnsupportedFormat(
                "infinite maps".to_string(),
            ));
        }

        let mut map = TiledMapAsset {
            version: attribute_or(&root, "version", String::new())?,
            orientation,
            width: attribute(&root, "width")?,
            height: attribute(&root, "height")?,
            tile_width: attribute(&root, "tilewidth")?,
            tile_height: attribute(&root, "tileheight")?,
            properties: parse_properties(&root),
            tilesets: Vec::new(),
            layers: Vec::new(),
        };

        let map_size = (map.width, map.height);
        for node in root.children().filter(Node::is_element) {
            match node.tag_name().name() {
                "tileset" => {
                    let tileset = self.parse_map_tileset(&node, base_dir)?;
                    map.tilesets.push(tileset);
                }
                "layer" | "objectgroup" | "group" => {
                    collect_layers(&node, map_size, &mut map.layers)?;
                }
                other => {
                    debug!("Skipping unsupported map element <{}>", other);
                }
            }
        }

        map.tilesets.sort_by_key(|tileset| tileset.first_gid);

        info!(
            "Loaded {}x{} map with {} tilesets and {} layers",
            map.width,
            map.height,
            map.tilesets.len(),
            map.layers.len()
        );

        Ok(map)
    }

    fn parse_map_tileset(
        &self,
        node: &Node,
        base_dir: Option<&Path>,
    ) -> Result<TilesetAsset, MapLoaderError> {
        let first_gid: u32 = attribute(node, "firstgid")?;

        let Some(source) = node.attribute("source") else {
            return parse_tileset_element(node, first_gid);
        };

        // External tileset: the inline firstgid wins over anything in the file
        let path = resolve_relative_path(base_dir, source)?;
        let wrap = |error: MapLoaderError| MapLoaderError::Tileset {
            path: path.display().to_string(),
            error: Box::new(error),
        };

        let text = self.reader.read_text(&path).map_err(wrap)?;
        parse_tsx(&text, first_gid, Some(source.to_string())).map_err(wrap)
    }
}

/// Collect the layers under `node`, flattening `<group>` elements in
/// document order.
fn collect_layers(
    node: &Node,
    map_size: (u32, u32),
    out: &mut Vec<LayerAsset>,
) -> Result<(), MapLoaderError> {
    match node.tag_name().name() {
        "layer" => out.push(LayerAsset::Tiles(parse_tile_layer(node, map_size)?)),
        "objectgroup" => out.push(LayerAsset::Objects(parse_object_layer(node)?)),
        "group" => {
            for child in node.children().filter(Node::is_element) {
                collect_layers(&child, map_size, out)?;
            }
        }
        other => debug!("Skipping unsupported layer <{}>", other),
    }
    Ok(())
}

fn parse_tile_layer(
    node: &Node,
    (map_width, map_height): (u32, u32),
) -> Result<TileLayerAsset, MapLoaderError> {
    let name: String = attribute_or(node, "name", String::new())?;
    let width: u32 = attribute_or(node, "width", map_width)?;
    let height: u32 = attribute_or(node, "height", map_height)?;

    let data_node = child(node, "data").ok_or_else(|| MapLoaderError::MissingElement {
        parent: "layer".to_string(),
        element: "data",
    })?;

    let layer_error = |source: DecodeError| MapLoaderError::Layer {
        name: name.clone(),
        source,
    };

    let encoding: Encoding = data_node
        .attribute("encoding")
        .unwrap_or_default()
        .parse()
        .map_err(layer_error)?;
    let compression: Compression = data_node
        .attribute("compression")
        .unwrap_or_default()
        .parse()
        .map_err(layer_error)?;

    if child(&data_node, "chunk").is_some() {
        return Err(MapLoaderError::UnsupportedFormat(
            "chunked tile data".to_string(),
        ));
    }

    let content = match encoding {
        Encoding::None => DataContent::Tiles(
            children(&data_node, "tile")
                .map(|tile| tile.attribute("gid").unwrap_or_default().to_string())
                .collect(),
        ),
        Encoding::Csv | Encoding::Base64 => {
            DataContent::Text(data_node.text().unwrap_or_default().to_string())
        }
    };

    let data = LayerData {
        encoding,
        compression,
        content,
    };
    let gids = data.decode(width, height).map_err(layer_error)?;

    debug!(
        "Decoded tile layer '{}' ({}x{}, {:?}/{:?})",
        name, width, height, encoding, compression
    );

    Ok(TileLayerAsset {
        id: attribute_or(node, "id", 0)?,
        width,
        height,
        visible: flag_or(node, "visible", true),
        opacity: attribute_or(node, "opacity", 1.0)?,
        gids,
        properties: parse_properties(node),
        name,
    })
}

fn parse_object_layer(node: &Node) -> Result<ObjectLayerAsset, MapLoaderError> {
    let objects = children(node, "object")
        .map(|object| parse_object(&object))
        .collect::<Result<Vec<_>, _>>()?;

    let layer = ObjectLayerAsset {
        id: attribute_or(node, "id", 0)?,
        name: attribute_or(node, "name", String::new())?,
        visible: flag_or(node, "visible", true),
        opacity: attribute_or(node, "opacity", 1.0)?,
        objects,
        properties: parse_properties(node),
    };

    debug!(
        "Parsed object layer '{}' ({} objects)",
        layer.name,
        layer.objects.len()
    );

    Ok(layer)
}

fn parse_object(node: &Node) -> Result<MapObject, MapLoaderError> {
    let x: f32 = attribute_or(node, "x", 0.0)?;
    let y: f32 = attribute_or(node, "y", 0.0)?;
    let width: f32 = attribute_or(node, "width", 0.0)?;
    let height: f32 = attribute_or(node, "height", 0.0)?;
    let gid: Option<u32> = attribute_opt(node, "gid")?;

    // Tile objects are anchored at their bottom-left corner
    let bounds = if gid.is_some() {
        Rect::new(x, y - height, x + width, y)
    } else {
        Rect::new(x, y, x + width, y + height)
    };

    let shape = if child(node, "ellipse").is_some() {
        ObjectShape::Ellipse
    } else if let Some(polygon) = child(node, "polygon") {
        ObjectShape::Polygon(parse_points(&polygon)?)
    } else if let Some(polyline) = child(node, "polyline") {
        ObjectShape::Polyline(parse_points(&polyline)?)
    } else {
        ObjectShape::Box
    };

    // Tiled 1.9 renamed `type` to `class`
    let user_type = node
        .attribute("type")
        .or_else(|| node.attribute("class"))
        .unwrap_or_default()
        .to_string();

    Ok(MapObject {
        id: attribute_or(node, "id", 0)?,
        name: attribute_or(node, "name", String::new())?,
        user_type,
        bounds,
        rotation: attribute_or(node, "rotation", 0.0)?,
        shape,
        gid,
        visible: flag_or(node, "visible", true),
        properties: parse_properties(node),
    })
}

/// Parse a `points="x,y x,y ..."` list.
fn parse_points(node: &Node) -> Result<Vec<Vec2>, MapLoaderError> {
    let raw: String = attribute(node, "points")?;
    let invalid = || MapLoaderError::InvalidAttribute {
        element: node.tag_name().name().to_string(),
        attribute: "points",
        value: raw.clone(),
    };

    raw.split_whitespace()
        .map(|pair| {
            let (x, y) = pair.split_once(',').ok_or_else(invalid)?;
            let x: f32 = x.trim().parse().map_err(|_| invalid())?;
            let y: f32 = y.trim().parse().map_err(|_| invalid())?;
            Ok(Vec2::new(x, y))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;

    use crate::loaders::NoExternalResources;

    use super::*;

    fn parse(text: &str) -> Result<TiledMapAsset, MapLoaderError> {
        TiledMapLoader::with_reader(NoExternalResources).parse_tmx_map(text, None)
    }

    const CSV_MAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<map version="1.10" orientation="orthogonal" width="3" height="2" tilewidth="16" tileheight="16" infinite="0">
 <properties>
  <property name="music" value="cave.ogg"/>
 </properties>
 <tileset firstgid="1" name="terrain" tilewidth="16" tileheight="16">
  <image source="terrain.png" width="64" height="64"/>
 </tileset>
 <layer id="1" name="ground" width="3" height="2">
  <data encoding="csv">
1,2,3,
4,0,2147483649
</data>
 </layer>
 <objectgroup id="2" name="walls">
  <object id="7" name="ramp" type="slope" x="32" y="16">
   <polyline points="0,0 16,-8 32,-8"/>
  </object>
  <object id="8" x="0" y="0" width="16" height="32">
   <ellipse/>
  </object>
  <object id="9" gid="3" x="16" y="48" width="16" height="16"/>
 </objectgroup>
</map>
"#;

    #[test]
    fn test_parse_csv_map() {
        let map = parse(CSV_MAP).unwrap();

        assert_eq!(map.version, "1.10");
        assert_eq!(map.orientation, Orientation::Orthogonal);
        assert_eq!((map.width, map.height), (3, 2));
        assert_eq!(map.properties.get_string("music"), "cave.ogg");
        assert_eq!(map.tilesets.len(), 1);
        assert_eq!(map.layers.len(), 2);

        let ground = map.tile_layers().next().unwrap();
        assert_eq!(ground.name, "ground");
        assert_eq!(ground.gids, vec![1, 2, 3, 4, 0, 0x8000_0001]);

        let walls = map.object_layers().next().unwrap();
        assert_eq!(walls.objects.len(), 3);

        let ramp = &walls.objects[0];
        assert_eq!(ramp.user_type, "slope");
        assert_eq!(ramp.shape.points().len(), 3);
        assert_eq!(ramp.shape.points()[1], Vec2::new(16.0, -8.0));

        assert_eq!(walls.objects[1].shape, ObjectShape::Ellipse);

        let tile_object = &walls.objects[2];
        assert_eq!(tile_object.bounds, Rect::new(16.0, 32.0, 32.0, 48.0));
        assert_eq!(tile_object.origin(), Vec2::new(16.0, 48.0));
    }

    #[test]
    fn test_xml_tile_nodes() {
        let map = parse(
            r#"<map width="2" height="1" tilewidth="8" tileheight="8">
                 <layer name="a"><data><tile gid="5"/><tile/></data></layer>
               </map>"#,
        )
        .unwrap();
        assert_eq!(map.tile_layers().next().unwrap().gids, vec![5, 0]);
    }

    #[test]
    fn test_groups_are_flattened_in_order() {
        let map = parse(
            r#"<map width="1" height="1" tilewidth="8" tileheight="8">
                 <layer name="a"><data encoding="csv">1</data></layer>
                 <group name="g">
                   <objectgroup name="b"/>
                   <layer name="c"><data encoding="csv">0</data></layer>
                 </group>
                 <imagelayer name="sky"/>
               </map>"#,
        )
        .unwrap();
        let names: Vec<&str> = map.layers.iter().map(LayerAsset::name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_layer_decode_error_names_layer() {
        let err = parse(
            r#"<map width="2" height="1" tilewidth="8" tileheight="8">
                 <layer name="broken"><data encoding="csv">1</data></layer>
               </map>"#,
        )
        .unwrap_err();
        match err {
            MapLoaderError::Layer { name, .. } => assert_eq!(name, "broken"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_encoding_is_reported() {
        let err = parse(
            r#"<map width="1" height="1" tilewidth="8" tileheight="8">
                 <layer name="l"><data encoding="base32">AA</data></layer>
               </map>"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            MapLoaderError::Layer {
                source: DecodeError::UnsupportedFormat { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_unsupported_orientation_and_root() {
        assert!(matches!(
            parse(
                r#"<map orientation="hexagonal" width="1" height="1" tilewidth="8" tileheight="8"/>"#
            ),
            Err(MapLoaderError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            parse("<tileset/>"),
            Err(MapLoaderError::UnexpectedRoot { expected: "map", .. })
        ));
        assert!(matches!(parse("<map"), Err(MapLoaderError::Xml(_))));
    }

    #[test]
    fn test_missing_map_size() {
        assert!(matches!(
            parse(r#"<map width="1" tilewidth="8" tileheight="8"/>"#),
            Err(MapLoaderError::MissingAttribute { attribute: "height", .. })
        ));
    }

    #[test]
    fn test_external_tileset_through_reader() {
        let mut files = HashMap::new();
        files.insert(
            PathBuf::from("maps/tilesets/a.tsx"),
            r#"<tileset name="a" tilewidth="8" tileheight="8">
                 <image source="a.png" width="16" height="16"/>
               </tileset>"#
                .to_string(),
        );
        let loader = TiledMapLoader::with_reader(&files);
        let map = loader
            .parse_tmx_map(
                r#"<map width="1" height="1" tilewidth="8" tileheight="8">
                     <tileset firstgid="10" source="../maps/tilesets/a.tsx"/>
                   </map>"#,
                Some(Path::new("maps")),
            )
            .unwrap();

        assert_eq!(map.tilesets[0].first_gid, 10);
        assert_eq!(map.tilesets[0].name, "a");
        assert_eq!(map.tilesets[0].source.as_deref(), Some("../maps/tilesets/a.tsx"));
    }

    #[test]
    fn test_external_tileset_disabled() {
        let err = parse(
            r#"<map width="1" height="1" tilewidth="8" tileheight="8">
                 <tileset firstgid="1" source="a.tsx"/>
               </map>"#,
        )
        .unwrap_err();
        match err {
            MapLoaderError::Tileset { path, error } => {
                assert_eq!(path, "a.tsx");
                assert!(matches!(*error, MapLoaderError::ExternalResourcesDisabled(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
