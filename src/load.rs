//! One-call loading: parse a TMX document and resolve it into a [`Map`].

use std::path::Path;

use bevy::log::info;
use thiserror::Error;
use tiledmesh_assets::prelude::{
    MapLoaderError, NoExternalResources, ResourceReader, TiledMapLoader,
};
use tiledmesh_core::prelude::{LoadConfig, Map, MapBuildError, TextureSizes};

/// Errors from [`load_map`] and friends.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The document could not be read, parsed or decoded
    #[error(transparent)]
    Loader(#[from] MapLoaderError),
    /// The document parsed but could not be resolved
    #[error(transparent)]
    Build(#[from] MapBuildError),
}

/// Load and resolve a `.tmx` file from disk.
///
/// External tilesets are read relative to the map's directory. Tileset images
/// must declare their size in the document; use [`load_map_with`] to supply
/// sizes from the host.
///
/// # Example
///
/// ```rust,no_run
/// use tiledmesh::{LoadConfig, load_map};
///
/// let map = load_map("assets/level1.tmx", &LoadConfig::default())?;
/// println!("{} layers", map.layers.len());
/// # Ok::<(), tiledmesh::LoadError>(())
/// ```
pub fn load_map(path: impl AsRef<Path>, config: &LoadConfig) -> Result<Map, LoadError> {
    let path = path.as_ref();
    let asset = TiledMapLoader::new().load_tmx_map(path)?;
    let map = Map::from_asset(&asset, config)?;

    info!(
        "Loaded map {}: {}x{} tiles, {} layers",
        path.display(),
        map.width,
        map.height,
        map.layers.len()
    );

    Ok(map)
}

/// Parse and resolve a TMX document held in memory.
///
/// # Arguments
///
/// * `text` - The TMX XML
/// * `loader` - Decides how external tilesets are fetched
/// * `base_dir` - Directory external tileset paths are relative to
/// * `config` - Tile sharing and z-ordering settings
/// * `textures` - Texture sizes for images that don't declare one
pub fn load_map_with<R: ResourceReader>(
    text: &str,
    loader: &TiledMapLoader<R>,
    base_dir: Option<&Path>,
    config: &LoadConfig,
    textures: &impl TextureSizes,
) -> Result<Map, LoadError> {
    let asset = loader.parse_tmx_map(text, base_dir)?;
    Ok(Map::from_asset_with_textures(&asset, config, textures)?)
}

/// Parse and resolve a self-contained TMX document.
///
/// External tileset references fail with
/// [`MapLoaderError::ExternalResourcesDisabled`].
pub fn load_map_from_str(text: &str, config: &LoadConfig) -> Result<Map, LoadError> {
    let asset = TiledMapLoader::with_reader(NoExternalResources).parse_tmx_map(text, None)?;
    Ok(Map::from_asset(&asset, config)?)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use bevy::math::UVec2;

    use super::*;

    const MAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<map version="1.0" orientation="orthogonal" width="2" height="1" tilewidth="16" tileheight="16">
 <tileset firstgid="1" name="tiles" tilewidth="16" tileheight="16">
  <image source="tiles.png"/>
 </tileset>
 <layer name="ground" width="2" height="1">
  <data encoding="csv">1,2</data>
 </layer>
</map>"#;

    #[test]
    fn test_missing_texture_size_is_build_error() {
        let result = load_map_from_str(MAP, &LoadConfig::default());
        assert!(matches!(
            result,
            Err(LoadError::Build(MapBuildError::MissingTextureSize { .. }))
        ));
    }

    #[test]
    fn test_host_texture_sizes() {
        let textures = HashMap::from([("tiles.png".to_string(), UVec2::new(32, 16))]);
        let loader = TiledMapLoader::with_reader(NoExternalResources);

        let map = load_map_with(MAP, &loader, None, &LoadConfig::default(), &textures)
            .expect("map should load");
        assert_eq!(map.tiles.len(), 2);
        assert_eq!(map.tile_layers().count(), 1);
    }

    #[test]
    fn test_xml_error_is_loader_error() {
        let result = load_map_from_str("<map", &LoadConfig::default());
        assert!(matches!(result, Err(LoadError::Loader(MapLoaderError::Xml(_)))));
    }
}
