//! TMX/TSX readers built on `roxmltree`.
//!
//! The loaders never touch the filesystem directly: external tilesets are
//! fetched through a [`ResourceReader`], so hosts can serve them from memory,
//! an archive, or refuse them outright with [`NoExternalResources`].

pub mod map;
pub mod tileset;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use normalize_path::NormalizePath;
use roxmltree::Node;

use crate::properties::{Properties, PropertyType, PropertyValue};
use map::MapLoaderError;

/// Source of external files referenced by a map (`.tsx` tilesets).
pub trait ResourceReader {
    /// Read the whole file at `path` as text.
    fn read_text(&self, path: &Path) -> Result<String, MapLoaderError>;
}

/// Reads external files from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilesystemReader;

impl ResourceReader for FilesystemReader {
    fn read_text(&self, path: &Path) -> Result<String, MapLoaderError> {
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Rejects every external reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExternalResources;

impl ResourceReader for NoExternalResources {
    fn read_text(&self, path: &Path) -> Result<String, MapLoaderError> {
        Err(MapLoaderError::ExternalResourcesDisabled(
            path.display().to_string(),
        ))
    }
}

/// In-memory files keyed by their resolved (normalized) path.
impl ResourceReader for HashMap<PathBuf, String> {
    fn read_text(&self, path: &Path) -> Result<String, MapLoaderError> {
        self.get(path).cloned().ok_or_else(|| {
            MapLoaderError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no in-memory resource at {}", path.display()),
            ))
        })
    }
}

impl<R: ResourceReader + ?Sized> ResourceReader for &R {
    fn read_text(&self, path: &Path) -> Result<String, MapLoaderError> {
        (**self).read_text(path)
    }
}

/// Resolve a path written in a Tiled file against that file's directory.
///
/// Tiled writes paths like `../tilesets/dungeon.tsx`. `Path::join` only
/// concatenates, so the result is normalized to drop `.` and `..` components.
///
/// # Arguments
/// * `base_dir` - Directory of the file containing the reference, if known
/// * `relative_path` - The path as written in the document
///
/// # Returns
/// * `Ok(PathBuf)` - The normalized path
/// * `Err(MapLoaderError::InvalidPath)` - If the reference is empty
pub fn resolve_relative_path(
    base_dir: Option<&Path>,
    relative_path: &str,
) -> Result<PathBuf, MapLoaderError> {
    if relative_path.trim().is_empty() {
        return Err(MapLoaderError::InvalidPath(
            "empty resource reference".to_string(),
        ));
    }

    let relative = relative_path.replace('\\', "/");
    let full_path = match base_dir {
        Some(dir) => dir.join(relative),
        None => PathBuf::from(relative),
    };

    Ok(full_path.normalize())
}

/// Required attribute, parsed.
pub(crate) fn attribute<T: FromStr>(node: &Node, name: &'static str) -> Result<T, MapLoaderError> {
    let value = node
        .attribute(name)
        .ok_or_else(|| MapLoaderError::MissingAttribute {
            element: node.tag_name().name().to_string(),
            attribute: name,
        })?;
    parse_attribute(node, name, value)
}

/// Optional attribute, parsed, with a fallback when absent.
pub(crate) fn attribute_or<T: FromStr>(
    node: &Node,
    name: &'static str,
    alternative: T,
) -> Result<T, MapLoaderError> {
    match node.attribute(name) {
        None => Ok(alternative),
        Some(value) => parse_attribute(node, name, value),
    }
}

/// Optional attribute, parsed. Absent stays `None`, malformed is an error.
pub(crate) fn attribute_opt<T: FromStr>(
    node: &Node,
    name: &'static str,
) -> Result<Option<T>, MapLoaderError> {
    node.attribute(name)
        .map(|value| parse_attribute(node, name, value))
        .transpose()
}

fn parse_attribute<T: FromStr>(
    node: &Node,
    name: &'static str,
    value: &str,
) -> Result<T, MapLoaderError> {
    value
        .trim()
        .parse()
        .map_err(|_| MapLoaderError::InvalidAttribute {
            element: node.tag_name().name().to_string(),
            attribute: name,
            value: value.to_string(),
        })
}

/// Tiled writes booleans as `0`/`1`.
pub(crate) fn flag_or(node: &Node, name: &'static str, alternative: bool) -> bool {
    match node.attribute(name) {
        Some(value) => value.trim() != "0" && !value.trim().eq_ignore_ascii_case("false"),
        None => alternative,
    }
}

/// Element children with the given tag name.
pub(crate) fn children<'a, 'input>(
    node: &Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> + use<'a, 'input> {
    node.children()
        .filter(move |child| child.is_element() && child.tag_name().name() == tag)
}

/// First element child with the given tag name.
pub(crate) fn child<'a, 'input>(
    node: &Node<'a, 'input>,
    tag: &'static str,
) -> Option<Node<'a, 'input>> {
    children(node, tag).next()
}

/// Read the `<properties>` child of `node`, if any.
///
/// Values come from the `value` attribute, or from the text content for
/// multi-line strings. Nested class members are not expanded.
pub(crate) fn parse_properties(node: &Node) -> Properties {
    let mut properties = Properties::new();
    let Some(list) = child(node, "properties") else {
        return properties;
    };

    for property in children(&list, "property") {
        let Some(name) = property.attribute("name") else {
            continue;
        };
        let kind = PropertyType::from_attribute(property.attribute("type"));
        let raw = property
            .attribute("value")
            .or_else(|| property.text())
            .unwrap_or_default();
        properties.insert(name, PropertyValue::new(kind, raw));
    }

    properties
}
