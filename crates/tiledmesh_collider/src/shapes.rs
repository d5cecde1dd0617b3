//! Shape conversion from map objects to collider geometry.

use bevy::math::{UVec2, Vec2, Vec3};
use thiserror::Error;
use tiledmesh_assets::prelude::{MapObject, ObjectShape};

use crate::config::ColliderConfig;

/// Wall quad triangles, relative to the segment's first vertex. Faces the
/// left-hand side of the segment direction.
const WALL_INDICES: [u32; 6] = [0, 1, 2, 2, 1, 3];

/// [`WALL_INDICES`] with every triangle reversed.
const WALL_INDICES_FLIPPED: [u32; 6] = [0, 2, 1, 2, 3, 1];

/// Errors that can occur while building collider geometry.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ColliderError {
    #[error("object {object_id} ('{name}') needs at least 2 points, found {points}")]
    InsufficientGeometry {
        object_id: u32,
        name: String,
        points: usize,
    },
}

/// Collider output for one object.
#[derive(Debug, Clone, PartialEq)]
pub enum ColliderGeometry {
    /// Axis-aligned box. `size` is the full extent; Z spans twice the
    /// configured collider width.
    Box { center: Vec3, size: Vec3 },
    /// Capsule lying along `axis`.
    Capsule {
        center: Vec3,
        radius: f32,
        height: f32,
        axis: Vec3,
    },
    /// Extruded outline walls.
    Mesh(ColliderMesh),
}

/// Triangle buffers for an extruded polygon or polyline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColliderMesh {
    /// `"Collider: <object name>"`
    pub name: String,
    pub object_id: u32,
    pub vertices: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl ColliderMesh {
    /// Triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|triangle| [triangle[0], triangle[1], triangle[2]])
    }
}

/// Convert a [`MapObject`] to collider geometry.
///
/// Output is in tile units with y pointing up, the same space as the tile
/// layer meshes: pixels are divided by `tile_size` and y is negated.
///
/// # Arguments
///
/// * `object` - The map object
/// * `tile_size` - The map's tile size in pixels
/// * `config` - Depth, extrusion width and facing
///
/// # Supported Shapes
///
/// | Map Shape | Collider |
/// |-----------|----------|
/// | Box | `ColliderGeometry::Box` over the bounds |
/// | Ellipse | `ColliderGeometry::Capsule` along Z |
/// | Polygon | `ColliderGeometry::Mesh`, closed loop of walls |
/// | Polyline | `ColliderGeometry::Mesh`, open chain of walls |
/// | Tile | `ColliderGeometry::Box` over the bounds |
///
/// # Errors
///
/// [`ColliderError::InsufficientGeometry`] if a polygon or polyline has
/// fewer than two points.
pub fn build_collider(
    object: &MapObject,
    tile_size: UVec2,
    config: &ColliderConfig,
) -> Result<ColliderGeometry, ColliderError> {
    let scale = tile_size.max(UVec2::ONE).as_vec2();

    if object.is_tile_object() {
        return Ok(box_collider(object, scale, config));
    }

    match &object.shape {
        ObjectShape::Box => Ok(box_collider(object, scale, config)),
        ObjectShape::Ellipse => Ok(capsule_collider(object, scale, config)),
        ObjectShape::Polygon(_) | ObjectShape::Polyline(_) => {
            extruded_mesh(object, scale, config).map(ColliderGeometry::Mesh)
        }
    }
}

/// Pixel position (y down) to tile units (y up).
#[inline]
fn to_tile_space(point: Vec2, scale: Vec2) -> Vec2 {
    Vec2::new(point.x / scale.x, -point.y / scale.y)
}

fn box_collider(object: &MapObject, scale: Vec2, config: &ColliderConfig) -> ColliderGeometry {
    let center = to_tile_space(object.bounds.center(), scale);
    let size = object.bounds.size() / scale;

    ColliderGeometry::Box {
        center: center.extend(config.depth),
        size: size.extend(config.collider_width * 2.0),
    }
}

fn capsule_collider(object: &MapObject, scale: Vec2, config: &ColliderConfig) -> ColliderGeometry {
    let center = to_tile_space(object.bounds.center(), scale);
    let size = object.bounds.size() / scale;

    ColliderGeometry::Capsule {
        center: center.extend(config.depth),
        radius: size.x / 2.0,
        height: size.y * config.collider_width,
        axis: Vec3::Z,
    }
}

fn extruded_mesh(
    object: &MapObject,
    scale: Vec2,
    config: &ColliderConfig,
) -> Result<ColliderMesh, ColliderError> {
    let points: Vec<Vec2> = object
        .absolute_points()
        .into_iter()
        .map(|point| to_tile_space(point, scale))
        .collect();

    if points.len() < 2 {
        return Err(ColliderError::InsufficientGeometry {
            object_id: object.id,
            name: object.name.clone(),
            points: points.len(),
        });
    }

    // Counter-clockwise outlines have their outside on the right of each
    // segment, so the left-facing base winding points inward
    let flip = (signed_area(&points) > 0.0) != config.inner_collision;
    let pattern = if flip {
        &WALL_INDICES_FLIPPED
    } else {
        &WALL_INDICES
    };

    let closing = object.shape.is_closed().then_some((points.len() - 1, 0));
    let segments = (0..points.len() - 1).map(|i| (i, i + 1)).chain(closing);

    let (near, far) = (
        config.depth - config.collider_width,
        config.depth + config.collider_width,
    );
    let mut mesh = ColliderMesh {
        name: format!("Collider: {}", object.name),
        object_id: object.id,
        ..Default::default()
    };

    for (from, to) in segments {
        let (a, b) = (points[from], points[to]);
        let base = mesh.vertices.len() as u32;

        mesh.vertices.extend([
            a.extend(near),
            a.extend(far),
            b.extend(near),
            b.extend(far),
        ]);
        mesh.indices.extend(pattern.iter().map(|i| base + i));
    }

    Ok(mesh)
}

/// Shoelace signed area, positive for counter-clockwise outlines (y up).
fn signed_area(points: &[Vec2]) -> f32 {
    let sum: f32 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.perp_dot(*b))
        .sum();
    sum / 2.0
}
