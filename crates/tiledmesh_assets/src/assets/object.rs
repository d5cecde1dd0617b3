use bevy::math::{Rect, Vec2};

use crate::properties::Properties;

/// Geometry of a map object.
///
/// Point lists are relative to the object origin, in pixels, y down.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ObjectShape {
    /// Plain rectangle (also used for `<point/>` and tile objects).
    #[default]
    Box,
    Ellipse,
    /// Closed outline; the last point connects back to the first.
    Polygon(Vec<Vec2>),
    /// Open outline.
    Polyline(Vec<Vec2>),
}

impl ObjectShape {
    /// Outline points for polygons and polylines, empty for the other shapes.
    pub fn points(&self) -> &[Vec2] {
        match self {
            ObjectShape::Polygon(points) | ObjectShape::Polyline(points) => points,
            ObjectShape::Box | ObjectShape::Ellipse => &[],
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, ObjectShape::Polygon(_))
    }
}

/// A single `<object>` from an object layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapObject {
    pub id: u32,
    pub name: String,
    /// Free-form `type` (or `class`) tag.
    pub user_type: String,
    /// Bounding rectangle in pixels, document space (y down).
    ///
    /// `min` is always the top-left corner. For tile objects, which Tiled
    /// anchors at the bottom-left, the loader shifts the rectangle up by the
    /// object height.
    pub bounds: Rect,
    /// Rotation in degrees, clockwise. Carried but not applied to geometry.
    pub rotation: f32,
    pub shape: ObjectShape,
    /// Raw GID (flip bits included) for tile objects.
    pub gid: Option<u32>,
    pub visible: bool,
    pub properties: Properties,
}

impl MapObject {
    /// Object origin as written in the document (`x`, `y` attributes).
    pub fn origin(&self) -> Vec2 {
        if self.gid.is_some() {
            Vec2::new(self.bounds.min.x, self.bounds.max.y)
        } else {
            self.bounds.min
        }
    }

    #[inline]
    pub fn is_tile_object(&self) -> bool {
        self.gid.is_some()
    }

    /// Outline points in absolute document pixels (origin added).
    pub fn absolute_points(&self) -> Vec<Vec2> {
        let origin = self.origin();
        self.shape.points().iter().map(|p| *p + origin).collect()
    }
}
