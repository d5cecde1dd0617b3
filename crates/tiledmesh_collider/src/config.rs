//! Collider build settings.

/// Configuration for collider generation.
///
/// # Example
///
/// ```rust
/// use tiledmesh_collider::ColliderConfig;
///
/// let config = ColliderConfig {
///     depth: 2.0,
///     inner_collision: true,
///     ..Default::default()
/// };
/// assert_eq!(config.collider_width, 0.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderConfig {
    /// Z coordinate the colliders are centered on.
    ///
    /// Default: `0.0`
    pub depth: f32,

    /// Half the extrusion thickness along Z, in tile units. Polygon and
    /// polyline walls span `depth - collider_width ..= depth + collider_width`.
    /// Also scales the capsule height of ellipse objects.
    ///
    /// Default: `0.5`
    pub collider_width: f32,

    /// Face the extruded walls toward the inside of the shape, for areas the
    /// body should stay inside of (arena bounds) instead of stay out of.
    ///
    /// Default: `false`
    pub inner_collision: bool,
}

impl Default for ColliderConfig {
    fn default() -> Self {
        Self {
            depth: 0.0,
            collider_width: 0.5,
            inner_collision: false,
        }
    }
}

impl ColliderConfig {
    /// Same settings at another depth, e.g. an object layer's `z`.
    #[must_use]
    pub fn at_depth(self, depth: f32) -> Self {
        Self { depth, ..self }
    }
}
