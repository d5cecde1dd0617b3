//! Map construction settings.

/// Configuration for layer Z-ordering.
///
/// Controls how layer Z values are calculated for proper rendering order.
/// Z value = offset + (depth * multiplier)
///
/// Depth counts every content layer (tiles and objects) in document order,
/// with groups already flattened, giving flat Z-spacing across the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerZConfig {
    /// Base Z offset for all layers
    pub offset: f32,
    /// Multiplier for layer index spacing
    pub multiplier: f32,
}

impl Default for LayerZConfig {
    fn default() -> Self {
        Self {
            offset: 0.0,
            multiplier: 1.0,
        }
    }
}

impl LayerZConfig {
    /// Z value of the layer at `depth`.
    #[inline]
    pub fn z_for(&self, depth: usize) -> f32 {
        self.offset + depth as f32 * self.multiplier
    }
}

/// Configuration for [`Map`](crate::map::Map) construction.
///
/// # Example
///
/// ```rust
/// use tiledmesh_core::{LayerZConfig, LoadConfig};
///
/// let config = LoadConfig {
///     make_unique: true,
///     layer_z: LayerZConfig {
///         offset: 10.0,
///         multiplier: 0.5,
///     },
/// };
/// assert_eq!(config.layer_z.z_for(2), 11.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LoadConfig {
    /// Give every placed tile its own `Arc` instead of sharing the
    /// canonical tile between cells.
    pub make_unique: bool,

    pub layer_z: LayerZConfig,
}
