//! GID resolution.
//!
//! Raw GIDs carry flip flags in their top bits. Resolution strips them, looks
//! the canonical id up in the map's tile table and hands back a tile whose
//! flip-state matches the flags.

use std::collections::HashMap;
use std::sync::Arc;

use crate::tile::{FlipState, Tile};

pub const FLIPPED_HORIZONTALLY_FLAG: u32 = 0x8000_0000;
pub const FLIPPED_VERTICALLY_FLAG: u32 = 0x4000_0000;

/// Only the horizontal and vertical flags are stripped; every other bit is
/// part of the canonical id.
const FLAG_MASK: u32 = FLIPPED_HORIZONTALLY_FLAG | FLIPPED_VERTICALLY_FLAG;

/// Split a raw GID into its canonical id and flip-state.
#[inline]
pub fn split_gid(raw: u32) -> (u32, FlipState) {
    let flip = FlipState::from_flags(
        raw & FLIPPED_HORIZONTALLY_FLAG != 0,
        raw & FLIPPED_VERTICALLY_FLAG != 0,
    );
    (raw & !FLAG_MASK, flip)
}

/// Resolve one raw GID without caching.
///
/// Every flipped (or, with `make_unique`, every) resolution allocates a new
/// tile. Use [`TileInstancer`] to share flipped clones across a layer.
///
/// # Arguments
/// * `raw` - GID as stored in the layer data, flip bits included
/// * `lookup` - The map's canonical GID → tile table
/// * `make_unique` - Deep-copy every resolved tile into its own `Arc`
///
/// # Returns
/// * `(Some(tile), flip)` - The tile to place in the cell
/// * `(None, flip)` - Empty cell (GID 0) or an id missing from the table
pub fn resolve(
    raw: u32,
    lookup: &HashMap<u32, Arc<Tile>>,
    make_unique: bool,
) -> (Option<Arc<Tile>>, FlipState) {
    let (gid, flip) = split_gid(raw);
    let Some(canonical) = lookup.get(&gid) else {
        return (None, flip);
    };

    let tile = if make_unique || canonical.flip != flip {
        Arc::new(canonical.with_flip(flip))
    } else {
        Arc::clone(canonical)
    };
    (Some(tile), flip)
}

/// Resolves raw GIDs for one or more layers, sharing flipped clones.
///
/// The first cell that needs a flipped variant of a tile creates it; later
/// cells with the same `(gid, flip)` get the same `Arc`.
#[derive(Debug)]
pub struct TileInstancer<'a> {
    lookup: &'a HashMap<u32, Arc<Tile>>,
    make_unique: bool,
    flipped: HashMap<(u32, FlipState), Arc<Tile>>,
}

impl<'a> TileInstancer<'a> {
    pub fn new(lookup: &'a HashMap<u32, Arc<Tile>>, make_unique: bool) -> Self {
        Self {
            lookup,
            make_unique,
            flipped: HashMap::new(),
        }
    }

    /// Resolve one raw GID. See [`resolve`] for the return values.
    pub fn instance(&mut self, raw: u32) -> (Option<Arc<Tile>>, FlipState) {
        let lookup = self.lookup;
        let (gid, flip) = split_gid(raw);
        let Some(canonical) = lookup.get(&gid) else {
            return (None, flip);
        };

        if self.make_unique {
            return (Some(Arc::new(canonical.with_flip(flip))), flip);
        }

        if canonical.flip == flip {
            return (Some(Arc::clone(canonical)), flip);
        }

        let tile = self
            .flipped
            .entry((gid, flip))
            .or_insert_with(|| Arc::new(canonical.with_flip(flip)));
        (Some(Arc::clone(tile)), flip)
    }

    /// Number of distinct flipped variants created so far.
    pub fn flipped_variants(&self) -> usize {
        self.flipped.len()
    }
}
