use crate::assets::ImageHandle;
use crate::geometry::Rect;

/// Index handle into the collision world's tile set. Valid for the lifetime
/// of the level that produced it; actors keep one of these instead of a
/// reference into the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId(pub(crate) usize);

/// One placed level tile: a world-pixel rectangle plus the rendering handle
/// resolved from the tileset. Never mutated after level construction.
#[derive(Debug, Clone)]
pub struct Tile {
    rect: Rect,
    image: ImageHandle,
}

impl Tile {
    pub fn new(rect: Rect, image: ImageHandle) -> Self {
        Self { rect, image }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn image(&self) -> &ImageHandle {
        &self.image
    }
}

/// The static tile set plus the level's pixel bounds. Immutable for the
/// lifetime of a level, so simulation queries need no locking discipline.
#[derive(Debug, Clone)]
pub struct CollisionWorld {
    tiles: Vec<Tile>,
    bounds: Rect,
}

impl CollisionWorld {
    pub fn new(tiles: Vec<Tile>, bounds: Rect) -> Self {
        Self { tiles, bounds }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, id: TileId) -> &Tile {
        &self.tiles[id.0]
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// First tile overlapping `rect`, or `None`. Tiles are stored in
    /// row-major placement order (top row first, left to right), so when a
    /// rectangle overlaps several tiles at once the topmost-then-leftmost
    /// tile wins. That tie-break is deterministic and part of the contract.
    pub fn first_overlap(&self, rect: &Rect) -> Option<TileId> {
        self.tiles
            .iter()
            .position(|tile| rect.overlaps(&tile.rect))
            .map(TileId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile_at(x: f32, y: f32, size: f32) -> Tile {
        Tile::new(
            Rect::new(x, y, size, size),
            ImageHandle::solid(1, 1, [0, 0, 0, 255]),
        )
    }

    fn two_tile_world() -> CollisionWorld {
        CollisionWorld::new(
            vec![tile_at(0.0, 0.0, 32.0), tile_at(32.0, 0.0, 32.0)],
            Rect::new(0.0, 0.0, 64.0, 32.0),
        )
    }

    #[test]
    fn first_overlap_returns_none_for_empty_space() {
        let world = two_tile_world();
        let probe = Rect::new(100.0, 100.0, 8.0, 8.0);
        assert_eq!(world.first_overlap(&probe), None);
    }

    #[test]
    fn first_overlap_prefers_earliest_placed_tile() {
        let world = two_tile_world();
        // Straddles both tiles; the earlier (leftmost) placement wins.
        let probe = Rect::new(24.0, 8.0, 16.0, 16.0);
        assert_eq!(world.first_overlap(&probe), Some(TileId(0)));
    }

    #[test]
    fn edge_contact_is_not_an_overlap() {
        let world = two_tile_world();
        let resting_on_top = Rect::new(8.0, -16.0, 16.0, 16.0);
        assert_eq!(world.first_overlap(&resting_on_top), None);
    }

    #[test]
    fn tile_lookup_by_id_round_trips() {
        let world = two_tile_world();
        let probe = Rect::new(40.0, 8.0, 8.0, 8.0);
        let id = world.first_overlap(&probe).expect("hit");
        assert_eq!(world.tile(id).rect(), Rect::new(32.0, 0.0, 32.0, 32.0));
    }
}
