pub mod dense;

pub use dense::DenseGrid;

use crate::error::RouteError;
use groute_common::db::core::Direction;
use groute_common::db::indices::NetId;
use groute_common::geom::coord::GridCoord;
use std::ops::Range;

/// Per-edge demand and occupancy for a uniform-capacity gcell grid.
///
/// The horizontal edge of gcell `(x, y)` joins it to `(x + 1, y)`, the
/// vertical edge joins it to `(x, y + 1)`. Every routing operation that
/// crosses an edge charges that edge's owner cell.
pub trait RoutingGrid: Sync + Send {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn capacity(&self, dir: Direction) -> u32;

    fn demand(&self, coord: GridCoord, dir: Direction) -> u32;
    fn occupants(&self, coord: GridCoord, dir: Direction) -> &[NetId];

    /// Adds one unit of demand and records `net` as an occupant.
    fn add_wire(&mut self, net: NetId, coord: GridCoord, dir: Direction)
    -> Result<(), RouteError>;
    /// Removes one unit of demand and the occupancy entry of `net`.
    fn remove_wire(
        &mut self,
        net: NetId,
        coord: GridCoord,
        dir: Direction,
    ) -> Result<(), RouteError>;

    /// Horizontal demand summed along row `y` over `xs`.
    fn row_demand(&self, y: u32, xs: Range<u32>) -> u32;
    /// Vertical demand summed along column `x` over `ys`.
    fn column_demand(&self, x: u32, ys: Range<u32>) -> u32;

    fn contains(&self, coord: GridCoord) -> bool {
        coord.x < self.width() && coord.y < self.height()
    }

    /// The edge is full: the maze router may not cross it.
    fn is_blocked(&self, coord: GridCoord, dir: Direction) -> bool {
        self.demand(coord, dir) >= self.capacity(dir)
    }

    fn is_congested(&self, coord: GridCoord, dir: Direction) -> bool {
        self.demand(coord, dir) > self.capacity(dir)
    }

    fn overflow(&self, coord: GridCoord, dir: Direction) -> u32 {
        self.demand(coord, dir).saturating_sub(self.capacity(dir))
    }

    /// Number of over-capacity edges.
    fn total_conflicts(&self) -> usize {
        let mut conflicts = 0;
        for y in 0..self.height() {
            for x in 0..self.width() {
                let c = GridCoord::new(x, y);
                for dir in [Direction::Horizontal, Direction::Vertical] {
                    if self.is_congested(c, dir) {
                        conflicts += 1;
                    }
                }
            }
        }
        conflicts
    }

    fn total_overflow(&self) -> u64 {
        let mut total = 0u64;
        for y in 0..self.height() {
            for x in 0..self.width() {
                let c = GridCoord::new(x, y);
                total += self.overflow(c, Direction::Horizontal) as u64;
                total += self.overflow(c, Direction::Vertical) as u64;
            }
        }
        total
    }
}
