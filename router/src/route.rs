use crate::error::RouteError;
use crate::grid::RoutingGrid;
use groute_common::db::core::Direction;
use groute_common::db::indices::NetId;
use groute_common::geom::coord::GridCoord;

/// One unit of demand charged to a net.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reservation {
    pub coord: GridCoord,
    pub dir: Direction,
}

/// Reservation log plus waypoint geometry of one net.
///
/// The log is what gets undone on rip-up; the waypoints (both ends and every
/// bend) are what gets written out.
#[derive(Clone, Debug, Default)]
pub struct RouteRecord {
    reservations: Vec<Reservation>,
    waypoints: Vec<GridCoord>,
    routed: bool,
}

impl RouteRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_routed(&self) -> bool {
        self.routed
    }

    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    pub fn waypoints(&self) -> &[GridCoord] {
        &self.waypoints
    }

    /// Charges one edge to `net` on the grid and logs it.
    pub fn reserve<G: RoutingGrid + ?Sized>(
        &mut self,
        grid: &mut G,
        net: NetId,
        coord: GridCoord,
        dir: Direction,
    ) -> Result<(), RouteError> {
        grid.add_wire(net, coord, dir)?;
        self.reservations.push(Reservation { coord, dir });
        Ok(())
    }

    /// Marks the net routed with the given geometry. The reservations must
    /// already be in the log.
    pub fn commit(&mut self, waypoints: Vec<GridCoord>) {
        self.waypoints = waypoints;
        self.routed = true;
    }

    /// Undoes every reservation in log order and clears the geometry.
    pub fn release<G: RoutingGrid + ?Sized>(
        &mut self,
        grid: &mut G,
        net: NetId,
    ) -> Result<(), RouteError> {
        for r in &self.reservations {
            grid.remove_wire(net, r.coord, r.dir)?;
        }
        self.reservations.clear();
        self.waypoints.clear();
        self.routed = false;
        Ok(())
    }

    /// Waypoints with consecutive duplicates removed.
    pub fn bends(&self) -> Vec<GridCoord> {
        let mut out: Vec<GridCoord> = Vec::with_capacity(self.waypoints.len());
        for &p in &self.waypoints {
            if out.last() != Some(&p) {
                out.push(p);
            }
        }
        out
    }

    /// Total gcell edges along the geometry.
    pub fn wirelength(&self) -> u32 {
        self.waypoints
            .windows(2)
            .map(|w| w[0].manhattan(w[1]))
            .sum()
    }
}
