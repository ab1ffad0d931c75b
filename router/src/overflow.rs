//! Overflow attribution, rip-up and reroute ordering.

use crate::error::RouteError;
use crate::grid::RoutingGrid;
use crate::route::RouteRecord;
use groute_common::db::core::Direction;
use groute_common::db::indices::NetId;
use groute_common::geom::coord::GridCoord;
use groute_common::util::config::{RerouteOrder, RipupPolicy};
use priority_queue::PriorityQueue;
use std::cmp::Ordering;

/// Overflow units attributed to each net during the current pass.
#[derive(Clone, Debug)]
pub struct OverflowLedger {
    values: Vec<u32>,
}

impl OverflowLedger {
    pub fn new(num_nets: usize) -> Self {
        Self {
            values: vec![0; num_nets],
        }
    }

    pub fn reset(&mut self) {
        self.values.fill(0);
    }

    pub fn get(&self, net: NetId) -> u32 {
        self.values[net.index()]
    }

    pub fn values(&self) -> &[u32] {
        &self.values
    }

    /// Adds the overflow of every over-capacity edge to each of its
    /// occupants. Returns the number of over-capacity edges seen.
    pub fn attribute<G: RoutingGrid + ?Sized>(&mut self, grid: &G) -> usize {
        let mut edges = 0;
        for dir in [Direction::Vertical, Direction::Horizontal] {
            for x in 0..grid.width() {
                for y in 0..grid.height() {
                    let c = GridCoord::new(x, y);
                    let over = grid.overflow(c, dir);
                    if over == 0 {
                        continue;
                    }
                    edges += 1;
                    for net in grid.occupants(c, dir) {
                        let slot = &mut self.values[net.index()];
                        *slot = slot.saturating_add(over);
                    }
                }
            }
        }
        edges
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RerouteKey {
    overflow: u32,
    seq: u64,
    order: RerouteOrder,
}

/// `PriorityQueue` pops the greatest key. Greatest here means the smallest
/// overflow (ascending order) or the largest (descending order); equal
/// overflow falls back to rip-up order.
impl Ord for RerouteKey {
    fn cmp(&self, other: &Self) -> Ordering {
        let primary = match self.order {
            RerouteOrder::Ascending => other.overflow.cmp(&self.overflow),
            RerouteOrder::Descending => self.overflow.cmp(&other.overflow),
        };
        primary.then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for RerouteKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ripped-up nets waiting for the maze router.
pub struct RerouteQueue {
    order: RerouteOrder,
    queue: PriorityQueue<NetId, RerouteKey>,
    seq: u64,
}

impl RerouteQueue {
    pub fn new(order: RerouteOrder) -> Self {
        Self {
            order,
            queue: PriorityQueue::new(),
            seq: 0,
        }
    }

    pub fn push(&mut self, net: NetId, overflow: u32) {
        let key = RerouteKey {
            overflow,
            seq: self.seq,
            order: self.order,
        };
        self.seq += 1;
        self.queue.push(net, key);
    }

    pub fn pop(&mut self) -> Option<NetId> {
        self.queue.pop().map(|(net, _)| net)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Releases nets from over-capacity edges until every edge is within
/// capacity. All vertical edges are cleared before any horizontal one, each
/// scanned column by column.
///
/// Every released net is queued with its ledger value. Returns the released
/// nets in release order.
pub fn rip_up<G: RoutingGrid + ?Sized>(
    grid: &mut G,
    routes: &mut [RouteRecord],
    ledger: &OverflowLedger,
    queue: &mut RerouteQueue,
    policy: RipupPolicy,
) -> Result<Vec<NetId>, RouteError> {
    let mut ripped = Vec::new();

    for dir in [Direction::Vertical, Direction::Horizontal] {
        for x in 0..grid.width() {
            for y in 0..grid.height() {
                let c = GridCoord::new(x, y);
                while grid.is_congested(c, dir) {
                    let occupants = grid.occupants(c, dir);
                    let victim = match policy {
                        RipupPolicy::MostRecent => occupants.last(),
                        RipupPolicy::LeastRecent => occupants.first(),
                    }
                    .copied();
                    let Some(net) = victim else {
                        log::error!(
                            "Over-capacity {:?} edge at ({}, {}) has no occupants",
                            dir,
                            x,
                            y
                        );
                        break;
                    };

                    routes[net.index()].release(grid, net)?;
                    queue.push(net, ledger.get(net));
                    ripped.push(net);
                }
            }
        }
    }

    Ok(ripped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::DenseGrid;

    const H: Direction = Direction::Horizontal;
    const V: Direction = Direction::Vertical;

    fn c(x: u32, y: u32) -> GridCoord {
        GridCoord::new(x, y)
    }

    fn reserve_all(
        grid: &mut DenseGrid,
        routes: &mut [RouteRecord],
        net: usize,
        edges: &[(GridCoord, Direction)],
    ) {
        for &(coord, dir) in edges {
            routes[net]
                .reserve(grid, NetId::new(net), coord, dir)
                .unwrap();
        }
        routes[net].commit(vec![]);
    }

    #[test]
    fn attribution_sums_over_all_edges_of_a_net() {
        let mut grid = DenseGrid::new(3, 3, 1, 1);
        let mut routes = vec![RouteRecord::new(); 3];
        reserve_all(&mut grid, &mut routes, 0, &[(c(0, 0), H), (c(1, 0), V)]);
        reserve_all(&mut grid, &mut routes, 1, &[(c(0, 0), H), (c(1, 0), V)]);
        reserve_all(&mut grid, &mut routes, 2, &[(c(0, 0), H), (c(2, 2), V)]);

        let mut ledger = OverflowLedger::new(3);
        let edges = ledger.attribute(&grid);
        assert_eq!(edges, 2);
        // (0,0) H carries 3 nets: overflow 2. (1,0) V carries 2: overflow 1.
        assert_eq!(ledger.values(), &[3, 3, 2]);

        ledger.reset();
        assert_eq!(ledger.values(), &[0, 0, 0]);
    }

    #[test]
    fn rip_up_releases_most_recent_occupant() {
        let mut grid = DenseGrid::new(3, 1, 1, 1);
        let mut routes = vec![RouteRecord::new(); 3];
        reserve_all(&mut grid, &mut routes, 0, &[(c(0, 0), H), (c(1, 0), H)]);
        reserve_all(&mut grid, &mut routes, 1, &[(c(1, 0), H)]);
        reserve_all(&mut grid, &mut routes, 2, &[(c(0, 0), H)]);

        let mut ledger = OverflowLedger::new(3);
        ledger.attribute(&grid);
        let mut queue = RerouteQueue::new(RerouteOrder::Ascending);
        let ripped = rip_up(
            &mut grid,
            &mut routes,
            &ledger,
            &mut queue,
            RipupPolicy::MostRecent,
        )
        .unwrap();

        assert_eq!(ripped, vec![NetId::new(2), NetId::new(1)]);
        assert!(routes[0].is_routed());
        assert!(!routes[1].is_routed() && !routes[2].is_routed());
        assert_eq!(grid.total_conflicts(), 0);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn least_recent_policy_releases_the_first_occupant() {
        let mut grid = DenseGrid::new(3, 1, 1, 1);
        let mut routes = vec![RouteRecord::new(); 2];
        reserve_all(&mut grid, &mut routes, 0, &[(c(0, 0), H), (c(1, 0), H)]);
        reserve_all(&mut grid, &mut routes, 1, &[(c(0, 0), H)]);

        let ledger = OverflowLedger::new(2);
        let mut queue = RerouteQueue::new(RerouteOrder::Ascending);
        let ripped = rip_up(
            &mut grid,
            &mut routes,
            &ledger,
            &mut queue,
            RipupPolicy::LeastRecent,
        )
        .unwrap();
        assert_eq!(ripped, vec![NetId::new(0)]);
        assert_eq!(grid.demand(c(1, 0), H), 0);
    }

    #[test]
    fn vertical_edges_are_cleared_first() {
        let mut grid = DenseGrid::new(2, 2, 1, 1);
        let mut routes = vec![RouteRecord::new(); 4];
        reserve_all(&mut grid, &mut routes, 0, &[(c(0, 0), H)]);
        reserve_all(&mut grid, &mut routes, 1, &[(c(0, 0), H)]);
        reserve_all(&mut grid, &mut routes, 2, &[(c(1, 1), V)]);
        reserve_all(&mut grid, &mut routes, 3, &[(c(1, 1), V)]);

        let ledger = OverflowLedger::new(4);
        let mut queue = RerouteQueue::new(RerouteOrder::Ascending);
        let ripped = rip_up(
            &mut grid,
            &mut routes,
            &ledger,
            &mut queue,
            RipupPolicy::MostRecent,
        )
        .unwrap();
        assert_eq!(ripped, vec![NetId::new(3), NetId::new(1)]);
    }

    #[test]
    fn queue_orders_by_overflow_then_rip_order() {
        let mut queue = RerouteQueue::new(RerouteOrder::Ascending);
        queue.push(NetId::new(0), 5);
        queue.push(NetId::new(1), 2);
        queue.push(NetId::new(2), 5);
        queue.push(NetId::new(3), 2);
        let order: Vec<_> = std::iter::from_fn(|| queue.pop()).collect();
        assert_eq!(
            order,
            vec![NetId::new(1), NetId::new(3), NetId::new(0), NetId::new(2)]
        );
        assert!(queue.is_empty());

        let mut queue = RerouteQueue::new(RerouteOrder::Descending);
        queue.push(NetId::new(0), 1);
        queue.push(NetId::new(1), 4);
        queue.push(NetId::new(2), 4);
        let order: Vec<_> = std::iter::from_fn(|| queue.pop()).collect();
        assert_eq!(order, vec![NetId::new(1), NetId::new(2), NetId::new(0)]);
    }
}
