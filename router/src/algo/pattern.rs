//! L/Z pattern routing.
//!
//! Every two-pin connection is tried as a three-segment path with one
//! movable middle segment, either a vertical jog at some column between the
//! pins or a horizontal jog at some row between them. The candidate with the
//! least demand already present along its edges wins. Capacity is not
//! checked here; overflow is left for rip-up and reroute.

use crate::error::RouteError;
use crate::grid::RoutingGrid;
use crate::route::RouteRecord;
use groute_common::db::core::Direction;
use groute_common::db::indices::NetId;
use groute_common::geom::coord::GridCoord;

/// Position of the middle segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bend {
    /// Vertical jog at this column.
    Column(u32),
    /// Horizontal jog at this row.
    Row(u32),
}

/// Bounding box of a two-pin net plus the order in which the pin rows and
/// columns are visited.
///
/// When the pins rise together (or one span is zero) the low row pairs with
/// the low column; when one rises while the other falls, the low column sits
/// on the high row.
#[derive(Clone, Copy, Debug)]
struct Span {
    x_lo: u32,
    x_hi: u32,
    y_lo: u32,
    y_hi: u32,
    /// Row of the pin at `x_lo`, then row of the pin at `x_hi`.
    rows: (u32, u32),
    /// Column of the pin at `y_lo`, then column of the pin at `y_hi`.
    cols: (u32, u32),
}

impl Span {
    fn new(p1: GridCoord, p2: GridCoord) -> Self {
        let x_lo = p1.x.min(p2.x);
        let x_hi = p1.x.max(p2.x);
        let y_lo = p1.y.min(p2.y);
        let y_hi = p1.y.max(p2.y);

        let dx = p2.x as i64 - p1.x as i64;
        let dy = p2.y as i64 - p1.y as i64;
        let (rows, cols) = if dx * dy < 0 {
            ((y_hi, y_lo), (x_hi, x_lo))
        } else {
            ((y_lo, y_hi), (x_lo, x_hi))
        };

        Self {
            x_lo,
            x_hi,
            y_lo,
            y_hi,
            rows,
            cols,
        }
    }
}

/// Demand along the candidate's edges.
fn bend_cost<G: RoutingGrid + ?Sized>(grid: &G, span: &Span, bend: Bend) -> u32 {
    match bend {
        Bend::Column(i) => {
            grid.row_demand(span.rows.0, span.x_lo..i)
                + grid.row_demand(span.rows.1, i..span.x_hi)
                + grid.column_demand(i, span.y_lo..span.y_hi)
        }
        Bend::Row(j) => {
            grid.column_demand(span.cols.0, span.y_lo..j)
                + grid.column_demand(span.cols.1, j..span.y_hi)
                + grid.row_demand(j, span.x_lo..span.x_hi)
        }
    }
}

/// Scans all columns, then all rows, and keeps the first strict minimum.
pub fn select_bend<G: RoutingGrid + ?Sized>(grid: &G, p1: GridCoord, p2: GridCoord) -> (Bend, u32) {
    let span = Span::new(p1, p2);
    let candidates = (span.x_lo..=span.x_hi)
        .map(Bend::Column)
        .chain((span.y_lo..=span.y_hi).map(Bend::Row));

    let mut best = (Bend::Column(span.x_lo), u32::MAX);
    for bend in candidates {
        let cost = bend_cost(grid, &span, bend);
        if cost < best.1 {
            best = (bend, cost);
        }
    }
    best
}

/// Routes one net with the cheapest pattern and commits it.
///
/// The record must be empty. On an invariant violation the partially
/// reserved edges stay in the record's log so the caller can still release
/// them.
pub fn route_net<G: RoutingGrid + ?Sized>(
    grid: &mut G,
    net: NetId,
    p1: GridCoord,
    p2: GridCoord,
    record: &mut RouteRecord,
) -> Result<Bend, RouteError> {
    let span = Span::new(p1, p2);
    let (bend, _) = select_bend(grid, p1, p2);

    let waypoints = match bend {
        Bend::Column(i) => {
            let (near, far) = span.rows;
            for x in span.x_lo..i {
                record.reserve(grid, net, GridCoord::new(x, near), Direction::Horizontal)?;
            }
            for y in span.y_lo..span.y_hi {
                record.reserve(grid, net, GridCoord::new(i, y), Direction::Vertical)?;
            }
            for x in i..span.x_hi {
                record.reserve(grid, net, GridCoord::new(x, far), Direction::Horizontal)?;
            }
            vec![
                GridCoord::new(span.x_lo, near),
                GridCoord::new(i, near),
                GridCoord::new(i, far),
                GridCoord::new(span.x_hi, far),
            ]
        }
        Bend::Row(j) => {
            let (near, far) = span.cols;
            for y in span.y_lo..j {
                record.reserve(grid, net, GridCoord::new(near, y), Direction::Vertical)?;
            }
            for x in span.x_lo..span.x_hi {
                record.reserve(grid, net, GridCoord::new(x, j), Direction::Horizontal)?;
            }
            for y in j..span.y_hi {
                record.reserve(grid, net, GridCoord::new(far, y), Direction::Vertical)?;
            }
            vec![
                GridCoord::new(near, span.y_lo),
                GridCoord::new(near, j),
                GridCoord::new(far, j),
                GridCoord::new(far, span.y_hi),
            ]
        }
    };

    record.commit(waypoints);
    Ok(bend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::DenseGrid;

    fn c(x: u32, y: u32) -> GridCoord {
        GridCoord::new(x, y)
    }

    #[test]
    fn empty_grid_diagonal_uses_first_column() {
        let mut grid = DenseGrid::new(3, 3, 1, 1);
        let mut record = RouteRecord::new();
        let bend = route_net(&mut grid, NetId::new(0), c(0, 0), c(2, 2), &mut record).unwrap();

        assert_eq!(bend, Bend::Column(0));
        assert_eq!(record.waypoints(), &[c(0, 0), c(0, 0), c(0, 2), c(2, 2)]);
        assert_eq!(record.reservations().len(), 4);
        assert_eq!(grid.total_demand(), 4);
        assert_eq!(grid.demand(c(0, 0), Direction::Vertical), 1);
        assert_eq!(grid.demand(c(0, 1), Direction::Vertical), 1);
        assert_eq!(grid.demand(c(0, 2), Direction::Horizontal), 1);
        assert_eq!(grid.demand(c(1, 2), Direction::Horizontal), 1);
    }

    #[test]
    fn falling_pins_start_on_the_high_row() {
        let mut grid = DenseGrid::new(4, 4, 1, 1);
        let mut record = RouteRecord::new();
        // Pin at the low column sits on the high row.
        route_net(&mut grid, NetId::new(0), c(0, 3), c(3, 1), &mut record).unwrap();
        assert_eq!(record.waypoints(), &[c(0, 3), c(0, 3), c(0, 1), c(3, 1)]);
        assert_eq!(grid.demand(c(0, 1), Direction::Vertical), 1);
        assert_eq!(grid.demand(c(0, 2), Direction::Vertical), 1);
        assert_eq!(grid.row_demand(1, 0..3), 3);
        assert_eq!(grid.total_demand(), 5);
    }

    #[test]
    fn falling_pins_row_bend_climbs_the_high_column_first() {
        let mut grid = DenseGrid::new(4, 4, 9, 9);
        // Full pin rows make every column jog cost 3; row 1 stays free.
        for x in 0..3 {
            for y in [0, 3] {
                grid.add_wire(NetId::new(9), c(x, y), Direction::Horizontal)
                    .unwrap();
            }
        }
        let mut record = RouteRecord::new();
        let bend = route_net(&mut grid, NetId::new(0), c(0, 3), c(3, 0), &mut record).unwrap();

        assert_eq!(bend, Bend::Row(1));
        assert_eq!(record.waypoints(), &[c(3, 0), c(3, 1), c(0, 1), c(0, 3)]);
        let edges: Vec<_> = record
            .reservations()
            .iter()
            .map(|r| (r.coord, r.dir))
            .collect();
        assert_eq!(
            edges,
            vec![
                (c(3, 0), Direction::Vertical),
                (c(0, 1), Direction::Horizontal),
                (c(1, 1), Direction::Horizontal),
                (c(2, 1), Direction::Horizontal),
                (c(0, 1), Direction::Vertical),
                (c(0, 2), Direction::Vertical),
            ]
        );
    }

    #[test]
    fn congested_column_is_avoided() {
        let mut grid = DenseGrid::new(4, 4, 1, 1);
        for y in 0..3 {
            grid.add_wire(NetId::new(9), c(0, y), Direction::Vertical)
                .unwrap();
        }
        let (bend, cost) = select_bend(&grid, c(0, 0), c(3, 3));
        // Column 0 costs 3; column 1 costs one horizontal edge on row 0 (free).
        assert_eq!(bend, Bend::Column(1));
        assert_eq!(cost, 0);
    }

    #[test]
    fn rows_are_tried_after_columns() {
        let mut grid = DenseGrid::new(3, 3, 9, 9);
        // Load every vertical edge so that all column jogs cost something,
        // and leave row 1 horizontally free.
        for x in 0..3 {
            for y in 0..2 {
                grid.add_wire(NetId::new(9), c(x, y), Direction::Vertical)
                    .unwrap();
            }
        }
        grid.add_wire(NetId::new(9), c(0, 0), Direction::Horizontal)
            .unwrap();
        grid.add_wire(NetId::new(9), c(1, 2), Direction::Horizontal)
            .unwrap();
        let (bend, cost) = select_bend(&grid, c(0, 0), c(2, 2));
        // Column jogs cost 3, 4 and 3; rows cost 3, 2 and 3.
        assert_eq!(bend, Bend::Row(1));
        assert_eq!(cost, 2);
    }

    #[test]
    fn straight_and_degenerate_nets() {
        let mut grid = DenseGrid::new(5, 5, 1, 1);
        let mut record = RouteRecord::new();
        route_net(&mut grid, NetId::new(0), c(4, 2), c(1, 2), &mut record).unwrap();
        assert_eq!(record.reservations().len(), 3);
        assert_eq!(record.bends(), vec![c(1, 2), c(4, 2)]);

        let mut single = RouteRecord::new();
        route_net(&mut grid, NetId::new(1), c(3, 3), c(3, 3), &mut single).unwrap();
        assert!(single.is_routed());
        assert!(single.reservations().is_empty());
        assert_eq!(single.waypoints().len(), 4);
        assert_eq!(single.bends(), vec![c(3, 3)]);
    }

    #[test]
    fn reserved_count_matches_manhattan_distance() {
        let mut grid = DenseGrid::new(8, 8, 2, 2);
        let pairs = [
            (c(1, 6), c(5, 2)),
            (c(7, 0), c(0, 7)),
            (c(2, 2), c(6, 3)),
            (c(4, 1), c(4, 6)),
        ];
        for (i, (a, b)) in pairs.iter().enumerate() {
            let mut record = RouteRecord::new();
            route_net(&mut grid, NetId::new(i), *a, *b, &mut record).unwrap();
            assert_eq!(record.reservations().len() as u32, a.manhattan(*b));
            assert_eq!(record.wirelength(), a.manhattan(*b));
            let ends = [record.waypoints()[0], record.waypoints()[3]];
            assert!(ends.contains(a) && ends.contains(b));
        }
    }
}
