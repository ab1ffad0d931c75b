//! Errors raised by the routing core.
//!
//! A net that cannot be placed by the maze router is *not* an error; it is
//! reported through the routing summary. Everything here either rejects a net
//! before it touches the demand model or signals that the demand model itself
//! is corrupt.

use groute_common::db::core::Direction;
use groute_common::db::indices::NetId;
use groute_common::geom::coord::GridCoord;

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// Release found a reservation whose net is missing from the gcell's
    /// occupancy set. The reservation log and the grid disagree.
    #[error(
        "net {net} missing from {direction:?} occupancy of gcell ({}, {}): reservation log out of sync",
        .coord.x,
        .coord.y
    )]
    OccupancyDesync {
        net: NetId,
        coord: GridCoord,
        direction: Direction,
    },

    /// A net tried to occupy the same directed edge twice.
    #[error("net {net} already occupies the {direction:?} edge of gcell ({}, {})", .coord.x, .coord.y)]
    DuplicateReservation {
        net: NetId,
        coord: GridCoord,
        direction: Direction,
    },

    #[error("net '{name}' ({net}) has {count} pins, expected exactly 2")]
    PinCount {
        net: NetId,
        name: String,
        count: usize,
    },

    #[error(
        "pin ({}, {}) of net '{name}' ({net}) lies outside the {grid_x}x{grid_y} grid",
        .pin.x,
        .pin.y
    )]
    PinOutOfBounds {
        net: NetId,
        name: String,
        pin: GridCoord,
        grid_x: u32,
        grid_y: u32,
    },

    #[error("invalid routing grid {grid_x}x{grid_y} with capH={cap_h}, capV={cap_v}")]
    InvalidGrid {
        grid_x: u32,
        grid_y: u32,
        cap_h: u32,
        cap_v: u32,
    },
}

impl RouteError {
    /// Demand-model corruption, as opposed to a rejected input net.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            RouteError::OccupancyDesync { .. } | RouteError::DuplicateReservation { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desync_display() {
        let err = RouteError::OccupancyDesync {
            net: NetId::new(7),
            coord: GridCoord::new(2, 3),
            direction: Direction::Vertical,
        };
        let msg = err.to_string();
        assert!(msg.contains("net 7"));
        assert!(msg.contains("Vertical"));
        assert!(msg.contains("(2, 3)"));
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn precondition_display() {
        let err = RouteError::PinOutOfBounds {
            net: NetId::new(1),
            name: "clk".to_string(),
            pin: GridCoord::new(9, 0),
            grid_x: 4,
            grid_y: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("(9, 0)"));
        assert!(msg.contains("'clk'"));
        assert!(msg.contains("4x4"));
        assert!(!err.is_invariant_violation());

        let err = RouteError::PinCount {
            net: NetId::new(2),
            name: "bus".to_string(),
            count: 3,
        };
        assert!(err.to_string().contains("3 pins"));
    }
}
