use crate::db::core::Direction;
use crate::geom::coord::GridCoord;
use std::fmt;

/// Value copy of the per-direction demand counters, row-major (`y * width + x`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DemandSnapshot {
    pub width: u32,
    pub height: u32,
    pub cap_h: u32,
    pub cap_v: u32,
    pub horizontal: Vec<u32>,
    pub vertical: Vec<u32>,
}

impl DemandSnapshot {
    #[inline]
    fn index(&self, c: GridCoord) -> usize {
        (c.y as usize) * (self.width as usize) + (c.x as usize)
    }

    pub fn demand(&self, c: GridCoord, dir: Direction) -> u32 {
        let idx = self.index(c);
        match dir {
            Direction::Horizontal => self.horizontal[idx],
            Direction::Vertical => self.vertical[idx],
        }
    }

    pub fn capacity(&self, dir: Direction) -> u32 {
        match dir {
            Direction::Horizontal => self.cap_h,
            Direction::Vertical => self.cap_v,
        }
    }

    /// Edges whose demand exceeds capacity, vertical first.
    pub fn overflow_cells(&self) -> Vec<(GridCoord, Direction, u32)> {
        let mut cells = Vec::new();
        for dir in [Direction::Vertical, Direction::Horizontal] {
            let cap = self.capacity(dir);
            for y in 0..self.height {
                for x in 0..self.width {
                    let c = GridCoord::new(x, y);
                    let d = self.demand(c, dir);
                    if d > cap {
                        cells.push((c, dir, d - cap));
                    }
                }
            }
        }
        cells
    }

    pub fn total_overflow(&self) -> u64 {
        let over = |dem: &[u32], cap: u32| -> u64 {
            dem.iter().map(|&d| d.saturating_sub(cap) as u64).sum()
        };
        over(&self.horizontal, self.cap_h) + over(&self.vertical, self.cap_v)
    }

    pub fn total_demand(&self) -> u64 {
        self.horizontal
            .iter()
            .chain(self.vertical.iter())
            .map(|&d| d as u64)
            .sum()
    }

    /// Highest demand/capacity ratio over both directions of a gcell.
    pub fn utilization(&self, c: GridCoord) -> f64 {
        let h = self.demand(c, Direction::Horizontal) as f64 / self.cap_h.max(1) as f64;
        let v = self.demand(c, Direction::Vertical) as f64 / self.cap_v.max(1) as f64;
        h.max(v)
    }
}

impl fmt::Display for DemandSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for table in [&self.vertical, &self.horizontal] {
            for y in 0..self.height as usize {
                for x in 0..self.width as usize {
                    write!(f, "{:>3}", table[y * self.width as usize + x])?;
                }
                writeln!(f)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
