use super::RoutingGrid;
use crate::error::RouteError;
use groute_common::db::core::Direction;
use groute_common::db::demand::DemandSnapshot;
use groute_common::db::indices::NetId;
use groute_common::geom::coord::GridCoord;
use std::ops::Range;

/// Nets occupying the two edges owned by a gcell, in reservation order.
#[derive(Clone, Default)]
struct GCell {
    nets_h: Vec<NetId>,
    nets_v: Vec<NetId>,
}

/// Flat gcell array plus two dense demand matrices.
///
/// `dem_h` is row-major (`y * width + x`) and `dem_v` column-major
/// (`x * height + y`), so a row scan of horizontal demand and a column scan of
/// vertical demand are both contiguous slices. Both matrices change only
/// together with the matching occupancy list.
pub struct DenseGrid {
    width: u32,
    height: u32,
    cap_h: u32,
    cap_v: u32,
    cells: Vec<GCell>,
    dem_h: Vec<u32>,
    dem_v: Vec<u32>,
}

impl DenseGrid {
    pub fn new(width: u32, height: u32, cap_h: u32, cap_v: u32) -> Self {
        let size = (width as usize) * (height as usize);

        if size > 100_000_000 {
            log::warn!(
                "Allocating large DenseGrid: {} gcells. Ensure sufficient RAM.",
                size
            );
        }

        Self {
            width,
            height,
            cap_h,
            cap_v,
            cells: vec![GCell::default(); size],
            dem_h: vec![0; size],
            dem_v: vec![0; size],
        }
    }

    #[inline(always)]
    fn cell_index(&self, c: GridCoord) -> usize {
        (c.y as usize) * (self.width as usize) + (c.x as usize)
    }

    #[inline(always)]
    fn h_index(&self, c: GridCoord) -> usize {
        (c.y as usize) * (self.width as usize) + (c.x as usize)
    }

    #[inline(always)]
    fn v_index(&self, c: GridCoord) -> usize {
        (c.x as usize) * (self.height as usize) + (c.y as usize)
    }

    fn slot_mut(&mut self, c: GridCoord, dir: Direction) -> (&mut u32, &mut Vec<NetId>) {
        let ci = self.cell_index(c);
        match dir {
            Direction::Horizontal => {
                let di = self.h_index(c);
                (&mut self.dem_h[di], &mut self.cells[ci].nets_h)
            }
            Direction::Vertical => {
                let di = self.v_index(c);
                (&mut self.dem_v[di], &mut self.cells[ci].nets_v)
            }
        }
    }

    /// Copies the demand counters out, both in row-major order.
    pub fn snapshot(&self) -> DemandSnapshot {
        let mut vertical = vec![0; self.dem_v.len()];
        for y in 0..self.height {
            for x in 0..self.width {
                let c = GridCoord::new(x, y);
                vertical[self.h_index(c)] = self.dem_v[self.v_index(c)];
            }
        }
        DemandSnapshot {
            width: self.width,
            height: self.height,
            cap_h: self.cap_h,
            cap_v: self.cap_v,
            horizontal: self.dem_h.clone(),
            vertical,
        }
    }

    /// Finds the first gcell whose demand counter disagrees with its
    /// occupancy list.
    pub fn find_desync(&self) -> Option<(GridCoord, Direction)> {
        for y in 0..self.height {
            for x in 0..self.width {
                let c = GridCoord::new(x, y);
                let cell = &self.cells[self.cell_index(c)];
                if self.dem_h[self.h_index(c)] as usize != cell.nets_h.len() {
                    return Some((c, Direction::Horizontal));
                }
                if self.dem_v[self.v_index(c)] as usize != cell.nets_v.len() {
                    return Some((c, Direction::Vertical));
                }
            }
        }
        None
    }

    pub fn total_demand(&self) -> u64 {
        self.dem_h
            .iter()
            .chain(self.dem_v.iter())
            .map(|&d| d as u64)
            .sum()
    }
}

impl RoutingGrid for DenseGrid {
    fn width(&self) -> u32 {
        self.width
    }
    fn height(&self) -> u32 {
        self.height
    }

    fn capacity(&self, dir: Direction) -> u32 {
        match dir {
            Direction::Horizontal => self.cap_h,
            Direction::Vertical => self.cap_v,
        }
    }

    #[inline(always)]
    fn demand(&self, coord: GridCoord, dir: Direction) -> u32 {
        match dir {
            Direction::Horizontal => self.dem_h[self.h_index(coord)],
            Direction::Vertical => self.dem_v[self.v_index(coord)],
        }
    }

    fn occupants(&self, coord: GridCoord, dir: Direction) -> &[NetId] {
        let cell = &self.cells[self.cell_index(coord)];
        match dir {
            Direction::Horizontal => &cell.nets_h,
            Direction::Vertical => &cell.nets_v,
        }
    }

    fn add_wire(&mut self, net: NetId, coord: GridCoord, dir: Direction) -> Result<(), RouteError> {
        let (demand, nets) = self.slot_mut(coord, dir);
        if nets.contains(&net) {
            return Err(RouteError::DuplicateReservation {
                net,
                coord,
                direction: dir,
            });
        }
        nets.push(net);
        *demand += 1;
        Ok(())
    }

    fn remove_wire(
        &mut self,
        net: NetId,
        coord: GridCoord,
        dir: Direction,
    ) -> Result<(), RouteError> {
        let (demand, nets) = self.slot_mut(coord, dir);
        match nets.iter().position(|&n| n == net) {
            Some(pos) => {
                // Keep reservation order for the rip-up policies.
                nets.remove(pos);
                *demand -= 1;
                Ok(())
            }
            None => Err(RouteError::OccupancyDesync {
                net,
                coord,
                direction: dir,
            }),
        }
    }

    fn row_demand(&self, y: u32, xs: Range<u32>) -> u32 {
        if xs.start >= xs.end {
            return 0;
        }
        let base = (y as usize) * (self.width as usize);
        self.dem_h[base + xs.start as usize..base + xs.end as usize]
            .iter()
            .sum()
    }

    fn column_demand(&self, x: u32, ys: Range<u32>) -> u32 {
        if ys.start >= ys.end {
            return 0;
        }
        let base = (x as usize) * (self.height as usize);
        self.dem_v[base + ys.start as usize..base + ys.end as usize]
            .iter()
            .sum()
    }
}
