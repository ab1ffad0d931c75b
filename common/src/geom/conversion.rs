use super::coord::GridCoord;

/// Maps absolute benchmark coordinates onto gcell indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridConverter {
    offset_x: i64,
    offset_y: i64,
    tile_w: i64,
    tile_h: i64,
    grid_w: u32,
    grid_h: u32,
}

impl GridConverter {
    /// Identity mapping: input coordinates already are gcell indices.
    pub fn identity(grid_w: u32, grid_h: u32) -> Self {
        Self::from_tiles(0, 0, 1, 1, grid_w, grid_h)
    }

    pub fn from_tiles(
        off_x: i64,
        off_y: i64,
        tile_w: i64,
        tile_h: i64,
        grid_w: u32,
        grid_h: u32,
    ) -> Self {
        Self {
            offset_x: off_x,
            offset_y: off_y,
            tile_w: tile_w.max(1),
            tile_h: tile_h.max(1),
            grid_w,
            grid_h,
        }
    }

    /// Converts and clamps into the grid.
    pub fn to_grid(&self, x: i64, y: i64) -> GridCoord {
        let raw_x = (x - self.offset_x).div_euclid(self.tile_w);
        let raw_y = (y - self.offset_y).div_euclid(self.tile_h);

        let gx = raw_x.clamp(0, self.grid_w.saturating_sub(1) as i64) as u32;
        let gy = raw_y.clamp(0, self.grid_h.saturating_sub(1) as i64) as u32;

        GridCoord::new(gx, gy)
    }

    /// Converts without clamping. `None` when the point falls outside the grid.
    pub fn to_grid_checked(&self, x: i64, y: i64) -> Option<GridCoord> {
        let raw_x = (x - self.offset_x).div_euclid(self.tile_w);
        let raw_y = (y - self.offset_y).div_euclid(self.tile_h);
        if raw_x < 0 || raw_y < 0 || raw_x >= self.grid_w as i64 || raw_y >= self.grid_h as i64 {
            return None;
        }
        Some(GridCoord::new(raw_x as u32, raw_y as u32))
    }
}
