//! Hadlock's minimum-detour maze search.
//!
//! The cost of a partial path is its detour number: the count of moves that
//! take it further from the target. Moves towards the target are free, so
//! the cost is non-decreasing along every path and the first time a gcell is
//! enqueued it is already reached at its minimum cost. Gcells are therefore
//! marked visited on enqueue.

use crate::error::RouteError;
use crate::grid::RoutingGrid;
use crate::route::RouteRecord;
use groute_common::db::core::Direction;
use groute_common::db::indices::NetId;
use groute_common::geom::coord::GridCoord;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    North,
    South,
    West,
    East,
}

impl Step {
    /// Expansion order.
    pub const ALL: [Step; 4] = [Step::North, Step::South, Step::West, Step::East];

    fn target(self, from: GridCoord, w: u32, h: u32) -> Option<GridCoord> {
        match self {
            Step::North if from.y + 1 < h => Some(GridCoord::new(from.x, from.y + 1)),
            Step::South if from.y > 0 => Some(GridCoord::new(from.x, from.y - 1)),
            Step::West if from.x > 0 => Some(GridCoord::new(from.x - 1, from.y)),
            Step::East if from.x + 1 < w => Some(GridCoord::new(from.x + 1, from.y)),
            _ => None,
        }
    }

    /// Owner gcell and direction of the edge crossed when stepping away from
    /// `from`. Edges belong to their lower (vertical) or left (horizontal)
    /// gcell, the same convention the pattern router charges.
    pub fn edge(self, from: GridCoord) -> (GridCoord, Direction) {
        match self {
            Step::North => (from, Direction::Vertical),
            Step::South => (GridCoord::new(from.x, from.y - 1), Direction::Vertical),
            Step::West => (GridCoord::new(from.x - 1, from.y), Direction::Horizontal),
            Step::East => (from, Direction::Horizontal),
        }
    }
}

/// Full edges at the moment a search starts.
pub struct BlockageMap {
    width: usize,
    blocked_h: Vec<bool>,
    blocked_v: Vec<bool>,
}

impl BlockageMap {
    pub fn from_grid<G: RoutingGrid + ?Sized>(grid: &G) -> Self {
        let width = grid.width() as usize;
        let size = width * grid.height() as usize;
        let mut blocked_h = vec![false; size];
        let mut blocked_v = vec![false; size];

        if width > 0 {
            blocked_h
                .par_chunks_mut(width)
                .zip(blocked_v.par_chunks_mut(width))
                .enumerate()
                .for_each(|(y, (row_h, row_v))| {
                    for x in 0..width {
                        let c = GridCoord::new(x as u32, y as u32);
                        row_h[x] = grid.is_blocked(c, Direction::Horizontal);
                        row_v[x] = grid.is_blocked(c, Direction::Vertical);
                    }
                });
        }

        Self {
            width,
            blocked_h,
            blocked_v,
        }
    }

    #[inline(always)]
    pub fn is_blocked(&self, c: GridCoord, dir: Direction) -> bool {
        let idx = (c.y as usize) * self.width + (c.x as usize);
        match dir {
            Direction::Horizontal => self.blocked_h[idx],
            Direction::Vertical => self.blocked_v[idx],
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Vertex {
    pos: GridCoord,
    cost: u32,
    /// Predecessor in the arena and the step taken from it.
    link: Option<(u32, Step)>,
}

/// Open-set entry. Arena indices grow with enqueue order, so they double as
/// the discovery sequence.
#[derive(Copy, Clone, Eq, PartialEq)]
struct OpenEntry {
    cost: u32,
    vertex: u32,
}

/// Min-first policy for `BinaryHeap`: lower detour count, then earlier
/// discovery.
impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Result of a successful search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MazePath {
    /// Crossed edges, target side first.
    pub edges: Vec<(GridCoord, Direction)>,
    /// Target, every bend, then source.
    pub waypoints: Vec<GridCoord>,
    pub detours: u32,
}

/// Reusable search state. The vertex arena is rebuilt on every search.
#[derive(Clone, Default)]
pub struct MazeRouter {
    arena: Vec<Vertex>,
    visited_tag: Vec<u32>,
    current_tag: u32,
}

impl MazeRouter {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset(&mut self, size: usize) {
        self.arena.clear();
        if self.visited_tag.len() < size {
            self.visited_tag.resize(size, 0);
        }
        self.current_tag = self.current_tag.wrapping_add(1);
        if self.current_tag == 0 {
            self.visited_tag.fill(0);
            self.current_tag = 1;
        }
    }

    fn enqueue(
        &mut self,
        open: &mut BinaryHeap<OpenEntry>,
        slot: usize,
        pos: GridCoord,
        cost: u32,
        link: Option<(u32, Step)>,
    ) {
        let vertex = self.arena.len() as u32;
        self.arena.push(Vertex { pos, cost, link });
        self.visited_tag[slot] = self.current_tag;
        open.push(OpenEntry { cost, vertex });
    }

    /// Searches for a minimum-detour path that crosses no full edge.
    ///
    /// Returns `None` when the target is unreachable or either pin lies off
    /// the grid.
    pub fn find_path<G: RoutingGrid + ?Sized>(
        &mut self,
        grid: &G,
        src: GridCoord,
        dst: GridCoord,
    ) -> Option<MazePath> {
        if !grid.contains(src) || !grid.contains(dst) {
            return None;
        }

        let w = grid.width();
        let h = grid.height();
        let slot = |c: GridCoord| (c.y as usize) * (w as usize) + (c.x as usize);

        let blockage = BlockageMap::from_grid(grid);
        self.reset((w as usize) * (h as usize));

        let mut open = BinaryHeap::new();
        self.enqueue(&mut open, slot(src), src, 0, None);

        while let Some(OpenEntry { vertex, .. }) = open.pop() {
            let Vertex { pos, cost, .. } = self.arena[vertex as usize];
            if pos == dst {
                return Some(self.trace(vertex));
            }

            let dist = pos.manhattan(dst);
            for step in Step::ALL {
                let Some(next) = step.target(pos, w, h) else {
                    continue;
                };
                let (edge, dir) = step.edge(pos);
                if blockage.is_blocked(edge, dir) {
                    continue;
                }
                let next_slot = slot(next);
                if self.visited_tag[next_slot] == self.current_tag {
                    continue;
                }
                let detour = u32::from(next.manhattan(dst) > dist);
                self.enqueue(&mut open, next_slot, next, cost + detour, Some((vertex, step)));
            }
        }
        None
    }

    fn trace(&self, target: u32) -> MazePath {
        let mut cur = &self.arena[target as usize];
        let detours = cur.cost;
        let mut edges = Vec::new();
        let mut waypoints = vec![cur.pos];
        let mut later_step = cur.link.map(|(_, s)| s);

        while let Some((parent, step)) = cur.link {
            let prev = &self.arena[parent as usize];
            edges.push(step.edge(prev.pos));
            if Some(step) != later_step {
                waypoints.push(cur.pos);
            }
            later_step = Some(step);
            cur = prev;
        }
        if waypoints.last() != Some(&cur.pos) {
            waypoints.push(cur.pos);
        }

        MazePath {
            edges,
            waypoints,
            detours,
        }
    }

    /// Maze-routes one released net and commits the path on success.
    ///
    /// `Ok(false)` means the target is unreachable under the current
    /// blockage; the grid and the record are left untouched.
    pub fn route_net<G: RoutingGrid + ?Sized>(
        &mut self,
        grid: &mut G,
        net: NetId,
        src: GridCoord,
        dst: GridCoord,
        record: &mut RouteRecord,
    ) -> Result<bool, RouteError> {
        debug_assert!(record.reservations().is_empty());

        let Some(path) = self.find_path(grid, src, dst) else {
            return Ok(false);
        };
        for &(coord, dir) in &path.edges {
            record.reserve(grid, net, coord, dir)?;
        }
        record.commit(path.waypoints);
        Ok(true)
    }
}
