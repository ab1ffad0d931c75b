use crate::db::indices::NetId;
use crate::geom::coord::GridCoord;
use std::collections::HashMap;

/// Routing track direction. Every gcell owns one horizontal and one vertical
/// edge: the edge towards `x + 1` and the edge towards `y + 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Horizontal,
    Vertical,
}

#[derive(Clone, Debug)]
pub struct NetData {
    pub name: String,
    pub pins: Vec<GridCoord>,
}

/// Grid dimensions, uniform capacities and the dense net list.
#[derive(Debug)]
pub struct RoutingDesign {
    pub grid_x: u32,
    pub grid_y: u32,
    pub cap_h: u32,
    pub cap_v: u32,

    pub nets: Vec<NetData>,
    pub net_name_map: HashMap<String, NetId>,
}

impl RoutingDesign {
    pub fn new(grid_x: u32, grid_y: u32, cap_h: u32, cap_v: u32) -> Self {
        Self {
            grid_x,
            grid_y,
            cap_h,
            cap_v,
            nets: Vec::with_capacity(1000),
            net_name_map: HashMap::new(),
        }
    }

    pub fn num_nets(&self) -> usize {
        self.nets.len()
    }

    pub fn capacity(&self, dir: Direction) -> u32 {
        match dir {
            Direction::Horizontal => self.cap_h,
            Direction::Vertical => self.cap_v,
        }
    }

    #[inline]
    pub fn in_bounds(&self, c: GridCoord) -> bool {
        c.x < self.grid_x && c.y < self.grid_y
    }

    /// Returns the existing id when a net of that name was already added.
    pub fn add_net(&mut self, name: String) -> NetId {
        if let Some(&id) = self.net_name_map.get(&name) {
            return id;
        }
        let id = NetId::new(self.nets.len());
        self.nets.push(NetData {
            name: name.clone(),
            pins: Vec::with_capacity(2),
        });
        self.net_name_map.insert(name, id);
        id
    }

    pub fn add_pin(&mut self, net: NetId, pin: GridCoord) {
        self.nets[net.index()].pins.push(pin);
    }

    pub fn add_two_pin_net(&mut self, name: &str, p1: GridCoord, p2: GridCoord) -> NetId {
        let id = self.add_net(name.to_string());
        self.add_pin(id, p1);
        self.add_pin(id, p2);
        id
    }

    pub fn net(&self, id: NetId) -> &NetData {
        &self.nets[id.index()]
    }
}
