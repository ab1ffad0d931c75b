use crate::algo::hadlock::MazeRouter;
use crate::algo::pattern;
use crate::error::RouteError;
use crate::grid::{DenseGrid, RoutingGrid};
use crate::overflow::{self, OverflowLedger, RerouteQueue};
use crate::route::RouteRecord;
use groute_common::db::core::RoutingDesign;
use groute_common::db::demand::DemandSnapshot;
use groute_common::db::indices::NetId;
use groute_common::geom::coord::GridCoord;
use groute_common::util::config::{GlobalRoutingConfig, RerouteOrder, RipupPolicy};
use groute_common::util::profiler::ScopedTimer;

/// Outcome of one overflow-resolution pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Over-capacity edges found when the pass started.
    pub overflow_edges: usize,
    pub ripped: usize,
    pub rerouted: usize,
    /// Nets the maze router could not place. They stay unrouted.
    pub failed: Vec<NetId>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoutingSummary {
    pub routed: usize,
    pub failed: Vec<NetId>,
    pub rejected: usize,
    pub conflicts: usize,
    pub total_overflow: u64,
    pub rounds: usize,
}

/// Owns the demand model and every net's route record for one run.
///
/// Nets are routed one at a time; each routing decision sees the demand left
/// by all earlier ones, so net order is part of the result.
pub struct GlobalRouter<'a> {
    design: &'a RoutingDesign,
    grid: DenseGrid,
    routes: Vec<RouteRecord>,
    ledger: OverflowLedger,
    maze: MazeRouter,
    /// Nets that passed validation, in id order.
    queue: Vec<NetId>,
    rejected: Vec<RouteError>,
    /// Nets left unrouted by the last pass.
    failed: Vec<NetId>,
    ripup_policy: RipupPolicy,
    reroute_order: RerouteOrder,
}

impl<'a> GlobalRouter<'a> {
    /// Builds the demand model and validates every net.
    ///
    /// Malformed nets are excluded from routing and listed in
    /// [`GlobalRouter::rejected`]; only an unusable grid is an error.
    pub fn new(
        design: &'a RoutingDesign,
        config: &GlobalRoutingConfig,
    ) -> Result<Self, RouteError> {
        if design.grid_x == 0 || design.grid_y == 0 || design.cap_h == 0 || design.cap_v == 0 {
            return Err(RouteError::InvalidGrid {
                grid_x: design.grid_x,
                grid_y: design.grid_y,
                cap_h: design.cap_h,
                cap_v: design.cap_v,
            });
        }

        let mut queue = Vec::with_capacity(design.num_nets());
        let mut rejected = Vec::new();
        for id in 0..design.num_nets() {
            let net = NetId::new(id);
            match validate_net(design, net) {
                Ok(()) => queue.push(net),
                Err(e) => {
                    log::warn!("Skipping net: {}", e);
                    rejected.push(e);
                }
            }
        }

        Ok(Self {
            design,
            grid: DenseGrid::new(design.grid_x, design.grid_y, design.cap_h, design.cap_v),
            routes: vec![RouteRecord::new(); design.num_nets()],
            ledger: OverflowLedger::new(design.num_nets()),
            maze: MazeRouter::new(),
            queue,
            rejected,
            failed: Vec::new(),
            ripup_policy: config.ripup_policy,
            reroute_order: config.reroute_order,
        })
    }

    pub fn design(&self) -> &RoutingDesign {
        self.design
    }

    pub fn grid(&self) -> &DenseGrid {
        &self.grid
    }

    pub fn routes(&self) -> &[RouteRecord] {
        &self.routes
    }

    pub fn route(&self, net: NetId) -> &RouteRecord {
        &self.routes[net.index()]
    }

    pub fn ledger(&self) -> &OverflowLedger {
        &self.ledger
    }

    pub fn rejected(&self) -> &[RouteError] {
        &self.rejected
    }

    pub fn failed(&self) -> &[NetId] {
        &self.failed
    }

    pub fn demand_snapshot(&self) -> DemandSnapshot {
        self.grid.snapshot()
    }

    fn pins(&self, net: NetId) -> (GridCoord, GridCoord) {
        let pins = &self.design.net(net).pins;
        (pins[0], pins[1])
    }

    /// Pattern-routes every valid net in id order, ignoring capacity.
    /// Anything routed before is released first.
    pub fn pattern_route(&mut self) -> Result<(), RouteError> {
        let _timer = ScopedTimer::new("Pattern route");
        log::info!("Start pattern route: {} nets", self.queue.len());

        for (id, record) in self.routes.iter_mut().enumerate() {
            record.release(&mut self.grid, NetId::new(id))?;
        }
        self.failed.clear();

        for i in 0..self.queue.len() {
            let net = self.queue[i];
            let (p1, p2) = self.pins(net);
            pattern::route_net(&mut self.grid, net, p1, p2, &mut self.routes[net.index()])?;
        }

        log::info!(
            "Pattern route done: {} over-capacity edges, total overflow {}",
            self.grid.total_conflicts(),
            self.grid.total_overflow()
        );
        log::debug!("Demand after pattern route:\n{}", self.grid.snapshot());
        Ok(())
    }

    /// One overflow-resolution pass: attribute, rip up, maze-reroute.
    ///
    /// The ledger is cleared first, so priorities only reflect the current
    /// demand. Nets that failed in an earlier pass are queued again ahead of
    /// the rip-up.
    pub fn resolve_overflow(&mut self) -> Result<PassReport, RouteError> {
        let _timer = ScopedTimer::new("Overflow pass");

        self.ledger.reset();
        let overflow_edges = self.ledger.attribute(&self.grid);

        let mut queue = RerouteQueue::new(self.reroute_order);
        for net in std::mem::take(&mut self.failed) {
            queue.push(net, self.ledger.get(net));
        }

        let ripped = overflow::rip_up(
            &mut self.grid,
            &mut self.routes,
            &self.ledger,
            &mut queue,
            self.ripup_policy,
        )?;
        log::info!(
            "Overflow pass: {} over-capacity edges, {} nets ripped up, {} queued",
            overflow_edges,
            ripped.len(),
            queue.len()
        );

        let mut report = PassReport {
            overflow_edges,
            ripped: ripped.len(),
            ..PassReport::default()
        };

        while let Some(net) = queue.pop() {
            let (p1, p2) = self.pins(net);
            let record = &mut self.routes[net.index()];
            if self.maze.route_net(&mut self.grid, net, p1, p2, record)? {
                report.rerouted += 1;
            } else {
                log::warn!(
                    "Maze route failed for net '{}' ({}): no path under current blockage",
                    self.design.net(net).name,
                    net
                );
                report.failed.push(net);
            }
        }

        self.failed = report.failed.clone();
        log::info!(
            "Overflow pass done: {} rerouted, {} failed, {} over-capacity edges left",
            report.rerouted,
            report.failed.len(),
            self.grid.total_conflicts()
        );
        log::debug!("Demand after overflow pass:\n{}", self.grid.snapshot());
        Ok(report)
    }

    /// Pattern route, then up to `max_rounds` overflow passes. Stops early
    /// once nothing is over capacity and no net is waiting for a retry.
    pub fn run(&mut self, max_rounds: usize) -> Result<RoutingSummary, RouteError> {
        self.pattern_route()?;

        let mut rounds = 0;
        while rounds < max_rounds {
            if self.grid.total_conflicts() == 0 && self.failed.is_empty() {
                log::info!("Global routing converged after {} overflow pass(es)", rounds);
                break;
            }
            self.resolve_overflow()?;
            rounds += 1;
        }

        let summary = self.summary(rounds);
        if summary.conflicts > 0 || !summary.failed.is_empty() {
            log::warn!(
                "Routing finished with {} over-capacity edges and {} unrouted nets",
                summary.conflicts,
                summary.failed.len()
            );
        }
        Ok(summary)
    }

    pub fn summary(&self, rounds: usize) -> RoutingSummary {
        RoutingSummary {
            routed: self.routes.iter().filter(|r| r.is_routed()).count(),
            failed: self.failed.clone(),
            rejected: self.rejected.len(),
            conflicts: self.grid.total_conflicts(),
            total_overflow: self.grid.total_overflow(),
            rounds,
        }
    }
}

/// Exactly two pins, both on the grid.
fn validate_net(design: &RoutingDesign, net: NetId) -> Result<(), RouteError> {
    let data = design.net(net);
    if data.pins.len() != 2 {
        return Err(RouteError::PinCount {
            net,
            name: data.name.clone(),
            count: data.pins.len(),
        });
    }
    if let Some(&pin) = data.pins.iter().find(|&&p| !design.in_bounds(p)) {
        return Err(RouteError::PinOutOfBounds {
            net,
            name: data.name.clone(),
            pin,
            grid_x: design.grid_x,
            grid_y: design.grid_y,
        });
    }
    Ok(())
}
