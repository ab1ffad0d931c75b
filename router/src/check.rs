//! Post-route verification of the demand model and the emitted geometry.

use crate::global_router::GlobalRouter;
use crate::grid::RoutingGrid;
use groute_common::db::indices::NetId;
use rayon::prelude::*;

/// Runs every check and logs PASS/FAIL per check. Remaining overflow is only
/// reported, it does not fail the run.
pub fn run(router: &GlobalRouter) -> Result<(), String> {
    log::info!("Starting route verification");

    let (demand_result, connectivity_result) =
        rayon::join(|| check_demand(router), || check_connectivity(router));

    let mut msgs = Vec::new();

    match demand_result {
        Err(e) => {
            log::error!("\x1b[31mFAIL\x1b[0m: Demand model out of sync");
            log::error!("{}", e);
            msgs.push(e);
        }
        Ok(_) => log::info!("\x1b[32mPASS\x1b[0m: Demand matches every reservation log."),
    }

    match connectivity_result {
        Err(e) => {
            log::error!("\x1b[31mFAIL\x1b[0m: Broken route geometry");
            log::error!("{}", e);
            msgs.push(e);
        }
        Ok(_) => log::info!("\x1b[32mPASS\x1b[0m: Every routed net connects its pins."),
    }

    let grid = router.grid();
    let conflicts = grid.total_conflicts();
    if conflicts > 0 {
        log::warn!(
            "{} edges still over capacity (total overflow {})",
            conflicts,
            grid.total_overflow()
        );
    }

    if msgs.is_empty() {
        log::info!("\x1b[32mSUCCESS\x1b[0m: Routing result is consistent");
        Ok(())
    } else {
        log::error!(
            "\x1b[31mFAILURE\x1b[0m: Routing result is inconsistent ({} errors)",
            msgs.len()
        );
        Err(msgs.join("; "))
    }
}

fn check_demand(router: &GlobalRouter) -> Result<(), String> {
    let grid = router.grid();

    if let Some((c, dir)) = grid.find_desync() {
        return Err(format!(
            "{:?} demand at ({}, {}) differs from its occupant count",
            dir, c.x, c.y
        ));
    }

    let logged: u64 = router
        .routes()
        .iter()
        .map(|r| r.reservations().len() as u64)
        .sum();
    let total = grid.total_demand();
    if logged != total {
        return Err(format!(
            "grid carries {} units of demand but the logs hold {}",
            total, logged
        ));
    }

    router
        .routes()
        .par_iter()
        .enumerate()
        .find_map_first(|(id, record)| {
            let net = NetId::new(id);
            record
                .reservations()
                .iter()
                .find(|r| !grid.occupants(r.coord, r.dir).contains(&net))
                .map(|r| {
                    format!(
                        "net '{}' logs the {:?} edge of ({}, {}) but does not occupy it",
                        router.design().net(net).name,
                        r.dir,
                        r.coord.x,
                        r.coord.y
                    )
                })
        })
        .map_or(Ok(()), Err)
}

fn check_connectivity(router: &GlobalRouter) -> Result<(), String> {
    let design = router.design();

    router
        .routes()
        .par_iter()
        .enumerate()
        .find_map_first(|(id, record)| {
            let net = design.net(NetId::new(id));
            if !record.is_routed() {
                if !record.reservations().is_empty() {
                    return Some(format!("Net '{}': unrouted but still holds edges", net.name));
                }
                return None;
            }

            let points = record.waypoints();
            let (Some(first), Some(last)) = (points.first(), points.last()) else {
                return Some(format!("Net '{}': routed without geometry", net.name));
            };
            let ends_ok = matches!(net.pins.as_slice(), [a, b]
                if (first == a && last == b) || (first == b && last == a));
            if !ends_ok {
                return Some(format!(
                    "Net '{}': route ends ({}, {})-({}, {}) do not match its pins",
                    net.name, first.x, first.y, last.x, last.y
                ));
            }
            if let Some(w) = points.windows(2).find(|w| !w[0].is_aligned(w[1])) {
                return Some(format!(
                    "Net '{}': diagonal segment ({}, {})-({}, {})",
                    net.name, w[0].x, w[0].y, w[1].x, w[1].y
                ));
            }
            if record.wirelength() as usize != record.reservations().len() {
                return Some(format!(
                    "Net '{}': geometry spans {} edges but {} are reserved",
                    net.name,
                    record.wirelength(),
                    record.reservations().len()
                ));
            }
            None
        })
        .map_or(Ok(()), Err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use groute_common::db::core::RoutingDesign;
    use groute_common::geom::coord::GridCoord;
    use groute_common::util::config::GlobalRoutingConfig;

    #[test]
    fn routed_design_passes() {
        let mut design = RoutingDesign::new(6, 6, 1, 1);
        design.add_two_pin_net("a", GridCoord::new(0, 2), GridCoord::new(5, 2));
        design.add_two_pin_net("b", GridCoord::new(0, 2), GridCoord::new(5, 2));
        design.add_two_pin_net("c", GridCoord::new(1, 0), GridCoord::new(4, 5));

        let mut router = GlobalRouter::new(&design, &GlobalRoutingConfig::default()).unwrap();
        router.run(3).unwrap();
        assert_eq!(run(&router), Ok(()));
    }

    #[test]
    fn empty_design_passes() {
        let design = RoutingDesign::new(2, 2, 1, 1);
        let router = GlobalRouter::new(&design, &GlobalRoutingConfig::default()).unwrap();
        assert!(run(&router).is_ok());
    }
}
