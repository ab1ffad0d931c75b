use groute_common::db::core::{Direction, RoutingDesign};
use groute_common::db::indices::NetId;
use groute_common::db::parser::ispd;
use groute_common::geom::coord::GridCoord;
use groute_common::util::config::{GlobalRoutingConfig, RerouteOrder, RipupPolicy};
use groute_router::grid::RoutingGrid;
use groute_router::overflow::OverflowLedger;
use groute_router::{GlobalRouter, check, output};

fn c(x: u32, y: u32) -> GridCoord {
    GridCoord::new(x, y)
}

fn same_track_design() -> RoutingDesign {
    let mut design = RoutingDesign::new(4, 4, 1, 1);
    design.add_two_pin_net("net0", c(0, 1), c(3, 1));
    design.add_two_pin_net("net1", c(0, 1), c(3, 1));
    design
}

fn dump(router: &GlobalRouter) -> String {
    let mut buf = Vec::new();
    output::write_routes(&mut buf, router.design(), router.routes()).unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn two_nets_on_one_track_are_separated() {
    let design = same_track_design();
    let mut router = GlobalRouter::new(&design, &GlobalRoutingConfig::default()).unwrap();

    router.pattern_route().unwrap();
    for x in 0..3 {
        assert_eq!(router.grid().demand(c(x, 1), Direction::Horizontal), 2);
    }
    assert_eq!(router.grid().total_conflicts(), 3);

    let report = router.resolve_overflow().unwrap();
    assert_eq!(report.ripped, 1);
    assert_eq!(report.rerouted, 1);
    assert!(report.failed.is_empty());

    assert_eq!(
        router.route(NetId::new(0)).waypoints(),
        &[c(0, 1), c(0, 1), c(0, 1), c(3, 1)]
    );
    assert_eq!(
        router.route(NetId::new(1)).waypoints(),
        &[c(3, 1), c(3, 2), c(0, 2), c(0, 1)]
    );
    assert_eq!(router.grid().total_conflicts(), 0);
    assert_eq!(router.grid().total_demand(), 8);

    assert_eq!(
        dump(&router),
        "net0 0\n\
         (0, 1, 1)-(0, 1, 1)\n\
         (0, 1, 1)-(0, 1, 1)\n\
         (0, 1, 1)-(3, 1, 1)\n\
         !\n\
         net1 1\n\
         (3, 1, 1)-(3, 2, 1)\n\
         (3, 2, 1)-(0, 2, 1)\n\
         (0, 2, 1)-(0, 1, 1)\n\
         !\n"
    );
    assert!(check::run(&router).is_ok());
}

#[test]
fn second_attribution_after_convergence_finds_nothing() {
    let design = same_track_design();
    let mut router = GlobalRouter::new(&design, &GlobalRoutingConfig::default()).unwrap();
    let summary = router.run(1).unwrap();
    assert_eq!(summary.conflicts, 0);
    assert_eq!(summary.routed, 2);

    let mut ledger = OverflowLedger::new(design.num_nets());
    assert_eq!(ledger.attribute(router.grid()), 0);
    assert!(ledger.values().iter().all(|&v| v == 0));
}

#[test]
fn demand_equals_reservation_logs() {
    let text = "\
grid 8 8 2
vertical capacity 1 1
horizontal capacity 1 1
num net 6
a 0 2
0 0
7 7
b 1 2
7 0
0 7
c 2 2
0 3
7 3
d 3 2
0 3
7 3
e 4 2
3 0
3 7
f 5 2
4 4
4 4
";
    let design = ispd::parse_str(text).unwrap();
    let mut router = GlobalRouter::new(&design, &GlobalRoutingConfig::default()).unwrap();
    router.run(3).unwrap();

    let logged: u64 = router
        .routes()
        .iter()
        .map(|r| r.reservations().len() as u64)
        .sum();
    assert_eq!(router.grid().total_demand(), logged);
    assert!(router.grid().find_desync().is_none());
    assert!(check::run(&router).is_ok());
}

#[test]
fn routing_is_deterministic() {
    let mut design = RoutingDesign::new(10, 10, 1, 1);
    for i in 0..12u32 {
        let a = c(i % 10, (i * 3) % 10);
        let b = c((i * 7 + 3) % 10, (i * 5 + 1) % 10);
        design.add_two_pin_net(&format!("n{}", i), a, b);
    }
    let config = GlobalRoutingConfig {
        max_rounds: 4,
        ripup_policy: RipupPolicy::MostRecent,
        reroute_order: RerouteOrder::Ascending,
    };

    let mut first = GlobalRouter::new(&design, &config).unwrap();
    let s1 = first.run(config.max_rounds).unwrap();
    let mut second = GlobalRouter::new(&design, &config).unwrap();
    let s2 = second.run(config.max_rounds).unwrap();

    assert_eq!(s1, s2);
    assert_eq!(dump(&first), dump(&second));
    assert_eq!(first.demand_snapshot(), second.demand_snapshot());
}

#[test]
fn rejected_nets_are_written_unrouted() {
    let mut design = RoutingDesign::new(4, 4, 2, 2);
    design.add_two_pin_net("good", c(0, 0), c(3, 0));
    let lonely = design.add_net("lonely".to_string());
    design.add_pin(lonely, c(1, 1));

    let (router, summary) = groute_router::route(&design, &GlobalRoutingConfig::default()).unwrap();
    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.routed, 1);
    assert_eq!(summary.rounds, 0);
    assert_eq!(
        dump(&router),
        "good 0\n\
         (0, 0, 1)-(0, 0, 1)\n\
         (0, 0, 1)-(0, 0, 1)\n\
         (0, 0, 1)-(3, 0, 1)\n\
         !\n\
         lonely 1\n\
         !\n"
    );
}

#[test]
fn walled_off_net_fails_without_aborting() {
    // Capacity 1 and three nets that must all leave the corner gcell (0,0)
    // through its two edges.
    let mut design = RoutingDesign::new(3, 3, 1, 1);
    design.add_two_pin_net("a", c(0, 0), c(2, 0));
    design.add_two_pin_net("b", c(0, 0), c(0, 2));
    design.add_two_pin_net("c", c(0, 0), c(2, 2));

    let mut router = GlobalRouter::new(&design, &GlobalRoutingConfig::default()).unwrap();
    let summary = router.run(2).unwrap();
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.routed, 2);
    assert_eq!(summary.conflicts, 0);
    assert!(check::run(&router).is_ok());

    let failed = summary.failed[0];
    assert!(router.route(failed).reservations().is_empty());
    let text = dump(&router);
    let header = format!("{} {}\n!\n", design.net(failed).name, failed);
    assert!(text.contains(&header));
}
