pub mod algo;
pub mod check;
pub mod error;
pub mod global_router;
pub mod grid;
pub mod output;
pub mod overflow;
pub mod route;

pub use error::RouteError;
pub use global_router::{GlobalRouter, PassReport, RoutingSummary};

use groute_common::db::core::RoutingDesign;
use groute_common::util::config::GlobalRoutingConfig;

/// Pattern route plus the configured number of overflow passes.
pub fn route<'a>(
    design: &'a RoutingDesign,
    config: &GlobalRoutingConfig,
) -> Result<(GlobalRouter<'a>, RoutingSummary), RouteError> {
    let mut router = GlobalRouter::new(design, config)?;
    let summary = router.run(config.max_rounds)?;
    log::info!(
        "Global routing: {} routed, {} failed, {} rejected, {} over-capacity edges after {} pass(es)",
        summary.routed,
        summary.failed.len(),
        summary.rejected,
        summary.conflicts,
        summary.rounds
    );
    Ok((router, summary))
}
