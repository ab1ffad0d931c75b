//! Route file writer.
//!
//! One block per net in id order: a `name id` header, one
//! `(x1, y1, 1)-(x2, y2, 1)` line per consecutive waypoint pair, then `!`.
//! Unrouted nets keep their header and terminator.

use crate::route::RouteRecord;
use groute_common::db::core::RoutingDesign;
use std::fs::File;
use std::io::{self, BufWriter, Write};

pub fn write_routes<W: Write>(
    w: &mut W,
    design: &RoutingDesign,
    routes: &[RouteRecord],
) -> io::Result<()> {
    for (id, (net, record)) in design.nets.iter().zip(routes).enumerate() {
        writeln!(w, "{} {}", net.name, id)?;
        for seg in record.waypoints().windows(2) {
            writeln!(
                w,
                "({}, {}, 1)-({}, {}, 1)",
                seg[0].x, seg[0].y, seg[1].x, seg[1].y
            )?;
        }
        writeln!(w, "!")?;
    }
    Ok(())
}

pub fn save_routes(filename: &str, design: &RoutingDesign, routes: &[RouteRecord]) -> io::Result<()> {
    let mut w = BufWriter::new(File::create(filename)?);
    write_routes(&mut w, design, routes)?;
    w.flush()?;
    log::info!("Routes written to {}", filename);
    Ok(())
}
