use rand::Rng;
use std::fs::File;
use std::io::{BufWriter, Write};

/// Writes a random two-pin benchmark in the `.gr` text format.
///
/// Each net gets a random source gcell and a sink within `max_span` gcells
/// of it in both axes (clamped to the grid).
pub fn generate_random_design(
    filename: &str,
    grid_x: u32,
    grid_y: u32,
    capacity: u32,
    num_nets: usize,
    max_span: u32,
) -> std::io::Result<()> {
    let file = File::create(filename)?;
    let mut out = BufWriter::new(file);
    write_random_design(&mut out, grid_x, grid_y, capacity, num_nets, max_span)?;
    out.flush()
}

pub fn write_random_design<W: Write>(
    out: &mut W,
    grid_x: u32,
    grid_y: u32,
    capacity: u32,
    num_nets: usize,
    max_span: u32,
) -> std::io::Result<()> {
    let mut rng = rand::thread_rng();

    let grid_x = grid_x.max(1);
    let grid_y = grid_y.max(1);
    let span = max_span.max(1);

    log::info!(
        "Generating Benchmark: {}x{} gcells, {} nets, capacity {}, span <= {}",
        grid_x,
        grid_y,
        num_nets,
        capacity,
        span
    );

    writeln!(out, "grid {} {} 1", grid_x, grid_y)?;
    writeln!(out, "vertical capacity {}", capacity)?;
    writeln!(out, "horizontal capacity {}", capacity)?;
    writeln!(out, "num net {}", num_nets)?;

    for i in 0..num_nets {
        let x1 = rng.gen_range(0..grid_x);
        let y1 = rng.gen_range(0..grid_y);

        let x_lo = x1.saturating_sub(span);
        let x_hi = (x1 + span).min(grid_x - 1);
        let y_lo = y1.saturating_sub(span);
        let y_hi = (y1 + span).min(grid_y - 1);

        let x2 = rng.gen_range(x_lo..=x_hi);
        let y2 = rng.gen_range(y_lo..=y_hi);

        writeln!(out, "net{} {} 2", i, i)?;
        writeln!(out, "{} {}", x1, y1)?;
        writeln!(out, "{} {}", x2, y2)?;
    }

    Ok(())
}
