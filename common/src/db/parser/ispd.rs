use crate::db::core::RoutingDesign;
use crate::geom::conversion::GridConverter;
use crate::geom::coord::GridCoord;
use anyhow::{Context, Result, anyhow, bail};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::str::FromStr;

pub fn parse(filename: &str) -> Result<RoutingDesign> {
    log::info!("Parsing design: {}", filename);
    let file =
        File::open(filename).context(format!("Failed to open design file: {}", filename))?;
    parse_reader(BufReader::new(file))
        .context(format!("Invalid design syntax in '{}'", filename))
}

pub fn parse_str(text: &str) -> Result<RoutingDesign> {
    parse_reader(text.as_bytes())
}

pub fn parse_reader<R: BufRead>(reader: R) -> Result<RoutingDesign> {
    let mut lines = Vec::new();
    for (no, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        lines.push((no + 1, trimmed.to_string()));
    }
    let mut cursor = lines.into_iter();

    let (no, header) = cursor.next().ok_or_else(|| anyhow!("Empty design file"))?;
    let parts: Vec<&str> = header.split_whitespace().collect();
    if parts.len() < 3 || parts[0] != "grid" {
        bail!("line {}: expected 'grid <x> <y> [layers]'", no);
    }
    let grid_x: u32 = number(parts[1], no)?;
    let grid_y: u32 = number(parts[2], no)?;

    let mut cap_v = None;
    let mut cap_h = None;
    let mut tiles = None;
    let num_nets: usize;

    loop {
        let (no, line) = cursor
            .next()
            .ok_or_else(|| anyhow!("Unexpected end of file before 'num net'"))?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            ["vertical", "capacity", caps @ ..] => cap_v = Some(sum_capacities(caps, no)?),
            ["horizontal", "capacity", caps @ ..] => cap_h = Some(sum_capacities(caps, no)?),
            ["minimum", ..] | ["via", ..] => {}
            ["num", "net", n] => {
                num_nets = number(n, no)?;
                break;
            }
            [llx, lly, tile_w, tile_h] => {
                tiles = Some((
                    number::<i64>(llx, no)?,
                    number::<i64>(lly, no)?,
                    number::<i64>(tile_w, no)?,
                    number::<i64>(tile_h, no)?,
                ));
            }
            _ => bail!("line {}: unrecognized header line '{}'", no, line),
        }
    }

    let cap_v = cap_v.ok_or_else(|| anyhow!("Missing 'vertical capacity'"))?;
    let cap_h = cap_h.ok_or_else(|| anyhow!("Missing 'horizontal capacity'"))?;

    let converter = match tiles {
        Some((llx, lly, tw, th)) => {
            if tw <= 0 || th <= 0 {
                bail!("Tile size must be positive, got {}x{}", tw, th);
            }
            GridConverter::from_tiles(llx, lly, tw, th, grid_x, grid_y)
        }
        None => GridConverter::identity(grid_x, grid_y),
    };

    let mut design = RoutingDesign::new(grid_x, grid_y, cap_h, cap_v);

    for _ in 0..num_nets {
        let (no, line) = cursor
            .next()
            .ok_or_else(|| anyhow!("Unexpected end of file: expected {} nets", num_nets))?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            bail!("line {}: expected '<name> <id> <num_pins>'", no);
        }
        let name = parts[0].to_string();
        if design.net_name_map.contains_key(&name) {
            bail!("line {}: duplicate net name '{}'", no, name);
        }
        let num_pins: usize = number(parts[2], no)?;
        let net = design.add_net(name);

        for _ in 0..num_pins {
            let (pin_no, pin_line) = cursor
                .next()
                .ok_or_else(|| anyhow!("Unexpected end of file inside net on line {}", no))?;
            let coords: Vec<&str> = pin_line.split_whitespace().collect();
            if coords.len() < 2 {
                bail!("line {}: expected '<x> <y> [layer]'", pin_no);
            }
            let x: i64 = number(coords[0], pin_no)?;
            let y: i64 = number(coords[1], pin_no)?;

            let pin = match converter.to_grid_checked(x, y) {
                Some(c) => c,
                None if tiles.is_some() => {
                    log::warn!(
                        "line {}: pin ({}, {}) lies outside the die. Clamping to the grid.",
                        pin_no,
                        x,
                        y
                    );
                    converter.to_grid(x, y)
                }
                None => {
                    let (Ok(gx), Ok(gy)) = (u32::try_from(x), u32::try_from(y)) else {
                        bail!("line {}: gcell index ({}, {}) out of range", pin_no, x, y);
                    };
                    // Left as-is so that the router rejects the net.
                    GridCoord::new(gx, gy)
                }
            };
            design.add_pin(net, pin);
        }
    }

    if let Some((no, line)) = cursor.next() {
        let pending = line.split_whitespace().next().unwrap_or("?");
        log::warn!(
            "line {}: {} capacity adjustment(s) ignored. Only uniform capacity is supported.",
            no,
            pending
        );
    }

    log::info!(
        "Design: {}x{} gcells, capH={}, capV={}, {} nets",
        design.grid_x,
        design.grid_y,
        design.cap_h,
        design.cap_v,
        design.num_nets()
    );

    Ok(design)
}

fn number<T: FromStr>(token: &str, line: usize) -> Result<T> {
    token
        .parse::<T>()
        .map_err(|_| anyhow!("line {}: '{}' is not a valid number", line, token))
}

fn sum_capacities(tokens: &[&str], line: usize) -> Result<u32> {
    if tokens.is_empty() {
        bail!("line {}: capacity line without values", line);
    }
    let mut total = 0u32;
    for t in tokens {
        total = total.saturating_add(number::<u32>(t, line)?);
    }
    Ok(total)
}
