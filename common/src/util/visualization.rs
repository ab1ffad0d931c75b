use crate::db::demand::DemandSnapshot;
use crate::geom::coord::GridCoord;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect as ImageRect;
use std::path::Path;

/// Renders the congestion heat map with route polylines on top.
///
/// `scale` is the pixel size of one gcell. Each gcell is shaded by the worse of
/// its two demand/capacity ratios; over-capacity gcells are drawn in red.
pub fn draw_demand_map(
    snapshot: &DemandSnapshot,
    routes: &[Vec<GridCoord>],
    filename: &str,
    scale: u32,
) {
    let img = render_demand_map(snapshot, routes, scale);
    if let Err(e) = img.save(Path::new(filename)) {
        log::warn!("Failed to write heat map '{}': {}", filename, e);
    }
}

pub fn render_demand_map(
    snapshot: &DemandSnapshot,
    routes: &[Vec<GridCoord>],
    scale: u32,
) -> RgbImage {
    let scale = scale.max(2);
    let w = snapshot.width * scale;
    let h = snapshot.height * scale;
    let mut img = RgbImage::from_pixel(w.max(1), h.max(1), Rgb([20, 20, 20]));

    // Row 0 at the bottom of the image.
    let map = |x: u32, y: u32| -> (i32, i32) {
        ((x * scale) as i32, (h - (y + 1) * scale) as i32)
    };

    for y in 0..snapshot.height {
        for x in 0..snapshot.width {
            let util = snapshot.utilization(GridCoord::new(x, y));
            let color = if util > 1.0 {
                Rgb([220, 40, 40])
            } else {
                let level = (40.0 + util * 160.0) as u8;
                Rgb([level / 3, level, level / 2])
            };
            let (px, py) = map(x, y);
            let rect = ImageRect::at(px, py).of_size(scale - 1, scale - 1);
            draw_filled_rect_mut(&mut img, rect, color);
        }
    }

    let wire_color = Rgb([90, 170, 255]);
    let half = (scale / 2) as f32;
    for route in routes {
        for pair in route.windows(2) {
            let (x1, y1) = map(pair[0].x, pair[0].y);
            let (x2, y2) = map(pair[1].x, pair[1].y);
            draw_line_segment_mut(
                &mut img,
                (x1 as f32 + half, y1 as f32 + half),
                (x2 as f32 + half, y2 as f32 + half),
                wire_color,
            );
        }
    }

    img
}
