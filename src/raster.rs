// Coverage rasterizers. Each one walks the pixels a primitive covers, clipped
// to a `width x height` target, and hands every covered (x, y) to `plot`.
// They never write pixels themselves, so the same geometry serves the RGBA
// canvas layers and the 0x00RRGGBB screen buffer. Geometry is done in f64 so
// points far outside the target keep sub-pixel precision.

use crate::types::Point;

/// Half of a stroke width. A 1-pixel stroke still covers its centre line.
#[inline]
pub fn half_width(thickness: u32) -> f32 {
    (thickness as f32 / 2.0).max(0.5)
}

/// Clamp a float bounding box to the target. `None` if nothing is on-screen.
fn clip_box(
    width: usize,
    height: usize,
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
) -> Option<(usize, usize, usize, usize)> {
    if width == 0 || height == 0 {
        return None;
    }
    let (w, h) = (width as f64, height as f64);
    if x1 < 0.0 || y1 < 0.0 || x0 > w - 1.0 || y0 > h - 1.0 {
        return None;
    }
    let lx = x0.floor().max(0.0) as usize;
    let ly = y0.floor().max(0.0) as usize;
    let rx = (x1.ceil() as usize).min(width - 1);
    let ry = (y1.ceil() as usize).min(height - 1);
    Some((lx, ly, rx, ry))
}

/// Thick segment with round caps: every pixel within `hw` of segment a-b.
/// With a == b this is a filled disc of radius `hw`.
pub fn capsule(width: usize, height: usize, a: Point, b: Point, hw: f32, mut plot: impl FnMut(usize, usize)) {
    let hw = hw as f64;
    let (ax, ay, bx, by) = (a.x as f64, a.y as f64, b.x as f64, b.y as f64);
    let Some((lx, ly, rx, ry)) = clip_box(
        width,
        height,
        ax.min(bx) - hw,
        ay.min(by) - hw,
        ax.max(bx) + hw,
        ay.max(by) + hw,
    ) else {
        return;
    };

    let (dx, dy) = (bx - ax, by - ay);
    let len2 = dx * dx + dy * dy;
    let hw2 = hw * hw;

    for y in ly..=ry {
        for x in lx..=rx {
            let (px, py) = (x as f64 - ax, y as f64 - ay);
            // Closest point on the segment, as a parameter in [0, 1]
            let t = if len2 > 0.0 { ((px * dx + py * dy) / len2).clamp(0.0, 1.0) } else { 0.0 };
            let (ex, ey) = (px - t * dx, py - t * dy);
            if ex * ex + ey * ey <= hw2 {
                plot(x, y);
            }
        }
    }
}

/// Filled disc: every pixel whose distance to `center` is at most `radius`.
pub fn disc(width: usize, height: usize, center: Point, radius: u32, mut plot: impl FnMut(usize, usize)) {
    let r = radius as f64;
    let Some((lx, ly, rx, ry)) = clip_box(
        width,
        height,
        center.x as f64 - r,
        center.y as f64 - r,
        center.x as f64 + r,
        center.y as f64 + r,
    ) else {
        return;
    };
    let r2 = radius as i64 * radius as i64;
    for y in ly..=ry {
        for x in lx..=rx {
            if Point::new(x as i32, y as i32).dist2(center) <= r2 {
                plot(x, y);
            }
        }
    }
}

/// Circle outline of the given radius, `hw` thick on each side of the rim.
pub fn ring(width: usize, height: usize, center: Point, radius: u32, hw: f32, mut plot: impl FnMut(usize, usize)) {
    let hw = hw as f64;
    let (cx, cy) = (center.x as f64, center.y as f64);
    let outer = radius as f64 + hw;
    let Some((lx, ly, rx, ry)) = clip_box(width, height, cx - outer, cy - outer, cx + outer, cy + outer) else {
        return;
    };
    for y in ly..=ry {
        for x in lx..=rx {
            let (dx, dy) = (x as f64 - cx, y as f64 - cy);
            let d = (dx * dx + dy * dy).sqrt();
            if (d - radius as f64).abs() <= hw {
                plot(x, y);
            }
        }
    }
}

/// Axis-aligned rectangle outline through corners a and b, square corners.
pub fn rect_outline(width: usize, height: usize, a: Point, b: Point, hw: f32, mut plot: impl FnMut(usize, usize)) {
    let hw = hw as f64;
    let (l, r) = (a.x.min(b.x) as f64, a.x.max(b.x) as f64);
    let (t, btm) = (a.y.min(b.y) as f64, a.y.max(b.y) as f64);
    let Some((lx, ly, rx, ry)) = clip_box(width, height, l - hw, t - hw, r + hw, btm + hw) else {
        return;
    };
    for y in ly..=ry {
        for x in lx..=rx {
            let (fx, fy) = (x as f64, y as f64);
            let in_outer = fx >= l - hw && fx <= r + hw && fy >= t - hw && fy <= btm + hw;
            let in_inner = fx > l + hw && fx < r - hw && fy > t + hw && fy < btm - hw;
            if in_outer && !in_inner {
                plot(x, y);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(f: impl FnOnce(&mut dyn FnMut(usize, usize))) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        f(&mut |x, y| out.push((x, y)));
        out
    }

    #[test]
    fn capsule_is_clipped_to_target() {
        let px = collect(|p| capsule(10, 10, Point::new(-50, 5), Point::new(50, 5), 1.0, p));
        assert!(!px.is_empty());
        assert!(px.iter().all(|&(x, y)| x < 10 && (4..=6).contains(&y)));
    }

    #[test]
    fn fully_offscreen_primitives_plot_nothing() {
        assert!(collect(|p| disc(10, 10, Point::new(-40, -40), 5, p)).is_empty());
        assert!(collect(|p| ring(10, 10, Point::new(100, 5), 3, 1.0, p)).is_empty());
    }

    #[test]
    fn ring_leaves_the_centre_empty() {
        let px = collect(|p| ring(50, 50, Point::new(25, 25), 10, 1.0, p));
        assert!(px.contains(&(35, 25)));
        assert!(!px.contains(&(25, 25)));
    }

    #[test]
    fn rect_outline_is_hollow() {
        let px = collect(|p| rect_outline(50, 50, Point::new(10, 10), Point::new(30, 20), 0.5, p));
        assert!(px.contains(&(10, 10)));
        assert!(px.contains(&(30, 20)));
        assert!(px.contains(&(20, 10)));
        assert!(!px.contains(&(20, 15)));
    }
}
