//! Scalar and vector geometry helpers shared by sensing, physics and map
//! generation. All functions are pure.

use crate::world::Rect;

/// Clamp `v` into `[lo, hi]`.
#[inline]
pub fn clamp(v: f32, lo: f32, hi: f32) -> f32 {
    v.max(lo).min(hi)
}

/// Euclidean distance between two points.
#[inline]
pub fn distance(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    (x1 - x2).hypot(y1 - y2)
}

/// Point containment test against an axis-aligned rectangle.
#[inline]
pub fn point_in_rect(x: f32, y: f32, rect: &Rect) -> bool {
    x >= rect.x && x <= rect.x + rect.w && y >= rect.y && y <= rect.y + rect.h
}

/// Rectangle/circle overlap via the closest point on the rectangle.
pub fn rect_circle_overlap(rect: &Rect, cx: f32, cy: f32, cr: f32) -> bool {
    let px = clamp(cx, rect.x, rect.x + rect.w);
    let py = clamp(cy, rect.y, rect.y + rect.h);
    (px - cx) * (px - cx) + (py - cy) * (py - cy) <= cr * cr
}

/// Rectangle overlap with a symmetric separation margin.
pub fn rects_overlap_with_margin(a: &Rect, b: &Rect, margin: f32) -> bool {
    !(a.x + a.w + margin < b.x
        || b.x + b.w + margin < a.x
        || a.y + a.h + margin < b.y
        || b.y + b.h + margin < a.y)
}

/// Smallest non-negative parametric distance at which the ray from
/// `(rx, ry)` along the unit direction `(dx, dy)` enters the circle
/// `(cx, cy, cr)`. `None` when the ray misses entirely.
pub fn ray_circle_intersect(
    rx: f32,
    ry: f32,
    dx: f32,
    dy: f32,
    cx: f32,
    cy: f32,
    cr: f32,
) -> Option<f32> {
    let ox = rx - cx;
    let oy = ry - cy;
    let a = dx * dx + dy * dy;
    let b = 2.0 * (ox * dx + oy * dy);
    let c = ox * ox + oy * oy - cr * cr;
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }
    let s = disc.sqrt();
    let t1 = (-b - s) / (2.0 * a);
    let t2 = (-b + s) / (2.0 * a);
    if t1 >= 0.0 {
        Some(t1)
    } else if t2 >= 0.0 {
        Some(t2)
    } else {
        None
    }
}

/// Wrap an angle into `[-PI, PI]`.
pub fn normalize_angle(angle: f32) -> f32 {
    let two_pi = std::f32::consts::TAU;
    let mut a = angle % two_pi;
    if a > std::f32::consts::PI {
        a -= two_pi;
    } else if a < -std::f32::consts::PI {
        a += two_pi;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5.0, 0.0, 1.0), 1.0);
        assert_eq!(clamp(-5.0, 0.0, 1.0), 0.0);
        assert_eq!(clamp(0.5, 0.0, 1.0), 0.5);
    }

    #[test]
    fn test_point_in_rect() {
        let r = Rect { x: 10.0, y: 10.0, w: 20.0, h: 5.0 };
        assert!(point_in_rect(15.0, 12.0, &r));
        assert!(point_in_rect(10.0, 10.0, &r));
        assert!(!point_in_rect(9.9, 12.0, &r));
        assert!(!point_in_rect(15.0, 15.1, &r));
    }

    #[test]
    fn test_ray_circle_head_on() {
        // Ray along +x from origin, circle centered at (10, 0) with r=2:
        // entry at t=8.
        let t = ray_circle_intersect(0.0, 0.0, 1.0, 0.0, 10.0, 0.0, 2.0).unwrap();
        assert!((t - 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_ray_circle_miss() {
        assert!(ray_circle_intersect(0.0, 0.0, 1.0, 0.0, 10.0, 5.0, 2.0).is_none());
    }

    #[test]
    fn test_ray_circle_from_inside() {
        // Starting inside the circle returns the exit distance.
        let t = ray_circle_intersect(10.0, 0.0, 1.0, 0.0, 10.0, 0.0, 2.0).unwrap();
        assert!((t - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_ray_circle_behind() {
        // Circle entirely behind the ray origin.
        assert!(ray_circle_intersect(0.0, 0.0, 1.0, 0.0, -10.0, 0.0, 2.0).is_none());
    }

    #[test]
    fn test_normalize_angle() {
        let pi = std::f32::consts::PI;
        assert!((normalize_angle(3.0 * pi).abs() - pi).abs() < 1e-5);
        assert!((normalize_angle(-3.0 * pi).abs() - pi).abs() < 1e-5);
        assert!((normalize_angle(pi + 0.1) + pi - 0.1).abs() < 1e-5);
        assert_eq!(normalize_angle(0.5), 0.5);
    }

    #[test]
    fn test_rect_circle_overlap() {
        let r = Rect { x: 0.0, y: 0.0, w: 10.0, h: 10.0 };
        assert!(rect_circle_overlap(&r, 12.0, 5.0, 3.0));
        assert!(!rect_circle_overlap(&r, 14.0, 5.0, 3.0));
        assert!(rect_circle_overlap(&r, 5.0, 5.0, 1.0));
    }
}
