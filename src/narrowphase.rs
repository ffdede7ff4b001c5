use glam::DVec2;

use crate::api::NarrowphaseApi;
use crate::types::*;

/// Shape kernel: pure intersection predicates.
pub struct Narrowphase;

/// Relative tolerance used when a computed intersection point is compared
/// against segment bounds.
const LINE_TOL: f64 = 1e-9;

/// Min/max of the projections of `points` onto `axis`.
#[inline]
fn project(axis: DVec2, points: &[DVec2]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for p in points {
        let d = p.dot(axis);
        min = min.min(d);
        max = max.max(d);
    }
    (min, max)
}

/// Separating axis test: false as soon as one axis separates the point sets.
fn sat_overlap(axes: &[DVec2], a: &[DVec2], b: &[DVec2]) -> bool {
    for &axis in axes {
        let (min1, max1) = project(axis, a);
        let (min2, max2) = project(axis, b);
        if min2 > max1 || min1 > max2 {
            return false;
        }
    }
    true
}

/// Position of `p` in the frame with origin `origin` and x axis along `angle`.
#[inline]
fn to_local(p: DVec2, origin: DVec2, angle: f64) -> DVec2 {
    DVec2::from_angle(-angle).rotate(p - origin)
}

#[inline]
fn within(v: f64, lo: f64, hi: f64, tol: f64) -> bool {
    v >= lo - tol && v <= hi + tol
}

impl NarrowphaseApi for Narrowphase {
    fn rect_rect(a: &Rectangle, b: &Rectangle) -> bool {
        // Two edge directions per rectangle; parallel duplicates are harmless.
        let [a0, a1] = a.axes();
        let [b0, b1] = b.axes();
        sat_overlap(&[a0, a1, b0, b1], &a.vertices, &b.vertices)
    }

    fn rect_line(r: &Rectangle, l: &LineSegment) -> bool {
        let [r0, r1] = r.axes();
        let d = l.vector();
        let ends = [l.start, l.end];
        if d == DVec2::ZERO {
            return sat_overlap(&[r0, r1], &r.vertices, &ends);
        }
        sat_overlap(&[r0, r1, d, d.perp()], &r.vertices, &ends)
    }

    fn circle_circle(a: &Circle, b: &Circle) -> bool {
        let rsum = a.radius + b.radius;
        (a.center - b.center).length_squared() <= rsum * rsum
    }

    fn circle_rect(c: &Circle, r: &Rectangle) -> bool {
        // Work in the rectangle's frame: origin at its center, axes along its edges.
        let p = to_local(c.center, r.center(), r.direction());
        let radius = c.radius;
        let a = r.width() / 2.0;
        let b = r.height() / 2.0;

        // Far away: outside the circumcircle grown by the radius
        if p.length() > DVec2::new(a, b).length() + radius {
            return false;
        }

        let (ax, ay) = (p.x.abs(), p.y.abs());

        // Center inside
        if ax <= a && ay <= b {
            return true;
        }
        // Left or right strip
        if ay <= b {
            return ax <= a + radius;
        }
        // Top or bottom strip
        if ax <= a {
            return ay <= b + radius;
        }
        // Corner sectors
        (DVec2::new(ax, ay) - DVec2::new(a, b)).length_squared() <= radius * radius
    }

    fn circle_aabb(c: &Circle, min: DVec2, max: DVec2) -> bool {
        let closest = c.center.clamp(min, max);
        (closest - c.center).length_squared() <= c.radius * c.radius
    }

    fn circle_line(c: &Circle, l: &LineSegment) -> bool {
        let d = l.vector();
        let len = d.length();
        let rel = c.center - l.start;
        let r2 = c.radius * c.radius;
        if len == 0.0 {
            return rel.length_squared() <= r2;
        }

        // Segment on the local x axis from 0 to len
        let dir = d / len;
        let x = rel.dot(dir);
        let y = dir.perp_dot(rel);

        if x > 0.0 && x < len {
            y.abs() <= c.radius
        } else if x <= 0.0 {
            rel.length_squared() <= r2
        } else {
            (c.center - l.end).length_squared() <= r2
        }
    }

    fn line_line(l1: &LineSegment, l2: &LineSegment) -> bool {
        let (s1, e1, s2, e2) = (l1.start, l1.end, l2.start, l2.end);

        match (s1 == e1, s2 == e2) {
            (true, true) => return s1 == s2,
            (true, false) => return Self::point_on_line(s1, l2, 0.0),
            (false, true) => return Self::point_on_line(s2, l1, 0.0),
            (false, false) => {}
        }

        let min1 = s1.min(e1);
        let max1 = s1.max(e1);
        let min2 = s2.min(e2);
        let max2 = s2.max(e2);
        if min1.x > max2.x || min2.x > max1.x || min1.y > max2.y || min2.y > max1.y {
            return false;
        }

        let scale = 1.0 + max1.abs().max(max2.abs()).max(min1.abs()).max(min2.abs()).max_element();
        let tol = LINE_TOL * scale;

        // Line equations a*x + b*y = c
        let a1 = e1.y - s1.y;
        let b1 = s1.x - e1.x;
        let c1 = a1 * s1.x + b1 * s1.y;
        let a2 = e2.y - s2.y;
        let b2 = s2.x - e2.x;
        let c2 = a2 * s2.x + b2 * s2.y;

        let det = a1 * b2 - a2 * b1;
        if det == 0.0 {
            // Parallel: collinear segments overlap iff their bounds do, which was checked above.
            let residual = a1 * s2.x + b1 * s2.y - c1;
            return residual.abs() <= tol * (a1.abs() + b1.abs());
        }

        let x = (b2 * c1 - b1 * c2) / det;
        let y = (a1 * c2 - a2 * c1) / det;
        within(x, min1.x, max1.x, tol)
            && within(x, min2.x, max2.x, tol)
            && within(y, min1.y, max1.y, tol)
            && within(y, min2.y, max2.y, tol)
    }

    fn point_in_rect(p: DVec2, r: &Rectangle, rotatable: bool) -> bool {
        if !rotatable {
            let (min, max) = r.bounds();
            return p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y;
        }
        let local = to_local(p, r.center(), r.direction());
        local.x.abs() <= r.width() / 2.0 && local.y.abs() <= r.height() / 2.0
    }

    fn point_on_line(p: DVec2, l: &LineSegment, epsilon: f64) -> bool {
        let d = l.vector();
        let len = d.length();
        let rel = p - l.start;
        if len == 0.0 {
            return rel.length() <= epsilon;
        }
        let dir = d / len;
        let x = rel.dot(dir);
        let y = dir.perp_dot(rel);
        y.abs() <= epsilon && x >= -epsilon && x <= len + epsilon
    }

    fn point_in_circle(p: DVec2, c: &Circle) -> bool {
        (p - c.center).length_squared() <= c.radius * c.radius
    }
}
