//! Narrow-phase overlap test (separating axis theorem)
//!
//! Based on Game Engine Architecture 3rd Edition, Section 13.3.5:
//! "Two convex shapes do not intersect if and only if there exists an axis
//! along which their projections do not overlap."
//!
//! Touching shapes (zero penetration) do not count as overlapping.

use crate::foundation::math::{Point2, Vec2};
use crate::physics::shape::ConvexShape;

/// Penetration found between two convex parts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit axis of least penetration, pointing from the first shape to the second
    pub normal: Vec2,
    /// Penetration depth along `normal`
    pub depth: f32,
}

/// Test two multi-part shapes against each other
///
/// Every part of `a` is tested against every part of `b`; the result holds one
/// contact per intersecting pair and is empty iff nothing overlaps.
pub fn test_overlap(a: &[ConvexShape], b: &[ConvexShape]) -> Vec<Contact> {
    a.iter()
        .flat_map(|part_a| b.iter().filter_map(move |part_b| intersect(part_a, part_b)))
        .collect()
}

/// Test a single pair of convex parts
pub fn intersect(a: &ConvexShape, b: &ConvexShape) -> Option<Contact> {
    match (a, b) {
        (
            ConvexShape::Circle { center: ca, radius: ra },
            ConvexShape::Circle { center: cb, radius: rb },
        ) => circle_circle(ca, *ra, cb, *rb),
        (ConvexShape::Polygon(points), ConvexShape::Circle { center, radius }) => {
            polygon_circle(points, center, *radius)
        }
        (ConvexShape::Circle { center, radius }, ConvexShape::Polygon(points)) => {
            polygon_circle(points, center, *radius).map(flip)
        }
        (ConvexShape::Polygon(pa), ConvexShape::Polygon(pb)) => polygon_polygon(pa, pb),
    }
}

fn flip(contact: Contact) -> Contact {
    Contact { normal: -contact.normal, depth: contact.depth }
}

fn circle_circle(ca: &Point2, ra: f32, cb: &Point2, rb: f32) -> Option<Contact> {
    let delta = cb - ca;
    let distance = delta.norm();
    let depth = ra + rb - distance;
    if depth <= 0.0 {
        return None;
    }
    let normal = if approx::abs_diff_eq!(distance, 0.0) { Vec2::x() } else { delta / distance };
    Some(Contact { normal, depth })
}

fn project_polygon(points: &[Point2], axis: &Vec2) -> (f32, f32) {
    points.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), p| {
        let d = p.coords.dot(axis);
        (min.min(d), max.max(d))
    })
}

fn edge_normals(points: &[Point2]) -> impl Iterator<Item = Vec2> + '_ {
    let n = points.len();
    (0..n).filter_map(move |i| {
        let edge = points[(i + 1) % n] - points[i];
        Vec2::new(edge.y, -edge.x).try_normalize(f32::EPSILON)
    })
}

fn centroid(points: &[Point2]) -> Point2 {
    #[allow(clippy::cast_precision_loss)]
    let n = points.len().max(1) as f32;
    Point2::from(points.iter().fold(Vec2::zeros(), |acc, p| acc + p.coords) / n)
}

/// Smallest overlap over the candidate axes, or `None` on a separating axis
fn least_penetration(
    axes: impl Iterator<Item = Vec2>,
    mut project_a: impl FnMut(&Vec2) -> (f32, f32),
    mut project_b: impl FnMut(&Vec2) -> (f32, f32),
) -> Option<(Vec2, f32)> {
    let mut best: Option<(Vec2, f32)> = None;
    for axis in axes {
        let (min_a, max_a) = project_a(&axis);
        let (min_b, max_b) = project_b(&axis);
        let overlap = max_a.min(max_b) - min_a.max(min_b);
        if overlap <= 0.0 {
            return None;
        }
        if best.map_or(true, |(_, depth)| overlap < depth) {
            best = Some((axis, overlap));
        }
    }
    best
}

fn oriented(normal: Vec2, depth: f32, from: &Point2, to: &Point2) -> Contact {
    let normal = if normal.dot(&(to - from)) < 0.0 { -normal } else { normal };
    Contact { normal, depth }
}

fn polygon_polygon(a: &[Point2], b: &[Point2]) -> Option<Contact> {
    let axes = edge_normals(a).chain(edge_normals(b));
    let (normal, depth) = least_penetration(axes, |axis| project_polygon(a, axis), |axis| project_polygon(b, axis))?;
    Some(oriented(normal, depth, &centroid(a), &centroid(b)))
}

fn polygon_circle(points: &[Point2], center: &Point2, radius: f32) -> Option<Contact> {
    // the extra axis runs from the closest vertex to the circle centre
    let closest = points
        .iter()
        .min_by(|p, q| {
            let dp = (*p - center).norm_squared();
            let dq = (*q - center).norm_squared();
            dp.total_cmp(&dq)
        })?;
    let vertex_axis = (center - closest).try_normalize(f32::EPSILON);

    let axes = edge_normals(points).chain(vertex_axis);
    let project_circle = |axis: &Vec2| {
        let c = center.coords.dot(axis);
        (c - radius, c + radius)
    };
    let (normal, depth) = least_penetration(axes, |axis| project_polygon(points, axis), project_circle)?;
    Some(oriented(normal, depth, &centroid(points), center))
}
