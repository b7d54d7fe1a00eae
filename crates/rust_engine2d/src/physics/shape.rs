//! Collider shapes
//!
//! Shapes are authored in entity-local space. At attach time every shape is
//! split into convex parts (a concave polygon becomes a fan of ear-clipped
//! triangles) so the narrow phase only ever sees convex input. Parts are
//! moved to world space on demand during a collision step.

use serde::{Deserialize, Serialize};

use crate::engine::EngineError;
use crate::foundation::math::{max_axis_scale, Mat3, Point2, Vec2};

/// Authored collider shape (MODEL SPACE)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Axis-aligned rectangle centred on the origin
    Box {
        /// Full width and height
        size: Vec2,
    },
    /// Circle centred on the origin
    Circle {
        /// Radius
        radius: f32,
    },
    /// Simple polygon, any winding, convex or concave
    Polygon {
        /// Outline vertices
        points: Vec<Vec2>,
    },
}

impl Default for Shape {
    fn default() -> Self {
        Self::Circle { radius: 1.0 }
    }
}

impl Shape {
    /// Rectangle of the given size
    pub fn rect(width: f32, height: f32) -> Self {
        Self::Box { size: Vec2::new(width, height) }
    }

    /// Circle of the given radius
    pub fn circle(radius: f32) -> Self {
        Self::Circle { radius }
    }

    /// Polygon from an outline
    pub fn polygon(points: impl Into<Vec<Vec2>>) -> Self {
        Self::Polygon { points: points.into() }
    }

    /// Split into convex parts offset by `offset`
    pub fn convex_parts(&self, offset: Vec2) -> Result<Vec<ConvexShape>, EngineError> {
        let origin = Point2::from(offset);
        match self {
            Self::Box { size } => {
                if size.x <= 0.0 || size.y <= 0.0 {
                    return Err(EngineError::InvalidShape(format!("box size {}x{}", size.x, size.y)));
                }
                let half = size * 0.5;
                Ok(vec![ConvexShape::Polygon(vec![
                    origin + Vec2::new(-half.x, -half.y),
                    origin + Vec2::new(half.x, -half.y),
                    origin + Vec2::new(half.x, half.y),
                    origin + Vec2::new(-half.x, half.y),
                ])])
            }
            Self::Circle { radius } => {
                if *radius <= 0.0 {
                    return Err(EngineError::InvalidShape(format!("circle radius {radius}")));
                }
                Ok(vec![ConvexShape::Circle { center: origin, radius: *radius }])
            }
            Self::Polygon { points } => {
                let mut outline: Vec<Point2> = points.iter().map(|p| origin + *p).collect();
                if outline.len() < 3 {
                    return Err(EngineError::InvalidShape(format!(
                        "polygon needs at least 3 points, got {}",
                        outline.len()
                    )));
                }
                let area = signed_area(&outline);
                if area.abs() <= f32::EPSILON {
                    return Err(EngineError::InvalidShape("polygon has no area".to_string()));
                }
                if area < 0.0 {
                    outline.reverse();
                }
                if is_convex(&outline) {
                    Ok(vec![ConvexShape::Polygon(outline)])
                } else {
                    triangulate(&outline)
                }
            }
        }
    }
}

/// Convex piece of a collider, in local or world space
#[derive(Debug, Clone, PartialEq)]
pub enum ConvexShape {
    /// Convex polygon, counter-clockwise
    Polygon(Vec<Point2>),
    /// Circle
    Circle {
        /// Centre
        center: Point2,
        /// Radius
        radius: f32,
    },
}

impl ConvexShape {
    /// Transform to world space with an entity's world matrix
    pub fn transformed(&self, matrix: &Mat3) -> Self {
        match self {
            Self::Polygon(points) => {
                let mut moved: Vec<Point2> = points.iter().map(|p| matrix.transform_point(p)).collect();
                // a mirroring scale flips winding
                if signed_area(&moved) < 0.0 {
                    moved.reverse();
                }
                Self::Polygon(moved)
            }
            Self::Circle { center, radius } => Self::Circle {
                center: matrix.transform_point(center),
                radius: radius * max_axis_scale(matrix),
            },
        }
    }

    /// Centre of mass approximation used to orient contact normals
    pub fn center(&self) -> Point2 {
        match self {
            Self::Polygon(points) => {
                #[allow(clippy::cast_precision_loss)]
                let n = points.len().max(1) as f32;
                let sum = points.iter().fold(Vec2::zeros(), |acc, p| acc + p.coords);
                Point2::from(sum / n)
            }
            Self::Circle { center, .. } => *center,
        }
    }
}

fn signed_area(points: &[Point2]) -> f32 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum::<f32>()
        * 0.5
}

fn cross(o: &Point2, a: &Point2, b: &Point2) -> f32 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn is_convex(points: &[Point2]) -> bool {
    let n = points.len();
    (0..n).all(|i| cross(&points[i], &points[(i + 1) % n], &points[(i + 2) % n]) >= 0.0)
}

fn inside_triangle(p: &Point2, a: &Point2, b: &Point2, c: &Point2) -> bool {
    cross(a, b, p) >= 0.0 && cross(b, c, p) >= 0.0 && cross(c, a, p) >= 0.0
}

/// Ear-clipping triangulation of a counter-clockwise simple polygon
fn triangulate(points: &[Point2]) -> Result<Vec<ConvexShape>, EngineError> {
    let mut remaining: Vec<usize> = (0..points.len()).collect();
    let mut triangles = Vec::with_capacity(points.len() - 2);

    while remaining.len() > 3 {
        let n = remaining.len();
        let ear = (0..n).find(|&i| {
            let prev = &points[remaining[(i + n - 1) % n]];
            let curr = &points[remaining[i]];
            let next = &points[remaining[(i + 1) % n]];
            if cross(prev, curr, next) <= 0.0 {
                return false;
            }
            remaining
                .iter()
                .filter(|&&idx| {
                    idx != remaining[(i + n - 1) % n] && idx != remaining[i] && idx != remaining[(i + 1) % n]
                })
                .all(|&idx| !inside_triangle(&points[idx], prev, curr, next))
        });

        let Some(i) = ear else {
            return Err(EngineError::InvalidShape("polygon is self-intersecting".to_string()));
        };
        triangles.push(ConvexShape::Polygon(vec![
            points[remaining[(i + n - 1) % n]],
            points[remaining[i]],
            points[remaining[(i + 1) % n]],
        ]));
        remaining.remove(i);
    }

    triangles.push(ConvexShape::Polygon(remaining.iter().map(|&i| points[i]).collect()));
    Ok(triangles)
}
