//! Per-row spatial geometry.

use serde::{Deserialize, Serialize};

/// A planar coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A polygon ring. Outer rings bound an area, inner rings cut holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    pub outer: bool,
    pub points: Vec<Coord>,
}

/// Geometry attached to a row of a spatial dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    Point(Coord),
    MultiPoint(Vec<Coord>),
    /// One or more line parts.
    LineString(Vec<Vec<Coord>>),
    Polygon(Vec<Ring>),
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    fn around(c: Coord) -> Self {
        Self {
            min_x: c.x,
            min_y: c.y,
            max_x: c.x,
            max_y: c.y,
        }
    }

    fn extend(&mut self, c: Coord) {
        self.min_x = self.min_x.min(c.x);
        self.min_y = self.min_y.min(c.y);
        self.max_x = self.max_x.max(c.x);
        self.max_y = self.max_y.max(c.y);
    }

    /// Smallest box covering both boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

impl Geometry {
    /// Short name of the geometry kind, as used in WKT.
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "POINT",
            Geometry::MultiPoint(_) => "MULTIPOINT",
            Geometry::LineString(parts) if parts.len() > 1 => "MULTILINESTRING",
            Geometry::LineString(_) => "LINESTRING",
            Geometry::Polygon(_) => "POLYGON",
        }
    }

    /// Iterate every vertex of the geometry.
    pub fn coords(&self) -> Box<dyn Iterator<Item = Coord> + '_> {
        match self {
            Geometry::Point(c) => Box::new(std::iter::once(*c)),
            Geometry::MultiPoint(points) => Box::new(points.iter().copied()),
            Geometry::LineString(parts) => Box::new(parts.iter().flatten().copied()),
            Geometry::Polygon(rings) => {
                Box::new(rings.iter().flat_map(|r| r.points.iter().copied()))
            }
        }
    }

    /// Bounding box of all vertices; `None` for an empty geometry.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut coords = self.coords();
        let mut bbox = BoundingBox::around(coords.next()?);
        for c in coords {
            bbox.extend(c);
        }
        Some(bbox)
    }

    /// Well-known text representation.
    pub fn to_wkt(&self) -> String {
        fn seq(points: &[Coord]) -> String {
            let inner: Vec<String> = points.iter().map(|c| format!("{} {}", c.x, c.y)).collect();
            format!("({})", inner.join(", "))
        }

        let body = match self {
            Geometry::Point(c) => format!("({} {})", c.x, c.y),
            Geometry::MultiPoint(points) => seq(points),
            Geometry::LineString(parts) if parts.len() == 1 => seq(&parts[0]),
            Geometry::LineString(parts) => {
                let inner: Vec<String> = parts.iter().map(|p| seq(p)).collect();
                format!("({})", inner.join(", "))
            }
            Geometry::Polygon(rings) => {
                let inner: Vec<String> = rings.iter().map(|r| seq(&r.points)).collect();
                format!("({})", inner.join(", "))
            }
        };
        format!("{} {}", self.kind(), body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_wkt() {
        let g = Geometry::Point(Coord::new(1.5, -2.0));
        assert_eq!(g.to_wkt(), "POINT (1.5 -2)");
    }

    #[test]
    fn test_polygon_wkt_and_bbox() {
        let ring = Ring {
            outer: true,
            points: vec![
                Coord::new(0.0, 0.0),
                Coord::new(0.0, 2.0),
                Coord::new(3.0, 2.0),
                Coord::new(0.0, 0.0),
            ],
        };
        let g = Geometry::Polygon(vec![ring]);
        assert_eq!(g.to_wkt(), "POLYGON ((0 0, 0 2, 3 2, 0 0))");

        let bbox = g.bounding_box().unwrap();
        assert_eq!(bbox.width(), 3.0);
        assert_eq!(bbox.height(), 2.0);
    }

    #[test]
    fn test_multi_part_line_kind() {
        let g = Geometry::LineString(vec![
            vec![Coord::new(0.0, 0.0), Coord::new(1.0, 1.0)],
            vec![Coord::new(2.0, 2.0), Coord::new(3.0, 3.0)],
        ]);
        assert_eq!(g.kind(), "MULTILINESTRING");
        assert!(g.to_wkt().starts_with("MULTILINESTRING (("));
    }

    #[test]
    fn test_empty_geometry_has_no_bbox() {
        assert!(Geometry::MultiPoint(Vec::new()).bounding_box().is_none());
    }
}
