//! 1-D geometry primitives for the finite-difference operator solver.
//!
//! `Point`/`Vector` mirror a 3-component coordinate with optional `y`/`z`
//! (ported from `fractulus/geometry.py`); `Grid`/`Grid1DBuilder` give the
//! mutable-builder-then-immutable-value split used throughout this
//! workspace (see `Grid1DBuilder::build`).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GeometryError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("grid must have at least 2 nodes, got {0}")]
    DomainTooSmall(usize),
}

/// A point in up to 3 dimensions. `y`/`z` are optional so that 1-D grids
/// can be built without carrying meaningless zero coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

impl Point {
    pub fn new(x: f64) -> Self {
        Self { x, y: None, z: None }
    }

    pub fn with_yz(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y: Some(y),
            z: Some(z),
        }
    }
}

fn subtract_or_zero(a: Option<f64>, b: Option<f64>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => a - b,
        _ => 0.0,
    }
}

/// A directed segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector {
    pub start: Point,
    pub end: Point,
}

impl Vector {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Euclidean length; missing `y`/`z` on either endpoint contributes 0.
    pub fn length(&self) -> f64 {
        let dx = self.end.x - self.start.x;
        let dy = subtract_or_zero(self.end.y, self.start.y);
        let dz = subtract_or_zero(self.end.z, self.start.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Axis-aligned bounding box over a set of points. Per-axis bounds are
/// `None` when no point carries that axis (e.g. pure 1-D grids never set
/// `y`/`z`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryBox {
    pub x: (f64, f64),
    pub y: Option<(f64, f64)>,
    pub z: Option<(f64, f64)>,
}

impl BoundaryBox {
    /// Canonical constructor (see spec's Open Questions: this variant,
    /// not a separately-threaded `calculate_boundary_box`, is authoritative).
    pub fn from_points(points: &[Point]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
        let x = min_max(&xs)?;

        let ys: Vec<f64> = points.iter().filter_map(|p| p.y).collect();
        let y = if ys.len() == points.len() {
            min_max(&ys)
        } else {
            None
        };

        let zs: Vec<f64> = points.iter().filter_map(|p| p.z).collect();
        let z = if zs.len() == points.len() {
            min_max(&zs)
        } else {
            None
        };

        Some(Self { x, y, z })
    }

    /// Per-axis extents (`max - min`), `None` where the axis is absent.
    pub fn dimensions(&self) -> (f64, Option<f64>, Option<f64>) {
        (
            self.x.1 - self.x.0,
            self.y.map(|(lo, hi)| hi - lo),
            self.z.map(|(lo, hi)| hi - lo),
        )
    }
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let mut lo = values[0];
    let mut hi = values[0];
    for &v in &values[1..] {
        if v < lo {
            lo = v;
        }
        if v > hi {
            hi = v;
        }
    }
    Some((lo, hi))
}

/// An immutable 1-D node grid: nodes in index order plus the connections
/// between consecutive nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub nodes: Vec<Point>,
    pub connections: Vec<Vector>,
}

impl Grid {
    /// Connections touching `node_address` (0, 1, or 2 of them: the
    /// segment behind and/or the segment ahead).
    pub fn get_connections(&self, node_address: usize) -> Vec<&Vector> {
        let backward = if node_address == 0 {
            None
        } else {
            self.connections.get(node_address - 1)
        };
        let forward = if node_address + 1 >= self.nodes.len() {
            None
        } else {
            self.connections.get(node_address)
        };
        [backward, forward].into_iter().flatten().collect()
    }

    pub fn get_by_address(&self, address: f64) -> Option<&Point> {
        self.nodes.get(address as usize)
    }

    pub fn boundary_box(&self) -> Option<BoundaryBox> {
        BoundaryBox::from_points(&self.nodes)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Transient builder for a uniformly-spaced 1-D `Grid`; consumed by
/// `build()` into the immutable value.
pub struct Grid1DBuilder {
    length: f64,
    start: f64,
    nodes: Vec<Point>,
    connections: Vec<Vector>,
}

impl Grid1DBuilder {
    pub fn new(length: f64) -> Self {
        Self::with_start(length, 0.0)
    }

    pub fn with_start(length: f64, start: f64) -> Self {
        Self {
            length,
            start,
            nodes: Vec::new(),
            connections: Vec::new(),
        }
    }

    /// Lay down `number` uniformly spaced nodes spanning `[start, start +
    /// length]`, connecting each consecutive pair.
    pub fn add_uniformly_distributed_nodes(mut self, number: usize) -> Result<Self> {
        if number < 2 {
            return Err(GeometryError::DomainTooSmall(number));
        }
        let section_length = self.length / (number - 1) as f64;

        let mut prev = self.add_node_by_coordinate(self.start);
        for node_num in 0..(number - 1) {
            let next = self.add_node_by_coordinate(self.start + (node_num + 1) as f64 * section_length);
            self.add_connection(prev, next);
            prev = next;
        }
        Ok(self)
    }

    fn add_node_by_coordinate(&mut self, coord: f64) -> Point {
        let node = Point::new(coord);
        self.nodes.push(node);
        node
    }

    fn add_connection(&mut self, start: Point, end: Point) -> Vector {
        let connection = Vector::new(start, end);
        self.connections.push(connection);
        connection
    }

    pub fn build(self) -> Grid {
        Grid {
            nodes: self.nodes,
            connections: self.connections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_length_1d() {
        let v = Vector::new(Point::new(0.0), Point::new(2.5));
        assert!((v.length() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn vector_length_missing_axes_treated_as_zero() {
        let v = Vector::new(Point::new(0.0), Point::new(3.0));
        assert!((v.length() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn grid1d_builder_uniform_spacing() {
        let grid = Grid1DBuilder::new(1.0)
            .add_uniformly_distributed_nodes(6)
            .unwrap()
            .build();

        assert_eq!(grid.nodes.len(), 6);
        assert_eq!(grid.connections.len(), 5);
        assert!((grid.nodes[1].x - 0.2).abs() < 1e-12);
        assert!((grid.connections[0].length() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn grid1d_builder_rejects_too_few_nodes() {
        let err = Grid1DBuilder::new(1.0).add_uniformly_distributed_nodes(1);
        assert_eq!(err.unwrap_err(), GeometryError::DomainTooSmall(1));
    }

    #[test]
    fn get_connections_endpoints_have_one_neighbor() {
        let grid = Grid1DBuilder::new(1.0)
            .add_uniformly_distributed_nodes(4)
            .unwrap()
            .build();

        assert_eq!(grid.get_connections(0).len(), 1);
        assert_eq!(grid.get_connections(3).len(), 1);
        assert_eq!(grid.get_connections(1).len(), 2);
    }

    #[test]
    fn boundary_box_from_points_1d() {
        let grid = Grid1DBuilder::new(2.0)
            .add_uniformly_distributed_nodes(5)
            .unwrap()
            .build();

        let bbox = grid.boundary_box().unwrap();
        assert_eq!(bbox.x, (0.0, 2.0));
        assert_eq!(bbox.y, None);
        let (dx, dy, _dz) = bbox.dimensions();
        assert!((dx - 2.0).abs() < 1e-12);
        assert_eq!(dy, None);
    }
}
