//! Schema and in-memory representation of loaded datasets.

mod column;
mod geometry;
mod table;
mod types;

pub use column::{Column, NumericColumnSet};
pub use geometry::{BoundingBox, Coord, Geometry, Ring};
pub use table::{Dataset, Row};
pub use types::{ColumnType, SENTINEL, Value};
