//! ESRI shapefile reading and writing.
//!
//! Geometry comes from the `.shp` file and attributes from the sibling `.dbf`
//! table. Shapes and records are paired in file order.

use std::collections::HashSet;
use std::path::Path;

use log::{debug, warn};
use shapefile::dbase::{self, FieldName, FieldType, FieldValue, TableWriterBuilder};
use shapefile::{Multipoint, Point, Polygon, PolygonRing, Polyline, Shape};

use crate::error::{NodataError, Result};
use crate::schema::{Column, ColumnType, Coord, Dataset, Geometry, Ring, Row, Value};

/// Name dbase reports for its internal deletion marker.
const DELETION_FLAG: &str = "DeletionFlag";

/// Maximum length of a dBase field name.
const MAX_FIELD_NAME: usize = 10;

/// Maximum byte width of a dBase character field.
const MAX_CHARACTER_WIDTH: usize = 254;

/// Read a shapefile and its attribute table into a spatial dataset.
pub(crate) fn read_shapefile(path: &Path, max_rows: Option<usize>) -> Result<Dataset> {
    let shapes = shapefile::read_shapes(path).map_err(|e| NodataError::parse(path, e))?;

    let dbf_path = path.with_extension("dbf");
    let mut reader =
        dbase::Reader::from_path(&dbf_path).map_err(|e| NodataError::parse(&dbf_path, e))?;

    let fields: Vec<(String, FieldType)> = reader
        .fields()
        .iter()
        .filter(|f| f.name() != DELETION_FLAG)
        .map(|f| (f.name().to_string(), f.field_type()))
        .collect();

    let records = reader.read().map_err(|e| NodataError::parse(&dbf_path, e))?;

    if shapes.len() != records.len() {
        return Err(NodataError::parse(
            path,
            format!(
                "{} shapes but {} attribute records",
                shapes.len(),
                records.len()
            ),
        ));
    }
    if fields.is_empty() {
        return Err(NodataError::parse(&dbf_path, "no attribute fields found"));
    }
    if records.is_empty() {
        return Err(NodataError::parse(path, "no features found"));
    }

    let names = super::source::unique_names(fields.iter().map(|(n, _)| n.clone()).collect());
    let columns: Vec<Column> = names
        .into_iter()
        .zip(&fields)
        .map(|(name, (_, field_type))| Column::new(name, column_type(*field_type)))
        .collect();

    let limit = max_rows.unwrap_or(usize::MAX);
    let mut rows = Vec::with_capacity(records.len().min(limit));
    for (index, (shape, record)) in shapes.into_iter().zip(records).enumerate().take(limit) {
        let values = fields
            .iter()
            .map(|(name, _)| record.get(name).map(field_value).unwrap_or(Value::Null))
            .collect();

        let mut row = Row::new(index, values);
        match convert_shape(&shape) {
            Some(geometry) => row = row.with_geometry(geometry),
            None => warn!("Feature {} has no geometry", index),
        }
        rows.push(row);
    }

    debug!(
        "Read {} features with {} attribute fields from {}",
        rows.len(),
        columns.len(),
        path.display()
    );
    Ok(Dataset::spatial(columns, rows))
}

fn column_type(field_type: FieldType) -> ColumnType {
    match field_type {
        FieldType::Integer => ColumnType::Integer,
        FieldType::Numeric | FieldType::Float | FieldType::Double | FieldType::Currency => {
            ColumnType::Float
        }
        FieldType::Logical => ColumnType::Boolean,
        _ => ColumnType::Text,
    }
}

fn field_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Numeric(n) => n.map(Value::Number).unwrap_or(Value::Null),
        FieldValue::Float(f) => f.map(|f| Value::Number(f as f64)).unwrap_or(Value::Null),
        FieldValue::Double(d) => Value::Number(*d),
        FieldValue::Integer(i) => Value::Number(*i as f64),
        FieldValue::Currency(c) => Value::Number(*c),
        FieldValue::Logical(b) => b.map(Value::Bool).unwrap_or(Value::Null),
        FieldValue::Character(s) => s
            .as_ref()
            .map(|s| Value::Text(s.trim_end().to_string()))
            .unwrap_or(Value::Null),
        FieldValue::Memo(s) => Value::Text(s.clone()),
        FieldValue::Date(d) => d.map(|d| Value::Text(iso_date(&d))).unwrap_or(Value::Null),
        FieldValue::DateTime(dt) => {
            let t = dt.time();
            Value::Text(format!(
                "{}T{:02}:{:02}:{:02}",
                iso_date(&dt.date()),
                t.hours(),
                t.minutes(),
                t.seconds()
            ))
        }
    }
}

/// `YYYY-MM-DD`.
fn iso_date(date: &dbase::Date) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

fn convert_shape(shape: &Shape) -> Option<Geometry> {
    let xy = |x: f64, y: f64| Coord::new(x, y);

    let geometry = match shape {
        Shape::NullShape => return None,
        Shape::Point(p) => Geometry::Point(xy(p.x, p.y)),
        Shape::PointM(p) => Geometry::Point(xy(p.x, p.y)),
        Shape::PointZ(p) => Geometry::Point(xy(p.x, p.y)),
        Shape::Multipoint(m) => Geometry::MultiPoint(m.points().iter().map(|p| xy(p.x, p.y)).collect()),
        Shape::MultipointM(m) => {
            Geometry::MultiPoint(m.points().iter().map(|p| xy(p.x, p.y)).collect())
        }
        Shape::MultipointZ(m) => {
            Geometry::MultiPoint(m.points().iter().map(|p| xy(p.x, p.y)).collect())
        }
        Shape::Polyline(l) => Geometry::LineString(
            l.parts()
                .iter()
                .map(|part| part.iter().map(|p| xy(p.x, p.y)).collect())
                .collect(),
        ),
        Shape::PolylineM(l) => Geometry::LineString(
            l.parts()
                .iter()
                .map(|part| part.iter().map(|p| xy(p.x, p.y)).collect())
                .collect(),
        ),
        Shape::PolylineZ(l) => Geometry::LineString(
            l.parts()
                .iter()
                .map(|part| part.iter().map(|p| xy(p.x, p.y)).collect())
                .collect(),
        ),
        Shape::Polygon(poly) => Geometry::Polygon(
            poly.rings()
                .iter()
                .map(|ring| Ring {
                    outer: matches!(ring, PolygonRing::Outer(_)),
                    points: ring.points().iter().map(|p| xy(p.x, p.y)).collect(),
                })
                .collect(),
        ),
        Shape::PolygonM(poly) => Geometry::Polygon(
            poly.rings()
                .iter()
                .map(|ring| Ring {
                    outer: matches!(ring, PolygonRing::Outer(_)),
                    points: ring.points().iter().map(|p| xy(p.x, p.y)).collect(),
                })
                .collect(),
        ),
        Shape::PolygonZ(poly) => Geometry::Polygon(
            poly.rings()
                .iter()
                .map(|ring| Ring {
                    outer: matches!(ring, PolygonRing::Outer(_)),
                    points: ring.points().iter().map(|p| xy(p.x, p.y)).collect(),
                })
                .collect(),
        ),
        Shape::Multipatch(_) => {
            warn!("Multipatch geometry is not supported and was dropped");
            return None;
        }
    };
    Some(geometry)
}

/// dBase field names for the columns: at most 10 characters, unique.
pub(crate) fn field_names(columns: &[Column]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::with_capacity(columns.len());

    for column in columns {
        let base: String = column.name.chars().take(MAX_FIELD_NAME).collect();
        let mut name = base.clone();
        let mut n = 1;
        while !seen.insert(name.clone()) {
            let suffix = format!("_{}", n);
            let keep = MAX_FIELD_NAME.saturating_sub(suffix.len());
            name = format!("{}{}", base.chars().take(keep).collect::<String>(), suffix);
            n += 1;
        }
        names.push(name);
    }
    names
}

/// Write a spatial dataset as `.shp`/`.shx`/`.dbf`.
///
/// Every row must carry geometry of the same kind.
pub(crate) fn write_shapefile(dataset: &Dataset, path: &Path) -> Result<()> {
    if !dataset.has_geometry() {
        return Err(NodataError::export(
            path,
            "dataset has no geometry; shapefile export needs a spatial input",
        ));
    }

    let geometries: Vec<&Geometry> = dataset
        .rows
        .iter()
        .map(|row| {
            row.geometry.as_ref().ok_or_else(|| {
                NodataError::export(path, format!("row {} has no geometry", row.index))
            })
        })
        .collect::<Result<_>>()?;

    let kind = geometries.first().map(|g| shape_kind(g));
    if geometries.iter().any(|g| Some(shape_kind(g)) != kind) {
        return Err(NodataError::export(
            path,
            "shapefiles hold one geometry type; the dataset mixes several",
        ));
    }

    let names = field_names(&dataset.columns);
    let mut widths = vec![0usize; dataset.column_count()];
    let mut builder = TableWriterBuilder::new();
    for ((column, name), position) in dataset.columns.iter().zip(&names).zip(0..) {
        let field_name =
            FieldName::try_from(name.as_str()).map_err(|e| NodataError::export(path, format!("{:?}", e)))?;
        builder = match column.column_type {
            ColumnType::Integer => builder.add_numeric_field(field_name, 18, 0),
            ColumnType::Float => builder.add_numeric_field(field_name, 24, 15),
            ColumnType::Boolean => builder.add_logical_field(field_name),
            ColumnType::Text => {
                let width = dataset
                    .column_values(position)
                    .map(|v| v.to_string().len())
                    .max()
                    .unwrap_or(1)
                    .clamp(1, MAX_CHARACTER_WIDTH);
                widths[position] = width;
                builder.add_character_field(field_name, width as u8)
            }
        };
    }

    let mut writer =
        shapefile::Writer::from_path(path, builder).map_err(|e| NodataError::export(path, e))?;

    let mut truncated = HashSet::new();
    for (row, geometry) in dataset.rows.iter().zip(geometries) {
        let mut record = dbase::Record::default();
        for (position, ((column, name), value)) in
            dataset.columns.iter().zip(&names).zip(&row.values).enumerate()
        {
            let field = match (column.column_type, value) {
                (ColumnType::Text, Value::Text(text)) if text.len() > widths[position] => {
                    if truncated.insert(position) {
                        warn!(
                            "Text in column '{}' exceeds {} bytes and was truncated",
                            column.name, widths[position]
                        );
                    }
                    FieldValue::Character(Some(truncate_to(text, widths[position]).to_string()))
                }
                _ => to_field_value(column.column_type, value),
            };
            record.insert(name.clone(), field);
        }

        let written = match geometry {
            Geometry::Point(c) => writer.write_shape_and_record(&Point::new(c.x, c.y), &record),
            Geometry::MultiPoint(points) => writer.write_shape_and_record(
                &Multipoint::new(points.iter().map(|c| Point::new(c.x, c.y)).collect()),
                &record,
            ),
            Geometry::LineString(parts) => writer.write_shape_and_record(
                &Polyline::with_parts(
                    parts
                        .iter()
                        .map(|part| part.iter().map(|c| Point::new(c.x, c.y)).collect())
                        .collect(),
                ),
                &record,
            ),
            Geometry::Polygon(rings) => writer.write_shape_and_record(
                &Polygon::with_rings(
                    rings
                        .iter()
                        .map(|ring| {
                            let points = ring.points.iter().map(|c| Point::new(c.x, c.y)).collect();
                            if ring.outer {
                                PolygonRing::Outer(points)
                            } else {
                                PolygonRing::Inner(points)
                            }
                        })
                        .collect(),
                ),
                &record,
            ),
        };
        written.map_err(|e| NodataError::export(path, e))?;
    }

    debug!("Wrote {} features to {}", dataset.row_count(), path.display());
    Ok(())
}

/// Longest prefix of `text` within `max_bytes`, cut on a char boundary.
fn truncate_to(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

fn shape_kind(geometry: &Geometry) -> &'static str {
    match geometry {
        Geometry::Point(_) => "point",
        Geometry::MultiPoint(_) => "multipoint",
        Geometry::LineString(_) => "polyline",
        Geometry::Polygon(_) => "polygon",
    }
}

fn to_field_value(column_type: ColumnType, value: &Value) -> FieldValue {
    match column_type {
        ColumnType::Integer | ColumnType::Float => FieldValue::Numeric(value.as_f64()),
        ColumnType::Boolean => FieldValue::Logical(match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }),
        ColumnType::Text => FieldValue::Character(match value {
            Value::Null => None,
            other => Some(other.to_string()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_truncated_and_unique() {
        let columns = vec![
            Column::new("precipitation_mm", ColumnType::Float),
            Column::new("precipitation_in", ColumnType::Float),
            Column::new("id", ColumnType::Text),
        ];
        let names = field_names(&columns);

        assert_eq!(names[0], "precipitat");
        assert_eq!(names[1], "precipit_1");
        assert_eq!(names[2], "id");
        assert!(names.iter().all(|n| n.len() <= MAX_FIELD_NAME));
    }

    #[test]
    fn test_field_value_conversion() {
        assert_eq!(
            field_value(&FieldValue::Numeric(Some(-9999.0))),
            Value::Number(-9999.0)
        );
        assert_eq!(field_value(&FieldValue::Numeric(None)), Value::Null);
        assert_eq!(
            field_value(&FieldValue::Character(Some("Zone A   ".into()))),
            Value::Text("Zone A".into())
        );
        assert_eq!(field_value(&FieldValue::Logical(Some(true))), Value::Bool(true));
    }

    #[test]
    fn test_date_fields_read_as_iso_text() {
        let survey = dbase::Date::new(1, 2, 2020);
        assert_eq!(
            field_value(&FieldValue::Date(Some(survey))),
            Value::Text("2020-02-01".into())
        );
        assert_eq!(field_value(&FieldValue::Date(None)), Value::Null);

        let stamp = dbase::DateTime::new(survey, dbase::Time::new(7, 5, 9));
        assert_eq!(
            field_value(&FieldValue::DateTime(stamp)),
            Value::Text("2020-02-01T07:05:09".into())
        );
    }

    #[test]
    fn test_truncate_to_char_boundary() {
        assert_eq!(truncate_to("abc", 5), "abc");
        assert_eq!(truncate_to("abcdef", 4), "abcd");
        // 'é' is two bytes; a cut at 3 falls inside the second one.
        assert_eq!(truncate_to("ééé", 3), "é");
    }

    #[test]
    fn test_long_text_truncated_on_export() {
        let long = "x".repeat(300);
        let accented = "é".repeat(200);
        let rows = [long.clone(), accented.clone()]
            .into_iter()
            .enumerate()
            .map(|(i, note)| {
                Row::new(i, vec![Value::Text(note), Value::Number(i as f64)])
                    .with_geometry(Geometry::Point(Coord::new(i as f64, 0.0)))
            })
            .collect();
        let ds = Dataset::spatial(
            vec![
                Column::new("note", ColumnType::Text),
                Column::new("depth", ColumnType::Float),
            ],
            rows,
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.shp");
        write_shapefile(&ds, &path).unwrap();

        let back = read_shapefile(&path, None).unwrap();
        let Value::Text(first) = &back.rows[0].values[0] else {
            panic!("expected text, got {:?}", back.rows[0].values[0]);
        };
        assert_eq!(first.len(), MAX_CHARACTER_WIDTH);
        assert!(long.starts_with(first.as_str()));

        let Value::Text(second) = &back.rows[1].values[0] else {
            panic!("expected text, got {:?}", back.rows[1].values[0]);
        };
        assert_eq!(second, &"é".repeat(MAX_CHARACTER_WIDTH / 2));
        assert_eq!(back.rows[1].values[1], Value::Number(1.0));
    }

    #[test]
    fn test_shape_conversion() {
        let point = Shape::Point(Point::new(3.0, 4.0));
        assert_eq!(
            convert_shape(&point),
            Some(Geometry::Point(Coord::new(3.0, 4.0)))
        );
        assert_eq!(convert_shape(&Shape::NullShape), None);
    }

    #[test]
    fn test_non_spatial_export_rejected() {
        let ds = Dataset::new(vec![Column::new("v", ColumnType::Float)], Vec::new());
        let dir = tempfile::tempdir().unwrap();
        let result = write_shapefile(&ds, &dir.path().join("out.shp"));
        assert!(matches!(result, Err(NodataError::Export { .. })));
    }
}
