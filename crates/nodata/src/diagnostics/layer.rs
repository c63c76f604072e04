//! Layer specifications handed to a renderer.

use serde::{Deserialize, Serialize};

use crate::schema::{BoundingBox, Geometry};

/// The three diagnostic views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    /// Rows categorized by the before flag.
    MissingBefore,
    /// Repaired rows, uniform style.
    CleanedAfter,
    /// Repaired rows with still-missing rows highlighted.
    PostFillCheck,
}

impl LayerKind {
    /// Middle part of the output file name.
    pub fn file_stem(&self) -> &'static str {
        match self {
            LayerKind::MissingBefore => "missing_before",
            LayerKind::CleanedAfter => "cleaned_after",
            LayerKind::PostFillCheck => "post_fill_check",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            LayerKind::MissingBefore => "Missing Data (-9999) Before Cleaning",
            LayerKind::CleanedAfter => "After Forward Fill",
            LayerKind::PostFillCheck => "Final Data Check",
        }
    }
}

/// Drawing style for a group of features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    /// RGB fill/stroke color.
    pub color: [u8; 3],
    /// Side length of point markers, in pixels.
    pub marker_size: u32,
}

impl Style {
    pub const fn new(color: [u8; 3], marker_size: u32) -> Self {
        Self { color, marker_size }
    }
}

/// A row's geometry within a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Row identifier.
    pub row: usize,
    pub geometry: Geometry,
}

/// Features drawn with one style, optionally named in the legend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureGroup {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub style: Style,
    pub features: Vec<Feature>,
}

/// Legend entry of a rendered layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: [u8; 3],
}

/// One diagnostic view. Groups are drawn in order, later groups on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub kind: LayerKind,
    pub title: String,
    pub groups: Vec<FeatureGroup>,
}

impl LayerSpec {
    pub fn new(kind: LayerKind) -> Self {
        Self {
            kind,
            title: kind.title().to_string(),
            groups: Vec::new(),
        }
    }

    pub fn with_group(mut self, group: FeatureGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Labelled, non-empty groups, in drawing order.
    pub fn legend(&self) -> Vec<LegendEntry> {
        self.groups
            .iter()
            .filter(|g| !g.features.is_empty())
            .filter_map(|g| {
                g.label.as_ref().map(|label| LegendEntry {
                    label: label.clone(),
                    color: g.style.color,
                })
            })
            .collect()
    }

    pub fn feature_count(&self) -> usize {
        self.groups.iter().map(|g| g.features.len()).sum()
    }

    /// Group with the given legend label.
    pub fn group(&self, label: &str) -> Option<&FeatureGroup> {
        self.groups
            .iter()
            .find(|g| g.label.as_deref() == Some(label))
    }

    /// Bounding box of every feature in the layer.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.groups
            .iter()
            .flat_map(|g| g.features.iter())
            .filter_map(|f| f.geometry.bounding_box())
            .reduce(|a, b| a.union(&b))
    }
}
