//! Derives the before/after/post-fill layers from a repair pass.

use log::debug;
use serde::{Deserialize, Serialize};

use super::layer::{Feature, FeatureGroup, LayerKind, LayerSpec, Style};
use crate::repair::{MissingFlags, RepairOutcome};
use crate::schema::Dataset;

/// coolwarm endpoints, low then high.
const COOL: [u8; 3] = [59, 76, 192];
const WARM: [u8; 3] = [180, 4, 38];
const GREEN: [u8; 3] = [0, 128, 0];
const LIGHT_GREY: [u8; 3] = [211, 211, 211];
const RED: [u8; 3] = [255, 0, 0];

const MARKER: u32 = 4;
const SMALL_MARKER: u32 = 2;

/// Label of the highlight group in the post-fill layer.
pub const STILL_MISSING: &str = "Still Missing";

/// Layers for the renderer, or the reason there are none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Diagnostics {
    /// The dataset carries no geometry.
    NotApplicable,
    Layers { layers: Vec<LayerSpec> },
}

impl Diagnostics {
    pub fn is_applicable(&self) -> bool {
        matches!(self, Diagnostics::Layers { .. })
    }

    pub fn layers(&self) -> &[LayerSpec] {
        match self {
            Diagnostics::NotApplicable => &[],
            Diagnostics::Layers { layers } => layers,
        }
    }
}

/// Builds diagnostic layers. Never mutates its inputs.
pub struct DiagnosticsRecorder;

impl DiagnosticsRecorder {
    /// Build the layers from a repair outcome.
    pub fn from_outcome(outcome: &RepairOutcome) -> Diagnostics {
        Self::record(
            &outcome.snapshot,
            outcome.before.as_ref(),
            &outcome.dataset,
            outcome.post_fill.as_ref(),
        )
    }

    /// Build the three layers.
    ///
    /// `original` is the dataset after sentinel substitution and before
    /// imputation; `repaired` is the imputed dataset. Returns `NotApplicable`
    /// when either has no geometry or its flags were not computed.
    pub fn record(
        original: &Dataset,
        before: Option<&MissingFlags>,
        repaired: &Dataset,
        post_fill: Option<&MissingFlags>,
    ) -> Diagnostics {
        let (Some(before), Some(post_fill)) = (before, post_fill) else {
            return Diagnostics::NotApplicable;
        };
        if !original.has_geometry() || !repaired.has_geometry() {
            return Diagnostics::NotApplicable;
        }

        let layers = vec![
            Self::missing_before(original, before),
            Self::cleaned_after(repaired),
            Self::post_fill_check(repaired, post_fill),
        ];
        for layer in &layers {
            debug!(
                "Layer {}: {} features, {} legend entries",
                layer.kind.file_stem(),
                layer.feature_count(),
                layer.legend().len()
            );
        }
        Diagnostics::Layers { layers }
    }

    /// Layer A: every row, categorized by whether it had a missing value.
    fn missing_before(original: &Dataset, before: &MissingFlags) -> LayerSpec {
        let (missing, complete) = split_by_flag(original, before);

        let mut layer = LayerSpec::new(LayerKind::MissingBefore);
        for (label, color, members) in [("False", COOL, complete), ("True", WARM, missing)] {
            if !members.is_empty() {
                layer = layer.with_group(FeatureGroup {
                    label: Some(label.to_string()),
                    style: Style::new(color, MARKER),
                    features: members,
                });
            }
        }
        layer
    }

    /// Layer B: every repaired row, one style.
    fn cleaned_after(repaired: &Dataset) -> LayerSpec {
        LayerSpec::new(LayerKind::CleanedAfter).with_group(FeatureGroup {
            label: None,
            style: Style::new(GREEN, MARKER),
            features: features(repaired).collect(),
        })
    }

    /// Layer C: all rows as background, rows still missing on top.
    fn post_fill_check(repaired: &Dataset, post_fill: &MissingFlags) -> LayerSpec {
        let (missing, _) = split_by_flag(repaired, post_fill);

        let mut layer = LayerSpec::new(LayerKind::PostFillCheck).with_group(FeatureGroup {
            label: None,
            style: Style::new(LIGHT_GREY, SMALL_MARKER),
            features: features(repaired).collect(),
        });
        if !missing.is_empty() {
            layer = layer.with_group(FeatureGroup {
                label: Some(STILL_MISSING.to_string()),
                style: Style::new(RED, SMALL_MARKER),
                features: missing,
            });
        }
        layer
    }
}

fn features(dataset: &Dataset) -> impl Iterator<Item = Feature> + '_ {
    dataset.rows.iter().filter_map(|row| {
        row.geometry.as_ref().map(|g| Feature {
            row: row.index,
            geometry: g.clone(),
        })
    })
}

/// Features whose flag is true, then the rest.
fn split_by_flag(dataset: &Dataset, flags: &MissingFlags) -> (Vec<Feature>, Vec<Feature>) {
    features(dataset).partition(|f| flags.get(f.row).unwrap_or(false))
}
