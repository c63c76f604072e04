//! Before/after visual diagnostics for spatial datasets.

mod layer;
mod recorder;
mod render;

pub use layer::{Feature, FeatureGroup, LayerKind, LayerSpec, LegendEntry, Style};
pub use recorder::{Diagnostics, DiagnosticsRecorder, STILL_MISSING};
pub use render::{PngRenderer, RenderConfig, Renderer, layer_file_name};
