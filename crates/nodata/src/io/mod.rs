//! Reading source files and writing cleaned output.

mod delimited;
mod loader;
mod shp;
mod source;
mod spreadsheet;
mod writer;

pub use loader::{Loader, LoaderConfig};
pub use source::{DataTable, InputFormat, SourceMetadata};
pub use writer::{ExportFormat, Writer};
