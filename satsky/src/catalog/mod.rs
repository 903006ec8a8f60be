//! Element catalog loading.
//!
//! A catalog is a directory holding one `*.tle` file per object. Files are
//! read in sorted path order, which fixes each object's index for the rest
//! of the process: index `i` is the state arena slot and `i + 1` the value
//! written into frame index buffers.
//!
//! An optional descriptor directory holds `<catalog id>.txt` files whose
//! first line is the display name and whose other lines are tags.

mod descriptor;
mod error;
mod loader;

pub use descriptor::{ObjectDescriptor, ObjectTable};
pub use error::CatalogError;
pub use loader::{read_element_file, Catalog, CatalogLoader, ELEMENT_FILE_EXTENSION};
