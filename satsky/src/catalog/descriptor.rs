//! Display metadata for catalog objects.

use std::io;
use std::ops::Index;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::elements::{ElementRecord, OrbitRegime};

/// Display metadata for one object, read from its descriptor file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    pub catalog_id: String,
    /// Display name; the catalog id when no descriptor exists.
    pub name: String,
    /// Free-text tags from the remaining descriptor lines.
    pub tags: Vec<String>,
    pub regime: OrbitRegime,
}

impl ObjectDescriptor {
    /// Metadata with the catalog id as name and no tags.
    pub fn unnamed(record: &ElementRecord) -> Self {
        Self {
            catalog_id: record.catalog_id.clone(),
            name: record.catalog_id.clone(),
            tags: Vec::new(),
            regime: record.orbit_regime(),
        }
    }

    /// Builds metadata from descriptor file contents.
    ///
    /// The first line is the name and every other non-empty line a tag.
    pub fn from_text(record: &ElementRecord, text: &str) -> Self {
        let mut lines = text.lines().map(str::trim);
        let name = lines
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or(record.catalog_id.as_str())
            .to_string();
        let tags = lines.filter(|tag| !tag.is_empty()).map(String::from).collect();

        Self {
            catalog_id: record.catalog_id.clone(),
            name,
            tags,
            regime: record.orbit_regime(),
        }
    }

    /// Reads `<dir>/<catalog id>.txt`, falling back to [`unnamed`](Self::unnamed).
    pub fn load(dir: &Path, record: &ElementRecord) -> Self {
        let path = dir.join(format!("{}.txt", record.catalog_id));
        match std::fs::read_to_string(&path) {
            Ok(text) => Self::from_text(record, &text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(catalog_id = %record.catalog_id, "No descriptor file, using catalog id as name");
                Self::unnamed(record)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read descriptor file");
                Self::unnamed(record)
            }
        }
    }
}

/// Object index to metadata side table, shared with every frame.
///
/// Positionally aligned with the propagator state arena.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectTable {
    descriptors: Vec<ObjectDescriptor>,
}

impl ObjectTable {
    pub fn new(descriptors: Vec<ObjectDescriptor>) -> Self {
        Self { descriptors }
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ObjectDescriptor> {
        self.descriptors.get(index)
    }

    /// Resolves an index buffer value (`index + 1`; 0 is empty sky).
    pub fn by_pixel_value(&self, value: u32) -> Option<&ObjectDescriptor> {
        let index = (value as usize).checked_sub(1)?;
        self.descriptors.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectDescriptor> {
        self.descriptors.iter()
    }
}

impl Index<usize> for ObjectTable {
    type Output = ObjectDescriptor;

    fn index(&self, index: usize) -> &Self::Output {
        &self.descriptors[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::parse_element_set;
    use tempfile::TempDir;

    fn iss() -> ElementRecord {
        parse_element_set(
            "iss",
            "1 25544U 98067A   25185.47485775  .00005492  00000+0  10282-3 0  9993",
            "2 25544  51.6344 221.3901 0002450 331.8120  28.2736 15.50368910517843",
        )
        .unwrap()
        .record
    }

    #[test]
    fn test_from_text_name_and_tags() {
        let descriptor = ObjectDescriptor::from_text(&iss(), "ISS (ZARYA)\nstation\n\n  crewed  \n");
        assert_eq!(descriptor.name, "ISS (ZARYA)");
        assert_eq!(descriptor.tags, vec!["station", "crewed"]);
        assert_eq!(descriptor.regime, OrbitRegime::Low);
    }

    #[test]
    fn test_blank_first_line_falls_back_to_id() {
        let descriptor = ObjectDescriptor::from_text(&iss(), "\nstation\n");
        assert_eq!(descriptor.name, "25544");
        assert_eq!(descriptor.tags, vec!["station"]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let descriptor = ObjectDescriptor::load(dir.path(), &iss());
        assert_eq!(descriptor, ObjectDescriptor::unnamed(&iss()));
    }

    #[test]
    fn test_load_from_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("25544.txt"), "ISS\n").unwrap();
        let descriptor = ObjectDescriptor::load(dir.path(), &iss());
        assert_eq!(descriptor.name, "ISS");
        assert!(descriptor.tags.is_empty());
    }

    #[test]
    fn test_table_pixel_value_lookup() {
        let table = ObjectTable::new(vec![ObjectDescriptor::unnamed(&iss())]);
        assert!(table.by_pixel_value(0).is_none());
        assert_eq!(table.by_pixel_value(1).unwrap().catalog_id, "25544");
        assert!(table.by_pixel_value(2).is_none());
        assert_eq!(table[0].name, "25544");
    }
}
