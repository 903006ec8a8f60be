//! Directory scanning and record loading.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glob::{glob, Pattern};
use tracing::{debug, info, warn};

use super::descriptor::{ObjectDescriptor, ObjectTable};
use super::error::CatalogError;
use crate::elements::{parse_element_set, ChecksumWarning, ElementRecord};

/// File extension of element set files.
pub const ELEMENT_FILE_EXTENSION: &str = "tle";

/// A loaded catalog: dense records, metadata and any checksum warnings.
#[derive(Debug, Clone)]
pub struct Catalog {
    records: Vec<ElementRecord>,
    objects: Arc<ObjectTable>,
    sources: Vec<PathBuf>,
    warnings: Vec<ChecksumWarning>,
}

impl Catalog {
    /// Builds a catalog from records already in memory, without descriptors.
    pub fn from_records(records: Vec<ElementRecord>) -> Self {
        let objects = ObjectTable::new(records.iter().map(ObjectDescriptor::unnamed).collect());
        Self {
            records,
            objects: Arc::new(objects),
            sources: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in object index order.
    pub fn records(&self) -> &[ElementRecord] {
        &self.records
    }

    pub fn objects(&self) -> &Arc<ObjectTable> {
        &self.objects
    }

    /// Source file of each record; empty for in-memory catalogs.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn warnings(&self) -> &[ChecksumWarning] {
        &self.warnings
    }
}

/// Loads every `*.tle` file of a directory in sorted path order.
///
/// # Example
///
/// ```no_run
/// use satsky::catalog::CatalogLoader;
///
/// let catalog = CatalogLoader::new("caches/tle")
///     .with_descriptor_dir("caches/descriptors")
///     .load()
///     .unwrap();
/// println!("{} objects", catalog.len());
/// ```
#[derive(Debug, Clone)]
pub struct CatalogLoader {
    element_dir: PathBuf,
    descriptor_dir: Option<PathBuf>,
}

impl CatalogLoader {
    pub fn new(element_dir: impl Into<PathBuf>) -> Self {
        Self {
            element_dir: element_dir.into(),
            descriptor_dir: None,
        }
    }

    /// Reads display names from `<dir>/<catalog id>.txt`.
    pub fn with_descriptor_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.descriptor_dir = Some(dir.into());
        self
    }

    /// Lists the element files that [`load`](Self::load) would read, in order.
    pub fn element_files(&self) -> Result<Vec<PathBuf>, CatalogError> {
        if !self.element_dir.is_dir() {
            return Err(CatalogError::MissingDirectory(self.element_dir.clone()));
        }

        // Only the file name part is a pattern
        let pattern = PathBuf::from(Pattern::escape(&self.element_dir.to_string_lossy()))
            .join(format!("*.{}", ELEMENT_FILE_EXTENSION));
        let mut paths = Vec::new();
        for entry in glob(&pattern.to_string_lossy())? {
            let path = entry.map_err(|e| CatalogError::Io {
                path: e.path().to_path_buf(),
                source: e.into_error(),
            })?;
            paths.push(path);
        }
        paths.sort();
        Ok(paths)
    }

    /// Loads and validates the whole catalog.
    ///
    /// # Errors
    ///
    /// Any unreadable file, wrong line count, malformed record or repeated
    /// catalog id fails the load. Checksum mismatches are only collected.
    pub fn load(&self) -> Result<Catalog, CatalogError> {
        let paths = self.element_files()?;
        if paths.is_empty() {
            warn!(dir = %self.element_dir.display(), "No element files found");
        }

        let mut records = Vec::with_capacity(paths.len());
        let mut warnings = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::with_capacity(paths.len());

        for (index, path) in paths.iter().enumerate() {
            let (record, mut record_warnings) = read_element_file(path)?;
            if let Some(&first) = seen.get(&record.catalog_id) {
                return Err(CatalogError::DuplicateId {
                    catalog_id: record.catalog_id,
                    first: paths[first].clone(),
                    second: path.clone(),
                });
            }
            seen.insert(record.catalog_id.clone(), index);
            warnings.append(&mut record_warnings);
            records.push(record);
        }

        let descriptors = match &self.descriptor_dir {
            Some(dir) => records
                .iter()
                .map(|record| ObjectDescriptor::load(dir, record))
                .collect(),
            None => records.iter().map(ObjectDescriptor::unnamed).collect(),
        };

        info!(
            objects = records.len(),
            checksum_warnings = warnings.len(),
            dir = %self.element_dir.display(),
            "Loaded element catalog"
        );

        Ok(Catalog {
            records,
            objects: Arc::new(ObjectTable::new(descriptors)),
            sources: paths,
            warnings,
        })
    }
}

/// Reads one element file holding exactly two non-empty lines.
pub fn read_element_file(
    path: &Path,
) -> Result<(ElementRecord, Vec<ChecksumWarning>), CatalogError> {
    let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let lines: Vec<&str> = text
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect();
    if lines.len() != 2 {
        return Err(CatalogError::LineCount {
            path: path.to_path_buf(),
            found: lines.len(),
        });
    }

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parsed = parse_element_set(&name, lines[0], lines[1]).map_err(|source| {
        CatalogError::Element {
            path: path.to_path_buf(),
            source,
        }
    })?;

    debug!(file = %name, catalog_id = %parsed.record.catalog_id, "Parsed element file");
    Ok((parsed.record, parsed.warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ISS: &str = "1 25544U 98067A   25185.47485775  .00005492  00000+0  10282-3 0  9993\n\
                       2 25544  51.6344 221.3901 0002450 331.8120  28.2736 15.50368910517843\n";
    const CSS: &str = "1 48274U 21035A   25185.52916667  .00022916  00000+0  26233-3 0  9997\n\
                       2 48274  41.4669 289.2546 0005585 317.1417  42.8934 15.60658307237216\n";

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_load_sorted_by_path() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "b-iss.tle", ISS);
        write(dir.path(), "a-css.tle", CSS);
        write(dir.path(), "notes.txt", "ignored");

        let catalog = CatalogLoader::new(dir.path()).load().unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.records()[0].catalog_id, "48274");
        assert_eq!(catalog.records()[1].catalog_id, "25544");
        assert_eq!(catalog.objects()[1].name, "25544");
        assert!(catalog.warnings().is_empty());
    }

    #[test]
    fn test_directory_name_with_pattern_characters() {
        let root = TempDir::new().unwrap();
        let literal = root.path().join("sky[1]*");
        let lookalike = root.path().join("sky1-other");
        std::fs::create_dir(&literal).unwrap();
        std::fs::create_dir(&lookalike).unwrap();
        write(&literal, "iss.tle", ISS);
        write(&lookalike, "css.tle", CSS);

        let catalog = CatalogLoader::new(&literal).load().unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.records()[0].catalog_id, "25544");
        assert_eq!(catalog.sources()[0], literal.join("iss.tle"));
    }

    #[test]
    fn test_descriptors_applied() {
        let tle_dir = TempDir::new().unwrap();
        let descriptor_dir = TempDir::new().unwrap();
        write(tle_dir.path(), "iss.tle", ISS);
        write(descriptor_dir.path(), "25544.txt", "ISS (ZARYA)\nstation\n");

        let catalog = CatalogLoader::new(tle_dir.path())
            .with_descriptor_dir(descriptor_dir.path())
            .load()
            .unwrap();
        assert_eq!(catalog.objects()[0].name, "ISS (ZARYA)");
        assert_eq!(catalog.objects()[0].tags, vec!["station"]);
    }

    #[test]
    fn test_line_count_is_fatal() {
        for contents in [
            "",
            "1 25544U 98067A   25185.47485775  .00005492  00000+0  10282-3 0  9993\n",
        ] {
            let dir = TempDir::new().unwrap();
            write(dir.path(), "bad.tle", contents);
            let err = CatalogLoader::new(dir.path()).load().unwrap_err();
            assert!(matches!(err, CatalogError::LineCount { .. }), "{}", err);
        }

        let dir = TempDir::new().unwrap();
        write(dir.path(), "three.tle", &format!("ISS (ZARYA)\n{}", ISS));
        let err = CatalogLoader::new(dir.path()).load().unwrap_err();
        assert!(matches!(err, CatalogError::LineCount { found: 3, .. }));
    }

    #[test]
    fn test_crlf_and_blank_lines_accepted() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "iss.tle", &format!("\r\n{}\r\n", ISS.replace('\n', "\r\n")));
        let catalog = CatalogLoader::new(dir.path()).load().unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_malformed_record_is_fatal() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "iss.tle", ISS);
        write(dir.path(), "mismatch.tle", &CSS.replacen("2 48274", "2 48275", 1));
        let err = CatalogLoader::new(dir.path()).load().unwrap_err();
        assert!(matches!(err, CatalogError::Element { .. }));
    }

    #[test]
    fn test_duplicate_catalog_id() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.tle", ISS);
        write(dir.path(), "b.tle", ISS);
        match CatalogLoader::new(dir.path()).load().unwrap_err() {
            CatalogError::DuplicateId {
                catalog_id,
                first,
                second,
            } => {
                assert_eq!(catalog_id, "25544");
                assert!(first.ends_with("a.tle"));
                assert!(second.ends_with("b.tle"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_checksum_warning_collected() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "iss.tle", &ISS.replacen("0  9993", "0  9990", 1));
        let catalog = CatalogLoader::new(dir.path()).load().unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.warnings().len(), 1);
        assert_eq!(catalog.warnings()[0].name, "iss.tle");
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = CatalogLoader::new(dir.path().join("absent")).load().unwrap_err();
        assert!(matches!(err, CatalogError::MissingDirectory(_)));
    }

    #[test]
    fn test_empty_directory_is_empty_catalog() {
        let dir = TempDir::new().unwrap();
        let catalog = CatalogLoader::new(dir.path()).load().unwrap();
        assert!(catalog.is_empty());
    }
}
