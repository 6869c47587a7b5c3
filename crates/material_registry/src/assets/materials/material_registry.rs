//! Material registry: name-keyed store of effective material definitions
//!
//! Sources are loaded in the order the caller chooses. For every material
//! name the registry keeps exactly one record, the last one loaded, replaced
//! as a whole (no field-level merging between two definitions).
//!
//! Loading happens once, before the registry is handed to the renderer. After
//! that it is read-only and can be shared across threads by reference or
//! through an `Arc`.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use super::error::{ParseError, RegistryError};
use super::material_record::MaterialRecord;
use super::singleton_parser::{IgnoredDeclaration, SingletonParser};

/// Script text plus the label used for errors and provenance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialSource {
    /// Label, usually the file path
    pub name: String,
    /// Script contents
    pub contents: String,
}

impl MaterialSource {
    /// Wrap in-memory script text
    pub fn from_text(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }

    /// Read a script file; the path becomes the source label
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| RegistryError::io(path, e))?;
        Ok(Self {
            name: path.display().to_string(),
            contents,
        })
    }
}

/// What one `load` call did
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Source label
    pub source_name: String,
    /// Names defined by this source, in declaration order
    pub defined: Vec<String>,
    /// Names whose previous definition was replaced by this source
    pub replaced: Vec<String>,
    /// Malformed blocks that were skipped
    pub errors: Vec<ParseError>,
    /// Non-material declarations that were skipped
    pub ignored: Vec<IgnoredDeclaration>,
}

impl LoadReport {
    /// True when every block in the source loaded
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone)]
struct RegistryEntry {
    /// Load sequence of the effective definition
    sequence: u64,
    record: MaterialRecord,
}

/// Name-keyed store of effective material records
#[derive(Debug, Default)]
pub struct MaterialRegistry {
    /// Storage: material name -> effective record
    records: HashMap<String, RegistryEntry>,
    /// Enumeration order: load sequence -> material name
    order: BTreeMap<u64, String>,
    next_sequence: u64,
    /// Labels of every source loaded, in order
    sources: Vec<String>,
}

impl MaterialRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a source and insert or replace its records by name
    ///
    /// Malformed blocks are skipped and listed in the report; the rest of the
    /// source still loads.
    pub fn load(&mut self, source: &MaterialSource) -> LoadReport {
        let outcome = SingletonParser::parse(&source.name, &source.contents);

        let mut report = LoadReport {
            source_name: source.name.clone(),
            errors: outcome.errors,
            ignored: outcome.ignored,
            ..Default::default()
        };

        for error in &report.errors {
            log::warn!("Skipping material block: {error}");
        }
        for ignored in &report.ignored {
            log::debug!(
                "{}:{}: ignoring {} declaration '{}'",
                source.name,
                ignored.location,
                ignored.class_name,
                ignored.name
            );
        }

        for record in outcome.records {
            let name = record.name().to_string();
            if self.insert(record).is_some() {
                report.replaced.push(name.clone());
            }
            report.defined.push(name);
        }

        self.sources.push(source.name.clone());

        log::info!(
            "Loaded {} material(s) from {} ({} replaced, {} error(s))",
            report.defined.len(),
            source.name,
            report.replaced.len(),
            report.errors.len()
        );

        report
    }

    /// Read and load a script file
    ///
    /// An unreadable file fails as a whole and leaves the registry untouched.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<LoadReport, RegistryError> {
        let source = MaterialSource::from_file(path)?;
        Ok(self.load(&source))
    }

    /// Insert a record, replacing any earlier record with the same name
    ///
    /// # Returns
    /// The superseded record, if there was one
    pub fn insert(&mut self, record: MaterialRecord) -> Option<MaterialRecord> {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let name = record.name().to_string();
        self.order.insert(sequence, name.clone());

        let previous = self.records.insert(name, RegistryEntry { sequence, record })?;
        self.order.remove(&previous.sequence);

        if let Some(origin) = previous.record.origin() {
            log::debug!(
                "Material '{}' from {}:{} has been replaced",
                previous.record.name(),
                origin.source_name,
                origin.location
            );
        }

        Some(previous.record)
    }

    /// Current effective record for `name`, `None` if it was never defined
    pub fn lookup(&self, name: &str) -> Option<&MaterialRecord> {
        self.records.get(name).map(|entry| &entry.record)
    }

    /// Whether `name` has an effective definition
    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    /// Every effective record exactly once, ordered by when its effective
    /// definition was loaded (oldest first)
    pub fn all(&self) -> impl Iterator<Item = &MaterialRecord> + '_ {
        self.order
            .values()
            .filter_map(|name| self.records.get(name).map(|entry| &entry.record))
    }

    /// Effective material names in the same order as [`all`](Self::all)
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.values().map(String::as_str)
    }

    /// Number of distinct material names
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Labels of the sources loaded so far, in load order
    pub fn loaded_sources(&self) -> &[String] {
        &self.sources
    }

    /// Drop every record and the load history
    pub fn clear(&mut self) {
        self.records.clear();
        self.order.clear();
        self.sources.clear();
        self.next_sequence = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::materials::ParseErrorKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn source(name: &str, contents: &str) -> MaterialSource {
        MaterialSource::from_text(name, contents)
    }

    #[test]
    fn test_later_definition_replaces_whole_record() {
        let mut registry = MaterialRegistry::new();
        registry.load(&source(
            "first.cs",
            r#"singleton Material(m) { diffuseMap[0] = "a.dds"; glow[0] = "1"; };"#,
        ));
        let report = registry.load(&source("second.cs", r#"singleton Material(m) { diffuseMap[0] = "b.dds"; };"#));

        assert_eq!(report.replaced, vec!["m".to_string()]);
        let record = registry.lookup("m").unwrap();
        assert_eq!(record.get("diffuseMap[0]"), Some("b.dds"));
        // No field from the first definition survives
        assert_eq!(record.get("glow[0]"), None);
        assert_eq!(record.len(), 1);
        assert_eq!(record.origin().unwrap().source_name, "second.cs");
    }

    #[test]
    fn test_lookup_unknown_name() {
        let registry = MaterialRegistry::new();
        assert!(registry.lookup("never_loaded").is_none());
        assert!(!registry.contains("never_loaded"));
    }

    #[test]
    fn test_malformed_and_valid_record_in_one_source() {
        let mut registry = MaterialRegistry::new();
        let report = registry.load(&source(
            "mixed.cs",
            "singleton Material(bad) { mapTo = \"bad\" };\nsingleton Material(good) { mapTo = \"good\"; };",
        ));

        assert_eq!(report.errors.len(), 1);
        assert!(!report.is_clean());
        assert_eq!(report.defined, vec!["good".to_string()]);
        assert!(registry.lookup("good").is_some());
        assert!(registry.lookup("bad").is_none());
    }

    #[test]
    fn test_failed_redefinition_keeps_previous_record() {
        let mut registry = MaterialRegistry::new();
        registry.load(&source("a.cs", r#"singleton Material(m) { mapTo = "old"; };"#));
        let report = registry.load(&source("b.cs", r#"singleton Material(m) { mapTo = "x"; mapTo = "y"; };"#));

        assert!(matches!(report.errors[0].kind, ParseErrorKind::DuplicateKey { .. }));
        assert_eq!(registry.lookup("m").unwrap().map_to(), Some("old"));
    }

    #[test]
    fn test_all_yields_each_name_once_in_definition_order() {
        let mut registry = MaterialRegistry::new();
        registry.load(&source(
            "a.cs",
            "singleton Material(x) { };\nsingleton Material(y) { };\nsingleton Material(z) { };",
        ));
        registry.load(&source("b.cs", "singleton Material(x) { };"));

        let names: Vec<&str> = registry.all().map(MaterialRecord::name).collect();
        assert_eq!(names, vec!["y", "z", "x"]);
        assert_eq!(registry.names().collect::<Vec<_>>(), names);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_same_name_twice_in_one_source() {
        let mut registry = MaterialRegistry::new();
        let report = registry.load(&source(
            "a.cs",
            "singleton Material(m) { mapTo = \"1\"; };\nsingleton Material(m) { mapTo = \"2\"; };",
        ));
        assert_eq!(report.defined.len(), 2);
        assert_eq!(report.replaced, vec!["m".to_string()]);
        assert_eq!(registry.lookup("m").unwrap().map_to(), Some("2"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_insert_returns_superseded_record() {
        let mut registry = MaterialRegistry::new();
        let first = MaterialRecord::from_properties("m", [("mapTo", "a")]).unwrap();
        let second = MaterialRecord::from_properties("m", [("mapTo", "b")]).unwrap();

        assert!(registry.insert(first.clone()).is_none());
        assert_eq!(registry.insert(second.clone()), Some(first));
        assert_eq!(registry.lookup("m"), Some(&second));
    }

    #[test]
    fn test_load_file_and_unreadable_file() {
        let mut registry = MaterialRegistry::new();

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "singleton Material(disk) {{ mapTo = \"disk\"; }};").unwrap();
        let report = registry.load_file(temp_file.path()).unwrap();
        assert_eq!(report.defined, vec!["disk".to_string()]);

        let missing = temp_file.path().with_extension("missing");
        let err = registry.load_file(&missing).unwrap_err();
        assert!(matches!(err, RegistryError::Io { .. }));

        // Previously loaded state is untouched
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.loaded_sources().len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut registry = MaterialRegistry::new();
        registry.load(&source("a.cs", "singleton Material(m) { };"));
        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.loaded_sources().is_empty());
        assert_eq!(registry.all().count(), 0);
    }

    #[test]
    fn test_registry_can_be_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MaterialRegistry>();
    }
}
