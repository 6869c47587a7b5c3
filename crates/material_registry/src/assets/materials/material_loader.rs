//! Material loader for level directories
//!
//! Finds every material script under a level's art folder and feeds them to a
//! [`MaterialRegistry`] in a deterministic order: the files of a directory come
//! before its sub-directories, and both groups are sorted by name. For the
//! `drivebuild` level that means `art/materials.cs` loads before
//! `art/objects/materials.cs`, so the object definitions win.

use std::fs;
use std::path::{Path, PathBuf};

use super::error::RegistryError;
use super::material_registry::{LoadReport, MaterialRegistry};
use crate::config::RegistryConfig;

/// Outcome of loading several sources
#[derive(Debug, Default)]
pub struct LevelLoadReport {
    /// One report per source that could be read, in load order
    pub reports: Vec<LoadReport>,
    /// Sources that failed as a whole (unreadable files)
    pub failures: Vec<RegistryError>,
}

impl LevelLoadReport {
    /// Total number of skipped malformed blocks across all sources
    pub fn parse_error_count(&self) -> usize {
        self.reports.iter().map(|report| report.errors.len()).sum()
    }

    /// True when every source was read and every block loaded
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.reports.iter().all(LoadReport::is_clean)
    }

    fn merge(&mut self, other: Self) {
        self.reports.extend(other.reports);
        self.failures.extend(other.failures);
    }
}

/// Loader for material scripts on disk
pub struct MaterialLoader;

impl MaterialLoader {
    /// List script files named `file_name` under `root`
    ///
    /// # Arguments
    /// * `root` - Level directory to scan
    /// * `file_name` - Script file name to match, e.g. `materials.cs`
    /// * `recursive` - Whether to descend into sub-directories
    pub fn discover(root: impl AsRef<Path>, file_name: &str, recursive: bool) -> Result<Vec<PathBuf>, RegistryError> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(RegistryError::NotADirectory(root.to_path_buf()));
        }

        let mut found = Vec::new();
        Self::discover_into(root, file_name, recursive, &mut found)?;
        Ok(found)
    }

    fn discover_into(dir: &Path, file_name: &str, recursive: bool, found: &mut Vec<PathBuf>) -> Result<(), RegistryError> {
        let mut files = Vec::new();
        let mut dirs = Vec::new();

        let entries = fs::read_dir(dir).map_err(|e| RegistryError::io(dir, e))?;
        for entry in entries {
            let path = entry.map_err(|e| RegistryError::io(dir, e))?.path();
            if path.is_dir() {
                dirs.push(path);
            } else if path.file_name().is_some_and(|name| name == file_name) {
                files.push(path);
            }
        }

        files.sort();
        dirs.sort();
        found.extend(files);

        if recursive {
            for sub_dir in dirs {
                Self::discover_into(&sub_dir, file_name, recursive, found)?;
            }
        }
        Ok(())
    }

    /// Load an ordered list of script files
    ///
    /// Unreadable files are collected as failures and do not stop the
    /// remaining files from loading.
    pub fn load_files<P: AsRef<Path>>(registry: &mut MaterialRegistry, paths: &[P]) -> LevelLoadReport {
        let mut level = LevelLoadReport::default();
        for path in paths {
            match registry.load_file(path) {
                Ok(report) => level.reports.push(report),
                Err(e) => {
                    log::error!("{e}");
                    level.failures.push(e);
                }
            }
        }
        level
    }

    /// Discover and load every script under a level directory
    pub fn load_level(
        registry: &mut MaterialRegistry,
        root: impl AsRef<Path>,
        file_name: &str,
        recursive: bool,
    ) -> Result<LevelLoadReport, RegistryError> {
        let root = root.as_ref();
        let paths = Self::discover(root, file_name, recursive)?;
        log::info!("Found {} material script(s) under {:?}", paths.len(), root);
        Ok(Self::load_files(registry, &paths))
    }

    /// Load every configured source in order
    ///
    /// File sources are loaded directly; directory sources go through
    /// discovery using the configured script file name.
    pub fn load_config(registry: &mut MaterialRegistry, config: &RegistryConfig) -> LevelLoadReport {
        let mut level = LevelLoadReport::default();
        for source in &config.sources {
            if source.is_dir() {
                match Self::load_level(registry, source, &config.script_file_name, config.recursive) {
                    Ok(report) => level.merge(report),
                    Err(e) => {
                        log::error!("{e}");
                        level.failures.push(e);
                    }
                }
            } else {
                level.merge(Self::load_files(registry, std::slice::from_ref(source)));
            }
        }
        level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str, contents: &str) -> PathBuf {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_discover_files_before_subdirectories() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "shapes/roads/materials.cs", "");
        write(root, "roads/materials.cs", "");
        write(root, "objects/materials.cs", "");
        write(root, "materials.cs", "");
        write(root, "objects/notes.txt", "");

        let found = MaterialLoader::discover(root, "materials.cs", true).unwrap();
        let relative: Vec<PathBuf> = found.iter().map(|p| p.strip_prefix(root).unwrap().to_path_buf()).collect();
        assert_eq!(
            relative,
            vec![
                PathBuf::from("materials.cs"),
                PathBuf::from("objects/materials.cs"),
                PathBuf::from("roads/materials.cs"),
                PathBuf::from("shapes/roads/materials.cs"),
            ]
        );
    }

    #[test]
    fn test_discover_non_recursive() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "materials.cs", "");
        write(temp.path(), "objects/materials.cs", "");

        let found = MaterialLoader::discover(temp.path(), "materials.cs", false).unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_discover_rejects_missing_root() {
        let temp = TempDir::new().unwrap();
        let err = MaterialLoader::discover(temp.path().join("nope"), "materials.cs", true).unwrap_err();
        assert!(matches!(err, RegistryError::NotADirectory(_)));
    }

    #[test]
    fn test_load_level_later_files_win() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "materials.cs", r#"singleton Material(sign) { colorMap[0] = "outer.dds"; };"#);
        write(temp.path(), "objects/materials.cs", r#"singleton Material(sign) { colorMap[0] = "inner.dds"; };"#);

        let mut registry = MaterialRegistry::new();
        let report = MaterialLoader::load_level(&mut registry, temp.path(), "materials.cs", true).unwrap();

        assert!(report.is_clean());
        assert_eq!(report.reports.len(), 2);
        assert_eq!(registry.lookup("sign").unwrap().layer("colorMap", 0), Some("inner.dds"));
    }

    #[test]
    fn test_load_files_continues_after_unreadable_file() {
        let temp = TempDir::new().unwrap();
        let good = write(temp.path(), "good.cs", r#"singleton Material(good) { mapTo = "good"; };"#);
        let missing = temp.path().join("missing.cs");

        let mut registry = MaterialRegistry::new();
        let report = MaterialLoader::load_files(&mut registry, &[missing, good]);

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.reports.len(), 1);
        assert!(!report.is_clean());
        assert!(registry.contains("good"));
    }

    #[test]
    fn test_load_config_mixes_files_and_directories() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "level/materials.cs", r#"singleton Material(m) { mapTo = "level"; };"#);
        let override_file = write(temp.path(), "override.cs", r#"singleton Material(m) { mapTo = "override"; } garbage"#);

        let config = RegistryConfig {
            sources: vec![temp.path().join("level"), override_file],
            ..Default::default()
        };

        let mut registry = MaterialRegistry::new();
        let report = MaterialLoader::load_config(&mut registry, &config);

        assert_eq!(report.reports.len(), 2);
        assert_eq!(report.parse_error_count(), 1);
        assert_eq!(registry.lookup("m").unwrap().map_to(), Some("override"));
        assert_eq!(registry.loaded_sources().len(), 2);
    }
}
