//! Material record: a named, ordered bag of string properties
//!
//! Records are opaque to the registry. Values are kept exactly as written in
//! the script (file paths, numbers, space separated colors, "0"/"1" flags) and
//! are never reinterpreted, so a record can be written back out unchanged.

use std::collections::HashSet;
use std::fmt;

use super::error::SourceLocation;

/// Key of the material annotation property
pub const ANNOTATION_KEY: &str = "annotation";
/// Key naming the mesh surface a material maps onto
pub const MAP_TO_KEY: &str = "mapTo";
/// Prefix of the numbered material tag properties (`materialTag0`, `materialTag1`, ...)
pub const MATERIAL_TAG_PREFIX: &str = "materialTag";

/// A property key split into its base name and optional layer index
///
/// `diffuseMap[1]` has base `diffuseMap` and layer `1`; `castShadows` has no
/// layer. Keys whose bracket suffix is not a plain integer are treated as
/// having no layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyKey<'a> {
    /// Key without the bracketed suffix
    pub base: &'a str,
    /// Layer index from the bracketed suffix
    pub layer: Option<u32>,
}

impl<'a> PropertyKey<'a> {
    /// Split a raw key into base and layer
    pub fn parse(key: &'a str) -> Self {
        let layered = key
            .strip_suffix(']')
            .and_then(|rest| rest.rsplit_once('['))
            .and_then(|(base, index)| {
                let all_digits = !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit());
                if base.is_empty() || !all_digits {
                    return None;
                }
                index.parse::<u32>().ok().map(|layer| (base, layer))
            });

        match layered {
            Some((base, layer)) => Self {
                base,
                layer: Some(layer),
            },
            None => Self {
                base: key,
                layer: None,
            },
        }
    }
}

impl fmt::Display for PropertyKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.layer {
            Some(layer) => write!(f, "{}[{}]", self.base, layer),
            None => f.write_str(self.base),
        }
    }
}

/// Errors raised when building a record by hand
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// Material names must be non-empty
    #[error("material name must not be empty")]
    EmptyName,

    /// Keys must be unique within one record
    #[error("duplicate key '{0}'")]
    DuplicateKey(String),
}

/// Where a record was defined
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordOrigin {
    /// Source label (file path or caller supplied name)
    pub source_name: String,
    /// Location of the `singleton` keyword
    pub location: SourceLocation,
}

/// One material definition
///
/// Equality compares name and properties only; two records read from
/// different files with identical content are equal.
#[derive(Debug, Clone)]
pub struct MaterialRecord {
    name: String,
    properties: Vec<(String, String)>,
    origin: Option<RecordOrigin>,
}

impl MaterialRecord {
    /// Build a record from key/value pairs in declaration order
    pub fn from_properties<K, V, I>(name: impl Into<String>, properties: I) -> Result<Self, RecordError>
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let name = name.into();
        if name.is_empty() {
            return Err(RecordError::EmptyName);
        }

        let mut seen = HashSet::new();
        let mut collected = Vec::new();
        for (key, value) in properties {
            let key = key.into();
            if !seen.insert(key.clone()) {
                return Err(RecordError::DuplicateKey(key));
            }
            collected.push((key, value.into()));
        }

        Ok(Self {
            name,
            properties: collected,
            origin: None,
        })
    }

    /// Parser entry point; name and key uniqueness are checked by the caller
    pub(crate) fn from_parts(name: String, properties: Vec<(String, String)>, origin: RecordOrigin) -> Self {
        Self {
            name,
            properties,
            origin: Some(origin),
        }
    }

    /// Attach provenance to a hand-built record
    pub fn with_origin(mut self, origin: RecordOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Material name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where this record was defined, if it came from a script
    pub fn origin(&self) -> Option<&RecordOrigin> {
        self.origin.as_ref()
    }

    /// Look up a raw property value by its exact key (layer suffix included)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Look up `base[layer]`
    pub fn layer(&self, base: &str, layer: u32) -> Option<&str> {
        self.properties.iter().find_map(|(key, value)| {
            let parsed = PropertyKey::parse(key);
            (parsed.base == base && parsed.layer == Some(layer)).then_some(value.as_str())
        })
    }

    /// All layered values of one base key, sorted by layer index
    pub fn layers(&self, base: &str) -> Vec<(u32, &str)> {
        let mut layers: Vec<(u32, &str)> = self
            .properties
            .iter()
            .filter_map(|(key, value)| {
                let parsed = PropertyKey::parse(key);
                match parsed.layer {
                    Some(layer) if parsed.base == base => Some((layer, value.as_str())),
                    _ => None,
                }
            })
            .collect();
        layers.sort_by_key(|(layer, _)| *layer);
        layers
    }

    /// Value of `mapTo`
    pub fn map_to(&self) -> Option<&str> {
        self.get(MAP_TO_KEY)
    }

    /// Value of `annotation` (e.g. "NATURE", "BUILDINGS")
    pub fn annotation(&self) -> Option<&str> {
        self.get(ANNOTATION_KEY)
    }

    /// Values of `materialTag0`, `materialTag1`, ... ordered by their number
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<(u32, &str)> = self
            .properties
            .iter()
            .filter_map(|(key, value)| {
                let index = key.strip_prefix(MATERIAL_TAG_PREFIX)?;
                if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                index.parse::<u32>().ok().map(|i| (i, value.as_str()))
            })
            .collect();
        tags.sort_by_key(|(index, _)| *index);
        tags.into_iter().map(|(_, tag)| tag).collect()
    }

    /// Properties in declaration order
    pub fn properties(&self) -> impl ExactSizeIterator<Item = (&str, &str)> + '_ {
        self.properties.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether the record has no properties
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl PartialEq for MaterialRecord {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.properties == other.properties
    }
}

impl Eq for MaterialRecord {}

/// Writes the record back in singleton notation
impl fmt::Display for MaterialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "singleton Material({})", self.name)?;
        writeln!(f, "{{")?;
        for (key, value) in &self.properties {
            writeln!(f, "    {key} = \"{value}\";")?;
        }
        writeln!(f, "}};")
    }
}

/// Render several records as one script, separated by blank lines
pub fn write_script<'a>(records: impl IntoIterator<Item = &'a MaterialRecord>) -> String {
    records
        .into_iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
