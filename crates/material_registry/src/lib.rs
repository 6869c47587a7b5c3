//! # Material Registry
//!
//! Loads `singleton Material(...)` scripts shipped with level art and resolves
//! them into one effective definition per material name.
//!
//! ## Features
//!
//! - **Script Parsing**: Located, per-block errors with recovery; one broken block never hides the rest
//! - **Override By Name**: The last loaded definition of a name replaces earlier ones as a whole
//! - **Level Discovery**: Deterministic load order for every `materials.cs` under a level folder
//! - **Opaque Values**: Property values are kept as written and can be written back unchanged
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use material_registry::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut registry = MaterialRegistry::new();
//!     registry.load_file("levels/drivebuild/art/materials.cs")?;
//!     registry.load_file("levels/drivebuild/art/objects/materials.cs")?;
//!
//!     if let Some(material) = registry.lookup("trafficlight") {
//!         println!("{:?}", material.layer("diffuseMap", 0));
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod assets;
pub mod config;
pub mod foundation;

/// Common imports for registry users
pub mod prelude {
    pub use crate::{
        assets::materials::{
            LevelLoadReport, LoadReport, MaterialLoader, MaterialRecord, MaterialRegistry, MaterialSource,
            ParseError, ParseErrorKind, PropertyKey, RegistryError,
        },
        config::{Config, ConfigError, RegistryConfig},
    };
}
