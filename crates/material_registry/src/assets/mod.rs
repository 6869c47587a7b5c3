//! Asset loading
//!
//! Only material scripts live here for now; the registry does not load
//! textures or shaders, it stores what the scripts say about them.

pub mod materials;

pub use materials::{
    LevelLoadReport, LoadReport, MaterialLoader, MaterialRecord, MaterialRegistry, MaterialSource, ParseError,
    ParseErrorKind, RegistryError,
};
