//! Material script loading subsystem
//!
//! Reads `singleton Material(...)` scripts into a name-keyed registry where the
//! last definition of a name wins.

mod lexer;

pub mod error;
pub mod material_loader;
pub mod material_record;
pub mod material_registry;
pub mod singleton_parser;

pub use error::{ParseError, ParseErrorKind, RegistryError, SourceLocation};
pub use material_loader::{LevelLoadReport, MaterialLoader};
pub use material_record::{write_script, MaterialRecord, PropertyKey, RecordError, RecordOrigin};
pub use material_registry::{LoadReport, MaterialRegistry, MaterialSource};
pub use singleton_parser::{IgnoredDeclaration, ParseOutcome, SingletonParser};
