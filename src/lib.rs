//! wix-decompile - rebuild WiX source from installer databases
//!
//! Turns the tables of an MSI package, merge module or patch creation
//! database into a WiX v4 source document:
//! - Per-table decoders registered by table name
//! - Cross-table finalizers run in a fixed order
//! - Custom tables preserved as generic table dumps
//! - Structured diagnostics for every unresolved or illegal value

pub mod types;
pub mod messages;
pub mod document;
pub mod index;
pub mod names;
pub mod schema;
pub mod config;
pub mod resolver;
pub mod attributes;
pub mod extension;
pub mod reader;
pub mod decompiler;

pub use types::*;
pub use config::{ConfigError, DecompileOptions};
pub use decompiler::{DecompileOutput, Decompiler};
pub use document::{Document, ElementId};
pub use extension::{DecompilerExtension, ExtensionError, ExtensionRegistry};
pub use messages::{Diagnostic, MessageCode, Messages, Severity};
pub use reader::MsiFile;

use thiserror::Error;

/// Errors that can occur outside a decompile run
#[derive(Error, Debug)]
pub enum DecompileError {
    #[error("Failed to open installer database: {0}")]
    OpenError(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("XML error: {0}")]
    Xml(String),
}

pub type Result<T> = std::result::Result<T, DecompileError>;
