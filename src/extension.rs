//! Decompiler extensions
//!
//! An extension claims tables the built-in decoders do not know, decodes
//! them into elements and may run a pass of its own after the built-in
//! finalizers.

use crate::decompiler::context::Context;
use crate::messages::{Diagnostic, MessageCode, Messages};
use crate::schema::standard_definition;
use crate::types::{Table, TableDefinition};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Error raised by an extension while decoding a claimed table
#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error("row {key} cannot be decoded: {message}")]
    Row { key: String, message: String },

    #[error("{0}")]
    Other(String),
}

/// Table-level plug-in to the decompiler
pub trait DecompilerExtension: Send + Sync {
    /// Extension identifier used in diagnostics
    fn name(&self) -> &str;

    /// Definitions of the tables this extension owns
    fn table_definitions(&self) -> Vec<TableDefinition> {
        Vec::new()
    }

    /// True when this extension decodes `table`
    fn claims(&self, table: &str) -> bool {
        self.table_definitions().iter().any(|d| d.name == table)
    }

    fn decompile_table(&self, ctx: &mut Context<'_>, table: &Table) -> Result<(), ExtensionError>;

    /// Runs once after the built-in finalizers
    fn finalize(&self, _ctx: &mut Context<'_>) {}
}

/// Registered extensions, consulted in registration order
#[derive(Default, Clone)]
pub struct ExtensionRegistry {
    extensions: Vec<Arc<dyn DecompilerExtension>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<E: DecompilerExtension + 'static>(&mut self, extension: E) {
        log::debug!("Registered decompiler extension {}", extension.name());
        self.extensions.push(Arc::new(extension));
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// First extension claiming `table`
    pub fn claimant(&self, table: &str) -> Option<&dyn DecompilerExtension> {
        self.extensions
            .iter()
            .find(|e| e.claims(table))
            .map(|e| e.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn DecompilerExtension> {
        self.extensions.iter().map(|e| e.as_ref())
    }

    /// Merge the table definitions of every extension.
    ///
    /// A table defined twice with different columns, or redefining a
    /// standard table, is recorded as an error.
    pub fn table_definitions(&self, messages: &mut Messages) -> BTreeMap<String, TableDefinition> {
        let mut merged: BTreeMap<String, (String, TableDefinition)> = BTreeMap::new();

        for extension in &self.extensions {
            for definition in extension.table_definitions() {
                if let Some(standard) = standard_definition(&definition.name) {
                    if standard != definition {
                        messages.write(Diagnostic::error(
                            MessageCode::DuplicateTable,
                            format!(
                                "Extension {} redefines standard table {}",
                                extension.name(),
                                definition.name
                            ),
                        ));
                        continue;
                    }
                }

                match merged.get(&definition.name) {
                    Some((owner, existing)) if *existing != definition => {
                        messages.write(Diagnostic::error(
                            MessageCode::DuplicateTable,
                            format!(
                                "Table {} is defined by both {} and {}",
                                definition.name,
                                owner,
                                extension.name()
                            ),
                        ));
                    }
                    Some(_) => {}
                    None => {
                        merged.insert(
                            definition.name.clone(),
                            (extension.name().to_string(), definition),
                        );
                    }
                }
            }
        }

        merged
            .into_iter()
            .map(|(name, (_, definition))| (name, definition))
            .collect()
    }
}

impl std::fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.extensions.iter().map(|e| e.name()))
            .finish()
    }
}
