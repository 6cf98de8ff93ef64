//! Database to document decompiler
//!
//! A run validates the snapshot, decodes every table in dependency order and
//! then runs the cross-table finalizers. Any error-severity diagnostic means
//! no document is returned; every diagnostic is returned either way.

pub mod context;
pub mod decoders;
pub mod standard;

mod finalize;

use crate::config::DecompileOptions;
use crate::document::Document;
use crate::extension::ExtensionRegistry;
use crate::messages::{Diagnostic, MessageCode, Messages};
use crate::resolver::resolve_order;
use crate::schema::{is_internal_table, is_standard_table};
use crate::types::{Database, Table, TableDefinition};
use context::Context;
use decoders::DecodeFn;
use std::collections::{BTreeMap, HashMap};

const SUMMARY_INFORMATION: &str = "_SummaryInformation";

/// Tables removed when the user interface is suppressed
const UI_TABLES: &[&str] = &[
    "ActionText",
    "AdminUISequence",
    "BBControl",
    "Billboard",
    "CheckBox",
    "ComboBox",
    "Control",
    "ControlCondition",
    "ControlEvent",
    "Dialog",
    "Error",
    "EventMapping",
    "InstallUISequence",
    "ListBox",
    "ListView",
    "RadioButton",
    "TextStyle",
    "UIText",
];

/// Result of one run
#[derive(Debug)]
pub struct DecompileOutput {
    /// None when any error was recorded
    pub document: Option<Document>,
    pub messages: Vec<Diagnostic>,
}

impl DecompileOutput {
    pub fn succeeded(&self) -> bool {
        self.document.is_some()
    }
}

/// Turns installer databases into WiX source documents
#[derive(Debug, Default)]
pub struct Decompiler {
    options: DecompileOptions,
    extensions: ExtensionRegistry,
}

impl Decompiler {
    pub fn new(options: DecompileOptions) -> Self {
        Self {
            options,
            extensions: ExtensionRegistry::new(),
        }
    }

    pub fn with_extensions(mut self, extensions: ExtensionRegistry) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn options(&self) -> &DecompileOptions {
        &self.options
    }

    /// Decompile one database snapshot
    pub fn decompile(&self, db: &Database) -> DecompileOutput {
        let mut messages = Messages::new();
        let extension_tables = self.extensions.table_definitions(&mut messages);
        validate(db, &extension_tables, &mut messages);
        if messages.encountered_error() {
            return DecompileOutput {
                document: None,
                messages: messages.into_entries(),
            };
        }

        let db = self.prepare(db);
        let mut ctx = Context::new(&db, &self.options);
        ctx.messages = messages;

        if let Some(summary) = db.table(SUMMARY_INFORMATION) {
            decoders::summary_information()(&mut ctx, summary);
        }

        let registry = decoders::registry();
        let order = resolve_order(db.tables().map(|t| &t.definition));
        log::debug!("Table order: {}", order.join(", "));

        for name in order.iter().filter(|name| *name != SUMMARY_INFORMATION) {
            if let Some(table) = db.table(name) {
                self.decompile_table(&mut ctx, &registry, table);
            }
        }

        if !ctx.messages.encountered_error() {
            finalize::run_all(&mut ctx);
            for extension in self.extensions.iter() {
                log::debug!("Finalizing extension {}", extension.name());
                extension.finalize(&mut ctx);
            }
        }

        let document = if ctx.messages.encountered_error() {
            None
        } else {
            Some(ctx.doc)
        };
        DecompileOutput {
            document,
            messages: ctx.messages.into_entries(),
        }
    }

    /// Copy of the snapshot with empty and suppressed tables removed
    fn prepare(&self, db: &Database) -> Database {
        let mut db = db.clone();

        if !self.options.suppress_dropping_empty_tables {
            for name in db.table_names() {
                if db.table(&name).is_some_and(|t| t.rows.is_empty()) {
                    log::debug!("Dropping empty table {}", name);
                    db.remove_table(&name);
                }
            }
        }

        if self.options.suppress_ui {
            for &name in UI_TABLES {
                if db.remove_table(name).is_some() {
                    log::debug!("Dropping UI table {}", name);
                }
            }
        }

        db
    }

    fn decompile_table(
        &self,
        ctx: &mut Context<'_>,
        registry: &HashMap<&'static str, DecodeFn>,
        table: &Table,
    ) {
        let name = table.name();
        log::debug!("Decompiling table {} ({} rows)", name, table.row_count());

        if let Some(extension) = self.extensions.claimant(name) {
            if let Err(e) = extension.decompile_table(ctx, table) {
                ctx.messages.write(
                    Diagnostic::error(
                        MessageCode::ExtensionFailure,
                        format!("Extension {} failed to decompile {}: {}", extension.name(), name, e),
                    )
                    .in_table(name),
                );
            }
            return;
        }

        if is_internal_table(name) {
            return;
        }

        if table.rows.is_empty() {
            if is_standard_table(name) {
                decoders::ensure_table(ctx, name);
            } else if !self.options.suppress_custom_tables {
                decoders::decompile_custom_table(ctx, table);
            }
            return;
        }

        if let Some(decode) = registry.get(name) {
            decode(ctx, table);
        } else if is_standard_table(name) {
            ctx.messages.write(
                Diagnostic::warning(
                    MessageCode::TableDecompilationUnimplemented,
                    format!("Decompiling table {} is not supported", name),
                )
                .in_table(name),
            );
        } else if self.options.suppress_custom_tables {
            log::debug!("Skipping custom table {}", name);
        } else {
            decoders::decompile_custom_table(ctx, table);
        }
    }
}

/// Check every row against its table shape.
///
/// An extension's definition takes precedence over the one stored with the
/// table.
fn validate(
    db: &Database,
    extension_tables: &BTreeMap<String, TableDefinition>,
    messages: &mut Messages,
) {
    for table in db.tables() {
        let definition = extension_tables
            .get(table.name())
            .unwrap_or(&table.definition);
        let expected = definition.columns.len();

        for (i, row) in table.rows.iter().enumerate() {
            if row.values.len() != expected {
                messages.write(
                    Diagnostic::error(
                        MessageCode::MalformedRow,
                        format!(
                            "Row {} of table {} has {} fields, expected {}",
                            i + 1,
                            table.name(),
                            row.values.len(),
                            expected
                        ),
                    )
                    .in_table(table.name()),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::{DecompilerExtension, ExtensionError};
    use crate::schema::standard_definition;
    use crate::types::{CellValue, ColumnCategory, ColumnDefinition, ColumnType};

    fn property_table(rows: &[(&str, &str)]) -> Table {
        let mut table = Table::new(standard_definition("Property").unwrap());
        for &(name, value) in rows {
            table.add_row(vec![name.into(), value.into()]);
        }
        table
    }

    // =====================================================================
    // Preparation
    // =====================================================================

    #[test]
    fn test_empty_tables_are_dropped() {
        let mut db = Database::new();
        db.add_table(Table::new(standard_definition("Registry").unwrap()));
        db.add_table(property_table(&[("ALLUSERS", "1")]));

        let output = Decompiler::new(DecompileOptions::default()).decompile(&db);
        let doc = output.document.unwrap();
        assert!(doc
            .descendants(doc.root())
            .iter()
            .all(|&e| doc.name(e) != "EnsureTable"));
    }

    #[test]
    fn test_kept_empty_tables_are_ensured() {
        let mut db = Database::new();
        db.add_table(Table::new(standard_definition("Registry").unwrap()));
        let options = DecompileOptions {
            suppress_dropping_empty_tables: true,
            ..DecompileOptions::default()
        };

        let output = Decompiler::new(options).decompile(&db);
        let doc = output.document.unwrap();
        let ensure = doc
            .descendants(doc.root())
            .into_iter()
            .find(|&e| doc.name(e) == "EnsureTable")
            .unwrap();
        assert_eq!(doc.attribute(ensure, "Id"), Some("Registry"));
    }

    #[test]
    fn test_suppress_ui_drops_dialogs() {
        let mut db = Database::new();
        let mut text = Table::new(standard_definition("UIText").unwrap());
        text.add_row(vec!["bytes".into(), "bytes".into()]);
        db.add_table(text);
        let options = DecompileOptions {
            suppress_ui: true,
            ..DecompileOptions::default()
        };

        let output = Decompiler::new(options).decompile(&db);
        let doc = output.document.unwrap();
        assert!(doc.descendants(doc.root()).iter().all(|&e| doc.name(e) != "UI"));
    }

    // =====================================================================
    // Failure handling
    // =====================================================================

    #[test]
    fn test_malformed_row_returns_no_document() {
        let mut table = Table::new(standard_definition("Property").unwrap());
        table.add_row(vec!["ALLUSERS".into()]);
        let mut db = Database::new();
        db.add_table(table);

        let output = Decompiler::new(DecompileOptions::default()).decompile(&db);

        assert!(!output.succeeded());
        assert_eq!(output.messages.len(), 1);
        assert_eq!(output.messages[0].code, MessageCode::MalformedRow);
    }

    #[test]
    fn test_unimplemented_standard_table_warns() {
        let definition = TableDefinition::new(
            "MsiAssembly",
            vec![ColumnDefinition::new("Component_", ColumnType::String(72), ColumnCategory::Identifier)
                .primary_key()],
        );
        let mut table = Table::new(definition);
        table.add_row(vec!["Core".into()]);
        let mut db = Database::new();
        db.add_table(table);

        let output = Decompiler::new(DecompileOptions::default()).decompile(&db);

        assert!(output.succeeded());
        assert_eq!(output.messages[0].code, MessageCode::TableDecompilationUnimplemented);
        assert_eq!(output.messages[0].table.as_deref(), Some("MsiAssembly"));
    }

    // =====================================================================
    // Extensions
    // =====================================================================

    struct Failing;

    impl DecompilerExtension for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn claims(&self, table: &str) -> bool {
            table == "Widgets"
        }

        fn decompile_table(&self, _ctx: &mut Context<'_>, _table: &Table) -> Result<(), ExtensionError> {
            Err(ExtensionError::Other("widgets are not supported".to_string()))
        }
    }

    #[test]
    fn test_extension_failure_is_an_error() {
        let definition = TableDefinition::new(
            "Widgets",
            vec![ColumnDefinition::new("Id", ColumnType::String(72), ColumnCategory::Identifier)
                .primary_key()],
        );
        let mut table = Table::new(definition);
        table.add_row(vec![CellValue::from("w1")]);
        let mut db = Database::new();
        db.add_table(table);
        let mut extensions = ExtensionRegistry::new();
        extensions.register(Failing);

        let output = Decompiler::new(DecompileOptions::default())
            .with_extensions(extensions)
            .decompile(&db);

        assert!(output.document.is_none());
        assert_eq!(output.messages.len(), 1);
        assert_eq!(output.messages[0].code, MessageCode::ExtensionFailure);
        assert!(output.messages[0].message.contains("widgets are not supported"));
    }
}
