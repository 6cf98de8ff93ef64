//! Per-run decompiler state

use crate::config::DecompileOptions;
use crate::document::{Document, ElementId};
use crate::index::ElementIndex;
use crate::messages::{Diagnostic, MessageCode, Messages};
use crate::types::{Database, OutputKind, RowView};
use std::collections::{BTreeMap, HashSet};

use super::standard::TARGETDIR;

/// Everything one decompile run reads and accumulates.
///
/// Decoders and finalizers receive the context explicitly; nothing is shared
/// between runs.
pub struct Context<'a> {
    pub db: &'a Database,
    pub options: &'a DecompileOptions,
    pub doc: Document,
    pub index: ElementIndex,
    pub messages: Messages,
    /// Long file names were disabled in the summary information
    pub short_names: bool,
    /// Files are compressed by default
    pub compressed: bool,
    /// Sequence rows a finalizer has taken over, as (table, action)
    pub suppressed_actions: HashSet<(String, String)>,
    package: ElementId,
    ui: Option<ElementId>,
    target_dir_ref: Option<ElementId>,
    compliance_check: Option<ElementId>,
    sequences: BTreeMap<String, ElementId>,
}

impl<'a> Context<'a> {
    pub fn new(db: &'a Database, options: &'a DecompileOptions) -> Self {
        let mut doc = Document::new();
        let package = doc.create_child(doc.root(), options.output_kind.root_element());

        Self {
            db,
            options,
            doc,
            index: ElementIndex::new(),
            messages: Messages::new(),
            short_names: false,
            compressed: false,
            suppressed_actions: HashSet::new(),
            package,
            ui: None,
            target_dir_ref: None,
            compliance_check: None,
            sequences: BTreeMap::new(),
        }
    }

    pub fn output_kind(&self) -> OutputKind {
        self.options.output_kind
    }

    /// Package, Module or PatchCreation element
    pub fn package(&self) -> ElementId {
        self.package
    }

    /// Create an element directly under the package element
    pub fn add_to_package(&mut self, name: &str) -> ElementId {
        self.doc.create_child(self.package, name)
    }

    /// The single `UI` element, created on first use
    pub fn ui(&mut self) -> ElementId {
        if let Some(ui) = self.ui {
            return ui;
        }
        let ui = self.add_to_package("UI");
        self.ui = Some(ui);
        ui
    }

    /// `DirectoryRef Id="TARGETDIR"` holding components installed there
    pub fn target_dir_ref(&mut self) -> ElementId {
        if let Some(dir) = self.target_dir_ref {
            return dir;
        }
        let dir = self.add_to_package("DirectoryRef");
        self.doc.set_attribute(dir, "Id", TARGETDIR);
        self.target_dir_ref = Some(dir);
        dir
    }

    /// Generic compliance check container
    pub fn compliance_check(&mut self) -> ElementId {
        if let Some(check) = self.compliance_check {
            return check;
        }
        let check = self.add_to_package("ComplianceCheck");
        self.compliance_check = Some(check);
        check
    }

    pub fn has_compliance_check(&self) -> bool {
        self.compliance_check.is_some()
    }

    /// Element for a sequence table, created on first use
    pub fn sequence(&mut self, name: &str) -> ElementId {
        if let Some(&seq) = self.sequences.get(name) {
            return seq;
        }
        let seq = self.add_to_package(name);
        self.sequences.insert(name.to_string(), seq);
        seq
    }

    /// Property element for `id`, created under the package when missing
    pub fn ensure_property(&mut self, id: &str) -> ElementId {
        if let Some(property) = self.index.get("Property", id) {
            return property;
        }
        let property = self.add_to_package("Property");
        self.doc.set_attribute(property, "Id", id);
        self.index.insert("Property", id, property);
        property
    }

    pub fn warn(&mut self, code: MessageCode, row: &RowView<'_>, message: impl Into<String>) {
        self.messages.write(
            Diagnostic::warning(code, message).at_row(row.table(), &row.primary_key()),
        );
    }

    /// Foreign key whose target row produced no element
    pub fn expected_foreign_row(
        &mut self,
        row: &RowView<'_>,
        column: &str,
        value: &str,
        target_table: &str,
    ) {
        self.messages.write(
            Diagnostic::warning(
                MessageCode::ExpectedForeignRow,
                format!(
                    "{}.{} references '{}' but no such row exists in {}",
                    row.table(),
                    column,
                    value,
                    target_table
                ),
            )
            .at_row(row.table(), &row.primary_key())
            .with_column(column)
            .with_value(value)
            .with_target(target_table),
        );
    }

    /// Value outside the documented set for its column
    pub fn illegal_value(&mut self, row: &RowView<'_>, column: &str, value: impl ToString) {
        let value = value.to_string();
        self.messages.write(
            Diagnostic::warning(
                MessageCode::IllegalColumnValue,
                format!("{}.{} has illegal value '{}'", row.table(), column, value),
            )
            .at_row(row.table(), &row.primary_key())
            .with_column(column)
            .with_value(value),
        );
    }

    /// Bits no decoder understands; the known bits are still decoded
    pub fn unknown_bits(&mut self, row: &RowView<'_>, column: &str, bits: i64) {
        if bits == 0 {
            return;
        }
        self.messages.write(
            Diagnostic::warning(
                MessageCode::UnknownAttributeBits,
                format!("{}.{} has unknown bits 0x{:x}", row.table(), column, bits),
            )
            .at_row(row.table(), &row.primary_key())
            .with_column(column)
            .with_value(format!("0x{:x}", bits)),
        );
    }

    /// Look up the element produced for a foreign key, warning when missing
    pub fn require(
        &mut self,
        row: &RowView<'_>,
        column: &str,
        target_table: &str,
    ) -> Option<ElementId> {
        let value = row.str(column)?;
        match self.index.get(target_table, value) {
            Some(element) => Some(element),
            None => {
                self.expected_foreign_row(row, column, value, target_table);
                None
            }
        }
    }

    /// Attach `element` under the component named by the row's Component_
    pub fn add_to_component(&mut self, row: &RowView<'_>, element: ElementId) {
        if let Some(component) = self.require(row, "Component_", "Component") {
            self.doc.add_child(component, element);
        }
    }

    /// Source path for a stream exported into `folder`
    pub fn export_path(&self, folder: &str, id: &str) -> String {
        format!("{}\\{}\\{}", self.options.base_source_path, folder, id)
    }
}
