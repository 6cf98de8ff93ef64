//! Table model for a loaded installer database

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Separator between the parts of a composite primary key.
///
/// A forward slash is never valid inside an MSI identifier, so joined keys
/// cannot collide.
pub const KEY_SEPARATOR: char = '/';

/// Join primary key parts the same way rows do
pub fn join_key(parts: &[&str]) -> String {
    let mut key = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            key.push(KEY_SEPARATOR);
        }
        key.push_str(part);
    }
    key
}

/// Kind of document produced by a decompile run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutputKind {
    #[default]
    Package,
    Module,
    PatchCreation,
}

impl OutputKind {
    /// Infer the output kind from a database file extension
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("msm") => OutputKind::Module,
            Some("pcp") => OutputKind::PatchCreation,
            _ => OutputKind::Package,
        }
    }

    /// Tag of the element that receives top-level output
    pub fn root_element(&self) -> &'static str {
        match self {
            OutputKind::Package => "Package",
            OutputKind::Module => "Module",
            OutputKind::PatchCreation => "PatchCreation",
        }
    }
}

impl std::str::FromStr for OutputKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "package" | "product" | "msi" => Ok(OutputKind::Package),
            "module" | "msm" => Ok(OutputKind::Module),
            "patch-creation" | "patchcreation" | "pcp" => Ok(OutputKind::PatchCreation),
            _ => Err(format!("Unknown output kind: {}", s)),
        }
    }
}

/// Storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    /// String column with a maximum width (0 = unlimited)
    String(usize),
    Int16,
    Int32,
    /// Stream column
    Binary,
}

impl ColumnType {
    pub fn display_name(&self) -> &'static str {
        match self {
            ColumnType::String(_) => "string",
            ColumnType::Int16 | ColumnType::Int32 => "int",
            ColumnType::Binary => "binary",
        }
    }

    pub fn width(&self) -> usize {
        match self {
            ColumnType::String(w) => *w,
            ColumnType::Int16 => 2,
            ColumnType::Int32 => 4,
            ColumnType::Binary => 0,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, ColumnType::Int16 | ColumnType::Int32)
    }
}

/// Semantic category of a column, as recorded in `_Validation`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColumnCategory {
    #[default]
    Unknown,
    Text,
    UpperCase,
    LowerCase,
    Integer,
    DoubleInteger,
    TimeDate,
    Identifier,
    Property,
    Filename,
    WildCardFilename,
    Path,
    Paths,
    AnyPath,
    DefaultDir,
    RegPath,
    Formatted,
    FormattedSddlText,
    Template,
    Condition,
    Guid,
    Version,
    Language,
    Binary,
    CustomSource,
    Cabinet,
    Shortcut,
}

impl ColumnCategory {
    /// Parse a category name (case-insensitive)
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "text" => ColumnCategory::Text,
            "uppercase" => ColumnCategory::UpperCase,
            "lowercase" => ColumnCategory::LowerCase,
            "integer" => ColumnCategory::Integer,
            "doubleinteger" => ColumnCategory::DoubleInteger,
            "timedate" => ColumnCategory::TimeDate,
            "identifier" => ColumnCategory::Identifier,
            "property" => ColumnCategory::Property,
            "filename" => ColumnCategory::Filename,
            "wildcardfilename" => ColumnCategory::WildCardFilename,
            "path" => ColumnCategory::Path,
            "paths" => ColumnCategory::Paths,
            "anypath" => ColumnCategory::AnyPath,
            "defaultdir" => ColumnCategory::DefaultDir,
            "regpath" => ColumnCategory::RegPath,
            "formatted" => ColumnCategory::Formatted,
            "formattedsddltext" => ColumnCategory::FormattedSddlText,
            "template" => ColumnCategory::Template,
            "condition" => ColumnCategory::Condition,
            "guid" => ColumnCategory::Guid,
            "version" => ColumnCategory::Version,
            "language" => ColumnCategory::Language,
            "binary" => ColumnCategory::Binary,
            "customsource" => ColumnCategory::CustomSource,
            "cabinet" => ColumnCategory::Cabinet,
            "shortcut" => ColumnCategory::Shortcut,
            _ => ColumnCategory::Unknown,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ColumnCategory::Unknown => "Unknown",
            ColumnCategory::Text => "Text",
            ColumnCategory::UpperCase => "UpperCase",
            ColumnCategory::LowerCase => "LowerCase",
            ColumnCategory::Integer => "Integer",
            ColumnCategory::DoubleInteger => "DoubleInteger",
            ColumnCategory::TimeDate => "TimeDate",
            ColumnCategory::Identifier => "Identifier",
            ColumnCategory::Property => "Property",
            ColumnCategory::Filename => "Filename",
            ColumnCategory::WildCardFilename => "WildCardFilename",
            ColumnCategory::Path => "Path",
            ColumnCategory::Paths => "Paths",
            ColumnCategory::AnyPath => "AnyPath",
            ColumnCategory::DefaultDir => "DefaultDir",
            ColumnCategory::RegPath => "RegPath",
            ColumnCategory::Formatted => "Formatted",
            ColumnCategory::FormattedSddlText => "FormattedSDDLText",
            ColumnCategory::Template => "Template",
            ColumnCategory::Condition => "Condition",
            ColumnCategory::Guid => "Guid",
            ColumnCategory::Version => "Version",
            ColumnCategory::Language => "Language",
            ColumnCategory::Binary => "Binary",
            ColumnCategory::CustomSource => "CustomSource",
            ColumnCategory::Cabinet => "Cabinet",
            ColumnCategory::Shortcut => "Shortcut",
        }
    }
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub col_type: ColumnType,
    pub category: ColumnCategory,
    pub nullable: bool,
    pub primary_key: bool,
    /// Referenced tables, semicolon-delimited when more than one
    pub key_table: Option<String>,
    /// One-based column in the referenced table
    pub key_column: Option<i32>,
    pub min_value: Option<i64>,
    pub max_value: Option<i64>,
    pub localizable: bool,
}

impl ColumnDefinition {
    pub fn new(name: &str, col_type: ColumnType, category: ColumnCategory) -> Self {
        Self {
            name: name.to_string(),
            col_type,
            category,
            nullable: false,
            primary_key: false,
            key_table: None,
            key_column: None,
            min_value: None,
            max_value: None,
            localizable: false,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn localizable(mut self) -> Self {
        self.localizable = true;
        self
    }

    pub fn references(mut self, tables: &str, column: i32) -> Self {
        self.key_table = Some(tables.to_string());
        self.key_column = Some(column);
        self
    }

    pub fn range(mut self, min: i64, max: i64) -> Self {
        self.min_value = Some(min);
        self.max_value = Some(max);
        self
    }

    /// Tables this column points at
    pub fn referenced_tables(&self) -> Vec<&str> {
        self.key_table
            .as_deref()
            .map(|t| t.split(';').map(str::trim).filter(|t| !t.is_empty()).collect())
            .unwrap_or_default()
    }
}

/// Table definition: name plus ordered columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
}

impl TableDefinition {
    pub fn new(name: &str, columns: Vec<ColumnDefinition>) -> Self {
        Self {
            name: name.to_string(),
            columns,
        }
    }

    /// Get column index by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Get primary key column names
    pub fn primary_keys(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// Cell value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i32),
    Long(i64),
    Binary(Vec<u8>),
    Null,
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn display(&self) -> String {
        match self {
            CellValue::String(s) => s.clone(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Long(i) => i.to_string(),
            CellValue::Binary(b) => format!("[{} bytes]", b.len()),
            CellValue::Null => String::new(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer value; numeric strings are accepted since MSI stores some
    /// integer-like data in string columns
    pub fn as_int(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i as i64),
            CellValue::Long(i) => Some(*i),
            CellValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Integer(i)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Null)
    }
}

/// Table row
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Row {
    pub values: Vec<CellValue>,
}

impl Row {
    pub fn new(values: Vec<CellValue>) -> Self {
        Self { values }
    }
}

/// MSI table with columns and rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub definition: TableDefinition,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(definition: TableDefinition) -> Self {
        Self {
            definition,
            rows: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn add_row(&mut self, values: Vec<CellValue>) {
        self.rows.push(Row { values });
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.definition.columns.len()
    }

    /// Read-only view of every row
    pub fn views(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows.iter().map(move |row| RowView {
            definition: &self.definition,
            row,
        })
    }
}

static NULL_CELL: CellValue = CellValue::Null;

/// A row paired with its definition, giving by-name access to fields
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    pub definition: &'a TableDefinition,
    pub row: &'a Row,
}

impl<'a> RowView<'a> {
    pub fn table(&self) -> &'a str {
        &self.definition.name
    }

    pub fn field(&self, column: &str) -> &'a CellValue {
        self.definition
            .column_index(column)
            .and_then(|i| self.row.values.get(i))
            .unwrap_or(&NULL_CELL)
    }

    pub fn is_null(&self, column: &str) -> bool {
        match self.field(column) {
            CellValue::Null => true,
            CellValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// String field; empty strings read as null, matching MSI semantics
    pub fn str(&self, column: &str) -> Option<&'a str> {
        match self.field(column) {
            CellValue::String(s) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// Field rendered as text regardless of storage type
    pub fn text(&self, column: &str) -> Option<String> {
        match self.field(column) {
            CellValue::Null => None,
            CellValue::String(s) if s.is_empty() => None,
            v => Some(v.display()),
        }
    }

    pub fn int(&self, column: &str) -> Option<i64> {
        self.field(column).as_int()
    }

    /// Primary key: primary-key fields in column order, joined by `/`
    pub fn primary_key(&self) -> String {
        let parts: Vec<String> = self
            .definition
            .columns
            .iter()
            .zip(self.row.values.iter())
            .filter(|(c, _)| c.primary_key)
            .map(|(_, v)| v.display())
            .collect();
        let refs: Vec<&str> = parts.iter().map(String::as_str).collect();
        join_key(&refs)
    }
}

/// Immutable snapshot of one installer database
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Database {
    tables: BTreeMap<String, Table>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table; returns the table it replaced, if any
    pub fn add_table(&mut self, table: Table) -> Option<Table> {
        self.tables.insert(table.name().to_string(), table)
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn remove_table(&mut self, name: &str) -> Option<Table> {
        self.tables.remove(name)
    }

    /// Tables in name order
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    /// Rows of a table, empty when the table is absent
    pub fn rows(&self, name: &str) -> Vec<RowView<'_>> {
        self.tables
            .get(name)
            .map(|t| t.views().collect())
            .unwrap_or_default()
    }

    /// Find a row by its joined primary key
    pub fn find_row(&self, table: &str, key: &str) -> Option<RowView<'_>> {
        self.tables
            .get(table)?
            .views()
            .find(|r| r.primary_key() == key)
    }
}
