//! Installer database reader
//!
//! Loads an MSI, MSM or PCP file into an in-memory [`Database`] snapshot.

use crate::types::*;
use crate::{DecompileError, Result};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Name of the synthetic table holding summary information properties
pub const SUMMARY_INFORMATION_TABLE: &str = "_SummaryInformation";

/// Installer database opened for reading
pub struct MsiFile {
    path: PathBuf,
    package: msi::Package<std::fs::File>,
}

impl MsiFile {
    /// Open an installer database
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = std::fs::File::open(&path)?;
        let package = msi::Package::open(file)
            .map_err(|e| DecompileError::OpenError(format!("{}: {}", path.display(), e)))?;

        Ok(Self { path, package })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Output kind matching the file extension
    pub fn output_kind(&self) -> OutputKind {
        OutputKind::from_path(&self.path)
    }

    pub fn table_names(&self) -> Vec<String> {
        self.package.tables().map(|t| t.name().to_string()).collect()
    }

    /// Read one table with its column definitions
    pub fn get_table(&mut self, name: &str) -> Result<Table> {
        let msi_table = self
            .package
            .tables()
            .find(|t| t.name() == name)
            .ok_or_else(|| DecompileError::TableNotFound(name.to_string()))?;

        let definition = TableDefinition::new(
            name,
            msi_table.columns().iter().map(column_definition).collect(),
        );

        let rows: Vec<Row> = self
            .package
            .select_rows(msi::Select::table(name))
            .map_err(|e| DecompileError::Parse(format!("{}: {}", name, e)))?
            .map(|row| {
                let values = definition
                    .columns
                    .iter()
                    .enumerate()
                    .map(|(i, column)| cell_value(&row[i], column))
                    .collect();
                Row { values }
            })
            .collect();

        let mut table = Table::new(definition);
        table.rows = rows;
        self.load_streams(&mut table);
        Ok(table)
    }

    /// Replace binary cells with the contents of their streams
    fn load_streams(&mut self, table: &mut Table) {
        let binary_columns: Vec<usize> = table
            .definition
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.col_type == ColumnType::Binary)
            .map(|(i, _)| i)
            .collect();
        if binary_columns.is_empty() {
            return;
        }

        let key_columns: Vec<usize> = table
            .definition
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.primary_key)
            .map(|(i, _)| i)
            .collect();

        for row in &mut table.rows {
            let key: Vec<String> = key_columns
                .iter()
                .map(|&i| row.values[i].display())
                .collect();
            let stream_name = format!("{}.{}", table.definition.name, key.join("."));

            for &column in &binary_columns {
                if row.values[column].is_null() {
                    continue;
                }
                row.values[column] = match self.read_stream(&stream_name) {
                    Ok(data) => CellValue::Binary(data),
                    Err(e) => {
                        log::warn!("Failed to read stream {}: {}", stream_name, e);
                        CellValue::Binary(Vec::new())
                    }
                };
            }
        }
    }

    fn read_stream(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut reader = self.package.read_stream(name)?;
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Summary information as a `PropertyId`/`Value` table
    pub fn summary_table(&self) -> Table {
        let info = self.package.summary_info();
        let mut table = Table::new(summary_definition());
        let mut add = |id: i32, value: Option<String>| {
            if let Some(value) = value {
                table.add_row(vec![CellValue::Integer(id), CellValue::String(value)]);
            }
        };

        add(1, Some(info.codepage().id().to_string()));
        add(2, info.title().map(str::to_string));
        add(3, info.subject().map(str::to_string));
        add(4, info.author().map(str::to_string));
        add(6, info.comments().map(str::to_string));

        let languages: Vec<String> = info
            .languages()
            .iter()
            .map(|l| l.code().to_string())
            .collect();
        let template = match info.arch() {
            Some(arch) => format!("{};{}", arch, languages.join(",")),
            None => format!(";{}", languages.join(",")),
        };
        add(7, Some(template));
        add(9, info.uuid().map(|u| format!("{{{}}}", u.to_string().to_uppercase())));

        table
    }

    /// Load every table plus the summary information
    pub fn load(&mut self) -> Result<Database> {
        let mut db = Database::new();
        for name in self.table_names() {
            let table = self.get_table(&name)?;
            log::debug!("Loaded table {} ({} rows)", name, table.row_count());
            db.add_table(table);
        }
        db.add_table(self.summary_table());
        Ok(db)
    }
}

fn summary_definition() -> TableDefinition {
    TableDefinition::new(
        SUMMARY_INFORMATION_TABLE,
        vec![
            ColumnDefinition::new("PropertyId", ColumnType::Int16, ColumnCategory::Integer).primary_key(),
            ColumnDefinition::new("Value", ColumnType::String(0), ColumnCategory::Text),
        ],
    )
}

fn column_definition(column: &msi::Column) -> ColumnDefinition {
    let category = column
        .category()
        .map(|c| ColumnCategory::from_name(&c.to_string()))
        .unwrap_or_default();
    let col_type = match column.coltype() {
        _ if category == ColumnCategory::Binary => ColumnType::Binary,
        msi::ColumnType::Int16 => ColumnType::Int16,
        msi::ColumnType::Int32 => ColumnType::Int32,
        msi::ColumnType::Str(width) => ColumnType::String(width),
    };

    let mut definition = ColumnDefinition::new(column.name(), col_type, category);
    definition.nullable = column.is_nullable();
    definition.primary_key = column.is_primary_key();
    definition.localizable = column.is_localizable();
    if let Some((min, max)) = column.value_range() {
        definition = definition.range(min as i64, max as i64);
    }
    if let Some((table, key_column)) = column.foreign_key() {
        definition = definition.references(table, key_column);
    }
    definition
}

fn cell_value(value: &msi::Value, column: &ColumnDefinition) -> CellValue {
    if value.is_null() {
        CellValue::Null
    } else if let Some(s) = value.as_str() {
        CellValue::String(s.to_string())
    } else if let Some(n) = value.as_int() {
        match column.col_type {
            ColumnType::Int32 => CellValue::Long(n as i64),
            _ => CellValue::Integer(n),
        }
    } else {
        CellValue::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = MsiFile::open(dir.path().join("missing.msi"));
        assert!(matches!(result, Err(DecompileError::Io(_))));
    }

    #[test]
    fn test_open_garbage_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.msi");
        std::fs::write(&path, b"not a compound file").unwrap();

        let result = MsiFile::open(&path);
        assert!(matches!(result, Err(DecompileError::OpenError(_))));
    }

    #[test]
    fn test_summary_definition_shape() {
        let definition = summary_definition();
        assert_eq!(definition.primary_keys(), vec!["PropertyId"]);
        assert_eq!(definition.columns.len(), 2);
    }
}
