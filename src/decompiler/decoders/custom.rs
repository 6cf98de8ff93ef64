//! Generic dump of tables with no dedicated decoder

use crate::decompiler::context::Context;
use crate::document::ElementId;
use crate::types::{CellValue, ColumnCategory, ColumnDefinition, ColumnType, Table};

/// Emit `CustomTable` with one `Column` per definition column and one `Row`
/// per row. Null fields produce no `Data` child, so an empty table yields
/// the column-only form.
pub fn decompile_custom_table(ctx: &mut Context<'_>, table: &Table) {
    log::debug!("dumping custom table {} ({} rows)", table.name(), table.row_count());

    let custom = ctx.add_to_package("CustomTable");
    ctx.doc.set_attribute(custom, "Id", table.name());

    for column in &table.definition.columns {
        add_column(ctx, custom, column);
    }

    for row in table.views() {
        let element = ctx.doc.create_child(custom, "Row");
        for (column, value) in table.definition.columns.iter().zip(&row.row.values) {
            let text = match value {
                CellValue::Null => continue,
                CellValue::Binary(_) => {
                    let id = format!("{}.{}", row.primary_key().replace('/', "."), column.name);
                    ctx.export_path(table.name(), &id)
                }
                other => other.display(),
            };
            let data = ctx.doc.create_child(element, "Data");
            ctx.doc.set_attribute(data, "Column", column.name.as_str());
            ctx.doc.set_text(data, text);
        }
    }

    ctx.index.insert("CustomTable", table.name(), custom);
}

fn add_column(ctx: &mut Context<'_>, custom: ElementId, column: &ColumnDefinition) {
    let element = ctx.doc.create_child(custom, "Column");
    ctx.doc.set_attribute(element, "Id", column.name.as_str());

    let (kind, width) = match column.col_type {
        ColumnType::String(width) => ("string", Some(width)),
        ColumnType::Int16 => ("int", Some(2)),
        ColumnType::Int32 => ("int", Some(4)),
        ColumnType::Binary => ("binary", None),
    };
    ctx.doc.set_attribute(element, "Type", kind);
    if let Some(width) = width {
        ctx.doc.set_attribute(element, "Width", width.to_string());
    }

    if column.primary_key {
        ctx.doc.set_attribute(element, "PrimaryKey", "yes");
    }
    if column.nullable {
        ctx.doc.set_attribute(element, "Nullable", "yes");
    }
    if column.localizable {
        ctx.doc.set_attribute(element, "Localizable", "yes");
    }
    ctx.doc.set_optional(element, "KeyTable", column.key_table.as_deref());
    ctx.doc
        .set_optional(element, "KeyColumn", column.key_column.map(|c| c.to_string()));
    if column.category != ColumnCategory::Unknown {
        ctx.doc
            .set_attribute(element, "Category", column.category.display_name());
    }
    ctx.doc
        .set_optional(element, "MinValue", column.min_value.map(|v| v.to_string()));
    ctx.doc
        .set_optional(element, "MaxValue", column.max_value.map(|v| v.to_string()));
}

/// `EnsureTable` for an empty standard table kept in the output
pub fn ensure_table(ctx: &mut Context<'_>, name: &str) {
    let ensure = ctx.add_to_package("EnsureTable");
    ctx.doc.set_attribute(ensure, "Id", name);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecompileOptions;
    use crate::types::{Database, TableDefinition};

    fn custom_definition() -> TableDefinition {
        TableDefinition::new(
            "MyTable",
            vec![
                ColumnDefinition::new("Key", ColumnType::String(72), ColumnCategory::Identifier)
                    .primary_key(),
                ColumnDefinition::new("Count", ColumnType::Int16, ColumnCategory::Integer)
                    .nullable()
                    .range(0, 100),
                ColumnDefinition::new("Note", ColumnType::String(0), ColumnCategory::Unknown)
                    .nullable(),
            ],
        )
    }

    // ===== Custom tables =====

    #[test]
    fn test_rows_skip_null_fields() {
        let mut table = Table::new(custom_definition());
        table.add_row(vec!["a".into(), 1.into(), "first".into()]);
        table.add_row(vec!["b".into(), CellValue::Null, "second".into()]);

        let db = Database::new();
        let options = DecompileOptions::default();
        let mut ctx = Context::new(&db, &options);
        decompile_custom_table(&mut ctx, &table);

        let custom = ctx.index.get("CustomTable", "MyTable").unwrap();
        let children = ctx.doc.children(custom).to_vec();
        let columns: Vec<_> = children.iter().filter(|&&c| ctx.doc.name(c) == "Column").collect();
        let rows: Vec<_> = children.iter().filter(|&&c| ctx.doc.name(c) == "Row").collect();
        assert_eq!(columns.len(), 3);
        assert_eq!(rows.len(), 2);
        assert_eq!(ctx.doc.children(*rows[0]).len(), 3);
        assert_eq!(ctx.doc.children(*rows[1]).len(), 2);

        let count = *columns[1];
        assert_eq!(ctx.doc.attribute(count, "Type"), Some("int"));
        assert_eq!(ctx.doc.attribute(count, "Width"), Some("2"));
        assert_eq!(ctx.doc.attribute(count, "MaxValue"), Some("100"));
        assert_eq!(ctx.doc.attribute(*columns[2], "Category"), None);
    }

    #[test]
    fn test_empty_table_has_columns_only() {
        let table = Table::new(custom_definition());

        let db = Database::new();
        let options = DecompileOptions::default();
        let mut ctx = Context::new(&db, &options);
        decompile_custom_table(&mut ctx, &table);

        let custom = ctx.index.get("CustomTable", "MyTable").unwrap();
        assert!(ctx
            .doc
            .children(custom)
            .iter()
            .all(|&c| ctx.doc.name(c) == "Column"));
    }

    #[test]
    fn test_ensure_table() {
        let db = Database::new();
        let options = DecompileOptions::default();
        let mut ctx = Context::new(&db, &options);
        ensure_table(&mut ctx, "Shortcut");

        let ensure = ctx.doc.children(ctx.package())[0];
        assert_eq!(ctx.doc.name(ensure), "EnsureTable");
        assert_eq!(ctx.doc.attribute(ensure, "Id"), Some("Shortcut"));
    }
}
