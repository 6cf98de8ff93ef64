use crate::attributes::ComponentAttributes;
use crate::decompiler::context::Context;
use crate::messages::MessageCode;

/// Mark the key path of every component.
///
/// The KeyPath column names a File, a Registry row or an ODBCDataSource
/// depending on the component attributes; a null KeyPath makes the
/// component its own key path.
pub(super) fn finalize_component_table(ctx: &mut Context<'_>) {
    let db = ctx.db;

    for row in db.rows("Component") {
        let Some(component) = ctx.index.get_row(&row) else {
            continue;
        };

        let Some(key_path) = row.str("KeyPath") else {
            ctx.doc.set_attribute(component, "KeyPath", "yes");
            continue;
        };

        let attributes = ComponentAttributes::from_bits_truncate(row.int("Attributes").unwrap_or(0) as u32);
        let target_table = if attributes.contains(ComponentAttributes::REGISTRY_KEY_PATH) {
            "Registry"
        } else if attributes.contains(ComponentAttributes::ODBC_DATA_SOURCE) {
            "ODBCDataSource"
        } else {
            "File"
        };

        let Some(target) = ctx.index.get(target_table, key_path) else {
            ctx.expected_foreign_row(&row, "KeyPath", key_path, target_table);
            continue;
        };

        if target_table == "Registry" && ctx.doc.name(target) != "RegistryValue" {
            ctx.warn(
                MessageCode::IllegalRegistryKeyPath,
                &row,
                format!(
                    "component '{}' uses registry key '{}' as its key path; only registry values can be key paths",
                    row.primary_key(),
                    key_path
                ),
            );
            continue;
        }

        ctx.doc.set_attribute(target, "KeyPath", "yes");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecompileOptions;
    use crate::schema::standard_definition;
    use crate::types::{CellValue, Database, Table};

    fn database(rows: Vec<(&str, i32, Option<&str>)>) -> Database {
        let mut table = Table::new(standard_definition("Component").unwrap());
        for (id, attributes, key_path) in rows {
            table.add_row(vec![
                id.into(), CellValue::Null, "INSTALLDIR".into(), attributes.into(),
                CellValue::Null, key_path.into(),
            ]);
        }
        let mut db = Database::new();
        db.add_table(table);
        db
    }

    #[test]
    fn test_key_path_targets() {
        let db = database(vec![
            ("Own", 0, None),
            ("ByFile", 0, Some("app.exe")),
            ("ByValue", 0x4, Some("regValue")),
        ]);
        let options = DecompileOptions::default();
        let mut ctx = Context::new(&db, &options);
        let own = ctx.doc.create("Component");
        let by_file = ctx.doc.create("Component");
        let by_value = ctx.doc.create("Component");
        let file = ctx.doc.create("File");
        let value = ctx.doc.create("RegistryValue");
        ctx.index.insert("Component", "Own", own);
        ctx.index.insert("Component", "ByFile", by_file);
        ctx.index.insert("Component", "ByValue", by_value);
        ctx.index.insert("File", "app.exe", file);
        ctx.index.insert("Registry", "regValue", value);

        finalize_component_table(&mut ctx);

        assert_eq!(ctx.doc.attribute(own, "KeyPath"), Some("yes"));
        assert_eq!(ctx.doc.attribute(by_file, "KeyPath"), None);
        assert_eq!(ctx.doc.attribute(file, "KeyPath"), Some("yes"));
        assert_eq!(ctx.doc.attribute(value, "KeyPath"), Some("yes"));
        assert!(ctx.messages.is_empty());
    }

    #[test]
    fn test_registry_key_cannot_be_key_path() {
        let db = database(vec![("ByKey", 0x4, Some("regKey")), ("Lost", 0, Some("missing"))]);
        let options = DecompileOptions::default();
        let mut ctx = Context::new(&db, &options);
        let by_key = ctx.doc.create("Component");
        let lost = ctx.doc.create("Component");
        let key = ctx.doc.create("RegistryKey");
        ctx.index.insert("Component", "ByKey", by_key);
        ctx.index.insert("Component", "Lost", lost);
        ctx.index.insert("Registry", "regKey", key);

        finalize_component_table(&mut ctx);

        let codes: Vec<_> = ctx.messages.entries().iter().map(|m| m.code).collect();
        assert_eq!(codes, vec![MessageCode::IllegalRegistryKeyPath, MessageCode::ExpectedForeignRow]);
        assert_eq!(ctx.doc.attribute(key, "KeyPath"), None);
    }
}
