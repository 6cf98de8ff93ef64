//! Locator and Signature tables
//!
//! Search elements are created detached; the search finalizer arranges them
//! under the properties that use them once AppSearch and CCPSearch are known.

use super::{copy, registry_root, set_filename, DecodeFn};
use crate::decompiler::context::Context;
use crate::document::ElementId;
use crate::names::decode_integer_date;
use crate::types::{RowView, Table};
use std::collections::HashMap;

pub(super) fn register(map: &mut HashMap<&'static str, DecodeFn>) {
    map.insert("CompLocator", decompile_comp_locator_table);
    map.insert("DrLocator", decompile_dr_locator_table);
    map.insert("IniLocator", decompile_ini_locator_table);
    map.insert("RegLocator", decompile_reg_locator_table);
    map.insert("Signature", decompile_signature_table);
}

const REG_LOCATOR_TYPE_MASK: i64 = 0x0F;
const REG_LOCATOR_64BIT: i64 = 0x10;

fn locator_type(value: i64) -> Option<&'static str> {
    match value {
        0 => Some("directory"),
        1 => Some("file"),
        2 => Some("raw"),
        _ => None,
    }
}

fn decompile_comp_locator_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let search = ctx.doc.create("ComponentSearch");
        copy(ctx, search, &row, "Signature_", "Id");
        copy(ctx, search, &row, "ComponentId", "Guid");
        match row.int("Type") {
            Some(0) => ctx.doc.set_attribute(search, "Type", "directory"),
            Some(1) | None => {}
            Some(other) => ctx.illegal_value(&row, "Type", other),
        }
        ctx.index.insert_row(&row, search);
    }
}

fn decompile_reg_locator_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let search = ctx.doc.create("RegistrySearch");
        copy(ctx, search, &row, "Signature_", "Id");

        let root = row.int("Root").unwrap_or(-1);
        match registry_root(root).filter(|_| root >= 0) {
            Some(name) => ctx.doc.set_attribute(search, "Root", name),
            None => ctx.illegal_value(&row, "Root", root),
        }
        copy(ctx, search, &row, "Key", "Key");
        copy(ctx, search, &row, "Name", "Name");

        if let Some(kind) = row.int("Type") {
            set_locator_type(ctx, search, &row, kind & REG_LOCATOR_TYPE_MASK);
            if kind & REG_LOCATOR_64BIT != 0 {
                ctx.doc.set_attribute(search, "Bitness", "always64");
            }
            ctx.unknown_bits(&row, "Type", kind & !(REG_LOCATOR_TYPE_MASK | REG_LOCATOR_64BIT));
        }

        ctx.index.insert_row(&row, search);
    }
}

fn set_locator_type(ctx: &mut Context<'_>, search: ElementId, row: &RowView<'_>, kind: i64) {
    match locator_type(kind) {
        Some(name) => ctx.doc.set_attribute(search, "Type", name),
        None => ctx.illegal_value(row, "Type", kind),
    }
}

fn decompile_ini_locator_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let search = ctx.doc.create("IniFileSearch");
        copy(ctx, search, &row, "Signature_", "Id");
        set_filename(ctx, search, &row, "FileName", "Name", "ShortName");
        copy(ctx, search, &row, "Section", "Section");
        copy(ctx, search, &row, "Key", "Key");
        copy(ctx, search, &row, "Field", "Field");
        if let Some(kind) = row.int("Type") {
            set_locator_type(ctx, search, &row, kind);
        }
        ctx.index.insert_row(&row, search);
    }
}

fn decompile_dr_locator_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let search = ctx.doc.create("DirectorySearch");
        copy(ctx, search, &row, "Signature_", "Id");
        copy(ctx, search, &row, "Path", "Path");
        copy(ctx, search, &row, "Depth", "Depth");
        ctx.index.insert_row(&row, search);
    }
}

fn decompile_signature_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let search = ctx.doc.create("FileSearch");
        copy(ctx, search, &row, "Signature", "Id");
        set_filename(ctx, search, &row, "FileName", "Name", "ShortName");
        copy(ctx, search, &row, "MinVersion", "MinVersion");
        copy(ctx, search, &row, "MaxVersion", "MaxVersion");
        copy(ctx, search, &row, "MinSize", "MinSize");
        copy(ctx, search, &row, "MaxSize", "MaxSize");
        for (column, attribute) in [("MinDate", "MinDate"), ("MaxDate", "MaxDate")] {
            if let Some(date) = row.int(column) {
                ctx.doc
                    .set_attribute(search, attribute, decode_integer_date(date).to_string());
            }
        }
        copy(ctx, search, &row, "Languages", "Languages");
        ctx.index.insert_row(&row, search);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecompileOptions;
    use crate::schema::standard_definition;
    use crate::types::{CellValue, Database};

    #[test]
    fn test_reg_locator_type_bits() {
        let mut table = Table::new(standard_definition("RegLocator").unwrap());
        table.add_row(vec![
            "RegSig".into(), 2.into(), "Software\\Demo".into(), "InstallDir".into(), (0x10 | 2).into(),
        ]);
        table.add_row(vec![
            "BadSig".into(), 2.into(), "Software\\Demo".into(), CellValue::Null, 5.into(),
        ]);

        let db = Database::new();
        let options = DecompileOptions::default();
        let mut ctx = Context::new(&db, &options);
        decompile_reg_locator_table(&mut ctx, &table);

        let search = ctx.index.get("RegLocator", "RegSig").unwrap();
        assert_eq!(ctx.doc.attribute(search, "Root"), Some("HKLM"));
        assert_eq!(ctx.doc.attribute(search, "Type"), Some("raw"));
        assert_eq!(ctx.doc.attribute(search, "Bitness"), Some("always64"));
        assert!(!ctx.doc.is_placed(search));
        assert_eq!(ctx.messages.len(), 1);
    }

    #[test]
    fn test_signature_dates() {
        let mut table = Table::new(standard_definition("Signature").unwrap());
        table.add_row(vec![
            "FileSig".into(),
            "APP~1.EXE|app.exe".into(),
            "1.0".into(),
            CellValue::Null,
            CellValue::Null,
            CellValue::Null,
            CellValue::Integer((21 << 25) | (1 << 21) | (1 << 16)),
            CellValue::Null,
            CellValue::Null,
        ]);

        let db = Database::new();
        let options = DecompileOptions::default();
        let mut ctx = Context::new(&db, &options);
        decompile_signature_table(&mut ctx, &table);

        let search = ctx.index.get("Signature", "FileSig").unwrap();
        assert_eq!(ctx.doc.attribute(search, "Name"), Some("app.exe"));
        assert_eq!(ctx.doc.attribute(search, "MinVersion"), Some("1.0"));
        assert_eq!(ctx.doc.attribute(search, "MinDate"), Some("2001-01-01T00:00:00"));
    }
}
