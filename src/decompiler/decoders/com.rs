//! COM and shell registration tables

use super::{copy, set_yes, DecodeFn};
use crate::decompiler::context::Context;
use crate::document::ElementId;
use crate::types::{RowView, Table};
use std::collections::HashMap;

pub(super) fn register(map: &mut HashMap<&'static str, DecodeFn>) {
    map.insert("AppId", decompile_app_id_table);
    map.insert("Class", decompile_class_table);
    map.insert("Extension", decompile_extension_table);
    map.insert("MIME", decompile_mime_table);
    map.insert("ProgId", decompile_prog_id_table);
    map.insert("TypeLib", decompile_type_lib_table);
    map.insert("Verb", decompile_verb_table);
}

const CLASS_RELATIVE_PATH: i64 = 0x1;

fn decompile_app_id_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let app_id = ctx.add_to_package("AppId");
        copy(ctx, app_id, &row, "AppId", "Id");
        set_yes(ctx, app_id, "Advertise");
        copy(ctx, app_id, &row, "RemoteServerName", "RemoteServerName");
        copy(ctx, app_id, &row, "LocalService", "LocalService");
        copy(ctx, app_id, &row, "ServiceParameters", "ServiceParameters");
        copy(ctx, app_id, &row, "DllSurrogate", "DllSurrogate");
        set_boolean(ctx, app_id, &row, "ActivateAtStorage");
        set_boolean(ctx, app_id, &row, "RunAsInteractiveUser");
        ctx.index.insert_row(&row, app_id);
    }
}

/// 0/1 column to a yes attribute of the same name
fn set_boolean(ctx: &mut Context<'_>, element: ElementId, row: &RowView<'_>, column: &str) {
    match row.int(column) {
        Some(1) => set_yes(ctx, element, column),
        Some(0) | None => {}
        Some(other) => ctx.illegal_value(row, column, other),
    }
}

fn decompile_class_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let class = ctx.doc.create("Class");
        copy(ctx, class, &row, "CLSID", "Id");
        copy(ctx, class, &row, "Context", "Context");
        copy(ctx, class, &row, "Description", "Description");
        copy(ctx, class, &row, "AppId_", "AppId");
        copy(ctx, class, &row, "Icon_", "Icon");
        copy(ctx, class, &row, "IconIndex", "IconIndex");
        copy(ctx, class, &row, "DefInprocHandler", "Handler");
        copy(ctx, class, &row, "Argument", "Argument");

        let bits = row.int("Attributes").unwrap_or(0);
        if bits & CLASS_RELATIVE_PATH != 0 {
            set_yes(ctx, class, "RelativePath");
        }
        ctx.unknown_bits(&row, "Attributes", bits & !CLASS_RELATIVE_PATH);
        set_yes(ctx, class, "Advertise");

        if let Some(masks) = row.str("FileTypeMask") {
            for mask in masks.split(';').filter(|m| !m.is_empty()) {
                let parts: Vec<&str> = mask.split(',').map(str::trim).collect();
                match parts.as_slice() {
                    [offset, _length, mask, value] => {
                        let element = ctx.doc.create_child(class, "FileTypeMask");
                        ctx.doc.set_attribute(element, "Offset", *offset);
                        ctx.doc.set_attribute(element, "Mask", *mask);
                        ctx.doc.set_attribute(element, "Value", *value);
                    }
                    _ => ctx.illegal_value(&row, "FileTypeMask", mask),
                }
            }
        }

        ctx.add_to_component(&row, class);
        ctx.index.insert_row(&row, class);
    }
}

fn decompile_prog_id_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let prog_id = ctx.doc.create("ProgId");
        copy(ctx, prog_id, &row, "ProgId", "Id");
        copy(ctx, prog_id, &row, "Description", "Description");
        copy(ctx, prog_id, &row, "Icon_", "Icon");
        copy(ctx, prog_id, &row, "IconIndex", "IconIndex");
        set_yes(ctx, prog_id, "Advertise");
        ctx.index.insert_row(&row, prog_id);
    }

    // version-independent ProgIds nest under their parent; class
    // ownership is settled once every table is decoded
    for row in table.views() {
        if row.str("ProgId_Parent").is_none() {
            continue;
        }
        let Some(prog_id) = ctx.index.get_row(&row) else {
            continue;
        };
        if let Some(parent) = ctx.require(&row, "ProgId_Parent", "ProgId") {
            ctx.doc.add_child(parent, prog_id);
        }
    }
}

fn decompile_extension_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let extension = ctx.doc.create("Extension");
        copy(ctx, extension, &row, "Extension", "Id");
        copy(ctx, extension, &row, "MIME_", "ContentType");
        set_yes(ctx, extension, "Advertise");

        if row.str("ProgId_").is_some() {
            if let Some(prog_id) = ctx.require(&row, "ProgId_", "ProgId") {
                ctx.doc.add_child(prog_id, extension);
            }
        } else {
            ctx.add_to_component(&row, extension);
        }

        ctx.index.insert_row(&row, extension);
        if let Some(id) = row.str("Extension") {
            if !ctx.index.contains("Extension", id) {
                ctx.index.insert("Extension", id, extension);
            }
        }
    }
}

fn decompile_verb_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let Some(extension) = ctx.require(&row, "Extension_", "Extension") else {
            continue;
        };
        let verb = ctx.doc.create_child(extension, "Verb");
        copy(ctx, verb, &row, "Verb", "Id");
        copy(ctx, verb, &row, "Sequence", "Sequence");
        copy(ctx, verb, &row, "Command", "Command");
        copy(ctx, verb, &row, "Argument", "Argument");
        ctx.index.insert_row(&row, verb);
    }
}

fn decompile_mime_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let Some(extension) = ctx.require(&row, "Extension_", "Extension") else {
            continue;
        };
        let mime = ctx.doc.create_child(extension, "MIME");
        copy(ctx, mime, &row, "ContentType", "ContentType");
        copy(ctx, mime, &row, "CLSID", "Class");
        set_yes(ctx, mime, "Advertise");
        ctx.index.insert_row(&row, mime);
    }
}

fn decompile_type_lib_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let type_lib = ctx.doc.create("TypeLib");
        copy(ctx, type_lib, &row, "LibID", "Id");
        copy(ctx, type_lib, &row, "Language", "Language");

        if let Some(version) = row.int("Version") {
            ctx.doc.set_attribute(type_lib, "MajorVersion", (version >> 8).to_string());
            ctx.doc.set_attribute(type_lib, "MinorVersion", (version & 0xFF).to_string());
        }

        copy(ctx, type_lib, &row, "Description", "Description");
        copy(ctx, type_lib, &row, "Directory_", "HelpDirectory");
        copy(ctx, type_lib, &row, "Cost", "Cost");
        set_yes(ctx, type_lib, "Advertise");

        ctx.add_to_component(&row, type_lib);
        ctx.index.insert_row(&row, type_lib);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::standard_definition;
    use crate::config::DecompileOptions;
    use crate::types::{CellValue, Database};

    fn context<'a>(db: &'a Database, options: &'a DecompileOptions) -> Context<'a> {
        let mut ctx = Context::new(db, options);
        let component = ctx.add_to_package("Component");
        ctx.index.insert("Component", "Com", component);
        ctx
    }

    #[test]
    fn test_class_file_type_masks() {
        let mut table = Table::new(standard_definition("Class").unwrap());
        table.add_row(vec![
            "{00000000-0000-0000-0000-000000000001}".into(),
            "LocalServer32".into(),
            "Com".into(),
            CellValue::Null,
            "Demo".into(),
            CellValue::Null,
            "0,2,FFFF,4D5A;8,1,FF,00".into(),
            CellValue::Null,
            CellValue::Null,
            CellValue::Null,
            CellValue::Null,
            "Main".into(),
            1.into(),
        ]);

        let db = Database::new();
        let options = DecompileOptions::default();
        let mut ctx = context(&db, &options);
        decompile_class_table(&mut ctx, &table);

        let class = ctx
            .index
            .get_parts("Class", &["{00000000-0000-0000-0000-000000000001}", "LocalServer32", "Com"])
            .unwrap();
        assert_eq!(ctx.doc.attribute(class, "RelativePath"), Some("yes"));
        let masks = ctx.doc.children(class).to_vec();
        assert_eq!(masks.len(), 2);
        assert_eq!(ctx.doc.attribute(masks[0], "Mask"), Some("FFFF"));
        assert_eq!(ctx.doc.attribute(masks[1], "Offset"), Some("8"));
        assert!(ctx.messages.is_empty());
    }

    #[test]
    fn test_extension_verbs_nest() {
        let mut prog_ids = Table::new(standard_definition("ProgId").unwrap());
        prog_ids.add_row(vec![
            "Demo.Doc".into(), CellValue::Null, CellValue::Null, CellValue::Null, CellValue::Null, CellValue::Null,
        ]);
        let mut extensions = Table::new(standard_definition("Extension").unwrap());
        extensions.add_row(vec![
            "demo".into(), "Com".into(), "Demo.Doc".into(), "application/demo".into(), "Main".into(),
        ]);
        let mut verbs = Table::new(standard_definition("Verb").unwrap());
        verbs.add_row(vec![
            "demo".into(), "open".into(), 1.into(), "&Open".into(), "\"%1\"".into(),
        ]);

        let db = Database::new();
        let options = DecompileOptions::default();
        let mut ctx = context(&db, &options);
        decompile_prog_id_table(&mut ctx, &prog_ids);
        decompile_extension_table(&mut ctx, &extensions);
        decompile_verb_table(&mut ctx, &verbs);

        let prog_id = ctx.index.get("ProgId", "Demo.Doc").unwrap();
        let extension = ctx.index.get("Extension", "demo").unwrap();
        assert_eq!(ctx.doc.parent(extension), Some(prog_id));
        assert_eq!(ctx.doc.attribute(extension, "ContentType"), Some("application/demo"));

        let verb = ctx.index.get("Verb", "demo/open").unwrap();
        assert_eq!(ctx.doc.parent(verb), Some(extension));
        assert_eq!(ctx.doc.attribute(verb, "Command"), Some("&Open"));
    }

    #[test]
    fn test_type_lib_version() {
        let mut table = Table::new(standard_definition("TypeLib").unwrap());
        table.add_row(vec![
            "{00000000-0000-0000-0000-000000000002}".into(),
            1033.into(),
            "Com".into(),
            0x0203.into(),
            CellValue::Null,
            CellValue::Null,
            "Main".into(),
            CellValue::Null,
        ]);

        let db = Database::new();
        let options = DecompileOptions::default();
        let mut ctx = context(&db, &options);
        decompile_type_lib_table(&mut ctx, &table);

        let type_lib = ctx
            .index
            .get_parts("TypeLib", &["{00000000-0000-0000-0000-000000000002}", "1033", "Com"])
            .unwrap();
        assert_eq!(ctx.doc.attribute(type_lib, "MajorVersion"), Some("2"));
        assert_eq!(ctx.doc.attribute(type_lib, "MinorVersion"), Some("3"));
    }
}
