//! File tables and the tables that hang off files and folders

use super::{copy, set_filename, set_yes, DecodeFn};
use crate::attributes::{unknown_bits, FileAttributes};
use crate::decompiler::context::Context;
use crate::types::Table;
use std::collections::HashMap;

pub(super) fn register(map: &mut HashMap<&'static str, DecodeFn>) {
    map.insert("BindImage", decompile_bind_image_table);
    map.insert("DuplicateFile", decompile_duplicate_file_table);
    map.insert("File", decompile_file_table);
    map.insert("Font", decompile_font_table);
    map.insert("IniFile", decompile_ini_file_table);
    map.insert("MoveFile", decompile_move_file_table);
    map.insert("RemoveFile", decompile_remove_file_table);
    map.insert("RemoveIniFile", decompile_remove_ini_file_table);
    map.insert("ReserveCost", decompile_reserve_cost_table);
    map.insert("SelfReg", decompile_self_reg_table);
    map.insert("Shortcut", decompile_shortcut_table);
}

fn decompile_file_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let file = ctx.doc.create("File");
        copy(ctx, file, &row, "File", "Id");
        set_filename(ctx, file, &row, "FileName", "Name", "ShortName");

        if let Some(bits) = row.int("Attributes") {
            let attributes = FileAttributes::from_bits_truncate(bits as u32);

            if attributes.contains(FileAttributes::READ_ONLY) {
                set_yes(ctx, file, "ReadOnly");
            }
            if attributes.contains(FileAttributes::HIDDEN) {
                set_yes(ctx, file, "Hidden");
            }
            if attributes.contains(FileAttributes::SYSTEM) {
                set_yes(ctx, file, "System");
            }
            if !attributes.contains(FileAttributes::VITAL) {
                ctx.doc.set_attribute(file, "Vital", "no");
            }
            if attributes.contains(FileAttributes::CHECKSUM) {
                set_yes(ctx, file, "Checksum");
            }

            let compression = FileAttributes::NONCOMPRESSED | FileAttributes::COMPRESSED;
            if attributes.contains(compression) {
                ctx.illegal_value(&row, "Attributes", bits);
            } else if attributes.contains(FileAttributes::NONCOMPRESSED) {
                ctx.doc.set_attribute(file, "Compressed", "no");
            } else if attributes.contains(FileAttributes::COMPRESSED) {
                set_yes(ctx, file, "Compressed");
            }

            ctx.unknown_bits(&row, "Attributes", unknown_bits(bits, FileAttributes::all().bits()));
        }

        if let Some(version) = row.str("Version") {
            if version.starts_with(|c: char| c.is_ascii_digit()) {
                ctx.doc.set_attribute(file, "DefaultVersion", version);
            } else {
                ctx.doc.set_attribute(file, "CompanionFile", version);
            }
        }
        copy(ctx, file, &row, "Language", "DefaultLanguage");

        ctx.add_to_component(&row, file);
        ctx.index.insert_row(&row, file);
    }
}

fn decompile_font_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let Some(file) = ctx.require(&row, "File_", "File") else {
            continue;
        };
        match row.str("FontTitle") {
            Some(title) => ctx.doc.set_attribute(file, "FontTitle", title),
            None => set_yes(ctx, file, "TrueType"),
        }
    }
}

fn decompile_self_reg_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let Some(file) = ctx.require(&row, "File_", "File") else {
            continue;
        };
        let cost = row.int("Cost").unwrap_or(0);
        ctx.doc.set_attribute(file, "SelfRegCost", cost.to_string());
    }
}

fn decompile_bind_image_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        if let Some(file) = ctx.require(&row, "File_", "File") {
            copy(ctx, file, &row, "Path", "BindPath");
        }
    }
}

fn install_mode(mode: i64) -> Option<&'static str> {
    match mode {
        1 => Some("install"),
        2 => Some("uninstall"),
        3 => Some("both"),
        _ => None,
    }
}

fn decompile_remove_file_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let element = if row.str("FileName").is_some() {
            let remove = ctx.doc.create("RemoveFile");
            copy(ctx, remove, &row, "FileKey", "Id");
            set_filename(ctx, remove, &row, "FileName", "Name", "ShortName");
            remove
        } else {
            let remove = ctx.doc.create("RemoveFolder");
            copy(ctx, remove, &row, "FileKey", "Id");
            remove
        };

        let mode = row.int("InstallMode").unwrap_or(0);
        match install_mode(mode) {
            Some(on) => ctx.doc.set_attribute(element, "On", on),
            None => ctx.illegal_value(&row, "InstallMode", mode),
        }

        ctx.add_to_component(&row, element);
        ctx.index.insert_row(&row, element);
    }
}

fn decompile_duplicate_file_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let Some(file) = ctx.require(&row, "File_", "File") else {
            continue;
        };
        let copy_file = ctx.doc.create_child(file, "CopyFile");
        copy(ctx, copy_file, &row, "FileKey", "Id");
        set_filename(ctx, copy_file, &row, "DestName", "DestinationName", "DestinationShortName");
        ctx.index.insert_row(&row, copy_file);
    }
}

fn decompile_move_file_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let copy_file = ctx.doc.create("CopyFile");
        copy(ctx, copy_file, &row, "FileKey", "Id");
        copy(ctx, copy_file, &row, "SourceName", "SourceName");
        set_filename(ctx, copy_file, &row, "DestName", "DestinationName", "DestinationShortName");

        match row.int("Options") {
            Some(1) => set_yes(ctx, copy_file, "Delete"),
            Some(0) | None => {}
            Some(other) => ctx.illegal_value(&row, "Options", other),
        }

        ctx.add_to_component(&row, copy_file);
        ctx.index.insert_row(&row, copy_file);
    }
}

fn decompile_ini_file_table(ctx: &mut Context<'_>, table: &Table) {
    decompile_ini_rows(ctx, table, "IniFile", |action| match action {
        0 => Some("addLine"),
        1 => Some("createLine"),
        3 => Some("addTag"),
        _ => None,
    });
}

fn decompile_remove_ini_file_table(ctx: &mut Context<'_>, table: &Table) {
    decompile_ini_rows(ctx, table, "RemoveIniFile", |action| match action {
        2 => Some("removeLine"),
        4 => Some("removeTag"),
        _ => None,
    });
}

fn decompile_ini_rows(
    ctx: &mut Context<'_>,
    table: &Table,
    key_column: &str,
    action_name: fn(i64) -> Option<&'static str>,
) {
    for row in table.views() {
        let ini = ctx.doc.create("IniFile");
        copy(ctx, ini, &row, key_column, "Id");

        let action = row.int("Action").unwrap_or(-1);
        match action_name(action) {
            Some(name) => ctx.doc.set_attribute(ini, "Action", name),
            None => ctx.illegal_value(&row, "Action", action),
        }

        copy(ctx, ini, &row, "DirProperty", "Directory");
        copy(ctx, ini, &row, "Key", "Key");
        set_filename(ctx, ini, &row, "FileName", "Name", "ShortName");
        copy(ctx, ini, &row, "Section", "Section");
        copy(ctx, ini, &row, "Value", "Value");

        ctx.add_to_component(&row, ini);
        ctx.index.insert_row(&row, ini);
    }
}

fn show_command(show: i64) -> Option<&'static str> {
    match show {
        1 => Some("normal"),
        3 => Some("maximized"),
        7 => Some("minimized"),
        _ => None,
    }
}

fn decompile_shortcut_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let shortcut = ctx.doc.create("Shortcut");
        copy(ctx, shortcut, &row, "Shortcut", "Id");
        copy(ctx, shortcut, &row, "Directory_", "Directory");
        set_filename(ctx, shortcut, &row, "Name", "Name", "ShortName");

        match row.str("Target") {
            Some(target) if target.starts_with('[') => {
                ctx.doc.set_attribute(shortcut, "Target", target)
            }
            // a feature name: the shortcut is advertised
            Some(_) => set_yes(ctx, shortcut, "Advertise"),
            None => {}
        }

        copy(ctx, shortcut, &row, "Arguments", "Arguments");
        copy(ctx, shortcut, &row, "Description", "Description");
        copy(ctx, shortcut, &row, "Hotkey", "Hotkey");
        copy(ctx, shortcut, &row, "Icon_", "Icon");
        copy(ctx, shortcut, &row, "IconIndex", "IconIndex");

        if let Some(show) = row.int("ShowCmd") {
            match show_command(show) {
                Some(name) => ctx.doc.set_attribute(shortcut, "Show", name),
                None => ctx.illegal_value(&row, "ShowCmd", show),
            }
        }

        copy(ctx, shortcut, &row, "WkDir", "WorkingDirectory");
        copy(ctx, shortcut, &row, "DisplayResourceDLL", "DisplayResourceDll");
        copy(ctx, shortcut, &row, "DisplayResourceId", "DisplayResourceId");
        copy(ctx, shortcut, &row, "DescriptionResourceDLL", "DescriptionResourceDll");
        copy(ctx, shortcut, &row, "DescriptionResourceId", "DescriptionResourceId");

        ctx.add_to_component(&row, shortcut);
        ctx.index.insert_row(&row, shortcut);
    }
}

fn decompile_reserve_cost_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let reserve = ctx.doc.create("ReserveCost");
        copy(ctx, reserve, &row, "ReserveKey", "Id");
        copy(ctx, reserve, &row, "ReserveFolder", "Directory");
        copy(ctx, reserve, &row, "ReserveLocal", "RunLocal");
        copy(ctx, reserve, &row, "ReserveSource", "RunFromSource");
        ctx.add_to_component(&row, reserve);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecompileOptions;
    use crate::messages::MessageCode;
    use crate::schema::standard_definition;
    use crate::types::{CellValue, Database};

    fn file_table(attributes: Option<i32>, version: Option<&str>) -> Table {
        let mut table = Table::new(standard_definition("File").unwrap());
        table.add_row(vec![
            "readme".into(),
            "Docs".into(),
            "README~1.TXT|readme.txt".into(),
            100.into(),
            version.into(),
            CellValue::Null,
            attributes.into(),
            1.into(),
        ]);
        table
    }

    fn decode_file(table: &Table) -> (Vec<(String, String)>, Vec<MessageCode>) {
        let db = Database::new();
        let options = DecompileOptions::default();
        let mut ctx = Context::new(&db, &options);
        let component = ctx.add_to_package("Component");
        ctx.index.insert("Component", "Docs", component);

        decompile_file_table(&mut ctx, table);

        let file = ctx.index.get("File", "readme").unwrap();
        assert_eq!(ctx.doc.parent(file), Some(component));
        let codes = ctx.messages.entries().iter().map(|m| m.code).collect();
        (ctx.doc.attributes(file).to_vec(), codes)
    }

    fn has(attrs: &[(String, String)], name: &str, value: &str) -> bool {
        attrs.iter().any(|(k, v)| k == name && v == value)
    }

    #[test]
    fn test_file_names_and_version() {
        let (attrs, codes) = decode_file(&file_table(None, Some("1.2.3.4")));
        assert!(has(&attrs, "Name", "readme.txt"));
        assert!(has(&attrs, "ShortName", "README~1.TXT"));
        assert!(has(&attrs, "DefaultVersion", "1.2.3.4"));
        assert!(!attrs.iter().any(|(k, _)| k == "Vital"));
        assert!(codes.is_empty());

        let (attrs, _) = decode_file(&file_table(None, Some("main_exe")));
        assert!(has(&attrs, "CompanionFile", "main_exe"));
    }

    #[test]
    fn test_file_attribute_bits() {
        let (attrs, codes) = decode_file(&file_table(Some(0x0001 | 0x0004 | 0x2000), None));
        assert!(has(&attrs, "ReadOnly", "yes"));
        assert!(has(&attrs, "System", "yes"));
        assert!(has(&attrs, "Vital", "no"));
        assert!(has(&attrs, "Compressed", "no"));
        assert!(codes.is_empty());

        let (attrs, codes) = decode_file(&file_table(Some(0x0200 | 0x1000), None));
        assert_eq!(attrs.len(), 3);
        assert!(codes.is_empty());
    }

    #[test]
    fn test_file_conflicting_compression() {
        let (attrs, codes) = decode_file(&file_table(Some(0x0200 | 0x2000 | 0x4000), None));
        assert!(!attrs.iter().any(|(k, _)| k == "Compressed"));
        assert_eq!(codes, vec![MessageCode::IllegalColumnValue]);

        let (_, codes) = decode_file(&file_table(Some(0x0200 | 0x8000), None));
        assert_eq!(codes, vec![MessageCode::UnknownAttributeBits]);
    }

    #[test]
    fn test_remove_file_or_folder() {
        let mut table = Table::new(standard_definition("RemoveFile").unwrap());
        table.add_row(vec![
            "rmLogs".into(), "Docs".into(), "*.log".into(), "LogDir".into(), 2.into(),
        ]);
        table.add_row(vec![
            "rmDir".into(), "Docs".into(), CellValue::Null, "LogDir".into(), 3.into(),
        ]);

        let db = Database::new();
        let options = DecompileOptions::default();
        let mut ctx = Context::new(&db, &options);
        let component = ctx.add_to_package("Component");
        ctx.index.insert("Component", "Docs", component);
        decompile_remove_file_table(&mut ctx, &table);

        let file = ctx.index.get("RemoveFile", "rmLogs").unwrap();
        let folder = ctx.index.get("RemoveFile", "rmDir").unwrap();
        assert_eq!(ctx.doc.name(file), "RemoveFile");
        assert_eq!(ctx.doc.attribute(file, "On"), Some("uninstall"));
        assert_eq!(ctx.doc.name(folder), "RemoveFolder");
        assert_eq!(ctx.doc.attribute(folder, "On"), Some("both"));
    }

    #[test]
    fn test_shortcut_target_and_show() {
        let mut table = Table::new(standard_definition("Shortcut").unwrap());
        let mut values: Vec<CellValue> = vec![
            "sc".into(), "ProgramMenuFolder".into(), "App".into(), "Docs".into(),
            "[#app.exe]".into(),
        ];
        values.extend([CellValue::Null, CellValue::Null, CellValue::Null, CellValue::Null, CellValue::Null]);
        values.push(7.into());
        values.extend([CellValue::Null, CellValue::Null, CellValue::Null, CellValue::Null, CellValue::Null]);
        table.add_row(values);

        let db = Database::new();
        let options = DecompileOptions::default();
        let mut ctx = Context::new(&db, &options);
        let component = ctx.add_to_package("Component");
        ctx.index.insert("Component", "Docs", component);
        decompile_shortcut_table(&mut ctx, &table);

        let shortcut = ctx.index.get("Shortcut", "sc").unwrap();
        assert_eq!(ctx.doc.attribute(shortcut, "Target"), Some("[#app.exe]"));
        assert_eq!(ctx.doc.attribute(shortcut, "Show"), Some("minimized"));
        assert_eq!(ctx.doc.attribute(shortcut, "Advertise"), None);
    }
}
