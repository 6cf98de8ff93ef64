//! Directory, Component and CreateFolder tables

use super::{copy, set_name_pair, set_yes, DecodeFn};
use crate::attributes::{unknown_bits, ComponentAttributes};
use crate::decompiler::context::Context;
use crate::decompiler::standard::{is_standard_directory, SOURCE_DIR, TARGETDIR};
use crate::document::ElementId;
use crate::messages::MessageCode;
use crate::names::get_names;
use crate::types::{RowView, Table};
use std::collections::HashMap;

pub(super) fn register(map: &mut HashMap<&'static str, DecodeFn>) {
    map.insert("Component", decompile_component_table);
    map.insert("CreateFolder", decompile_create_folder_table);
    map.insert("Directory", decompile_directory_table);
}

fn decompile_directory_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let Some(id) = row.str("Directory") else {
            continue;
        };

        if id == TARGETDIR {
            let default_dir = row.str("DefaultDir").unwrap_or_default();
            if default_dir != SOURCE_DIR {
                ctx.warn(
                    MessageCode::TargetDirCorrectedDefaultDir,
                    &row,
                    format!(
                        "TARGETDIR has DefaultDir '{}'; it will be written as '{}'",
                        default_dir, SOURCE_DIR
                    ),
                );
            }
            continue;
        }

        let directory = if is_standard_directory(id) {
            let directory = ctx.doc.create("StandardDirectory");
            ctx.doc.set_attribute(directory, "Id", id);
            directory
        } else {
            let directory = ctx.doc.create("Directory");
            ctx.doc.set_attribute(directory, "Id", id);
            if let Some(default_dir) = row.str("DefaultDir") {
                set_directory_names(ctx, directory, &row, default_dir);
            }
            directory
        };

        ctx.index.insert_row(&row, directory);
    }

    // parents may appear after their children
    for row in table.views() {
        let Some(directory) = ctx.index.get_row(&row) else {
            continue;
        };
        let id = row.str("Directory").unwrap_or_default();
        let parent = match row.str("Directory_Parent") {
            Some(parent) if parent != TARGETDIR && parent != id => {
                ctx.require(&row, "Directory_Parent", "Directory")
            }
            _ => None,
        };

        let standard = ctx.doc.name(directory) == "StandardDirectory";
        match parent {
            Some(parent) if !standard => {
                ctx.doc.add_child(parent, directory);
            }
            _ => {
                let package = ctx.package();
                ctx.doc.add_child(package, directory);
            }
        }
    }
}

fn set_directory_names(ctx: &mut Context<'_>, directory: ElementId, row: &RowView<'_>, default_dir: &str) {
    let names = get_names(default_dir);

    let name_pairs = [
        (names.long_name, names.short_name, "Name", "ShortName"),
        (
            names.long_source_name,
            names.short_source_name,
            "SourceName",
            "ShortSourceName",
        ),
    ];

    for (long, short, long_attribute, short_attribute) in name_pairs {
        // "." stands for the parent directory itself
        if short.as_deref() == Some(".") {
            if let Some(long) = long {
                ctx.doc.set_attribute(directory, long_attribute, long);
            }
            continue;
        }
        set_name_pair(
            ctx,
            directory,
            row,
            "DefaultDir",
            (long, short),
            (long_attribute, short_attribute),
        );
    }
}

fn decompile_component_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let component = ctx.doc.create("Component");
        copy(ctx, component, &row, "Component", "Id");
        match row.str("ComponentId") {
            Some(guid) => ctx.doc.set_attribute(component, "Guid", guid),
            None => ctx.doc.set_attribute(component, "Guid", ""),
        }
        copy(ctx, component, &row, "Condition", "Condition");

        let bits = row.int("Attributes").unwrap_or(0);
        let attributes = ComponentAttributes::from_bits_truncate(bits as u32);

        if attributes.contains(ComponentAttributes::SOURCE_ONLY | ComponentAttributes::OPTIONAL) {
            ctx.illegal_value(&row, "Attributes", bits);
        } else if attributes.contains(ComponentAttributes::SOURCE_ONLY) {
            ctx.doc.set_attribute(component, "Location", "source");
        } else if attributes.contains(ComponentAttributes::OPTIONAL) {
            ctx.doc.set_attribute(component, "Location", "either");
        }

        if attributes.contains(ComponentAttributes::BITNESS_64) {
            ctx.doc.set_attribute(component, "Bitness", "always64");
        } else {
            ctx.doc.set_attribute(component, "Bitness", "always32");
        }

        let flags = [
            (ComponentAttributes::SHARED_DLL_REF_COUNT, "SharedDllRefCount"),
            (ComponentAttributes::PERMANENT, "Permanent"),
            (ComponentAttributes::TRANSITIVE, "Transitive"),
            (ComponentAttributes::NEVER_OVERWRITE, "NeverOverwrite"),
            (ComponentAttributes::DISABLE_REGISTRY_REFLECTION, "DisableRegistryReflection"),
            (ComponentAttributes::UNINSTALL_ON_SUPERSEDENCE, "UninstallWhenSuperseded"),
            (ComponentAttributes::SHARED, "Shared"),
        ];
        for (flag, attribute) in flags {
            if attributes.contains(flag) {
                set_yes(ctx, component, attribute);
            }
        }
        ctx.unknown_bits(&row, "Attributes", unknown_bits(bits, ComponentAttributes::all().bits()));

        match row.str("Directory_") {
            Some(TARGETDIR) | None => {
                let target = ctx.target_dir_ref();
                ctx.doc.add_child(target, component);
            }
            Some(_) => {
                if let Some(directory) = ctx.require(&row, "Directory_", "Directory") {
                    ctx.doc.add_child(directory, component);
                }
            }
        }

        ctx.index.insert_row(&row, component);
    }
}

fn decompile_create_folder_table(ctx: &mut Context<'_>, table: &Table) {
    let db = ctx.db;
    for row in table.views() {
        let Some(component) = ctx.require(&row, "Component_", "Component") else {
            continue;
        };
        let create_folder = ctx.doc.create_child(component, "CreateFolder");

        let folder = row.str("Directory_");
        let component_directory = row
            .str("Component_")
            .and_then(|c| db.find_row("Component", c))
            .and_then(|c| c.str("Directory_"));
        if folder != component_directory {
            copy(ctx, create_folder, &row, "Directory_", "Directory");
        }

        ctx.index.insert_row(&row, create_folder);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecompileOptions;
    use crate::schema::standard_definition;
    use crate::types::{CellValue, Database};

    fn directory_table(rows: &[(&str, Option<&str>, &str)]) -> Table {
        let mut table = Table::new(standard_definition("Directory").unwrap());
        for (id, parent, default_dir) in rows {
            table.add_row(vec![(*id).into(), (*parent).into(), (*default_dir).into()]);
        }
        table
    }

    #[test]
    fn test_directory_tree() {
        let table = directory_table(&[
            ("INSTALLDIR", Some("ProgramFilesFolder"), "APP|My Application"),
            ("ProgramFilesFolder", Some("TARGETDIR"), "PFiles"),
            ("TARGETDIR", None, "SourceDir"),
        ]);
        let db = Database::new();
        let options = DecompileOptions::default();
        let mut ctx = Context::new(&db, &options);
        decompile_directory_table(&mut ctx, &table);

        let pfiles = ctx.index.get("Directory", "ProgramFilesFolder").unwrap();
        let install = ctx.index.get("Directory", "INSTALLDIR").unwrap();
        assert_eq!(ctx.doc.name(pfiles), "StandardDirectory");
        assert_eq!(ctx.doc.parent(pfiles), Some(ctx.package()));
        assert_eq!(ctx.doc.parent(install), Some(pfiles));
        assert_eq!(ctx.doc.attribute(install, "Name"), Some("My Application"));
        assert_eq!(ctx.doc.attribute(install, "ShortName"), Some("APP"));
        assert!(ctx.index.get("Directory", "TARGETDIR").is_none());
        assert!(ctx.messages.is_empty());
    }

    #[test]
    fn test_targetdir_default_dir_is_corrected() {
        let table = directory_table(&[("TARGETDIR", None, "Root")]);
        let db = Database::new();
        let options = DecompileOptions::default();
        let mut ctx = Context::new(&db, &options);
        decompile_directory_table(&mut ctx, &table);

        assert_eq!(ctx.messages.len(), 1);
        assert_eq!(ctx.messages.entries()[0].code, MessageCode::TargetDirCorrectedDefaultDir);
    }

    #[test]
    fn test_component_attributes() {
        let mut table = Table::new(standard_definition("Component").unwrap());
        table.add_row(vec![
            "Core".into(),
            "{11111111-2222-3333-4444-555555555555}".into(),
            "TARGETDIR".into(),
            (0x0100 | 0x0010 | 0x0002).into(),
            CellValue::Null,
            "core.dll".into(),
        ]);

        let db = Database::new();
        let options = DecompileOptions::default();
        let mut ctx = Context::new(&db, &options);
        decompile_component_table(&mut ctx, &table);

        let component = ctx.index.get("Component", "Core").unwrap();
        assert_eq!(ctx.doc.attribute(component, "Bitness"), Some("always64"));
        assert_eq!(ctx.doc.attribute(component, "Permanent"), Some("yes"));
        assert_eq!(ctx.doc.attribute(component, "Location"), Some("either"));
        assert_eq!(ctx.doc.parent(component), Some(ctx.target_dir_ref()));
        assert!(ctx.messages.is_empty());
    }

    #[test]
    fn test_component_defaults_to_32_bit() {
        let mut table = Table::new(standard_definition("Component").unwrap());
        table.add_row(vec![
            "Core".into(),
            CellValue::Null,
            "TARGETDIR".into(),
            0.into(),
            CellValue::Null,
            CellValue::Null,
        ]);

        let db = Database::new();
        let options = DecompileOptions::default();
        let mut ctx = Context::new(&db, &options);
        decompile_component_table(&mut ctx, &table);

        let component = ctx.index.get("Component", "Core").unwrap();
        assert_eq!(ctx.doc.attribute(component, "Bitness"), Some("always32"));
        assert!(ctx.messages.is_empty());
    }

    #[test]
    fn test_directory_single_long_name() {
        let table = directory_table(&[("DOCS", Some("TARGETDIR"), "User Documents")]);
        let db = Database::new();
        let options = DecompileOptions::default();
        let mut ctx = Context::new(&db, &options);
        decompile_directory_table(&mut ctx, &table);

        let docs = ctx.index.get("Directory", "DOCS").unwrap();
        assert_eq!(ctx.doc.attribute(docs, "Name"), Some("User Documents"));
        assert_eq!(ctx.doc.attribute(docs, "ShortName"), None);
        assert_eq!(ctx.messages.entries()[0].code, MessageCode::IllegalShortFilename);
    }

    #[test]
    fn test_component_unknown_bits() {
        let mut table = Table::new(standard_definition("Component").unwrap());
        table.add_row(vec![
            "Core".into(),
            CellValue::Null,
            "TARGETDIR".into(),
            0x4000.into(),
            CellValue::Null,
            CellValue::Null,
        ]);

        let db = Database::new();
        let options = DecompileOptions::default();
        let mut ctx = Context::new(&db, &options);
        decompile_component_table(&mut ctx, &table);

        assert_eq!(ctx.messages.entries()[0].code, MessageCode::UnknownAttributeBits);
        let component = ctx.index.get("Component", "Core").unwrap();
        assert_eq!(ctx.doc.attribute(component, "Guid"), Some(""));
    }
}
