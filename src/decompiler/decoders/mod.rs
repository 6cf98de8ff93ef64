//! Per-table decoders
//!
//! Each decoder turns the rows of one table into elements. Decoders are
//! looked up by table name in [`registry`].

mod actions;
mod com;
mod custom;
mod directory;
mod files;
mod module;
mod package;
mod patch;
mod registry;
mod search;
mod services;
mod ui;

pub use custom::{decompile_custom_table, ensure_table};
pub(crate) use package::PROPERTY_LISTS;

use super::context::Context;
use crate::document::ElementId;
use crate::messages::MessageCode;
use crate::names::{get_names, is_valid_short_filename};
use crate::types::{RowView, Table};
use std::collections::HashMap;

/// Decoder for one table
pub type DecodeFn = fn(&mut Context<'_>, &Table);

/// Tables decoded by a finalizer rather than a decoder of their own
const DEFERRED_TABLES: &[&str] = &[
    "AdminExecuteSequence",
    "AdminUISequence",
    "AdvtExecuteSequence",
    "AdvtUISequence",
    "AppSearch",
    "CCPSearch",
    "CheckBox",
    "FamilyFileRanges",
    "InstallExecuteSequence",
    "InstallUISequence",
    "LockPermissions",
    "ModuleAdminExecuteSequence",
    "ModuleAdminUISequence",
    "ModuleAdvtExecuteSequence",
    "ModuleAdvtUISequence",
    "ModuleInstallExecuteSequence",
    "ModuleInstallUISequence",
];

fn deferred(_ctx: &mut Context<'_>, table: &Table) {
    log::debug!("{} is decoded during finalization", table.name());
}

/// Table name to decoder
pub fn registry() -> HashMap<&'static str, DecodeFn> {
    let mut map: HashMap<&'static str, DecodeFn> = HashMap::new();

    for &name in DEFERRED_TABLES {
        map.insert(name, deferred);
    }

    package::register(&mut map);
    directory::register(&mut map);
    files::register(&mut map);
    registry::register(&mut map);
    com::register(&mut map);
    services::register(&mut map);
    actions::register(&mut map);
    ui::register(&mut map);
    search::register(&mut map);
    module::register(&mut map);
    patch::register(&mut map);

    map
}

/// Decoder for the summary information stream, run before every other table
pub fn summary_information() -> DecodeFn {
    package::decompile_summary_information
}

pub(crate) fn set_yes(ctx: &mut Context<'_>, element: ElementId, attribute: &str) {
    ctx.doc.set_attribute(element, attribute, "yes");
}

/// Copy a nullable column into an attribute
pub(crate) fn copy(ctx: &mut Context<'_>, element: ElementId, row: &RowView<'_>, column: &str, attribute: &str) {
    if let Some(value) = row.text(column) {
        ctx.doc.set_attribute(element, attribute, value);
    }
}

/// Split a filename column into long and short name attributes
pub(crate) fn set_filename(
    ctx: &mut Context<'_>,
    element: ElementId,
    row: &RowView<'_>,
    column: &str,
    name_attribute: &str,
    short_attribute: &str,
) {
    let Some(value) = row.str(column) else {
        return;
    };
    let names = get_names(value);
    set_name_pair(
        ctx,
        element,
        row,
        column,
        (names.long_name, names.short_name),
        (name_attribute, short_attribute),
    );
}

/// Place one `short|long` pair on an element.
///
/// With both halves present both attributes are written as stored. A lone
/// name always lands in the name attribute; when it is not a valid 8.3 name
/// it is a long name missing its short form and a warning is recorded.
pub(crate) fn set_name_pair(
    ctx: &mut Context<'_>,
    element: ElementId,
    row: &RowView<'_>,
    column: &str,
    (long, short): (Option<String>, Option<String>),
    (name_attribute, short_attribute): (&str, &str),
) {
    match (long, short) {
        (Some(long), Some(short)) => {
            ctx.doc.set_attribute(element, name_attribute, long);
            ctx.doc.set_attribute(element, short_attribute, short);
        }
        (Some(name), None) | (None, Some(name)) => {
            let wildcards = row.table() == "RemoveFile";
            if !is_valid_short_filename(&name, wildcards) {
                ctx.warn(
                    MessageCode::IllegalShortFilename,
                    row,
                    format!("{}.{} has no valid short name for '{}'", row.table(), column, name),
                );
            }
            ctx.doc.set_attribute(element, name_attribute, name);
        }
        (None, None) => {}
    }
}

/// Registry root attribute for a Root column value
pub(crate) fn registry_root(root: i64) -> Option<&'static str> {
    match root {
        -1 => Some("HKMU"),
        0 => Some("HKCR"),
        1 => Some("HKCU"),
        2 => Some("HKLM"),
        3 => Some("HKU"),
        _ => None,
    }
}

/// Split a delimited list of integers, as used by patch range columns
pub(crate) fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    #[test]
    fn test_registry_covers_every_decodable_standard_table() {
        let map = registry();
        for name in ["Component", "Directory", "File", "Control", "CustomAction", "Signature", "ImageFamilies"] {
            assert!(map.contains_key(name), "{}", name);
        }
        for name in schema::INTERNAL_TABLES.iter().chain(schema::UNIMPLEMENTED_TABLES) {
            assert!(!map.contains_key(name), "{}", name);
        }
    }

    #[test]
    fn test_every_registered_table_has_a_definition() {
        for name in registry().keys() {
            assert!(schema::standard_definition(name).is_some(), "{}", name);
        }
    }

    fn file_names(file_name: &str) -> (Vec<(String, String)>, Vec<MessageCode>) {
        use crate::config::DecompileOptions;
        use crate::types::{CellValue, Database};

        let mut table = Table::new(schema::standard_definition("File").unwrap());
        table.add_row(vec![
            "f".into(), "Core".into(), file_name.into(), 1.into(), CellValue::Null,
            CellValue::Null, CellValue::Null, 1.into(),
        ]);
        let db = Database::new();
        let options = DecompileOptions::default();
        let mut ctx = Context::new(&db, &options);
        let file = ctx.doc.create("File");
        let row = table.views().next().unwrap();
        set_filename(&mut ctx, file, &row, "FileName", "Name", "ShortName");

        let codes = ctx.messages.entries().iter().map(|m| m.code).collect();
        (ctx.doc.attributes(file).to_vec(), codes)
    }

    fn pair(name: &str, value: &str) -> (String, String) {
        (name.to_string(), value.to_string())
    }

    // ===========================================
    // Filename Tests
    // ===========================================

    #[test]
    fn test_both_names_are_kept_as_stored() {
        let (attrs, codes) = file_names("long name.txt|Long Name.txt");
        assert_eq!(attrs, vec![pair("Name", "Long Name.txt"), pair("ShortName", "long name.txt")]);
        assert!(codes.is_empty());
    }

    #[test]
    fn test_single_short_name() {
        let (attrs, codes) = file_names("setup.exe");
        assert_eq!(attrs, vec![pair("Name", "setup.exe")]);
        assert!(codes.is_empty());
    }

    #[test]
    fn test_single_long_name_warns() {
        let (attrs, codes) = file_names("Program Setup.exe");
        assert_eq!(attrs, vec![pair("Name", "Program Setup.exe")]);
        assert_eq!(codes, vec![MessageCode::IllegalShortFilename]);
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(Some("10, 20,30")), vec!["10", "20", "30"]);
        assert!(split_list(None).is_empty());
    }
}
