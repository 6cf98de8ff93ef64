//! CustomAction table
//!
//! The Type column packs several fields:
//!
//! | bits    | field                                         |
//! |---------|-----------------------------------------------|
//! | 0x0007  | target kind (dll, exe, text, script, install) |
//! | 0x0030  | source kind (binary, file, directory, property) |
//! | 0x00C0  | return processing                             |
//! | 0x0700  | execution scheduling                          |
//! | 0xF800  | option flags                                  |

use super::{set_yes, DecodeFn};
use crate::attributes::CustomActionOptions;
use crate::decompiler::context::Context;
use crate::messages::MessageCode;
use crate::types::Table;
use std::collections::HashMap;

pub(super) fn register(map: &mut HashMap<&'static str, DecodeFn>) {
    map.insert("CustomAction", decompile_custom_action_table);
}

const TARGET_MASK: i64 = 0x0007;
const SOURCE_MASK: i64 = 0x0030;
const RETURN_MASK: i64 = 0x00C0;
const EXECUTE_MASK: i64 = 0x0700;
const UNKNOWN_MASK: i64 = 0x0008;

const TARGET_DLL: i64 = 1;
const TARGET_EXE: i64 = 2;
const TARGET_TEXT: i64 = 3;
const TARGET_JSCRIPT: i64 = 5;
const TARGET_VBSCRIPT: i64 = 6;
const TARGET_INSTALL: i64 = 7;

const SOURCE_BINARY: i64 = 0x00;
const SOURCE_FILE: i64 = 0x10;
const SOURCE_DIRECTORY: i64 = 0x20;
const SOURCE_PROPERTY: i64 = 0x30;

/// ExtendedType bit mirroring the patch-uninstall option
const EXTENDED_PATCH_UNINSTALL: i64 = 0x8000;

fn return_attribute(bits: i64) -> Option<&'static str> {
    match bits & RETURN_MASK {
        0x40 => Some("ignore"),
        0x80 => Some("asyncWait"),
        0xC0 => Some("asyncNoWait"),
        _ => None,
    }
}

fn execute_attribute(bits: i64) -> Result<Option<&'static str>, ()> {
    match bits & EXECUTE_MASK {
        0x000 => Ok(None),
        0x100 => Ok(Some("firstSequence")),
        0x200 => Ok(Some("oncePerProcess")),
        0x300 => Ok(Some("secondSequence")),
        0x400 => Ok(Some("deferred")),
        0x500 => Ok(Some("rollback")),
        0x600 => Ok(Some("commit")),
        _ => Err(()),
    }
}

fn source_attribute(source: i64) -> &'static str {
    match source {
        SOURCE_FILE => "FileRef",
        SOURCE_DIRECTORY => "Directory",
        SOURCE_PROPERTY => "Property",
        _ => "BinaryRef",
    }
}

fn decompile_custom_action_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let raw = row.int("Type").unwrap_or(0);
        let bits = raw & 0xFFFF;
        // negative values are the 0x8000 bit of a sign-extended i16
        let high_bits = if (i64::from(i16::MIN)..0).contains(&raw) { 0 } else { raw & !0xFFFF };
        let target_kind = bits & TARGET_MASK;
        let source_kind = bits & SOURCE_MASK;

        if target_kind == TARGET_INSTALL {
            ctx.warn(
                MessageCode::NestedInstall,
                &row,
                format!(
                    "custom action '{}' is a nested install, which cannot be represented",
                    row.primary_key()
                ),
            );
            continue;
        }

        let source = row.str("Source");
        let target = row.str("Target");

        let action = ctx.doc.create("CustomAction");
        ctx.doc.set_optional(action, "Id", row.str("Action"));

        let mut source_written = false;
        match (target_kind, source_kind) {
            (TARGET_DLL, _) => ctx.doc.set_optional(action, "DllEntry", target),
            (TARGET_EXE, _) => ctx.doc.set_optional(action, "ExeCommand", target),
            (TARGET_TEXT, SOURCE_FILE) => ctx.doc.set_optional(action, "Error", target),
            (TARGET_TEXT, SOURCE_DIRECTORY) | (TARGET_TEXT, SOURCE_PROPERTY) => {
                ctx.doc.set_optional(action, "Value", target)
            }
            (TARGET_JSCRIPT, SOURCE_DIRECTORY) | (TARGET_VBSCRIPT, SOURCE_DIRECTORY) => {
                let language = if target_kind == TARGET_JSCRIPT { "jscript" } else { "vbscript" };
                ctx.doc.set_attribute(action, "Script", language);
                if let Some(script) = target {
                    ctx.doc.set_text(action, script);
                }
                source_written = true;
            }
            (TARGET_JSCRIPT, _) => ctx.doc.set_optional(action, "JScriptCall", target),
            (TARGET_VBSCRIPT, _) => ctx.doc.set_optional(action, "VBScriptCall", target),
            _ => {
                ctx.illegal_value(&row, "Type", raw);
                continue;
            }
        }

        if !source_written {
            ctx.doc.set_optional(action, source_attribute(source_kind), source);
        }

        if let Some(value) = return_attribute(bits) {
            ctx.doc.set_attribute(action, "Return", value);
        }
        match execute_attribute(bits) {
            Ok(Some(value)) => ctx.doc.set_attribute(action, "Execute", value),
            Ok(None) => {}
            Err(()) => ctx.illegal_value(&row, "Type", raw),
        }

        let options = CustomActionOptions::from_bits_truncate(bits as u32);
        if options.contains(CustomActionOptions::NO_IMPERSONATE) {
            ctx.doc.set_attribute(action, "Impersonate", "no");
        }
        if options.contains(CustomActionOptions::BITNESS_64) {
            ctx.doc.set_attribute(action, "Bitness", "always64");
        }
        if options.contains(CustomActionOptions::HIDE_TARGET) {
            set_yes(ctx, action, "HideTarget");
        }
        if options.contains(CustomActionOptions::TS_AWARE) {
            set_yes(ctx, action, "TerminalServerAware");
        }
        let extended = row.int("ExtendedType").unwrap_or(0);
        if options.contains(CustomActionOptions::PATCH_UNINSTALL)
            || extended & EXTENDED_PATCH_UNINSTALL != 0
        {
            set_yes(ctx, action, "PatchUninstall");
        }

        ctx.unknown_bits(&row, "Type", (bits & UNKNOWN_MASK) | high_bits);

        let package = ctx.package();
        ctx.doc.add_child(package, action);
        ctx.index.insert_row(&row, action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecompileOptions;
    use crate::types::{CellValue, Database};
    use crate::schema::standard_definition;

    fn decode(rows: Vec<(&str, i32, Option<&str>, Option<&str>)>) -> Context<'static> {
        let mut table = Table::new(standard_definition("CustomAction").unwrap());
        for (id, kind, source, target) in rows {
            table.add_row(vec![id.into(), kind.into(), source.into(), target.into(), CellValue::Null]);
        }
        let db: &'static Database = Box::leak(Box::new(Database::new()));
        let options: &'static DecompileOptions = Box::leak(Box::new(DecompileOptions::default()));
        let mut ctx = Context::new(db, options);
        decompile_custom_action_table(&mut ctx, &table);
        ctx
    }

    #[test]
    fn test_nested_install_is_skipped() {
        let ctx = decode(vec![("Nested", 7 | 0x10, Some("sub.msi"), Some("ADDLOCAL=ALL"))]);
        assert!(ctx.index.get("CustomAction", "Nested").is_none());
        assert_eq!(ctx.messages.entries()[0].code, MessageCode::NestedInstall);
    }

    #[test]
    fn test_source_and_target_kinds() {
        let ctx = decode(vec![
            ("Dll", 1, Some("helper"), Some("Entry")),
            ("SetProp", 51, Some("MYPROP"), Some("[ProgramFilesFolder]")),
            ("Inline", 37, None, Some("var x = 1;")),
            ("Fail", 19, None, Some("Unsupported platform")),
        ]);

        let dll = ctx.index.get("CustomAction", "Dll").unwrap();
        assert_eq!(ctx.doc.attribute(dll, "BinaryRef"), Some("helper"));
        assert_eq!(ctx.doc.attribute(dll, "DllEntry"), Some("Entry"));

        let set_prop = ctx.index.get("CustomAction", "SetProp").unwrap();
        assert_eq!(ctx.doc.attribute(set_prop, "Property"), Some("MYPROP"));
        assert_eq!(ctx.doc.attribute(set_prop, "Value"), Some("[ProgramFilesFolder]"));

        let inline = ctx.index.get("CustomAction", "Inline").unwrap();
        assert_eq!(ctx.doc.attribute(inline, "Script"), Some("jscript"));
        assert_eq!(ctx.doc.text(inline), Some("var x = 1;"));

        let fail = ctx.index.get("CustomAction", "Fail").unwrap();
        assert_eq!(ctx.doc.attribute(fail, "Error"), Some("Unsupported platform"));
        assert!(ctx.messages.is_empty());
    }

    #[test]
    fn test_scheduling_and_options() {
        let ctx = decode(vec![("Deferred", 1 | 0x40 | 0x400 | 0x800 | 0x2000, Some("b"), Some("E"))]);
        let action = ctx.index.get("CustomAction", "Deferred").unwrap();
        assert_eq!(ctx.doc.attribute(action, "Return"), Some("ignore"));
        assert_eq!(ctx.doc.attribute(action, "Execute"), Some("deferred"));
        assert_eq!(ctx.doc.attribute(action, "Impersonate"), Some("no"));
        assert_eq!(ctx.doc.attribute(action, "HideTarget"), Some("yes"));
    }

    #[test]
    fn test_illegal_and_unknown_type_bits() {
        let ctx = decode(vec![
            ("Zero", 0, Some("b"), Some("E")),
            ("Odd", 1 | 0x8, Some("b"), Some("E")),
            ("BadExecute", 1 | 0x700, Some("b"), Some("E")),
        ]);
        let codes: Vec<_> = ctx.messages.entries().iter().map(|m| m.code).collect();
        assert_eq!(
            codes,
            vec![
                MessageCode::IllegalColumnValue,
                MessageCode::UnknownAttributeBits,
                MessageCode::IllegalColumnValue,
            ]
        );
        assert!(ctx.index.get("CustomAction", "Zero").is_none());
        assert!(ctx.index.get("CustomAction", "Odd").is_some());
    }

    #[test]
    fn test_type_bits_beyond_sixteen() {
        let ctx = decode(vec![
            ("Wide", 1 | 0x10000, Some("b"), Some("E")),
            ("Patch", i32::from(0x8001u16 as i16), Some("b"), Some("E")),
        ]);

        assert_eq!(ctx.messages.len(), 1);
        let message = &ctx.messages.entries()[0];
        assert_eq!(message.code, MessageCode::UnknownAttributeBits);
        assert_eq!(message.row_key.as_deref(), Some("Wide"));
        assert_eq!(message.value.as_deref(), Some("0x10000"));

        let wide = ctx.index.get("CustomAction", "Wide").unwrap();
        assert_eq!(ctx.doc.attribute(wide, "DllEntry"), Some("E"));
        let patch = ctx.index.get("CustomAction", "Patch").unwrap();
        assert_eq!(ctx.doc.attribute(patch, "PatchUninstall"), Some("yes"));
    }
}
