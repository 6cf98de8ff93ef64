//! Merge module tables

use super::{copy, DecodeFn};
use crate::decompiler::context::Context;
use crate::types::Table;
use std::collections::HashMap;

pub(super) fn register(map: &mut HashMap<&'static str, DecodeFn>) {
    map.insert("ModuleDependency", decompile_module_dependency_table);
    map.insert("ModuleExclusion", decompile_module_exclusion_table);
    map.insert("ModuleIgnoreTable", decompile_module_ignore_table_table);
    map.insert("ModuleSignature", decompile_module_signature_table);
}

fn decompile_module_signature_table(ctx: &mut Context<'_>, table: &Table) {
    let module = ctx.package();
    for (i, row) in table.views().enumerate() {
        if i > 0 {
            log::warn!("ignoring extra module signature {}", row.primary_key());
            continue;
        }
        copy(ctx, module, &row, "ModuleID", "Id");
        copy(ctx, module, &row, "Language", "Language");
        copy(ctx, module, &row, "Version", "Version");
        ctx.index.insert_row(&row, module);
    }
}

fn decompile_module_dependency_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let dependency = ctx.add_to_package("Dependency");
        copy(ctx, dependency, &row, "RequiredID", "RequiredId");
        copy(ctx, dependency, &row, "RequiredLanguage", "RequiredLanguage");
        copy(ctx, dependency, &row, "RequiredVersion", "RequiredVersion");
    }
}

fn decompile_module_exclusion_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let exclusion = ctx.add_to_package("Exclusion");
        copy(ctx, exclusion, &row, "ExcludedID", "ExcludedId");

        match row.int("ExcludedLanguage").unwrap_or(0) {
            0 => {}
            language if language < 0 => ctx
                .doc
                .set_attribute(exclusion, "ExcludeExceptLanguage", (-language).to_string()),
            language => ctx
                .doc
                .set_attribute(exclusion, "ExcludeLanguage", language.to_string()),
        }

        copy(ctx, exclusion, &row, "ExcludedMinVersion", "ExcludedMinVersion");
        copy(ctx, exclusion, &row, "ExcludedMaxVersion", "ExcludedMaxVersion");
    }
}

fn decompile_module_ignore_table_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let ignore = ctx.add_to_package("IgnoreTable");
        copy(ctx, ignore, &row, "Table", "Id");
    }
}
