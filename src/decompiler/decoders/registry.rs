//! Registry, RemoveRegistry and Environment tables

use super::{copy, registry_root, set_yes, DecodeFn};
use crate::decompiler::context::Context;
use crate::document::ElementId;
use crate::names::{
    parse_environment_name, parse_environment_value, parse_registry_value, EnvironmentAction,
    MultiStringAction, RegistryValue,
};
use crate::types::{RowView, Table};
use std::collections::HashMap;

pub(super) fn register(map: &mut HashMap<&'static str, DecodeFn>) {
    map.insert("Environment", decompile_environment_table);
    map.insert("Registry", decompile_registry_table);
    map.insert("RemoveRegistry", decompile_remove_registry_table);
}

fn set_root(ctx: &mut Context<'_>, element: ElementId, row: &RowView<'_>) {
    let root = row.int("Root").unwrap_or(i64::MIN);
    match registry_root(root) {
        Some(name) => ctx.doc.set_attribute(element, "Root", name),
        None => ctx.illegal_value(row, "Root", row.text("Root").unwrap_or_default()),
    }
}

fn decompile_registry_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let name = row.str("Name");
        let value = row.str("Value");

        let element = match (name, value) {
            (Some(marker @ ("+" | "-" | "*")), None) => {
                let key = ctx.doc.create("RegistryKey");
                set_root(ctx, key, &row);
                copy(ctx, key, &row, "Key", "Key");
                if marker != "-" {
                    set_yes(ctx, key, "ForceCreateOnInstall");
                }
                if marker != "+" {
                    set_yes(ctx, key, "ForceDeleteOnUninstall");
                }
                key
            }
            (None, None) => {
                let key = ctx.doc.create("RegistryKey");
                set_root(ctx, key, &row);
                copy(ctx, key, &row, "Key", "Key");
                key
            }
            (name, value) => {
                let registry = ctx.doc.create("RegistryValue");
                copy(ctx, registry, &row, "Registry", "Id");
                set_root(ctx, registry, &row);
                copy(ctx, registry, &row, "Key", "Key");
                ctx.doc.set_optional(registry, "Name", name);
                if let Some(value) = value {
                    set_registry_value(ctx, registry, parse_registry_value(value));
                }
                registry
            }
        };

        ctx.add_to_component(&row, element);
        ctx.index.insert_row(&row, element);
    }
}

fn set_registry_value(ctx: &mut Context<'_>, registry: ElementId, value: RegistryValue) {
    ctx.doc.set_attribute(registry, "Type", value.type_name());

    match value {
        RegistryValue::Binary(v)
        | RegistryValue::Expandable(v)
        | RegistryValue::Integer(v)
        | RegistryValue::String(v) => ctx.doc.set_attribute(registry, "Value", v),
        RegistryValue::MultiString { action, values } => {
            let action = match action {
                MultiStringAction::Write => "write",
                MultiStringAction::Append => "append",
                MultiStringAction::Prepend => "prepend",
            };
            ctx.doc.set_attribute(registry, "Action", action);
            for value in values {
                let child = ctx.doc.create_child(registry, "MultiStringValue");
                ctx.doc.set_attribute(child, "Value", value);
            }
        }
    }
}

fn decompile_remove_registry_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let element = if row.str("Name") == Some("-") {
            let key = ctx.doc.create("RemoveRegistryKey");
            copy(ctx, key, &row, "RemoveRegistry", "Id");
            ctx.doc.set_attribute(key, "Action", "removeOnInstall");
            set_root(ctx, key, &row);
            copy(ctx, key, &row, "Key", "Key");
            key
        } else {
            let value = ctx.doc.create("RemoveRegistryValue");
            copy(ctx, value, &row, "RemoveRegistry", "Id");
            set_root(ctx, value, &row);
            copy(ctx, value, &row, "Key", "Key");
            copy(ctx, value, &row, "Name", "Name");
            value
        };

        ctx.add_to_component(&row, element);
        ctx.index.insert_row(&row, element);
    }
}

fn decompile_environment_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let environment = ctx.doc.create("Environment");
        copy(ctx, environment, &row, "Environment", "Id");

        let name = parse_environment_name(row.str("Name").unwrap_or_default());
        ctx.doc.set_attribute(environment, "Name", name.name.as_str());
        let action = name.action.unwrap_or(EnvironmentAction::Set);
        ctx.doc.set_attribute(environment, "Action", action.as_str());
        if name.permanent {
            set_yes(ctx, environment, "Permanent");
        }
        if name.system {
            set_yes(ctx, environment, "System");
        }

        if let Some(raw) = row.str("Value") {
            let value = parse_environment_value(raw);
            if let Some(part) = value.part {
                ctx.doc.set_attribute(environment, "Part", part.as_str());
            }
            ctx.doc.set_optional(environment, "Separator", value.separator);
            ctx.doc.set_optional(environment, "Value", value.value);
        }

        ctx.add_to_component(&row, environment);
        ctx.index.insert_row(&row, environment);
    }
}
