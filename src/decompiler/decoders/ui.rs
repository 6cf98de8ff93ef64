//! User interface tables

use super::{copy, set_yes, DecodeFn};
use crate::attributes::{
    control_type_bits, icon_size, table_mask, unknown_bits, ControlAttributes, DialogAttributes,
    TextStyleBits, ICON_SIZE_MASK,
};
use crate::decompiler::context::Context;
use crate::document::ElementId;
use crate::types::{join_key, RowView, Table};
use std::collections::HashMap;

pub(super) fn register(map: &mut HashMap<&'static str, DecodeFn>) {
    map.insert("ActionText", decompile_action_text_table);
    map.insert("ComboBox", decompile_list_table);
    map.insert("Control", decompile_control_table);
    map.insert("ControlCondition", decompile_control_condition_table);
    map.insert("ControlEvent", decompile_control_event_table);
    map.insert("Dialog", decompile_dialog_table);
    map.insert("Error", decompile_error_table);
    map.insert("EventMapping", decompile_event_mapping_table);
    map.insert("ListBox", decompile_list_table);
    map.insert("ListView", decompile_list_table);
    map.insert("RadioButton", decompile_radio_button_table);
    map.insert("TextStyle", decompile_text_style_table);
    map.insert("UIText", decompile_ui_text_table);
}

/// `tooltip|help` column into ToolTip and Help attributes
fn set_help(ctx: &mut Context<'_>, element: ElementId, row: &RowView<'_>) {
    let Some(help) = row.str("Help") else {
        return;
    };
    match help.split_once('|') {
        Some((tooltip, help)) => {
            if !tooltip.is_empty() {
                ctx.doc.set_attribute(element, "ToolTip", tooltip);
            }
            if !help.is_empty() {
                ctx.doc.set_attribute(element, "Help", help);
            }
        }
        None => ctx.doc.set_attribute(element, "ToolTip", help),
    }
}

fn decompile_dialog_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let ui = ctx.ui();
        let dialog = ctx.doc.create_child(ui, "Dialog");
        copy(ctx, dialog, &row, "Dialog", "Id");
        copy(ctx, dialog, &row, "HCentering", "X");
        copy(ctx, dialog, &row, "VCentering", "Y");
        copy(ctx, dialog, &row, "Width", "Width");
        copy(ctx, dialog, &row, "Height", "Height");
        copy(ctx, dialog, &row, "Title", "Title");

        if let Some(bits) = row.int("Attributes") {
            let attributes = DialogAttributes::from_bits_truncate(bits as u32);
            if !attributes.contains(DialogAttributes::VISIBLE) {
                set_yes(ctx, dialog, "Hidden");
            }
            if !attributes.contains(DialogAttributes::MODAL) {
                set_yes(ctx, dialog, "Modeless");
            }
            if !attributes.contains(DialogAttributes::MINIMIZE) {
                set_yes(ctx, dialog, "NoMinimize");
            }

            let flags = [
                (DialogAttributes::SYS_MODAL, "SystemModal"),
                (DialogAttributes::KEEP_MODELESS, "KeepModeless"),
                (DialogAttributes::TRACK_DISK_SPACE, "TrackDiskSpace"),
                (DialogAttributes::USE_CUSTOM_PALETTE, "CustomPalette"),
                (DialogAttributes::RTL_RO, "RightToLeft"),
                (DialogAttributes::RIGHT_ALIGNED, "RightAligned"),
                (DialogAttributes::LEFT_SCROLL, "LeftScroll"),
                (DialogAttributes::ERROR, "ErrorDialog"),
            ];
            for (flag, attribute) in flags {
                if attributes.contains(flag) {
                    set_yes(ctx, dialog, attribute);
                }
            }
            ctx.unknown_bits(&row, "Attributes", unknown_bits(bits, DialogAttributes::all().bits()));
        }

        ctx.index.insert_row(&row, dialog);
    }
}

/// Controls are indexed here and placed under their dialog in tab order
/// during finalization.
fn decompile_control_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        if ctx.require(&row, "Dialog_", "Dialog").is_none() {
            continue;
        }

        let control = ctx.doc.create("Control");
        copy(ctx, control, &row, "Control", "Id");
        copy(ctx, control, &row, "Type", "Type");
        copy(ctx, control, &row, "X", "X");
        copy(ctx, control, &row, "Y", "Y");
        copy(ctx, control, &row, "Width", "Width");
        copy(ctx, control, &row, "Height", "Height");
        copy(ctx, control, &row, "Property", "Property");
        copy(ctx, control, &row, "Text", "Text");
        set_help(ctx, control, &row);

        if let Some(bits) = row.int("Attributes") {
            set_control_attributes(ctx, control, &row, bits);
        }

        ctx.index.insert_row(&row, control);
    }
}

fn set_control_attributes(ctx: &mut Context<'_>, control: ElementId, row: &RowView<'_>, bits: i64) {
    let attributes = ControlAttributes::from_bits_truncate(bits as u32);
    if !attributes.contains(ControlAttributes::VISIBLE) {
        set_yes(ctx, control, "Hidden");
    }
    if !attributes.contains(ControlAttributes::ENABLED) {
        set_yes(ctx, control, "Disabled");
    }
    let flags = [
        (ControlAttributes::SUNKEN, "Sunken"),
        (ControlAttributes::INDIRECT, "Indirect"),
        (ControlAttributes::INTEGER, "Integer"),
        (ControlAttributes::RTL_RO, "RightToLeft"),
        (ControlAttributes::RIGHT_ALIGNED, "RightAligned"),
        (ControlAttributes::LEFT_SCROLL, "LeftScroll"),
    ];
    for (flag, attribute) in flags {
        if attributes.contains(flag) {
            set_yes(ctx, control, attribute);
        }
    }

    let control_type = row.str("Type").unwrap_or_default();
    let (type_bits, has_icon_size) = control_type_bits(control_type);
    for &(bit, attribute) in type_bits {
        if bits & bit as i64 != 0 {
            set_yes(ctx, control, attribute);
        }
    }

    let mut known = ControlAttributes::all().bits() | table_mask(type_bits);
    if has_icon_size {
        known |= ICON_SIZE_MASK;
        if let Some(size) = icon_size(bits as u32) {
            ctx.doc.set_attribute(control, "IconSize", size);
        }
    }
    ctx.unknown_bits(row, "Attributes", unknown_bits(bits, known));
}

/// Control element addressed by a row's Dialog_ and Control_ columns
fn control_for(ctx: &mut Context<'_>, row: &RowView<'_>) -> Option<ElementId> {
    let dialog = row.str("Dialog_")?;
    let control = row.str("Control_")?;
    let key = join_key(&[dialog, control]);
    match ctx.index.get("Control", &key) {
        Some(element) => Some(element),
        None => {
            ctx.expected_foreign_row(row, "Control_", &key, "Control");
            None
        }
    }
}

fn decompile_control_event_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let Some(control) = control_for(ctx, &row) else {
            continue;
        };
        let publish = ctx.doc.create_child(control, "Publish");

        let event = row.str("Event").unwrap_or_default();
        match event.strip_prefix('[').and_then(|e| e.strip_suffix(']')) {
            Some(property) => ctx.doc.set_attribute(publish, "Property", property),
            None => ctx.doc.set_attribute(publish, "Event", event),
        }
        copy(ctx, publish, &row, "Argument", "Value");
        if let Some(condition) = row.str("Condition").filter(|c| *c != "1") {
            ctx.doc.set_attribute(publish, "Condition", condition);
        }
        copy(ctx, publish, &row, "Ordering", "Order");

        ctx.index.insert_row(&row, publish);
    }
}

fn decompile_control_condition_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let Some(control) = control_for(ctx, &row) else {
            continue;
        };
        let action = row.str("Action").unwrap_or_default();
        let attribute = match action {
            "Default" => "DefaultCondition",
            "Disable" => "DisableCondition",
            "Enable" => "EnableCondition",
            "Hide" => "HideCondition",
            "Show" => "ShowCondition",
            _ => {
                ctx.illegal_value(&row, "Action", action);
                continue;
            }
        };
        copy(ctx, control, &row, "Condition", attribute);
    }
}

fn decompile_event_mapping_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let Some(control) = control_for(ctx, &row) else {
            continue;
        };
        let subscribe = ctx.doc.create_child(control, "Subscribe");
        copy(ctx, subscribe, &row, "Event", "Event");
        copy(ctx, subscribe, &row, "Attribute", "Attribute");
    }
}

/// Group element for a list-like table, created under UI on first use
fn property_group(ctx: &mut Context<'_>, table: &str, element_name: &str, property: &str) -> ElementId {
    if let Some(group) = ctx.index.get(table, property) {
        return group;
    }
    let ui = ctx.ui();
    let group = ctx.doc.create_child(ui, element_name);
    ctx.doc.set_attribute(group, "Property", property);
    ctx.index.insert(table, property, group);
    group
}

fn decompile_radio_button_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let Some(property) = row.str("Property") else {
            continue;
        };
        let group = property_group(ctx, "RadioButtonGroup", "RadioButtonGroup", property);
        let button = ctx.doc.create_child(group, "RadioButton");
        copy(ctx, button, &row, "Value", "Value");
        copy(ctx, button, &row, "X", "X");
        copy(ctx, button, &row, "Y", "Y");
        copy(ctx, button, &row, "Width", "Width");
        copy(ctx, button, &row, "Height", "Height");
        copy(ctx, button, &row, "Text", "Text");
        set_help(ctx, button, &row);
        ctx.index.insert_row(&row, button);
    }
}

/// ListBox, ComboBox and ListView share one layout
fn decompile_list_table(ctx: &mut Context<'_>, table: &Table) {
    let name = table.name().to_string();
    for row in table.views() {
        let Some(property) = row.str("Property") else {
            continue;
        };
        let group = property_group(ctx, &format!("{}Group", name), &name, property);
        let item = ctx.doc.create_child(group, "ListItem");
        copy(ctx, item, &row, "Value", "Value");
        copy(ctx, item, &row, "Text", "Text");
        copy(ctx, item, &row, "Binary_", "Icon");
        ctx.index.insert_row(&row, item);
    }
}

fn decompile_text_style_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let ui = ctx.ui();
        let style = ctx.doc.create_child(ui, "TextStyle");
        copy(ctx, style, &row, "TextStyle", "Id");
        copy(ctx, style, &row, "FaceName", "FaceName");
        copy(ctx, style, &row, "Size", "Size");

        if let Some(color) = row.int("Color") {
            ctx.doc.set_attribute(style, "Red", (color & 0xFF).to_string());
            ctx.doc.set_attribute(style, "Green", ((color >> 8) & 0xFF).to_string());
            ctx.doc.set_attribute(style, "Blue", ((color >> 16) & 0xFF).to_string());
        }

        if let Some(bits) = row.int("StyleBits") {
            let style_bits = TextStyleBits::from_bits_truncate(bits as u32);
            let flags = [
                (TextStyleBits::BOLD, "Bold"),
                (TextStyleBits::ITALIC, "Italic"),
                (TextStyleBits::UNDERLINE, "Underline"),
                (TextStyleBits::STRIKE, "Strike"),
            ];
            for (flag, attribute) in flags {
                if style_bits.contains(flag) {
                    set_yes(ctx, style, attribute);
                }
            }
            ctx.unknown_bits(&row, "StyleBits", unknown_bits(bits, TextStyleBits::all().bits()));
        }

        ctx.index.insert_row(&row, style);
    }
}

fn decompile_ui_text_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let ui = ctx.ui();
        let text = ctx.doc.create_child(ui, "UIText");
        copy(ctx, text, &row, "Key", "Id");
        copy(ctx, text, &row, "Text", "Value");
    }
}

fn decompile_error_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let ui = ctx.ui();
        let error = ctx.doc.create_child(ui, "Error");
        copy(ctx, error, &row, "Error", "Id");
        copy(ctx, error, &row, "Message", "Message");
    }
}

fn decompile_action_text_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let ui = ctx.ui();
        let progress = ctx.doc.create_child(ui, "ProgressText");
        copy(ctx, progress, &row, "Action", "Action");
        copy(ctx, progress, &row, "Description", "Message");
        copy(ctx, progress, &row, "Template", "Template");
    }
}
