//! Patch creation (.pcp) tables

use super::{copy, set_yes, split_list, DecodeFn};
use crate::decompiler::context::Context;
use crate::document::ElementId;
use crate::messages::MessageCode;
use crate::types::{RowView, Table};
use std::collections::HashMap;

pub(super) fn register(map: &mut HashMap<&'static str, DecodeFn>) {
    map.insert("ExternalFiles", decompile_external_files_table);
    map.insert("ImageFamilies", decompile_image_families_table);
    map.insert("PatchMetadata", decompile_patch_metadata_table);
    map.insert("PatchSequence", decompile_patch_sequence_table);
    map.insert("Properties", decompile_properties_table);
    map.insert("TargetFiles_OptionalData", decompile_target_files_optional_data_table);
    map.insert("TargetImages", decompile_target_images_table);
    map.insert("UpgradedFiles_OptionalData", decompile_upgraded_files_optional_data_table);
    map.insert("UpgradedFilesToIgnore", decompile_upgraded_files_to_ignore_table);
    map.insert("UpgradedImages", decompile_upgraded_images_table);
}

fn set_flag(ctx: &mut Context<'_>, element: ElementId, row: &RowView<'_>, column: &str, attribute: &str) {
    match row.int(column) {
        Some(0) => ctx.doc.set_attribute(element, attribute, "no"),
        Some(1) => set_yes(ctx, element, attribute),
        None => {}
        Some(other) => ctx.illegal_value(row, column, other),
    }
}

/// `IgnoreRange` children from parallel offset and length lists
fn add_ignore_ranges(ctx: &mut Context<'_>, parent: ElementId, row: &RowView<'_>) {
    let offsets = split_list(row.str("IgnoreOffsets"));
    let lengths = split_list(row.str("IgnoreLengths"));
    if offsets.len() != lengths.len() {
        ctx.illegal_value(row, "IgnoreLengths", row.text("IgnoreLengths").unwrap_or_default());
        return;
    }
    for (offset, length) in offsets.into_iter().zip(lengths) {
        let range = ctx.doc.create_child(parent, "IgnoreRange");
        ctx.doc.set_attribute(range, "Offset", offset);
        ctx.doc.set_attribute(range, "Length", length);
    }
}

fn decompile_image_families_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let family = ctx.add_to_package("Family");
        copy(ctx, family, &row, "Family", "Name");
        copy(ctx, family, &row, "MediaSrcPropName", "MediaSrcProp");
        copy(ctx, family, &row, "MediaDiskId", "DiskId");
        copy(ctx, family, &row, "FileSequenceStart", "SequenceStart");
        copy(ctx, family, &row, "DiskPrompt", "DiskPrompt");
        copy(ctx, family, &row, "VolumeLabel", "VolumeLabel");
        ctx.index.insert_row(&row, family);
    }
}

fn decompile_upgraded_images_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let Some(family) = ctx.require(&row, "Family", "ImageFamilies") else {
            continue;
        };
        let image = ctx.doc.create_child(family, "UpgradeImage");
        copy(ctx, image, &row, "Upgraded", "Id");
        copy(ctx, image, &row, "MsiPath", "SourceFile");
        copy(ctx, image, &row, "PatchMsiPath", "SourcePatch");
        copy(ctx, image, &row, "SymbolPaths", "SymbolPaths");
        ctx.index.insert_row(&row, image);
    }
}

fn decompile_target_images_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let Some(upgrade) = ctx.require(&row, "Upgraded", "UpgradedImages") else {
            continue;
        };
        let image = ctx.doc.create_child(upgrade, "TargetImage");
        copy(ctx, image, &row, "Target", "Id");
        copy(ctx, image, &row, "MsiPath", "SourceFile");
        copy(ctx, image, &row, "SymbolPaths", "SymbolPaths");
        copy(ctx, image, &row, "Order", "Order");
        copy(ctx, image, &row, "ProductValidateFlags", "Validation");
        if row.int("IgnoreMissingSrcFiles").unwrap_or(0) != 0 {
            set_yes(ctx, image, "IgnoreMissingFiles");
        }
        ctx.index.insert_row(&row, image);
    }
}

fn decompile_upgraded_files_optional_data_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let Some(image) = ctx.require(&row, "Upgraded", "UpgradedImages") else {
            continue;
        };
        let file = ctx.doc.create_child(image, "UpgradeFile");
        copy(ctx, file, &row, "FTK", "File");
        ctx.doc.set_attribute(file, "Ignore", "no");
        set_flag(ctx, file, &row, "AllowIgnoreOnPatchError", "AllowIgnoreOnError");
        set_flag(ctx, file, &row, "IncludeWholeFile", "WholeFile");
        ctx.index.insert_row(&row, file);
    }
}

fn decompile_upgraded_files_to_ignore_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        if row.str("Upgraded") == Some("*") {
            ctx.warn(
                MessageCode::UnrepresentableColumnValue,
                &row,
                format!(
                    "file '{}' is ignored for every upgraded image, which cannot be represented",
                    row.str("FTK").unwrap_or_default()
                ),
            );
            continue;
        }
        let Some(image) = ctx.require(&row, "Upgraded", "UpgradedImages") else {
            continue;
        };
        let file = ctx.doc.create_child(image, "UpgradeFile");
        copy(ctx, file, &row, "FTK", "File");
        set_yes(ctx, file, "Ignore");
    }
}

fn decompile_target_files_optional_data_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let Some(image) = ctx.require(&row, "Target", "TargetImages") else {
            continue;
        };
        let file = ctx.doc.create_child(image, "TargetFile");
        copy(ctx, file, &row, "FTK", "Id");
        add_ignore_ranges(ctx, file, &row);
        ctx.index.insert_row(&row, file);
    }
}

fn decompile_external_files_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let Some(family) = ctx.require(&row, "Family", "ImageFamilies") else {
            continue;
        };
        let file = ctx.doc.create_child(family, "ExternalFile");
        copy(ctx, file, &row, "FTK", "File");
        copy(ctx, file, &row, "FilePath", "Source");
        copy(ctx, file, &row, "Order", "Order");
        add_ignore_ranges(ctx, file, &row);
        ctx.index.insert_row(&row, file);
    }
}

const SUPERSEDE: i64 = 0x1;

fn decompile_patch_sequence_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let sequence = ctx.add_to_package("PatchSequence");
        copy(ctx, sequence, &row, "PatchFamily", "PatchFamily");

        if let Some(target) = row.str("Target") {
            let attribute = if target.starts_with('{') { "ProductCode" } else { "TargetImage" };
            ctx.doc.set_attribute(sequence, attribute, target);
        }
        copy(ctx, sequence, &row, "Sequence", "Sequence");
        if row.int("Supersede").unwrap_or(0) & SUPERSEDE != 0 {
            set_yes(ctx, sequence, "Supersede");
        }
        ctx.index.insert_row(&row, sequence);
    }
}

fn decompile_patch_metadata_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let property = ctx.add_to_package("PatchProperty");
        copy(ctx, property, &row, "Company", "Company");
        copy(ctx, property, &row, "Property", "Name");
        copy(ctx, property, &row, "Value", "Value");
    }
}

/// Properties that become attributes of the PatchCreation element
fn patch_creation_attribute(name: &str) -> Option<&'static str> {
    match name {
        "PatchGUID" => Some("Id"),
        "AllowProductCodeMismatches" => Some("AllowProductCodeMismatches"),
        "AllowProductVersionMajorMismatches" => Some("AllowMajorVersionMismatches"),
        "ApiPatchingSymbolFlags" => Some("SymbolFlags"),
        "IncludeWholeFilesOnly" => Some("WholeFilesOnly"),
        "PatchOutputPath" => Some("OutputPath"),
        "PatchSourceList" => Some("SourceList"),
        _ => None,
    }
}

fn is_boolean_property(name: &str) -> bool {
    matches!(
        name,
        "AllowProductCodeMismatches" | "AllowProductVersionMajorMismatches" | "IncludeWholeFilesOnly"
    )
}

fn decompile_properties_table(ctx: &mut Context<'_>, table: &Table) {
    let root = ctx.package();
    for row in table.views() {
        let Some(name) = row.str("Name") else {
            continue;
        };
        let value = row.str("Value").unwrap_or_default();

        match patch_creation_attribute(name) {
            Some(attribute) if is_boolean_property(name) => {
                let flag = if value == "1" { "yes" } else { "no" };
                ctx.doc.set_attribute(root, attribute, flag);
            }
            Some(attribute) => ctx.doc.set_attribute(root, attribute, value),
            None => {
                let property = ctx.add_to_package("PatchProperty");
                ctx.doc.set_attribute(property, "Name", name);
                ctx.doc.set_attribute(property, "Value", value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecompileOptions;
    use crate::schema::standard_definition;
    use crate::types::{CellValue, Database, OutputKind};

    fn patch_options() -> DecompileOptions {
        DecompileOptions {
            output_kind: OutputKind::PatchCreation,
            ..Default::default()
        }
    }

    #[test]
    fn test_image_hierarchy() {
        let mut families = Table::new(standard_definition("ImageFamilies").unwrap());
        families.add_row(vec![
            "Fam".into(), "MNP".into(), 2.into(), 1000.into(), CellValue::Null, CellValue::Null,
        ]);
        let mut upgraded = Table::new(standard_definition("UpgradedImages").unwrap());
        upgraded.add_row(vec![
            "New".into(), "new\\app.msi".into(), CellValue::Null, CellValue::Null, "Fam".into(),
        ]);
        let mut targets = Table::new(standard_definition("TargetImages").unwrap());
        targets.add_row(vec![
            "Old".into(), "old\\app.msi".into(), CellValue::Null, "New".into(), 1.into(),
            "0x00000922".into(), 1.into(),
        ]);
        let mut target_files = Table::new(standard_definition("TargetFiles_OptionalData").unwrap());
        target_files.add_row(vec![
            "Old".into(), "app.exe".into(), CellValue::Null, "10,40".into(), "4,8".into(), CellValue::Null,
        ]);

        let db = Database::new();
        let options = patch_options();
        let mut ctx = Context::new(&db, &options);
        decompile_image_families_table(&mut ctx, &families);
        decompile_upgraded_images_table(&mut ctx, &upgraded);
        decompile_target_images_table(&mut ctx, &targets);
        decompile_target_files_optional_data_table(&mut ctx, &target_files);

        let family = ctx.index.get("ImageFamilies", "Fam").unwrap();
        let image = ctx.index.get("UpgradedImages", "New").unwrap();
        let target = ctx.index.get("TargetImages", "Old").unwrap();
        assert_eq!(ctx.doc.parent(image), Some(family));
        assert_eq!(ctx.doc.parent(target), Some(image));
        assert_eq!(ctx.doc.attribute(target, "IgnoreMissingFiles"), Some("yes"));

        let file = ctx.index.get("TargetFiles_OptionalData", "Old/app.exe").unwrap();
        let ranges = ctx.doc.children(file).to_vec();
        assert_eq!(ranges.len(), 2);
        assert_eq!(ctx.doc.attribute(ranges[1], "Offset"), Some("40"));
        assert_eq!(ctx.doc.attribute(ranges[1], "Length"), Some("8"));
    }

    #[test]
    fn test_ignore_everywhere_is_unrepresentable() {
        let mut table = Table::new(standard_definition("UpgradedFilesToIgnore").unwrap());
        table.add_row(vec!["*".into(), "debug.log".into()]);

        let db = Database::new();
        let options = patch_options();
        let mut ctx = Context::new(&db, &options);
        decompile_upgraded_files_to_ignore_table(&mut ctx, &table);

        assert_eq!(ctx.messages.len(), 1);
        assert_eq!(ctx.messages.entries()[0].code, MessageCode::UnrepresentableColumnValue);
    }

    #[test]
    fn test_properties_split_between_root_and_patch_properties() {
        let mut table = Table::new(standard_definition("Properties").unwrap());
        table.add_row(vec!["PatchGUID".into(), "{AAAAAAAA-0000-0000-0000-000000000000}".into()]);
        table.add_row(vec!["IncludeWholeFilesOnly".into(), "1".into()]);
        table.add_row(vec!["MinimumRequiredMsiVersion".into(), "200".into()]);

        let db = Database::new();
        let options = patch_options();
        let mut ctx = Context::new(&db, &options);
        decompile_properties_table(&mut ctx, &table);

        let root = ctx.package();
        assert_eq!(ctx.doc.attribute(root, "Id"), Some("{AAAAAAAA-0000-0000-0000-000000000000}"));
        assert_eq!(ctx.doc.attribute(root, "WholeFilesOnly"), Some("yes"));
        let properties = ctx.doc.children(root).to_vec();
        assert_eq!(properties.len(), 1);
        assert_eq!(ctx.doc.attribute(properties[0], "Name"), Some("MinimumRequiredMsiVersion"));
    }
}
