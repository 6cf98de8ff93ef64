//! Package-level tables: summary information, properties, media, features,
//! launch conditions and upgrades

use super::{copy, set_yes, DecodeFn};
use crate::attributes::{unknown_bits, FeatureAttributes, UpgradeAttributes};
use crate::decompiler::context::Context;
use crate::decompiler::standard::{DOWNGRADE_CONDITION, DOWNGRADE_DETECTED, UPGRADE_DETECTED};
use crate::types::{OutputKind, Table};
use std::collections::HashMap;

pub(super) fn register(map: &mut HashMap<&'static str, DecodeFn>) {
    map.insert("Binary", decompile_binary_table);
    map.insert("Condition", decompile_condition_table);
    map.insert("Feature", decompile_feature_table);
    map.insert("FeatureComponents", decompile_feature_components_table);
    map.insert("Icon", decompile_icon_table);
    map.insert("LaunchCondition", decompile_launch_condition_table);
    map.insert("Media", decompile_media_table);
    map.insert("Property", decompile_property_table);
    map.insert("Upgrade", decompile_upgrade_table);
}

/// Word count bits
const WORD_COUNT_SHORT_NAMES: i64 = 0x1;
const WORD_COUNT_COMPRESSED: i64 = 0x2;
const WORD_COUNT_NO_ELEVATION: i64 = 0x8;

pub(super) fn decompile_summary_information(ctx: &mut Context<'_>, table: &Table) {
    let package = ctx.package();
    let kind = ctx.output_kind();

    for row in table.views() {
        let Some(id) = row.int("PropertyId") else {
            ctx.illegal_value(&row, "PropertyId", row.text("PropertyId").unwrap_or_default());
            continue;
        };
        let Some(value) = row.text("Value") else {
            continue;
        };

        match id {
            1 => {
                let attribute = match kind {
                    OutputKind::Package => "SummaryCodepage",
                    _ => "Codepage",
                };
                ctx.doc.set_attribute(package, attribute, value);
            }
            3 if kind != OutputKind::PatchCreation => {
                ctx.doc.set_attribute(package, "Description", value)
            }
            4 if kind != OutputKind::PatchCreation => {
                ctx.doc.set_attribute(package, "Manufacturer", value)
            }
            5 => ctx.doc.set_attribute(package, "Keywords", value),
            6 => ctx.doc.set_attribute(package, "Comments", value),
            7 => {
                let (platform, languages) = value.split_once(';').unwrap_or((value.as_str(), ""));
                if let Some(platform) = platform_name(platform) {
                    ctx.doc.set_attribute(package, "Platform", platform);
                } else if !platform.is_empty() {
                    ctx.illegal_value(&row, "Value", &value);
                }
                if kind == OutputKind::Module && !languages.is_empty() {
                    ctx.doc.set_attribute(package, "Language", languages);
                }
            }
            9 if kind == OutputKind::Module => {
                ctx.doc.set_attribute(package, "Guid", value.trim_matches(&['{', '}'][..]))
            }
            14 if kind != OutputKind::PatchCreation => {
                ctx.doc.set_attribute(package, "InstallerVersion", value)
            }
            15 => {
                let Some(bits) = row.int("Value") else {
                    ctx.illegal_value(&row, "Value", &value);
                    continue;
                };
                ctx.short_names = bits & WORD_COUNT_SHORT_NAMES != 0;
                ctx.compressed = bits & WORD_COUNT_COMPRESSED != 0;
                if kind == OutputKind::Package {
                    if ctx.short_names {
                        set_yes(ctx, package, "ShortNames");
                    }
                    if ctx.compressed {
                        set_yes(ctx, package, "Compressed");
                    }
                    if bits & WORD_COUNT_NO_ELEVATION != 0 {
                        ctx.doc.set_attribute(package, "Scope", "perUser");
                    }
                }
            }
            19 => match row.int("Value") {
                Some(0) => ctx.doc.set_attribute(package, "ReadOnly", "no"),
                Some(2) => ctx.doc.set_attribute(package, "ReadOnly", "yes"),
                Some(4) => ctx.doc.set_attribute(package, "ReadOnly", "enforced"),
                _ => ctx.illegal_value(&row, "Value", &value),
            },
            _ => log::debug!("summary property {} not decompiled", id),
        }
    }
}

fn platform_name(template: &str) -> Option<&'static str> {
    match template {
        "Intel" => Some("x86"),
        "x64" | "AMD64" => Some("x64"),
        "Arm64" => Some("arm64"),
        "Intel64" => Some("ia64"),
        _ => None,
    }
}

/// Properties that become attributes of the package element
fn package_attribute(property: &str) -> Option<&'static str> {
    match property {
        "Manufacturer" => Some("Manufacturer"),
        "ProductCode" => Some("ProductCode"),
        "ProductLanguage" => Some("Language"),
        "ProductName" => Some("Name"),
        "ProductVersion" => Some("Version"),
        "UpgradeCode" => Some("UpgradeCode"),
        _ => None,
    }
}

/// Properties holding lists applied to other properties during finalization
pub(crate) const PROPERTY_LISTS: &[(&str, &str)] = &[
    ("AdminProperties", "Admin"),
    ("MsiHiddenProperties", "Hidden"),
    ("SecureCustomProperties", "Secure"),
];

fn decompile_property_table(ctx: &mut Context<'_>, table: &Table) {
    let package = ctx.package();
    let is_package = ctx.output_kind() == OutputKind::Package;

    for row in table.views() {
        let Some(id) = row.str("Property") else {
            continue;
        };
        if PROPERTY_LISTS.iter().any(|(name, _)| *name == id) {
            continue;
        }

        if is_package {
            if let Some(attribute) = package_attribute(id) {
                copy(ctx, package, &row, "Value", attribute);
                continue;
            }
        }

        let property = ctx.ensure_property(id);
        copy(ctx, property, &row, "Value", "Value");
        ctx.index.insert_row(&row, property);
    }
}

fn decompile_media_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let media = ctx.add_to_package("Media");
        copy(ctx, media, &row, "DiskId", "Id");

        if let Some(cabinet) = row.str("Cabinet") {
            match cabinet.strip_prefix('#') {
                Some(embedded) => {
                    ctx.doc.set_attribute(media, "Cabinet", embedded);
                    set_yes(ctx, media, "EmbedCab");
                }
                None => ctx.doc.set_attribute(media, "Cabinet", cabinet),
            }
        }
        copy(ctx, media, &row, "DiskPrompt", "DiskPrompt");
        copy(ctx, media, &row, "VolumeLabel", "VolumeLabel");
        copy(ctx, media, &row, "Source", "Source");

        ctx.index.insert_row(&row, media);
    }
}

fn decompile_feature_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let feature = ctx.doc.create("Feature");
        copy(ctx, feature, &row, "Feature", "Id");
        copy(ctx, feature, &row, "Title", "Title");
        copy(ctx, feature, &row, "Description", "Description");

        if let Some(display) = row.int("Display") {
            if display == 0 {
                ctx.doc.set_attribute(feature, "Display", "hidden");
            } else if display % 2 == 1 {
                ctx.doc.set_attribute(feature, "Display", "expand");
            }
        }
        copy(ctx, feature, &row, "Level", "Level");
        copy(ctx, feature, &row, "Directory_", "ConfigurableDirectory");

        let bits = row.int("Attributes").unwrap_or(0);
        let attributes = FeatureAttributes::from_bits_truncate(bits as u32);

        if attributes.contains(FeatureAttributes::FAVOR_SOURCE | FeatureAttributes::FOLLOW_PARENT) {
            ctx.illegal_value(&row, "Attributes", bits);
        } else if attributes.contains(FeatureAttributes::FAVOR_SOURCE) {
            ctx.doc.set_attribute(feature, "InstallDefault", "source");
        } else if attributes.contains(FeatureAttributes::FOLLOW_PARENT) {
            ctx.doc.set_attribute(feature, "InstallDefault", "followParent");
        }

        if attributes.contains(FeatureAttributes::FAVOR_ADVERTISE) {
            ctx.doc.set_attribute(feature, "TypicalDefault", "advertise");
        }

        if attributes.contains(
            FeatureAttributes::DISALLOW_ADVERTISE | FeatureAttributes::NO_UNSUPPORTED_ADVERTISE,
        ) {
            ctx.illegal_value(&row, "Attributes", bits);
        } else if attributes.contains(FeatureAttributes::DISALLOW_ADVERTISE) {
            ctx.doc.set_attribute(feature, "AllowAdvertise", "no");
        } else if attributes.contains(FeatureAttributes::NO_UNSUPPORTED_ADVERTISE) {
            ctx.doc.set_attribute(feature, "AllowAdvertise", "system");
        }

        if attributes.contains(FeatureAttributes::UI_DISALLOW_ABSENT) {
            ctx.doc.set_attribute(feature, "AllowAbsent", "no");
        }

        ctx.unknown_bits(&row, "Attributes", unknown_bits(bits, FeatureAttributes::all().bits()));
        ctx.index.insert_row(&row, feature);
    }

    // parents may appear after their children
    for row in table.views() {
        let Some(feature) = ctx.index.get_row(&row) else {
            continue;
        };
        match row.str("Feature_Parent") {
            Some(_) => {
                if let Some(parent) = ctx.require(&row, "Feature_Parent", "Feature") {
                    ctx.doc.add_child(parent, feature);
                }
            }
            None => {
                let package = ctx.package();
                ctx.doc.add_child(package, feature);
            }
        }
    }
}

fn decompile_feature_components_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let Some(feature) = ctx.require(&row, "Feature_", "Feature") else {
            continue;
        };
        let component_ref = ctx.doc.create_child(feature, "ComponentRef");
        copy(ctx, component_ref, &row, "Component_", "Id");
        ctx.index.insert_row(&row, component_ref);
    }
}

fn decompile_condition_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let Some(feature) = ctx.require(&row, "Feature_", "Feature") else {
            continue;
        };
        let level = ctx.doc.create_child(feature, "Level");
        copy(ctx, level, &row, "Level", "Value");
        copy(ctx, level, &row, "Condition", "Condition");
    }
}

fn decompile_launch_condition_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        if row.str("Condition") == Some(DOWNGRADE_CONDITION) {
            continue;
        }
        let launch = ctx.add_to_package("Launch");
        copy(ctx, launch, &row, "Condition", "Condition");
        copy(ctx, launch, &row, "Description", "Message");
        ctx.index.insert_row(&row, launch);
    }
}

fn decompile_upgrade_table(ctx: &mut Context<'_>, table: &Table) {
    for row in table.views() {
        let Some(code) = row.str("UpgradeCode") else {
            continue;
        };
        let property = row.str("ActionProperty");
        if property == Some(UPGRADE_DETECTED) || property == Some(DOWNGRADE_DETECTED) {
            continue;
        }

        let upgrade = match ctx.index.get("Upgrade", code) {
            Some(upgrade) => upgrade,
            None => {
                let upgrade = ctx.add_to_package("Upgrade");
                ctx.doc.set_attribute(upgrade, "Id", code);
                ctx.index.insert("Upgrade", code, upgrade);
                upgrade
            }
        };

        let version = ctx.doc.create_child(upgrade, "UpgradeVersion");
        let bits = row.int("Attributes").unwrap_or(0);
        let attributes = UpgradeAttributes::from_bits_truncate(bits as u32);

        if row.str("VersionMin").is_some() {
            copy(ctx, version, &row, "VersionMin", "Minimum");
            let inclusive = attributes.contains(UpgradeAttributes::VERSION_MIN_INCLUSIVE);
            ctx.doc
                .set_attribute(version, "IncludeMinimum", if inclusive { "yes" } else { "no" });
        }
        if row.str("VersionMax").is_some() {
            copy(ctx, version, &row, "VersionMax", "Maximum");
            if attributes.contains(UpgradeAttributes::VERSION_MAX_INCLUSIVE) {
                set_yes(ctx, version, "IncludeMaximum");
            }
        }
        copy(ctx, version, &row, "Language", "Language");
        if attributes.contains(UpgradeAttributes::LANGUAGES_EXCLUSIVE) {
            set_yes(ctx, version, "ExcludeLanguages");
        }
        if attributes.contains(UpgradeAttributes::MIGRATE_FEATURES) {
            set_yes(ctx, version, "MigrateFeatures");
        }
        if attributes.contains(UpgradeAttributes::ONLY_DETECT) {
            set_yes(ctx, version, "OnlyDetect");
        }
        if attributes.contains(UpgradeAttributes::IGNORE_REMOVE_FAILURE) {
            set_yes(ctx, version, "IgnoreRemoveFailure");
        }
        copy(ctx, version, &row, "Remove", "RemoveFeatures");
        copy(ctx, version, &row, "ActionProperty", "Property");

        ctx.unknown_bits(&row, "Attributes", unknown_bits(bits, UpgradeAttributes::all().bits()));
        ctx.index.insert_row(&row, version);
    }
}

fn decompile_binary_table(ctx: &mut Context<'_>, table: &Table) {
    decompile_stream_table(ctx, table, "Binary");
}

fn decompile_icon_table(ctx: &mut Context<'_>, table: &Table) {
    decompile_stream_table(ctx, table, "Icon");
}

fn decompile_stream_table(ctx: &mut Context<'_>, table: &Table, element_name: &str) {
    for row in table.views() {
        let Some(id) = row.str("Name") else {
            continue;
        };
        let element = ctx.add_to_package(element_name);
        ctx.doc.set_attribute(element, "Id", id);
        let source = ctx.export_path(element_name, id);
        ctx.doc.set_attribute(element, "SourceFile", source);
        ctx.index.insert_row(&row, element);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecompileOptions;
    use crate::schema::standard_definition;
    use crate::types::{CellValue, Database};

    fn feature_table(attributes: i32) -> Table {
        let mut table = Table::new(standard_definition("Feature").unwrap());
        table.add_row(vec![
            "Main".into(),
            CellValue::Null,
            "Main".into(),
            CellValue::Null,
            1.into(),
            1.into(),
            CellValue::Null,
            attributes.into(),
        ]);
        table
    }

    fn feature_attributes(attributes: i32) -> (Vec<(String, String)>, usize) {
        let db = Database::new();
        let options = DecompileOptions::default();
        let mut ctx = Context::new(&db, &options);
        let table = feature_table(attributes);
        decompile_feature_table(&mut ctx, &table);

        let feature = ctx.index.get("Feature", "Main").unwrap();
        let attrs = ctx
            .doc
            .attributes(feature)
            .iter()
            .filter(|(k, _)| !matches!(k.as_str(), "Id" | "Title" | "Display" | "Level"))
            .cloned()
            .collect();
        (attrs, ctx.messages.len())
    }

    #[test]
    fn test_feature_single_bits() {
        let cases = [
            (0x01, "InstallDefault", "source"),
            (0x02, "InstallDefault", "followParent"),
            (0x04, "TypicalDefault", "advertise"),
            (0x08, "AllowAdvertise", "no"),
            (0x10, "AllowAbsent", "no"),
            (0x20, "AllowAdvertise", "system"),
        ];
        for (bit, name, value) in cases {
            let (attrs, warnings) = feature_attributes(bit);
            assert_eq!(attrs, vec![(name.to_string(), value.to_string())], "bit 0x{:x}", bit);
            assert_eq!(warnings, 0);
        }
        assert!(feature_attributes(0).0.is_empty());
    }

    #[test]
    fn test_feature_conflicting_bits_warn() {
        let (attrs, warnings) = feature_attributes(0x03);
        assert!(attrs.is_empty());
        assert_eq!(warnings, 1);

        let (_, warnings) = feature_attributes(0x100);
        assert_eq!(warnings, 1);
    }

    #[test]
    fn test_features_nest_under_later_parents() {
        let mut table = Table::new(standard_definition("Feature").unwrap());
        table.add_row(vec![
            "Child".into(), "Parent".into(), CellValue::Null, CellValue::Null,
            2.into(), 1.into(), CellValue::Null, 0.into(),
        ]);
        table.add_row(vec![
            "Parent".into(), CellValue::Null, CellValue::Null, CellValue::Null,
            2.into(), 1.into(), CellValue::Null, 0.into(),
        ]);

        let db = Database::new();
        let options = DecompileOptions::default();
        let mut ctx = Context::new(&db, &options);
        decompile_feature_table(&mut ctx, &table);

        let parent = ctx.index.get("Feature", "Parent").unwrap();
        let child = ctx.index.get("Feature", "Child").unwrap();
        assert_eq!(ctx.doc.parent(child), Some(parent));
        assert_eq!(ctx.doc.parent(parent), Some(ctx.package()));
    }

    #[test]
    fn test_summary_word_count() {
        let mut table = Table::new(standard_definition("_SummaryInformation").unwrap());
        table.add_row(vec![15.into(), "3".into()]);
        table.add_row(vec![7.into(), "x64;1033".into()]);

        let db = Database::new();
        let options = DecompileOptions::default();
        let mut ctx = Context::new(&db, &options);
        decompile_summary_information(&mut ctx, &table);

        let package = ctx.package();
        assert!(ctx.short_names);
        assert!(ctx.compressed);
        assert_eq!(ctx.doc.attribute(package, "Compressed"), Some("yes"));
        assert_eq!(ctx.doc.attribute(package, "Platform"), Some("x64"));
    }
}
