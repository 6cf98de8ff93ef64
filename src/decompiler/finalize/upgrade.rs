use crate::attributes::UpgradeAttributes;
use crate::decompiler::context::Context;
use crate::decompiler::standard::{DOWNGRADE_CONDITION, DOWNGRADE_DETECTED, UPGRADE_DETECTED};

/// Standard actions RemoveExistingProducts can follow, in execution order
const SCHEDULE_ANCHORS: &[(&str, &str)] = &[
    ("InstallValidate", "afterInstallValidate"),
    ("InstallInitialize", "afterInstallInitialize"),
    ("InstallExecute", "afterInstallExecute"),
    ("InstallExecuteAgain", "afterInstallExecuteAgain"),
    ("InstallFinalize", "afterInstallFinalize"),
];

const DEFAULT_SCHEDULE: &str = "afterInstallFinalize";

/// Collapse the rows written for a major upgrade back into `MajorUpgrade`.
///
/// Runs before sequencing so RemoveExistingProducts can be dropped from
/// InstallExecuteSequence in favour of the Schedule attribute.
pub(super) fn finalize_upgrade_table(ctx: &mut Context<'_>) {
    let db = ctx.db;
    let upgrades = db.rows("Upgrade");

    let Some(upgrade) = upgrades
        .iter()
        .find(|row| row.str("ActionProperty") == Some(UPGRADE_DETECTED))
    else {
        return;
    };
    let has_downgrade_row = upgrades
        .iter()
        .any(|row| row.str("ActionProperty") == Some(DOWNGRADE_DETECTED));

    let major_upgrade = ctx.add_to_package("MajorUpgrade");

    let bits = UpgradeAttributes::from_bits_truncate(upgrade.int("Attributes").unwrap_or(0) as u32);
    if bits.contains(UpgradeAttributes::VERSION_MAX_INCLUSIVE) {
        ctx.doc.set_attribute(major_upgrade, "AllowSameVersionUpgrades", "yes");
    }
    if !bits.contains(UpgradeAttributes::MIGRATE_FEATURES) {
        ctx.doc.set_attribute(major_upgrade, "MigrateFeatures", "no");
    }
    if bits.contains(UpgradeAttributes::IGNORE_REMOVE_FAILURE) {
        ctx.doc.set_attribute(major_upgrade, "IgnoreRemoveFailure", "yes");
    }
    ctx.doc.set_optional(major_upgrade, "RemoveFeatures", upgrade.str("Remove"));

    if has_downgrade_row {
        let message = db
            .rows("LaunchCondition")
            .into_iter()
            .find(|row| row.str("Condition") == Some(DOWNGRADE_CONDITION))
            .and_then(|row| row.str("Description"));
        ctx.doc.set_optional(major_upgrade, "DowngradeErrorMessage", message);
    } else {
        ctx.doc.set_attribute(major_upgrade, "AllowDowngrades", "yes");
    }

    let sequence_of = |action: &str| {
        db.find_row("InstallExecuteSequence", action)
            .and_then(|row| row.int("Sequence"))
    };
    let schedule = match sequence_of("RemoveExistingProducts") {
        Some(remove) => SCHEDULE_ANCHORS
            .iter()
            .filter_map(|&(anchor, schedule)| Some((sequence_of(anchor)?, schedule)))
            .filter(|&(sequence, _)| sequence < remove)
            .max_by_key(|&(sequence, _)| sequence)
            .map_or(DEFAULT_SCHEDULE, |(_, schedule)| schedule),
        None => DEFAULT_SCHEDULE,
    };
    ctx.doc.set_attribute(major_upgrade, "Schedule", schedule);

    ctx.suppressed_actions.insert((
        "InstallExecuteSequence".to_string(),
        "RemoveExistingProducts".to_string(),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecompileOptions;
    use crate::schema::standard_definition;
    use crate::types::{CellValue, Database, Table};

    const CODE: &str = "{AAAAAAAA-BBBB-CCCC-DDDD-EEEEEEEEEEEE}";

    fn database(with_downgrade: bool) -> Database {
        let mut upgrades = Table::new(standard_definition("Upgrade").unwrap());
        upgrades.add_row(vec![
            CODE.into(), CellValue::Null, "2.0.0".into(), CellValue::Null, (0x1 | 0x200).into(),
            CellValue::Null, UPGRADE_DETECTED.into(),
        ]);
        if with_downgrade {
            upgrades.add_row(vec![
                CODE.into(), "2.0.0".into(), CellValue::Null, CellValue::Null, 0x2.into(),
                CellValue::Null, DOWNGRADE_DETECTED.into(),
            ]);
        }
        let mut conditions = Table::new(standard_definition("LaunchCondition").unwrap());
        conditions.add_row(vec![DOWNGRADE_CONDITION.into(), "A newer version is installed.".into()]);
        let mut sequence = Table::new(standard_definition("InstallExecuteSequence").unwrap());
        for (action, seq) in [("InstallValidate", 1400), ("RemoveExistingProducts", 1401), ("InstallInitialize", 1500)] {
            sequence.add_row(vec![action.into(), CellValue::Null, seq.into()]);
        }

        let mut db = Database::new();
        db.add_table(upgrades);
        db.add_table(conditions);
        db.add_table(sequence);
        db
    }

    #[test]
    fn test_major_upgrade_with_downgrade_message() {
        let db = database(true);
        let options = DecompileOptions::default();
        let mut ctx = Context::new(&db, &options);

        finalize_upgrade_table(&mut ctx);

        let major = ctx.doc.find_child(ctx.package(), "MajorUpgrade").unwrap();
        assert_eq!(ctx.doc.attribute(major, "AllowSameVersionUpgrades"), Some("yes"));
        assert_eq!(ctx.doc.attribute(major, "MigrateFeatures"), None);
        assert_eq!(
            ctx.doc.attribute(major, "DowngradeErrorMessage"),
            Some("A newer version is installed.")
        );
        assert_eq!(ctx.doc.attribute(major, "AllowDowngrades"), None);
        assert_eq!(ctx.doc.attribute(major, "Schedule"), Some("afterInstallValidate"));
        assert!(ctx
            .suppressed_actions
            .contains(&("InstallExecuteSequence".to_string(), "RemoveExistingProducts".to_string())));
    }

    #[test]
    fn test_missing_downgrade_row_allows_downgrades() {
        let db = database(false);
        let options = DecompileOptions::default();
        let mut ctx = Context::new(&db, &options);

        finalize_upgrade_table(&mut ctx);

        let major = ctx.doc.find_child(ctx.package(), "MajorUpgrade").unwrap();
        assert_eq!(ctx.doc.attribute(major, "AllowDowngrades"), Some("yes"));
        assert_eq!(ctx.doc.attribute(major, "DowngradeErrorMessage"), None);
    }

    #[test]
    fn test_no_sentinel_rows_no_element() {
        let db = Database::new();
        let options = DecompileOptions::default();
        let mut ctx = Context::new(&db, &options);

        finalize_upgrade_table(&mut ctx);

        assert!(ctx.doc.find_child(ctx.package(), "MajorUpgrade").is_none());
        assert!(ctx.suppressed_actions.is_empty());
    }
}
