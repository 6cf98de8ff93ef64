use crate::decompiler::context::Context;
use crate::decompiler::decoders::PROPERTY_LISTS;
use crate::decompiler::standard::{DOWNGRADE_DETECTED, UPGRADE_DETECTED};

/// Turn the semicolon-delimited property lists into flags on each property
pub(super) fn finalize_property_lists(ctx: &mut Context<'_>) {
    let db = ctx.db;

    for &(list, attribute) in PROPERTY_LISTS {
        let Some(row) = db.find_row("Property", list) else {
            continue;
        };
        let Some(value) = row.str("Value") else {
            continue;
        };

        for name in value.split(';').map(str::trim).filter(|name| !name.is_empty()) {
            if name == UPGRADE_DETECTED || name == DOWNGRADE_DETECTED {
                continue;
            }
            let property = ctx.ensure_property(name);
            ctx.doc.set_attribute(property, attribute, "yes");
        }
    }
}
