use crate::attributes::{permission_bits, table_mask, unknown_bits, BitTable, COMMON_PERMISSION_BITS};
use crate::decompiler::context::Context;
use crate::document::ElementId;
use crate::types::RowView;

/// Object a LockPermissions row secures, named by its Table column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LockTarget {
    CreateFolder,
    File,
    Registry,
    ServiceInstall,
}

impl LockTarget {
    fn parse(table: &str) -> Option<Self> {
        match table {
            "CreateFolder" => Some(LockTarget::CreateFolder),
            "File" => Some(LockTarget::File),
            "Registry" => Some(LockTarget::Registry),
            "ServiceInstall" => Some(LockTarget::ServiceInstall),
            _ => None,
        }
    }

    fn table(self) -> &'static str {
        match self {
            LockTarget::CreateFolder => "CreateFolder",
            LockTarget::File => "File",
            LockTarget::Registry => "Registry",
            LockTarget::ServiceInstall => "ServiceInstall",
        }
    }
}

/// Elements secured by `object`; a directory may be created by several components
fn lock_targets(ctx: &Context<'_>, target: LockTarget, object: &str) -> Vec<ElementId> {
    match target {
        LockTarget::CreateFolder => ctx
            .db
            .rows("CreateFolder")
            .iter()
            .filter(|row| row.str("Directory_") == Some(object))
            .filter_map(|row| ctx.index.get_row(row))
            .collect(),
        other => ctx.index.get(other.table(), object).into_iter().collect(),
    }
}

pub(super) fn finalize_lock_permissions_table(ctx: &mut Context<'_>) {
    let db = ctx.db;

    for row in db.rows("LockPermissions") {
        let Some(object) = row.str("LockObject") else {
            continue;
        };
        let table = row.str("Table").unwrap_or_default();
        let Some(target) = LockTarget::parse(table) else {
            ctx.illegal_value(&row, "Table", table);
            continue;
        };
        let Some(rights) = permission_bits(target.table()) else {
            continue;
        };

        let elements = lock_targets(ctx, target, object);
        if elements.is_empty() {
            ctx.expected_foreign_row(&row, "LockObject", object, target.table());
            continue;
        }

        let bits = row.int("Permission").unwrap_or(0);
        for element in elements {
            let permission = ctx.doc.create_child(element, "Permission");
            add_permission(ctx, permission, &row, bits, rights);
        }
        let known = table_mask(rights) | table_mask(COMMON_PERMISSION_BITS);
        ctx.unknown_bits(&row, "Permission", unknown_bits(bits, known));
    }
}

fn add_permission(ctx: &mut Context<'_>, permission: ElementId, row: &RowView<'_>, bits: i64, rights: BitTable) {
    ctx.doc.set_optional(permission, "Domain", row.str("Domain"));
    ctx.doc.set_optional(permission, "User", row.str("User"));
    for &(bit, name) in rights.iter().chain(COMMON_PERMISSION_BITS) {
        if bits & bit as i64 != 0 {
            ctx.doc.set_attribute(permission, name, "yes");
        }
    }
}
