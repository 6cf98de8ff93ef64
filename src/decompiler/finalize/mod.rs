//! Cross-table passes run after every table has been decoded
//!
//! A finalizer may read any table and any element produced so far. The
//! order below is fixed; the upgrade pass must run before sequencing.

mod checkbox;
mod component;
mod dialog;
mod family;
mod files;
mod folders;
mod lock;
mod progid;
mod property;
mod search;
mod sequence;
mod upgrade;

use super::context::Context;

type FinalizeFn = fn(&mut Context<'_>);

const FINALIZERS: &[(&str, FinalizeFn)] = &[
    ("CheckBox", checkbox::finalize_check_box_table),
    ("Component", component::finalize_component_table),
    ("Dialog", dialog::finalize_dialog_table),
    ("DuplicateFile/MoveFile", folders::finalize_duplicate_move_file_tables),
    ("FamilyFileRanges", family::finalize_family_file_ranges_table),
    ("File", files::finalize_file_table),
    ("LockPermissions", lock::finalize_lock_permissions_table),
    ("ProgId", progid::finalize_prog_id_table),
    ("Property lists", property::finalize_property_lists),
    ("RemoveFile", folders::finalize_remove_file_table),
    ("Search", search::finalize_search_tables),
    ("Upgrade", upgrade::finalize_upgrade_table),
    ("Sequence", sequence::finalize_sequence_tables),
];

pub(crate) fn run_all(ctx: &mut Context<'_>) {
    for (name, finalize) in FINALIZERS {
        log::debug!("Finalizing {}", name);
        finalize(ctx);
    }
}
