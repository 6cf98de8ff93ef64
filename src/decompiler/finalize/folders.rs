//! Folder columns that name either a directory or a property

use crate::decompiler::context::Context;
use crate::types::Database;
use std::collections::HashSet;

fn directory_ids(db: &Database) -> HashSet<&str> {
    db.rows("Directory")
        .into_iter()
        .filter_map(|row| row.str("Directory"))
        .collect()
}

/// Set `{prefix}Directory` or `{prefix}Property` for each folder column
fn finalize_folder_columns(ctx: &mut Context<'_>, table: &str, columns: &[(&str, &str)]) {
    let db = ctx.db;
    let directories = directory_ids(db);

    for row in db.rows(table) {
        let Some(element) = ctx.index.get_row(&row) else {
            continue;
        };
        for &(column, prefix) in columns {
            let Some(folder) = row.str(column) else {
                continue;
            };
            let suffix = if directories.contains(folder) { "Directory" } else { "Property" };
            ctx.doc.set_attribute(element, &format!("{}{}", prefix, suffix), folder);
        }
    }
}

pub(super) fn finalize_duplicate_move_file_tables(ctx: &mut Context<'_>) {
    finalize_folder_columns(ctx, "DuplicateFile", &[("DestFolder", "Destination")]);
    finalize_folder_columns(
        ctx,
        "MoveFile",
        &[("SourceFolder", "Source"), ("DestFolder", "Destination")],
    );
}

pub(super) fn finalize_remove_file_table(ctx: &mut Context<'_>) {
    finalize_folder_columns(ctx, "RemoveFile", &[("DirProperty", "")]);
}
