use crate::decompiler::context::Context;
use crate::messages::MessageCode;
use crate::types::join_key;
use std::collections::HashSet;

/// Attach controls to their dialogs in tab order.
///
/// The tab order is a ring threaded through Control_Next starting at the
/// dialog's Control_First. Returning to the first control ends the walk; any
/// other revisit is a loop. Controls outside the ring follow in table order
/// with `TabSkip="yes"`.
pub(super) fn finalize_dialog_table(ctx: &mut Context<'_>) {
    let db = ctx.db;
    let controls = db.rows("Control");

    for dialog_row in db.rows("Dialog") {
        let Some(dialog) = ctx.index.get_row(&dialog_row) else {
            continue;
        };
        let Some(dialog_id) = dialog_row.str("Dialog") else {
            continue;
        };
        let dialog_controls: Vec<_> = controls
            .iter()
            .filter(|c| c.str("Dialog_") == Some(dialog_id))
            .collect();

        let mut visited: HashSet<&str> = HashSet::new();
        if let Some(first) = dialog_row.str("Control_First") {
            let mut current = Some(first);
            while let Some(name) = current {
                if !visited.insert(name) {
                    ctx.warn(
                        MessageCode::ControlTabOrderLoop,
                        &dialog_row,
                        format!("tab order of dialog '{}' loops back to control '{}'", dialog_id, name),
                    );
                    break;
                }
                let Some(control_row) = dialog_controls.iter().find(|c| c.str("Control") == Some(name)) else {
                    ctx.expected_foreign_row(&dialog_row, "Control_First", name, "Control");
                    break;
                };
                if let Some(control) = ctx.index.get_row(control_row) {
                    ctx.doc.add_child(dialog, control);
                }
                current = control_row.str("Control_Next").filter(|&next| next != first);
            }
        }

        for (column, attribute) in [("Control_Default", "Default"), ("Control_Cancel", "Cancel")] {
            let Some(name) = dialog_row.str(column) else {
                continue;
            };
            match ctx.index.get("Control", &join_key(&[dialog_id, name])) {
                Some(control) => ctx.doc.set_attribute(control, attribute, "yes"),
                None => ctx.expected_foreign_row(&dialog_row, column, name, "Control"),
            }
        }

        for control_row in &dialog_controls {
            if control_row.str("Control").is_some_and(|name| visited.contains(name)) {
                continue;
            }
            if let Some(control) = ctx.index.get_row(control_row) {
                ctx.doc.set_attribute(control, "TabSkip", "yes");
                ctx.doc.add_child(dialog, control);
            }
        }
    }
}
