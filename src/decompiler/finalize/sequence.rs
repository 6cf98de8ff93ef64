use crate::decompiler::context::Context;
use crate::decompiler::standard::{default_action, is_standard_action, DefaultAction};
use crate::schema::{MODULE_SEQUENCE_TABLES, SEQUENCE_TABLES};
use crate::types::RowView;

/// One row of a package sequence table
#[derive(Debug, Clone, Copy)]
struct ActionRow<'a> {
    action: &'a str,
    condition: Option<&'a str>,
    sequence: i64,
    default: Option<DefaultAction>,
}

impl ActionRow<'_> {
    /// Standard action with the condition it ships with
    fn has_default_condition(&self) -> bool {
        self.default
            .is_some_and(|default| default.condition == self.condition)
    }

    /// Rows whose scheduling has to be written out relative to their neighbours
    fn needs_scheduling(&self) -> bool {
        self.action == "AppSearch" || !self.has_default_condition()
    }

    fn at_default_sequence(&self) -> bool {
        self.default
            .is_some_and(|default| default.sequence == self.sequence)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Schedule<'a> {
    /// Matches the built-in scheduling; nothing to write
    Suppressed,
    Sequence(i64),
    Before(&'a str),
    After(&'a str),
    Unsequenced,
    OnExit(&'static str),
}

fn on_exit(sequence: i64) -> Option<&'static str> {
    match sequence {
        -1 => Some("success"),
        -2 => Some("cancel"),
        -3 => Some("error"),
        -4 => Some("suspend"),
        _ => None,
    }
}

/// Write every sequence table back as action elements
pub(super) fn finalize_sequence_tables(ctx: &mut Context<'_>) {
    let absolute = ctx.options.module_sequencing() || ctx.options.suppress_relative_sequencing;
    for &table in SEQUENCE_TABLES {
        finalize_package_sequence(ctx, table, absolute);
    }
    for &table in MODULE_SEQUENCE_TABLES {
        finalize_module_sequence(ctx, table);
    }
}

fn finalize_package_sequence(ctx: &mut Context<'_>, table: &str, force_absolute: bool) {
    let db = ctx.db;
    let views = db.rows(table);
    if views.is_empty() {
        return;
    }

    let mut rows: Vec<(ActionRow<'_>, &RowView<'_>)> = Vec::new();
    for view in &views {
        let Some(action) = view.str("Action") else {
            continue;
        };
        if ctx
            .suppressed_actions
            .contains(&(table.to_string(), action.to_string()))
        {
            continue;
        }
        let row = ActionRow {
            action,
            condition: view.str("Condition"),
            sequence: view.int("Sequence").unwrap_or(0),
            default: default_action(table, action),
        };
        rows.push((row, view));
    }
    rows.sort_by(|(a, _), (b, _)| (a.sequence, a.action).cmp(&(b.sequence, b.action)));

    let scheduled: Vec<ActionRow<'_>> = rows
        .iter()
        .map(|(row, _)| *row)
        .filter(|row| row.sequence > 0)
        .collect();
    let relative = if force_absolute {
        None
    } else {
        relative_schedule(&scheduled)
    };

    let mut position = 0;
    for (row, view) in &rows {
        let schedule = if row.sequence > 0 {
            let schedule = match &relative {
                Some(relative) => relative[position],
                None => Schedule::Sequence(row.sequence),
            };
            position += 1;
            schedule
        } else if row.sequence == 0 {
            Schedule::Unsequenced
        } else if let Some(state) = on_exit(row.sequence) {
            Schedule::OnExit(state)
        } else {
            ctx.illegal_value(view, "Sequence", row.sequence);
            Schedule::Unsequenced
        };

        if schedule != Schedule::Suppressed {
            add_action(ctx, table, table, row.action, row.condition, schedule);
        }
    }
}

/// Scheduling of rows sorted by sequence, or None when only literal
/// sequence numbers preserve the order
fn relative_schedule<'a>(rows: &[ActionRow<'a>]) -> Option<Vec<Schedule<'a>>> {
    let mut schedule = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let previous = i.checked_sub(1).map(|p| &rows[p]);
        let next = rows.get(i + 1);

        if !row.needs_scheduling() {
            schedule.push(if row.at_default_sequence() {
                Schedule::Suppressed
            } else {
                Schedule::Sequence(row.sequence)
            });
            continue;
        }

        let standard = row.default.is_some();
        let previous_before = i > 0 && schedule[i - 1] == Schedule::Before(row.action);
        let follows = |other, offset| at_offset(row, other, offset).is_some();
        let standard_at =
            |other, offset| at_offset(row, other, offset).filter(|other| other.default.is_some());

        if follows(previous, 0) || follows(next, 0) {
            return None;
        } else if let Some(next) = standard_at(next, 1) {
            schedule.push(Schedule::Before(next.action));
        } else if let Some(previous) = standard_at(previous, -1) {
            schedule.push(Schedule::After(previous.action));
        } else if !standard && follows(previous, -1) && !previous_before {
            schedule.push(Schedule::After(previous.map_or("", |p| p.action)));
        } else if !standard && previous.is_some() && follows(next, 1) {
            schedule.push(Schedule::Before(next.map_or("", |n| n.action)));
        } else if row.action == "AppSearch" && row.has_default_condition() && row.at_default_sequence() {
            schedule.push(Schedule::Suppressed);
        } else if standard && !row.has_default_condition() {
            schedule.push(Schedule::Unsequenced);
        } else if previous_before || (!follows(previous, -1) && !follows(next, 1)) {
            schedule.push(Schedule::Sequence(row.sequence));
        } else {
            return None;
        }
    }

    Some(schedule)
}

/// `other` when it sits exactly `offset` after `row`
fn at_offset<'r, 'a>(row: &ActionRow<'_>, other: Option<&'r ActionRow<'a>>, offset: i64) -> Option<&'r ActionRow<'a>> {
    other.filter(|other| other.sequence == row.sequence + offset)
}

/// Module sequence rows carry their own BaseAction/After scheduling
fn finalize_module_sequence(ctx: &mut Context<'_>, table: &str) {
    let db = ctx.db;
    let output = table.strip_prefix("Module").unwrap_or(table);

    for row in db.rows(table) {
        let Some(action) = row.str("Action") else {
            continue;
        };
        let condition = row.str("Condition");
        let sequence = row.int("Sequence");
        let base_action = row.str("BaseAction");

        let schedule = match base_action {
            Some(base) if row.int("After") == Some(1) => Schedule::After(base),
            Some(base) => Schedule::Before(base),
            None => {
                let is_default = default_action(table, action).is_some_and(|default| {
                    Some(default.sequence) == sequence && default.condition == condition
                });
                if is_default {
                    continue;
                }
                match sequence {
                    Some(sequence) if sequence > 0 => Schedule::Sequence(sequence),
                    Some(sequence) => on_exit(sequence).map_or(Schedule::Unsequenced, Schedule::OnExit),
                    None => Schedule::Unsequenced,
                }
            }
        };

        add_action(ctx, table, output, action, condition, schedule);
    }
}

fn add_action(
    ctx: &mut Context<'_>,
    table: &str,
    output: &str,
    action: &str,
    condition: Option<&str>,
    schedule: Schedule<'_>,
) {
    let sequence = ctx.sequence(output);
    let element = if is_standard_action(action) {
        ctx.doc.create_child(sequence, action)
    } else if ctx.db.find_row("Dialog", action).is_some() {
        let show = ctx.doc.create_child(sequence, "Show");
        ctx.doc.set_attribute(show, "Dialog", action);
        show
    } else {
        let custom = ctx.doc.create_child(sequence, "Custom");
        ctx.doc.set_attribute(custom, "Action", action);
        custom
    };

    match schedule {
        Schedule::Before(before) => ctx.doc.set_attribute(element, "Before", before),
        Schedule::After(after) => ctx.doc.set_attribute(element, "After", after),
        Schedule::Sequence(value) => ctx.doc.set_attribute(element, "Sequence", value.to_string()),
        Schedule::OnExit(state) => ctx.doc.set_attribute(element, "OnExit", state),
        Schedule::Unsequenced | Schedule::Suppressed => {}
    }
    ctx.doc.set_optional(element, "Condition", condition);
    ctx.index.insert(table, action, element);
}
