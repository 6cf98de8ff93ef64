use crate::decompiler::context::Context;

/// Move CheckBox values onto the check box controls bound to the same property
pub(super) fn finalize_check_box_table(ctx: &mut Context<'_>) {
    let db = ctx.db;
    let controls = db.rows("Control");

    for row in db.rows("CheckBox") {
        let Some(property) = row.str("Property") else {
            continue;
        };

        let mut found = false;
        for control_row in controls
            .iter()
            .filter(|c| c.str("Type") == Some("CheckBox") && c.str("Property") == Some(property))
        {
            let Some(control) = ctx.index.get_row(control_row) else {
                continue;
            };
            found = true;
            ctx.doc.set_optional(control, "CheckBoxValue", row.str("Value"));
        }

        if !found {
            ctx.expected_foreign_row(&row, "Property", property, "Control");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecompileOptions;
    use crate::messages::MessageCode;
    use crate::schema::standard_definition;
    use crate::types::{CellValue, Database, Table};

    fn database() -> Database {
        let mut controls = Table::new(standard_definition("Control").unwrap());
        controls.add_row(vec![
            "Options".into(), "Shortcut".into(), "CheckBox".into(), 20.into(), 60.into(),
            200.into(), 17.into(), 3.into(), "CREATESHORTCUT".into(), "Create a shortcut".into(),
            CellValue::Null, CellValue::Null,
        ]);
        let mut check_boxes = Table::new(standard_definition("CheckBox").unwrap());
        check_boxes.add_row(vec!["CREATESHORTCUT".into(), "1".into()]);
        check_boxes.add_row(vec!["ORPHAN".into(), "1".into()]);

        let mut db = Database::new();
        db.add_table(controls);
        db.add_table(check_boxes);
        db
    }

    #[test]
    fn test_value_lands_on_matching_control() {
        let db = database();
        let options = DecompileOptions::default();
        let mut ctx = Context::new(&db, &options);
        let control = ctx.doc.create("Control");
        ctx.index.insert("Control", "Options/Shortcut", control);

        finalize_check_box_table(&mut ctx);

        assert_eq!(ctx.doc.attribute(control, "CheckBoxValue"), Some("1"));
        assert_eq!(ctx.messages.len(), 1);
        let entry = &ctx.messages.entries()[0];
        assert_eq!(entry.code, MessageCode::ExpectedForeignRow);
        assert_eq!(entry.value.as_deref(), Some("ORPHAN"));
    }
}
