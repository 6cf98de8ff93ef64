use crate::decompiler::context::Context;
use crate::messages::MessageCode;
use std::collections::HashMap;

/// Place ProgId elements under the classes that use them.
///
/// A class's default ProgId goes under that class; only the first class may
/// claim a given ProgId. ProgIds left without a parent go under the first
/// class with their CLSID, then under the component of an extension that
/// names them.
pub(super) fn finalize_prog_id_table(ctx: &mut Context<'_>) {
    let db = ctx.db;
    let classes = db.rows("Class");
    let mut claims: HashMap<&str, String> = HashMap::new();

    for row in &classes {
        let Some(class) = ctx.index.get_row(row) else {
            continue;
        };
        let Some(prog_id_name) = row.str("ProgId_Default") else {
            continue;
        };
        let Some(prog_id) = ctx.index.get("ProgId", prog_id_name) else {
            ctx.expected_foreign_row(row, "ProgId_Default", prog_id_name, "ProgId");
            continue;
        };

        if let Some(first) = claims.get(prog_id_name) {
            let message = format!(
                "ProgId '{}' is the default of class '{}' and also of '{}'",
                prog_id_name,
                first,
                row.primary_key()
            );
            ctx.warn(MessageCode::TooManyProgIds, row, message);
            continue;
        }
        claims.insert(prog_id_name, row.primary_key());

        if !ctx.doc.is_placed(prog_id) {
            ctx.doc.add_child(class, prog_id);
        }
    }

    let prog_ids = db.rows("ProgId");
    for row in &prog_ids {
        let Some(prog_id) = ctx.index.get_row(row) else {
            continue;
        };
        if ctx.doc.is_placed(prog_id) {
            continue;
        }
        let Some(clsid) = row.str("Class_") else {
            continue;
        };
        let class = classes
            .iter()
            .filter(|class| class.str("CLSID") == Some(clsid))
            .find_map(|class| ctx.index.get_row(class));
        if let Some(class) = class {
            ctx.doc.add_child(class, prog_id);
        }
    }

    for row in db.rows("Extension") {
        let Some(prog_id_name) = row.str("ProgId_") else {
            continue;
        };
        let Some(prog_id) = ctx.index.get("ProgId", prog_id_name) else {
            continue;
        };
        if ctx.doc.is_placed(prog_id) {
            continue;
        }
        if let Some(component) = ctx.require(&row, "Component_", "Component") {
            ctx.doc.add_child(component, prog_id);
        }
    }

    for row in &prog_ids {
        if let Some(prog_id) = ctx.index.get_row(row) {
            if !ctx.doc.is_placed(prog_id) {
                ctx.warn(
                    MessageCode::UnusedProgId,
                    row,
                    format!("ProgId '{}' has no class or extension to live under", row.primary_key()),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecompileOptions;
    use crate::schema::standard_definition;
    use crate::types::{CellValue, Database, Table};

    const CLSID: &str = "{11111111-2222-3333-4444-555555555555}";

    fn class_row(component: &str, default: Option<&str>) -> Vec<CellValue> {
        vec![
            CLSID.into(), "LocalServer32".into(), component.into(), default.into(), CellValue::Null,
            CellValue::Null, CellValue::Null, CellValue::Null, CellValue::Null, CellValue::Null,
            CellValue::Null, "Main".into(), CellValue::Null,
        ]
    }

    fn prog_id_row(id: &str, class: Option<&str>) -> Vec<CellValue> {
        vec![id.into(), CellValue::Null, class.into(), CellValue::Null, CellValue::Null, CellValue::Null]
    }

    #[test]
    fn test_default_claims_and_clsid_fallback() {
        let mut classes = Table::new(standard_definition("Class").unwrap());
        classes.add_row(class_row("Server", Some("Demo.App.1")));
        classes.add_row(class_row("Other", Some("Demo.App.1")));
        let mut prog_ids = Table::new(standard_definition("ProgId").unwrap());
        prog_ids.add_row(prog_id_row("Demo.App.1", Some(CLSID)));
        prog_ids.add_row(prog_id_row("Demo.Viewer", Some(CLSID)));
        let mut db = Database::new();
        db.add_table(classes);
        db.add_table(prog_ids);

        let options = DecompileOptions::default();
        let mut ctx = Context::new(&db, &options);
        let server = ctx.doc.create("Class");
        let other = ctx.doc.create("Class");
        let app = ctx.doc.create("ProgId");
        let viewer = ctx.doc.create("ProgId");
        ctx.index.insert("Class", &format!("{}/LocalServer32/Server", CLSID), server);
        ctx.index.insert("Class", &format!("{}/LocalServer32/Other", CLSID), other);
        ctx.index.insert("ProgId", "Demo.App.1", app);
        ctx.index.insert("ProgId", "Demo.Viewer", viewer);

        finalize_prog_id_table(&mut ctx);

        assert_eq!(ctx.doc.parent(app), Some(server));
        assert_eq!(ctx.doc.parent(viewer), Some(server));
        assert_eq!(ctx.messages.len(), 1);
        let entry = &ctx.messages.entries()[0];
        assert_eq!(entry.code, MessageCode::TooManyProgIds);
        assert!(entry.message.contains("/Server"));
    }

    #[test]
    fn test_orphaned_prog_id_is_reported() {
        let mut prog_ids = Table::new(standard_definition("ProgId").unwrap());
        prog_ids.add_row(prog_id_row("Demo.Orphan", None));
        prog_ids.add_row(prog_id_row("Demo.Unknown", Some("{99999999-2222-3333-4444-555555555555}")));
        let mut db = Database::new();
        db.add_table(prog_ids);

        let options = DecompileOptions::default();
        let mut ctx = Context::new(&db, &options);
        let orphan = ctx.doc.create("ProgId");
        let unknown = ctx.doc.create("ProgId");
        ctx.index.insert("ProgId", "Demo.Orphan", orphan);
        ctx.index.insert("ProgId", "Demo.Unknown", unknown);

        finalize_prog_id_table(&mut ctx);

        let rows: Vec<_> = ctx
            .messages
            .entries()
            .iter()
            .map(|m| (m.code, m.row_key.clone()))
            .collect();
        assert_eq!(
            rows,
            vec![
                (MessageCode::UnusedProgId, Some("Demo.Orphan".to_string())),
                (MessageCode::UnusedProgId, Some("Demo.Unknown".to_string())),
            ]
        );
    }
}
