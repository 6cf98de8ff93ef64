//! AppSearch, CCPSearch and the locator tables
//!
//! Locator rows share a signature with the AppSearch and CCPSearch rows that
//! consume them, and a DrLocator may name another signature as its parent.
//! The signatures form a graph that can revisit a search element; the first
//! visit places the element and later visits emit a `*SearchRef`.

use crate::decompiler::context::Context;
use crate::decompiler::standard::CCP_DRIVE;
use crate::document::ElementId;
use crate::messages::{Diagnostic, MessageCode};
use crate::types::RowView;
use std::collections::{BTreeMap, BTreeSet};

/// Locator tables in the order their rows are visited within a signature
const LOCATOR_TABLES: &[&str] = &["CompLocator", "RegLocator", "IniLocator", "DrLocator", "Signature"];

/// Search element nothing consumed yet, revisited after every signature
struct Unused {
    element: ElementId,
    table: &'static str,
    key: String,
}

fn signature_column(table: &str) -> &'static str {
    if table == "Signature" {
        "Signature"
    } else {
        "Signature_"
    }
}

/// `DirectorySearchRef` standing in for the DirectorySearch of `row`
fn directory_search_ref(ctx: &mut Context<'_>, signature: &str, row: &RowView<'_>) -> ElementId {
    let search_ref = ctx.doc.create("DirectorySearchRef");
    ctx.doc.set_attribute(search_ref, "Id", signature);
    ctx.doc.set_optional(search_ref, "Parent", row.str("Parent"));
    ctx.doc.set_optional(search_ref, "Path", row.str("Path"));
    search_ref
}

fn compliance_drive(ctx: &mut Context<'_>, parent: ElementId) -> ElementId {
    match ctx.doc.find_child(parent, "ComplianceDrive") {
        Some(drive) => drive,
        None => ctx.doc.create_child(parent, "ComplianceDrive"),
    }
}

/// Place `search` under `parent`, or a reference to it when already placed
fn place_directory_search(
    ctx: &mut Context<'_>,
    parent: ElementId,
    search: ElementId,
    signature: &str,
    row: &RowView<'_>,
    signature_elements: &mut Vec<ElementId>,
) {
    if !ctx.doc.is_placed(search) {
        ctx.doc.add_child(parent, search);
    } else {
        let search_ref = directory_search_ref(ctx, signature, row);
        ctx.doc.add_child(parent, search_ref);
        signature_elements.push(search_ref);
    }
}

/// Innermost DirectorySearch or DirectorySearchRef reached by first children
fn leaf_directory_search(ctx: &Context<'_>, element: ElementId) -> Option<ElementId> {
    let mut leaf = None;
    let mut parent = element;
    while let Some(&child) = ctx.doc.children(parent).iter().find(|&&child| {
        matches!(ctx.doc.name(child), "DirectorySearch" | "DirectorySearchRef")
    }) {
        leaf = Some(child);
        parent = child;
    }
    leaf
}

pub(super) fn finalize_search_tables(ctx: &mut Context<'_>) {
    let db = ctx.db;

    let mut app_searches: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for row in db.rows("AppSearch") {
        if let (Some(signature), Some(property)) = (row.str("Signature_"), row.str("Property")) {
            app_searches.entry(signature).or_default().push(property);
        }
    }
    let ccp_searches: BTreeSet<&str> = db
        .rows("CCPSearch")
        .into_iter()
        .filter_map(|row| row.str("Signature_"))
        .collect();

    let mut locators: BTreeMap<&str, Vec<(&'static str, RowView<'_>)>> = BTreeMap::new();
    for &table in LOCATOR_TABLES {
        for row in db.rows(table) {
            if let Some(signature) = row.str(signature_column(table)) {
                locators.entry(signature).or_default().push((table, row));
            }
        }
    }

    // A compliance-drive DrLocator takes the first DrLocator slot of its
    // signature so it receives the real element rather than a reference.
    for rows in locators.values_mut() {
        let first = rows.iter().position(|(table, _)| *table == "DrLocator");
        let ccp = rows
            .iter()
            .position(|(table, row)| *table == "DrLocator" && row.str("Parent") == Some(CCP_DRIVE));
        if let (Some(first), Some(ccp)) = (first, ccp) {
            let entry = rows.remove(ccp);
            rows.insert(first, entry);
        }
    }

    let mut unused: Vec<Unused> = Vec::new();

    for (&signature, rows) in &locators {
        let mut signature_elements: Vec<ElementId> = Vec::new();

        for (table, row) in rows {
            let table = *table;
            let Some(search) = ctx.index.get_row(row) else {
                continue;
            };
            let mut used = true;
            let parent_signature = if table == "DrLocator" { row.str("Parent") } else { None };

            if table == "Signature" && !signature_elements.is_empty() {
                for parent in signature_elements.clone() {
                    if !ctx.doc.is_placed(search) {
                        ctx.doc.add_child(parent, search);
                    } else {
                        let search_ref = ctx.doc.create("FileSearchRef");
                        ctx.doc.set_attribute(search_ref, "Id", signature);
                        ctx.doc.add_child(parent, search_ref);
                    }
                }
            } else if parent_signature == Some(CCP_DRIVE) {
                if let Some(properties) = app_searches.get(signature) {
                    for &property_id in properties {
                        let property = ctx.ensure_property(property_id);
                        if ccp_searches.contains(signature) {
                            ctx.doc.set_attribute(property, "ComplianceCheck", "yes");
                        }
                        let drive = compliance_drive(ctx, property);
                        place_directory_search(ctx, drive, search, signature, row, &mut signature_elements);
                    }
                } else if ccp_searches.contains(signature) {
                    let check = ctx.compliance_check();
                    let drive = compliance_drive(ctx, check);
                    place_directory_search(ctx, drive, search, signature, row, &mut signature_elements);
                } else {
                    unused.push(Unused { element: search, table, key: row.primary_key() });
                }
            } else if let Some(parent_signature) = parent_signature {
                match locators.get(parent_signature) {
                    Some(parent_rows) => {
                        let mut used_parent = false;
                        for (parent_table, parent_row) in parent_rows {
                            let Some(mut parent) = ctx.index.get_row(parent_row) else {
                                continue;
                            };
                            match *parent_table {
                                "DrLocator" => {
                                    if !ctx.doc.children(parent).is_empty() {
                                        let search_ref = directory_search_ref(ctx, parent_signature, parent_row);
                                        unused.push(Unused {
                                            element: search_ref,
                                            table: "DrLocator",
                                            key: parent_row.primary_key(),
                                        });
                                        parent = search_ref;
                                    }
                                    // refused when the parent chain loops back to this search
                                    used_parent |= if !ctx.doc.is_placed(search) {
                                        ctx.doc.add_child(parent, search)
                                    } else {
                                        let search_ref = directory_search_ref(ctx, signature, row);
                                        ctx.doc.add_child(parent, search_ref)
                                    };
                                }
                                "RegLocator" => {
                                    used_parent |= ctx.doc.is_placed(search) || ctx.doc.add_child(parent, search);
                                }
                                _ => {}
                            }
                        }
                        if !used_parent {
                            unused.push(Unused { element: search, table, key: row.primary_key() });
                        }
                    }
                    None => ctx.expected_foreign_row(row, "Parent", parent_signature, "DrLocator"),
                }
            } else if let Some(properties) = app_searches.get(signature) {
                for &property_id in properties {
                    let property = ctx.ensure_property(property_id);
                    if ccp_searches.contains(signature) {
                        ctx.doc.set_attribute(property, "ComplianceCheck", "yes");
                    }
                    if !ctx.doc.is_placed(search) {
                        ctx.doc.add_child(property, search);
                    } else if table == "RegLocator" {
                        let search_ref = ctx.doc.create_child(property, "RegistrySearchRef");
                        ctx.doc.set_attribute(search_ref, "Id", signature);
                        signature_elements.push(search_ref);
                    } else {
                        log::debug!("{} {} is reused by {} and has no reference form", table, signature, property_id);
                    }
                }
            } else if ccp_searches.contains(signature) {
                let check = ctx.compliance_check();
                if !ctx.doc.is_placed(search) {
                    ctx.doc.add_child(check, search);
                } else if table == "RegLocator" {
                    let search_ref = ctx.doc.create_child(check, "RegistrySearchRef");
                    ctx.doc.set_attribute(search_ref, "Id", signature);
                    signature_elements.push(search_ref);
                }
            } else {
                if !matches!(ctx.doc.name(search), "DirectorySearch" | "RegistrySearch") {
                    used = false;
                }
                unused.push(Unused { element: search, table, key: row.primary_key() });
            }

            if used {
                signature_elements.push(search);
            }
        }
    }

    // A parent cycle leaves its searches nested under each other but never
    // under a consumer; hand the outermost one to the sweep.
    let root = ctx.doc.root();
    let searches: Vec<Unused> = locators
        .values()
        .flatten()
        .filter_map(|(table, row)| {
            let element = ctx.index.get_row(row)?;
            Some(Unused { element, table: *table, key: row.primary_key() })
        })
        .collect();
    for search in &searches {
        let top = ctx.doc.topmost(search.element);
        if top == root || unused.iter().any(|u| u.element == top) {
            continue;
        }
        if let Some(owner) = searches.iter().find(|s| s.element == top) {
            unused.push(Unused { element: top, table: owner.table, key: owner.key.clone() });
        }
    }

    unused.sort_by(|a, b| (a.table, &a.key).cmp(&(b.table, &b.key)));
    for entry in unused {
        if ctx.doc.is_placed(entry.element) {
            continue;
        }

        let leaf_signature = leaf_directory_search(ctx, entry.element)
            .and_then(|leaf| ctx.doc.attribute(leaf, "Id"))
            .map(str::to_string);
        let consumer = match leaf_signature.as_deref() {
            Some(leaf) => match app_searches.get(leaf).and_then(|p| p.first()) {
                Some(&property_id) => Some(ctx.ensure_property(property_id)),
                None if ccp_searches.contains(leaf) => Some(ctx.compliance_check()),
                None => None,
            },
            None => None,
        };

        match consumer {
            Some(parent) => {
                ctx.doc.add_child(parent, entry.element);
            }
            None => ctx.messages.write(
                Diagnostic::warning(
                    MessageCode::UnusedSearch,
                    format!(
                        "{} search '{}' is not used by any AppSearch or CCPSearch row",
                        entry.table, entry.key
                    ),
                )
                .at_row(entry.table, &entry.key),
            ),
        }
    }
}
