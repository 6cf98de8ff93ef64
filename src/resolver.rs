//! Table dependency ordering
//!
//! Tables are ordered so every table comes after the tables its foreign keys
//! point at. Self references are ignored and an edge that closes a cycle is
//! dropped; the finalizers repair whatever the cycle leaves unresolved.

use crate::types::TableDefinition;
use std::collections::{BTreeMap, HashSet};

struct Frame<'a> {
    table: &'a str,
    dependencies: Vec<&'a str>,
    next: usize,
}

/// Order tables so referenced tables come first.
///
/// Resolution starts from each table in name order and walks its foreign
/// keys depth first, so the result only depends on the set of definitions.
pub fn resolve_order<'a, I>(definitions: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a TableDefinition>,
{
    let tables: BTreeMap<&str, &TableDefinition> = definitions
        .into_iter()
        .map(|d| (d.name.as_str(), d))
        .collect();

    let mut resolved: HashSet<&str> = HashSet::new();
    let mut in_progress: HashSet<&str> = HashSet::new();
    let mut order = Vec::with_capacity(tables.len());

    for &start in tables.keys() {
        if resolved.contains(start) {
            continue;
        }

        let mut stack = vec![frame(start, &tables)];
        in_progress.insert(start);

        while let Some(top) = stack.last_mut() {
            if top.next < top.dependencies.len() {
                let dependency = top.dependencies[top.next];
                top.next += 1;

                if resolved.contains(dependency) {
                    continue;
                }
                if in_progress.contains(dependency) {
                    log::debug!("cycle: {} -> {} ignored", top.table, dependency);
                    continue;
                }

                in_progress.insert(dependency);
                stack.push(frame(dependency, &tables));
            } else {
                let table = top.table;
                stack.pop();
                in_progress.remove(table);
                resolved.insert(table);
                order.push(table.to_string());
            }
        }
    }

    order
}

fn frame<'a>(table: &'a str, tables: &BTreeMap<&'a str, &'a TableDefinition>) -> Frame<'a> {
    let mut dependencies: Vec<&'a str> = Vec::new();
    if let Some(&definition) = tables.get(table) {
        for column in &definition.columns {
            for target in column.referenced_tables() {
                if target == table || dependencies.contains(&target) {
                    continue;
                }
                if let Some((&name, _)) = tables.get_key_value(target) {
                    dependencies.push(name);
                }
            }
        }
    }

    Frame {
        table,
        dependencies,
        next: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::standard_definition;
    use crate::types::{ColumnCategory, ColumnDefinition, ColumnType};

    fn table(name: &str, references: &[&str]) -> TableDefinition {
        let mut columns = vec![ColumnDefinition::new(
            name,
            ColumnType::String(72),
            ColumnCategory::Identifier,
        )
        .primary_key()];
        for target in references {
            columns.push(
                ColumnDefinition::new(
                    &format!("{}_", target),
                    ColumnType::String(72),
                    ColumnCategory::Identifier,
                )
                .references(target, 1),
            );
        }
        TableDefinition::new(name, columns)
    }

    fn position(order: &[String], name: &str) -> usize {
        order.iter().position(|t| t == name).unwrap()
    }

    #[test]
    fn test_three_table_cycle() {
        let defs = vec![table("A", &["B"]), table("B", &["C"]), table("C", &["A"])];
        let order = resolve_order(&defs);

        assert_eq!(order.len(), 3);
        for name in ["A", "B", "C"] {
            assert_eq!(order.iter().filter(|t| *t == name).count(), 1);
        }
    }

    #[test]
    fn test_self_reference_ignored() {
        let defs = vec![table("Directory", &["Directory"])];
        assert_eq!(resolve_order(&defs), vec!["Directory".to_string()]);
    }

    #[test]
    fn test_referenced_tables_come_first() {
        let names = [
            "Component", "Directory", "Feature", "FeatureComponents", "File", "Registry",
            "Shortcut", "Control", "Dialog", "ControlEvent",
        ];
        let defs: Vec<_> = names.iter().filter_map(|n| standard_definition(n)).collect();
        let order = resolve_order(&defs);

        assert_eq!(order.len(), names.len());
        assert!(position(&order, "Directory") < position(&order, "Component"));
        assert!(position(&order, "Component") < position(&order, "File"));
        assert!(position(&order, "Component") < position(&order, "Registry"));
        assert!(position(&order, "Feature") < position(&order, "FeatureComponents"));
        assert!(position(&order, "Dialog") < position(&order, "Control"));
        assert!(position(&order, "Control") < position(&order, "ControlEvent"));
    }

    #[test]
    fn test_missing_targets_are_ignored() {
        let defs = vec![table("File", &["Component"])];
        assert_eq!(resolve_order(&defs), vec!["File".to_string()]);
    }

    #[test]
    fn test_order_is_deterministic() {
        let forward = vec![table("A", &["B"]), table("B", &["C"]), table("C", &["A"]), table("D", &[])];
        let reversed: Vec<_> = forward.iter().rev().cloned().collect();
        assert_eq!(resolve_order(&forward), resolve_order(&reversed));
    }
}
