//! Lookup from (table, primary key) to produced elements

use crate::document::ElementId;
use crate::types::{join_key, RowView};
use std::collections::HashMap;

/// Non-owning index of decoded elements.
///
/// Keys are a table name plus a joined primary key. A row may be indexed
/// under more than one table name so dependents that only know a logical key
/// can still find it.
#[derive(Debug, Default)]
pub struct ElementIndex {
    entries: HashMap<(String, String), ElementId>,
}

impl ElementIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index an element under an explicit table and key
    pub fn insert(&mut self, table: &str, key: &str, element: ElementId) {
        self.entries
            .insert((table.to_string(), key.to_string()), element);
    }

    /// Index an element under its row's own table and primary key
    pub fn insert_row(&mut self, row: &RowView<'_>, element: ElementId) {
        self.insert(row.table(), &row.primary_key(), element);
    }

    pub fn get(&self, table: &str, key: &str) -> Option<ElementId> {
        self.entries
            .get(&(table.to_string(), key.to_string()))
            .copied()
    }

    /// Look up by composite key parts
    pub fn get_parts(&self, table: &str, parts: &[&str]) -> Option<ElementId> {
        self.get(table, &join_key(parts))
    }

    /// Element produced for a row, if any
    pub fn get_row(&self, row: &RowView<'_>) -> Option<ElementId> {
        self.get(row.table(), &row.primary_key())
    }

    pub fn contains(&self, table: &str, key: &str) -> bool {
        self.get(table, key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::schema;
    use crate::types::{CellValue, Table};

    #[test]
    fn test_composite_keys() {
        let mut doc = Document::new();
        let mut index = ElementIndex::new();
        let control = doc.create("Control");

        index.insert("Control", "Welcome/Next", control);
        assert_eq!(index.get_parts("Control", &["Welcome", "Next"]), Some(control));
        assert_eq!(index.get("Control", "Next"), None);
    }

    #[test]
    fn test_insert_row_uses_primary_key() {
        let mut doc = Document::new();
        let mut index = ElementIndex::new();
        let mut table = Table::new(schema::standard_definition("ControlEvent").unwrap());
        table.add_row(vec![
            "Dlg".into(),
            "Next".into(),
            "NewDialog".into(),
            "Other".into(),
            "1".into(),
            CellValue::Integer(1),
        ]);

        let publish = doc.create("Publish");
        let row = table.views().next().unwrap();
        index.insert_row(&row, publish);

        assert_eq!(index.get("ControlEvent", "Dlg/Next/NewDialog/Other/1"), Some(publish));
        assert_eq!(index.get_row(&row), Some(publish));
    }
}
