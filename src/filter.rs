use crate::mongo::records::{LoadedRows, RecordKind, Row};

/// Visibility of each row for `query`: a row is shown when the lowercased
/// query occurs in any of its lowercased cells. An empty query shows all rows.
pub fn visibility(rows: &[Row], query: &str) -> Vec<bool> {
    let needle = query.to_lowercase();
    rows.iter()
        .map(|row| row.iter().any(|cell| cell.to_lowercase().contains(&needle)))
        .collect()
}

/// Loaded rows of one tab together with its search box state.
#[derive(Debug, Clone)]
pub struct RecordTable {
    kind: RecordKind,
    rows: Vec<Row>,
    query: String,
    visible: Vec<bool>,
}

impl RecordTable {
    pub fn new(kind: RecordKind, loaded: LoadedRows) -> Self {
        let rows = loaded.rows;
        let visible = vec![true; rows.len()];
        Self { kind, rows, query: String::new(), visible }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: String) {
        self.visible = visibility(&self.rows, &query);
        self.query = query;
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().zip(&self.visible).filter(|(_, shown)| **shown).map(|(row, _)| row)
    }

    pub fn visible_count(&self) -> usize {
        self.visible.iter().filter(|shown| **shown).count()
    }

    pub fn total_count(&self) -> usize {
        self.rows.len()
    }
}
