use tabled::{builder::Builder, settings::Style, Table, Tabled};

use crate::model::HistoryEntry;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// Two-column Metric/Value table
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Table for shaped query rows. Columns are fixed by the caller; every row
/// already carries one cell per column.
pub fn result_table(columns: &[String], rows: &[Vec<String>]) -> String {
    if columns.is_empty() {
        return String::new();
    }

    let mut builder = Builder::default();
    builder.push_record(columns.iter().cloned());
    for row in rows {
        builder.push_record(row.iter().cloned());
    }
    builder.build().with(Style::rounded()).to_string()
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "Query")]
    query: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Time (s)")]
    time: String,
}

pub fn history_table(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return String::new();
    }

    let rows: Vec<HistoryRow> = entries
        .iter()
        .map(|e| HistoryRow {
            query: e.q.clone(),
            kind: e.kind.clone().unwrap_or_else(|| "-".to_string()),
            time: e.time.map(|t| format!("{:.3}", t)).unwrap_or_else(|| "-".to_string()),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_table_has_header_and_cells() {
        let table = result_table(
            &["name".to_string(), "skill".to_string()],
            &[vec!["Ann".to_string(), "Python".to_string()]],
        );
        assert!(table.contains("name"));
        assert!(table.contains("skill"));
        assert!(table.contains("Ann"));
        assert!(table.contains("Python"));
    }

    #[test]
    fn test_empty_tables_render_nothing() {
        assert!(result_table(&[], &[vec![]]).is_empty());
        assert!(history_table(&[]).is_empty());
        assert!(TableBuilder::new().build().is_empty());
    }

    #[test]
    fn test_history_table() {
        let table = history_table(&[HistoryEntry {
            q: "count employees".into(),
            kind: Some("sql".into()),
            time: Some(0.01234),
        }]);
        assert!(table.contains("count employees"));
        assert!(table.contains("0.012"));
    }
}
