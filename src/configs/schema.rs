use crate::models::{NodeLogTable, NodeTable, Table};

/// Owns the table set and emits DDL in dependency order.
pub struct SchemaManager {
    tables: Vec<Box<dyn Table>>,
}

impl SchemaManager {
    pub fn new(tables: Vec<Box<dyn Table>>) -> Self {
        Self {
            tables: Self::sort_tables(tables),
        }
    }

    /// Referenced tables first; creation can then run front to back and
    /// disposal back to front.
    fn sort_tables(mut tables: Vec<Box<dyn Table>>) -> Vec<Box<dyn Table>> {
        let mut sorted: Vec<Box<dyn Table>> = Vec::with_capacity(tables.len());

        while !tables.is_empty() {
            let ready: Vec<usize> = tables
                .iter()
                .enumerate()
                .filter(|(_, table)| {
                    table
                        .dependencies()
                        .iter()
                        .all(|dep| sorted.iter().any(|done| done.name() == *dep))
                })
                .map(|(index, _)| index)
                .collect();

            assert!(!ready.is_empty(), "table dependency cycle detected");

            for index in ready.into_iter().rev() {
                sorted.push(tables.swap_remove(index));
            }
        }

        sorted
    }

    pub fn create_schema(&self) -> Vec<String> {
        self.tables.iter().map(|table| table.create()).collect()
    }

    pub fn dispose_schema(&self) -> Vec<String> {
        self.tables.iter().rev().map(|table| table.dispose()).collect()
    }
}

impl Default for SchemaManager {
    fn default() -> Self {
        SchemaManager::new(vec![Box::new(NodeTable), Box::new(NodeLogTable)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_logs_after_nodes() {
        let manager = SchemaManager::new(vec![Box::new(NodeLogTable), Box::new(NodeTable)]);
        let statements = manager.create_schema();

        assert!(statements[0].contains("CREATE TABLE IF NOT EXISTS nodes"));
        assert!(statements[1].contains("CREATE TABLE IF NOT EXISTS node_logs"));
    }

    #[test]
    fn disposes_in_reverse_order() {
        let manager = SchemaManager::default();
        let statements = manager.dispose_schema();

        assert!(statements[0].contains("node_logs"));
        assert!(statements[1].contains("nodes"));
    }
}
