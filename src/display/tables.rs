//! Table formatting for query results, clusters and cache listings.

use comfy_table::{
    Attribute, Cell, CellAlignment, ContentArrangement, Table, modifiers::UTF8_ROUND_CORNERS,
    presets::UTF8_FULL,
};

use crate::cluster::CacheKey;
use crate::vector::RankedMatch;

/// Builder for creating formatted tables.
pub struct TableBuilder {
    table: Table,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableBuilder {
    pub fn new() -> Self {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.apply_modifier(UTF8_ROUND_CORNERS);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        Self { table }
    }

    pub fn set_headers(mut self, headers: Vec<&str>) -> Self {
        let header_cells: Vec<Cell> = headers
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect();
        self.table.set_header(header_cells);
        self
    }

    pub fn add_row(mut self, row: Vec<Cell>) -> Self {
        self.table.add_row(row);
        self
    }

    pub fn build(self) -> String {
        self.table.to_string()
    }
}

/// Rank, word and distance for each match, closest first.
pub fn create_match_table(matches: &[RankedMatch<'_>]) -> String {
    matches
        .iter()
        .enumerate()
        .fold(
            TableBuilder::new().set_headers(vec!["#", "Word", "Distance"]),
            |table, (rank, m)| {
                table.add_row(vec![
                    Cell::new(rank + 1).set_alignment(CellAlignment::Right),
                    Cell::new(m.word).add_attribute(Attribute::Bold),
                    Cell::new(format!("{:.4}", m.distance)).set_alignment(CellAlignment::Right),
                ])
            },
        )
        .build()
}

/// One row per `(index, words)` cluster with its size and up to `preview`
/// words. The index is shown as given.
pub fn create_cluster_table<'a>(
    clusters: impl IntoIterator<Item = (usize, &'a [String])>,
    preview: usize,
) -> String {
    clusters
        .into_iter()
        .fold(
            TableBuilder::new().set_headers(vec!["Cluster", "Size", "Words"]),
            |table, (index, words)| {
                let mut shown = words
                    .iter()
                    .take(preview)
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                if words.len() > preview {
                    shown.push_str(", …");
                }
                table.add_row(vec![
                    Cell::new(index).set_alignment(CellAlignment::Right),
                    Cell::new(words.len()).set_alignment(CellAlignment::Right),
                    Cell::new(shown),
                ])
            },
        )
        .build()
}

/// Cached partitions by dimension, vocabulary size and cluster count.
pub fn create_cache_table(keys: &[CacheKey]) -> String {
    keys.iter()
        .fold(
            TableBuilder::new().set_headers(vec!["Dimension", "Words", "Clusters", "File"]),
            |table, key| {
                table.add_row(vec![
                    Cell::new(key.dimension).set_alignment(CellAlignment::Right),
                    Cell::new(key.vocabulary_size).set_alignment(CellAlignment::Right),
                    Cell::new(key.cluster_count).set_alignment(CellAlignment::Right),
                    Cell::new(key.file_name()),
                ])
            },
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::ClusterPartition;
    use crate::vector::WordId;

    #[test]
    fn test_table_builder() {
        let table = TableBuilder::new()
            .set_headers(vec!["Column 1", "Column 2"])
            .add_row(vec![Cell::new("Value 1"), Cell::new("Value 2")])
            .build();

        assert!(table.contains("Column 1"));
        assert!(table.contains("Value 1"));
    }

    #[test]
    fn test_match_table() {
        let vector = [1.0, 0.0];
        let matches = vec![RankedMatch {
            id: WordId::new(3),
            word: "queen",
            distance: 0.0061,
            vector: &vector,
        }];
        let table = create_match_table(&matches);
        assert!(table.contains("queen"));
        assert!(table.contains("0.0061"));
    }

    #[test]
    fn test_cluster_table_truncates_preview() {
        let partition = ClusterPartition::from(vec![
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            vec!["d".to_string()],
        ]);
        let table = create_cluster_table(partition.iter().enumerate(), 2);
        assert!(table.contains("a, b, …"));
        assert!(!table.contains("a, b, c"));
        assert!(table.contains('d'));
    }

    #[test]
    fn test_cluster_table_keeps_partition_index() {
        let partition = ClusterPartition::from(vec![
            vec!["a".to_string()],
            vec!["b".to_string()],
            vec!["c".to_string()],
            vec!["queen".to_string(), "king".to_string()],
        ]);
        let index = partition.cluster_of("queen").unwrap();
        let table = create_cluster_table([(index, partition.clusters()[index].as_slice())], 5);

        let row = table.lines().find(|line| line.contains("queen")).unwrap();
        let cells: Vec<&str> = row
            .split('│')
            .map(str::trim)
            .filter(|cell| !cell.is_empty())
            .collect();
        assert_eq!(cells, vec!["3", "2", "queen, king"]);
    }

    #[test]
    fn test_cache_table() {
        let table = create_cache_table(&[CacheKey::new(50, 400, 8)]);
        assert!(table.contains("50D_400-words_8-clusters.json"));
    }
}
