//! Sparse versioned row model
//!
//! A row maps family -> column -> cells. Cells inside one column are kept
//! newest first, so the latest version is always at index zero.

use crate::key::RowKey;
use bytes::Bytes;
use std::collections::BTreeMap;

/// One stored version of a column value
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    /// Raw payload
    pub value: Bytes,
    /// Write version; larger is newer
    pub version: u64,
}

impl Cell {
    /// Create a cell
    pub fn new(value: impl Into<Bytes>, version: u64) -> Self {
        Self {
            value: value.into(),
            version,
        }
    }
}

/// Columns of one family, each holding cells newest first
pub type Columns = BTreeMap<String, Vec<Cell>>;

/// A fetched row
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Row {
    key: String,
    families: BTreeMap<String, Columns>,
}

impl Row {
    /// Empty row for `key`
    pub fn new(key: &RowKey) -> Self {
        Self {
            key: key.as_str().to_string(),
            families: BTreeMap::new(),
        }
    }

    /// Row key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Insert a cell, keeping the column sorted newest first.
    /// A cell with an existing version replaces the old one.
    pub fn insert(&mut self, family: &str, column: &str, cell: Cell) {
        let cells = self
            .families
            .entry(family.to_string())
            .or_default()
            .entry(column.to_string())
            .or_default();
        match cells.binary_search_by(|c| cell.version.cmp(&c.version)) {
            Ok(pos) => cells[pos] = cell,
            Err(pos) => cells.insert(pos, cell),
        }
    }

    /// Drop all but the newest `limit` cells of every column
    pub fn truncate_versions(&mut self, limit: usize) {
        for columns in self.families.values_mut() {
            for cells in columns.values_mut() {
                cells.truncate(limit);
            }
        }
    }

    /// Check whether a family carries at least one column
    pub fn family_exists(&self, family: &str) -> bool {
        self.families
            .get(family)
            .map_or(false, |columns| !columns.is_empty())
    }

    /// Column names of a family, in key order
    pub fn columns_of(&self, family: &str) -> Vec<&str> {
        self.families
            .get(family)
            .map(|columns| columns.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Newest cell of a column
    pub fn latest_cell(&self, family: &str, column: &str) -> Option<&Cell> {
        self.families.get(family)?.get(column)?.first()
    }

    /// All cells of a column, newest first
    pub fn cells(&self, family: &str, column: &str) -> &[Cell] {
        self.families
            .get(family)
            .and_then(|columns| columns.get(column))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Family names present in the row
    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.families.keys().map(String::as_str)
    }

    /// Check whether the row carries no cells at all
    pub fn is_empty(&self) -> bool {
        self.families.values().all(|columns| columns.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        Row::new(&RowKey::for_block(7).unwrap())
    }

    #[test]
    fn test_latest_cell_is_highest_version() {
        let mut r = row();
        r.insert("blockrawevm", "0xaa", Cell::new("old", 1));
        r.insert("blockrawevm", "0xaa", Cell::new("new", 5));
        r.insert("blockrawevm", "0xaa", Cell::new("mid", 3));

        let latest = r.latest_cell("blockrawevm", "0xaa").unwrap();
        assert_eq!(latest.version, 5);
        assert_eq!(latest.value, Bytes::from("new"));
        let versions: Vec<u64> = r.cells("blockrawevm", "0xaa").iter().map(|c| c.version).collect();
        assert_eq!(versions, vec![5, 3, 1]);
    }

    #[test]
    fn test_same_version_overwrites() {
        let mut r = row();
        r.insert("logs", "0xaa", Cell::new("a", 2));
        r.insert("logs", "0xaa", Cell::new("b", 2));
        assert_eq!(r.cells("logs", "0xaa").len(), 1);
        assert_eq!(r.latest_cell("logs", "0xaa").unwrap().value, Bytes::from("b"));
    }

    #[test]
    fn test_truncate_versions() {
        let mut r = row();
        for v in 0..4 {
            r.insert("finalized", "0xaa", Cell::new("", v));
        }
        r.truncate_versions(1);
        assert_eq!(r.cells("finalized", "0xaa").len(), 1);
        assert_eq!(r.latest_cell("finalized", "0xaa").unwrap().version, 3);
    }

    #[test]
    fn test_family_queries() {
        let mut r = row();
        assert!(r.is_empty());
        assert!(!r.family_exists("finalized"));
        assert!(r.columns_of("finalized").is_empty());

        r.insert("finalized", "0xbb", Cell::new("", 1));
        r.insert("finalized", "0xaa", Cell::new("", 1));
        assert!(!r.is_empty());
        assert!(r.family_exists("finalized"));
        assert_eq!(r.columns_of("finalized"), vec!["0xaa", "0xbb"]);
        assert!(r.latest_cell("finalized", "0xcc").is_none());
        assert_eq!(r.key(), "0x00000007");
    }
}
