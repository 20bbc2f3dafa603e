//! Dense group-by × pivot count tables shared by every view.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use crate::record::{Field, Record};

/// Anything a group key or pivot value can be read from.
pub trait FieldSource {
    fn value(&self, field: Field) -> Option<String>;
}

impl FieldSource for Record {
    fn value(&self, field: Field) -> Option<String> {
        Record::value(self, field)
    }
}

impl<T: FieldSource + ?Sized> FieldSource for &T {
    fn value(&self, field: Field) -> Option<String> {
        (**self).value(field)
    }
}

/// One group of an [`AggregationResult`]; `counts` lines up with the
/// result's `columns`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationRow {
    pub key: Vec<String>,
    pub counts: Vec<u64>,
}

impl AggregationRow {
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Dense count table: every row carries a count for every column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub group_by: Vec<Field>,
    pub pivot_on: Field,
    pub columns: Vec<String>,
    pub rows: Vec<AggregationRow>,
}

impl AggregationResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, key: &[&str]) -> Option<&AggregationRow> {
        self.rows.iter().find(|r| {
            r.key.len() == key.len() && r.key.iter().zip(key).all(|(a, b)| a.as_str() == *b)
        })
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Count at (`key`, `column`). `Some(0)` for an empty cell of an existing
    /// row, `None` when the row or column is unknown or the row is shorter
    /// than `columns`.
    pub fn count(&self, key: &[&str], column: &str) -> Option<u64> {
        let idx = self.column_index(column)?;
        self.row(key).and_then(|r| r.counts.get(idx).copied())
    }

    pub fn row_total(&self, key: &[&str]) -> Option<u64> {
        self.row(key).map(AggregationRow::total)
    }

    pub fn column_totals(&self) -> Vec<u64> {
        let mut totals = vec![0; self.columns.len()];
        for row in &self.rows {
            for (total, count) in totals.iter_mut().zip(&row.counts) {
                *total += count;
            }
        }
        totals
    }

    /// Column → count map for one row, zero for every column of a known
    /// row and empty for an unknown one.
    pub fn counts_for(&self, key: &[&str]) -> HashMap<String, u64> {
        match self.row(key) {
            Some(row) => self
                .columns
                .iter()
                .cloned()
                .zip(row.counts.iter().copied())
                .collect(),
            None => HashMap::new(),
        }
    }

    /// Orders rows lexicographically by key.
    pub fn sort_rows_by_key(&mut self) {
        self.rows.sort_by(|a, b| a.key.cmp(&b.key));
    }

    /// Orders rows by key, comparing key parts numerically where both parse
    /// as numbers (ages, years).
    pub fn sort_rows_numeric(&mut self) {
        self.rows.sort_by(|a, b| {
            for (x, y) in a.key.iter().zip(&b.key) {
                let ord = match (x.parse::<f64>(), y.parse::<f64>()) {
                    (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                    _ => x.cmp(y),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            a.key.len().cmp(&b.key.len())
        });
    }
}

/// Counts `rows` per group of `group_by` values and per value of `pivot_on`.
///
/// `domain` fixes the columns (and their order); values seen outside it are
/// appended. Without a domain, the observed pivot values are used, sorted.
/// Rows with an absent group or pivot value are not counted.
pub fn aggregate<R: FieldSource>(
    rows: &[R],
    group_by: &[Field],
    pivot_on: Field,
    domain: Option<&[String]>,
) -> AggregationResult {
    let mut keys: Vec<Vec<String>> = Vec::new();
    let mut index: HashMap<Vec<String>, usize> = HashMap::new();
    let mut cells: HashMap<(usize, String), u64> = HashMap::new();
    let mut observed: BTreeSet<String> = BTreeSet::new();

    'rows: for row in rows {
        let Some(pivot) = row.value(pivot_on) else {
            continue;
        };

        let mut key = Vec::with_capacity(group_by.len());
        for field in group_by {
            match row.value(*field) {
                Some(v) => key.push(v),
                None => continue 'rows,
            }
        }

        let next = keys.len();
        let row_idx = *index.entry(key.clone()).or_insert_with(|| {
            keys.push(key);
            next
        });

        *cells.entry((row_idx, pivot.clone())).or_insert(0) += 1;
        observed.insert(pivot);
    }

    let mut columns: Vec<String> = domain.map(|d| d.to_vec()).unwrap_or_default();
    for value in observed {
        if !columns.contains(&value) {
            columns.push(value);
        }
    }

    let rows = keys
        .into_iter()
        .enumerate()
        .map(|(row_idx, key)| AggregationRow {
            counts: columns
                .iter()
                .map(|c| cells.get(&(row_idx, c.clone())).copied().unwrap_or(0))
                .collect(),
            key,
        })
        .collect();

    AggregationResult {
        group_by: group_by.to_vec(),
        pivot_on,
        columns,
        rows,
    }
}
