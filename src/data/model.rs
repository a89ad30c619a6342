use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// AttributeValueSet – distinct filename values per attribute
// ---------------------------------------------------------------------------

/// attribute name → sorted, de-duplicated values seen in filenames.
pub type AttributeValueSet = BTreeMap<String, BTreeSet<String>>;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the result table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell, mirroring the types the CSV reader infers.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Anything else (dates, timestamps) rendered by Arrow's formatter.
    Text(String),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) | CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:?}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

#[cfg(test)]
impl CellValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ResultTable – rows returned by one search
// ---------------------------------------------------------------------------

/// Named columns plus typed rows, in the order the CSVs expose them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl ResultTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
impl ResultTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, top to bottom.
    pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a CellValue> + 'a> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_renders_empty_and_floats_keep_decimal_point() {
        assert_eq!(CellValue::Null.to_string(), "");
        assert_eq!(CellValue::Float(10.0).to_string(), "10.0");
        assert_eq!(CellValue::Float(0.125).to_string(), "0.125");
    }

    #[test]
    fn column_lookup() {
        let table = ResultTable {
            columns: vec!["Latitude".into(), "Depth".into()],
            rows: vec![
                vec![CellValue::Float(1.0), CellValue::Integer(3)],
                vec![CellValue::Float(2.0), CellValue::Null],
            ],
        };
        let depths: Vec<_> = table.column("Depth").unwrap().cloned().collect();
        assert_eq!(depths, vec![CellValue::Integer(3), CellValue::Null]);
        assert!(table.column("Missing").is_none());
        assert_eq!(table.len(), 2);
    }
}
