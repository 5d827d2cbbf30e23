use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

static EMPTY: CellValue = CellValue::Empty;

/// A single cell of a table. Values arrive from the host in whatever shape
/// the source sheet held them, so dates may show up either typed or as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
    Empty,
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Rendering used for digests and for coercive comparison.
    pub fn display(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 {
                    format!("{:.0}", n)
                } else {
                    n.to_string()
                }
            }
            CellValue::Date(d) => d.format("%Y-%m-%d %H:%M:%S").to_string(),
            CellValue::Empty => String::new(),
        }
    }

    pub fn as_trimmed_text(&self) -> &str {
        match self {
            CellValue::Text(s) => s.trim(),
            _ => "",
        }
    }

    /// Loose equality in the spirit of coercive `==`: a numeric cell matches
    /// the text rendering of the same number.
    pub fn loosely_eq(&self, other: &CellValue) -> bool {
        if self == other {
            return true;
        }
        self.display().trim() == other.display().trim()
    }
}

/// One logical row, addressed positionally by zero-based column index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    cells: Vec<CellValue>,
}

impl Record {
    pub fn new() -> Self {
        Self { cells: Vec::new() }
    }

    pub fn from_cells(cells: Vec<CellValue>) -> Self {
        Self { cells }
    }

    pub fn from_texts(texts: &[&str]) -> Self {
        Self {
            cells: texts.iter().map(|t| CellValue::text(*t)).collect(),
        }
    }

    /// Reads past the end yield an empty cell rather than panicking.
    pub fn get(&self, idx: usize) -> &CellValue {
        self.cells.get(idx).unwrap_or(&EMPTY)
    }

    /// Grows the record with empty cells as needed.
    pub fn set(&mut self, idx: usize, value: CellValue) {
        if idx >= self.cells.len() {
            self.cells.resize(idx + 1, CellValue::Empty);
        }
        self.cells[idx] = value;
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[CellValue] {
        &self.cells
    }
}

/// A rectangular table: row 0 is the header, data rows follow in insertion
/// order. Row indices used throughout are absolute (header included), so a
/// write target computed during a scan maps straight onto the store.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    rows: Vec<Record>,
}

impl Table {
    pub fn new(name: impl Into<String>, rows: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn data_row_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    /// All data rows with their absolute row index.
    pub fn data_rows(&self) -> impl Iterator<Item = (usize, &Record)> {
        self.rows.iter().enumerate().skip(1)
    }

    /// Length of the contiguous prefix of data rows whose first column is
    /// non-blank. A blank first column is the end-of-data sentinel: rows
    /// after it are never visible to bounded consumers.
    pub fn bounded_len(&self) -> usize {
        self.rows
            .iter()
            .skip(1)
            .take_while(|r| !r.get(0).is_blank())
            .count()
    }

    /// The bounded view of the table, with absolute row indices.
    pub fn bounded_rows(&self) -> impl Iterator<Item = (usize, &Record)> {
        let len = self.bounded_len();
        self.rows.iter().enumerate().skip(1).take(len)
    }
}

/// Cosmetic cell highlight applied alongside a status write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellMarker {
    Success,
    Warning,
}

impl CellMarker {
    pub fn color(&self) -> &'static str {
        match self {
            CellMarker::Success => "#C6EFCE",
            CellMarker::Warning => "#FFC7CE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loose_equality_coerces_numbers() {
        assert!(CellValue::Number(1001.0).loosely_eq(&CellValue::text("1001")));
        assert!(CellValue::text("1001").loosely_eq(&CellValue::Number(1001.0)));
        assert!(!CellValue::Number(1001.0).loosely_eq(&CellValue::text("1002")));
    }

    #[test]
    fn test_blank_detection() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::text("   ").is_blank());
        assert!(!CellValue::text("x").is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
    }

    #[test]
    fn test_record_read_past_end() {
        let rec = Record::from_texts(&["a"]);
        assert_eq!(rec.get(0), &CellValue::text("a"));
        assert_eq!(rec.get(5), &CellValue::Empty);
    }

    #[test]
    fn test_record_set_grows() {
        let mut rec = Record::new();
        rec.set(3, CellValue::text("x"));
        assert_eq!(rec.len(), 4);
        assert_eq!(rec.get(3), &CellValue::text("x"));
        assert_eq!(rec.get(1), &CellValue::Empty);
    }

    #[test]
    fn test_bounded_view_stops_at_blank_first_column() {
        let table = Table::new(
            "T",
            vec![
                Record::from_texts(&["Header"]),
                Record::from_texts(&["A"]),
                Record::from_texts(&[""]),
                Record::from_texts(&["B"]),
            ],
        );
        assert_eq!(table.bounded_len(), 1);
        let rows: Vec<usize> = table.bounded_rows().map(|(i, _)| i).collect();
        assert_eq!(rows, vec![1]);
        // the unbounded iterator still sees everything
        assert_eq!(table.data_rows().count(), 3);
    }
}
