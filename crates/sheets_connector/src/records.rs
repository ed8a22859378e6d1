//! Conversion between raw 2-D cell values and header keyed records.

use std::collections::HashMap;
use std::hash::BuildHasher;

use indexmap::IndexMap;

/// One data row keyed by header field, in header order.
pub type Record = IndexMap<String, String>;

/// A caller supplied row to be serialized in header order before appending.
pub type AppendableRow = IndexMap<String, Option<String>>;

/// Map-like rows that can be reordered by header.
pub trait RowLookup {
    /// Get the value for a field, `None` if the field is missing or null.
    fn lookup(&self, key: &str) -> Option<&str>;
}

impl<S: BuildHasher> RowLookup for IndexMap<String, Option<String>, S> {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.as_deref())
    }
}

impl<S: BuildHasher> RowLookup for IndexMap<String, String, S> {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.get(key).map(|v| v.as_str())
    }
}

impl<S: BuildHasher> RowLookup for HashMap<String, Option<String>, S> {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.as_deref())
    }
}

impl<S: BuildHasher> RowLookup for HashMap<String, String, S> {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.get(key).map(|v| v.as_str())
    }
}

impl<T: RowLookup + ?Sized> RowLookup for &T {
    fn lookup(&self, key: &str) -> Option<&str> {
        (**self).lookup(key)
    }
}

/// Pair each header field with the cell at the same position.
///
/// Missing cells become empty strings and cells past the end of the header
/// are dropped. Duplicate header fields keep the value of the last one.
pub fn to_record<H: AsRef<str>>(header: &[H], row: &[String]) -> Record {
    let mut record = Record::with_capacity(header.len());
    for (idx, field) in header.iter().enumerate() {
        let value = row.get(idx).cloned().unwrap_or_default();
        record.insert(field.as_ref().to_string(), value);
    }
    record
}

/// Convert every row into a record. Produces exactly one record per row.
pub fn to_records<H, I, R>(header: &[H], rows: I) -> Vec<Record>
where
    H: AsRef<str>,
    I: IntoIterator<Item = R>,
    R: AsRef<[String]>,
{
    rows.into_iter()
        .map(|row| to_record(header, row.as_ref()))
        .collect()
}

/// Reorder map-like rows into header order.
///
/// Each output row has exactly `header.len()` cells. Fields that are missing
/// or null become empty strings.
pub fn from_appendable<H, I, R>(header: &[H], rows: I) -> Vec<Vec<String>>
where
    H: AsRef<str>,
    I: IntoIterator<Item = R>,
    R: RowLookup,
{
    rows.into_iter()
        .map(|row| {
            header
                .iter()
                .map(|field| row.lookup(field.as_ref()).unwrap_or_default().to_string())
                .collect()
        })
        .collect()
}

/// Split raw values into a header row and the remaining data rows.
///
/// Returns `None` if there are no values at all.
pub fn split_header(mut values: Vec<Vec<String>>) -> Option<(Vec<String>, Vec<Vec<String>>)> {
    if values.is_empty() {
        return None;
    }
    let header = values.remove(0);
    Some((header, values))
}

/// Ordered collection of records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordCollection {
    records: Vec<Record>,
}

impl RecordCollection {
    pub fn new(records: Vec<Record>) -> Self {
        RecordCollection { records }
    }

    /// Build a collection from a header and raw rows.
    pub fn from_rows<H, I, R>(header: &[H], rows: I) -> Self
    where
        H: AsRef<str>,
        I: IntoIterator<Item = R>,
        R: AsRef<[String]>,
    {
        Self::new(to_records(header, rows))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&Record> {
        self.records.last()
    }

    pub fn get(&self, idx: usize) -> Option<&Record> {
        self.records.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Values of a single field across all records.
    pub fn pluck(&self, field: &str) -> Vec<&str> {
        self.records
            .iter()
            .filter_map(|r| r.get(field).map(|v| v.as_str()))
            .collect()
    }

    pub fn into_vec(self) -> Vec<Record> {
        self.records
    }
}

impl IntoIterator for RecordCollection {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordCollection {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<Record> for RecordCollection {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn short_row_padded_with_empty() {
        let header = ["id", "name", "mail"];
        let rows = vec![row(&["1", "n1", "m1"]), row(&["2", "n2"])];

        let records = to_records(&header, &rows);

        assert_eq!(2, records.len());
        assert_eq!("m1", records[0]["mail"]);
        assert_eq!("", records[1]["mail"]);
        assert_eq!("n2", records[1]["name"]);
    }

    #[test]
    fn long_row_truncated() {
        let records = to_records(&["a"], vec![row(&["1", "extra", "more"])]);
        assert_eq!(1, records[0].len());
        assert_eq!("1", records[0]["a"]);
    }

    #[test]
    fn empty_row_is_all_empty() {
        let records = to_records(&["a", "b"], vec![Vec::<String>::new()]);
        let expected: Record = [("a", ""), ("b", "")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(vec![expected], records);
    }

    #[test]
    fn record_count_matches_rows() {
        let empty: Vec<Vec<String>> = Vec::new();
        assert!(to_records(&["a"], &empty).is_empty());

        let header: [&str; 0] = [];
        let records = to_records(&header, vec![row(&["x"]), row(&[]), row(&["y", "z"])]);
        assert_eq!(3, records.len());
        assert!(records.iter().all(|r| r.is_empty()));
    }

    #[test]
    fn duplicate_header_last_write_wins() {
        let records = to_records(&["k", "other", "k"], vec![row(&["first", "o", "last"])]);
        let keys: Vec<_> = records[0].keys().cloned().collect();
        assert_eq!(vec!["k".to_string(), "other".to_string()], keys);
        assert_eq!("last", records[0]["k"]);
    }

    #[test]
    fn record_keeps_header_order() {
        let records = to_records(&["z", "a", "m"], vec![row(&["1", "2", "3"])]);
        let keys: Vec<_> = records[0].keys().map(|k| k.as_str()).collect();
        assert_eq!(vec!["z", "a", "m"], keys);
    }

    #[test]
    fn appendable_follows_header_order() {
        let mut appendable = AppendableRow::new();
        appendable.insert("header2".to_string(), Some("value3".to_string()));
        appendable.insert("header1".to_string(), None);

        let ordered = from_appendable(&["header1", "header2"], [&appendable]);

        assert_eq!(vec![row(&["", "value3"])], ordered);
    }

    #[test]
    fn appendable_missing_and_extra_keys() {
        let mut appendable: HashMap<String, String> = HashMap::new();
        appendable.insert("b".to_string(), "2".to_string());
        appendable.insert("unused".to_string(), "x".to_string());

        let ordered = from_appendable(&["a", "b", "c"], vec![appendable]);

        assert_eq!(vec![row(&["", "2", ""])], ordered);
    }

    #[test]
    fn records_round_trip_through_appendable() {
        let header = ["id", "name"];
        let records = to_records(&header, vec![row(&["1", "alice"])]);
        let ordered = from_appendable(&header, &records);
        assert_eq!(vec![row(&["1", "alice"])], ordered);
    }

    #[test]
    fn split_header_rows() {
        assert_eq!(None, split_header(Vec::new()));

        let (header, rows) =
            split_header(vec![row(&["id", "name"]), row(&["1", "a"])]).unwrap();
        assert_eq!(row(&["id", "name"]), header);
        assert_eq!(vec![row(&["1", "a"])], rows);
    }

    #[test]
    fn collection_helpers() {
        let rows = vec![
            row(&["id", "name", "mail"]),
            row(&["1", "name1", "mail1"]),
            row(&["2", "name2", "mail3"]),
        ];
        let (header, rows) = split_header(rows).unwrap();

        let collection = RecordCollection::from_rows(&header, rows);

        assert_eq!(2, collection.len());
        assert_eq!("name1", collection.first().unwrap()["name"]);
        assert_eq!("mail3", collection.last().unwrap()["mail"]);
        assert_eq!(vec!["1", "2"], collection.pluck("id"));
        assert!(collection.pluck("missing").is_empty());
    }
}
