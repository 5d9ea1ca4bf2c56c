//! Attribute rows and identifier-keyed row sets.
//!
//! A [`Row`] keeps attribute names in first-seen order. A [`RowSet`] keys rows
//! by the integer value of the identifier attribute and merges repeated
//! identifiers field by field, so a later record only overwrites the
//! attributes it actually carries.

use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: Vec<(String, String)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut row = Row::new();
        for (name, value) in pairs {
            row.set(name, value);
        }
        row
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// Overwrites `name` in place, or appends it when new.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn merge(&mut self, other: Row) {
        for (name, value) in other.fields {
            self.set(name, value);
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Leading integer of `raw`: optional whitespace and sign, then digits.
///
/// Anything without leading digits yields 0; values past the `i64` range
/// saturate.
pub fn parse_identifier(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let mut value: i64 = 0;
    for byte in digits.bytes().take_while(u8::is_ascii_digit) {
        let digit = i64::from(byte - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }
    value
}

#[derive(Debug, Clone)]
pub struct RowSet {
    identifier_column: String,
    rows: Vec<Row>,
    index: HashMap<i64, usize>,
}

impl RowSet {
    pub fn new(identifier_column: impl Into<String>) -> Self {
        Self {
            identifier_column: identifier_column.into(),
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn identifier_of(&self, row: &Row) -> i64 {
        row.get(&self.identifier_column)
            .map(parse_identifier)
            .unwrap_or(0)
    }

    /// Merges `row` into the row sharing its identifier; returns `true` when
    /// the identifier was new.
    pub fn merge(&mut self, row: Row) -> bool {
        let identifier = self.identifier_of(&row);
        match self.index.get(&identifier) {
            Some(&position) => {
                self.rows[position].merge(row);
                false
            }
            None => {
                self.index.insert(identifier, self.rows.len());
                self.rows.push(row);
                true
            }
        }
    }

    pub fn get(&self, identifier: i64) -> Option<&Row> {
        self.index
            .get(&identifier)
            .map(|&position| &self.rows[position])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Drains the set into first-appearance order, dropping the keys.
    pub fn take_rows(&mut self) -> Vec<Row> {
        self.index.clear();
        std::mem::take(&mut self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_overwrites_and_extends_fields() {
        let mut rows = RowSet::new("classid");
        assert!(rows.merge(Row::from_pairs([("classid", "7"), ("a", "1"), ("b", "2")])));
        assert!(!rows.merge(Row::from_pairs([("classid", "7"), ("b", "3"), ("c", "4")])));

        let merged = rows.get(7).expect("row 7");
        assert_eq!(merged.get("a"), Some("1"));
        assert_eq!(merged.get("b"), Some("3"));
        assert_eq!(merged.get("c"), Some("4"));
        assert_eq!(merged.names().collect::<Vec<_>>(), vec!["classid", "a", "b", "c"]);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn identifier_matching_uses_integer_value() {
        let mut rows = RowSet::new("classid");
        rows.merge(Row::from_pairs([("classid", "0012"), ("name", "old")]));
        rows.merge(Row::from_pairs([("classid", " 12"), ("name", "new")]));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.get(12).and_then(|row| row.get("name")), Some("new"));
    }

    #[test]
    fn missing_or_non_numeric_identifier_keys_to_zero() {
        let mut rows = RowSet::new("classid");
        rows.merge(Row::from_pairs([("name", "first")]));
        rows.merge(Row::from_pairs([("classid", "abc"), ("other", "x")]));
        assert_eq!(rows.len(), 1);
        let zero = rows.get(0).expect("row 0");
        assert_eq!(zero.get("name"), Some("first"));
        assert_eq!(zero.get("other"), Some("x"));
    }

    #[test]
    fn take_rows_keeps_first_appearance_order() {
        let mut rows = RowSet::new("classid");
        rows.merge(Row::from_pairs([("classid", "30")]));
        rows.merge(Row::from_pairs([("classid", "10")]));
        rows.merge(Row::from_pairs([("classid", "30"), ("x", "1")]));
        rows.merge(Row::from_pairs([("classid", "20")]));
        let flat = rows.take_rows();
        let ids: Vec<_> = flat.iter().filter_map(|row| row.get("classid")).collect();
        assert_eq!(ids, vec!["30", "10", "20"]);
        assert!(rows.is_empty());
    }

    #[test]
    fn parse_identifier_reads_leading_integer() {
        assert_eq!(parse_identifier("42"), 42);
        assert_eq!(parse_identifier("  -17abc"), -17);
        assert_eq!(parse_identifier("+5"), 5);
        assert_eq!(parse_identifier("abc"), 0);
        assert_eq!(parse_identifier(""), 0);
        assert_eq!(parse_identifier("99999999999999999999"), i64::MAX);
        assert_eq!(parse_identifier("-99999999999999999999"), i64::MIN);
    }
}
