// Raw Row - decoded but not yet mapped output line

/// One decoded output row: trimmed fields, no schema applied yet.
///
/// Width is whatever the tool emitted; the mapper checks it against the
/// target record's positional schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow(Vec<String>);

impl RawRow {
    pub fn new(fields: Vec<String>) -> Self {
        Self(fields)
    }

    /// Number of fields in the row.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Field at `index`, if the row is wide enough.
    pub fn field(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn into_fields(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for RawRow {
    fn from(fields: Vec<String>) -> Self {
        Self::new(fields)
    }
}

impl FromIterator<String> for RawRow {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_access_is_bounds_checked() {
        let row = RawRow::new(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(row.len(), 2);
        assert!(!row.is_empty());
        assert_eq!(row.field(0), Some("a"));
        assert_eq!(row.field(1), Some("b"));
        assert_eq!(row.field(2), None);
    }

    #[test]
    fn test_into_fields_round_trips() {
        let fields = vec!["x".to_string(), "y".to_string()];
        let row = RawRow::from(fields.clone());
        assert_eq!(row.into_fields(), fields);
    }
}
