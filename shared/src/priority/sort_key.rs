use std::cmp::Ordering;

/// Configured sort key, compared "alphanumeric-safe": numbers sort
/// numerically and before any text, text sorts lexicographically.
#[derive(Clone, Debug)]
pub enum SortKey {
    Numeric(f64),
    Text(String),
}

impl SortKey {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => SortKey::Numeric(value),
            _ => SortKey::Text(trimmed.to_string()),
        }
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Numeric(a), SortKey::Numeric(b)) => a.total_cmp(b),
            (SortKey::Numeric(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Numeric(_)) => Ordering::Greater,
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
        }
    }
}

pub fn compare_sort_keys(a: &str, b: &str) -> Ordering {
    SortKey::parse(a).cmp(&SortKey::parse(b))
}
