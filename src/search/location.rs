use crate::store::Collection;

pub struct LocationQuery {
    pub text: String,
    pub max_results: usize,
}

impl LocationQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            max_results: 20,
        }
    }
}

/// Records whose location contains the query text, case-insensitively,
/// in collection order. A blank query matches nothing.
pub fn find(collection: &Collection, query: &LocationQuery) -> Vec<usize> {
    let needle = query.text.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    collection
        .records()
        .iter()
        .enumerate()
        .filter(|(_, r)| r.location.to_lowercase().contains(&needle))
        .map(|(i, _)| i)
        .take(query.max_results)
        .collect()
}
