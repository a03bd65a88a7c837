use serde::Serialize;

/// Coarse reading of what a query is about. Informational only; it does
/// not change ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Location,
    Activity,
    Emotion,
    Time,
    Visual,
}

const KEYWORDS: &[(Intent, &[&str])] = &[
    (Intent::Location, &["where", "place", "location", "city", "country"]),
    (Intent::Activity, &["trip", "vacation", "visit", "went", "travel"]),
    (Intent::Emotion, &["happy", "sad", "beautiful", "amazing", "wonderful"]),
    (Intent::Time, &["recent", "old", "last", "first", "when"]),
    (Intent::Visual, &["photo", "picture", "click", "image", "shot"]),
];

/// Intents whose keywords occur anywhere in the query (substring match,
/// so "trips" counts as "trip"), in declaration order.
pub fn analyze(query: &str) -> Vec<Intent> {
    let lowered = query.to_lowercase();
    KEYWORDS
        .iter()
        .filter(|(_, words)| words.iter().any(|w| lowered.contains(w)))
        .map(|(intent, _)| *intent)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_multiple_intents() {
        assert_eq!(
            analyze("Where did I click food photos?"),
            vec![Intent::Location, Intent::Visual]
        );
        assert_eq!(analyze("Show my mountain trips"), vec![Intent::Activity]);
    }

    #[test]
    fn none_detected() {
        assert!(analyze("cloudy sky").is_empty());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Intent::Visual).unwrap(), "\"visual\"");
    }
}
