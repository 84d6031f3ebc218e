//! Deterministic stand-ins used when generation fails.

const DEFAULT_TERMS: [&str; 3] = ["nature", "technology", "business"];

/// Placeholder narration for a topic.
pub fn fallback_script(topic: &str) -> String {
    format!(
        "This is a video about {}. It explores the topic in an engaging and informative way.",
        topic.trim()
    )
}

/// The first `count` lowercase topic words longer than two characters.
///
/// Falls back to a fixed generic list when the topic has no such words.
pub fn fallback_terms(topic: &str, count: usize) -> Vec<String> {
    let terms: Vec<String> = topic
        .to_lowercase()
        .split_whitespace()
        .filter(|w| w.chars().count() > 2)
        .take(count)
        .map(str::to_string)
        .collect();

    if terms.is_empty() {
        DEFAULT_TERMS.iter().map(|t| t.to_string()).collect()
    } else {
        terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_script_names_topic() {
        assert_eq!(
            fallback_script("ocean conservation"),
            "This is a video about ocean conservation. It explores the topic in an engaging and informative way."
        );
    }

    #[test]
    fn terms_from_topic_words() {
        assert_eq!(
            fallback_terms("The Future of AI in Healthcare", 5),
            vec!["the", "future", "healthcare"]
        );
        assert_eq!(fallback_terms("ocean conservation efforts", 2), vec!["ocean", "conservation"]);
    }

    #[test]
    fn generic_terms_when_topic_is_short() {
        assert_eq!(fallback_terms("AI", 5), vec!["nature", "technology", "business"]);
    }
}
