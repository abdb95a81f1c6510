//! Default stop-word list.
//!
//! Tokens in this list never enter the local or global frequency tables.
//! The list combines standard English function words with navigation / UI
//! noise observed in live captures; callers can replace it wholesale via
//! [`EngineConfig::stop_words`](crate::config::EngineConfig).

use std::collections::HashSet;

/// Standard English function words plus high-frequency filler.
const ENGLISH: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "aren't", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can't", "cannot", "could", "couldn't", "did", "didn't", "do", "does", "doesn't",
    "doing", "don't", "down", "during", "each", "few", "for", "from", "further", "had", "hadn't",
    "has", "hasn't", "have", "haven't", "having", "he", "he'd", "he'll", "he's", "her", "here",
    "here's", "hers", "herself", "him", "himself", "his", "how", "how's", "i", "i'd", "i'll",
    "i'm", "i've", "if", "in", "into", "is", "isn't", "it", "it's", "its", "itself", "let's",
    "me", "more", "most", "mustn't", "my", "myself", "no", "nor", "not", "of", "off", "on",
    "once", "only", "or", "other", "ought", "our", "ours", "ourselves", "out", "over", "own",
    "same", "shan't", "she", "she'd", "she'll", "she's", "should", "shouldn't", "so", "some",
    "such", "than", "that", "that's", "the", "their", "theirs", "them", "themselves", "then",
    "there", "there's", "these", "they", "they'd", "they'll", "they're", "they've", "this",
    "those", "through", "to", "too", "under", "until", "up", "very", "was", "wasn't", "we",
    "we'd", "we'll", "we're", "we've", "were", "weren't", "what", "what's", "when", "when's",
    "where", "where's", "which", "while", "who", "who's", "whom", "why", "why's", "with",
    "won't", "would", "wouldn't", "you", "you'd", "you'll", "you're", "you've", "your", "yours",
    "yourself", "yourselves", "will", "just", "now", "one", "like", "can", "get", "time", "new",
    "us", "use", "make", "made", "see", "way", "day", "go", "come", "back", "many", "much",
    "good", "know", "think", "take", "people", "year", "say", "well", "work", "want", "also",
    "even",
];

/// Navigation and chrome noise that dominates captured page text.
const UI_NOISE: &[&str] = &[
    "follow", "subscribe", "full", "coverage", "text", "courier", "journal", "report", "news",
    "times", "hour", "hours", "view", "views", "sync", "user sync", "user", "full coverage",
    "opinion", "yesterday", "days", "https", "http", "wwww", "com", "privacy", "show", "less",
    "show more", "show less", "last", "chat", "message", "select", "last message", "container",
    "safeframe", "browser", "preferences", "icon", "comment", "comments", "advertisement",
    "container safeframe",
];

/// Additions from a 20-domain capture audit.
const AUDIT: &[&str] = &[
    "cnn", "x27", "video", "apple", "business", "amp", "github", "microsoft", "best",
    "newsletters", "world", "read", "bull", "learn", "deals", "help", "quot", "watch", "shop",
    "code", "stories", "ago", "games", "tech", "images", "sign", "data", "policy", "2025",
    "free", "save", "copilot", "live", "top", "cyber", "courses", "support", "find", "explore",
    "stack", "week", "podcasts", "getty", "000", "travel", "home", "min", "health", "crossword",
    "rights", "reserved", "menu", "search", "login", "terms",
];

/// Build the default stop-word set.
pub fn default_stop_words() -> HashSet<String> {
    ENGLISH
        .iter()
        .chain(UI_NOISE.iter())
        .chain(AUDIT.iter())
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_function_words() {
        let words = default_stop_words();
        assert!(words.contains("the"));
        assert!(words.contains("advertisement"));
        assert!(words.contains("newsletters"));
    }

    #[test]
    fn test_does_not_contain_content_words() {
        let words = default_stop_words();
        assert!(!words.contains("kernel"));
        assert!(!words.contains("model"));
    }
}
