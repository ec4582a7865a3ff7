const LEARNING_INDICATORS: &[&str] = &[
    // English
    "learn", "tutorial", "explain", "how to", "what is", "course", "study", "teach", "guide",
    // Indonesian
    "belajar", "ajarkan", "jelaskan", "pelajari", "apa itu", "bagaimana", "cara", "materi", "kursus",
];

const STOP_WORDS: &[&str] = &[
    // English
    "what", "that", "this", "with", "about", "from", "have", "your", "please", "want", "would",
    "could", "should", "some", "more", "into", "then", "than", "them", "they", "there",
    // Indonesian
    "yang", "dan", "untuk", "dengan", "saya", "tentang", "adalah", "dari", "pada", "dalam",
    "bisa", "tolong", "mohon", "ingin", "mau", "akan", "atau", "juga", "kamu", "anda", "apakah",
];

const MAX_KEYWORDS: usize = 3;

pub fn has_learning_intent(message: &str) -> bool {
    let lower = message.to_lowercase();
    LEARNING_INDICATORS.iter().any(|term| lower.contains(term))
}

/// Returns up to three search keywords, or an empty string when the message
/// shows no learning intent and no search should run.
pub fn extract_keywords(message: &str) -> String {
    if !has_learning_intent(message) {
        return String::new();
    }

    message
        .to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() > 3)
        .filter(|word| !STOP_WORDS.contains(word))
        .take(MAX_KEYWORDS)
        .collect::<Vec<_>>()
        .join(" ")
}
