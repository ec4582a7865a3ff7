pub mod gemini;
pub mod image;
pub mod keywords;
pub mod prompt;
pub mod search;
