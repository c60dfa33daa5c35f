//! 主题输入校验，在任何外部调用之前执行

use regex::Regex;
use std::sync::LazyLock;

use crate::error::ValidationError;

const MIN_TOPIC_CHARS: usize = 3;
const MAX_TOPIC_CHARS: usize = 100;

/// 过于笼统、不适合生成文章的主题
const GENERIC_TOPICS: [&str; 4] = ["test", "sample", "topic", "subject"];

/// 只允许字母、数字、空白、连字符、逗号和句点
const DISALLOWED_CHARS_PATTERN: &str = r"[^\w\s\-.,]";

static DISALLOWED_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DISALLOWED_CHARS_PATTERN).expect("valid regex"));

pub fn validate_topic(topic: &str) -> Result<(), ValidationError> {
    let trimmed = topic.trim();
    let length = trimmed.chars().count();

    if length < MIN_TOPIC_CHARS {
        return Err(ValidationError::TooShort);
    }
    if length > MAX_TOPIC_CHARS {
        return Err(ValidationError::TooLong);
    }
    if DISALLOWED_CHARS.is_match(topic) {
        return Err(ValidationError::InvalidCharacters);
    }
    if GENERIC_TOPICS.contains(&trimmed.to_lowercase().as_str()) {
        return Err(ValidationError::TooGeneric);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_regular_topics() {
        assert_eq!(validate_topic("Artificial Intelligence"), Ok(()));
        assert_eq!(validate_topic("Climate change, 2024 edition."), Ok(()));
        assert_eq!(validate_topic("Self-driving cars"), Ok(()));
        assert_eq!(validate_topic("भारतीय संस्कृति"), Ok(()));
    }

    #[test]
    fn test_rejects_short_topics() {
        assert_eq!(validate_topic(""), Err(ValidationError::TooShort));
        assert_eq!(validate_topic("  ab  "), Err(ValidationError::TooShort));
    }

    #[test]
    fn test_length_limits_are_inclusive() {
        assert_eq!(validate_topic("abc"), Ok(()));
        assert_eq!(validate_topic(&"a".repeat(100)), Ok(()));
        assert_eq!(validate_topic(&"a".repeat(101)), Err(ValidationError::TooLong));
    }

    #[test]
    fn test_rejects_special_characters() {
        assert_eq!(
            validate_topic("Rust & Go"),
            Err(ValidationError::InvalidCharacters)
        );
        assert_eq!(
            validate_topic("What is AI?"),
            Err(ValidationError::InvalidCharacters)
        );
    }

    #[test]
    fn test_disallowed_chars_pattern_compiles() {
        assert!(Regex::new(DISALLOWED_CHARS_PATTERN).is_ok());
        assert!(DISALLOWED_CHARS.is_match("a@b"));
        assert!(!DISALLOWED_CHARS.is_match("Self-driving cars, 2024."));
    }

    #[test]
    fn test_rejects_generic_topics() {
        assert_eq!(validate_topic("test"), Err(ValidationError::TooGeneric));
        assert_eq!(validate_topic(" Sample "), Err(ValidationError::TooGeneric));
        assert_eq!(validate_topic("SUBJECT"), Err(ValidationError::TooGeneric));
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(
            validate_topic("test").unwrap_err().to_string(),
            "Topic is too generic. Please enter a more specific topic."
        );
        assert_eq!(
            validate_topic("x").unwrap_err().to_string(),
            "Topic is too short. Please enter a more descriptive topic."
        );
    }
}
