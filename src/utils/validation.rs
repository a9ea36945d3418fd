//! Input validation utilities

use crate::constants::{self, MAX_PARTICIPANT_ID_LENGTH};

/// Validate a participant identifier (already trimmed)
pub fn validate_participant_id(id: &str) -> Result<(), &'static str> {
    if id.is_empty() {
        return Err("Participant id cannot be empty");
    }
    if id.len() > MAX_PARTICIPANT_ID_LENGTH {
        return Err("Participant id is too long");
    }
    if id.chars().any(char::is_control) {
        return Err("Participant id contains control characters");
    }
    Ok(())
}

/// Validate programming language
pub fn validate_language(language: &str) -> Result<(), &'static str> {
    if constants::languages::ALL.contains(&language) {
        Ok(())
    } else {
        Err("Unsupported programming language")
    }
}

/// Validate source code size
pub fn validate_source_code(code: &str, max_bytes: usize) -> Result<(), String> {
    if code.trim().is_empty() {
        return Err("Source code cannot be empty".to_string());
    }
    if code.len() > max_bytes {
        return Err(format!(
            "Source code exceeds maximum size of {} bytes",
            max_bytes
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_participant_id() {
        assert!(validate_participant_id("alice@example.com").is_ok());
        assert!(validate_participant_id("").is_err());
        assert!(validate_participant_id("bad\u{0}id").is_err());
        assert!(validate_participant_id(&"x".repeat(MAX_PARTICIPANT_ID_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_language() {
        assert!(validate_language("javascript").is_ok());
        assert!(validate_language("python").is_ok());
        assert!(validate_language("cobol").is_err());
    }

    #[test]
    fn test_validate_source_code() {
        assert!(validate_source_code("print(1)", 64).is_ok());
        assert!(validate_source_code("  \n", 64).is_err());
        assert!(validate_source_code(&"a".repeat(65), 64).is_err());
    }
}
