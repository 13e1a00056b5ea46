//! Input validation, applied before the cache or queue is touched

use coalesce_foundation::{Error, ErrorCode, Result};

/// Accept non-empty text of at most `max_len` characters
pub fn validate_input(text: &str, max_len: usize) -> Result<()> {
    if text.is_empty() {
        return Err(Error::validation(
            ErrorCode::BadRequest,
            "text must not be empty",
        ));
    }

    let len = text.chars().count();
    if len > max_len {
        return Err(Error::validation(
            ErrorCode::PayloadTooLarge,
            format!("text is {} characters; the maximum is {}", len, max_len),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_rejected() {
        let err = validate_input("", 10).unwrap_err();
        assert_eq!(err.code(), ErrorCode::BadRequest);
    }

    #[test]
    fn test_whitespace_accepted() {
        assert!(validate_input("   ", 10).is_ok());
    }

    #[test]
    fn test_length_counts_characters() {
        // 4 characters, 10 bytes
        assert!(validate_input("日本語!", 4).is_ok());

        let err = validate_input("hello", 4).unwrap_err();
        assert_eq!(err.code(), ErrorCode::PayloadTooLarge);
        assert!(err.code().is_client_error());
    }
}
