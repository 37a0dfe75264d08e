//! Encoding Utilities

use base64::{Engine, engine::general_purpose};

/// Decode standard base64 to bytes
pub fn from_base64(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD.decode(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_base64() {
        assert_eq!(from_base64("aGVsbG8gd29ybGQ=").unwrap(), b"hello world");
        assert_eq!(from_base64("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_from_base64_rejects_url_alphabet_and_garbage() {
        assert!(from_base64("-_8=").is_err());
        assert!(from_base64("not base64!").is_err());
    }
}
