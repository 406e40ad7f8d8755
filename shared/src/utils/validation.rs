//! Subject and namespace validation

use once_cell::sync::Lazy;
use regex::Regex;

/// Longest subject accepted (RFC 5321 path limit)
pub const MAX_SUBJECT_LENGTH: usize = 320;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

/// Normalize an email address for use as a verification subject
///
/// Surrounding whitespace is removed and the address is lower-cased so that
/// `Alice@Example.com` and `alice@example.com` share one outstanding code.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Check if an email address is valid
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= MAX_SUBJECT_LENGTH && EMAIL_REGEX.is_match(email)
}

/// Check if a namespace is usable as a key segment
///
/// Namespaces are ASCII, non-empty, and free of `:` and whitespace so that
/// `{namespace}:{subject}:{suffix}` keys cannot collide across namespaces.
pub fn is_valid_namespace(namespace: &str) -> bool {
    !namespace.is_empty()
        && namespace.len() <= 64
        && namespace
            .chars()
            .all(|c| c.is_ascii_graphic() && c != ':')
}

/// Check if a subject is usable as a key segment
pub fn is_valid_subject(subject: &str) -> bool {
    !subject.trim().is_empty() && subject.len() <= MAX_SUBJECT_LENGTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last+tag@mail.example.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_is_valid_namespace() {
        assert!(is_valid_namespace("email-verify"));
        assert!(is_valid_namespace("password-reset"));
        assert!(!is_valid_namespace(""));
        assert!(!is_valid_namespace("email:verify"));
        assert!(!is_valid_namespace("email verify"));
    }

    #[test]
    fn test_is_valid_subject() {
        assert!(is_valid_subject("a@b.com"));
        assert!(!is_valid_subject("   "));
        assert!(!is_valid_subject(&"x".repeat(MAX_SUBJECT_LENGTH + 1)));
    }
}
