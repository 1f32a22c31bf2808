use regex::Regex;
use std::sync::OnceLock;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
        .is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("ayesha@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.pk"));
        assert!(!is_valid_email("ayesha@example"));
        assert!(!is_valid_email("ayesha example@mail.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email(""));
    }
}
