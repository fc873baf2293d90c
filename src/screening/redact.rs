//! Secret redaction for backend output.

use std::borrow::Cow;

use regex::Regex;

/// Key name, separator, then a value of 8+ token characters.
pub const SECRET_PATTERN: &str =
    r"(?i)(api[ _-]?key|secret|password)\s*[:=]\s*[A-Za-z0-9_\-]{8,}";

/// Masks credential-shaped substrings.
#[derive(Debug, Clone)]
pub struct SecretRedactor {
    pattern: Regex,
    marker: String,
}

impl SecretRedactor {
    pub fn new(marker: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(SECRET_PATTERN)?,
            marker: marker.into(),
        })
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Replace every match with the marker. Borrows when nothing matched.
    pub fn redact<'a>(&self, text: &'a str) -> Cow<'a, str> {
        self.pattern
            .replace_all(text, regex::NoExpand(self.marker.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redactor() -> SecretRedactor {
        SecretRedactor::new("[REDACTED_SECRET]").unwrap()
    }

    #[test]
    fn test_api_key_redacted() {
        let out = redactor().redact("config: api_key: AbCdEfGh12345 done");
        assert_eq!(out, "config: [REDACTED_SECRET] done");
    }

    #[test]
    fn test_clean_output_untouched() {
        let text = "The answer is 4.";
        assert!(matches!(redactor().redact(text), Cow::Borrowed(t) if t == text));
    }

    #[test]
    fn test_variants_and_case() {
        let redactor = redactor();
        assert_eq!(redactor.redact("PASSWORD=hunter2hunter2"), "[REDACTED_SECRET]");
        assert_eq!(redactor.redact("Api Key : abc_def-123"), "[REDACTED_SECRET]");
        assert_eq!(
            redactor.redact("secret:aaaaaaaa and apikey=bbbbbbbb"),
            "[REDACTED_SECRET] and [REDACTED_SECRET]"
        );
    }

    #[test]
    fn test_short_values_kept() {
        assert_eq!(redactor().redact("password: short"), "password: short");
    }

    #[test]
    fn test_marker_is_literal() {
        let redactor = SecretRedactor::new("$1-gone").unwrap();
        assert_eq!(redactor.redact("secret=abcdefgh1"), "$1-gone");
    }
}
