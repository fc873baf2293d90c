//! Prompt template enforcement.

/// Rejection from the template validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateViolation {
    /// The prefixes that would have been accepted.
    pub accepted: Vec<String>,
}

impl TemplateViolation {
    pub fn detail(&self) -> String {
        format!(
            "Prompt must start with an approved prefix ({}).",
            self.accepted.join("/")
        )
    }
}

/// Requires prompts to begin with one of a fixed list of literal prefixes.
#[derive(Debug, Clone)]
pub struct TemplateValidator {
    prefixes: Vec<String>,
}

impl TemplateValidator {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
        }
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Returns the trimmed text when it starts with an approved prefix.
    pub fn validate<'a>(&self, normalized: &'a str) -> Result<&'a str, TemplateViolation> {
        let trimmed = normalized.trim();
        if self.prefixes.iter().any(|p| trimmed.starts_with(p.as_str())) {
            Ok(trimmed)
        } else {
            Err(TemplateViolation {
                accepted: self.prefixes.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PromptConfig;

    fn validator() -> TemplateValidator {
        TemplateValidator::new(PromptConfig::default().approved_prefixes)
    }

    #[test]
    fn test_approved_prefix_passes() {
        assert_eq!(validator().validate("Task: do X"), Ok("Task: do X"));
        assert_eq!(validator().validate("   Query: spaced  "), Ok("Query: spaced"));
    }

    #[test]
    fn test_missing_prefix_fails() {
        let err = validator().validate("do X").unwrap_err();
        assert_eq!(
            err.detail(),
            "Prompt must start with an approved prefix (Task:/Question:/User:/Input:/Query:)."
        );
    }

    #[test]
    fn test_prefix_is_case_sensitive() {
        assert!(validator().validate("task: do X").is_err());
        assert!(validator().validate("Task do X").is_err());
    }

    #[test]
    fn test_empty_fails() {
        assert!(validator().validate("").is_err());
        assert!(validator().validate("   ").is_err());
    }
}
