//! Disallowed-pattern content filtering.
//!
//! # Responsibilities
//! - Reject blank and overlong prompts
//! - Evaluate the ordered rule list; first match wins
//!
//! # Design Decisions
//! - Rules are data (`RuleConfig`), compiled once at startup
//! - All patterns are case-insensitive and match anywhere in the text
//! - Length is counted in characters, not bytes

use regex::{Regex, RegexBuilder};

use crate::config::RuleConfig;

/// Why a prompt was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentRejection {
    Empty,
    TooLong { max_chars: usize },
    Policy { rule_id: String, pattern: String },
}

/// A compiled disallowed pattern.
#[derive(Debug, Clone)]
pub struct Rule {
    id: String,
    regex: Regex,
}

impl Rule {
    pub fn compile(config: &RuleConfig) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(&config.pattern)
            .case_insensitive(true)
            .build()?;
        Ok(Self {
            id: config.id.clone(),
            regex,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Length limits plus the ordered rule list.
#[derive(Debug, Clone)]
pub struct ContentFilter {
    rules: Vec<Rule>,
    max_chars: usize,
}

impl ContentFilter {
    pub fn new(rules: &[RuleConfig], max_chars: usize) -> Result<Self, regex::Error> {
        let rules = rules.iter().map(Rule::compile).collect::<Result<_, _>>()?;
        Ok(Self { rules, max_chars })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn screen(&self, prompt: &str) -> Result<(), ContentRejection> {
        if prompt.trim().is_empty() {
            return Err(ContentRejection::Empty);
        }
        if prompt.chars().count() > self.max_chars {
            return Err(ContentRejection::TooLong {
                max_chars: self.max_chars,
            });
        }
        match self.rules.iter().find(|r| r.is_match(prompt)) {
            Some(rule) => Err(ContentRejection::Policy {
                rule_id: rule.id.clone(),
                pattern: rule.pattern().to_string(),
            }),
            None => Ok(()),
        }
    }
}
