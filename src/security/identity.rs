//! Credential validation.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Header carrying the caller's API key (`X-API-Key`).
pub const API_KEY_HEADER: &str = "x-api-key";

/// An API key that passed the identity gate.
///
/// `Display` prints the truncated form, so a credential can be put in a log
/// field without leaking it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(Arc<str>);

impl Credential {
    /// The full key. Used as the rate-limit and quota key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First four characters followed by `***`.
    pub fn redacted(&self) -> String {
        redact_key(&self.0)
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&self.redacted()).finish()
    }
}

/// Truncate a key for logging: first four characters followed by `***`.
pub fn redact_key(key: &str) -> String {
    let head: String = key.chars().take(4).collect();
    format!("{head}***")
}

/// Rejection from the identity gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unauthenticated;

/// Checks presented keys against the configured credential set.
#[derive(Debug, Clone)]
pub struct IdentityGate {
    known: HashSet<Arc<str>>,
}

impl IdentityGate {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let known = keys
            .into_iter()
            .map(|k| k.as_ref().trim().to_string())
            .filter(|k| !k.is_empty())
            .map(Arc::from)
            .collect();
        Self { known }
    }

    /// Number of accepted keys.
    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    /// Validate the raw header value, if one was presented.
    pub fn authenticate(&self, presented: Option<&str>) -> Result<Credential, Unauthenticated> {
        let key = presented.map(str::trim).unwrap_or_default();
        if key.is_empty() {
            return Err(Unauthenticated);
        }
        self.known
            .get(key)
            .map(|k| Credential(k.clone()))
            .ok_or(Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> IdentityGate {
        IdentityGate::new(["demo-key-123", " team-key ", ""])
    }

    #[test]
    fn test_known_key_accepted() {
        let cred = gate().authenticate(Some("demo-key-123")).unwrap();
        assert_eq!(cred.as_str(), "demo-key-123");
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert!(gate().authenticate(Some("  team-key\t")).is_ok());
    }

    #[test]
    fn test_missing_or_unknown_rejected() {
        let gate = gate();
        assert_eq!(gate.authenticate(None), Err(Unauthenticated));
        assert_eq!(gate.authenticate(Some("   ")), Err(Unauthenticated));
        assert_eq!(gate.authenticate(Some("demo-key-124")), Err(Unauthenticated));
        assert_eq!(gate.len(), 2);
    }

    #[test]
    fn test_display_is_truncated() {
        let cred = gate().authenticate(Some("demo-key-123")).unwrap();
        assert_eq!(cred.to_string(), "demo***");
        assert!(!format!("{cred:?}").contains("key-123"));
    }
}
