//! The branch-name to issue-key transform.
//!
//! Branch naming conventions are inconsistent: `CFY-1234-fix` and
//! `CFY1234-fix` both refer to issue `CFY-1234`. A [`Transform`] canonicalizes
//! them with one pattern-match-and-substitute rule.

use regex::Regex;
use serde::Deserialize;

use crate::errors::QueryError;
use crate::identifiers::IssueKey;

/// Configuration shape for a [`Transform`], as it appears under an issue
/// filter in the YAML document.
#[derive(Debug, Clone, Deserialize)]
pub struct TransformSpec {
    /// The base pattern searched for inside the branch name.
    pub base: String,
    /// If this substring is already present in the match, the match is
    /// returned unchanged. Empty means "always return the match unchanged".
    #[serde(default)]
    pub if_doesnt_contain: String,
    /// Literal substring to replace in the match.
    pub replace_from: String,
    /// Replacement text.
    pub replace_to: String,
}

/// A compiled pattern-match-and-substitute rule deriving an [`IssueKey`]
/// from a branch name.
#[derive(Debug, Clone)]
pub struct Transform {
    base: Regex,
    if_doesnt_contain: String,
    replace_from: String,
    replace_to: String,
}

impl Transform {
    /// Compiles a transform from its configuration shape.
    pub fn from_spec(spec: TransformSpec) -> Result<Self, QueryError> {
        let base = Regex::new(&spec.base).map_err(|source| QueryError::InvalidPattern {
            pattern: spec.base.clone(),
            source,
        })?;
        Ok(Self {
            base,
            if_doesnt_contain: spec.if_doesnt_contain,
            replace_from: spec.replace_from,
            replace_to: spec.replace_to,
        })
    }

    /// Derives an issue key from a branch name.
    ///
    /// Searches `name` for the base pattern. No match means no key — the
    /// branch simply has no linked issue, which is not an error. When the
    /// match already contains `if_doesnt_contain` it is returned verbatim;
    /// otherwise the first occurrence of `replace_from` is replaced with
    /// `replace_to`.
    pub fn derive_key(&self, name: &str) -> Option<IssueKey> {
        let matched = self.base.find(name)?.as_str();
        let key = if self.if_doesnt_contain.is_empty()
            || matched.contains(&self.if_doesnt_contain)
        {
            matched.to_string()
        } else {
            matched.replacen(&self.replace_from, &self.replace_to, 1)
        };
        IssueKey::new(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfy_transform() -> Transform {
        Transform::from_spec(TransformSpec {
            base: r"CFY-*\d+".to_string(),
            if_doesnt_contain: "-".to_string(),
            replace_from: "CFY".to_string(),
            replace_to: "CFY-".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn well_formed_name_keeps_its_key() {
        let key = cfy_transform().derive_key("CFY-3223-allow-external-rabbitmq");
        assert_eq!(key.unwrap().as_str(), "CFY-3223");
    }

    #[test]
    fn missing_separator_is_inserted() {
        let key = cfy_transform().derive_key("CFY3223-allow-external-rabbitmq");
        assert_eq!(key.unwrap().as_str(), "CFY-3223");
    }

    #[test]
    fn unrelated_name_yields_no_key() {
        assert_eq!(cfy_transform().derive_key("GIVEAWAY"), None);
        assert_eq!(cfy_transform().derive_key("master"), None);
    }

    #[test]
    fn only_the_first_base_occurrence_is_used() {
        let key = cfy_transform().derive_key("CFY-3223CFY-3223");
        assert_eq!(key.unwrap().as_str(), "CFY-3223");
    }

    #[test]
    fn empty_exception_substring_returns_the_match_unchanged() {
        let transform = Transform::from_spec(TransformSpec {
            base: r"CFY-*\d+".to_string(),
            if_doesnt_contain: String::new(),
            replace_from: "CFY".to_string(),
            replace_to: "CFY-".to_string(),
        })
        .unwrap();
        let key = transform.derive_key("CFY3223-no-separator");
        assert_eq!(key.unwrap().as_str(), "CFY3223");
    }

    #[test]
    fn invalid_base_pattern_is_a_typed_error() {
        let result = Transform::from_spec(TransformSpec {
            base: "CFY-(".to_string(),
            if_doesnt_contain: String::new(),
            replace_from: String::new(),
            replace_to: String::new(),
        });
        assert!(matches!(result, Err(QueryError::InvalidPattern { .. })));
    }

    #[test]
    fn spec_deserializes_from_yaml() {
        let spec: TransformSpec = serde_yml::from_str(
            "base: CFY-*\\d+\nif_doesnt_contain: '-'\nreplace_from: CFY\nreplace_to: CFY-\n",
        )
        .unwrap();
        assert_eq!(spec.base, r"CFY-*\d+");
        assert_eq!(spec.if_doesnt_contain, "-");
    }
}
