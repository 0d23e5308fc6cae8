//! Parsing of `rules` annotations.

use super::SKIP_SENTINEL;

/// Rules parsed from a comma-separated `rules` annotation, e.g. `required` or `default=8000`.
///
/// Parsing is lenient: unknown tokens are ignored rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRules {
    /// Set by the `required` token.
    pub required: bool,
    /// Set by the `default=<value>` token. The value is everything after the first `=`.
    pub default_value: Option<String>,
    /// Set by the `struct` token.
    pub is_nested: bool,
}

impl FieldRules {
    pub(crate) const NESTED_TOKEN: &'static str = "struct";
    const REQUIRED_TOKEN: &'static str = "required";
    const DEFAULT_PREFIX: &'static str = "default=";

    /// Parses a raw annotation. Returns `None` for the `-` sentinel, which excludes the field from metadata.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw == SKIP_SENTINEL {
            return None;
        }

        let mut rules = Self::default();
        for token in raw.split(',').map(str::trim) {
            if token.eq_ignore_ascii_case(Self::NESTED_TOKEN) {
                rules.is_nested = true;
            } else if token.eq_ignore_ascii_case(Self::REQUIRED_TOKEN) {
                rules.required = true;
            } else if let Some(value) = token.strip_prefix(Self::DEFAULT_PREFIX) {
                rules.default_value = Some(value.to_owned());
            }
        }
        Some(rules)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn parsing_basic_tokens() {
        let rules = FieldRules::parse("required").unwrap();
        assert!(rules.required);
        assert!(!rules.is_nested);
        assert_eq!(rules.default_value, None);

        let rules = FieldRules::parse("STRUCT").unwrap();
        assert!(rules.is_nested);

        let rules = FieldRules::parse("Required, default=8000").unwrap();
        assert!(rules.required);
        assert_eq!(rules.default_value.as_deref(), Some("8000"));
    }

    #[test]
    fn default_keeps_everything_after_first_eq() {
        let rules = FieldRules::parse("default=a=b=c").unwrap();
        assert_eq!(rules.default_value.as_deref(), Some("a=b=c"));

        let rules = FieldRules::parse("default=").unwrap();
        assert_eq!(rules.default_value.as_deref(), Some(""));
    }

    #[test]
    fn later_default_wins() {
        let rules = FieldRules::parse("default=1,default=2").unwrap();
        assert_eq!(rules.default_value.as_deref(), Some("2"));
    }

    #[test]
    fn unknown_tokens_are_ignored() {
        let rules = FieldRules::parse("min=3, omitempty, , Default=5").unwrap();
        assert_eq!(rules, FieldRules::default());
    }

    #[test]
    fn sentinel_excludes_field() {
        assert_eq!(FieldRules::parse("-"), None);
        // Only the whole annotation acts as a sentinel
        assert!(FieldRules::parse("-,required").unwrap().required);
    }

    proptest! {
        #[test]
        fn parsing_never_panics(raw in ".*") {
            let _ = FieldRules::parse(&raw);
        }

        #[test]
        fn default_value_is_verbatim(value in "[^,]*") {
            let raw = format!("default={value}");
            let rules = FieldRules::parse(&raw).unwrap();
            prop_assert_eq!(rules.default_value, Some(value.trim_end().to_owned()));
        }
    }
}
