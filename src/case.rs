//! Key case normalization for outgoing argument names.
//!
//! A [`KeyCase`] is applied to the fully composed key (`"authorId"`, `"postIds"`,
//! `"longBody"`), never to its parts, so a custom normalizer always sees the whole
//! identifier.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::NormalizeError;

lazy_static! {
    static ref UNDERSCORE_BOUNDARY: Regex = Regex::new(r"([a-z\d])([A-Z]+)").unwrap();
    static ref UNDERSCORE_SEPARATOR: Regex = Regex::new(r"-|\s+").unwrap();
    static ref DECAMELIZE_BOUNDARY: Regex = Regex::new(r"([a-z\d])([A-Z])").unwrap();
    static ref DASHERIZE_SEPARATOR: Regex = Regex::new(r"[ _]").unwrap();
    static ref CAMELIZE_SEPARATOR: Regex = Regex::new(r"[-_.\s]+(.)?").unwrap();
}

pub type CaseFn = dyn Fn(&str) -> String + Send + Sync;

#[derive(Clone, Default)]
pub enum KeyCase {
    #[default]
    Identity,
    Underscore,
    Camel,
    Dasherize,
    Custom(Arc<CaseFn>),
}

impl KeyCase {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        KeyCase::Custom(Arc::new(f))
    }
    pub fn apply(&self, key: &str) -> String {
        match self {
            KeyCase::Identity => key.to_owned(),
            KeyCase::Underscore => underscore(key),
            KeyCase::Camel => camelize(key),
            KeyCase::Dasherize => dasherize(key),
            KeyCase::Custom(f) => f(key),
        }
    }
}

impl fmt::Debug for KeyCase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KeyCase::Identity => write!(f, "Identity"),
            KeyCase::Underscore => write!(f, "Underscore"),
            KeyCase::Camel => write!(f, "Camel"),
            KeyCase::Dasherize => write!(f, "Dasherize"),
            KeyCase::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl FromStr for KeyCase {
    type Err = NormalizeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "identity" | "none" | "" => Ok(KeyCase::Identity),
            "underscore" | "snake" => Ok(KeyCase::Underscore),
            "camel" | "camelize" => Ok(KeyCase::Camel),
            "dasherize" | "dash" | "kebab" => Ok(KeyCase::Dasherize),
            other => Err(NormalizeError::Config(format!("unknown key case '{other}'"))),
        }
    }
}

/// `"longBody"` becomes `"long_body"`, dashes and whitespace become underscores.
pub fn underscore(key: &str) -> String {
    let split = UNDERSCORE_BOUNDARY.replace_all(key, "${1}_${2}");
    UNDERSCORE_SEPARATOR.replace_all(&split, "_").to_lowercase()
}

/// `"longBody"` becomes `"long-body"`.
pub fn dasherize(key: &str) -> String {
    let split = DECAMELIZE_BOUNDARY.replace_all(key, "${1}_${2}").to_lowercase();
    DASHERIZE_SEPARATOR.replace_all(&split, "-").into_owned()
}

/// `"long_body"` and `"long-body"` become `"longBody"`.
pub fn camelize(key: &str) -> String {
    let joined = CAMELIZE_SEPARATOR.replace_all(key, |caps: &regex::Captures| {
        caps.get(1).map(|c| c.as_str().to_uppercase()).unwrap_or_default()
    });
    let mut chars = joined.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn underscore_composed_keys() {
        assert_eq!(underscore("longBody"), "long_body");
        assert_eq!(underscore("authorId"), "author_id");
        assert_eq!(underscore("postIds"), "post_ids");
        assert_eq!(underscore("title"), "title");
        assert_eq!(underscore("some-key name"), "some_key_name");
    }

    #[test]
    fn dasherize_and_camelize() {
        assert_eq!(dasherize("longBody"), "long-body");
        assert_eq!(dasherize("author_id"), "author-id");
        assert_eq!(camelize("long_body"), "longBody");
        assert_eq!(camelize("post-ids"), "postIds");
        assert_eq!(camelize("Title"), "title");
    }

    #[test]
    fn parses_named_cases() {
        assert!(matches!("underscore".parse::<KeyCase>(), Ok(KeyCase::Underscore)));
        assert!(matches!("Identity".parse::<KeyCase>(), Ok(KeyCase::Identity)));
        assert!("shouting".parse::<KeyCase>().is_err());
    }

    #[test]
    fn custom_sees_whole_key() {
        let case = KeyCase::custom(|k| k.to_uppercase());
        assert_eq!(case.apply("authorId"), "AUTHORID");
    }
}
