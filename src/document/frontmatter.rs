//! Front-matter block detection and typed deserialization.

use crate::error::ParseErrorKind;
use serde::{Deserialize, Deserializer};

/// Opening/closing delimiter of a front-matter block.
const DELIMITER: &str = "---";
/// YAML document-end marker, accepted as an alternative closing delimiter.
const END_MARKER: &str = "...";

/// Recognized front-matter keys. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    /// Kept as text so a bad value is reported as an invalid `date` field.
    #[serde(deserialize_with = "scalar_string")]
    pub date: Option<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub tags: Vec<String>,
    #[serde(alias = "category", deserialize_with = "one_or_many")]
    pub categories: Vec<String>,
    pub author: Option<String>,
    pub draft: bool,
    pub featured: bool,
    #[serde(alias = "linkURL", alias = "linkUrl")]
    pub link_url: Option<String>,
}

impl FrontMatter {
    /// Deserialize a YAML block.
    pub fn from_yaml(yaml: &str) -> Result<Self, ParseErrorKind> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|err| ParseErrorKind::FrontMatter(err.to_string()))
    }
}

/// Split `text` into its front-matter block (if any) and body.
///
/// A block exists only when the very first line is `---`. It runs until the
/// next line that is exactly `---` or `...`.
pub fn split(text: &str) -> Result<(Option<&str>, &str), ParseErrorKind> {
    let Some(after_open) = strip_delimiter_line(text) else {
        return Ok((None, text));
    };

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        let trimmed = line.trim_end();
        if trimmed == DELIMITER || trimmed == END_MARKER {
            let yaml = &after_open[..offset];
            let body = &after_open[offset + line.len()..];
            return Ok((Some(yaml), body));
        }
        offset += line.len();
    }

    Err(ParseErrorKind::UnterminatedFrontMatter)
}

/// If `text` opens with a `---` line, return everything after it.
fn strip_delimiter_line(text: &str) -> Option<&str> {
    let rest = text.strip_prefix(DELIMITER)?;
    let rest = rest.trim_start_matches([' ', '\t']);
    rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(Scalar),
    Many(Vec<Scalar>),
}

/// Scalars YAML may produce where text is expected (`tags: [2024, rust]`).
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Int(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }
}

/// Accept `tags: rust`, `tags: "rust, go"` and `tags: [rust, go]`.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(value)) => value
            .into_string()
            .split(',')
            .map(str::to_owned)
            .collect(),
        Some(OneOrMany::Many(values)) => values.into_iter().map(Scalar::into_string).collect(),
    };

    Ok(values
        .into_iter()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .collect())
}

fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_with_front_matter() {
        let text = "---\ntitle: Hello\n---\nBody text\n";
        let (yaml, body) = split(text).unwrap();
        assert_eq!(yaml, Some("title: Hello\n"));
        assert_eq!(body, "Body text\n");
    }

    #[test]
    fn test_split_crlf_and_end_marker() {
        let text = "---\r\ntitle: Hello\r\n...\r\nBody";
        let (yaml, body) = split(text).unwrap();
        assert_eq!(yaml, Some("title: Hello\r\n"));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_split_without_front_matter() {
        let text = "# Heading\n\nJust markdown.";
        let (yaml, body) = split(text).unwrap();
        assert!(yaml.is_none());
        assert_eq!(body, text);
    }

    #[test]
    fn test_split_horizontal_rule_later_is_not_front_matter() {
        let text = "Intro\n---\nMore";
        assert!(split(text).unwrap().0.is_none());
    }

    #[test]
    fn test_split_unterminated() {
        let err = split("---\ntitle: Hello\nno closing").unwrap_err();
        assert!(matches!(err, ParseErrorKind::UnterminatedFrontMatter));
    }

    #[test]
    fn test_split_empty_block() {
        let (yaml, body) = split("---\n---\nBody").unwrap();
        assert_eq!(yaml, Some(""));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_from_yaml_full() {
        let fm = FrontMatter::from_yaml(
            r#"
title: "Hello World"
description: A first post
date: 2024-01-15
tags: [rust, "web dev"]
category: programming
author: Jane
draft: false
featured: true
linkURL: https://example.com
extra_key: ignored
"#,
        )
        .unwrap();

        assert_eq!(fm.title.as_deref(), Some("Hello World"));
        assert_eq!(fm.date.as_deref(), Some("2024-01-15"));
        assert_eq!(fm.tags, vec!["rust", "web dev"]);
        assert_eq!(fm.categories, vec!["programming"]);
        assert!(fm.featured);
        assert!(!fm.draft);
        assert_eq!(fm.link_url.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_tags_comma_separated_string() {
        let fm = FrontMatter::from_yaml("tags: rust, go , ,web").unwrap();
        assert_eq!(fm.tags, vec!["rust", "go", "web"]);
    }

    #[test]
    fn test_numeric_tags_accepted() {
        let fm = FrontMatter::from_yaml("tags: [2024, rust]").unwrap();
        assert_eq!(fm.tags, vec!["2024", "rust"]);
    }

    #[test]
    fn test_null_values_default() {
        let fm = FrontMatter::from_yaml("title:\ntags:\ndate:").unwrap();
        assert!(fm.title.is_none());
        assert!(fm.tags.is_empty());
        assert!(fm.date.is_none());
    }

    #[test]
    fn test_strict_booleans() {
        let err = FrontMatter::from_yaml("draft: maybe").unwrap_err();
        assert!(matches!(err, ParseErrorKind::FrontMatter(_)));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = FrontMatter::from_yaml("title: [unclosed").unwrap_err();
        assert!(matches!(err, ParseErrorKind::FrontMatter(_)));
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let fm = FrontMatter::from_yaml("  \n").unwrap();
        assert!(fm.title.is_none());
        assert!(!fm.draft);
    }
}
