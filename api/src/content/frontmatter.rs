//! Front-matter parsing and serialization.
//!
//! A document may open with a `---` line; the YAML between that line and the
//! next `---` line is the metadata block, everything after it is the body.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, de};
use serde_yaml::Value;

pub const DELIMITER: &str = "---";

/// Metadata block of a post. Unknown keys are kept in `extra` so that a
/// rewrite never drops fields this server does not understand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(deserialize_with = "scalar", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(deserialize_with = "scalar", skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(deserialize_with = "tag_list", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "scalar", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(deserialize_with = "scalar", skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    #[serde(deserialize_with = "scalar", skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl FrontMatter {
    /// Parse a full document. Returns the metadata and the body.
    ///
    /// A document without a leading delimiter line, or with an opening
    /// delimiter that is never closed, is all body.
    pub fn parse(content: &str) -> Result<(Self, &str), serde_yaml::Error> {
        let Some((block, body)) = split(content) else {
            return Ok((Self::default(), content));
        };

        if block.trim().is_empty() {
            return Ok((Self::default(), body));
        }

        let front_matter = serde_yaml::from_str(block)?;
        Ok((front_matter, body))
    }

    /// Render the metadata and `body` back into a document.
    pub fn to_document(&self, body: &str) -> Result<String, serde_yaml::Error> {
        let yaml = serde_yaml::to_string(self)?;
        Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n{body}"))
    }
}

/// Split `content` into (metadata block, body) on delimiter lines.
fn split(content: &str) -> Option<(&str, &str)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let (first, rest) = next_line(content)?;
    if first != DELIMITER {
        return None;
    }

    let mut offset = 0;
    let mut remaining = rest;
    while let Some((line, after)) = next_line(remaining) {
        if line == DELIMITER {
            return Some((&rest[..offset], after));
        }
        offset += remaining.len() - after.len();
        remaining = after;
    }
    None
}

/// Returns the first line (without its terminator) and the text after it.
fn next_line(text: &str) -> Option<(&str, &str)> {
    if text.is_empty() {
        return None;
    }
    match text.find('\n') {
        Some(pos) => Some((text[..pos].trim_end_matches('\r'), &text[pos + 1..])),
        None => Some((text.trim_end_matches('\r'), "")),
    }
}

/// Accepts any YAML scalar and keeps its textual form.
fn scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => scalar_text(&value)
            .map(Some)
            .ok_or_else(|| de::Error::custom("expected a scalar value")),
    }
}

/// Tags may be a YAML list or a single comma-separated string.
fn tag_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let tags = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(joined)) => joined.split(',').map(str::to_string).collect(),
        Some(Value::Sequence(items)) => items
            .iter()
            .map(|item| {
                scalar_text(item).ok_or_else(|| de::Error::custom("tags must be scalar values"))
            })
            .collect::<Result<_, _>>()?,
        Some(other) => {
            vec![scalar_text(&other).ok_or_else(|| {
                de::Error::custom("tags must be a list or a comma-separated string")
            })?]
        }
    };

    Ok(normalize_tags(tags))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Trim, drop empty entries and keep the first occurrence of each tag.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_block_and_body() {
        let doc = "---\ntitle: Hello\ndate: 2025-06-01\ntags: a, b\n---\n# Body\n";
        let (fm, body) = FrontMatter::parse(doc).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Hello"));
        assert_eq!(fm.date.as_deref(), Some("2025-06-01"));
        assert_eq!(fm.tags, vec!["a", "b"]);
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn no_leading_delimiter_is_all_body() {
        let doc = "Just text\n---\nmore";
        let (fm, body) = FrontMatter::parse(doc).unwrap();
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(body, doc);
    }

    #[test]
    fn unclosed_block_is_all_body() {
        let doc = "---\ntitle: Dangling\n";
        let (fm, body) = FrontMatter::parse(doc).unwrap();
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(body, doc);
    }

    #[test]
    fn empty_block_gives_default() {
        let (fm, body) = FrontMatter::parse("---\n---\nbody").unwrap();
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(body, "body");
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        assert!(FrontMatter::parse("---\ntitle: [unclosed\n---\nbody").is_err());
        assert!(FrontMatter::parse("---\ntags: {a: 1}\n---\n").is_err());
    }

    #[test]
    fn crlf_and_bom_are_tolerated() {
        let doc = "\u{feff}---\r\ntitle: Windows\r\n---\r\nbody";
        let (fm, body) = FrontMatter::parse(doc).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Windows"));
        assert_eq!(body, "body");
    }

    #[test]
    fn tags_accept_lists_and_numbers() {
        let (fm, _) = FrontMatter::parse("---\ntags: [rust, 2024, rust, ' ']\n---\n").unwrap();
        assert_eq!(fm.tags, vec!["rust", "2024"]);

        let (fm, _) = FrontMatter::parse("---\ntitle: 2024\nauthor_id: 42\n---\n").unwrap();
        assert_eq!(fm.title.as_deref(), Some("2024"));
        assert_eq!(fm.author_id.as_deref(), Some("42"));
    }

    #[test]
    fn recognized_fields_round_trip() {
        let mut fm = FrontMatter {
            title: Some("Round trip".into()),
            date: Some("2025-06-01 10:00:00".into()),
            tags: vec!["a".into(), "b c".into()],
            category: Some("notes".into()),
            author_id: Some("42".into()),
            author_name: Some("alice".into()),
            ..Default::default()
        };
        fm.extra.insert("draft".into(), Value::Bool(true));

        let doc = fm.to_document("Body text\n").unwrap();
        let (parsed, body) = FrontMatter::parse(&doc).unwrap();
        assert_eq!(parsed, fm);
        assert_eq!(body, "Body text\n");
    }
}
