//! Front matter codec.
//!
//! Files are a YAML block between two literal `---` markers followed by a
//! free-form body:
//!
//! ```text
//! ---
//! title: Hello
//! ---
//! World
//! ```
//!
//! Markers are whole lines; a `---` inside a value is plain text. Parsing is
//! tolerant: missing markers or invalid YAML yield empty fields and body, with
//! a warning.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use regex::Regex;
use serde::Serialize;
use tracing::warn;

use crate::error::SiteError;

/// Front matter marker.
const DELIMITER: &str = "---";

/// A marker line, with or without a carriage return.
static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^---\r?$").unwrap());

/// Structured front matter fields.
pub type Fields = BTreeMap<String, serde_yaml::Value>;

/// Parsed fields and body of a content file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrontMatter {
    pub fields: Fields,
    pub body: String,
}

impl FrontMatter {
    /// Create from fields and body.
    pub fn new(fields: Fields, body: impl Into<String>) -> Self {
        Self {
            fields,
            body: body.into(),
        }
    }

    /// Render as `---\n<yaml>\n---\n<body>\n`.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Serialize`] if a field value cannot be dumped.
    pub fn serialize(&self) -> Result<String, SiteError> {
        let yaml = serde_yaml::to_string(&self.fields).map_err(SiteError::Serialize)?;
        Ok(format!("{DELIMITER}\n{yaml}\n{DELIMITER}\n{}\n", self.body))
    }

    /// Render and base64-encode for upload.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Serialize`] if a field value cannot be dumped.
    pub fn to_base64(&self) -> Result<String, SiteError> {
        Ok(BASE64_STANDARD.encode(self.serialize()?))
    }
}

/// Parse a content file.
///
/// The YAML block sits between the first two marker lines; everything after
/// the second is the body (later marker lines are kept verbatim). The line
/// break that ends the second marker and the final line break are not part of
/// the body.
pub fn parse(text: &str) -> FrontMatter {
    let mut markers = MARKER_RE.find_iter(text);
    let (Some(open), Some(close)) = (markers.next(), markers.next()) else {
        if !text.trim().is_empty() {
            warn!("Missing front matter, ignoring content");
        }
        return FrontMatter::default();
    };

    let Some(fields) = parse_fields(&text[open.end()..close.start()]) else {
        return FrontMatter::default();
    };

    let crlf = close.as_str().ends_with('\r');
    FrontMatter {
        fields,
        body: trim_body(&text[close.end()..], crlf).to_owned(),
    }
}

/// Parse the YAML block. `None` if it is not a mapping.
fn parse_fields(yaml: &str) -> Option<Fields> {
    let value = match serde_yaml::from_str::<serde_yaml::Value>(yaml) {
        Ok(value) => value,
        Err(e) => {
            warn!("Invalid front matter fields: {e}");
            return None;
        }
    };

    match value {
        serde_yaml::Value::Null => Some(Fields::new()),
        serde_yaml::Value::Mapping(_) => match serde_yaml::from_value(value) {
            Ok(fields) => Some(fields),
            Err(e) => {
                warn!("Invalid front matter fields: {e}");
                None
            }
        },
        _ => {
            warn!("Front matter is not a mapping");
            None
        }
    }
}

/// Drop the line break after the closing marker and the final one. A
/// trailing `\r\n` only counts as a line break in a CRLF file.
fn trim_body(body: &str, crlf: bool) -> &str {
    let body = body.strip_prefix('\n').unwrap_or(body);
    let ending = if crlf { "\r\n" } else { "\n" };
    body.strip_suffix(ending).unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_yaml::Value;

    use super::*;

    fn fields(yaml: &str) -> Fields {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_parse_fields_and_body() {
        let parsed = parse("---\ntitle: Hello\ntags: [a, b]\n---\nWorld\n");

        assert_eq!(parsed.fields, fields("title: Hello\ntags: [a, b]"));
        assert_eq!(parsed.body, "World");
    }

    #[test]
    fn test_parse_keeps_later_delimiters_in_body() {
        let parsed = parse("---\ntitle: x\n---\nbefore\n---\nafter\n");

        assert_eq!(parsed.body, "before\n---\nafter");
    }

    #[test]
    fn test_parse_without_delimiter_is_empty() {
        assert_eq!(parse("just some text"), FrontMatter::default());
        assert_eq!(parse(""), FrontMatter::default());
    }

    #[test]
    fn test_parse_single_delimiter_is_empty() {
        assert_eq!(parse("---\ntitle: x\n"), FrontMatter::default());
    }

    #[test]
    fn test_parse_invalid_yaml_is_empty() {
        assert_eq!(
            parse("---\ntitle: [unclosed\n---\nbody\n"),
            FrontMatter::default()
        );
    }

    #[test]
    fn test_parse_scalar_front_matter_is_empty() {
        assert_eq!(parse("---\njust a string\n---\nbody\n"), FrontMatter::default());
    }

    #[test]
    fn test_parse_empty_front_matter() {
        let parsed = parse("---\n---\nbody\n");

        assert!(parsed.fields.is_empty());
        assert_eq!(parsed.body, "body");
    }

    #[test]
    fn test_parse_crlf() {
        let parsed = parse("---\r\ntitle: x\r\n---\r\nbody\r\n");

        assert_eq!(parsed.fields, fields("title: x"));
        assert_eq!(parsed.body, "body");
    }

    #[test]
    fn test_parse_inline_dashes_are_not_markers() {
        let parsed = parse("---\ntitle: Part 1---Intro\n---\nWorld\n");

        assert_eq!(parsed.fields, fields("title: Part 1---Intro"));
        assert_eq!(parsed.body, "World");
    }

    #[test]
    fn test_parse_keeps_trailing_carriage_return() {
        let parsed = parse("---\ntitle: x\n---\nline\r\n");

        assert_eq!(parsed.body, "line\r");
    }

    #[test]
    fn test_parse_marker_needs_whole_line() {
        assert_eq!(
            parse("--- title: x\n---\nbody\n"),
            FrontMatter::default()
        );
    }

    #[test]
    fn test_serialize_format() {
        let fm = FrontMatter::new(fields("title: Hi"), "World");

        assert_eq!(fm.serialize().unwrap(), "---\ntitle: Hi\n\n---\nWorld\n");
    }

    #[test]
    fn test_round_trip() {
        let cases = [
            FrontMatter::new(fields("title: Hi"), "World"),
            FrontMatter::new(Fields::new(), ""),
            FrontMatter::new(
                fields("title: \"quoted: value\"\ncount: 3\nnested:\n  list: [1, 2]\ndraft: false"),
                "line one\n\nline three",
            ),
            FrontMatter::new(fields("title: x"), "\nstarts blank and ends blank\n"),
            FrontMatter::new(fields("title: x"), "horizontal\n---\nrule"),
            FrontMatter::new(fields("multi: |\n  a\n  b\n"), "body"),
            FrontMatter::new(fields("title: \"Part 1---Intro\""), "World"),
            FrontMatter::new(fields("rule: \"---\"\nblock: |\n  above\n  ---\n  below\n"), "x"),
            FrontMatter::new(Fields::new(), "line\r"),
            FrontMatter::new(fields("title: x"), "windows\r\nbody\r\n"),
        ];

        for fm in cases {
            assert_eq!(parse(&fm.serialize().unwrap()), fm);
        }
    }

    #[test]
    fn test_to_base64() {
        let fm = FrontMatter::new(fields("title: Hi"), "World");

        let decoded = BASE64_STANDARD.decode(fm.to_base64().unwrap()).unwrap();

        assert_eq!(String::from_utf8(decoded).unwrap(), fm.serialize().unwrap());
    }

    #[test]
    fn test_non_string_values_survive() {
        let parsed = parse("---\ncount: 3\ndate: 2024-01-02\n---\n");

        assert_eq!(parsed.fields["count"], Value::from(3));
        assert_eq!(parsed.body, "");
    }
}
