//! # Text Templates
//!
//! Field substitution for text blocks.
//!
//! ## Syntax
//!
//! | Input | Output |
//! |-------|--------|
//! | `{name}` | value of field `name`, or nothing if absent |
//! | `{{` / `}}` | a literal `{` / `}` |
//! | `{` with no closing brace | a literal `{` followed by the rest |
//!
//! There are no format specs or conversions: `{qty:>4}` looks up a field
//! literally named `qty:>4`. Substitution cannot fail.
//!
//! ## Example
//!
//! ```
//! use pallet_label::record::Record;
//! use pallet_label::template::Template;
//!
//! let template = Template::parse("Destination: {destination}");
//! let record = Record::new([("pallet_id", "PAL-001")]);
//! assert_eq!(template.render(&record), "Destination:");
//! ```

use crate::record::FieldLookup;

/// One parsed piece of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// A parsed text template, reusable across records.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a template string. Never fails: malformed braces are kept as text.
    pub fn parse(source: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((idx, ch)) = chars.next() {
            match ch {
                '{' if chars.peek().map(|&(_, c)| c) == Some('{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek().map(|&(_, c)| c) == Some('}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => match source[idx + 1..].find('}') {
                    Some(len) => {
                        let name = &source[idx + 1..idx + 1 + len];
                        if !literal.is_empty() {
                            segments.push(Segment::Literal(std::mem::take(&mut literal)));
                        }
                        segments.push(Segment::Field(name.to_string()));
                        // Skip the name and its closing brace
                        for _ in 0..name.chars().count() + 1 {
                            chars.next();
                        }
                    }
                    None => literal.push('{'),
                },
                other => literal.push(other),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self {
            source: source.to_string(),
            segments,
        }
    }

    /// The template text as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Names of the fields this template references, in order of appearance.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Field(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Substitute `fields` into the template and trim the result.
    pub fn render(&self, fields: &impl FieldLookup) -> String {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(name) => out.push_str(fields.field(name)),
            }
        }
        out.trim().to_string()
    }
}

/// Parse `source` and render it against `fields` in one step.
pub fn substitute(source: &str, fields: &impl FieldLookup) -> String {
    Template::parse(source).render(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    fn record() -> Record {
        Record::new([
            ("pallet_id", "PAL-001"),
            ("destination", "Dock 7"),
            ("contents", "20x Widget A"),
        ])
    }

    #[test]
    fn test_simple_substitution() {
        assert_eq!(substitute("Pallet: {pallet_id}", &record()), "Pallet: PAL-001");
    }

    #[test]
    fn test_missing_field_is_empty() {
        let r = Record::new([("pallet_id", "PAL-001")]);
        assert_eq!(substitute("Destination: {destination}", &r), "Destination:");
        assert_eq!(substitute("{destination} / {pallet_id}", &r), "/ PAL-001");
    }

    #[test]
    fn test_multiple_fields_and_newlines() {
        let t = Template::parse("{pallet_id}\n{contents}");
        assert_eq!(t.render(&record()), "PAL-001\n20x Widget A");
        assert_eq!(t.fields().collect::<Vec<_>>(), vec!["pallet_id", "contents"]);
    }

    #[test]
    fn test_escaped_braces() {
        assert_eq!(substitute("{{{pallet_id}}}", &record()), "{PAL-001}");
        assert_eq!(substitute("{{literal}}", &record()), "{literal}");
    }

    #[test]
    fn test_unterminated_brace_kept_literally() {
        assert_eq!(substitute("size {w", &record()), "size {w");
        assert_eq!(substitute("a } b", &record()), "a } b");
    }

    #[test]
    fn test_format_spec_is_not_interpreted() {
        assert_eq!(substitute("[{pallet_id:>10}]", &record()), "[]");
    }

    #[test]
    fn test_empty_placeholder() {
        assert_eq!(substitute("x{}y", &record()), "xy");
    }

    #[test]
    fn test_non_ascii_field_values() {
        let r = Record::new([("destination", "Zürich Süd")]);
        assert_eq!(substitute("→ {destination} ←", &r), "→ Zürich Süd ←");
    }

    #[test]
    fn test_output_is_trimmed() {
        assert_eq!(substitute("  {pallet_id}  ", &record()), "PAL-001");
    }

    #[test]
    fn test_no_placeholder_syntax_leaks() {
        let empty = Record::default();
        for src in ["{a}{b}{c}", "Pallet: {pallet_id}", "{x} and {y}"] {
            let out = substitute(src, &empty);
            assert!(!out.contains('{') && !out.contains('}'), "{src:?} -> {out:?}");
        }
    }
}
