use crate::domain::ports::{FormatSink, FormatSource};
use std::fmt;

/// A (mime type, encoding, schema) triple describing a data representation.
///
/// Each field is either absent or a non-empty string; empty input is stored as
/// absent. The same type is used both as a concrete descriptor, where an absent
/// field means "unspecified", and as a constraint, where the `matches_*` family
/// treats an absent field as "accept anything".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Format {
    mime_type: Option<String>,
    encoding: Option<String>,
    schema: Option<String>,
}

impl Format {
    pub const BASE64_ENCODING: &'static str = "Base64";
    pub const UTF8_ENCODING: &'static str = "UTF-8";

    pub fn new<'a>(
        mime_type: impl Into<Option<&'a str>>,
        encoding: impl Into<Option<&'a str>>,
        schema: impl Into<Option<&'a str>>,
    ) -> Self {
        Self {
            mime_type: normalize(mime_type.into()),
            encoding: normalize(encoding.into()),
            schema: normalize(schema.into()),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Reads the three fields of an external descriptor.
    pub fn of<S: FormatSource + ?Sized>(source: &S) -> Self {
        Self::new(source.mime_type(), source.encoding(), source.schema())
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_mime_type() && !self.has_encoding() && !self.has_schema()
    }

    pub fn has_mime_type(&self) -> bool {
        self.mime_type.is_some()
    }

    pub fn has_encoding(&self) -> bool {
        self.encoding.is_some()
    }

    pub fn has_schema(&self) -> bool {
        self.schema.is_some()
    }

    /// Case-insensitive comparison where an absent field and an absent
    /// `value` both count as the empty string.
    pub fn has_mime_type_value<'a>(&self, value: impl Into<Option<&'a str>>) -> bool {
        field_equals(self.mime_type(), value.into())
    }

    pub fn has_encoding_value<'a>(&self, value: impl Into<Option<&'a str>>) -> bool {
        field_equals(self.encoding(), value.into())
    }

    pub fn has_schema_value<'a>(&self, value: impl Into<Option<&'a str>>) -> bool {
        field_equals(self.schema(), value.into())
    }

    pub fn has_same_mime_type(&self, other: &Format) -> bool {
        self.has_mime_type_value(other.mime_type())
    }

    pub fn has_same_encoding(&self, other: &Format) -> bool {
        self.has_encoding_value(other.encoding())
    }

    pub fn has_same_schema(&self, other: &Format) -> bool {
        self.has_schema_value(other.schema())
    }

    pub fn matches_mime_type<'a>(&self, value: impl Into<Option<&'a str>>) -> bool {
        !self.has_mime_type() || self.has_mime_type_value(value)
    }

    pub fn matches_encoding<'a>(&self, value: impl Into<Option<&'a str>>) -> bool {
        !self.has_encoding() || self.has_encoding_value(value)
    }

    pub fn matches_schema<'a>(&self, value: impl Into<Option<&'a str>>) -> bool {
        !self.has_schema() || self.has_schema_value(value)
    }

    pub fn matches_mime_type_of(&self, other: &Format) -> bool {
        !self.has_mime_type() || self.has_same_mime_type(other)
    }

    pub fn matches_encoding_of(&self, other: &Format) -> bool {
        !self.has_encoding() || self.has_same_encoding(other)
    }

    pub fn matches_schema_of(&self, other: &Format) -> bool {
        !self.has_schema() || self.has_same_schema(other)
    }

    /// `self` as a constraint accepts `candidate` on all three fields.
    pub fn matches(&self, candidate: &Format) -> bool {
        self.matches_mime_type_of(candidate)
            && self.matches_encoding_of(candidate)
            && self.matches_schema_of(candidate)
    }

    pub fn with_mime_type<'a>(&self, mime_type: impl Into<Option<&'a str>>) -> Format {
        Format {
            mime_type: normalize(mime_type.into()),
            ..self.clone()
        }
    }

    pub fn with_encoding<'a>(&self, encoding: impl Into<Option<&'a str>>) -> Format {
        Format {
            encoding: normalize(encoding.into()),
            ..self.clone()
        }
    }

    pub fn with_schema<'a>(&self, schema: impl Into<Option<&'a str>>) -> Format {
        Format {
            schema: normalize(schema.into()),
            ..self.clone()
        }
    }

    pub fn with_base64_encoding(&self) -> Format {
        self.with_encoding(Self::BASE64_ENCODING)
    }

    pub fn with_utf8_encoding(&self) -> Format {
        self.with_encoding(Self::UTF8_ENCODING)
    }

    pub fn without_mime_type(&self) -> Format {
        self.with_mime_type(None)
    }

    pub fn without_encoding(&self) -> Format {
        self.with_encoding(None)
    }

    pub fn without_schema(&self) -> Format {
        self.with_schema(None)
    }

    /// Writes the present fields into `sink`, leaving the rest untouched.
    pub fn encode_to<S: FormatSink + ?Sized>(&self, sink: &mut S) {
        if let Some(mime_type) = self.mime_type() {
            sink.set_mime_type(mime_type);
        }
        if let Some(encoding) = self.encoding() {
            sink.set_encoding(encoding);
        }
        if let Some(schema) = self.schema() {
            sink.set_schema(schema);
        }
    }

    /// Predicate over candidates with the same mime type as `self`.
    pub fn matching_mime_type(&self) -> impl Fn(&Format) -> bool + Send + Sync + 'static {
        let reference = self.clone();
        move |candidate| reference.has_same_mime_type(candidate)
    }

    pub fn matching_encoding(&self) -> impl Fn(&Format) -> bool + Send + Sync + 'static {
        let reference = self.clone();
        move |candidate| reference.has_same_encoding(candidate)
    }

    pub fn matching_schema(&self) -> impl Fn(&Format) -> bool + Send + Sync + 'static {
        let reference = self.clone();
        move |candidate| reference.has_same_schema(candidate)
    }
}

impl From<&str> for Format {
    fn from(mime_type: &str) -> Self {
        Format::new(mime_type, None, None)
    }
}

impl FormatSource for Format {
    fn mime_type(&self) -> Option<&str> {
        Format::mime_type(self)
    }

    fn encoding(&self) -> Option<&str> {
        Format::encoding(self)
    }

    fn schema(&self) -> Option<&str> {
        Format::schema(self)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Format{")?;
        let fields = [
            ("mimeType", self.mime_type()),
            ("encoding", self.encoding()),
            ("schema", self.schema()),
        ];
        let mut separator = "";
        for (key, value) in fields {
            if let Some(value) = value {
                write!(f, "{}{}={}", separator, key, value)?;
                separator = ", ";
            }
        }
        f.write_str("}")
    }
}

fn normalize(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_owned)
}

fn field_equals(field: Option<&str>, value: Option<&str>) -> bool {
    eq_ignore_case(field.unwrap_or(""), value.unwrap_or(""))
}

/// Folds one char at a time: equal, equal upper case, or equal lower case of the upper case.
fn eq_ignore_case(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    let mut left = a.chars();
    let mut right = b.chars();
    loop {
        match (left.next(), right.next()) {
            (Some(x), Some(y)) if chars_eq_ignore_case(x, y) => continue,
            (None, None) => return true,
            _ => return false,
        }
    }
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    if a == b {
        return true;
    }
    let (upper_a, upper_b) = (simple_upper(a), simple_upper(b));
    upper_a == upper_b || simple_lower(upper_a) == simple_lower(upper_b)
}

// Single-char mappings; a multi-char upper case leaves the char alone.
fn simple_upper(c: char) -> char {
    let mut mapped = c.to_uppercase();
    match (mapped.next(), mapped.next()) {
        (Some(upper), None) => upper,
        _ => c,
    }
}

// `İ` lower-cases to `i` followed by a combining dot; the leading char is the simple mapping.
fn simple_lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(format: &Format) -> u64 {
        let mut hasher = DefaultHasher::new();
        format.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let format = Format::new("", "", "");
        assert!(!format.has_mime_type());
        assert!(!format.has_encoding());
        assert!(!format.has_schema());
        assert!(format.is_empty());
        assert_eq!(format, Format::empty());
        assert_eq!(hash_of(&format), hash_of(&Format::new(None, None, None)));
    }

    #[test]
    fn test_presence() {
        let format = Format::new("text/xml", None, "http://schemas.example.org/a.xsd");
        assert!(format.has_mime_type());
        assert!(!format.has_encoding());
        assert!(format.has_schema());
        assert!(!format.is_empty());
        assert_eq!(format.mime_type(), Some("text/xml"));
        assert_eq!(format.encoding(), None);
    }

    #[test]
    fn test_value_comparison_is_case_insensitive() {
        let format = Format::from("text/xml");
        assert!(format.has_mime_type_value("TEXT/XML"));
        assert!(format.has_mime_type_value("Text/Xml"));
        assert!(!format.has_mime_type_value("text/plain"));
        assert!(!format.has_mime_type_value(None));
    }

    #[test]
    fn test_absent_field_compares_as_empty_string() {
        let format = Format::empty();
        assert!(format.has_mime_type_value(""));
        assert!(format.has_mime_type_value(None));
        assert!(!format.has_mime_type_value("x"));
        assert!(format.has_same_encoding(&Format::from("a/b")));
    }

    #[test]
    fn test_non_ascii_case_folding() {
        let format = Format::new(None, None, "Schéma");
        assert!(format.has_schema_value("SCHÉMA"));
    }

    #[test]
    fn test_dotted_capital_i_folds_per_char() {
        assert!(Format::from("İ").has_mime_type_value("i"));
        assert!(Format::from("image/tİff").has_mime_type_value("IMAGE/TIFF"));
        assert!(!Format::from("ß").has_mime_type_value("SS"));
    }

    #[test]
    fn test_encoding_and_schema_matching_is_case_insensitive() {
        let constraint = Format::new(None, "utf-8", "S");
        assert!(constraint.matches_encoding("UTF-8"));
        assert!(constraint.matches_schema("s"));
        assert!(!constraint.matches_encoding("Base64"));
        assert!(!constraint.matches_schema("t"));

        let candidate = Format::new("text/xml", "UTF-8", "s");
        assert!(constraint.matches_encoding_of(&candidate));
        assert!(constraint.matches_schema_of(&candidate));
        assert!(constraint.matches(&candidate));
        assert!(!constraint.matches_encoding_of(&candidate.with_base64_encoding()));
        assert!(!constraint.matches_schema_of(&candidate.with_schema("t")));
    }

    #[test]
    fn test_with_accepts_short_lived_values() {
        let base = Format::new("text/xml", "UTF-8", "http://schemas.example.org/a.xsd");
        let derived = {
            let value = String::from("application/gml+xml");
            base.with_mime_type(value.as_str())
        };
        assert_eq!(derived.mime_type(), Some("application/gml+xml"));
        assert_eq!(derived.encoding(), Some("UTF-8"));
        assert_eq!(derived.schema(), base.schema());

        let schema = String::from("http://schemas.example.org/b.xsd");
        let rebased = base.with_schema(schema.as_str()).with_encoding(String::new().as_str());
        assert_eq!(rebased.schema(), Some("http://schemas.example.org/b.xsd"));
        assert!(!rebased.has_encoding());
    }

    #[test]
    fn test_absent_constraint_matches_everything() {
        assert!(Format::empty().matches_mime_type("anything"));
        assert!(Format::empty().matches_mime_type(None));
        assert!(Format::from("a/b").matches_mime_type("a/b"));
        assert!(!Format::from("a/b").matches_mime_type("c/d"));
        assert!(!Format::from("a/b").matches_mime_type(None));
    }

    #[test]
    fn test_constraint_against_candidate() {
        let constraint = Format::new("text/xml", None, None);
        let candidate = Format::new("text/xml", "UTF-8", None);
        assert!(constraint.matches_mime_type_of(&candidate));
        assert!(constraint.matches_encoding_of(&candidate));
        assert!(constraint.matches_schema_of(&candidate));
        assert!(constraint.matches(&candidate));
        // the reverse direction constrains encoding
        assert!(!candidate.matches(&constraint));
    }

    #[test]
    fn test_with_replaces_exactly_one_field() {
        let original = Format::new("a/b", "UTF-8", "s");
        let changed = original.with_mime_type("c/d");
        assert_eq!(changed.mime_type(), Some("c/d"));
        assert_eq!(changed.encoding(), Some("UTF-8"));
        assert_eq!(changed.schema(), Some("s"));
        assert_eq!(original.mime_type(), Some("a/b"));

        assert_eq!(original.with_schema("").schema(), None);
        assert_eq!(original.with_encoding(None), original.without_encoding());
    }

    #[test]
    fn test_without_clears_field() {
        let original = Format::new("a/b", "UTF-8", "s");
        assert_eq!(original.without_mime_type(), Format::new(None, "UTF-8", "s"));
        assert_eq!(original.without_encoding(), Format::new("a/b", None, "s"));
        assert_eq!(original.without_schema(), Format::new("a/b", "UTF-8", None));
    }

    #[test]
    fn test_encoding_shorthands() {
        let format = Format::from("image/tiff");
        assert_eq!(format.with_base64_encoding().encoding(), Some("Base64"));
        assert_eq!(format.with_utf8_encoding().encoding(), Some("UTF-8"));
    }

    #[test]
    fn test_equality_and_hash() {
        let a = Format::new("a", "b", "c");
        let b = Format::new("a", "b", "c");
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, Format::new("a", "b", None));
        // equality is exact, only matching ignores case
        assert_ne!(Format::from("A"), Format::from("a"));
    }

    #[test]
    fn test_display_omits_absent_fields() {
        assert_eq!(Format::from("a/b").to_string(), "Format{mimeType=a/b}");
        assert_eq!(
            Format::new("a/b", None, "s").to_string(),
            "Format{mimeType=a/b, schema=s}"
        );
        assert_eq!(Format::empty().to_string(), "Format{}");
    }

    #[test]
    fn test_predicates_filter_independently() {
        let reference = Format::new("text/xml", "UTF-8", None);
        let candidates = vec![
            Format::new("text/xml", "UTF-8", None),
            Format::new("TEXT/XML", "Base64", None),
            Format::new("application/json", "utf-8", None),
        ];

        let by_mime_type = reference.matching_mime_type();
        assert_eq!(candidates.iter().filter(|f| by_mime_type(*f)).count(), 2);

        let by_encoding = reference.matching_encoding();
        assert_eq!(candidates.iter().filter(|f| by_encoding(*f)).count(), 2);

        let by_schema = reference.matching_schema();
        let both: Vec<&Format> = candidates
            .iter()
            .filter(|f| by_mime_type(*f) && by_encoding(*f) && by_schema(*f))
            .collect();
        assert_eq!(both, vec![&candidates[0]]);
    }

    #[test]
    fn test_format_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Format>();

        let shared = std::sync::Arc::new(Format::from("text/xml"));
        let handle = {
            let shared = shared.clone();
            std::thread::spawn(move || shared.matches_mime_type("text/XML"))
        };
        assert!(handle.join().unwrap());
    }
}
