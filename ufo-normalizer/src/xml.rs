//! Writing canonical XML.
//!
//! Output is a list of lines joined with `\n`, indented with one tab per
//! nesting level. Attribute order is whatever the caller passes in; each
//! element kind owns an [`AttributeSchema`] that fixes it.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::{
    error::Error,
    number::{format_float, format_int, is_exact_integer},
    plist::Plist,
};

pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
pub const PLIST_DOCTYPE: &str = r#"<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">"#;

// base64 payloads are wrapped like plistlib does
const DATA_LINE_LENGTH: usize = 76;

/// An attribute name paired with its already-formatted value.
pub type Attribute = (&'static str, String);

/// Escape character data.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

/// Escape an attribute value; like [`escape_text`] plus double quotes.
pub fn escape_attribute(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}

/// Render attributes as `name="value"` pairs in the given order.
pub fn attributes_to_string(attrs: &[Attribute]) -> String {
    attrs
        .iter()
        .map(|(name, value)| format!("{name}=\"{}\"", escape_attribute(value)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Accumulates canonical XML text.
#[derive(Clone, Debug, Default)]
pub struct XmlWriter {
    lines: Vec<String>,
    depth: usize,
}

impl XmlWriter {
    /// A writer with no preamble, for fragments.
    pub fn new() -> XmlWriter {
        XmlWriter::default()
    }

    /// A writer that starts with the XML declaration.
    pub fn with_declaration() -> XmlWriter {
        XmlWriter {
            lines: vec![XML_DECLARATION.to_string()],
            depth: 0,
        }
    }

    /// A writer for a complete property list file.
    ///
    /// Call [`XmlWriter::finish_plist`] after writing the root value.
    pub fn for_plist() -> XmlWriter {
        let mut writer = XmlWriter::with_declaration();
        writer.lines.push(PLIST_DOCTYPE.to_string());
        writer.begin_element("plist", &[("version", "1.0".to_string())]);
        writer
    }

    pub fn finish_plist(&mut self) {
        self.end_element("plist");
    }

    fn push_line(&mut self, line: String) {
        let mut indented = "\t".repeat(self.depth);
        indented.push_str(&line);
        self.lines.push(indented);
    }

    fn open_tag(tag: &str, attrs: &[Attribute]) -> String {
        if attrs.is_empty() {
            format!("<{tag}")
        } else {
            format!("<{tag} {}", attributes_to_string(attrs))
        }
    }

    pub fn begin_element(&mut self, tag: &str, attrs: &[Attribute]) {
        let line = format!("{}>", Self::open_tag(tag, attrs));
        self.push_line(line);
        self.depth += 1;
    }

    pub fn end_element(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.push_line(format!("</{tag}>"));
    }

    /// An element on a single line.
    ///
    /// Without a value this is self-closing (`<tag/>`); an empty value still
    /// produces an open/close pair.
    pub fn simple_element(&mut self, tag: &str, attrs: &[Attribute], value: Option<&str>) {
        let open = Self::open_tag(tag, attrs);
        let line = match value {
            Some(value) => format!("{open}>{}</{tag}>", escape_text(value)),
            None => format!("{open}/>"),
        };
        self.push_line(line);
    }

    /// A line of escaped character data at the current depth.
    pub fn text_line(&mut self, text: &str) {
        self.push_line(escape_text(text));
    }

    /// Serialize a property list value at the current depth.
    ///
    /// `Null` writes nothing.
    pub fn write_plist(&mut self, value: &Plist) -> Result<(), Error> {
        match value {
            Plist::Null => (),
            Plist::Boolean(true) => self.simple_element("true", &[], None),
            Plist::Boolean(false) => self.simple_element("false", &[], None),
            Plist::Integer(i) => self.simple_element("integer", &[], Some(&format_int(*i))),
            Plist::Float(f) => {
                let f = f.into_inner();
                if !f.is_finite() {
                    return Err(Error::UnsupportedValue("non-finite real"));
                }
                let tag = if is_exact_integer(f) {
                    "integer"
                } else {
                    "real"
                };
                self.simple_element(tag, &[], Some(&format_float(f)));
            }
            Plist::String(s) => self.simple_element("string", &[], Some(s)),
            Plist::Date(date) => {
                let text = date.format("%Y-%m-%dT%H:%M:%SZ").to_string();
                self.simple_element("date", &[], Some(&text));
            }
            Plist::Data(bytes) => {
                self.begin_element("data", &[]);
                let encoded = STANDARD.encode(bytes);
                // base64 is ascii, so byte chunks are char boundaries
                for chunk in encoded.as_bytes().chunks(DATA_LINE_LENGTH) {
                    self.push_line(String::from_utf8_lossy(chunk).into_owned());
                }
                self.end_element("data");
            }
            Plist::Array(items) => {
                self.begin_element("array", &[]);
                for item in items {
                    self.write_plist(item)?;
                }
                self.end_element("array");
            }
            Plist::Dictionary(dict) => {
                self.begin_element("dict", &[]);
                for (key, item) in dict {
                    self.simple_element("key", &[], Some(key));
                    self.write_plist(item)?;
                }
                self.end_element("dict");
            }
        }
        Ok(())
    }

    /// The accumulated text, without a trailing newline.
    pub fn into_text(self) -> String {
        self.lines.join("\n")
    }
}

/// Whether an attribute must be present for its element to be written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

/// The canonical attribute order for one element kind.
#[derive(Clone, Copy, Debug)]
pub struct AttributeSchema {
    pub tag: &'static str,
    pub attributes: &'static [(&'static str, Presence)],
}

impl AttributeSchema {
    /// Arrange normalized attribute values in schema order.
    ///
    /// Returns `None` if a required attribute has no value, meaning the
    /// element must be dropped. Values for names outside the schema are
    /// ignored.
    pub fn arrange(&self, mut values: Vec<Attribute>) -> Option<Vec<Attribute>> {
        let mut arranged = Vec::with_capacity(values.len());
        for (name, presence) in self.attributes {
            match values.iter().position(|(key, _)| key == name) {
                Some(idx) => arranged.push(values.swap_remove(idx)),
                None if *presence == Presence::Required => return None,
                None => (),
            }
        }
        Some(arranged)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn plist_text(value: &Plist) -> String {
        let mut writer = XmlWriter::new();
        writer.write_plist(value).unwrap();
        writer.into_text()
    }

    fn dict(items: Vec<(&str, Plist)>) -> Plist {
        Plist::Dictionary(
            items
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect::<IndexMap<_, _>>(),
        )
    }

    #[rstest]
    #[case("&", "&amp;")]
    #[case("<", "&lt;")]
    #[case(">", "&gt;")]
    #[case("a", "a")]
    #[case("ä", "ä")]
    #[case("𐐀", "𐐀")]
    #[case("—", "—")]
    #[case("1.0", "1.0")]
    #[case("'", "'")]
    #[case("\"", "\"")]
    #[case("/", "/")]
    #[case("\\", "\\")]
    #[case("\r", "\r")]
    fn text_escapes(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(escape_text(raw), expected);
    }

    #[test]
    fn attribute_escapes() {
        assert_eq!(escape_attribute("\""), "&quot;");
        assert_eq!(escape_attribute("'"), "'");
        assert_eq!(escape_attribute("a&b"), "a&amp;b");
        assert_eq!(escape_attribute("\\"), "\\");
    }

    #[test]
    fn attributes_keep_caller_order() {
        let attrs = vec![
            ("x", "1".to_string()),
            ("y", "2.1".to_string()),
            ("a", "blah".to_string()),
        ];
        assert_eq!(attributes_to_string(&attrs), r#"x="1" y="2.1" a="blah""#);
    }

    #[test]
    fn nested_elements_are_tab_indented() {
        let mut writer = XmlWriter::with_declaration();
        writer.begin_element("glyph", &[("name", "a".into())]);
        writer.simple_element("advance", &[("width", "10".into())], None);
        writer.end_element("glyph");
        assert_eq!(
            writer.into_text(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<glyph name=\"a\">\n\t<advance width=\"10\"/>\n</glyph>"
        );
    }

    #[test]
    fn arrays() {
        assert_eq!(plist_text(&Plist::Array(vec![])), "<array>\n</array>");
        assert_eq!(
            plist_text(&Plist::Array(vec![Plist::String("a".into())])),
            "<array>\n\t<string>a</string>\n</array>"
        );
        assert_eq!(
            plist_text(&Plist::Array(vec![Plist::Null])),
            "<array>\n</array>"
        );
        assert_eq!(
            plist_text(&Plist::Array(vec![Plist::Boolean(false)])),
            "<array>\n\t<false/>\n</array>"
        );
    }

    #[test]
    fn dictionaries() {
        assert_eq!(plist_text(&dict(vec![])), "<dict>\n</dict>");
        assert_eq!(
            plist_text(&dict(vec![("a", Plist::String("b".into()))])),
            "<dict>\n\t<key>a</key>\n\t<string>b</string>\n</dict>"
        );
        assert_eq!(
            plist_text(&dict(vec![("a&b", Plist::String("b&a".into()))])),
            "<dict>\n\t<key>a&amp;b</key>\n\t<string>b&amp;a</string>\n</dict>"
        );
        assert_eq!(
            plist_text(&dict(vec![("a", Plist::from(20.2))])),
            "<dict>\n\t<key>a</key>\n\t<real>20.2</real>\n</dict>"
        );
        assert_eq!(
            plist_text(&dict(vec![("a", Plist::from(20.0))])),
            "<dict>\n\t<key>a</key>\n\t<integer>20</integer>\n</dict>"
        );
        assert_eq!(
            plist_text(&dict(vec![("", Plist::String("".into()))])),
            "<dict>\n\t<key></key>\n\t<string></string>\n</dict>"
        );
        assert_eq!(
            plist_text(&dict(vec![("", Plist::Null)])),
            "<dict>\n\t<key></key>\n</dict>"
        );
    }

    #[rstest]
    #[case(Plist::String("a".into()), "<string>a</string>")]
    #[case(Plist::String("&".into()), "<string>&amp;</string>")]
    #[case(Plist::String("1.000".into()), "<string>1.000</string>")]
    #[case(Plist::String("".into()), "<string></string>")]
    #[case(Plist::Boolean(true), "<true/>")]
    #[case(Plist::Boolean(false), "<false/>")]
    #[case(Plist::from(1.1), "<real>1.1</real>")]
    #[case(Plist::from(-1.1), "<real>-1.1</real>")]
    #[case(Plist::from(1.0), "<integer>1</integer>")]
    #[case(Plist::from(-1.0), "<integer>-1</integer>")]
    #[case(Plist::from(-0.0), "<integer>0</integer>")]
    #[case(Plist::Integer(2015 - 1 - 1), "<integer>2013</integer>")]
    #[case(Plist::Null, "")]
    fn scalars(#[case] value: Plist, #[case] expected: &str) {
        assert_eq!(plist_text(&value), expected);
    }

    #[test]
    fn dates() {
        let date = Utc.with_ymd_and_hms(2012, 9, 1, 0, 0, 0).unwrap();
        assert_eq!(
            plist_text(&Plist::Date(date)),
            "<date>2012-09-01T00:00:00Z</date>"
        );
        let date = Utc.with_ymd_and_hms(2009, 11, 29, 16, 31, 53).unwrap();
        assert_eq!(
            plist_text(&Plist::Date(date)),
            "<date>2009-11-29T16:31:53Z</date>"
        );
    }

    #[test]
    fn data() {
        assert_eq!(
            plist_text(&Plist::Data(b"abc".to_vec())),
            "<data>\n\tYWJj\n</data>"
        );
        let long = plist_text(&Plist::Data(vec![0; 100]));
        let lines: Vec<_> = long.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1].len(), DATA_LINE_LENGTH + 1);
    }

    #[test]
    fn non_finite_reals_are_unsupported() {
        let mut writer = XmlWriter::new();
        let err = writer.write_plist(&Plist::from(f64::NAN)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedValue(_)), "{err}");
    }

    #[test]
    fn plist_file_preamble() {
        let mut writer = XmlWriter::for_plist();
        writer.write_plist(&dict(vec![])).unwrap();
        writer.finish_plist();
        assert_eq!(
            writer.into_text(),
            format!(
                "{XML_DECLARATION}\n{PLIST_DOCTYPE}\n<plist version=\"1.0\">\n\t<dict>\n\t</dict>\n</plist>"
            )
        );
    }

    #[test]
    fn schema_orders_and_requires() {
        const SCHEMA: AttributeSchema = AttributeSchema {
            tag: "anchor",
            attributes: &[
                ("name", Presence::Optional),
                ("x", Presence::Required),
                ("y", Presence::Required),
            ],
        };
        let arranged = SCHEMA
            .arrange(vec![
                ("y", "2".into()),
                ("bogus", "1".into()),
                ("x", "1".into()),
            ])
            .unwrap();
        assert_eq!(arranged, vec![("x", "1".into()), ("y", "2".into())]);
        assert!(SCHEMA.arrange(vec![("x", "1".into())]).is_none());
    }
}
