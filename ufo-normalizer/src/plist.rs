//! Property list values and their XML representation.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use ordered_float::OrderedFloat;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::{error::Error, number::Number, tree::ElementNode, xml::XmlWriter};

/// A plist dictionary; keys keep their document order.
pub type Dictionary = IndexMap<String, Plist>;

/// An array of plist values
pub type Array = Vec<Plist>;

/// An enum representing a property list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Plist {
    /// An absent value; written as nothing at all.
    Null,
    Boolean(bool),
    Integer(i64),
    Float(OrderedFloat<f64>),
    String(String),
    Date(DateTime<Utc>),
    Data(Vec<u8>),
    Array(Array),
    Dictionary(Dictionary),
}

impl Plist {
    /// Convert an XML property list element (`<dict>`, `<string>`, ...).
    pub fn from_element(element: &ElementNode) -> Result<Plist, Error> {
        let text = element.text.as_deref().unwrap_or_default();
        let value = match element.tag.as_str() {
            "dict" => {
                let mut dict = Dictionary::new();
                let mut pending_key: Option<String> = None;
                for child in &element.children {
                    if child.tag == "key" {
                        if let Some(key) = pending_key.take() {
                            dict.insert(key, Plist::Null);
                        }
                        pending_key = Some(child.text.clone().unwrap_or_default());
                        continue;
                    }
                    let Some(key) = pending_key.take() else {
                        return Err(Error::UnexpectedPlistType {
                            expected: "key",
                            found: tag_name(&child.tag),
                        });
                    };
                    dict.insert(key, Plist::from_element(child)?);
                }
                if let Some(key) = pending_key {
                    dict.insert(key, Plist::Null);
                }
                Plist::Dictionary(dict)
            }
            "array" => Plist::Array(
                element
                    .children
                    .iter()
                    .map(Plist::from_element)
                    .collect::<Result<_, _>>()?,
            ),
            "string" => Plist::String(text.to_string()),
            "integer" => {
                let trimmed = text.trim();
                match trimmed.parse::<i64>() {
                    Ok(i) => Plist::Integer(i),
                    // too large for an i64, keep the magnitude at least
                    Err(_) => trimmed
                        .parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite() && f.fract() == 0.0)
                        .map(Plist::from)
                        .ok_or_else(|| invalid("integer", text))?,
                }
            }
            "real" => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Plist::from)
                .ok_or_else(|| invalid("real", text))?,
            "true" => Plist::Boolean(true),
            "false" => Plist::Boolean(false),
            "date" => DateTime::parse_from_rfc3339(text.trim())
                .map(|date| Plist::Date(date.with_timezone(&Utc)))
                .map_err(|_| invalid("date", text))?,
            "data" => {
                let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
                STANDARD
                    .decode(compact)
                    .map(Plist::Data)
                    .map_err(|_| invalid("data", text))?
            }
            other => return Err(Error::UnknownPlistElement(other.to_string())),
        };
        Ok(value)
    }

    /// Convert the root `<plist>` element of a property list file.
    ///
    /// An empty `<plist/>` is `Null`.
    pub fn from_document(root: &ElementNode) -> Result<Plist, Error> {
        if root.tag != "plist" {
            return Plist::from_element(root);
        }
        match root.children.first() {
            Some(value) => Plist::from_element(value),
            None => Ok(Plist::Null),
        }
    }

    /// The canonical text of a whole property list file.
    pub fn to_document(&self) -> Result<String, Error> {
        let mut writer = XmlWriter::for_plist();
        writer.write_plist(self)?;
        writer.finish_plist();
        Ok(writer.into_text())
    }

    /// The descriptive kind of this value, used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Plist::Null => "null",
            Plist::Boolean(..) => "boolean",
            Plist::Integer(..) => "integer",
            Plist::Float(..) => "real",
            Plist::String(..) => "string",
            Plist::Date(..) => "date",
            Plist::Data(..) => "data",
            Plist::Array(..) => "array",
            Plist::Dictionary(..) => "dictionary",
        }
    }

    pub fn get(&self, key: &str) -> Option<&Plist> {
        match self {
            Plist::Dictionary(d) => d.get(key),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dictionary> {
        match self {
            Plist::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut Dictionary> {
        match self {
            Plist::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Plist]> {
        match self {
            Plist::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Plist::String(s) => Some(s),
            _ => None,
        }
    }

    /// The value as a number, if it is an integer or a real.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Plist::Integer(i) => Some(Number::Integer(*i)),
            Plist::Float(f) => Some(Number::Real(f.into_inner())),
            _ => None,
        }
    }

    pub fn expect_dict(self) -> Result<Dictionary, Error> {
        match self {
            Plist::Dictionary(dict) => Ok(dict),
            other => Err(Error::UnexpectedPlistType {
                expected: "dictionary",
                found: other.name(),
            }),
        }
    }

    pub fn expect_array(self) -> Result<Array, Error> {
        match self {
            Plist::Array(array) => Ok(array),
            other => Err(Error::UnexpectedPlistType {
                expected: "array",
                found: other.name(),
            }),
        }
    }

    pub fn expect_string(self) -> Result<String, Error> {
        match self {
            Plist::String(string) => Ok(string),
            other => Err(Error::UnexpectedPlistType {
                expected: "string",
                found: other.name(),
            }),
        }
    }
}

fn invalid(tag: &'static str, text: &str) -> Error {
    Error::InvalidPlistValue {
        tag,
        value: text.to_string(),
    }
}

// error messages want a static name for the element we choked on
fn tag_name(tag: &str) -> &'static str {
    match tag {
        "dict" => "dictionary",
        "array" => "array",
        "string" => "string",
        "integer" => "integer",
        "real" => "real",
        "true" | "false" => "boolean",
        "date" => "date",
        "data" => "data",
        _ => "unknown element",
    }
}

impl From<String> for Plist {
    fn from(x: String) -> Plist {
        Plist::String(x)
    }
}

impl From<&str> for Plist {
    fn from(x: &str) -> Plist {
        Plist::String(x.to_string())
    }
}

impl From<i64> for Plist {
    fn from(x: i64) -> Plist {
        Plist::Integer(x)
    }
}

impl From<f64> for Plist {
    fn from(x: f64) -> Plist {
        Plist::Float(x.into())
    }
}

impl From<bool> for Plist {
    fn from(x: bool) -> Plist {
        Plist::Boolean(x)
    }
}

impl From<Vec<Plist>> for Plist {
    fn from(x: Vec<Plist>) -> Plist {
        Plist::Array(x)
    }
}

impl From<Dictionary> for Plist {
    fn from(x: Dictionary) -> Plist {
        Plist::Dictionary(x)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::tree;

    fn convert(xml: &str) -> Plist {
        Plist::from_element(&tree::parse(xml).unwrap()).unwrap()
    }

    #[test]
    fn arrays() {
        assert_eq!(convert("<array></array>"), Plist::Array(vec![]));
        assert_eq!(
            convert("<array><integer>0</integer><real>.1</real></array>"),
            Plist::Array(vec![Plist::Integer(0), Plist::from(0.1)])
        );
    }

    #[test]
    fn dictionaries() {
        assert_eq!(convert("<dict></dict>"), Plist::Dictionary(Dictionary::new()));
        let converted = convert("<dict><key>foo</key><string>bar</string></dict>");
        assert_eq!(converted.get("foo"), Some(&Plist::from("bar")));
    }

    #[test]
    fn dictionary_keeps_key_order() {
        let converted = convert(
            "<dict><key>z</key><true/><key>a</key><false/><key>m</key><integer>1</integer></dict>",
        );
        let keys: Vec<_> = converted.as_dict().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn dangling_key_is_null() {
        let converted = convert("<dict><key>a</key></dict>");
        assert_eq!(converted.get("a"), Some(&Plist::Null));
    }

    #[test]
    fn value_without_key_is_an_error() {
        let root = tree::parse("<dict><string>a</string></dict>").unwrap();
        assert!(Plist::from_element(&root).is_err());
    }

    #[test]
    fn scalars() {
        assert_eq!(convert("<string>foo</string>"), Plist::from("foo"));
        assert_eq!(convert("<string> foo </string>"), Plist::from(" foo "));
        assert_eq!(convert("<string/>"), Plist::from(""));
        assert_eq!(convert("<true />"), Plist::Boolean(true));
        assert_eq!(convert("<false />"), Plist::Boolean(false));
        assert_eq!(convert("<real>1.1</real>"), Plist::from(1.1));
        assert_eq!(convert("<integer>1</integer>"), Plist::Integer(1));
        assert_eq!(convert("<data>YWJj</data>"), Plist::Data(b"abc".to_vec()));
        assert_eq!(
            convert("<data>\n\tYW\n\tJj\n</data>"),
            Plist::Data(b"abc".to_vec())
        );
    }

    #[test]
    fn dates() {
        assert_eq!(
            convert("<date>2015-07-05T22:16:18Z</date>"),
            Plist::Date(Utc.with_ymd_and_hms(2015, 7, 5, 22, 16, 18).unwrap())
        );
    }

    #[test]
    fn bad_values() {
        for xml in [
            "<integer>abc</integer>",
            "<real>x</real>",
            "<date>yesterday</date>",
            "<data>!!!</data>",
        ] {
            let root = tree::parse(xml).unwrap();
            assert!(
                matches!(
                    Plist::from_element(&root),
                    Err(Error::InvalidPlistValue { .. })
                ),
                "{xml}"
            );
        }
        let root = tree::parse("<complex>1j</complex>").unwrap();
        assert!(matches!(
            Plist::from_element(&root),
            Err(Error::UnknownPlistElement(tag)) if tag == "complex"
        ));
    }

    #[test]
    fn document_round_trip() {
        let text = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>b</key><real>2.50</real>
    <key>a</key><array><string>x</string><integer>007</integer></array>
</dict>
</plist>
"#;
        let plist = Plist::from_document(&tree::parse(text).unwrap()).unwrap();
        let expected = [
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">"#,
            r#"<plist version="1.0">"#,
            "\t<dict>",
            "\t\t<key>b</key>",
            "\t\t<real>2.5</real>",
            "\t\t<key>a</key>",
            "\t\t<array>",
            "\t\t\t<string>x</string>",
            "\t\t\t<integer>7</integer>",
            "\t\t</array>",
            "\t</dict>",
            "</plist>",
        ]
        .join("\n");
        let written = plist.to_document().unwrap();
        assert_eq!(written, expected);
        // and again
        let reparsed = Plist::from_document(&tree::parse(&written).unwrap()).unwrap();
        assert_eq!(reparsed.to_document().unwrap(), expected);
    }

    #[test]
    fn expectations() {
        assert!(Plist::from("a").expect_dict().is_err());
        assert_eq!(Plist::from("a").expect_string().unwrap(), "a");
        assert!(matches!(
            Plist::Integer(1).expect_array(),
            Err(Error::UnexpectedPlistType {
                expected: "array",
                found: "integer"
            })
        ));
    }
}
