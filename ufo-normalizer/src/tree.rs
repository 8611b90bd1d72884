//! A minimal owned element tree, parsed with quick-xml.

use indexmap::IndexMap;
use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};
use smol_str::SmolStr;

use crate::error::Error;

/// One XML element with everything the normalizers look at.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ElementNode {
    pub tag: SmolStr,
    /// Raw (unescaped) attribute values, in document order.
    pub attrs: IndexMap<SmolStr, String>,
    pub children: Vec<ElementNode>,
    /// All character data directly inside this element, untrimmed.
    pub text: Option<String>,
}

impl ElementNode {
    pub fn new(tag: impl Into<SmolStr>) -> ElementNode {
        ElementNode {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// The first direct child with the given tag.
    pub fn child(&self, tag: &str) -> Option<&ElementNode> {
        self.children.iter().find(|child| child.tag == tag)
    }

    /// Direct children with the given tag, in document order.
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a ElementNode> {
        self.children.iter().filter(move |child| child.tag == tag)
    }

    fn push_text(&mut self, text: &str) {
        self.text.get_or_insert_with(String::new).push_str(text);
    }
}

fn element_from_start(start: &BytesStart) -> Result<ElementNode, Error> {
    let mut element = ElementNode::new(String::from_utf8_lossy(start.name().as_ref()).as_ref());
    for attr in start.attributes() {
        let attr = attr?;
        let value = attr.unescape_value()?;
        element.attrs.insert(
            String::from_utf8_lossy(attr.key.as_ref()).as_ref().into(),
            value.into_owned(),
        );
    }
    Ok(element)
}

/// Parse a document and return its root element.
///
/// Comments, processing instructions and the doctype are skipped.
pub fn parse(xml: &str) -> Result<ElementNode, Error> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<ElementNode> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(element_from_start(&start)?),
            Event::Empty(start) => {
                let element = element_from_start(&start)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(element),
                }
            }
            Event::End(_) => {
                // quick-xml has already checked that the names match
                let Some(element) = stack.pop() else {
                    return Err(Error::EmptyDocument);
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(element),
                }
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.push_text(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.push_text(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => return Err(Error::EmptyDocument),
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => (),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn attributes_keep_document_order() {
        let root = parse(r#"<point y="2" x="1" type="line"/>"#).unwrap();
        assert_eq!(root.tag, "point");
        let names: Vec<_> = root.attrs.keys().map(SmolStr::as_str).collect();
        assert_eq!(names, vec!["y", "x", "type"]);
        assert_eq!(root.attr("x"), Some("1"));
        assert_eq!(root.attr("smooth"), None);
    }

    #[test]
    fn nested_children() {
        let root = parse(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- a comment -->
<glyph name="a" format="2">
    <unicode hex="0041"/>
    <outline>
        <contour/>
        <component base="b"/>
    </outline>
</glyph>
"#,
        )
        .unwrap();
        assert_eq!(root.tag, "glyph");
        assert_eq!(root.children.len(), 2);
        let outline = root.child("outline").unwrap();
        let tags: Vec<_> = outline.children.iter().map(|c| c.tag.as_str()).collect();
        assert_eq!(tags, vec!["contour", "component"]);
        assert_eq!(root.children_named("unicode").count(), 1);
    }

    #[test]
    fn text_is_unescaped_and_untrimmed() {
        let root = parse("<note>\n  a &amp; b &lt;c&gt;\n</note>").unwrap();
        assert_eq!(root.text.as_deref(), Some("\n  a & b <c>\n"));
    }

    #[test]
    fn cdata_is_text() {
        let root = parse("<string><![CDATA[<b>]]></string>").unwrap();
        assert_eq!(root.text.as_deref(), Some("<b>"));
    }

    #[test]
    fn attribute_values_are_unescaped() {
        let root = parse(r#"<glyph name="a&amp;b&quot;"/>"#).unwrap();
        assert_eq!(root.attr("name"), Some("a&b\""));
    }

    #[test]
    fn empty_element_has_no_text() {
        let root = parse("<string></string>").unwrap();
        assert_eq!(root.text, None);
    }

    #[test]
    fn malformed_documents() {
        assert!(matches!(parse(""), Err(Error::EmptyDocument)));
        assert!(matches!(parse("<!-- nothing -->"), Err(Error::EmptyDocument)));
        assert!(parse("<a><b></a>").is_err());
    }
}
