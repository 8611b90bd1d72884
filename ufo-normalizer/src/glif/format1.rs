//! Glyph format 1.
//!
//! Format 1 has no anchor element; anchors are spelled as single-point
//! contours, which are moved to the end of the outline.

use crate::{error::Error, tree::ElementNode, xml::XmlWriter};

use super::{
    write_advance, write_lib, write_note, write_outline, write_unicode, GlifFormat, OutlineItem,
};

pub(crate) fn write_glyph_children(
    glyph: &ElementNode,
    writer: &mut XmlWriter,
) -> Result<(), Error> {
    for unicode in glyph.children_named("unicode") {
        write_unicode(unicode, writer);
    }
    if let Some(advance) = glyph.child("advance") {
        write_advance(advance, writer);
    }
    if let Some(note) = glyph.child("note") {
        write_note(note, writer);
    }
    if let Some(outline) = glyph.child("outline") {
        write_outline_format1(outline, writer);
    }
    if let Some(lib) = glyph.child("lib") {
        write_lib(lib, writer)?;
    }
    Ok(())
}

/// Write an outline, deferring implied anchors until after everything else.
pub(crate) fn write_outline_format1(outline: &ElementNode, writer: &mut XmlWriter) {
    let (anchors, others): (Vec<_>, Vec<_>) = OutlineItem::collect(outline, GlifFormat::One)
        .into_iter()
        .partition(|item| matches!(item, OutlineItem::Contour(c) if c.is_implied_anchor()));
    write_outline(others.iter().chain(anchors.iter()), writer, GlifFormat::One);
}
