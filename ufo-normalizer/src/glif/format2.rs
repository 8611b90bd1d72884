//! Glyph format 2: anchors, guidelines and images are elements of their own
//! and outline order is kept as written.

use crate::{error::Error, tree::ElementNode, xml::XmlWriter};

use super::{
    write_advance, write_anchor, write_guideline, write_image, write_lib, write_note,
    write_outline, write_unicode, GlifFormat, OutlineItem,
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
    if let Some(image) = glyph.child("image") {
        write_image(image, writer);
    }
    if let Some(outline) = glyph.child("outline") {
        write_outline_format2(outline, writer);
    }
    for anchor in glyph.children_named("anchor") {
        write_anchor(anchor, writer);
    }
    for guideline in glyph.children_named("guideline") {
        write_guideline(guideline, writer);
    }
    if let Some(lib) = glyph.child("lib") {
        write_lib(lib, writer)?;
    }
    if let Some(note) = glyph.child("note") {
        write_note(note, writer);
    }
    Ok(())
}

pub(crate) fn write_outline_format2(outline: &ElementNode, writer: &mut XmlWriter) {
    let items = OutlineItem::collect(outline, GlifFormat::Two);
    write_outline(&items, writer, GlifFormat::Two);
}
