//! Normalizing glyph files.
//!
//! The glyph element dispatches on its `format` attribute to [`format1`] or
//! [`format2`]; the element kinds the two formats share are handled here.
//! Malformed sub-elements are dropped rather than reported.

use crate::{
    color::normalize_color,
    error::Error,
    guideline::{normalize_guideline_element, GUIDELINE},
    number::{format_float, parse_number},
    plist::Plist,
    transform::{Transform, COMPONENT_FIELDS, IMAGE_FIELDS},
    tree::{self, ElementNode},
    xml::{Attribute, AttributeSchema, Presence, XmlWriter},
};

pub mod format1;
pub mod format2;

/// The glif format versions we know how to write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GlifFormat {
    One,
    Two,
}

impl GlifFormat {
    fn from_attr(raw: Option<&str>) -> Result<GlifFormat, Error> {
        let raw = raw.unwrap_or_default();
        match raw.trim().parse::<i64>() {
            Ok(1) => Ok(GlifFormat::One),
            Ok(2) => Ok(GlifFormat::Two),
            _ => Err(Error::UndefinedFormat(raw.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GlifFormat::One => "1",
            GlifFormat::Two => "2",
        }
    }
}

const ADVANCE: AttributeSchema = AttributeSchema {
    tag: "advance",
    attributes: &[("width", Presence::Optional), ("height", Presence::Optional)],
};

const IMAGE: AttributeSchema = AttributeSchema {
    tag: "image",
    attributes: &[
        ("fileName", Presence::Required),
        ("xScale", Presence::Optional),
        ("yScale", Presence::Optional),
        ("xOffset", Presence::Optional),
        ("yOffset", Presence::Optional),
        ("color", Presence::Optional),
    ],
};

const ANCHOR: AttributeSchema = AttributeSchema {
    tag: "anchor",
    attributes: &[
        ("name", Presence::Optional),
        ("x", Presence::Required),
        ("y", Presence::Required),
        ("color", Presence::Optional),
        ("identifier", Presence::Optional),
    ],
};

const POINT_FORMAT1: AttributeSchema = AttributeSchema {
    tag: "point",
    attributes: &[
        ("name", Presence::Optional),
        ("x", Presence::Required),
        ("y", Presence::Required),
        ("type", Presence::Optional),
        ("smooth", Presence::Optional),
    ],
};

const POINT_FORMAT2: AttributeSchema = AttributeSchema {
    tag: "point",
    attributes: &[
        ("name", Presence::Optional),
        ("x", Presence::Required),
        ("y", Presence::Required),
        ("type", Presence::Optional),
        ("smooth", Presence::Optional),
        ("identifier", Presence::Optional),
    ],
};

const COMPONENT_FORMAT1: AttributeSchema = AttributeSchema {
    tag: "component",
    attributes: &[
        ("base", Presence::Optional),
        ("xScale", Presence::Optional),
        ("xyScale", Presence::Optional),
        ("yxScale", Presence::Optional),
        ("yScale", Presence::Optional),
        ("xOffset", Presence::Optional),
        ("yOffset", Presence::Optional),
    ],
};

const COMPONENT_FORMAT2: AttributeSchema = AttributeSchema {
    tag: "component",
    attributes: &[
        ("base", Presence::Required),
        ("xScale", Presence::Optional),
        ("xyScale", Presence::Optional),
        ("yxScale", Presence::Optional),
        ("yScale", Presence::Optional),
        ("xOffset", Presence::Optional),
        ("yOffset", Presence::Optional),
        ("identifier", Presence::Optional),
    ],
};

/// Normalize the text of a glif file.
pub fn normalize_glif_text(text: &str) -> Result<String, Error> {
    normalize_glif(&tree::parse(text)?)
}

/// Normalize a parsed `<glyph>` element into the text of a glif file.
pub fn normalize_glif(glyph: &ElementNode) -> Result<String, Error> {
    let format = GlifFormat::from_attr(glyph.attr("format"))?;
    let mut attrs = Vec::with_capacity(2);
    if let Some(name) = glyph.attr("name") {
        attrs.push(("name", name.to_string()));
    }
    attrs.push(("format", format.as_str().to_string()));

    let mut writer = XmlWriter::with_declaration();
    writer.begin_element("glyph", &attrs);
    match format {
        GlifFormat::One => format1::write_glyph_children(glyph, &mut writer)?,
        GlifFormat::Two => format2::write_glyph_children(glyph, &mut writer)?,
    }
    writer.end_element("glyph");
    Ok(writer.into_text())
}

/// `Err` when the attribute is present but not a number.
fn numeric_attr(element: &ElementNode, name: &str) -> Result<Option<f64>, ()> {
    element
        .attr(name)
        .map(|raw| parse_number(raw).ok_or(()))
        .transpose()
}

fn write_attrs(writer: &mut XmlWriter, schema: &AttributeSchema, values: Vec<Attribute>) {
    if let Some(attrs) = schema.arrange(values) {
        writer.simple_element(schema.tag, &attrs, None);
    }
}

pub(crate) fn write_unicode(element: &ElementNode, writer: &mut XmlWriter) {
    let Some(hex) = element.attr("hex") else {
        return;
    };
    if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return;
    }
    let digits = hex.trim_start_matches('0').to_ascii_uppercase();
    writer.simple_element("unicode", &[("hex", format!("{digits:0>4}"))], None);
}

pub(crate) fn write_advance(element: &ElementNode, writer: &mut XmlWriter) {
    let mut values = Vec::new();
    for name in ["width", "height"] {
        let Some(value) = element.attr(name).and_then(parse_number) else {
            continue;
        };
        let formatted = format_float(value);
        if formatted != "0" {
            values.push((name, formatted));
        }
    }
    if !values.is_empty() {
        write_attrs(writer, &ADVANCE, values);
    }
}

pub(crate) fn write_image(element: &ElementNode, writer: &mut XmlWriter) {
    let mut values = Transform::from_element(element, IMAGE_FIELDS).attributes(IMAGE_FIELDS);
    if let Some(file_name) = element.attr("fileName").filter(|name| !name.is_empty()) {
        values.push(("fileName", file_name.to_string()));
    }
    if let Some(color) = element.attr("color").and_then(normalize_color) {
        values.push(("color", color));
    }
    write_attrs(writer, &IMAGE, values);
}

pub(crate) fn write_anchor(element: &ElementNode, writer: &mut XmlWriter) {
    let (Ok(Some(x)), Ok(Some(y))) = (numeric_attr(element, "x"), numeric_attr(element, "y"))
    else {
        return;
    };
    let mut values = vec![("x", format_float(x)), ("y", format_float(y))];
    if let Some(name) = element.attr("name") {
        values.push(("name", name.to_string()));
    }
    if let Some(color) = element.attr("color").and_then(normalize_color) {
        values.push(("color", color));
    }
    if let Some(identifier) = element.attr("identifier") {
        values.push(("identifier", identifier.to_string()));
    }
    write_attrs(writer, &ANCHOR, values);
}

pub(crate) fn write_guideline(element: &ElementNode, writer: &mut XmlWriter) {
    if let Some(attrs) = normalize_guideline_element(element) {
        writer.simple_element(GUIDELINE.tag, &attrs, None);
    }
}

/// Write the glyph lib; an empty or non-dictionary lib is dropped.
pub(crate) fn write_lib(element: &ElementNode, writer: &mut XmlWriter) -> Result<(), Error> {
    let Some(value) = element.children.first() else {
        return Ok(());
    };
    let lib = Plist::from_element(value)?;
    match lib.as_dict() {
        Some(dict) if !dict.is_empty() => {
            writer.begin_element("lib", &[]);
            writer.write_plist(&lib)?;
            writer.end_element("lib");
        }
        _ => (),
    }
    Ok(())
}

pub(crate) fn write_note(element: &ElementNode, writer: &mut XmlWriter) {
    let lines = note_lines(element.text.as_deref().unwrap_or_default());
    if lines.is_empty() {
        return;
    }
    writer.begin_element("note", &[]);
    for line in lines {
        writer.text_line(line);
    }
    writer.end_element("note");
}

/// The lines of a note without surrounding blank lines or trailing space.
///
/// Text on the same line as `<note>` has no indentation of its own. When the
/// note starts on a new line, the whitespace margin shared by every
/// non-blank line is removed, which undoes the indentation we write.
fn note_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.split('\n').map(str::trim_end).collect();
    let Some(&first) = lines.first() else {
        return lines;
    };
    let inline = !first.is_empty();
    lines[0] = first.trim_start();

    if !inline {
        let margin = lines
            .iter()
            .copied()
            .filter(|line| !line.is_empty())
            .map(|line| &line[..line.len() - line.trim_start().len()])
            .reduce(common_prefix)
            .unwrap_or_default();
        lines = lines
            .into_iter()
            .map(|line| line.strip_prefix(margin).unwrap_or(line))
            .collect();
    }

    let start = lines.iter().position(|line| !line.is_empty());
    let end = lines.iter().rposition(|line| !line.is_empty());
    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].to_vec(),
        _ => Vec::new(),
    }
}

fn common_prefix<'a>(a: &'a str, b: &'a str) -> &'a str {
    let len = a
        .char_indices()
        .zip(b.chars())
        .take_while(|((_, x), y)| x == y)
        .last()
        .map(|((idx, c), _)| idx + c.len_utf8())
        .unwrap_or(0);
    &a[..len]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointType {
    Move,
    Line,
    Curve,
    QCurve,
    OffCurve,
}

impl PointType {
    fn from_attr(raw: Option<&str>) -> Option<PointType> {
        match raw {
            None | Some("offcurve") => Some(PointType::OffCurve),
            Some("move") => Some(PointType::Move),
            Some("line") => Some(PointType::Line),
            Some("curve") => Some(PointType::Curve),
            Some("qcurve") => Some(PointType::QCurve),
            Some(_) => None,
        }
    }

    /// The written `type`; off-curve points have none.
    fn as_attr(&self) -> Option<&'static str> {
        match self {
            PointType::Move => Some("move"),
            PointType::Line => Some("line"),
            PointType::Curve => Some("curve"),
            PointType::QCurve => Some("qcurve"),
            PointType::OffCurve => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub typ: PointType,
    pub smooth: bool,
    pub name: Option<String>,
    pub identifier: Option<String>,
}

impl Point {
    /// `None` if the point is invalid, which invalidates its contour.
    pub fn from_element(element: &ElementNode, format: GlifFormat) -> Option<Point> {
        let x = element.attr("x").and_then(parse_number)?;
        let y = element.attr("y").and_then(parse_number)?;
        let typ = PointType::from_attr(element.attr("type"))?;
        let smooth = typ != PointType::OffCurve && element.attr("smooth") == Some("yes");
        let identifier = match format {
            GlifFormat::One => None,
            GlifFormat::Two => element.attr("identifier").map(str::to_string),
        };
        Some(Point {
            x,
            y,
            typ,
            smooth,
            name: element.attr("name").map(str::to_string),
            identifier,
        })
    }

    fn write(&self, writer: &mut XmlWriter, format: GlifFormat) {
        let mut values = vec![("x", format_float(self.x)), ("y", format_float(self.y))];
        if let Some(name) = &self.name {
            values.push(("name", name.clone()));
        }
        if let Some(typ) = self.typ.as_attr() {
            values.push(("type", typ.to_string()));
        }
        if self.smooth {
            values.push(("smooth", "yes".to_string()));
        }
        if let Some(identifier) = &self.identifier {
            values.push(("identifier", identifier.clone()));
        }
        let schema = match format {
            GlifFormat::One => &POINT_FORMAT1,
            GlifFormat::Two => &POINT_FORMAT2,
        };
        write_attrs(writer, schema, values);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Contour {
    pub identifier: Option<String>,
    pub points: Vec<Point>,
}

impl Contour {
    /// `None` if the contour has no points or any point is invalid.
    pub fn from_element(element: &ElementNode, format: GlifFormat) -> Option<Contour> {
        let points = element
            .children_named("point")
            .map(|point| Point::from_element(point, format))
            .collect::<Option<Vec<_>>>()?;
        if points.is_empty() {
            return None;
        }
        let identifier = match format {
            GlifFormat::One => None,
            GlifFormat::Two => element.attr("identifier").map(str::to_string),
        };
        Some(Contour { identifier, points })
    }

    /// A single named `move` point, the format 1 spelling of an anchor.
    pub fn is_implied_anchor(&self) -> bool {
        matches!(
            self.points.as_slice(),
            [point] if point.typ == PointType::Move && point.name.is_some()
        )
    }

    fn write(&self, writer: &mut XmlWriter, format: GlifFormat) {
        let attrs = match &self.identifier {
            Some(identifier) => vec![("identifier", identifier.clone())],
            None => Vec::new(),
        };
        writer.begin_element("contour", &attrs);
        for point in &self.points {
            point.write(writer, format);
        }
        writer.end_element("contour");
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Component {
    pub base: Option<String>,
    pub transform: Transform,
    pub identifier: Option<String>,
}

impl Component {
    /// `None` when the format requires a `base` and there is none.
    pub fn from_element(element: &ElementNode, format: GlifFormat) -> Option<Component> {
        let base = element.attr("base").map(str::to_string);
        let identifier = match format {
            GlifFormat::One => None,
            GlifFormat::Two => {
                base.as_ref()?;
                element.attr("identifier").map(str::to_string)
            }
        };
        Some(Component {
            base,
            transform: Transform::from_element(element, COMPONENT_FIELDS),
            identifier,
        })
    }

    fn write(&self, writer: &mut XmlWriter, format: GlifFormat) {
        let mut values = self.transform.attributes(COMPONENT_FIELDS);
        if let Some(base) = &self.base {
            values.push(("base", base.clone()));
        }
        if let Some(identifier) = &self.identifier {
            values.push(("identifier", identifier.clone()));
        }
        let schema = match format {
            GlifFormat::One => &COMPONENT_FORMAT1,
            GlifFormat::Two => &COMPONENT_FORMAT2,
        };
        write_attrs(writer, schema, values);
    }
}

/// One child of `<outline>` that survived validation.
#[derive(Clone, Debug, PartialEq)]
pub enum OutlineItem {
    Contour(Contour),
    Component(Component),
}

impl OutlineItem {
    /// Validate the children of an outline, in document order.
    pub fn collect(outline: &ElementNode, format: GlifFormat) -> Vec<OutlineItem> {
        outline
            .children
            .iter()
            .filter_map(|child| match child.tag.as_str() {
                "contour" => Contour::from_element(child, format).map(OutlineItem::Contour),
                "component" => Component::from_element(child, format).map(OutlineItem::Component),
                _ => None,
            })
            .collect()
    }

    fn write(&self, writer: &mut XmlWriter, format: GlifFormat) {
        match self {
            OutlineItem::Contour(contour) => contour.write(writer, format),
            OutlineItem::Component(component) => component.write(writer, format),
        }
    }
}

/// Write an `<outline>` with the given items; nothing at all if empty.
pub(crate) fn write_outline<'a>(
    items: impl IntoIterator<Item = &'a OutlineItem>,
    writer: &mut XmlWriter,
    format: GlifFormat,
) {
    let mut items = items.into_iter().peekable();
    if items.peek().is_none() {
        return;
    }
    writer.begin_element("outline", &[]);
    for item in items {
        item.write(writer, format);
    }
    writer.end_element("outline");
}
