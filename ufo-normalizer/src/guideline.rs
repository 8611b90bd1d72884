//! Guidelines, both the glif `<guideline>` element and the dictionaries in
//! `fontinfo.plist`.

use crate::{
    color::normalize_color,
    number::{format_float, parse_number},
    plist::{Dictionary, Plist},
    tree::ElementNode,
    xml::{Attribute, AttributeSchema, Presence},
};

pub const GUIDELINE: AttributeSchema = AttributeSchema {
    tag: "guideline",
    attributes: &[
        ("name", Presence::Optional),
        ("x", Presence::Optional),
        ("y", Presence::Optional),
        ("angle", Presence::Optional),
        ("color", Presence::Optional),
        ("identifier", Presence::Optional),
    ],
};

/// A guideline needs at least one coordinate. With only one the angle is
/// implied and must not be given; with both it is required.
fn is_valid_position(x: Option<f64>, y: Option<f64>, angle: Option<f64>) -> bool {
    match (x, y, angle) {
        (None, None, _) => false,
        (Some(_), Some(_), angle) => angle.is_some(),
        (_, _, angle) => angle.is_none(),
    }
}

// `Err` when the attribute is there but is not a number.
fn numeric_attr(element: &ElementNode, name: &str) -> Result<Option<f64>, ()> {
    match element.attr(name) {
        Some(raw) => parse_number(raw).map(Some).ok_or(()),
        None => Ok(None),
    }
}

/// The attributes of a normalized `<guideline>`, or `None` to drop it.
pub fn normalize_guideline_element(element: &ElementNode) -> Option<Vec<Attribute>> {
    let x = numeric_attr(element, "x").ok()?;
    let y = numeric_attr(element, "y").ok()?;
    let angle = numeric_attr(element, "angle").ok()?;
    if !is_valid_position(x, y, angle) {
        return None;
    }

    let mut values = Vec::new();
    if let Some(name) = element.attr("name") {
        values.push(("name", name.to_string()));
    }
    for (name, value) in [("x", x), ("y", y), ("angle", angle)] {
        if let Some(value) = value {
            values.push((name, format_float(value)));
        }
    }
    if let Some(color) = element.attr("color").and_then(normalize_color) {
        values.push(("color", color));
    }
    if let Some(identifier) = element.attr("identifier") {
        values.push(("identifier", identifier.to_string()));
    }
    GUIDELINE.arrange(values)
}

fn numeric_value(guideline: &Dictionary, key: &str) -> Result<Option<f64>, ()> {
    match guideline.get(key) {
        Some(value) => value.as_number().map(|n| Some(n.to_f64())).ok_or(()),
        None => Ok(None),
    }
}

/// Validate one guideline dictionary; `None` if it must be removed.
///
/// Key order is kept; an unusable `color` is removed on its own.
pub fn normalize_dict_guideline(guideline: &Dictionary) -> Option<Dictionary> {
    let x = numeric_value(guideline, "x").ok()?;
    let y = numeric_value(guideline, "y").ok()?;
    let angle = numeric_value(guideline, "angle").ok()?;
    if !is_valid_position(x, y, angle) {
        return None;
    }

    let mut normalized = guideline.clone();
    if let Some(color) = guideline.get("color") {
        match color.as_str().and_then(normalize_color) {
            Some(color) => {
                normalized.insert("color".to_string(), Plist::String(color));
            }
            None => {
                normalized.shift_remove("color");
            }
        }
    }
    Some(normalized)
}

/// Replace the `guidelines` array of a font info dictionary with its valid,
/// normalized entries.
pub fn normalize_fontinfo_guidelines(fontinfo: &mut Plist) {
    let Some(info) = fontinfo.as_dict_mut() else {
        return;
    };
    let Some(guidelines) = info.get("guidelines").and_then(Plist::as_array) else {
        return;
    };
    let normalized = guidelines
        .iter()
        .filter_map(Plist::as_dict)
        .filter_map(normalize_dict_guideline)
        .map(Plist::Dictionary)
        .collect();
    info.insert("guidelines".to_string(), Plist::Array(normalized));
}
