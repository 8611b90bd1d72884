//! The `r,g,b,a` color string shared by glif elements and layer info.

use crate::{
    number::{format_float, parse_number},
    plist::Plist,
};

/// Normalize a color string, or `None` if it is not a valid color.
///
/// A valid color is exactly four comma-separated numbers, each in `0..=1`.
pub fn normalize_color(raw: &str) -> Option<String> {
    let components = raw
        .split(',')
        .map(|part| parse_number(part).filter(|v| (0.0..=1.0).contains(v)))
        .collect::<Option<Vec<_>>>()?;
    if components.len() != 4 {
        return None;
    }
    Some(
        components
            .into_iter()
            .map(format_float)
            .collect::<Vec<_>>()
            .join(","),
    )
}

/// Normalize the `color` of a `layerinfo.plist` dictionary in place,
/// removing it when it is not a valid color string.
pub fn normalize_layerinfo_color(layerinfo: &mut Plist) {
    let Some(info) = layerinfo.as_dict_mut() else {
        return;
    };
    let Some(color) = info.get("color") else {
        return;
    };
    let normalized = color.as_str().and_then(normalize_color);
    match normalized {
        Some(color) => {
            info.insert("color".to_string(), Plist::String(color));
        }
        None => {
            info.shift_remove("color");
        }
    }
}
