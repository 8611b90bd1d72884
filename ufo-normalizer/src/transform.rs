//! Affine transforms on components and images.

use crate::{
    number::{format_float, parse_number},
    tree::ElementNode,
    xml::Attribute,
};

/// Attributes a component transform is read from, in output order.
pub const COMPONENT_FIELDS: &[&str] = &[
    "xScale", "xyScale", "yxScale", "yScale", "xOffset", "yOffset",
];

/// Images carry no skew.
pub const IMAGE_FIELDS: &[&str] = &["xScale", "yScale", "xOffset", "yOffset"];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub x_scale: f64,
    pub xy_scale: f64,
    pub yx_scale: f64,
    pub y_scale: f64,
    pub x_offset: f64,
    pub y_offset: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Transform {
            x_scale: 1.0,
            xy_scale: 0.0,
            yx_scale: 0.0,
            y_scale: 1.0,
            x_offset: 0.0,
            y_offset: 0.0,
        }
    }
}

impl Transform {
    fn field_mut(&mut self, name: &str) -> Option<&mut f64> {
        match name {
            "xScale" => Some(&mut self.x_scale),
            "xyScale" => Some(&mut self.xy_scale),
            "yxScale" => Some(&mut self.yx_scale),
            "yScale" => Some(&mut self.y_scale),
            "xOffset" => Some(&mut self.x_offset),
            "yOffset" => Some(&mut self.y_offset),
            _ => None,
        }
    }

    fn field(&self, name: &str) -> Option<f64> {
        match name {
            "xScale" => Some(self.x_scale),
            "xyScale" => Some(self.xy_scale),
            "yxScale" => Some(self.yx_scale),
            "yScale" => Some(self.y_scale),
            "xOffset" => Some(self.x_offset),
            "yOffset" => Some(self.y_offset),
            _ => None,
        }
    }

    /// Read the `fields` attributes of `element`.
    ///
    /// If any of them is present but not a number the whole transform is
    /// discarded and the identity returned.
    pub fn from_element(element: &ElementNode, fields: &[&str]) -> Transform {
        let mut transform = Transform::default();
        for name in fields {
            let Some(raw) = element.attr(name) else {
                continue;
            };
            let (Some(value), Some(slot)) = (parse_number(raw), transform.field_mut(name)) else {
                return Transform::default();
            };
            *slot = value;
        }
        transform
    }

    /// Attributes for the fields that differ from the identity, in `fields` order.
    pub fn attributes(&self, fields: &[&str]) -> Vec<Attribute> {
        let identity = Transform::default();
        COMPONENT_FIELDS
            .iter()
            .filter(|name| fields.contains(*name))
            .filter_map(|name| {
                let value = format_float(self.field(name)?);
                let default = format_float(identity.field(name)?);
                (value != default).then_some((*name, value))
            })
            .collect()
    }
}
