//! Turning glyph and layer names into file names.
//!
//! File names have to survive case-insensitive file systems and Windows'
//! reserved device names, and must stay unique within their directory.
//! See <https://unifiedfontobject.org/versions/ufo3/conventions/#common-user-name-to-file-name-algorithm>

use std::collections::HashSet;

use crate::error::Error;

/// The longest file name we will produce, in characters.
pub const MAX_FILE_NAME_LENGTH: usize = 255;

/// Width of the zero-padded counter used to break ties.
const CLASH_COUNTER_DIGITS: usize = 15;
const CLASH_COUNTER_MAX: u64 = 999_999_999_999_999;

#[inline]
fn ok_for_filenames(c: char) -> bool {
    match c as u32 {
        v if v < 32 => false,
        0x7F => false,
        0x0022 => false, // quotation mark
        0x002a => false, // asterisk
        0x002b => false, // plus sign
        0x002f => false, // solidus
        0x003a => false, // colon
        0x003c => false, // less-than sign
        0x003e => false, // greater-than sign
        0x003f => false, // question mark
        0x005b => false, // left square bracket
        0x005c => false, // reverse solidus
        0x005d => false, // right square bracket
        0x007c => false, // vertical line
        _ => true,
    }
}

/// Is this part of a dotted name a device name on Windows?
fn is_reserved_segment(segment: &str) -> bool {
    matches!(
        segment.to_lowercase().as_str(),
        "con"
            | "prn"
            | "aux"
            | "clock$"
            | "nul"
            | "com1"
            | "com2"
            | "com3"
            | "com4"
            | "com5"
            | "com6"
            | "com7"
            | "com8"
            | "com9"
            | "lpt1"
            | "lpt2"
            | "lpt3"
            | "lpt4"
            | "lpt5"
            | "lpt6"
            | "lpt7"
            | "lpt8"
            | "lpt9"
    )
}

/// A set of names compared case-insensitively.
#[derive(Clone, Debug, Default)]
pub struct NameSet(HashSet<String>);

impl NameSet {
    pub fn new() -> NameSet {
        NameSet::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(&name.to_lowercase())
    }

    /// Returns `false` if an equivalent name was already present.
    pub fn insert(&mut self, name: &str) -> bool {
        self.0.insert(name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for NameSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        NameSet(iter.into_iter().map(|s| s.as_ref().to_lowercase()).collect())
    }
}

fn truncate_chars(name: &str, max: usize) -> &str {
    match name.char_indices().nth(max) {
        Some((idx, _)) => &name[..idx],
        None => name,
    }
}

// length budget for the user part once prefix and suffix are accounted for
fn available_length(prefix: &str, suffix: &str, reserved: usize) -> usize {
    MAX_FILE_NAME_LENGTH
        .saturating_sub(prefix.chars().count())
        .saturating_sub(suffix.chars().count())
        .saturating_sub(reserved)
}

/// The character pass: illegal characters become `_` and uppercase letters
/// are followed by `_`, so names differing only in case stay distinct.
fn escape_characters(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len() * 2);
    for c in name.chars() {
        if !ok_for_filenames(c) {
            escaped.push('_');
        } else {
            escaped.push(c);
            if c.is_uppercase() {
                escaped.push('_');
            }
        }
    }
    escaped
}

/// The segment pass: no leading `.`, and no dotted part that is a device name.
fn guard_segments(name: &str) -> String {
    let name = match name.strip_prefix('.') {
        Some(rest) => format!("_{rest}"),
        None => name.to_string(),
    };
    name.split('.')
        .map(|segment| {
            if is_reserved_segment(segment) {
                format!("_{segment}")
            } else {
                segment.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Derive a file name for `user_name`, unique among `existing`.
///
/// The result includes `prefix` and `suffix`.
pub fn user_name_to_file_name(
    user_name: &str,
    existing: &NameSet,
    prefix: &str,
    suffix: &str,
) -> Result<String, Error> {
    let sanitized = guard_segments(&escape_characters(user_name));
    let sanitized = truncate_chars(&sanitized, available_length(prefix, suffix, 0));
    let full_name = format!("{prefix}{sanitized}{suffix}");
    if existing.contains(&full_name) {
        return handle_clash1(sanitized, existing, prefix, suffix);
    }
    Ok(full_name)
}

/// Break a clash by appending a zero-padded counter to `user_name`.
///
/// Falls back to [`handle_clash2`] if every counter value is taken.
pub fn handle_clash1(
    user_name: &str,
    existing: &NameSet,
    prefix: &str,
    suffix: &str,
) -> Result<String, Error> {
    let base = truncate_chars(
        user_name,
        available_length(prefix, suffix, CLASH_COUNTER_DIGITS),
    );
    for counter in 1..=CLASH_COUNTER_MAX {
        let candidate = format!(
            "{prefix}{base}{counter:0width$}{suffix}",
            width = CLASH_COUNTER_DIGITS
        );
        if !existing.contains(&candidate) {
            return Ok(candidate);
        }
    }
    handle_clash2(existing, prefix, suffix)
}

/// Find a name made of nothing but `prefix`, a counter and `suffix`.
pub fn handle_clash2(existing: &NameSet, prefix: &str, suffix: &str) -> Result<String, Error> {
    let digits = available_length(prefix, suffix, 0).min(18) as u32;
    let max = 10u64.pow(digits).saturating_sub(1);
    for counter in 1..=max {
        let candidate = format!("{prefix}{counter}{suffix}");
        if !existing.contains(&candidate) {
            return Ok(candidate);
        }
    }
    Err(Error::ExhaustedNamespace {
        prefix: prefix.to_string(),
        suffix: suffix.to_string(),
    })
}

/// `candidate` itself if it is free, otherwise `candidate` plus a counter.
pub fn unique_name(candidate: &str, existing: &NameSet) -> Result<String, Error> {
    if existing.contains(candidate) {
        handle_clash1(candidate, existing, "", "")
    } else {
        Ok(candidate.to_string())
    }
}

/// Assigns file names within one directory, remembering what it handed out.
#[derive(Clone, Debug)]
pub struct ClashContext {
    prefix: String,
    suffix: String,
    existing: NameSet,
}

impl ClashContext {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> ClashContext {
        ClashContext {
            prefix: prefix.into(),
            suffix: suffix.into(),
            existing: NameSet::new(),
        }
    }

    /// Reserve a name that is not derived from a user name.
    pub fn reserve(&mut self, file_name: &str) {
        self.existing.insert(file_name);
    }

    /// Derive and reserve the file name for `user_name`.
    pub fn file_name_for(&mut self, user_name: &str) -> Result<String, Error> {
        let file_name =
            user_name_to_file_name(user_name, &self.existing, &self.prefix, &self.suffix)?;
        self.existing.insert(&file_name);
        Ok(file_name)
    }
}
