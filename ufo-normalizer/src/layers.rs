//! Canonical layer directory and glyph file names.
//!
//! Both passes follow the same steps: read a name mapping, derive the
//! canonical file name for every entry, move files into place and write the
//! mapping back.

use std::path::Path;

use log::{debug, warn};

use crate::{
    error::Error,
    files::{read_plist, rename, write_plist},
    names::{unique_name, ClashContext, NameSet},
    plist::Plist,
};

pub const DEFAULT_LAYER_DIR: &str = "glyphs";
pub const LAYER_DIR_PREFIX: &str = "glyphs.";
pub const GLYPH_FILE_SUFFIX: &str = ".glif";
pub const LAYER_CONTENTS_FILE: &str = "layercontents.plist";
pub const CONTENTS_FILE: &str = "contents.plist";

// appended to a final name to get a parking spot for the first rename phase
const TEMP_SUFFIX: &str = ".normalizing";

/// How a mapping is stored on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MappingShape {
    /// An array of `[name, file]` arrays, as in `layercontents.plist`.
    Pairs,
    /// A dictionary from name to file, as in `contents.plist`.
    Dictionary,
}

/// An ordered list of (user name, file name) pairs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameMapping {
    pub shape: MappingShape,
    pub entries: Vec<(String, String)>,
}

impl NameMapping {
    pub fn from_plist(plist: Plist, shape: MappingShape) -> Result<NameMapping, Error> {
        let entries = match shape {
            MappingShape::Pairs => plist
                .expect_array()?
                .into_iter()
                .map(|pair| {
                    let mut pair = pair.expect_array()?.into_iter();
                    let name = pair
                        .next()
                        .ok_or_else(|| Error::MissingPlistValue("layer name".to_string()))?
                        .expect_string()?;
                    let file = pair
                        .next()
                        .ok_or_else(|| Error::MissingPlistValue(name.clone()))?
                        .expect_string()?;
                    Ok((name, file))
                })
                .collect::<Result<_, Error>>()?,
            MappingShape::Dictionary => plist
                .expect_dict()?
                .into_iter()
                .map(|(name, file)| Ok((name, file.expect_string()?)))
                .collect::<Result<_, Error>>()?,
        };
        Ok(NameMapping { shape, entries })
    }

    pub fn to_plist(&self) -> Plist {
        match self.shape {
            MappingShape::Pairs => Plist::Array(
                self.entries
                    .iter()
                    .map(|(name, file)| {
                        Plist::Array(vec![name.as_str().into(), file.as_str().into()])
                    })
                    .collect(),
            ),
            MappingShape::Dictionary => Plist::Dictionary(
                self.entries
                    .iter()
                    .map(|(name, file)| (name.clone(), Plist::from(file.as_str())))
                    .collect(),
            ),
        }
    }

    pub fn read(path: &Path, shape: MappingShape) -> Result<NameMapping, Error> {
        NameMapping::from_plist(read_plist(path)?, shape).map_err(|e| e.in_file(path))
    }

    pub fn write(&self, path: &Path) -> Result<bool, Error> {
        write_plist(path, &self.to_plist())
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, file)| file.as_str())
    }
}

/// Move every entry of `old` to its file name in `new`, inside `dir`.
///
/// Changed entries are first parked under temporary names so that swaps
/// and case-only renames cannot collide.
fn move_files(dir: &Path, old: &NameMapping, new: &NameMapping) -> Result<(), Error> {
    let changes: Vec<(&str, &str)> = old
        .file_names()
        .zip(new.file_names())
        .filter(|(from, to)| from != to)
        .collect();
    if changes.is_empty() {
        return Ok(());
    }

    let mut taken: NameSet = old.file_names().chain(new.file_names()).collect();
    let mut parked = Vec::with_capacity(changes.len());
    for (from, to) in changes {
        let source = dir.join(from);
        if !source.exists() {
            warn!("{source:?} is listed but does not exist, not renaming it");
            continue;
        }
        let temp = unique_name(&format!("{to}{TEMP_SUFFIX}"), &taken)?;
        taken.insert(&temp);
        rename(&source, &dir.join(&temp))?;
        parked.push((temp, to));
    }
    for (temp, to) in parked {
        rename(&dir.join(temp), &dir.join(to))?;
    }
    Ok(())
}

/// Give every layer of a UFO 3 its canonical directory name.
///
/// The layer stored in `glyphs` keeps it; every other layer gets `glyphs.`
/// followed by its escaped name.
pub fn normalize_layer_names(ufo: &Path) -> Result<NameMapping, Error> {
    let path = ufo.join(LAYER_CONTENTS_FILE);
    let old = NameMapping::read(&path, MappingShape::Pairs)?;

    let mut context = ClashContext::new(LAYER_DIR_PREFIX, "");
    context.reserve(DEFAULT_LAYER_DIR);
    let entries = old
        .entries
        .iter()
        .map(|(layer, dir)| {
            let new_dir = if dir == DEFAULT_LAYER_DIR {
                DEFAULT_LAYER_DIR.to_string()
            } else {
                context.file_name_for(layer)?
            };
            Ok((layer.clone(), new_dir))
        })
        .collect::<Result<_, Error>>()?;
    let new = NameMapping {
        shape: MappingShape::Pairs,
        entries,
    };

    move_files(ufo, &old, &new)?;
    if new.write(&path)? {
        debug!("Updated {path:?}");
    }
    Ok(new)
}

/// Give every glyph in `layer_dir` its canonical file name.
pub fn normalize_glyph_file_names(ufo: &Path, layer_dir: &str) -> Result<NameMapping, Error> {
    let dir = ufo.join(layer_dir);
    let path = dir.join(CONTENTS_FILE);
    let old = NameMapping::read(&path, MappingShape::Dictionary)?;

    let mut context = ClashContext::new("", GLYPH_FILE_SUFFIX);
    let entries = old
        .entries
        .iter()
        .map(|(glyph, _)| Ok((glyph.clone(), context.file_name_for(glyph)?)))
        .collect::<Result<_, Error>>()?;
    let new = NameMapping {
        shape: MappingShape::Dictionary,
        entries,
    };

    move_files(&dir, &old, &new)?;
    if new.write(&path)? {
        debug!("Updated {path:?}");
    }
    Ok(new)
}
