//! Normalizing a whole UFO package on disk.

use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use rayon::prelude::*;

use crate::{
    color::normalize_layerinfo_color,
    config::Config,
    error::Error,
    files::{read_plist, read_text, write_if_changed, write_plist},
    glif::normalize_glif_text,
    guideline::normalize_fontinfo_guidelines,
    layers::{normalize_glyph_file_names, normalize_layer_names, DEFAULT_LAYER_DIR},
    plist::Plist,
};

pub const METAINFO_FILE: &str = "metainfo.plist";
pub const FONTINFO_FILE: &str = "fontinfo.plist";
pub const LAYERINFO_FILE: &str = "layerinfo.plist";
pub const DEFAULT_LAYER_NAME: &str = "public.default";

/// Font-level property lists that only need a canonical rewrite.
const PLAIN_PLIST_FILES: &[&str] = &["groups.plist", "kerning.plist", "lib.plist"];

/// What a run did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Files that were read and normalized.
    pub checked: usize,
    /// Files whose content changed.
    pub written: usize,
}

impl Summary {
    fn record(&mut self, written: bool) {
        self.checked += 1;
        if written {
            self.written += 1;
        }
    }
}

/// Tracks progress while failures are logged rather than propagated.
#[derive(Default)]
struct Run {
    summary: Summary,
    failures: usize,
}

impl Run {
    fn tally(&mut self, result: Result<bool, Error>) {
        match result {
            Ok(written) => self.summary.record(written),
            Err(e) => self.fail(e),
        }
    }

    fn fail(&mut self, e: Error) {
        error!("{e}");
        self.failures += 1;
    }
}

/// Normalize the UFO at `config.target()` in place.
///
/// Problems with `metainfo.plist` or the layer mapping end the run
/// immediately. Any other file that cannot be normalized is logged and left
/// as it was; the run then finishes with [`Error::FilesFailed`].
pub fn normalize_ufo(config: &Config) -> Result<Summary, Error> {
    let ufo = config.target();
    if !ufo.exists() {
        return Err(Error::MissingFile(ufo.to_path_buf()));
    }
    if !ufo.is_dir() {
        return Err(Error::ExpectedDirectory(ufo.to_path_buf()));
    }
    info!("Normalizing {ufo:?}");

    let metainfo_path = ufo.join(METAINFO_FILE);
    if !metainfo_path.is_file() {
        return Err(Error::MissingFile(metainfo_path));
    }
    let metainfo = read_plist(&metainfo_path)?;
    let format_version = format_version(&metainfo).map_err(|e| e.in_file(&metainfo_path))?;
    debug!("UFO format version {format_version}");

    let mut run = Run::default();
    run.tally(write_plist(&metainfo_path, &metainfo));

    let layers = if format_version < 3 {
        vec![(
            DEFAULT_LAYER_NAME.to_string(),
            DEFAULT_LAYER_DIR.to_string(),
        )]
    } else {
        normalize_layer_names(ufo)?.entries
    };
    for (layer, dir) in layers {
        normalize_layer(ufo, &layer, &dir, &mut run);
    }

    let fontinfo = ufo.join(FONTINFO_FILE);
    if fontinfo.is_file() {
        run.tally(normalize_fontinfo(&fontinfo));
    }
    for name in PLAIN_PLIST_FILES {
        let path = ufo.join(name);
        if path.is_file() {
            run.tally(normalize_plain_plist(&path));
        }
    }

    info!(
        "Checked {} files, rewrote {}",
        run.summary.checked, run.summary.written
    );
    if run.failures > 0 {
        return Err(Error::FilesFailed(run.failures));
    }
    Ok(run.summary)
}

/// The integral `formatVersion` of `metainfo.plist`.
fn format_version(metainfo: &Plist) -> Result<i64, Error> {
    let value = metainfo
        .get("formatVersion")
        .ok_or_else(|| Error::MissingPlistValue("formatVersion".to_string()))?;
    let number = value
        .as_number()
        .ok_or_else(|| Error::UnexpectedPlistType {
            expected: "integer",
            found: value.name(),
        })?
        .to_f64();
    if number.fract() != 0.0 {
        return Err(Error::InvalidPlistValue {
            tag: "integer",
            value: number.to_string(),
        });
    }
    Ok(number as i64)
}

fn normalize_layer(ufo: &Path, layer: &str, dir: &str, run: &mut Run) {
    let layer_path = ufo.join(dir);
    if !layer_path.is_dir() {
        warn!("Layer '{layer}' has no directory {layer_path:?}, skipping it");
        return;
    }
    debug!("Normalizing layer '{layer}' in {layer_path:?}");

    let mapping = match normalize_glyph_file_names(ufo, dir) {
        Ok(mapping) => mapping,
        Err(e) => {
            run.fail(e);
            return;
        }
    };

    let layerinfo = layer_path.join(LAYERINFO_FILE);
    if layerinfo.is_file() {
        run.tally(normalize_layerinfo(&layerinfo));
    }

    let glyph_paths: Vec<PathBuf> = mapping
        .file_names()
        .map(|file| layer_path.join(file))
        .filter(|path| {
            let exists = path.is_file();
            if !exists {
                warn!("{path:?} is listed but does not exist");
            }
            exists
        })
        .collect();
    let results = glyph_paths
        .par_iter()
        .map(|path| normalize_glif_file(path).map_err(|e| e.in_file(path)))
        .collect::<Vec<_>>();
    for result in results {
        run.tally(result);
    }
}

/// Normalize one glif file, returning whether it changed.
pub fn normalize_glif_file(path: &Path) -> Result<bool, Error> {
    let text = read_text(path)?;
    let normalized = normalize_glif_text(&text)?;
    write_if_changed(path, &normalized)
}

fn normalize_layerinfo(path: &Path) -> Result<bool, Error> {
    let mut layerinfo = read_plist(path)?;
    normalize_layerinfo_color(&mut layerinfo);
    write_plist(path, &layerinfo)
}

fn normalize_fontinfo(path: &Path) -> Result<bool, Error> {
    let mut fontinfo = read_plist(path)?;
    normalize_fontinfo_guidelines(&mut fontinfo);
    write_plist(path, &fontinfo)
}

fn normalize_plain_plist(path: &Path) -> Result<bool, Error> {
    write_plist(path, &read_plist(path)?)
}
