//! File system helpers that attach paths to their errors.

use std::{fs, path::Path};

use log::debug;

use crate::{error::Error, plist::Plist, tree};

pub fn read_text(path: &Path) -> Result<String, Error> {
    fs::read_to_string(path).map_err(|inner| Error::Load {
        path: path.to_path_buf(),
        inner,
    })
}

/// Read and convert a property list file.
pub fn read_plist(path: &Path) -> Result<Plist, Error> {
    let text = read_text(path)?;
    tree::parse(&text)
        .and_then(|root| Plist::from_document(&root))
        .map_err(|e| e.in_file(path))
}

/// Write `text` unless the file already holds exactly that.
///
/// Returns whether the file was written.
pub fn write_if_changed(path: &Path, text: &str) -> Result<bool, Error> {
    if let Ok(existing) = fs::read_to_string(path) {
        if existing == text {
            return Ok(false);
        }
    }
    debug!("Writing {path:?}");
    fs::write(path, text).map_err(|inner| Error::FileWrite {
        path: path.to_path_buf(),
        inner,
    })?;
    Ok(true)
}

/// Canonically rewrite `plist` to `path` if that changes anything.
pub fn write_plist(path: &Path, plist: &Plist) -> Result<bool, Error> {
    let text = plist.to_document().map_err(|e| e.in_file(path))?;
    write_if_changed(path, &text)
}

pub fn rename(from: &Path, to: &Path) -> Result<(), Error> {
    debug!("Renaming {from:?} to {to:?}");
    fs::rename(from, to).map_err(|inner| Error::Rename {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        inner,
    })
}

/// Recursively copy the directory `from` to `to`, replacing files that exist.
pub fn copy_tree(from: &Path, to: &Path) -> Result<(), Error> {
    let copy_err = |inner| Error::CopyTree {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        inner,
    };
    fs::create_dir_all(to).map_err(copy_err)?;
    for entry in fs::read_dir(from).map_err(copy_err)? {
        let entry = entry.map_err(copy_err)?;
        let target = to.join(entry.file_name());
        if entry.file_type().map_err(copy_err)?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target).map_err(copy_err)?;
        }
    }
    Ok(())
}
