//! Settings for a single normalization run.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{info, warn};

use crate::{error::Error, files::copy_tree};

/// What to normalize, and where.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// The UFO to read.
    pub source: PathBuf,
    /// If set, the source is copied here and the copy is normalized.
    pub output: Option<PathBuf>,
    /// Number of worker threads; rayon picks when `None`.
    pub jobs: Option<usize>,
}

impl Config {
    /// Normalize `source` in place, with default parallelism.
    pub fn new(source: impl Into<PathBuf>) -> Config {
        Config {
            source: source.into(),
            output: None,
            jobs: None,
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Config {
        self.output = Some(output.into());
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Config {
        self.jobs = Some(jobs);
        self
    }

    /// The UFO that will be rewritten.
    pub fn target(&self) -> &Path {
        self.output.as_deref().unwrap_or(&self.source)
    }

    /// Make the target exist: check the source and copy it to the output
    /// if there is one.
    pub fn init(&self) -> Result<(), Error> {
        if !self.source.exists() {
            return Err(Error::MissingFile(self.source.clone()));
        }
        if !self.source.is_dir() {
            return Err(Error::ExpectedDirectory(self.source.clone()));
        }
        let Some(output) = self.output.as_deref() else {
            return Ok(());
        };
        let source_dir = resolve(&self.source)?;
        let output_dir = resolve(output)?;
        if output_dir == source_dir {
            return Ok(());
        }
        if source_dir.starts_with(&output_dir) || output_dir.starts_with(&source_dir) {
            return Err(Error::OverlappingOutput {
                source_dir,
                output: output_dir,
            });
        }
        if output.is_dir() {
            info!("Replacing {output:?}");
            fs::remove_dir_all(output).map_err(|inner| Error::CopyTree {
                from: self.source.clone(),
                to: output.to_path_buf(),
                inner,
            })?;
        } else if output.exists() {
            return Err(Error::ExpectedDirectory(output.to_path_buf()));
        }
        copy_tree(&self.source, output)
    }

    /// Size the global rayon pool according to `jobs`.
    ///
    /// The pool can only be configured once per process; later attempts are
    /// logged and ignored.
    pub fn init_thread_pool(&self) {
        let Some(jobs) = self.jobs else {
            return;
        };
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
        {
            warn!("Unable to use {jobs} threads: {e}");
        }
    }
}

/// The absolute form of `path` with symlinks resolved, for a path that may
/// not exist yet.
fn resolve(path: &Path) -> Result<PathBuf, Error> {
    let inner = match path.canonicalize() {
        Ok(resolved) => return Ok(resolved),
        Err(inner) => inner,
    };
    let Some(name) = path.file_name() else {
        return Err(Error::Load {
            path: path.to_path_buf(),
            inner,
        });
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok(resolve(parent)?.join(name))
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn target_prefers_output() {
        let config = Config::new("a.ufo");
        assert_eq!(config.target(), Path::new("a.ufo"));
        let config = config.with_output("b.ufo").with_jobs(2);
        assert_eq!(config.target(), Path::new("b.ufo"));
        assert_eq!(config.jobs, Some(2));
    }

    #[test]
    fn missing_source() {
        let temp_dir = tempdir().unwrap();
        let config = Config::new(temp_dir.path().join("nope.ufo"));
        assert!(matches!(config.init(), Err(Error::MissingFile(_))));
    }

    #[test]
    fn source_must_be_a_directory() {
        let temp_dir = tempdir().unwrap();
        let file = temp_dir.path().join("file.ufo");
        fs::write(&file, "").unwrap();
        assert!(matches!(
            Config::new(file).init(),
            Err(Error::ExpectedDirectory(_))
        ));
    }

    #[test]
    fn output_is_replaced_by_a_copy() {
        let temp_dir = tempdir().unwrap();
        let source = temp_dir.path().join("src.ufo");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("metainfo.plist"), "m").unwrap();
        let output = temp_dir.path().join("out.ufo");
        fs::create_dir(&output).unwrap();
        fs::write(output.join("stale.plist"), "s").unwrap();

        Config::new(&source).with_output(&output).init().unwrap();
        assert!(output.join("metainfo.plist").is_file());
        assert!(!output.join("stale.plist").exists());
        assert!(source.join("metainfo.plist").is_file());
    }

    fn source_ufo(parent: &Path) -> PathBuf {
        let source = parent.join("src.ufo");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("metainfo.plist"), "m").unwrap();
        source
    }

    #[test]
    fn output_containing_the_source_is_rejected() {
        let temp_dir = tempdir().unwrap();
        let source = source_ufo(temp_dir.path());

        let result = Config::new(&source).with_output(temp_dir.path()).init();
        assert!(matches!(result, Err(Error::OverlappingOutput { .. })), "{result:?}");
        assert!(source.join("metainfo.plist").is_file());
    }

    #[test]
    fn output_inside_the_source_is_rejected() {
        let temp_dir = tempdir().unwrap();
        let source = source_ufo(temp_dir.path());

        let result = Config::new(&source)
            .with_output(source.join("nested").join("out.ufo"))
            .init();
        assert!(matches!(result, Err(Error::OverlappingOutput { .. })), "{result:?}");
        assert!(!source.join("nested").exists());
    }

    #[test]
    fn output_naming_the_source_is_in_place() {
        let temp_dir = tempdir().unwrap();
        let source = source_ufo(temp_dir.path());

        Config::new(&source)
            .with_output(source.join("."))
            .init()
            .unwrap();
        assert!(source.join("metainfo.plist").is_file());
    }
}
