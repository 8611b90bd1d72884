use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Undefined GLIF format: '{0}'")]
    UndefinedFormat(String),
    #[error("Unknown data type in property list: '{0}'")]
    UnsupportedValue(&'static str),
    #[error("No unique name could be found for prefix '{prefix}' and suffix '{suffix}'")]
    ExhaustedNamespace { prefix: String, suffix: String },
    #[error("Error parsing XML: '{0}'")]
    Xml(#[from] quick_xml::Error),
    #[error("Error parsing XML attribute: '{0}'")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),
    #[error("XML document has no root element")]
    EmptyDocument,
    #[error("Unknown property list element '<{0}>'")]
    UnknownPlistElement(String),
    #[error("Invalid value for '<{tag}>': '{value}'")]
    InvalidPlistValue { tag: &'static str, value: String },
    #[error("Expected '{expected}', found '{found}'")]
    UnexpectedPlistType {
        expected: &'static str,
        found: &'static str,
    },
    #[error("Missing value for key '{0}'")]
    MissingPlistValue(String),
    #[error("could not read path '{path}': '{inner}'")]
    Load { path: PathBuf, inner: io::Error },
    #[error("could not write file '{path}': '{inner}'")]
    FileWrite { path: PathBuf, inner: io::Error },
    #[error("could not rename '{from}' to '{to}': '{inner}'")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        inner: io::Error,
    },
    #[error("could not copy '{from}' to '{to}': '{inner}'")]
    CopyTree {
        from: PathBuf,
        to: PathBuf,
        inner: io::Error,
    },
    #[error("Missing file '{0}'")]
    MissingFile(PathBuf),
    #[error("'{0}' exists but is not a directory")]
    ExpectedDirectory(PathBuf),
    #[error("output '{output}' must not contain or be inside the source '{source_dir}'")]
    OverlappingOutput { source_dir: PathBuf, output: PathBuf },
    #[error("failed to normalize '{path}': {source}")]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },
    #[error("{0} file(s) could not be normalized")]
    FilesFailed(usize),
}

impl Error {
    /// Attach the path of the file being processed.
    pub(crate) fn in_file(self, path: impl Into<PathBuf>) -> Error {
        match self {
            // already has the most specific context
            err @ Error::InFile { .. } => err,
            err => Error::InFile {
                path: path.into(),
                source: Box::new(err),
            },
        }
    }
}
