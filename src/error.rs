use std::io;
use thiserror::Error;

//===========================================================================//

/// Everything that can go wrong while rebuilding an icon.
#[derive(Debug, Error)]
pub enum RebuildError {
    /// The container is malformed: short header, wrong type tag, or an entry
    /// whose data lies outside the file.
    #[error("malformed ICO container: {0}")]
    Format(String),
    /// A sub-image is neither a PNG stream nor a decodable legacy resource.
    #[error("cannot decode image: {0}")]
    Decode(String),
    /// The PNG encoder rejected a pixel buffer.
    #[error("cannot encode image: {0}")]
    Encode(String),
    /// Invalid tint settings or an unsupported input file.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Reading or writing a file failed.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// A failure attributed to one directory entry.
    #[error("entry {index}: {source}")]
    Entry {
        /// Position of the failing entry in the directory.
        index: usize,
        /// What went wrong with it.
        #[source]
        source: Box<RebuildError>,
    },
}

impl RebuildError {
    pub(crate) fn in_entry(self, index: usize) -> RebuildError {
        RebuildError::Entry { index, source: Box::new(self) }
    }

    /// Returns the underlying error, looking through any entry context.
    pub fn root_cause(&self) -> &RebuildError {
        match self {
            RebuildError::Entry { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Returns the index of the directory entry that failed, if known.
    pub fn entry_index(&self) -> Option<usize> {
        match *self {
            RebuildError::Entry { index, .. } => Some(index),
            _ => None,
        }
    }
}

/// Shorthand for results produced by this crate.
pub type Result<T> = std::result::Result<T, RebuildError>;

//===========================================================================//


//===========================================================================//
