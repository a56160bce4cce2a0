use thiserror::Error;

/// Every way a `load` call can fail. All of them are fatal to the request that
/// triggered them; a failing nested load fails its parent as well.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The byte source could not be opened (missing file, unreadable archive).
    #[error("can't create stream from source {id:?}")]
    Unresolvable {
        id: String,
        #[source]
        source: std::io::Error,
    },

    /// The archive is corrupt or has no entry for the requested path.
    #[error("can't read {id:?} from zip archive")]
    Archive {
        id: String,
        #[source]
        source: zip::result::ZipError,
    },

    /// No decoder is registered for the resolved type tag.
    #[error("unknown type of data {tag:?} at source {id:?}")]
    UnknownType { tag: String, id: String },

    /// The decoder rejected the data.
    #[error("failed to decode {tag:?} data")]
    Decode {
        tag: String,
        #[source]
        source: anyhow::Error,
    },

    /// A `..` segment would leave the archive root.
    #[error("path {path:?} escapes the archive root")]
    ArchiveEscape { path: String },

    /// An archive identifier without the archive/entry separator.
    #[error("malformed archive identifier {0:?}")]
    MalformedId(String),
}

impl LoadError {
    /// Wraps a codec error reported while decoding data tagged `tag`.
    pub fn decode(tag: &str, err: impl Into<anyhow::Error>) -> Self {
        LoadError::Decode {
            tag: tag.to_string(),
            source: err.into(),
        }
    }
}

pub type Result<T, E = LoadError> = std::result::Result<T, E>;
