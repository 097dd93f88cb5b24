use std::io;
use std::path::PathBuf;

use flowsim_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error(transparent)]
    Index(#[from] flowsim_index::IndexError),

    #[error(transparent)]
    Ref(#[from] flowsim_refs::RefError),

    #[error("cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed state: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
}

impl SdkError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Map this error onto the shared rejection taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Index(e) => e.kind(),
            Self::Ref(e) => e.kind(),
            Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound => {
                ErrorKind::NotFound
            }
            Self::Io { .. } | Self::Serialization(_) => ErrorKind::Corrupt,
            Self::Config(_) => ErrorKind::Validation,
        }
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
