use thiserror::Error;

/// Failures the model can recover from. They are reported back to it as the
/// tool result instead of ending the conversation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("access denied")]
    AccessDenied,

    #[error("no such file or directory")]
    NotFound,

    #[error("{0}")]
    KindMismatch(&'static str),

    #[error("search matches != 1 (found {matches})")]
    AmbiguousEdit { matches: usize },

    #[error("{0}")]
    Io(String),
}

impl AccessError {
    pub const IS_A_DIRECTORY: &'static str = "is a directory";
    pub const NOT_A_DIRECTORY: &'static str = "not a directory";

    pub fn is_a_directory() -> Self {
        Self::KindMismatch(Self::IS_A_DIRECTORY)
    }

    pub fn not_a_directory() -> Self {
        Self::KindMismatch(Self::NOT_A_DIRECTORY)
    }
}

impl From<std::io::Error> for AccessError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound,
            std::io::ErrorKind::PermissionDenied => Self::AccessDenied,
            std::io::ErrorKind::InvalidData => Self::Io("not valid UTF-8 text".to_string()),
            _ => Self::Io(e.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum FileError {
    #[error(transparent)]
    Access(#[from] AccessError),

    /// The sync status could not be persisted; the operation must not be
    /// reported as successful.
    #[error("Storage failure: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl From<std::io::Error> for FileError {
    fn from(e: std::io::Error) -> Self {
        Self::Access(e.into())
    }
}
