//! Error types for cfgmap-client

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Identity misuse on {kind}: {message}")]
    IdentityMisuse { kind: String, message: String },

    #[error("{kind} {id} not found")]
    NotFound { kind: String, id: String },

    #[error("Request to {url} failed{}: {message}", .status.map(|s| format!(" with status {s}")).unwrap_or_default())]
    Transport {
        url: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("Invalid client configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Mapping(#[from] cfgmap_core::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn identity(kind: &str, message: impl Into<String>) -> Self {
        Self::IdentityMisuse {
            kind: kind.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn not_found(kind: &str, id: &str) -> Self {
        Self::NotFound {
            kind: kind.to_string(),
            id: id.to_string(),
        }
    }

    /// Whether the call failed before reaching the remote side.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::IdentityMisuse { .. } | Self::Credentials(_))
    }
}
