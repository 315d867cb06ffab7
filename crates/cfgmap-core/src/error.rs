//! Error types for cfgmap-core

/// Result type for cfgmap-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The tree or model does not satisfy its schema
    SchemaViolation,
    /// The wire document is unparseable or carries an out-of-catalog value
    MalformedWire,
    /// A tree document could not be parsed or rendered
    Document,
    /// Underlying I/O failure
    Io,
}

/// Errors that can occur while mapping configuration entities
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Required attribute missing: {path}")]
    MissingRequired { path: String },

    #[error("Attribute {path} has {count} items, expected {min}..={max}")]
    Cardinality {
        path: String,
        count: usize,
        min: usize,
        max: String,
    },

    #[error("Unknown attribute: {path}")]
    UnknownAttribute { path: String },

    #[error("Attribute {path} expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    #[error("Attribute {path} has value {value:?}, expected one of: {}", .allowed.join(", "))]
    NotInCatalog {
        path: String,
        value: String,
        allowed: Vec<&'static str>,
    },

    #[error("Invalid value at {path}: {message}")]
    InvalidAttribute { path: String, message: String },

    #[error("Invalid wire field {field}: {message}")]
    InvalidField { field: String, message: String },

    #[error("Wire document must be a JSON object, found {found}")]
    NotAnObject { found: String },

    #[error("Malformed wire document: {0}")]
    Malformed(String),

    #[error("Failed to parse {format} tree: {message}")]
    ParseError { format: String, message: String },

    #[error("Failed to render {format} tree: {message}")]
    RenderError { format: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn parse(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn render(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RenderError {
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn missing(path: impl Into<String>) -> Self {
        Self::MissingRequired { path: path.into() }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingRequired { .. }
            | Self::Cardinality { .. }
            | Self::UnknownAttribute { .. }
            | Self::TypeMismatch { .. }
            | Self::NotInCatalog { .. }
            | Self::InvalidAttribute { .. } => ErrorKind::SchemaViolation,
            Self::InvalidField { .. } | Self::NotAnObject { .. } | Self::Malformed(_) => {
                ErrorKind::MalformedWire
            }
            Self::Json(_) => ErrorKind::MalformedWire,
            Self::ParseError { .. } | Self::RenderError { .. } => ErrorKind::Document,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    pub fn is_schema_violation(&self) -> bool {
        self.kind() == ErrorKind::SchemaViolation
    }

    pub fn is_malformed_wire(&self) -> bool {
        self.kind() == ErrorKind::MalformedWire
    }
}

/// Short name of a JSON value's type, used in mismatch messages.
pub(crate) fn type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(n) if n.is_f64() => "float",
        serde_json::Value::Number(_) => "int",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "list",
        serde_json::Value::Object(_) => "block",
    }
}
