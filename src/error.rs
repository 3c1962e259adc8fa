//! Two failure families. [`Error`] is a fault while loading, writing, or moving
//! a backing file; the store logs it and keeps serving from memory.
//! [`Rejection`] is the answer a caller gets when a create or update breaks an
//! entity rule.

/// A fault in the persistence layer under an entity store.
///
/// Surfaces from [`Serializer`](crate::serializer::Serializer),
/// [`MoveStrategy`](crate::MoveStrategy) and config parsing. Entity
/// operations never return it; a store logs it and flips
/// [`is_durable`](crate::EntityStore::is_durable) instead.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The backing file, its temp file, or its directory couldn't be read,
    /// written, or moved.
    Io(String),
    /// Records couldn't be turned into a JSON array.
    Serialize(String),
    /// The backing file isn't a JSON array of records of this kind.
    Deserialize(String),
    /// Store config is malformed or names an unusable backing file.
    Config(String),
    /// The move strategy can't swap the temp file in atomically here; the
    /// writer falls back to a plain copy-over.
    AtomicMoveUnsupported,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(msg) => write!(f, "backing file i/o failed: {msg}"),
            Error::Serialize(msg) => write!(f, "could not encode records: {msg}"),
            Error::Deserialize(msg) => write!(f, "could not decode records: {msg}"),
            Error::Config(msg) => write!(f, "invalid store config: {msg}"),
            Error::AtomicMoveUnsupported => write!(f, "atomic move not supported"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Error::Io(err.to_string())
        } else if err.is_syntax() || err.is_eof() || err.is_data() {
            Error::Deserialize(err.to_string())
        } else {
            Error::Serialize(err.to_string())
        }
    }
}

/// Result of a persistence-layer step.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a store refused a create or update. The store is left unchanged.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// A required field was absent or only whitespace.
    Blank {
        /// Serialized name of the offending field.
        field: &'static str,
    },
    /// A unique field (or field combination) matches another live entity,
    /// ignoring case.
    Duplicate {
        /// Name of the unique constraint that collided.
        field: &'static str,
    },
    /// No live entity carries this identifier.
    NotFound {
        /// The identifier that was looked up.
        id: i64,
    },
    /// The update input carries no identifier.
    MissingId,
    /// Every positive `i64` identifier has been handed out.
    IdsExhausted,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::Blank { field } => write!(f, "`{field}` is required and must not be blank"),
            Rejection::Duplicate { field } => write!(f, "`{field}` is already in use"),
            Rejection::NotFound { id } => write!(f, "no entity with id {id}"),
            Rejection::MissingId => write!(f, "entity has no id"),
            Rejection::IdsExhausted => write!(f, "no identifiers left to assign"),
        }
    }
}

impl std::error::Error for Rejection {}
