//! Emission errors.

/// Errors raised while rendering a canonical tree for a dialect.
///
/// Emission never degrades: any of these aborts the whole statement.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmitError {
    #[error("{dialect} has no type mapping for {name}")]
    UnmappedType { dialect: &'static str, name: String },

    #[error("{dialect} cannot express {detail}")]
    Unsupported {
        dialect: &'static str,
        detail: String,
    },

    #[error("Invalid {function} call: {detail}")]
    InvalidCall { function: String, detail: String },

    #[error("Cannot emit non-finite float literal {0}")]
    NonFiniteFloat(String),
}

pub type EmitResult<T> = Result<T, EmitError>;
