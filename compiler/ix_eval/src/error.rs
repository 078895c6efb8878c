//! Runtime errors.

use ix_ir::{ConstructorKey, ErrorKind, TypeName};

/// Failure while running an artifact.
///
/// [`EvalError::Raised`] is an error the generated code raises on purpose;
/// every other variant means the artifact and the host disagree.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("{kind}: {message}")]
    Raised { kind: ErrorKind, message: String },

    #[error("artifact has no `{0}` entry point")]
    MissingEntryPoint(&'static str),

    #[error("`{0}` completed without returning a value")]
    MissingReturn(&'static str),

    #[error("argument {index} requested, but {count} were supplied")]
    MissingArgument { index: u16, count: usize },

    #[error("cannot cast {value} to {target}")]
    ClassCast { value: String, target: TypeName },

    #[error("`{method}` invoked on null")]
    NullReceiver { method: String },

    #[error("{owner} has no method `{method}`")]
    NoSuchMethod { owner: TypeName, method: String },

    #[error("{owner} has no constructor {constructor}")]
    NoSuchConstructor {
        owner: TypeName,
        constructor: ConstructorKey,
    },

    #[error("{owner} has no field `{field}`")]
    NoSuchField { owner: TypeName, field: String },

    #[error("no property at index {0}")]
    UnknownPropertyIndex(usize),

    #[error("no method at index {0}")]
    UnknownMethodIndex(usize),

    #[error("no property named `{0}`")]
    UnknownProperty(String),

    #[error("property `{0}` is not readable")]
    NotReadable(String),

    #[error("{0} has no builder support")]
    BuilderNotSupported(TypeName),

    #[error("integer array {0} is missing from the static data")]
    DanglingArray(u32),

    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },
}

impl EvalError {
    pub fn raised(kind: ErrorKind, message: impl Into<String>) -> Self {
        EvalError::Raised {
            kind,
            message: message.into(),
        }
    }

    /// The raised error kind, for errors raised by generated code.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            EvalError::Raised { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
