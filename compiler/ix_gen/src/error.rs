//! Generation errors and warnings.
//!
//! A [`GenError`] aborts generation of one class: no artifact is produced
//! and the partially built emitter must be discarded. A [`GenWarning`] is a
//! condition the generator recovered from by embedding a runtime error in
//! the artifact instead.

use std::fmt;

use ix_ir::{ConstructorKey, TypeName, TypeRef, VerifyError};

/// Fatal error for the class being generated.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GenError {
    #[error("{bean}: duplicate property `{property}`")]
    DuplicatePropertyName { bean: TypeName, property: String },

    #[error("dispatch index {index} is out of range ({count} targets registered)")]
    IndexOutOfRange { index: u32, count: usize },

    #[error("{bean}: annotation index `{annotation}` references unknown property `{property}`")]
    MissingIndexedProperty {
        bean: TypeName,
        annotation: String,
        property: String,
    },

    #[error("{bean}: introspection has already been emitted")]
    AlreadyEmitted { bean: TypeName },

    #[error("{bean}: an earlier emission failed; no artifact exists")]
    EmissionFailed { bean: TypeName },

    #[error("copy-constructor request for `{property}` arrived after finalization")]
    LateCopyConstructorRequest { property: String },

    #[error("copy-constructor requests were already finalized")]
    AlreadyFinalized,

    #[error("no shared mutator was synthesized for {constructor}")]
    MissingSharedMutator { constructor: ConstructorKey },

    #[error("property `{property}` has a wither request that was never resolved")]
    UnresolvedWither { property: String },

    #[error("{bean}: generated artifact failed verification: {source}")]
    InvalidArtifact {
        bean: TypeName,
        #[source]
        source: VerifyError,
    },
}

/// Why a constructor parameter could not be mapped to a property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MappingFailure {
    /// No readable property has the parameter's name.
    NoReadableProperty,
    /// The property's type is not assignable to the parameter type.
    IncompatibleType { property: TypeRef, parameter: TypeRef },
}

/// Non-fatal generation finding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenWarning {
    /// A copy constructor could not be synthesized; every pending wither
    /// routed through it raises `UnsupportedMutation` instead.
    InvalidConstructorMapping {
        bean: TypeName,
        constructor: ConstructorKey,
        parameter: String,
        failure: MappingFailure,
    },
}

impl fmt::Display for GenWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenWarning::InvalidConstructorMapping {
                bean,
                constructor,
                parameter,
                failure,
            } => {
                write!(f, "{bean}: cannot copy through {constructor}: parameter `{parameter}` ")?;
                match failure {
                    MappingFailure::NoReadableProperty => {
                        f.write_str("has no readable property of the same name")
                    }
                    MappingFailure::IncompatibleType {
                        property,
                        parameter,
                    } => write!(
                        f,
                        "expects `{parameter}` but the property is `{property}`"
                    ),
                }
            }
        }
    }
}
