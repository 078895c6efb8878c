//! Shared types for the ix introspection generator.
//!
//! This crate provides:
//!
//! - **Source model** ([`model`]): the resolved view of a bean class that
//!   the generator consumes: [`TypeElement`], [`PropertyElement`],
//!   [`MethodElement`], [`FieldElement`], [`ConstructorElement`].
//!
//! - **Type hierarchy** ([`TypeHierarchy`]): assignability checks and
//!   common-supertype queries over declared supertypes.
//!
//! - **Artifact IR** ([`artifact`], [`data`]): the generated introspection
//!   class as structured code plus a static data section. Emission backends
//!   and the reference runtime both consume this form.
//!
//! - **Verification and rendering** ([`verify()`], [`pretty_artifact`]):
//!   invariant checks run before an artifact leaves the generator, and a
//!   deterministic text form for golden tests.
//!
//! # Crate Dependencies
//!
//! No dependency on the generator or the runtime: both depend on this crate,
//! so an emission backend only needs `ix_ir`.

pub mod artifact;
pub mod data;
mod hierarchy;
pub mod model;
mod pretty;
mod verify;

pub use artifact::{
    Artifact, Block, CapabilityFlags, Cond, Constant, DispatchIndex, ErrorKind, Expr,
    GeneratedMethod, LabelId, LocalId, MethodKind, Slot, Stmt, StringSwitch, Switch,
};
pub use data::{
    AnnotationRef, ArgumentMetadata, ArrayRef, MethodMetadata, MutationStrategy,
    PropertyMetadata, StaticData,
};
pub use hierarchy::TypeHierarchy;
pub use model::{
    Annotation, AnnotationData, AnnotationValue, ConstructorElement, ConstructorKey,
    FieldElement, MemberRef, MethodElement, MethodSig, ParamElement, PropertyElement,
    TypeElement, TypeName, TypeRef, Visibility,
};
pub use pretty::pretty_artifact;
pub use verify::{verify, VerifyError};
