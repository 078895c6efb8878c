//! Dispatch and codegen engine for reflection-free introspection.
//!
//! For one bean class this crate produces an [`Artifact`](ix_ir::Artifact):
//! generated entry points that construct the bean, read and write its
//! properties, invoke its methods and derive modified copies, all through
//! small dense integer indices instead of runtime reflection.
//!
//! This crate provides:
//!
//! - **Dispatch table** ([`DispatchTable`], [`DispatchTarget`]): assigns an
//!   index to every accessible member and emits the `dispatchOne`/`dispatch`
//!   lookup switches.
//!
//! - **Property registration** ([`PropertyRegistrar`]): classifies each
//!   property's read, write and wither capability and picks exactly one
//!   [`MutationStrategy`](ix_ir::MutationStrategy).
//!
//! - **Copy-constructor synthesis** ([`CopyConstructorSynthesizer`]): one
//!   shared constructor call per constructor, whatever the number of
//!   properties replaceable through it.
//!
//! - **Annotation indexes** ([`AnnotationIndexBuilder`]): property lookups
//!   by annotation name and value.
//!
//! - **Emission** ([`IntrospectionEmitter`]): sequences the above, fills the
//!   static data section and verifies the result.
//!
//! # Crate Dependencies
//!
//! `ix_gen` depends only on `ix_ir` for the source model and the artifact
//! IR. It never executes generated code; `ix_eval` does.

pub mod annotation_index;
pub mod config;
pub mod copy_ctor;
pub mod dispatch;
mod emitter;
mod encoder;
mod error;
pub mod property;

#[cfg(test)]
mod test_helpers;

use ix_ir::{TypeElement, TypeHierarchy};

pub use annotation_index::{AnnotationIndexBuilder, AnnotationIndexes, IndexRequest, NOT_FOUND};
pub use config::{GeneratorConfig, IndexedAnnotation, DEFAULT_WITHER_PREFIX};
pub use copy_ctor::{CopyConstructorSynthesizer, RequestId, SharedMutator, SharedMutators};
pub use dispatch::{DispatchTable, DispatchTarget, UNKNOWN_INDEX_MESSAGE};
pub use emitter::{
    artifact_name, no_default_constructor_message, EmitterState, GeneratedArtifact,
    IntrospectionEmitter, MethodRecord,
};
pub use encoder::{AnnotationEncoder, PooledAnnotationEncoder};
pub use error::{GenError, GenWarning, MappingFailure};
pub use property::{PropertyDescriptor, PropertyRegistrar, WitherSlot};

/// Generate the introspection artifact for `bean`.
///
/// Registers every property, then every exposed method, then the
/// configured annotation indexes, and emits.
pub fn generate(
    bean: &TypeElement,
    hierarchy: &TypeHierarchy,
    config: &GeneratorConfig,
) -> Result<GeneratedArtifact, GenError> {
    tracing::debug!(bean = %bean.name, "generating introspection");
    let mut emitter = IntrospectionEmitter::new(bean, hierarchy, config);
    emitter.register_properties()?;
    emitter.register_methods()?;
    emitter.index_configured_annotations()?;
    emitter.emit()?.ok_or_else(|| GenError::AlreadyEmitted {
        bean: bean.name.clone(),
    })
}
