//! The introspection emitter: orchestrates generation for one bean.
//!
//! Registration (properties, methods, index requests) populates the
//! dispatch table and the pending copy-constructor requests. [`emit`]
//! then runs once:
//!
//! 1. finalize copy-constructor requests and resolve pending withers;
//! 2. emit `dispatchOne` and `dispatch`;
//! 3. fill the static data section (annotation payloads, property, method
//!    and constructor-argument metadata, annotation index arrays);
//! 4. emit `instantiate` and, when the primary constructor takes
//!    arguments, `instantiateWithArgs`;
//! 5. compute the capability flags;
//! 6. verify the assembled artifact.
//!
//! Any error aborts the whole emission and leaves the emitter `Failed`:
//! no artifact exists, and later calls report [`GenError::EmissionFailed`].
//! The emitter is one-shot: after a successful `emit` it is `Emitted`,
//! later calls return `Ok(None)` and further registration is rejected.
//!
//! [`emit`]: IntrospectionEmitter::emit

use ix_ir::{
    verify, ArgumentMetadata, Artifact, CapabilityFlags, ConstructorElement, DispatchIndex,
    ErrorKind, Expr, GeneratedMethod, MethodElement, MethodKind, MethodMetadata,
    MutationStrategy, PropertyElement, PropertyMetadata, StaticData, Stmt, TypeElement,
    TypeHierarchy, TypeName, Visibility,
};

use crate::annotation_index::AnnotationIndexBuilder;
use crate::config::GeneratorConfig;
use crate::copy_ctor::CopyConstructorSynthesizer;
use crate::dispatch::{DispatchForm, DispatchTable, DispatchTarget};
use crate::encoder::{AnnotationEncoder, PooledAnnotationEncoder};
use crate::property::{PropertyDescriptor, PropertyRegistrar, WitherSlot};
use crate::{GenError, GenWarning};

/// Emitter lifecycle. One-way; both `Emitted` and `Failed` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmitterState {
    Pending,
    Emitted,
    /// Emission returned an error; no artifact was produced.
    Failed,
}

/// An exposed method and its dispatch index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodRecord {
    pub method: MethodElement,
    pub dispatch: DispatchIndex,
}

/// A successfully generated artifact and the warnings raised on the way.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub artifact: Artifact,
    pub warnings: Vec<GenWarning>,
}

/// Message raised by `instantiate` when the bean has no usable no-argument
/// constructor.
pub fn no_default_constructor_message(bean: &TypeName) -> String {
    format!("No default constructor exists for type: {bean}")
}

/// Name of the generated class: `pkg.$Simple$Introspection`.
pub fn artifact_name(bean: &TypeName) -> TypeName {
    let full = bean.as_str();
    let simple = bean.simple_name();
    let package = &full[..full.len() - simple.len()];
    TypeName::new(format!("{package}${simple}$Introspection"))
}

/// Generates the introspection artifact for one bean.
pub struct IntrospectionEmitter<'a> {
    bean: &'a TypeElement,
    hierarchy: &'a TypeHierarchy,
    config: &'a GeneratorConfig,
    state: EmitterState,
    table: DispatchTable,
    copies: CopyConstructorSynthesizer,
    registrar: PropertyRegistrar<'a>,
    methods: Vec<MethodRecord>,
    index: AnnotationIndexBuilder,
}

impl<'a> IntrospectionEmitter<'a> {
    pub fn new(
        bean: &'a TypeElement,
        hierarchy: &'a TypeHierarchy,
        config: &'a GeneratorConfig,
    ) -> Self {
        Self {
            bean,
            hierarchy,
            config,
            state: EmitterState::Pending,
            table: DispatchTable::new(),
            copies: CopyConstructorSynthesizer::new(),
            registrar: PropertyRegistrar::new(bean, hierarchy, config),
            methods: Vec::new(),
            index: AnnotationIndexBuilder::new(),
        }
    }

    pub fn state(&self) -> EmitterState {
        self.state
    }

    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    pub fn properties(&self) -> &[PropertyDescriptor] {
        self.registrar.properties()
    }

    pub fn methods(&self) -> &[MethodRecord] {
        &self.methods
    }

    fn ensure_pending(&self) -> Result<(), GenError> {
        match self.state {
            EmitterState::Pending => Ok(()),
            EmitterState::Emitted => Err(GenError::AlreadyEmitted {
                bean: self.bean.name.clone(),
            }),
            EmitterState::Failed => Err(GenError::EmissionFailed {
                bean: self.bean.name.clone(),
            }),
        }
    }

    // ── Registration ────────────────────────────────────────────────

    /// Register one property; returns its position.
    pub fn register_property(&mut self, property: &PropertyElement) -> Result<usize, GenError> {
        self.ensure_pending()?;
        self.registrar
            .register(property, &mut self.table, &mut self.copies)
    }

    /// Register every property of the bean, in declaration order.
    pub fn register_properties(&mut self) -> Result<(), GenError> {
        let bean = self.bean;
        for property in &bean.properties {
            self.register_property(property)?;
        }
        Ok(())
    }

    /// Register `method` if it is exposed: not private, not static and not
    /// excluded by configuration. Returns its method index.
    pub fn register_method(&mut self, method: &MethodElement) -> Result<Option<usize>, GenError> {
        self.ensure_pending()?;
        let exposed = method.visibility != Visibility::Private
            && !method.is_static
            && !self.config.excluded_methods.contains(&method.name);
        if !exposed {
            return Ok(None);
        }
        let dispatch = self.table.add_target(DispatchTarget::method(method));
        self.methods.push(MethodRecord {
            method: method.clone(),
            dispatch,
        });
        Ok(Some(self.methods.len() - 1))
    }

    /// Register every exposed method of the bean, in declaration order.
    pub fn register_methods(&mut self) -> Result<(), GenError> {
        let bean = self.bean;
        for method in &bean.methods {
            self.register_method(method)?;
        }
        Ok(())
    }

    /// Index `property` under `annotation`, optionally keyed by `value`.
    ///
    /// The property is resolved when the indexes are built, so it may be
    /// registered after this call.
    pub fn index_property(
        &mut self,
        annotation: &str,
        property: &str,
        value: Option<&str>,
    ) -> Result<(), GenError> {
        self.ensure_pending()?;
        self.index.request(annotation, property, value);
        Ok(())
    }

    /// Index the registered properties by the configured annotations.
    pub fn index_configured_annotations(&mut self) -> Result<(), GenError> {
        self.ensure_pending()?;
        self.index
            .request_configured(&self.config.indexed_annotations, self.registrar.properties());
        Ok(())
    }

    // ── Emission ────────────────────────────────────────────────────

    /// Emit with the default pooled annotation encoder.
    pub fn emit(&mut self) -> Result<Option<GeneratedArtifact>, GenError> {
        self.emit_with(&mut PooledAnnotationEncoder::default())
    }

    /// Emit the artifact, encoding annotation payloads with `encoder`.
    ///
    /// Returns `Ok(None)` if the artifact was already emitted, and
    /// [`GenError::EmissionFailed`] if an earlier emission failed.
    pub fn emit_with(
        &mut self,
        encoder: &mut dyn AnnotationEncoder,
    ) -> Result<Option<GeneratedArtifact>, GenError> {
        match self.state {
            EmitterState::Pending => {}
            EmitterState::Emitted => return Ok(None),
            EmitterState::Failed => {
                return Err(GenError::EmissionFailed {
                    bean: self.bean.name.clone(),
                })
            }
        }
        match self.assemble(encoder) {
            Ok(generated) => {
                self.state = EmitterState::Emitted;
                Ok(Some(generated))
            }
            Err(error) => {
                tracing::debug!(bean = %self.bean.name, %error, "emission failed");
                self.state = EmitterState::Failed;
                Err(error)
            }
        }
    }

    fn assemble(
        &mut self,
        encoder: &mut dyn AnnotationEncoder,
    ) -> Result<GeneratedArtifact, GenError> {
        let bean = self.bean;

        let synthesis =
            self.copies
                .finalize(&bean.name, self.registrar.properties(), self.hierarchy, &mut self.table)?;
        self.registrar.resolve_withers(&synthesis)?;
        let dispatch = self.table.emit(&synthesis.mutators)?;

        let mut data = StaticData::default();
        let bean_annotation = encoder.encode(&bean.annotations, &mut data);
        data.bean_annotation = bean_annotation;
        for property in self.registrar.properties() {
            let metadata = property_metadata(property, encoder, &mut data)?;
            data.properties.push(metadata);
        }
        for record in &self.methods {
            let annotation = encoder.encode(&record.method.annotations, &mut data);
            data.methods.push(MethodMetadata {
                name: record.method.name.clone(),
                return_type: record.method.return_type.clone(),
                params: record
                    .method
                    .params
                    .iter()
                    .map(|p| ArgumentMetadata {
                        name: p.name.clone(),
                        ty: p.ty.clone(),
                    })
                    .collect(),
                annotation,
                dispatch: record.dispatch,
            });
        }

        let mut methods = vec![dispatch.dispatch_one, dispatch.dispatch, instantiate(bean)];
        if let Some(constructor) = argument_constructor(bean) {
            data.constructor_arguments = constructor
                .params
                .iter()
                .map(|p| ArgumentMetadata {
                    name: p.name.clone(),
                    ty: p.ty.clone(),
                })
                .collect();
            methods.push(instantiate_with_args(constructor));
        }

        let indexes = self
            .index
            .build(&bean.name, self.registrar.properties(), &mut data)?;
        methods.push(indexes.find);
        methods.push(indexes.list);

        let flags = capability_flags(bean, self.registrar.properties());

        #[expect(
            clippy::cast_possible_truncation,
            reason = "dispatch tables never exceed u32 entries"
        )]
        let dispatch_count = self.table.len() as u32;

        let artifact = Artifact {
            name: artifact_name(&bean.name),
            bean: bean.name.clone(),
            data,
            methods,
            flags,
            dispatch_count,
        };
        verify(&artifact).map_err(|source| GenError::InvalidArtifact {
            bean: bean.name.clone(),
            source,
        })?;

        tracing::debug!(
            bean = %bean.name,
            artifact = %artifact.name,
            targets = dispatch_count,
            properties = artifact.data.properties.len(),
            methods = artifact.data.methods.len(),
            shared_mutators = synthesis.mutators.len(),
            warnings = synthesis.warnings.len(),
            "emitted introspection"
        );

        Ok(GeneratedArtifact {
            artifact,
            warnings: synthesis.warnings,
        })
    }
}

fn property_metadata(
    property: &PropertyDescriptor,
    encoder: &mut dyn AnnotationEncoder,
    data: &mut StaticData,
) -> Result<PropertyMetadata, GenError> {
    let wither = match property.wither {
        Some(WitherSlot::Resolved(index)) => Some(index),
        Some(WitherSlot::Pending(_)) => {
            return Err(GenError::UnresolvedWither {
                property: property.name.clone(),
            })
        }
        None => None,
    };
    Ok(PropertyMetadata {
        name: property.name.clone(),
        ty: property.ty.clone(),
        generic_ty: property.generic_ty.clone(),
        type_arguments: property.type_arguments.clone(),
        annotation: encoder.encode(&property.annotations, data),
        read: property.read,
        write: property.write,
        wither,
        read_only: property.read_only,
        mutable: property.is_mutable(),
        mutation: property.mutation,
    })
}

/// The constructor `instantiateWithArgs` calls, if any.
fn argument_constructor(bean: &TypeElement) -> Option<&ConstructorElement> {
    if bean.is_abstract {
        return None;
    }
    bean.primary_constructor
        .as_ref()
        .filter(|c| !c.params.is_empty())
}

fn instantiate(bean: &TypeElement) -> GeneratedMethod {
    let constructor = bean.no_arg_constructor().filter(|_| !bean.is_abstract);
    let body = match constructor {
        Some(constructor) => vec![Stmt::Return(Expr::New {
            owner: constructor.owner.clone(),
            constructor: constructor.key(),
            args: Vec::new(),
        })],
        None => vec![Stmt::Raise {
            kind: ErrorKind::UnsupportedInstantiation,
            message: no_default_constructor_message(&bean.name),
            detail: None,
        }],
    };
    GeneratedMethod {
        kind: MethodKind::Instantiate,
        locals: 0,
        body,
    }
}

fn instantiate_with_args(constructor: &ConstructorElement) -> GeneratedMethod {
    let args = (0u16..)
        .zip(&constructor.params)
        .map(|(position, param)| DispatchForm::Multi.argument(position, &param.ty))
        .collect();
    GeneratedMethod {
        kind: MethodKind::InstantiateWithArgs,
        locals: 0,
        body: vec![Stmt::Return(Expr::New {
            owner: constructor.owner.clone(),
            constructor: constructor.key(),
            args,
        })],
    }
}

fn capability_flags(bean: &TypeElement, properties: &[PropertyDescriptor]) -> CapabilityFlags {
    let buildable = !bean.is_abstract
        && (bean.no_arg_constructor().is_some() || bean.primary_constructor.is_some());
    let has_arguments = bean
        .primary_constructor
        .as_ref()
        .is_some_and(|c| !c.params.is_empty());
    let has_setters = properties
        .iter()
        .any(|p| p.mutation == MutationStrategy::Setter);
    CapabilityFlags {
        buildable,
        builder_support: buildable && (has_arguments || has_setters),
    }
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
mod tests;
