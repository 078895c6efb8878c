//! The introspection contract over one generated artifact.
//!
//! Property and method operations are answered from the static data
//! section and forwarded to the generated entry points; nothing here
//! inspects the bean class itself.

use ix_ir::{
    Artifact, DispatchIndex, ErrorKind, MethodKind, MethodMetadata, MutationStrategy,
    PropertyMetadata, TypeHierarchy,
};

use crate::builder::Builder;
use crate::host::Host;
use crate::interpreter::{Frame, Interpreter};
use crate::value::Value;
use crate::EvalError;

/// Runtime view of a bean through its generated artifact.
pub struct Introspection<'a> {
    artifact: &'a Artifact,
    interpreter: Interpreter<'a>,
}

impl<'a> Introspection<'a> {
    pub fn new(artifact: &'a Artifact, host: &'a dyn Host, hierarchy: &'a TypeHierarchy) -> Self {
        Self {
            artifact,
            interpreter: Interpreter::new(artifact, host, hierarchy),
        }
    }

    pub fn artifact(&self) -> &'a Artifact {
        self.artifact
    }

    // ── Metadata ────────────────────────────────────────────────────

    pub fn properties(&self) -> &'a [PropertyMetadata] {
        &self.artifact.data.properties
    }

    pub fn methods(&self) -> &'a [MethodMetadata] {
        &self.artifact.data.methods
    }

    pub fn property_index(&self, name: &str) -> Option<usize> {
        self.artifact.data.property_position(name)
    }

    pub fn method_index(&self, name: &str) -> Option<usize> {
        self.methods().iter().position(|m| m.name == name)
    }

    pub fn is_buildable(&self) -> bool {
        self.artifact.flags.buildable
    }

    pub fn has_builder_support(&self) -> bool {
        self.artifact.flags.builder_support
    }

    fn property(&self, index: usize) -> Result<&'a PropertyMetadata, EvalError> {
        self.properties()
            .get(index)
            .ok_or(EvalError::UnknownPropertyIndex(index))
    }

    // ── Construction ────────────────────────────────────────────────

    pub fn instantiate(&self) -> Result<Value, EvalError> {
        self.interpreter.call(MethodKind::Instantiate, Frame::default())
    }

    /// Construct through the primary constructor.
    ///
    /// Without an argument constructor, an empty argument list falls back
    /// to [`instantiate`](Self::instantiate).
    pub fn instantiate_with_args(&self, args: Vec<Value>) -> Result<Value, EvalError> {
        if self
            .artifact
            .method(MethodKind::InstantiateWithArgs)
            .is_none()
        {
            if args.is_empty() {
                return self.instantiate();
            }
            return Err(EvalError::raised(
                ErrorKind::UnsupportedInstantiation,
                format!(
                    "No constructor with arguments exists for type: {}",
                    self.artifact.bean
                ),
            ));
        }
        self.interpreter
            .call(MethodKind::InstantiateWithArgs, Frame::with_args(args))
    }

    pub fn builder(&self) -> Builder<'_, 'a> {
        Builder::new(self)
    }

    // ── Properties ──────────────────────────────────────────────────

    pub fn get(&self, property: usize, instance: &Value) -> Result<Value, EvalError> {
        let metadata = self.property(property)?;
        let read = metadata
            .read
            .ok_or_else(|| EvalError::NotReadable(metadata.name.clone()))?;
        self.dispatch_one(read, instance.clone(), Value::Null)
    }

    /// Store `value` through the property's writer.
    pub fn set(&self, property: usize, instance: &Value, value: Value) -> Result<(), EvalError> {
        let metadata = self.property(property)?;
        let Some(write) = metadata.write else {
            return Err(EvalError::raised(
                ErrorKind::UnsupportedMutation,
                format!(
                    "Cannot set read-only property [{}] of type: {}",
                    metadata.name, self.artifact.bean
                ),
            ));
        };
        self.dispatch_one(write, instance.clone(), value)?;
        Ok(())
    }

    /// An instance with `property` replaced by `value`.
    ///
    /// Setter properties are updated in place and the same instance comes
    /// back; every other strategy runs the wither and returns a new one.
    pub fn with_property(
        &self,
        property: usize,
        instance: &Value,
        value: Value,
    ) -> Result<Value, EvalError> {
        let metadata = self.property(property)?;
        if metadata.mutation == MutationStrategy::Setter {
            self.set(property, instance, value)?;
            return Ok(instance.clone());
        }
        match metadata.wither {
            Some(wither) => self.dispatch_one(wither, instance.clone(), value),
            None => Err(EvalError::raised(
                ErrorKind::UnsupportedMutation,
                format!(
                    "Cannot mutate property [{}] of type: {}",
                    metadata.name, self.artifact.bean
                ),
            )),
        }
    }

    // ── Methods ─────────────────────────────────────────────────────

    pub fn invoke_method(
        &self,
        method: usize,
        instance: &Value,
        args: Vec<Value>,
    ) -> Result<Value, EvalError> {
        let metadata = self
            .methods()
            .get(method)
            .ok_or(EvalError::UnknownMethodIndex(method))?;
        self.dispatch(metadata.dispatch, instance.clone(), args)
    }

    // ── Raw dispatch ────────────────────────────────────────────────

    pub fn dispatch_one(
        &self,
        index: DispatchIndex,
        bean: Value,
        value: Value,
    ) -> Result<Value, EvalError> {
        self.dispatch_one_raw(i64::from(index.raw()), bean, value)
    }

    /// `dispatchOne` with an unchecked index, as a caller outside the
    /// artifact could pass.
    pub fn dispatch_one_raw(&self, index: i64, bean: Value, value: Value) -> Result<Value, EvalError> {
        self.interpreter
            .call(MethodKind::DispatchOne, Frame::dispatch_one(index, bean, value))
    }

    pub fn dispatch(
        &self,
        index: DispatchIndex,
        bean: Value,
        args: Vec<Value>,
    ) -> Result<Value, EvalError> {
        self.dispatch_raw(i64::from(index.raw()), bean, args)
    }

    pub fn dispatch_raw(&self, index: i64, bean: Value, args: Vec<Value>) -> Result<Value, EvalError> {
        self.interpreter
            .call(MethodKind::Dispatch, Frame::dispatch(index, bean, args))
    }

    // ── Annotation indexes ──────────────────────────────────────────

    /// Position of the property indexed under `annotation`, keyed by
    /// `value` or the annotation's default association when `None`.
    pub fn find_property_by_annotation(
        &self,
        annotation: &str,
        value: Option<&str>,
    ) -> Result<Option<usize>, EvalError> {
        let found = self.interpreter.call(
            MethodKind::FindIndexedProperty,
            Frame::lookup(annotation, value),
        )?;
        match found {
            Value::Int(position) => Ok(usize::try_from(position).ok()),
            other => Err(EvalError::TypeMismatch {
                expected: "int",
                found: other.to_string(),
            }),
        }
    }

    /// Positions of every property indexed under `annotation`.
    pub fn properties_indexed_by_annotation(
        &self,
        annotation: &str,
    ) -> Result<Vec<usize>, EvalError> {
        let found = self.interpreter.call(
            MethodKind::GetIndexedProperties,
            Frame::lookup(annotation, None),
        )?;
        match found {
            Value::IntArray(positions) => Ok(positions
                .into_iter()
                .filter_map(|p| usize::try_from(p).ok())
                .collect()),
            other => Err(EvalError::TypeMismatch {
                expected: "int[]",
                found: other.to_string(),
            }),
        }
    }
}
