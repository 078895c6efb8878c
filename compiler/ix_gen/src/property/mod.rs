//! Property registration: read, write and wither capability per property.
//!
//! Each property is classified exactly once, in declaration order, and its
//! dispatch targets are appended to the table as it is classified. The
//! mutation strategy is the first that applies:
//!
//! 1. a setter method or writable field;
//! 2. a same-named, assignable primary-constructor parameter (the wither
//!    copies through the constructor);
//! 3. an explicit wither method named `<prefix><Name>`;
//! 4. any other constructor, requested lazily and resolved at
//!    finalization;
//! 5. a fixed `UnsupportedMutation` error.
//!
//! Copy-constructor withers stay [`WitherSlot::Pending`] until
//! [`PropertyRegistrar::resolve_withers`] runs; it either resolves every
//! pending slot or fails.

use rustc_hash::FxHashSet;

use ix_ir::{
    AnnotationData, ConstructorElement, DispatchIndex, MemberRef, MethodElement,
    MutationStrategy, PropertyElement, TypeElement, TypeHierarchy, TypeRef, Visibility,
};

use crate::config::GeneratorConfig;
use crate::copy_ctor::{
    unsupported_mutation_message, CopyConstructorSynthesizer, RequestId, Synthesis,
};
use crate::dispatch::{DispatchTable, DispatchTarget};
use crate::GenError;

/// The wither of a property, before and after finalization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WitherSlot {
    /// Waiting on a copy-constructor request.
    Pending(RequestId),
    Resolved(DispatchIndex),
}

impl WitherSlot {
    pub fn resolved(self) -> Option<DispatchIndex> {
        match self {
            WitherSlot::Resolved(index) => Some(index),
            WitherSlot::Pending(_) => None,
        }
    }
}

/// Everything the emitter needs to know about one property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyDescriptor {
    pub name: String,
    pub ty: TypeRef,
    pub generic_ty: TypeRef,
    pub type_arguments: Vec<(String, TypeRef)>,
    pub annotations: AnnotationData,
    pub read: Option<DispatchIndex>,
    pub write: Option<DispatchIndex>,
    /// Absent for setter properties, which mutate in place.
    pub wither: Option<WitherSlot>,
    pub read_only: bool,
    pub mutation: MutationStrategy,
}

impl PropertyDescriptor {
    fn new(property: &PropertyElement) -> Self {
        Self {
            name: property.name.clone(),
            ty: property.ty.clone(),
            generic_ty: property.generic_ty.clone(),
            type_arguments: property.type_arguments.clone(),
            annotations: property.annotations.clone(),
            read: None,
            write: None,
            wither: None,
            read_only: property.read_only,
            mutation: MutationStrategy::Unsupported,
        }
    }

    /// Has a writer or a constructor argument to copy through.
    pub fn is_mutable(&self) -> bool {
        self.write.is_some() || self.mutation == MutationStrategy::ConstructorArgument
    }
}

/// Classifies properties and registers their dispatch targets.
#[derive(Debug)]
pub struct PropertyRegistrar<'a> {
    bean: &'a TypeElement,
    hierarchy: &'a TypeHierarchy,
    config: &'a GeneratorConfig,
    names: FxHashSet<String>,
    properties: Vec<PropertyDescriptor>,
}

impl<'a> PropertyRegistrar<'a> {
    pub fn new(
        bean: &'a TypeElement,
        hierarchy: &'a TypeHierarchy,
        config: &'a GeneratorConfig,
    ) -> Self {
        Self {
            bean,
            hierarchy,
            config,
            names: FxHashSet::default(),
            properties: Vec::new(),
        }
    }

    /// Registered properties in registration order.
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub fn into_properties(self) -> Vec<PropertyDescriptor> {
        self.properties
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.properties.iter().position(|p| p.name == name)
    }

    /// Classify `property`, register its targets and return its position.
    pub fn register(
        &mut self,
        property: &PropertyElement,
        table: &mut DispatchTable,
        copies: &mut CopyConstructorSynthesizer,
    ) -> Result<usize, GenError> {
        if !self.names.insert(property.name.clone()) {
            return Err(GenError::DuplicatePropertyName {
                bean: self.bean.name.clone(),
                property: property.name.clone(),
            });
        }
        let mut descriptor = PropertyDescriptor::new(property);

        descriptor.read = match &property.read {
            Some(member) => self.read_target(property, member).map(|t| table.add_target(t)),
            None => None,
        };

        let writer = match &property.write {
            Some(member) if !property.read_only => self.write_target(property, member),
            _ => None,
        };

        if let Some(writer) = writer {
            descriptor.write = Some(table.add_target(writer));
            descriptor.mutation = MutationStrategy::Setter;
        } else if let Some(constructor) = self.constructor_slot(property) {
            let request = copies.request(constructor, &property.name)?;
            descriptor.wither = Some(WitherSlot::Pending(request));
            descriptor.mutation = MutationStrategy::ConstructorArgument;
        } else if let Some(method) = self.wither_method(property) {
            let index = table.add_target(DispatchTarget::method(method));
            descriptor.wither = Some(WitherSlot::Resolved(index));
            descriptor.mutation = MutationStrategy::WitherMethod;
        } else if let Some(constructor) = self.fallback_constructor() {
            let request = copies.request(constructor, &property.name)?;
            descriptor.wither = Some(WitherSlot::Pending(request));
        } else {
            let message = unsupported_mutation_message(&property.name, &self.bean.name);
            let index = table.add_target(DispatchTarget::unsupported_mutation(message));
            descriptor.wither = Some(WitherSlot::Resolved(index));
        }

        tracing::debug!(
            bean = %self.bean.name,
            property = %descriptor.name,
            read = ?descriptor.read,
            write = ?descriptor.write,
            wither = ?descriptor.wither,
            mutation = ?descriptor.mutation,
            "registered property"
        );
        self.properties.push(descriptor);
        Ok(self.properties.len() - 1)
    }

    fn read_target(&self, property: &PropertyElement, member: &MemberRef) -> Option<DispatchTarget> {
        match member {
            MemberRef::Method(method) if method.is_getter_style() => {
                Some(DispatchTarget::method(method))
            }
            MemberRef::Method(method) => {
                tracing::warn!(
                    bean = %self.bean.name,
                    property = %property.name,
                    method = %method.name,
                    "read accessor is not getter-style; property is not readable"
                );
                None
            }
            MemberRef::Field(field) => Some(DispatchTarget::FieldGet {
                field: field.clone(),
            }),
        }
    }

    fn write_target(
        &self,
        property: &PropertyElement,
        member: &MemberRef,
    ) -> Option<DispatchTarget> {
        match member {
            MemberRef::Method(method) if method.params.len() == 1 => {
                Some(DispatchTarget::method(method))
            }
            MemberRef::Field(field) if !field.is_final => Some(DispatchTarget::FieldSet {
                field: field.clone(),
            }),
            _ => {
                tracing::warn!(
                    bean = %self.bean.name,
                    property = %property.name,
                    "write accessor cannot store a single value; ignoring it"
                );
                None
            }
        }
    }

    /// The primary constructor, when it takes a same-named parameter the
    /// property's value can be passed to.
    fn constructor_slot(&self, property: &PropertyElement) -> Option<&'a ConstructorElement> {
        if self.bean.is_abstract {
            return None;
        }
        let constructor = self.bean.primary_constructor.as_ref()?;
        let param = constructor.param(&property.name)?;
        self.hierarchy
            .is_assignable(&property.ty, &param.ty)
            .then_some(constructor)
    }

    fn wither_method(&self, property: &PropertyElement) -> Option<&'a MethodElement> {
        let name = self.config.wither_name(self.bean, &property.name);
        let bean_ty = self.bean.as_type_ref();
        self.bean.methods.iter().find(|method| {
            method.name == name
                && method.visibility != Visibility::Private
                && !method.is_static
                && method.params.len() == 1
                && self
                    .hierarchy
                    .is_assignable(&property.ty, &method.params[0].ty)
                && method
                    .return_type
                    .as_ref()
                    .is_some_and(|ret| self.hierarchy.is_assignable(ret, &bean_ty))
        })
    }

    fn fallback_constructor(&self) -> Option<&'a ConstructorElement> {
        if self.bean.is_abstract {
            return None;
        }
        self.bean.copy_constructor()
    }

    /// Replace every pending wither with its resolved index.
    ///
    /// A constructor-argument property whose request fell back to an error
    /// target is downgraded to [`MutationStrategy::Unsupported`].
    pub fn resolve_withers(&mut self, synthesis: &Synthesis) -> Result<(), GenError> {
        for property in &mut self.properties {
            let Some(WitherSlot::Pending(request)) = property.wither else {
                continue;
            };
            let resolution = synthesis.resolved.get(&request).ok_or_else(|| {
                GenError::UnresolvedWither {
                    property: property.name.clone(),
                }
            })?;
            property.wither = Some(WitherSlot::Resolved(resolution.index));
            if !resolution.shared && property.mutation == MutationStrategy::ConstructorArgument {
                tracing::debug!(
                    property = %property.name,
                    "constructor argument downgraded to unsupported mutation"
                );
                property.mutation = MutationStrategy::Unsupported;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
