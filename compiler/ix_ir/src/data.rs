//! Static data section of an artifact.
//!
//! Everything generated code needs that is not code: encoded annotation
//! payloads, per-property and per-method metadata, constructor argument
//! metadata and the integer arrays backing annotation indexes. Entries are
//! referenced by position, so the section is append-only while an artifact
//! is being built.

use crate::artifact::DispatchIndex;
use crate::model::{AnnotationData, TypeRef};

/// Position of an encoded annotation payload in [`StaticData::annotations`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct AnnotationRef(u32);

impl AnnotationRef {
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Position of an integer array in [`StaticData::int_arrays`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct ArrayRef(u32);

impl ArrayRef {
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// How a property can be mutated. Exactly one strategy applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum MutationStrategy {
    /// A setter method or writable field.
    Setter,
    /// A constructor argument; withers go through the shared copy constructor.
    ConstructorArgument,
    /// An explicit `withX(..)` method on the bean.
    WitherMethod,
    /// No way to mutate; the wither raises `UnsupportedMutation`.
    Unsupported,
}

/// Per-property metadata.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct PropertyMetadata {
    pub name: String,
    pub ty: TypeRef,
    pub generic_ty: TypeRef,
    pub type_arguments: Vec<(String, TypeRef)>,
    pub annotation: Option<AnnotationRef>,
    pub read: Option<DispatchIndex>,
    pub write: Option<DispatchIndex>,
    pub wither: Option<DispatchIndex>,
    pub read_only: bool,
    /// Has a writer or a matching constructor argument.
    pub mutable: bool,
    pub mutation: MutationStrategy,
}

/// A named, typed argument (method parameter or constructor argument).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ArgumentMetadata {
    pub name: String,
    pub ty: TypeRef,
}

/// Per-method metadata.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct MethodMetadata {
    pub name: String,
    pub return_type: Option<TypeRef>,
    pub params: Vec<ArgumentMetadata>,
    pub annotation: Option<AnnotationRef>,
    pub dispatch: DispatchIndex,
}

/// The static data section.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct StaticData {
    /// Encoded annotation payloads, deduplicated by the encoder.
    pub annotations: Vec<AnnotationData>,
    pub bean_annotation: Option<AnnotationRef>,
    pub properties: Vec<PropertyMetadata>,
    pub methods: Vec<MethodMetadata>,
    /// Arguments of `instantiateWithArgs`, in call order.
    pub constructor_arguments: Vec<ArgumentMetadata>,
    pub int_arrays: Vec<Vec<u32>>,
}

impl StaticData {
    /// Append an annotation payload.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "static data sections never exceed u32 entries"
    )]
    pub fn push_annotation(&mut self, data: AnnotationData) -> AnnotationRef {
        let id = AnnotationRef(self.annotations.len() as u32);
        self.annotations.push(data);
        id
    }

    /// Append an integer array.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "static data sections never exceed u32 entries"
    )]
    pub fn push_int_array(&mut self, values: Vec<u32>) -> ArrayRef {
        let id = ArrayRef(self.int_arrays.len() as u32);
        self.int_arrays.push(values);
        id
    }

    pub fn annotation(&self, id: AnnotationRef) -> Option<&AnnotationData> {
        self.annotations.get(id.index())
    }

    pub fn int_array(&self, id: ArrayRef) -> Option<&[u32]> {
        self.int_arrays.get(id.index()).map(Vec::as_slice)
    }

    /// Property position by name.
    pub fn property_position(&self, name: &str) -> Option<usize> {
        self.properties.iter().position(|p| p.name == name)
    }
}
