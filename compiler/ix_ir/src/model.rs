//! Source model: the resolved view of a bean class.
//!
//! These types are produced by the front end (annotation processing or a
//! source scan) and consumed read-only by the generator. Nothing here is
//! computed by the generator itself; the model is assumed to be fully
//! resolved (types named, accessors paired with their properties,
//! constructors selected).

use std::fmt;

/// Well-known type names used by the model and the reference runtime.
pub mod well_known {
    /// The universal reference supertype.
    pub const OBJECT: &str = "Object";
    pub const STRING: &str = "String";
    pub const INT: &str = "int";
    pub const LONG: &str = "long";
    pub const BOOLEAN: &str = "boolean";
    pub const DOUBLE: &str = "double";

    /// Primitive type names. Primitives are never assignable to `Object`
    /// and only assignable to themselves.
    pub const PRIMITIVES: &[&str] = &[INT, LONG, BOOLEAN, DOUBLE, "float", "short", "byte", "char"];
}

// ── Names and type references ───────────────────────────────────────

/// A fully-qualified type name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeName(String);

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The universal reference supertype.
    pub fn object() -> Self {
        Self::new(well_known::OBJECT)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name after the last `.`, e.g. `Point` for `geo.Point`.
    pub fn simple_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    pub fn is_primitive(&self) -> bool {
        well_known::PRIMITIVES.contains(&self.0.as_str())
    }

    pub fn is_object(&self) -> bool {
        self.0 == well_known::OBJECT
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A type reference, possibly parameterized (`List<String>`).
///
/// Assignability checks operate on the erasure (`name`); type arguments are
/// carried through to property metadata untouched.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeRef {
    pub name: TypeName,
    pub args: Vec<TypeRef>,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: TypeName::new(name),
            args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self {
            name: TypeName::new(name),
            args,
        }
    }

    pub fn int() -> Self {
        Self::named(well_known::INT)
    }

    pub fn boolean() -> Self {
        Self::named(well_known::BOOLEAN)
    }

    pub fn string() -> Self {
        Self::named(well_known::STRING)
    }

    pub fn object() -> Self {
        Self::named(well_known::OBJECT)
    }

    /// The raw type, ignoring type arguments.
    #[inline]
    pub fn erasure(&self) -> &TypeName {
        &self.name
    }

    pub fn is_primitive(&self) -> bool {
        self.name.is_primitive()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

// ── Annotations ─────────────────────────────────────────────────────

/// A single annotation member value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum AnnotationValue {
    Str(String),
    Int(i64),
    Bool(bool),
    Class(TypeName),
    Array(Vec<AnnotationValue>),
}

impl AnnotationValue {
    /// String form used as a key by annotation indexes.
    ///
    /// Arrays have no single key and return `None`.
    pub fn index_key(&self) -> Option<String> {
        match self {
            AnnotationValue::Str(s) => Some(s.clone()),
            AnnotationValue::Int(i) => Some(i.to_string()),
            AnnotationValue::Bool(b) => Some(b.to_string()),
            AnnotationValue::Class(name) => Some(name.to_string()),
            AnnotationValue::Array(_) => None,
        }
    }
}

/// One annotation occurrence with its explicitly set members.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Annotation {
    pub name: String,
    pub members: Vec<(String, AnnotationValue)>,
}

impl Annotation {
    pub fn marker(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Annotation with a single `value` member.
    pub fn with_value(name: impl Into<String>, value: AnnotationValue) -> Self {
        Self {
            name: name.into(),
            members: vec![("value".to_owned(), value)],
        }
    }

    pub fn member(&self, name: &str) -> Option<&AnnotationValue> {
        self.members
            .iter()
            .find(|(member, _)| member == name)
            .map(|(_, value)| value)
    }
}

/// Annotation data attached to a class, property or method.
///
/// Opaque to the generator apart from index lookups: it is handed to the
/// annotation encoder as-is.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnotationData {
    pub annotations: Vec<Annotation>,
}

impl AnnotationData {
    pub fn new(annotations: Vec<Annotation>) -> Self {
        Self { annotations }
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.name == name)
    }
}

// ── Members ─────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Package,
    Private,
}

/// A method or constructor parameter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ParamElement {
    pub name: String,
    pub ty: TypeRef,
}

impl ParamElement {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A declared method.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct MethodElement {
    /// Declaring type.
    pub owner: TypeName,
    pub name: String,
    pub params: Vec<ParamElement>,
    /// `None` for `void` methods.
    pub return_type: Option<TypeRef>,
    pub visibility: Visibility,
    pub is_static: bool,
    pub annotations: AnnotationData,
}

impl MethodElement {
    pub fn new(
        owner: TypeName,
        name: impl Into<String>,
        params: Vec<ParamElement>,
        return_type: Option<TypeRef>,
    ) -> Self {
        Self {
            owner,
            name: name.into(),
            params,
            return_type,
            visibility: Visibility::Public,
            is_static: false,
            annotations: AnnotationData::default(),
        }
    }

    /// No parameters and a non-void return type.
    pub fn is_getter_style(&self) -> bool {
        self.params.is_empty() && self.return_type.is_some()
    }

    pub fn signature(&self) -> MethodSig {
        MethodSig {
            name: self.name.clone(),
            params: self.params.iter().map(|p| p.ty.clone()).collect(),
            return_type: self.return_type.clone(),
        }
    }
}

/// The callable shape of a method: what generated code needs to invoke it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct MethodSig {
    pub name: String,
    pub params: Vec<TypeRef>,
    pub return_type: Option<TypeRef>,
}

impl fmt::Display for MethodSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{p}")?;
        }
        f.write_str(")")?;
        match &self.return_type {
            Some(ty) => write!(f, " -> {ty}"),
            None => f.write_str(" -> void"),
        }
    }
}

/// A declared field.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldElement {
    pub owner: TypeName,
    pub name: String,
    pub ty: TypeRef,
    pub visibility: Visibility,
    pub is_final: bool,
}

impl FieldElement {
    pub fn new(owner: TypeName, name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            owner,
            name: name.into(),
            ty,
            visibility: Visibility::Public,
            is_final: false,
        }
    }
}

/// Constructor identity: the erased parameter-type signature.
///
/// A class declares at most one constructor per signature, so the key is
/// unique within one bean.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstructorKey(pub Vec<TypeName>);

impl fmt::Display for ConstructorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<init>(")?;
        for (i, ty) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{ty}")?;
        }
        f.write_str(")")
    }
}

/// A declared constructor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstructorElement {
    pub owner: TypeName,
    pub params: Vec<ParamElement>,
    pub visibility: Visibility,
}

impl ConstructorElement {
    pub fn new(owner: TypeName, params: Vec<ParamElement>) -> Self {
        Self {
            owner,
            params,
            visibility: Visibility::Public,
        }
    }

    pub fn key(&self) -> ConstructorKey {
        ConstructorKey(self.params.iter().map(|p| p.ty.name.clone()).collect())
    }

    pub fn param(&self, name: &str) -> Option<&ParamElement> {
        self.params.iter().find(|p| p.name == name)
    }
}

/// The member backing a property read or write.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum MemberRef {
    Method(MethodElement),
    Field(FieldElement),
}

/// A resolved bean property.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct PropertyElement {
    pub name: String,
    pub ty: TypeRef,
    pub generic_ty: TypeRef,
    /// Type-variable name to resolved type.
    pub type_arguments: Vec<(String, TypeRef)>,
    pub read: Option<MemberRef>,
    pub write: Option<MemberRef>,
    pub read_only: bool,
    pub annotations: AnnotationData,
}

impl PropertyElement {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            generic_ty: ty.clone(),
            ty,
            type_arguments: Vec::new(),
            read: None,
            write: None,
            read_only: false,
            annotations: AnnotationData::default(),
        }
    }
}

/// A bean class: the unit of generation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeElement {
    pub name: TypeName,
    pub superclass: Option<TypeName>,
    pub interfaces: Vec<TypeName>,
    pub is_abstract: bool,
    /// Properties in declaration order.
    pub properties: Vec<PropertyElement>,
    /// All declared methods, including private and static ones.
    pub methods: Vec<MethodElement>,
    pub primary_constructor: Option<ConstructorElement>,
    /// The no-argument constructor, if declared separately.
    pub default_constructor: Option<ConstructorElement>,
    pub annotations: AnnotationData,
    /// Overrides the configured wither prefix for this class.
    pub wither_prefix: Option<String>,
}

impl TypeElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: TypeName::new(name),
            superclass: None,
            interfaces: Vec::new(),
            is_abstract: false,
            properties: Vec::new(),
            methods: Vec::new(),
            primary_constructor: None,
            default_constructor: None,
            annotations: AnnotationData::default(),
            wither_prefix: None,
        }
    }

    pub fn as_type_ref(&self) -> TypeRef {
        TypeRef {
            name: self.name.clone(),
            args: Vec::new(),
        }
    }

    /// The constructor that takes no arguments: the declared default
    /// constructor, or a primary constructor without parameters.
    pub fn no_arg_constructor(&self) -> Option<&ConstructorElement> {
        self.default_constructor.as_ref().or(self
            .primary_constructor
            .as_ref()
            .filter(|c| c.params.is_empty()))
    }

    /// The constructor used for copy-construction: primary first.
    pub fn copy_constructor(&self) -> Option<&ConstructorElement> {
        self.primary_constructor
            .as_ref()
            .or(self.default_constructor.as_ref())
    }
}

/// Upper-case the first character: `name` -> `Name`.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
