//! Runtime values seen by generated code.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use ix_ir::model::well_known;
use ix_ir::{TypeName, TypeRef};

/// Shared, mutable bean instance. Setters mutate in place; withers and
/// copy constructors allocate a new one.
pub type ObjectRef = Rc<RefCell<Object>>;

/// A bean instance: its class and named state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Object {
    pub class: TypeName,
    pub fields: FxHashMap<String, Value>,
}

impl Object {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// A runtime value.
///
/// Equality on objects is structural, so a copy compares equal to an
/// instance built with the same state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    Object(ObjectRef),
    IntArray(Vec<i64>),
}

impl Value {
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// A fresh object of `class` holding `fields`.
    pub fn object<'f>(
        class: impl Into<String>,
        fields: impl IntoIterator<Item = (&'f str, Value)>,
    ) -> Self {
        Value::from(Object {
            class: TypeName::new(class),
            fields: fields
                .into_iter()
                .map(|(name, value)| (name.to_owned(), value))
                .collect(),
        })
    }

    /// The zero value a field or argument of type `ty` starts with.
    pub fn default_for(ty: &TypeRef) -> Self {
        match ty.name.as_str() {
            well_known::BOOLEAN => Value::Bool(false),
            name if ty.is_primitive() && name != well_known::DOUBLE && name != "float" => {
                Value::Int(0)
            }
            _ => Value::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Read a field of an object value.
    pub fn field(&self, name: &str) -> Option<Value> {
        self.as_object()
            .and_then(|object| object.borrow().field(name).cloned())
    }

    /// Same instance, not merely equal state.
    pub fn same_instance(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Runtime type, or `None` for null.
    pub fn type_name(&self) -> Option<TypeName> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(TypeName::new(well_known::BOOLEAN)),
            Value::Int(_) => Some(TypeName::new(well_known::INT)),
            Value::Str(_) => Some(TypeName::new(well_known::STRING)),
            Value::Object(object) => Some(object.borrow().class.clone()),
            Value::IntArray(_) => Some(TypeName::new("int[]")),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Str(s) => f.write_str(s),
            Value::Object(object) => {
                let object = object.borrow();
                let mut fields: Vec<_> = object.fields.iter().collect();
                fields.sort_by(|a, b| a.0.cmp(b.0));
                write!(f, "{}(", object.class.simple_name())?;
                for (i, (name, value)) in fields.into_iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}={value}")?;
                }
                f.write_str(")")
            }
            Value::IntArray(values) => write!(f, "{values:?}"),
        }
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(Rc::new(RefCell::new(object)))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}
