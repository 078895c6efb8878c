//! The object model generated code calls into.
//!
//! An artifact never touches bean state directly: every method call,
//! constructor call and field access goes through a [`Host`].
//! [`ConventionHost`] implements the usual bean conventions from the source
//! model, which is enough to run generated code in tests.

use std::fmt;

use rustc_hash::FxHashMap;

use ix_ir::model::capitalize;
use ix_ir::{ConstructorKey, MemberRef, MethodSig, TypeElement, TypeName};

use crate::value::{Object, Value};
use crate::EvalError;

/// Member access on behalf of generated code.
pub trait Host {
    /// Call `method`, declared on `owner`, on `receiver`.
    fn invoke(
        &self,
        owner: &TypeName,
        method: &MethodSig,
        receiver: &Value,
        args: Vec<Value>,
    ) -> Result<Value, EvalError>;

    /// Call the constructor of `owner` identified by `constructor`.
    fn construct(
        &self,
        owner: &TypeName,
        constructor: &ConstructorKey,
        args: Vec<Value>,
    ) -> Result<Value, EvalError>;

    fn get_field(&self, owner: &TypeName, field: &str, receiver: &Value) -> Result<Value, EvalError> {
        let object = receiver.as_object().ok_or_else(|| EvalError::NullReceiver {
            method: field.to_owned(),
        })?;
        let object = object.borrow();
        object
            .field(field)
            .cloned()
            .ok_or_else(|| EvalError::NoSuchField {
                owner: owner.clone(),
                field: field.to_owned(),
            })
    }

    fn set_field(
        &self,
        _owner: &TypeName,
        field: &str,
        receiver: &Value,
        value: Value,
    ) -> Result<(), EvalError> {
        let object = receiver.as_object().ok_or_else(|| EvalError::NullReceiver {
            method: field.to_owned(),
        })?;
        object.borrow_mut().fields.insert(field.to_owned(), value);
        Ok(())
    }
}

/// A method implementation bound to a [`ConventionHost`].
pub type BoundMethod = Box<dyn Fn(&Value, &[Value]) -> Result<Value, EvalError>>;

/// What a conventional method does to its receiver's state.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Convention {
    /// Return the named field.
    Read(String),
    /// Store the single argument into the named field.
    Write(String),
    /// Return a copy with the named field replaced.
    Wither(String),
}

#[derive(Debug, Default)]
struct ClassModel {
    methods: FxHashMap<String, Convention>,
    /// Parameter names per constructor; each argument initializes the
    /// same-named field.
    constructors: FxHashMap<ConstructorKey, Vec<String>>,
    /// Every property's field with its starting value.
    defaults: Vec<(String, Value)>,
}

/// Host implementing bean conventions from the source model.
///
/// Each property is backed by a field of the same name. Read and write
/// members of a property access that field, `<prefix><Name>` withers copy
/// the instance with the field replaced, and constructors assign their
/// arguments to same-named fields. Anything else must be bound explicitly
/// with [`bind`](Self::bind).
#[derive(Default)]
pub struct ConventionHost {
    classes: FxHashMap<TypeName, ClassModel>,
    bound: FxHashMap<(TypeName, String), BoundMethod>,
}

impl fmt::Debug for ConventionHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConventionHost")
            .field("classes", &self.classes)
            .field("bound", &self.bound.len())
            .finish()
    }
}

impl ConventionHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host for `classes`, with withers named `<wither_prefix><Name>`
    /// unless a class overrides the prefix.
    pub fn from_classes<'a>(
        classes: impl IntoIterator<Item = &'a TypeElement>,
        wither_prefix: &str,
    ) -> Self {
        let mut host = Self::new();
        for class in classes {
            host.register(class, wither_prefix);
        }
        host
    }

    pub fn register(&mut self, class: &TypeElement, wither_prefix: &str) {
        let mut model = ClassModel::default();
        let prefix = class.wither_prefix.as_deref().unwrap_or(wither_prefix);

        for property in &class.properties {
            let field = property.name.clone();
            model
                .defaults
                .push((field.clone(), Value::default_for(&property.ty)));
            if let Some(MemberRef::Method(read)) = &property.read {
                model
                    .methods
                    .insert(read.name.clone(), Convention::Read(field.clone()));
            }
            if let Some(MemberRef::Method(write)) = &property.write {
                model
                    .methods
                    .insert(write.name.clone(), Convention::Write(field.clone()));
            }
            let wither = if prefix.is_empty() {
                field.clone()
            } else {
                format!("{prefix}{}", capitalize(&field))
            };
            let declared = class
                .methods
                .iter()
                .any(|m| m.name == wither && m.params.len() == 1);
            if declared {
                model.methods.insert(wither, Convention::Wither(field));
            }
        }

        for constructor in class
            .primary_constructor
            .iter()
            .chain(class.default_constructor.iter())
        {
            model.constructors.insert(
                constructor.key(),
                constructor.params.iter().map(|p| p.name.clone()).collect(),
            );
        }
        self.classes.insert(class.name.clone(), model);
    }

    /// Bind `method` of `owner` to `body`, taking precedence over
    /// conventions.
    pub fn bind(
        &mut self,
        owner: &str,
        method: &str,
        body: impl Fn(&Value, &[Value]) -> Result<Value, EvalError> + 'static,
    ) {
        self.bound
            .insert((TypeName::new(owner), method.to_owned()), Box::new(body));
    }

    fn conventional(
        &self,
        owner: &TypeName,
        method: &MethodSig,
        receiver: &Value,
        mut args: Vec<Value>,
    ) -> Result<Value, EvalError> {
        let convention = self
            .classes
            .get(owner)
            .and_then(|class| class.methods.get(&method.name))
            .ok_or_else(|| EvalError::NoSuchMethod {
                owner: owner.clone(),
                method: method.name.clone(),
            })?;
        match convention {
            Convention::Read(field) => self.get_field(owner, field, receiver),
            Convention::Write(field) => {
                let value = args.pop().unwrap_or(Value::Null);
                self.set_field(owner, field, receiver, value)?;
                Ok(Value::Null)
            }
            Convention::Wither(field) => {
                let value = args.pop().unwrap_or(Value::Null);
                let original = receiver.as_object().ok_or_else(|| EvalError::NullReceiver {
                    method: method.name.clone(),
                })?;
                let mut copy: Object = original.borrow().clone();
                copy.fields.insert(field.clone(), value);
                Ok(Value::from(copy))
            }
        }
    }
}

impl Host for ConventionHost {
    fn invoke(
        &self,
        owner: &TypeName,
        method: &MethodSig,
        receiver: &Value,
        args: Vec<Value>,
    ) -> Result<Value, EvalError> {
        if receiver.is_null() {
            return Err(EvalError::NullReceiver {
                method: method.name.clone(),
            });
        }
        if let Some(body) = self.bound.get(&(owner.clone(), method.name.clone())) {
            return body(receiver, &args);
        }
        tracing::trace!(%owner, method = %method.name, "conventional invoke");
        self.conventional(owner, method, receiver, args)
    }

    fn construct(
        &self,
        owner: &TypeName,
        constructor: &ConstructorKey,
        args: Vec<Value>,
    ) -> Result<Value, EvalError> {
        let missing = || EvalError::NoSuchConstructor {
            owner: owner.clone(),
            constructor: constructor.clone(),
        };
        let class = self.classes.get(owner).ok_or_else(missing)?;
        let params = class.constructors.get(constructor).ok_or_else(missing)?;

        let mut fields: FxHashMap<String, Value> = class.defaults.iter().cloned().collect();
        for (name, value) in params.iter().zip(args) {
            fields.insert(name.clone(), value);
        }
        Ok(Value::from(Object {
            class: owner.clone(),
            fields,
        }))
    }
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
