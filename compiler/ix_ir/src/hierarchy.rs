//! Type hierarchy queries: assignability and common supertypes.
//!
//! The generator never loads classes; everything it knows about subtyping
//! comes from the supertypes declared on [`TypeElement`]s (plus any extra
//! edges registered by the caller for library types).

use rustc_hash::{FxHashMap, FxHashSet};

use crate::model::{TypeElement, TypeName, TypeRef};

/// Declared supertype edges, keyed by type name.
///
/// [`common_supertype`](Self::common_supertype) only walks superclass
/// chains, matching how a verifier merges reference types at a branch join.
#[derive(Clone, Debug, Default)]
pub struct TypeHierarchy {
    supertypes: FxHashMap<TypeName, Supertypes>,
}

#[derive(Clone, Debug, Default)]
struct Supertypes {
    superclass: Option<TypeName>,
    interfaces: Vec<TypeName>,
}

impl Supertypes {
    fn iter(&self) -> impl Iterator<Item = &TypeName> {
        self.superclass.iter().chain(self.interfaces.iter())
    }
}

impl TypeHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a hierarchy from a batch of classes.
    pub fn from_classes<'a>(classes: impl IntoIterator<Item = &'a TypeElement>) -> Self {
        let mut hierarchy = Self::new();
        for class in classes {
            hierarchy.register(class);
        }
        hierarchy
    }

    /// Record the supertypes declared by `class`.
    pub fn register(&mut self, class: &TypeElement) {
        self.supertypes.insert(
            class.name.clone(),
            Supertypes {
                superclass: class.superclass.clone(),
                interfaces: class.interfaces.clone(),
            },
        );
    }

    /// Record supertypes for a type that has no [`TypeElement`].
    pub fn declare(
        &mut self,
        name: TypeName,
        superclass: Option<TypeName>,
        interfaces: Vec<TypeName>,
    ) {
        self.supertypes.insert(
            name,
            Supertypes {
                superclass,
                interfaces,
            },
        );
    }

    /// Whether a value of type `from` may be stored where `to` is expected.
    pub fn is_assignable(&self, from: &TypeRef, to: &TypeRef) -> bool {
        self.is_subtype(from.erasure(), to.erasure())
    }

    /// Reflexive, transitive subtyping on erased names.
    ///
    /// Every reference type is a subtype of `Object`; primitives are only
    /// subtypes of themselves.
    pub fn is_subtype(&self, from: &TypeName, to: &TypeName) -> bool {
        if from == to {
            return true;
        }
        if from.is_primitive() || to.is_primitive() {
            return false;
        }
        if to.is_object() {
            return true;
        }

        let mut seen = FxHashSet::default();
        let mut stack = vec![from];
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            let Some(supers) = self.supertypes.get(current) else {
                continue;
            };
            for sup in supers.iter() {
                if sup == to {
                    return true;
                }
                stack.push(sup);
            }
        }
        false
    }

    /// The most specific superclass shared by `a` and `b`.
    ///
    /// A type merged with itself is itself. Unrelated reference types merge
    /// to `Object`, and so does any pair involving distinct primitives (there
    /// is no common primitive supertype; the join is boxed).
    pub fn common_supertype(&self, a: &TypeName, b: &TypeName) -> TypeName {
        if a == b {
            return a.clone();
        }
        if a.is_primitive() || b.is_primitive() {
            return TypeName::object();
        }
        if self.is_subtype(a, b) {
            return b.clone();
        }
        if self.is_subtype(b, a) {
            return a.clone();
        }

        let mut current = self.superclass(a);
        let mut seen = FxHashSet::default();
        while let Some(candidate) = current {
            if !seen.insert(candidate) {
                break;
            }
            if self.is_subtype(b, candidate) {
                return candidate.clone();
            }
            current = self.superclass(candidate);
        }
        TypeName::object()
    }

    fn superclass(&self, name: &TypeName) -> Option<&TypeName> {
        self.supertypes
            .get(name)
            .and_then(|supers| supers.superclass.as_ref())
    }
}
