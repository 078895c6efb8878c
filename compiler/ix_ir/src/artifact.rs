//! Artifact IR: the generated introspection class, before binary encoding.
//!
//! The generator decides *what* to emit and in which order; an emission
//! backend (bytecode assembler, source printer) turns this IR into something
//! loadable. The reference runtime in `ix_eval` interprets it directly.
//!
//! # Shape
//!
//! - **[`Artifact`]**: one per bean: static data, generated methods, flags.
//! - **[`GeneratedMethod`]**: one per [`MethodKind`] entry point.
//! - **[`Stmt`]** / **[`Expr`]**: structured statements and expressions.
//!   Blocks fall through to the next statement unless they `Return` or
//!   `Raise`.
//! - **[`Switch`]**: a lookup switch: ascending integer keys, each mapped
//!   to a [`LabelId`], and one block per label. Several keys may share one
//!   label; that is how every copy-constructor request reaches a single
//!   constructor call site.

use std::fmt;

use crate::data::{ArrayRef, StaticData};
use crate::model::{ConstructorKey, MethodSig, TypeName, TypeRef};

// ── ID newtypes ─────────────────────────────────────────────────────

/// Dense dispatch index within one artifact.
///
/// Assigned in registration order starting from 0 and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct DispatchIndex(u32);

impl DispatchIndex {
    /// Create a dispatch index from a raw value.
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw `u32` value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize` (for indexing into `Vec`s).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DispatchIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Branch target within one [`Switch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct LabelId(u32);

impl LabelId {
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Local variable slot within one generated method.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct LocalId(u32);

impl LocalId {
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ── Entry points ────────────────────────────────────────────────────

/// The fixed set of generated entry points.
///
/// Each kind has a fixed parameter list, see [`MethodKind::params`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum MethodKind {
    /// `dispatchOne(index, bean, value)`: single-argument fast path.
    DispatchOne,
    /// `dispatch(index, bean, args)`: array-argument form, every index.
    Dispatch,
    /// `instantiate()`.
    Instantiate,
    /// `instantiateWithArgs(args)`.
    InstantiateWithArgs,
    /// `findIndexedProperty(annotation, value)`: property index or `-1`.
    FindIndexedProperty,
    /// `getIndexedProperties(annotation)`: array of property indices.
    GetIndexedProperties,
}

impl MethodKind {
    /// Parameter slots in declaration order.
    pub fn params(self) -> &'static [Slot] {
        match self {
            MethodKind::DispatchOne => &[Slot::Index, Slot::Bean, Slot::Value],
            MethodKind::Dispatch => &[Slot::Index, Slot::Bean, Slot::Args],
            MethodKind::Instantiate => &[],
            MethodKind::InstantiateWithArgs => &[Slot::Args],
            MethodKind::FindIndexedProperty => &[Slot::Annotation, Slot::Value],
            MethodKind::GetIndexedProperties => &[Slot::Annotation],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MethodKind::DispatchOne => "dispatchOne",
            MethodKind::Dispatch => "dispatch",
            MethodKind::Instantiate => "instantiate",
            MethodKind::InstantiateWithArgs => "instantiateWithArgs",
            MethodKind::FindIndexedProperty => "findIndexedProperty",
            MethodKind::GetIndexedProperties => "getIndexedProperties",
        }
    }
}

/// A parameter slot of a generated entry point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Slot {
    /// Dispatch index (`int`).
    Index,
    /// The bean instance being read, written or copied.
    Bean,
    /// Single argument value; for index lookups, the annotation value.
    Value,
    /// Argument array.
    Args,
    /// Annotation name (`String`).
    Annotation,
}

impl Slot {
    pub fn name(self) -> &'static str {
        match self {
            Slot::Index => "index",
            Slot::Bean => "bean",
            Slot::Value => "value",
            Slot::Args => "args",
            Slot::Annotation => "annotation",
        }
    }
}

// ── Errors raised by generated code ─────────────────────────────────

/// Error kinds generated code raises at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    /// Mutation of a property with no setter, constructor slot or wither.
    UnsupportedMutation,
    /// Dispatch on an index that was never registered.
    IndexOutOfRange,
    /// Instantiation of a bean without a usable constructor.
    UnsupportedInstantiation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::UnsupportedMutation => "UnsupportedMutation",
            ErrorKind::IndexOutOfRange => "IndexOutOfRange",
            ErrorKind::UnsupportedInstantiation => "UnsupportedInstantiation",
        })
    }
}

// ── Expressions ─────────────────────────────────────────────────────

/// Constant values.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Constant {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    /// A zero-length integer array.
    EmptyIntArray,
}

/// Branch condition.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Cond {
    /// `index == k`, comparing the [`Slot::Index`] parameter.
    IndexEq(DispatchIndex),
    /// `value == null`.
    IsNull(Box<Expr>),
}

/// An expression in generated code.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Expr {
    /// A parameter of the enclosing entry point.
    Param(Slot),
    /// `(ty) args[index]`.
    ArgAt { index: u16, ty: TypeRef },
    Local(LocalId),
    Const(Constant),
    /// Checked cast.
    Cast { value: Box<Expr>, ty: TypeRef },
    /// Virtual call of a method declared on `owner`.
    Invoke {
        owner: TypeName,
        method: MethodSig,
        receiver: Box<Expr>,
        args: Vec<Expr>,
    },
    /// Constructor call.
    New {
        owner: TypeName,
        constructor: ConstructorKey,
        args: Vec<Expr>,
    },
    GetField {
        owner: TypeName,
        field: String,
        receiver: Box<Expr>,
    },
    /// `cond ? then : otherwise`, with the merged type at the join.
    Select {
        cond: Cond,
        then: Box<Expr>,
        otherwise: Box<Expr>,
        ty: TypeName,
    },
    /// Reference to a static integer array.
    IntArray(ArrayRef),
}

impl Expr {
    pub fn cast(value: Expr, ty: TypeRef) -> Expr {
        Expr::Cast {
            value: Box::new(value),
            ty,
        }
    }

    /// The bean parameter, cast to `owner`.
    pub fn bean(owner: &TypeName) -> Expr {
        Expr::cast(
            Expr::Param(Slot::Bean),
            TypeRef {
                name: owner.clone(),
                args: Vec::new(),
            },
        )
    }
}

// ── Statements ──────────────────────────────────────────────────────

pub type Block = Vec<Stmt>;

/// A statement in generated code.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Stmt {
    Let {
        local: LocalId,
        value: Expr,
    },
    /// Evaluate for side effects, discarding the result.
    Eval(Expr),
    SetField {
        owner: TypeName,
        field: String,
        receiver: Expr,
        value: Expr,
    },
    Return(Expr),
    /// Raise a runtime error. `detail` is rendered after `message`.
    Raise {
        kind: ErrorKind,
        message: String,
        detail: Option<Expr>,
    },
    If {
        cond: Cond,
        then: Block,
        otherwise: Block,
    },
    Switch(Switch),
    StringSwitch(StringSwitch),
}

/// Lookup switch over the [`Slot::Index`] parameter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Switch {
    /// Ascending keys, each with its branch label.
    pub keys: Vec<(DispatchIndex, LabelId)>,
    /// One block per label, in label allocation order.
    pub blocks: Vec<(LabelId, Block)>,
    /// Taken when no key matches.
    pub default: Block,
}

impl Switch {
    pub fn block(&self, label: LabelId) -> Option<&Block> {
        self.blocks
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, block)| block)
    }

    pub fn label_for(&self, index: DispatchIndex) -> Option<LabelId> {
        self.keys
            .binary_search_by_key(&index, |(k, _)| *k)
            .ok()
            .map(|pos| self.keys[pos].1)
    }
}

/// Branch on a string value. Cases are sorted by key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct StringSwitch {
    pub scrutinee: Expr,
    pub cases: Vec<(String, Block)>,
    pub default: Block,
}

// ── Methods and artifact ────────────────────────────────────────────

/// One generated entry point.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneratedMethod {
    pub kind: MethodKind,
    /// Number of local slots used by `body`.
    pub locals: u32,
    pub body: Block,
}

/// Capability flags answered without running any code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct CapabilityFlags {
    /// A usable constructor exists.
    pub buildable: bool,
    /// A builder can populate the bean (constructor arguments or setters).
    pub builder_support: bool,
}

/// A complete generated introspection artifact for one bean.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Artifact {
    /// Name of the generated class, e.g. `geo.$Point$Introspection`.
    pub name: TypeName,
    pub bean: TypeName,
    pub data: StaticData,
    /// Entry points in emission order.
    pub methods: Vec<GeneratedMethod>,
    pub flags: CapabilityFlags,
    /// Number of registered dispatch targets.
    pub dispatch_count: u32,
}

impl Artifact {
    pub fn method(&self, kind: MethodKind) -> Option<&GeneratedMethod> {
        self.methods.iter().find(|m| m.kind == kind)
    }

    /// Count constructor call sites for `constructor` inside `kind`.
    pub fn constructor_call_sites(&self, kind: MethodKind, constructor: &ConstructorKey) -> usize {
        let Some(method) = self.method(kind) else {
            return 0;
        };
        let mut count = 0;
        walk_block(&method.body, &mut |expr| {
            if let Expr::New { constructor: c, .. } = expr {
                if c == constructor {
                    count += 1;
                }
            }
        });
        count
    }
}

/// Visit every expression in `block`, outermost first.
pub fn walk_block(block: &[Stmt], visit: &mut dyn FnMut(&Expr)) {
    for stmt in block {
        walk_stmt(stmt, visit);
    }
}

fn walk_stmt(stmt: &Stmt, visit: &mut dyn FnMut(&Expr)) {
    match stmt {
        Stmt::Let { value, .. } | Stmt::Eval(value) | Stmt::Return(value) => {
            walk_expr(value, visit);
        }
        Stmt::SetField {
            receiver, value, ..
        } => {
            walk_expr(receiver, visit);
            walk_expr(value, visit);
        }
        Stmt::Raise { detail, .. } => {
            if let Some(detail) = detail {
                walk_expr(detail, visit);
            }
        }
        Stmt::If {
            cond,
            then,
            otherwise,
        } => {
            walk_cond(cond, visit);
            walk_block(then, visit);
            walk_block(otherwise, visit);
        }
        Stmt::Switch(switch) => {
            for (_, block) in &switch.blocks {
                walk_block(block, visit);
            }
            walk_block(&switch.default, visit);
        }
        Stmt::StringSwitch(switch) => {
            walk_expr(&switch.scrutinee, visit);
            for (_, block) in &switch.cases {
                walk_block(block, visit);
            }
            walk_block(&switch.default, visit);
        }
    }
}

fn walk_cond(cond: &Cond, visit: &mut dyn FnMut(&Expr)) {
    match cond {
        Cond::IndexEq(_) => {}
        Cond::IsNull(expr) => walk_expr(expr, visit),
    }
}

fn walk_expr(expr: &Expr, visit: &mut dyn FnMut(&Expr)) {
    visit(expr);
    match expr {
        Expr::Param(_) | Expr::ArgAt { .. } | Expr::Local(_) | Expr::Const(_) | Expr::IntArray(_) => {}
        Expr::Cast { value, .. } => walk_expr(value, visit),
        Expr::Invoke { receiver, args, .. } => {
            walk_expr(receiver, visit);
            for arg in args {
                walk_expr(arg, visit);
            }
        }
        Expr::New { args, .. } => {
            for arg in args {
                walk_expr(arg, visit);
            }
        }
        Expr::GetField { receiver, .. } => walk_expr(receiver, visit),
        Expr::Select {
            cond,
            then,
            otherwise,
            ..
        } => {
            walk_cond(cond, visit);
            walk_expr(then, visit);
            walk_expr(otherwise, visit);
        }
    }
}
