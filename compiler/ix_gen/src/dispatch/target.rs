//! Dispatch target variants.
//!
//! A closed set: every index in the dispatch table resolves to exactly one
//! of these, and every place that emits or inspects a target matches on
//! the enum exhaustively.

use ix_ir::{
    Block, ConstructorKey, Constant, ErrorKind, Expr, FieldElement, MethodElement, Slot, Stmt,
    TypeName, TypeRef,
};

/// Which entry point a target is being emitted into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DispatchForm {
    /// `dispatchOne(index, bean, value)`.
    One,
    /// `dispatch(index, bean, args)`.
    Multi,
}

impl DispatchForm {
    /// Expression for argument `position`, cast to `ty`.
    pub fn argument(self, position: u16, ty: &TypeRef) -> Expr {
        match self {
            DispatchForm::One => Expr::cast(Expr::Param(Slot::Value), ty.clone()),
            DispatchForm::Multi => Expr::ArgAt {
                index: position,
                ty: ty.clone(),
            },
        }
    }
}

/// What a dispatch index resolves to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchTarget {
    /// Call a method on the bean.
    MethodInvoke {
        owner: TypeName,
        method: MethodElement,
        /// No parameters and a return value: usable as a property read.
        getter_style: bool,
    },
    /// Read a field of the bean.
    FieldGet { field: FieldElement },
    /// Write a field of the bean.
    FieldSet { field: FieldElement },
    /// Always raise `kind` with `message`.
    FixedError { kind: ErrorKind, message: String },
    /// Copy the bean through `constructor`, replacing `property`.
    ///
    /// All targets naming the same constructor share one emitted block.
    CopyConstructorMutate {
        constructor: ConstructorKey,
        property: String,
    },
}

impl DispatchTarget {
    /// Invocation of `method`, declared on `method.owner`.
    pub fn method(method: &MethodElement) -> Self {
        DispatchTarget::MethodInvoke {
            owner: method.owner.clone(),
            getter_style: method.is_getter_style(),
            method: method.clone(),
        }
    }

    pub fn unsupported_mutation(message: String) -> Self {
        DispatchTarget::FixedError {
            kind: ErrorKind::UnsupportedMutation,
            message,
        }
    }

    /// Whether this target participates in the `dispatchOne` fast path.
    ///
    /// Everything takes at most one argument except methods with several
    /// parameters, which only the array form can call.
    pub fn supports_single_arg(&self) -> bool {
        match self {
            DispatchTarget::MethodInvoke { method, .. } => method.params.len() <= 1,
            DispatchTarget::FieldGet { .. }
            | DispatchTarget::FieldSet { .. }
            | DispatchTarget::FixedError { .. }
            | DispatchTarget::CopyConstructorMutate { .. } => true,
        }
    }

    /// The type whose member this target accesses.
    pub fn owner(&self) -> Option<&TypeName> {
        match self {
            DispatchTarget::MethodInvoke { owner, .. } => Some(owner),
            DispatchTarget::FieldGet { field } | DispatchTarget::FieldSet { field } => {
                Some(&field.owner)
            }
            DispatchTarget::FixedError { .. } | DispatchTarget::CopyConstructorMutate { .. } => {
                None
            }
        }
    }

    /// The type a read produces, or a write accepts.
    pub fn value_type(&self) -> Option<&TypeRef> {
        match self {
            DispatchTarget::MethodInvoke {
                method,
                getter_style: true,
                ..
            } => method.return_type.as_ref(),
            DispatchTarget::MethodInvoke { method, .. } => method.params.first().map(|p| &p.ty),
            DispatchTarget::FieldGet { field } | DispatchTarget::FieldSet { field } => {
                Some(&field.ty)
            }
            DispatchTarget::FixedError { .. } | DispatchTarget::CopyConstructorMutate { .. } => {
                None
            }
        }
    }

    pub fn is_getter(&self) -> bool {
        matches!(
            self,
            DispatchTarget::MethodInvoke {
                getter_style: true,
                ..
            }
        )
    }

    pub fn is_field_get(&self) -> bool {
        matches!(self, DispatchTarget::FieldGet { .. })
    }

    /// Read expression against `receiver`, for getters and field reads.
    pub fn read_expr(&self, receiver: Expr) -> Option<Expr> {
        match self {
            DispatchTarget::MethodInvoke {
                owner,
                method,
                getter_style: true,
            } => Some(Expr::Invoke {
                owner: owner.clone(),
                method: method.signature(),
                receiver: Box::new(receiver),
                args: Vec::new(),
            }),
            DispatchTarget::FieldGet { field } => Some(Expr::GetField {
                owner: field.owner.clone(),
                field: field.name.clone(),
                receiver: Box::new(receiver),
            }),
            _ => None,
        }
    }

    /// Write statement storing `value` into `receiver`, for one-argument
    /// methods and field writes.
    pub fn write_stmt(&self, receiver: Expr, value: Expr) -> Option<Stmt> {
        match self {
            DispatchTarget::MethodInvoke { owner, method, .. } if method.params.len() == 1 => {
                Some(Stmt::Eval(Expr::Invoke {
                    owner: owner.clone(),
                    method: method.signature(),
                    receiver: Box::new(receiver),
                    args: vec![value],
                }))
            }
            DispatchTarget::FieldSet { field } => Some(Stmt::SetField {
                owner: field.owner.clone(),
                field: field.name.clone(),
                receiver,
                value,
            }),
            _ => None,
        }
    }

    /// Emit the branch body for this target.
    ///
    /// Returns `None` for copy-constructor targets, whose body is shared
    /// and emitted by the table.
    pub fn emit(&self, form: DispatchForm) -> Option<Block> {
        let block = match self {
            DispatchTarget::MethodInvoke { owner, method, .. } => {
                let args = (0u16..)
                    .zip(&method.params)
                    .map(|(position, param)| form.argument(position, &param.ty))
                    .collect();
                let call = Expr::Invoke {
                    owner: owner.clone(),
                    method: method.signature(),
                    receiver: Box::new(Expr::bean(owner)),
                    args,
                };
                if method.return_type.is_some() {
                    vec![Stmt::Return(call)]
                } else {
                    vec![Stmt::Eval(call), Stmt::Return(Expr::Const(Constant::Null))]
                }
            }
            DispatchTarget::FieldGet { field } => vec![Stmt::Return(Expr::GetField {
                owner: field.owner.clone(),
                field: field.name.clone(),
                receiver: Box::new(Expr::bean(&field.owner)),
            })],
            DispatchTarget::FieldSet { field } => vec![
                Stmt::SetField {
                    owner: field.owner.clone(),
                    field: field.name.clone(),
                    receiver: Expr::bean(&field.owner),
                    value: form.argument(0, &field.ty),
                },
                Stmt::Return(Expr::Const(Constant::Null)),
            ],
            DispatchTarget::FixedError { kind, message } => vec![Stmt::Raise {
                kind: *kind,
                message: message.clone(),
                detail: None,
            }],
            DispatchTarget::CopyConstructorMutate { .. } => return None,
        };
        Some(block)
    }
}
