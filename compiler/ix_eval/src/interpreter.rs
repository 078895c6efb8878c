//! Tree-walking interpreter for generated entry points.
//!
//! Executes an artifact's structured code directly against a [`Host`]. The
//! semantics are the ones a bytecode backend would give the same IR:
//! blocks run until a `return` or `raise`, a switch case that runs off its
//! end continues after the switch, and casts are checked against the type
//! hierarchy.

use ix_ir::model::well_known;
use ix_ir::{
    Artifact, Block, Cond, Constant, DispatchIndex, Expr, MethodKind, Slot, Stmt, TypeHierarchy,
    TypeRef,
};

use crate::host::Host;
use crate::value::Value;
use crate::EvalError;

/// Parameter and local slots of one entry-point invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub index: i64,
    pub bean: Value,
    pub value: Value,
    pub args: Vec<Value>,
    pub annotation: Value,
    locals: Vec<Value>,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            index: -1,
            bean: Value::Null,
            value: Value::Null,
            args: Vec::new(),
            annotation: Value::Null,
            locals: Vec::new(),
        }
    }
}

impl Frame {
    /// Frame for `dispatchOne(index, bean, value)`.
    pub fn dispatch_one(index: i64, bean: Value, value: Value) -> Self {
        Self {
            index,
            bean,
            value,
            ..Self::default()
        }
    }

    /// Frame for `dispatch(index, bean, args)`.
    pub fn dispatch(index: i64, bean: Value, args: Vec<Value>) -> Self {
        Self {
            index,
            bean,
            args,
            ..Self::default()
        }
    }

    /// Frame for `instantiateWithArgs(args)`.
    pub fn with_args(args: Vec<Value>) -> Self {
        Self {
            args,
            ..Self::default()
        }
    }

    /// Frame for the annotation lookups.
    pub fn lookup(annotation: &str, value: Option<&str>) -> Self {
        Self {
            annotation: Value::str(annotation),
            value: value.map_or(Value::Null, Value::str),
            ..Self::default()
        }
    }

    fn param(&self, slot: Slot) -> Value {
        match slot {
            Slot::Index => Value::Int(self.index),
            Slot::Bean => self.bean.clone(),
            Slot::Value => self.value.clone(),
            Slot::Args => Value::Null,
            Slot::Annotation => self.annotation.clone(),
        }
    }
}

/// Runs the entry points of one artifact.
pub struct Interpreter<'a> {
    artifact: &'a Artifact,
    host: &'a dyn Host,
    hierarchy: &'a TypeHierarchy,
}

impl<'a> Interpreter<'a> {
    pub fn new(artifact: &'a Artifact, host: &'a dyn Host, hierarchy: &'a TypeHierarchy) -> Self {
        Self {
            artifact,
            host,
            hierarchy,
        }
    }

    /// Run entry point `kind` with `frame`.
    pub fn call(&self, kind: MethodKind, mut frame: Frame) -> Result<Value, EvalError> {
        let method = self
            .artifact
            .method(kind)
            .ok_or(EvalError::MissingEntryPoint(kind.name()))?;
        frame.locals = vec![Value::Null; method.locals as usize];
        tracing::trace!(
            artifact = %self.artifact.name,
            method = kind.name(),
            index = frame.index,
            "call"
        );
        self.exec_block(&method.body, &mut frame)?
            .ok_or(EvalError::MissingReturn(kind.name()))
    }

    /// Run `block`; `Some` when it returned.
    fn exec_block(&self, block: &Block, frame: &mut Frame) -> Result<Option<Value>, EvalError> {
        for stmt in block {
            if let Some(value) = self.exec_stmt(stmt, frame)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    fn exec_stmt(&self, stmt: &Stmt, frame: &mut Frame) -> Result<Option<Value>, EvalError> {
        match stmt {
            Stmt::Let { local, value } => {
                let value = self.eval(value, frame)?;
                if let Some(slot) = frame.locals.get_mut(local.index()) {
                    *slot = value;
                } else {
                    frame.locals.resize(local.index(), Value::Null);
                    frame.locals.push(value);
                }
                Ok(None)
            }
            Stmt::Eval(value) => {
                self.eval(value, frame)?;
                Ok(None)
            }
            Stmt::SetField {
                owner,
                field,
                receiver,
                value,
            } => {
                let receiver = self.eval(receiver, frame)?;
                let value = self.eval(value, frame)?;
                self.host.set_field(owner, field, &receiver, value)?;
                Ok(None)
            }
            Stmt::Return(value) => self.eval(value, frame).map(Some),
            Stmt::Raise {
                kind,
                message,
                detail,
            } => {
                let mut message = message.clone();
                if let Some(detail) = detail {
                    message.push_str(&self.eval(detail, frame)?.to_string());
                }
                Err(EvalError::raised(*kind, message))
            }
            Stmt::If {
                cond,
                then,
                otherwise,
            } => {
                if self.cond(cond, frame)? {
                    self.exec_block(then, frame)
                } else {
                    self.exec_block(otherwise, frame)
                }
            }
            Stmt::Switch(switch) => {
                let label = u32::try_from(frame.index)
                    .ok()
                    .and_then(|raw| switch.label_for(DispatchIndex::new(raw)));
                match label.and_then(|label| switch.block(label)) {
                    Some(block) => self.exec_block(block, frame),
                    None => self.exec_block(&switch.default, frame),
                }
            }
            Stmt::StringSwitch(switch) => {
                let block = match self.eval(&switch.scrutinee, frame)? {
                    Value::Str(key) => switch
                        .cases
                        .binary_search_by(|(case, _)| case.as_str().cmp(key.as_str()))
                        .ok()
                        .map(|pos| &switch.cases[pos].1),
                    _ => None,
                };
                self.exec_block(block.unwrap_or(&switch.default), frame)
            }
        }
    }

    fn cond(&self, cond: &Cond, frame: &mut Frame) -> Result<bool, EvalError> {
        match cond {
            Cond::IndexEq(index) => Ok(frame.index == i64::from(index.raw())),
            Cond::IsNull(value) => Ok(self.eval(value, frame)?.is_null()),
        }
    }

    fn eval(&self, expr: &Expr, frame: &mut Frame) -> Result<Value, EvalError> {
        match expr {
            Expr::Param(slot) => Ok(frame.param(*slot)),
            Expr::ArgAt { index, ty } => {
                let value = frame.args.get(usize::from(*index)).cloned().ok_or(
                    EvalError::MissingArgument {
                        index: *index,
                        count: frame.args.len(),
                    },
                )?;
                self.cast(value, ty)
            }
            Expr::Local(local) => Ok(frame
                .locals
                .get(local.index())
                .cloned()
                .unwrap_or(Value::Null)),
            Expr::Const(constant) => Ok(match constant {
                Constant::Null => Value::Null,
                Constant::Bool(b) => Value::Bool(*b),
                Constant::Int(i) => Value::Int(*i),
                Constant::Str(s) => Value::Str(s.clone()),
                Constant::EmptyIntArray => Value::IntArray(Vec::new()),
            }),
            Expr::Cast { value, ty } => {
                let value = self.eval(value, frame)?;
                self.cast(value, ty)
            }
            Expr::Invoke {
                owner,
                method,
                receiver,
                args,
            } => {
                let receiver = self.eval(receiver, frame)?;
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg, frame))
                    .collect::<Result<Vec<_>, _>>()?;
                self.host.invoke(owner, method, &receiver, args)
            }
            Expr::New {
                owner,
                constructor,
                args,
            } => {
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg, frame))
                    .collect::<Result<Vec<_>, _>>()?;
                self.host.construct(owner, constructor, args)
            }
            Expr::GetField {
                owner,
                field,
                receiver,
            } => {
                let receiver = self.eval(receiver, frame)?;
                self.host.get_field(owner, field, &receiver)
            }
            Expr::Select {
                cond,
                then,
                otherwise,
                ..
            } => {
                if self.cond(cond, frame)? {
                    self.eval(then, frame)
                } else {
                    self.eval(otherwise, frame)
                }
            }
            Expr::IntArray(array) => {
                let values = self
                    .artifact
                    .data
                    .int_array(*array)
                    .ok_or(EvalError::DanglingArray(array.raw()))?;
                Ok(Value::IntArray(values.iter().map(|&v| i64::from(v)).collect()))
            }
        }
    }

    /// Checked cast. Null passes for reference types only.
    fn cast(&self, value: Value, ty: &TypeRef) -> Result<Value, EvalError> {
        let target = ty.erasure();
        let ok = match &value {
            Value::Null => !target.is_primitive(),
            Value::Int(_) => {
                target.is_object()
                    || (target.is_primitive()
                        && target.as_str() != well_known::BOOLEAN
                        && target.as_str() != well_known::DOUBLE)
            }
            Value::Bool(_) => target.is_object() || target.as_str() == well_known::BOOLEAN,
            other => other
                .type_name()
                .is_some_and(|actual| self.hierarchy.is_subtype(&actual, target)),
        };
        if ok {
            Ok(value)
        } else {
            Err(EvalError::ClassCast {
                value: value.to_string(),
                target: target.clone(),
            })
        }
    }
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
