//! Copy-constructor synthesis for withers.
//!
//! A wither on an immutable bean builds a new instance through the bean's
//! constructor, passing the replacement value for one parameter and the
//! original instance's value for every other. Emitting that call once per
//! replaceable property duplicates the whole argument list each time, so
//! the code grows with `properties x arity`. Instead all requests against
//! one constructor share a single call site, and each argument picks its
//! source at runtime:
//!
//! ```text
//! new Point(index == 4 ? value : bean.x(),
//!           index == 5 ? value : bean.y())
//! ```
//!
//! # Lifecycle
//!
//! Requests are collected while properties are registered; each gets a
//! [`RequestId`]. [`CopyConstructorSynthesizer::finalize`] runs once, when
//! the artifact is emitted: it validates every constructor mapping,
//! registers one dispatch target per request and returns the
//! [`SharedMutators`] the dispatch table emits from. Requests after that
//! point are rejected.

use rustc_hash::{FxHashMap, FxHashSet};

use ix_ir::{
    Block, ConstructorElement, ConstructorKey, DispatchIndex, Expr, LocalId, ParamElement, Stmt,
    TypeHierarchy, TypeName,
};

use crate::dispatch::{DispatchForm, DispatchTable, DispatchTarget};
use crate::property::PropertyDescriptor;
use crate::{GenError, GenWarning, MappingFailure};

/// Identifies one pending copy-constructor request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u32);

impl RequestId {
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Requests collected against one constructor.
#[derive(Debug)]
struct CopyConstructorState {
    constructor: ConstructorElement,
    /// `(property, request)` in arrival order.
    requests: Vec<(String, RequestId)>,
}

/// How a request was resolved at finalization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub index: DispatchIndex,
    /// `true` when the index routes to the shared constructor call;
    /// `false` when it raises `UnsupportedMutation`.
    pub shared: bool,
}

/// Output of [`CopyConstructorSynthesizer::finalize`].
#[derive(Debug, Default)]
pub struct Synthesis {
    pub resolved: FxHashMap<RequestId, Resolution>,
    pub mutators: SharedMutators,
    pub warnings: Vec<GenWarning>,
}

/// Collects copy-constructor requests and synthesizes the shared call.
#[derive(Debug, Default)]
pub struct CopyConstructorSynthesizer {
    states: Vec<CopyConstructorState>,
    by_key: FxHashMap<ConstructorKey, usize>,
    next_request: u32,
    finalized: bool,
}

impl CopyConstructorSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for `property` to be replaceable through `constructor`.
    ///
    /// The state for `constructor` is created on first request and shared
    /// by every later one.
    pub fn request(
        &mut self,
        constructor: &ConstructorElement,
        property: &str,
    ) -> Result<RequestId, GenError> {
        if self.finalized {
            return Err(GenError::LateCopyConstructorRequest {
                property: property.to_owned(),
            });
        }
        let id = RequestId(self.next_request);
        self.next_request += 1;

        let slot = *self
            .by_key
            .entry(constructor.key())
            .or_insert_with(|| {
                self.states.push(CopyConstructorState {
                    constructor: constructor.clone(),
                    requests: Vec::new(),
                });
                self.states.len() - 1
            });
        self.states[slot].requests.push((property.to_owned(), id));
        Ok(id)
    }

    /// Number of requests not yet finalized.
    pub fn pending(&self) -> usize {
        if self.finalized {
            0
        } else {
            self.states.iter().map(|s| s.requests.len()).sum()
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Resolve every pending request, registering its dispatch target.
    ///
    /// Constructors are processed in order of first request, requests in
    /// arrival order, so the assigned indices are deterministic. A request
    /// resolves to the shared mutator when the constructor maps cleanly onto
    /// readable properties *and* the requested property is one of its
    /// parameters; otherwise it resolves to an `UnsupportedMutation` error
    /// target.
    pub fn finalize(
        &mut self,
        bean: &TypeName,
        properties: &[PropertyDescriptor],
        hierarchy: &TypeHierarchy,
        table: &mut DispatchTable,
    ) -> Result<Synthesis, GenError> {
        if self.finalized {
            return Err(GenError::AlreadyFinalized);
        }
        self.finalized = true;

        let mut synthesis = Synthesis::default();
        for state in &self.states {
            let mapping = map_parameters(&state.constructor, properties, hierarchy, table);
            let mapping = match mapping {
                Ok(mapping) => mapping,
                Err((parameter, failure)) => {
                    let warning = GenWarning::InvalidConstructorMapping {
                        bean: bean.clone(),
                        constructor: state.constructor.key(),
                        parameter: parameter.clone(),
                        failure,
                    };
                    tracing::warn!(%warning, "copy constructor unusable");
                    synthesis.warnings.push(warning);
                    for (property, id) in &state.requests {
                        let message = invalid_mapping_message(property, bean, &parameter);
                        let index = table.add_target(DispatchTarget::unsupported_mutation(message));
                        synthesis.resolved.insert(*id, Resolution { index, shared: false });
                    }
                    continue;
                }
            };

            let key = state.constructor.key();
            let mut replacements: FxHashMap<&str, DispatchIndex> = FxHashMap::default();
            for (property, id) in &state.requests {
                let resolution = if state.constructor.param(property).is_some() {
                    let index = table.add_target(DispatchTarget::CopyConstructorMutate {
                        constructor: key.clone(),
                        property: property.clone(),
                    });
                    replacements.entry(property.as_str()).or_insert(index);
                    Resolution { index, shared: true }
                } else {
                    let message = unsupported_mutation_message(property, bean);
                    let index = table.add_target(DispatchTarget::unsupported_mutation(message));
                    Resolution {
                        index,
                        shared: false,
                    }
                };
                synthesis.resolved.insert(*id, resolution);
            }

            if replacements.is_empty() {
                continue;
            }

            let arguments = state
                .constructor
                .params
                .iter()
                .zip(mapping)
                .map(|(param, read)| {
                    let replacement = replacements.get(param.name.as_str()).map(|&index| {
                        let read_ty = read.value_type().map_or_else(TypeName::object, |ty| {
                            ty.name.clone()
                        });
                        Replacement {
                            index,
                            merged: hierarchy.common_supertype(&param.ty.name, &read_ty),
                        }
                    });
                    ArgumentPlan {
                        param: param.clone(),
                        read,
                        replacement,
                    }
                })
                .collect();

            let params: FxHashSet<&str> = state
                .constructor
                .params
                .iter()
                .map(|p| p.name.as_str())
                .collect();
            let mut setter_copies = Vec::new();
            for property in properties {
                let (Some(read), Some(write)) = (property.read, property.write) else {
                    continue;
                };
                if params.contains(property.name.as_str()) {
                    continue;
                }
                setter_copies.push(SetterCopy {
                    read: table.target(read)?.clone(),
                    write: table.target(write)?.clone(),
                });
            }

            tracing::debug!(
                bean = %bean,
                constructor = %key,
                requests = state.requests.len(),
                shared = replacements.len(),
                setter_copies = setter_copies.len(),
                "synthesized shared copy constructor"
            );
            synthesis.mutators.insert(SharedMutator {
                owner: state.constructor.owner.clone(),
                constructor: key,
                arguments,
                setter_copies,
            });
        }
        Ok(synthesis)
    }
}

/// Map each constructor parameter to the read target of the same-named
/// property, or report the first parameter that cannot be mapped.
fn map_parameters(
    constructor: &ConstructorElement,
    properties: &[PropertyDescriptor],
    hierarchy: &TypeHierarchy,
    table: &DispatchTable,
) -> Result<Vec<DispatchTarget>, (String, MappingFailure)> {
    constructor
        .params
        .iter()
        .map(|param| {
            let property = properties.iter().find(|p| p.name == param.name);
            let read = property.and_then(|p| p.read.map(|index| (p, index)));
            let Some((property, index)) = read else {
                return Err((param.name.clone(), MappingFailure::NoReadableProperty));
            };
            if !hierarchy.is_assignable(&property.ty, &param.ty) {
                return Err((
                    param.name.clone(),
                    MappingFailure::IncompatibleType {
                        property: property.ty.clone(),
                        parameter: param.ty.clone(),
                    },
                ));
            }
            table
                .target(index)
                .map(Clone::clone)
                .map_err(|_| (param.name.clone(), MappingFailure::NoReadableProperty))
        })
        .collect()
}

pub(crate) fn unsupported_mutation_message(property: &str, bean: &TypeName) -> String {
    format!(
        "Cannot mutate property [{property}] that is not mutable via a setter method, \
         field or constructor argument for type: {bean}"
    )
}

fn invalid_mapping_message(property: &str, bean: &TypeName, parameter: &str) -> String {
    format!(
        "Cannot mutate property [{property}] of type: {bean}: constructor parameter \
         [{parameter}] has no readable property of a compatible type"
    )
}

// ── Shared mutators ─────────────────────────────────────────────────

/// A conditional constructor argument.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Replacement {
    /// Dispatch index that selects the replacement value.
    index: DispatchIndex,
    /// Type at the branch join: common supertype of the parameter type and
    /// the read type.
    merged: TypeName,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct ArgumentPlan {
    param: ParamElement,
    /// Reads the original value.
    read: DispatchTarget,
    replacement: Option<Replacement>,
}

/// Post-construction copy of a writable property that is not a
/// constructor argument.
#[derive(Clone, Debug, PartialEq, Eq)]
struct SetterCopy {
    read: DispatchTarget,
    write: DispatchTarget,
}

/// The single constructor call shared by every copy request against one
/// constructor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SharedMutator {
    owner: TypeName,
    constructor: ConstructorKey,
    arguments: Vec<ArgumentPlan>,
    setter_copies: Vec<SetterCopy>,
}

impl SharedMutator {
    pub fn constructor(&self) -> &ConstructorKey {
        &self.constructor
    }

    /// Parameters that have a replacement branch.
    pub fn replaceable(&self) -> impl Iterator<Item = (&str, DispatchIndex)> {
        self.arguments.iter().filter_map(|arg| {
            arg.replacement
                .as_ref()
                .map(|r| (arg.param.name.as_str(), r.index))
        })
    }

    /// Emit the shared block for `form`, returning it with the number of
    /// local slots it uses.
    pub fn emit(&self, form: DispatchForm) -> (Block, u32) {
        let args = self
            .arguments
            .iter()
            .map(|arg| {
                let original = original_read(&arg.read);
                match &arg.replacement {
                    Some(replacement) => Expr::Select {
                        cond: ix_ir::Cond::IndexEq(replacement.index),
                        then: Box::new(form.argument(0, &arg.param.ty)),
                        otherwise: Box::new(original),
                        ty: replacement.merged.clone(),
                    },
                    None => original,
                }
            })
            .collect();
        let construct = Expr::New {
            owner: self.owner.clone(),
            constructor: self.constructor.clone(),
            args,
        };

        if self.setter_copies.is_empty() {
            return (vec![Stmt::Return(construct)], 0);
        }

        let copy = LocalId::new(0);
        let mut block = vec![Stmt::Let {
            local: copy,
            value: construct,
        }];
        for setter in &self.setter_copies {
            if let Some(stmt) = setter
                .write
                .write_stmt(Expr::Local(copy), original_read(&setter.read))
            {
                block.push(stmt);
            }
        }
        block.push(Stmt::Return(Expr::Local(copy)));
        (block, 1)
    }
}

/// Read from the original bean through `read`.
fn original_read(read: &DispatchTarget) -> Expr {
    let owner = read.owner().cloned().unwrap_or_else(TypeName::object);
    read.read_expr(Expr::bean(&owner))
        .unwrap_or(Expr::Const(ix_ir::Constant::Null))
}

/// Shared mutators keyed by constructor.
#[derive(Debug, Default)]
pub struct SharedMutators {
    by_ctor: FxHashMap<ConstructorKey, SharedMutator>,
}

impl SharedMutators {
    pub fn get(&self, constructor: &ConstructorKey) -> Option<&SharedMutator> {
        self.by_ctor.get(constructor)
    }

    pub fn len(&self) -> usize {
        self.by_ctor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_ctor.is_empty()
    }

    fn insert(&mut self, mutator: SharedMutator) {
        self.by_ctor.insert(mutator.constructor.clone(), mutator);
    }
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
