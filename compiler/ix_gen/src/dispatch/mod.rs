//! The dispatch table: dense indices and the two indirection entry points.
//!
//! Every accessor, method and wither of a bean is registered here and gets
//! back a [`DispatchIndex`]. At emission the table produces:
//!
//! - `dispatchOne(index, bean, value)`: one flat lookup switch over every
//!   single-argument-capable index, ascending;
//! - `dispatch(index, bean, args)`: the same switch over *every* index.
//!
//! Both fall back to raising `IndexOutOfRange`. Indices routed to the same
//! copy constructor share a single label, so the constructor call is
//! emitted once per entry point no matter how many properties it serves.

mod target;

use rustc_hash::FxHashMap;

use ix_ir::{
    ConstructorKey, DispatchIndex, ErrorKind, Expr, GeneratedMethod, LabelId, MethodKind, Slot,
    Stmt, Switch,
};

use crate::copy_ctor::SharedMutators;
use crate::GenError;

pub use target::{DispatchForm, DispatchTarget};

/// Message prefix of the out-of-range fallback; the index is appended.
pub const UNKNOWN_INDEX_MESSAGE: &str = "Unknown dispatch index: ";

/// The generated `dispatchOne` and `dispatch` entry points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchMethods {
    pub dispatch_one: GeneratedMethod,
    pub dispatch: GeneratedMethod,
}

/// Registry of dispatch targets, indexed by registration order.
#[derive(Debug, Default)]
pub struct DispatchTable {
    targets: Vec<DispatchTarget>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `target` and return its index.
    ///
    /// Indices start at 0 and increase by one per call; they are never
    /// reused or renumbered.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "dispatch tables never exceed u32 entries"
    )]
    pub fn add_target(&mut self, target: DispatchTarget) -> DispatchIndex {
        let index = DispatchIndex::new(self.targets.len() as u32);
        tracing::trace!(index = index.raw(), ?target, "registered dispatch target");
        self.targets.push(target);
        index
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// The target registered at `index`.
    pub fn target(&self, index: DispatchIndex) -> Result<&DispatchTarget, GenError> {
        self.targets
            .get(index.index())
            .ok_or(GenError::IndexOutOfRange {
                index: index.raw(),
                count: self.targets.len(),
            })
    }

    /// All targets with their indices, ascending.
    pub fn targets(&self) -> impl Iterator<Item = (DispatchIndex, &DispatchTarget)> {
        (0u32..)
            .zip(&self.targets)
            .map(|(raw, target)| (DispatchIndex::new(raw), target))
    }

    /// Emit both entry points.
    ///
    /// `mutators` must hold a shared mutator for every constructor named by
    /// a [`DispatchTarget::CopyConstructorMutate`] target.
    pub fn emit(&self, mutators: &SharedMutators) -> Result<DispatchMethods, GenError> {
        let dispatch_one = self.emit_form(DispatchForm::One, mutators)?;
        let dispatch = self.emit_form(DispatchForm::Multi, mutators)?;
        tracing::debug!(
            targets = self.targets.len(),
            fast_path = fast_path_len(&dispatch_one),
            "emitted dispatch entry points"
        );
        Ok(DispatchMethods {
            dispatch_one,
            dispatch,
        })
    }

    fn emit_form(
        &self,
        form: DispatchForm,
        mutators: &SharedMutators,
    ) -> Result<GeneratedMethod, GenError> {
        let mut keys = Vec::with_capacity(self.targets.len());
        let mut blocks = Vec::new();
        let mut shared: FxHashMap<&ConstructorKey, LabelId> = FxHashMap::default();
        let mut locals = 0;
        let mut next_label = 0u32;
        let mut fresh_label = || {
            let label = LabelId::new(next_label);
            next_label += 1;
            label
        };

        for (index, target) in self.targets() {
            if form == DispatchForm::One && !target.supports_single_arg() {
                continue;
            }
            let label = if let DispatchTarget::CopyConstructorMutate { constructor, .. } = target {
                if let Some(label) = shared.get(constructor) {
                    *label
                } else {
                    let mutator = mutators.get(constructor).ok_or_else(|| {
                        GenError::MissingSharedMutator {
                            constructor: constructor.clone(),
                        }
                    })?;
                    let (block, used) = mutator.emit(form);
                    locals = locals.max(used);
                    let label = fresh_label();
                    blocks.push((label, block));
                    shared.insert(constructor, label);
                    label
                }
            } else {
                let label = fresh_label();
                // Only copy-constructor targets lack an individual body.
                let block = target.emit(form).unwrap_or_default();
                blocks.push((label, block));
                label
            };
            keys.push((index, label));
        }

        let kind = match form {
            DispatchForm::One => MethodKind::DispatchOne,
            DispatchForm::Multi => MethodKind::Dispatch,
        };
        Ok(GeneratedMethod {
            kind,
            locals,
            body: vec![Stmt::Switch(Switch {
                keys,
                blocks,
                default: vec![Stmt::Raise {
                    kind: ErrorKind::IndexOutOfRange,
                    message: UNKNOWN_INDEX_MESSAGE.to_owned(),
                    detail: Some(Expr::Param(Slot::Index)),
                }],
            })],
        })
    }
}

fn fast_path_len(method: &GeneratedMethod) -> usize {
    method
        .body
        .iter()
        .map(|stmt| match stmt {
            Stmt::Switch(switch) => switch.keys.len(),
            _ => 0,
        })
        .sum()
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
