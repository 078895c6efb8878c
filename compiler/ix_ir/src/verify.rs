//! Structural verification of generated artifacts.
//!
//! Run by the emitter before an artifact is handed out. Every check here is
//! an invariant the generator is supposed to uphold, so a failure is a
//! generator bug for that class, never a user error.

use rustc_hash::FxHashSet;

use crate::artifact::{walk_block, Artifact, DispatchIndex, Expr, MethodKind, Stmt, Switch};
use crate::data::{AnnotationRef, StaticData};

/// An artifact invariant violation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("missing entry point `{}`", .0.name())]
    MissingMethod(MethodKind),

    #[error("`{}` defines more than one dispatch switch", .0.name())]
    MultipleSwitches(MethodKind),

    #[error("`{method}` switch keys are not strictly ascending at key {key}")]
    UnorderedKeys { method: &'static str, key: u32 },

    #[error("`{method}` switch key {key} jumps to undefined label L{label}")]
    UndefinedLabel {
        method: &'static str,
        key: u32,
        label: u32,
    },

    #[error("`dispatch` covers {covered} of {expected} registered targets")]
    IncompleteDispatch { covered: usize, expected: u32 },

    #[error("`dispatchOne` key {0} is not a registered target")]
    UnknownFastPathKey(u32),

    #[error("{owner} references dispatch index {index}, but only {count} targets exist")]
    IndexOutOfRange {
        owner: String,
        index: u32,
        count: u32,
    },

    #[error("annotation payload {0} is referenced but not present")]
    DanglingAnnotation(u32),

    #[error("integer array {0} is referenced but not present")]
    DanglingArray(u32),

    #[error("integer array {array} references property {property}, but only {count} exist")]
    ArrayEntryOutOfRange {
        array: u32,
        property: u32,
        count: usize,
    },

    #[error("duplicate property name `{0}`")]
    DuplicateProperty(String),
}

/// Verify `artifact`, returning the first violation found.
pub fn verify(artifact: &Artifact) -> Result<(), VerifyError> {
    verify_static_data(&artifact.data, artifact.dispatch_count)?;

    let dispatch = dispatch_switch(artifact, MethodKind::Dispatch)?;
    verify_switch(MethodKind::Dispatch, dispatch)?;
    if dispatch.keys.len() != artifact.dispatch_count as usize
        || dispatch
            .keys
            .iter()
            .enumerate()
            .any(|(i, (k, _))| k.index() != i)
    {
        return Err(VerifyError::IncompleteDispatch {
            covered: dispatch.keys.len(),
            expected: artifact.dispatch_count,
        });
    }

    let fast = dispatch_switch(artifact, MethodKind::DispatchOne)?;
    verify_switch(MethodKind::DispatchOne, fast)?;
    if let Some((key, _)) = fast
        .keys
        .iter()
        .find(|(k, _)| k.raw() >= artifact.dispatch_count)
    {
        return Err(VerifyError::UnknownFastPathKey(key.raw()));
    }

    for method in &artifact.methods {
        let mut dangling = None;
        walk_block(&method.body, &mut |expr| {
            if let Expr::IntArray(array) = expr {
                if artifact.data.int_array(*array).is_none() && dangling.is_none() {
                    dangling = Some(array.raw());
                }
            }
        });
        if let Some(array) = dangling {
            return Err(VerifyError::DanglingArray(array));
        }
    }

    Ok(())
}

fn dispatch_switch(artifact: &Artifact, kind: MethodKind) -> Result<&Switch, VerifyError> {
    let method = artifact
        .method(kind)
        .ok_or(VerifyError::MissingMethod(kind))?;
    let mut switches = method.body.iter().filter_map(|stmt| match stmt {
        Stmt::Switch(switch) => Some(switch),
        _ => None,
    });
    let switch = switches.next().ok_or(VerifyError::MissingMethod(kind))?;
    if switches.next().is_some() {
        return Err(VerifyError::MultipleSwitches(kind));
    }
    Ok(switch)
}

fn verify_switch(kind: MethodKind, switch: &Switch) -> Result<(), VerifyError> {
    let labels: FxHashSet<_> = switch.blocks.iter().map(|(label, _)| *label).collect();
    let mut previous: Option<DispatchIndex> = None;
    for (key, label) in &switch.keys {
        if previous.is_some_and(|p| p >= *key) {
            return Err(VerifyError::UnorderedKeys {
                method: kind.name(),
                key: key.raw(),
            });
        }
        if !labels.contains(label) {
            return Err(VerifyError::UndefinedLabel {
                method: kind.name(),
                key: key.raw(),
                label: label.raw(),
            });
        }
        previous = Some(*key);
    }
    Ok(())
}

fn verify_static_data(data: &StaticData, count: u32) -> Result<(), VerifyError> {
    let check_index = |owner: &str, index: Option<DispatchIndex>| match index {
        Some(i) if i.raw() >= count => Err(VerifyError::IndexOutOfRange {
            owner: owner.to_owned(),
            index: i.raw(),
            count,
        }),
        _ => Ok(()),
    };
    let check_annotation = |ann: Option<AnnotationRef>| match ann {
        Some(a) if data.annotation(a).is_none() => Err(VerifyError::DanglingAnnotation(a.raw())),
        _ => Ok(()),
    };

    check_annotation(data.bean_annotation)?;

    let mut names = FxHashSet::default();
    for p in &data.properties {
        if !names.insert(p.name.as_str()) {
            return Err(VerifyError::DuplicateProperty(p.name.clone()));
        }
        let owner = format!("property `{}`", p.name);
        check_index(&owner, p.read)?;
        check_index(&owner, p.write)?;
        check_index(&owner, p.wither)?;
        check_annotation(p.annotation)?;
    }
    for m in &data.methods {
        check_index(&format!("method `{}`", m.name), Some(m.dispatch))?;
        check_annotation(m.annotation)?;
    }
    for (array, values) in (0u32..).zip(&data.int_arrays) {
        if let Some(&property) = values
            .iter()
            .find(|&&p| p as usize >= data.properties.len())
        {
            return Err(VerifyError::ArrayEntryOutOfRange {
                array,
                property,
                count: data.properties.len(),
            });
        }
    }
    Ok(())
}
