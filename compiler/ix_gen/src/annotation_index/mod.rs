//! Annotation indexes: properties looked up by annotation, without scanning.
//!
//! Two entry points are generated, both branching on the annotation name:
//!
//! - `findIndexedProperty(annotation, value)`: the position of the property
//!   registered for `(annotation, value)`, or `-1`. A null `value` selects
//!   the property registered for the annotation without a value.
//! - `getIndexedProperties(annotation)`: every property position registered
//!   for the annotation, ascending, as a static integer array.
//!
//! Only requested annotation names get branches; anything else falls
//! through to "not found".

use std::collections::BTreeMap;

use ix_ir::{
    Block, Cond, Constant, Expr, GeneratedMethod, MethodKind, Slot, StaticData, Stmt,
    StringSwitch, TypeName,
};

use crate::config::IndexedAnnotation;
use crate::property::PropertyDescriptor;
use crate::GenError;

/// Result of `findIndexedProperty` when nothing matches.
pub const NOT_FOUND: i64 = -1;

/// One requested `(annotation, property, value?)` association.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexRequest {
    pub annotation: String,
    pub property: String,
    pub value: Option<String>,
}

/// The two generated lookup methods.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationIndexes {
    pub find: GeneratedMethod,
    pub list: GeneratedMethod,
}

#[derive(Debug, Default)]
struct ExactIndex {
    default: Option<u32>,
    values: BTreeMap<String, u32>,
}

/// Collects index requests and builds the lookup methods.
#[derive(Debug, Default)]
pub struct AnnotationIndexBuilder {
    requests: Vec<IndexRequest>,
}

impl AnnotationIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, annotation: &str, property: &str, value: Option<&str>) {
        self.requests.push(IndexRequest {
            annotation: annotation.to_owned(),
            property: property.to_owned(),
            value: value.map(str::to_owned),
        });
    }

    /// Request every property carrying one of `indexed`.
    ///
    /// The configured member's value becomes the exact-lookup key; when no
    /// member is configured, or the property's annotation does not set it,
    /// the property becomes the annotation's default association.
    pub fn request_configured(
        &mut self,
        indexed: &[IndexedAnnotation],
        properties: &[PropertyDescriptor],
    ) {
        for entry in indexed {
            for property in properties {
                let Some(annotation) = property.annotations.find(&entry.annotation) else {
                    continue;
                };
                let value = entry
                    .member
                    .as_deref()
                    .and_then(|member| annotation.member(member))
                    .and_then(ix_ir::AnnotationValue::index_key);
                self.request(&entry.annotation, &property.name, value.as_deref());
            }
        }
    }

    pub fn requests(&self) -> &[IndexRequest] {
        &self.requests
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Build both lookup methods over the frozen `properties`, pushing the
    /// backing arrays into `data`.
    ///
    /// When two requests claim the same `(annotation, value)` key, the first
    /// one wins.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "property positions never exceed u32"
    )]
    pub fn build(
        &self,
        bean: &TypeName,
        properties: &[PropertyDescriptor],
        data: &mut StaticData,
    ) -> Result<AnnotationIndexes, GenError> {
        let mut exact: BTreeMap<&str, ExactIndex> = BTreeMap::new();
        let mut multi: BTreeMap<&str, Vec<u32>> = BTreeMap::new();

        for request in &self.requests {
            let position = properties
                .iter()
                .position(|p| p.name == request.property)
                .ok_or_else(|| GenError::MissingIndexedProperty {
                    bean: bean.clone(),
                    annotation: request.annotation.clone(),
                    property: request.property.clone(),
                })? as u32;

            let entry = exact.entry(request.annotation.as_str()).or_default();
            match &request.value {
                Some(value) => {
                    entry.values.entry(value.clone()).or_insert(position);
                }
                None => {
                    entry.default.get_or_insert(position);
                }
            }
            multi
                .entry(request.annotation.as_str())
                .or_default()
                .push(position);
        }

        let find_cases = exact
            .into_iter()
            .map(|(annotation, index)| (annotation.to_owned(), find_case(index)))
            .collect();

        let list_cases = multi
            .into_iter()
            .map(|(annotation, mut positions)| {
                positions.sort_unstable();
                positions.dedup();
                let array = data.push_int_array(positions);
                (annotation.to_owned(), vec![Stmt::Return(Expr::IntArray(array))])
            })
            .collect();

        tracing::debug!(
            bean = %bean,
            requests = self.requests.len(),
            "built annotation indexes"
        );

        Ok(AnnotationIndexes {
            find: GeneratedMethod {
                kind: MethodKind::FindIndexedProperty,
                locals: 0,
                body: vec![
                    annotation_switch(find_cases),
                    Stmt::Return(Expr::Const(Constant::Int(NOT_FOUND))),
                ],
            },
            list: GeneratedMethod {
                kind: MethodKind::GetIndexedProperties,
                locals: 0,
                body: vec![
                    annotation_switch(list_cases),
                    Stmt::Return(Expr::Const(Constant::EmptyIntArray)),
                ],
            },
        })
    }
}

fn annotation_switch(cases: Vec<(String, Block)>) -> Stmt {
    Stmt::StringSwitch(StringSwitch {
        scrutinee: Expr::Param(Slot::Annotation),
        cases,
        default: Vec::new(),
    })
}

/// Branch for one annotation in `findIndexedProperty`; falls through when
/// nothing matches.
fn find_case(index: ExactIndex) -> Block {
    let by_default = index
        .default
        .map(|position| vec![Stmt::Return(position_const(position))])
        .unwrap_or_default();
    let by_value = if index.values.is_empty() {
        Vec::new()
    } else {
        vec![Stmt::StringSwitch(StringSwitch {
            scrutinee: Expr::Param(Slot::Value),
            cases: index
                .values
                .into_iter()
                .map(|(value, position)| (value, vec![Stmt::Return(position_const(position))]))
                .collect(),
            default: Vec::new(),
        })]
    };
    vec![Stmt::If {
        cond: Cond::IsNull(Box::new(Expr::Param(Slot::Value))),
        then: by_default,
        otherwise: by_value,
    }]
}

fn position_const(position: u32) -> Expr {
    Expr::Const(Constant::Int(i64::from(position)))
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
