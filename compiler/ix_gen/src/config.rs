//! Generator configuration.

use rustc_hash::FxHashSet;

use ix_ir::model::capitalize;
use ix_ir::TypeElement;

/// Prefix of explicit wither methods when none is configured.
pub const DEFAULT_WITHER_PREFIX: &str = "with";

/// An annotation whose occurrences on properties feed the annotation
/// indexes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedAnnotation {
    pub annotation: String,
    /// Member whose value becomes the exact-lookup key. `None` indexes the
    /// property as the annotation's default association.
    pub member: Option<String>,
}

/// Settings shared by every class of a generation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Prefix of explicit wither methods (`withName`). Overridden per class
    /// by `TypeElement::wither_prefix`.
    pub wither_prefix: String,
    /// Method names never exposed through `invokeMethod`.
    pub excluded_methods: FxHashSet<String>,
    pub indexed_annotations: Vec<IndexedAnnotation>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            wither_prefix: DEFAULT_WITHER_PREFIX.to_owned(),
            excluded_methods: FxHashSet::default(),
            indexed_annotations: Vec::new(),
        }
    }
}

impl GeneratorConfig {
    #[must_use]
    pub fn with_wither_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.wither_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn exclude_method(mut self, name: impl Into<String>) -> Self {
        self.excluded_methods.insert(name.into());
        self
    }

    #[must_use]
    pub fn index_annotation(mut self, annotation: impl Into<String>, member: Option<&str>) -> Self {
        self.indexed_annotations.push(IndexedAnnotation {
            annotation: annotation.into(),
            member: member.map(str::to_owned),
        });
        self
    }

    /// Name of the explicit wither for `property` on `bean`.
    ///
    /// An empty prefix means the wither is named like the property itself.
    pub fn wither_name(&self, bean: &TypeElement, property: &str) -> String {
        let prefix = bean.wither_prefix.as_deref().unwrap_or(self.wither_prefix.as_str());
        if prefix.is_empty() {
            property.to_owned()
        } else {
            format!("{prefix}{}", capitalize(property))
        }
    }
}
