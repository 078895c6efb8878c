//! Named-value construction on top of [`Introspection`].

use crate::introspection::Introspection;
use crate::value::Value;
use crate::EvalError;

/// Collects property values, then constructs the bean.
///
/// Values naming constructor arguments are passed to `instantiateWithArgs`;
/// arguments without a value get their type's zero value. The remaining
/// values are applied afterwards, property by property.
pub struct Builder<'i, 'a> {
    introspection: &'i Introspection<'a>,
    values: Vec<(String, Value)>,
}

impl<'i, 'a> Builder<'i, 'a> {
    pub(crate) fn new(introspection: &'i Introspection<'a>) -> Self {
        Self {
            introspection,
            values: Vec::new(),
        }
    }

    /// Set `property` to `value`. A later value for the same property wins.
    #[must_use]
    pub fn with(mut self, property: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        match self.values.iter_mut().find(|(name, _)| name == property) {
            Some((_, slot)) => *slot = value,
            None => self.values.push((property.to_owned(), value)),
        }
        self
    }

    pub fn build(self) -> Result<Value, EvalError> {
        let introspection = self.introspection;
        if !introspection.has_builder_support() {
            return Err(EvalError::BuilderNotSupported(
                introspection.artifact().bean.clone(),
            ));
        }
        if let Some((unknown, _)) = self
            .values
            .iter()
            .find(|(name, _)| introspection.property_index(name).is_none())
        {
            return Err(EvalError::UnknownProperty(unknown.clone()));
        }

        let mut remaining = self.values;
        let arguments = &introspection.artifact().data.constructor_arguments;
        let args = arguments
            .iter()
            .map(|argument| {
                match remaining.iter().position(|(name, _)| *name == argument.name) {
                    Some(pos) => remaining.remove(pos).1,
                    None => Value::default_for(&argument.ty),
                }
            })
            .collect();
        let mut instance = introspection.instantiate_with_args(args)?;

        for (name, value) in remaining {
            let index = introspection
                .property_index(&name)
                .ok_or_else(|| EvalError::UnknownProperty(name.clone()))?;
            instance = introspection.with_property(index, &instance, value)?;
        }
        tracing::trace!(bean = %introspection.artifact().bean, "built instance");
        Ok(instance)
    }
}
