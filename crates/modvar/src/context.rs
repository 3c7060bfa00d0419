//! shared evaluation context
//!
//! Module evaluations from unrelated branches of the tree may publish at the same
//! time. Each module only ever writes its own key.
use crate::value::VariableValues;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct EvalContext {
    variables: DashMap<String, Arc<VariableValues>>,
}

impl EvalContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the variables of a module, replacing what was published before
    pub fn set_variables(&self, module: impl Into<String>, values: VariableValues) {
        let module = module.into();
        tracing::debug!(%module, count = values.len(), "publishing variables");
        self.variables.insert(module, Arc::new(values));
    }

    pub fn variables(&self, module: &str) -> Option<Arc<VariableValues>> {
        self.variables.get(module).map(|entry| Arc::clone(entry.value()))
    }

    /// Ordered copy of everything published so far
    pub fn snapshot(&self) -> BTreeMap<String, Arc<VariableValues>> {
        self.variables
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
