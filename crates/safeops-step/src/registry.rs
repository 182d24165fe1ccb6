use std::collections::HashMap;
use std::sync::Arc;

use crate::step::Step;

/// Steps available to workflows, keyed by module then function.
///
/// Populated once at process start; workflows refer to entries by the
/// `module` and `function` fields of each step.
#[derive(Default, Clone)]
pub struct StepRegistry {
  modules: HashMap<String, HashMap<String, Arc<dyn Step>>>,
}

impl StepRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a step, replacing any step already registered under the same name.
  pub fn register(
    &mut self,
    module: impl Into<String>,
    function: impl Into<String>,
    step: impl Step + 'static,
  ) -> &mut Self {
    self
      .modules
      .entry(module.into())
      .or_default()
      .insert(function.into(), Arc::new(step));
    self
  }

  /// Look up a step by module and function name.
  pub fn get(&self, module: &str, function: &str) -> Option<Arc<dyn Step>> {
    self.modules.get(module)?.get(function).cloned()
  }

  pub fn contains(&self, module: &str, function: &str) -> bool {
    self
      .modules
      .get(module)
      .is_some_and(|functions| functions.contains_key(function))
  }

  /// All registered steps as sorted `module.function` identifiers.
  pub fn ids(&self) -> Vec<String> {
    let mut ids: Vec<String> = self
      .modules
      .iter()
      .flat_map(|(module, functions)| {
        functions
          .keys()
          .map(move |function| format!("{}.{}", module, function))
      })
      .collect();
    ids.sort();
    ids
  }

  pub fn len(&self) -> usize {
    self.modules.values().map(HashMap::len).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl std::fmt::Debug for StepRegistry {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepRegistry")
      .field("steps", &self.ids())
      .finish()
  }
}
