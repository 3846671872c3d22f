//! Multi-pass variable shape inference.
//!
//! Every pass is an independent regex scan over the full template that folds
//! its findings into one [`Accumulator`]. Pass order only decides which shape
//! wins under the merge policy; which names count as referenced does not
//! depend on it. Names that were recorded but never read (the left-hand
//! side of `set`) are dropped at the end.

mod passes;

use crate::config::InferConfig;
use crate::table::{Accumulator, VariableTable};
use log::debug;

type Pass = fn(&str, &InferConfig, &mut Accumulator);

const PASSES: [(&str, Pass); 7] = [
    ("assignment", passes::assignments),
    ("output", passes::outputs),
    ("loop", passes::loops),
    ("dict-loop", passes::dict_loops),
    ("condition", passes::conditions),
    ("indexed-access", passes::indexed_access),
    ("loop-item-properties", passes::loop_item_properties),
];

/// Infers the JSON shape of the variables a template reads.
///
/// Holds only configuration; every call to [`infer`](Self::infer) starts
/// from scratch, so one instance can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Inferencer {
    config: InferConfig,
}

impl Inferencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: InferConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InferConfig {
        &self.config
    }

    /// Run all passes over `template`. Never fails: text the heuristics do
    /// not recognize simply contributes nothing.
    pub fn infer(&self, template: &str) -> VariableTable {
        let mut acc = Accumulator::default();

        for (name, pass) in PASSES {
            pass(template, &self.config, &mut acc);
            debug!(
                "after {} pass: {} shapes, {} referenced",
                name,
                acc.table.len(),
                acc.referenced.len()
            );
        }

        let table = acc.finish();
        debug!("inferred {} variables", table.len());
        table
    }
}

/// Infer with the default configuration.
///
/// ```
/// use jinja_infer::infer_variables;
///
/// let vars = infer_variables("Hello {{ user.name }}!");
/// assert_eq!(vars.to_string(), r#"{"user":{"name":""}}"#);
/// ```
pub fn infer_variables(template: &str) -> VariableTable {
    Inferencer::default().infer(template)
}

#[cfg(test)]
mod tests;
