use crate::config::InferConfig;
use crate::inference::Inferencer;
use crate::reconcile::reconcile_table;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

/// Python wrapper around the variable inferencer
#[pyclass]
#[derive(Debug)]
struct TemplateInspector {
    inferencer: Inferencer,
}

#[pymethods]
impl TemplateInspector {
    #[new]
    #[pyo3(signature = (extra_keywords = None))]
    fn new(extra_keywords: Option<Vec<String>>) -> Self {
        let config = InferConfig::new().with_keywords(extra_keywords.unwrap_or_default());
        Self {
            inferencer: Inferencer::with_config(config),
        }
    }

    /// Inferred variables as a JSON object string
    #[pyo3(text_signature = "($self, template)")]
    fn infer_variables(&self, template: &str) -> String {
        self.inferencer.infer(template).to_string()
    }

    #[pyo3(text_signature = "($self, template)")]
    fn variable_names(&self, template: &str) -> Vec<String> {
        self.inferencer
            .infer(template)
            .names()
            .map(str::to_string)
            .collect()
    }

    /// Re-infer `template` and carry over previously entered values
    #[pyo3(text_signature = "($self, template, existing_json)")]
    fn merge_values(&self, template: &str, existing_json: &str) -> PyResult<String> {
        let existing: serde_json::Value = serde_json::from_str(existing_json).map_err(|e| {
            PyValueError::new_err(format!("Failed to parse existing values: {}", e))
        })?;
        let serde_json::Value::Object(existing) = existing else {
            return Err(PyValueError::new_err(
                "Existing values must be a JSON object",
            ));
        };

        let table = self.inferencer.infer(template);
        let merged = reconcile_table(&table, &existing);
        serde_json::to_string(&merged)
            .map_err(|e| PyValueError::new_err(format!("Failed to serialize values: {}", e)))
    }
}

/// A Python module for inferring template variables
#[pymodule]
fn jinja_infer(_py: Python, m: &PyModule) -> PyResult<()> {
    // Another extension may already have installed a logger.
    let _ = env_logger::try_init();
    m.add_class::<TemplateInspector>()?;
    Ok(())
}
