use crate::keywords::is_keyword;
use std::collections::HashSet;

/// Knobs for [`Inferencer`](crate::Inferencer).
#[derive(Debug, Clone)]
pub struct InferConfig {
    /// Additional names never treated as variables, stored lowercased.
    pub extra_keywords: HashSet<String>,
    /// Entries used as the sample object for `for k, v in x.items()` loops.
    pub dict_sample: Vec<(String, String)>,
    /// Largest literal index the indexed-access pass will pad an array to.
    pub max_array_index: usize,
}

impl Default for InferConfig {
    fn default() -> Self {
        Self {
            extra_keywords: HashSet::new(),
            dict_sample: vec![
                ("key1".to_string(), "value1".to_string()),
                ("key2".to_string(), "value2".to_string()),
            ],
            max_array_index: 1024,
        }
    }
}

impl InferConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat `name` as a keyword, e.g. a global function the renderer
    /// injects.
    pub fn with_keyword(mut self, name: impl Into<String>) -> Self {
        self.extra_keywords.insert(name.into().to_ascii_lowercase());
        self
    }

    pub fn with_keywords<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_keywords
            .extend(names.into_iter().map(|n| n.into().to_ascii_lowercase()));
        self
    }

    pub fn with_dict_sample<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.dict_sample = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    pub fn with_max_array_index(mut self, max: usize) -> Self {
        self.max_array_index = max;
        self
    }

    /// Built-in keyword or one of `extra_keywords`.
    pub fn is_excluded(&self, name: &str) -> bool {
        is_keyword(name)
            || (!self.extra_keywords.is_empty()
                && self.extra_keywords.contains(&name.to_ascii_lowercase()))
    }
}
