//! The individual scans. Each one walks the whole template with a single
//! pattern and folds what it finds into the shared [`Accumulator`].

use crate::config::InferConfig;
use crate::expression::expression_variables_with;
use crate::shape::{parse_path, Segment, Shape};
use crate::table::Accumulator;
use indexmap::IndexMap;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

macro_rules! ident {
    () => {
        r"[a-zA-Z_][a-zA-Z0-9_]*"
    };
}

macro_rules! path {
    () => {
        concat!(ident!(), r"(?:\.", ident!(), r")*")
    };
}

static SET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\{%\s*set\s+(",
        ident!(),
        r")\s*=\s*(",
        path!(),
        r")\s*%\}"
    ))
    .expect("valid regex")
});

static OUTPUT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(r"\{\{\s*(", path!(), r")(?:\s*\|[^}]+)?\s*\}\}")).expect("valid regex")
});

static FOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\{%\s*for\s+[a-zA-Z0-9_]+\s+in\s+(",
        ident!(),
        r")\s*%\}"
    ))
    .expect("valid regex")
});

static DICT_FOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\{%\s*for\s+[a-zA-Z0-9_]+,\s*[a-zA-Z0-9_]+\s+in\s+(",
        ident!(),
        r")\s*\.\s*items\s*\(\s*\)\s*%\}"
    ))
    .expect("valid regex")
});

static CONDITION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{%\s*(?:el)?if\s+([^%]+)\s*%\}").expect("valid regex"));

static INDEXED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\{\{\s*(",
        path!(),
        r")\s*\[\s*([0-9]+)\s*\](?:\s*\|\s*[^}]+)?\s*\}\}"
    ))
    .expect("valid regex")
});

static ITEM_PROPERTY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(r"\{\{\s*([a-zA-Z0-9_]+)\.(", ident!(), ")")).expect("valid regex")
});

static LOOP_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?s)\{%\s*for\s+([a-zA-Z0-9_]+)\s+in\s+(",
        ident!(),
        r")\s*%\}(.*?)\{%\s*endfor\s*%\}"
    ))
    .expect("valid regex")
});

/// Deeper paths are skipped; shapes are built and serialized recursively.
const MAX_PATH_DEPTH: usize = 64;

fn root_of(path: &str) -> &str {
    path.split('.').next().unwrap_or(path)
}

fn split_path(path: &str) -> Option<Vec<Segment>> {
    match parse_path(path) {
        Some(segments) if segments.len() <= MAX_PATH_DEPTH => Some(segments),
        Some(segments) => {
            warn!("skipping '{}...': {} levels deep", root_of(path), segments.len());
            None
        }
        None => {
            warn!("could not split path '{}'", path);
            None
        }
    }
}

/// Record `path` as a whole: a bare name gets `simple`, a dotted path gets
/// an object root (replacing a scalar when `override_root`) and `leaf` at
/// its end.
fn record_path(
    acc: &mut Accumulator,
    path: &str,
    simple: Shape,
    leaf: Shape,
    override_root: bool,
) {
    let root = root_of(path);
    if !path.contains('.') {
        acc.table.record(root, simple, false);
        return;
    }

    acc.table.record(root, Shape::object(), override_root);
    if let Some(segments) = split_path(path) {
        acc.table.set_path(&segments, leaf);
    }
}

/// `{% set x = source.path %}`: the source is read, `x` is only written.
pub(super) fn assignments(template: &str, config: &InferConfig, acc: &mut Accumulator) {
    for caps in SET.captures_iter(template) {
        let source = &caps[2];
        let root = root_of(source);
        if config.is_excluded(root) {
            continue;
        }

        acc.reference(root);
        record_path(acc, source, Shape::empty(), Shape::empty(), false);
    }
}

/// `{{ path | filters }}`.
pub(super) fn outputs(template: &str, config: &InferConfig, acc: &mut Accumulator) {
    for caps in OUTPUT.captures_iter(template) {
        let path = &caps[1];
        let root = root_of(path);
        if config.is_excluded(root) {
            continue;
        }

        acc.reference(root);
        record_path(acc, path, Shape::empty(), Shape::empty(), true);
    }
}

/// `{% for item in xs %}`: `xs` is a list.
pub(super) fn loops(template: &str, config: &InferConfig, acc: &mut Accumulator) {
    for caps in FOR.captures_iter(template) {
        let name = &caps[1];
        if config.is_excluded(name) {
            continue;
        }

        acc.reference(name);
        let placeholder = Shape::Array(vec![Shape::empty()]);
        match acc.table.get_mut(name) {
            None => acc.table.insert(name, placeholder),
            Some(existing) if existing.is_scalar() => *existing = placeholder,
            Some(_) => {}
        }
    }
}

/// `{% for k, v in xs.items() %}`: `xs` is a mapping.
pub(super) fn dict_loops(template: &str, config: &InferConfig, acc: &mut Accumulator) {
    for caps in DICT_FOR.captures_iter(template) {
        let name = &caps[1];
        if config.is_excluded(name) {
            continue;
        }

        acc.reference(name);
        let sample: IndexMap<String, Shape> = config
            .dict_sample
            .iter()
            .map(|(k, v)| (k.clone(), Shape::String(v.clone())))
            .collect();
        acc.table.record(name, Shape::Object(sample), true);
    }
}

/// `{% if cond %}` and `{% elif cond %}`. Paths tested for truthiness get
/// `true`; a bare name never downgrades an object or array.
pub(super) fn conditions(template: &str, config: &InferConfig, acc: &mut Accumulator) {
    let excluded = |name: &str| config.is_excluded(name);

    for caps in CONDITION.captures_iter(template) {
        for path in expression_variables_with(&caps[1], &excluded) {
            let root = root_of(&path);
            acc.reference(root);

            if path.contains('.') {
                record_path(acc, &path, Shape::flag(), Shape::flag(), true);
            } else if !acc.table.contains(root) {
                acc.table.insert(root, Shape::flag());
            }
        }
    }
}

/// `{{ xs[2] }}` and `{{ obj.xs[0] }}`.
pub(super) fn indexed_access(template: &str, config: &InferConfig, acc: &mut Accumulator) {
    for caps in INDEXED.captures_iter(template) {
        let base = &caps[1];
        let root = root_of(base);
        if config.is_excluded(root) {
            continue;
        }

        acc.reference(root);
        let seed = if base.contains('.') {
            Shape::object()
        } else {
            Shape::array()
        };
        acc.table.record(root, seed, true);

        let index = match caps[2].parse::<usize>() {
            Ok(index) if index <= config.max_array_index => index,
            _ => {
                warn!(
                    "not padding {}[{}]: above limit of {}",
                    base, &caps[2], config.max_array_index
                );
                continue;
            }
        };

        if let Some(mut segments) = split_path(base) {
            segments.push(Segment::Index(index));
            acc.table.set_path(&segments, Shape::empty());
        }
    }
}

/// `{% for item in xs %}...{{ item.prop }}...{% endfor %}`: `xs` holds
/// objects carrying every `prop` seen in the body.
pub(super) fn loop_item_properties(template: &str, config: &InferConfig, acc: &mut Accumulator) {
    for caps in LOOP_BLOCK.captures_iter(template) {
        let item = &caps[1];
        let name = &caps[2];
        let body = &caps[3];
        if config.is_excluded(name) {
            continue;
        }

        acc.reference(name);

        let mut fields = IndexMap::new();
        for prop in ITEM_PROPERTY.captures_iter(body) {
            if &prop[1] == item {
                fields.entry(prop[2].to_string()).or_insert_with(Shape::empty);
            }
        }
        if fields.is_empty() {
            continue;
        }

        debug!("{}: loop items carry {:?}", name, fields.keys().collect::<Vec<_>>());
        let element = Shape::Object(fields);
        let sample = Shape::Array(vec![element.clone(), element]);
        match acc.table.get_mut(name) {
            None => acc.table.insert(name, sample),
            Some(existing) if existing.is_scalar() || existing.is_structureless_array() => {
                *existing = sample
            }
            Some(_) => {}
        }
    }
}
