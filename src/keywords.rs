//! Names that belong to the template language rather than to the context.

use once_cell::sync::Lazy;
use std::collections::HashSet;

static KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // control structures
        "if", "elif", "else", "endif", "for", "endfor", "while", "endwhile", "set", "endset",
        "block", "endblock", "extends", "include", "import", "from", "macro", "endmacro", "call",
        "endcall", "filter", "endfilter", "with", "endwith", "autoescape", "endautoescape", "raw",
        "endraw", "trans", "endtrans", "pluralize",
        // operators and literals
        "not", "and", "or", "in", "is", "true", "false", "none", "null",
        // tests
        "defined", "undefined", "boolean", "integer", "float", "number", "string", "sequence",
        "iterable", "mapping", "sameas", "escaped", "odd", "even", "divisibleby", "equalto",
        // globals and common functions
        "range", "lipsum", "dict", "cycler", "joiner", "len", "abs", "round", "min", "max", "sum",
        "list", "tuple", "sorted", "reversed", "enumerate", "zip", "map", "any", "all",
        // loop context
        "loop",
    ]
    .into_iter()
    .collect()
});

/// `true` when `name` is a keyword, operator, literal, built-in or the loop
/// context. Comparison ignores ASCII case, so `True` and `NONE` match too.
pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(name.to_ascii_lowercase().as_str())
}
