//! Infer the JSON shape of the variables a Jinja-style template reads.
//!
//! The analysis is heuristic: a handful of independent regex passes over the
//! template text, each recognizing one construct (`{{ a.b }}`, `{% for %}`,
//! `{% if %}`, `x[0]`, ...), folded into one table of placeholder values.
//! The result is meant to pre-fill an input form, not to type-check.
//!
//! ```
//! use jinja_infer::infer_variables;
//!
//! let vars = infer_variables(
//!     "{% for item in items %}{{ item.name }}{% endfor %}{% if user.admin %}!{% endif %}",
//! );
//! assert_eq!(
//!     vars.to_string(),
//!     r#"{"item":{"name":""},"items":[{"name":""},{"name":""}],"user":{"admin":true}}"#
//! );
//! ```

mod config;
mod expression;
mod form;
mod inference;
mod keywords;
#[cfg(feature = "python")]
mod python;
mod reconcile;
mod shape;
mod table;

pub use config::InferConfig;
pub use expression::{expression_variables, expression_variables_with};
pub use form::{
    coerce_input, detect_kind, plan_form, set_nested_value, FormError, FormField, InputKind,
    Widget,
};
pub use inference::{infer_variables, Inferencer};
pub use keywords::is_keyword;
pub use reconcile::{reconcile, reconcile_table};
pub use shape::{parse_path, Segment, Shape, ShapeIndex};
pub use table::{should_replace, ReferencedSet, VariableTable};
