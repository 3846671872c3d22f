use indexmap::IndexMap;
use log::debug;
use nom::{
    branch::alt,
    bytes::complete::take_while,
    character::complete::{char, digit1, satisfy},
    combinator::{all_consuming, map, map_res, recognize},
    multi::many0,
    sequence::{pair, preceded},
    IResult,
};
use serde::Serialize;
use std::fmt;

/// Placeholder JSON describing how a template uses a variable.
///
/// `String("")` and `Boolean(true)` stand for "used as a plain value";
/// objects and arrays carry whatever structure was discovered.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Shape {
    Object(IndexMap<String, Shape>),
    Array(Vec<Shape>),
    String(String),
    Boolean(bool),
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl Shape {
    /// The `""` placeholder.
    pub fn empty() -> Self {
        Shape::String(String::new())
    }

    /// The `true` placeholder used for conditions.
    pub fn flag() -> Self {
        Shape::Boolean(true)
    }

    pub fn object() -> Self {
        Shape::Object(IndexMap::new())
    }

    pub fn array() -> Self {
        Shape::Array(Vec::new())
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Shape::String(_) | Shape::Boolean(_))
    }

    pub fn is_composite(&self) -> bool {
        !self.is_scalar()
    }

    /// An array whose elements are all scalars, e.g. the `[""]` a bare
    /// `for` loop produces. It says "this is a list" and nothing more.
    pub fn is_structureless_array(&self) -> bool {
        match self {
            Shape::Array(items) => items.iter().all(Shape::is_scalar),
            _ => false,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Shape>> {
        match self {
            Shape::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Shape>> {
        match self {
            Shape::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Shape::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Shape::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Container that can hold `segment`: an array for an index, an object
    /// for a key.
    fn container_for(segment: &Segment) -> Self {
        match segment {
            Segment::Index(_) => Shape::array(),
            Segment::Key(_) => Shape::object(),
        }
    }

    /// Initial value for a slot that `rest` will be written through.
    pub(crate) fn slot_for(rest: &[Segment]) -> Self {
        rest.first()
            .map(Shape::container_for)
            .unwrap_or_else(Shape::empty)
    }

    /// Materialize `path` below `self` and write `leaf` at its end.
    ///
    /// Missing levels become arrays or objects depending on the segment that
    /// follows them, arrays are padded with `""` up to an index, and a
    /// scalar in the way is upgraded to the container the path needs. At the
    /// leaf a scalar never replaces an object or array.
    pub fn set_path(&mut self, path: &[Segment], leaf: Shape) {
        let Some((head, rest)) = path.split_first() else {
            if self.is_composite() && leaf.is_scalar() {
                return;
            }
            *self = leaf;
            return;
        };

        if self.is_scalar() {
            *self = Shape::container_for(head);
        }

        let slot = match (self, head) {
            (Shape::Object(map), Segment::Key(key)) => map
                .entry(key.clone())
                .or_insert_with(|| Shape::slot_for(rest)),
            (Shape::Object(map), Segment::Index(idx)) => map
                .entry(idx.to_string())
                .or_insert_with(|| Shape::slot_for(rest)),
            (Shape::Array(items), Segment::Index(idx)) => {
                let idx = *idx;
                while items.len() <= idx {
                    items.push(Shape::empty());
                }
                &mut items[idx]
            }
            (Shape::Array(_), Segment::Key(key)) => {
                debug!("dropping write through key '{}' on an array", key);
                return;
            }
            (Shape::String(_) | Shape::Boolean(_), _) => return,
        };

        slot.set_path(rest, leaf);
    }
}

/* ------------------------------------------------------------------ */
/*  Lookup helpers                                                    */
/* ------------------------------------------------------------------ */

/// Anything that can address a child inside a `Shape`.
///
/// * `&str`  → object key
/// * `usize` → array index
pub trait ShapeIndex {
    fn at(self, parent: &Shape) -> Option<&Shape>;
}

impl ShapeIndex for &str {
    fn at(self, parent: &Shape) -> Option<&Shape> {
        match parent {
            Shape::Object(map) => map.get(self),
            _ => None,
        }
    }
}

impl ShapeIndex for usize {
    fn at(self, parent: &Shape) -> Option<&Shape> {
        match parent {
            Shape::Array(arr) => arr.get(self),
            _ => None,
        }
    }
}

impl Shape {
    pub fn get<K>(&self, key: K) -> Option<&Shape>
    where
        K: ShapeIndex,
    {
        key.at(self)
    }
}

use std::ops::Index;

impl Index<&str> for Shape {
    type Output = Shape;
    fn index(&self, key: &str) -> &Self::Output {
        self.get(key).expect("object key not found")
    }
}

impl Index<usize> for Shape {
    type Output = Shape;
    fn index(&self, idx: usize) -> &Self::Output {
        self.get(idx).expect("array index out of bounds")
    }
}

impl From<&Shape> for serde_json::Value {
    fn from(shape: &Shape) -> Self {
        match shape {
            Shape::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                    .collect(),
            ),
            Shape::Array(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            Shape::String(s) => serde_json::Value::String(s.clone()),
            Shape::Boolean(b) => serde_json::Value::Bool(*b),
        }
    }
}

/* ------------------------------------------------------------------ */
/*  Dotted paths                                                      */
/* ------------------------------------------------------------------ */

/// One component of a dotted path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index(idx) => write!(f, "{}", idx),
        }
    }
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)
}

fn segment(input: &str) -> IResult<&str, Segment> {
    alt((
        map_res(digit1, |digits: &str| digits.parse::<usize>().map(Segment::Index)),
        map(identifier, |name: &str| Segment::Key(name.to_string())),
    ))(input)
}

fn dotted_path(input: &str) -> IResult<&str, Vec<Segment>> {
    let (input, root) = identifier(input)?;
    let (input, rest) = many0(preceded(char('.'), segment))(input)?;

    let mut segments = Vec::with_capacity(rest.len() + 1);
    segments.push(Segment::Key(root.to_string()));
    segments.extend(rest);
    Ok((input, segments))
}

/// Split `user.items.0.name` into typed segments. The root must be an
/// identifier; later segments are identifiers or decimal indices. Returns
/// `None` for anything else.
pub fn parse_path(path: &str) -> Option<Vec<Segment>> {
    all_consuming(dotted_path)(path.trim())
        .ok()
        .map(|(_, segments)| segments)
}
