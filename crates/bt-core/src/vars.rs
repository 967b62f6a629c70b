//! Variable containers used for static-variable tracking and state snapshots.
//!
//! A [`Variables`] is an ordered name → [`Value`] map.  Ordering is by name so
//! diffs, logs and serialized snapshots are deterministic.
//!
//! # Diffing
//!
//! [`Variables::diff`] compares a baseline against live values and reports
//! every field that was added, changed or removed:
//!
//! ```rust
//! use bt_core::{Value, Variables};
//!
//! let mut baseline = Variables::new();
//! baseline.set("hp", Value::Int(10));
//!
//! let mut live = baseline.clone();
//! live.set("hp", Value::Int(7));
//! live.set("name", Value::from("orc"));
//!
//! let changes = baseline.diff(&live);
//! assert_eq!(changes.len(), 2);
//! ```

use std::collections::BTreeMap;
use std::fmt;

// ── Value ─────────────────────────────────────────────────────────────────────

/// A dynamically typed variable value.
///
/// Floats compare by bit pattern, so a value always equals itself (`NaN`
/// included) and an unchanged variable never shows up in a diff.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", content = "value", rename_all = "snake_case"))]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// `false` only for a `Float` holding `NaN` or an infinity, which JSON
    /// snapshots cannot carry.
    pub fn is_finite(&self) -> bool {
        match self {
            Value::Float(x) => x.is_finite(),
            _ => true,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b))   => a == b,
            (Value::Int(a), Value::Int(b))     => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b))     => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b)  => write!(f, "{b}"),
            Value::Int(i)   => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s)   => write!(f, "\"{s}\""),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

// ── VarChange ─────────────────────────────────────────────────────────────────

/// One field difference between a baseline and live values.
///
/// `old == None` means the field is new; `new == None` means it was removed.
#[derive(Clone, Debug, PartialEq)]
pub struct VarChange {
    pub name: String,
    pub old:  Option<Value>,
    pub new:  Option<Value>,
}

impl fmt::Display for VarChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.old, &self.new) {
            (Some(o), Some(n)) => write!(f, "{}: {} -> {}", self.name, o, n),
            (None, Some(n))    => write!(f, "{}: {}", self.name, n),
            (Some(o), None)    => write!(f, "{}: {} -> (removed)", self.name, o),
            (None, None)       => write!(f, "{}", self.name),
        }
    }
}

// ── Variables ─────────────────────────────────────────────────────────────────

/// An ordered set of named values.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Variables {
    values: BTreeMap<String, Value>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to `value`, returning the previous value if any.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterator over `(name, value)` in ascending name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Fields that differ between `self` (the baseline) and `live`, in
    /// ascending name order.
    ///
    /// Walks both sorted key sequences once: O(|self| + |live|).
    pub fn diff(&self, live: &Variables) -> Vec<VarChange> {
        let mut changes = Vec::new();
        let mut old_it = self.values.iter().peekable();
        let mut new_it = live.values.iter().peekable();

        loop {
            match (old_it.peek(), new_it.peek()) {
                (None, None) => break,
                (Some((ok, ov)), None) => {
                    changes.push(removed(ok, ov));
                    old_it.next();
                }
                (None, Some((nk, nv))) => {
                    changes.push(added(nk, nv));
                    new_it.next();
                }
                (Some((ok, ov)), Some((nk, nv))) => match ok.cmp(nk) {
                    std::cmp::Ordering::Less => {
                        changes.push(removed(ok, ov));
                        old_it.next();
                    }
                    std::cmp::Ordering::Greater => {
                        changes.push(added(nk, nv));
                        new_it.next();
                    }
                    std::cmp::Ordering::Equal => {
                        if ov != nv {
                            changes.push(VarChange {
                                name: (*ok).clone(),
                                old:  Some((*ov).clone()),
                                new:  Some((*nv).clone()),
                            });
                        }
                        old_it.next();
                        new_it.next();
                    }
                },
            }
        }
        changes
    }
}

fn added(name: &str, value: &Value) -> VarChange {
    VarChange { name: name.to_owned(), old: None, new: Some(value.clone()) }
}

fn removed(name: &str, value: &Value) -> VarChange {
    VarChange { name: name.to_owned(), old: Some(value.clone()), new: None }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Variables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut vars = Variables::new();
        for (k, v) in iter {
            vars.set(k, v);
        }
        vars
    }
}
