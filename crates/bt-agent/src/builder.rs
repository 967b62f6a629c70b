//! Fluent builder for a validated [`TypeRegistry`].
//!
//! # Usage
//!
//! ```rust
//! use bt_agent::TypeRegistryBuilder;
//! use bt_core::Value;
//!
//! let types = TypeRegistryBuilder::new()
//!     .class("Npc")
//!     .subclass("Hero", "Npc")
//!     .instance_name("Npc", "hero")
//!     .static_var("Hero", "kills", Value::Int(0))
//!     .build()
//!     .unwrap();
//!
//! assert!(types.is_valid_instance_name("hero", "Hero"));
//! ```
//!
//! Declarations may come in any order; [`build`](TypeRegistryBuilder::build)
//! checks that every referenced class exists and that the hierarchy is
//! acyclic.

use bt_core::Value;
use rustc_hash::FxHashMap;

use crate::types::{ClassInfo, TypeRegistry};
use crate::{AgentError, AgentResult};

/// Fluent builder for [`TypeRegistry`].
#[derive(Default)]
pub struct TypeRegistryBuilder {
    classes:        Vec<(String, Option<String>)>,
    instance_names: Vec<(String, String)>,
    statics:        Vec<(String, String, Value)>,
}

impl TypeRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a root class.
    pub fn class(mut self, name: impl Into<String>) -> Self {
        self.classes.push((name.into(), None));
        self
    }

    /// Declare `name` as a direct subclass of `parent`.
    pub fn subclass(mut self, name: impl Into<String>, parent: impl Into<String>) -> Self {
        self.classes.push((name.into(), Some(parent.into())));
        self
    }

    /// Register `name` as a valid instance name for `class` and descendants.
    pub fn instance_name(mut self, class: impl Into<String>, name: impl Into<String>) -> Self {
        self.instance_names.push((class.into(), name.into()));
        self
    }

    /// Declare a static variable of `class` with its initial value.
    pub fn static_var(
        mut self,
        class: impl Into<String>,
        name:  impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.statics.push((class.into(), name.into(), value.into()));
        self
    }

    /// Validate all declarations and produce the registry.
    pub fn build(self) -> AgentResult<TypeRegistry> {
        let mut classes: FxHashMap<String, ClassInfo> = FxHashMap::default();
        for (name, parent) in self.classes {
            match classes.get(&name) {
                Some(existing) if existing.parent != parent => {
                    return Err(AgentError::Registration(format!(
                        "class '{name}' declared twice with different parents"
                    )));
                }
                Some(_) => continue,
                None => {
                    classes.insert(name, ClassInfo { parent, statics: Default::default() });
                }
            }
        }

        for (name, info) in &classes {
            if let Some(parent) = &info.parent {
                if !classes.contains_key(parent) {
                    return Err(AgentError::Registration(format!(
                        "class '{name}' extends undeclared class '{parent}'"
                    )));
                }
            }
            // Bounded walk: more steps than classes means a cycle.
            let mut current = info.parent.as_deref();
            let mut steps = 0;
            while let Some(c) = current {
                steps += 1;
                if c == name.as_str() || steps > classes.len() {
                    return Err(AgentError::Registration(format!(
                        "class hierarchy of '{name}' is cyclic"
                    )));
                }
                current = classes.get(c).and_then(|i| i.parent.as_deref());
            }
        }

        let mut instance_names: FxHashMap<String, String> = FxHashMap::default();
        for (class, name) in self.instance_names {
            if !classes.contains_key(&class) {
                return Err(AgentError::UnknownClass(class));
            }
            match instance_names.get(&name) {
                Some(existing) if *existing != class => {
                    return Err(AgentError::Registration(format!(
                        "instance name '{name}' already registered for class '{existing}'"
                    )));
                }
                _ => {
                    instance_names.insert(name, class);
                }
            }
        }

        for (class, name, value) in self.statics {
            match classes.get_mut(&class) {
                Some(info) => {
                    info.statics.set(name, value);
                }
                None => return Err(AgentError::UnknownClass(class)),
            }
        }

        Ok(TypeRegistry { classes, instance_names })
    }
}
