//! Class hierarchy, instance-name registration and static-variable
//! declarations.
//!
//! # Design
//!
//! A `TypeRegistry` is built once per workspace with
//! [`TypeRegistryBuilder`][crate::TypeRegistryBuilder] and then shared
//! read-only (behind `Rc`) by every context.  Contexts *consult* it when
//! binding instance names and seeding static variables; they never add to it.
//!
//! An instance name registered for class `C` is valid for `C` and every
//! class that descends from `C`.

use bt_core::Variables;
use rustc_hash::FxHashMap;

/// One registered agent class.
#[derive(Clone, Debug, Default)]
pub(crate) struct ClassInfo {
    pub(crate) parent:  Option<String>,
    pub(crate) statics: Variables,
}

/// Read-only registry of agent classes and the names valid for them.
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    pub(crate) classes:        FxHashMap<String, ClassInfo>,
    /// Instance name → class it was registered for.
    pub(crate) instance_names: FxHashMap<String, String>,
}

impl TypeRegistry {
    /// Start a fluent builder.
    pub fn builder() -> crate::TypeRegistryBuilder {
        crate::TypeRegistryBuilder::new()
    }

    pub fn contains_class(&self, class: &str) -> bool {
        self.classes.contains_key(class)
    }

    /// Number of registered classes.
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// All registered class names in ascending order.
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.classes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn parent_of(&self, class: &str) -> Option<&str> {
        self.classes.get(class)?.parent.as_deref()
    }

    /// `class` itself followed by each ancestor up to the root.
    ///
    /// Yields nothing for an unknown class.  The builder rejects cycles, so
    /// the walk always terminates.
    pub fn lineage<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        let start = self.classes.get_key_value(class).map(|(k, _)| k.as_str());
        std::iter::successors(start, move |c| self.parent_of(c))
    }

    /// `true` if `class` is `ancestor` or descends from it.
    pub fn is_a(&self, class: &str, ancestor: &str) -> bool {
        self.lineage(class).any(|c| c == ancestor)
    }

    /// Class an instance name was registered for.
    pub fn instance_class(&self, name: &str) -> Option<&str> {
        self.instance_names.get(name).map(String::as_str)
    }

    /// `true` if `name` was registered for `class` or one of its ancestors.
    pub fn is_valid_instance_name(&self, name: &str, class: &str) -> bool {
        self.instance_class(name)
            .is_some_and(|registered| self.is_a(class, registered))
    }

    /// Declared static variables (with defaults) of exactly `class`.
    pub fn static_defaults(&self, class: &str) -> Option<&Variables> {
        self.classes.get(class).map(|c| &c.statics)
    }

    /// `(class, defaults)` for every class that declares static variables,
    /// in ascending class order.
    pub fn all_static_defaults(&self) -> Vec<(&str, &Variables)> {
        let mut out: Vec<(&str, &Variables)> = self
            .classes
            .iter()
            .filter(|(_, info)| !info.statics.is_empty())
            .map(|(name, info)| (name.as_str(), &info.statics))
            .collect();
        out.sort_unstable_by(|a, b| a.0.cmp(b.0));
        out
    }
}
