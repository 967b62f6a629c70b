//! Unit tests for bt-agent.

use std::cell::RefCell;
use std::rc::Rc;

use bt_core::{ContextClock, ContextId, Value};

use crate::{
    Agent, AgentError, AgentHandle, AgentResult, BehaviorTask, NoopTask, StateBlob, TaskContext,
    TaskStatus, TypeRegistry, TypeRegistryBuilder,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Minimal `TaskContext` that records requests instead of scheduling them.
#[derive(Default)]
struct RecordingContext {
    added:   Vec<String>,
    removed: Vec<String>,
}

impl TaskContext for RecordingContext {
    fn context_id(&self) -> ContextId {
        ContextId(0)
    }

    fn clock(&self) -> ContextClock {
        ContextClock::default()
    }

    fn is_executing(&self) -> bool {
        true
    }

    fn add_agent(&mut self, agent: &Agent) {
        self.added.push(agent.name().to_owned());
    }

    fn remove_agent(&mut self, agent: &Agent) {
        self.removed.push(agent.name().to_owned());
    }

    fn bind_instance(&mut self, _name: &str, _agent: &Agent) -> AgentResult<()> {
        Ok(())
    }

    fn unbind_instance(&mut self, name: &str) -> AgentResult<()> {
        Err(AgentError::NameNotBound(name.to_owned()))
    }

    fn instance(&self, _name: &str) -> Option<AgentHandle> {
        None
    }

    fn static_var(&self, _class: &str, _name: &str) -> Option<&Value> {
        None
    }

    fn set_static_var(&mut self, class: &str, _name: &str, _value: Value) -> AgentResult<()> {
        Err(AgentError::UnknownClass(class.to_owned()))
    }
}

/// A task that counts its executions and persists the count.
struct Counter {
    runs: Rc<RefCell<u32>>,
}

impl BehaviorTask for Counter {
    fn exec(&mut self, _agent: &Agent, _ctx: &mut dyn TaskContext) -> TaskStatus {
        *self.runs.borrow_mut() += 1;
        TaskStatus::Running
    }

    fn save_state(&self) -> StateBlob {
        serde_json::json!({ "runs": *self.runs.borrow() })
    }

    fn load_state(&mut self, state: &StateBlob) -> AgentResult<()> {
        let runs = state
            .get("runs")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| AgentError::State("missing 'runs'".into()))?;
        *self.runs.borrow_mut() = runs as u32;
        Ok(())
    }

    fn describe_state(&self) -> String {
        format!("runs={}", self.runs.borrow())
    }
}

fn rpg_types() -> TypeRegistry {
    TypeRegistryBuilder::new()
        .class("Npc")
        .subclass("Hero", "Npc")
        .subclass("Paladin", "Hero")
        .subclass("Minion", "Npc")
        .instance_name("Hero", "hero")
        .instance_name("Npc", "anyone")
        .static_var("Hero", "kills", Value::Int(0))
        .static_var("Minion", "spawned", Value::Int(0))
        .build()
        .unwrap()
}

// ── Agent ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod agent_tests {
    use super::*;

    #[test]
    fn new_agent_is_unregistered() {
        let a = Agent::new("Hero", 3, NoopTask);
        assert_eq!(a.class_name(), "Hero");
        assert_eq!(a.name(), "Hero");
        assert_eq!(a.priority(), 3);
        assert!(!a.id().is_valid());
        assert!(!a.is_registered());
    }

    #[test]
    fn registration_round_trip() {
        let a = Agent::named("arthur", "Hero", 0, NoopTask);
        a.set_registration(ContextId(2), bt_core::AgentId(9));
        assert!(a.is_registered());
        assert_eq!(a.context_id(), ContextId(2));
        assert_eq!(a.id(), bt_core::AgentId(9));
        a.clear_registration();
        assert!(!a.is_registered());
    }

    #[test]
    fn weak_handle_dies_with_owner() {
        let a = Agent::new("Hero", 0, NoopTask);
        let weak = a.downgrade();
        assert!(weak.upgrade().is_some());
        assert!(Rc::ptr_eq(&a.handle().unwrap(), &a));
        drop(a);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn same_as_is_identity_not_equality() {
        let a = Agent::new("Hero", 0, NoopTask);
        let b = Agent::new("Hero", 0, NoopTask);
        assert!(a.same_as(&a));
        assert!(!a.same_as(&b));
    }

    #[test]
    fn exec_runs_task() {
        let runs = Rc::new(RefCell::new(0));
        let a = Agent::new("Hero", 0, Counter { runs: Rc::clone(&runs) });
        let mut ctx = RecordingContext::default();
        assert_eq!(a.exec(&mut ctx), Some(TaskStatus::Running));
        assert_eq!(a.exec(&mut ctx), Some(TaskStatus::Running));
        assert_eq!(*runs.borrow(), 2);
        assert_eq!(a.describe_state(), "runs=2");
    }

    #[test]
    fn task_can_request_structural_changes() {
        struct Spawner {
            minion: AgentHandle,
        }
        impl BehaviorTask for Spawner {
            fn exec(&mut self, agent: &Agent, ctx: &mut dyn TaskContext) -> TaskStatus {
                ctx.add_agent(&self.minion);
                ctx.remove_agent(agent);
                TaskStatus::Success
            }
        }

        let minion = Agent::named("m1", "Minion", 0, NoopTask);
        let spawner = Agent::named("boss", "Hero", 0, Spawner { minion });
        let mut ctx = RecordingContext::default();
        spawner.exec(&mut ctx);
        assert_eq!(ctx.added, vec!["m1"]);
        assert_eq!(ctx.removed, vec!["boss"]);
    }

    #[test]
    fn save_and_load_state() {
        let runs = Rc::new(RefCell::new(5));
        let a = Agent::new("Hero", 0, Counter { runs: Rc::clone(&runs) });
        let blob = a.save_state().unwrap();
        *runs.borrow_mut() = 0;
        a.load_state(&blob).unwrap();
        assert_eq!(*runs.borrow(), 5);
    }

    #[test]
    fn load_state_propagates_task_error() {
        let a = Agent::new("Hero", 0, Counter { runs: Rc::new(RefCell::new(0)) });
        let err = a.load_state(&serde_json::json!({})).unwrap_err();
        assert!(matches!(err, AgentError::State(_)));
    }

    #[test]
    fn default_state_is_null() {
        let a = Agent::new("Hero", 0, NoopTask);
        assert_eq!(a.save_state().unwrap(), StateBlob::Null);
        assert!(a.describe_state().is_empty());
    }
}

// ── TypeRegistry ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod type_registry_tests {
    use super::*;

    #[test]
    fn hierarchy_queries() {
        let types = rpg_types();
        assert_eq!(types.class_count(), 4);
        assert_eq!(types.parent_of("Paladin"), Some("Hero"));
        assert_eq!(types.parent_of("Npc"), None);
        assert!(types.is_a("Paladin", "Npc"));
        assert!(types.is_a("Hero", "Hero"));
        assert!(!types.is_a("Minion", "Hero"));
        assert!(!types.is_a("Ghost", "Npc"));
        let lineage: Vec<&str> = types.lineage("Paladin").collect();
        assert_eq!(lineage, vec!["Paladin", "Hero", "Npc"]);
    }

    #[test]
    fn instance_names_valid_for_descendants() {
        let types = rpg_types();
        assert!(types.is_valid_instance_name("hero", "Hero"));
        assert!(types.is_valid_instance_name("hero", "Paladin"));
        assert!(!types.is_valid_instance_name("hero", "Minion"));
        assert!(!types.is_valid_instance_name("hero", "Npc"));
        assert!(types.is_valid_instance_name("anyone", "Minion"));
        assert!(!types.is_valid_instance_name("villain", "Hero"));
    }

    #[test]
    fn static_defaults() {
        let types = rpg_types();
        assert_eq!(types.static_defaults("Hero").unwrap().get("kills"), Some(&Value::Int(0)));
        assert!(types.static_defaults("Npc").unwrap().is_empty());
        let all: Vec<&str> = types.all_static_defaults().iter().map(|(c, _)| *c).collect();
        assert_eq!(all, vec!["Hero", "Minion"]);
    }

    #[test]
    fn class_names_sorted() {
        assert_eq!(rpg_types().class_names(), vec!["Hero", "Minion", "Npc", "Paladin"]);
    }

    #[test]
    fn declaration_order_does_not_matter() {
        let types = TypeRegistry::builder()
            .subclass("Hero", "Npc")
            .class("Npc")
            .build()
            .unwrap();
        assert!(types.is_a("Hero", "Npc"));
    }
}

// ── TypeRegistryBuilder validation ────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn undeclared_parent_rejected() {
        let err = TypeRegistryBuilder::new().subclass("Hero", "Npc").build().unwrap_err();
        assert!(matches!(err, AgentError::Registration(_)));
    }

    #[test]
    fn cycle_rejected() {
        let err = TypeRegistryBuilder::new()
            .subclass("A", "B")
            .subclass("B", "A")
            .build()
            .unwrap_err();
        assert!(matches!(err, AgentError::Registration(_)));
    }

    #[test]
    fn instance_name_for_unknown_class_rejected() {
        let err = TypeRegistryBuilder::new().instance_name("Ghost", "boo").build().unwrap_err();
        assert_eq!(err, AgentError::UnknownClass("Ghost".into()));
    }

    #[test]
    fn instance_name_registered_for_two_classes_rejected() {
        let err = TypeRegistryBuilder::new()
            .class("A")
            .class("B")
            .instance_name("A", "x")
            .instance_name("B", "x")
            .build()
            .unwrap_err();
        assert!(matches!(err, AgentError::Registration(_)));
    }

    #[test]
    fn duplicate_identical_declarations_are_harmless() {
        let types = TypeRegistryBuilder::new()
            .class("A")
            .class("A")
            .instance_name("A", "x")
            .instance_name("A", "x")
            .build()
            .unwrap();
        assert_eq!(types.class_count(), 1);
    }

    #[test]
    fn static_for_unknown_class_rejected() {
        let err = TypeRegistryBuilder::new().static_var("Ghost", "hp", 1.0).build().unwrap_err();
        assert_eq!(err, AgentError::UnknownClass("Ghost".into()));
    }
}
