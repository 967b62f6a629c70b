//! Behavior tasks for the arena demo.

use std::cell::RefCell;
use std::rc::Rc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use bt_agent::{
    Agent, AgentError, AgentHandle, AgentResult, BehaviorTask, StateBlob, TaskContext, TaskStatus,
};
use bt_core::Value;

/// Minions owned by one spawner.  The application drops them once they have
/// left their arena.
pub type MinionPool = Rc<RefCell<Vec<AgentHandle>>>;

const SPAWN_CHANCE: f64 = 0.4;

/// Adds `delta` to an integer static variable.
fn bump(ctx: &mut dyn TaskContext, class: &str, name: &str, delta: i64) {
    let current = match ctx.static_var(class, name) {
        Some(Value::Int(n)) => *n,
        _ => 0,
    };
    // Classes are declared up front, so this only fails on a typo.
    if let Err(e) = ctx.set_static_var(class, name, Value::Int(current + delta)) {
        tracing::warn!(error = %e, "static counter not updated");
    }
}

// ── Spawner ───────────────────────────────────────────────────────────────────

pub struct SpawnerTask {
    rng:     SmallRng,
    pool:    MinionPool,
    spawned: u32,
}

impl SpawnerTask {
    pub fn new(seed: u64, pool: MinionPool) -> Self {
        Self { rng: SmallRng::seed_from_u64(seed), pool, spawned: 0 }
    }
}

impl BehaviorTask for SpawnerTask {
    fn exec(&mut self, _agent: &Agent, ctx: &mut dyn TaskContext) -> TaskStatus {
        if !self.rng.gen_bool(SPAWN_CHANCE) {
            return TaskStatus::Running;
        }

        self.spawned += 1;
        let hp = self.rng.gen_range(3..8);
        let minion = Agent::named(
            format!("minion-{}-{}", ctx.context_id().0, self.spawned),
            "Minion",
            1,
            MinionTask { hp },
        );
        // Queued: the minion first runs on the next tick.
        ctx.add_agent(&minion);
        if ctx.instance("champion").is_none() {
            if let Err(e) = ctx.bind_instance("champion", &minion) {
                tracing::warn!(error = %e, "champion not bound");
            }
        }
        self.pool.borrow_mut().push(minion);

        bump(ctx, "Spawner", "waves", 1);
        bump(ctx, "Minion", "spawned", 1);
        bump(ctx, "Minion", "alive", 1);
        TaskStatus::Success
    }

    fn save_state(&self) -> StateBlob {
        serde_json::json!({ "spawned": self.spawned })
    }

    fn load_state(&mut self, state: &StateBlob) -> AgentResult<()> {
        self.spawned = state
            .get("spawned")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| AgentError::State("spawner state lacks 'spawned'".into()))?
            as u32;
        Ok(())
    }

    fn describe_state(&self) -> String {
        format!("spawned={}", self.spawned)
    }
}

// ── Minion ────────────────────────────────────────────────────────────────────

pub struct MinionTask {
    hp: i64,
}

impl BehaviorTask for MinionTask {
    fn exec(&mut self, agent: &Agent, ctx: &mut dyn TaskContext) -> TaskStatus {
        self.hp -= 1;
        if self.hp > 0 {
            return TaskStatus::Running;
        }
        // Queued: the minion finishes this tick and is gone by the next.
        ctx.remove_agent(agent);
        bump(ctx, "Minion", "alive", -1);
        TaskStatus::Failure
    }

    fn save_state(&self) -> StateBlob {
        serde_json::json!({ "hp": self.hp })
    }

    fn load_state(&mut self, state: &StateBlob) -> AgentResult<()> {
        self.hp = state
            .get("hp")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| AgentError::State("minion state lacks 'hp'".into()))?;
        Ok(())
    }

    fn describe_state(&self) -> String {
        format!("hp={}", self.hp)
    }
}
