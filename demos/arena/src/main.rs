//! arena: smallest runnable demo for the rust_bt runtime.
//!
//! Two arenas (contexts) each hold one spawner.  Every tick a spawner may
//! create a minion; minions lose one hit point per tick and remove
//! themselves when they reach zero.  Additions and removals issued during a
//! tick take effect on the next one.  Static counters per class are logged to
//! CSV whenever they change, and arena 0 is saved to JSON midway and
//! restored at the end if its agents still match.
//!
//! Run with `RUST_LOG=debug` to see registry traffic.

mod tasks;

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context as _, Result};
use tracing::info;

use bt_agent::{Agent, AgentHandle, TypeRegistry, TypeRegistryBuilder};
use bt_context::States;
use bt_core::{ContextId, Value, WorkspaceConfig};
use bt_output::{CsvWriter, OutputObserver, OutputSink, shared};
use bt_workspace::WorkspaceBuilder;

use tasks::{MinionPool, SpawnerTask};

// ── Constants ─────────────────────────────────────────────────────────────────

const ARENAS:       i64 = 2;
const TOTAL_TICKS:  u64 = 40;
const SAVE_AT_TICK: u64 = 20;
const SEED:         u64 = 42;

const CONFIG_JSON: &str = r#"{
    "tick_duration_millis": 100,
    "state_log_interval_ticks": 10,
    "log_static_variables_on_tick": true
}"#;

// ── Types ─────────────────────────────────────────────────────────────────────

fn arena_types() -> Result<TypeRegistry> {
    let types = TypeRegistryBuilder::new()
        .class("Actor")
        .subclass("Spawner", "Actor")
        .subclass("Minion", "Actor")
        .instance_name("Spawner", "spawner")
        .instance_name("Minion", "champion")
        .static_var("Spawner", "waves", Value::Int(0))
        .static_var("Minion", "spawned", Value::Int(0))
        .static_var("Minion", "alive", Value::Int(0))
        .build()?;
    Ok(types)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arena=info,bt=info".into()),
        )
        .init();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("arena_output"));
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    println!("=== arena: rust_bt behavior-tree runtime ===");
    println!("Arenas: {ARENAS}  |  Ticks: {TOTAL_TICKS}  |  Seed: {SEED}");
    println!("Output: {}", out_dir.display());
    println!();

    // 1. Configuration and workspace.
    let config = WorkspaceConfig::from_json_str(CONFIG_JSON)?;
    let writer = shared(CsvWriter::new(&out_dir)?);
    let mut ws = WorkspaceBuilder::new(arena_types()?)
        .config(config)
        .sink(OutputSink::new(Rc::clone(&writer)))
        .build()?;

    // 2. One spawner per arena.  The application owns every agent; contexts
    //    only observe them.
    let mut spawners: Vec<AgentHandle> = Vec::new();
    let mut pools: Vec<MinionPool> = Vec::new();
    for arena in 0..ARENAS {
        let pool: MinionPool = Rc::new(RefCell::new(Vec::new()));
        let spawner = Agent::named(
            format!("spawner-{arena}"),
            "Spawner",
            0,
            SpawnerTask::new(SEED + arena as u64, Rc::clone(&pool)),
        );
        let ctx = ws.context(ContextId(arena))?;
        ctx.add_agent(&spawner);
        ctx.bind_instance("spawner", &spawner)?;
        spawners.push(spawner);
        pools.push(pool);
    }

    // 3. Tick loop.
    let mut obs = OutputObserver::new(Rc::clone(&writer));
    let mut snapshot: Option<String> = None;
    for tick in 1..=TOTAL_TICKS {
        let report = ws.exec_agents_observed(ContextId::ALL, &mut obs)?;
        if let Some(e) = obs.take_error() {
            return Err(e.into());
        }

        // Drop minions that left their arena; their registrations are gone.
        for pool in &pools {
            pool.borrow_mut().retain(|m| m.is_registered());
        }

        if tick.is_multiple_of(10) {
            info!(
                tick,
                executed = report.executed,
                added = report.added,
                removed = report.removed,
                "progress"
            );
        }

        if tick == SAVE_AT_TICK {
            let states = ws.context(ContextId(0))?.save()?;
            let json = states.to_json()?;
            fs::write(out_dir.join("arena_0_states.json"), &json)?;
            println!("Saved arena 0 at tick {tick}: {} agents", states.agents.len());
            snapshot = Some(json);
        }
    }

    // 4. Try to restore the mid-run snapshot.  Minions that despawned since
    //    make the snapshot structurally stale, and load refuses it whole.
    if let Some(json) = snapshot {
        let states = States::from_json(&json)?;
        match ws.context(ContextId(0))?.load(&states) {
            Ok(()) => println!("Restored arena 0 to frame {}", states.clock.frames),
            Err(e) => println!("Snapshot not restored: {e}"),
        }
    }

    // 5. Final state dump, flush, teardown.
    let records = ws.log_current_states(ContextId::ALL)?;
    obs.finish()?;

    println!();
    for arena in 0..ARENAS {
        if let Some(ctx) = ws.find_context(ContextId(arena)) {
            let stat = |class: &str, name: &str| {
                ctx.static_var(class, name).map(Value::to_string).unwrap_or_default()
            };
            println!(
                "Arena {arena}: clock {}  agents {}  spawned {}  alive {}",
                ctx.clock(),
                ctx.agent_count(),
                stat("Minion", "spawned"),
                stat("Minion", "alive"),
            );
        }
    }
    println!("Final state records: {records}");

    let returned = ws.cleanup(ContextId::ALL)?;
    debug_assert!(returned.is_empty());
    println!("Spawners still owned by the application: {}", spawners.len());
    Ok(())
}
